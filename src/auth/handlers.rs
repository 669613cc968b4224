use axum::{
    extract::{FromRef, State},
    response::{Redirect, Response},
    routing::get,
    Form, Router,
};
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, RegisterRequest},
        repo::is_unique_violation,
        repo_types::User,
        services::{
            hash_password, normalize_login, validate_registration, verify_password, LoginError,
            RegisterError,
        },
    },
    session::{AuthSession, FlashKind, Session, SessionKeys},
    state::AppState,
    views,
};

const UNEXPECTED: &str = "An unexpected error occurred. Please try again.";

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", get(register_form).post(register))
        .route("/login", get(login_form).post(login))
        .route("/logout", get(logout))
}

pub async fn register_form(State(state): State<AppState>, mut session: Session) -> Response {
    let keys = SessionKeys::from_ref(&state);
    let flashes = session.take_flashes();
    keys.respond(&session, views::register_page(&flashes))
}

pub async fn login_form(State(state): State<AppState>, mut session: Session) -> Response {
    let keys = SessionKeys::from_ref(&state);
    let flashes = session.take_flashes();
    keys.respond(&session, views::login_page(&flashes))
}

#[instrument(skip(state, session, payload), fields(username = %payload.username))]
pub async fn register(
    State(state): State<AppState>,
    mut session: Session,
    Form(mut payload): Form<RegisterRequest>,
) -> Response {
    let keys = SessionKeys::from_ref(&state);
    let submitted_email = payload.email.clone();

    if let Err(e) = validate_registration(&mut payload) {
        warn!(reason = %e, "registration rejected");
        session.flash(FlashKind::Danger, e.to_string());
        return keys.respond(&session, Redirect::to("/register"));
    }

    let taken = RegisterError::AlreadyRegistered {
        username: payload.username.clone(),
        email: submitted_email,
    };

    match User::exists(&state.db, &payload.username, &payload.email).await {
        Ok(false) => {}
        Ok(true) => {
            warn!(email = %payload.email, "username or email already registered");
            session.flash(FlashKind::Danger, taken.to_string());
            return keys.respond(&session, Redirect::to("/register"));
        }
        Err(e) => {
            error!(error = ?e, "user lookup failed");
            session.flash(FlashKind::Danger, UNEXPECTED);
            return keys.respond(&session, Redirect::to("/register"));
        }
    }

    let hash = match hash_password(&payload.password) {
        Ok(h) => h,
        Err(e) => {
            error!(error = %e, "hash_password failed");
            session.flash(FlashKind::Danger, UNEXPECTED);
            return keys.respond(&session, Redirect::to("/register"));
        }
    };

    let user = match User::create_with_default_project(
        &state.db,
        &payload.username,
        &payload.email,
        &hash,
    )
    .await
    {
        Ok(u) => u,
        Err(e) if is_unique_violation(&e) => {
            warn!(email = %payload.email, "registration lost a uniqueness race");
            session.flash(FlashKind::Danger, taken.to_string());
            return keys.respond(&session, Redirect::to("/register"));
        }
        Err(e) => {
            error!(error = ?e, "create user failed");
            session.flash(FlashKind::Danger, UNEXPECTED);
            return keys.respond(&session, Redirect::to("/register"));
        }
    };

    info!(user_id = user.id, username = %user.username, "user registered");
    session.flash(FlashKind::Success, "Registration successful! Please log in.");
    keys.respond(&session, Redirect::to("/login"))
}

#[instrument(skip(state, session, payload), fields(username = %payload.username))]
pub async fn login(
    State(state): State<AppState>,
    mut session: Session,
    Form(mut payload): Form<LoginRequest>,
) -> Response {
    let keys = SessionKeys::from_ref(&state);
    normalize_login(&mut payload);

    let user = match User::find_by_username(&state.db, &payload.username).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            warn!("login unknown username");
            session.flash(FlashKind::Danger, LoginError::UnknownUsername.to_string());
            return keys.respond(&session, Redirect::to("/login"));
        }
        Err(e) => {
            error!(error = ?e, "find_by_username failed");
            session.flash(FlashKind::Danger, UNEXPECTED);
            return keys.respond(&session, Redirect::to("/login"));
        }
    };

    let ok = match verify_password(&payload.password, &user.password_hash) {
        Ok(v) => v,
        Err(e) => {
            error!(error = %e, user_id = user.id, "verify_password failed");
            session.flash(FlashKind::Danger, UNEXPECTED);
            return keys.respond(&session, Redirect::to("/login"));
        }
    };

    if !ok {
        warn!(user_id = user.id, "login invalid password");
        session.flash(FlashKind::Danger, LoginError::WrongPassword.to_string());
        return keys.respond(&session, Redirect::to("/login"));
    }

    session.clear();
    session.login(user.id, user.username.clone());
    session.flash(FlashKind::Success, "Logged in successfully!");

    info!(user_id = user.id, session_id = %session.id(), "user logged in");
    keys.respond(&session, Redirect::to("/dashboard"))
}

#[instrument(skip(state, auth), fields(user_id = auth.user_id))]
pub async fn logout(State(state): State<AppState>, auth: AuthSession) -> Response {
    let keys = SessionKeys::from_ref(&state);
    let mut session = auth.session;
    session.clear();
    session.flash(FlashKind::Info, "You have been logged out.");
    info!("user logged out");
    keys.respond(&session, Redirect::to("/login"))
}
