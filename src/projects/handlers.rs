use axum::{
    extract::{FromRef, State},
    response::{Redirect, Response},
    routing::get,
    Router,
};
use tracing::{error, instrument};

use crate::{
    projects::repo_types::Project,
    session::{AuthSession, FlashKind, Session, SessionKeys},
    state::AppState,
    views,
};

pub fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/dashboard", get(dashboard))
}

pub async fn index(session: Session) -> Redirect {
    if session.user_id().is_some() {
        Redirect::to("/dashboard")
    } else {
        Redirect::to("/login")
    }
}

/// Lists the user's projects and makes the first one current.
#[instrument(skip(state, auth), fields(user_id = auth.user_id))]
pub async fn dashboard(State(state): State<AppState>, auth: AuthSession) -> Response {
    let keys = SessionKeys::from_ref(&state);
    let AuthSession {
        user_id,
        username,
        mut session,
    } = auth;

    let projects = match Project::list_by_user(&state.db, user_id).await {
        Ok(p) => p,
        Err(e) => {
            error!(error = ?e, "list projects failed");
            session.flash(FlashKind::Danger, "An unexpected error occurred. Please try again.");
            return render_dashboard(&keys, session, &username, &[]);
        }
    };

    match projects.first() {
        Some(project) => session.select_project(Some(project.id), project.name.clone()),
        None => session.select_project(None, "No Project Selected"),
    }

    render_dashboard(&keys, session, &username, &projects)
}

fn render_dashboard(
    keys: &SessionKeys,
    mut session: Session,
    username: &str,
    projects: &[Project],
) -> Response {
    let current_name = session
        .current_project_name()
        .unwrap_or("No Project Selected")
        .to_owned();
    let flashes = session.take_flashes();
    keys.respond(
        &session,
        views::dashboard_page(username, projects, &current_name, &flashes),
    )
}
