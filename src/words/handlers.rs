use axum::{
    extract::{rejection::PathRejection, FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use tracing::{error, info, instrument, warn};

use crate::{
    session::{AuthSession, FlashKind, Session, SessionKeys},
    state::AppState,
    views,
    words::{dto::AddWordRequest, repo_types::Word, services::validate_word},
};

pub fn word_routes() -> Router<AppState> {
    Router::new()
        .route("/words", get(list_words).post(add_word))
        .route("/words/delete/:id", post(delete_word))
}

fn no_project(keys: &SessionKeys, mut session: Session) -> Response {
    session.flash(
        FlashKind::Warning,
        "Please select a project from the dashboard to manage words.",
    );
    keys.respond(&session, Redirect::to("/dashboard"))
}

#[instrument(skip(state, auth), fields(user_id = auth.user_id))]
pub async fn list_words(State(state): State<AppState>, auth: AuthSession) -> Response {
    let keys = SessionKeys::from_ref(&state);
    let AuthSession {
        user_id,
        username,
        mut session,
    } = auth;

    let Some(project_id) = session.current_project_id() else {
        return no_project(&keys, session);
    };

    let words = match Word::list_for_project(&state.db, user_id, project_id).await {
        Ok(w) => w,
        Err(e) => {
            error!(error = ?e, project_id, "list words failed");
            session.flash(FlashKind::Danger, "An unexpected error occurred. Please try again.");
            Vec::new()
        }
    };

    let project_name = session.current_project_name().unwrap_or_default().to_owned();
    let flashes = session.take_flashes();
    keys.respond(
        &session,
        views::words_page(&username, &project_name, &words, &flashes),
    )
}

#[instrument(skip(state, auth, payload), fields(user_id = auth.user_id))]
pub async fn add_word(
    State(state): State<AppState>,
    auth: AuthSession,
    Form(mut payload): Form<AddWordRequest>,
) -> Response {
    let keys = SessionKeys::from_ref(&state);
    let AuthSession {
        user_id,
        mut session,
        ..
    } = auth;

    let Some(project_id) = session.current_project_id() else {
        return no_project(&keys, session);
    };

    if let Err(e) = validate_word(&mut payload) {
        warn!(reason = %e, "word rejected");
        session.flash(FlashKind::Danger, e.to_string());
        return keys.respond(&session, Redirect::to("/words"));
    }

    match Word::create(
        &state.db,
        user_id,
        project_id,
        &payload.new_language_word,
        &payload.english_translation,
    )
    .await
    {
        Ok(Some(word)) => {
            info!(word_id = word.id, project_id, "word added");
            session.flash(
                FlashKind::Success,
                format!("Word \"{}\" added successfully!", word.new_language_word),
            );
        }
        Ok(None) => {
            warn!(project_id, "current project not owned by user");
            session.select_project(None, "No Project Selected");
            return no_project(&keys, session);
        }
        Err(e) => {
            error!(error = ?e, "insert word failed");
            session.flash(FlashKind::Danger, "Error adding word. Please try again.");
        }
    }

    keys.respond(&session, Redirect::to("/words"))
}

#[instrument(skip(state, auth), fields(user_id = auth.user_id))]
pub async fn delete_word(
    State(state): State<AppState>,
    auth: AuthSession,
    word_id: Result<Path<i64>, PathRejection>,
) -> Response {
    // Non-numeric ids name no route.
    let Ok(Path(word_id)) = word_id else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let keys = SessionKeys::from_ref(&state);
    let AuthSession {
        user_id,
        mut session,
        ..
    } = auth;

    match Word::delete_owned(&state.db, word_id, user_id).await {
        Ok(true) => {
            info!(word_id, "word deleted");
            session.flash(FlashKind::Success, "Word deleted successfully!");
        }
        Ok(false) => {
            warn!(word_id, "delete refused: word missing or not owned");
            session.flash(
                FlashKind::Danger,
                "You do not have permission to delete this word.",
            );
        }
        Err(e) => {
            error!(error = ?e, word_id, "delete word failed");
            session.flash(FlashKind::Danger, "Error deleting word. Please try again.");
        }
    }

    keys.respond(&session, Redirect::to("/words"))
}
