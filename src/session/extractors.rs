use std::convert::Infallible;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
    response::{Redirect, Response},
};
use tracing::debug;

use super::services::{FlashKind, Session, SessionKeys};

#[async_trait]
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
    SessionKeys: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Ok(SessionKeys::from_ref(state).load(&parts.headers))
    }
}

/// Session of a logged-in user. Anonymous requests are redirected to the login page.
pub struct AuthSession {
    pub user_id: i64,
    pub username: String,
    pub session: Session,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthSession
where
    S: Send + Sync,
    SessionKeys: FromRef<S>,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = SessionKeys::from_ref(state);
        let mut session = keys.load(&parts.headers);

        match (session.user_id(), session.username().map(str::to_owned)) {
            (Some(user_id), Some(username)) => Ok(AuthSession {
                user_id,
                username,
                session,
            }),
            _ => {
                debug!(path = %parts.uri.path(), "anonymous request to protected route");
                session.flash(FlashKind::Warning, "Please log in to access this page.");
                Err(keys.respond(&session, Redirect::to("/login")))
            }
        }
    }
}
