pub(crate) use crate::session::dto::{Flash, FlashKind, SessionClaims, SessionData, SessionKeys};
use crate::config::SessionConfig;
use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::FromRef,
    http::{header, HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use std::time::Duration;
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::{debug, warn};
use uuid::Uuid;

pub const COOKIE_NAME: &str = "vocablist_session";

/// Per-browser state carried in the signed session cookie.
#[derive(Debug, Clone)]
pub struct Session {
    id: Uuid,
    data: SessionData,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4(),
            data: SessionData::default(),
        }
    }
}

impl Session {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn user_id(&self) -> Option<i64> {
        self.data.user_id
    }

    pub fn username(&self) -> Option<&str> {
        self.data.username.as_deref()
    }

    pub fn current_project_id(&self) -> Option<i64> {
        self.data.current_project_id
    }

    pub fn current_project_name(&self) -> Option<&str> {
        self.data.current_project_name.as_deref()
    }

    /// Drop all session data, flashes included, and start under a new id.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn login(&mut self, user_id: i64, username: impl Into<String>) {
        self.data.user_id = Some(user_id);
        self.data.username = Some(username.into());
    }

    pub fn select_project(&mut self, project_id: Option<i64>, name: impl Into<String>) {
        self.data.current_project_id = project_id;
        self.data.current_project_name = Some(name.into());
    }

    pub fn flash(&mut self, kind: FlashKind, message: impl Into<String>) {
        self.data.flashes.push(Flash {
            kind,
            message: message.into(),
        });
    }

    pub fn take_flashes(&mut self) -> Vec<Flash> {
        std::mem::take(&mut self.data.flashes)
    }
}

impl FromRef<AppState> for SessionKeys {
    fn from_ref(state: &AppState) -> Self {
        SessionKeys::new(&state.config.session)
    }
}

impl SessionKeys {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            issuer: config.issuer.clone(),
            ttl: Duration::from_secs((config.ttl_minutes.max(1) as u64) * 60),
            cookie_secure: config.cookie_secure,
        }
    }

    pub fn sign(&self, session: &Session) -> Result<String, jsonwebtoken::errors::Error> {
        let now = OffsetDateTime::now_utc();
        let exp = now + TimeDuration::seconds(self.ttl.as_secs() as i64);
        let claims = SessionClaims {
            jti: session.id,
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
            data: session.data.clone(),
        };
        encode(&Header::default(), &claims, &self.encoding)
    }

    pub fn verify(&self, token: &str) -> Result<Session, jsonwebtoken::errors::Error> {
        let mut validation = Validation::default();
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<SessionClaims>(token, &self.decoding, &validation)?;
        Ok(Session {
            id: data.claims.jti,
            data: data.claims.data,
        })
    }

    /// Session from the request cookie. Missing, tampered or expired cookies yield a fresh session.
    pub fn load(&self, headers: &HeaderMap) -> Session {
        let Some(token) = cookie_value(headers, COOKIE_NAME) else {
            return Session::default();
        };
        match self.verify(token) {
            Ok(session) => {
                debug!(session_id = %session.id, "session loaded");
                session
            }
            Err(e) => {
                warn!(error = %e, "discarding invalid session cookie");
                Session::default()
            }
        }
    }

    pub fn set_cookie(&self, session: &Session) -> Result<HeaderValue, AppError> {
        let token = self.sign(session)?;
        let mut cookie = format!(
            "{COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
            self.ttl.as_secs()
        );
        if self.cookie_secure {
            cookie.push_str("; Secure");
        }
        Ok(HeaderValue::from_str(&cookie)?)
    }

    /// Attach the session cookie to `body`.
    pub fn respond(&self, session: &Session, body: impl IntoResponse) -> Response {
        match self.set_cookie(session) {
            Ok(cookie) => ([(header::SET_COOKIE, cookie)], body).into_response(),
            Err(e) => e.into_response(),
        }
    }
}

fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}
