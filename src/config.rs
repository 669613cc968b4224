use rand::{distributions::Alphanumeric, Rng};
use serde::Deserialize;
use tracing::warn;

const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub secret: String,
    pub issuer: String,
    pub ttl_minutes: i64,
    pub cookie_secure: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub static_dir: String,
    pub session: SessionConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://data/database.db".into());

        let secret = match std::env::var("SESSION_SECRET") {
            Ok(secret) => {
                anyhow::ensure!(
                    secret.len() >= MIN_SECRET_LEN,
                    "SESSION_SECRET must be at least {MIN_SECRET_LEN} bytes"
                );
                secret
            }
            Err(_) => {
                warn!("SESSION_SECRET not set; generated a random one, sessions end on restart");
                random_secret()
            }
        };

        let session = SessionConfig {
            secret,
            issuer: std::env::var("SESSION_ISSUER").unwrap_or_else(|_| "vocablist".into()),
            ttl_minutes: std::env::var("SESSION_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .filter(|v| *v > 0)
                .unwrap_or(60 * 24),
            cookie_secure: std::env::var("SESSION_COOKIE_SECURE")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
        };

        Ok(Self {
            database_url,
            static_dir: std::env::var("STATIC_DIR").unwrap_or_else(|_| "static".into()),
            session,
        })
    }
}

fn random_secret() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect()
}
