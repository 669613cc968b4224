use sqlx::FromRow;
use time::OffsetDateTime;

/// User record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,                    // unique user ID
    pub username: String,           // login name, unique
    pub email: String,              // unique
    pub password_hash: String,      // Argon2 hash
    pub created_at: OffsetDateTime, // creation timestamp
}
