use sqlx::FromRow;
use time::OffsetDateTime;

/// Project record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct Project {
    pub id: i64,
    pub name: String,
    pub user_id: i64, // owner
    pub created_at: OffsetDateTime,
}
