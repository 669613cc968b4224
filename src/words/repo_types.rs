use sqlx::FromRow;
use time::OffsetDateTime;

/// Vocabulary entry owned by one user inside one project.
#[derive(Debug, Clone, FromRow)]
pub struct Word {
    pub id: i64,
    pub new_language_word: String,
    pub english_translation: String,
    pub user_id: i64,
    pub project_id: i64,
    pub created_at: OffsetDateTime,
}
