use crate::projects::repo_types::Project;
use anyhow::Context;
use sqlx::SqlitePool;

pub const DEFAULT_PROJECT_NAME: &str = "My First Project";

impl Project {
    /// All projects owned by a user, oldest first.
    pub async fn list_by_user(db: &SqlitePool, user_id: i64) -> anyhow::Result<Vec<Project>> {
        let rows = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, name, user_id, created_at
            FROM projects
            WHERE user_id = ?
            ORDER BY id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await
        .context("list projects by user")?;
        Ok(rows)
    }
}
