use crate::words::repo_types::Word;
use anyhow::Context;
use sqlx::SqlitePool;

impl Word {
    /// Words of one project owned by `user_id`, newest first.
    pub async fn list_for_project(
        db: &SqlitePool,
        user_id: i64,
        project_id: i64,
    ) -> anyhow::Result<Vec<Word>> {
        let rows = sqlx::query_as::<_, Word>(
            r#"
            SELECT id, new_language_word, english_translation, user_id, project_id, created_at
            FROM words
            WHERE user_id = ? AND project_id = ?
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .bind(project_id)
        .fetch_all(db)
        .await
        .context("list words for project")?;
        Ok(rows)
    }

    /// Insert a word into a project owned by `user_id`.
    /// Returns `None` when the project does not exist or belongs to someone else.
    pub async fn create(
        db: &SqlitePool,
        user_id: i64,
        project_id: i64,
        new_language_word: &str,
        english_translation: &str,
    ) -> anyhow::Result<Option<Word>> {
        let word = sqlx::query_as::<_, Word>(
            r#"
            INSERT INTO words (new_language_word, english_translation, user_id, project_id)
            SELECT ?, ?, user_id, id
            FROM projects
            WHERE id = ? AND user_id = ?
            RETURNING id, new_language_word, english_translation, user_id, project_id, created_at
            "#,
        )
        .bind(new_language_word)
        .bind(english_translation)
        .bind(project_id)
        .bind(user_id)
        .fetch_optional(db)
        .await
        .context("insert word")?;
        Ok(word)
    }

    /// Delete a word only if `user_id` owns it. Returns whether a row was removed.
    pub async fn delete_owned(db: &SqlitePool, word_id: i64, user_id: i64) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM words WHERE id = ? AND user_id = ?")
            .bind(word_id)
            .bind(user_id)
            .execute(db)
            .await
            .context("delete word")?;
        Ok(result.rows_affected() > 0)
    }
}
