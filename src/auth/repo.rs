use crate::auth::repo_types::User;
use crate::projects::repo::DEFAULT_PROJECT_NAME;
use anyhow::Context;
use sqlx::SqlitePool;

impl User {
    /// Find a user by username.
    pub async fn find_by_username(db: &SqlitePool, username: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, created_at
            FROM users
            WHERE username = ?
            "#,
        )
        .bind(username)
        .fetch_optional(db)
        .await
        .context("find user by username")?;
        Ok(user)
    }

    /// Whether the username or the email is already taken.
    pub async fn exists(db: &SqlitePool, username: &str, email: &str) -> anyhow::Result<bool> {
        let row: Option<(i64,)> = sqlx::query_as(
            r#"
            SELECT id
            FROM users
            WHERE username = ? OR email = ?
            LIMIT 1
            "#,
        )
        .bind(username)
        .bind(email)
        .fetch_optional(db)
        .await
        .context("check user exists")?;
        Ok(row.is_some())
    }

    /// Create a new user together with their default project.
    pub async fn create_with_default_project(
        db: &SqlitePool,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> anyhow::Result<User> {
        let mut tx = db.begin().await.context("begin tx")?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash)
            VALUES (?, ?, ?)
            RETURNING id, username, email, password_hash, created_at
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .fetch_one(&mut *tx)
        .await
        .context("insert user")?;

        sqlx::query("INSERT INTO projects (name, user_id) VALUES (?, ?)")
            .bind(DEFAULT_PROJECT_NAME)
            .bind(user.id)
            .execute(&mut *tx)
            .await
            .context("insert default project")?;

        tx.commit().await.context("commit tx")?;
        Ok(user)
    }
}

/// True when the error chain holds a UNIQUE constraint violation.
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.downcast_ref::<sqlx::Error>()
        .and_then(|e| e.as_database_error())
        .is_some_and(|e| e.is_unique_violation())
}
