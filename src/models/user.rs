use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqliteExecutor};

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: String,
    pub email: String,
    pub username: String,
    pub name: Option<String>,
    pub avatar: Option<String>,
    #[serde(skip_serializing, default)]
    pub password: Option<String>,
    pub is_verified: bool,
    pub created_at: i64,
}

/// Passwordless account created on first magic-link submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAnonymousUser {
    pub user_id: String,
    pub email: String,
    pub username: String,
    pub avatar: String,
}

impl User {
    pub fn is_anonymous(&self) -> bool {
        self.password.is_none()
    }

    /// Case-insensitive email lookup.
    pub async fn find_by_email<'e, E: SqliteExecutor<'e>>(
        executor: E,
        email: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT user_id, email, username, name, avatar, password, is_verified, created_at
            FROM users
            WHERE LOWER(email) = LOWER(?)
            "#,
        )
        .bind(email)
        .fetch_optional(executor)
        .await
    }

    pub async fn username_taken<'e, E: SqliteExecutor<'e>>(
        executor: E,
        username: &str,
    ) -> Result<bool, sqlx::Error> {
        let found = sqlx::query_scalar::<_, i64>("SELECT 1 FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(executor)
            .await?;

        Ok(found.is_some())
    }

    pub async fn insert_anonymous<'e, E: SqliteExecutor<'e>>(
        executor: E,
        user: &NewAnonymousUser,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (user_id, email, username, avatar, password, is_verified)
            VALUES (?, ?, ?, ?, NULL, 0)
            RETURNING user_id, email, username, name, avatar, password, is_verified, created_at
            "#,
        )
        .bind(&user.user_id)
        .bind(&user.email)
        .bind(&user.username)
        .bind(&user.avatar)
        .fetch_one(executor)
        .await
    }
}
