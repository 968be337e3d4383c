use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqliteExecutor};
use uuid::Uuid;

/// One outstanding (or consumed) emailed submission link.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MagicLink {
    pub id: String,
    pub email: String,
    pub board_id: String,
    pub token: String,
    pub user_id: Option<String>,
    pub used: bool,
    pub expires_at: i64,
    pub created_at: i64,
}

/// Authorization granted by a verified session token: one email, one board,
/// one originating link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MagicLinkSession {
    pub email: String,
    pub board_id: Uuid,
    pub magic_link_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMagicLink {
    pub id: String,
    pub email: String,
    pub board_id: String,
    pub token: String,
    pub user_id: Option<String>,
    pub expires_at: i64,
}

impl MagicLink {
    pub async fn delete_unused<'e, E: SqliteExecutor<'e>>(
        executor: E,
        email: &str,
        board_id: &str,
    ) -> Result<u64, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM magic_links WHERE email = ? AND board_id = ? AND used = 0")
                .bind(email)
                .bind(board_id)
                .execute(executor)
                .await?;

        Ok(result.rows_affected())
    }

    pub async fn insert<'e, E: SqliteExecutor<'e>>(
        executor: E,
        link: &NewMagicLink,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, MagicLink>(
            r#"
            INSERT INTO magic_links (id, email, board_id, token, user_id, used, expires_at)
            VALUES (?, ?, ?, ?, ?, 0, ?)
            RETURNING id, email, board_id, token, user_id, used, expires_at, created_at
            "#,
        )
        .bind(&link.id)
        .bind(&link.email)
        .bind(&link.board_id)
        .bind(&link.token)
        .bind(&link.user_id)
        .bind(link.expires_at)
        .fetch_one(executor)
        .await
    }

    /// Unused and unexpired link carrying exactly this token.
    pub async fn find_live_by_token<'e, E: SqliteExecutor<'e>>(
        executor: E,
        token: &str,
        now: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, MagicLink>(
            r#"
            SELECT id, email, board_id, token, user_id, used, expires_at, created_at
            FROM magic_links
            WHERE token = ? AND used = 0 AND expires_at > ?
            "#,
        )
        .bind(token)
        .bind(now)
        .fetch_optional(executor)
        .await
    }

    pub async fn find_by_id<'e, E: SqliteExecutor<'e>>(
        executor: E,
        id: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, MagicLink>(
            r#"
            SELECT id, email, board_id, token, user_id, used, expires_at, created_at
            FROM magic_links
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    pub async fn list_for<'e, E: SqliteExecutor<'e>>(
        executor: E,
        email: &str,
        board_id: &str,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, MagicLink>(
            r#"
            SELECT id, email, board_id, token, user_id, used, expires_at, created_at
            FROM magic_links
            WHERE email = ? AND board_id = ?
            ORDER BY created_at ASC
            "#,
        )
        .bind(email)
        .bind(board_id)
        .fetch_all(executor)
        .await
    }

    /// Flips `used` on a still-unused link. Returns false when the link was
    /// already consumed or no longer exists.
    pub async fn claim<'e, E: SqliteExecutor<'e>>(
        executor: E,
        id: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE magic_links SET used = 1 WHERE id = ? AND used = 0")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() == 1)
    }
}
