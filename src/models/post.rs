use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, FromRow, Row, SqliteExecutor};

use super::vote::VoteSummary;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub post_id: String,
    pub title: String,
    pub slug: String,
    pub slug_id: String,
    pub content_markdown: Option<String>,
    pub user_id: Option<String>,
    pub board_id: Option<String>,
    pub screenshots: Vec<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

// Screenshots live in a JSON text column.
impl<'r> FromRow<'r, SqliteRow> for Post {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let screenshots: String = row.try_get("screenshots")?;
        let screenshots = serde_json::from_str(&screenshots).map_err(|e| sqlx::Error::ColumnDecode {
            index: "screenshots".to_string(),
            source: Box::new(e),
        })?;

        Ok(Self {
            post_id: row.try_get("post_id")?,
            title: row.try_get("title")?,
            slug: row.try_get("slug")?,
            slug_id: row.try_get("slug_id")?,
            content_markdown: row.try_get("content_markdown")?,
            user_id: row.try_get("user_id")?,
            board_id: row.try_get("board_id")?,
            screenshots,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub post_id: String,
    pub title: String,
    pub slug: String,
    pub slug_id: String,
    pub content_markdown: Option<String>,
    pub user_id: String,
    pub board_id: String,
    pub screenshots: Vec<String>,
}

/// Post as returned to API clients, with its voters attached.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostWithVoters {
    #[serde(flatten)]
    pub post: Post,
    pub voters: VoteSummary,
}

impl Post {
    pub async fn insert<'e, E: SqliteExecutor<'e>>(
        executor: E,
        post: &NewPost,
    ) -> Result<Self, sqlx::Error> {
        let screenshots = serde_json::to_string(&post.screenshots)
            .map_err(|e| sqlx::Error::Encode(Box::new(e)))?;

        sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (post_id, title, slug, slug_id, content_markdown, user_id, board_id, screenshots)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING post_id, title, slug, slug_id, content_markdown, user_id, board_id,
                      screenshots, created_at, updated_at
            "#,
        )
        .bind(&post.post_id)
        .bind(&post.title)
        .bind(&post.slug)
        .bind(&post.slug_id)
        .bind(&post.content_markdown)
        .bind(&post.user_id)
        .bind(&post.board_id)
        .bind(screenshots)
        .fetch_one(executor)
        .await
    }

    pub async fn list_for_board<'e, E: SqliteExecutor<'e>>(
        executor: E,
        board_id: &str,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Post>(
            r#"
            SELECT post_id, title, slug, slug_id, content_markdown, user_id, board_id,
                   screenshots, created_at, updated_at
            FROM posts
            WHERE board_id = ?
            ORDER BY created_at DESC
            "#,
        )
        .bind(board_id)
        .fetch_all(executor)
        .await
    }
}
