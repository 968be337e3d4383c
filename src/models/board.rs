use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqliteExecutor};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub board_id: String,
    pub name: String,
    pub url: String,
    pub color: String,
    pub display: bool,
    pub view_voters: bool,
    pub created_at: i64,
}

#[derive(Debug, Clone)]
pub struct NewBoard {
    pub name: String,
    pub url: String,
    pub color: String,
    pub display: bool,
    pub view_voters: bool,
}

impl NewBoard {
    pub fn new(name: &str, url: &str, color: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
            color: color.to_string(),
            display: true,
            view_voters: true,
        }
    }
}

impl Board {
    pub async fn find_by_id<'e, E: SqliteExecutor<'e>>(
        executor: E,
        board_id: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Board>(
            r#"
            SELECT board_id, name, url, color, display, view_voters, created_at
            FROM boards
            WHERE board_id = ?
            "#,
        )
        .bind(board_id)
        .fetch_optional(executor)
        .await
    }

    pub async fn list<'e, E: SqliteExecutor<'e>>(executor: E) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Board>(
            r#"
            SELECT board_id, name, url, color, display, view_voters, created_at
            FROM boards
            ORDER BY created_at ASC, name ASC
            "#,
        )
        .fetch_all(executor)
        .await
    }

    pub async fn count<'e, E: SqliteExecutor<'e>>(executor: E) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM boards")
            .fetch_one(executor)
            .await
    }

    pub async fn create<'e, E: SqliteExecutor<'e>>(
        executor: E,
        board: &NewBoard,
    ) -> Result<Self, sqlx::Error> {
        let board_id = Uuid::new_v4().to_string();
        sqlx::query_as::<_, Board>(
            r#"
            INSERT INTO boards (board_id, name, url, color, display, view_voters)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING board_id, name, url, color, display, view_voters, created_at
            "#,
        )
        .bind(board_id)
        .bind(&board.name)
        .bind(&board.url)
        .bind(&board.color)
        .bind(board.display)
        .bind(board.view_voters)
        .fetch_one(executor)
        .await
    }
}
