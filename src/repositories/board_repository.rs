use crate::models::board::Board;
use async_trait::async_trait;
use sqlx::SqlitePool;

use super::RepositoryResult;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BoardRepository: Send + Sync {
    async fn find_by_id(&self, board_id: &str) -> RepositoryResult<Option<Board>>;
}

pub struct SqliteBoardRepository {
    pool: SqlitePool,
}

impl SqliteBoardRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BoardRepository for SqliteBoardRepository {
    async fn find_by_id(&self, board_id: &str) -> RepositoryResult<Option<Board>> {
        Ok(Board::find_by_id(&self.pool, board_id).await?)
    }
}
