use crate::models::magic_link::{MagicLink, NewMagicLink};
use async_trait::async_trait;
use sqlx::SqlitePool;

use super::{RepositoryError, RepositoryResult};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MagicLinkRepository: Send + Sync {
    /// Removes every unused link for the link's (email, board) pair and
    /// stores the new one, atomically.
    async fn replace_unused(&self, link: NewMagicLink) -> RepositoryResult<MagicLink>;
    async fn find_live_by_token(&self, token: &str, now: i64)
        -> RepositoryResult<Option<MagicLink>>;
}

pub struct SqliteMagicLinkRepository {
    pool: SqlitePool,
}

impl SqliteMagicLinkRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MagicLinkRepository for SqliteMagicLinkRepository {
    async fn replace_unused(&self, link: NewMagicLink) -> RepositoryResult<MagicLink> {
        let mut tx = self.pool.begin().await?;

        let superseded = MagicLink::delete_unused(&mut *tx, &link.email, &link.board_id).await?;
        if superseded > 0 {
            tracing::debug!(
                "Superseded {} unused magic link(s) for board {}",
                superseded,
                link.board_id
            );
        }

        let stored = match MagicLink::insert(&mut *tx, &link).await {
            Ok(stored) => stored,
            Err(e) if e.to_string().contains("UNIQUE") => {
                return Err(RepositoryError::AlreadyExists)
            }
            Err(e) => return Err(RepositoryError::Database(e)),
        };

        tx.commit().await?;

        Ok(stored)
    }

    async fn find_live_by_token(
        &self,
        token: &str,
        now: i64,
    ) -> RepositoryResult<Option<MagicLink>> {
        Ok(MagicLink::find_live_by_token(&self.pool, token, now).await?)
    }
}
