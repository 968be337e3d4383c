pub mod board_repository;
pub mod magic_link_repository;
pub mod post_repository;
pub mod settings_repository;
pub mod user_repository;

use sqlx::SqlitePool;
use std::sync::Arc;

pub use board_repository::{BoardRepository, SqliteBoardRepository};
pub use magic_link_repository::{MagicLinkRepository, SqliteMagicLinkRepository};
pub use post_repository::{PostRepository, SqlitePostRepository};
pub use settings_repository::{SettingsRepository, SqliteSettingsRepository};
pub use user_repository::{SqliteUserRepository, UserRepository};

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Record already exists")]
    AlreadyExists,
    #[error("Magic link already consumed")]
    AlreadyConsumed,
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// The storage seams services are built from.
#[derive(Clone)]
pub struct Repositories {
    pub magic_links: Arc<dyn MagicLinkRepository>,
    pub boards: Arc<dyn BoardRepository>,
    pub users: Arc<dyn UserRepository>,
    pub settings: Arc<dyn SettingsRepository>,
    pub posts: Arc<dyn PostRepository>,
}

impl Repositories {
    pub fn sqlite(pool: SqlitePool) -> Self {
        Self {
            magic_links: Arc::new(SqliteMagicLinkRepository::new(pool.clone())),
            boards: Arc::new(SqliteBoardRepository::new(pool.clone())),
            users: Arc::new(SqliteUserRepository::new(pool.clone())),
            settings: Arc::new(SqliteSettingsRepository::new(pool.clone())),
            posts: Arc::new(SqlitePostRepository::new(pool)),
        }
    }
}
