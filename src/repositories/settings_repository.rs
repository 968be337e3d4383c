use crate::models::settings::SiteSettings;
use async_trait::async_trait;
use sqlx::SqlitePool;

use super::RepositoryResult;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    async fn load(&self) -> RepositoryResult<Option<SiteSettings>>;
}

pub struct SqliteSettingsRepository {
    pool: SqlitePool,
}

impl SqliteSettingsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SettingsRepository for SqliteSettingsRepository {
    async fn load(&self) -> RepositoryResult<Option<SiteSettings>> {
        Ok(SiteSettings::load(&self.pool).await?)
    }
}
