pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod helpers;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

// Make test_utils available for both unit tests and integration tests
pub mod test_utils;

use config::AppConfig;
use repositories::Repositories;
use services::{EmailService, MagicLinkService, NotificationService, PostService};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub magic_link_service: Arc<MagicLinkService>,
    pub post_service: Arc<PostService>,
    pub pool: sqlx::SqlitePool,
}

impl AppState {
    /// Wires the SQLite repositories and the services on top of them.
    pub fn new(
        pool: sqlx::SqlitePool,
        config: Arc<AppConfig>,
        email_service: Arc<dyn EmailService>,
    ) -> Self {
        let repositories = Repositories::sqlite(pool.clone());

        let magic_link_service = Arc::new(MagicLinkService::new(
            &repositories,
            email_service.clone(),
            config.clone(),
        ));
        let notification_service = Arc::new(NotificationService::new(
            repositories.settings.clone(),
            email_service,
            config.clone(),
        ));
        let post_service = Arc::new(PostService::new(&repositories, notification_service));

        Self {
            config,
            magic_link_service,
            post_service,
            pool,
        }
    }
}
