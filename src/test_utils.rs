pub mod test_helpers {
    use crate::config::{AppConfig, Environment};
    use crate::models::{Board, NewBoard, SiteSettings};
    use crate::services::email_service::{
        EmailError, EmailService, MagicLinkEmail, NewPostNotificationEmail,
    };
    use crate::AppState;
    use async_trait::async_trait;
    use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
    use std::sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    };
    use std::time::Duration;
    use tempfile::NamedTempFile;
    use url::Url;
    use uuid::Uuid;

    pub const TEST_SECRET: &str = "integration-test-signing-key-0123456789abcdef";
    pub const TEST_WEB_URL: &str = "https://feedback.test";

    const FILE_DB_MAX_CONNECTIONS: u32 = 5;

    /// Create a new in-memory SQLite database for testing
    pub async fn create_test_db() -> Result<SqlitePool, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(":memory:")
            .await?;

        // Run migrations
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(pool)
    }

    /// Create a temporary file-based SQLite database for testing
    /// Several connections share it, so concurrent requests hold real
    /// overlapping transactions. Keep the returned file alive for the test.
    pub async fn create_test_db_file() -> Result<(SqlitePool, NamedTempFile), sqlx::Error> {
        let temp_file = NamedTempFile::new().map_err(sqlx::Error::Io)?;
        let db_path = temp_file
            .path()
            .to_str()
            .ok_or_else(|| sqlx::Error::Configuration("Invalid database path".into()))?;
        let database_url = format!("sqlite://{}", db_path);

        let pool = SqlitePoolOptions::new()
            .max_connections(FILE_DB_MAX_CONNECTIONS)
            .connect(&database_url)
            .await?;

        // Run migrations
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok((pool, temp_file))
    }

    pub fn test_config() -> Arc<AppConfig> {
        test_config_for(Environment::Test)
    }

    pub fn test_config_for(environment: Environment) -> Arc<AppConfig> {
        let web_url = Url::parse(TEST_WEB_URL).expect("test URL is valid");
        Arc::new(AppConfig::new(environment, web_url, TEST_SECRET))
    }

    /// Insert a board with a unique URL and return it
    pub async fn insert_test_board(pool: &SqlitePool, name: &str) -> Result<Board, sqlx::Error> {
        let url = format!("{}-{}", crate::helpers::slugify(name), Uuid::new_v4());
        Board::create(pool, &NewBoard::new(name, &url, "484d7c")).await
    }

    /// Insert a registered (password-holding) user and return its id
    pub async fn insert_test_user(
        pool: &SqlitePool,
        email: &str,
        username: &str,
    ) -> Result<String, sqlx::Error> {
        let user_id = Uuid::new_v4().to_string();
        sqlx::query(
            r#"
            INSERT INTO users (user_id, email, username, name, password, is_verified)
            VALUES (?, ?, ?, ?, ?, 1)
            "#,
        )
        .bind(&user_id)
        .bind(email)
        .bind(username)
        .bind(username)
        .bind("$argon2id$not-a-real-hash")
        .execute(pool)
        .await?;

        Ok(user_id)
    }

    pub async fn insert_test_settings(
        pool: &SqlitePool,
        settings: &SiteSettings,
    ) -> Result<(), sqlx::Error> {
        SiteSettings::insert(pool, settings).await
    }

    /// Email double that keeps every message and can be told to fail.
    #[derive(Default)]
    pub struct RecordingEmailService {
        magic_links: Mutex<Vec<MagicLinkEmail>>,
        notifications: Mutex<Vec<NewPostNotificationEmail>>,
        fail: AtomicBool,
    }

    impl RecordingEmailService {
        pub fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }

        pub fn set_failing(&self, fail: bool) {
            self.fail.store(fail, Ordering::SeqCst);
        }

        pub fn magic_links(&self) -> Vec<MagicLinkEmail> {
            self.magic_links.lock().expect("mutex poisoned").clone()
        }

        pub fn notifications(&self) -> Vec<NewPostNotificationEmail> {
            self.notifications.lock().expect("mutex poisoned").clone()
        }

        /// Polls until at least `count` notifications were recorded or a
        /// second has passed.
        pub async fn wait_for_notifications(&self, count: usize) -> Vec<NewPostNotificationEmail> {
            for _ in 0..100 {
                let sent = self.notifications();
                if sent.len() >= count {
                    return sent;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
            self.notifications()
        }

        fn check(&self) -> Result<(), EmailError> {
            if self.fail.load(Ordering::SeqCst) {
                Err(EmailError::SendFailed("recording service set to fail".to_string()))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl EmailService for RecordingEmailService {
        async fn send_magic_link_email(&self, email: &MagicLinkEmail) -> Result<(), EmailError> {
            self.check()?;
            self.magic_links
                .lock()
                .expect("mutex poisoned")
                .push(email.clone());
            Ok(())
        }

        async fn send_new_post_notification(
            &self,
            email: &NewPostNotificationEmail,
        ) -> Result<(), EmailError> {
            self.check()?;
            self.notifications
                .lock()
                .expect("mutex poisoned")
                .push(email.clone());
            Ok(())
        }
    }

    /// Application state over a fresh database, with a recording mailer
    pub async fn build_test_state(
        config: Arc<AppConfig>,
    ) -> Result<(AppState, Arc<RecordingEmailService>), sqlx::Error> {
        let pool = create_test_db().await?;
        Ok(build_test_state_with_pool(pool, config))
    }

    /// Application state over an existing pool, with a recording mailer
    pub fn build_test_state_with_pool(
        pool: SqlitePool,
        config: Arc<AppConfig>,
    ) -> (AppState, Arc<RecordingEmailService>) {
        let email_service = RecordingEmailService::new();
        let state = AppState::new(pool, config, email_service.clone());

        (state, email_service)
    }
}
