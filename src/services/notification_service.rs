use crate::config::AppConfig;
use crate::models::settings::DEFAULT_SITE_TITLE;
use crate::repositories::{RepositoryError, SettingsRepository};
use crate::services::email_service::{EmailError, EmailService, NewPostNotificationEmail};
use std::sync::Arc;
use tokio::task::JoinHandle;

const UNKNOWN_BOARD: &str = "Unknown Board";

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("Failed to load settings: {0}")]
    Settings(#[from] RepositoryError),
    #[error("Failed to send notification: {0}")]
    Email(#[from] EmailError),
}

/// A post that just landed on a board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPostEvent {
    pub post_title: String,
    pub post_slug: String,
    pub board_name: Option<String>,
    pub submitter_email: String,
}

/// Tells the site admin about new posts, when they asked to be told.
pub struct NotificationService {
    settings: Arc<dyn SettingsRepository>,
    email_service: Arc<dyn EmailService>,
    config: Arc<AppConfig>,
}

impl NotificationService {
    pub fn new(
        settings: Arc<dyn SettingsRepository>,
        email_service: Arc<dyn EmailService>,
        config: Arc<AppConfig>,
    ) -> Self {
        Self {
            settings,
            email_service,
            config,
        }
    }

    /// Sends the admin notification for `event`. Returns `Ok(false)` when
    /// notifications are switched off or no admin address is configured.
    pub async fn notify_new_post(&self, event: &NewPostEvent) -> Result<bool, NotificationError> {
        let Some(settings) = self.settings.load().await? else {
            return Ok(false);
        };
        let Some(recipient) = settings.notification_recipient() else {
            return Ok(false);
        };

        let site_title = if settings.title.trim().is_empty() {
            DEFAULT_SITE_TITLE.to_string()
        } else {
            settings.title.clone()
        };

        let message = NewPostNotificationEmail {
            from: self.config.sender_address(),
            to: recipient.to_string(),
            site_title,
            post_title: event.post_title.clone(),
            post_url: self.config.post_link(&event.post_slug),
            board_name: event
                .board_name
                .clone()
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| UNKNOWN_BOARD.to_string()),
            submitter_email: event.submitter_email.clone(),
        };

        self.email_service
            .send_new_post_notification(&message)
            .await?;

        tracing::info!("Sent new post notification for '{}'", event.post_slug);
        Ok(true)
    }

    /// Runs [`notify_new_post`](Self::notify_new_post) on a detached task.
    /// Failures are logged and dropped.
    pub fn dispatch(self: &Arc<Self>, event: NewPostEvent) -> JoinHandle<()> {
        let service = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(e) = service.notify_new_post(&event).await {
                tracing::error!(
                    "Failed to send new post notification for '{}': {}",
                    event.post_slug,
                    e
                );
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Environment;
    use crate::models::SiteSettings;
    use crate::repositories::settings_repository::MockSettingsRepository;
    use crate::services::email_service::MockEmailService;
    use url::Url;

    fn event() -> NewPostEvent {
        NewPostEvent {
            post_title: "Dark mode".to_string(),
            post_slug: "dark-mode-abc".to_string(),
            board_name: None,
            submitter_email: "a@b.com".to_string(),
        }
    }

    fn service(settings: MockSettingsRepository) -> NotificationService {
        NotificationService::new(
            Arc::new(settings),
            Arc::new(MockEmailService::new()),
            Arc::new(AppConfig::new(
                Environment::Test,
                Url::parse("https://feedback.test").unwrap(),
                "notification-test-secret-key-0123456789",
            )),
        )
    }

    #[tokio::test]
    async fn skips_when_no_settings_row() {
        let mut settings = MockSettingsRepository::new();
        settings.expect_load().returning(|| Ok(None));

        assert!(!service(settings).notify_new_post(&event()).await.unwrap());
    }

    #[tokio::test]
    async fn skips_when_disabled() {
        let mut settings = MockSettingsRepository::new();
        settings.expect_load().returning(|| {
            Ok(Some(SiteSettings {
                admin_notification_email: Some("admin@feedback.test".to_string()),
                notify_on_new_post: false,
                ..SiteSettings::default()
            }))
        });

        assert!(!service(settings).notify_new_post(&event()).await.unwrap());
    }

    #[tokio::test]
    async fn sends_when_enabled() {
        let mut settings = MockSettingsRepository::new();
        settings.expect_load().returning(|| {
            Ok(Some(SiteSettings {
                admin_notification_email: Some("admin@feedback.test".to_string()),
                notify_on_new_post: true,
                ..SiteSettings::default()
            }))
        });

        assert!(service(settings).notify_new_post(&event()).await.unwrap());
    }

    #[tokio::test]
    async fn dispatch_swallows_failures() {
        let mut settings = MockSettingsRepository::new();
        settings
            .expect_load()
            .returning(|| Err(RepositoryError::Database(sqlx::Error::PoolClosed)));

        let service = Arc::new(service(settings));
        service.dispatch(event()).await.unwrap();
    }
}
