use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqliteExecutor};

pub const DEFAULT_SITE_TITLE: &str = "Feedback";

/// The single-row site settings table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteSettings {
    pub title: String,
    pub description: Option<String>,
    pub accent_color: String,
    pub allow_signup: bool,
    pub admin_notification_email: Option<String>,
    pub notify_on_new_post: bool,
}

impl SiteSettings {
    /// Admin address to notify about new posts, if notifications are on.
    pub fn notification_recipient(&self) -> Option<&str> {
        if !self.notify_on_new_post {
            return None;
        }
        self.admin_notification_email
            .as_deref()
            .map(str::trim)
            .filter(|email| !email.is_empty())
    }

    pub async fn load<'e, E: SqliteExecutor<'e>>(executor: E) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, SiteSettings>(
            r#"
            SELECT title, description, accent_color, allow_signup,
                   admin_notification_email, notify_on_new_post
            FROM settings
            LIMIT 1
            "#,
        )
        .fetch_optional(executor)
        .await
    }

    pub async fn insert<'e, E: SqliteExecutor<'e>>(
        executor: E,
        settings: &SiteSettings,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO settings (title, description, accent_color, allow_signup,
                                  admin_notification_email, notify_on_new_post)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&settings.title)
        .bind(&settings.description)
        .bind(&settings.accent_color)
        .bind(settings.allow_signup)
        .bind(&settings.admin_notification_email)
        .bind(settings.notify_on_new_post)
        .execute(executor)
        .await?;

        Ok(())
    }

    pub async fn update_notifications<'e, E: SqliteExecutor<'e>>(
        executor: E,
        admin_email: Option<&str>,
        enabled: bool,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE settings SET admin_notification_email = ?, notify_on_new_post = ?",
        )
        .bind(admin_email)
        .bind(enabled)
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn update_title<'e, E: SqliteExecutor<'e>>(
        executor: E,
        title: &str,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("UPDATE settings SET title = ?")
            .bind(title)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            title: DEFAULT_SITE_TITLE.to_string(),
            description: Some("Share your ideas and help us build better products".to_string()),
            accent_color: "484d7c".to_string(),
            allow_signup: false,
            admin_notification_email: None,
            notify_on_new_post: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recipient_requires_flag_and_address() {
        let mut settings = SiteSettings::default();
        assert_eq!(settings.notification_recipient(), None);

        settings.admin_notification_email = Some("admin@example.com".to_string());
        assert_eq!(settings.notification_recipient(), None);

        settings.notify_on_new_post = true;
        assert_eq!(settings.notification_recipient(), Some("admin@example.com"));

        settings.admin_notification_email = Some("   ".to_string());
        assert_eq!(settings.notification_recipient(), None);
    }
}
