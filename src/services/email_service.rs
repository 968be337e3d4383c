use async_trait::async_trait;
use lettre::{
    message::MultiPart, transport::smtp::authentication::Credentials, AsyncSmtpTransport,
    AsyncTransport, Message, Tokio1Executor,
};
use std::{env, sync::Arc};

#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    #[error("Failed to build email message: {0}")]
    MessageBuild(String),
    #[error("Failed to send email: {0}")]
    SendFailed(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Submission link sent to a visitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MagicLinkEmail {
    pub from: String,
    pub to: String,
    pub site_title: String,
    pub board_name: String,
    pub magic_link: String,
    pub site_url: String,
    pub domain: String,
}

impl MagicLinkEmail {
    pub fn subject(&self) -> String {
        format!("{} - Submit your feedback", self.site_title)
    }

    pub fn text_body(&self) -> String {
        format!(
            "Hi,\n\n\
             Use the link below to submit your feedback to \"{board}\" on {site}.\n\n\
             {link}\n\n\
             This link expires in 24 hours and can be used for one submission. \
             If you didn't request it, you can ignore this email.\n\n\
             {domain}\n",
            board = self.board_name,
            site = self.site_title,
            link = self.magic_link,
            domain = self.domain,
        )
    }

    pub fn html_body(&self) -> String {
        format!(
            r#"
<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
</head>
<body style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">
    <h1 style="color: #333;">{site}</h1>
    <p>Click the button below to submit your feedback to <strong>{board}</strong>:</p>
    <p style="text-align: center; margin: 30px 0;">
        <a href="{link}" style="background-color: #484d7c; color: white; padding: 12px 24px; text-decoration: none; border-radius: 4px; display: inline-block;">Submit feedback</a>
    </p>
    <p style="color: #666; font-size: 14px;">Or copy and paste this link into your browser:</p>
    <p style="color: #666; font-size: 14px; word-break: break-all;">{link}</p>
    <p style="color: #999; font-size: 12px; margin-top: 40px;">This link will expire in 24 hours. If you didn't request it, you can safely ignore this email.</p>
    <p style="color: #999; font-size: 12px;"><a href="{url}" style="color: #999;">{domain}</a></p>
</body>
</html>
"#,
            site = self.site_title,
            board = self.board_name,
            link = self.magic_link,
            url = self.site_url,
            domain = self.domain,
        )
    }
}

/// Admin notice about a freshly submitted post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPostNotificationEmail {
    pub from: String,
    pub to: String,
    pub site_title: String,
    pub post_title: String,
    pub post_url: String,
    pub board_name: String,
    pub submitter_email: String,
}

impl NewPostNotificationEmail {
    pub fn subject(&self) -> String {
        format!("[{}] New feedback: {}", self.site_title, self.post_title)
    }

    pub fn text_body(&self) -> String {
        format!(
            "New feedback was submitted to \"{board}\".\n\n\
             Title: {title}\n\
             From: {submitter}\n\n\
             {url}\n",
            board = self.board_name,
            title = self.post_title,
            submitter = self.submitter_email,
            url = self.post_url,
        )
    }

    pub fn html_body(&self) -> String {
        format!(
            r#"
<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
</head>
<body style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">
    <h1 style="color: #333;">New feedback on {site}</h1>
    <div style="background-color: #f5f5f5; padding: 15px; border-radius: 4px; margin: 20px 0;">
        <p style="margin: 5px 0;"><strong>Title:</strong> {title}</p>
        <p style="margin: 5px 0;"><strong>Board:</strong> {board}</p>
        <p style="margin: 5px 0;"><strong>From:</strong> {submitter}</p>
    </div>
    <p style="text-align: center; margin: 30px 0;">
        <a href="{url}" style="background-color: #484d7c; color: white; padding: 12px 24px; text-decoration: none; border-radius: 4px; display: inline-block;">View post</a>
    </p>
</body>
</html>
"#,
            site = self.site_title,
            title = self.post_title,
            board = self.board_name,
            submitter = self.submitter_email,
            url = self.post_url,
        )
    }
}

#[async_trait]
pub trait EmailService: Send + Sync {
    async fn send_magic_link_email(&self, email: &MagicLinkEmail) -> Result<(), EmailError>;
    async fn send_new_post_notification(
        &self,
        email: &NewPostNotificationEmail,
    ) -> Result<(), EmailError>;
}

/// Logs emails instead of sending them.
#[derive(Default)]
pub struct MockEmailService;

impl MockEmailService {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EmailService for MockEmailService {
    async fn send_magic_link_email(&self, email: &MagicLinkEmail) -> Result<(), EmailError> {
        tracing::info!("📧 [MOCK EMAIL] Magic link to: {}", email.to);
        tracing::info!("   Subject: {}", email.subject());
        tracing::info!("   Magic link: {}", email.magic_link);
        tracing::info!("   ---");
        Ok(())
    }

    async fn send_new_post_notification(
        &self,
        email: &NewPostNotificationEmail,
    ) -> Result<(), EmailError> {
        tracing::info!("📧 [MOCK EMAIL] New post notification to: {}", email.to);
        tracing::info!("   Subject: {}", email.subject());
        tracing::info!("   Post: {}", email.post_url);
        tracing::info!("   ---");
        Ok(())
    }
}

pub struct SmtpEmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpEmailService {
    pub fn new() -> Result<Self, EmailError> {
        let smtp_host = env::var("SMTP_HOST")
            .map_err(|_| EmailError::ConfigError("SMTP_HOST not set".to_string()))?;
        let smtp_port = env::var("SMTP_PORT")
            .unwrap_or_else(|_| "587".to_string())
            .parse::<u16>()
            .map_err(|_| EmailError::ConfigError("Invalid SMTP_PORT".to_string()))?;
        let smtp_username = env::var("SMTP_USERNAME")
            .map_err(|_| EmailError::ConfigError("SMTP_USERNAME not set".to_string()))?;
        let smtp_password = env::var("SMTP_PASSWORD")
            .map_err(|_| EmailError::ConfigError("SMTP_PASSWORD not set".to_string()))?;

        let encryption = env::var("SMTP_ENCRYPTION").unwrap_or_else(|_| "starttls".to_string());

        let credentials = Credentials::new(smtp_username, smtp_password);

        let mailer = match encryption.to_lowercase().as_str() {
            "tls" => AsyncSmtpTransport::<Tokio1Executor>::relay(&smtp_host)
                .map_err(|e| EmailError::ConfigError(format!("SMTP relay error: {}", e)))?
                .port(smtp_port)
                .credentials(credentials)
                .build(),
            "starttls" => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&smtp_host)
                .map_err(|e| EmailError::ConfigError(format!("SMTP starttls error: {}", e)))?
                .port(smtp_port)
                .credentials(credentials)
                .build(),
            "none" => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&smtp_host)
                .port(smtp_port)
                .credentials(credentials)
                .build(),
            _ => {
                return Err(EmailError::ConfigError(format!(
                    "Invalid SMTP_ENCRYPTION value: {}. Use 'tls', 'starttls', or 'none'",
                    encryption
                )))
            }
        };

        Ok(Self { mailer })
    }

    async fn deliver(
        &self,
        from: &str,
        to: &str,
        subject: String,
        text: String,
        html: String,
    ) -> Result<(), EmailError> {
        let email = Message::builder()
            .from(
                from.parse()
                    .map_err(|e| EmailError::MessageBuild(format!("Invalid from address: {}", e)))?,
            )
            .to(to
                .parse()
                .map_err(|e| EmailError::MessageBuild(format!("Invalid to address: {}", e)))?)
            .subject(subject)
            .multipart(MultiPart::alternative_plain_html(text, html))
            .map_err(|e| EmailError::MessageBuild(e.to_string()))?;

        self.mailer
            .send(email)
            .await
            .map_err(|e| EmailError::SendFailed(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl EmailService for SmtpEmailService {
    async fn send_magic_link_email(&self, email: &MagicLinkEmail) -> Result<(), EmailError> {
        self.deliver(
            &email.from,
            &email.to,
            email.subject(),
            email.text_body(),
            email.html_body(),
        )
        .await
    }

    async fn send_new_post_notification(
        &self,
        email: &NewPostNotificationEmail,
    ) -> Result<(), EmailError> {
        self.deliver(
            &email.from,
            &email.to,
            email.subject(),
            email.text_body(),
            email.html_body(),
        )
        .await
    }
}

pub fn create_email_service() -> Arc<dyn EmailService> {
    if env::var("SMTP_HOST").is_ok() {
        match SmtpEmailService::new() {
            Ok(service) => {
                tracing::info!("Using SMTP email service");
                Arc::new(service)
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to initialize SMTP email service: {}. Falling back to mock service",
                    e
                );
                Arc::new(MockEmailService::new())
            }
        }
    } else {
        tracing::info!(
            "SMTP not configured. Using mock email service (emails will be logged to console)"
        );
        Arc::new(MockEmailService::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn magic_link_email_mentions_board_and_link() {
        let email = MagicLinkEmail {
            from: "noreply@feedback.test".to_string(),
            to: "a@b.com".to_string(),
            site_title: "Acme Feedback".to_string(),
            board_name: "Bug Reports".to_string(),
            magic_link: "https://feedback.test/feedback/submit?token=abc".to_string(),
            site_url: "https://feedback.test".to_string(),
            domain: "feedback.test".to_string(),
        };

        assert_eq!(email.subject(), "Acme Feedback - Submit your feedback");
        assert!(email.text_body().contains("Bug Reports"));
        assert!(email.text_body().contains(&email.magic_link));
        assert!(email.html_body().contains(&email.magic_link));
    }

    #[test]
    fn notification_subject_carries_site_and_post_title() {
        let email = NewPostNotificationEmail {
            from: "noreply@feedback.test".to_string(),
            to: "admin@feedback.test".to_string(),
            site_title: "Acme".to_string(),
            post_title: "Add dark mode".to_string(),
            post_url: "https://feedback.test/posts/add-dark-mode-x".to_string(),
            board_name: "Feature Requests".to_string(),
            submitter_email: "a@b.com".to_string(),
        };

        assert_eq!(email.subject(), "[Acme] New feedback: Add dark mode");
        assert!(email.html_body().contains("Feature Requests"));
        assert!(email.text_body().contains("a@b.com"));
    }

    #[tokio::test]
    async fn mock_service_accepts_everything() {
        let service = MockEmailService::new();
        let email = MagicLinkEmail {
            from: "noreply@localhost".to_string(),
            to: "a@b.com".to_string(),
            site_title: "Feedback".to_string(),
            board_name: "Feedback".to_string(),
            magic_link: "http://localhost:3000/feedback/submit?token=t".to_string(),
            site_url: "http://localhost:3000".to_string(),
            domain: "localhost".to_string(),
        };
        assert!(service.send_magic_link_email(&email).await.is_ok());
    }
}
