use crate::config::AppConfig;
use crate::helpers;
use crate::models::magic_link::{MagicLink, MagicLinkSession, NewMagicLink};
use crate::models::settings::DEFAULT_SITE_TITLE;
use crate::repositories::{
    BoardRepository, MagicLinkRepository, Repositories, RepositoryError, SettingsRepository,
    UserRepository,
};
use crate::services::email_service::{EmailError, EmailService, MagicLinkEmail};
use crate::services::token_service::{
    MagicLinkClaims, MagicLinkSessionClaims, TokenCodec, TokenError, TokenPurpose,
};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum MagicLinkError {
    #[error("Invalid email address")]
    InvalidEmail,
    #[error("Invalid board ID")]
    InvalidBoardId,
    #[error("Board not found")]
    BoardNotFound,
    #[error("Token is required")]
    MissingToken,
    #[error("Invalid or expired magic link")]
    InvalidToken,
    #[error("Token error: {0}")]
    TokenError(#[from] TokenError),
    #[error("Email error: {0}")]
    EmailError(#[from] EmailError),
    #[error("Repository error: {0}")]
    RepositoryError(#[from] RepositoryError),
    #[error("Corrupt magic link record: {0}")]
    CorruptRecord(String),
}

/// Outcome of a successful validation: the live link and a fresh session
/// token bound to it.
#[derive(Debug, Clone)]
pub struct ValidatedMagicLink {
    pub magic_link: MagicLink,
    pub session_token: String,
}

pub struct MagicLinkService {
    magic_links: Arc<dyn MagicLinkRepository>,
    boards: Arc<dyn BoardRepository>,
    users: Arc<dyn UserRepository>,
    settings: Arc<dyn SettingsRepository>,
    email_service: Arc<dyn EmailService>,
    codec: TokenCodec,
    config: Arc<AppConfig>,
}

impl MagicLinkService {
    pub fn new(
        repositories: &Repositories,
        email_service: Arc<dyn EmailService>,
        config: Arc<AppConfig>,
    ) -> Self {
        Self {
            magic_links: repositories.magic_links.clone(),
            boards: repositories.boards.clone(),
            users: repositories.users.clone(),
            settings: repositories.settings.clone(),
            email_service,
            codec: TokenCodec::new(&config.secret_key),
            config,
        }
    }

    /// Issues a link for `email` on `board_id` and emails it.
    ///
    /// Any earlier unused link for the same pair is superseded. A stored link
    /// is kept even when the email cannot be delivered.
    pub async fn request_link(
        &self,
        email: Option<&str>,
        board_id: Option<&str>,
    ) -> Result<MagicLink, MagicLinkError> {
        let email = email.unwrap_or_default();
        if !helpers::is_valid_email(email) {
            return Err(MagicLinkError::InvalidEmail);
        }
        let email = helpers::normalize_email(email);

        let board_id = board_id
            .and_then(helpers::parse_uuid)
            .ok_or(MagicLinkError::InvalidBoardId)?;

        let board = self
            .boards
            .find_by_id(&board_id.to_string())
            .await?
            .ok_or(MagicLinkError::BoardNotFound)?;

        match self.issue(&email, board_id, &board.name).await {
            Ok(link) => Ok(link),
            Err(e) => {
                tracing::error!("Failed to generate magic link for board {}: {}", board_id, e);
                Err(e)
            }
        }
    }

    async fn issue(
        &self,
        email: &str,
        board_id: Uuid,
        board_name: &str,
    ) -> Result<MagicLink, MagicLinkError> {
        let token = self.codec.sign_magic_link(&MagicLinkClaims {
            email: email.to_string(),
            board_id,
            purpose: TokenPurpose::MagicLink,
        })?;
        let expires_at = (Utc::now() + TokenPurpose::MagicLink.lifetime()).timestamp();

        let existing_user = self.users.find_by_email(email).await?;

        let link = self
            .magic_links
            .replace_unused(NewMagicLink {
                id: Uuid::new_v4().to_string(),
                email: email.to_string(),
                board_id: board_id.to_string(),
                token: token.clone(),
                user_id: existing_user.map(|user| user.user_id),
                expires_at,
            })
            .await?;

        let site_title = self
            .settings
            .load()
            .await?
            .map(|settings| settings.title)
            .filter(|title| !title.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SITE_TITLE.to_string());

        let message = MagicLinkEmail {
            from: self.config.sender_address(),
            to: email.to_string(),
            site_title,
            board_name: if board_name.trim().is_empty() {
                DEFAULT_SITE_TITLE.to_string()
            } else {
                board_name.to_string()
            },
            magic_link: self.config.submission_link(&token),
            site_url: self.config.web_origin(),
            domain: self.config.web_host().to_string(),
        };

        tracing::info!("Sending magic link email for board {}", board_id);
        self.email_service.send_magic_link_email(&message).await?;

        Ok(link)
    }

    /// Exchanges a link token for a one-hour session token. Does not consume
    /// the link.
    pub async fn validate_link(&self, token: &str) -> Result<ValidatedMagicLink, MagicLinkError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(MagicLinkError::MissingToken);
        }

        let now = Utc::now().timestamp();
        let magic_link = self
            .magic_links
            .find_live_by_token(token, now)
            .await
            .map_err(|e| {
                tracing::error!("Failed to validate magic link: {}", e);
                MagicLinkError::from(e)
            })?
            .ok_or(MagicLinkError::InvalidToken)?;

        let claims = MagicLinkSessionClaims {
            email: magic_link.email.clone(),
            board_id: parse_stored_id(&magic_link.board_id)?,
            magic_link_id: parse_stored_id(&magic_link.id)?,
            purpose: TokenPurpose::MagicLinkSession,
        };
        let session_token = self.codec.sign_session(&claims)?;

        Ok(ValidatedMagicLink {
            magic_link,
            session_token,
        })
    }

    /// Verifies a bearer session token.
    pub fn authorize_session(&self, token: &str) -> Result<MagicLinkSession, TokenError> {
        let claims = self.codec.verify_session(token)?;

        Ok(MagicLinkSession {
            email: claims.email,
            board_id: claims.board_id,
            magic_link_id: claims.magic_link_id,
        })
    }
}

fn parse_stored_id(value: &str) -> Result<Uuid, MagicLinkError> {
    Uuid::parse_str(value).map_err(|_| MagicLinkError::CorruptRecord(value.to_string()))
}
