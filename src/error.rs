use crate::services::{MagicLinkError, PostServiceError, TokenError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;

// Type alias for Result with our AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Every failure the HTTP API can report. Each variant has one status and
/// one machine-readable code; internal variants keep their source for the
/// log and render as an opaque `SERVER_ERROR`.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid email address")]
    EmailInvalid,

    #[error("Invalid board ID")]
    InvalidBoardId,

    #[error("Board not found")]
    BoardNotFound,

    #[error("Token is required")]
    MissingToken,

    #[error("Invalid or expired magic link")]
    InvalidMagicLink,

    #[error("Authorization header is required")]
    InvalidAuthHeader,

    #[error("Authorization header must be 'Bearer <token>'")]
    InvalidAuthHeaderFormat,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Invalid token type")]
    InvalidTokenType,

    #[error("Invalid magic link session")]
    InvalidSession,

    #[error("This magic link is not authorized for this board")]
    BoardMismatch,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::EmailInvalid
            | AppError::InvalidBoardId
            | AppError::MissingToken
            | AppError::InvalidAuthHeader => StatusCode::BAD_REQUEST,
            AppError::InvalidMagicLink
            | AppError::InvalidAuthHeaderFormat
            | AppError::InvalidToken
            | AppError::InvalidTokenType
            | AppError::InvalidSession => StatusCode::UNAUTHORIZED,
            AppError::BoardMismatch => StatusCode::FORBIDDEN,
            AppError::BoardNotFound => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::EmailInvalid => "EMAIL_INVALID",
            AppError::InvalidBoardId => "INVALID_BOARD_ID",
            AppError::BoardNotFound => "BOARD_NOT_FOUND",
            AppError::MissingToken => "MISSING_TOKEN",
            AppError::InvalidMagicLink | AppError::InvalidToken => "INVALID_TOKEN",
            AppError::InvalidAuthHeader => "INVALID_AUTH_HEADER",
            AppError::InvalidAuthHeaderFormat => "INVALID_AUTH_HEADER_FORMAT",
            AppError::InvalidTokenType => "INVALID_TOKEN_TYPE",
            AppError::InvalidSession => "INVALID_SESSION",
            AppError::BoardMismatch => "BOARD_MISMATCH",
            AppError::Internal(_) => "SERVER_ERROR",
        }
    }

    fn is_internal(&self) -> bool {
        matches!(self, AppError::Internal(_))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if self.is_internal() {
            tracing::error!("Request failed: {}", self);
            "Something went wrong. Please try again later".to_string()
        } else {
            self.to_string()
        };

        let body = json!({
            "message": message,
            "code": self.code(),
        });

        (status, Json(body)).into_response()
    }
}

impl From<MagicLinkError> for AppError {
    fn from(err: MagicLinkError) -> Self {
        match err {
            MagicLinkError::InvalidEmail => AppError::EmailInvalid,
            MagicLinkError::InvalidBoardId => AppError::InvalidBoardId,
            MagicLinkError::BoardNotFound => AppError::BoardNotFound,
            MagicLinkError::MissingToken => AppError::MissingToken,
            MagicLinkError::InvalidToken => AppError::InvalidMagicLink,
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<PostServiceError> for AppError {
    fn from(err: PostServiceError) -> Self {
        match err {
            PostServiceError::BoardMismatch => AppError::BoardMismatch,
            PostServiceError::SessionConsumed => AppError::InvalidSession,
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Invalid | TokenError::Expired => AppError::InvalidToken,
            TokenError::WrongPurpose { .. } => AppError::InvalidTokenType,
            TokenError::Signing(_) => AppError::Internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::RepositoryError;

    #[test]
    fn codes_and_statuses_line_up() {
        let cases = [
            (AppError::EmailInvalid, StatusCode::BAD_REQUEST, "EMAIL_INVALID"),
            (AppError::BoardNotFound, StatusCode::NOT_FOUND, "BOARD_NOT_FOUND"),
            (AppError::InvalidMagicLink, StatusCode::UNAUTHORIZED, "INVALID_TOKEN"),
            (AppError::InvalidAuthHeader, StatusCode::BAD_REQUEST, "INVALID_AUTH_HEADER"),
            (AppError::InvalidSession, StatusCode::UNAUTHORIZED, "INVALID_SESSION"),
            (AppError::BoardMismatch, StatusCode::FORBIDDEN, "BOARD_MISMATCH"),
            (
                AppError::Internal("boom".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
                "SERVER_ERROR",
            ),
        ];

        for (err, status, code) in cases {
            assert_eq!(err.status(), status);
            assert_eq!(err.code(), code);
        }
    }

    #[test]
    fn token_errors_split_between_invalid_and_wrong_type() {
        assert_eq!(AppError::from(TokenError::Expired).code(), "INVALID_TOKEN");
        assert_eq!(
            AppError::from(TokenError::WrongPurpose {
                expected: "magicLinkSession",
                found: Some("magicLink".to_string()),
            })
            .code(),
            "INVALID_TOKEN_TYPE"
        );
    }

    #[test]
    fn consumed_session_is_invalid_session() {
        let err: AppError = PostServiceError::from(RepositoryError::AlreadyConsumed).into();
        assert_eq!(err.code(), "INVALID_SESSION");

        let err: AppError =
            PostServiceError::from(RepositoryError::Database(sqlx::Error::PoolClosed)).into();
        assert_eq!(err.code(), "SERVER_ERROR");
    }

    #[tokio::test]
    async fn internal_errors_do_not_leak_detail() {
        let response = AppError::Internal("secret detail".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["code"], "SERVER_ERROR");
        assert!(!body["message"].as_str().unwrap().contains("secret"));
    }
}
