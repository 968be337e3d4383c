use crate::error::Result;
use crate::models::MagicLink;
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MagicLinkRequest {
    pub email: Option<String>,
    pub board_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MagicLinkRequestResponse {
    pub success: bool,
    pub message: String,
    /// The stored link record, echoed only outside production.
    #[serde(rename = "__token", skip_serializing_if = "Option::is_none")]
    pub debug_token: Option<MagicLink>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ValidateMagicLinkRequest {
    pub token: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateMagicLinkResponse {
    pub valid: bool,
    pub board_id: String,
    pub email: String,
    pub session_token: String,
}

/// An unreadable body is treated like an empty one so the caller gets the
/// same field-level error code either way.
fn body_or_default<T: Default>(payload: std::result::Result<Json<T>, JsonRejection>) -> T {
    match payload {
        Ok(Json(body)) => body,
        Err(rejection) => {
            tracing::debug!("Ignoring unreadable request body: {}", rejection);
            T::default()
        }
    }
}

/// POST /auth/magic-link/request
pub async fn request_magic_link(
    State(app_state): State<AppState>,
    payload: std::result::Result<Json<MagicLinkRequest>, JsonRejection>,
) -> Result<Json<MagicLinkRequestResponse>> {
    let body = body_or_default(payload);

    let magic_link = app_state
        .magic_link_service
        .request_link(body.email.as_deref(), body.board_id.as_deref())
        .await?;

    let debug_token = app_state
        .config
        .environment
        .exposes_debug_tokens()
        .then_some(magic_link);

    Ok(Json(MagicLinkRequestResponse {
        success: true,
        message: "Magic link sent to your email".to_string(),
        debug_token,
    }))
}

/// POST /auth/magic-link/validate
pub async fn validate_magic_link(
    State(app_state): State<AppState>,
    payload: std::result::Result<Json<ValidateMagicLinkRequest>, JsonRejection>,
) -> Result<Json<ValidateMagicLinkResponse>> {
    let body = body_or_default(payload);

    let validated = app_state
        .magic_link_service
        .validate_link(body.token.as_deref().unwrap_or_default())
        .await?;

    Ok(Json(ValidateMagicLinkResponse {
        valid: true,
        board_id: validated.magic_link.board_id,
        email: validated.magic_link.email,
        session_token: validated.session_token,
    }))
}
