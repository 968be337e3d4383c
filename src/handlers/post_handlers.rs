use crate::error::Result;
use crate::models::{MagicLinkSession, PostWithVoters};
use crate::services::CreatePostRequest;
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct CreatePostResponse {
    pub post: PostWithVoters,
}

/// POST /posts/magic-link
///
/// Runs behind `magic_link_auth_middleware`; the session it attached decides
/// which board the post may land on.
pub async fn create_post_with_magic_link(
    State(app_state): State<AppState>,
    session: MagicLinkSession,
    payload: std::result::Result<Json<CreatePostRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatePostResponse>)> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::debug!("Ignoring unreadable post body: {}", rejection);
            CreatePostRequest::default()
        }
    };

    let post = app_state
        .post_service
        .create_with_magic_link(&session, request)
        .await?;

    Ok((StatusCode::CREATED, Json(CreatePostResponse { post })))
}
