use crate::helpers;
use crate::models::{MagicLinkSession, PostWithVoters};
use crate::repositories::post_repository::{AnonymousAuthor, MagicLinkSubmission};
use crate::repositories::{BoardRepository, PostRepository, Repositories, RepositoryError};
use crate::services::notification_service::{NewPostEvent, NotificationService};
use serde::Deserialize;
use std::sync::Arc;

const DEFAULT_POST_TITLE: &str = "new post";

#[derive(Debug, thiserror::Error)]
pub enum PostServiceError {
    #[error("Board ID does not match the magic link session")]
    BoardMismatch,
    #[error("Magic link session has already been used")]
    SessionConsumed,
    #[error("Repository error: {0}")]
    RepositoryError(RepositoryError),
}

impl From<RepositoryError> for PostServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::AlreadyConsumed => PostServiceError::SessionConsumed,
            other => PostServiceError::RepositoryError(other),
        }
    }
}

/// Body of a magic-link post submission.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub title: Option<String>,
    pub content_markdown: Option<String>,
    pub board_id: Option<String>,
    #[serde(default)]
    pub screenshots: Option<Vec<String>>,
}

pub struct PostService {
    posts: Arc<dyn PostRepository>,
    boards: Arc<dyn BoardRepository>,
    notifications: Arc<NotificationService>,
}

impl PostService {
    pub fn new(repositories: &Repositories, notifications: Arc<NotificationService>) -> Self {
        Self {
            posts: repositories.posts.clone(),
            boards: repositories.boards.clone(),
            notifications,
        }
    }

    /// Creates a post on behalf of the session's email and consumes the
    /// session's magic link. The admin notification goes out in the
    /// background once the post is committed.
    pub async fn create_with_magic_link(
        &self,
        session: &MagicLinkSession,
        request: CreatePostRequest,
    ) -> Result<PostWithVoters, PostServiceError> {
        let requested_board = request.board_id.as_deref().and_then(helpers::parse_uuid);
        if requested_board != Some(session.board_id) {
            tracing::warn!(
                "Magic link post rejected: board {:?} does not match session board {}",
                request.board_id,
                session.board_id
            );
            return Err(PostServiceError::BoardMismatch);
        }
        let board_id = session.board_id.to_string();

        let title = request
            .title
            .map(|title| title.trim().to_string())
            .filter(|title| !title.is_empty())
            .unwrap_or_else(|| DEFAULT_POST_TITLE.to_string());
        let slug_id = helpers::generate_slug_id();
        let slug = helpers::post_slug(&title, &slug_id);

        let board = self.boards.find_by_id(&board_id).await?;
        let view_voters = board.as_ref().map(|board| board.view_voters).unwrap_or(true);

        let email = helpers::normalize_email(&session.email);
        let submission = MagicLinkSubmission {
            magic_link_id: session.magic_link_id.to_string(),
            author: AnonymousAuthor {
                avatar: helpers::gravatar_url(&email),
                username_base: helpers::username_base(&email),
                email: email.clone(),
            },
            title,
            slug,
            slug_id,
            content_markdown: request.content_markdown,
            board_id: board_id.clone(),
            screenshots: request.screenshots.unwrap_or_default(),
            view_voters,
        };

        let created = self.posts.create_with_magic_link(submission).await?;
        if created.author_created {
            tracing::info!(
                "Created anonymous user {} for magic link submission",
                created.author.username
            );
        }
        tracing::info!(
            "Post {} created via magic link on board {}",
            created.post.slug,
            board_id
        );

        self.notifications.dispatch(NewPostEvent {
            post_title: created.post.title.clone(),
            post_slug: created.post.slug.clone(),
            board_name: board.map(|board| board.name),
            submitter_email: email,
        });

        Ok(PostWithVoters {
            post: created.post,
            voters: created.voters,
        })
    }
}
