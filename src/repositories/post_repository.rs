use crate::helpers;
use crate::models::{
    magic_link::MagicLink,
    post::{NewPost, Post},
    role::{Role, EVERYONE_ROLE},
    user::{NewAnonymousUser, User},
    vote::{Vote, VoteSummary},
};
use async_trait::async_trait;
use sqlx::{SqliteConnection, SqlitePool};
use uuid::Uuid;

use super::{RepositoryError, RepositoryResult};

const MAX_USERNAME_ATTEMPTS: usize = 10;

/// Who to attribute a magic-link post to when no account matches the email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnonymousAuthor {
    pub email: String,
    pub avatar: String,
    pub username_base: String,
}

/// Everything needed to turn a validated magic-link session into a post.
#[derive(Debug, Clone)]
pub struct MagicLinkSubmission {
    pub magic_link_id: String,
    pub author: AnonymousAuthor,
    pub title: String,
    pub slug: String,
    pub slug_id: String,
    pub content_markdown: Option<String>,
    pub board_id: String,
    pub screenshots: Vec<String>,
    /// Whether the board lists its voters in the returned summary.
    pub view_voters: bool,
}

#[derive(Debug, Clone)]
pub struct CreatedPost {
    pub post: Post,
    pub author: User,
    pub author_created: bool,
    pub voters: VoteSummary,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Claims the magic link, resolves or creates the author, inserts the
    /// post and the author's vote, and reads back the vote summary. All or
    /// nothing: when the link is already consumed nothing is written and
    /// `AlreadyConsumed` is returned.
    async fn create_with_magic_link(
        &self,
        submission: MagicLinkSubmission,
    ) -> RepositoryResult<CreatedPost>;
}

pub struct SqlitePostRepository {
    pool: SqlitePool,
}

impl SqlitePostRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn create_author(
        conn: &mut SqliteConnection,
        author: &AnonymousAuthor,
    ) -> RepositoryResult<User> {
        let mut username = None;
        for _ in 0..MAX_USERNAME_ATTEMPTS {
            let candidate = helpers::username_candidate(&author.username_base);
            if !User::username_taken(&mut *conn, &candidate).await? {
                username = Some(candidate);
                break;
            }
        }
        let username = username.ok_or(RepositoryError::AlreadyExists)?;

        let user = User::insert_anonymous(
            &mut *conn,
            &NewAnonymousUser {
                user_id: Uuid::new_v4().to_string(),
                email: author.email.clone(),
                username,
                avatar: author.avatar.clone(),
            },
        )
        .await?;

        match Role::find_by_name(&mut *conn, EVERYONE_ROLE).await? {
            Some(role) => Role::assign(&mut *conn, &role.id, &user.user_id).await?,
            None => tracing::debug!("No {} role defined; skipping role grant", EVERYONE_ROLE),
        }

        Ok(user)
    }
}

#[async_trait]
impl PostRepository for SqlitePostRepository {
    async fn create_with_magic_link(
        &self,
        submission: MagicLinkSubmission,
    ) -> RepositoryResult<CreatedPost> {
        let mut tx = self.pool.begin().await?;

        // Claiming first takes the write lock and settles concurrent
        // submissions on the same link before any other row is touched.
        if !MagicLink::claim(&mut *tx, &submission.magic_link_id).await? {
            return Err(RepositoryError::AlreadyConsumed);
        }

        let (author, author_created) =
            match User::find_by_email(&mut *tx, &submission.author.email).await? {
                Some(user) => (user, false),
                None => (Self::create_author(&mut tx, &submission.author).await?, true),
            };

        let post = Post::insert(
            &mut *tx,
            &NewPost {
                post_id: Uuid::new_v4().to_string(),
                title: submission.title,
                slug: submission.slug,
                slug_id: submission.slug_id,
                content_markdown: submission.content_markdown,
                user_id: author.user_id.clone(),
                board_id: submission.board_id,
                screenshots: submission.screenshots,
            },
        )
        .await?;

        Vote::insert(&mut *tx, &author.user_id, &post.post_id).await?;

        // Read before commit so a committed post always comes back whole.
        let voters = Vote::summary_for_post(
            &mut tx,
            &post.post_id,
            Some(&author.user_id),
            submission.view_voters,
        )
        .await?;

        tx.commit().await?;

        Ok(CreatedPost {
            post,
            author,
            author_created,
            voters,
        })
    }
}
