use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqliteConnection, SqliteExecutor};
use uuid::Uuid;

/// Voters shown alongside a post.
const VOTER_PREVIEW_LIMIT: i64 = 6;

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    pub vote_id: String,
    pub user_id: String,
    pub post_id: String,
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoterVote {
    pub vote_id: String,
    pub user_id: String,
    pub post_id: String,
    pub created_at: i64,
    pub name: Option<String>,
    pub username: String,
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteSummary {
    pub votes: Vec<VoterVote>,
    pub votes_count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub viewer_vote: Option<Vote>,
}

impl Vote {
    pub async fn insert<'e, E: SqliteExecutor<'e>>(
        executor: E,
        user_id: &str,
        post_id: &str,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Vote>(
            r#"
            INSERT INTO votes (vote_id, user_id, post_id)
            VALUES (?, ?, ?)
            RETURNING vote_id, user_id, post_id, created_at
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(user_id)
        .bind(post_id)
        .fetch_one(executor)
        .await
    }

    pub async fn count_for_post<'e, E: SqliteExecutor<'e>>(
        executor: E,
        post_id: &str,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(vote_id) FROM votes WHERE post_id = ?")
            .bind(post_id)
            .fetch_one(executor)
            .await
    }

    pub async fn find<'e, E: SqliteExecutor<'e>>(
        executor: E,
        post_id: &str,
        user_id: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Vote>(
            r#"
            SELECT vote_id, user_id, post_id, created_at
            FROM votes
            WHERE post_id = ? AND user_id = ?
            "#,
        )
        .bind(post_id)
        .bind(user_id)
        .fetch_optional(executor)
        .await
    }

    /// Vote count, a preview of voters (when the board shows them) and the
    /// viewer's own vote.
    pub async fn summary_for_post(
        conn: &mut SqliteConnection,
        post_id: &str,
        viewer_id: Option<&str>,
        view_voters: bool,
    ) -> Result<VoteSummary, sqlx::Error> {
        let votes_count = Self::count_for_post(&mut *conn, post_id).await?;

        let votes = if view_voters {
            sqlx::query_as::<_, VoterVote>(
                r#"
                SELECT votes.vote_id, votes.user_id, votes.post_id, votes.created_at,
                       users.name, users.username, users.avatar
                FROM votes
                INNER JOIN users ON votes.user_id = users.user_id
                WHERE votes.post_id = ?
                ORDER BY votes.created_at ASC
                LIMIT ?
                "#,
            )
            .bind(post_id)
            .bind(VOTER_PREVIEW_LIMIT)
            .fetch_all(&mut *conn)
            .await?
        } else {
            Vec::new()
        };

        let viewer_vote = match viewer_id {
            Some(user_id) => Self::find(&mut *conn, post_id, user_id).await?,
            None => None,
        };

        Ok(VoteSummary {
            votes,
            votes_count,
            viewer_vote,
        })
    }
}
