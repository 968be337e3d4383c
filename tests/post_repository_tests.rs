use chrono::Utc;
use feedback_board::{
    helpers,
    models::{MagicLink, NewMagicLink, Post, Role, User},
    repositories::{
        post_repository::{AnonymousAuthor, MagicLinkSubmission},
        PostRepository, RepositoryError, SqlitePostRepository,
    },
    test_utils::test_helpers,
};
use sqlx::SqlitePool;
use uuid::Uuid;

async fn insert_link(pool: &SqlitePool, email: &str, board_id: &str) -> MagicLink {
    MagicLink::insert(
        pool,
        &NewMagicLink {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            board_id: board_id.to_string(),
            token: Uuid::new_v4().to_string(),
            user_id: None,
            expires_at: Utc::now().timestamp() + 3600,
        },
    )
    .await
    .unwrap()
}

fn submission(link: &MagicLink, title: &str, slug_id: &str) -> MagicLinkSubmission {
    MagicLinkSubmission {
        magic_link_id: link.id.clone(),
        author: AnonymousAuthor {
            email: link.email.clone(),
            avatar: helpers::gravatar_url(&link.email),
            username_base: helpers::username_base(&link.email),
        },
        title: title.to_string(),
        slug: helpers::post_slug(title, slug_id),
        slug_id: slug_id.to_string(),
        content_markdown: None,
        board_id: link.board_id.clone(),
        screenshots: vec![],
        view_voters: false,
    }
}

#[tokio::test]
async fn test_create_claims_link_and_records_vote() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let board = test_helpers::insert_test_board(&pool, "Ideas").await.unwrap();
    let link = insert_link(&pool, "a@b.com", &board.board_id).await;
    let repository = SqlitePostRepository::new(pool.clone());

    let created = repository
        .create_with_magic_link(submission(&link, "Hello", &helpers::generate_slug_id()))
        .await
        .unwrap();

    assert!(created.author_created);
    assert_eq!(created.post.user_id.as_deref(), Some(created.author.user_id.as_str()));

    let stored = MagicLink::find_by_id(&pool, &link.id).await.unwrap().unwrap();
    assert!(stored.used);

    let summary = created.voters;
    assert_eq!(summary.votes_count, 1);
    assert!(summary.votes.is_empty());
    assert!(summary.viewer_vote.is_some());
}

#[tokio::test]
async fn test_second_create_on_same_link_is_rejected() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let board = test_helpers::insert_test_board(&pool, "Ideas").await.unwrap();
    let link = insert_link(&pool, "a@b.com", &board.board_id).await;
    let repository = SqlitePostRepository::new(pool.clone());

    repository
        .create_with_magic_link(submission(&link, "One", &helpers::generate_slug_id()))
        .await
        .unwrap();
    let result = repository
        .create_with_magic_link(submission(&link, "Two", &helpers::generate_slug_id()))
        .await;

    assert!(matches!(result, Err(RepositoryError::AlreadyConsumed)));
    assert_eq!(
        Post::list_for_board(&pool, &board.board_id).await.unwrap().len(),
        1
    );
}

#[tokio::test]
async fn test_failed_insert_rolls_back_everything() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let board = test_helpers::insert_test_board(&pool, "Ideas").await.unwrap();
    let repository = SqlitePostRepository::new(pool.clone());

    // Occupy a slug so the second submission collides on it.
    let first_link = insert_link(&pool, "first@b.com", &board.board_id).await;
    repository
        .create_with_magic_link(submission(&first_link, "Same", "fixed-slug-id-000000"))
        .await
        .unwrap();

    let link = insert_link(&pool, "second@b.com", &board.board_id).await;
    let result = repository
        .create_with_magic_link(submission(&link, "Same", "fixed-slug-id-000000"))
        .await;
    assert!(matches!(result, Err(RepositoryError::Database(_))));

    let stored = MagicLink::find_by_id(&pool, &link.id).await.unwrap().unwrap();
    assert!(!stored.used);
    assert!(User::find_by_email(&pool, "second@b.com")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_anonymous_author_gets_everyone_role_when_defined() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let board = test_helpers::insert_test_board(&pool, "Ideas").await.unwrap();
    let repository = SqlitePostRepository::new(pool.clone());

    let link = insert_link(&pool, "norole@b.com", &board.board_id).await;
    let created = repository
        .create_with_magic_link(submission(&link, "No role", &helpers::generate_slug_id()))
        .await
        .unwrap();
    assert!(Role::names_for_user(&pool, &created.author.user_id)
        .await
        .unwrap()
        .is_empty());

    Role::create(&pool, "@everyone").await.unwrap();
    let link = insert_link(&pool, "role@b.com", &board.board_id).await;
    let created = repository
        .create_with_magic_link(submission(&link, "Role", &helpers::generate_slug_id()))
        .await
        .unwrap();
    assert_eq!(
        Role::names_for_user(&pool, &created.author.user_id)
            .await
            .unwrap(),
        vec!["@everyone".to_string()]
    );
}

#[tokio::test]
async fn test_existing_account_matched_case_insensitively() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let board = test_helpers::insert_test_board(&pool, "Ideas").await.unwrap();
    let user_id = test_helpers::insert_test_user(&pool, "Member@Example.com", "member")
        .await
        .unwrap();
    let link = insert_link(&pool, "member@example.com", &board.board_id).await;
    let repository = SqlitePostRepository::new(pool.clone());

    let created = repository
        .create_with_magic_link(submission(&link, "Mine", &helpers::generate_slug_id()))
        .await
        .unwrap();

    assert!(!created.author_created);
    assert_eq!(created.author.user_id, user_id);
    assert!(!created.author.is_anonymous());
}

#[tokio::test]
async fn test_create_lists_voters_when_board_shows_them() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let board = test_helpers::insert_test_board(&pool, "Ideas").await.unwrap();
    let link = insert_link(&pool, "voter@b.com", &board.board_id).await;
    let repository = SqlitePostRepository::new(pool.clone());

    let mut visible = submission(&link, "Shown", &helpers::generate_slug_id());
    visible.view_voters = true;
    let created = repository.create_with_magic_link(visible).await.unwrap();

    assert_eq!(created.voters.votes_count, 1);
    assert_eq!(created.voters.votes.len(), 1);
    assert_eq!(created.voters.votes[0].user_id, created.author.user_id);
}
