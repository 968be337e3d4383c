use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use feedback_board::{models::Post, routes, test_utils::test_helpers, AppState};
use serde_json::{json, Value};
use tempfile::NamedTempFile;
use tower::ServiceExt;

const CONCURRENT_REQUESTS: usize = 8;

async fn setup() -> (Router, AppState, NamedTempFile) {
    let (pool, db_file) = test_helpers::create_test_db_file().await.unwrap();
    let (state, _) = test_helpers::build_test_state_with_pool(pool, test_helpers::test_config());
    (routes::app(state.clone()), state, db_file)
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn post_json(uri: &str, auth: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// Sends every request on its own task and collects the outcomes.
async fn send_all(app: &Router, requests: Vec<Request<Body>>) -> Vec<(StatusCode, Value)> {
    let handles: Vec<_> = requests
        .into_iter()
        .map(|request| tokio::spawn(send(app.clone(), request)))
        .collect();

    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        results.push(handle.await.unwrap());
    }
    results
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_leave_one_unused_link() {
    let (app, state, _db_file) = setup().await;
    let board = test_helpers::insert_test_board(&state.pool, "Ideas")
        .await
        .unwrap();

    let requests = (0..CONCURRENT_REQUESTS)
        .map(|_| {
            post_json(
                "/api/v1/auth/magic-link/request",
                None,
                json!({ "email": "a@b.com", "boardId": board.board_id }),
            )
        })
        .collect();
    let results = send_all(&app, requests).await;

    for (status, body) in &results {
        assert_eq!(*status, StatusCode::OK, "{body}");
    }

    let unused: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM magic_links WHERE email = ? AND board_id = ? AND used = 0",
    )
    .bind("a@b.com")
    .bind(&board.board_id)
    .fetch_one(&state.pool)
    .await
    .unwrap();
    assert_eq!(unused, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_posts_on_one_session_create_one_post() {
    let (app, state, _db_file) = setup().await;
    let board = test_helpers::insert_test_board(&state.pool, "Ideas")
        .await
        .unwrap();

    let (status, body) = send(
        app.clone(),
        post_json(
            "/api/v1/auth/magic-link/request",
            None,
            json!({ "email": "a@b.com", "boardId": board.board_id }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let link_token = body["__token"]["token"].as_str().unwrap().to_string();

    let (status, body) = send(
        app.clone(),
        post_json(
            "/api/v1/auth/magic-link/validate",
            None,
            json!({ "token": link_token }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let auth = format!("Bearer {}", body["sessionToken"].as_str().unwrap());

    let requests = (0..CONCURRENT_REQUESTS)
        .map(|n| {
            post_json(
                "/api/v1/posts/magic-link",
                Some(auth.as_str()),
                json!({ "title": format!("Idea {n}"), "boardId": board.board_id }),
            )
        })
        .collect();
    let results = send_all(&app, requests).await;

    let created = results
        .iter()
        .filter(|(status, _)| *status == StatusCode::CREATED)
        .count();
    assert_eq!(created, 1);
    for (status, body) in results.iter().filter(|(s, _)| *s != StatusCode::CREATED) {
        assert_eq!(*status, StatusCode::UNAUTHORIZED, "{body}");
        assert_eq!(body["code"], "INVALID_SESSION");
    }

    let posts = Post::list_for_board(&state.pool, &board.board_id)
        .await
        .unwrap();
    assert_eq!(posts.len(), 1);

    let used: bool = sqlx::query_scalar("SELECT used FROM magic_links WHERE token = ?")
        .bind(&link_token)
        .fetch_one(&state.pool)
        .await
        .unwrap();
    assert!(used);
}
