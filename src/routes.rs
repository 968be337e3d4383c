use crate::{handlers, middleware, AppState};
use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};

/// JSON API routes, mounted by the server under `/api/v1`.
pub fn api_router(state: AppState) -> Router {
    let magic_link_routes = Router::new()
        .route(
            "/posts/magic-link",
            post(handlers::create_post_with_magic_link),
        )
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware::magic_link_auth_middleware,
        ));

    Router::new()
        .route(
            "/auth/magic-link/request",
            post(handlers::request_magic_link),
        )
        .route(
            "/auth/magic-link/validate",
            post(handlers::validate_magic_link),
        )
        .merge(magic_link_routes)
        .with_state(state)
}

/// Full application: the API under `/api/v1` plus `/health`.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .nest("/api/v1", api_router(state))
}
