//! Route table.

use crate::handlers::{self, AppState};
use axum::routing::{get, patch};
use axum::Router;
use std::path::Path;
use tower_http::services::ServeDir;

/// Builds the application router.
///
/// The JSON API lives under `/api`. When `assets_dir` is given, every other
/// path is served from that directory.
pub fn create_router(state: AppState, assets_dir: Option<&Path>) -> Router {
    let api = Router::new()
        .route("/", get(handlers::greeting))
        .route(
            "/todos",
            get(handlers::list_todos).post(handlers::create_todo),
        )
        .route(
            "/todos/:todo_id",
            patch(handlers::update_todo).delete(handlers::delete_todo),
        )
        .with_state(state);

    let router = Router::new().nest("/api", api);

    match assets_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    }
}
