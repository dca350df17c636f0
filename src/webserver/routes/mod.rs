use crate::webserver::{state::AppState, utils};
use axum::{http::StatusCode, response::Response, Router};
use std::sync::Arc;

pub mod chat;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(chat::routes())
        .fallback(not_found)
        .with_state(state)
}

/// Unknown path
async fn not_found() -> Response {
    utils::error_response(StatusCode::NOT_FOUND, "Not Found")
}

/// Known path, unsupported method
pub(crate) async fn method_not_allowed() -> Response {
    utils::error_response(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed")
}
