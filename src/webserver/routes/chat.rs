//! Chat completion route
//!
//! `POST /v1/chat/completions` validates the payload, starts one runner
//! process and streams its stdout back as `text/plain`.
//!
//! Response headers are held back until the runner produces its first line
//! (or exits). A runner that fails before printing anything therefore gets a
//! proper `500 {"detail": ...}`. Once the first line has been sent the status
//! is committed; a later failure ends the body with an error, which aborts the
//! chunked response on the wire and is logged.

use axum::{
    body::{Body, Bytes},
    extract::State,
    response::Response,
    routing::post,
    Router,
};
use futures::stream::{self, StreamExt};
use std::sync::Arc;

use crate::chat::ChatRequest;
use crate::errors::GatewayError;
use crate::logger::{self, LogTag};
use crate::runner;
use crate::webserver::{routes::method_not_allowed, state::AppState, utils};

pub const CHAT_COMPLETIONS_PATH: &str = "/v1/chat/completions";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route(
        CHAT_COMPLETIONS_PATH,
        post(chat_completions).fallback(method_not_allowed),
    )
}

/// POST /v1/chat/completions
async fn chat_completions(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Response, GatewayError> {
    let prompt = ChatRequest::parse_prompt(&body).map_err(|e| {
        logger::debug(
            LogTag::Webserver,
            &format!("Rejected chat request: {}", e),
        );
        e
    })?;

    logger::debug(
        LogTag::Webserver,
        &format!(
            "Chat request accepted ({} prompt chars, model {})",
            prompt.char_len(),
            state.runner().model
        ),
    );

    let mut process = runner::spawn_runner(state.runner(), &prompt)?;

    let first = match process.next_chunk().await {
        None => return Ok(utils::text_response(Body::empty())),
        Some(Err(e)) => return Err(e),
        Some(Ok(chunk)) => chunk,
    };

    let rest = process.into_stream().inspect(|item| {
        if let Err(e) = item {
            logger::error(
                LogTag::Webserver,
                &format!("Aborting chat response stream: {}", e),
            );
        }
    });
    let body = stream::once(async move { Ok::<_, GatewayError>(first) }).chain(rest);

    Ok(utils::text_response(Body::from_stream(body)))
}
