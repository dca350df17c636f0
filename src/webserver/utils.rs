//! Response helpers shared by the route handlers

use axum::{
    body::Body,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::errors::ErrorBody;

/// Media type of streamed runner output
pub const TEXT_PLAIN_UTF8: &str = "text/plain; charset=utf-8";

/// `{"detail": ...}` error response
pub fn error_response(status: StatusCode, detail: &str) -> Response {
    (status, Json(ErrorBody::new(detail))).into_response()
}

/// 200 response with a plain-text body (streamed or empty)
pub fn text_response(body: Body) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, TEXT_PLAIN_UTF8)],
        body,
    )
        .into_response()
}
