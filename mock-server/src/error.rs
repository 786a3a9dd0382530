use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use log::warn;
use thiserror::Error;

/// A rejected request. Rendered as a small HTML page, the way the live
/// service reports errors.
#[derive(Debug, Error)]
pub enum ApiFailure {
    #[error("Forbidden: a valid auth_key header is required")]
    Forbidden,

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Internal Server Error: {0}")]
    Internal(String),
}

impl ApiFailure {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiFailure::Forbidden => StatusCode::FORBIDDEN,
            ApiFailure::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiFailure::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        warn!("rejecting request: {self}");
        (
            self.status(),
            [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
            format!("<!doctype html><title>{0}</title><h1>{0}</h1>", self),
        )
            .into_response()
    }
}
