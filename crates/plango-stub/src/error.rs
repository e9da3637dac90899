use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use plango_types::{ErrorDetail, ErrorEnvelope};

/// Error response in the backend's `{"detail": ...}` shape.
#[derive(Debug)]
pub struct StubError {
    pub status: StatusCode,
    pub body: ErrorEnvelope,
}

pub type StubResult<T> = Result<T, StubError>;

impl StubError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorEnvelope::text(detail),
        }
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, detail)
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, detail)
    }

    pub fn unauthorized(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, detail)
    }

    pub fn forbidden(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, detail)
    }

    pub fn validation(field: &str, msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            body: ErrorEnvelope::validation(field, msg),
        }
    }

    pub fn body_text(&self) -> String {
        match &self.body.detail {
            ErrorDetail::Text(text) => text.clone(),
            ErrorDetail::Validation(issues) => issues
                .iter()
                .map(|issue| issue.msg.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

impl IntoResponse for StubError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
