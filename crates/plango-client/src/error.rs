use std::path::PathBuf;

use http::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Message used when the server gave nothing better to show.
pub const GENERIC_ERROR_MESSAGE: &str = "An error occurred";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("{message}")]
    Unauthorized { message: String },

    #[error("{message}")]
    Status { status: StatusCode, message: String },

    #[error("unexpected response body: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("invalid url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ApiError {
    /// HTTP status of the failed response, if the server answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Unauthorized { .. } => Some(StatusCode::UNAUTHORIZED),
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to access token storage {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize token storage: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Builds a human-readable message out of an error response body.
///
/// `detail` may be a plain string or a list of validation entries carrying
/// a `msg` field; the first entry wins.
pub fn error_message(body: Option<&Value>) -> String {
    match body {
        Some(Value::Object(map)) => match map.get("detail") {
            Some(Value::String(detail)) => detail.clone(),
            Some(Value::Array(items)) => match items.first() {
                Some(Value::Object(first)) if first.contains_key("msg") => match &first["msg"] {
                    Value::String(msg) => msg.clone(),
                    other => other.to_string(),
                },
                _ => items
                    .iter()
                    .map(|item| match item {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(", "),
            },
            Some(other) => other.to_string(),
            None => GENERIC_ERROR_MESSAGE.to_string(),
        },
        Some(Value::String(text)) => text.clone(),
        _ => GENERIC_ERROR_MESSAGE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn detail_string_is_used_verbatim() {
        let body = json!({ "detail": "User with this email already exists" });
        assert_eq!(error_message(Some(&body)), "User with this email already exists");
    }

    #[test]
    fn first_validation_msg_wins() {
        let body = json!({
            "detail": [
                { "loc": ["body", "email"], "msg": "field required", "type": "missing" },
                { "loc": ["body", "password"], "msg": "too short", "type": "value_error" }
            ]
        });
        assert_eq!(error_message(Some(&body)), "field required");
    }

    #[test]
    fn plain_detail_lists_are_joined() {
        let body = json!({ "detail": ["first", "second"] });
        assert_eq!(error_message(Some(&body)), "first, second");
    }

    #[test]
    fn non_string_detail_is_rendered_as_json() {
        let body = json!({ "detail": { "code": 7 } });
        assert_eq!(error_message(Some(&body)), r#"{"code":7}"#);
    }

    #[test]
    fn falls_back_to_generic_message() {
        assert_eq!(error_message(None), GENERIC_ERROR_MESSAGE);
        assert_eq!(error_message(Some(&json!({ "error": "nope" }))), GENERIC_ERROR_MESSAGE);
        assert_eq!(error_message(Some(&json!(42))), GENERIC_ERROR_MESSAGE);
    }

    #[test]
    fn bare_string_body_is_the_message() {
        assert_eq!(error_message(Some(&json!("gateway down"))), "gateway down");
    }
}
