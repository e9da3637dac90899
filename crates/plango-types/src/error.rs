use serde::{Deserialize, Serialize};

/// `{"detail": ...}` error body returned by every failing endpoint.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ErrorEnvelope {
    pub detail: ErrorDetail,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ErrorDetail {
    Text(String),
    Validation(Vec<ValidationIssue>),
}

/// One entry of a request validation failure.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ValidationIssue {
    #[serde(default)]
    pub loc: Vec<serde_json::Value>,
    pub msg: String,
    #[serde(default, rename = "type")]
    pub kind: String,
}

impl ErrorEnvelope {
    pub fn text(detail: impl Into<String>) -> Self {
        Self {
            detail: ErrorDetail::Text(detail.into()),
        }
    }

    pub fn validation(field: &str, msg: impl Into<String>) -> Self {
        Self {
            detail: ErrorDetail::Validation(vec![ValidationIssue {
                loc: vec!["body".into(), field.into()],
                msg: msg.into(),
                kind: "value_error".into(),
            }]),
        }
    }
}
