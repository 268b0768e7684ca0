use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    BadRequest,
    NotFound,
    Conflict,
    Validation,
    Internal,
    Unknown,
}

impl ErrorCode {
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => Self::BadRequest,
            404 => Self::NotFound,
            409 => Self::Conflict,
            422 => Self::Validation,
            500..=599 => Self::Internal,
            _ => Self::Unknown,
        }
    }
}

/// Error body returned by the backend on a non-success response.
///
/// The backend puts a human-readable string in `detail`; request validation
/// failures carry a structured list there instead, which is not shown to users.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiError {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<Value>,
}

impl ApiError {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: Some(Value::String(detail.into())),
        }
    }

    pub fn message(&self) -> Option<&str> {
        match &self.detail {
            Some(Value::String(message)) if !message.trim().is_empty() => Some(message),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_detail_is_human_readable() {
        let err: ApiError =
            serde_json::from_str(r#"{"detail":"Product not found"}"#).expect("decode");
        assert_eq!(err.message(), Some("Product not found"));
    }

    #[test]
    fn structured_detail_is_not_shown() {
        let err: ApiError =
            serde_json::from_str(r#"{"detail":[{"loc":["body","price"],"msg":"field required"}]}"#)
                .expect("decode");
        assert_eq!(err.message(), None);
    }

    #[test]
    fn maps_statuses_to_codes() {
        assert_eq!(ErrorCode::from_status(404), ErrorCode::NotFound);
        assert_eq!(ErrorCode::from_status(422), ErrorCode::Validation);
        assert_eq!(ErrorCode::from_status(503), ErrorCode::Internal);
        assert_eq!(ErrorCode::from_status(418), ErrorCode::Unknown);
    }
}
