use std::fmt;

use serde::Serialize;
use serde_json::{json, Map as JsonMap, Value as JsonValue};
use thiserror::Error;
use tracing::{error, warn};

pub type AppResult<T> = Result<T, AppError>;

pub const NETWORK_ERROR_MESSAGE: &str =
    "Failed to get prediction. Please check if the server is running.";
pub const UPSTREAM_ERROR_MESSAGE: &str = "Failed to get prediction";
pub const INVALID_RESPONSE_MESSAGE: &str = "Invalid response from server";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictionErrorCode {
    Network,
    Upstream,
    InvalidResponse,
}

impl PredictionErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            PredictionErrorCode::Network => "NETWORK_ERROR",
            PredictionErrorCode::Upstream => "UPSTREAM_ERROR",
            PredictionErrorCode::InvalidResponse => "INVALID_RESPONSE",
        }
    }
}

impl fmt::Display for PredictionErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Front-end view of an error: a stable code, the message to show, and
/// optional structured details.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<JsonValue>,
}

impl ErrorReport {
    fn new(code: &str, message: impl Into<String>, details: Option<JsonValue>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            details,
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{message}")]
    Validation {
        message: String,
        field: Option<&'static str>,
    },

    #[error("{message}")]
    Prediction {
        code: PredictionErrorCode,
        message: String,
        correlation_id: Option<String>,
        details: Option<JsonValue>,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        let message = message.into();
        warn!(target: "app::validation", %message, "validation error");
        AppError::Validation {
            message,
            field: None,
        }
    }

    pub fn field_validation(field: &'static str, message: impl Into<String>) -> Self {
        let message = message.into();
        warn!(target: "app::validation", field, %message, "field validation error");
        AppError::Validation {
            message,
            field: Some(field),
        }
    }

    pub fn prediction(code: PredictionErrorCode, message: impl Into<String>) -> Self {
        Self::prediction_with_details(code, message, None, None)
    }

    pub fn prediction_with_details(
        code: PredictionErrorCode,
        message: impl Into<String>,
        correlation_id: Option<&str>,
        details: Option<JsonValue>,
    ) -> Self {
        let message = message.into();
        let correlation = correlation_id.map(|value| value.to_string());
        match (&correlation, &details) {
            (Some(id), Some(payload)) => {
                warn!(
                    target: "app::prediction::error",
                    code = %code,
                    correlation_id = %id,
                    details = %payload,
                    %message
                );
            }
            (Some(id), None) => {
                warn!(
                    target: "app::prediction::error",
                    code = %code,
                    correlation_id = %id,
                    %message
                );
            }
            (None, Some(payload)) => {
                warn!(target: "app::prediction::error", code = %code, details = %payload, %message);
            }
            (None, None) => {
                warn!(target: "app::prediction::error", code = %code, %message);
            }
        }

        AppError::Prediction {
            code,
            message,
            correlation_id: correlation,
            details,
        }
    }

    pub fn prediction_code(&self) -> Option<PredictionErrorCode> {
        match self {
            AppError::Prediction { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn correlation_id(&self) -> Option<&str> {
        match self {
            AppError::Prediction { correlation_id, .. } => correlation_id.as_deref(),
            _ => None,
        }
    }

    pub fn prediction_details(&self) -> Option<&JsonValue> {
        match self {
            AppError::Prediction { details, .. } => details.as_ref(),
            _ => None,
        }
    }

    pub fn invalid_field(&self) -> Option<&'static str> {
        match self {
            AppError::Validation { field, .. } => *field,
            _ => None,
        }
    }

    pub fn report(&self) -> ErrorReport {
        match self {
            AppError::Validation { message, field } => ErrorReport::new(
                "VALIDATION_ERROR",
                message.clone(),
                field.map(|name| json!({ "field": name })),
            ),
            AppError::Prediction {
                code,
                message,
                correlation_id,
                details,
            } => {
                let mut merged = JsonMap::new();
                match details {
                    Some(JsonValue::Object(map)) => {
                        for (key, value) in map {
                            merged.insert(key.clone(), value.clone());
                        }
                    }
                    Some(value) => {
                        merged.insert("info".to_string(), value.clone());
                    }
                    None => {}
                }
                if let Some(id) = correlation_id {
                    merged.insert("correlationId".to_string(), JsonValue::String(id.clone()));
                }
                let details = if merged.is_empty() {
                    None
                } else {
                    Some(JsonValue::Object(merged))
                };
                ErrorReport::new(code.as_str(), message.clone(), details)
            }
            AppError::Config(message) => ErrorReport::new("CONFIG_ERROR", message.clone(), None),
            AppError::Serialization(_) => ErrorReport::new("UNKNOWN", "serialization failed", None),
            AppError::Io(_) => ErrorReport::new("UNKNOWN", "terminal input/output failed", None),
            AppError::Other(message) => ErrorReport::new("UNKNOWN", message.clone(), None),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        let message = message.into();
        error!(target: "app::config", %message, "configuration error");
        AppError::Config(message)
    }

    pub fn other(message: impl Into<String>) -> Self {
        let message = message.into();
        error!(target: "app::other", %message, "other error");
        AppError::Other(message)
    }
}
