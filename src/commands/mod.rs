pub mod prediction;

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::error;

use crate::error::{AppError, AppResult, ErrorReport};
use crate::services::form_service::FormService;
use crate::services::prediction_service::{PredictionClient, PredictionClientConfig};

#[derive(Clone)]
pub struct AppState {
    form_service: Arc<FormService>,
    prediction_client: Arc<PredictionClient>,
}

impl AppState {
    pub fn new(config: &PredictionClientConfig) -> AppResult<Self> {
        let prediction_client = Arc::new(PredictionClient::new(config)?);
        let form_service = Arc::new(FormService::new());

        Ok(Self {
            form_service,
            prediction_client,
        })
    }

    pub fn form(&self) -> Arc<FormService> {
        Arc::clone(&self.form_service)
    }

    pub fn prediction(&self) -> Arc<PredictionClient> {
        Arc::clone(&self.prediction_client)
    }
}

pub type CommandResult<T> = Result<T, CommandError>;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CommandError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<JsonValue>,
}

impl CommandError {
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
        details: Option<JsonValue>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details,
        }
    }

    pub fn from_ref(error: &AppError) -> Self {
        match error {
            AppError::Config(message) => {
                error!(target: "app::command", %message, "configuration error in command");
            }
            AppError::Serialization(err) => {
                error!(target: "app::command", error = %err, "serialization error in command");
            }
            AppError::Io(err) => {
                error!(target: "app::command", error = %err, "io error in command");
            }
            AppError::Other(message) => {
                error!(target: "app::command", %message, "unexpected error in command");
            }
            AppError::Validation { .. } | AppError::Prediction { .. } => {}
        }
        CommandError::from(error.report())
    }
}

impl From<ErrorReport> for CommandError {
    fn from(report: ErrorReport) -> Self {
        CommandError::new(report.code, report.message, report.details)
    }
}

impl From<AppError> for CommandError {
    fn from(error: AppError) -> Self {
        CommandError::from_ref(&error)
    }
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}
