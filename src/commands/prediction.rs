use serde::Serialize;
use tracing::{debug, warn};

use crate::error::AppError;
use crate::models::form::{FormField, FormValues};
use crate::models::prediction::{HealthStatus, PredictionResult};
use crate::services::form_service::FormSnapshot;
use crate::services::presenter::{present, StressPresentation};

use super::{AppState, CommandError, CommandResult};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionOutcome {
    pub result: PredictionResult,
    pub presentation: StressPresentation,
}

pub fn form_update_field(
    app_state: &AppState,
    field: &str,
    value: impl Into<String>,
) -> CommandResult<FormSnapshot> {
    let field = FormField::try_from(field).map_err(AppError::validation)?;
    Ok(app_state.form().update_field(field, value))
}

pub fn form_get(app_state: &AppState) -> FormSnapshot {
    app_state.form().snapshot()
}

pub fn form_reset(app_state: &AppState) -> CommandResult<FormSnapshot> {
    Ok(app_state.form().reset()?)
}

/// Submits the form as it currently stands.
pub async fn prediction_submit(app_state: &AppState) -> CommandResult<PredictionOutcome> {
    debug!(target: "app::command", "prediction_submit invoked");

    let form = app_state.form();
    let client = app_state.prediction();
    match form.submit(client.as_ref()).await {
        Ok(result) => {
            debug!(
                target: "app::command",
                score = result.score,
                correlation_id = %result.correlation_id,
                "prediction_submit completed"
            );
            Ok(PredictionOutcome {
                presentation: present(result.score),
                result,
            })
        }
        Err(error) => {
            let correlation_id = error.correlation_id().unwrap_or("-");
            warn!(
                target: "app::command",
                error = %error,
                correlation_id = %correlation_id,
                "prediction_submit failed"
            );
            Err(CommandError::from(error))
        }
    }
}

/// Fills every field, then submits. Used by the one-shot CLI.
pub async fn prediction_submit_values(
    app_state: &AppState,
    values: FormValues,
) -> CommandResult<PredictionOutcome> {
    let form = app_state.form();
    for field in FormField::ALL {
        form.update_field(field, values.get(field));
    }
    prediction_submit(app_state).await
}

pub async fn prediction_health(app_state: &AppState) -> CommandResult<HealthStatus> {
    debug!(target: "app::command", "prediction_health invoked");

    match app_state.prediction().health().await {
        Ok(status) => Ok(status),
        Err(error) => {
            warn!(target: "app::command", error = %error, "prediction_health failed");
            Err(CommandError::from(error))
        }
    }
}
