use std::sync::{Mutex, PoisonError};

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{AppError, AppResult, ErrorReport};
use crate::models::form::{FormField, FormValues};
use crate::models::prediction::{PredictionBackend, PredictionResult};
use crate::services::payload::features_from_form;
use crate::services::presenter::{present, StressPresentation};

pub const SUBMISSION_IN_PROGRESS: &str = "A prediction is already in progress";

#[derive(Debug, Default)]
struct FormSession {
    values: FormValues,
    loading: bool,
    result: Option<PredictionResult>,
    last_error: Option<ErrorReport>,
}

/// What the front end renders after every event.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSnapshot {
    pub values: FormValues,
    pub is_valid: bool,
    pub is_loading: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<PredictionResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presentation: Option<StressPresentation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorReport>,
}

/// Owns the single form and its one result.
#[derive(Debug, Default)]
pub struct FormService {
    session: Mutex<FormSession>,
}

impl FormService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a raw value and clears any displayed error.
    pub fn update_field(&self, field: FormField, value: impl Into<String>) -> FormSnapshot {
        let mut session = self.session.lock().expect("form lock poisoned");
        session.values.set(field, value);
        session.last_error = None;
        debug!(target: "app::form", field = field.as_str(), "form field updated");
        Self::snapshot_of(&session)
    }

    /// Restores the default form. Refused while a submission is loading.
    pub fn reset(&self) -> AppResult<FormSnapshot> {
        let mut session = self.session.lock().expect("form lock poisoned");
        if session.loading {
            return Err(AppError::validation(SUBMISSION_IN_PROGRESS));
        }
        *session = FormSession::default();
        Ok(Self::snapshot_of(&session))
    }

    pub fn snapshot(&self) -> FormSnapshot {
        let session = self.session.lock().expect("form lock poisoned");
        Self::snapshot_of(&session)
    }

    pub fn is_loading(&self) -> bool {
        self.session.lock().expect("form lock poisoned").loading
    }

    /// Runs one submission. The form is idle again when this returns,
    /// whatever the outcome, and also when the future is dropped early.
    pub async fn submit(&self, backend: &dyn PredictionBackend) -> AppResult<PredictionResult> {
        let features = {
            let mut session = self.session.lock().expect("form lock poisoned");
            if session.loading {
                return Err(AppError::validation(SUBMISSION_IN_PROGRESS));
            }

            match features_from_form(&session.values) {
                Ok(features) => {
                    session.loading = true;
                    session.result = None;
                    session.last_error = None;
                    features
                }
                Err(error) => {
                    session.result = None;
                    session.last_error = Some(error.report());
                    return Err(error);
                }
            }
        };

        let _loading = LoadingGuard {
            session: &self.session,
        };
        let outcome = backend.predict(&features).await;

        // The lock must be released before `_loading` drops.
        {
            let mut session = self.session.lock().expect("form lock poisoned");
            session.loading = false;
            match &outcome {
                Ok(result) => {
                    info!(
                        target: "app::form",
                        score = result.score,
                        correlation_id = %result.correlation_id,
                        "submission completed"
                    );
                    session.result = Some(result.clone());
                }
                Err(error) => {
                    session.last_error = Some(error.report());
                }
            }
        }

        outcome
    }

    fn snapshot_of(session: &FormSession) -> FormSnapshot {
        FormSnapshot {
            values: session.values.clone(),
            is_valid: session.values.is_valid(),
            is_loading: session.loading,
            presentation: session.result.as_ref().map(|result| present(result.score)),
            result: session.result.clone(),
            error: session.last_error.clone(),
        }
    }
}

/// Clears the loading flag if a submission is abandoned mid-flight.
struct LoadingGuard<'a> {
    session: &'a Mutex<FormSession>,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        let mut session = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        if session.loading {
            session.loading = false;
            debug!(target: "app::form", "submission abandoned before completion");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PredictionErrorCode;
    use crate::models::form::FeatureVector;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct StalledBackend;

    #[async_trait::async_trait]
    impl PredictionBackend for StalledBackend {
        async fn predict(&self, _features: &FeatureVector) -> AppResult<PredictionResult> {
            std::future::pending().await
        }
    }

    struct FixedBackend {
        outcome: Result<f64, PredictionErrorCode>,
        calls: AtomicUsize,
    }

    impl FixedBackend {
        fn scoring(score: f64) -> Self {
            Self {
                outcome: Ok(score),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing(code: PredictionErrorCode) -> Self {
            Self {
                outcome: Err(code),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait::async_trait]
    impl PredictionBackend for FixedBackend {
        async fn predict(&self, _features: &FeatureVector) -> AppResult<PredictionResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.outcome {
                Ok(score) => Ok(PredictionResult {
                    score,
                    server_status: Some("success".into()),
                    correlation_id: "fixed".into(),
                    latency_ms: 1,
                    received_at: "2025-01-01T00:00:00Z".into(),
                }),
                Err(code) => Err(AppError::prediction(code, "backend failed")),
            }
        }
    }

    fn filled_service() -> FormService {
        let service = FormService::new();
        service.update_field(FormField::WorkHours, "8");
        service.update_field(FormField::SleepHours, "7");
        service.update_field(FormField::WorkType, "0");
        service
    }

    #[tokio::test]
    async fn successful_submission_stores_result() {
        let service = filled_service();
        let backend = FixedBackend::scoring(9.0);

        let result = service.submit(&backend).await.expect("prediction");
        assert_eq!(result.score, 9.0);

        let snapshot = service.snapshot();
        assert!(!snapshot.is_loading);
        assert!(snapshot.error.is_none());
        let presentation = snapshot.presentation.expect("presentation");
        assert_eq!(presentation.message, "You desperately need a holiday!");
    }

    #[tokio::test]
    async fn invalid_form_never_reaches_backend() {
        let service = FormService::new();
        let backend = FixedBackend::scoring(5.0);

        let error = service.submit(&backend).await.expect_err("invalid");
        assert_eq!(error.invalid_field(), Some("workHours"));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);

        let snapshot = service.snapshot();
        assert!(!snapshot.is_valid);
        assert_eq!(
            snapshot.error.map(|err| err.code),
            Some("VALIDATION_ERROR".to_string())
        );
    }

    #[tokio::test]
    async fn failure_clears_previous_result() {
        let service = filled_service();
        service
            .submit(&FixedBackend::scoring(3.0))
            .await
            .expect("first");

        let error = service
            .submit(&FixedBackend::failing(PredictionErrorCode::Upstream))
            .await
            .expect_err("second fails");
        assert_eq!(error.prediction_code(), Some(PredictionErrorCode::Upstream));

        let snapshot = service.snapshot();
        assert!(snapshot.result.is_none());
        assert!(snapshot.presentation.is_none());
        assert_eq!(
            snapshot.error.map(|err| err.code),
            Some("UPSTREAM_ERROR".to_string())
        );
        assert!(!snapshot.is_loading);
    }

    #[tokio::test]
    async fn editing_a_field_clears_the_error() {
        let service = filled_service();
        let _ = service
            .submit(&FixedBackend::failing(PredictionErrorCode::Network))
            .await;
        assert!(service.snapshot().error.is_some());

        let snapshot = service.update_field(FormField::Deadlines, "7");
        assert!(snapshot.error.is_none());
        assert_eq!(snapshot.values.deadlines, "7");
    }

    #[test]
    fn reset_restores_defaults() {
        let service = filled_service();
        let snapshot = service.reset().expect("reset");
        assert_eq!(snapshot.values, FormValues::default());
        assert!(!snapshot.is_valid);
    }

    #[tokio::test]
    async fn abandoned_submission_returns_form_to_idle() {
        let service = filled_service();

        let abandoned =
            tokio::time::timeout(Duration::from_millis(20), service.submit(&StalledBackend)).await;
        assert!(abandoned.is_err());
        assert!(!service.is_loading());

        let backend = FixedBackend::scoring(4.0);
        let result = service.submit(&backend).await.expect("resubmission");
        assert_eq!(result.score, 4.0);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
        service.reset().expect("reset after recovery");
    }

    #[tokio::test]
    async fn reset_is_refused_while_loading() {
        let service = filled_service();
        let submission = service.submit(&StalledBackend);
        tokio::pin!(submission);

        let polled = tokio::time::timeout(Duration::from_millis(10), &mut submission).await;
        assert!(polled.is_err());
        assert!(service.is_loading());

        let error = service.reset().expect_err("loading");
        assert_eq!(error.to_string(), SUBMISSION_IN_PROGRESS);
        assert_eq!(service.snapshot().values.work_hours, "8");
    }
}
