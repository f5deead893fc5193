//! End-to-end tests for the form session: field events, submission,
//! rendering through the interactive loop, and the double-submit guard.

use std::sync::atomic::{AtomicUsize, Ordering};

use httpmock::prelude::*;
use serde_json::json;
use stress_predictor_lib::cli::interactive::run_session;
use stress_predictor_lib::commands::AppState;
use stress_predictor_lib::error::{AppError, AppResult};
use stress_predictor_lib::models::form::{FeatureVector, FormField};
use stress_predictor_lib::models::prediction::{PredictionBackend, PredictionResult};
use stress_predictor_lib::services::form_service::{FormService, SUBMISSION_IN_PROGRESS};
use stress_predictor_lib::services::prediction_service::PredictionClientConfig;
use tokio::io::BufReader;
use tokio::sync::Notify;

struct GatedBackend {
    started: Notify,
    gate: Notify,
    calls: AtomicUsize,
}

impl GatedBackend {
    fn new() -> Self {
        Self {
            started: Notify::new(),
            gate: Notify::new(),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait::async_trait]
impl PredictionBackend for GatedBackend {
    async fn predict(&self, features: &FeatureVector) -> AppResult<PredictionResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.started.notify_one();
        self.gate.notified().await;

        Ok(PredictionResult {
            score: features.as_slice()[1],
            server_status: None,
            correlation_id: "gated".into(),
            latency_ms: 0,
            received_at: "2025-01-01T00:00:00Z".into(),
        })
    }
}

fn filled_form() -> FormService {
    let form = FormService::new();
    form.update_field(FormField::WorkHours, "8");
    form.update_field(FormField::SleepHours, "7");
    form.update_field(FormField::WorkType, "onsite");
    form
}

#[tokio::test]
async fn second_submit_while_loading_is_rejected() {
    let form = filled_form();
    let backend = GatedBackend::new();

    let first = form.submit(&backend);
    let second = async {
        backend.started.notified().await;
        assert!(form.is_loading());
        let outcome = form.submit(&backend).await;
        backend.gate.notify_one();
        outcome
    };

    let (first, second) = futures::join!(first, second);

    let result = first.expect("first submission succeeds");
    assert_eq!(result.score, 5.0);

    let error = second.expect_err("second submission rejected");
    assert!(matches!(error, AppError::Validation { .. }));
    assert_eq!(error.to_string(), SUBMISSION_IN_PROGRESS);

    assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    assert!(!form.is_loading());
}

#[tokio::test]
async fn form_can_be_resubmitted_after_completion() {
    let form = filled_form();
    let backend = GatedBackend::new();
    backend.gate.notify_one();
    form.submit(&backend).await.expect("first");

    form.update_field(FormField::Deadlines, "9");
    backend.gate.notify_one();
    let result = form.submit(&backend).await.expect("second");
    assert_eq!(result.score, 9.0);
    assert_eq!(backend.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn interactive_session_fills_and_submits_the_form() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/predict")
                .json_body(json!({ "data": [8, 5, 7, 50, 1] }));
            then.status(200)
                .json_body(json!({ "predicted_stress_level": 9, "status": "success" }));
        })
        .await;

    let state = AppState::new(&PredictionClientConfig::new(server.base_url())).expect("state");

    // Field order differs from the feature order on purpose.
    let input = "\
set workType hybrid
set sleepHours 7

set workHours 8
show
submit
quit
set workHours 99
";
    let mut output = Vec::new();
    run_session(&state, BufReader::new(input.as_bytes()), &mut output)
        .await
        .expect("session runs");

    mock.assert_hits_async(1).await;

    let text = String::from_utf8(output).expect("utf8 output");
    assert!(text.contains("ready to submit"));
    assert!(text.contains("Predicting..."));
    assert!(text.contains("Stress level: 9.0 / 10"));
    assert!(text.contains("You desperately need a holiday!"));
    assert!(text.contains("CRITICAL"));

    // Lines after `quit` are never applied.
    assert_eq!(state.form().snapshot().values.work_hours, "8");
}

#[tokio::test]
async fn interactive_session_reports_errors_and_keeps_going() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/predict");
            then.status(500).json_body(json!({ "error": "model unavailable" }));
        })
        .await;

    let state = AppState::new(&PredictionClientConfig::new(server.base_url())).expect("state");

    let input = "\
dance
submit
set mood happy
set workHours 8
set sleepHours 7
set workType remote
submit
";
    let mut output = Vec::new();
    run_session(&state, BufReader::new(input.as_bytes()), &mut output)
        .await
        .expect("session runs to end of input");

    mock.assert_hits_async(1).await;

    let text = String::from_utf8(output).expect("utf8 output");
    assert!(text.contains("unknown command: dance"));
    assert!(text.contains("Error: workHours is required"));
    assert!(text.contains("Error: unknown form field: mood"));
    assert!(text.contains("Error: model unavailable"));
    assert!(!state.form().is_loading());
}
