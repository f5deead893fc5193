// Error taxonomy and recovery: every failure is terminal for its submission
// and leaves the form idle and re-submittable.

use httpmock::prelude::*;
use serde_json::json;
use stress_predictor_lib::commands::prediction::{
    form_get, form_update_field, prediction_submit, prediction_submit_values,
};
use stress_predictor_lib::commands::{AppState, CommandError};
use stress_predictor_lib::error::{AppError, PredictionErrorCode};
use stress_predictor_lib::models::form::FormValues;
use stress_predictor_lib::services::prediction_service::PredictionClientConfig;

fn filled_values() -> FormValues {
    FormValues {
        work_hours: "10".into(),
        deadlines: "8".into(),
        sleep_hours: "5".into(),
        productivity: "40".into(),
        work_type: "2".into(),
    }
}

#[test]
fn command_error_codes_follow_taxonomy() {
    let cases = [
        (PredictionErrorCode::Network, "NETWORK_ERROR"),
        (PredictionErrorCode::Upstream, "UPSTREAM_ERROR"),
        (PredictionErrorCode::InvalidResponse, "INVALID_RESPONSE"),
    ];

    for (code, expected) in cases {
        let error = CommandError::from(AppError::prediction(code, "boom"));
        assert_eq!(error.code, expected);
        assert_eq!(error.message, "boom");
        assert_eq!(error.details, None);
    }

    let error = CommandError::from(AppError::config("bad url"));
    assert_eq!(error.code, "CONFIG_ERROR");

    let error = CommandError::from(AppError::field_validation("deadlines", "too many"));
    assert_eq!(error.code, "VALIDATION_ERROR");
    assert_eq!(error.details, Some(json!({ "field": "deadlines" })));
}

#[tokio::test]
async fn network_failure_leaves_form_resubmittable() {
    let state =
        AppState::new(&PredictionClientConfig::new("http://127.0.0.1:1")).expect("app state");

    let error = prediction_submit_values(&state, filled_values())
        .await
        .expect_err("nothing listening");
    assert_eq!(error.code, "NETWORK_ERROR");
    assert_eq!(
        error.message,
        "Failed to get prediction. Please check if the server is running."
    );

    let snapshot = form_get(&state);
    assert!(!snapshot.is_loading);
    assert!(snapshot.is_valid);
    assert_eq!(snapshot.error.map(|err| err.code), Some("NETWORK_ERROR".to_string()));

    // The same form can be sent again without re-entering it.
    let error = prediction_submit(&state).await.expect_err("still down");
    assert_eq!(error.code, "NETWORK_ERROR");
}

#[tokio::test]
async fn invalid_response_renders_no_score() {
    let server = MockServer::start_async().await;
    let _mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/predict");
            then.status(200).json_body(json!({}));
        })
        .await;
    let state = AppState::new(&PredictionClientConfig::new(server.base_url())).expect("state");

    let error = prediction_submit_values(&state, filled_values())
        .await
        .expect_err("no score field");
    assert_eq!(error.code, "INVALID_RESPONSE");
    assert_eq!(error.message, "Invalid response from server");

    let snapshot = form_get(&state);
    assert!(snapshot.result.is_none());
    assert!(snapshot.presentation.is_none());
}

#[tokio::test]
async fn success_after_failure_replaces_error_with_result() {
    let server = MockServer::start_async().await;
    let mut failing = server
        .mock_async(|when, then| {
            when.method(POST).path("/predict");
            then.status(500).json_body(json!({ "error": "model unavailable" }));
        })
        .await;
    let state = AppState::new(&PredictionClientConfig::new(server.base_url())).expect("state");

    let error = prediction_submit_values(&state, filled_values())
        .await
        .expect_err("first attempt fails");
    assert_eq!(error.message, "model unavailable");

    failing.delete_async().await;
    let _healthy = server
        .mock_async(|when, then| {
            when.method(POST).path("/predict");
            then.status(200).json_body(json!({ "predicted_stress_level": 1.5 }));
        })
        .await;

    let outcome = prediction_submit(&state).await.expect("second attempt");
    assert_eq!(
        outcome.presentation.message,
        "🌟 Zen mode activated! Perfect harmony!"
    );

    let snapshot = form_get(&state);
    assert!(snapshot.error.is_none());
    assert_eq!(snapshot.result.map(|result| result.score), Some(1.5));
}

#[tokio::test]
async fn editing_after_error_clears_it() {
    let server = MockServer::start_async().await;
    let _mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/predict");
            then.status(400).json_body(json!({ "error": "Expected 5 features, got 4" }));
        })
        .await;
    let state = AppState::new(&PredictionClientConfig::new(server.base_url())).expect("state");

    let error = prediction_submit_values(&state, filled_values())
        .await
        .expect_err("bad request");
    assert_eq!(error.code, "UPSTREAM_ERROR");
    assert_eq!(error.message, "Expected 5 features, got 4");
    assert!(form_get(&state).error.is_some());

    let snapshot = form_update_field(&state, "productivity", "60").expect("update");
    assert!(snapshot.error.is_none());
}
