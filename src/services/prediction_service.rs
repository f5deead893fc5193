use std::time::{Duration as StdDuration, Instant};

use chrono::Utc;
use reqwest::{RequestBuilder, StatusCode, Url};
use serde_json::{json, Value as JsonValue};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{
    AppError, AppResult, PredictionErrorCode, INVALID_RESPONSE_MESSAGE, NETWORK_ERROR_MESSAGE,
    UPSTREAM_ERROR_MESSAGE,
};
use crate::models::form::FeatureVector;
use crate::models::prediction::{HealthStatus, PredictionBackend, PredictionResult};
use crate::services::payload::{build_predict_payload, build_predict_request};

pub const API_URL_ENV: &str = "STRESS_PREDICTOR_API_URL";
pub const DEFAULT_API_URL: &str = "https://stress-level-detection.onrender.com";

const PREDICT_PATH: &str = "/predict";
const HEALTH_PATH: &str = "/health";
const SCORE_FIELD: &str = "predicted_stress_level";

/// Connection settings for the prediction service, resolved once at start-up.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionClientConfig {
    pub base_url: String,
    /// `None` waits for the server indefinitely.
    pub http_timeout: Option<StdDuration>,
}

impl Default for PredictionClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

impl PredictionClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http_timeout: None,
        }
    }

    pub fn from_env() -> Self {
        let base_url = std::env::var(API_URL_ENV)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        Self::new(base_url)
    }

    pub fn with_timeout(mut self, timeout: Option<StdDuration>) -> Self {
        self.http_timeout = timeout;
        self
    }
}

/// HTTP client for the `/predict` and `/health` endpoints.
#[derive(Debug, Clone)]
pub struct PredictionClient {
    client: reqwest::Client,
    base_url: String,
    predict_endpoint: String,
    health_endpoint: String,
}

struct RawResponse {
    status: StatusCode,
    body: Option<JsonValue>,
    latency_ms: u128,
}

impl PredictionClient {
    pub fn new(config: &PredictionClientConfig) -> AppResult<Self> {
        let base_url = config.base_url.trim().trim_end_matches('/').to_string();

        let parsed = Url::parse(&base_url)
            .map_err(|err| AppError::config(format!("invalid api url '{base_url}': {err}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(AppError::config(format!(
                "api url must use http or https: {base_url}"
            )));
        }

        let mut builder = reqwest::Client::builder()
            .pool_max_idle_per_host(2)
            .pool_idle_timeout(Some(StdDuration::from_secs(90)));
        if let Some(timeout) = config.http_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|err| AppError::other(format!("failed to build http client: {err}")))?;

        Ok(Self {
            client,
            predict_endpoint: format!("{base_url}{PREDICT_PATH}"),
            health_endpoint: format!("{base_url}{HEALTH_PATH}"),
            base_url,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sends one prediction request. Never retries.
    pub async fn predict(&self, features: &FeatureVector) -> AppResult<PredictionResult> {
        let correlation_id = Uuid::new_v4().to_string();
        let request = build_predict_request(*features);

        debug!(
            target: "app::prediction",
            correlation_id = %correlation_id,
            endpoint = %self.predict_endpoint,
            payload = %build_predict_payload(features),
            "requesting stress prediction"
        );

        let raw = self
            .execute(
                self.client.post(&self.predict_endpoint).json(&request),
                &correlation_id,
            )
            .await?;

        if !raw.status.is_success() {
            return Err(Self::map_http_error(
                raw.status,
                raw.body.as_ref(),
                &correlation_id,
            ));
        }

        let body = raw.body.ok_or_else(|| {
            AppError::prediction_with_details(
                PredictionErrorCode::InvalidResponse,
                INVALID_RESPONSE_MESSAGE,
                Some(correlation_id.as_str()),
                Some(json!({ "reason": "invalid_json" })),
            )
        })?;

        let score = body
            .get(SCORE_FIELD)
            .and_then(|value| value.as_f64())
            .ok_or_else(|| {
                AppError::prediction_with_details(
                    PredictionErrorCode::InvalidResponse,
                    INVALID_RESPONSE_MESSAGE,
                    Some(correlation_id.as_str()),
                    Some(json!({ "reason": "missing_predicted_stress_level" })),
                )
            })?;

        let server_status = body
            .get("status")
            .and_then(|value| value.as_str())
            .map(|value| value.to_string());

        info!(
            target: "app::prediction",
            correlation_id = %correlation_id,
            score,
            latency_ms = raw.latency_ms,
            "stress prediction received"
        );

        Ok(PredictionResult {
            score,
            server_status,
            correlation_id,
            latency_ms: raw.latency_ms,
            received_at: Utc::now().to_rfc3339(),
        })
    }

    pub async fn health(&self) -> AppResult<HealthStatus> {
        let correlation_id = Uuid::new_v4().to_string();

        debug!(
            target: "app::prediction",
            correlation_id = %correlation_id,
            endpoint = %self.health_endpoint,
            "checking prediction service health"
        );

        let raw = self
            .execute(self.client.get(&self.health_endpoint), &correlation_id)
            .await?;

        if !raw.status.is_success() {
            return Err(Self::map_http_error(
                raw.status,
                raw.body.as_ref(),
                &correlation_id,
            ));
        }

        let body = raw.body.unwrap_or(JsonValue::Null);
        serde_json::from_value::<HealthStatus>(body).map_err(|err| {
            AppError::prediction_with_details(
                PredictionErrorCode::InvalidResponse,
                INVALID_RESPONSE_MESSAGE,
                Some(correlation_id.as_str()),
                Some(json!({ "reason": err.to_string() })),
            )
        })
    }

    async fn execute(&self, request: RequestBuilder, correlation_id: &str) -> AppResult<RawResponse> {
        let start = Instant::now();

        let response = request
            .send()
            .await
            .map_err(|err| Self::error_from_reqwest(err, correlation_id))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|err| Self::error_from_reqwest(err, correlation_id))?;
        let latency_ms = start.elapsed().as_millis();

        debug!(
            target: "app::prediction",
            correlation_id = %correlation_id,
            status = status.as_u16(),
            latency_ms,
            content_length = bytes.len(),
            "prediction service responded"
        );

        // Error pages are often HTML; absence of a JSON body is handled by callers.
        let body = serde_json::from_slice::<JsonValue>(&bytes).ok();

        Ok(RawResponse {
            status,
            body,
            latency_ms,
        })
    }

    fn map_http_error(status: StatusCode, body: Option<&JsonValue>, correlation_id: &str) -> AppError {
        let server_message = body
            .and_then(|value| value.get("error"))
            .and_then(|value| value.as_str())
            .map(str::trim)
            .filter(|value| !value.is_empty());

        warn!(
            target: "app::prediction",
            correlation_id = %correlation_id,
            status = status.as_u16(),
            has_server_message = server_message.is_some(),
            "prediction service returned non-success status"
        );

        AppError::prediction_with_details(
            PredictionErrorCode::Upstream,
            server_message.unwrap_or(UPSTREAM_ERROR_MESSAGE),
            Some(correlation_id),
            Some(json!({ "status": status.as_u16() })),
        )
    }

    fn error_from_reqwest(err: reqwest::Error, correlation_id: &str) -> AppError {
        let reason = if err.is_timeout() {
            "timeout"
        } else if err.is_connect() {
            "connect"
        } else if err.is_body() || err.is_decode() {
            "body"
        } else {
            "request"
        };

        warn!(
            target: "app::prediction",
            correlation_id = %correlation_id,
            reason,
            error = %err,
            "prediction request failed"
        );

        AppError::prediction_with_details(
            PredictionErrorCode::Network,
            NETWORK_ERROR_MESSAGE,
            Some(correlation_id),
            Some(json!({ "reason": reason })),
        )
    }
}

#[async_trait::async_trait]
impl PredictionBackend for PredictionClient {
    async fn predict(&self, features: &FeatureVector) -> AppResult<PredictionResult> {
        PredictionClient::predict(self, features).await
    }
}

pub mod testing {
    use super::*;

    /// Expose upstream error mapping for integration tests without widening the public API surface.
    pub fn map_http_error(status: StatusCode, body: Option<&JsonValue>) -> AppError {
        PredictionClient::map_http_error(status, body, "test-correlation-id")
    }
}
