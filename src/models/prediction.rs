use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::models::form::FeatureVector;

/// Body of `POST /predict`.
#[derive(Debug, Clone, Serialize)]
pub struct PredictRequest {
    pub data: FeatureVector,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResult {
    pub score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_status: Option<String>,
    pub correlation_id: String,
    pub latency_ms: u128,
    pub received_at: String,
}

/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub model_loaded: bool,
    #[serde(default)]
    pub scaler_loaded: bool,
}

impl HealthStatus {
    pub fn is_ready(&self) -> bool {
        self.status == "healthy" && self.model_loaded && self.scaler_loaded
    }
}

/// Anything able to score a feature vector; the HTTP client in production.
#[async_trait::async_trait]
pub trait PredictionBackend: Send + Sync {
    async fn predict(&self, features: &FeatureVector) -> AppResult<PredictionResult>;
}
