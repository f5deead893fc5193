use serde_json::{json, Value as JsonValue};

use crate::error::AppResult;
use crate::models::form::{FeatureVector, FormInput, FormValues};
use crate::models::prediction::PredictRequest;

/// Orders the validated input the way the model expects it.
pub fn build_feature_vector(input: &FormInput) -> FeatureVector {
    FeatureVector::new([
        input.work_hours,
        f64::from(input.deadlines),
        input.sleep_hours,
        f64::from(input.productivity),
        f64::from(input.work_type.code()),
    ])
}

/// Validates raw form values and builds the feature vector in one step.
pub fn features_from_form(values: &FormValues) -> AppResult<FeatureVector> {
    let input = FormInput::try_from(values)?;
    Ok(build_feature_vector(&input))
}

pub fn build_predict_request(features: FeatureVector) -> PredictRequest {
    PredictRequest { data: features }
}

pub fn build_predict_payload(features: &FeatureVector) -> JsonValue {
    json!({ "data": features })
}
