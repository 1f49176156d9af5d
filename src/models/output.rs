//! Conversion of raw estimator output tensors into predictions

use crate::models::error::InferenceError;
use crate::types::prediction::Prediction;

/// Integer label tensor → cluster id (first element)
pub fn prediction_from_labels(labels: &[i64]) -> Result<Prediction, InferenceError> {
    let label = labels
        .first()
        .copied()
        .ok_or_else(|| InferenceError::Backend("empty label tensor".to_string()))?;
    let cluster = usize::try_from(label)
        .map_err(|_| InferenceError::Backend(format!("negative cluster label {}", label)))?;
    Ok(Prediction::Cluster(cluster))
}

/// Float output tensor → scalar prediction (first element)
pub fn prediction_from_values(values: &[f32]) -> Result<Prediction, InferenceError> {
    let value = values
        .first()
        .map(|&v| v as f64)
        .ok_or_else(|| InferenceError::Backend("empty output tensor".to_string()))?;
    if !value.is_finite() {
        return Err(InferenceError::NonFinite { stage: "model" });
    }
    Ok(Prediction::Scalar(value))
}

/// Float scaler output → transformed row
pub fn scaled_row(values: &[f32]) -> Result<Vec<f64>, InferenceError> {
    let scaled: Vec<f64> = values.iter().map(|&v| v as f64).collect();
    if scaled.iter().any(|v| !v.is_finite()) {
        return Err(InferenceError::NonFinite { stage: "scaler" });
    }
    Ok(scaled)
}
