//! Inference engine: transform then predict, one record at a time

use crate::models::bundle::ModelBundle;
use crate::models::error::InferenceError;
use crate::types::prediction::Prediction;
use crate::types::record::InputRecord;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Runs the loaded bundle against single input records
#[derive(Debug, Clone)]
pub struct InferenceEngine {
    bundle: Arc<ModelBundle>,
}

impl InferenceEngine {
    pub fn new(bundle: Arc<ModelBundle>) -> Self {
        Self { bundle }
    }

    pub fn bundle(&self) -> &ModelBundle {
        &self.bundle
    }

    /// Column names the bundle expects, in order
    pub fn feature_names(&self) -> &[String] {
        self.bundle.feature_names()
    }

    /// Apply the transformer, then the estimator, to one record.
    ///
    /// Pure with respect to the bundle: the same record always yields the
    /// same prediction.
    pub fn predict(&self, record: &InputRecord) -> Result<Prediction, InferenceError> {
        let start = Instant::now();

        let row = record.to_row(self.bundle.feature_names())?;
        let transformed = self.bundle.transformer().transform(&row)?;
        let prediction = self.bundle.estimator().predict(&transformed)?;

        debug!(
            estimator = self.bundle.estimator().name(),
            prediction = %prediction,
            elapsed_us = start.elapsed().as_micros() as u64,
            "Inference complete"
        );

        Ok(prediction)
    }
}
