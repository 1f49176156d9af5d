//! ONNX Runtime backend for exported scaler / model graphs

use crate::models::bundle::{Estimator, Transformer};
use crate::models::error::{ArtifactError, InferenceError};
use crate::models::output::{prediction_from_labels, prediction_from_values, scaled_row};
use crate::types::prediction::Prediction;
use ort::session::{builder::GraphOptimizationLevel, Session, SessionOutputs};
use ort::value::Tensor;
use std::fmt;
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info};

/// ONNX session with its resolved input/output names
struct OnnxGraph {
    name: String,
    session: Mutex<Session>,
    input_name: String,
    output_name: String,
}

impl OnnxGraph {
    fn load(path: &Path, name: &str, threads: usize) -> Result<Self, ArtifactError> {
        info!(model = %name, path = %path.display(), threads, "Loading ONNX graph");

        let session = Session::builder()
            .map_err(|e| load_error(path, e))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| load_error(path, e))?
            .with_intra_threads(threads)
            .map_err(|e| load_error(path, e))?
            .commit_from_file(path)
            .map_err(|e| load_error(path, e))?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .unwrap_or_else(|| "float_input".to_string());

        // skl2onnx classifiers emit (label, probabilities); the label is what we want
        let output_name = session
            .outputs
            .iter()
            .find(|o| o.name.contains("label") || o.name.contains("variable"))
            .or_else(|| session.outputs.first())
            .map(|o| o.name.clone())
            .unwrap_or_else(|| "variable".to_string());

        info!(
            model = %name,
            input = %input_name,
            output = %output_name,
            "ONNX graph loaded"
        );

        Ok(Self {
            name: name.to_string(),
            session: Mutex::new(session),
            input_name,
            output_name,
        })
    }

    /// Run the graph on a single row and hand the outputs to `extract`
    fn run<T>(
        &self,
        row: &[f64],
        extract: impl FnOnce(&SessionOutputs, &str) -> Result<T, InferenceError>,
    ) -> Result<T, InferenceError> {
        // Input tensor - shape [1, num_features]
        let shape = vec![1_i64, row.len() as i64];
        let data: Vec<f32> = row.iter().map(|&v| v as f32).collect();
        let input_tensor = Tensor::from_array((shape, data)).map_err(|e| self.run_error(e))?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| InferenceError::Backend(format!("Lock error: {}", e)))?;

        let outputs = session
            .run(ort::inputs![self.input_name.as_str() => input_tensor])
            .map_err(|e| self.run_error(e))?;

        extract(&outputs, &self.output_name)
    }

    fn run_error(&self, e: impl fmt::Display) -> InferenceError {
        InferenceError::Backend(format!("{}: {}", self.name, e))
    }
}

fn load_error(path: &Path, e: impl fmt::Display) -> ArtifactError {
    ArtifactError::Backend {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}

/// Scaler exported to ONNX
pub struct OnnxTransformer {
    graph: OnnxGraph,
}

impl OnnxTransformer {
    pub fn load(path: &Path, threads: usize) -> Result<Self, ArtifactError> {
        Ok(Self {
            graph: OnnxGraph::load(path, "scaler", threads)?,
        })
    }
}

impl Transformer for OnnxTransformer {
    fn name(&self) -> &str {
        "onnx_scaler"
    }

    fn width(&self) -> Option<usize> {
        None
    }

    fn transform(&self, row: &[f64]) -> Result<Vec<f64>, InferenceError> {
        self.graph.run(row, |outputs, output_name| {
            let output = outputs
                .get(output_name)
                .ok_or_else(|| InferenceError::Backend(format!("missing output '{}'", output_name)))?;
            let (_, data) = output
                .try_extract_tensor::<f32>()
                .map_err(|e| InferenceError::Backend(e.to_string()))?;
            let scaled = scaled_row(data)?;
            debug!(width = scaled.len(), "ONNX scaler applied");
            Ok(scaled)
        })
    }
}

/// Regressor or clusterer exported to ONNX
pub struct OnnxEstimator {
    graph: OnnxGraph,
}

impl OnnxEstimator {
    pub fn load(path: &Path, threads: usize) -> Result<Self, ArtifactError> {
        Ok(Self {
            graph: OnnxGraph::load(path, "model", threads)?,
        })
    }
}

impl Estimator for OnnxEstimator {
    fn name(&self) -> &str {
        "onnx_model"
    }

    fn width(&self) -> Option<usize> {
        None
    }

    fn cluster_count(&self) -> Option<usize> {
        None
    }

    fn predict(&self, row: &[f64]) -> Result<Prediction, InferenceError> {
        self.graph.run(row, |outputs, output_name| {
            let output = outputs
                .get(output_name)
                .ok_or_else(|| InferenceError::Backend(format!("missing output '{}'", output_name)))?;

            // Integer labels are cluster ids; float outputs are regression values
            if let Ok((_, labels)) = output.try_extract_tensor::<i64>() {
                return prediction_from_labels(labels);
            }

            let (_, values) = output
                .try_extract_tensor::<f32>()
                .map_err(|e| InferenceError::Backend(e.to_string()))?;
            prediction_from_values(values)
        })
    }
}
