//! Model bundle: a pre-fitted transformer and estimator pair
//!
//! The bundle is evaluated, never fitted. Parameters come straight from the
//! artifact file; this module only applies them.

use crate::models::error::InferenceError;
use crate::types::prediction::Prediction;
use serde::Deserialize;
use std::fmt;

/// Deterministic normalization of a raw feature row
pub trait Transformer: Send + Sync {
    fn name(&self) -> &str;

    /// Expected input width, when the artifact declares one
    fn width(&self) -> Option<usize>;

    fn transform(&self, row: &[f64]) -> Result<Vec<f64>, InferenceError>;
}

/// Deterministic mapping of a transformed row to one output value
pub trait Estimator: Send + Sync {
    fn name(&self) -> &str;

    fn width(&self) -> Option<usize>;

    /// Number of distinct cluster ids this estimator can emit, if it clusters
    fn cluster_count(&self) -> Option<usize>;

    fn predict(&self, row: &[f64]) -> Result<Prediction, InferenceError>;
}

/// Loaded artifact pair plus the column schema it was fit on
pub struct ModelBundle {
    feature_names: Vec<String>,
    transformer: Box<dyn Transformer>,
    estimator: Box<dyn Estimator>,
}

impl ModelBundle {
    pub fn new(
        feature_names: Vec<String>,
        transformer: Box<dyn Transformer>,
        estimator: Box<dyn Estimator>,
    ) -> Self {
        Self {
            feature_names,
            transformer,
            estimator,
        }
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn transformer(&self) -> &dyn Transformer {
        self.transformer.as_ref()
    }

    pub fn estimator(&self) -> &dyn Estimator {
        self.estimator.as_ref()
    }
}

impl fmt::Debug for ModelBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelBundle")
            .field("feature_names", &self.feature_names)
            .field("transformer", &self.transformer.name())
            .field("estimator", &self.estimator.name())
            .finish()
    }
}

/// Combined bundle file layout (`model_bundle.json`)
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BundleFile {
    /// Column names in the order the scaler and model were fit on
    pub feature_names: Vec<String>,
    pub scaler: ScalerParams,
    pub model: EstimatorParams,
}

/// Serialized scaler parameters
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScalerParams {
    /// `(x - mean) / scale`, per column
    Standard { mean: Vec<f64>, scale: Vec<f64> },
    /// Identity; for models trained on unscaled input
    Passthrough,
}

/// Serialized estimator parameters
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EstimatorParams {
    Linear { coefficients: Vec<f64>, intercept: f64 },
    Kmeans { centroids: Vec<Vec<f64>> },
}

impl BundleFile {
    /// Check internal consistency and build the runtime bundle.
    ///
    /// Returns a human-readable reason on the first inconsistency.
    pub fn into_bundle(self) -> Result<ModelBundle, String> {
        let width = self.feature_names.len();
        if width == 0 {
            return Err("feature_names is empty".to_string());
        }
        if let Some(dup) = self
            .feature_names
            .iter()
            .enumerate()
            .find(|(i, name)| self.feature_names[..*i].contains(*name))
            .map(|(_, name)| name)
        {
            return Err(format!("feature '{}' listed more than once", dup));
        }

        let transformer: Box<dyn Transformer> = match self.scaler {
            ScalerParams::Standard { mean, scale } => {
                Box::new(StandardScaler::new(mean, scale, width)?)
            }
            ScalerParams::Passthrough => Box::new(Passthrough { width }),
        };

        let estimator: Box<dyn Estimator> = match self.model {
            EstimatorParams::Linear {
                coefficients,
                intercept,
            } => Box::new(LinearRegressor::new(coefficients, intercept, width)?),
            EstimatorParams::Kmeans { centroids } => {
                Box::new(NearestCentroid::new(centroids, width)?)
            }
        };

        Ok(ModelBundle::new(self.feature_names, transformer, estimator))
    }
}

fn check_width(stage: &'static str, expected: usize, row: &[f64]) -> Result<(), InferenceError> {
    if row.len() != expected {
        return Err(InferenceError::Width {
            stage,
            expected,
            found: row.len(),
        });
    }
    Ok(())
}

fn check_finite(stage: &'static str, values: &[f64]) -> Result<(), InferenceError> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(InferenceError::NonFinite { stage })
    }
}

fn check_params(field: &str, values: &[f64], width: usize) -> Result<(), String> {
    if values.len() != width {
        return Err(format!(
            "{} has {} entries, expected {}",
            field,
            values.len(),
            width
        ));
    }
    if !values.iter().all(|v| v.is_finite()) {
        return Err(format!("{} contains non-finite values", field));
    }
    Ok(())
}

/// Per-column standardization with fitted mean and scale
#[derive(Debug, Clone)]
pub struct StandardScaler {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl StandardScaler {
    pub fn new(mean: Vec<f64>, scale: Vec<f64>, width: usize) -> Result<Self, String> {
        check_params("scaler.mean", &mean, width)?;
        check_params("scaler.scale", &scale, width)?;
        if scale.iter().any(|s| *s == 0.0) {
            return Err("scaler.scale contains zero".to_string());
        }
        Ok(Self { mean, scale })
    }
}

impl Transformer for StandardScaler {
    fn name(&self) -> &str {
        "standard_scaler"
    }

    fn width(&self) -> Option<usize> {
        Some(self.mean.len())
    }

    fn transform(&self, row: &[f64]) -> Result<Vec<f64>, InferenceError> {
        check_width("scaler", self.mean.len(), row)?;
        let scaled: Vec<f64> = row
            .iter()
            .zip(self.mean.iter().zip(self.scale.iter()))
            .map(|(x, (mean, scale))| (x - mean) / scale)
            .collect();
        check_finite("scaler", &scaled)?;
        Ok(scaled)
    }
}

/// Identity transform
#[derive(Debug, Clone)]
pub struct Passthrough {
    width: usize,
}

impl Transformer for Passthrough {
    fn name(&self) -> &str {
        "passthrough"
    }

    fn width(&self) -> Option<usize> {
        Some(self.width)
    }

    fn transform(&self, row: &[f64]) -> Result<Vec<f64>, InferenceError> {
        check_width("scaler", self.width, row)?;
        check_finite("scaler", row)?;
        Ok(row.to_vec())
    }
}

/// Fitted linear model: `coefficients · x + intercept`
#[derive(Debug, Clone)]
pub struct LinearRegressor {
    coefficients: Vec<f64>,
    intercept: f64,
}

impl LinearRegressor {
    pub fn new(coefficients: Vec<f64>, intercept: f64, width: usize) -> Result<Self, String> {
        check_params("model.coefficients", &coefficients, width)?;
        if !intercept.is_finite() {
            return Err("model.intercept is not finite".to_string());
        }
        Ok(Self {
            coefficients,
            intercept,
        })
    }
}

impl Estimator for LinearRegressor {
    fn name(&self) -> &str {
        "linear"
    }

    fn width(&self) -> Option<usize> {
        Some(self.coefficients.len())
    }

    fn cluster_count(&self) -> Option<usize> {
        None
    }

    fn predict(&self, row: &[f64]) -> Result<Prediction, InferenceError> {
        check_width("model", self.coefficients.len(), row)?;
        let value = self
            .coefficients
            .iter()
            .zip(row.iter())
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.intercept;
        check_finite("model", &[value])?;
        Ok(Prediction::Scalar(value))
    }
}

/// Fitted k-means model: assigns the index of the nearest centroid
#[derive(Debug, Clone)]
pub struct NearestCentroid {
    centroids: Vec<Vec<f64>>,
    width: usize,
}

impl NearestCentroid {
    pub fn new(centroids: Vec<Vec<f64>>, width: usize) -> Result<Self, String> {
        if centroids.is_empty() {
            return Err("model.centroids is empty".to_string());
        }
        for (i, centroid) in centroids.iter().enumerate() {
            check_params(&format!("model.centroids[{}]", i), centroid, width)?;
        }
        Ok(Self { centroids, width })
    }
}

impl Estimator for NearestCentroid {
    fn name(&self) -> &str {
        "kmeans"
    }

    fn width(&self) -> Option<usize> {
        Some(self.width)
    }

    fn cluster_count(&self) -> Option<usize> {
        Some(self.centroids.len())
    }

    fn predict(&self, row: &[f64]) -> Result<Prediction, InferenceError> {
        check_width("model", self.width, row)?;

        // Ties go to the lowest cluster index
        let mut min_distance = f64::INFINITY;
        let mut closest_cluster = 0;

        for (cluster_idx, centroid) in self.centroids.iter().enumerate() {
            let distance: f64 = row
                .iter()
                .zip(centroid.iter())
                .map(|(a, b)| (a - b).powi(2))
                .sum();

            if distance < min_distance {
                min_distance = distance;
                closest_cluster = cluster_idx;
            }
        }

        Ok(Prediction::Cluster(closest_cluster))
    }
}
