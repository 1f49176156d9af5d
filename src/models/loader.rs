//! Artifact loader: deserializes the model bundle once and caches it

use crate::config::{ArtifactFormat, ArtifactsConfig};
use crate::models::bundle::{BundleFile, ModelBundle};
use crate::models::error::ArtifactError;
use once_cell::sync::OnceCell;
use serde_json::error::Category;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// File name of the combined JSON bundle
pub const BUNDLE_FILE: &str = "model_bundle.json";
/// File names of the ONNX scaler / model pair
pub const ONNX_SCALER_FILE: &str = "scaler.onnx";
pub const ONNX_MODEL_FILE: &str = "model.onnx";

/// Column contract the loaded bundle must satisfy
#[derive(Debug, Clone)]
pub struct SchemaContract {
    /// Feature names in form order
    pub columns: Vec<String>,
    /// Largest number of clusters the presentation layer can describe
    pub max_clusters: Option<usize>,
}

/// Lazily loads the model bundle and hands out the cached instance
pub struct ArtifactLoader {
    dir: PathBuf,
    format: ArtifactFormat,
    onnx_threads: usize,
    contract: SchemaContract,
    bundle: OnceCell<Arc<ModelBundle>>,
    loads: AtomicUsize,
}

impl ArtifactLoader {
    /// Create a loader for the configured artifact directory
    pub fn new(config: &ArtifactsConfig, contract: SchemaContract) -> Self {
        Self {
            dir: config.dir.clone(),
            format: config.format,
            onnx_threads: config.onnx_threads.max(1),
            contract,
            bundle: OnceCell::new(),
            loads: AtomicUsize::new(0),
        }
    }

    /// Return the cached bundle, deserializing it on first demand.
    ///
    /// A failed load is not cached; the next call tries again.
    pub fn load(&self) -> Result<Arc<ModelBundle>, ArtifactError> {
        self.bundle
            .get_or_try_init(|| -> Result<Arc<ModelBundle>, ArtifactError> {
                self.loads.fetch_add(1, Ordering::SeqCst);
                let bundle = match self.format {
                    ArtifactFormat::Json => self.load_json()?,
                    ArtifactFormat::Onnx => self.load_onnx()?,
                };
                self.check_contract(&bundle)?;
                info!(
                    dir = %self.dir.display(),
                    format = ?self.format,
                    transformer = bundle.transformer().name(),
                    estimator = bundle.estimator().name(),
                    features = bundle.feature_names().len(),
                    "Model bundle loaded"
                );
                Ok(Arc::new(bundle))
            })
            .map(Arc::clone)
    }

    /// Whether a bundle is already cached
    pub fn is_loaded(&self) -> bool {
        self.bundle.get().is_some()
    }

    /// Number of deserialization attempts so far
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn contract(&self) -> &SchemaContract {
        &self.contract
    }

    fn load_json(&self) -> Result<ModelBundle, ArtifactError> {
        let path = self.dir.join(BUNDLE_FILE);
        let bytes = read_artifact(&path)?;

        let file: BundleFile = serde_json::from_slice(&bytes).map_err(|e| match e.classify() {
            Category::Data => ArtifactError::Schema {
                path: path.clone(),
                reason: e.to_string(),
            },
            Category::Io | Category::Syntax | Category::Eof => ArtifactError::Corrupt {
                path: path.clone(),
                source: e,
            },
        })?;

        debug!(path = %path.display(), "Bundle file parsed");

        file.into_bundle()
            .map_err(|reason| ArtifactError::Schema { path, reason })
    }

    #[cfg(feature = "onnx")]
    fn load_onnx(&self) -> Result<ModelBundle, ArtifactError> {
        use crate::models::onnx::{OnnxEstimator, OnnxTransformer};

        let scaler_path = self.dir.join(ONNX_SCALER_FILE);
        let model_path = self.dir.join(ONNX_MODEL_FILE);
        for path in [&scaler_path, &model_path] {
            if !path.exists() {
                return Err(ArtifactError::Missing { path: path.clone() });
            }
        }

        let transformer = OnnxTransformer::load(&scaler_path, self.onnx_threads)?;
        let estimator = OnnxEstimator::load(&model_path, self.onnx_threads)?;

        // ONNX graphs carry no column names; the form schema stands in for them
        Ok(ModelBundle::new(
            self.contract.columns.clone(),
            Box::new(transformer),
            Box::new(estimator),
        ))
    }

    #[cfg(not(feature = "onnx"))]
    fn load_onnx(&self) -> Result<ModelBundle, ArtifactError> {
        let _ = self.onnx_threads;
        Err(ArtifactError::Unsupported("onnx"))
    }

    fn check_contract(&self, bundle: &ModelBundle) -> Result<(), ArtifactError> {
        let schema_error = |reason: String| ArtifactError::Schema {
            path: self.dir.clone(),
            reason,
        };

        if bundle.feature_names() != self.contract.columns.as_slice() {
            return Err(schema_error(format!(
                "bundle was fit on columns [{}] but the form provides [{}]",
                bundle.feature_names().join(", "),
                self.contract.columns.join(", ")
            )));
        }

        if let (Some(clusters), Some(max)) = (
            bundle.estimator().cluster_count(),
            self.contract.max_clusters,
        ) {
            if clusters > max {
                return Err(schema_error(format!(
                    "model emits {} clusters but only {} are described",
                    clusters, max
                )));
            }
        }

        Ok(())
    }
}

fn read_artifact(path: &Path) -> Result<Vec<u8>, ArtifactError> {
    std::fs::read(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            ArtifactError::Missing {
                path: path.to_path_buf(),
            }
        } else {
            ArtifactError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const SCALAR_BUNDLE: &str = r#"{
        "feature_names": ["feature1", "feature2", "feature3"],
        "scaler": { "kind": "standard", "mean": [1.0, 2.0, 3.0], "scale": [1.0, 2.0, 4.0] },
        "model": { "kind": "linear", "coefficients": [1.0, 1.0, 1.0], "intercept": 10.0 }
    }"#;

    fn contract() -> SchemaContract {
        SchemaContract {
            columns: vec!["feature1".into(), "feature2".into(), "feature3".into()],
            max_clusters: None,
        }
    }

    fn loader_for(dir: &TempDir, contract: SchemaContract) -> ArtifactLoader {
        let config = ArtifactsConfig {
            dir: dir.path().to_path_buf(),
            ..ArtifactsConfig::default()
        };
        ArtifactLoader::new(&config, contract)
    }

    fn write_bundle(dir: &TempDir, contents: &str) {
        fs::write(dir.path().join(BUNDLE_FILE), contents).unwrap();
    }

    #[test]
    fn test_load_is_cached() {
        let dir = TempDir::new().unwrap();
        write_bundle(&dir, SCALAR_BUNDLE);
        let loader = loader_for(&dir, contract());

        assert!(!loader.is_loaded());
        let first = loader.load().unwrap();
        let second = loader.load().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(loader.load_count(), 1);
        assert!(loader.is_loaded());
    }

    #[test]
    fn test_cached_bundle_survives_file_removal() {
        let dir = TempDir::new().unwrap();
        write_bundle(&dir, SCALAR_BUNDLE);
        let loader = loader_for(&dir, contract());

        loader.load().unwrap();
        fs::remove_file(dir.path().join(BUNDLE_FILE)).unwrap();
        assert!(loader.load().is_ok());
        assert_eq!(loader.load_count(), 1);
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let loader = loader_for(&dir, contract());

        let err = loader.load().unwrap_err();
        assert!(matches!(err, ArtifactError::Missing { .. }));
        assert!(!loader.is_loaded());
    }

    #[test]
    fn test_unreadable_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join(BUNDLE_FILE)).unwrap();
        let loader = loader_for(&dir, contract());

        match loader.load().unwrap_err() {
            ArtifactError::Io { path, .. } => assert_eq!(path, dir.path().join(BUNDLE_FILE)),
            other => panic!("unexpected error: {other}"),
        }
        assert!(!loader.is_loaded());
    }

    #[test]
    fn test_corrupt_file() {
        let dir = TempDir::new().unwrap();
        write_bundle(&dir, "{ \"feature_names\": [");
        let loader = loader_for(&dir, contract());

        assert!(matches!(
            loader.load().unwrap_err(),
            ArtifactError::Corrupt { .. }
        ));
    }

    #[test]
    fn test_missing_key_is_schema_error() {
        let dir = TempDir::new().unwrap();
        write_bundle(
            &dir,
            r#"{ "feature_names": ["feature1"], "model": { "kind": "linear", "coefficients": [1.0], "intercept": 0.0 } }"#,
        );
        let loader = loader_for(&dir, contract());

        match loader.load().unwrap_err() {
            ArtifactError::Schema { reason, .. } => assert!(reason.contains("scaler")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_column_contract_enforced() {
        let dir = TempDir::new().unwrap();
        write_bundle(&dir, SCALAR_BUNDLE);
        let loader = loader_for(
            &dir,
            SchemaContract {
                columns: vec!["feature1".into(), "feature3".into(), "feature2".into()],
                max_clusters: None,
            },
        );

        match loader.load().unwrap_err() {
            ArtifactError::Schema { reason, .. } => {
                assert!(reason.contains("feature1, feature2, feature3"))
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_cluster_count_contract() {
        let dir = TempDir::new().unwrap();
        write_bundle(
            &dir,
            r#"{
                "feature_names": ["feature1"],
                "scaler": { "kind": "passthrough" },
                "model": { "kind": "kmeans", "centroids": [[0.0], [1.0], [2.0], [3.0]] }
            }"#,
        );
        let loader = loader_for(
            &dir,
            SchemaContract {
                columns: vec!["feature1".into()],
                max_clusters: Some(3),
            },
        );

        assert!(matches!(
            loader.load().unwrap_err(),
            ArtifactError::Schema { .. }
        ));
    }

    #[cfg(not(feature = "onnx"))]
    #[test]
    fn test_onnx_requires_feature() {
        let dir = TempDir::new().unwrap();
        let config = ArtifactsConfig {
            dir: dir.path().to_path_buf(),
            format: ArtifactFormat::Onnx,
            onnx_threads: 1,
        };
        let loader = ArtifactLoader::new(&config, contract());

        assert!(matches!(
            loader.load().unwrap_err(),
            ArtifactError::Unsupported("onnx")
        ));
    }
}
