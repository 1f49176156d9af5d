//! Integration tests against the shipped demo artifacts and configs

use ml_prediction_app::config::{AppConfig, AppVariant, ArtifactsConfig, PageConfig};
use ml_prediction_app::form;
use ml_prediction_app::metrics::AppMetrics;
use ml_prediction_app::models::loader::{ArtifactLoader, SchemaContract};
use ml_prediction_app::page::PageShell;
use ml_prediction_app::render::{render_outcome, Outcome};
use ml_prediction_app::server::{self, AppContext};
use ml_prediction_app::{ClusterInfo, InferenceEngine, InputRecord, Prediction};
use std::path::PathBuf;
use std::sync::Arc;

fn manifest_path(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(relative)
}

fn loader(variant: AppVariant, dir: &str) -> ArtifactLoader {
    let artifacts = ArtifactsConfig {
        dir: manifest_path(dir),
        ..ArtifactsConfig::default()
    };
    let contract = SchemaContract {
        columns: form::column_names(form::fields_for(variant)),
        max_clusters: match variant {
            AppVariant::Cluster => Some(ClusterInfo::count()),
            AppVariant::Scalar => None,
        },
    };
    ArtifactLoader::new(&artifacts, contract)
}

#[test]
fn test_default_customer_gets_a_segment() {
    let loader = loader(AppVariant::Cluster, "artifacts");
    let engine = InferenceEngine::new(loader.load().unwrap());

    let record = form::default_record(form::fields_for(AppVariant::Cluster));
    match engine.predict(&record).unwrap() {
        Prediction::Cluster(id) => assert!(id < 3, "cluster {} out of range", id),
        other => panic!("expected a cluster id, got {:?}", other),
    }
}

#[test]
fn test_demo_prediction_renders_segment() {
    let loader = loader(AppVariant::Cluster, "artifacts");
    let engine = InferenceEngine::new(loader.load().unwrap());

    let record = form::default_record(form::fields_for(AppVariant::Cluster));
    let prediction = engine.predict(&record).unwrap();
    let html = render_outcome(&Outcome::Success(prediction)).unwrap();
    assert!(html.contains("Predicted Customer Cluster"));
    assert_eq!(engine.bundle().estimator().cluster_count(), Some(3));
}

#[test]
fn test_scalar_all_zero_is_defined() {
    let loader = loader(AppVariant::Scalar, "artifacts/scalar");
    let engine = InferenceEngine::new(loader.load().unwrap());

    let record = InputRecord::new()
        .with("feature1", 0.0)
        .with("feature2", 0.0)
        .with("feature3", 0.0);
    match engine.predict(&record).unwrap() {
        Prediction::Scalar(value) => assert!(value.is_finite()),
        other => panic!("expected a scalar, got {:?}", other),
    }
}

#[test]
fn test_prediction_is_deterministic() {
    let loader = loader(AppVariant::Cluster, "artifacts");
    let engine = InferenceEngine::new(loader.load().unwrap());

    let record = InputRecord::new()
        .with("Age", 61_i64)
        .with("Education", 2_i64)
        .with("Marital_Status", 1_i64)
        .with("Parental_Status", 0_i64)
        .with("Children", 0_i64)
        .with("Income", 98000.0)
        .with("Total_Spending", 1900.0)
        .with("Days_as_Customer", 800_i64)
        .with("Recency", 12_i64)
        .with("Num_Web_Purchases", 7_i64)
        .with("Num_Store_Purchases", 11_i64)
        .with("Num_Web_Visits_Month", 2_i64);

    let first = engine.predict(&record).unwrap();
    for _ in 0..20 {
        assert_eq!(engine.predict(&record).unwrap(), first);
    }
}

#[test]
fn test_missing_column_takes_error_path() {
    let loader = loader(AppVariant::Scalar, "artifacts/scalar");
    let engine = InferenceEngine::new(loader.load().unwrap());

    let record = InputRecord::new().with("feature1", 1.0).with("feature2", 1.0);
    let outcome = match engine.predict(&record) {
        Ok(prediction) => Outcome::Success(prediction),
        Err(e) => Outcome::Failure(e.to_string()),
    };

    let html = render_outcome(&outcome).unwrap();
    assert!(html.contains("Error: missing feature column &#39;feature3&#39;"));
}

#[test]
fn test_loader_caches_bundle() {
    let loader = loader(AppVariant::Cluster, "artifacts");
    let first = loader.load().unwrap();
    let second = loader.load().unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(loader.load_count(), 1);
}

#[test]
fn test_demo_bundle_rejected_by_other_variant() {
    // The customer bundle does not fit the three-feature form
    let loader = loader(AppVariant::Scalar, "artifacts");
    assert!(loader.load().is_err());
}

#[test]
fn test_shipped_configs_parse() {
    let config = AppConfig::load_from_path(manifest_path("config/config.toml")).unwrap();
    assert_eq!(config.app.variant, AppVariant::Cluster);
    assert_eq!(config.server.port, 8501);

    let scalar = AppConfig::load_from_path(manifest_path("config/scalar.toml")).unwrap();
    assert_eq!(scalar.app.variant, AppVariant::Scalar);
    assert_eq!(scalar.artifacts.dir, PathBuf::from("artifacts/scalar"));
}

#[tokio::test]
async fn test_cluster_page_end_to_end() {
    let loader = Arc::new(loader(AppVariant::Cluster, "artifacts"));
    let page = PageConfig {
        variant: AppVariant::Cluster,
        ..PageConfig::default()
    };
    let ctx = AppContext::new(PageShell::new(&page), loader, Arc::new(AppMetrics::new())).unwrap();
    let routes = server::routes(Arc::new(ctx));

    let resp = warp::test::request()
        .method("POST")
        .path("/predict")
        .header("content-type", "application/x-www-form-urlencoded")
        .body("Age=35&Education=0&Income=50000&Total_Spending=600")
        .reply(&routes)
        .await;

    assert_eq!(resp.status(), 200);
    let html = String::from_utf8_lossy(resp.body());
    assert!(html.contains("Predicted Customer Cluster: "));
    assert!(html.contains("Recommended Offers"));
    assert!(html.contains("<button type=\"submit\">Predict Customer Cluster</button>"));
}
