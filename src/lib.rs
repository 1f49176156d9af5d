//! ML Prediction App Library
//!
//! A form-driven web page that feeds user input through a pre-fitted
//! scaler/estimator bundle and renders the prediction or customer segment.

pub mod cli;
pub mod config;
pub mod form;
pub mod metrics;
pub mod models;
pub mod page;
pub mod render;
pub mod server;
pub mod types;

pub use config::{AppConfig, AppVariant};
pub use models::inference::InferenceEngine;
pub use models::loader::ArtifactLoader;
pub use types::{prediction::Prediction, record::InputRecord, segment::ClusterInfo};
