//! Configuration management for the prediction app

use anyhow::{Context, Result};
use config::{Config, File};
use serde::Deserialize;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

/// Which shape of the prediction page to serve
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AppVariant {
    /// Three free numeric features, scalar output
    Scalar,
    /// Customer profile form, cluster id output with segment text
    #[default]
    Cluster,
}

impl AppVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppVariant::Scalar => "scalar",
            AppVariant::Cluster => "cluster",
        }
    }
}

/// On-disk layout of the model artifacts
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactFormat {
    /// Single `model_bundle.json` holding scaler and model under named keys
    #[default]
    Json,
    /// `scaler.onnx` + `model.onnx` pair evaluated with ONNX Runtime
    Onnx,
}

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub artifacts: ArtifactsConfig,
    pub app: PageConfig,
    pub metrics: MetricsConfig,
    pub logging: LoggingConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 8501,
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Model artifact configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ArtifactsConfig {
    /// Directory containing the artifact file(s)
    pub dir: PathBuf,
    /// Artifact layout: "json" (single bundle) or "onnx" (scaler + model pair)
    pub format: ArtifactFormat,
    /// Intra-op threads per ONNX session
    pub onnx_threads: usize,
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("artifacts"),
            format: ArtifactFormat::Json,
            onnx_threads: 1,
        }
    }
}

/// Page configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    pub variant: AppVariant,
    pub page_title: String,
    pub page_icon: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            variant: AppVariant::Cluster,
            page_title: "ML Prediction App".to_string(),
            page_icon: "🤖".to_string(),
        }
    }
}

/// Metrics reporting configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Seconds between periodic summaries (0 disables the reporter)
    pub report_interval_secs: u64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            report_interval_secs: 300,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/config.toml")
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Load configuration, falling back to defaults when the file is absent
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load_from_path(path)
        } else {
            Ok(Self::default())
        }
    }
}
