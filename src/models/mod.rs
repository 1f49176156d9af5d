//! Model bundle loading and inference components

pub mod bundle;
pub mod error;
pub mod inference;
pub mod loader;
#[cfg(feature = "onnx")]
pub mod onnx;
pub mod output;

pub use bundle::{Estimator, ModelBundle, Transformer};
pub use error::{ArtifactError, InferenceError};
pub use inference::InferenceEngine;
pub use loader::{ArtifactLoader, SchemaContract};
