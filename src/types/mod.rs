//! Type definitions for the prediction app

pub mod prediction;
pub mod record;
pub mod segment;

pub use prediction::Prediction;
pub use record::{FeatureValue, InputRecord};
pub use segment::{ClusterInfo, CUSTOMER_SEGMENTS};
