//! Model output

use serde::Serialize;
use std::fmt;

/// Output of a single predict call
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Prediction {
    /// Regression-style output
    Scalar(f64),
    /// Segment assignment, used as a key into the cluster info table
    Cluster(usize),
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prediction::Scalar(value) => write!(f, "{}", value),
            Prediction::Cluster(id) => write!(f, "{}", id),
        }
    }
}
