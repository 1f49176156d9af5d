//! Single-row input record handed to the model bundle

use serde::Serialize;
use std::fmt;

/// One feature value as collected from the form
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Float(f64),
    Int(i64),
}

impl FeatureValue {
    pub fn as_f64(&self) -> f64 {
        match *self {
            FeatureValue::Float(v) => v,
            FeatureValue::Int(v) => v as f64,
        }
    }
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureValue::Float(v) => write!(f, "{}", v),
            FeatureValue::Int(v) => write!(f, "{}", v),
        }
    }
}

impl From<f64> for FeatureValue {
    fn from(value: f64) -> Self {
        FeatureValue::Float(value)
    }
}

impl From<i64> for FeatureValue {
    fn from(value: i64) -> Self {
        FeatureValue::Int(value)
    }
}

/// Ordered mapping of feature name to value: one row, named columns.
///
/// Column order is significant. It must match the order the model bundle
/// was fit on; see [`InputRecord::to_row`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InputRecord {
    columns: Vec<(String, FeatureValue)>,
}

/// Why a record could not be laid out against a bundle's columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnMismatch {
    Missing(String),
    Unexpected(String),
    Duplicate(String),
    OutOfOrder { position: usize, expected: String, found: String },
}

impl InputRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style column append
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FeatureValue>) -> Self {
        self.push(name, value);
        self
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<FeatureValue>) {
        self.columns.push((name.into(), value.into()));
    }

    pub fn get(&self, name: &str) -> Option<FeatureValue> {
        self.columns
            .iter()
            .find(|(column, _)| column == name)
            .map(|(_, value)| *value)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, FeatureValue)> {
        self.columns.iter().map(|(name, value)| (name.as_str(), *value))
    }

    /// Lay the record out as a numeric row in `expected` column order.
    ///
    /// Every expected column must be present exactly once and in the same
    /// position; anything else is reported as the first mismatch found.
    pub fn to_row(&self, expected: &[String]) -> Result<Vec<f64>, ColumnMismatch> {
        for (i, (name, _)) in self.columns.iter().enumerate() {
            if self.columns[..i].iter().any(|(earlier, _)| earlier == name) {
                return Err(ColumnMismatch::Duplicate(name.clone()));
            }
            if !expected.contains(name) {
                return Err(ColumnMismatch::Unexpected(name.clone()));
            }
        }

        if let Some(missing) = expected.iter().find(|name| self.get(name).is_none()) {
            return Err(ColumnMismatch::Missing(missing.clone()));
        }

        expected
            .iter()
            .zip(self.columns.iter())
            .enumerate()
            .map(|(position, (want, (name, value)))| {
                if want == name {
                    Ok(value.as_f64())
                } else {
                    Err(ColumnMismatch::OutOfOrder {
                        position,
                        expected: want.clone(),
                        found: name.clone(),
                    })
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> Vec<String> {
        vec!["feature1".into(), "feature2".into(), "feature3".into()]
    }

    #[test]
    fn test_row_in_schema_order() {
        let record = InputRecord::new()
            .with("feature1", 1.5)
            .with("feature2", 2_i64)
            .with("feature3", 0.0);

        assert_eq!(record.to_row(&schema()), Ok(vec![1.5, 2.0, 0.0]));
        assert_eq!(record.len(), 3);
        assert_eq!(record.get("feature2"), Some(FeatureValue::Int(2)));
    }

    #[test]
    fn test_missing_column() {
        let record = InputRecord::new().with("feature1", 1.0).with("feature2", 2.0);
        assert_eq!(
            record.to_row(&schema()),
            Err(ColumnMismatch::Missing("feature3".into()))
        );
    }

    #[test]
    fn test_unexpected_column() {
        let record = InputRecord::new()
            .with("feature1", 1.0)
            .with("feature2", 2.0)
            .with("feature3", 3.0)
            .with("feature4", 4.0);
        assert_eq!(
            record.to_row(&schema()),
            Err(ColumnMismatch::Unexpected("feature4".into()))
        );
    }

    #[test]
    fn test_reordered_columns() {
        let record = InputRecord::new()
            .with("feature2", 2.0)
            .with("feature1", 1.0)
            .with("feature3", 3.0);
        assert_eq!(
            record.to_row(&schema()),
            Err(ColumnMismatch::OutOfOrder {
                position: 0,
                expected: "feature1".into(),
                found: "feature2".into(),
            })
        );
    }

    #[test]
    fn test_duplicate_column() {
        let record = InputRecord::new()
            .with("feature1", 1.0)
            .with("feature1", 1.0)
            .with("feature3", 3.0);
        assert_eq!(
            record.to_row(&schema()),
            Err(ColumnMismatch::Duplicate("feature1".into()))
        );
    }
}
