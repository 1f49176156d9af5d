//! Input collection: static field schemas and form-to-record assembly.
//!
//! Each app variant declares its fields once, in the exact column order the
//! model bundle was fit on. The same list drives the HTML controls, the
//! parsing of submitted values and the startup schema check.

use crate::config::AppVariant;
use crate::page::escape;
use crate::types::record::{FeatureValue, InputRecord};
use std::collections::HashMap;
use thiserror::Error;

/// Widget used to collect one feature
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Control {
    /// Bounded integer slider
    Slider { min: i64, max: i64 },
    /// Free numeric entry with optional bounds
    Number {
        min: Option<f64>,
        max: Option<f64>,
        step: f64,
        integer: bool,
    },
    /// Fixed-choice selector; values are the encoded category codes
    Select { options: &'static [(i64, &'static str)] },
}

/// One form field bound to one model column
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    /// Column name in the model's training schema
    pub column: &'static str,
    pub label: &'static str,
    pub control: Control,
    pub default: FeatureValue,
}

/// A submitted value that the field's widget would not accept
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormError {
    #[error("{label}: '{value}' is not a number")]
    NotANumber { label: &'static str, value: String },

    #[error("{label}: expected a whole number, got '{value}'")]
    NotAnInteger { label: &'static str, value: String },

    #[error("{label} must be at least {min}")]
    BelowMinimum { label: &'static str, min: f64 },

    #[error("{label} must be at most {max}")]
    AboveMaximum { label: &'static str, max: f64 },

    #[error("{label}: '{value}' is not one of the available options")]
    UnknownOption { label: &'static str, value: String },
}

const EDUCATION_LEVELS: &[(i64, &str)] = &[(0, "Undergraduate"), (1, "Graduate"), (2, "Postgraduate")];
const MARITAL_STATUS: &[(i64, &str)] = &[(0, "Single"), (1, "In a relationship")];
const PARENTAL_STATUS: &[(i64, &str)] = &[(0, "No children at home"), (1, "Parent")];

const fn non_negative(step: f64, integer: bool) -> Control {
    Control::Number {
        min: Some(0.0),
        max: None,
        step,
        integer,
    }
}

/// Three free features of the generic regression page
pub static SCALAR_FIELDS: [FieldSpec; 3] = [
    FieldSpec {
        column: "feature1",
        label: "Feature 1",
        control: non_negative(0.01, false),
        default: FeatureValue::Float(0.0),
    },
    FieldSpec {
        column: "feature2",
        label: "Feature 2",
        control: non_negative(0.01, false),
        default: FeatureValue::Float(0.0),
    },
    FieldSpec {
        column: "feature3",
        label: "Feature 3",
        control: non_negative(0.01, false),
        default: FeatureValue::Float(0.0),
    },
];

/// Customer profile of the segmentation page
pub static CLUSTER_FIELDS: [FieldSpec; 12] = [
    FieldSpec {
        column: "Age",
        label: "Age",
        control: Control::Slider { min: 18, max: 90 },
        default: FeatureValue::Int(35),
    },
    FieldSpec {
        column: "Education",
        label: "Education Level",
        control: Control::Select {
            options: EDUCATION_LEVELS,
        },
        default: FeatureValue::Int(0),
    },
    FieldSpec {
        column: "Marital_Status",
        label: "Marital Status",
        control: Control::Select {
            options: MARITAL_STATUS,
        },
        default: FeatureValue::Int(0),
    },
    FieldSpec {
        column: "Parental_Status",
        label: "Parental Status",
        control: Control::Select {
            options: PARENTAL_STATUS,
        },
        default: FeatureValue::Int(0),
    },
    FieldSpec {
        column: "Children",
        label: "Number of Children",
        control: Control::Slider { min: 0, max: 5 },
        default: FeatureValue::Int(0),
    },
    FieldSpec {
        column: "Income",
        label: "Annual Income",
        control: non_negative(1000.0, false),
        default: FeatureValue::Float(50000.0),
    },
    FieldSpec {
        column: "Total_Spending",
        label: "Total Spending (last 2 years)",
        control: non_negative(10.0, false),
        default: FeatureValue::Float(600.0),
    },
    FieldSpec {
        column: "Days_as_Customer",
        label: "Days as Customer",
        control: non_negative(1.0, true),
        default: FeatureValue::Int(365),
    },
    FieldSpec {
        column: "Recency",
        label: "Days Since Last Purchase",
        control: Control::Slider { min: 0, max: 100 },
        default: FeatureValue::Int(30),
    },
    FieldSpec {
        column: "Num_Web_Purchases",
        label: "Web Purchases",
        control: Control::Slider { min: 0, max: 30 },
        default: FeatureValue::Int(4),
    },
    FieldSpec {
        column: "Num_Store_Purchases",
        label: "Store Purchases",
        control: Control::Slider { min: 0, max: 30 },
        default: FeatureValue::Int(6),
    },
    FieldSpec {
        column: "Num_Web_Visits_Month",
        label: "Web Visits per Month",
        control: Control::Slider { min: 0, max: 20 },
        default: FeatureValue::Int(5),
    },
];

/// Field list for a variant, in model column order
pub fn fields_for(variant: AppVariant) -> &'static [FieldSpec] {
    match variant {
        AppVariant::Scalar => &SCALAR_FIELDS,
        AppVariant::Cluster => &CLUSTER_FIELDS,
    }
}

/// Label of the single action control
pub fn action_label(variant: AppVariant) -> &'static str {
    match variant {
        AppVariant::Scalar => "Predict",
        AppVariant::Cluster => "Predict Customer Cluster",
    }
}

/// Column names of a variant's schema
pub fn column_names(fields: &[FieldSpec]) -> Vec<String> {
    fields.iter().map(|f| f.column.to_string()).collect()
}

/// Record built from every field's default value
pub fn default_record(fields: &[FieldSpec]) -> InputRecord {
    fields
        .iter()
        .fold(InputRecord::new(), |record, field| record.with(field.column, field.default))
}

impl FieldSpec {
    /// Parse and bound-check one submitted value
    pub fn parse(&self, raw: &str) -> Result<FeatureValue, FormError> {
        let raw = raw.trim();
        let value: f64 = raw.parse().map_err(|_| FormError::NotANumber {
            label: self.label,
            value: raw.to_string(),
        })?;
        if !value.is_finite() {
            return Err(FormError::NotANumber {
                label: self.label,
                value: raw.to_string(),
            });
        }

        match self.control {
            Control::Slider { min, max } => {
                let value = self.whole(value, raw)?;
                self.check_bounds(value as f64, Some(min as f64), Some(max as f64))?;
                Ok(FeatureValue::Int(value))
            }
            Control::Number {
                min, max, integer, ..
            } => {
                self.check_bounds(value, min, max)?;
                if integer {
                    Ok(FeatureValue::Int(self.whole(value, raw)?))
                } else {
                    Ok(FeatureValue::Float(value))
                }
            }
            Control::Select { options } => {
                let code = self.whole(value, raw)?;
                if options.iter().any(|(option, _)| *option == code) {
                    Ok(FeatureValue::Int(code))
                } else {
                    Err(FormError::UnknownOption {
                        label: self.label,
                        value: raw.to_string(),
                    })
                }
            }
        }
    }

    fn whole(&self, value: f64, raw: &str) -> Result<i64, FormError> {
        if value.fract() != 0.0 || value.abs() > i64::MAX as f64 {
            return Err(FormError::NotAnInteger {
                label: self.label,
                value: raw.to_string(),
            });
        }
        Ok(value as i64)
    }

    fn check_bounds(&self, value: f64, min: Option<f64>, max: Option<f64>) -> Result<(), FormError> {
        if let Some(min) = min {
            if value < min {
                return Err(FormError::BelowMinimum {
                    label: self.label,
                    min,
                });
            }
        }
        if let Some(max) = max {
            if value > max {
                return Err(FormError::AboveMaximum {
                    label: self.label,
                    max,
                });
            }
        }
        Ok(())
    }
}

/// Assemble a submitted form into one input record.
///
/// Fields absent from the submission take their default, since the widget
/// always shows one. Keys that match no field are ignored.
pub fn collect(
    fields: &[FieldSpec],
    submitted: &HashMap<String, String>,
) -> Result<InputRecord, FormError> {
    let mut record = InputRecord::new();
    for field in fields {
        let value = match submitted.get(field.column) {
            Some(raw) => field.parse(raw)?,
            None => field.default,
        };
        record.push(field.column, value);
    }
    Ok(record)
}

/// Render the form: one control per field plus the action button.
///
/// Controls show the submitted value when there is one, else the default.
pub fn render_form(
    fields: &[FieldSpec],
    action: &str,
    submitted: Option<&HashMap<String, String>>,
) -> String {
    let mut html = String::from("<form method=\"post\" action=\"/predict\" class=\"inputs\">\n");
    for field in fields {
        let current = submitted
            .and_then(|values| values.get(field.column))
            .cloned()
            .unwrap_or_else(|| field.default.to_string());
        html.push_str(&render_control(field, &current));
    }
    html.push_str(&format!(
        "<button type=\"submit\">{}</button>\n</form>\n",
        escape(action)
    ));
    html
}

fn render_control(field: &FieldSpec, current: &str) -> String {
    let id = escape(field.column);
    let label = escape(field.label);
    let value = escape(current);

    let control = match field.control {
        Control::Slider { min, max } => format!(
            "<input type=\"range\" id=\"{id}\" name=\"{id}\" min=\"{min}\" max=\"{max}\" step=\"1\" value=\"{value}\" \
             oninput=\"this.nextElementSibling.value=this.value\"><output>{value}</output>"
        ),
        Control::Number {
            min, max, step, ..
        } => {
            let mut bounds = String::new();
            if let Some(min) = min {
                bounds.push_str(&format!(" min=\"{}\"", min));
            }
            if let Some(max) = max {
                bounds.push_str(&format!(" max=\"{}\"", max));
            }
            format!(
                "<input type=\"number\" id=\"{id}\" name=\"{id}\"{bounds} step=\"{step}\" value=\"{value}\">"
            )
        }
        Control::Select { options } => {
            let mut html = format!("<select id=\"{id}\" name=\"{id}\">");
            for (code, text) in options {
                let selected = if code.to_string() == current.trim() {
                    " selected"
                } else {
                    ""
                };
                html.push_str(&format!(
                    "<option value=\"{}\"{}>{}</option>",
                    code,
                    selected,
                    escape(text)
                ));
            }
            html.push_str("</select>");
            html
        }
    };

    format!("<div class=\"field\"><label for=\"{id}\">{label}</label>{control}</div>\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_documented_defaults() {
        let record = default_record(&CLUSTER_FIELDS);
        assert_eq!(record.get("Age"), Some(FeatureValue::Int(35)));
        assert_eq!(record.get("Education"), Some(FeatureValue::Int(0)));
        assert_eq!(record.get("Income"), Some(FeatureValue::Float(50000.0)));
        assert_eq!(record.get("Total_Spending"), Some(FeatureValue::Float(600.0)));

        let scalar = default_record(&SCALAR_FIELDS);
        assert!(scalar.iter().all(|(_, v)| v.as_f64() == 0.0));
    }

    #[test]
    fn test_record_follows_schema_order() {
        let submitted = form(&[("Income", "72000"), ("Age", "41")]);
        let record = collect(&CLUSTER_FIELDS, &submitted).unwrap();

        let columns: Vec<&str> = record.column_names().collect();
        let expected: Vec<&str> = CLUSTER_FIELDS.iter().map(|f| f.column).collect();
        assert_eq!(columns, expected);
        assert_eq!(record.get("Age"), Some(FeatureValue::Int(41)));
        assert_eq!(record.get("Income"), Some(FeatureValue::Float(72000.0)));
        assert_eq!(record.get("Recency"), Some(FeatureValue::Int(30)));
    }

    #[test]
    fn test_bounds_enforced_per_field() {
        let err = collect(&SCALAR_FIELDS, &form(&[("feature2", "-0.5")])).unwrap_err();
        assert_eq!(
            err,
            FormError::BelowMinimum {
                label: "Feature 2",
                min: 0.0
            }
        );
        assert_eq!(err.to_string(), "Feature 2 must be at least 0");

        let err = collect(&CLUSTER_FIELDS, &form(&[("Age", "91")])).unwrap_err();
        assert!(matches!(err, FormError::AboveMaximum { label: "Age", .. }));
    }

    #[test]
    fn test_unparseable_value() {
        let err = collect(&SCALAR_FIELDS, &form(&[("feature1", "abc")])).unwrap_err();
        assert!(matches!(err, FormError::NotANumber { .. }));

        let err = collect(&SCALAR_FIELDS, &form(&[("feature1", "NaN")])).unwrap_err();
        assert!(matches!(err, FormError::NotANumber { .. }));
    }

    #[test]
    fn test_select_membership() {
        let err = collect(&CLUSTER_FIELDS, &form(&[("Education", "7")])).unwrap_err();
        assert!(matches!(err, FormError::UnknownOption { .. }));

        let record = collect(&CLUSTER_FIELDS, &form(&[("Education", "2")])).unwrap();
        assert_eq!(record.get("Education"), Some(FeatureValue::Int(2)));
    }

    #[test]
    fn test_integer_fields_reject_fractions() {
        let err = collect(&CLUSTER_FIELDS, &form(&[("Children", "1.5")])).unwrap_err();
        assert!(matches!(err, FormError::NotAnInteger { .. }));

        let record = collect(&CLUSTER_FIELDS, &form(&[("Days_as_Customer", "120.0")])).unwrap();
        assert_eq!(record.get("Days_as_Customer"), Some(FeatureValue::Int(120)));
    }

    #[test]
    fn test_render_form_controls() {
        let html = render_form(&CLUSTER_FIELDS, "Predict Customer Cluster", None);
        assert!(html.contains(r#"<input type="range" id="Age" name="Age" min="18" max="90""#));
        assert!(html.contains(r#"value="35""#));
        assert!(html.contains(r#"<option value="0" selected>Undergraduate</option>"#));
        assert!(html.contains(r#"name="Income" min="0" step="1000" value="50000""#));
        assert!(html.contains("<button type=\"submit\">Predict Customer Cluster</button>"));
        assert_eq!(html.matches("<div class=\"field\">").count(), CLUSTER_FIELDS.len());
    }

    #[test]
    fn test_render_form_keeps_submitted_values() {
        let submitted = form(&[("feature1", "2.5"), ("feature3", "<b>")]);
        let html = render_form(&SCALAR_FIELDS, "Predict", Some(&submitted));
        assert!(html.contains(r#"name="feature1" min="0" step="0.01" value="2.5""#));
        assert!(html.contains(r#"value="&lt;b&gt;""#));
        assert!(html.contains(r#"name="feature2" min="0" step="0.01" value="0""#));
    }

    #[test]
    fn test_variant_schemas() {
        assert_eq!(fields_for(AppVariant::Scalar).len(), 3);
        assert_eq!(
            column_names(fields_for(AppVariant::Scalar)),
            vec!["feature1", "feature2", "feature3"]
        );
        assert_eq!(action_label(AppVariant::Cluster), "Predict Customer Cluster");
    }
}
