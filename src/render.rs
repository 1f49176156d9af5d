//! Presentation of one prediction cycle's outcome

use crate::page::escape;
use crate::types::prediction::Prediction;
use crate::types::segment::ClusterInfo;
use thiserror::Error;

/// Result of one submit, ready to render
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success(Prediction),
    /// Human-readable failure text
    Failure(String),
}

/// Contract violation between the model and the presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("model returned cluster {0}, which has no segment description")]
    UnknownCluster(usize),
}

/// Render an outcome as an HTML fragment
pub fn render_outcome(outcome: &Outcome) -> Result<String, RenderError> {
    match outcome {
        Outcome::Success(prediction) => render_prediction(prediction),
        Outcome::Failure(message) => Ok(render_error(message)),
    }
}

pub fn render_prediction(prediction: &Prediction) -> Result<String, RenderError> {
    match *prediction {
        Prediction::Scalar(value) => Ok(format!(
            "<div class=\"alert success\">Prediction Result: {}</div>\n",
            format_scalar(value)
        )),
        Prediction::Cluster(id) => {
            let info = ClusterInfo::lookup(id).ok_or(RenderError::UnknownCluster(id))?;
            Ok(render_segment(id, info))
        }
    }
}

/// Plain decimal in the usual range, exponent notation (`1.295e+308`,
/// `5e-05`) for very large or very small magnitudes
pub fn format_scalar(value: f64) -> String {
    let magnitude = value.abs();
    if magnitude == 0.0 || !value.is_finite() || (1e-4..1e16).contains(&magnitude) {
        return value.to_string();
    }

    let formatted = format!("{:e}", value);
    match formatted.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => formatted,
    }
}

pub fn render_error(message: &str) -> String {
    format!(
        "<div class=\"alert error\">Error: {}</div>\n",
        escape(message)
    )
}

fn render_segment(id: usize, info: &ClusterInfo) -> String {
    let offers: String = info
        .offers
        .iter()
        .map(|offer| format!("<li>{}</li>", escape(offer)))
        .collect();

    format!(
        "<div class=\"alert success\">Predicted Customer Cluster: {id}</div>\n\
         <div class=\"columns\">\n\
         <div><h3>Customer Type</h3><p class=\"type-label\"><strong>{label}</strong></p></div>\n\
         <div><h3>Description</h3><p class=\"description\">{description}</p></div>\n\
         </div>\n\
         <h3>🎁 Recommended Offers</h3>\n<ul class=\"offers\">{offers}</ul>\n\
         <h3>💡 Recommendation</h3>\n<p class=\"recommendation\">{recommendation}</p>\n",
        label = escape(info.type_label),
        description = escape(info.description),
        recommendation = escape(info.recommendation),
    )
}
