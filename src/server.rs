//! HTTP surface: page routes and the prediction handler

use crate::config::AppVariant;
use crate::form::{self, FieldSpec};
use crate::metrics::AppMetrics;
use crate::models::inference::InferenceEngine;
use crate::models::loader::ArtifactLoader;
use crate::page::PageShell;
use crate::render::{self, Outcome};
use serde::Serialize;
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};
use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

/// Largest accepted form body
const MAX_FORM_BYTES: u64 = 16 * 1024;

/// Everything a request handler needs, shared across requests
pub struct AppContext {
    pub shell: PageShell,
    pub fields: &'static [FieldSpec],
    pub loader: Arc<ArtifactLoader>,
    pub engine: InferenceEngine,
    pub metrics: Arc<AppMetrics>,
}

pub type SharedContext = Arc<AppContext>;

impl AppContext {
    /// Build the context from an already-loaded artifact.
    ///
    /// Fails when the loader cannot produce a bundle.
    pub fn new(
        shell: PageShell,
        loader: Arc<ArtifactLoader>,
        metrics: Arc<AppMetrics>,
    ) -> Result<Self, crate::models::error::ArtifactError> {
        let engine = InferenceEngine::new(loader.load()?);
        Ok(Self {
            fields: form::fields_for(shell.variant()),
            shell,
            loader,
            engine,
            metrics,
        })
    }

    pub fn variant(&self) -> AppVariant {
        self.shell.variant()
    }

    /// One full render cycle for a submitted form
    fn predict_page(&self, submitted: &HashMap<String, String>) -> Result<String, render::RenderError> {
        let start = Instant::now();

        let outcome = match form::collect(self.fields, submitted) {
            Ok(record) => match self.engine.predict(&record) {
                Ok(prediction) => Outcome::Success(prediction),
                Err(e) => {
                    warn!(error = %e, "Inference failed");
                    Outcome::Failure(e.to_string())
                }
            },
            Err(e) => {
                warn!(error = %e, "Rejected form input");
                Outcome::Failure(e.to_string())
            }
        };

        let rendered = render::render_outcome(&outcome);
        let elapsed = start.elapsed();
        match (&outcome, &rendered) {
            (Outcome::Success(prediction), Ok(_)) => {
                self.metrics.record_prediction(elapsed, prediction);
                info!(
                    variant = self.variant().as_str(),
                    prediction = %prediction,
                    processing_time_us = elapsed.as_micros() as u64,
                    "Prediction served"
                );
            }
            _ => self.metrics.record_failure(elapsed),
        }

        let result = rendered?;
        let action = form::action_label(self.variant());
        let form_html = form::render_form(self.fields, action, Some(submitted));
        Ok(self.shell.prediction(&form_html, &result))
    }

    fn form_page(&self) -> String {
        let action = form::action_label(self.variant());
        let form_html = form::render_form(self.fields, action, None);
        self.shell.prediction(&form_html, "")
    }
}

/// Health report
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub variant: &'static str,
    pub model: String,
    pub features: usize,
    pub artifact_loads: usize,
    pub predictions: u64,
    pub failures: u64,
    pub uptime_secs: u64,
    pub started_at: String,
}

// =============================================================================
// Routes
// =============================================================================

/// Build the complete route tree
pub fn routes(
    ctx: SharedContext,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let home = warp::path::end()
        .and(warp::get())
        .and(with_context(ctx.clone()))
        .map(|ctx: SharedContext| warp::reply::html(ctx.shell.home()));

    let form_page = warp::path("predict")
        .and(warp::path::end())
        .and(warp::get())
        .and(with_context(ctx.clone()))
        .map(|ctx: SharedContext| warp::reply::html(ctx.form_page()));

    let submit = warp::path("predict")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_FORM_BYTES))
        .and(warp::body::form::<HashMap<String, String>>())
        .and(with_context(ctx.clone()))
        .and_then(handle_predict);

    let health = warp::path("health")
        .and(warp::path::end())
        .and(warp::get())
        .and(with_context(ctx))
        .and_then(handle_health);

    home.or(form_page)
        .or(submit)
        .or(health)
        .with(warp::trace::request())
}

fn with_context(
    ctx: SharedContext,
) -> impl Filter<Extract = (SharedContext,), Error = Infallible> + Clone {
    warp::any().map(move || ctx.clone())
}

// =============================================================================
// Handlers
// =============================================================================

async fn handle_predict(
    submitted: HashMap<String, String>,
    ctx: SharedContext,
) -> Result<warp::reply::Response, Infallible> {
    match ctx.predict_page(&submitted) {
        Ok(html) => Ok(warp::reply::html(html).into_response()),
        Err(e) => {
            error!(error = %e, "Prediction could not be presented");
            Ok(warp::reply::with_status(
                warp::reply::html(render::render_error("internal error")),
                StatusCode::INTERNAL_SERVER_ERROR,
            )
            .into_response())
        }
    }
}

async fn handle_health(ctx: SharedContext) -> Result<impl Reply, Infallible> {
    let bundle = ctx.engine.bundle();
    let response = HealthResponse {
        status: "ok",
        variant: ctx.variant().as_str(),
        model: bundle.estimator().name().to_string(),
        features: bundle.feature_names().len(),
        artifact_loads: ctx.loader.load_count(),
        predictions: ctx.metrics.predictions(),
        failures: ctx.metrics.failures(),
        uptime_secs: ctx.metrics.uptime().as_secs(),
        started_at: ctx.metrics.started_at().to_rfc3339(),
    };
    Ok(warp::reply::json(&response))
}
