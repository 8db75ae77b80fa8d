//! Scrape handlers.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use forti_core::TargetMetadata;
use forti_metrics::{discovery_failure, render_prometheus, scrape, CONTENT_TYPE};
use forti_probe::metadata::discover;
use forti_probe::{MetricSample, ProbeResult};
use serde::Deserialize;
use tracing::{debug, error, warn};

use crate::{ExporterState, Target};

#[derive(Debug, Deserialize)]
pub struct ProbeParams {
    pub target: Option<String>,
}

/// GET /probe?target=<name>
pub async fn probe(
    State(state): State<ExporterState>,
    Query(params): Query<ProbeParams>,
) -> Response {
    let Some(name) = params.target.filter(|t| !t.is_empty()) else {
        return (StatusCode::BAD_REQUEST, "missing target parameter\n").into_response();
    };
    let Some(target) = state.target(&name).cloned() else {
        return (StatusCode::NOT_FOUND, format!("unknown target {name:?}\n")).into_response();
    };

    let started = Instant::now();
    let meta = match target_metadata(&target).await {
        Some(meta) => meta,
        None => return exposition(discovery_failure()),
    };

    let report = scrape(Arc::clone(&target.fetcher), meta, &target.probes).await;
    debug!(
        target = %target.name,
        version = %meta.version(),
        failed = report.failed().count(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "scraped target"
    );
    exposition(report.samples())
}

/// GET /healthz
pub async fn healthz() -> &'static str {
    "ok"
}

/// Configured version, or the one reported by the device itself.
async fn target_metadata(target: &Target) -> Option<TargetMetadata> {
    if let Some(version) = target.version {
        return Some(version.into());
    }

    let fetcher = Arc::clone(&target.fetcher);
    match tokio::task::spawn_blocking(move || discover(&*fetcher)).await {
        Ok(Ok(meta)) => Some(meta),
        Ok(Err(e)) => {
            warn!(target = %target.name, error = %e, "firmware discovery failed");
            None
        }
        Err(e) => {
            error!(target = %target.name, error = %e, "firmware discovery task did not complete");
            None
        }
    }
}

fn exposition(samples: ProbeResult<Vec<MetricSample>>) -> Response {
    match samples {
        Ok(samples) => (
            StatusCode::OK,
            [("content-type", CONTENT_TYPE)],
            render_prometheus(&samples),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "failed to assemble exposition");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}
