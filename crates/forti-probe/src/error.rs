//! Probe error types.

use thiserror::Error;

/// Result type alias for fetch operations.
pub type FetchResult<T> = Result<T, FetchError>;

/// Result type alias for probe operations.
pub type ProbeResult<T> = Result<T, ProbeError>;

/// A failed API call. Always terminal for the probe that issued it.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transport error on {path}: {reason}")]
    Transport { path: String, reason: String },

    #[error("request to {path} timed out")]
    Timeout { path: String },

    #[error("{path} returned HTTP {status}")]
    Status { path: String, status: u16 },

    #[error("failed to decode {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors that can abort a probe invocation.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("metric {family} expects {expected} labels, got {got}")]
    LabelArity {
        family: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("unknown probe: {0}")]
    UnknownProbe(String),

    #[error("{capability} is not served by this firmware")]
    Unsupported { capability: &'static str },

    #[error(transparent)]
    Version(#[from] forti_core::CoreError),
}
