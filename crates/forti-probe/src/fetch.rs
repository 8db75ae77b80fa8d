//! The fetch contract between probes and the transport layer.
//!
//! Probes only see [`Fetcher::get_json`]: a blocking, read-only call that
//! returns the decoded JSON body or a [`FetchError`]. Structural decoding
//! into the probe's declared types happens in [`get`]; a `null` member
//! decodes like an absent one.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::error::{FetchError, FetchResult};

/// Executes one monitoring API call.
///
/// Implementations own timeouts and authentication. A call blocks until the
/// body is available; it must not be invoked from inside an async task.
pub trait Fetcher: Send + Sync {
    fn get_json(&self, path: &str, query: &str) -> FetchResult<Value>;
}

/// Fetch `path` and decode the body into `T`.
pub fn get<T: DeserializeOwned>(fetcher: &dyn Fetcher, path: &str, query: &str) -> FetchResult<T> {
    debug!(%path, %query, "fetching");
    let mut body = fetcher.get_json(path, query)?;
    drop_nulls(&mut body);
    serde_json::from_value(body).map_err(|source| FetchError::Decode {
        path: path.to_string(),
        source,
    })
}

/// Remove `null` object members, at any depth.
fn drop_nulls(value: &mut Value) {
    match value {
        Value::Object(members) => {
            members.retain(|_, v| !v.is_null());
            members.values_mut().for_each(drop_nulls);
        }
        Value::Array(items) => items.iter_mut().for_each(drop_nulls),
        _ => {}
    }
}

/// In-memory fetcher keyed by API path.
///
/// Returns the prepared body for a path regardless of the query, answers
/// unknown paths with HTTP 404 and records every call it receives.
#[derive(Debug, Default)]
pub struct StaticFetcher {
    responses: HashMap<String, Value>,
    failing: HashSet<String>,
    calls: Mutex<Vec<(String, String)>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepare the body returned for `path`.
    pub fn with(mut self, path: &str, body: Value) -> Self {
        self.responses.insert(path.to_string(), body);
        self
    }

    /// Make every call to `path` fail with a transport error.
    pub fn failing(mut self, path: &str) -> Self {
        self.failing.insert(path.to_string());
        self
    }

    /// `(path, query)` pairs received so far, in call order.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl Fetcher for StaticFetcher {
    fn get_json(&self, path: &str, query: &str) -> FetchResult<Value> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((path.to_string(), query.to_string()));

        if self.failing.contains(path) {
            return Err(FetchError::Transport {
                path: path.to_string(),
                reason: "connection refused".to_string(),
            });
        }
        self.responses
            .get(path)
            .cloned()
            .ok_or_else(|| FetchError::Status {
                path: path.to_string(),
                status: 404,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Body {
        results: Vec<u32>,
    }

    #[test]
    fn get_decodes_prepared_body() {
        let fetcher = StaticFetcher::new().with("api/a", json!({"results": [1, 2]}));
        let body: Body = get(&fetcher, "api/a", "vdom=root").unwrap();
        assert_eq!(body.results, vec![1, 2]);
        assert_eq!(
            fetcher.calls(),
            vec![("api/a".to_string(), "vdom=root".to_string())]
        );
    }

    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    struct Nested {
        name: String,
        count: f64,
        items: Vec<Nested>,
    }

    #[test]
    fn null_members_decode_as_absent() {
        let fetcher = StaticFetcher::new().with(
            "api/a",
            json!({
                "name": null,
                "count": 3,
                "items": [{"name": "port1", "count": null, "items": null}]
            }),
        );
        let body: Nested = get(&fetcher, "api/a", "").unwrap();
        assert_eq!(body.name, "");
        assert_eq!(body.count, 3.0);
        assert_eq!(body.items.len(), 1);
        assert_eq!(body.items[0].name, "port1");
        assert_eq!(body.items[0].count, 0.0);
        assert!(body.items[0].items.is_empty());
    }

    #[test]
    fn unknown_path_is_404() {
        let fetcher = StaticFetcher::new();
        let err = get::<Body>(&fetcher, "api/missing", "").unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 404, .. }));
    }

    #[test]
    fn shape_mismatch_is_decode_error() {
        let fetcher = StaticFetcher::new().with("api/a", json!({"results": "nope"}));
        let err = get::<Body>(&fetcher, "api/a", "").unwrap_err();
        assert!(matches!(err, FetchError::Decode { .. }));
    }

    #[test]
    fn failing_path_is_transport_error() {
        let fetcher = StaticFetcher::new()
            .with("api/a", json!({"results": []}))
            .failing("api/a");
        let err = get::<Body>(&fetcher, "api/a", "").unwrap_err();
        assert!(matches!(err, FetchError::Transport { .. }));
    }
}
