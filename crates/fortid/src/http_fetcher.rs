//! FortiOS REST API client.
//!
//! A plain HTTP/1.1 client over `TcpStream`, authenticated with the target's
//! API token. Probes call it synchronously from the blocking pool; each call
//! re-enters the runtime through a [`Handle`].

use std::fmt::Display;
use std::time::Duration;

use bytes::Bytes;
use forti_probe::{FetchError, FetchResult, Fetcher};
use http_body_util::{BodyExt, Empty};
use hyper_util::rt::TokioIo;
use serde_json::Value;
use tokio::runtime::Handle;
use tracing::debug;

const USER_AGENT: &str = concat!("fortid/", env!("CARGO_PKG_VERSION"));

/// Fetcher backed by one FortiGate's REST API.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    address: String,
    token: Option<String>,
    timeout: Duration,
    handle: Handle,
}

impl HttpFetcher {
    pub fn new(address: &str, token: Option<String>, timeout: Duration, handle: Handle) -> Self {
        Self {
            address: address.to_string(),
            token,
            timeout,
            handle,
        }
    }

    async fn fetch(&self, path: &str, query: &str) -> FetchResult<Value> {
        let uri = request_uri(&self.address, path, query);
        match tokio::time::timeout(self.timeout, self.send(&uri, path)).await {
            Ok(result) => result,
            Err(_) => {
                debug!(%uri, timeout_ms = self.timeout.as_millis() as u64, "request timed out");
                Err(FetchError::Timeout {
                    path: path.to_string(),
                })
            }
        }
    }

    async fn send(&self, uri: &str, path: &str) -> FetchResult<Value> {
        let stream = tokio::net::TcpStream::connect(&self.address)
            .await
            .map_err(|e| transport(path, e))?;
        let io = TokioIo::new(stream);
        let (mut sender, conn) = hyper::client::conn::http1::handshake(io)
            .await
            .map_err(|e| transport(path, e))?;

        // Drive the connection in the background.
        tokio::spawn(async move {
            if let Err(e) = conn.await {
                debug!(error = %e, "connection closed with error");
            }
        });

        let mut req = http::Request::builder()
            .method("GET")
            .uri(uri)
            .header("host", &self.address)
            .header("user-agent", USER_AGENT)
            .header("accept", "application/json");
        if let Some(token) = &self.token {
            req = req.header("authorization", format!("Bearer {token}"));
        }
        let req = req
            .body(Empty::<Bytes>::new())
            .map_err(|e| transport(path, e))?;

        let resp = sender.send_request(req).await.map_err(|e| transport(path, e))?;
        let status = resp.status();
        if !status.is_success() {
            debug!(%status, %uri, "non-2xx response");
            return Err(FetchError::Status {
                path: path.to_string(),
                status: status.as_u16(),
            });
        }

        let body = resp
            .into_body()
            .collect()
            .await
            .map_err(|e| transport(path, e))?
            .to_bytes();
        serde_json::from_slice(&body).map_err(|source| FetchError::Decode {
            path: path.to_string(),
            source,
        })
    }
}

impl Fetcher for HttpFetcher {
    fn get_json(&self, path: &str, query: &str) -> FetchResult<Value> {
        self.handle.block_on(self.fetch(path, query))
    }
}

fn transport(path: &str, e: impl Display) -> FetchError {
    FetchError::Transport {
        path: path.to_string(),
        reason: e.to_string(),
    }
}

/// `http://{address}/{path}?{query}`; the query is omitted when empty.
pub fn request_uri(address: &str, path: &str, query: &str) -> String {
    let path = path.trim_start_matches('/');
    if query.is_empty() {
        format!("http://{address}/{path}")
    } else {
        format!("http://{address}/{path}?{query}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::http::{HeaderMap, StatusCode};
    use axum::response::IntoResponse;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;

    #[test]
    fn request_uri_shapes() {
        assert_eq!(
            request_uri("10.0.0.1:80", "api/v2/monitor/system/status", ""),
            "http://10.0.0.1:80/api/v2/monitor/system/status"
        );
        assert_eq!(
            request_uri("fw:8080", "/api/v2/monitor/system/ntp/status", "vdom=*"),
            "http://fw:8080/api/v2/monitor/system/ntp/status?vdom=*"
        );
    }

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        addr.to_string()
    }

    fn fake_fortigate() -> Router {
        Router::new()
            .route(
                "/api/v2/monitor/system/status",
                get(|headers: HeaderMap| async move {
                    let auth = headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string();
                    if auth == "Bearer secret" {
                        Json(json!({"version": "v7.4.3"})).into_response()
                    } else {
                        StatusCode::UNAUTHORIZED.into_response()
                    }
                }),
            )
            .route(
                "/api/v2/monitor/system/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    "{}"
                }),
            )
    }

    async fn call(
        address: String,
        token: Option<&str>,
        path: &'static str,
        timeout: Duration,
    ) -> FetchResult<Value> {
        let fetcher = Arc::new(HttpFetcher::new(
            &address,
            token.map(str::to_string),
            timeout,
            Handle::current(),
        ));
        tokio::task::spawn_blocking(move || fetcher.get_json(path, ""))
            .await
            .unwrap()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn fetches_json_with_bearer_token() {
        let address = serve(fake_fortigate()).await;
        let body = call(address, Some("secret"), "api/v2/monitor/system/status", Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(body["version"], "v7.4.3");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn non_success_status_is_reported() {
        let address = serve(fake_fortigate()).await;
        let err = call(address.clone(), None, "api/v2/monitor/system/status", Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 401, .. }));

        let err = call(address, Some("secret"), "api/v2/monitor/system/nope", Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 404, .. }));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn slow_response_times_out() {
        let address = serve(fake_fortigate()).await;
        let err = call(address, None, "api/v2/monitor/system/slow", Duration::from_millis(100))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Timeout { .. }));
    }
}
