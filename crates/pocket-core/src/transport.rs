//! The `Transport` trait — the single seam through which the core talks HTTP.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::TransportError;

/// HTTP verb for a [`HttpRequest`] or a REST-style relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "PATCH" => Ok(Self::Patch),
            "DELETE" => Ok(Self::Delete),
            other => Err(format!("unsupported HTTP method: {other}")),
        }
    }
}

/// One HTTP exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl HttpRequest {
    /// A JSON `POST` with no query or extra headers.
    pub fn post_json(url: impl Into<String>, body: Value) -> Self {
        Self {
            method: HttpMethod::Post,
            url: url.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: Some(body),
        }
    }
}

/// Performs HTTP exchanges on behalf of the dispatch, relay and report
/// clients.
///
/// Implementations return the raw response body for 2xx answers and a
/// [`TransportError`] for everything else.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` for use across Tokio tasks and are
/// stored as `Arc<dyn Transport>`.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn execute(&self, req: HttpRequest) -> Result<String, TransportError>;
}

/// Run `req` on `transport`, bounded by `timeout`.
pub async fn execute_with_timeout(
    transport: &dyn Transport,
    req: HttpRequest,
    timeout: Duration,
) -> Result<String, TransportError> {
    tokio::time::timeout(timeout, transport.execute(req))
        .await
        .map_err(|_| TransportError::Timeout {
            ms: timeout.as_millis() as u64,
        })?
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Stalled;

    #[async_trait]
    impl Transport for Stalled {
        async fn execute(&self, _req: HttpRequest) -> Result<String, TransportError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(String::new())
        }
    }

    #[test]
    fn method_round_trips_through_str() {
        for m in [HttpMethod::Get, HttpMethod::Post, HttpMethod::Delete] {
            assert_eq!(m.as_str().parse::<HttpMethod>().unwrap(), m);
        }
        assert_eq!("patch".parse::<HttpMethod>().unwrap(), HttpMethod::Patch);
        assert!("TRACE".parse::<HttpMethod>().is_err());
    }

    #[tokio::test]
    async fn timeout_maps_to_transport_error() {
        let req = HttpRequest::post_json("http://x", Value::Null);
        let err = execute_with_timeout(&Stalled, req, Duration::from_millis(50))
            .await
            .unwrap_err();
        assert_eq!(err, TransportError::Timeout { ms: 50 });
    }
}
