//! HTTP transport backed by `reqwest`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use pocket_core::error::TransportError;
use pocket_core::transport::{HttpMethod, HttpRequest, Transport};
use pocket_core::{Blockchain, Pocket, PocketConfig};

/// `reqwest` client shared by every dispatch, relay and report call.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    request_timeout: Duration,
}

impl HttpTransport {
    /// Build a transport whose requests are bounded by `request_timeout`.
    pub fn new(request_timeout: Duration) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .user_agent(concat!("pocket-relay/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransportError::Other(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            request_timeout,
        })
    }

    fn map_error(&self, err: reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout {
                ms: self.request_timeout.as_millis() as u64,
            }
        } else {
            TransportError::Http(err.to_string())
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, req: HttpRequest) -> Result<String, TransportError> {
        let method = match req.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.http.request(method, &req.url);
        if !req.query.is_empty() {
            builder = builder.query(&req.query);
        }
        for (name, value) in &req.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &req.body {
            builder = builder.json(body);
        }

        let resp = builder.send().await.map_err(|e| self.map_error(e))?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| self.map_error(e))?;
        if !status.is_success() {
            tracing::debug!(url = %req.url, status = status.as_u16(), "non-success response");
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }
}

/// Build a [`Pocket`] that talks HTTP through [`HttpTransport`].
pub fn connect(
    dev_id: impl Into<String>,
    chains: Vec<Blockchain>,
    config: PocketConfig,
) -> Result<Pocket, TransportError> {
    let transport = HttpTransport::new(config.request_timeout())?;
    Ok(Pocket::new(dev_id, chains, config, Arc::new(transport)))
}
