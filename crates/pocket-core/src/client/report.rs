//! Node failure reporting.

use std::sync::Arc;
use std::time::Duration;

use crate::error::PocketError;
use crate::report::Report;
use crate::transport::{execute_with_timeout, HttpRequest, Transport};

/// Path of the report endpoint, relative to the dispatcher base URL.
pub const REPORT_PATH: &str = "/v1/report";

#[derive(Clone)]
pub struct ReportClient {
    transport: Arc<dyn Transport>,
    url: String,
    timeout: Duration,
}

impl ReportClient {
    pub fn new(transport: Arc<dyn Transport>, dispatch_url: &str, timeout: Duration) -> Self {
        Self {
            transport,
            url: format!("{}{REPORT_PATH}", dispatch_url.trim_end_matches('/')),
            timeout,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Send `report`; returns the dispatcher's acknowledgement body.
    pub async fn submit(&self, report: &Report) -> Result<String, PocketError> {
        if !report.is_valid() {
            return Err(PocketError::InvalidReport(
                "ip and message must both be set".into(),
            ));
        }
        let body = serde_json::to_value(report)
            .map_err(|e| PocketError::InvalidReport(e.to_string()))?;

        tracing::debug!(ip = %report.ip, url = %self.url, "reporting node");
        let ack = execute_with_timeout(
            self.transport.as_ref(),
            HttpRequest::post_json(&self.url, body),
            self.timeout,
        )
        .await?;
        Ok(ack)
    }
}
