//! Failure reports about misbehaving nodes.

use serde::Serialize;

/// A node failure to forward to the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    #[serde(rename = "IP")]
    pub ip: String,
    #[serde(rename = "Message")]
    pub message: String,
}

impl Report {
    pub fn new(ip: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            ip: ip.into(),
            message: message.into(),
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.ip.is_empty() && !self.message.is_empty()
    }
}
