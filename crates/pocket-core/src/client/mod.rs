//! Network clients — one per remote endpoint kind.
//!
//! ```text
//! DispatchClient → dispatcher /v1/dispatch   (node pool)
//! RelayClient    → node       /v1/relay/     (one relay)
//! ReportClient   → dispatcher /v1/report     (node failure)
//! ```

pub mod dispatch;
pub mod relay;
pub mod report;

pub use dispatch::{parse_dispatch_response, DispatchClient, DISPATCH_PATH};
pub use relay::{classify_response, RelayClient};
pub use report::{ReportClient, REPORT_PATH};
