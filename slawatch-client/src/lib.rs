//! # slawatch-client
//!
//! Batched, authenticated access to the New Relic REST API.
//!
//! The client turns a date range and resolution into the set of metric
//! queries needed to cover it, issues them concurrently and reassembles the
//! series in time order. It also lists alert events, paginated alert
//! violations and the applications visible to an API key.
//!
//! ## Safety Ceiling
//!
//! A single series fetch never issues more than
//! [`MAX_BATCH_REQUESTS`](batch::MAX_BATCH_REQUESTS) requests. Above that the
//! call fails with [`ClientError::RateLimitAvoidance`] before anything is sent.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use slawatch_client::{Credentials, MonitoringApi, NewRelicClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = NewRelicClient::builder().build()?;
//!     let credentials = Credentials::new(Some("NRAK-...".into()), None);
//!
//!     for app in client.fetch_applications(&credentials).await? {
//!         println!("{} {}", app.id, app.name);
//!     }
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod batch;
pub mod error;
pub mod newrelic;

pub use api::{Credentials, MonitoringApi};
pub use error::ClientError;
pub use newrelic::{NewRelicClient, NewRelicClientBuilder, DEFAULT_ENDPOINT};

// Re-export types for convenience
pub use slawatch_types::{
    AlertEvent, AlertViolation, Application, DateRange, MetricFamily, MetricSummary,
    RawMetricPoint, Timestamp,
};
