//! # slawatch
//!
//! A terminal dashboard and exporter for New Relic Apdex, response-time and
//! alert data, built for SLA reporting.
//!
//! Time-series are fetched over a date range at a chosen resolution, scored
//! against business hours and maintenance windows, and sorted into six
//! buckets (Blue, Green, Yellow, Red, Down, N/A). The classified series can be
//! browsed in the TUI or exported to JSON and CSV.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Application                          │
//! │  ┌─────────┐    ┌──────────┐    ┌─────────┐    ┌─────────┐ │
//! │  │  app    │───▶│   data   │───▶│   ui    │───▶│ Terminal│ │
//! │  │ (state) │    │(classify)│    │(render) │    │         │ │
//! │  └────┬────┘    └──────────┘    └─────────┘    └─────────┘ │
//! │       │ session (credentials, generation tokens)           │
//! │       ▼                                                     │
//! │  ┌─────────┐    ┌─────────────────┐                         │
//! │  │ source  │───▶│ slawatch-client │──▶ New Relic REST API   │
//! │  │(fetcher)│    │ (MonitoringApi) │                         │
//! │  └─────────┘    └─────────────────┘                         │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`app`]**: Application state, view navigation, and user interaction logic
//! - **[`session`]**: Credentials, application selection, loading flags and
//!   the generation tokens that discard stale responses
//! - **[`source`]**: Background fetches delivered to the UI over a channel
//! - **[`data`]**: Classification, date helpers, violation paging and event filters
//! - **[`export`]**: JSON and CSV renderings and the files they are written to
//! - **[`config`]**: Settings from a TOML file and `SLAWATCH_*` variables
//! - **[`ui`]**: Terminal rendering using ratatui
//!
//! ## Usage
//!
//! ```bash
//! # Interactive dashboard
//! slawatch --api-key NRAK-... --app-id 123456
//!
//! # Headless export of the last week at hourly resolution
//! slawatch --app-id 123456 --from 2021-04-17 --to 2021-04-24 --resolution 1h --export out/
//! ```
//!
//! ### As a library
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use slawatch::data::{Bucket, Classifier};
//! use slawatch_types::{ApdexValues, RawMetricPoint};
//!
//! // Monday 10:00 is business hours
//! let from = Utc.with_ymd_and_hms(2021, 4, 19, 10, 0, 0).unwrap();
//! let point = RawMetricPoint::apdex(
//!     ApdexValues { score: 0.97, count: 10, s: 9, t: 1, f: 0 },
//!     from,
//!     from + chrono::Duration::minutes(5),
//! );
//! let scored = Classifier::default().classify_apdex_in(&point, &Utc).unwrap();
//! assert_eq!(scored.bucket, Bucket::Blue);
//! ```

pub mod app;
pub mod config;
pub mod data;
pub mod events;
pub mod export;
pub mod logging;
pub mod session;
pub mod source;
pub mod ui;

#[cfg(test)]
mod testing;

// Re-export main types for convenience
pub use app::{App, LoadState, View};
pub use config::Settings;
pub use data::{Bucket, Classifier, ScoredPoint};
pub use session::{FetchKind, Session};
pub use source::{Fetched, Fetcher, Payload};
