//! Data models and processing for fetched metrics and alerts.
//!
//! This module turns raw API records into classified, filtered and paged
//! data suitable for display and export.
//!
//! ## Submodules
//!
//! - [`alerts`]: Priority and event-type filtering of recent alert events
//! - [`classify`]: Apdex scoring, business hours and bucket assignment
//! - [`datetime`]: Filename stamps, relative ages and export timestamps
//! - [`duration`]: Parsing and formatting of resolution strings (e.g., "10m", "7d")
//! - [`pager`]: Demand-loaded paging over the violation listing
//!
//! ## Data Flow
//!
//! ```text
//! RawMetricPoint (API time-slice)
//!        │
//!        ▼
//! Classifier::classify_apdex()
//!        │
//!        ├──▶ ScoredPoint (score, bucket, business hours)
//!        │
//!        └──▶ decimate() ──▶ bucket_distribution() (for charts)
//! ```

pub mod alerts;
pub mod classify;
pub mod datetime;
pub mod duration;
pub mod pager;

pub use alerts::EventFilter;
pub use classify::{
    bucket_distribution, classify_response_time, classify_response_time_series, decimate, Bucket,
    Classifier, MaintenanceWindow, ResponseTimePoint, ScoredPoint, WrongFamily,
};
pub use pager::{PageAdvance, ViolationPager};
