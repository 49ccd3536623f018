//! # slawatch-types
//!
//! Core types for the data slawatch pulls from the New Relic REST API: raw
//! metric time-slices, the date ranges they are requested over, and the
//! alert events and violations listed alongside them.
//!
//! ## Design Goals
//!
//! - **Typed metric values**: Apdex and response-time slices are distinct
//!   variants of [`MetricValues`], never loosely-typed maps
//! - **Optional serialization**: Enable the `serde` feature to decode API
//!   payloads directly into these types
//! - **Validated ranges**: A [`DateRange`] can only be built with `from < to`
//!   and a positive resolution
//!
//! ## Features
//!
//! - `serde`: JSON (de)serialization matching the API's field names
//!
//! ## Example
//!
//! ```rust
//! use chrono::{Duration, TimeZone, Utc};
//! use slawatch_types::{ApdexValues, DateRange, MetricValues, RawMetricPoint};
//!
//! let from = Utc.with_ymd_and_hms(2021, 4, 19, 10, 0, 0).unwrap();
//! let point = RawMetricPoint::apdex(
//!     ApdexValues { score: 0.97, count: 10, s: 9, t: 1, f: 0 },
//!     from,
//!     from + Duration::minutes(5),
//! );
//! assert!(matches!(point.values, MetricValues::Apdex(_)));
//!
//! let range = DateRange::new(from, from + Duration::hours(1), 600).unwrap();
//! assert_eq!(range.duration_ms(), 3_600_000);
//! ```

mod alerts;
mod metrics;
mod range;

pub use alerts::*;
pub use metrics::*;
pub use range::*;

/// A UTC timestamp as returned by the metric query endpoint.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
