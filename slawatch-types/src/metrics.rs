//! Metric time-slice types.

use crate::Timestamp;

/// Values of a single Apdex time-slice.
///
/// `s`, `t` and `f` are the satisfied, tolerating and frustrated transaction
/// counts; `count` is their total.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ApdexValues {
    pub score: f64,
    pub count: u64,
    pub s: u64,
    pub t: u64,
    pub f: u64,
}

/// Values of a single response-time time-slice.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResponseTimeValues {
    /// Average response time in milliseconds.
    pub average_response_time: f64,
    pub call_count: u64,
}

/// The values carried by a time-slice, one variant per metric family.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum MetricValues {
    Apdex(ApdexValues),
    ResponseTime(ResponseTimeValues),
}

impl MetricValues {
    /// The family these values belong to.
    pub fn family(&self) -> MetricFamily {
        match self {
            MetricValues::Apdex(_) => MetricFamily::Apdex,
            MetricValues::ResponseTime(_) => MetricFamily::ResponseTime,
        }
    }
}

/// A raw time-slice as returned by the metric query endpoint.
///
/// Points are immutable once decoded; classification produces new values
/// rather than annotating these in place.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawMetricPoint {
    pub values: MetricValues,
    pub from: Timestamp,
    pub to: Timestamp,
}

impl RawMetricPoint {
    /// Create an Apdex point.
    pub fn apdex(values: ApdexValues, from: Timestamp, to: Timestamp) -> Self {
        Self {
            values: MetricValues::Apdex(values),
            from,
            to,
        }
    }

    /// Create a response-time point.
    pub fn response_time(values: ResponseTimeValues, from: Timestamp, to: Timestamp) -> Self {
        Self {
            values: MetricValues::ResponseTime(values),
            from,
            to,
        }
    }
}

/// The metric families slawatch knows how to request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricFamily {
    /// End-user Apdex with its satisfied/tolerating/frustrated breakdown.
    Apdex,
    /// Web transaction response time and throughput.
    ResponseTime,
}

impl MetricFamily {
    /// Metric names passed as `names[]`.
    pub fn metric_names(&self) -> &'static [&'static str] {
        match self {
            MetricFamily::Apdex => &["EndUser/Apdex"],
            MetricFamily::ResponseTime => &["HttpDispatcher"],
        }
    }

    /// Value names passed as `values[]`.
    pub fn value_names(&self) -> &'static [&'static str] {
        match self {
            MetricFamily::Apdex => &["score", "s", "t", "f", "count"],
            MetricFamily::ResponseTime => &["average_response_time", "call_count"],
        }
    }

    /// Returns the display label for this family.
    pub fn label(&self) -> &'static str {
        match self {
            MetricFamily::Apdex => "Apdex",
            MetricFamily::ResponseTime => "Response Time",
        }
    }
}

/// A summarized score for one metric over a whole range.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MetricSummary {
    pub name: String,
    pub score: Option<f64>,
}

/// A monitored application as listed by the API.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Application {
    pub id: u64,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn values_report_their_family() {
        let apdex = MetricValues::Apdex(ApdexValues::default());
        let rt = MetricValues::ResponseTime(ResponseTimeValues::default());
        assert_eq!(apdex.family(), MetricFamily::Apdex);
        assert_eq!(rt.family(), MetricFamily::ResponseTime);
    }

    #[test]
    fn families_request_distinct_metrics() {
        assert_eq!(MetricFamily::Apdex.metric_names(), &["EndUser/Apdex"]);
        assert_eq!(MetricFamily::ResponseTime.metric_names(), &["HttpDispatcher"]);
        assert!(MetricFamily::Apdex.value_names().contains(&"count"));
        assert!(MetricFamily::ResponseTime
            .value_names()
            .contains(&"average_response_time"));
    }

    #[test]
    fn point_constructors_pick_variant() {
        let from = Utc.with_ymd_and_hms(2021, 4, 19, 10, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2021, 4, 19, 10, 5, 0).unwrap();
        let p = RawMetricPoint::response_time(
            ResponseTimeValues {
                average_response_time: 120.5,
                call_count: 42,
            },
            from,
            to,
        );
        assert_eq!(p.values.family(), MetricFamily::ResponseTime);
        assert_eq!(p.from, from);
        assert_eq!(p.to, to);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn untagged_values_decode_by_shape() {
        let apdex: RawMetricPoint = serde_json::from_str(
            r#"{"values":{"score":0.97,"count":10,"s":9,"t":1,"f":0},
                "from":"2021-04-19T10:00:00+00:00","to":"2021-04-19T10:05:00+00:00"}"#,
        )
        .unwrap();
        assert_eq!(apdex.values.family(), MetricFamily::Apdex);

        let rt: RawMetricPoint = serde_json::from_str(
            r#"{"values":{"average_response_time":88.0,"call_count":3},
                "from":"2021-04-19T10:00:00+00:00","to":"2021-04-19T10:05:00+00:00"}"#,
        )
        .unwrap();
        assert_eq!(rt.values.family(), MetricFamily::ResponseTime);
    }
}
