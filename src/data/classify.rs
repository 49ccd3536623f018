//! Apdex classification: business hours, maintenance windows and buckets.
//!
//! Every Apdex time-slice is scored and placed in one of six [`Bucket`]s.
//! Slices outside business hours are always [`Bucket::NotApplicable`]; the
//! rest are bucketed by comparing the score against fixed thresholds.
//! Calendar fields are read from the slice's start time in a chosen
//! timezone, local time unless stated otherwise.

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime, TimeZone, Timelike, Weekday};
use serde::{Serialize, Serializer};
use thiserror::Error;

use slawatch_types::{ApdexValues, MetricFamily, MetricValues, RawMetricPoint};

/// Lower bounds of buckets 0..=4, highest first. A score must strictly
/// exceed a bound to land in its bucket.
pub const BUCKET_THRESHOLDS: [f64; 5] = [0.94, 0.85, 0.70, 0.50, -0.01];

/// Default number of points kept for charting.
pub const DEFAULT_DECIMATE_TARGET: usize = 500;

/// Business-relevance category of a scored point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Bucket {
    Blue,
    Green,
    Yellow,
    Red,
    Down,
    /// Outside business hours.
    NotApplicable,
}

impl Bucket {
    pub const ALL: [Bucket; 6] = [
        Bucket::Blue,
        Bucket::Green,
        Bucket::Yellow,
        Bucket::Red,
        Bucket::Down,
        Bucket::NotApplicable,
    ];

    /// Numeric index, 0 for Blue through 5 for N/A.
    pub fn index(&self) -> u8 {
        match self {
            Bucket::Blue => 0,
            Bucket::Green => 1,
            Bucket::Yellow => 2,
            Bucket::Red => 3,
            Bucket::Down => 4,
            Bucket::NotApplicable => 5,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Bucket::Blue => "Blue",
            Bucket::Green => "Green",
            Bucket::Yellow => "Yellow",
            Bucket::Red => "Red",
            Bucket::Down => "Down",
            Bucket::NotApplicable => "N/A",
        }
    }

    /// Bucket for `score`, given whether it was taken in business hours.
    ///
    /// A score that exceeds no threshold falls back to [`Bucket::Down`].
    pub fn evaluate(score: f64, business_hours: bool) -> Self {
        if !business_hours {
            return Bucket::NotApplicable;
        }
        BUCKET_THRESHOLDS
            .iter()
            .position(|&threshold| score > threshold)
            .map(|i| Bucket::ALL[i])
            .unwrap_or(Bucket::Down)
    }
}

impl Serialize for Bucket {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.index())
    }
}

/// A wall-clock range during which degraded performance is excluded.
///
/// Both bounds are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaintenanceWindow {
    pub from: NaiveDateTime,
    pub to: NaiveDateTime,
}

impl MaintenanceWindow {
    pub fn new(from: NaiveDateTime, to: NaiveDateTime) -> Self {
        Self { from, to }
    }

    pub fn contains(&self, at: &NaiveDateTime) -> bool {
        self.from < *at && *at < self.to
    }
}

/// The Saturday 24 April 2021 release window, 09:00 to 15:00.
pub fn default_maintenance_windows() -> Vec<MaintenanceWindow> {
    let window = NaiveDate::from_ymd_opt(2021, 4, 24).and_then(|day| {
        Some(MaintenanceWindow::new(
            day.and_hms_opt(9, 0, 0)?,
            day.and_hms_opt(15, 0, 0)?,
        ))
    });
    window.into_iter().collect()
}

/// Raised when a point of one metric family is classified as another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("expected a {} point, got {}", .expected.label(), .found.label())]
pub struct WrongFamily {
    pub expected: MetricFamily,
    pub found: MetricFamily,
}

/// A classified Apdex time-slice.
///
/// Serializes with the field names used by the JSON export.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredPoint {
    pub score: f64,
    pub bucket: Bucket,
    pub business_hours: bool,
    #[serde(serialize_with = "serialize_weekday")]
    pub day_of_week: Weekday,
    pub hour: u32,
    /// Epoch milliseconds.
    pub from: i64,
    /// Epoch milliseconds.
    pub to: i64,
    pub txn_count: u64,
    pub txn_success: u64,
    pub txn_fail: u64,
    pub txn_tolerate: u64,
}

/// A response-time time-slice projected for charting and export.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseTimePoint {
    /// Milliseconds.
    pub response_time: f64,
    pub request_count: u64,
    pub from: i64,
    pub to: i64,
}

/// Full English name of a weekday.
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

fn serialize_weekday<S: Serializer>(day: &Weekday, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(weekday_name(*day))
}

/// Score of an Apdex slice; a slice with no traffic scores a perfect 1.0.
pub fn apdex_score(values: &ApdexValues) -> f64 {
    if values.count == 0 {
        1.0
    } else {
        values.score
    }
}

/// Scores Apdex points against business hours and maintenance windows.
#[derive(Debug, Clone, PartialEq)]
pub struct Classifier {
    maintenance: Vec<MaintenanceWindow>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(default_maintenance_windows())
    }
}

impl Classifier {
    pub fn new(maintenance: Vec<MaintenanceWindow>) -> Self {
        Self { maintenance }
    }

    pub fn maintenance_windows(&self) -> &[MaintenanceWindow] {
        &self.maintenance
    }

    /// Whether `at` falls in a maintenance window.
    ///
    /// Only Saturdays strictly between 09:00 and 15:00 are checked.
    pub fn in_maintenance<Tz: TimeZone>(&self, at: &DateTime<Tz>) -> bool {
        if at.weekday() != Weekday::Sat {
            return false;
        }
        let hour = at.hour();
        if hour <= 9 || hour >= 15 {
            return false;
        }
        let wall = at.naive_local();
        self.maintenance.iter().any(|w| w.contains(&wall))
    }

    /// Business hours: weekdays from 06:00, Saturdays 06:00 to 18:59
    /// outside maintenance, never on Sunday.
    pub fn is_business_hours<Tz: TimeZone>(&self, at: &DateTime<Tz>) -> bool {
        let hour = at.hour();
        match at.weekday() {
            Weekday::Sun => false,
            Weekday::Sat => !self.in_maintenance(at) && (6..=18).contains(&hour),
            _ => hour >= 6,
        }
    }

    /// Classify an Apdex point in local time.
    pub fn classify_apdex(&self, point: &RawMetricPoint) -> Result<ScoredPoint, WrongFamily> {
        self.classify_apdex_in(point, &Local)
    }

    /// Classify an Apdex point with calendar fields read in `tz`.
    pub fn classify_apdex_in<Tz: TimeZone>(
        &self,
        point: &RawMetricPoint,
        tz: &Tz,
    ) -> Result<ScoredPoint, WrongFamily> {
        let values = match point.values {
            MetricValues::Apdex(values) => values,
            MetricValues::ResponseTime(_) => {
                return Err(WrongFamily {
                    expected: MetricFamily::Apdex,
                    found: MetricFamily::ResponseTime,
                })
            }
        };

        let start = point.from.with_timezone(tz);
        let business_hours = self.is_business_hours(&start);
        let score = apdex_score(&values);

        Ok(ScoredPoint {
            score,
            bucket: Bucket::evaluate(score, business_hours),
            business_hours,
            day_of_week: start.weekday(),
            hour: start.hour(),
            from: point.from.timestamp_millis(),
            to: point.to.timestamp_millis(),
            txn_count: values.count,
            txn_success: values.s,
            txn_fail: values.f,
            txn_tolerate: values.t,
        })
    }

    /// Classify a whole series in local time, preserving order.
    pub fn classify_apdex_series(
        &self,
        points: &[RawMetricPoint],
    ) -> Result<Vec<ScoredPoint>, WrongFamily> {
        self.classify_apdex_series_in(points, &Local)
    }

    pub fn classify_apdex_series_in<Tz: TimeZone>(
        &self,
        points: &[RawMetricPoint],
        tz: &Tz,
    ) -> Result<Vec<ScoredPoint>, WrongFamily> {
        points.iter().map(|p| self.classify_apdex_in(p, tz)).collect()
    }
}

/// Project a response-time point.
pub fn classify_response_time(point: &RawMetricPoint) -> Result<ResponseTimePoint, WrongFamily> {
    match point.values {
        MetricValues::ResponseTime(values) => Ok(ResponseTimePoint {
            response_time: values.average_response_time,
            request_count: values.call_count,
            from: point.from.timestamp_millis(),
            to: point.to.timestamp_millis(),
        }),
        MetricValues::Apdex(_) => Err(WrongFamily {
            expected: MetricFamily::ResponseTime,
            found: MetricFamily::Apdex,
        }),
    }
}

pub fn classify_response_time_series(
    points: &[RawMetricPoint],
) -> Result<Vec<ResponseTimePoint>, WrongFamily> {
    points.iter().map(classify_response_time).collect()
}

/// Thin a series for charting by keeping every `len / target`-th point.
///
/// Series no longer than `target` are returned unchanged. The first point
/// is always kept.
pub fn decimate<T: Clone>(points: &[T], target: usize) -> Vec<T> {
    if target == 0 || points.len() <= target {
        return points.to_vec();
    }
    let stride = points.len() / target;
    points
        .iter()
        .enumerate()
        .filter(|(i, _)| i % stride == 0)
        .map(|(_, p)| p.clone())
        .collect()
}

/// Percentage of points in each bucket, indexed by [`Bucket::index`].
///
/// An empty series yields all zeros.
pub fn bucket_distribution(points: &[ScoredPoint]) -> [f64; 6] {
    let mut counts = [0usize; 6];
    for p in points {
        counts[p.bucket.index() as usize] += 1;
    }
    let total = points.len();
    let mut shares = [0.0; 6];
    if total > 0 {
        for (share, count) in shares.iter_mut().zip(counts) {
            *share = count as f64 * 100.0 / total as f64;
        }
    }
    shares
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use slawatch_types::{ResponseTimeValues, Timestamp};

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> Timestamp {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    fn apdex(score: f64, count: u64, from: Timestamp) -> RawMetricPoint {
        RawMetricPoint::apdex(
            ApdexValues {
                score,
                count,
                s: 9,
                t: 1,
                f: 0,
            },
            from,
            from + Duration::minutes(5),
        )
    }

    fn classify(point: &RawMetricPoint) -> ScoredPoint {
        Classifier::default().classify_apdex_in(point, &Utc).unwrap()
    }

    #[test]
    fn test_monday_morning_is_blue() {
        // 2021-04-19 is a Monday
        let p = classify(&apdex(0.97, 10, utc(2021, 4, 19, 10, 0)));
        assert_eq!(p.bucket, Bucket::Blue);
        assert!(p.business_hours);
        assert_eq!(p.score, 0.97);
        assert_eq!(p.day_of_week, Weekday::Mon);
        assert_eq!(p.hour, 10);
        assert_eq!(p.txn_count, 10);
        assert_eq!(p.txn_success, 9);
        assert_eq!(p.txn_tolerate, 1);
        assert_eq!(p.txn_fail, 0);
    }

    #[test]
    fn test_saturday_maintenance_is_not_applicable() {
        let p = classify(&apdex(0.97, 10, utc(2021, 4, 24, 11, 0)));
        assert!(!p.business_hours);
        assert_eq!(p.bucket, Bucket::NotApplicable);
    }

    #[test]
    fn test_saturday_outside_window_is_business_hours() {
        let c = Classifier::default();
        // Same Saturday, hours not checked against maintenance
        assert!(c.is_business_hours(&utc(2021, 4, 24, 9, 30)));
        assert!(c.is_business_hours(&utc(2021, 4, 24, 15, 0)));
        assert!(c.is_business_hours(&utc(2021, 4, 24, 18, 59)));
        assert!(!c.is_business_hours(&utc(2021, 4, 24, 19, 0)));
        assert!(!c.is_business_hours(&utc(2021, 4, 24, 5, 59)));
        // A different Saturday is never in maintenance
        assert!(c.is_business_hours(&utc(2021, 5, 1, 11, 0)));
    }

    #[test]
    fn test_sunday_is_never_business_hours() {
        let c = Classifier::default();
        for hour in 0..24 {
            assert!(!c.is_business_hours(&utc(2021, 4, 25, hour, 0)));
        }
    }

    #[test]
    fn test_weekdays_have_no_upper_bound() {
        let c = Classifier::default();
        assert!(!c.is_business_hours(&utc(2021, 4, 20, 5, 59)));
        assert!(c.is_business_hours(&utc(2021, 4, 20, 6, 0)));
        assert!(c.is_business_hours(&utc(2021, 4, 20, 23, 30)));
    }

    #[test]
    fn test_maintenance_bounds_are_exclusive() {
        let c = Classifier::new(vec![MaintenanceWindow::new(
            utc(2021, 4, 24, 10, 0).naive_utc(),
            utc(2021, 4, 24, 12, 0).naive_utc(),
        )]);
        assert!(!c.in_maintenance(&utc(2021, 4, 24, 10, 0)));
        assert!(c.in_maintenance(&utc(2021, 4, 24, 10, 1)));
        assert!(!c.in_maintenance(&utc(2021, 4, 24, 12, 0)));
    }

    #[test]
    fn test_zero_count_scores_perfect() {
        let p = classify(&apdex(0.12, 0, utc(2021, 4, 19, 10, 0)));
        assert_eq!(p.score, 1.0);
        assert_eq!(p.bucket, Bucket::Blue);
    }

    #[test]
    fn test_bucket_thresholds_are_strict() {
        assert_eq!(Bucket::evaluate(0.95, true), Bucket::Blue);
        assert_eq!(Bucket::evaluate(0.94, true), Bucket::Green);
        assert_eq!(Bucket::evaluate(0.85, true), Bucket::Yellow);
        assert_eq!(Bucket::evaluate(0.70, true), Bucket::Red);
        assert_eq!(Bucket::evaluate(0.50, true), Bucket::Down);
        assert_eq!(Bucket::evaluate(0.0, true), Bucket::Down);
        assert_eq!(Bucket::evaluate(-0.5, true), Bucket::Down);
        assert_eq!(Bucket::evaluate(0.99, false), Bucket::NotApplicable);
    }

    #[test]
    fn test_not_applicable_iff_outside_business_hours() {
        let c = Classifier::default();
        let mut from = utc(2021, 4, 18, 0, 0);
        for _ in 0..(24 * 8) {
            let p = c.classify_apdex_in(&apdex(0.6, 5, from), &Utc).unwrap();
            assert_eq!(p.bucket == Bucket::NotApplicable, !p.business_hours);
            from += Duration::hours(1);
        }
    }

    #[test]
    fn test_classification_is_idempotent() {
        let raw = apdex(0.81, 40, utc(2021, 4, 21, 14, 0));
        assert_eq!(classify(&raw), classify(&raw));
    }

    #[test]
    fn test_wrong_family_is_rejected() {
        let from = utc(2021, 4, 19, 10, 0);
        let rt = RawMetricPoint::response_time(
            ResponseTimeValues {
                average_response_time: 210.0,
                call_count: 7,
            },
            from,
            from + Duration::minutes(5),
        );
        let err = Classifier::default().classify_apdex_in(&rt, &Utc).unwrap_err();
        assert_eq!(err.expected, MetricFamily::Apdex);
        assert!(classify_response_time(&apdex(0.9, 1, from)).is_err());

        let projected = classify_response_time(&rt).unwrap();
        assert_eq!(projected.response_time, 210.0);
        assert_eq!(projected.request_count, 7);
        assert_eq!(projected.from, from.timestamp_millis());
    }

    #[test]
    fn test_scored_point_json_shape() {
        let p = classify(&apdex(0.97, 10, utc(2021, 4, 19, 10, 0)));
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["bucket"], 0);
        assert_eq!(json["businessHours"], true);
        assert_eq!(json["dayOfWeek"], "Monday");
        assert_eq!(json["txnTolerate"], 1);
        assert_eq!(json["from"], utc(2021, 4, 19, 10, 0).timestamp_millis());
    }

    #[test]
    fn test_decimate_short_series_is_identity() {
        let series: Vec<u32> = (0..500).collect();
        assert_eq!(decimate(&series, DEFAULT_DECIMATE_TARGET), series);
        assert!(decimate::<u32>(&[], 500).is_empty());
    }

    #[test]
    fn test_decimate_keeps_every_nth() {
        let series: Vec<u32> = (0..1234).collect();
        let thinned = decimate(&series, 500);
        // stride 2
        assert_eq!(thinned.len(), 617);
        assert_eq!(thinned[0], 0);
        assert_eq!(thinned[1], 2);

        let series: Vec<u32> = (0..1600).collect();
        let thinned = decimate(&series, 500);
        // stride 3 keeps indices 0, 3, ..., 1599
        assert_eq!(thinned.len(), 534);
        assert!(thinned.windows(2).all(|w| w[1] - w[0] == 3));
    }

    #[test]
    fn test_bucket_distribution_percentages() {
        let c = Classifier::default();
        let points: Vec<ScoredPoint> = [0.99, 0.99, 0.9, 0.1]
            .into_iter()
            .map(|s| c.classify_apdex_in(&apdex(s, 3, utc(2021, 4, 19, 10, 0)), &Utc).unwrap())
            .collect();
        let shares = bucket_distribution(&points);
        assert_eq!(shares[0], 50.0);
        assert_eq!(shares[1], 25.0);
        assert_eq!(shares[4], 25.0);
        assert_eq!(shares.iter().sum::<f64>(), 100.0);
        assert_eq!(bucket_distribution(&[]), [0.0; 6]);
    }
}
