//! Export of classified series and violations to JSON and CSV.
//!
//! All content is rendered in memory as an [`ExportOption`]; writing the
//! bundle to a directory is a separate step. CSV rows are joined with `\n`
//! and timestamps use the long `M/D/YYYY h:mm:ss AM` form, which never
//! contains a comma.
//!
//! JSON exports are percent-encoded the way `encodeURIComponent` does, so
//! the payload can be embedded directly in a `data:` URI.

use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Local, TimeZone};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;
use tracing::info;

use slawatch_client::{Credentials, MonitoringApi};
use slawatch_types::{AlertViolation, DateRange, MetricFamily, Timestamp};

use crate::data::classify::{classify_response_time_series, Classifier};
use crate::data::datetime::{export_timestamp, format_date_ymd, format_date_ymdhms};
use crate::data::{ResponseTimePoint, ScoredPoint, ViolationPager};

pub const MIME_JSON: &str = "text/json";
pub const MIME_CSV: &str = "text/csv";

pub const APDEX_CSV_HEADER: &str = "Score,Bucket,From,To,Is Business Hours,Day of Week,Hour,Txn Count,Txn Success,Txn Fail,Txn Tolerating";
pub const RESPONSE_TIME_CSV_HEADER: &str = "Average Response Time (ms),Request Count,From,To";
pub const SLA_CSV_HEADER: &str = "Score,Bucket,From,To,Is Business Hours,Day of Week,Hour,Txn Count,Txn Success,Txn Fail,Txn Tolerating,Average Response Time (ms),Request Count";
pub const VIOLATIONS_CSV_HEADER: &str = "ID,Label,Duration,Opened At,Closed At,Condition Name,Priority";

/// One downloadable rendering of a data set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOption {
    /// Human label, e.g. "Apdex CSV".
    pub export_type: &'static str,
    /// Filename prefix, e.g. "apdex".
    pub export_key: &'static str,
    pub mime_type: &'static str,
    pub extension: &'static str,
    pub filename: String,
    pub content: String,
}

/// Characters `encodeURIComponent` leaves alone besides ASCII alphanumerics.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encode everything except `A-Z a-z 0-9 - _ . ! ~ * ' ( )`.
pub fn encode_uri_component(input: &str) -> String {
    utf8_percent_encode(input, URI_COMPONENT).to_string()
}

/// Serialize `value` as JSON and percent-encode it.
pub fn to_encoded_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let json = serde_json::to_string(value)?;
    Ok(encode_uri_component(&json))
}

fn csv<I>(header: &str, rows: I) -> String
where
    I: IntoIterator<Item = String>,
{
    let body: Vec<String> = rows.into_iter().collect();
    format!("{}\n{}", header, body.join("\n"))
}

fn apdex_cells<Tz: TimeZone>(p: &ScoredPoint, tz: &Tz) -> String
where
    Tz::Offset: Display,
{
    format!(
        "{},{},{},{},{},{},{},{},{},{},{}",
        p.score,
        p.bucket.label(),
        export_timestamp(p.from, tz),
        export_timestamp(p.to, tz),
        p.business_hours,
        crate::data::classify::weekday_name(p.day_of_week),
        p.hour,
        p.txn_count,
        p.txn_success,
        p.txn_fail,
        p.txn_tolerate,
    )
}

pub fn apdex_csv<Tz: TimeZone>(points: &[ScoredPoint], tz: &Tz) -> String
where
    Tz::Offset: Display,
{
    csv(APDEX_CSV_HEADER, points.iter().map(|p| apdex_cells(p, tz)))
}

pub fn response_time_csv<Tz: TimeZone>(points: &[ResponseTimePoint], tz: &Tz) -> String
where
    Tz::Offset: Display,
{
    csv(
        RESPONSE_TIME_CSV_HEADER,
        points.iter().map(|p| {
            format!(
                "{},{},{},{}",
                p.response_time,
                p.request_count,
                export_timestamp(p.from, tz),
                export_timestamp(p.to, tz)
            )
        }),
    )
}

/// Apdex rows paired by position with response-time rows.
///
/// Both series must come from the same range and resolution for the rows
/// to line up. Output stops at the shorter series.
pub fn sla_report_csv<Tz: TimeZone>(
    apdex: &[ScoredPoint],
    response_time: &[ResponseTimePoint],
    tz: &Tz,
) -> String
where
    Tz::Offset: Display,
{
    csv(
        SLA_CSV_HEADER,
        apdex.iter().zip(response_time).map(|(a, r)| {
            format!(
                "{},{},{}",
                apdex_cells(a, tz),
                r.response_time,
                r.request_count
            )
        }),
    )
}

/// Violations CSV. Open violations have an empty "Closed At" cell.
pub fn violations_csv<Tz: TimeZone>(violations: &[AlertViolation], tz: &Tz) -> String
where
    Tz::Offset: Display,
{
    csv(
        VIOLATIONS_CSV_HEADER,
        violations.iter().map(|v| {
            format!(
                "{},{},{},{},{},{},{}",
                v.id,
                v.label,
                v.duration,
                export_timestamp(v.opened_at, tz),
                v.closed_at
                    .map(|ms| export_timestamp(ms, tz))
                    .unwrap_or_default(),
                v.condition_name,
                v.priority
            )
        }),
    )
}

/// Filename for a series export over `from..to`.
///
/// Same-day ranges carry the start time as well, so several exports from
/// one day stay distinct.
pub fn series_filename<Tz: TimeZone>(
    key: &str,
    from: &chrono::DateTime<Tz>,
    to: &chrono::DateTime<Tz>,
    resolution_seconds: u64,
    extension: &str,
) -> String
where
    Tz::Offset: Display,
{
    let from_day = format_date_ymd(from);
    let to_day = format_date_ymd(to);
    let stamp = if from_day == to_day {
        format_date_ymdhms(from)
    } else {
        format!("{}_{}", from_day, to_day)
    };
    format!("{}_export_{}_{}.{}", key, stamp, resolution_seconds, extension)
}

/// Filename for a violations export made on `today`.
pub fn violations_filename<Tz: TimeZone>(today: &chrono::DateTime<Tz>, extension: &str) -> String
where
    Tz::Offset: Display,
{
    format!("alertViolations_export_{}.{}", format_date_ymd(today), extension)
}

/// The five Apdex artifacts: Apdex and response time as JSON and CSV,
/// plus the combined SLA report.
pub fn apdex_exports<Tz: TimeZone>(
    apdex: &[ScoredPoint],
    response_time: &[ResponseTimePoint],
    range: &DateRange,
    tz: &Tz,
) -> Result<Vec<ExportOption>>
where
    Tz::Offset: Display,
{
    let from = range.from().with_timezone(tz);
    let to = range.to().with_timezone(tz);
    let resolution = range.resolution_seconds();
    let option = |export_type, export_key, json: bool, content| {
        let (mime_type, extension) = if json {
            (MIME_JSON, "json")
        } else {
            (MIME_CSV, "csv")
        };
        ExportOption {
            export_type,
            export_key,
            mime_type,
            extension,
            filename: series_filename(export_key, &from, &to, resolution, extension),
            content,
        }
    };

    Ok(vec![
        option("Apdex JSON", "apdex", true, to_encoded_json(apdex)?),
        option("Apdex CSV", "apdex", false, apdex_csv(apdex, tz)),
        option(
            "Response Time JSON",
            "responseTime",
            true,
            to_encoded_json(response_time)?,
        ),
        option(
            "Response Time CSV",
            "responseTime",
            false,
            response_time_csv(response_time, tz),
        ),
        option(
            "SLA Report CSV",
            "slaReport",
            false,
            sla_report_csv(apdex, response_time, tz),
        ),
    ])
}

/// Violations as JSON and CSV.
pub fn violation_exports<Tz: TimeZone>(
    violations: &[AlertViolation],
    now: Timestamp,
    tz: &Tz,
) -> Result<Vec<ExportOption>>
where
    Tz::Offset: Display,
{
    let today = now.with_timezone(tz);
    Ok(vec![
        ExportOption {
            export_type: "Alert Violations JSON",
            export_key: "alertViolations",
            mime_type: MIME_JSON,
            extension: "json",
            filename: violations_filename(&today, "json"),
            content: to_encoded_json(violations)?,
        },
        ExportOption {
            export_type: "Alert Violations CSV",
            export_key: "alertViolations",
            mime_type: MIME_CSV,
            extension: "csv",
            filename: violations_filename(&today, "csv"),
            content: violations_csv(violations, tz),
        },
    ])
}

/// Write every option to `dir`, creating it if needed.
pub fn write_exports(dir: &Path, options: &[ExportOption]) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create export directory {}", dir.display()))?;

    let mut written = Vec::with_capacity(options.len());
    for option in options {
        let path = dir.join(&option.filename);
        fs::write(&path, &option.content)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!(path = %path.display(), kind = option.export_type, "exported");
        written.push(path);
    }
    Ok(written)
}

/// Fetch, classify and export both series over `range` in local time.
pub async fn export_series(
    api: &dyn MonitoringApi,
    credentials: &Credentials,
    classifier: &Classifier,
    range: &DateRange,
    dir: &Path,
) -> Result<Vec<PathBuf>> {
    let (apdex, response_time) = tokio::try_join!(
        api.fetch_series(credentials, MetricFamily::Apdex, range),
        api.fetch_series(credentials, MetricFamily::ResponseTime, range),
    )?;

    let apdex = classifier.classify_apdex_series(&apdex)?;
    let response_time = classify_response_time_series(&response_time)?;
    info!(
        apdex = apdex.len(),
        response_time = response_time.len(),
        "fetched series for export"
    );

    let options = apdex_exports(&apdex, &response_time, range, &Local)?;
    write_exports(dir, &options)
}

/// Fetch up to `pages` pages of violations and export them.
///
/// Stops early at the first empty page.
pub async fn export_violations(
    api: &dyn MonitoringApi,
    credentials: &Credentials,
    pages: u32,
    dir: &Path,
) -> Result<Vec<PathBuf>> {
    let mut pager = ViolationPager::default();
    for page in 1..=pages.max(1) {
        let violations = api.fetch_violations_page(credentials, page).await?;
        pager.apply_page(page, violations);
        if pager.is_exhausted() {
            break;
        }
    }
    info!(violations = pager.all().len(), "fetched violations for export");

    let options = violation_exports(pager.all(), crate::data::datetime::now(), &Local)?;
    write_exports(dir, &options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{apdex_point, response_time_point, violation, FakeApi};
    use chrono::{Duration, Utc};
    use slawatch_client::ClientError;
    use slawatch_types::Priority;

    fn at(d: u32, h: u32) -> Timestamp {
        Utc.with_ymd_and_hms(2021, 4, d, h, 0, 0).unwrap()
    }

    fn scored(n: usize) -> Vec<ScoredPoint> {
        let classifier = Classifier::default();
        (0..n)
            .map(|i| {
                let p = apdex_point(0.97, 10, at(19, 10) + Duration::minutes(10 * i as i64));
                classifier.classify_apdex_in(&p, &Utc).unwrap()
            })
            .collect()
    }

    fn timed(n: usize) -> Vec<ResponseTimePoint> {
        let raw: Vec<_> = (0..n)
            .map(|i| response_time_point(120.5, 30, at(19, 10) + Duration::minutes(10 * i as i64)))
            .collect();
        classify_response_time_series(&raw).unwrap()
    }

    #[test]
    fn test_encode_uri_component() {
        assert_eq!(encode_uri_component("a-b_c.d!e~f*g'h(i)j"), "a-b_c.d!e~f*g'h(i)j");
        assert_eq!(encode_uri_component("{\"a\":1, b}"), "%7B%22a%22%3A1%2C%20b%7D");
        assert_eq!(encode_uri_component("N/A"), "N%2FA");
        assert_eq!(encode_uri_component("é"), "%C3%A9");
    }

    #[test]
    fn test_apdex_csv_rows() {
        let csv = apdex_csv(&scored(2), &Utc);
        let lines: Vec<&str> = csv.split('\n').collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], APDEX_CSV_HEADER);
        assert_eq!(
            lines[1],
            "0.97,Blue,4/19/2021 10:00:00 AM,4/19/2021 10:10:00 AM,true,Monday,10,10,10,0,0"
        );
        assert!(!csv.ends_with('\n'));
    }

    #[test]
    fn test_empty_series_is_header_only() {
        assert_eq!(apdex_csv(&[], &Utc), format!("{}\n", APDEX_CSV_HEADER));
    }

    #[test]
    fn test_response_time_csv_rows() {
        let csv = response_time_csv(&timed(1), &Utc);
        assert_eq!(
            csv,
            format!(
                "{}\n120.5,30,4/19/2021 10:00:00 AM,4/19/2021 10:10:00 AM",
                RESPONSE_TIME_CSV_HEADER
            )
        );
    }

    #[test]
    fn test_sla_report_stops_at_shorter_series() {
        let csv = sla_report_csv(&scored(5), &timed(3), &Utc);
        let lines: Vec<&str> = csv.split('\n').collect();
        assert_eq!(lines[0], SLA_CSV_HEADER);
        assert_eq!(lines.len(), 4);
        assert!(lines[1].ends_with(",120.5,30"));

        let csv = sla_report_csv(&scored(2), &timed(3), &Utc);
        assert_eq!(csv.split('\n').count(), 3);
    }

    #[test]
    fn test_violations_csv_blank_for_open() {
        let ms = at(24, 9).timestamp_millis();
        let violations = vec![
            violation(7, Priority::Critical, Some(ms)),
            violation(8, Priority::Warning, None),
        ];
        let csv = violations_csv(&violations, &Utc);
        let lines: Vec<&str> = csv.split('\n').collect();
        assert_eq!(lines[0], VIOLATIONS_CSV_HEADER);
        assert!(lines[1].starts_with("7,violation 7,60,"));
        assert!(lines[1].ends_with(",4/24/2021 9:00:00 AM,Apdex low,Critical"));
        assert!(lines[2].ends_with(",,Apdex low,Warning"));
    }

    #[test]
    fn test_json_is_percent_encoded() {
        let content = to_encoded_json(&scored(1)).unwrap();
        assert!(content.starts_with("%5B%7B%22score%22%3A0.97%2C%22bucket%22%3A0%2C"));
        assert!(!content.contains('{'));
    }

    #[test]
    fn test_series_filenames() {
        assert_eq!(
            series_filename("apdex", &at(19, 0), &at(24, 0), 600, "csv"),
            "apdex_export_20210419_20210424_600.csv"
        );
        assert_eq!(
            series_filename("slaReport", &at(19, 9), &at(19, 10), 86_400, "csv"),
            "slaReport_export_20210419-090000_86400.csv"
        );
        assert_eq!(
            violations_filename(&at(24, 9), "json"),
            "alertViolations_export_20210424.json"
        );
    }

    #[test]
    fn test_apdex_bundle() {
        let range = DateRange::new(at(19, 10), at(19, 11), 600).unwrap();
        let options = apdex_exports(&scored(3), &timed(3), &range, &Utc).unwrap();
        let names: Vec<&str> = options.iter().map(|o| o.filename.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "apdex_export_20210419-100000_600.json",
                "apdex_export_20210419-100000_600.csv",
                "responseTime_export_20210419-100000_600.json",
                "responseTime_export_20210419-100000_600.csv",
                "slaReport_export_20210419-100000_600.csv",
            ]
        );
        assert_eq!(options[0].mime_type, MIME_JSON);
        assert_eq!(options[4].mime_type, MIME_CSV);
    }

    #[test]
    fn test_write_exports_to_dir() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested");
        let options = violation_exports(
            &[violation(1, Priority::Critical, None)],
            at(24, 9),
            &Utc,
        )
        .unwrap();

        let written = write_exports(&target, &options).unwrap();
        assert_eq!(written.len(), 2);
        let csv = fs::read_to_string(target.join("alertViolations_export_20210424.csv")).unwrap();
        assert!(csv.starts_with(VIOLATIONS_CSV_HEADER));
    }

    #[tokio::test]
    async fn test_export_series_writes_five_files() {
        let api = FakeApi::default();
        api.set_series(
            (0..5).map(|i| apdex_point(0.9, 4, at(19, 10 + i))).collect(),
            (0..3).map(|i| response_time_point(80.0, 4, at(19, 10 + i))).collect(),
        );
        let dir = tempfile::tempdir().unwrap();
        let creds = Credentials::new(Some("key".into()), Some("42".into()));
        let range = DateRange::new(at(19, 10), at(19, 15), 3600).unwrap();

        let written = export_series(&api, &creds, &Classifier::default(), &range, dir.path())
            .await
            .unwrap();

        assert_eq!(written.len(), 5);
        assert_eq!(api.series_calls(), 2);
        let sla = written
            .iter()
            .find(|p| p.file_name().unwrap().to_string_lossy().starts_with("slaReport_"))
            .unwrap();
        assert_eq!(fs::read_to_string(sla).unwrap().split('\n').count(), 4);
    }

    #[tokio::test]
    async fn test_export_series_requires_app() {
        let api = FakeApi::default();
        let dir = tempfile::tempdir().unwrap();
        let creds = Credentials::new(Some("key".into()), None);
        let range = DateRange::new(at(19, 10), at(19, 15), 3600).unwrap();

        let err = export_series(&api, &creds, &Classifier::default(), &range, dir.path())
            .await
            .unwrap_err();
        let client = err.downcast_ref::<ClientError>().unwrap();
        assert!(client.is_authentication_required());
        assert_eq!(api.series_calls(), 0);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_export_violations_stops_at_empty_page() {
        let api = FakeApi::default();
        api.push_violation_page(vec![violation(1, Priority::Critical, Some(10))]);
        api.push_violation_page(vec![violation(2, Priority::Warning, Some(20))]);
        let dir = tempfile::tempdir().unwrap();
        let creds = Credentials::new(Some("key".into()), None);

        let written = export_violations(&api, &creds, 5, dir.path()).await.unwrap();

        assert_eq!(written.len(), 2);
        assert_eq!(api.requested_pages(), vec![1, 2, 3]);
        let csv_path = written.iter().find(|p| p.extension().unwrap() == "csv").unwrap();
        let csv = fs::read_to_string(csv_path).unwrap();
        // Most recently closed first
        assert!(csv.split('\n').nth(1).unwrap().starts_with("2,"));
    }
}
