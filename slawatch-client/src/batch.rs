//! Splitting a date range into per-request windows.
//!
//! The metric endpoint caps the time span a single request may cover, so a
//! long range at a fine resolution is fetched as many abutting windows. The
//! number of windows is bounded by a safety ceiling: the API enforces its own
//! call-volume policy and exceeding it risks the key being suspended.

use chrono::Duration;

use slawatch_types::{DateRange, Timestamp};

use crate::ClientError;

/// Maximum number of requests issued for one series.
pub const MAX_BATCH_REQUESTS: u64 = 3500;

/// One sub-range of a batched fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub from: Timestamp,
    pub to: Timestamp,
}

/// Number of requests needed to cover `range` at its resolution.
///
/// A resolution at least as wide as the range needs a single request.
pub fn step_count(range: &DateRange) -> u64 {
    let range_ms = range.duration_ms().unsigned_abs();
    let period_ms = range.resolution_seconds().saturating_mul(1000);
    if period_ms < range_ms {
        range_ms.div_ceil(period_ms)
    } else {
        1
    }
}

/// Plan the windows for `range`, refusing batches above `limit`.
pub fn plan(range: &DateRange, limit: u64) -> Result<Vec<Window>, ClientError> {
    let steps = step_count(range);
    if steps > limit {
        return Err(ClientError::RateLimitAvoidance { steps, limit });
    }
    Ok(split(range, steps))
}

/// Split `range` into `steps` equal-width abutting windows.
///
/// Bounds are interpolated from the range ends rather than accumulated, so
/// rounding never drifts across many steps and the last window ends exactly
/// at `range.to()`.
pub fn split(range: &DateRange, steps: u64) -> Vec<Window> {
    let steps = steps.max(1);
    let from = range.from();
    let span = i128::from(range.duration_ms());

    let bound = |i: u64| -> Timestamp {
        if i >= steps {
            return range.to();
        }
        let offset = span * i128::from(i) / i128::from(steps);
        from + Duration::milliseconds(offset as i64)
    };

    (0..steps)
        .map(|i| Window {
            from: bound(i),
            to: bound(i + 1),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn range(hours: i64, resolution: u64) -> DateRange {
        let from = Utc.with_ymd_and_hms(2021, 4, 19, 0, 0, 0).unwrap();
        DateRange::new(from, from + Duration::hours(hours), resolution).unwrap()
    }

    #[test]
    fn resolution_wider_than_range_is_one_step() {
        assert_eq!(step_count(&range(1, 60 * 60 * 24)), 1);
        assert_eq!(step_count(&range(1, 3600)), 1);
    }

    #[test]
    fn even_division() {
        // 24h at 10 minutes
        assert_eq!(step_count(&range(24, 600)), 144);
    }

    #[test]
    fn uneven_division_rounds_up() {
        // 1h at 25 minutes -> 2.4 -> 3
        assert_eq!(step_count(&range(1, 1500)), 3);
    }

    #[test]
    fn windows_abut_without_gaps() {
        let r = range(24, 600);
        let windows = split(&r, step_count(&r));
        assert_eq!(windows.len(), 144);
        assert_eq!(windows[0].from, r.from());
        assert_eq!(windows.last().unwrap().to, r.to());
        for pair in windows.windows(2) {
            assert_eq!(pair[0].to, pair[1].from);
        }
        for w in &windows {
            assert_eq!((w.to - w.from).num_seconds(), 600);
        }
    }

    #[test]
    fn uneven_windows_are_equal_width() {
        let r = range(1, 1500);
        let windows = split(&r, step_count(&r));
        assert_eq!(windows.len(), 3);
        assert_eq!((windows[0].to - windows[0].from).num_minutes(), 20);
        assert_eq!(windows[2].to, r.to());
    }

    #[test]
    fn many_steps_do_not_drift() {
        // 7 days at 7 seconds does not divide evenly into whole ms per step
        let from = Utc.with_ymd_and_hms(2021, 4, 19, 0, 0, 0).unwrap();
        let r = DateRange::new(from, from + Duration::milliseconds(1_000_003), 1).unwrap();
        let windows = split(&r, 1001);
        assert_eq!(windows.len(), 1001);
        assert_eq!(windows.last().unwrap().to, r.to());
        for pair in windows.windows(2) {
            assert_eq!(pair[0].to, pair[1].from);
            assert!(pair[0].from < pair[0].to);
        }
    }

    #[test]
    fn plan_refuses_oversized_batch() {
        // 30 days at 10 minutes = 4320 requests
        let r = range(24 * 30, 600);
        match plan(&r, MAX_BATCH_REQUESTS) {
            Err(ClientError::RateLimitAvoidance { steps, limit }) => {
                assert_eq!(steps, 4320);
                assert_eq!(limit, MAX_BATCH_REQUESTS);
            }
            other => panic!("expected rate-limit refusal, got {other:?}"),
        }
    }

    #[test]
    fn plan_accepts_batch_at_limit() {
        let r = range(24, 600);
        assert_eq!(plan(&r, 144).unwrap().len(), 144);
        assert!(plan(&r, 143).is_err());
    }
}
