//! In-memory monitoring API and fixtures shared by unit tests.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Duration;

use slawatch_client::batch::{self, MAX_BATCH_REQUESTS};
use slawatch_client::{ClientError, Credentials, MonitoringApi};
use slawatch_types::{
    AlertEvent, AlertViolation, ApdexValues, Application, DateRange, EventType, MetricFamily,
    MetricSummary, Priority, RawMetricPoint, ResponseTimeValues, Timestamp, ViolationEntity,
    ViolationLinks,
};

#[derive(Debug, Default)]
struct FakeState {
    violation_pages: Vec<Vec<AlertViolation>>,
    requested_pages: Vec<u32>,
    events: Vec<AlertEvent>,
    applications: Vec<Application>,
    apdex: Vec<RawMetricPoint>,
    response_time: Vec<RawMetricPoint>,
    summary: Vec<MetricSummary>,
    series_calls: usize,
}

/// Answers from canned data and records what was asked for.
///
/// Credentials are checked the same way the HTTP client checks them, so a
/// call that would fail before the network never counts as a call.
#[derive(Debug, Default)]
pub struct FakeApi {
    state: Mutex<FakeState>,
}

impl FakeApi {
    /// Add the next API page of violations. Pages past the last one pushed
    /// are empty.
    pub fn push_violation_page(&self, page: Vec<AlertViolation>) {
        self.state.lock().unwrap().violation_pages.push(page);
    }

    pub fn set_series(&self, apdex: Vec<RawMetricPoint>, response_time: Vec<RawMetricPoint>) {
        let mut state = self.state.lock().unwrap();
        state.apdex = apdex;
        state.response_time = response_time;
    }

    pub fn set_events(&self, events: Vec<AlertEvent>) {
        self.state.lock().unwrap().events = events;
    }

    pub fn set_applications(&self, applications: Vec<Application>) {
        self.state.lock().unwrap().applications = applications;
    }

    pub fn violation_calls(&self) -> usize {
        self.state.lock().unwrap().requested_pages.len()
    }

    pub fn requested_pages(&self) -> Vec<u32> {
        self.state.lock().unwrap().requested_pages.clone()
    }

    pub fn series_calls(&self) -> usize {
        self.state.lock().unwrap().series_calls
    }
}

#[async_trait]
impl MonitoringApi for FakeApi {
    async fn fetch_series(
        &self,
        credentials: &Credentials,
        family: MetricFamily,
        range: &DateRange,
    ) -> Result<Vec<RawMetricPoint>, ClientError> {
        credentials.api_key()?;
        credentials.app_id()?;
        batch::plan(range, MAX_BATCH_REQUESTS)?;
        let mut state = self.state.lock().unwrap();
        state.series_calls += 1;
        Ok(match family {
            MetricFamily::Apdex => state.apdex.clone(),
            MetricFamily::ResponseTime => state.response_time.clone(),
        })
    }

    async fn fetch_violations_page(
        &self,
        credentials: &Credentials,
        page: u32,
    ) -> Result<Vec<AlertViolation>, ClientError> {
        credentials.api_key()?;
        let mut state = self.state.lock().unwrap();
        state.requested_pages.push(page);
        let index = (page as usize).saturating_sub(1);
        Ok(state.violation_pages.get(index).cloned().unwrap_or_default())
    }

    async fn fetch_events(
        &self,
        credentials: &Credentials,
    ) -> Result<Vec<AlertEvent>, ClientError> {
        credentials.api_key()?;
        Ok(self.state.lock().unwrap().events.clone())
    }

    async fn fetch_applications(
        &self,
        credentials: &Credentials,
    ) -> Result<Vec<Application>, ClientError> {
        credentials.api_key()?;
        Ok(self.state.lock().unwrap().applications.clone())
    }

    async fn fetch_apdex_summary(
        &self,
        credentials: &Credentials,
        _from: Timestamp,
        _to: Timestamp,
    ) -> Result<Vec<MetricSummary>, ClientError> {
        credentials.api_key()?;
        credentials.app_id()?;
        Ok(self.state.lock().unwrap().summary.clone())
    }
}

pub fn violation(id: u64, priority: Priority, closed_at: Option<i64>) -> AlertViolation {
    AlertViolation {
        id,
        label: format!("violation {}", id),
        duration: 60,
        policy_name: "Web".to_string(),
        condition_name: "Apdex low".to_string(),
        priority,
        opened_at: 1_619_254_800_000,
        closed_at,
        entity: ViolationEntity::default(),
        links: ViolationLinks::default(),
    }
}

pub fn event(id: u64, event_type: EventType, timestamp: i64, priority: Option<Priority>) -> AlertEvent {
    AlertEvent {
        id,
        event_type,
        description: format!("event {}", id),
        timestamp,
        incident_id: None,
        product: None,
        entity_type: None,
        entity_group_id: None,
        entity_id: None,
        priority,
    }
}

pub fn apdex_point(score: f64, count: u64, from: Timestamp) -> RawMetricPoint {
    RawMetricPoint::apdex(
        ApdexValues {
            score,
            count,
            s: count,
            t: 0,
            f: 0,
        },
        from,
        from + Duration::minutes(10),
    )
}

pub fn response_time_point(average: f64, calls: u64, from: Timestamp) -> RawMetricPoint {
    RawMetricPoint::response_time(
        ResponseTimeValues {
            average_response_time: average,
            call_count: calls,
        },
        from,
        from + Duration::minutes(10),
    )
}
