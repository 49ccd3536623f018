//! New Relic REST API (v2) client.
//!
//! ## Endpoints Used
//!
//! - **Metric data** (`applications/{id}/metrics/data`): Apdex and response
//!   time time-slices, optionally summarized over the whole range
//! - **Alert events** (`alerts_events`): recent incident, violation and
//!   notification events
//! - **Alert violations** (`alerts_violations`): page-numbered violation listing
//! - **Applications** (`applications`): applications visible to the key
//!
//! Every request carries the key in the `X-Api-Key` header.
//!
//! ## Example
//!
//! ```rust,no_run
//! use chrono::{Duration, Utc};
//! use slawatch_client::{Credentials, MetricFamily, MonitoringApi, NewRelicClient};
//! use slawatch_types::DateRange;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = NewRelicClient::builder().build()?;
//!     let credentials = Credentials::new(Some("NRAK-...".into()), Some("123456".into()));
//!
//!     let to = Utc::now();
//!     let range = DateRange::new(to - Duration::hours(6), to, 600)?;
//!     let points = client
//!         .fetch_series(&credentials, MetricFamily::Apdex, &range)
//!         .await?;
//!
//!     println!("Fetched {} Apdex points", points.len());
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use chrono::SecondsFormat;
use futures_util::future::join_all;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use slawatch_types::{
    AlertEvent, AlertViolation, ApdexValues, Application, DateRange, MetricFamily, MetricSummary,
    RawMetricPoint, ResponseTimeValues, Timestamp,
};

use crate::batch::{self, Window, MAX_BATCH_REQUESTS};
use crate::{ClientError, Credentials, MonitoringApi};

/// Default API base URL.
pub const DEFAULT_ENDPOINT: &str = "https://api.newrelic.com/v2";

const API_KEY_HEADER: &str = "X-Api-Key";

/// Client for the New Relic REST API.
#[derive(Debug, Clone)]
pub struct NewRelicClient {
    client: Client,
    endpoint: String,
    max_batch_requests: u64,
}

impl NewRelicClient {
    /// Create a new builder for configuring the client.
    pub fn builder() -> NewRelicClientBuilder {
        NewRelicClientBuilder::default()
    }

    /// The API base URL requests are sent to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// The request ceiling for one batched series fetch.
    pub fn max_batch_requests(&self) -> u64 {
        self.max_batch_requests
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        api_key: &str,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ClientError> {
        let url = format!("{}/{}.json", self.endpoint, path);
        debug!(%url, "GET");

        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, api_key)
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ClientError::Auth(format!(
                "API key rejected with status {}",
                status
            )));
        }

        if !status.is_success() {
            return Err(ClientError::Http(format!(
                "API returned status {}",
                status
            )));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::Parse(e.to_string()))
    }

    async fn fetch_window(
        &self,
        api_key: &str,
        path: &str,
        family: MetricFamily,
        window: &Window,
    ) -> Result<Vec<RawMetricPoint>, ClientError> {
        let query = metric_query(family, window.from, window.to);
        let points = match family {
            MetricFamily::Apdex => self
                .get_json::<MetricDataEnvelope<ApdexValues>>(api_key, path, &query)
                .await?
                .first_timeslices()
                .map(|slice| RawMetricPoint::apdex(slice.values, slice.from, slice.to))
                .collect(),
            MetricFamily::ResponseTime => self
                .get_json::<MetricDataEnvelope<ResponseTimeValues>>(api_key, path, &query)
                .await?
                .first_timeslices()
                .map(|slice| RawMetricPoint::response_time(slice.values, slice.from, slice.to))
                .collect(),
        };
        Ok(points)
    }
}

#[async_trait]
impl MonitoringApi for NewRelicClient {
    async fn fetch_series(
        &self,
        credentials: &Credentials,
        family: MetricFamily,
        range: &DateRange,
    ) -> Result<Vec<RawMetricPoint>, ClientError> {
        let api_key = credentials.api_key()?;
        let app_id = credentials.app_id()?;
        let windows = batch::plan(range, self.max_batch_requests)?;

        debug!(
            family = family.label(),
            requests = windows.len(),
            "fetching series"
        );

        let path = format!("applications/{}/metrics/data", app_id);
        let results = join_all(
            windows
                .iter()
                .map(|window| self.fetch_window(api_key, &path, family, window)),
        )
        .await;

        let mut points = Vec::new();
        for result in results {
            points.extend(result?);
        }
        Ok(points)
    }

    async fn fetch_violations_page(
        &self,
        credentials: &Credentials,
        page: u32,
    ) -> Result<Vec<AlertViolation>, ClientError> {
        let api_key = credentials.api_key()?;
        let envelope: ViolationsEnvelope = self
            .get_json(api_key, "alerts_violations", &[("page", page.to_string())])
            .await?;
        Ok(envelope.violations)
    }

    async fn fetch_events(
        &self,
        credentials: &Credentials,
    ) -> Result<Vec<AlertEvent>, ClientError> {
        let api_key = credentials.api_key()?;
        let envelope: EventsEnvelope = self.get_json(api_key, "alerts_events", &[]).await?;
        Ok(envelope.recent_events)
    }

    async fn fetch_applications(
        &self,
        credentials: &Credentials,
    ) -> Result<Vec<Application>, ClientError> {
        let api_key = credentials.api_key()?;
        let envelope: ApplicationsEnvelope = self.get_json(api_key, "applications", &[]).await?;
        Ok(envelope.applications)
    }

    async fn fetch_apdex_summary(
        &self,
        credentials: &Credentials,
        from: Timestamp,
        to: Timestamp,
    ) -> Result<Vec<MetricSummary>, ClientError> {
        let api_key = credentials.api_key()?;
        let app_id = credentials.app_id()?;
        let path = format!("applications/{}/metrics/data", app_id);
        let query = vec![
            ("names[]", "Apdex".to_string()),
            ("names[]", "EndUser/Apdex".to_string()),
            ("values[]", "score".to_string()),
            ("from", iso(from)),
            ("to", iso(to)),
            ("summarize", "true".to_string()),
        ];

        let envelope: MetricDataEnvelope<ScoreValues> =
            self.get_json(api_key, &path, &query).await?;

        Ok(envelope
            .metric_data
            .metrics
            .into_iter()
            .map(|series| MetricSummary {
                score: series.timeslices.first().and_then(|s| s.values.score),
                name: series.name,
            })
            .collect())
    }
}

/// Builder for NewRelicClient.
#[derive(Debug, Default)]
pub struct NewRelicClientBuilder {
    endpoint: Option<String>,
    timeout: Option<Duration>,
    max_batch_requests: Option<u64>,
}

impl NewRelicClientBuilder {
    /// Set the API base URL (default: "https://api.newrelic.com/v2").
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the request timeout (default: 10 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the request ceiling for one batched fetch (default: 3500).
    pub fn max_batch_requests(mut self, limit: u64) -> Self {
        self.max_batch_requests = Some(limit);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<NewRelicClient, ClientError> {
        let timeout = self.timeout.unwrap_or(Duration::from_secs(10));

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Http(format!("failed to build HTTP client: {}", e)))?;

        let endpoint = self
            .endpoint
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(NewRelicClient {
            client,
            endpoint,
            max_batch_requests: self.max_batch_requests.unwrap_or(MAX_BATCH_REQUESTS),
        })
    }
}

// ISO-8601 with millisecond precision and a `Z` suffix
fn iso(ts: Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn metric_query(family: MetricFamily, from: Timestamp, to: Timestamp) -> Vec<(&'static str, String)> {
    let mut query: Vec<(&'static str, String)> = family
        .metric_names()
        .iter()
        .map(|name| ("names[]", name.to_string()))
        .collect();
    query.extend(
        family
            .value_names()
            .iter()
            .map(|value| ("values[]", value.to_string())),
    );
    query.push(("from", iso(from)));
    query.push(("to", iso(to)));
    query
}

/// Metric query response: `metric_data.metrics[].timeslices[]`.
#[derive(Debug, Deserialize)]
struct MetricDataEnvelope<V> {
    metric_data: MetricData<V>,
}

#[derive(Debug, Deserialize)]
struct MetricData<V> {
    #[serde(default = "Vec::new")]
    metrics: Vec<MetricSeries<V>>,
}

#[derive(Debug, Deserialize)]
struct MetricSeries<V> {
    #[serde(default)]
    name: String,
    #[serde(default = "Vec::new")]
    timeslices: Vec<Timeslice<V>>,
}

#[derive(Debug, Deserialize)]
struct Timeslice<V> {
    from: Timestamp,
    to: Timestamp,
    values: V,
}

impl<V> MetricDataEnvelope<V> {
    // Only the first requested metric is charted
    fn first_timeslices(self) -> impl Iterator<Item = Timeslice<V>> {
        self.metric_data
            .metrics
            .into_iter()
            .next()
            .map(|series| series.timeslices)
            .unwrap_or_default()
            .into_iter()
    }
}

#[derive(Debug, Deserialize)]
struct ScoreValues {
    #[serde(default)]
    score: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ViolationsEnvelope {
    #[serde(default)]
    violations: Vec<AlertViolation>,
}

#[derive(Debug, Deserialize)]
struct EventsEnvelope {
    #[serde(default)]
    recent_events: Vec<AlertEvent>,
}

#[derive(Debug, Deserialize)]
struct ApplicationsEnvelope {
    #[serde(default)]
    applications: Vec<Application>,
}
