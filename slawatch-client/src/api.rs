//! The monitoring API seam.
//!
//! Everything above the client talks to the API through [`MonitoringApi`],
//! passing [`Credentials`] explicitly on every call. The client holds no
//! session state of its own.

use std::fmt::Debug;

use async_trait::async_trait;

use slawatch_types::{
    AlertEvent, AlertViolation, Application, DateRange, MetricFamily, MetricSummary,
    RawMetricPoint, Timestamp,
};

use crate::ClientError;

/// The API key and selected application a call is made with.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: Option<String>,
    pub app_id: Option<String>,
}

impl Credentials {
    pub fn new(api_key: Option<String>, app_id: Option<String>) -> Self {
        Self { api_key, app_id }
    }

    /// The API key, or `AuthenticationRequired` if none is set.
    pub fn api_key(&self) -> Result<&str, ClientError> {
        match self.api_key.as_deref() {
            Some(key) if !key.is_empty() => Ok(key),
            _ => Err(ClientError::AuthenticationRequired(
                "a secure request was attempted but no API key is set".to_string(),
            )),
        }
    }

    /// The selected application id, or `AuthenticationRequired` if none is set.
    pub fn app_id(&self) -> Result<&str, ClientError> {
        match self.app_id.as_deref() {
            Some(id) if !id.is_empty() => Ok(id),
            _ => Err(ClientError::AuthenticationRequired(
                "an application-level request was attempted but no application is selected"
                    .to_string(),
            )),
        }
    }
}

/// Read access to the monitoring API.
#[async_trait]
pub trait MonitoringApi: Send + Sync + Debug {
    /// Fetch the time-ordered series of `family` over `range`.
    ///
    /// Needs both an API key and an application. The range is split into
    /// windows at its resolution and all windows are requested concurrently;
    /// the result is concatenated in window order.
    async fn fetch_series(
        &self,
        credentials: &Credentials,
        family: MetricFamily,
        range: &DateRange,
    ) -> Result<Vec<RawMetricPoint>, ClientError>;

    /// Fetch one page of the violation listing. Pages start at 1.
    async fn fetch_violations_page(
        &self,
        credentials: &Credentials,
        page: u32,
    ) -> Result<Vec<AlertViolation>, ClientError>;

    /// Fetch the recent alert events.
    async fn fetch_events(&self, credentials: &Credentials)
        -> Result<Vec<AlertEvent>, ClientError>;

    /// List the applications visible to the API key.
    async fn fetch_applications(
        &self,
        credentials: &Credentials,
    ) -> Result<Vec<Application>, ClientError>;

    /// Fetch summarized Apdex scores over a whole range.
    async fn fetch_apdex_summary(
        &self,
        credentials: &Credentials,
        from: Timestamp,
        to: Timestamp,
    ) -> Result<Vec<MetricSummary>, ClientError>;
}
