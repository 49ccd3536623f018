//! Background fetches delivered over a channel.
//!
//! Each fetch runs as a task on the tokio runtime and sends one
//! [`Fetched`] message back when it settles. The UI thread drains the
//! channel with [`Fetcher::poll`] between frames, so it never blocks on the
//! network.

use std::future::Future;
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use slawatch_client::{ClientError, MonitoringApi};
use slawatch_types::{
    AlertEvent, AlertViolation, Application, DateRange, MetricFamily, MetricSummary,
    RawMetricPoint, Timestamp,
};

use crate::session::{FetchKind, Ticket};

/// The data a successful fetch produced.
#[derive(Debug, Clone)]
pub enum Payload {
    /// Both series over the same range, so they line up by index.
    Series {
        apdex: Vec<RawMetricPoint>,
        response_time: Vec<RawMetricPoint>,
        range: DateRange,
    },
    Summary(Vec<MetricSummary>),
    Events(Vec<AlertEvent>),
    ViolationsPage {
        page: u32,
        violations: Vec<AlertViolation>,
    },
    Applications(Vec<Application>),
}

/// A settled fetch, tagged with the ticket it was issued under.
#[derive(Debug)]
pub struct Fetched {
    pub kind: FetchKind,
    pub generation: u64,
    pub result: Result<Payload, ClientError>,
}

/// Spawns API calls and collects their results.
#[derive(Debug)]
pub struct Fetcher {
    api: Arc<dyn MonitoringApi>,
    runtime: Handle,
    sender: mpsc::UnboundedSender<Fetched>,
    receiver: mpsc::UnboundedReceiver<Fetched>,
    description: String,
}

impl Fetcher {
    pub fn new(api: Arc<dyn MonitoringApi>, runtime: Handle, description: &str) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            api,
            runtime,
            sender,
            receiver,
            description: description.to_string(),
        }
    }

    /// Human-readable description of the upstream, for the status bar.
    pub fn description(&self) -> &str {
        &self.description
    }

    fn spawn<F>(&self, ticket: &Ticket, fetch: F)
    where
        F: Future<Output = Result<Payload, ClientError>> + Send + 'static,
    {
        let sender = self.sender.clone();
        let kind = ticket.kind;
        let generation = ticket.generation;
        debug!(kind = kind.label(), generation, "fetch started");

        self.runtime.spawn(async move {
            let result = fetch.await;
            if let Err(e) = &result {
                warn!(kind = kind.label(), generation, error = %e, "fetch failed");
            }
            if sender
                .send(Fetched {
                    kind,
                    generation,
                    result,
                })
                .is_err()
            {
                // Receiver dropped
                debug!(kind = kind.label(), "fetch result discarded");
            }
        });
    }

    /// Fetch the Apdex and response-time series over `range` together.
    pub fn series(&self, ticket: Ticket, range: DateRange) {
        let api = self.api.clone();
        let credentials = ticket.credentials.clone();
        self.spawn(&ticket, async move {
            let (apdex, response_time) = tokio::try_join!(
                api.fetch_series(&credentials, MetricFamily::Apdex, &range),
                api.fetch_series(&credentials, MetricFamily::ResponseTime, &range),
            )?;
            Ok(Payload::Series {
                apdex,
                response_time,
                range,
            })
        });
    }

    pub fn summary(&self, ticket: Ticket, from: Timestamp, to: Timestamp) {
        let api = self.api.clone();
        let credentials = ticket.credentials.clone();
        self.spawn(&ticket, async move {
            let summary = api.fetch_apdex_summary(&credentials, from, to).await?;
            Ok(Payload::Summary(summary))
        });
    }

    pub fn events(&self, ticket: Ticket) {
        let api = self.api.clone();
        let credentials = ticket.credentials.clone();
        self.spawn(&ticket, async move {
            let events = api.fetch_events(&credentials).await?;
            Ok(Payload::Events(events))
        });
    }

    pub fn violations_page(&self, ticket: Ticket, page: u32) {
        let api = self.api.clone();
        let credentials = ticket.credentials.clone();
        self.spawn(&ticket, async move {
            let violations = api.fetch_violations_page(&credentials, page).await?;
            Ok(Payload::ViolationsPage { page, violations })
        });
    }

    pub fn applications(&self, ticket: Ticket) {
        let api = self.api.clone();
        let credentials = ticket.credentials.clone();
        self.spawn(&ticket, async move {
            let applications = api.fetch_applications(&credentials).await?;
            Ok(Payload::Applications(applications))
        });
    }

    /// Take the next settled fetch without blocking.
    pub fn poll(&mut self) -> Option<Fetched> {
        // The fetcher holds a sender itself, so the channel never disconnects
        self.receiver.try_recv().ok()
    }

    /// Wait for the next settled fetch.
    pub async fn recv(&mut self) -> Option<Fetched> {
        self.receiver.recv().await
    }
}
