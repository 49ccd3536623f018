//! Application state and navigation logic.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::Local;
use tracing::{debug, info};

use slawatch_client::ClientError;
use slawatch_types::{
    AlertEvent, Application, DateRange, EventKind, MetricSummary, Priority, RangeError,
    Resolution, Timestamp,
};

use crate::config::Settings;
use crate::data::alerts::sort_events;
use crate::data::classify::DEFAULT_DECIMATE_TARGET;
use crate::data::datetime;
use crate::data::{
    bucket_distribution, classify_response_time_series, decimate, Classifier, EventFilter,
    PageAdvance, ResponseTimePoint, ScoredPoint, ViolationPager,
};
use crate::export;
use crate::session::{FetchKind, Session};
use crate::source::{Fetched, Fetcher, Payload};
use crate::ui::Theme;

/// The current view/tab in the TUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Apdex and response-time series for the selected application.
    Apdex,
    /// Recent alert events.
    Events,
    /// Paged alert violations.
    Violations,
    /// API key entry and application selection.
    Setup,
}

impl View {
    pub const ALL: [View; 4] = [View::Apdex, View::Events, View::Violations, View::Setup];

    /// Cycle to the next view.
    pub fn next(self) -> Self {
        match self {
            View::Apdex => View::Events,
            View::Events => View::Violations,
            View::Violations => View::Setup,
            View::Setup => View::Apdex,
        }
    }

    /// Cycle to the previous view.
    pub fn prev(self) -> Self {
        match self {
            View::Apdex => View::Setup,
            View::Events => View::Apdex,
            View::Violations => View::Events,
            View::Setup => View::Violations,
        }
    }

    /// Returns the display label for this view.
    pub fn label(&self) -> &'static str {
        match self {
            View::Apdex => "Apdex",
            View::Events => "Events",
            View::Violations => "Violations",
            View::Setup => "Setup",
        }
    }
}

/// What a view has to show for one kind of data.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState<T> {
    /// Nothing requested yet.
    Idle,
    /// The key or application the data needs is missing.
    Unauthenticated(String),
    Loading,
    /// The request succeeded with no records.
    Empty,
    Loaded(T),
    Failed(String),
}

impl<T> LoadState<T> {
    pub fn loaded(&self) -> Option<&T> {
        match self {
            LoadState::Loaded(data) => Some(data),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    fn from_error(err: &ClientError) -> Self {
        if err.is_authentication_required() {
            LoadState::Unauthenticated(err.to_string())
        } else {
            LoadState::Failed(err.to_string())
        }
    }

    /// `Empty` when `is_empty`, otherwise `Loaded(data)`.
    fn from_data(data: T, is_empty: bool) -> Self {
        if is_empty {
            LoadState::Empty
        } else {
            LoadState::Loaded(data)
        }
    }
}

/// Both classified series over one range.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesData {
    pub apdex: Vec<ScoredPoint>,
    pub response_time: Vec<ResponseTimePoint>,
    pub range: DateRange,
}

impl SeriesData {
    /// Apdex points thinned for charting.
    pub fn chart_apdex(&self) -> Vec<ScoredPoint> {
        decimate(&self.apdex, DEFAULT_DECIMATE_TARGET)
    }

    pub fn chart_response_time(&self) -> Vec<ResponseTimePoint> {
        decimate(&self.response_time, DEFAULT_DECIMATE_TARGET)
    }

    /// Bucket percentages over the charted points.
    pub fn distribution(&self) -> [f64; 6] {
        bucket_distribution(&self.chart_apdex())
    }
}

/// Preset lengths for the query window, ending now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeSpan {
    #[default]
    LastHour,
    LastDay,
    LastWeek,
    Last30Days,
    Last90Days,
}

impl TimeSpan {
    pub fn next(self) -> Self {
        match self {
            TimeSpan::LastHour => TimeSpan::LastDay,
            TimeSpan::LastDay => TimeSpan::LastWeek,
            TimeSpan::LastWeek => TimeSpan::Last30Days,
            TimeSpan::Last30Days => TimeSpan::Last90Days,
            TimeSpan::Last90Days => TimeSpan::LastHour,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TimeSpan::LastHour => "Last hour",
            TimeSpan::LastDay => "Last 24 hours",
            TimeSpan::LastWeek => "Last 7 days",
            TimeSpan::Last30Days => "Last 30 days",
            TimeSpan::Last90Days => "Last 90 days",
        }
    }

    /// Start of the span, counting back from now.
    pub fn start(&self) -> Timestamp {
        match self {
            TimeSpan::LastHour => datetime::hours_ago(1),
            TimeSpan::LastDay => datetime::hours_ago(24),
            TimeSpan::LastWeek => datetime::days_ago(7),
            TimeSpan::Last30Days => datetime::days_ago(30),
            TimeSpan::Last90Days => datetime::days_ago(90),
        }
    }
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub current_view: View,
    pub show_help: bool,

    pub session: Session,
    fetcher: Fetcher,
    classifier: Classifier,

    // Query form
    pub span: TimeSpan,
    pub resolution_seconds: u64,
    /// Explicit range from the command line; cleared by picking a span.
    pub custom_range: Option<(Timestamp, Timestamp)>,

    // Data
    pub series: LoadState<SeriesData>,
    pub summary: LoadState<Vec<MetricSummary>>,
    pub events: LoadState<Vec<AlertEvent>>,
    pub event_filter: EventFilter,
    pub pager: ViolationPager,
    pub violations: LoadState<()>,
    /// View page to show once the in-flight violations page lands.
    pending_page: Option<usize>,
    pub applications: LoadState<Vec<Application>>,

    // Navigation
    pub selected_row: usize,
    /// API key being typed on the Setup view, if editing.
    pub key_input: Option<String>,

    pub export_dir: PathBuf,

    // UI
    pub theme: Theme,

    /// Blocking notice shown until dismissed.
    pub alert: Option<String>,
    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,
}

impl App {
    /// Create the app from loaded settings; nothing is fetched yet.
    pub fn new(fetcher: Fetcher, settings: &Settings) -> Result<Self> {
        Ok(Self {
            running: true,
            current_view: View::Apdex,
            show_help: false,
            session: settings.session(),
            fetcher,
            classifier: settings.classifier()?,
            span: TimeSpan::default(),
            resolution_seconds: Resolution::default().seconds(),
            custom_range: None,
            series: LoadState::Idle,
            summary: LoadState::Idle,
            events: LoadState::Idle,
            event_filter: EventFilter::default(),
            pager: ViolationPager::new(settings.page_size),
            violations: LoadState::Idle,
            pending_page: None,
            applications: LoadState::Idle,
            selected_row: 0,
            key_input: None,
            export_dir: settings.export_dir.clone(),
            theme: Theme::default(),
            alert: None,
            status_message: None,
        })
    }

    /// Returns a description of the upstream API.
    pub fn source_description(&self) -> &str {
        self.fetcher.description()
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired (3 seconds).
    pub fn get_status_message(&self) -> Option<&str> {
        if let Some((msg, time)) = &self.status_message {
            if time.elapsed() < Duration::from_secs(3) {
                return Some(msg);
            }
        }
        None
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    /// The range the form currently describes.
    pub fn range(&self) -> Result<DateRange, RangeError> {
        let (from, to) = match self.custom_range {
            Some(range) => range,
            None => (self.span.start(), datetime::now()),
        };
        DateRange::new(from, to, self.resolution_seconds)
    }

    /// Label for the form's range, e.g. "Last hour @ Hours".
    pub fn range_label(&self) -> String {
        let span = match self.custom_range {
            Some((from, to)) => format!(
                "{} .. {}",
                from.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
                to.with_timezone(&Local).format("%Y-%m-%d %H:%M")
            ),
            None => self.span.label().to_string(),
        };
        let resolution = match Resolution::from_seconds(self.resolution_seconds) {
            Some(preset) => preset.label().to_string(),
            None => crate::data::duration::format_resolution(self.resolution_seconds),
        };
        format!("{} @ {}", span, resolution)
    }

    /// Overall Apdex for the range, from the summary query.
    pub fn summary_score(&self) -> Option<f64> {
        let summary = self.summary.loaded()?;
        summary
            .iter()
            .find(|s| s.name == "EndUser/Apdex")
            .or_else(|| summary.first())
            .and_then(|s| s.score)
    }

    /// Fetch everything the current credentials allow.
    pub fn refresh_all(&mut self) {
        self.fetch_series();
        self.fetch_events();
        self.reload_violations();
        if self.session.has_api_key() {
            self.fetch_applications();
        }
    }

    /// Refetch the data behind the current view.
    pub fn refresh(&mut self) {
        match self.current_view {
            View::Apdex => self.fetch_series(),
            View::Events => self.fetch_events(),
            View::Violations => self.reload_violations(),
            View::Setup => self.fetch_applications(),
        }
    }

    /// Fetch both series and the summary score over the form's range.
    pub fn fetch_series(&mut self) {
        let range = match self.range() {
            Ok(range) => range,
            Err(e) => {
                self.series = LoadState::Failed(e.to_string());
                return;
            }
        };

        match self.session.begin(FetchKind::Series) {
            Ok(ticket) => {
                info!(
                    from = %range.from(),
                    to = %range.to(),
                    resolution = range.resolution_seconds(),
                    "fetching series"
                );
                self.series = LoadState::Loading;
                self.fetcher.series(ticket, range);
            }
            Err(e) => {
                self.series = LoadState::from_error(&e);
                self.summary = LoadState::Idle;
                return;
            }
        }

        match self.session.begin(FetchKind::Summary) {
            Ok(ticket) => {
                self.summary = LoadState::Loading;
                self.fetcher.summary(ticket, range.from(), range.to());
            }
            Err(e) => self.summary = LoadState::from_error(&e),
        }
    }

    pub fn fetch_events(&mut self) {
        match self.session.begin(FetchKind::Events) {
            Ok(ticket) => {
                self.events = LoadState::Loading;
                self.fetcher.events(ticket);
            }
            Err(e) => self.events = LoadState::from_error(&e),
        }
    }

    pub fn fetch_applications(&mut self) {
        match self.session.begin(FetchKind::Applications) {
            Ok(ticket) => {
                self.applications = LoadState::Loading;
                self.fetcher.applications(ticket);
            }
            Err(e) => self.applications = LoadState::from_error(&e),
        }
    }

    /// Drop the buffered violations and load the first page again.
    pub fn reload_violations(&mut self) {
        // A page still in flight belongs to the old buffer
        self.session.cancel(FetchKind::Violations);
        self.pager.reset();
        self.pending_page = None;
        self.violations = LoadState::Idle;
        self.go_to_violation_page(0);
    }

    /// Move the violations view to page `target`, fetching one more API
    /// page first if the buffer does not cover it.
    pub fn go_to_violation_page(&mut self, target: usize) {
        if self.session.is_loading(FetchKind::Violations) {
            return;
        }
        match self.pager.plan(target) {
            PageAdvance::Ready => {
                self.pager.set_page(target);
                self.selected_row = 0;
            }
            PageAdvance::Exhausted => {
                self.set_status_message("No more violations".to_string());
            }
            PageAdvance::Fetch(api_page) => match self.session.begin(FetchKind::Violations) {
                Ok(ticket) => {
                    debug!(api_page, target, "fetching violations page");
                    self.pending_page = Some(target);
                    if self.pager.all().is_empty() {
                        self.violations = LoadState::Loading;
                    }
                    self.fetcher.violations_page(ticket, api_page);
                }
                Err(e) => self.violations = LoadState::from_error(&e),
            },
        }
    }

    pub fn next_violation_page(&mut self) {
        self.go_to_violation_page(self.pager.page() + 1);
    }

    pub fn prev_violation_page(&mut self) {
        let page = self.pager.page();
        if page > 0 {
            self.go_to_violation_page(page - 1);
        }
    }

    /// Apply every fetch result that has arrived. Returns whether any did.
    pub fn poll_fetches(&mut self) -> bool {
        let mut any = false;
        while let Some(fetched) = self.fetcher.poll() {
            self.handle_fetched(fetched);
            any = true;
        }
        any
    }

    /// Wait for the next fetch result and apply it.
    pub async fn wait_for_fetch(&mut self) -> bool {
        match self.fetcher.recv().await {
            Some(fetched) => {
                self.handle_fetched(fetched);
                true
            }
            None => false,
        }
    }

    /// Apply one fetch result, unless a newer fetch of its kind was issued.
    pub fn handle_fetched(&mut self, fetched: Fetched) {
        let Fetched {
            kind,
            generation,
            result,
        } = fetched;
        if !self.session.finish(kind, generation) {
            return;
        }

        let payload = match result {
            Ok(payload) => payload,
            Err(e) => {
                self.fail(kind, &e);
                return;
            }
        };

        match payload {
            Payload::Series {
                apdex,
                response_time,
                range,
            } => {
                let classified = self
                    .classifier
                    .classify_apdex_series(&apdex)
                    .and_then(|a| classify_response_time_series(&response_time).map(|r| (a, r)));
                self.series = match classified {
                    Ok((apdex, response_time)) => {
                        let is_empty = apdex.is_empty() && response_time.is_empty();
                        LoadState::from_data(
                            SeriesData {
                                apdex,
                                response_time,
                                range,
                            },
                            is_empty,
                        )
                    }
                    Err(e) => LoadState::Failed(e.to_string()),
                };
            }
            Payload::Summary(summary) => {
                let is_empty = summary.is_empty();
                self.summary = LoadState::from_data(summary, is_empty);
            }
            Payload::Events(mut events) => {
                sort_events(&mut events);
                let is_empty = events.is_empty();
                self.events = LoadState::from_data(events, is_empty);
            }
            Payload::ViolationsPage { page, violations } => {
                self.pager.apply_page(page, violations);
                if let Some(target) = self.pending_page.take() {
                    if self.pager.set_page(target) {
                        self.selected_row = 0;
                    } else if target > 0 && self.pager.is_exhausted() {
                        self.set_status_message("No more violations".to_string());
                    }
                }
                let is_empty = self.pager.all().is_empty();
                self.violations = LoadState::from_data((), is_empty);
            }
            Payload::Applications(applications) => {
                let is_empty = applications.is_empty();
                self.applications = LoadState::from_data(applications, is_empty);
            }
        }
        self.clamp_selection();
    }

    fn fail(&mut self, kind: FetchKind, err: &ClientError) {
        if let ClientError::RateLimitAvoidance { .. } = err {
            self.alert = Some(format!(
                "{}. Choose a coarser resolution or a shorter range.",
                err
            ));
        }
        match kind {
            FetchKind::Series => self.series = LoadState::from_error(err),
            FetchKind::Summary => self.summary = LoadState::from_error(err),
            FetchKind::Events => self.events = LoadState::from_error(err),
            FetchKind::Violations => {
                self.pending_page = None;
                self.violations = LoadState::from_error(err);
            }
            FetchKind::Applications => self.applications = LoadState::from_error(err),
        }
    }

    /// Switch to the next view.
    pub fn next_view(&mut self) {
        self.set_view(self.current_view.next());
    }

    /// Switch to the previous view.
    pub fn prev_view(&mut self) {
        self.set_view(self.current_view.prev());
    }

    /// Switch to a specific view.
    pub fn set_view(&mut self, view: View) {
        self.current_view = view;
        self.selected_row = 0;
    }

    /// Events passing the current filter, newest first.
    pub fn visible_events(&self) -> Vec<&AlertEvent> {
        self.events
            .loaded()
            .map(|events| self.event_filter.apply(events))
            .unwrap_or_default()
    }

    /// Number of selectable rows in the current view.
    fn row_count(&self) -> usize {
        match self.current_view {
            View::Apdex => self.series.loaded().map_or(0, |s| s.apdex.len()),
            View::Events => self.visible_events().len(),
            View::Violations => self.pager.current_page().len(),
            View::Setup => self.applications.loaded().map_or(0, Vec::len),
        }
    }

    fn clamp_selection(&mut self) {
        let max = self.row_count().saturating_sub(1);
        self.selected_row = self.selected_row.min(max);
    }

    /// Move selection down by one item.
    pub fn select_next(&mut self) {
        self.select_next_n(1);
    }

    /// Move selection up by one item.
    pub fn select_prev(&mut self) {
        self.select_prev_n(1);
    }

    /// Move selection down by n items.
    pub fn select_next_n(&mut self, n: usize) {
        let max = self.row_count().saturating_sub(1);
        self.selected_row = (self.selected_row + n).min(max);
    }

    /// Move selection up by n items.
    pub fn select_prev_n(&mut self, n: usize) {
        self.selected_row = self.selected_row.saturating_sub(n);
    }

    /// Jump to the first item in the list.
    pub fn select_first(&mut self) {
        self.selected_row = 0;
    }

    /// Jump to the last item in the list.
    pub fn select_last(&mut self) {
        self.selected_row = self.row_count().saturating_sub(1);
    }

    /// Step the resolution to the next finer preset and refetch.
    pub fn finer_resolution(&mut self) {
        let current = Resolution::from_seconds(self.resolution_seconds).unwrap_or_default();
        self.resolution_seconds = current.next().seconds();
        self.fetch_series();
    }

    /// Step the resolution to the next coarser preset and refetch.
    pub fn coarser_resolution(&mut self) {
        let current = Resolution::from_seconds(self.resolution_seconds).unwrap_or_default();
        self.resolution_seconds = current.prev().seconds();
        self.fetch_series();
    }

    /// Cycle the time span preset and refetch.
    pub fn cycle_span(&mut self) {
        if self.custom_range.take().is_none() {
            self.span = self.span.next();
        }
        self.fetch_series();
    }

    /// Toggle a priority in the filter of the current alerts view.
    pub fn toggle_priority(&mut self, priority: Priority) {
        match self.current_view {
            View::Violations => {
                self.pager.toggle_priority(priority);
                self.selected_row = 0;
                self.go_to_violation_page(0);
            }
            _ => {
                self.event_filter.toggle_priority(priority);
                self.clamp_selection();
            }
        }
    }

    pub fn toggle_event_kind(&mut self, kind: EventKind) {
        self.event_filter.toggle_kind(kind);
        self.clamp_selection();
    }

    /// Begin typing a new API key.
    pub fn start_key_input(&mut self) {
        self.key_input = Some(String::new());
    }

    pub fn cancel_key_input(&mut self) {
        self.key_input = None;
    }

    pub fn key_push(&mut self, c: char) {
        if let Some(input) = self.key_input.as_mut() {
            input.push(c);
        }
    }

    pub fn key_pop(&mut self) {
        if let Some(input) = self.key_input.as_mut() {
            input.pop();
        }
    }

    /// Store the typed key and reload everything that depends on it.
    pub fn submit_key_input(&mut self) {
        let Some(key) = self.key_input.take() else {
            return;
        };
        self.session.set_api_key(key);
        if self.session.has_api_key() {
            self.set_status_message("API key set".to_string());
        }
        self.reset_data();
        self.refresh_all();
    }

    pub fn clear_api_key(&mut self) {
        self.session.clear_api_key();
        self.reset_data();
        self.refresh_all();
        self.set_status_message("API key cleared".to_string());
    }

    /// Select the highlighted application on the Setup view.
    pub fn select_application(&mut self) {
        let Some(app) = self
            .applications
            .loaded()
            .and_then(|apps| apps.get(self.selected_row))
            .cloned()
        else {
            return;
        };
        info!(app_id = app.id, name = %app.name, "application selected");
        self.session.set_app(app.id.to_string(), app.name.clone());
        self.set_status_message(format!("Selected {}", app.name));
        self.fetch_series();
    }

    pub fn clear_application(&mut self) {
        self.session.clear_app();
        self.series = LoadState::Idle;
        self.summary = LoadState::Idle;
        self.fetch_series();
        self.set_status_message("Application cleared".to_string());
    }

    fn reset_data(&mut self) {
        self.series = LoadState::Idle;
        self.summary = LoadState::Idle;
        self.events = LoadState::Idle;
        self.violations = LoadState::Idle;
        self.applications = LoadState::Idle;
        self.pager.reset();
        self.pending_page = None;
        self.selected_row = 0;
    }

    /// Write the current view's export bundle to the export directory.
    pub fn export_current(&mut self) {
        let result = match self.current_view {
            View::Apdex => match self.series.loaded() {
                Some(series) => export::apdex_exports(
                    &series.apdex,
                    &series.response_time,
                    &series.range,
                    &Local,
                )
                .and_then(|options| export::write_exports(&self.export_dir, &options)),
                None => {
                    self.set_status_message("No series to export".to_string());
                    return;
                }
            },
            View::Violations if !self.pager.all().is_empty() => {
                export::violation_exports(self.pager.all(), datetime::now(), &Local)
                    .and_then(|options| export::write_exports(&self.export_dir, &options))
            }
            _ => {
                self.set_status_message("Nothing to export here".to_string());
                return;
            }
        };

        match result {
            Ok(paths) => self.set_status_message(format!(
                "Exported {} files to {}",
                paths.len(),
                self.export_dir.display()
            )),
            Err(e) => self.set_status_message(format!("Export failed: {:#}", e)),
        }
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }
}
