//! Demand-loaded paging over the alert violation listing.
//!
//! The API serves violations in numbered pages whose size is unrelated to
//! the number of rows shown per view page. [`ViolationPager`] buffers every
//! API page fetched so far and decides when moving to a view page needs one
//! more API page first.
//!
//! The buffer is never evicted within a session. Growth stops once the API
//! returns an empty page, after which the pager is exhausted and advancing
//! past the buffered rows fetches nothing.

use std::cmp::Reverse;

use tracing::debug;

use slawatch_client::{ClientError, Credentials, MonitoringApi};
use slawatch_types::{AlertViolation, Priority};

/// Default number of violations shown per view page.
pub const DEFAULT_PAGE_SIZE: usize = 12;

/// What moving to a view page requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageAdvance {
    /// The buffered rows already cover the page.
    Ready,
    /// The given API page must be fetched first.
    Fetch(u32),
    /// The upstream has no more rows for the page.
    Exhausted,
}

#[derive(Debug, Clone)]
pub struct ViolationPager {
    /// Every fetched violation, most recently closed first.
    buffer: Vec<AlertViolation>,
    priorities: Vec<Priority>,
    rows: usize,
    page: usize,
    /// Last API page fetched; 0 before the first fetch.
    api_page: u32,
    exhausted: bool,
}

impl Default for ViolationPager {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl ViolationPager {
    pub fn new(rows: usize) -> Self {
        Self {
            buffer: Vec::new(),
            priorities: Priority::ALL.to_vec(),
            rows: rows.max(1),
            page: 0,
            api_page: 0,
            exhausted: false,
        }
    }

    /// Current zero-based view page.
    pub fn page(&self) -> usize {
        self.page
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn api_page(&self) -> u32 {
        self.api_page
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn priorities(&self) -> &[Priority] {
        &self.priorities
    }

    /// Every buffered violation regardless of the priority filter.
    pub fn all(&self) -> &[AlertViolation] {
        &self.buffer
    }

    /// Buffered violations passing the priority filter, most recently
    /// closed first. Open violations sort ahead of closed ones.
    pub fn filtered(&self) -> Vec<&AlertViolation> {
        self.buffer
            .iter()
            .filter(|v| self.priorities.contains(&v.priority))
            .collect()
    }

    /// Rows of the current view page.
    pub fn current_page(&self) -> Vec<&AlertViolation> {
        self.filtered()
            .into_iter()
            .skip(self.page * self.rows)
            .take(self.rows)
            .collect()
    }

    /// Number of view pages the buffered rows fill.
    pub fn buffered_pages(&self) -> usize {
        self.filtered().len().div_ceil(self.rows)
    }

    /// Decide what moving to view page `target` requires.
    pub fn plan(&self, target: usize) -> PageAdvance {
        let available = self.filtered().len();
        if (target + 1) * self.rows <= available {
            return PageAdvance::Ready;
        }
        if !self.exhausted {
            return PageAdvance::Fetch(self.api_page + 1);
        }
        if target == 0 || target * self.rows < available {
            PageAdvance::Ready
        } else {
            PageAdvance::Exhausted
        }
    }

    /// Append a fetched API page. An empty page exhausts the pager.
    pub fn apply_page(&mut self, api_page: u32, violations: Vec<AlertViolation>) {
        if api_page <= self.api_page {
            debug!(api_page, "ignoring already buffered violations page");
            return;
        }
        self.api_page = api_page;
        if violations.is_empty() {
            debug!(api_page, "violation listing exhausted");
            self.exhausted = true;
            return;
        }
        self.buffer.extend(violations);
        self.buffer
            .sort_by_key(|v| Reverse(v.closed_at.unwrap_or(i64::MAX)));
    }

    /// Move to view page `target` if it has rows (page 0 always does).
    ///
    /// Returns whether the page index changed.
    pub fn set_page(&mut self, target: usize) -> bool {
        if target == 0 || target * self.rows < self.filtered().len() {
            let changed = self.page != target;
            self.page = target;
            changed
        } else {
            false
        }
    }

    /// Move to view page `target`, fetching at most one API page first.
    pub async fn advance<A>(
        &mut self,
        api: &A,
        credentials: &Credentials,
        target: usize,
    ) -> Result<PageAdvance, ClientError>
    where
        A: MonitoringApi + ?Sized,
    {
        let plan = self.plan(target);
        match plan {
            PageAdvance::Ready => {
                self.set_page(target);
            }
            PageAdvance::Fetch(api_page) => {
                let violations = api.fetch_violations_page(credentials, api_page).await?;
                self.apply_page(api_page, violations);
                self.set_page(target);
            }
            PageAdvance::Exhausted => {}
        }
        Ok(plan)
    }

    /// Toggle a priority in the filter, returning to the first page.
    pub fn toggle_priority(&mut self, priority: Priority) {
        if let Some(pos) = self.priorities.iter().position(|p| *p == priority) {
            self.priorities.remove(pos);
        } else {
            self.priorities.push(priority);
        }
        self.page = 0;
    }

    /// Drop all buffered pages, keeping the filter.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.page = 0;
        self.api_page = 0;
        self.exhausted = false;
    }
}
