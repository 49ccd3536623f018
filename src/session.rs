//! The single mutable session: credentials, selected application and the
//! per-fetch loading state.
//!
//! Every fetch starts with [`Session::begin`], which checks the credentials
//! the fetch needs and issues a generation token. A result is only applied
//! if [`Session::finish`] confirms its token is still the latest for that
//! kind of fetch, so a slow response can never overwrite fresher data.

use slawatch_client::{ClientError, Credentials};
use tracing::debug;

/// Default API key baked in at build time, if any.
pub const BUILD_DEFAULT_API_KEY: Option<&str> = option_env!("SLAWATCH_DEFAULT_API_KEY");

/// The independent kinds of fetch the dashboard issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchKind {
    Series,
    Summary,
    Events,
    Violations,
    Applications,
}

impl FetchKind {
    pub const ALL: [FetchKind; 5] = [
        FetchKind::Series,
        FetchKind::Summary,
        FetchKind::Events,
        FetchKind::Violations,
        FetchKind::Applications,
    ];

    fn slot(self) -> usize {
        match self {
            FetchKind::Series => 0,
            FetchKind::Summary => 1,
            FetchKind::Events => 2,
            FetchKind::Violations => 3,
            FetchKind::Applications => 4,
        }
    }

    /// Whether this fetch is scoped to the selected application.
    pub fn needs_app(self) -> bool {
        matches!(self, FetchKind::Series | FetchKind::Summary)
    }

    pub fn label(self) -> &'static str {
        match self {
            FetchKind::Series => "series",
            FetchKind::Summary => "summary",
            FetchKind::Events => "events",
            FetchKind::Violations => "violations",
            FetchKind::Applications => "applications",
        }
    }
}

/// Permission to run one fetch, stamped with its generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub kind: FetchKind,
    pub generation: u64,
    pub credentials: Credentials,
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    api_key: Option<String>,
    app_id: Option<String>,
    app_title: String,
    loading: [bool; 5],
    generations: [u64; 5],
}

impl Session {
    pub fn new(api_key: Option<String>, app_id: Option<String>, app_title: String) -> Self {
        let mut session = Self::default();
        session.set_api_key(api_key.unwrap_or_default());
        if let Some(id) = app_id.filter(|id| !id.is_empty()) {
            session.app_id = Some(id);
            session.app_title = app_title;
        }
        session
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn app_id(&self) -> Option<&str> {
        self.app_id.as_deref()
    }

    pub fn app_title(&self) -> &str {
        &self.app_title
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn has_app(&self) -> bool {
        self.app_id.is_some()
    }

    /// Set the API key. An empty key clears it.
    pub fn set_api_key(&mut self, key: impl Into<String>) {
        let key = key.into();
        let key = key.trim();
        self.api_key = if key.is_empty() {
            None
        } else {
            Some(key.to_string())
        };
        self.invalidate(|_| true);
    }

    pub fn clear_api_key(&mut self) {
        self.api_key = None;
        self.invalidate(|_| true);
    }

    pub fn set_app(&mut self, id: impl Into<String>, title: impl Into<String>) {
        self.app_id = Some(id.into());
        self.app_title = title.into();
        self.invalidate(FetchKind::needs_app);
    }

    pub fn clear_app(&mut self) {
        self.app_id = None;
        self.app_title.clear();
        self.invalidate(FetchKind::needs_app);
    }

    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.api_key.clone(), self.app_id.clone())
    }

    pub fn is_loading(&self, kind: FetchKind) -> bool {
        self.loading[kind.slot()]
    }

    pub fn any_loading(&self) -> bool {
        self.loading.iter().any(|l| *l)
    }

    pub fn generation(&self, kind: FetchKind) -> u64 {
        self.generations[kind.slot()]
    }

    /// Start a fetch of `kind`.
    ///
    /// Fails with `AuthenticationRequired` if the key (or, for
    /// application-scoped fetches, the app) is missing. On success any
    /// earlier fetch of the same kind becomes stale.
    pub fn begin(&mut self, kind: FetchKind) -> Result<Ticket, ClientError> {
        let credentials = self.credentials();
        credentials.api_key()?;
        if kind.needs_app() {
            credentials.app_id()?;
        }

        let slot = kind.slot();
        self.generations[slot] += 1;
        self.loading[slot] = true;
        Ok(Ticket {
            kind,
            generation: self.generations[slot],
            credentials,
        })
    }

    /// Settle a fetch. Returns whether its result should be applied.
    pub fn finish(&mut self, kind: FetchKind, generation: u64) -> bool {
        let slot = kind.slot();
        if generation != self.generations[slot] {
            debug!(
                kind = kind.label(),
                generation,
                latest = self.generations[slot],
                "dropping stale result"
            );
            return false;
        }
        self.loading[slot] = false;
        true
    }

    /// Abandon any in-flight fetch of `kind`; its result will be dropped.
    pub fn cancel(&mut self, kind: FetchKind) {
        let slot = kind.slot();
        self.generations[slot] += 1;
        self.loading[slot] = false;
    }

    /// Credentials changed: in-flight fetches of the affected kinds are stale.
    fn invalidate(&mut self, affected: impl Fn(FetchKind) -> bool) {
        for kind in FetchKind::ALL {
            if affected(kind) {
                self.cancel(kind);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logged_in() -> Session {
        Session::new(Some("key".into()), Some("42".into()), "Storefront".into())
    }

    #[test]
    fn test_new_session() {
        let session = logged_in();
        assert_eq!(session.api_key(), Some("key"));
        assert_eq!(session.app_id(), Some("42"));
        assert_eq!(session.app_title(), "Storefront");
        assert!(!session.any_loading());

        let anonymous = Session::new(Some(String::new()), None, "ignored".into());
        assert!(!anonymous.has_api_key());
        assert_eq!(anonymous.app_title(), "");
    }

    #[test]
    fn test_begin_requires_key() {
        let mut session = Session::default();
        let err = session.begin(FetchKind::Events).unwrap_err();
        assert!(err.is_authentication_required());
        assert!(!session.is_loading(FetchKind::Events));
    }

    #[test]
    fn test_series_requires_app() {
        let mut session = Session::new(Some("key".into()), None, String::new());
        assert!(session
            .begin(FetchKind::Series)
            .unwrap_err()
            .is_authentication_required());
        assert!(session.begin(FetchKind::Applications).is_ok());
        assert!(session.begin(FetchKind::Violations).is_ok());
    }

    #[test]
    fn test_only_latest_generation_applies() {
        let mut session = logged_in();
        let first = session.begin(FetchKind::Series).unwrap();
        let second = session.begin(FetchKind::Series).unwrap();
        assert!(second.generation > first.generation);

        assert!(!session.finish(FetchKind::Series, first.generation));
        assert!(session.is_loading(FetchKind::Series));
        assert!(session.finish(FetchKind::Series, second.generation));
        assert!(!session.is_loading(FetchKind::Series));
    }

    #[test]
    fn test_kinds_are_independent() {
        let mut session = logged_in();
        let series = session.begin(FetchKind::Series).unwrap();
        let events = session.begin(FetchKind::Events).unwrap();
        assert!(session.finish(FetchKind::Events, events.generation));
        assert!(session.is_loading(FetchKind::Series));
        assert!(session.finish(FetchKind::Series, series.generation));
    }

    #[test]
    fn test_changing_app_invalidates_in_flight() {
        let mut session = logged_in();
        let ticket = session.begin(FetchKind::Series).unwrap();
        session.set_app("7", "Checkout");

        assert!(!session.is_loading(FetchKind::Series));
        assert!(!session.finish(FetchKind::Series, ticket.generation));
        assert_eq!(session.credentials().app_id.as_deref(), Some("7"));
    }

    #[test]
    fn test_changing_app_keeps_account_fetches() {
        let mut session = logged_in();
        let events = session.begin(FetchKind::Events).unwrap();
        let violations = session.begin(FetchKind::Violations).unwrap();
        session.set_app("7", "Checkout");
        session.clear_app();

        assert!(session.is_loading(FetchKind::Events));
        assert!(session.finish(FetchKind::Events, events.generation));
        assert!(session.finish(FetchKind::Violations, violations.generation));
    }

    #[test]
    fn test_changing_key_invalidates_every_kind() {
        let mut session = logged_in();
        let tickets: Vec<Ticket> = FetchKind::ALL
            .iter()
            .map(|kind| session.begin(*kind).unwrap())
            .collect();
        session.set_api_key("other");

        assert!(!session.any_loading());
        for ticket in tickets {
            assert!(!session.finish(ticket.kind, ticket.generation));
        }
    }

    #[test]
    fn test_cancel_one_kind() {
        let mut session = logged_in();
        let events = session.begin(FetchKind::Events).unwrap();
        let violations = session.begin(FetchKind::Violations).unwrap();
        session.cancel(FetchKind::Violations);

        assert!(!session.is_loading(FetchKind::Violations));
        assert!(!session.finish(FetchKind::Violations, violations.generation));
        assert!(session.finish(FetchKind::Events, events.generation));
    }

    #[test]
    fn test_clearing() {
        let mut session = logged_in();
        session.clear_app();
        assert!(!session.has_app());
        assert_eq!(session.app_title(), "");
        session.clear_api_key();
        assert_eq!(session.credentials(), Credentials::default());
    }

    #[test]
    fn test_set_api_key_trims() {
        let mut session = Session::default();
        session.set_api_key("  abc  ");
        assert_eq!(session.api_key(), Some("abc"));
        session.set_api_key("   ");
        assert!(!session.has_api_key());
    }
}
