//! Alert events and violations.
//!
//! These records are read-only: they are listed from the API, filtered and
//! sorted client-side, and never modified locally. Timestamps are epoch
//! milliseconds, as delivered by the API.

use core::fmt;

/// Priority of an alert condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Priority {
    #[cfg_attr(feature = "serde", serde(alias = "critical", alias = "CRITICAL"))]
    Critical,
    #[cfg_attr(feature = "serde", serde(alias = "warning", alias = "WARNING"))]
    Warning,
}

impl Priority {
    pub const ALL: [Priority; 2] = [Priority::Warning, Priority::Critical];

    pub fn label(&self) -> &'static str {
        match self {
            Priority::Critical => "Critical",
            Priority::Warning => "Warning",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The fixed set of alert event types reported by the event summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum EventType {
    Notification,
    IncidentAcknowledged,
    IncidentClosed,
    ViolationClose,
    IncidentOpen,
    ViolationOpen,
}

/// Coarse grouping of [`EventType`]s used for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Incidents,
    Violations,
    Notifications,
}

impl EventKind {
    pub const ALL: [EventKind; 3] = [
        EventKind::Incidents,
        EventKind::Violations,
        EventKind::Notifications,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            EventKind::Incidents => "Incidents",
            EventKind::Violations => "Violations",
            EventKind::Notifications => "Notifications",
        }
    }
}

impl EventType {
    /// The filter group this event type belongs to.
    pub fn kind(&self) -> EventKind {
        match self {
            EventType::IncidentAcknowledged | EventType::IncidentClosed | EventType::IncidentOpen => {
                EventKind::Incidents
            }
            EventType::ViolationClose | EventType::ViolationOpen => EventKind::Violations,
            EventType::Notification => EventKind::Notifications,
        }
    }

    /// The wire name of this event type.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Notification => "NOTIFICATION",
            EventType::IncidentAcknowledged => "INCIDENT_ACKNOWLEDGED",
            EventType::IncidentClosed => "INCIDENT_CLOSED",
            EventType::ViolationClose => "VIOLATION_CLOSE",
            EventType::IncidentOpen => "INCIDENT_OPEN",
            EventType::ViolationOpen => "VIOLATION_OPEN",
        }
    }

    /// Whether the event calls for operator attention.
    pub fn is_attention(&self) -> bool {
        matches!(
            self,
            EventType::Notification | EventType::IncidentAcknowledged
        )
    }
}

/// A recent alert event from the event summary.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AlertEvent {
    pub id: u64,
    pub event_type: EventType,
    #[cfg_attr(feature = "serde", serde(default))]
    pub description: String,
    /// Epoch milliseconds.
    pub timestamp: i64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub incident_id: Option<u64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub product: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub entity_type: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub entity_group_id: Option<u64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub entity_id: Option<u64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub priority: Option<Priority>,
}

/// The monitored entity a violation was raised against.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ViolationEntity {
    #[cfg_attr(feature = "serde", serde(default))]
    pub product: String,
    #[cfg_attr(feature = "serde", serde(rename = "type", default))]
    pub entity_type: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub group_id: u64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub id: u64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: String,
}

/// Identifiers of the policy objects behind a violation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ViolationLinks {
    #[cfg_attr(feature = "serde", serde(default))]
    pub policy_id: u64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub condition_id: u64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub incident_id: Option<u64>,
}

/// An alert violation from the paginated violation listing.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AlertViolation {
    pub id: u64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub label: String,
    /// Seconds the violation was (or has been) open.
    #[cfg_attr(feature = "serde", serde(default))]
    pub duration: u64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub policy_name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub condition_name: String,
    pub priority: Priority,
    /// Epoch milliseconds.
    pub opened_at: i64,
    /// Epoch milliseconds; absent while the violation is still open.
    #[cfg_attr(feature = "serde", serde(default))]
    pub closed_at: Option<i64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub entity: ViolationEntity,
    #[cfg_attr(feature = "serde", serde(default))]
    pub links: ViolationLinks,
}

impl AlertViolation {
    /// Whether the violation is still open.
    pub fn is_open(&self) -> bool {
        self.closed_at.is_none()
    }
}
