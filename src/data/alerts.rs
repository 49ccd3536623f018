//! Client-side filtering of recent alert events.

use slawatch_types::{AlertEvent, EventKind, Priority};

/// Which events the Events view shows.
///
/// Incident and notification events pass when their kind is selected;
/// violation events additionally need a selected priority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventFilter {
    kinds: Vec<EventKind>,
    priorities: Vec<Priority>,
}

impl Default for EventFilter {
    fn default() -> Self {
        Self {
            kinds: vec![EventKind::Incidents],
            priorities: vec![Priority::Critical],
        }
    }
}

impl EventFilter {
    pub fn kinds(&self) -> &[EventKind] {
        &self.kinds
    }

    pub fn priorities(&self) -> &[Priority] {
        &self.priorities
    }

    pub fn shows(&self, kind: EventKind) -> bool {
        self.kinds.contains(&kind)
    }

    pub fn toggle_kind(&mut self, kind: EventKind) {
        toggle(&mut self.kinds, kind);
    }

    pub fn toggle_priority(&mut self, priority: Priority) {
        toggle(&mut self.priorities, priority);
    }

    pub fn matches(&self, event: &AlertEvent) -> bool {
        let kind = event.event_type.kind();
        match kind {
            EventKind::Incidents | EventKind::Notifications => self.shows(kind),
            EventKind::Violations => {
                self.shows(kind)
                    && event
                        .priority
                        .is_some_and(|p| self.priorities.contains(&p))
            }
        }
    }

    pub fn apply<'a>(&self, events: &'a [AlertEvent]) -> Vec<&'a AlertEvent> {
        events.iter().filter(|e| self.matches(e)).collect()
    }
}

fn toggle<T: PartialEq>(set: &mut Vec<T>, item: T) {
    if let Some(pos) = set.iter().position(|x| *x == item) {
        set.remove(pos);
    } else {
        set.push(item);
    }
}

/// Order events newest first.
pub fn sort_events(events: &mut [AlertEvent]) {
    events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::event;
    use slawatch_types::EventType;

    #[test]
    fn test_default_shows_incidents_only() {
        let filter = EventFilter::default();
        assert!(filter.matches(&event(1, EventType::IncidentOpen, 10, None)));
        assert!(filter.matches(&event(2, EventType::IncidentClosed, 10, None)));
        assert!(!filter.matches(&event(3, EventType::Notification, 10, None)));
        assert!(!filter.matches(&event(
            4,
            EventType::ViolationOpen,
            10,
            Some(Priority::Critical)
        )));
    }

    #[test]
    fn test_violations_need_matching_priority() {
        let mut filter = EventFilter::default();
        filter.toggle_kind(EventKind::Violations);

        let critical = event(1, EventType::ViolationOpen, 10, Some(Priority::Critical));
        let warning = event(2, EventType::ViolationClose, 10, Some(Priority::Warning));
        let unknown = event(3, EventType::ViolationClose, 10, None);
        assert!(filter.matches(&critical));
        assert!(!filter.matches(&warning));
        assert!(!filter.matches(&unknown));

        filter.toggle_priority(Priority::Warning);
        assert!(filter.matches(&warning));
    }

    #[test]
    fn test_toggle_off_hides_kind() {
        let mut filter = EventFilter::default();
        filter.toggle_kind(EventKind::Incidents);
        filter.toggle_kind(EventKind::Notifications);
        assert!(!filter.matches(&event(1, EventType::IncidentOpen, 10, None)));
        assert!(filter.matches(&event(2, EventType::Notification, 10, None)));
    }

    #[test]
    fn test_sort_newest_first() {
        let mut events = vec![
            event(1, EventType::IncidentOpen, 10, None),
            event(2, EventType::IncidentOpen, 30, None),
            event(3, EventType::IncidentOpen, 20, None),
        ];
        sort_events(&mut events);
        let ids: Vec<u64> = events.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);

        let filter = EventFilter::default();
        assert_eq!(filter.apply(&events).len(), 3);
    }
}
