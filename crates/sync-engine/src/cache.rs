//! In-memory event cache.

use calendar_types::CalendarEvent;
use std::collections::BTreeMap;

/// Mapping from event id to hydrated event record.
///
/// The UI's only read path: events are never read directly from the network
/// layer. All mutations are total — validity filtering (`end > start`)
/// happens before a record reaches the cache, so the cache never holds an
/// event with an inverted range.
#[derive(Debug, Default)]
pub struct EventCache {
    events: BTreeMap<String, CalendarEvent>,
}

impl EventCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wholesale swap after a full load.
    pub fn replace_all(&mut self, events: Vec<CalendarEvent>) {
        self.events = events
            .into_iter()
            .map(|event| (event.id.clone(), event))
            .collect();
    }

    /// Add or overwrite a single event by id (after a confirmed create).
    pub fn upsert(&mut self, event: CalendarEvent) {
        self.events.insert(event.id.clone(), event);
    }

    /// Remove an event by id (after a confirmed delete). Removing an absent
    /// id is a no-op.
    pub fn remove(&mut self, event_id: &str) {
        self.events.remove(event_id);
    }

    /// Discard all cached events.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Look up a single event by id.
    pub fn get(&self, event_id: &str) -> Option<&CalendarEvent> {
        self.events.get(event_id)
    }

    /// All cached events, ordered by start instant (ties broken by id).
    pub fn all(&self) -> Vec<CalendarEvent> {
        let mut events: Vec<_> = self.events.values().cloned().collect();
        events.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.id.cmp(&b.id)));
        events
    }

    /// Number of cached events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns true if no events are cached.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, hour, 0, 0).unwrap()
    }

    fn event(id: &str, start_hour: u32) -> CalendarEvent {
        CalendarEvent {
            id: id.to_string(),
            title: format!("event {id}"),
            description: String::new(),
            start: at(start_hour),
            end: at(start_hour + 1),
            owner_id: "user-1".to_string(),
        }
    }

    #[test]
    fn test_replace_all_swaps_contents() {
        let mut cache = EventCache::new();
        cache.upsert(event("old", 9));

        cache.replace_all(vec![event("a", 11), event("b", 10)]);
        assert_eq!(cache.len(), 2);
        assert!(cache.get("old").is_none());
    }

    #[test]
    fn test_all_is_ordered_by_start() {
        let mut cache = EventCache::new();
        cache.replace_all(vec![event("late", 15), event("early", 8), event("mid", 12)]);

        let ids: Vec<_> = cache.all().into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["early", "mid", "late"]);
    }

    #[test]
    fn test_upsert_overwrites_by_id() {
        let mut cache = EventCache::new();
        cache.upsert(event("a", 9));

        let mut revised = event("a", 9);
        revised.title = "renamed".to_string();
        cache.upsert(revised);

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("a").unwrap().title, "renamed");
    }

    #[test]
    fn test_remove_absent_id_is_noop() {
        let mut cache = EventCache::new();
        cache.upsert(event("a", 9));
        cache.remove("missing");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_clear_empties_cache() {
        let mut cache = EventCache::new();
        cache.replace_all(vec![event("a", 9), event("b", 10)]);
        cache.clear();
        assert!(cache.is_empty());
    }
}
