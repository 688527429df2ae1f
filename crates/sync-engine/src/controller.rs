//! Sync orchestration.

use crate::{EventCache, EventStore, OwnerColors, SyncError, SyncResult};
use calendar_types::{CalendarEvent, EventDraft};
use session_engine::{Credential, SessionManager};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::Mutex;
use tracing::{debug, error, warn};

/// Orchestrates loads, creates, and deletes against the remote store.
///
/// Checks the session before every network call, applies confirmed results
/// to the cache, and cascades credential rejections into session
/// invalidation. Every cache mutation is a single atomic apply under the
/// cache lock, so a `refresh` and a concurrent `create_event` can never
/// interleave partial writes.
pub struct SyncController {
    session: Arc<SessionManager>,
    store: Arc<dyn EventStore>,
    cache: Mutex<EventCache>,
    colors: StdMutex<OwnerColors>,
    /// Sequence number of the most recently issued refresh. A completing
    /// refresh applies its result only if no newer one was issued since:
    /// last writer wins by call order, not by arrival order.
    refresh_seq: AtomicU64,
}

impl SyncController {
    /// Create a controller with a process-random color seed.
    pub fn new(session: Arc<SessionManager>, store: Arc<dyn EventStore>) -> Self {
        Self::with_colors(session, store, OwnerColors::new())
    }

    /// Create a controller with an explicit color map (reproducible tests).
    pub fn with_colors(
        session: Arc<SessionManager>,
        store: Arc<dyn EventStore>,
        colors: OwnerColors,
    ) -> Self {
        Self {
            session,
            store,
            cache: Mutex::new(EventCache::new()),
            colors: StdMutex::new(colors),
            refresh_seq: AtomicU64::new(0),
        }
    }

    /// Reload the cache wholesale from the remote store.
    ///
    /// Events whose range is invalid (`end <= start`) are dropped with a
    /// warning — malformed server data must not poison the cache. On a
    /// transient failure the existing cache is left untouched: stale but
    /// present beats a blank view.
    pub async fn refresh(&self) -> SyncResult<()> {
        let credential = self.current_credential()?;
        let seq = self.refresh_seq.fetch_add(1, Ordering::SeqCst) + 1;

        let result = self.store.list(&credential).await;

        let mut cache = self.cache.lock().await;
        if seq != self.refresh_seq.load(Ordering::SeqCst) {
            // A newer refresh was issued while this one was in flight;
            // its result (or failure) wins regardless of arrival order.
            debug!(seq, "Discarding superseded refresh result");
            return Ok(());
        }

        match result {
            Ok(events) => {
                let mut valid = Vec::with_capacity(events.len());
                for event in events {
                    if event.has_valid_range() {
                        valid.push(event);
                    } else {
                        warn!(
                            event_id = %event.id,
                            "Dropping server event with inverted time range"
                        );
                    }
                }

                {
                    let mut colors = self.colors.lock().unwrap();
                    for event in &valid {
                        colors.color_for(&event.owner_id);
                    }
                }

                debug!(count = valid.len(), "Refreshed event cache");
                cache.replace_all(valid);
                Ok(())
            }
            Err(event_gateway::GatewayError::Unauthenticated) => {
                Err(self.cascade_unauthenticated(&mut cache))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Create an event. The draft's range is validated locally first; an
    /// invalid draft fails with `InvalidRange` without a round-trip.
    ///
    /// There is no optimistic insert before confirmation: consistency is
    /// favored over perceived latency, and a caller wanting optimistic UI
    /// must layer it above this contract.
    pub async fn create_event(&self, draft: &EventDraft) -> SyncResult<CalendarEvent> {
        if !draft.has_valid_range() {
            return Err(SyncError::InvalidRange);
        }
        let credential = self.current_credential()?;

        match self.store.create(&credential, draft).await {
            Ok(event) => {
                let mut cache = self.cache.lock().await;
                self.colors.lock().unwrap().color_for(&event.owner_id);
                if event.has_valid_range() {
                    cache.upsert(event.clone());
                } else {
                    // Server echoed back a range it should have rejected;
                    // keep it out of the cache.
                    warn!(event_id = %event.id, "Created event has inverted range, not caching");
                }
                Ok(event)
            }
            Err(event_gateway::GatewayError::Unauthenticated) => {
                let mut cache = self.cache.lock().await;
                Err(self.cascade_unauthenticated(&mut cache))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Delete an event by id.
    ///
    /// The id must exist in the cache: an id the UI cannot be showing never
    /// produces an orphan network call. A `NotFound` from the remote store
    /// is benign reconciliation — another party already deleted the event —
    /// so the local entry is removed and the call reports success.
    pub async fn delete_event(&self, event_id: &str) -> SyncResult<()> {
        let credential = self.current_credential()?;
        {
            let cache = self.cache.lock().await;
            if cache.get(event_id).is_none() {
                return Err(SyncError::NotFound);
            }
        }

        match self.store.remove(&credential, event_id).await {
            Ok(()) => {
                self.cache.lock().await.remove(event_id);
                Ok(())
            }
            Err(event_gateway::GatewayError::NotFound) => {
                debug!(event_id = %event_id, "Event already gone remotely, reconciling cache");
                self.cache.lock().await.remove(event_id);
                Ok(())
            }
            Err(event_gateway::GatewayError::Unauthenticated) => {
                let mut cache = self.cache.lock().await;
                Err(self.cascade_unauthenticated(&mut cache))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// All cached events, ordered by start instant.
    pub async fn events(&self) -> Vec<CalendarEvent> {
        self.cache.lock().await.all()
    }

    /// Look up a cached event by id.
    pub async fn event(&self, event_id: &str) -> Option<CalendarEvent> {
        self.cache.lock().await.get(event_id).cloned()
    }

    /// Number of cached events.
    pub async fn event_count(&self) -> usize {
        self.cache.lock().await.len()
    }

    /// Display color for an event owner, stable for the session.
    pub fn color_for(&self, owner_id: &str) -> String {
        self.colors.lock().unwrap().color_for(owner_id)
    }

    fn current_credential(&self) -> SyncResult<Credential> {
        if !self.session.is_authenticated() {
            return Err(SyncError::Unauthenticated);
        }
        self.session.credential().ok_or(SyncError::Unauthenticated)
    }

    /// The one failure that cascades across components: log out the session
    /// and discard every cached event. Owner colors are kept — the map is
    /// append-only for the process lifetime.
    fn cascade_unauthenticated(&self, cache: &mut EventCache) -> SyncError {
        if let Err(e) = self.session.invalidate() {
            error!(error = %e, "Failed to clear session state during invalidation");
        }
        cache.clear();
        SyncError::Unauthenticated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone, Utc};
    use credential_store::MemoryCredentialStore;
    use event_gateway::{GatewayError, GatewayResult};
    use session_engine::{Claims, SessionState};
    use std::collections::VecDeque;
    use tokio::sync::Notify;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, hour, 0, 0).unwrap()
    }

    fn event(id: &str, owner: &str, start_hour: u32, end_hour: u32) -> CalendarEvent {
        CalendarEvent {
            id: id.to_string(),
            title: format!("event {id}"),
            description: "details".to_string(),
            start: at(start_hour),
            end: at(end_hour),
            owner_id: owner.to_string(),
        }
    }

    fn draft(start_hour: u32, end_hour: u32) -> EventDraft {
        EventDraft {
            title: "new event".to_string(),
            description: "details".to_string(),
            start: at(start_hour),
            end: at(end_hour),
        }
    }

    fn live_credential(sub: &str) -> Credential {
        Credential {
            token: "aaa.bbb.ccc".to_string(),
            claims: Claims {
                sub: sub.to_string(),
                exp: 4_102_444_800,
                email: Some("t@example.com".to_string()),
                full_name: None,
                organization_id: None,
            },
            expires_at: DateTime::<Utc>::from_timestamp(4_102_444_800, 0).unwrap(),
        }
    }

    fn logged_in_session() -> Arc<SessionManager> {
        let session = SessionManager::new(Box::new(MemoryCredentialStore::new()));
        session.begin_login().unwrap();
        let credential = live_credential("user-1");
        let identity = credential.claimed_identity();
        session.complete_login(credential, identity).unwrap();
        Arc::new(session)
    }

    /// Outcome a scripted call should produce. `GatewayError` is rebuilt on
    /// use since it is not `Clone`.
    enum Outcome<T> {
        Ok(T),
        Unauthenticated,
        NotFound,
        Transient,
        Rejected(&'static str),
    }

    impl<T> Outcome<T> {
        fn into_result(self) -> GatewayResult<T> {
            match self {
                Outcome::Ok(value) => Ok(value),
                Outcome::Unauthenticated => Err(GatewayError::Unauthenticated),
                Outcome::NotFound => Err(GatewayError::NotFound),
                Outcome::Transient => Err(GatewayError::Transient("connection reset".to_string())),
                Outcome::Rejected(msg) => Err(GatewayError::ValidationRejected(msg.to_string())),
            }
        }
    }

    struct ListCall {
        /// Notified when the call starts (lets a test order concurrent calls).
        started: Option<Arc<Notify>>,
        /// The call blocks until this is notified.
        gate: Option<Arc<Notify>>,
        outcome: Outcome<Vec<CalendarEvent>>,
    }

    impl ListCall {
        fn ready(outcome: Outcome<Vec<CalendarEvent>>) -> Self {
            Self {
                started: None,
                gate: None,
                outcome,
            }
        }
    }

    #[derive(Default)]
    struct FakeStore {
        list_calls: StdMutex<VecDeque<ListCall>>,
        create_calls: StdMutex<VecDeque<Outcome<CalendarEvent>>>,
        remove_calls: StdMutex<VecDeque<Outcome<()>>>,
    }

    impl FakeStore {
        fn with_list(outcome: Outcome<Vec<CalendarEvent>>) -> Arc<Self> {
            let store = Self::default();
            store.push_list(ListCall::ready(outcome));
            Arc::new(store)
        }

        fn push_list(&self, call: ListCall) {
            self.list_calls.lock().unwrap().push_back(call);
        }

        fn push_create(&self, outcome: Outcome<CalendarEvent>) {
            self.create_calls.lock().unwrap().push_back(outcome);
        }

        fn push_remove(&self, outcome: Outcome<()>) {
            self.remove_calls.lock().unwrap().push_back(outcome);
        }
    }

    #[async_trait]
    impl EventStore for FakeStore {
        async fn list(&self, _credential: &Credential) -> GatewayResult<Vec<CalendarEvent>> {
            let call = self
                .list_calls
                .lock()
                .unwrap()
                .pop_front()
                .expect("Unexpected list call");
            if let Some(started) = &call.started {
                started.notify_one();
            }
            if let Some(gate) = &call.gate {
                gate.notified().await;
            }
            call.outcome.into_result()
        }

        async fn create(
            &self,
            _credential: &Credential,
            _draft: &EventDraft,
        ) -> GatewayResult<CalendarEvent> {
            self.create_calls
                .lock()
                .unwrap()
                .pop_front()
                .expect("Unexpected create call")
                .into_result()
        }

        async fn remove(&self, _credential: &Credential, _event_id: &str) -> GatewayResult<()> {
            self.remove_calls
                .lock()
                .unwrap()
                .pop_front()
                .expect("Unexpected remove call")
                .into_result()
        }
    }

    fn controller_with(store: Arc<FakeStore>) -> SyncController {
        SyncController::with_colors(logged_in_session(), store, OwnerColors::with_seed(7))
    }

    #[tokio::test]
    async fn test_refresh_populates_cache() {
        let store = FakeStore::with_list(Outcome::Ok(vec![
            event("b", "user-2", 11, 12),
            event("a", "user-1", 9, 10),
        ]));
        let controller = controller_with(store);

        controller.refresh().await.unwrap();

        let ids: Vec<_> = controller.events().await.into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_refresh_drops_invalid_server_rows() {
        // Inverted range from the server must not reach the cache.
        let store = FakeStore::with_list(Outcome::Ok(vec![
            event("good", "user-1", 9, 10),
            event("bad", "user-2", 12, 11),
        ]));
        let controller = controller_with(store);

        controller.refresh().await.unwrap();

        assert_eq!(controller.event_count().await, 1);
        assert!(controller.event("good").await.is_some());
        assert!(controller.event("bad").await.is_none());
    }

    #[tokio::test]
    async fn test_refresh_requires_login() {
        let store = Arc::new(FakeStore::default());
        let session = Arc::new(SessionManager::new(Box::new(MemoryCredentialStore::new())));
        let controller =
            SyncController::with_colors(session, store, OwnerColors::with_seed(7));

        // Fails locally; the scripted store would panic if a call went out.
        let err = controller.refresh().await.unwrap_err();
        assert!(matches!(err, SyncError::Unauthenticated));
    }

    #[tokio::test]
    async fn test_refresh_unauthenticated_cascades() {
        let store = FakeStore::with_list(Outcome::Ok(vec![event("a", "user-1", 9, 10)]));
        store.push_list(ListCall::ready(Outcome::Unauthenticated));
        let controller = controller_with(store);

        controller.refresh().await.unwrap();
        assert_eq!(controller.event_count().await, 1);

        let err = controller.refresh().await.unwrap_err();
        assert!(matches!(err, SyncError::Unauthenticated));
        assert_eq!(controller.event_count().await, 0);
        assert_eq!(controller.session.state(), SessionState::LoggedOut);
    }

    #[tokio::test]
    async fn test_refresh_transient_keeps_stale_cache() {
        let store = FakeStore::with_list(Outcome::Ok(vec![event("a", "user-1", 9, 10)]));
        store.push_list(ListCall::ready(Outcome::Transient));
        let controller = controller_with(store);

        controller.refresh().await.unwrap();
        let err = controller.refresh().await.unwrap_err();

        assert!(err.is_transient());
        // Stale-but-present beats a blank view.
        assert_eq!(controller.event_count().await, 1);
        assert_eq!(controller.session.state(), SessionState::LoggedIn);
    }

    #[tokio::test]
    async fn test_superseded_refresh_is_discarded() {
        let started = Arc::new(Notify::new());
        let gate = Arc::new(Notify::new());

        let store = Arc::new(FakeStore::default());
        // Refresh #1 blocks on the gate and would produce event "stale".
        store.push_list(ListCall {
            started: Some(Arc::clone(&started)),
            gate: Some(Arc::clone(&gate)),
            outcome: Outcome::Ok(vec![event("stale", "user-1", 9, 10)]),
        });
        // Refresh #2 completes immediately with event "fresh".
        store.push_list(ListCall::ready(Outcome::Ok(vec![event(
            "fresh", "user-1", 11, 12,
        )])));

        let controller = Arc::new(controller_with(store));

        let first = {
            let controller = Arc::clone(&controller);
            tokio::spawn(async move { controller.refresh().await })
        };
        // Wait until #1 holds sequence number 1, then supersede it.
        started.notified().await;
        controller.refresh().await.unwrap();

        gate.notify_one();
        first.await.unwrap().unwrap();

        // The late-arriving #1 result must not clobber #2's.
        let ids: Vec<_> = controller.events().await.into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["fresh"]);
    }

    #[tokio::test]
    async fn test_create_invalid_range_short_circuits() {
        // Scripted store would panic on any call: the bad draft must never
        // consume a request.
        let store = Arc::new(FakeStore::default());
        let controller = controller_with(store);

        let err = controller.create_event(&draft(10, 10)).await.unwrap_err();
        assert!(matches!(err, SyncError::InvalidRange));

        let err = controller.create_event(&draft(11, 10)).await.unwrap_err();
        assert!(matches!(err, SyncError::InvalidRange));

        assert_eq!(controller.event_count().await, 0);
    }

    #[tokio::test]
    async fn test_create_success_upserts() {
        let store = Arc::new(FakeStore::default());
        store.push_create(Outcome::Ok(event("new", "user-1", 9, 10)));
        let controller = controller_with(store);

        let created = controller.create_event(&draft(9, 10)).await.unwrap();
        assert_eq!(created.id, "new");
        assert_eq!(controller.event("new").await.unwrap().title, "event new");
    }

    #[tokio::test]
    async fn test_create_validation_rejected_leaves_cache() {
        let store = Arc::new(FakeStore::default());
        store.push_create(Outcome::Rejected("title too long"));
        let controller = controller_with(store);

        let err = controller.create_event(&draft(9, 10)).await.unwrap_err();
        assert!(matches!(err, SyncError::ValidationRejected(_)));
        assert_eq!(controller.event_count().await, 0);
        assert_eq!(controller.session.state(), SessionState::LoggedIn);
    }

    #[tokio::test]
    async fn test_create_unauthenticated_cascades() {
        let store = FakeStore::with_list(Outcome::Ok(vec![event("a", "user-1", 9, 10)]));
        store.push_create(Outcome::Unauthenticated);
        let controller = controller_with(store);

        controller.refresh().await.unwrap();
        let err = controller.create_event(&draft(9, 10)).await.unwrap_err();

        assert!(matches!(err, SyncError::Unauthenticated));
        assert_eq!(controller.event_count().await, 0);
        assert_eq!(controller.session.state(), SessionState::LoggedOut);
    }

    #[tokio::test]
    async fn test_delete_removes_event_and_keeps_owner_color() {
        let store = FakeStore::with_list(Outcome::Ok(vec![
            event("a", "u1", 9, 10),
            event("b", "u2", 11, 12),
        ]));
        store.push_remove(Outcome::Ok(()));
        let controller = controller_with(store);

        controller.refresh().await.unwrap();
        let color_before = controller.color_for("u1");

        controller.delete_event("a").await.unwrap();

        let ids: Vec<_> = controller.events().await.into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["b"]);
        // Visual stability across churn: u1 keeps the color it was assigned.
        assert_eq!(controller.color_for("u1"), color_before);
    }

    #[tokio::test]
    async fn test_delete_locally_absent_id_fails_without_network() {
        let store = Arc::new(FakeStore::default());
        let controller = controller_with(store);

        let err = controller.delete_event("ghost").await.unwrap_err();
        assert!(matches!(err, SyncError::NotFound));
    }

    #[tokio::test]
    async fn test_delete_remote_not_found_reconciles() {
        // Another party already deleted the event; the stale cache entry is
        // removed and the call reports success.
        let store = FakeStore::with_list(Outcome::Ok(vec![event("a", "u1", 9, 10)]));
        store.push_remove(Outcome::NotFound);
        let controller = controller_with(store);

        controller.refresh().await.unwrap();
        controller.delete_event("a").await.unwrap();
        assert_eq!(controller.event_count().await, 0);
    }

    #[tokio::test]
    async fn test_delete_transient_keeps_cache_entry() {
        let store = FakeStore::with_list(Outcome::Ok(vec![event("a", "u1", 9, 10)]));
        store.push_remove(Outcome::Transient);
        let controller = controller_with(store);

        controller.refresh().await.unwrap();
        let err = controller.delete_event("a").await.unwrap_err();

        assert!(err.is_transient());
        assert!(controller.event("a").await.is_some());
    }

    #[tokio::test]
    async fn test_create_then_refresh_round_trip() {
        let created = event("new", "user-1", 9, 10);
        let store = Arc::new(FakeStore::default());
        store.push_create(Outcome::Ok(created.clone()));
        store.push_list(ListCall::ready(Outcome::Ok(vec![created.clone()])));
        let controller = controller_with(store);

        let submitted = EventDraft {
            title: created.title.clone(),
            description: created.description.clone(),
            start: created.start,
            end: created.end,
        };
        controller.create_event(&submitted).await.unwrap();
        controller.refresh().await.unwrap();

        let cached = controller.event("new").await.unwrap();
        assert_eq!(cached.title, submitted.title);
        assert_eq!(cached.start, submitted.start);
        assert_eq!(cached.end, submitted.end);
    }

    #[tokio::test]
    async fn test_color_for_is_idempotent() {
        let store = Arc::new(FakeStore::default());
        let controller = controller_with(store);

        let first = controller.color_for("user-1");
        controller.color_for("user-2");
        assert_eq!(controller.color_for("user-1"), first);
    }
}
