//! In-memory collaborators for tests and local runs without infrastructure.
//!
//! [`InMemoryEventStore`] can be told to fail or to stall, which is how the
//! session's load-failure and teardown paths are exercised.
//! [`InMemoryFilterPersistence`] can likewise fail or hang forever.
//! [`RecordingRenderer`] keeps every call it receives.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use eventmap_types::{
    CameraTarget, Event, EventId, FilterMode, GeoPoint, NewEvent, PointPopup, RenderFrame,
};
use tokio::sync::RwLock;

use crate::external::{
    EventStore, FilterPersistence, Geocoder, PersistenceError, Renderer, StoreError,
};

// ---------------------------------------------------------------------------
// Event store
// ---------------------------------------------------------------------------

/// An event store held in memory.
#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    events: RwLock<Vec<Event>>,
    fail_loads: AtomicBool,
    load_delay_ms: AtomicU64,
    loads: AtomicU64,
}

impl InMemoryEventStore {
    /// A store pre-populated with `events`.
    pub fn with_events(events: Vec<Event>) -> Self {
        Self {
            events: RwLock::new(events),
            ..Self::default()
        }
    }

    /// Make subsequent loads fail.
    pub fn set_fail_loads(&self, fail: bool) {
        self.fail_loads.store(fail, Ordering::Relaxed);
    }

    /// Delay every load by `delay`.
    pub fn set_load_delay(&self, delay: Duration) {
        let millis = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self.load_delay_ms.store(millis, Ordering::Relaxed);
    }

    /// Number of loads started.
    pub fn loads(&self) -> u64 {
        self.loads.load(Ordering::Relaxed)
    }

    /// A copy of the stored events.
    pub async fn snapshot(&self) -> Vec<Event> {
        self.events.read().await.clone()
    }
}

impl EventStore for InMemoryEventStore {
    async fn load_all_events(&self) -> Result<Vec<Event>, StoreError> {
        self.loads.fetch_add(1, Ordering::Relaxed);
        let delay = self.load_delay_ms.load(Ordering::Relaxed);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        if self.fail_loads.load(Ordering::Relaxed) {
            return Err(StoreError::Unavailable("store offline".to_owned()));
        }
        let mut events = self.events.read().await.clone();
        // Undated events sort last.
        events.sort_by_key(|e| (e.start_time.is_none(), e.start_time));
        Ok(events)
    }

    async fn create_event(&self, event: NewEvent) -> Result<EventId, StoreError> {
        let id = EventId::new();
        self.events.write().await.push(Event {
            id,
            title: event.title,
            description: event.description,
            start_time: Some(event.start_time),
            end_time: event.end_time,
            address: event.address,
            lat: event.lat,
            lng: event.lng,
        });
        Ok(id)
    }
}

// ---------------------------------------------------------------------------
// Filter persistence
// ---------------------------------------------------------------------------

/// Saved filter mode held in memory.
#[derive(Debug, Default)]
pub struct InMemoryFilterPersistence {
    saved: RwLock<Option<FilterMode>>,
    fail: AtomicBool,
    stall: AtomicBool,
    saves: AtomicU64,
}

impl InMemoryFilterPersistence {
    /// Persistence that already holds `mode`.
    pub fn with_mode(mode: FilterMode) -> Self {
        Self {
            saved: RwLock::new(Some(mode)),
            ..Self::default()
        }
    }

    /// Make every call fail.
    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::Relaxed);
    }

    /// Make every call hang without ever completing.
    pub fn set_stall(&self, stall: bool) {
        self.stall.store(stall, Ordering::Relaxed);
    }

    async fn stalled(&self) {
        if self.stall.load(Ordering::Relaxed) {
            std::future::pending::<()>().await;
        }
    }

    /// Number of successful saves.
    pub fn saves(&self) -> u64 {
        self.saves.load(Ordering::Relaxed)
    }

    /// The saved mode.
    pub async fn saved(&self) -> Option<FilterMode> {
        *self.saved.read().await
    }
}

impl FilterPersistence for InMemoryFilterPersistence {
    async fn load_saved_mode(&self) -> Result<Option<FilterMode>, PersistenceError> {
        self.stalled().await;
        if self.fail.load(Ordering::Relaxed) {
            return Err(PersistenceError::Unavailable("storage offline".to_owned()));
        }
        Ok(*self.saved.read().await)
    }

    async fn save_mode(&self, mode: FilterMode) -> Result<(), PersistenceError> {
        self.stalled().await;
        if self.fail.load(Ordering::Relaxed) {
            return Err(PersistenceError::Unavailable("storage offline".to_owned()));
        }
        *self.saved.write().await = Some(mode);
        self.saves.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Geocoder
// ---------------------------------------------------------------------------

/// A geocoder that answers every lookup with the same address.
#[derive(Debug, Clone, Default)]
pub struct StaticGeocoder {
    /// The address returned for every point.
    pub address: Option<String>,
}

impl Geocoder for StaticGeocoder {
    async fn lookup_address(&self, _point: GeoPoint) -> Option<String> {
        self.address.clone()
    }
}

// ---------------------------------------------------------------------------
// Renderer
// ---------------------------------------------------------------------------

/// One call received by a [`RecordingRenderer`].
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCall {
    /// A frame was rendered.
    Frame(RenderFrame),
    /// A popup was shown.
    Popup(PointPopup),
    /// The camera was moved.
    Navigate(CameraTarget),
}

/// A renderer that keeps every call.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    calls: Mutex<Vec<RenderCall>>,
}

impl RecordingRenderer {
    /// Every call so far, oldest first.
    pub fn calls(&self) -> Vec<RenderCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Number of calls so far.
    pub fn len(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or_default()
    }

    /// Whether no call has been received.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every rendered frame, oldest first.
    pub fn frames(&self) -> Vec<RenderFrame> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                RenderCall::Frame(frame) => Some(frame),
                RenderCall::Popup(_) | RenderCall::Navigate(_) => None,
            })
            .collect()
    }

    /// The most recent frame.
    pub fn last_frame(&self) -> Option<RenderFrame> {
        self.frames().pop()
    }

    fn push(&self, call: RenderCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

impl Renderer for RecordingRenderer {
    fn render(&self, frame: &RenderFrame) {
        self.push(RenderCall::Frame(frame.clone()));
    }

    fn show_popup(&self, popup: &PointPopup) {
        self.push(RenderCall::Popup(popup.clone()));
    }

    fn navigate(&self, target: &CameraTarget) {
        self.push(RenderCall::Navigate(*target));
    }
}
