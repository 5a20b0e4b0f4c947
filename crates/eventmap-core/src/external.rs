//! Collaborator interfaces consumed by the map session.
//!
//! The engine core never talks to a database, a key-value store, a geocoding
//! service, or a drawing surface directly. It goes through these traits, and
//! the workspace supplies adapters (`eventmap-db`, `eventmap-observer`,
//! `eventmap-engine`). In-memory implementations live in [`crate::memory`].

use std::future::Future;

use eventmap_types::{CameraTarget, Event, EventId, FilterMode, GeoPoint, NewEvent, PointPopup, RenderFrame};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failure talking to the backing event store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The store could not be reached.
    #[error("event store unavailable: {0}")]
    Unavailable(String),

    /// A query or insert failed.
    #[error("event store query failed: {0}")]
    Query(String),
}

/// Failure reading or writing the saved filter mode.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PersistenceError {
    /// The key-value store could not be reached.
    #[error("filter persistence unavailable: {0}")]
    Unavailable(String),

    /// The stored value is not a known filter mode.
    #[error("stored filter mode is not recognised: {0}")]
    Corrupt(String),
}

/// A submitted event that cannot be stored.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// The title is empty or whitespace.
    #[error("title must not be empty")]
    EmptyTitle,

    /// The picked coordinate is outside WGS84 bounds or not finite.
    #[error("invalid coordinates: lat {lat}, lng {lng}")]
    InvalidCoordinates {
        /// Submitted latitude.
        lat: f64,
        /// Submitted longitude.
        lng: f64,
    },

    /// The end instant precedes the start instant.
    #[error("end time precedes start time")]
    EndBeforeStart,
}

/// Check a submitted event before it is handed to the store.
///
/// # Errors
///
/// Returns the first [`ValidationError`] found.
pub fn validate_new_event(event: &NewEvent) -> Result<(), ValidationError> {
    if event.title.trim().is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    if !event.position().is_valid() {
        return Err(ValidationError::InvalidCoordinates {
            lat: event.lat,
            lng: event.lng,
        });
    }
    if event.end_time.is_some_and(|end| end < event.start_time) {
        return Err(ValidationError::EndBeforeStart);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// The backing store of events.
pub trait EventStore: Send + Sync + 'static {
    /// Every stored event, ascending by start instant with undated events
    /// last.
    fn load_all_events(&self) -> impl Future<Output = Result<Vec<Event>, StoreError>> + Send;

    /// Insert a new event and return its id.
    fn create_event(
        &self,
        event: NewEvent,
    ) -> impl Future<Output = Result<EventId, StoreError>> + Send;
}

/// Where the chosen filter mode survives restarts.
pub trait FilterPersistence: Send + Sync + 'static {
    /// The saved mode, or `None` when nothing was saved.
    fn load_saved_mode(
        &self,
    ) -> impl Future<Output = Result<Option<FilterMode>, PersistenceError>> + Send;

    /// Save the current mode.
    fn save_mode(&self, mode: FilterMode)
    -> impl Future<Output = Result<(), PersistenceError>> + Send;
}

/// Best-effort reverse geocoding.
pub trait Geocoder: Send + Sync + 'static {
    /// A human-readable address for `point`, or `None` when unavailable.
    fn lookup_address(&self, point: GeoPoint) -> impl Future<Output = Option<String>> + Send;
}

/// The drawing surface.
///
/// Calls are fire-and-forget; a renderer must not block.
pub trait Renderer: Send + Sync + 'static {
    /// Draw a full frame.
    fn render(&self, frame: &RenderFrame);

    /// Show a transient popup for a clicked point.
    fn show_popup(&self, popup: &PointPopup);

    /// Animate the camera.
    fn navigate(&self, target: &CameraTarget);
}
