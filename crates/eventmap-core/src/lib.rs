//! Interaction-state engine for the Event Map.
//!
//! Keeps the filter, the selection, the cluster layer, and the list panel
//! mutually consistent as events load and the user interacts with the map.
//!
//! # Modules
//!
//! - [`filter`] -- Date-relative filter predicates and badge counts
//! - [`selection`] -- Highlighted event and its pulse timer
//! - [`coordinator`] -- The synchronous view state machine
//! - [`session`] -- The async task driving a coordinator from user commands
//! - [`external`] -- Store, persistence, geocoder, and renderer interfaces
//! - [`memory`] -- In-memory implementations of those interfaces
//! - [`clock`] -- Wall-clock source for date filters
//! - [`config`] -- YAML configuration

pub mod clock;
pub mod config;
pub mod coordinator;
pub mod external;
pub mod filter;
pub mod memory;
pub mod selection;
pub mod session;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{ConfigError, EventMapConfig};
pub use coordinator::{CoordinatorSettings, ViewCoordinator, ViewInputs, ViewOutputs, recompute};
pub use external::{
    EventStore, FilterPersistence, Geocoder, PersistenceError, Renderer, StoreError,
    ValidationError, validate_new_event,
};
pub use selection::{PulseSettings, SelectionController};
pub use session::{CreateError, MapSession, PERSISTENCE_TIMEOUT, SessionHandle, ViewCommand};
