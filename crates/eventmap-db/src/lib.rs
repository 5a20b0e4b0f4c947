//! Data layer for the Event Map engine.
//!
//! - [`postgres`] -- `PostgreSQL` connection pool and migrations
//! - [`event_store`] -- [`PgEventStore`], the durable [`EventStore`](eventmap_core::EventStore)
//! - [`dragonfly`] -- `Dragonfly` client and [`DragonflyFilterStore`], which
//!   keeps the chosen filter mode across restarts
//! - [`error`] -- [`DbError`] and its mapping onto the core error types

pub mod dragonfly;
pub mod error;
pub mod event_store;
pub mod postgres;

pub use dragonfly::{DragonflyFilterStore, DragonflyPool, FILTER_KEY};
pub use error::DbError;
pub use event_store::PgEventStore;
pub use postgres::{PostgresConfig, PostgresPool};
