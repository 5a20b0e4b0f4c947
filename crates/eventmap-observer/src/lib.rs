//! Map API server for the Event Map engine.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **`WebSocket` endpoint** (`/ws/view`) streaming render frames, popups,
//!   and camera moves via [`tokio::sync::broadcast`]
//! - **REST endpoints** that forward map interactions (filter, camera,
//!   cluster / point / row clicks, list panel) to the map session
//! - **Event submission** with best-effort reverse geocoding through
//!   [`MapboxGeocoder`]
//! - **Minimal HTML status page** (`GET /`)
//!
//! # Architecture
//!
//! The server owns no view state. Handlers send
//! [`ViewCommand`](eventmap_core::ViewCommand)s to the session over an
//! `mpsc` channel and read the latest frame from the [`ViewFeed`], which
//! the engine's renderer fills.

pub mod error;
pub mod geocode;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;
pub mod ws;

pub use error::ObserverError;
pub use geocode::MapboxGeocoder;
pub use router::build_router;
pub use server::{ServerConfig, ServerError, start_server};
pub use state::{AppState, ViewFeed};
