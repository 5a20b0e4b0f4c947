//! Shared type definitions for the Event Map engine.
//!
//! This crate is the single source of truth for the data model shared by the
//! clustering index, the interaction core, the storage adapters, and the
//! render bridge. Types flow to `TypeScript` via `ts-rs` for the map client.
//!
//! # Modules
//!
//! - [`ids`] -- Event identifiers (UUID) and packed cluster identifiers
//! - [`enums`] -- Filter modes and sheet presentation states
//! - [`structs`] -- Events, coordinates, and cluster query output
//! - [`render`] -- Render frames and one-shot renderer instructions

pub mod enums;
pub mod ids;
pub mod render;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{FilterMode, SheetState, UnknownFilterMode};
pub use ids::{ClusterId, EventId};
pub use render::{
    CameraTarget, DEFAULT_SHEET_TITLE, FilterCounts, PointPopup, RenderFrame, SheetSource,
    SheetView, ViewMessage,
};
pub use structs::{
    BoundingBox, ClusterQueryResult, ClusterSummary, Event, GeoPoint, NewEvent, PointFeature,
};
