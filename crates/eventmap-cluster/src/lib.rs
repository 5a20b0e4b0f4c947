//! Zoom-aware point clustering for the Event Map engine.
//!
//! Given a set of geo-located items, [`ClusterIndex`] partitions them at
//! every integer zoom level into clusters and standalone points, then answers
//! which units to draw at a zoom, how far to zoom to split a cluster, and
//! which items a cluster holds.
//!
//! # Modules
//!
//! - [`index`] -- The hierarchical index and its query operations
//! - [`projection`] -- Web-Mercator projection used for distances
//! - [`error`] -- Error types

pub mod error;
pub mod index;
pub mod projection;

pub use error::ClusterError;
pub use index::{
    ClusterIndex, ClusterOptions, ClusterQuery, DEFAULT_EXTENT, DEFAULT_MAX_CLUSTER_ZOOM,
    DEFAULT_MIN_ZOOM, DEFAULT_RADIUS, Locatable,
};
