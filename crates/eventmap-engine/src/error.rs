//! Error types for the engine binary.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes during startup and shutdown.

/// Top-level error for the engine binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: eventmap_core::ConfigError,
    },

    /// The clustering options were rejected.
    #[error("cluster error: {source}")]
    Cluster {
        /// The underlying cluster error.
        #[from]
        source: eventmap_cluster::ClusterError,
    },

    /// `PostgreSQL` or `Dragonfly` could not be reached or migrated.
    #[error("database error: {source}")]
    Database {
        /// The underlying data layer error.
        #[from]
        source: eventmap_db::DbError,
    },

    /// The geocoding client could not be built.
    #[error("geocoder error: {message}")]
    Geocoder {
        /// Description of the geocoder failure.
        message: String,
    },

    /// The map API server failed to start or crashed.
    #[error("observer error: {message}")]
    Observer {
        /// Description of the observer failure.
        message: String,
    },
}
