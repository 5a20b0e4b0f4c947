//! Error types for the `eventmap-cluster` crate.

use eventmap_types::ClusterId;

/// Errors that can occur when building or querying a cluster index.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClusterError {
    /// The cluster id does not name a cluster in this index build.
    ///
    /// Usually a stale id kept across a rebuild.
    #[error("cluster not found: {0}")]
    NotFound(ClusterId),

    /// The clustering options are unusable.
    #[error("invalid cluster options: {reason}")]
    InvalidOptions {
        /// Explanation of what is wrong with the options.
        reason: String,
    },
}
