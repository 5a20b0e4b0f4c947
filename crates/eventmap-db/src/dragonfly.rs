//! `Dragonfly` (Redis-compatible) key-value operations.
//!
//! Only one key is used: the chosen filter mode, stored as its wire string.
//!
//! | Key | Type | Description |
//! |-----|------|-------------|
//! | `turku_events_filter` | String | `all`, `today`, or `weekend` |

use eventmap_core::{FilterPersistence, PersistenceError};
use eventmap_types::{FilterMode, UnknownFilterMode};
use fred::prelude::*;

use crate::error::DbError;

/// Key under which the filter mode is saved.
pub const FILTER_KEY: &str = "turku_events_filter";

/// Connection handle to a `Dragonfly` instance.
#[derive(Clone)]
pub struct DragonflyPool {
    client: Client,
}

impl std::fmt::Debug for DragonflyPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DragonflyPool").finish_non_exhaustive()
    }
}

impl DragonflyPool {
    /// Connect to `Dragonfly` at the given URL.
    ///
    /// The URL should follow the Redis URL scheme:
    /// `redis://host:port` or `redis://host:port/db`
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Config`] if the URL cannot be parsed.
    /// Returns [`DbError::Dragonfly`] if the connection fails.
    pub async fn connect(url: &str) -> Result<Self, DbError> {
        let config = Config::from_url(url)
            .map_err(|e| DbError::Config(format!("Invalid Dragonfly URL: {e}")))?;

        let client = Builder::from_config(config).build()?;
        client.init().await?;

        tracing::info!("Connected to Dragonfly");
        Ok(Self { client })
    }

    /// Store a string at `key`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Dragonfly`] if the write fails.
    pub async fn set_string(&self, key: &str, value: &str) -> Result<(), DbError> {
        let _: () = self.client.set(key, value, None, None, false).await?;
        Ok(())
    }

    /// Read the string at `key`, or `None` when unset.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Dragonfly`] if the read fails.
    pub async fn get_string(&self, key: &str) -> Result<Option<String>, DbError> {
        let value: Option<String> = self.client.get(key).await?;
        Ok(value)
    }

    /// Delete a key.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Dragonfly`] if the delete fails.
    pub async fn delete(&self, key: &str) -> Result<(), DbError> {
        let _: u32 = self.client.del(key).await?;
        Ok(())
    }

    /// Close the connection.
    pub async fn close(&self) {
        if let Err(e) = self.client.quit().await {
            tracing::warn!(error = %e, "Dragonfly quit failed");
        }
        tracing::info!("Dragonfly connection closed");
    }
}

/// Saves the filter mode in `Dragonfly`.
#[derive(Debug, Clone)]
pub struct DragonflyFilterStore {
    pool: DragonflyPool,
    key: String,
}

impl DragonflyFilterStore {
    /// Persist under the default [`FILTER_KEY`].
    pub fn new(pool: DragonflyPool) -> Self {
        Self::with_key(pool, FILTER_KEY)
    }

    /// Persist under a custom key.
    pub fn with_key(pool: DragonflyPool, key: &str) -> Self {
        Self {
            pool,
            key: key.to_owned(),
        }
    }

    /// The key in use.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Forget the saved mode.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Dragonfly`] if the delete fails.
    pub async fn clear(&self) -> Result<(), DbError> {
        self.pool.delete(&self.key).await
    }
}

/// Parse a stored value. Unknown strings are reported as corrupt.
fn parse_mode(raw: &str) -> Result<FilterMode, PersistenceError> {
    raw.parse()
        .map_err(|e: UnknownFilterMode| PersistenceError::Corrupt(e.0))
}

impl FilterPersistence for DragonflyFilterStore {
    async fn load_saved_mode(&self) -> Result<Option<FilterMode>, PersistenceError> {
        let raw = self.pool.get_string(&self.key).await?;
        raw.as_deref().map(parse_mode).transpose()
    }

    async fn save_mode(&self, mode: FilterMode) -> Result<(), PersistenceError> {
        self.pool.set_string(&self.key, mode.as_str()).await?;
        tracing::debug!(key = %self.key, mode = %mode, "Saved filter mode");
        Ok(())
    }
}
