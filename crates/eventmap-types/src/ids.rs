//! Type-safe identifier wrappers.
//!
//! Event identifiers wrap a [`Uuid`] (v7, time-ordered, generated by the
//! store on insert). Cluster identifiers are synthetic: they pack the zoom
//! level and the cluster's position within that level into a single `u64`,
//! so they are stable for one index build but meaningless across rebuilds.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Number of low bits reserved for the zoom level inside a [`ClusterId`].
const ZOOM_BITS: u32 = 5;

/// Mask selecting the zoom level bits of a [`ClusterId`].
const ZOOM_MASK: u64 = (1 << ZOOM_BITS) - 1;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new identifier using UUID v7 (time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl core::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for an event record.
    EventId
}

/// Identifier of a cluster produced by one build of the cluster index.
///
/// Layout: `(index << 5) | zoom`. The zoom level occupies the low five bits
/// (levels 0 through 31), the remaining bits hold the cluster's position in
/// that level's node list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ClusterId(pub u64);

impl ClusterId {
    /// Largest zoom level representable in a cluster id.
    pub const MAX_ZOOM: u8 = 31;

    /// Pack a zoom level and a node index into a cluster id.
    ///
    /// Returns `None` if the zoom exceeds [`Self::MAX_ZOOM`] or the index
    /// does not fit in the remaining bits.
    pub fn from_parts(zoom: u8, index: usize) -> Option<Self> {
        if zoom > Self::MAX_ZOOM {
            return None;
        }
        let index = u64::try_from(index).ok()?;
        let shifted = index.checked_shl(ZOOM_BITS)?;
        if shifted >> ZOOM_BITS != index {
            return None;
        }
        Some(Self(shifted | u64::from(zoom)))
    }

    /// Zoom level the cluster was produced at.
    pub fn zoom(self) -> u8 {
        u8::try_from(self.0 & ZOOM_MASK).unwrap_or(Self::MAX_ZOOM)
    }

    /// Position of the cluster within its level.
    pub fn index(self) -> usize {
        usize::try_from(self.0 >> ZOOM_BITS).unwrap_or(usize::MAX)
    }
}

impl core::fmt::Display for ClusterId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ClusterId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_ids_are_unique() {
        let a = EventId::new();
        let b = EventId::new();
        assert_ne!(a, b);
        assert_ne!(a.into_inner(), Uuid::nil());
    }

    #[test]
    fn event_id_parses_from_display() {
        let id = EventId::new();
        let parsed: Result<EventId, _> = id.to_string().parse();
        assert_eq!(parsed.ok(), Some(id));
    }

    #[test]
    fn event_id_serializes_as_bare_uuid() {
        let id = EventId::new();
        let json = serde_json::to_string(&id).unwrap_or_default();
        assert_eq!(json, format!("\"{}\"", id.0));
    }

    #[test]
    fn cluster_id_packs_zoom_and_index() {
        let id = ClusterId::from_parts(12, 345);
        assert!(id.is_some());
        let id = id.unwrap_or(ClusterId(0));
        assert_eq!(id.zoom(), 12);
        assert_eq!(id.index(), 345);
    }

    #[test]
    fn cluster_id_rejects_out_of_range_zoom() {
        assert!(ClusterId::from_parts(32, 0).is_none());
    }

    #[test]
    fn cluster_ids_differ_across_levels() {
        let a = ClusterId::from_parts(3, 7);
        let b = ClusterId::from_parts(4, 7);
        assert_ne!(a, b);
    }
}
