//! Enumeration types for the Event Map engine.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Filter mode
// ---------------------------------------------------------------------------

/// Which events are "in view" for the map and the default list.
///
/// Persisted across sessions under its lowercase name (`all`, `today`,
/// `weekend`). A missing or unparseable saved value falls back to
/// [`FilterMode::All`].
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum FilterMode {
    /// Every event, including events without a start instant.
    #[default]
    All,
    /// Events starting on the viewer's current local calendar day.
    Today,
    /// Events starting on the upcoming (or current) Saturday or Sunday.
    Weekend,
}

impl FilterMode {
    /// All modes in badge display order.
    pub const ALL_MODES: [Self; 3] = [Self::All, Self::Today, Self::Weekend];

    /// The persisted lowercase name of this mode.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Today => "today",
            Self::Weekend => "weekend",
        }
    }

    /// Text shown in the list when no event matches this mode.
    pub const fn empty_label(self) -> &'static str {
        match self {
            Self::All => "No events yet",
            Self::Today => "No events today",
            Self::Weekend => "No events this weekend",
        }
    }
}

impl core::fmt::Display for FilterMode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not a known [`FilterMode`] name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownFilterMode(pub String);

impl core::fmt::Display for UnknownFilterMode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "unknown filter mode: {:?}", self.0)
    }
}

impl std::error::Error for UnknownFilterMode {}

impl core::str::FromStr for FilterMode {
    type Err = UnknownFilterMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "today" => Ok(Self::Today),
            "weekend" => Ok(Self::Weekend),
            other => Err(UnknownFilterMode(other.to_owned())),
        }
    }
}

// ---------------------------------------------------------------------------
// Sheet state
// ---------------------------------------------------------------------------

/// Presentation state of the secondary list panel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum SheetState {
    /// The sheet is hidden.
    #[default]
    Closed,
    /// The sheet shows a short strip of the list.
    Peek,
    /// The sheet is expanded to full height.
    Full,
}

impl SheetState {
    /// Whether the sheet is visible at all.
    pub const fn is_open(self) -> bool {
        !matches!(self, Self::Closed)
    }

    /// The opposite expanded state. A closed sheet stays closed.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Closed => Self::Closed,
            Self::Peek => Self::Full,
            Self::Full => Self::Peek,
        }
    }
}
