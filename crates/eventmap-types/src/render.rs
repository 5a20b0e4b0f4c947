//! Render instructions emitted by the engine after every recompute.
//!
//! The engine never touches drawing primitives. It hands the renderer a
//! [`RenderFrame`] describing what to draw and what the list shows, plus
//! occasional one-shot instructions ([`PointPopup`], [`CameraTarget`]).
//! [`ViewMessage`] is the tagged envelope used on the wire.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{FilterMode, SheetState};
use crate::ids::{ClusterId, EventId};
use crate::structs::{ClusterQueryResult, Event, GeoPoint};

/// Title of the default list showing everything under the current filter.
pub const DEFAULT_SHEET_TITLE: &str = "Upcoming events";

/// Per-mode event counts shown on the filter badges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct FilterCounts {
    /// Number of events matching [`FilterMode::All`].
    pub all: u32,
    /// Number of events matching [`FilterMode::Today`].
    pub today: u32,
    /// Number of events matching [`FilterMode::Weekend`].
    pub weekend: u32,
}

impl FilterCounts {
    /// The count for one mode.
    pub const fn get(&self, mode: FilterMode) -> u32 {
        match mode {
            FilterMode::All => self.all,
            FilterMode::Today => self.today,
            FilterMode::Weekend => self.weekend,
        }
    }
}

/// What the sheet's list was opened from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum SheetSource {
    /// The default list of every event under the current filter. Follows
    /// filter and event changes.
    #[default]
    CurrentFilter,
    /// A cluster drill-down. Pinned until the user opens another list.
    Cluster {
        /// The cluster that was opened.
        cluster_id: ClusterId,
        /// Member count at the time it was opened.
        count: u32,
    },
}

impl SheetSource {
    /// Whether the list is pinned against filter-driven replacement.
    pub const fn is_pinned(&self) -> bool {
        matches!(self, Self::Cluster { .. })
    }
}

/// Contents and presentation state of the list panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SheetView {
    /// Closed, peeking, or fully expanded.
    pub state: SheetState,
    /// Heading shown above the list.
    pub title: String,
    /// Where the list came from.
    pub source: SheetSource,
    /// Events in display order.
    pub events: Vec<Arc<Event>>,
}

impl Default for SheetView {
    fn default() -> Self {
        Self {
            state: SheetState::Closed,
            title: DEFAULT_SHEET_TITLE.to_owned(),
            source: SheetSource::CurrentFilter,
            events: Vec::new(),
        }
    }
}

impl SheetView {
    /// Whether the list contains the given event.
    pub fn contains(&self, id: EventId) -> bool {
        self.events.iter().any(|e| e.id == id)
    }
}

/// Everything the renderer needs to draw the current state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct RenderFrame {
    /// Monotonic frame counter within one session.
    pub generation: u64,
    /// Whether the initial event load is still in flight.
    pub loading: bool,
    /// Active filter mode.
    pub filter: FilterMode,
    /// Badge counts for every mode.
    pub counts: FilterCounts,
    /// Text for an empty list under the active filter.
    pub empty_label: String,
    /// Where the map opens. Constant for a session; the renderer applies it
    /// once, before the first camera report.
    pub home: CameraTarget,
    /// Zoom level the units were queried at.
    pub zoom: f64,
    /// Clusters and standalone points to draw.
    pub units: ClusterQueryResult,
    /// Highlighted event, if any.
    pub selected: Option<EventId>,
    /// Whether the highlighted event is drawn as a standalone point.
    pub selection_visible: bool,
    /// Current pulse ring magnitude, present while the pulse runs.
    pub pulse: Option<f64>,
    /// List panel contents.
    pub sheet: SheetView,
}

/// Transient popup details for a clicked point. Not retained by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PointPopup {
    /// The clicked event.
    pub id: EventId,
    /// Where to anchor the popup.
    pub position: GeoPoint,
    /// Display title.
    pub title: String,
    /// Start instant, if any.
    pub start_time: Option<DateTime<Utc>>,
    /// Address, if any.
    pub address: Option<String>,
}

impl From<&Event> for PointPopup {
    fn from(event: &Event) -> Self {
        Self {
            id: event.id,
            position: event.position(),
            title: event.title.clone(),
            start_time: event.start_time,
            address: event.address.clone(),
        }
    }
}

/// A suggested camera move ("zoom to reveal", "fly to event").
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CameraTarget {
    /// Point to centre on.
    pub center: GeoPoint,
    /// Zoom level to move to.
    pub zoom: f64,
}

/// Wire envelope for renderer instructions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ViewMessage {
    /// A full render frame.
    Frame(Arc<RenderFrame>),
    /// Show a popup for a clicked point.
    Popup(PointPopup),
    /// Animate the camera to a target.
    Navigate(CameraTarget),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_sheet_is_closed_filter_list() {
        let sheet = SheetView::default();
        assert_eq!(sheet.state, SheetState::Closed);
        assert_eq!(sheet.title, DEFAULT_SHEET_TITLE);
        assert!(!sheet.source.is_pinned());
    }

    #[test]
    fn cluster_source_is_pinned() {
        let source = SheetSource::Cluster {
            cluster_id: ClusterId(33),
            count: 4,
        };
        assert!(source.is_pinned());
    }

    #[test]
    fn counts_lookup_by_mode() {
        let counts = FilterCounts {
            all: 5,
            today: 2,
            weekend: 1,
        };
        assert_eq!(counts.get(FilterMode::All), 5);
        assert_eq!(counts.get(FilterMode::Today), 2);
        assert_eq!(counts.get(FilterMode::Weekend), 1);
    }

    #[test]
    fn view_message_is_tagged() {
        let msg = ViewMessage::Navigate(CameraTarget {
            center: GeoPoint::new(60.45, 22.27),
            zoom: 14.0,
        });
        let json = serde_json::to_value(&msg).unwrap_or_default();
        assert_eq!(json["type"], "navigate");
        assert_eq!(json["payload"]["zoom"], 14.0);
    }
}
