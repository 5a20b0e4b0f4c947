//! Core entity structs: events, coordinates, and cluster summaries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::{ClusterId, EventId};

// ---------------------------------------------------------------------------
// Coordinates
// ---------------------------------------------------------------------------

/// A WGS84 coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GeoPoint {
    /// Latitude in degrees, positive north.
    pub lat: f64,
    /// Longitude in degrees, positive east.
    pub lng: f64,
}

impl GeoPoint {
    /// Create a coordinate from latitude and longitude.
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Whether both components are finite and within WGS84 bounds.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

/// A viewport rectangle in degrees.
///
/// When `west > east` the box crosses the antimeridian.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct BoundingBox {
    /// Western edge longitude.
    pub west: f64,
    /// Southern edge latitude.
    pub south: f64,
    /// Eastern edge longitude.
    pub east: f64,
    /// Northern edge latitude.
    pub north: f64,
}

impl BoundingBox {
    /// Whether `point` lies inside the box (edges inclusive).
    pub fn contains(&self, point: GeoPoint) -> bool {
        if point.lat < self.south || point.lat > self.north {
            return false;
        }
        if self.west <= self.east {
            point.lng >= self.west && point.lng <= self.east
        } else {
            point.lng >= self.west || point.lng <= self.east
        }
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// A geo-located event as stored in the backing store.
///
/// Immutable from the engine's point of view: views are re-derived over
/// collections of events, never by editing one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Event {
    /// Stable unique identifier.
    pub id: EventId,
    /// Display title.
    pub title: String,
    /// Optional free-form description.
    pub description: Option<String>,
    /// When the event starts. Events without a start only match the `all`
    /// filter.
    pub start_time: Option<DateTime<Utc>>,
    /// When the event ends, if known.
    pub end_time: Option<DateTime<Utc>>,
    /// Human-readable address, usually reverse-geocoded at creation.
    pub address: Option<String>,
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

impl Event {
    /// The event's coordinate.
    pub const fn position(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lng)
    }
}

/// Fields submitted when creating a new event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct NewEvent {
    /// Display title (must not be blank).
    pub title: String,
    /// Optional free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Start instant.
    pub start_time: DateTime<Utc>,
    /// End instant; must not precede the start.
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    /// Address; filled by reverse geocoding when absent.
    #[serde(default)]
    pub address: Option<String>,
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

impl NewEvent {
    /// The picked coordinate.
    pub const fn position(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lng)
    }
}

// ---------------------------------------------------------------------------
// Cluster query output
// ---------------------------------------------------------------------------

/// A cluster of two or more events at one zoom level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ClusterSummary {
    /// Identifier valid for the current index build.
    pub id: ClusterId,
    /// Weighted mean position of the members.
    pub position: GeoPoint,
    /// Number of member events (always at least 2).
    pub count: u32,
}

/// A standalone event drawn as a bare point.
///
/// Carries the properties the renderer needs for the point layer and its
/// popup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PointFeature {
    /// The event's identifier.
    pub id: EventId,
    /// The event's coordinate.
    pub position: GeoPoint,
    /// Display title.
    pub title: String,
    /// Start instant, if any.
    pub start_time: Option<DateTime<Utc>>,
    /// Address, if any.
    pub address: Option<String>,
}

impl From<&Event> for PointFeature {
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

/// The drawable units for one zoom level.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ClusterQueryResult {
    /// Clusters of two or more events.
    pub clusters: Vec<ClusterSummary>,
    /// Events drawn individually.
    pub singles: Vec<PointFeature>,
}

impl ClusterQueryResult {
    /// Total number of events represented by the result.
    pub fn event_count(&self) -> usize {
        let clustered: usize = self
            .clusters
            .iter()
            .map(|c| usize::try_from(c.count).unwrap_or(usize::MAX))
            .fold(0, usize::saturating_add);
        clustered.saturating_add(self.singles.len())
    }

    /// Whether the given event is drawn as a standalone point.
    pub fn has_single(&self, id: EventId) -> bool {
        self.singles.iter().any(|p| p.id == id)
    }
}
