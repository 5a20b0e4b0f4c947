//! The view coordinator: filter, clustering, selection, and the list panel
//! kept consistent in one synchronous state machine.
//!
//! # Derivation
//!
//! ```text
//! events ──filter(mode, now)──▶ filtered ──build──▶ index ──query(zoom)──▶ units
//!                                   │                                       │
//!                                   └──────────▶ default list    selection visibility
//! ```
//!
//! [`recompute`] derives every output from scratch. The coordinator caches
//! the filtered set and the index so that camera moves only re-query, and its
//! incremental results must always equal what `recompute` would produce from
//! the same inputs.
//!
//! # The list panel
//!
//! The sheet shows either the default list of every event under the current
//! filter, which follows filter and event changes, or a cluster drill-down,
//! which stays pinned until another list is opened. Opening a list that does
//! not contain the highlighted event clears the highlight.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::DateTime;
use chrono_tz::Tz;
use eventmap_cluster::{ClusterError, ClusterIndex, ClusterOptions, ClusterQuery};
use eventmap_types::{
    BoundingBox, CameraTarget, ClusterId, ClusterQueryResult, DEFAULT_SHEET_TITLE, Event, EventId,
    FilterCounts, FilterMode, GeoPoint, PointFeature, PointPopup, RenderFrame, SheetSource,
    SheetState, SheetView,
};
use tracing::{debug, error};

use crate::clock::Clock;
use crate::filter;
use crate::selection::{PulseSettings, SelectionController};

/// Tuning for the coordinator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinatorSettings {
    /// Clustering parameters.
    pub cluster: ClusterOptions,
    /// Maximum number of members listed when a cluster is opened.
    pub leaf_limit: usize,
    /// Where the map opens.
    pub center: GeoPoint,
    /// Minimum zoom when flying to an event picked from the list.
    pub focus_zoom: f64,
    /// Zoom before the first camera report.
    pub initial_zoom: f64,
    /// Selection pulse parameters.
    pub pulse: PulseSettings,
}

impl Default for CoordinatorSettings {
    fn default() -> Self {
        Self {
            cluster: ClusterOptions::default(),
            leaf_limit: 100,
            center: GeoPoint::new(60.4518, 22.2666),
            focus_zoom: 14.0,
            initial_zoom: 12.0,
            pulse: PulseSettings::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Pure recompute
// ---------------------------------------------------------------------------

/// Everything the derived view depends on.
#[derive(Debug, Clone)]
pub struct ViewInputs<'a> {
    /// All loaded events in display order.
    pub events: &'a [Arc<Event>],
    /// Active filter.
    pub filter: FilterMode,
    /// Reference instant for date filters.
    pub now: DateTime<Tz>,
    /// Camera zoom.
    pub zoom: f64,
    /// Camera viewport, if reported.
    pub viewport: Option<BoundingBox>,
    /// Highlighted event.
    pub selected: Option<EventId>,
    /// Clustering parameters.
    pub options: ClusterOptions,
}

/// The view derived from [`ViewInputs`].
#[derive(Debug, Clone, PartialEq)]
pub struct ViewOutputs {
    /// Events passing the filter, in display order.
    pub filtered: Vec<Arc<Event>>,
    /// Badge counts for every mode.
    pub counts: FilterCounts,
    /// Units to draw at the zoom.
    pub units: ClusterQueryResult,
    /// Whether the highlighted event is drawn as a standalone point.
    pub selection_visible: bool,
}

/// Derive the whole view from scratch.
///
/// # Errors
///
/// Returns [`ClusterError::InvalidOptions`] if the clustering options are
/// unusable.
pub fn recompute(inputs: &ViewInputs<'_>) -> Result<ViewOutputs, ClusterError> {
    let filtered = filter::apply(inputs.filter, &inputs.now, inputs.events);
    let counts = filter::counts(&inputs.now, inputs.events);
    let index = ClusterIndex::build(filtered.iter().cloned(), inputs.options)?;
    let units = to_result(&index.query(inputs.zoom, inputs.viewport.as_ref()));
    let selection_visible = inputs.selected.is_some_and(|id| units.has_single(id));
    Ok(ViewOutputs {
        filtered,
        counts,
        units,
        selection_visible,
    })
}

fn to_result(query: &ClusterQuery<'_, Arc<Event>>) -> ClusterQueryResult {
    ClusterQueryResult {
        clusters: query.clusters.clone(),
        singles: query
            .singles
            .iter()
            .map(|event| PointFeature::from(event.as_ref()))
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Coordinator
// ---------------------------------------------------------------------------

/// Owns the view state and keeps it consistent across inputs.
pub struct ViewCoordinator {
    settings: CoordinatorSettings,
    clock: Arc<dyn Clock>,
    events: Vec<Arc<Event>>,
    by_id: BTreeMap<EventId, Arc<Event>>,
    filter: FilterMode,
    zoom: f64,
    viewport: Option<BoundingBox>,
    loading: bool,
    filtered: Vec<Arc<Event>>,
    counts: FilterCounts,
    index: ClusterIndex<Arc<Event>>,
    units: ClusterQueryResult,
    selection: SelectionController,
    sheet: SheetView,
    builds: u64,
    generation: u64,
}

impl std::fmt::Debug for ViewCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewCoordinator")
            .field("events", &self.events.len())
            .field("filtered", &self.filtered.len())
            .field("filter", &self.filter)
            .field("zoom", &self.zoom)
            .field("selected", &self.selection.selected())
            .field("sheet", &self.sheet.state)
            .field("builds", &self.builds)
            .finish_non_exhaustive()
    }
}

impl ViewCoordinator {
    /// Create an empty coordinator in the loading state.
    ///
    /// # Errors
    ///
    /// Returns [`ClusterError::InvalidOptions`] if the clustering options are
    /// unusable.
    pub fn new(settings: CoordinatorSettings, clock: Arc<dyn Clock>) -> Result<Self, ClusterError> {
        let index = ClusterIndex::build(Vec::new(), settings.cluster)?;
        Ok(Self {
            settings,
            clock,
            events: Vec::new(),
            by_id: BTreeMap::new(),
            filter: FilterMode::All,
            zoom: settings.initial_zoom,
            viewport: None,
            loading: true,
            filtered: Vec::new(),
            counts: FilterCounts::default(),
            index,
            units: ClusterQueryResult::default(),
            selection: SelectionController::new(settings.pulse),
            sheet: SheetView::default(),
            builds: 0,
            generation: 0,
        })
    }

    // -------------------------------------------------------------------
    // Inputs
    // -------------------------------------------------------------------

    /// Replace the loaded events and leave the loading state.
    ///
    /// Events are kept ascending by start instant, undated events last.
    pub fn set_events(&mut self, events: Vec<Event>) {
        let mut events: Vec<Arc<Event>> = events.into_iter().map(Arc::new).collect();
        events.sort_by_key(|e| (e.start_time.is_none(), e.start_time));
        self.by_id = events.iter().map(|e| (e.id, Arc::clone(e))).collect();
        self.events = events;
        self.loading = false;
        self.refilter();
    }

    /// Enter or leave the loading state.
    pub const fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    /// Change the filter. Returns whether the mode changed.
    pub fn set_filter(&mut self, mode: FilterMode) -> bool {
        if self.filter == mode {
            return false;
        }
        self.filter = mode;
        self.refilter();
        true
    }

    /// Change the zoom. Re-queries without rebuilding.
    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom;
        self.requery();
    }

    /// Change the viewport. Re-queries without rebuilding.
    pub fn set_viewport(&mut self, viewport: Option<BoundingBox>) {
        self.viewport = viewport;
        self.requery();
    }

    /// Change zoom and viewport together with a single re-query.
    pub fn set_camera(&mut self, zoom: f64, viewport: Option<BoundingBox>) {
        self.zoom = zoom;
        self.viewport = viewport;
        self.requery();
    }

    // -------------------------------------------------------------------
    // User actions
    // -------------------------------------------------------------------

    /// Drill into a cluster: pin its members in the sheet and suggest a
    /// camera move that splits it.
    ///
    /// Returns `None` for an unknown or stale id, leaving state unchanged.
    pub fn open_cluster(&mut self, id: ClusterId) -> Option<CameraTarget> {
        let lookup = self.index.get_cluster(id).and_then(|summary| {
            let zoom = self.index.expansion_zoom(id)?;
            let leaves = self.index.leaves(id, self.settings.leaf_limit, 0)?;
            Ok((summary, zoom, leaves.into_iter().map(|e| e.id).collect::<BTreeSet<_>>()))
        });
        let (summary, zoom, members) = match lookup {
            Ok(found) => found,
            Err(e) => {
                debug!(cluster = %id, error = %e, "Ignoring cluster open");
                return None;
            }
        };

        let events: Vec<Arc<Event>> = self
            .filtered
            .iter()
            .filter(|e| members.contains(&e.id))
            .cloned()
            .collect();
        self.sheet = SheetView {
            state: SheetState::Full,
            title: format!("{} events", events.len()),
            source: SheetSource::Cluster {
                cluster_id: id,
                count: summary.count,
            },
            events,
        };
        self.clear_selection_outside_sheet();
        debug!(cluster = %id, members = self.sheet.events.len(), zoom, "Cluster opened");

        Some(CameraTarget {
            center: summary.position,
            zoom: f64::from(zoom),
        })
    }

    /// Highlight a clicked point and return its popup details.
    ///
    /// Returns `None` when the id is not a loaded event.
    pub fn open_point(&mut self, id: EventId) -> Option<PointPopup> {
        let event = Arc::clone(self.by_id.get(&id)?);
        self.selection.select(id);
        self.sync_selection();
        Some(PointPopup::from(event.as_ref()))
    }

    /// Highlight an event picked from the list, expand the sheet, and
    /// suggest flying to it.
    ///
    /// Returns `None` when the id is not a loaded event.
    pub fn open_row(&mut self, id: EventId) -> Option<CameraTarget> {
        let event = Arc::clone(self.by_id.get(&id)?);
        self.selection.select(id);
        self.sync_selection();
        self.sheet.state = SheetState::Full;
        Some(CameraTarget {
            center: event.position(),
            zoom: self.zoom.max(self.settings.focus_zoom),
        })
    }

    /// Open the default list of every event under the current filter.
    pub fn open_list(&mut self) {
        self.sheet = SheetView {
            state: SheetState::Full,
            title: DEFAULT_SHEET_TITLE.to_owned(),
            source: SheetSource::CurrentFilter,
            events: self.filtered.clone(),
        };
        self.clear_selection_outside_sheet();
    }

    /// Close the sheet and drop the highlight.
    pub fn close_sheet(&mut self) {
        self.sheet.state = SheetState::Closed;
        self.selection.clear();
    }

    /// Flip an open sheet between peek and full.
    pub fn toggle_sheet(&mut self) {
        self.sheet.state = self.sheet.state.toggled();
    }

    /// Drop the highlight.
    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    // -------------------------------------------------------------------
    // Outputs
    // -------------------------------------------------------------------

    /// Snapshot the current state as a render frame.
    pub fn frame(&mut self) -> RenderFrame {
        self.generation = self.generation.saturating_add(1);
        RenderFrame {
            generation: self.generation,
            loading: self.loading,
            filter: self.filter,
            counts: self.counts,
            empty_label: self.filter.empty_label().to_owned(),
            home: self.home(),
            zoom: self.zoom,
            units: self.units.clone(),
            selected: self.selection.selected(),
            selection_visible: self.selection.is_visible(),
            pulse: self.selection.pulse(),
            sheet: self.sheet.clone(),
        }
    }

    /// The opening camera: the configured centre at the initial zoom.
    pub const fn home(&self) -> CameraTarget {
        CameraTarget {
            center: self.settings.center,
            zoom: self.settings.initial_zoom,
        }
    }

    /// The inputs the current state was derived from.
    pub fn inputs(&self) -> ViewInputs<'_> {
        ViewInputs {
            events: &self.events,
            filter: self.filter,
            now: self.clock.now(),
            zoom: self.zoom,
            viewport: self.viewport,
            selected: self.selection.selected(),
            options: self.settings.cluster,
        }
    }

    /// All loaded events in display order.
    pub fn events(&self) -> &[Arc<Event>] {
        &self.events
    }

    /// Events passing the current filter.
    pub fn filtered(&self) -> &[Arc<Event>] {
        &self.filtered
    }

    /// Badge counts.
    pub const fn counts(&self) -> FilterCounts {
        self.counts
    }

    /// Units drawn at the current zoom.
    pub const fn units(&self) -> &ClusterQueryResult {
        &self.units
    }

    /// Active filter.
    pub const fn filter(&self) -> FilterMode {
        self.filter
    }

    /// Current zoom.
    pub const fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Whether the initial load is in flight.
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// The list panel.
    pub const fn sheet(&self) -> &SheetView {
        &self.sheet
    }

    /// The selection controller.
    pub const fn selection(&self) -> &SelectionController {
        &self.selection
    }

    /// Number of index builds so far.
    pub const fn builds(&self) -> u64 {
        self.builds
    }

    /// Stop the pulse and wait for it.
    pub async fn shutdown(&mut self) {
        self.selection.shutdown().await;
    }

    // -------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------

    fn refilter(&mut self) {
        let now = self.clock.now();
        self.filtered = filter::apply(self.filter, &now, &self.events);
        self.counts = filter::counts(&now, &self.events);
        match ClusterIndex::build(self.filtered.iter().cloned(), self.settings.cluster) {
            Ok(index) => {
                self.index = index;
                self.builds = self.builds.saturating_add(1);
            }
            Err(e) => error!(error = %e, "Cluster index rebuild failed"),
        }
        if !self.sheet.source.is_pinned() {
            self.sheet.events = self.filtered.clone();
        }
        debug!(
            filter = %self.filter,
            events = self.events.len(),
            filtered = self.filtered.len(),
            "Filtered set recomputed"
        );
        self.requery();
    }

    fn requery(&mut self) {
        self.units = to_result(&self.index.query(self.zoom, self.viewport.as_ref()));
        self.sync_selection();
    }

    fn sync_selection(&mut self) {
        let visible = self
            .selection
            .selected()
            .is_some_and(|id| self.units.has_single(id));
        self.selection.set_visible(visible);
    }

    fn clear_selection_outside_sheet(&mut self) {
        if let Some(id) = self.selection.selected()
            && !self.sheet.contains(id)
        {
            self.selection.clear();
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use chrono::{TimeZone, Utc};
    use chrono_tz::Europe::Helsinki;

    use super::*;
    use crate::clock::FixedClock;

    /// Wednesday 2024-05-15 10:00 in Helsinki.
    fn clock() -> Arc<dyn Clock> {
        Arc::new(FixedClock(Helsinki.with_ymd_and_hms(2024, 5, 15, 10, 0, 0).unwrap()))
    }

    fn coordinator() -> ViewCoordinator {
        ViewCoordinator::new(CoordinatorSettings::default(), clock()).unwrap()
    }

    fn event(title: &str, day: u32, lat: f64, lng: f64) -> Event {
        Event {
            id: EventId::new(),
            title: title.to_owned(),
            description: None,
            start_time: Some(Utc.with_ymd_and_hms(2024, 5, day, 12, 0, 0).unwrap()),
            end_time: None,
            address: Some("Aurakatu 1".to_owned()),
            lat,
            lng,
        }
    }

    /// Three events on one square today, one on the weekend across town.
    fn fixture() -> Vec<Event> {
        vec![
            event("A", 15, 60.4518, 22.2666),
            event("B", 15, 60.4519, 22.2667),
            event("C", 15, 60.45185, 22.26665),
            event("D", 18, 60.4340, 22.2200),
        ]
    }

    fn assert_matches_recompute(view: &ViewCoordinator) {
        let expected = recompute(&view.inputs()).unwrap();
        assert_eq!(view.filtered(), expected.filtered.as_slice());
        assert_eq!(view.counts(), expected.counts);
        assert_eq!(view.units(), &expected.units);
        assert_eq!(view.selection().is_visible(), expected.selection_visible);
    }

    #[test]
    fn starts_loading_and_empty() {
        let mut view = coordinator();
        let frame = view.frame();
        assert!(frame.loading);
        assert_eq!(frame.units.event_count(), 0);
        assert_eq!(frame.sheet.state, SheetState::Closed);
        assert_eq!(frame.empty_label, "No events yet");
    }

    #[test]
    fn set_events_filters_clusters_and_counts() {
        let mut view = coordinator();
        view.set_events(fixture());
        assert!(!view.is_loading());
        assert_eq!(view.filtered().len(), 4);
        assert_eq!(
            view.counts(),
            FilterCounts {
                all: 4,
                today: 3,
                weekend: 1,
            }
        );
        assert_eq!(view.units().event_count(), 4);
        assert_matches_recompute(&view);
    }

    #[test]
    fn incremental_state_agrees_with_recompute() {
        let mut view = coordinator();
        view.set_events(fixture());
        assert_matches_recompute(&view);
        view.set_filter(FilterMode::Today);
        assert_matches_recompute(&view);
        view.set_zoom(16.0);
        assert_matches_recompute(&view);
        let id = view.filtered()[0].id;
        view.open_point(id);
        assert_matches_recompute(&view);
        view.set_filter(FilterMode::Weekend);
        assert_matches_recompute(&view);
        view.set_viewport(Some(BoundingBox {
            west: 22.0,
            south: 60.0,
            east: 22.25,
            north: 61.0,
        }));
        assert_matches_recompute(&view);
    }

    #[test]
    fn camera_changes_do_not_rebuild() {
        let mut view = coordinator();
        view.set_events(fixture());
        let builds = view.builds();
        view.set_zoom(5.0);
        view.set_zoom(18.0);
        view.set_viewport(None);
        assert_eq!(view.builds(), builds);
        view.set_filter(FilterMode::Today);
        assert_eq!(view.builds(), builds + 1);
    }

    #[test]
    fn unchanged_filter_is_a_no_op() {
        let mut view = coordinator();
        view.set_events(fixture());
        let builds = view.builds();
        assert!(!view.set_filter(FilterMode::All));
        assert_eq!(view.builds(), builds);
    }

    #[test]
    fn open_cluster_pins_members_and_suggests_camera() {
        let mut view = coordinator();
        view.set_events(fixture());
        view.set_zoom(10.0);
        let cluster = view
            .units()
            .clusters
            .iter()
            .find(|c| c.count == 3)
            .cloned()
            .unwrap();

        let target = view.open_cluster(cluster.id).unwrap();
        assert!(target.zoom > 10.0);
        assert_eq!(view.sheet().state, SheetState::Full);
        assert_eq!(view.sheet().title, "3 events");
        assert!(view.sheet().source.is_pinned());
        let titles: Vec<&str> = view.sheet().events.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles.len(), 3);
        assert!(!titles.contains(&"D"));
    }

    #[test]
    fn pinned_list_survives_filter_change() {
        let mut view = coordinator();
        view.set_events(fixture());
        view.set_zoom(10.0);
        let cluster = view.units().clusters[0].id;
        view.open_cluster(cluster).unwrap();
        let pinned = view.sheet().events.clone();

        view.set_filter(FilterMode::Weekend);
        assert_eq!(view.sheet().events, pinned);
        assert_eq!(view.sheet().state, SheetState::Full);
    }

    #[test]
    fn default_list_follows_filter_and_keeps_state() {
        let mut view = coordinator();
        view.set_events(fixture());
        view.open_list();
        view.toggle_sheet();
        assert_eq!(view.sheet().state, SheetState::Peek);
        assert_eq!(view.sheet().title, DEFAULT_SHEET_TITLE);
        assert_eq!(view.sheet().events.len(), 4);

        view.set_filter(FilterMode::Weekend);
        assert_eq!(view.sheet().events.len(), 1);
        assert_eq!(view.sheet().state, SheetState::Peek);
    }

    #[test]
    fn opening_list_replaces_pinned_cluster() {
        let mut view = coordinator();
        view.set_events(fixture());
        view.set_zoom(10.0);
        let cluster = view.units().clusters[0].id;
        view.open_cluster(cluster).unwrap();
        view.open_list();
        assert!(!view.sheet().source.is_pinned());
        view.set_filter(FilterMode::Today);
        assert_eq!(view.sheet().events.len(), 3);
    }

    #[test]
    fn stale_cluster_id_is_a_no_op() {
        let mut view = coordinator();
        view.set_events(fixture());
        view.set_zoom(10.0);
        let before = view.sheet().clone();
        let stale = ClusterId::from_parts(10, 999).unwrap();
        assert!(view.open_cluster(stale).is_none());
        assert_eq!(view.sheet(), &before);
    }

    #[test]
    fn open_point_selects_and_returns_popup() {
        let mut view = coordinator();
        let events = fixture();
        let d = events[3].id;
        view.set_events(events);
        let popup = view.open_point(d).unwrap();
        assert_eq!(popup.title, "D");
        assert_eq!(popup.address.as_deref(), Some("Aurakatu 1"));
        assert!(view.selection().is_selected(d));
        assert!(view.open_point(EventId::new()).is_none());
    }

    #[test]
    fn selection_outside_filter_persists_but_is_not_visible() {
        let mut view = coordinator();
        let events = fixture();
        let d = events[3].id;
        view.set_events(events);
        view.set_zoom(16.0);
        view.open_point(d);
        assert!(view.selection().is_visible());

        view.set_filter(FilterMode::Today);
        assert!(view.selection().is_selected(d));
        assert!(!view.selection().is_visible());

        view.set_filter(FilterMode::All);
        assert!(view.selection().is_visible());
    }

    #[test]
    fn open_row_flies_to_at_least_focus_zoom() {
        let mut view = coordinator();
        let events = fixture();
        let a = events[0].id;
        view.set_events(events);
        view.set_zoom(12.0);
        let target = view.open_row(a).unwrap();
        assert!((target.zoom - 14.0).abs() < f64::EPSILON);
        assert!((target.center.lat - 60.4518).abs() < 1e-9);
        assert_eq!(view.sheet().state, SheetState::Full);

        view.set_zoom(17.0);
        let target = view.open_row(a).unwrap();
        assert!((target.zoom - 17.0).abs() < f64::EPSILON);
    }

    #[test]
    fn close_sheet_clears_selection() {
        let mut view = coordinator();
        let events = fixture();
        let a = events[0].id;
        view.set_events(events);
        view.open_list();
        view.open_row(a);
        view.close_sheet();
        assert_eq!(view.sheet().state, SheetState::Closed);
        assert_eq!(view.selection().selected(), None);
    }

    #[test]
    fn cluster_list_without_selection_clears_it() {
        let mut view = coordinator();
        let events = fixture();
        let d = events[3].id;
        view.set_events(events);
        view.set_zoom(10.0);
        view.open_point(d);
        let cluster = view
            .units()
            .clusters
            .iter()
            .find(|c| c.count == 3)
            .map(|c| c.id)
            .unwrap();
        view.open_cluster(cluster);
        assert_eq!(view.selection().selected(), None);
    }

    #[test]
    fn toggle_on_closed_sheet_stays_closed() {
        let mut view = coordinator();
        view.toggle_sheet();
        assert_eq!(view.sheet().state, SheetState::Closed);
    }

    #[test]
    fn frames_carry_the_opening_camera() {
        let settings = CoordinatorSettings {
            center: GeoPoint::new(61.4978, 23.7610),
            initial_zoom: 11.0,
            ..CoordinatorSettings::default()
        };
        let mut view = ViewCoordinator::new(settings, clock()).unwrap();
        let first = view.frame();
        assert_eq!(first.home.center, GeoPoint::new(61.4978, 23.7610));
        assert!((first.home.zoom - 11.0).abs() < f64::EPSILON);

        // The opening camera does not follow later camera reports.
        view.set_camera(15.0, None);
        let later = view.frame();
        assert_eq!(later.home, first.home);
        assert!((later.zoom - 15.0).abs() < f64::EPSILON);
    }

    #[test]
    fn frames_count_up() {
        let mut view = coordinator();
        let first = view.frame().generation;
        let second = view.frame().generation;
        assert!(second > first);
    }
}
