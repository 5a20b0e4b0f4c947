//! Hierarchical greedy grid clustering.
//!
//! The [`ClusterIndex`] is built once per point-set change and answers
//! zoom-level queries, expansion-zoom lookups, and paged member listings
//! without rebuilding.
//!
//! # Structure
//!
//! One node list per integer zoom level from `min_zoom` to
//! `max_cluster_zoom`. The top level holds the raw points. Each lower level
//! `z` is derived from level `z + 1`: nodes are visited in level order and
//! each joins the lowest-indexed cluster of level `z` whose running weighted
//! centroid lies within the level radius, otherwise it starts a new cluster.
//! Levels nest, so every cluster's members are exactly the union of its
//! children one level up.
//!
//! Points are sorted by key before the top level is laid out. Node order,
//! and therefore the whole partition, depends only on the keys and
//! positions of the input, never on input order.
//!
//! Neighbour lookups go through a grid keyed by `floor(coord / radius)`,
//! keeping a level build linear in its node count.

use std::collections::BTreeMap;
use std::sync::Arc;

use eventmap_types::{BoundingBox, ClusterId, ClusterSummary, Event, EventId, GeoPoint};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::ClusterError;
use crate::projection;

/// Default clustering radius in pixels.
pub const DEFAULT_RADIUS: f64 = 50.0;

/// Default tile extent in pixels.
pub const DEFAULT_EXTENT: f64 = 512.0;

/// Default lowest zoom level with its own clustering.
pub const DEFAULT_MIN_ZOOM: u8 = 0;

/// Default zoom at and above which every point is standalone.
pub const DEFAULT_MAX_CLUSTER_ZOOM: u8 = 15;

// ---------------------------------------------------------------------------
// Locatable
// ---------------------------------------------------------------------------

/// Something with a stable ordering key and a position on the map.
pub trait Locatable {
    /// Ordering key. Determines processing order and leaf order.
    type Key: Ord;

    /// The item's key.
    fn key(&self) -> Self::Key;

    /// The item's coordinate.
    fn position(&self) -> GeoPoint;
}

impl Locatable for Event {
    type Key = EventId;

    fn key(&self) -> EventId {
        self.id
    }

    fn position(&self) -> GeoPoint {
        Self::position(self)
    }
}

impl<T: Locatable + ?Sized> Locatable for Arc<T> {
    type Key = T::Key;

    fn key(&self) -> T::Key {
        (**self).key()
    }

    fn position(&self) -> GeoPoint {
        (**self).position()
    }
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Tuning knobs for the cluster index.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ClusterOptions {
    /// Clustering radius in rendered pixels.
    #[serde(default = "default_radius")]
    pub radius: f64,

    /// Tile extent in pixels (world width at zoom 0).
    #[serde(default = "default_extent")]
    pub extent: f64,

    /// Lowest zoom level that gets its own clustering. Lower zooms reuse it.
    #[serde(default = "default_min_zoom")]
    pub min_zoom: u8,

    /// Zoom at and above which no clustering occurs.
    #[serde(default = "default_max_cluster_zoom")]
    pub max_cluster_zoom: u8,
}

impl Default for ClusterOptions {
    fn default() -> Self {
        Self {
            radius: DEFAULT_RADIUS,
            extent: DEFAULT_EXTENT,
            min_zoom: DEFAULT_MIN_ZOOM,
            max_cluster_zoom: DEFAULT_MAX_CLUSTER_ZOOM,
        }
    }
}

impl ClusterOptions {
    /// Check the options for usable values.
    ///
    /// # Errors
    ///
    /// Returns [`ClusterError::InvalidOptions`] when the radius or extent is
    /// not a positive finite number, or the zoom range is empty or exceeds
    /// [`ClusterId::MAX_ZOOM`].
    pub fn validate(&self) -> Result<(), ClusterError> {
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(ClusterError::InvalidOptions {
                reason: format!("radius must be positive, got {}", self.radius),
            });
        }
        if !self.extent.is_finite() || self.extent <= 0.0 {
            return Err(ClusterError::InvalidOptions {
                reason: format!("extent must be positive, got {}", self.extent),
            });
        }
        if self.min_zoom > self.max_cluster_zoom {
            return Err(ClusterError::InvalidOptions {
                reason: format!(
                    "min_zoom {} exceeds max_cluster_zoom {}",
                    self.min_zoom, self.max_cluster_zoom
                ),
            });
        }
        if self.max_cluster_zoom > ClusterId::MAX_ZOOM {
            return Err(ClusterError::InvalidOptions {
                reason: format!(
                    "max_cluster_zoom {} exceeds {}",
                    self.max_cluster_zoom,
                    ClusterId::MAX_ZOOM
                ),
            });
        }
        Ok(())
    }

    /// Map a real zoom to the integer level whose partition is shown.
    ///
    /// `NaN` maps to `min_zoom`; everything else is floored and clamped to
    /// `[min_zoom, max_cluster_zoom]`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn level_for(&self, zoom: f64) -> u8 {
        if zoom.is_nan() {
            return self.min_zoom;
        }
        let clamped = zoom
            .floor()
            .clamp(f64::from(self.min_zoom), f64::from(self.max_cluster_zoom));
        clamped as u8
    }
}

const fn default_radius() -> f64 {
    DEFAULT_RADIUS
}

const fn default_extent() -> f64 {
    DEFAULT_EXTENT
}

const fn default_min_zoom() -> u8 {
    DEFAULT_MIN_ZOOM
}

const fn default_max_cluster_zoom() -> u8 {
    DEFAULT_MAX_CLUSTER_ZOOM
}

// ---------------------------------------------------------------------------
// Nodes
// ---------------------------------------------------------------------------

/// One unit at one zoom level, in projected coordinates.
#[derive(Debug, Clone)]
struct Node {
    x: f64,
    y: f64,
    count: u32,
    kind: NodeKind,
}

#[derive(Debug, Clone)]
enum NodeKind {
    /// A lone point: index into the sorted item list.
    Point(usize),
    /// A cluster: indices into the next level's node list.
    Group(Vec<usize>),
}

/// Grid cell of a projected coordinate for a given cell size.
#[allow(clippy::cast_possible_truncation)]
fn cell_of(x: f64, y: f64, size: f64) -> (i64, i64) {
    ((x / size).floor() as i64, (y / size).floor() as i64)
}

/// Merge `child` into `node`, moving the centroid to the weighted mean.
fn absorb(node: &mut Node, child: &Node, child_index: usize) {
    let total = node.count.saturating_add(child.count);
    let w_node = f64::from(node.count);
    let w_child = f64::from(child.count);
    let w_total = f64::from(total);
    node.x = node.x.mul_add(w_node, child.x * w_child) / w_total;
    node.y = node.y.mul_add(w_node, child.y * w_child) / w_total;
    node.count = total;
    if let NodeKind::Group(children) = &mut node.kind {
        children.push(child_index);
    }
}

/// Cluster the nodes of one level into the next lower level.
fn cluster_level(upper: &[Node], radius: f64) -> Vec<Node> {
    let limit = radius * radius;
    let mut level: Vec<Node> = Vec::new();
    let mut grid: BTreeMap<(i64, i64), Vec<usize>> = BTreeMap::new();

    for (child_index, child) in upper.iter().enumerate() {
        let (cx, cy) = cell_of(child.x, child.y, radius);

        // Lowest-indexed cluster within the radius wins.
        let mut target: Option<usize> = None;
        for gx in cx.saturating_sub(1)..=cx.saturating_add(1) {
            for gy in cy.saturating_sub(1)..=cy.saturating_add(1) {
                let Some(bucket) = grid.get(&(gx, gy)) else {
                    continue;
                };
                for &candidate in bucket {
                    if target.is_some_and(|t| t <= candidate) {
                        continue;
                    }
                    let Some(node) = level.get(candidate) else {
                        continue;
                    };
                    let dx = node.x - child.x;
                    let dy = node.y - child.y;
                    if dx.mul_add(dx, dy * dy) <= limit {
                        target = Some(candidate);
                    }
                }
            }
        }

        if let Some(t) = target
            && let Some(node) = level.get_mut(t)
        {
            let before = cell_of(node.x, node.y, radius);
            absorb(node, child, child_index);
            let after = cell_of(node.x, node.y, radius);
            if before != after {
                if let Some(bucket) = grid.get_mut(&before) {
                    bucket.retain(|&i| i != t);
                    if bucket.is_empty() {
                        grid.remove(&before);
                    }
                }
                grid.entry(after).or_default().push(t);
            }
            continue;
        }

        let index = level.len();
        level.push(Node {
            x: child.x,
            y: child.y,
            count: child.count,
            kind: NodeKind::Group(vec![child_index]),
        });
        grid.entry((cx, cy)).or_default().push(index);
    }

    // A group holding nothing but one lone point is that point.
    for node in &mut level {
        let lone = match &node.kind {
            NodeKind::Group(children) if children.len() == 1 => children
                .first()
                .and_then(|c| upper.get(*c))
                .and_then(|c| match c.kind {
                    NodeKind::Point(item) => Some(item),
                    NodeKind::Group(_) => None,
                }),
            _ => None,
        };
        if let Some(item) = lone {
            node.kind = NodeKind::Point(item);
        }
    }

    level
}

// ---------------------------------------------------------------------------
// Query output
// ---------------------------------------------------------------------------

/// The units drawn at one zoom level.
#[derive(Debug)]
pub struct ClusterQuery<'a, T> {
    /// Integer level the units belong to.
    pub level: u8,
    /// Clusters of two or more items.
    pub clusters: Vec<ClusterSummary>,
    /// Items drawn individually.
    pub singles: Vec<&'a T>,
}

impl<T> ClusterQuery<'_, T> {
    /// Number of items represented (cluster members plus singles).
    pub fn item_count(&self) -> usize {
        self.clusters
            .iter()
            .map(|c| usize::try_from(c.count).unwrap_or(usize::MAX))
            .fold(self.singles.len(), usize::saturating_add)
    }
}

// ---------------------------------------------------------------------------
// Index
// ---------------------------------------------------------------------------

/// A reusable zoom-aware clustering of a point set.
#[derive(Debug)]
pub struct ClusterIndex<T> {
    options: ClusterOptions,
    /// Items sorted by key.
    items: Vec<T>,
    /// Node lists, `levels[0]` is `min_zoom`, the last is `max_cluster_zoom`.
    levels: Vec<Vec<Node>>,
    /// Items dropped for non-finite coordinates.
    rejected: usize,
}

impl<T: Locatable> ClusterIndex<T> {
    /// Build an index over `items`.
    ///
    /// Items with non-finite coordinates are skipped and counted in
    /// [`rejected`](Self::rejected). Out-of-range latitudes are pinned to the
    /// projection's clip latitude.
    ///
    /// # Errors
    ///
    /// Returns [`ClusterError::InvalidOptions`] if `options` fail validation.
    pub fn build(
        items: impl IntoIterator<Item = T>,
        options: ClusterOptions,
    ) -> Result<Self, ClusterError> {
        options.validate()?;

        let mut rejected: usize = 0;
        let mut items: Vec<T> = items
            .into_iter()
            .filter(|item| {
                let p = item.position();
                let finite = p.lat.is_finite() && p.lng.is_finite();
                if !finite {
                    rejected = rejected.saturating_add(1);
                }
                finite
            })
            .collect();
        if rejected > 0 {
            warn!(rejected, "Skipped points with non-finite coordinates");
        }
        items.sort_by_key(T::key);

        let top: Vec<Node> = items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let (x, y) = projection::project(item.position());
                Node {
                    x,
                    y,
                    count: 1,
                    kind: NodeKind::Point(index),
                }
            })
            .collect();

        let mut levels: Vec<Vec<Node>> = vec![top];
        for zoom in (options.min_zoom..options.max_cluster_zoom).rev() {
            let Some(upper) = levels.last() else {
                break;
            };
            let radius = projection::radius_at(options.radius, options.extent, zoom);
            let lower = cluster_level(upper, radius);
            levels.push(lower);
        }
        levels.reverse();

        debug!(
            points = items.len(),
            levels = levels.len(),
            min_zoom_units = levels.first().map_or(0, Vec::len),
            "Cluster index built"
        );

        Ok(Self {
            options,
            items,
            levels,
            rejected,
        })
    }

    /// The options this index was built with.
    pub const fn options(&self) -> &ClusterOptions {
        &self.options
    }

    /// Number of indexed items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the index holds no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Indexed items in key order.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Number of input items skipped for non-finite coordinates.
    pub const fn rejected(&self) -> usize {
        self.rejected
    }

    /// The clusters and lone points at `zoom`, optionally restricted to a
    /// viewport.
    ///
    /// Deterministic for a given index and zoom. Every indexed item appears
    /// exactly once, either as a single or inside one cluster, when no
    /// viewport is given.
    pub fn query(&self, zoom: f64, viewport: Option<&BoundingBox>) -> ClusterQuery<'_, T> {
        let level = self.options.level_for(zoom);
        let nodes = self.level_nodes(level);
        let mut result = ClusterQuery {
            level,
            clusters: Vec::new(),
            singles: Vec::new(),
        };
        for (index, node) in nodes.iter().enumerate() {
            self.push_unit(&mut result, level, index, node, viewport);
        }
        result
    }

    /// Summary of a single cluster.
    ///
    /// # Errors
    ///
    /// Returns [`ClusterError::NotFound`] for an unknown or stale id.
    pub fn get_cluster(&self, id: ClusterId) -> Result<ClusterSummary, ClusterError> {
        let node = self.cluster_node(id)?;
        Ok(ClusterSummary {
            id,
            position: projection::unproject(node.x, node.y),
            count: node.count,
        })
    }

    /// The smallest zoom at which the cluster's members split into at least
    /// two units.
    ///
    /// The result is above the cluster's own level and never exceeds
    /// `max_cluster_zoom`.
    ///
    /// # Errors
    ///
    /// Returns [`ClusterError::NotFound`] for an unknown or stale id.
    pub fn expansion_zoom(&self, id: ClusterId) -> Result<u8, ClusterError> {
        let mut node = self.cluster_node(id)?;
        let mut level = id.zoom();
        loop {
            let next = level.saturating_add(1);
            let NodeKind::Group(children) = &node.kind else {
                return Ok(level);
            };
            if children.len() >= 2 || next >= self.options.max_cluster_zoom {
                return Ok(next);
            }
            let Some(child) = children
                .first()
                .and_then(|c| self.level_nodes(next).get(*c))
            else {
                return Ok(next);
            };
            node = child;
            level = next;
        }
    }

    /// Up to `limit` members of a cluster, skipping the first `offset`, in
    /// key order.
    ///
    /// Paging with growing offsets visits every member exactly once.
    ///
    /// # Errors
    ///
    /// Returns [`ClusterError::NotFound`] for an unknown or stale id.
    pub fn leaves(
        &self,
        id: ClusterId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<&T>, ClusterError> {
        let members = self.member_indices(id)?;
        Ok(members
            .into_iter()
            .skip(offset)
            .take(limit)
            .filter_map(|i| self.items.get(i))
            .collect())
    }

    /// The units one level above a cluster, i.e. what it splits into next.
    ///
    /// # Errors
    ///
    /// Returns [`ClusterError::NotFound`] for an unknown or stale id.
    pub fn children(&self, id: ClusterId) -> Result<ClusterQuery<'_, T>, ClusterError> {
        let node = self.cluster_node(id)?;
        let level = id.zoom().saturating_add(1);
        let nodes = self.level_nodes(level);
        let mut result = ClusterQuery {
            level,
            clusters: Vec::new(),
            singles: Vec::new(),
        };
        if let NodeKind::Group(children) = &node.kind {
            for &index in children {
                if let Some(child) = nodes.get(index) {
                    self.push_unit(&mut result, level, index, child, None);
                }
            }
        }
        Ok(result)
    }

    // -------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------

    fn level_nodes(&self, level: u8) -> &[Node] {
        if level < self.options.min_zoom {
            return &[];
        }
        let offset = usize::from(level.saturating_sub(self.options.min_zoom));
        self.levels.get(offset).map_or(&[], Vec::as_slice)
    }

    fn cluster_node(&self, id: ClusterId) -> Result<&Node, ClusterError> {
        let level = id.zoom();
        if level < self.options.min_zoom || level >= self.options.max_cluster_zoom {
            return Err(ClusterError::NotFound(id));
        }
        match self.level_nodes(level).get(id.index()) {
            Some(node) if matches!(node.kind, NodeKind::Group(_)) => Ok(node),
            _ => Err(ClusterError::NotFound(id)),
        }
    }

    fn member_indices(&self, id: ClusterId) -> Result<Vec<usize>, ClusterError> {
        let root = self.cluster_node(id)?;
        let mut members = Vec::with_capacity(usize::try_from(root.count).unwrap_or(0));
        let mut stack: Vec<(u8, &Node)> = vec![(id.zoom(), root)];
        while let Some((level, node)) = stack.pop() {
            match &node.kind {
                NodeKind::Point(item) => members.push(*item),
                NodeKind::Group(children) => {
                    let next = level.saturating_add(1);
                    let nodes = self.level_nodes(next);
                    stack.extend(children.iter().filter_map(|c| nodes.get(*c)).map(|n| (next, n)));
                }
            }
        }
        // Item indices follow key order.
        members.sort_unstable();
        Ok(members)
    }

    fn push_unit<'a>(
        &'a self,
        result: &mut ClusterQuery<'a, T>,
        level: u8,
        index: usize,
        node: &Node,
        viewport: Option<&BoundingBox>,
    ) {
        match &node.kind {
            NodeKind::Point(item) => {
                let Some(item) = self.items.get(*item) else {
                    return;
                };
                if viewport.is_some_and(|v| !v.contains(item.position())) {
                    return;
                }
                result.singles.push(item);
            }
            NodeKind::Group(_) => {
                let position = projection::unproject(node.x, node.y);
                if viewport.is_some_and(|v| !v.contains(position)) {
                    return;
                }
                let Some(id) = ClusterId::from_parts(level, index) else {
                    return;
                };
                result.clusters.push(ClusterSummary {
                    id,
                    position,
                    count: node.count,
                });
            }
        }
    }
}
