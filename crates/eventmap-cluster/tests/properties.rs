//! Structural properties of the cluster index over randomized point sets.
//!
//! Point sets are generated from fixed seeds so failures reproduce.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::arithmetic_side_effects
)]

use std::collections::{BTreeMap, BTreeSet};

use eventmap_cluster::{ClusterIndex, ClusterOptions, DEFAULT_MAX_CLUSTER_ZOOM, Locatable};
use eventmap_types::GeoPoint;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Debug, Clone, Copy)]
struct Pin {
    id: u32,
    lat: f64,
    lng: f64,
}

impl Locatable for Pin {
    type Key = u32;

    fn key(&self) -> u32 {
        self.id
    }

    fn position(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lng)
    }
}

/// Points scattered around Turku with a few tight hot spots.
fn scatter(seed: u64, count: u32) -> Vec<Pin> {
    let mut rng = StdRng::seed_from_u64(seed);
    let hot_spots = [(60.4518, 22.2666), (60.4495, 22.2936), (60.4340, 22.2200)];
    (0..count)
        .map(|id| {
            let (lat, lng) = if rng.random_bool(0.4) {
                let (lat, lng) = hot_spots[rng.random_range(0..hot_spots.len())];
                (
                    lat + rng.random_range(-0.0005..0.0005),
                    lng + rng.random_range(-0.0005..0.0005),
                )
            } else {
                (
                    rng.random_range(60.30..60.60),
                    rng.random_range(22.00..22.60),
                )
            };
            Pin { id, lat, lng }
        })
        .collect()
}

fn build(pins: Vec<Pin>) -> ClusterIndex<Pin> {
    ClusterIndex::build(pins, ClusterOptions::default()).unwrap()
}

fn zooms() -> impl Iterator<Item = f64> {
    (0..=34).map(|half| f64::from(half) * 0.5)
}

/// Map each item key to the unit it belongs to at `zoom`.
fn assignment(index: &ClusterIndex<Pin>, zoom: f64) -> BTreeMap<u32, String> {
    let result = index.query(zoom, None);
    let mut units = BTreeMap::new();
    for cluster in &result.clusters {
        for leaf in index.leaves(cluster.id, usize::MAX, 0).unwrap() {
            let previous = units.insert(leaf.id, format!("c{}", cluster.id));
            assert!(previous.is_none(), "item {} in two units", leaf.id);
        }
    }
    for single in &result.singles {
        let previous = units.insert(single.id, format!("p{}", single.id));
        assert!(previous.is_none(), "item {} in two units", single.id);
    }
    units
}

#[test]
fn every_zoom_partitions_the_point_set() {
    let pins = scatter(7, 400);
    let all: BTreeSet<u32> = pins.iter().map(|p| p.id).collect();
    let index = build(pins);

    for zoom in zooms() {
        let result = index.query(zoom, None);
        assert_eq!(result.item_count(), all.len(), "zoom {zoom}");
        assert!(result.clusters.iter().all(|c| c.count >= 2));

        let units = assignment(&index, zoom);
        let covered: BTreeSet<u32> = units.keys().copied().collect();
        assert_eq!(covered, all, "zoom {zoom}");
    }
}

#[test]
fn cluster_count_matches_leaves() {
    let index = build(scatter(11, 250));
    for zoom in 0..DEFAULT_MAX_CLUSTER_ZOOM {
        for cluster in index.query(f64::from(zoom), None).clusters {
            let leaves = index.leaves(cluster.id, usize::MAX, 0).unwrap();
            assert_eq!(leaves.len(), cluster.count as usize);
        }
    }
}

#[test]
fn expansion_zoom_splits_the_cluster() {
    let index = build(scatter(23, 300));
    for zoom in 0..DEFAULT_MAX_CLUSTER_ZOOM {
        for cluster in index.query(f64::from(zoom), None).clusters {
            let expansion = index.expansion_zoom(cluster.id).unwrap();
            assert!(expansion > zoom);
            assert!(expansion <= DEFAULT_MAX_CLUSTER_ZOOM);

            let members: Vec<u32> = index
                .leaves(cluster.id, usize::MAX, 0)
                .unwrap()
                .iter()
                .map(|p| p.id)
                .collect();
            let units = assignment(&index, f64::from(expansion));
            let distinct: BTreeSet<&String> = members.iter().map(|id| &units[id]).collect();

            assert!(distinct.len() >= 2, "cluster {} did not split", cluster.id);

            // One level below the expansion the members are still together.
            if expansion > zoom + 1 {
                let before = assignment(&index, f64::from(expansion - 1));
                let together: BTreeSet<&String> =
                    members.iter().map(|id| &before[id]).collect();
                assert_eq!(together.len(), 1);
            }
        }
    }
}

#[test]
fn paging_visits_every_leaf_once() {
    let index = build(scatter(31, 300));
    for cluster in index.query(3.0, None).clusters {
        let all: Vec<u32> = index
            .leaves(cluster.id, usize::MAX, 0)
            .unwrap()
            .iter()
            .map(|p| p.id)
            .collect();
        let mut paged = Vec::new();
        let mut offset = 0;
        loop {
            let page = index.leaves(cluster.id, 7, offset).unwrap();
            if page.is_empty() {
                break;
            }
            offset += page.len();
            paged.extend(page.iter().map(|p| p.id));
        }
        assert_eq!(paged, all);
        assert!(all.windows(2).all(|w| w[0] < w[1]));
    }
}

#[test]
fn levels_nest() {
    let index = build(scatter(43, 300));
    for zoom in 0..DEFAULT_MAX_CLUSTER_ZOOM {
        let lower = assignment(&index, f64::from(zoom));
        let upper = assignment(&index, f64::from(zoom + 1));
        // Items sharing a unit at zoom + 1 share one at zoom.
        let mut seen: BTreeMap<&String, &String> = BTreeMap::new();
        for (id, unit) in &upper {
            let parent = &lower[id];
            if let Some(existing) = seen.insert(unit, parent) {
                assert_eq!(existing, parent);
            }
        }
    }
}

#[test]
fn rebuilds_are_deterministic() {
    let pins = scatter(59, 200);
    let mut shuffled = pins.clone();
    let mut rng = StdRng::seed_from_u64(1);
    for i in (1..shuffled.len()).rev() {
        let j = rng.random_range(0..=i);
        shuffled.swap(i, j);
    }

    let a = build(pins);
    let b = build(shuffled);
    for zoom in zooms() {
        let qa = a.query(zoom, None);
        let qb = b.query(zoom, None);
        assert_eq!(qa.clusters, qb.clusters, "zoom {zoom}");
        let sa: Vec<u32> = qa.singles.iter().map(|p| p.id).collect();
        let sb: Vec<u32> = qb.singles.iter().map(|p| p.id).collect();
        assert_eq!(sa, sb, "zoom {zoom}");
    }
}

#[test]
fn cluster_centroid_lies_within_member_bounds() {
    let index = build(scatter(71, 200));
    for cluster in index.query(8.0, None).clusters {
        let leaves = index.leaves(cluster.id, usize::MAX, 0).unwrap();
        let min_lat = leaves.iter().map(|p| p.lat).fold(f64::INFINITY, f64::min);
        let max_lat = leaves.iter().map(|p| p.lat).fold(f64::NEG_INFINITY, f64::max);
        let min_lng = leaves.iter().map(|p| p.lng).fold(f64::INFINITY, f64::min);
        let max_lng = leaves.iter().map(|p| p.lng).fold(f64::NEG_INFINITY, f64::max);
        let p = cluster.position;
        assert!(p.lat >= min_lat - 1e-9 && p.lat <= max_lat + 1e-9);
        assert!(p.lng >= min_lng - 1e-9 && p.lng <= max_lng + 1e-9);
    }
}
