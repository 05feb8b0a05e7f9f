use crate::planet::polygon::Polygon;
use fnv::FnvHashMap;
use serde::{Deserialize, Serialize};
use std::{collections::VecDeque, iter};

/// Which polygons border which. Built once from polygon centers, then
/// read-only for the rest of generation.
///
/// Two polygons are neighbors when their centers are close enough that they
/// must share an edge. On the mesh we build, edge-sharing centers sit roughly
/// 1.6-2.3 units apart and the closest non-neighbors are ~2.6 units apart, so
/// a fixed threshold between the two cleanly separates them at every
/// subdivision level. Neighbor lists are sorted by polygon index.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AdjacencyGraph {
    neighbors: Vec<Vec<usize>>,
}

impl AdjacencyGraph {
    /// Squared center-to-center distance below which two polygons are
    /// considered neighbors.
    pub const NEIGHBOR_DISTANCE_SQUARED: f64 = 6.0;

    /// Compare every pair of polygon centers. This is O(n²), but it only runs
    /// once per planet and n tops out around 10k.
    pub fn from_polygons(polygons: &[Polygon]) -> Self {
        let mut neighbors = vec![Vec::with_capacity(6); polygons.len()];
        for (i, a) in polygons.iter().enumerate() {
            for (j, b) in polygons.iter().enumerate().skip(i + 1) {
                let distance_squared = (a.center() - b.center()).norm_squared();
                if distance_squared < Self::NEIGHBOR_DISTANCE_SQUARED {
                    neighbors[i].push(j);
                    neighbors[j].push(i);
                }
            }
        }
        Self { neighbors }
    }

    /// Build a graph directly from neighbor lists. Mostly useful for tests
    /// that want a small hand-made topology.
    pub fn from_neighbors(neighbors: Vec<Vec<usize>>) -> Self {
        Self { neighbors }
    }

    /// Number of polygons in the graph
    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }

    /// Every neighbor of the given polygon, not including the polygon itself
    pub fn neighbors(&self, index: usize) -> &[usize] {
        &self.neighbors[index]
    }

    /// The polygon itself, followed by all its neighbors
    pub fn with_self(
        &self,
        index: usize,
    ) -> impl Iterator<Item = usize> + '_ {
        iter::once(index).chain(self.neighbors[index].iter().copied())
    }

    /// Are these two polygons neighbors?
    pub fn are_neighbors(&self, a: usize, b: usize) -> bool {
        self.neighbors[a].binary_search(&b).is_ok()
    }

    /// Every polygon at most `max_hops` steps away from `center`, paired
    /// with its hop count, in breadth-first order. The center comes first
    /// with a count of 0.
    pub fn within_hops(
        &self,
        center: usize,
        max_hops: u32,
    ) -> Vec<(usize, u32)> {
        let mut hops: FnvHashMap<usize, u32> = FnvHashMap::default();
        let mut order = Vec::new();
        let mut queue = VecDeque::new();
        hops.insert(center, 0);
        queue.push_back(center);

        while let Some(polygon) = queue.pop_front() {
            let distance = hops[&polygon];
            order.push((polygon, distance));
            if distance == max_hops {
                continue;
            }
            for &neighbor in self.neighbors(polygon) {
                if !hops.contains_key(&neighbor) {
                    hops.insert(neighbor, distance + 1);
                    queue.push_back(neighbor);
                }
            }
        }
        order
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    fn polygon_at(x: f64) -> Polygon {
        let center = Vector3::new(x, 0.0, 0.0);
        Polygon::new(center, vec![center; 6])
    }

    #[test]
    fn test_neighbors_by_distance() {
        // 0 and 1 are 2 apart (neighbors), 1 and 2 are 2 apart (neighbors),
        // 0 and 2 are 4 apart (not neighbors)
        let polygons = vec![polygon_at(0.0), polygon_at(2.0), polygon_at(4.0)];
        let graph = AdjacencyGraph::from_polygons(&polygons);
        assert_eq!(graph.len(), 3);
        assert_eq!(graph.neighbors(0), &[1]);
        assert_eq!(graph.neighbors(1), &[0, 2]);
        assert_eq!(graph.neighbors(2), &[1]);
        assert!(graph.are_neighbors(2, 1));
        assert!(!graph.are_neighbors(0, 2));
    }

    #[test]
    fn test_with_self() {
        let graph =
            AdjacencyGraph::from_neighbors(vec![vec![1, 2], vec![0], vec![0]]);
        assert_eq!(graph.with_self(0).collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(graph.with_self(2).collect::<Vec<_>>(), vec![2, 0]);
    }

    #[test]
    fn test_within_hops() {
        // A ring of 6
        let graph = AdjacencyGraph::from_neighbors(
            (0..6).map(|i| vec![(i + 5) % 6, (i + 1) % 6]).collect(),
        );
        assert_eq!(graph.within_hops(0, 0), vec![(0, 0)]);
        assert_eq!(
            graph.within_hops(0, 2),
            vec![(0, 0), (5, 1), (1, 1), (4, 2), (2, 2)]
        );
        // Past the far side, everything is in reach exactly once
        assert_eq!(graph.within_hops(3, 10).len(), 6);
    }
}
