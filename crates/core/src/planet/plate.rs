use crate::planet::adjacency::AdjacencyGraph;
use anyhow::{anyhow, bail};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The partition of the planet's polygons into tectonic plates. Every polygon
/// belongs to exactly one plate, and every plate is a contiguous region.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlateAssignment {
    /// Plate index for each polygon
    plate_index: Vec<usize>,
    /// Polygons in each plate, in the order they were claimed
    plates: Vec<Vec<usize>>,
    /// Plates that share at least one polygon edge with each plate. Always
    /// symmetric.
    adjacent_plates: Vec<BTreeSet<usize>>,
}

impl PlateAssignment {
    /// Assemble an assignment from the per-polygon plate index and the order
    /// polygons were claimed in. Plate adjacency is derived from every
    /// cross-plate polygon edge, so it's always complete and symmetric.
    pub(crate) fn new(
        plate_index: Vec<usize>,
        plates: Vec<Vec<usize>>,
        adjacency: &AdjacencyGraph,
    ) -> Self {
        let mut adjacent_plates = vec![BTreeSet::new(); plates.len()];
        for (polygon, &plate) in plate_index.iter().enumerate() {
            for &neighbor in adjacency.neighbors(polygon) {
                let other = plate_index[neighbor];
                if other != plate {
                    adjacent_plates[plate].insert(other);
                    adjacent_plates[other].insert(plate);
                }
            }
        }

        Self {
            plate_index,
            plates,
            adjacent_plates,
        }
    }

    /// Number of plates
    pub fn plate_count(&self) -> usize {
        self.plates.len()
    }

    /// Which plate a polygon belongs to
    pub fn plate_of(&self, polygon: usize) -> usize {
        self.plate_index[polygon]
    }

    /// Plate index for every polygon
    pub fn plate_index(&self) -> &[usize] {
        &self.plate_index
    }

    /// Every polygon in a plate
    pub fn plate(&self, plate: usize) -> &[usize] {
        &self.plates[plate]
    }

    pub fn plates(&self) -> &[Vec<usize>] {
        &self.plates
    }

    /// Every plate that borders the given plate
    pub fn adjacent_plates(&self, plate: usize) -> &BTreeSet<usize> {
        &self.adjacent_plates[plate]
    }

    /// Do these two plates share a border?
    pub fn are_adjacent(&self, a: usize, b: usize) -> bool {
        self.adjacent_plates[a].contains(&b)
    }

    /// Check that this is a proper partition of `polygon_count` polygons:
    /// every polygon in exactly one plate, both directions of the mapping in
    /// agreement, and no empty plates.
    pub fn validate(&self, polygon_count: usize) -> anyhow::Result<()> {
        if self.plate_index.len() != polygon_count {
            bail!(
                "plate index covers {} polygons, expected {}",
                self.plate_index.len(),
                polygon_count
            );
        }

        let mut seen = vec![false; polygon_count];
        for (plate, polygons) in self.plates.iter().enumerate() {
            if polygons.is_empty() {
                bail!("plate {} is empty", plate);
            }
            for &polygon in polygons {
                let slot = seen.get_mut(polygon).ok_or_else(|| {
                    anyhow!("plate {} holds unknown polygon {}", plate, polygon)
                })?;
                if *slot {
                    bail!("polygon {} is assigned more than once", polygon);
                }
                *slot = true;
                if self.plate_index[polygon] != plate {
                    bail!(
                        "polygon {} is listed in plate {} but indexed to {}",
                        polygon,
                        plate,
                        self.plate_index[polygon]
                    );
                }
            }
        }

        match seen.iter().position(|assigned| !assigned) {
            Some(polygon) => bail!("polygon {} is not assigned", polygon),
            None => Ok(()),
        }
    }
}
