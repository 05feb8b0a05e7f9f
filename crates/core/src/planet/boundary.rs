use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum::{Display, EnumIter};

/// The crust that a plate is made of
#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PlateType {
    Oceanic,
    Continental,
}

impl PlateType {
    pub fn is_oceanic(self) -> bool {
        self == Self::Oceanic
    }
}

/// How two adjacent plates interact along their shared border.
///
/// https://en.wikipedia.org/wiki/Plate_tectonics#Types_of_plate_boundaries
#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BoundaryType {
    /// Plates moving toward each other: subduction or collision
    Convergent,
    /// Plates spreading apart: rifts and ridges
    Divergent,
    /// Plates sliding past each other
    Transform,
    /// No meaningful interaction
    Inactive,
}

/// An unordered pair of plates. The smaller index is always stored first, so
/// `(a, b)` and `(b, a)` are the same key.
#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
)]
pub struct PlatePair(usize, usize);

impl PlatePair {
    pub fn new(a: usize, b: usize) -> Self {
        if a <= b {
            Self(a, b)
        } else {
            Self(b, a)
        }
    }

    /// The lower plate index
    pub fn low(self) -> usize {
        self.0
    }

    /// The higher plate index
    pub fn high(self) -> usize {
        self.1
    }
}

/// Result of classifying plates and their borders.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundaryAnalysis {
    /// Crust type of every plate
    plate_types: Vec<PlateType>,
    /// Classification of every pair of adjacent plates
    #[serde(with = "crate::util::serde_map_as_vec")]
    boundaries: BTreeMap<PlatePair, BoundaryType>,
    /// Plate indexes by descending size. Ties keep the lower index first.
    size_order: Vec<usize>,
}

impl BoundaryAnalysis {
    pub(crate) fn new(
        plate_types: Vec<PlateType>,
        boundaries: BTreeMap<PlatePair, BoundaryType>,
        size_order: Vec<usize>,
    ) -> Self {
        Self {
            plate_types,
            boundaries,
            size_order,
        }
    }

    pub fn plate_types(&self) -> &[PlateType] {
        &self.plate_types
    }

    pub fn plate_type(&self, plate: usize) -> PlateType {
        self.plate_types[plate]
    }

    pub fn is_oceanic(&self, plate: usize) -> bool {
        self.plate_types[plate].is_oceanic()
    }

    /// Classification of the border between two plates, in either order.
    /// `None` if the plates don't touch.
    pub fn boundary(&self, a: usize, b: usize) -> Option<BoundaryType> {
        self.boundaries.get(&PlatePair::new(a, b)).copied()
    }

    pub fn boundaries(&self) -> &BTreeMap<PlatePair, BoundaryType> {
        &self.boundaries
    }

    /// Plate indexes, largest plate first
    pub fn size_order(&self) -> &[usize] {
        &self.size_order
    }

    /// The largest plate that's oceanic, if any
    pub fn largest_oceanic(&self) -> Option<usize> {
        self.size_order
            .iter()
            .copied()
            .find(|&plate| self.is_oceanic(plate))
    }

    /// Number of boundaries of each type
    pub fn counts(&self) -> BTreeMap<BoundaryType, usize> {
        let mut counts = BTreeMap::new();
        for boundary_type in self.boundaries.values() {
            *counts.entry(*boundary_type).or_insert(0) += 1;
        }
        counts
    }
}
