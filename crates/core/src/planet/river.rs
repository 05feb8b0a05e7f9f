use serde::{Deserialize, Serialize};

/// A river traced downhill across the planet's surface.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct River {
    /// Polygons along the river, from source to terminus
    cells: Vec<usize>,
    /// Continuous height of each cell when the river was traced, before the
    /// valley was carved
    profile: Vec<f64>,
    /// Does this river end in ice rather than water?
    frozen: bool,
}

impl River {
    pub(crate) fn new(
        cells: Vec<usize>,
        profile: Vec<f64>,
        frozen: bool,
    ) -> Self {
        Self {
            cells,
            profile,
            frozen,
        }
    }

    pub fn cells(&self) -> &[usize] {
        &self.cells
    }

    pub fn profile(&self) -> &[f64] {
        &self.profile
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn source(&self) -> Option<usize> {
        self.cells.first().copied()
    }

    pub fn terminus(&self) -> Option<usize> {
        self.cells.last().copied()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
