mod balance;
mod effect;
mod feature;

use crate::{
    planet::{
        adjacency::AdjacencyGraph,
        boundary::{BoundaryAnalysis, PlateType},
        generate::{Generate, PhaseProgress, PlanetBuilder},
        height::{self, BAND_COUNT},
        plate::PlateAssignment,
    },
    progress::GenerationPhase,
    util, PlanetConfig,
};
use log::debug;

/// RNG phase for elevation
const PHASE_SEED: u64 = 2;

/// How much a polygon's continuous height leans toward its neighbors
const NEIGHBOR_BLEND: f64 = 0.3;
/// Continuous heights stay this close to their band, so that they always
/// round back to it
const MAX_BLEND_OFFSET: f64 = 0.45;

/// Shapes terrain from the plates and their boundaries. Produces the base
/// height bands, and continuous heights to go with them.
///
/// Passes, in order:
/// 1. Fill each plate with its base height (deep ocean or plains)
/// 2. Raise and sink terrain along plate boundaries
/// 3. Raise mountain ranges on continental plates
/// 4. Correct the water level toward the configured water fraction
/// 5. Raise an island chain on the largest oceanic plate
/// 6. Raise hotspots
/// 7. Correct the terrain distribution toward the configured targets
#[derive(Copy, Clone, Debug)]
pub struct ElevationGenerator;

impl Generate for ElevationGenerator {
    const PHASE: GenerationPhase = GenerationPhase::Elevation;

    fn generate(
        &self,
        planet: &mut PlanetBuilder,
        progress: &mut PhaseProgress,
    ) -> anyhow::Result<()> {
        let context = ElevationContext {
            config: &planet.config,
            adjacency: planet.adjacency()?,
            plates: planet.plates()?,
            boundaries: planet.boundaries()?,
        };
        let mut rng = planet.config.phase_rng(PHASE_SEED);

        let mut terrain = TerrainState::base_fill(&context);
        effect::apply_boundary_effects(&mut terrain, &context, &mut rng);
        progress.report(0.3);
        feature::raise_mountain_ranges(&mut terrain, &context, &mut rng);
        balance::adjust_water_level(&mut terrain, &context, &mut rng);
        progress.report(0.6);
        feature::raise_island_chain(&mut terrain, &context, &mut rng);
        feature::raise_hotspots(&mut terrain, &context, &mut rng);
        balance::adjust_distribution(&mut terrain, &context, &mut rng);
        progress.report(0.9);

        debug!("Elevation histogram: {:?}", terrain.histogram);
        let heights = terrain.into_heights();
        let precise_heights = continuous_heights(&heights, context.adjacency);

        planet.base_heights = Some(heights.clone());
        planet.heights = Some(heights);
        planet.precise_heights = Some(precise_heights);
        Ok(())
    }
}

/// Read-only inputs shared by every elevation pass
pub struct ElevationContext<'a> {
    pub config: &'a PlanetConfig,
    pub adjacency: &'a AdjacencyGraph,
    pub plates: &'a PlateAssignment,
    pub boundaries: &'a BoundaryAnalysis,
}

impl<'a> ElevationContext<'a> {
    pub fn polygon_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Do a polygon and all of its neighbors have exactly this height?
    pub fn surrounded_by(
        &self,
        terrain: &TerrainState,
        polygon: usize,
        band: i32,
    ) -> bool {
        self.adjacency
            .with_self(polygon)
            .all(|neighbor| terrain.get(neighbor) == band)
    }
}

/// The mutable state that every elevation pass works on: one height band per
/// polygon, a running histogram of those bands, and a scratch marker buffer
/// for flood fills.
pub struct TerrainState {
    heights: Vec<i32>,
    /// Number of polygons in each band, kept in sync with `heights`
    histogram: [usize; BAND_COUNT],
    marks: Vec<bool>,
}

impl TerrainState {
    pub fn new(heights: Vec<i32>) -> Self {
        let histogram = height::histogram(&heights);
        let marks = vec![false; heights.len()];
        Self {
            heights,
            histogram,
            marks,
        }
    }

    /// Oceanic plates start as deep ocean, continental plates as plains
    fn base_fill(context: &ElevationContext) -> Self {
        let heights = context
            .plates
            .plate_index()
            .iter()
            .map(|&plate| match context.boundaries.plate_type(plate) {
                PlateType::Oceanic => height::DEEP_OCEAN,
                PlateType::Continental => height::PLAINS,
            })
            .collect();
        Self::new(heights)
    }

    pub fn len(&self) -> usize {
        self.heights.len()
    }

    pub fn get(&self, polygon: usize) -> i32 {
        self.heights[polygon]
    }

    /// Set a polygon's band, clamping it into the legal range
    pub fn set(&mut self, polygon: usize, band: i32) {
        let band = height::clamp_band(band);
        let old = self.heights[polygon];
        self.histogram[height::band_slot(old)] -= 1;
        self.histogram[height::band_slot(band)] += 1;
        self.heights[polygon] = band;
    }

    /// Fraction of polygons strictly below a band
    pub fn fraction_below(&self, band: i32) -> f64 {
        let count: usize = (height::DEEP_OCEAN..band)
            .map(|b| self.histogram[height::band_slot(b)])
            .sum();
        util::fraction(count, self.len())
    }

    /// Fraction of polygons strictly above a band
    pub fn fraction_above(&self, band: i32) -> f64 {
        let count: usize = (band + 1..=height::HIGH_MOUNTAINS)
            .map(|b| self.histogram[height::band_slot(b)])
            .sum();
        util::fraction(count, self.len())
    }

    /// Fraction of polygons in exactly this band
    pub fn fraction_of(&self, band: i32) -> f64 {
        util::fraction(self.histogram[height::band_slot(band)], self.len())
    }

    pub fn clear_marks(&mut self) {
        self.marks.iter_mut().for_each(|mark| *mark = false);
    }

    pub fn mark(&mut self, polygon: usize) {
        self.marks[polygon] = true;
    }

    pub fn is_marked(&self, polygon: usize) -> bool {
        self.marks[polygon]
    }

    pub fn into_heights(self) -> Vec<i32> {
        self.heights
    }
}

/// Smooth heights for shading: each band leans toward the average of its
/// neighbors, but never far enough to round to a different band.
fn continuous_heights(
    heights: &[i32],
    adjacency: &AdjacencyGraph,
) -> Vec<f64> {
    heights
        .iter()
        .enumerate()
        .map(|(polygon, &band)| {
            let band = band as f64;
            let neighbors = adjacency.neighbors(polygon);
            if neighbors.is_empty() {
                return band;
            }
            let average = neighbors
                .iter()
                .map(|&neighbor| heights[neighbor] as f64)
                .sum::<f64>()
                / neighbors.len() as f64;
            let offset = (NEIGHBOR_BLEND * (average - band))
                .clamp(-MAX_BLEND_OFFSET, MAX_BLEND_OFFSET);
            height::clamp_continuous(band + offset)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_histogram_tracking() {
        let mut terrain = TerrainState::new(vec![
            height::DEEP_OCEAN,
            height::COASTAL,
            height::PLAINS,
            height::MOUNTAINS,
        ]);
        assert_approx_eq!(terrain.fraction_below(height::LOWLAND), 0.5);
        assert_approx_eq!(terrain.fraction_above(height::HILLS), 0.25);

        terrain.set(1, height::LOWLAND);
        terrain.set(3, 9); // Clamped
        assert_eq!(terrain.get(3), height::HIGH_MOUNTAINS);
        assert_approx_eq!(terrain.fraction_below(height::LOWLAND), 0.25);
        assert_approx_eq!(terrain.fraction_of(height::LOWLAND), 0.25);
        assert_approx_eq!(terrain.fraction_above(height::HILLS), 0.25);
        let histogram = terrain.histogram;
        assert_eq!(histogram, height::histogram(&terrain.into_heights()));
    }

    #[test]
    fn test_continuous_heights_round_to_band() {
        let adjacency = AdjacencyGraph::from_neighbors(vec![
            vec![1, 2],
            vec![0],
            vec![0],
            vec![],
        ]);
        let heights = [
            height::PLAINS,
            height::DEEP_OCEAN,
            height::HIGH_MOUNTAINS,
            height::HILLS,
        ];
        let precise = continuous_heights(&heights, &adjacency);
        for (band, value) in heights.iter().zip(&precise) {
            assert_eq!(value.round() as i32, *band);
        }
        // Neighbors average to 0, so polygon 0 leans down
        assert_approx_eq!(precise[0], 0.7);
        // Pulled hard toward plains, but capped
        assert_approx_eq!(precise[1], -3.55);
        // No neighbors, no blending
        assert_approx_eq!(precise[3], 2.0);
    }
}
