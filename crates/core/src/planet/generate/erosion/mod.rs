mod coast;
mod rainfall;
mod relief;
mod river;
mod sediment;

use crate::{
    planet::{
        adjacency::AdjacencyGraph,
        boundary::BoundaryAnalysis,
        climate::ClimateZone,
        generate::{Generate, PhaseProgress, PlanetBuilder},
        height,
        plate::PlateAssignment,
        polygon::Polygon,
    },
    progress::GenerationPhase,
    util, PlanetConfig,
};
use log::debug;

/// RNG phase for erosion. Rainfall derives one stream per polygon from this
/// phase's seed, everything else shares a single stream.
const PHASE_SEED: u64 = 4;

/// Weathers the terrain produced by the elevation (and impact) phases. Starts
/// from the height bands, or from the continuous heights if
/// `continuous_heights` is enabled, and rounds back into bands at the end.
///
/// Passes, in order:
/// 1. Compute rainfall for every polygon
/// 2. Flow sediment downhill, then smooth
/// 3. Trace and carve rivers (if enabled)
/// 4. Roughen and smooth coastlines
/// 5. Stretch the relief to the configured range (continuous mode only)
#[derive(Copy, Clone, Debug)]
pub struct ErosionGenerator;

impl Generate for ErosionGenerator {
    const PHASE: GenerationPhase = GenerationPhase::Erosion;

    fn generate(
        &self,
        planet: &mut PlanetBuilder,
        progress: &mut PhaseProgress,
    ) -> anyhow::Result<()> {
        let context = ErosionContext {
            config: &planet.config,
            polygons: planet.polygons()?,
            adjacency: planet.adjacency()?,
            plates: planet.plates()?,
            boundaries: planet.boundaries()?,
            climates: planet.climates()?,
        };
        let settings = &planet.config.erosion;
        let mut heights: Vec<f64> = if settings.continuous_heights {
            planet.precise_heights()?.to_vec()
        } else {
            planet.heights()?.iter().map(|&band| band as f64).collect()
        };
        let mut rng = planet.config.phase_rng(PHASE_SEED);

        let rainfall = rainfall::compute_rainfall(&heights, &context);
        progress.report(0.25);
        sediment::flow_sediment(&mut heights, &rainfall, &context, &mut rng);
        progress.report(0.5);
        let rivers = if settings.rivers {
            river::carve_rivers(&mut heights, &rainfall, &context, &mut rng)
        } else {
            Vec::new()
        };
        progress.report(0.75);
        coast::smooth_coastlines(&mut heights, &context);
        if settings.continuous_heights {
            relief::normalize_relief(
                &mut heights,
                settings.relief_min,
                settings.relief_max,
            );
        }

        let precise_heights: Vec<f64> =
            heights.into_iter().map(height::clamp_continuous).collect();
        let heights: Vec<i32> = precise_heights
            .iter()
            .map(|height| height.round() as i32)
            .collect();
        debug!(
            "Eroded height histogram: {:?}",
            height::histogram(&heights)
        );

        planet.heights = Some(heights);
        planet.precise_heights = Some(precise_heights);
        planet.rainfall = Some(rainfall);
        planet.rivers = Some(rivers);
        Ok(())
    }
}

/// Read-only inputs shared by every erosion pass
pub struct ErosionContext<'a> {
    pub config: &'a PlanetConfig,
    pub polygons: &'a [Polygon],
    pub adjacency: &'a AdjacencyGraph,
    pub plates: &'a PlateAssignment,
    pub boundaries: &'a BoundaryAnalysis,
    pub climates: &'a [ClimateZone],
}

impl<'a> ErosionContext<'a> {
    pub fn polygon_count(&self) -> usize {
        self.adjacency.len()
    }

    /// The neighbor with the lowest height. Ties go to whichever comes first
    /// in the neighbor list.
    pub fn lowest_neighbor(
        &self,
        heights: &[f64],
        polygon: usize,
    ) -> Option<usize> {
        self.adjacency
            .neighbors(polygon)
            .iter()
            .copied()
            .min_by(|a, b| util::cmp_partial(&heights[*a], &heights[*b]))
    }

    /// A polygon's height pulled toward the mean of its neighbors. `weight`
    /// is the share the neighbors get.
    pub fn blend_with_neighbors(
        &self,
        heights: &[f64],
        polygon: usize,
        weight: f64,
    ) -> f64 {
        let neighbors = self.adjacency.neighbors(polygon);
        let own = heights[polygon];
        if neighbors.is_empty() {
            return own;
        }
        let mean = neighbors.iter().map(|&n| heights[n]).sum::<f64>()
            / neighbors.len() as f64;
        own * (1.0 - weight) + mean * weight
    }
}
