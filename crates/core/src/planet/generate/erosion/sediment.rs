use super::ErosionContext;
use crate::config::PlanetConfig;
use log::debug;
use rand::{seq::SliceRandom, Rng};

/// Share of `slope × rainfall` a polygon can carry off in one step
const CARRY_RATE: f64 = 0.3;
/// No single step erodes more than this share of the slope
const MAX_SLOPE_SHARE: f64 = 0.15;
/// Neighbor share for the smoothing pass after the flow
const SMOOTHING_WEIGHT: f64 = 0.2;

/// Run the sediment flow automaton. On every iteration, each wet polygon
/// (in random order) sheds some material to its lowest neighbor, which
/// keeps a share of it. Once all iterations are done, the terrain gets one
/// round of smoothing.
pub fn flow_sediment(
    heights: &mut [f64],
    rainfall: &[f64],
    context: &ErosionContext,
    rng: &mut impl Rng,
) {
    let settings = &context.config.erosion;
    let iterations = iterations(context.config);
    let mut order: Vec<usize> = (0..context.polygon_count()).collect();
    let mut eroded_total = 0.0;

    for _ in 0..iterations {
        order.shuffle(rng);
        for &polygon in &order {
            let rain = rainfall[polygon];
            if rain < settings.rainfall_threshold {
                continue;
            }
            let lowest = match context.lowest_neighbor(heights, polygon) {
                Some(lowest) => lowest,
                None => continue,
            };
            let slope = heights[polygon] - heights[lowest];
            if slope <= 0.0 {
                continue;
            }

            let eroded = settings
                .erosion_cap
                .min(CARRY_RATE * slope * rain)
                .min(MAX_SLOPE_SHARE * slope);
            heights[polygon] -= eroded;
            heights[lowest] += eroded * settings.deposition_factor;
            eroded_total += eroded;
        }
    }
    debug!(
        "Sediment flow moved {:.2} height units over {} iterations",
        eroded_total, iterations
    );

    smooth(heights, context);
}

/// Number of flow iterations to run. Stagnant-lid worlds weather half as
/// much, but still get at least one pass unless flow is disabled entirely.
fn iterations(config: &PlanetConfig) -> u32 {
    let iterations = config.erosion.iterations;
    if config.active_tectonics || iterations == 0 {
        iterations
    } else {
        (iterations / 2).max(1)
    }
}

/// One round of neighbor blending over every polygon, all reading from the
/// same snapshot
fn smooth(heights: &mut [f64], context: &ErosionContext) {
    let snapshot = heights.to_vec();
    for (polygon, height) in heights.iter_mut().enumerate() {
        *height =
            context.blend_with_neighbors(&snapshot, polygon, SMOOTHING_WEIGHT);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        planet::generate::erosion::fixture::StripWorld, util::phase_rng,
    };
    use assert_approx_eq::assert_approx_eq;

    fn flow(world: &StripWorld, heights: &mut [f64], rainfall: &[f64]) {
        let mut rng = phase_rng(0, 4);
        flow_sediment(heights, rainfall, &world.context(), &mut rng);
    }

    #[test]
    fn test_iterations() {
        let mut config = PlanetConfig::default();
        config.erosion.iterations = 5;
        assert_eq!(iterations(&config), 5);
        config.active_tectonics = false;
        assert_eq!(iterations(&config), 2);
        config.erosion.iterations = 1;
        assert_eq!(iterations(&config), 1);
        config.erosion.iterations = 0;
        assert_eq!(iterations(&config), 0);
    }

    #[test]
    fn test_flow_downhill() {
        let mut world = StripWorld::new(2);
        world.config.erosion.iterations = 1;
        let mut heights = [2.0, 0.0];
        flow(&world, &mut heights, &[1.0, 1.0]);

        // 0.3 is eroded from the top and half of it lands at the bottom,
        // then smoothing pulls the two together
        assert_approx_eq!(heights[0], 1.7 * 0.8 + 0.15 * 0.2);
        assert_approx_eq!(heights[1], 0.15 * 0.8 + 1.7 * 0.2);
    }

    #[test]
    fn test_dry_ground_only_smooths() {
        let mut world = StripWorld::new(2);
        world.config.erosion.iterations = 3;
        let mut heights = [2.0, 0.0];
        flow(&world, &mut heights, &[0.1, 0.1]);
        assert_approx_eq!(heights[0], 1.6);
        assert_approx_eq!(heights[1], 0.4);
    }

    #[test]
    fn test_flat_ground_untouched() {
        let world = StripWorld::new(6);
        let mut heights = [1.0; 6];
        flow(&world, &mut heights, &[1.5; 6]);
        for height in heights.iter() {
            assert_approx_eq!(*height, 1.0);
        }
    }

    #[test]
    fn test_erosion_wears_peaks_down() {
        let world = StripWorld::new(9);
        let mut heights = [0.0, 0.0, 0.0, 0.0, 4.0, 0.0, 0.0, 0.0, 0.0];
        flow(&world, &mut heights, &[1.0; 9]);
        assert!(heights[4] < 3.0, "peak is still {}", heights[4]);
        assert!(heights[3] > 0.0 && heights[5] > 0.0);
        // Deposition only keeps half, so material is lost overall
        assert!(heights.iter().sum::<f64>() < 4.0);
    }
}
