use super::{ErosionContext, PHASE_SEED};
use noise::NoiseFn;

/// Only polygons this close to sea level count as coast
const COAST_BAND: f64 = 0.5;
/// Coastline noise is sampled on a sphere of this radius
const NOISE_FREQUENCY: f64 = 5.0;
/// Largest height change noise can make
const NOISE_AMPLITUDE: f64 = 0.2;
/// Neighbor share for each coastal smoothing round
const SMOOTHING_WEIGHT: f64 = 0.3;

/// Roughen the coastline with a bit of noise, then smooth it back out. On a
/// stagnant-lid world there's no noise and only a single round of smoothing,
/// so coasts stay calm.
pub fn smooth_coastlines(heights: &mut [f64], context: &ErosionContext) {
    let rounds = if context.config.active_tectonics {
        roughen(heights, context);
        2
    } else {
        1
    };

    for _ in 0..rounds {
        let snapshot = heights.to_vec();
        for (polygon, height) in heights.iter_mut().enumerate() {
            if is_coastal(&snapshot, polygon, context) {
                *height = context.blend_with_neighbors(
                    &snapshot,
                    polygon,
                    SMOOTHING_WEIGHT,
                );
            }
        }
    }
}

/// Nudge every coastal polygon up or down by a little Perlin noise
fn roughen(heights: &mut [f64], context: &ErosionContext) {
    let noise = context.config.seed.phase_noise(PHASE_SEED);

    let coastal: Vec<usize> = (0..context.polygon_count())
        .filter(|&polygon| is_coastal(heights, polygon, context))
        .collect();
    for polygon in coastal {
        let point = context.polygons[polygon].direction() * NOISE_FREQUENCY;
        let value = noise.get([point.x, point.y, point.z]).clamp(-1.0, 1.0);
        heights[polygon] += value * NOISE_AMPLITUDE;
    }
}

/// Is this polygon near sea level, with water on one side and land on the
/// other?
fn is_coastal(
    heights: &[f64],
    polygon: usize,
    context: &ErosionContext,
) -> bool {
    if heights[polygon].abs() > COAST_BAND {
        return false;
    }
    let neighbors = context.adjacency.neighbors(polygon);
    neighbors.iter().any(|&neighbor| heights[neighbor] < 0.0)
        && neighbors.iter().any(|&neighbor| heights[neighbor] >= 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planet::generate::erosion::fixture::StripWorld;
    use assert_approx_eq::assert_approx_eq;

    const SHORE: [f64; 4] = [1.0, 0.2, -0.3, -1.0];

    #[test]
    fn test_is_coastal() {
        let world = StripWorld::new(4);
        let context = world.context();
        let coastal: Vec<bool> = (0..4)
            .map(|polygon| is_coastal(&SHORE, polygon, &context))
            .collect();
        assert_eq!(coastal, vec![false, true, true, false]);

        // All land, no coast
        assert!(!is_coastal(&[0.3, 0.2, 0.1, 0.0], 1, &context));
    }

    #[test]
    fn test_stagnant_lid_single_round() {
        let mut world = StripWorld::new(4);
        world.config.active_tectonics = false;
        let mut heights = SHORE;
        smooth_coastlines(&mut heights, &world.context());

        assert_approx_eq!(heights[0], 1.0);
        assert_approx_eq!(heights[1], 0.2 * 0.7 + 0.35 * 0.3);
        assert_approx_eq!(heights[2], -0.3 * 0.7 - 0.4 * 0.3);
        assert_approx_eq!(heights[3], -1.0);
    }

    #[test]
    fn test_active_roughens() {
        let world = StripWorld::new(4);
        let mut heights = SHORE;
        smooth_coastlines(&mut heights, &world.context());

        // Open water and high ground are left alone
        assert_approx_eq!(heights[0], 1.0);
        assert_approx_eq!(heights[3], -1.0);
        for (before, after) in SHORE.iter().zip(&heights).skip(1).take(2) {
            assert!((before - after).abs() < 0.6, "{} -> {}", before, after);
        }

        let mut again = SHORE;
        smooth_coastlines(&mut again, &world.context());
        assert_eq!(heights, again);
    }
}
