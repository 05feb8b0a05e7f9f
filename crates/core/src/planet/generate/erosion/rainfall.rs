use super::{ErosionContext, PHASE_SEED};
use crate::planet::{
    boundary::BoundaryType, climate::ClimateZone, polygon::Polygon,
};
use nalgebra::Vector3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;

/// How far upwind to look for mountains
const SHADOW_STEPS: usize = 5;
/// A neighbor has to line up at least this well with the wind to count as
/// upwind
const MIN_ALIGNMENT: f64 = 0.3;
/// Boost for polygons near a divergent boundary
const DIVERGENT_BOOST: f64 = 1.3;
/// Rainfall multiplier on a stagnant-lid world
const STAGNANT_LID_FACTOR: f64 = 0.3;

/// Rainfall for every polygon. Each polygon draws from its own RNG stream,
/// so its value doesn't depend on the order polygons are visited in.
pub fn compute_rainfall(heights: &[f64], context: &ErosionContext) -> Vec<f64> {
    let settings = &context.config.erosion;
    let near_divergent = divergent_proximity(context);
    let stagnant_lid_factor = if context.config.active_tectonics {
        1.0
    } else {
        STAGNANT_LID_FACTOR
    };
    let seed = context.config.seed.phase_seed(PHASE_SEED);

    (0..context.polygon_count())
        .map(|polygon| {
            let mut rng =
                Pcg64::seed_from_u64(seed.wrapping_add(polygon as u64));
            let base = base_rainfall(context.climates[polygon], &mut rng);
            // Higher ground is drier, down to 70% at the very top
            let normalized = (heights[polygon] + 4.0) / 8.0;
            let elevation_factor = (1.0 - normalized * 0.3).max(0.1);
            let divergent_boost = if near_divergent[polygon] {
                DIVERGENT_BOOST
            } else {
                1.0
            };
            base * elevation_factor
                * settings.rainfall_scale
                * stagnant_lid_factor
                * divergent_boost
                * rain_shadow(polygon, heights, context)
        })
        .collect()
}

fn base_rainfall(zone: ClimateZone, rng: &mut impl Rng) -> f64 {
    let roll: f64 = rng.gen();
    match zone {
        ClimateZone::Tropical => 1.0 + roll * 0.5,
        ClimateZone::Temperate => 0.5 + roll * 0.5,
        ClimateZone::Polar => 0.1 + roll * 0.2,
    }
}

/// Flag every polygon that borders a divergent plate boundary, plus all of
/// their neighbors
fn divergent_proximity(context: &ErosionContext) -> Vec<bool> {
    let plate_index = context.plates.plate_index();
    let touching: Vec<bool> = (0..context.polygon_count())
        .map(|polygon| {
            let plate = plate_index[polygon];
            context.adjacency.neighbors(polygon).iter().any(|&neighbor| {
                let other = plate_index[neighbor];
                other != plate
                    && context.boundaries.boundary(plate, other)
                        == Some(BoundaryType::Divergent)
            })
        })
        .collect();

    let mut near = touching.clone();
    for (polygon, _) in touching.iter().enumerate().filter(|(_, t)| **t) {
        for &neighbor in context.adjacency.neighbors(polygon) {
            near[neighbor] = true;
        }
    }
    near
}

/// The direction the prevailing wind blows at a polygon: trade winds from
/// the east near the equator, westerlies in the mid latitudes, and polar
/// easterlies near the poles
fn prevailing_wind(polygon: &Polygon) -> Vector3<f64> {
    let up = polygon.direction();
    let east = Vector3::y()
        .cross(&up)
        .try_normalize(1e-10)
        .unwrap_or_else(Vector3::x);
    let latitude = polygon.latitude().to_degrees().abs();
    if (30.0..60.0).contains(&latitude) {
        east
    } else {
        -east
    }
}

/// Multiplier for how much rain reaches a polygon past the terrain upwind of
/// it, in `[0.2, 1]`. Walks a few steps against the wind, and the higher the
/// tallest land it finds (relative to this polygon), the drier it gets.
fn rain_shadow(
    polygon: usize,
    heights: &[f64],
    context: &ErosionContext,
) -> f64 {
    let polygons = context.polygons;
    let wind = prevailing_wind(&polygons[polygon]);
    let start_height = heights[polygon];
    let mut visited = Vec::with_capacity(SHADOW_STEPS);
    let mut current = polygon;
    let mut shadow: f64 = 0.0;

    for _ in 0..SHADOW_STEPS {
        visited.push(current);
        let origin = polygons[current].center();
        let upwind = context
            .adjacency
            .neighbors(current)
            .iter()
            .copied()
            .filter(|neighbor| !visited.contains(neighbor))
            .map(|neighbor| {
                let direction = polygons[neighbor].center() - origin;
                let direction = direction.try_normalize(1e-10);
                let alignment =
                    direction.map_or(-1.0, |direction| -direction.dot(&wind));
                (neighbor, alignment)
            })
            .fold(None, |best: Option<(usize, f64)>, candidate| match best {
                Some((_, best_alignment)) if best_alignment >= candidate.1 => {
                    best
                }
                _ => Some(candidate),
            });

        match upwind {
            Some((neighbor, alignment)) if alignment >= MIN_ALIGNMENT => {
                let height = heights[neighbor];
                if height > start_height && height > 0.0 {
                    shadow = shadow.max((height - start_height) / 4.0);
                }
                current = neighbor;
            }
            _ => break,
        }
    }

    (1.0 - shadow.min(1.0) * 0.8).max(0.2)
}
