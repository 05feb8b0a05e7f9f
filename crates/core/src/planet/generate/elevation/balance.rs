use crate::planet::{
    generate::elevation::{ElevationContext, TerrainState},
    height,
};
use log::{debug, warn};
use rand::Rng;

/// Water above this much over the target gets raised
const WATER_EXCESS_TOLERANCE: f64 = 0.05;
/// Water this much below the target gets lowered
const WATER_SHORTFALL_TOLERANCE: f64 = 0.01;
/// Chance for each eligible polygon to shift, per water level pass
const WATER_SHIFT_CHANCE: f64 = 0.35;

/// Nudge the sea level toward the configured water fraction. Too much water
/// raises the shallows, too little sinks the lowlands. Stops once within
/// tolerance, when a pass changes nothing, or when the iteration budget runs
/// out.
pub fn adjust_water_level(
    terrain: &mut TerrainState,
    context: &ElevationContext,
    rng: &mut impl Rng,
) {
    let target = context.config.water_fraction;
    let too_wet = |terrain: &TerrainState| {
        terrain.fraction_below(height::LOWLAND)
            > target + WATER_EXCESS_TOLERANCE
    };
    let too_dry = |terrain: &TerrainState| {
        terrain.fraction_below(height::LOWLAND)
            < target - WATER_SHORTFALL_TOLERANCE
    };

    correct(
        terrain,
        rng,
        Correction {
            label: "Water level (raise)",
            needed: &too_wet,
            eligible: &|band| {
                band == height::COASTAL || band == height::SHALLOW_OCEAN
            },
            delta: 1,
            chance: WATER_SHIFT_CHANCE,
        },
    );
    correct(
        terrain,
        rng,
        Correction {
            label: "Water level (lower)",
            needed: &too_dry,
            eligible: &|band| band == height::LOWLAND,
            delta: -1,
            chance: WATER_SHIFT_CHANCE,
        },
    );
    debug!(
        "Water fraction {:.3}, target {:.3}",
        terrain.fraction_below(height::LOWLAND),
        target
    );
}

/// Push the band histogram toward the configured terrain distribution:
/// few mountains, enough farmland, not too many hills, and not too much
/// lowland.
pub fn adjust_distribution(
    terrain: &mut TerrainState,
    context: &ElevationContext,
    rng: &mut impl Rng,
) {
    let targets = &context.config.distribution;

    correct(
        terrain,
        rng,
        Correction {
            label: "Mountain fraction",
            needed: &|terrain| {
                terrain.fraction_above(height::HILLS)
                    >= targets.max_mountain_fraction
            },
            eligible: &|band| band > height::HILLS,
            delta: -1,
            chance: targets.mountain_chance,
        },
    );
    correct(
        terrain,
        rng,
        Correction {
            label: "Farmable fraction",
            needed: &|terrain| {
                terrain.fraction_of(height::PLAINS)
                    + terrain.fraction_of(height::LOWLAND)
                    < targets.min_farmable_fraction
            },
            eligible: &|band| band == height::HILLS,
            delta: -1,
            chance: targets.farmable_chance,
        },
    );
    correct(
        terrain,
        rng,
        Correction {
            label: "Hill fraction",
            needed: &|terrain| {
                terrain.fraction_of(height::HILLS) > targets.max_hill_fraction
            },
            eligible: &|band| band == height::HILLS,
            delta: -1,
            chance: targets.hill_chance,
        },
    );
    correct(
        terrain,
        rng,
        Correction {
            label: "Lowland fraction",
            needed: &|terrain| {
                terrain.fraction_of(height::LOWLAND)
                    > targets.max_lowland_fraction
            },
            eligible: &|band| band == height::LOWLAND,
            delta: 1,
            chance: targets.lowland_chance,
        },
    );
}

/// One iterative histogram correction
struct Correction<'a> {
    label: &'a str,
    /// Is the terrain still off target?
    needed: &'a dyn Fn(&TerrainState) -> bool,
    /// Can a polygon in this band be shifted?
    eligible: &'a dyn Fn(i32) -> bool,
    /// Band change for each shifted polygon
    delta: i32,
    /// Chance for each eligible polygon to shift, per pass
    chance: f64,
}

/// Repeatedly sweep every polygon, shifting eligible ones with some chance,
/// until the correction is no longer needed. Each pass stops as soon as the
/// target is met. Gives up if a pass shifts nothing, or after `2n` passes.
fn correct(
    terrain: &mut TerrainState,
    rng: &mut impl Rng,
    correction: Correction,
) {
    let max_iterations = terrain.len() * 2;
    let mut iterations = 0;
    while (correction.needed)(terrain) {
        if iterations >= max_iterations {
            warn!(
                "{} correction hit its limit of {} passes short of target",
                correction.label, max_iterations
            );
            return;
        }

        let mut modified = 0;
        for polygon in 0..terrain.len() {
            let band = terrain.get(polygon);
            if (correction.eligible)(band)
                && rng.gen::<f64>() < correction.chance
            {
                terrain.set(polygon, band + correction.delta);
                modified += 1;
                if !(correction.needed)(terrain) {
                    break;
                }
            }
        }
        iterations += 1;

        if modified == 0 {
            debug!(
                "{} correction stalled after {} passes",
                correction.label, iterations
            );
            return;
        }
    }
    debug!("{} correction took {} passes", correction.label, iterations);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        planet::{
            adjacency::AdjacencyGraph,
            boundary::{BoundaryAnalysis, PlateType},
            plate::PlateAssignment,
        },
        util::phase_rng,
        PlanetConfig,
    };
    use std::collections::BTreeMap;

    /// Run a pass over 100 disconnected polygons on a single plate
    fn run(
        heights: Vec<i32>,
        config: PlanetConfig,
        pass: fn(&mut TerrainState, &ElevationContext, &mut rand_pcg::Pcg64),
    ) -> TerrainState {
        let adjacency = AdjacencyGraph::from_neighbors(vec![vec![]; 100]);
        let plates = PlateAssignment::new(
            vec![0; 100],
            vec![(0..100).collect()],
            &adjacency,
        );
        let boundaries = BoundaryAnalysis::new(
            vec![PlateType::Continental],
            BTreeMap::new(),
            vec![0],
        );
        let context = ElevationContext {
            config: &config,
            adjacency: &adjacency,
            plates: &plates,
            boundaries: &boundaries,
        };
        let mut terrain = TerrainState::new(heights);
        pass(&mut terrain, &context, &mut phase_rng(11, 2));
        terrain
    }

    /// `count` polygons of `band`, then plains for the rest
    fn heights(band: i32, count: usize) -> Vec<i32> {
        let mut heights = vec![band; count];
        heights.resize(100, height::PLAINS);
        heights
    }

    #[test]
    fn test_water_raised() {
        let config = PlanetConfig {
            water_fraction: 0.3,
            ..PlanetConfig::default()
        };
        let terrain = run(heights(height::COASTAL, 60), config, |t, c, r| {
            adjust_water_level(t, c, r)
        });
        let water = terrain.fraction_below(height::LOWLAND);
        assert!(water <= 0.35, "water fraction {}", water);
        assert!(water > 0.3);
    }

    #[test]
    fn test_water_lowered() {
        let config = PlanetConfig {
            water_fraction: 0.5,
            ..PlanetConfig::default()
        };
        let terrain = run(heights(height::LOWLAND, 80), config, |t, c, r| {
            adjust_water_level(t, c, r)
        });
        let water = terrain.fraction_below(height::LOWLAND);
        assert!(water >= 0.49, "water fraction {}", water);
        assert!(water < 0.51);
    }

    #[test]
    fn test_deep_water_untouched() {
        // Only deep water, so there's nothing eligible to raise
        let config = PlanetConfig {
            water_fraction: 0.1,
            ..PlanetConfig::default()
        };
        let terrain =
            run(heights(height::DEEP_OCEAN, 90), config, |t, c, r| {
                adjust_water_level(t, c, r)
            });
        assert_eq!(terrain.fraction_of(height::DEEP_OCEAN), 0.9);
    }

    #[test]
    fn test_mountains_worn_down() {
        let terrain = run(
            heights(height::HIGH_MOUNTAINS, 40),
            PlanetConfig::default(),
            |t, c, r| adjust_distribution(t, c, r),
        );
        assert!(terrain.fraction_above(height::HILLS) < 0.05);
        // Too many hills get flattened too
        assert!(terrain.fraction_of(height::HILLS) <= 0.14);
    }

    #[test]
    fn test_lowland_raised() {
        let terrain = run(
            heights(height::LOWLAND, 50),
            PlanetConfig::default(),
            |t, c, r| adjust_distribution(t, c, r),
        );
        assert!(terrain.fraction_of(height::LOWLAND) <= 0.08);
    }
}
