use crate::{
    planet::{
        adjacency::AdjacencyGraph,
        biome::Biome,
        climate::ClimateZone,
        generate::{Generate, PhaseProgress, PlanetBuilder},
        height,
        river::River,
    },
    progress::GenerationPhase,
};
use log::debug;
use std::collections::BTreeMap;

/// Below this much rain, anything that isn't water or mountain is desert
const DESERT_RAINFALL: f64 = 0.2;
const LOW_RAINFALL: f64 = 0.4;
const MODERATE_RAINFALL: f64 = 0.6;
const HIGH_RAINFALL: f64 = 0.8;
/// Temperate lowland this wet turns to wetland
const WETLAND_RAINFALL: f64 = 0.5;

/// Classify every polygon into a biome, based on the final terrain. This has
/// to run last, since it reads the output of every other phase.
#[derive(Copy, Clone, Debug)]
pub struct BiomeGenerator;

impl Generate for BiomeGenerator {
    const PHASE: GenerationPhase = GenerationPhase::Biome;

    fn generate(
        &self,
        planet: &mut PlanetBuilder,
        _progress: &mut PhaseProgress,
    ) -> anyhow::Result<()> {
        let heights = planet.heights()?;
        let adjacency = planet.adjacency()?;
        let lakes = find_lakes(planet.rivers()?, heights, adjacency);
        let classifier = BiomeClassifier {
            heights,
            climates: planet.climates()?,
            rainfall: planet.rainfall()?,
            adjacency,
            lakes: &lakes,
        };
        let biomes: Vec<Biome> = (0..heights.len())
            .map(|polygon| classifier.classify(polygon))
            .collect();

        let mut counts: BTreeMap<Biome, usize> = BTreeMap::new();
        for biome in &biomes {
            *counts.entry(*biome).or_default() += 1;
        }
        debug!("Biomes: {:?}", counts);

        planet.biomes = Some(biomes);
        Ok(())
    }
}

/// Polygons where a river ran out of downhill before reaching the sea. The
/// water pools up there into a lake.
fn find_lakes(
    rivers: &[River],
    heights: &[i32],
    adjacency: &AdjacencyGraph,
) -> Vec<bool> {
    let mut lakes = vec![false; heights.len()];
    for river in rivers.iter().filter(|river| !river.is_frozen()) {
        if let Some(terminus) = river.terminus() {
            let landlocked = adjacency
                .with_self(terminus)
                .all(|polygon| !height::is_water(heights[polygon]));
            if landlocked {
                lakes[terminus] = true;
            }
        }
    }
    lakes
}

/// Everything needed to pick a polygon's biome
struct BiomeClassifier<'a> {
    heights: &'a [i32],
    climates: &'a [ClimateZone],
    rainfall: &'a [f64],
    adjacency: &'a AdjacencyGraph,
    lakes: &'a [bool],
}

impl<'a> BiomeClassifier<'a> {
    fn classify(&self, polygon: usize) -> Biome {
        let height = self.heights[polygon];
        let zone = self.climates[polygon];
        let rain = self.rainfall[polygon];

        if self.lakes[polygon] {
            return Biome::Freshwater;
        }
        if height <= height::OCEAN {
            return Biome::DeepOcean;
        }
        if height::is_water(height) {
            return Biome::Ocean;
        }
        if height >= height::MOUNTAINS {
            return Biome::Mountain;
        }
        if height >= height::HILLS && zone != ClimateZone::Tropical {
            return Biome::Alpine;
        }
        if height == height::LOWLAND && self.touches_water(polygon) {
            return Biome::Coastal;
        }
        if rain < DESERT_RAINFALL {
            return Biome::Desert;
        }

        let lowland = height == height::LOWLAND;
        match zone {
            ClimateZone::Polar => {
                if rain < LOW_RAINFALL {
                    Biome::IceCap
                } else if rain < MODERATE_RAINFALL {
                    Biome::Tundra
                } else {
                    Biome::BorealForest
                }
            }
            ClimateZone::Temperate => {
                if rain < LOW_RAINFALL {
                    Biome::TemperateGrassland
                } else if rain < MODERATE_RAINFALL {
                    if lowland && rain > WETLAND_RAINFALL {
                        Biome::Wetland
                    } else {
                        Biome::TemperateGrassland
                    }
                } else if rain < HIGH_RAINFALL {
                    Biome::TemperateForest
                } else {
                    Biome::TemperateRainforest
                }
            }
            ClimateZone::Tropical => {
                if rain < LOW_RAINFALL {
                    Biome::Desert
                } else if rain < MODERATE_RAINFALL {
                    Biome::Savanna
                } else if rain < HIGH_RAINFALL {
                    if lowland {
                        Biome::Wetland
                    } else {
                        Biome::Savanna
                    }
                } else {
                    Biome::TropicalRainforest
                }
            }
        }
    }

    fn touches_water(&self, polygon: usize) -> bool {
        self.adjacency
            .neighbors(polygon)
            .iter()
            .any(|&neighbor| height::is_water(self.heights[neighbor]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A row of three polygons: 0 - 1 - 2
    fn row() -> AdjacencyGraph {
        AdjacencyGraph::from_neighbors(vec![vec![1], vec![0, 2], vec![1]])
    }

    /// Classify the middle polygon of a row, with dry plains on either side
    fn middle(band: i32, zone: ClimateZone, rain: f64) -> Biome {
        let heights = [height::PLAINS, band, height::PLAINS];
        let adjacency = row();
        let classifier = BiomeClassifier {
            heights: &heights,
            climates: &[zone; 3],
            rainfall: &[rain; 3],
            adjacency: &adjacency,
            lakes: &[false; 3],
        };
        classifier.classify(1)
    }

    #[test]
    fn test_water() {
        use ClimateZone::*;
        assert_eq!(middle(height::DEEP_OCEAN, Tropical, 1.0), Biome::DeepOcean);
        assert_eq!(middle(height::OCEAN, Polar, 1.0), Biome::DeepOcean);
        assert_eq!(middle(height::COASTAL, Temperate, 1.0), Biome::Ocean);
    }

    #[test]
    fn test_high_ground() {
        use ClimateZone::*;
        assert_eq!(middle(height::MOUNTAINS, Tropical, 1.0), Biome::Mountain);
        assert_eq!(middle(height::HILLS, Polar, 0.1), Biome::Alpine);
        // Tropical hills are just dry or wet land
        assert_eq!(middle(height::HILLS, Tropical, 0.5), Biome::Savanna);
    }

    #[test]
    fn test_by_zone() {
        use ClimateZone::*;
        let plains = height::PLAINS;
        assert_eq!(middle(plains, Temperate, 0.1), Biome::Desert);
        assert_eq!(middle(plains, Polar, 0.3), Biome::IceCap);
        assert_eq!(middle(plains, Polar, 0.5), Biome::Tundra);
        assert_eq!(middle(plains, Polar, 0.9), Biome::BorealForest);
        assert_eq!(middle(plains, Temperate, 0.3), Biome::TemperateGrassland);
        assert_eq!(middle(plains, Temperate, 0.55), Biome::TemperateGrassland);
        assert_eq!(middle(plains, Temperate, 0.7), Biome::TemperateForest);
        assert_eq!(
            middle(plains, Temperate, 1.2),
            Biome::TemperateRainforest
        );
        assert_eq!(middle(plains, Tropical, 0.3), Biome::Desert);
        assert_eq!(middle(plains, Tropical, 0.7), Biome::Savanna);
        assert_eq!(middle(plains, Tropical, 1.4), Biome::TropicalRainforest);
    }

    #[test]
    fn test_wetlands() {
        use ClimateZone::*;
        let lowland = height::LOWLAND;
        assert_eq!(middle(lowland, Temperate, 0.55), Biome::Wetland);
        assert_eq!(middle(lowland, Temperate, 0.45), Biome::TemperateGrassland);
        assert_eq!(middle(lowland, Tropical, 0.7), Biome::Wetland);
    }

    #[test]
    fn test_coast_and_lakes() {
        let heights = [height::SHALLOW_OCEAN, height::LOWLAND, height::HILLS];
        let adjacency = row();
        let classifier = BiomeClassifier {
            heights: &heights,
            climates: &[ClimateZone::Temperate; 3],
            rainfall: &[0.7; 3],
            adjacency: &adjacency,
            lakes: &[false, false, true],
        };
        assert_eq!(classifier.classify(1), Biome::Coastal);
        // Lakes win over everything, even hills
        assert_eq!(classifier.classify(2), Biome::Freshwater);
    }

    #[test]
    fn test_find_lakes() {
        let adjacency = AdjacencyGraph::from_neighbors(vec![
            vec![1],
            vec![0, 2],
            vec![1, 3],
            vec![2],
        ]);
        let heights = [
            height::HILLS,
            height::PLAINS,
            height::LOWLAND,
            height::COASTAL,
        ];
        // Ends inland next to the sea: that's a river mouth, not a lake
        let to_sea = River::new(vec![0, 1, 2], vec![2.0, 1.0, 0.0], false);
        // Ends well inland
        let inland = River::new(vec![0, 1], vec![2.0, 1.0], false);
        let frozen = River::new(vec![0, 1], vec![2.0, 1.0], true);

        let lakes = find_lakes(&[to_sea], &heights, &adjacency);
        assert_eq!(lakes, vec![false; 4]);
        let lakes = find_lakes(&[inland], &heights, &adjacency);
        assert_eq!(lakes, vec![false, true, false, false]);
        let lakes = find_lakes(&[frozen], &heights, &adjacency);
        assert_eq!(lakes, vec![false; 4]);
    }
}
