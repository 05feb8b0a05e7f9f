use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// High-level categories for biomes: land or water?
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BiomeType {
    Water,
    Land,
}

/// A biome is a large-scale classification of a polygon's environment. Every
/// polygon gets exactly one, based on its height, climate and rainfall.
///
/// https://en.wikipedia.org/wiki/Biome
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
pub enum Biome {
    // Water
    DeepOcean,
    Ocean,
    /// Lakes, where rivers run out of downhill before reaching the sea
    Freshwater,

    // Land
    Coastal,
    IceCap,
    Tundra,
    BorealForest,
    TemperateGrassland,
    TemperateForest,
    TemperateRainforest,
    Desert,
    Savanna,
    TropicalRainforest,
    Alpine,
    Mountain,
    Wetland,
}

impl Biome {
    /// Get this biome's high-level category
    pub fn biome_type(self) -> BiomeType {
        match self {
            Self::DeepOcean | Self::Ocean | Self::Freshwater => {
                BiomeType::Water
            }
            _ => BiomeType::Land,
        }
    }

    pub fn is_water(self) -> bool {
        self.biome_type() == BiomeType::Water
    }

    pub fn is_land(self) -> bool {
        self.biome_type() == BiomeType::Land
    }

    /// Can plants take root here?
    pub fn supports_vegetation(self) -> bool {
        matches!(
            self,
            Self::Tundra
                | Self::BorealForest
                | Self::TemperateGrassland
                | Self::TemperateForest
                | Self::TemperateRainforest
                | Self::Savanna
                | Self::TropicalRainforest
                | Self::Wetland
        )
    }

    /// How comfortable this biome is to live in, from 0 (not at all) to 1
    pub fn habitability(self) -> f64 {
        match self {
            Self::DeepOcean | Self::Ocean | Self::Freshwater => 0.0,
            Self::Coastal => 0.9,
            Self::IceCap => 0.05,
            Self::Tundra => 0.2,
            Self::BorealForest => 0.6,
            Self::TemperateGrassland => 0.95,
            Self::TemperateForest => 1.0,
            Self::TemperateRainforest => 0.85,
            Self::Desert => 0.15,
            Self::Savanna => 0.7,
            Self::TropicalRainforest => 0.5,
            Self::Alpine => 0.3,
            Self::Mountain => 0.1,
            Self::Wetland => 0.4,
        }
    }

    /// How well this biome takes to farming, from 0 to 1
    pub fn agricultural_potential(self) -> f64 {
        match self {
            Self::DeepOcean
            | Self::Ocean
            | Self::Freshwater
            | Self::IceCap
            | Self::Desert
            | Self::Mountain => 0.0,
            Self::Coastal => 0.4,
            Self::Tundra => 0.05,
            Self::BorealForest => 0.25,
            Self::TemperateGrassland => 1.0,
            Self::TemperateForest => 0.9,
            Self::TemperateRainforest => 0.6,
            Self::Savanna => 0.7,
            Self::TropicalRainforest => 0.5,
            Self::Alpine => 0.1,
            Self::Wetland => 0.3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_categories() {
        let water: Vec<Biome> =
            Biome::iter().filter(|b| b.is_water()).collect();
        assert_eq!(
            water,
            vec![Biome::DeepOcean, Biome::Ocean, Biome::Freshwater]
        );
        assert_eq!(Biome::iter().filter(|b| b.is_land()).count(), 13);
        // Nothing grows underwater (as far as we're concerned)
        assert!(water.iter().all(|b| !b.supports_vegetation()));
        assert!(!Biome::Desert.supports_vegetation());
        assert!(Biome::Wetland.supports_vegetation());
    }

    #[test]
    fn test_scores_in_range() {
        for biome in Biome::iter() {
            assert!((0.0..=1.0).contains(&biome.habitability()), "{}", biome);
            assert!(
                (0.0..=1.0).contains(&biome.agricultural_potential()),
                "{}",
                biome
            );
            if biome.is_water() {
                assert_eq!(biome.habitability(), 0.0);
            }
        }
        assert_eq!(Biome::TemperateForest.habitability(), 1.0);
        assert_eq!(Biome::TemperateGrassland.agricultural_potential(), 1.0);
    }
}
