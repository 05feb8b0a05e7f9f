mod seed;

pub use seed::Seed;

use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use validator::{Validate, ValidationError};

/// Configuration that defines a planet generation run. Two planets generated
/// from the same config will always be identical (provided they were generated
/// by the same version of this crate).
///
/// Every field has a sensible default, so when deserializing you only need to
/// specify the fields you want to change. Validation happens at the start of
/// [Planet::generate](crate::Planet::generate); an invalid config is rejected
/// with a descriptive error before any work is done.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
#[validate(schema(function = "validate_plate_density"))]
pub struct PlanetConfig {
    /// RNG seed used for all randomized processes. See [Seed] for the input
    /// formats this supports.
    pub seed: Seed,

    /// Subdivision level of the icosahedron, a.k.a. `n`. Each face edge is
    /// split into `n` segments, and the resulting mesh has exactly `10n²+2`
    /// polygons. See [PlanetSize] for some named presets.
    #[validate(range(min = 11, max = 32))]
    pub subdivisions: u32,

    /// Number of tectonic plates to grow.
    #[validate(range(min = 7, max = 21))]
    pub plate_count: usize,

    /// Target fraction of the surface that ends up below sea level. The water
    /// level pass nudges terrain towards this, but it's a soft target.
    #[validate(range(min = 0.0, max = 1.0))]
    pub water_fraction: f64,

    /// Target fraction of the planet's polygons that belong to oceanic plates.
    /// 0 means every plate is continental.
    #[validate(range(min = 0.0, max = 1.0))]
    pub oceanic_plate_ratio: f64,

    /// Scales uplift at plate boundaries. Anything above 1 gives a chance of an
    /// extra level of height on each affected layer: 1.5 means a 50% chance,
    /// 2.0 means always.
    #[validate(range(min = 0.5))]
    pub height_scale: f64,

    /// Same as `height_scale`, but for depressions (rifts and trenches).
    #[validate(range(min = 0.5))]
    pub rift_depth: f64,

    /// Chance that any given (sufficiently large) plate gets a volcanic
    /// hotspot.
    #[validate(range(min = 0.0, max = 1.0))]
    pub hotspot_probability: f64,

    /// Does this planet have active plate tectonics? Without it, the planet
    /// is a "stagnant lid" world: boundaries are mostly transform or inactive,
    /// rainfall is dampened and erosion is gentler.
    pub active_tectonics: bool,

    /// Config for climate zone classification
    #[validate]
    pub climate: ClimateConfig,

    /// Config for rainfall, sediment flow and rivers
    #[validate]
    pub erosion: ErosionConfig,

    /// Targets for the final height distribution
    #[validate]
    pub distribution: DistributionConfig,

    /// Controls how irregularly plates grow
    #[validate]
    pub distortion: DistortionSchedule,

    /// Config for impact craters and volcanic cones
    #[validate]
    pub impact: ImpactConfig,
}

/// Named mesh resolutions. Each maps to a subdivision level; the polygon count
/// is `10n²+2`.
#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    Display,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PlanetSize {
    /// 1,212 polygons
    Duel,
    /// 2,252 polygons
    Tiny,
    /// 3,612 polygons
    Small,
    /// 4,412 polygons
    Standard,
    /// 5,762 polygons
    Large,
    /// 6,762 polygons
    Huge,
    /// 10,242 polygons
    Colossal,
}

impl PlanetSize {
    /// The subdivision level (`n`) for this size
    pub fn subdivisions(self) -> u32 {
        match self {
            Self::Duel => 11,
            Self::Tiny => 15,
            Self::Small => 19,
            Self::Standard => 21,
            Self::Large => 24,
            Self::Huge => 26,
            Self::Colossal => 32,
        }
    }

    /// Pick a size based on a planet's physical radius, in kilometers
    pub fn from_radius_km(radius_km: f64) -> Self {
        if radius_km < 3000.0 {
            Self::Small
        } else if radius_km < 6000.0 {
            Self::Standard
        } else if radius_km < 10000.0 {
            Self::Large
        } else {
            Self::Huge
        }
    }
}

/// How polygons get bucketed into climate zones.
#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    Display,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ClimateModel {
    /// Tropical up to 30° latitude, temperate up to 60°, polar beyond
    SimpleLatitude,
    /// Bands following Earth's circulation cells: a wide tropical belt up to
    /// 25°, temperate through the subtropical highs and westerlies to 60°
    HadleyCells,
    /// No tropics at all. Temperate up to 30°, polar everything else
    IceWorld,
    /// Tropical up to 45°, temperate up to 75°, small polar caps
    TropicalWorld,
    /// One face always points at the star (along +X). Day side is tropical,
    /// the terminator is temperate, the night side is polar
    TidallyLocked,
    /// Zones by average insolation over a year, accounting for axial tilt
    Seasonal,
}

/// Configuration for climate zone classification.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ClimateConfig {
    pub model: ClimateModel,

    /// Axial tilt in degrees. Only used by [ClimateModel::Seasonal].
    #[validate(range(min = 0.0, max = 90.0))]
    pub axial_tilt: f64,

    /// Orbital phase offset in degrees, applied to the first insolation
    /// sample. Only used by [ClimateModel::Seasonal].
    pub seasonal_offset: f64,

    /// Number of points along the orbit to sample insolation at. Only used by
    /// [ClimateModel::Seasonal].
    #[validate(range(min = 4, max = 48))]
    pub seasonal_samples: u32,
}

/// Configuration for the erosion pass: rainfall, sediment flow, rivers and
/// coastline smoothing. All heights here are in band units, where one unit is
/// the difference between two adjacent height bands (e.g. plains to hills).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
#[validate(schema(function = "validate_relief_range"))]
pub struct ErosionConfig {
    /// Number of sediment flow iterations. 0 disables sediment flow (but
    /// rivers and coastline smoothing still run).
    #[validate(range(min = 0, max = 10))]
    pub iterations: u32,

    /// Global multiplier on rainfall.
    #[validate(range(min = 0.0, max = 2.0))]
    pub rainfall_scale: f64,

    /// Trace and carve rivers?
    pub rivers: bool,

    /// Polygons with less rainfall than this don't erode.
    #[validate(range(min = 0.0))]
    pub rainfall_threshold: f64,

    /// Minimum rainfall for a polygon to be a river source.
    #[validate(range(min = 0.0))]
    pub river_source_threshold: f64,

    /// Minimum height for a polygon to be a river source.
    pub river_source_elevation_min: f64,

    /// Maximum height eroded from a single polygon in a single step.
    #[validate(range(min = 0.0, max = 1.0))]
    pub erosion_cap: f64,

    /// Fraction of eroded material deposited on the downhill neighbor.
    #[validate(range(min = 0.0, max = 1.0))]
    pub deposition_factor: f64,

    /// How deep a river carves at its source. Carving tapers linearly to 0 at
    /// the mouth.
    #[validate(range(min = 0.0, max = 1.0))]
    pub river_carve_depth: f64,

    /// Erode the continuous heights from the elevation phase rather than the
    /// rounded bands. When set, the eroded relief is also stretched to span
    /// `relief_min..relief_max` at the end of the phase.
    pub continuous_heights: bool,

    /// Lowest continuous height after relief normalization
    pub relief_min: f64,

    /// Highest continuous height after relief normalization
    pub relief_max: f64,
}

/// Configuration for impact craters and volcanoes. These are stamped onto the
/// terrain between elevation and climate. With the defaults, nothing is
/// placed at all.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ImpactConfig {
    /// How cratered the surface is. 0 means no craters, 1 means craters
    /// wherever there's room for one.
    #[validate(range(min = 0.0, max = 1.0))]
    pub crater_density: f64,

    /// Multiplier on crater depth (and rim height)
    #[validate(range(min = 0.1))]
    pub crater_depth: f64,

    /// Largest crater radius, in polygon hops. The smallest is always 2.
    #[validate(range(min = 2, max = 20))]
    pub crater_max_radius: u32,

    /// Place volcanic cones along boundaries and over hotspots?
    pub volcanoes: bool,

    #[validate(range(min = 0.0, max = 1.0))]
    pub volcano_density: f64,
}

/// Targets for the final terrain height distribution. Each target comes with
/// a chance: the probability that any qualifying polygon is adjusted on a
/// single correction pass. Lower chances give more scattered corrections.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct DistributionConfig {
    /// Mountains + high mountains stay below this fraction.
    #[validate(range(min = 0.0, max = 1.0))]
    pub max_mountain_fraction: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub mountain_chance: f64,

    /// Plains + lowland are raised to at least this fraction.
    #[validate(range(min = 0.0, max = 1.0))]
    pub min_farmable_fraction: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub farmable_chance: f64,

    /// Hills stay at or below this fraction.
    #[validate(range(min = 0.0, max = 1.0))]
    pub max_hill_fraction: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub hill_chance: f64,

    /// Lowland stays at or below this fraction.
    #[validate(range(min = 0.0, max = 1.0))]
    pub max_lowland_fraction: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub lowland_chance: f64,
}

/// Progress-dependent growth probabilities for plate assignment. While the
/// fraction of assigned polygons is at or below `thresholds[i]`, each plate
/// admits a bordering polygon with probability `values[i]`. Past the last
/// threshold, the last value applies. The two lists are parallel, so they
/// must have the same length.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
#[validate(schema(function = "validate_distortion_schedule"))]
pub struct DistortionSchedule {
    pub thresholds: Vec<f64>,
    pub values: Vec<f64>,
}

impl PlanetConfig {
    /// Set the subdivision level from a named preset
    pub fn with_size(self, size: PlanetSize) -> Self {
        Self {
            subdivisions: size.subdivisions(),
            ..self
        }
    }

    /// Number of polygons in the mesh this config will generate
    pub fn polygon_count(&self) -> usize {
        let n = self.subdivisions as usize;
        10 * n * n + 2
    }

    /// The RNG for one generation phase, derived from the base seed
    pub fn phase_rng(&self, phase: u64) -> Pcg64 {
        self.seed.phase_rng(phase)
    }
}

impl DistortionSchedule {
    /// Growth probability at the given fraction of assigned polygons
    pub fn value_at(&self, progress: f64) -> f64 {
        self.thresholds
            .iter()
            .zip(&self.values)
            .find(|(threshold, _)| progress <= **threshold)
            .or_else(|| self.thresholds.iter().zip(&self.values).last())
            .map(|(_, value)| *value)
            .unwrap_or(1.0)
    }
}

impl Default for PlanetConfig {
    fn default() -> Self {
        Self {
            // Danger! This means the default will vary between calls!
            seed: Seed::Int(rand::random()),
            subdivisions: PlanetSize::Standard.subdivisions(),
            plate_count: 14,
            water_fraction: 0.66,
            oceanic_plate_ratio: 0.65,
            height_scale: 1.0,
            rift_depth: 1.0,
            hotspot_probability: 0.12,
            active_tectonics: true,
            climate: ClimateConfig::default(),
            erosion: ErosionConfig::default(),
            distribution: DistributionConfig::default(),
            distortion: DistortionSchedule::default(),
            impact: ImpactConfig::default(),
        }
    }
}

impl Default for ClimateConfig {
    fn default() -> Self {
        Self {
            model: ClimateModel::SimpleLatitude,
            axial_tilt: 23.5,
            seasonal_offset: 0.0,
            seasonal_samples: 12,
        }
    }
}

impl Default for ErosionConfig {
    fn default() -> Self {
        Self {
            iterations: 5,
            rainfall_scale: 1.0,
            rivers: true,
            rainfall_threshold: 0.3,
            river_source_threshold: 0.7,
            river_source_elevation_min: 0.5,
            erosion_cap: 0.3,
            deposition_factor: 0.5,
            river_carve_depth: 0.3,
            continuous_heights: false,
            relief_min: -4.0,
            relief_max: 4.0,
        }
    }
}

impl Default for ImpactConfig {
    fn default() -> Self {
        Self {
            crater_density: 0.0,
            crater_depth: 1.0,
            crater_max_radius: 8,
            volcanoes: false,
            volcano_density: 0.0,
        }
    }
}

impl ImpactConfig {
    /// Will the impact phase place anything at all?
    pub fn is_enabled(&self) -> bool {
        self.crater_density > 0.0
            || (self.volcanoes && self.volcano_density > 0.0)
    }
}

impl Default for DistributionConfig {
    fn default() -> Self {
        Self {
            max_mountain_fraction: 0.05,
            mountain_chance: 0.65,
            min_farmable_fraction: 0.15,
            farmable_chance: 0.75,
            max_hill_fraction: 0.14,
            hill_chance: 0.35,
            max_lowland_fraction: 0.08,
            lowland_chance: 0.35,
        }
    }
}

impl Default for DistortionSchedule {
    fn default() -> Self {
        Self {
            thresholds: vec![0.25, 0.5, 1.0],
            values: vec![0.1, 0.2, 0.7],
        }
    }
}

fn validate_plate_density(
    config: &PlanetConfig,
) -> Result<(), ValidationError> {
    // Each plate needs room to grow, otherwise seeds can't be kept apart
    if config.plate_count > config.polygon_count() / 10 {
        return Err(ValidationError::new("too_many_plates"));
    }
    Ok(())
}

fn validate_relief_range(
    erosion: &ErosionConfig,
) -> Result<(), ValidationError> {
    if erosion.relief_min >= erosion.relief_max {
        return Err(ValidationError::new("empty_relief_range"));
    }
    Ok(())
}

fn validate_distortion_schedule(
    schedule: &DistortionSchedule,
) -> Result<(), ValidationError> {
    if schedule.thresholds.is_empty()
        || schedule.thresholds.len() != schedule.values.len()
    {
        return Err(ValidationError::new("mismatched_distortion_lengths"));
    }
    if schedule
        .values
        .iter()
        .any(|value| !(0.0..=1.0).contains(value))
    {
        return Err(ValidationError::new("distortion_out_of_range"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polygon_count() {
        let config = PlanetConfig::default().with_size(PlanetSize::Duel);
        assert_eq!(config.polygon_count(), 1212);
        let config = config.with_size(PlanetSize::Colossal);
        assert_eq!(config.polygon_count(), 10242);
    }

    #[test]
    fn test_size_from_radius() {
        assert_eq!(PlanetSize::from_radius_km(2000.0), PlanetSize::Small);
        assert_eq!(PlanetSize::from_radius_km(6371.0), PlanetSize::Large);
        assert_eq!(PlanetSize::from_radius_km(3000.0), PlanetSize::Standard);
        assert_eq!(PlanetSize::from_radius_km(12000.0), PlanetSize::Huge);
    }

    #[test]
    fn test_distortion_value_at() {
        let schedule = DistortionSchedule::default();
        assert_eq!(schedule.value_at(0.0), 0.1);
        assert_eq!(schedule.value_at(0.25), 0.1);
        assert_eq!(schedule.value_at(0.3), 0.2);
        assert_eq!(schedule.value_at(0.9), 0.7);
        // Past the end, the last value sticks
        assert_eq!(schedule.value_at(1.5), 0.7);
    }

    #[test]
    fn test_default_is_valid() {
        PlanetConfig::default().validate().unwrap();
    }

    #[test]
    fn test_mismatched_distortion() {
        let schedule = DistortionSchedule {
            thresholds: vec![0.5, 1.0],
            values: vec![0.3],
        };
        assert!(schedule.validate().is_err());
    }

    #[test]
    fn test_relief_range() {
        let mut erosion = ErosionConfig::default();
        erosion.validate().unwrap();
        erosion.relief_min = 2.0;
        erosion.relief_max = 2.0;
        assert!(erosion.validate().is_err());
    }

    #[test]
    fn test_impact_enabled() {
        let mut impact = ImpactConfig::default();
        assert!(!impact.is_enabled());
        // Volcano density alone does nothing while volcanoes are off
        impact.volcano_density = 0.5;
        assert!(!impact.is_enabled());
        impact.volcanoes = true;
        assert!(impact.is_enabled());
        let craters = ImpactConfig {
            crater_density: 0.2,
            ..Default::default()
        };
        assert!(craters.is_enabled());
    }

    #[test]
    fn test_size_parse() {
        assert_eq!(
            "colossal".parse::<PlanetSize>().unwrap(),
            PlanetSize::Colossal
        );
        assert_eq!(PlanetSize::Duel.to_string(), "duel");
    }
}
