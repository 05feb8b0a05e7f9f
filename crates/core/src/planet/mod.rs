pub mod adjacency;
pub mod biome;
pub mod boundary;
pub mod climate;
mod generate;
pub mod height;
pub mod impact;
pub mod plate;
pub mod polygon;
pub mod river;

use crate::{
    planet::{
        adjacency::AdjacencyGraph,
        biome::Biome,
        boundary::{BoundaryAnalysis, BoundaryType, PlateType},
        climate::ClimateZone,
        generate::PlanetBuilder,
        impact::ImpactFeature,
        plate::PlateAssignment,
        polygon::Polygon,
        river::River,
    },
    progress::{NoopListener, ProgressListener},
    timed,
    util, PlanetConfig,
};
use anyhow::Context;
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum::IntoEnumIterator;
use validator::Validate;

/// A fully generated planet. Holds every per-polygon output of generation,
/// as well as the config that produced it. All data is indexed by polygon
/// index, i.e. the position of the polygon in [Planet::polygons].
///
/// ## Serialization
/// Planets can be serialized through JSON (with the `json` feature) or a
/// binary format (with the `bin` feature). The binary format is currently
/// [CBOR](https://cbor.io/), but that is subject to change. Maps keyed by
/// plate pairs are flattened into lists of entries so that every format can
/// hold them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Planet {
    /// The config used to generate this planet. Generation is deterministic
    /// based on config, so this is enough to replay the run.
    config: PlanetConfig,
    polygons: Vec<Polygon>,
    adjacency: AdjacencyGraph,
    plates: PlateAssignment,
    boundaries: BoundaryAnalysis,
    /// Height bands as they were after elevation, before erosion
    base_heights: Vec<i32>,
    /// Final height bands
    heights: Vec<i32>,
    /// Final continuous heights, on the same scale as the bands
    precise_heights: Vec<f64>,
    climates: Vec<ClimateZone>,
    /// Craters and volcanoes, in the order they were placed
    impacts: Vec<ImpactFeature>,
    rainfall: Vec<f64>,
    rivers: Vec<River>,
    biomes: Vec<Biome>,
}

impl Planet {
    /// Generate a new planet with the given config. Depending on the
    /// subdivision level, this can take a few seconds. Returns an error if the
    /// config is invalid. Any other error indicates an internal bug.
    pub fn generate(config: PlanetConfig) -> anyhow::Result<Self> {
        Self::generate_with_listener(config, &mut NoopListener)
    }

    /// Generate a new planet, reporting progress to the given listener as
    /// each phase starts and finishes.
    pub fn generate_with_listener(
        config: PlanetConfig,
        listener: &mut dyn ProgressListener,
    ) -> anyhow::Result<Self> {
        info!("Generating planet with config {:#?}", config);

        config.validate().context("invalid config")?;

        let planet = timed!(
            "Planet generation",
            log::Level::Info,
            PlanetBuilder::new(config).generate_planet(listener)
        )?;
        listener.generation_completed();
        Ok(planet)
    }

    pub fn config(&self) -> &PlanetConfig {
        &self.config
    }

    /// Every polygon of the mesh. The 12 pentagons come first.
    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    pub fn adjacency(&self) -> &AdjacencyGraph {
        &self.adjacency
    }

    pub fn plates(&self) -> &PlateAssignment {
        &self.plates
    }

    pub fn boundaries(&self) -> &BoundaryAnalysis {
        &self.boundaries
    }

    /// Height bands as shaped by the elevation phase, before erosion
    pub fn base_heights(&self) -> &[i32] {
        &self.base_heights
    }

    /// Final height band of every polygon, in `[-4,4]`. See [height].
    ///
    /// [height]: crate::height
    pub fn heights(&self) -> &[i32] {
        &self.heights
    }

    /// Final continuous height of every polygon, in `[-4.0,4.0]`. Rounding
    /// one of these gives the matching entry of [Self::heights].
    pub fn precise_heights(&self) -> &[f64] {
        &self.precise_heights
    }

    pub fn climates(&self) -> &[ClimateZone] {
        &self.climates
    }

    pub fn rainfall(&self) -> &[f64] {
        &self.rainfall
    }

    pub fn rivers(&self) -> &[River] {
        &self.rivers
    }

    /// Every crater and volcano. Empty unless enabled in
    /// [ImpactConfig](crate::ImpactConfig).
    pub fn impacts(&self) -> &[ImpactFeature] {
        &self.impacts
    }

    pub fn craters(&self) -> impl Iterator<Item = &ImpactFeature> {
        self.impacts.iter().filter(|feature| feature.is_crater())
    }

    pub fn volcanoes(&self) -> impl Iterator<Item = &ImpactFeature> {
        self.impacts.iter().filter(|feature| feature.is_volcano())
    }

    pub fn biomes(&self) -> &[Biome] {
        &self.biomes
    }

    /// Number of polygons in each biome. Every biome is present, even the
    /// ones this planet doesn't have.
    pub fn biome_distribution(&self) -> BTreeMap<Biome, usize> {
        let mut counts: BTreeMap<Biome, usize> =
            Biome::iter().map(|biome| (biome, 0)).collect();
        for biome in &self.biomes {
            *counts.entry(*biome).or_default() += 1;
        }
        counts
    }

    /// Each land biome's share of all land polygons. Water biomes are left
    /// out. On a planet with no land at all, every share is 0.
    pub fn land_biome_fractions(&self) -> BTreeMap<Biome, f64> {
        let land_count =
            self.biomes.iter().filter(|biome| biome.is_land()).count();
        self.biome_distribution()
            .into_iter()
            .filter(|(biome, _)| biome.is_land())
            .map(|(biome, count)| (biome, util::fraction(count, land_count)))
            .collect()
    }

    /// Summarize this planet
    pub fn stats(&self) -> PlanetStats {
        let histogram = height::histogram(&self.heights);
        let height_bands = (height::DEEP_OCEAN..=height::HIGH_MOUNTAINS)
            .map(|band| (band, histogram[height::band_slot(band)]))
            .collect();
        let water_count = self
            .heights
            .iter()
            .filter(|band| height::is_water(**band))
            .count();

        let mut climate_zones = BTreeMap::new();
        for zone in &self.climates {
            *climate_zones.entry(*zone).or_insert(0) += 1;
        }

        PlanetStats {
            polygon_count: self.polygons.len(),
            plate_count: self.plates.plate_count(),
            oceanic_plate_count: self
                .boundaries
                .plate_types()
                .iter()
                .filter(|plate_type| **plate_type == PlateType::Oceanic)
                .count(),
            height_bands,
            water_fraction: util::fraction(water_count, self.heights.len()),
            climate_zones,
            boundary_types: self.boundaries.counts(),
            river_count: self.rivers.len(),
            frozen_river_count: self
                .rivers
                .iter()
                .filter(|river| river.is_frozen())
                .count(),
            crater_count: self.craters().count(),
            volcano_count: self.volcanoes().count(),
            biomes: self.biome_distribution(),
        }
    }

    /// Deserialize a planet from JSON. A planet can be serialized into JSON
    /// with [Planet::to_json]. Will fail if the input is malformed.
    #[cfg(feature = "json")]
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("error deserializing planet")
    }

    /// Serializes this planet into JSON. This is a recoverable format, which
    /// can be loaded back with [Planet::from_json].
    #[cfg(feature = "json")]
    pub fn to_json(&self) -> anyhow::Result<String> {
        serde_json::to_string(self).context("error serializing planet")
    }

    /// Deserialize a planet from binary format, as written by
    /// [Planet::to_bin]. Will fail if the input is malformed.
    #[cfg(feature = "bin")]
    pub fn from_bin(read: impl std::io::Read) -> anyhow::Result<Self> {
        serde_cbor::from_reader(read).context("error deserializing planet")
    }

    /// Serializes this planet into a binary format. This is a recoverable
    /// format, which can be loaded back with [Planet::from_bin].
    #[cfg(feature = "bin")]
    pub fn to_bin(&self) -> anyhow::Result<Vec<u8>> {
        let mut buffer = Vec::new();
        serde_cbor::to_writer(&mut buffer, self)
            .context("error serializing planet")?;
        Ok(buffer)
    }
}

/// Summary statistics of a generated planet
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlanetStats {
    pub polygon_count: usize,
    pub plate_count: usize,
    pub oceanic_plate_count: usize,
    /// Number of polygons in each height band
    pub height_bands: BTreeMap<i32, usize>,
    /// Fraction of polygons that are underwater
    pub water_fraction: f64,
    pub climate_zones: BTreeMap<ClimateZone, usize>,
    pub boundary_types: BTreeMap<BoundaryType, usize>,
    pub river_count: usize,
    pub frozen_river_count: usize,
    pub crater_count: usize,
    pub volcano_count: usize,
    pub biomes: BTreeMap<Biome, usize>,
}
