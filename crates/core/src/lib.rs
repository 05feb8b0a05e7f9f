//! Planetgen is a procedural planet generator. Given a seed and a handful of
//! physical knobs, it builds a Goldberg polyhedron (a sphere tiled with
//! hexagons and exactly 12 pentagons), splits it into tectonic plates,
//! classifies the plate boundaries, and derives elevation, climate, rainfall,
//! rivers and biomes for every polygon. Impact craters and volcanoes can be
//! stamped on top. Rendering and persistence are left to the
//! consumer; this crate only produces the data.
//!
//! ```no_run
//! use planetgen::{Planet, PlanetConfig};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = PlanetConfig::default();
//! let planet = Planet::generate(config)?;
//! println!("{} polygons", planet.polygons().len());
//! // From here you can display/use the planet however you like.
//! # Ok(())
//! # }
//! ```
//!
//! Generation is fully deterministic: two planets generated from the same
//! [PlanetConfig] are identical. See [PlanetConfig] for details on how
//! generation can be customized, and [TectonicBias] for deriving a config
//! from the physical properties of a planet.

mod bias;
mod config;
mod planet;
mod progress;
mod util;

pub use crate::{
    bias::{PlanetPhysics, TectonicBias},
    config::{
        ClimateConfig, ClimateModel, DistortionSchedule, DistributionConfig,
        ErosionConfig, ImpactConfig, PlanetConfig, PlanetSize, Seed,
    },
    planet::{
        adjacency::AdjacencyGraph,
        biome::{Biome, BiomeType},
        boundary::{BoundaryAnalysis, BoundaryType, PlatePair, PlateType},
        climate::ClimateZone,
        height,
        impact::{ImpactFeature, ImpactProfile},
        plate::PlateAssignment,
        polygon::Polygon,
        river::River,
        Planet, PlanetStats,
    },
    progress::{
        GenerationPhase, LogListener, NoopListener, ProgressListener,
    },
};
