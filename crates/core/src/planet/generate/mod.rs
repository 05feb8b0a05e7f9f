mod adjacency;
mod biome;
mod boundary;
mod climate;
mod elevation;
mod erosion;
mod impact;
mod mesh;
mod plate;

use crate::{
    planet::{
        adjacency::AdjacencyGraph,
        biome::Biome,
        boundary::BoundaryAnalysis,
        climate::ClimateZone,
        generate::{
            adjacency::AdjacencyGenerator, biome::BiomeGenerator,
            boundary::BoundaryGenerator, climate::ClimateGenerator,
            elevation::ElevationGenerator, erosion::ErosionGenerator,
            impact::ImpactGenerator, mesh::MeshGenerator,
            plate::PlateGenerator,
        },
        height,
        impact::ImpactFeature,
        plate::PlateAssignment,
        polygon::Polygon,
        river::River,
        Planet,
    },
    progress::{GenerationPhase, ProgressListener},
    timed, PlanetConfig,
};
use anyhow::{anyhow, bail, Context};
use log::info;
use std::fmt::Debug;

/// A container for generating a new planet. This applies a series of
/// generators in sequence, where each one fills in one or more of the fields
/// here. Every field starts as `None`, and the getters return an error if a
/// generator tries to read something that hasn't been generated yet. That
/// makes it easy to catch bugs in the ordering of generators.
///
/// These fields are public to allow for disjoint borrowing of multiple fields
/// at once.
pub struct PlanetBuilder {
    /// Config for this run. Please **do not mutate the config**.
    pub config: PlanetConfig,
    pub polygons: Option<Vec<Polygon>>,
    pub adjacency: Option<AdjacencyGraph>,
    pub plates: Option<PlateAssignment>,
    pub boundaries: Option<BoundaryAnalysis>,
    /// Height bands as they were at the end of the elevation phase
    pub base_heights: Option<Vec<i32>>,
    pub heights: Option<Vec<i32>>,
    pub precise_heights: Option<Vec<f64>>,
    pub climates: Option<Vec<ClimateZone>>,
    pub impacts: Option<Vec<ImpactFeature>>,
    pub rainfall: Option<Vec<f64>>,
    pub rivers: Option<Vec<River>>,
    pub biomes: Option<Vec<Biome>>,
}

impl PlanetBuilder {
    pub fn new(config: PlanetConfig) -> Self {
        Self {
            config,
            polygons: None,
            adjacency: None,
            plates: None,
            boundaries: None,
            base_heights: None,
            heights: None,
            precise_heights: None,
            climates: None,
            impacts: None,
            rainfall: None,
            rivers: None,
            biomes: None,
        }
    }

    pub fn polygons(&self) -> anyhow::Result<&[Polygon]> {
        self.polygons
            .as_deref()
            .ok_or_else(|| anyhow!("polygons not initialized"))
    }

    pub fn adjacency(&self) -> anyhow::Result<&AdjacencyGraph> {
        self.adjacency
            .as_ref()
            .ok_or_else(|| anyhow!("adjacency not initialized"))
    }

    pub fn plates(&self) -> anyhow::Result<&PlateAssignment> {
        self.plates
            .as_ref()
            .ok_or_else(|| anyhow!("plates not initialized"))
    }

    pub fn boundaries(&self) -> anyhow::Result<&BoundaryAnalysis> {
        self.boundaries
            .as_ref()
            .ok_or_else(|| anyhow!("boundaries not initialized"))
    }

    pub fn heights(&self) -> anyhow::Result<&[i32]> {
        self.heights
            .as_deref()
            .ok_or_else(|| anyhow!("heights not initialized"))
    }

    pub fn precise_heights(&self) -> anyhow::Result<&[f64]> {
        self.precise_heights
            .as_deref()
            .ok_or_else(|| anyhow!("precise heights not initialized"))
    }

    pub fn climates(&self) -> anyhow::Result<&[ClimateZone]> {
        self.climates
            .as_deref()
            .ok_or_else(|| anyhow!("climates not initialized"))
    }

    pub fn rainfall(&self) -> anyhow::Result<&[f64]> {
        self.rainfall
            .as_deref()
            .ok_or_else(|| anyhow!("rainfall not initialized"))
    }

    pub fn rivers(&self) -> anyhow::Result<&[River]> {
        self.rivers
            .as_deref()
            .ok_or_else(|| anyhow!("rivers not initialized"))
    }

    /// Generate a planet by running every generation phase in sequence. Must
    /// be run from a blank slate.
    pub fn generate_planet(
        mut self,
        listener: &mut dyn ProgressListener,
    ) -> anyhow::Result<Planet> {
        // Run each generation step. The order is very important!
        self.apply_generator(MeshGenerator, listener)?;
        self.apply_generator(AdjacencyGenerator, listener)?;
        self.apply_generator(PlateGenerator, listener)?;
        self.apply_generator(BoundaryGenerator, listener)?;
        self.apply_generator(ElevationGenerator, listener)?;
        self.apply_generator(ImpactGenerator, listener)?;
        self.apply_generator(ClimateGenerator, listener)?;
        self.apply_generator(ErosionGenerator, listener)?;
        self.apply_generator(BiomeGenerator, listener)?;

        self.build()
    }

    /// A helper to run a generation step on this builder, and keep the
    /// listener informed.
    fn apply_generator<G: Debug + Generate>(
        &mut self,
        generator: G,
        listener: &mut dyn ProgressListener,
    ) -> anyhow::Result<()> {
        let phase = G::PHASE;
        listener.phase_started(phase);
        let mut progress = PhaseProgress::new(phase, listener);
        let result = timed!(
            &format!("{:?}", generator),
            generator.generate(self, &mut progress)
        )
        .with_context(|| format!("error in {:?}", generator));

        match &result {
            Ok(()) => listener.phase_completed(phase),
            Err(error) => listener.generation_failed(phase, error),
        }
        result
    }

    /// Check the integrity of every output, then move them all into the
    /// finished [Planet].
    fn build(self) -> anyhow::Result<Planet> {
        let expected = self.config.polygon_count();
        let polygon_count = self.polygons()?.len();
        if polygon_count != expected {
            bail!("expected {} polygons, got {}", expected, polygon_count);
        }
        self.plates()?.validate(polygon_count)?;
        check_len("climates", self.climates()?.len(), polygon_count)?;
        check_len("heights", self.heights()?.len(), polygon_count)?;
        check_len(
            "precise heights",
            self.precise_heights()?.len(),
            polygon_count,
        )?;
        if let Some(index) = self
            .heights()?
            .iter()
            .position(|band| *band != height::clamp_band(*band))
        {
            bail!("height band out of range at polygon {}", index);
        }

        check_len("rainfall", self.rainfall()?.len(), polygon_count)?;
        let biomes = unwrap_field(self.biomes, "biomes")?;
        check_len("biomes", biomes.len(), polygon_count)?;

        let rivers = self.rivers.unwrap_or_default();
        let impacts = self.impacts.unwrap_or_default();
        info!(
            "Generated planet with {} rivers and {} craters/volcanoes",
            rivers.len(),
            impacts.len()
        );

        Ok(Planet {
            config: self.config,
            polygons: unwrap_field(self.polygons, "polygons")?,
            adjacency: unwrap_field(self.adjacency, "adjacency")?,
            plates: unwrap_field(self.plates, "plates")?,
            boundaries: unwrap_field(self.boundaries, "boundaries")?,
            base_heights: unwrap_field(self.base_heights, "base heights")?,
            heights: unwrap_field(self.heights, "heights")?,
            precise_heights: unwrap_field(
                self.precise_heights,
                "precise heights",
            )?,
            climates: unwrap_field(self.climates, "climates")?,
            impacts,
            rainfall: unwrap_field(self.rainfall, "rainfall")?,
            rivers,
            biomes,
        })
    }
}

fn unwrap_field<T>(field: Option<T>, name: &str) -> anyhow::Result<T> {
    field.ok_or_else(|| anyhow!("{} not initialized", name))
}

fn check_len(name: &str, len: usize, expected: usize) -> anyhow::Result<()> {
    if len == expected {
        Ok(())
    } else {
        Err(anyhow!("expected {} {}, got {}", expected, name, len))
    }
}

/// Handle for a generator to report how far along it is. Bound to a single
/// phase.
pub struct PhaseProgress<'a> {
    phase: GenerationPhase,
    listener: &'a mut dyn ProgressListener,
}

impl<'a> PhaseProgress<'a> {
    fn new(
        phase: GenerationPhase,
        listener: &'a mut dyn ProgressListener,
    ) -> Self {
        Self { phase, listener }
    }

    /// Report the fraction of this phase that's done, in `[0,1]`
    pub fn report(&mut self, fraction: f64) {
        self.listener
            .phase_progress(self.phase, fraction.clamp(0.0, 1.0));
    }
}

/// A type that generates some piece of the planet. Each generator reads the
/// outputs of the generators before it from the [PlanetBuilder], and fills
/// in its own outputs. Any failure that occurs in a generator should be
/// considered an internal failure, meaning a bug in the code, rather than
/// anything invalid about the input. Config is validated before any
/// generator runs.
trait Generate {
    /// The phase this generator reports progress as
    const PHASE: GenerationPhase;

    /// Apply some generation step to the given planet
    fn generate(
        &self,
        planet: &mut PlanetBuilder,
        progress: &mut PhaseProgress,
    ) -> anyhow::Result<()>;
}
