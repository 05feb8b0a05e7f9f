use log::{debug, error, info};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// The phases of planet generation, in the order they run
#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GenerationPhase {
    Mesh,
    Adjacency,
    PlateAssignment,
    BoundaryDetection,
    Elevation,
    Impact,
    Climate,
    Erosion,
    Biome,
}

impl GenerationPhase {
    /// A human-readable description of what this phase does
    pub fn description(self) -> &'static str {
        match self {
            Self::Mesh => "Building polygon mesh",
            Self::Adjacency => "Indexing polygon neighbors",
            Self::PlateAssignment => "Growing tectonic plates",
            Self::BoundaryDetection => "Classifying plate boundaries",
            Self::Elevation => "Shaping elevation",
            Self::Impact => "Placing craters and volcanoes",
            Self::Climate => "Assigning climate zones",
            Self::Erosion => "Simulating erosion and rivers",
            Self::Biome => "Classifying biomes",
        }
    }
}

/// Receives notifications as a planet is generated. Every method has a no-op
/// default, so implementors only need to override what they care about.
/// Callbacks are invoked synchronously on the generating thread.
pub trait ProgressListener {
    fn phase_started(&mut self, _phase: GenerationPhase) {}

    /// `progress` is the fraction of the phase that's complete, in `[0,1]`
    fn phase_progress(&mut self, _phase: GenerationPhase, _progress: f64) {}

    fn phase_completed(&mut self, _phase: GenerationPhase) {}

    /// The whole pipeline finished successfully
    fn generation_completed(&mut self) {}

    /// A phase failed. Generation stops after this.
    fn generation_failed(
        &mut self,
        _phase: GenerationPhase,
        _error: &anyhow::Error,
    ) {
    }
}

/// A listener that ignores everything. Used for headless generation.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoopListener;

impl ProgressListener for NoopListener {}

/// A listener that forwards every event to the `log` facade
#[derive(Copy, Clone, Debug, Default)]
pub struct LogListener;

impl ProgressListener for LogListener {
    fn phase_started(&mut self, phase: GenerationPhase) {
        info!("{}...", phase.description());
    }

    fn phase_progress(&mut self, phase: GenerationPhase, progress: f64) {
        debug!("{} {:.0}%", phase, progress * 100.0);
    }

    fn phase_completed(&mut self, phase: GenerationPhase) {
        debug!("{} complete", phase);
    }

    fn generation_completed(&mut self) {
        info!("Planet generation complete");
    }

    fn generation_failed(
        &mut self,
        phase: GenerationPhase,
        error: &anyhow::Error,
    ) {
        error!("{} failed: {:#}", phase, error);
    }
}
