use crate::{
    planet::{
        boundary::{BoundaryAnalysis, BoundaryType, PlatePair, PlateType},
        generate::{Generate, PhaseProgress, PlanetBuilder},
        plate::PlateAssignment,
    },
    progress::GenerationPhase,
    util,
};
use log::debug;
use rand::Rng;
use std::{
    cmp::Reverse,
    collections::{BTreeMap, BTreeSet},
};

/// RNG phase for boundary classification
const PHASE_SEED: u64 = 3;

/// Max number of ocean-continent rifts
const MAX_OCEAN_RIFTS: usize = 2;
/// Max number of ocean-continent subduction zones that propagate rifts behind
/// them
const MAX_PRIMARY_SUBDUCTIONS: usize = 3;

/// Decides which plates are oceanic and how every pair of adjacent plates
/// interacts
#[derive(Copy, Clone, Debug)]
pub struct BoundaryGenerator;

impl Generate for BoundaryGenerator {
    const PHASE: GenerationPhase = GenerationPhase::BoundaryDetection;

    fn generate(
        &self,
        planet: &mut PlanetBuilder,
        _progress: &mut PhaseProgress,
    ) -> anyhow::Result<()> {
        let mut rng = planet.config.phase_rng(PHASE_SEED);
        let analysis = classify_boundaries(
            planet.plates()?,
            planet.config.oceanic_plate_ratio,
            planet.config.active_tectonics,
            &mut rng,
        );
        debug!("Boundary types: {:?}", analysis.counts());
        planet.boundaries = Some(analysis);
        Ok(())
    }
}

/// Classify plates and their boundaries. See [Classifier] for the details.
fn classify_boundaries(
    plates: &PlateAssignment,
    oceanic_ratio: f64,
    active_tectonics: bool,
    rng: &mut impl Rng,
) -> BoundaryAnalysis {
    let mut classifier = Classifier::new(plates);
    let plate_types = classifier.plate_types(oceanic_ratio);
    classifier.classify_pairs(&plate_types);
    if !active_tectonics {
        classifier.stagnant_lid(rng);
    }
    BoundaryAnalysis::new(
        plate_types,
        classifier.boundaries,
        classifier.size_order,
    )
}

/// Working state for boundary classification. Every greedy choice here walks
/// plates in size order (largest first), so bigger plates get first pick.
struct Classifier<'a> {
    plates: &'a PlateAssignment,
    /// Plate indexes by descending size
    size_order: Vec<usize>,
    /// For each plate: the plate itself, then its neighbors by descending
    /// size
    ordered_adjacent: Vec<Vec<usize>>,
    boundaries: BTreeMap<PlatePair, BoundaryType>,
    /// Pairs that were classified directly, rather than propagated from a
    /// neighboring boundary
    decided: BTreeSet<PlatePair>,
}

impl<'a> Classifier<'a> {
    fn new(plates: &'a PlateAssignment) -> Self {
        let mut size_order: Vec<usize> = (0..plates.plate_count()).collect();
        // Stable sort, so ties keep the lower index first
        size_order.sort_by_key(|&plate| Reverse(plates.plate(plate).len()));

        let ordered_adjacent = (0..plates.plate_count())
            .map(|plate| {
                let adjacent = plates.adjacent_plates(plate);
                std::iter::once(plate)
                    .chain(
                        size_order
                            .iter()
                            .copied()
                            .filter(|other| adjacent.contains(other)),
                    )
                    .collect()
            })
            .collect();

        Self {
            plates,
            size_order,
            ordered_adjacent,
            boundaries: BTreeMap::new(),
            decided: BTreeSet::new(),
        }
    }

    /// Mark plates oceanic until oceanic plates cover `oceanic_ratio` of the
    /// surface. The largest plate goes first, then its neighbors from the
    /// smallest up, then the smallest plates on the planet.
    fn plate_types(&self, oceanic_ratio: f64) -> Vec<PlateType> {
        let plate_count = self.plates.plate_count();
        if oceanic_ratio <= 0.0 {
            return vec![PlateType::Continental; plate_count];
        }

        let polygon_count: usize =
            self.plates.plates().iter().map(Vec::len).sum();
        let mut oceanic = vec![false; plate_count];
        let mut ocean_polygons = 0;

        let largest = self.size_order[0];
        let candidates = self.ordered_adjacent[largest]
            .iter()
            .skip(1)
            .rev()
            .chain(self.size_order.iter().rev());
        for &plate in std::iter::once(&largest).chain(candidates) {
            if util::fraction(ocean_polygons, polygon_count) >= oceanic_ratio {
                break;
            }
            if !oceanic[plate] {
                oceanic[plate] = true;
                ocean_polygons += self.plates.plate(plate).len();
            }
        }

        oceanic
            .into_iter()
            .map(|is_oceanic| {
                if is_oceanic {
                    PlateType::Oceanic
                } else {
                    PlateType::Continental
                }
            })
            .collect()
    }

    /// Classify every adjacent pair. Oceanic plates are handled first, then
    /// continental plates extend the belts that the oceanic pass started, and
    /// anything left over is a transform boundary.
    fn classify_pairs(&mut self, plate_types: &[PlateType]) {
        let mut rifts = 0;
        let mut subductions = 0;

        for plate in 0..plate_types.len() {
            if !plate_types[plate].is_oceanic() {
                continue;
            }
            for j in 1..self.ordered_adjacent[plate].len() {
                let other = self.ordered_adjacent[plate][j];
                let pair = PlatePair::new(plate, other);
                if self.decided.contains(&pair) {
                    continue;
                }

                if plate_types[other].is_oceanic() {
                    self.decide(pair, BoundaryType::Transform);
                } else if rifts < MAX_OCEAN_RIFTS {
                    self.decide(pair, BoundaryType::Divergent);
                    rifts += 1;
                    self.propagate(plate, other, BoundaryType::Divergent);
                } else if subductions < MAX_PRIMARY_SUBDUCTIONS {
                    self.decide(pair, BoundaryType::Convergent);
                    subductions += 1;
                    // A subducting plate stretches the far side of the
                    // continent
                    self.propagate(plate, other, BoundaryType::Divergent);
                } else {
                    self.decide(pair, BoundaryType::Convergent);
                }
            }
        }

        for plate in 0..plate_types.len() {
            if plate_types[plate].is_oceanic() {
                continue;
            }
            for j in 1..self.ordered_adjacent[plate].len() {
                let other = self.ordered_adjacent[plate][j];
                let pair = PlatePair::new(plate, other);
                match self.boundaries.get(&pair).copied() {
                    Some(BoundaryType::Divergent) => {
                        self.propagate(plate, other, BoundaryType::Convergent)
                    }
                    Some(BoundaryType::Convergent) => {
                        self.propagate(plate, other, BoundaryType::Divergent)
                    }
                    _ => {}
                }
            }
        }

        for plate in 0..plate_types.len() {
            for &other in &self.ordered_adjacent[plate][1..] {
                self.boundaries
                    .entry(PlatePair::new(plate, other))
                    .or_insert(BoundaryType::Transform);
            }
        }
    }

    /// Record a direct classification. This overrides anything that was only
    /// propagated onto the pair.
    fn decide(&mut self, pair: PlatePair, boundary_type: BoundaryType) {
        self.boundaries.insert(pair, boundary_type);
        self.decided.insert(pair);
    }

    /// Carry a classification across `adjacent` to the plates on its far
    /// side, i.e. its neighbors that don't also touch `plate`. Pairs that
    /// already have a type are left alone.
    fn propagate(
        &mut self,
        plate: usize,
        adjacent: usize,
        boundary_type: BoundaryType,
    ) {
        for &opposite in self.plates.adjacent_plates(adjacent) {
            if opposite != plate && !self.plates.are_adjacent(plate, opposite)
            {
                self.boundaries
                    .entry(PlatePair::new(adjacent, opposite))
                    .or_insert(boundary_type);
            }
        }
    }

    /// Re-roll every boundary for a world without plate tectonics, where
    /// plates mostly just sit against each other
    fn stagnant_lid(&mut self, rng: &mut impl Rng) {
        for boundary_type in self.boundaries.values_mut() {
            let roll: f64 = rng.gen();
            *boundary_type = if roll < 0.65 {
                BoundaryType::Transform
            } else if roll < 0.85 {
                BoundaryType::Inactive
            } else if roll < 0.95 {
                BoundaryType::Divergent
            } else {
                BoundaryType::Convergent
            };
        }
    }
}
