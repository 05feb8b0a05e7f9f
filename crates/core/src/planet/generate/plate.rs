use crate::{
    config::DistortionSchedule,
    planet::{
        adjacency::AdjacencyGraph,
        generate::{Generate, PhaseProgress, PlanetBuilder},
        plate::PlateAssignment,
    },
    progress::GenerationPhase,
    util,
};
use anyhow::bail;
use log::{debug, warn};
use rand::Rng;

/// RNG phase for plate assignment
const PHASE_SEED: u64 = 1;

/// Splits the planet into tectonic plates, by growing every plate outward
/// from a random seed polygon until the whole surface is claimed
#[derive(Copy, Clone, Debug)]
pub struct PlateGenerator;

impl Generate for PlateGenerator {
    const PHASE: GenerationPhase = GenerationPhase::PlateAssignment;

    fn generate(
        &self,
        planet: &mut PlanetBuilder,
        progress: &mut PhaseProgress,
    ) -> anyhow::Result<()> {
        let mut rng = planet.config.phase_rng(PHASE_SEED);
        let plates = assign_plates(
            planet.adjacency()?,
            planet.config.plate_count,
            &planet.config.distortion,
            &mut rng,
            |fraction| progress.report(fraction),
        )?;

        debug!(
            "Plate sizes: {:?}",
            plates.plates().iter().map(Vec::len).collect::<Vec<_>>()
        );
        planet.plates = Some(plates);
        Ok(())
    }
}

/// Partition the polygons into `plate_count` contiguous plates.
///
/// Seeds are placed one at a time on random unclaimed polygons, and each
/// seed's neighbors are reserved so that no two seeds touch. Then every plate
/// takes turns growing: each unclaimed neighbor of a plate's border is
/// claimed with a probability taken from the distortion schedule, based on
/// how much of the planet has been claimed so far. If growth stalls for too
/// long (e.g. the schedule has a zero probability), the leftovers are swept
/// into neighboring plates.
fn assign_plates(
    adjacency: &AdjacencyGraph,
    plate_count: usize,
    distortion: &DistortionSchedule,
    rng: &mut impl Rng,
    mut report: impl FnMut(f64),
) -> anyhow::Result<PlateAssignment> {
    let polygon_count = adjacency.len();
    if plate_count == 0 || plate_count > polygon_count {
        bail!(
            "cannot split {} polygons into {} plates",
            polygon_count,
            plate_count
        );
    }

    let mut plate_index: Vec<Option<usize>> = vec![None; polygon_count];
    let mut plates: Vec<Vec<usize>> = vec![Vec::new(); plate_count];
    // Polygons on the edge of each plate that may still have room to grow
    let mut borders: Vec<Vec<usize>> = vec![Vec::new(); plate_count];

    // Place seeds
    let mut reserved = vec![false; polygon_count];
    for plate in 0..plate_count {
        let mut candidates: Vec<usize> = (0..polygon_count)
            .filter(|&i| plate_index[i].is_none() && !reserved[i])
            .collect();
        if candidates.is_empty() {
            // Everything is reserved, so give up on keeping seeds apart
            candidates = (0..polygon_count)
                .filter(|&i| plate_index[i].is_none())
                .collect();
        }
        let seed = candidates[rng.gen_range(0..candidates.len())];

        plate_index[seed] = Some(plate);
        plates[plate].push(seed);
        borders[plate].push(seed);
        for &neighbor in adjacency.neighbors(seed) {
            reserved[neighbor] = true;
        }
    }

    // Grow plates
    let mut assigned = plate_count;
    let mut stalled_rounds = 0;
    while assigned < polygon_count {
        let assigned_before = assigned;
        for plate in 0..plate_count {
            let probability =
                distortion.value_at(util::fraction(assigned, polygon_count));
            let mut next_border = Vec::with_capacity(borders[plate].len());
            for cell in std::mem::take(&mut borders[plate]) {
                let mut still_border = false;
                for &neighbor in adjacency.neighbors(cell) {
                    if plate_index[neighbor].is_some() {
                        continue;
                    }
                    if rng.gen::<f64>() < probability {
                        plate_index[neighbor] = Some(plate);
                        plates[plate].push(neighbor);
                        next_border.push(neighbor);
                        assigned += 1;
                    } else {
                        still_border = true;
                    }
                }
                if still_border {
                    next_border.push(cell);
                }
            }
            borders[plate] = next_border;
        }
        report(util::fraction(assigned, polygon_count));

        if assigned == assigned_before {
            stalled_rounds += 1;
            if stalled_rounds >= polygon_count {
                warn!(
                    "Plate growth stalled with {} polygons unassigned",
                    polygon_count - assigned
                );
                sweep_unassigned(adjacency, &mut plate_index, &mut plates)?;
                break;
            }
        } else {
            stalled_rounds = 0;
        }
    }

    let plate_index = plate_index
        .into_iter()
        .enumerate()
        .map(|(polygon, plate)| match plate {
            Some(plate) => Ok(plate),
            None => bail!("polygon {} was never assigned", polygon),
        })
        .collect::<anyhow::Result<Vec<usize>>>()?;
    Ok(PlateAssignment::new(plate_index, plates, adjacency))
}

/// Give every unassigned polygon to the lowest-indexed plate it touches,
/// repeating until nothing is left. Fails only if some polygons can't be
/// reached from any plate at all.
fn sweep_unassigned(
    adjacency: &AdjacencyGraph,
    plate_index: &mut [Option<usize>],
    plates: &mut [Vec<usize>],
) -> anyhow::Result<()> {
    loop {
        let unassigned: Vec<usize> = (0..plate_index.len())
            .filter(|&i| plate_index[i].is_none())
            .collect();
        if unassigned.is_empty() {
            return Ok(());
        }

        let claims: Vec<(usize, usize)> = unassigned
            .iter()
            .filter_map(|&polygon| {
                adjacency
                    .neighbors(polygon)
                    .iter()
                    .filter_map(|&neighbor| plate_index[neighbor])
                    .min()
                    .map(|plate| (polygon, plate))
            })
            .collect();
        if claims.is_empty() {
            bail!("{} polygons unreachable from any plate", unassigned.len());
        }
        for (polygon, plate) in claims {
            plate_index[polygon] = Some(plate);
            plates[plate].push(polygon);
        }
    }
}
