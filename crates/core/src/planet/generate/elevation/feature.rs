use crate::planet::{
    boundary::PlateType,
    generate::elevation::{ElevationContext, TerrainState},
    height,
};
use fnv::FnvHashSet;
use log::debug;
use rand::Rng;

/// Meshes below this subdivision level get shorter ranges and chains
const DETAIL_THRESHOLD: u32 = 21;

/// Chance for each continental plate to get a mountain range
const MOUNTAIN_RANGE_CHANCE: f64 = 0.75;
/// Chance for each step of an island walk to leave an island behind
const ISLAND_CHANCE: f64 = 0.25;
/// Chance for a hotspot to spread to each neighbor of its edge
const HOTSPOT_SPREAD: f64 = 0.6;

/// Raise a mountain range on most continental plates. Each range is a short
/// random walk across the plate, starting somewhere flat.
pub fn raise_mountain_ranges(
    terrain: &mut TerrainState,
    context: &ElevationContext,
    rng: &mut impl Rng,
) {
    let max_length = if context.config.subdivisions < DETAIL_THRESHOLD {
        5
    } else {
        7
    };
    let mut ranges = 0;
    for plate in 0..context.plates.plate_count() {
        if context.boundaries.plate_type(plate) == PlateType::Continental
            && rng.gen::<f64>() < MOUNTAIN_RANGE_CHANCE
        {
            let length = 2 + rng.gen_range(0..max_length - 1);
            if raise_mountain_range(terrain, context, plate, length, rng) {
                ranges += 1;
            }
        }
    }
    debug!("Raised {} mountain ranges", ranges);
}

/// Walk from the first plains polygon on the plate that's surrounded by
/// plains. Each step picks the second or third open neighbor at random, which
/// keeps the range from curling back on itself. Returns false if the plate
/// has nowhere flat enough to start.
fn raise_mountain_range(
    terrain: &mut TerrainState,
    context: &ElevationContext,
    plate: usize,
    length: usize,
    rng: &mut impl Rng,
) -> bool {
    let start = context
        .plates
        .plate(plate)
        .iter()
        .copied()
        .find(|&polygon| {
            context.surrounded_by(terrain, polygon, height::PLAINS)
        });
    let start = match start {
        Some(start) => start,
        None => return false,
    };

    let mut excluded = FnvHashSet::default();
    let mut range = Vec::with_capacity(length);
    let mut current = start;
    while range.len() < length {
        range.push(current);
        excluded.insert(current);

        let skip = if rng.gen::<bool>() { 1 } else { 2 };
        let neighbors = context.adjacency.neighbors(current);
        let chosen = neighbors
            .iter()
            .copied()
            .filter(|neighbor| {
                !excluded.contains(neighbor)
                    && context.plates.plate_of(*neighbor) == plate
            })
            .nth(skip);
        let chosen = match chosen {
            Some(chosen) => chosen,
            None => break,
        };
        excluded.extend(neighbors.iter().filter(|n| **n != chosen));
        current = chosen;
    }

    for polygon in range {
        terrain.set(polygon, height::MOUNTAINS);
    }
    true
}

/// Raise a chain of islands across the largest oceanic plate. The chain is a
/// random walk through open ocean that occasionally leaves an island behind.
/// Islands are graded from mountains at the start of the chain down to
/// plains at the end.
pub fn raise_island_chain(
    terrain: &mut TerrainState,
    context: &ElevationContext,
    rng: &mut impl Rng,
) {
    let plate = match context.boundaries.largest_oceanic() {
        Some(plate) => plate,
        None => return,
    };
    let length = if context.config.subdivisions < DETAIL_THRESHOLD {
        3
    } else {
        7
    };

    let start = context.plates.plate(plate).iter().copied().find(|&polygon| {
        context.surrounded_by(terrain, polygon, height::DEEP_OCEAN)
    });
    let start = match start {
        Some(start) => start,
        None => return,
    };

    let mut excluded = FnvHashSet::default();
    let mut chain = Vec::with_capacity(length);
    let mut current = start;
    for _ in 0..context.polygon_count() {
        if chain.len() >= length {
            break;
        }
        if rng.gen::<f64>() < ISLAND_CHANCE {
            chain.push(current);
        }
        excluded.insert(current);

        // Take the first open neighbor, and close off the rest
        let mut chosen = None;
        for &neighbor in context.adjacency.neighbors(current) {
            if excluded.contains(&neighbor) {
                continue;
            }
            if chosen.is_none() {
                chosen = Some(neighbor);
            } else {
                excluded.insert(neighbor);
            }
        }
        match chosen {
            Some(next) => current = next,
            None => break,
        }
    }

    for (i, &polygon) in chain.iter().enumerate() {
        let band = match i {
            0 | 1 => height::MOUNTAINS,
            2..=4 => height::HILLS,
            _ => height::PLAINS,
        };
        terrain.set(polygon, band);
    }
    debug!("Raised island chain of {} islands", chain.len());
}

/// Roll for volcanic hotspots on every plate big enough to hold one. Large
/// plates get a second, smaller roll.
pub fn raise_hotspots(
    terrain: &mut TerrainState,
    context: &ElevationContext,
    rng: &mut impl Rng,
) {
    let probability = context.config.hotspot_probability;
    if probability <= 0.0 {
        return;
    }
    let size = usize::max(2, context.config.subdivisions as usize / 7);

    let mut hotspots = 0;
    for plate in 0..context.plates.plate_count() {
        let polygons = context.plates.plate(plate);
        if polygons.len() < size * 2 {
            continue;
        }
        let plate_type = context.boundaries.plate_type(plate);

        if rng.gen::<f64>() < probability {
            let center = polygons[rng.gen_range(0..polygons.len())];
            raise_hotspot(terrain, context, center, plate_type, size, rng);
            hotspots += 1;
        }
        if polygons.len() > 200 && rng.gen::<f64>() < probability * 0.5 {
            let center = polygons[rng.gen_range(0..polygons.len())];
            raise_hotspot(terrain, context, center, plate_type, size / 2, rng);
            hotspots += 1;
        }
    }
    debug!("Raised {} hotspots", hotspots);
}

/// Spread an irregular blob out from `center`, then raise it. Oceanic
/// hotspots only raise deep water, into hills or mountains. Continental
/// hotspots raise anything below mountains into mountains or high mountains.
fn raise_hotspot(
    terrain: &mut TerrainState,
    context: &ElevationContext,
    center: usize,
    plate_type: PlateType,
    size: usize,
    rng: &mut impl Rng,
) {
    let mut members = vec![center];
    let mut seen: FnvHashSet<usize> = members.iter().copied().collect();
    let mut frontier = vec![center];
    for _ in 0..size * 3 {
        if members.len() >= size || frontier.is_empty() {
            break;
        }
        let mut next_frontier = Vec::new();
        for &polygon in &frontier {
            for &neighbor in context.adjacency.neighbors(polygon) {
                if !seen.contains(&neighbor)
                    && rng.gen::<f64>() < HOTSPOT_SPREAD
                {
                    seen.insert(neighbor);
                    members.push(neighbor);
                    next_frontier.push(neighbor);
                }
            }
        }
        frontier = next_frontier;
    }

    for polygon in members {
        let band = terrain.get(polygon);
        match plate_type {
            PlateType::Oceanic if band <= height::OCEAN => {
                let raised = if rng.gen::<f64>() < 0.3 {
                    height::MOUNTAINS
                } else {
                    height::HILLS
                };
                terrain.set(polygon, raised);
            }
            PlateType::Continental if band < height::MOUNTAINS => {
                let raised = if rng.gen::<f64>() < 0.4 {
                    height::HIGH_MOUNTAINS
                } else {
                    height::MOUNTAINS
                };
                terrain.set(polygon, raised);
            }
            _ => {}
        }
    }
}
