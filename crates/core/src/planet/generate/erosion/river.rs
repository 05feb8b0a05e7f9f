use super::ErosionContext;
use crate::planet::{climate::ClimateZone, river::River};
use fnv::FnvHashSet;
use log::debug;
use rand::{seq::SliceRandom, Rng};

/// Every planet gets at least this many rivers (if it has the sources)
const MIN_RIVER_CAP: usize = 3;
/// One more river is allowed per this many polygons
const POLYGONS_PER_RIVER: usize = 500;
/// A source may not sit this far below any of its neighbors
const SOURCE_PEAK_TOLERANCE: f64 = 0.5;
/// Tracing stops once a river reaches water this deep
const TRACE_FLOOR: f64 = -1.0;
/// Sediment dropped at the mouth of a river that flows into water
const DELTA_DEPOSIT: f64 = 0.2;

/// Trace rivers from random high, wet polygons down to the sea (or until
/// they freeze), and carve a valley along each one. Returns the rivers in
/// the order they were carved.
pub fn carve_rivers(
    heights: &mut [f64],
    rainfall: &[f64],
    context: &ErosionContext,
    rng: &mut impl Rng,
) -> Vec<River> {
    let mut sources: Vec<usize> = (0..context.polygon_count())
        .filter(|&polygon| is_source(polygon, heights, rainfall, context))
        .collect();
    sources.shuffle(rng);
    let max_rivers =
        (context.polygon_count() / POLYGONS_PER_RIVER).max(MIN_RIVER_CAP);
    debug!(
        "Found {} river sources, keeping at most {} rivers",
        sources.len(),
        max_rivers
    );

    let mut rivers = Vec::new();
    for source in sources {
        if rivers.len() >= max_rivers {
            break;
        }
        let cells = trace(source, heights, context);
        // Just a source and a mouth isn't a river
        if cells.len() <= 2 {
            continue;
        }

        let profile: Vec<f64> =
            cells.iter().map(|&cell| heights[cell]).collect();
        let terminus = cells[cells.len() - 1];
        let frozen = context.climates[terminus] == ClimateZone::Polar
            && heights[terminus] > 0.0;
        carve(heights, &cells, frozen, context);
        rivers.push(River::new(cells, profile, frozen));
    }
    rivers
}

/// A river can start on any wet, elevated, unfrozen polygon that isn't
/// sitting in a hole
fn is_source(
    polygon: usize,
    heights: &[f64],
    rainfall: &[f64],
    context: &ErosionContext,
) -> bool {
    let settings = &context.config.erosion;
    let height = heights[polygon];
    rainfall[polygon] > settings.river_source_threshold
        && height > settings.river_source_elevation_min
        && context.climates[polygon] != ClimateZone::Polar
        && context
            .adjacency
            .neighbors(polygon)
            .iter()
            .all(|&neighbor| {
                heights[neighbor] <= height + SOURCE_PEAK_TOLERANCE
            })
}

/// Follow the steepest way down from a source. The walk ends when the river
/// reaches deep enough water, freezes in a polar cell, or has nowhere lower
/// to go. If it ended by running into water, that water cell is the mouth.
fn trace(
    source: usize,
    heights: &[f64],
    context: &ErosionContext,
) -> Vec<usize> {
    let mut path = Vec::new();
    let mut visited = FnvHashSet::default();
    let mut current = source;

    while heights[current] > TRACE_FLOOR && visited.insert(current) {
        path.push(current);
        if context.climates[current] == ClimateZone::Polar && path.len() > 1 {
            break;
        }
        match context.lowest_neighbor(heights, current) {
            Some(next) if heights[next] < heights[current] => current = next,
            _ => break,
        }
    }

    if !visited.contains(&current) && heights[current] < 0.0 {
        path.push(current);
    }
    path
}

/// Cut a valley along a river, deepest at the source and fading out toward
/// the mouth. Frozen rivers carve half as deep. A river that flows into
/// water builds up a small delta at its mouth.
fn carve(
    heights: &mut [f64],
    cells: &[usize],
    frozen: bool,
    context: &ErosionContext,
) {
    let depth = context.config.erosion.river_carve_depth
        * if frozen { 0.5 } else { 1.0 };
    let len = cells.len() as f64;
    for (i, &cell) in cells.iter().enumerate() {
        heights[cell] -= depth * (1.0 - i as f64 / len);
    }

    if let Some(&mouth) = cells.last() {
        if !frozen && heights[mouth] <= 0.0 {
            heights[mouth] += DELTA_DEPOSIT;
        }
    }
}
