use crate::util;

/// Stretch heights linearly so they span exactly `target_min..target_max`.
/// Flat terrain (or an empty target range) is left untouched.
pub fn normalize_relief(
    heights: &mut [f64],
    target_min: f64,
    target_max: f64,
) {
    let lowest = heights.iter().copied().min_by(util::cmp_partial);
    let highest = heights.iter().copied().max_by(util::cmp_partial);
    let (lowest, highest) = match (lowest, highest) {
        (Some(lowest), Some(highest)) => (lowest, highest),
        _ => return,
    };
    if highest <= lowest || target_max <= target_min {
        return;
    }

    let scale = (target_max - target_min) / (highest - lowest);
    for height in heights {
        *height = target_min + (*height - lowest) * scale;
    }
}
