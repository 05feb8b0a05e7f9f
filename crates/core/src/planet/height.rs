//! Height bands. Every polygon's coarse height is one of nine integer bands,
//! from [DEEP_OCEAN] up to [HIGH_MOUNTAINS]. Anything below [LOWLAND] is
//! underwater. Continuous heights use the same scale, so a continuous height
//! of 1.3 is a bit above plains.

pub const DEEP_OCEAN: i32 = -4;
pub const OCEAN: i32 = -3;
pub const SHALLOW_OCEAN: i32 = -2;
pub const COASTAL: i32 = -1;
pub const LOWLAND: i32 = 0;
pub const PLAINS: i32 = 1;
pub const HILLS: i32 = 2;
pub const MOUNTAINS: i32 = 3;
pub const HIGH_MOUNTAINS: i32 = 4;

/// Number of distinct bands
pub const BAND_COUNT: usize = (HIGH_MOUNTAINS - DEEP_OCEAN + 1) as usize;

/// Clamp a height into the legal band range
pub fn clamp_band(height: i32) -> i32 {
    height.clamp(DEEP_OCEAN, HIGH_MOUNTAINS)
}

/// Clamp a continuous height into the legal band range
pub fn clamp_continuous(height: f64) -> f64 {
    height.clamp(DEEP_OCEAN as f64, HIGH_MOUNTAINS as f64)
}

/// Position of a (legal) band within a `[_; BAND_COUNT]` histogram
pub fn band_slot(height: i32) -> usize {
    (clamp_band(height) - DEEP_OCEAN) as usize
}

/// Is this band underwater?
pub fn is_water(height: i32) -> bool {
    height < LOWLAND
}

/// Count how many polygons fall into each band. Index with [band_slot].
pub fn histogram(heights: &[i32]) -> [usize; BAND_COUNT] {
    let mut counts = [0; BAND_COUNT];
    for &height in heights {
        counts[band_slot(height)] += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp() {
        assert_eq!(clamp_band(-7), DEEP_OCEAN);
        assert_eq!(clamp_band(HILLS), HILLS);
        assert_eq!(clamp_band(9), HIGH_MOUNTAINS);
        assert_eq!(clamp_continuous(4.2), 4.0);
    }

    #[test]
    fn test_histogram() {
        let counts = histogram(&[DEEP_OCEAN, PLAINS, PLAINS, HIGH_MOUNTAINS]);
        assert_eq!(counts[band_slot(DEEP_OCEAN)], 1);
        assert_eq!(counts[band_slot(PLAINS)], 2);
        assert_eq!(counts[band_slot(HIGH_MOUNTAINS)], 1);
        assert_eq!(counts.iter().sum::<usize>(), 4);
    }
}
