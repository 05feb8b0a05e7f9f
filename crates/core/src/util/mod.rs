use rand::SeedableRng;
use rand_pcg::Pcg64;
use std::cmp::Ordering;

/// A macro to measure the evaluation time of an expression. Wraps an
/// expression, logs how long it took, and evaluates to the expression's value.
/// The default log level is `Debug`.
#[macro_export]
macro_rules! timed {
    ($label:expr, $ex:expr) => {
        $crate::timed!($label, log::Level::Debug, $ex)
    };
    ($label:expr, $log_level:expr, $ex:expr) => {{
        let now = std::time::Instant::now();
        let value = $ex;
        let elapsed = now.elapsed();
        log::log!($log_level, "{} took {} ms", $label, elapsed.as_millis());
        value
    }};
}

/// Golden-ratio mixing constant used to spread phase numbers across the full
/// 64-bit seed space.
const PHASE_MIX: u64 = 0x9E37_79B9_7F4A_7C15;

/// Derive the seed for a single generation phase. Every stochastic phase gets
/// its own stream, so the output of one phase never depends on how many
/// random values another phase consumed.
pub fn phase_seed(seed: u64, phase: u64) -> u64 {
    seed ^ phase.wrapping_mul(PHASE_MIX)
}

/// Build the RNG for a single generation phase. See [phase_seed].
pub fn phase_rng(seed: u64, phase: u64) -> Pcg64 {
    Pcg64::seed_from_u64(phase_seed(seed, phase))
}

/// Compare two `PartialOrd` values, treating incomparable values (`NaN`) as
/// equal. Heights and rainfall never go `NaN`, so this just gives us a total
/// order to sort with.
pub fn cmp_partial<T: PartialOrd>(a: &T, b: &T) -> Ordering {
    a.partial_cmp(b).unwrap_or(Ordering::Equal)
}

/// Fraction of `part` out of `total`, with an empty total counting as 0.
pub fn fraction(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64
    }
}

// Serialize an ordered map as a list of entries instead of a map. Plate pairs
// can't be used as keys in JSON and similar formats, so we flatten the map
// into `[key, value]` pairs.
pub mod serde_map_as_vec {
    use serde::{
        ser::SerializeSeq, Deserialize, Deserializer, Serialize, Serializer,
    };
    use std::collections::BTreeMap;

    /// Serialize a map as a list of `(key, value)` tuples
    pub fn serialize<K, V, S>(
        map: &BTreeMap<K, V>,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        K: Serialize,
        V: Serialize,
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(map.len()))?;
        for entry in map {
            seq.serialize_element(&entry)?;
        }
        seq.end()
    }

    /// Deserialize a list of `(key, value)` tuples back into a map
    pub fn deserialize<'de, K, V, D>(
        deserializer: D,
    ) -> Result<BTreeMap<K, V>, D::Error>
    where
        K: Deserialize<'de> + Ord,
        V: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        let vec: Vec<(K, V)> = Vec::deserialize(deserializer)?;
        Ok(vec.into_iter().collect())
    }
}
