use crate::util;
use derive_more::Display;
use fnv::FnvHasher;
use noise::{Perlin, Seedable};
use rand_pcg::Pcg64;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::{
    fmt,
    hash::{Hash, Hasher},
};

/// Base seed of a planet. Every randomized phase draws from its own stream
/// derived from this value (see [Seed::phase_rng]), so one seed always
/// gives one planet.
///
/// A seed is either a plain number or a name. Names are hashed, which lets
/// people share planets as "kepler-b" instead of a 20-digit number. Seeds
/// serialize as strings, since neither JSON nor TOML can hold every `u64`.
#[derive(Clone, Debug, Display, PartialEq, Eq)]
pub enum Seed {
    Int(u64),
    Text(String),
}

impl Seed {
    /// Numeric form of the seed. Names go through FNV, which is stable
    /// across platforms and releases.
    pub fn to_u64(&self) -> u64 {
        match self {
            Self::Int(seed) => *seed,
            Self::Text(text) => {
                let mut hasher = FnvHasher::default();
                text.hash(&mut hasher);
                hasher.finish()
            }
        }
    }

    /// Seed of a single phase's stream
    pub fn phase_seed(&self, phase: u64) -> u64 {
        util::phase_seed(self.to_u64(), phase)
    }

    /// RNG for a single phase
    pub fn phase_rng(&self, phase: u64) -> Pcg64 {
        util::phase_rng(self.to_u64(), phase)
    }

    /// Perlin noise field for a single phase. Perlin only takes 32 bits of
    /// seed, so the phase seed is folded in half.
    pub fn phase_noise(&self, phase: u64) -> Perlin {
        let seed = self.phase_seed(phase);
        Perlin::new().set_seed((seed ^ (seed >> 32)) as u32)
    }
}

impl From<u64> for Seed {
    fn from(seed: u64) -> Self {
        Self::Int(seed)
    }
}

impl From<&str> for Seed {
    fn from(seed: &str) -> Self {
        seed.parse()
            .map(Self::Int)
            .unwrap_or_else(|_| Self::Text(seed.into()))
    }
}

impl Serialize for Seed {
    fn serialize<S: Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Seed {
    fn deserialize<D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Self, D::Error> {
        deserializer.deserialize_any(SeedVisitor)
    }
}

/// Accepts non-negative integers and strings. Serde widens every smaller
/// integer type into `u64`/`i64` for us.
struct SeedVisitor;

impl<'de> de::Visitor<'de> for SeedVisitor {
    type Value = Seed;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a non-negative integer or a name")
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Seed, E> {
        Ok(Seed::Int(value))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Seed, E> {
        if value < 0 {
            Err(E::custom(format!("seed can't be negative: {}", value)))
        } else {
            Ok(Seed::Int(value as u64))
        }
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Seed, E> {
        Ok(value.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use noise::NoiseFn;
    use rand::Rng;
    use serde_test::{
        assert_de_tokens, assert_de_tokens_error, assert_ser_tokens, Token,
    };

    #[test]
    fn test_names() {
        assert_eq!(Seed::from("1138"), Seed::Int(1138));
        assert_eq!(Seed::from("-5"), Seed::Text("-5".into()));

        let kepler = Seed::from("kepler-b");
        assert_eq!(kepler, Seed::Text("kepler-b".into()));
        assert_eq!(kepler.to_u64(), Seed::from("kepler-b").to_u64());
        assert_ne!(kepler.to_u64(), Seed::from("kepler-c").to_u64());
    }

    #[test]
    fn test_phase_streams() {
        let seed = Seed::Int(1138);
        assert_eq!(seed.phase_seed(0), 1138);
        assert_ne!(seed.phase_seed(7), seed.phase_seed(8));

        // Same phase, same stream
        let draw = |phase| {
            let mut rng = seed.phase_rng(phase);
            (0..4).map(|_| rng.gen::<u32>()).collect::<Vec<_>>()
        };
        assert_eq!(draw(7), draw(7));
        assert_ne!(draw(7), draw(8));

        let point = [0.3, 1.7, -2.2];
        assert_eq!(
            seed.phase_noise(7).get(point),
            seed.phase_noise(7).get(point)
        );
    }

    #[test]
    fn test_serde() {
        assert_ser_tokens(&Seed::Int(1138), &[Token::String("1138")]);
        assert_ser_tokens(
            &Seed::Text("kepler-b".into()),
            &[Token::String("kepler-b")],
        );

        assert_de_tokens(&Seed::Int(1138), &[Token::U16(1138)]);
        assert_de_tokens(&Seed::Int(1138), &[Token::I64(1138)]);
        assert_de_tokens(&Seed::Int(1138), &[Token::String("1138")]);
        assert_de_tokens_error::<Seed>(
            &[Token::I32(-1)],
            "seed can't be negative: -1",
        );
        assert_de_tokens_error::<Seed>(
            &[Token::Bool(true)],
            "invalid type: boolean `true`, \
            expected a non-negative integer or a name",
        );
    }
}
