use crate::config::{PlanetConfig, Seed};
use derive_more::Display;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};

/// Physical properties of a planet, as produced by a star system simulation.
/// These are only used to derive a [TectonicBias].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlanetPhysics {
    /// Mass, in Earth masses
    pub mass: f64,
    /// Radius, relative to Earth's
    pub radius: f64,
    /// Surface gravity, in g
    pub surface_gravity: f64,
    /// Percentage of the surface covered by water, 0-100
    pub hydrosphere: f64,
    /// Mean surface temperature, in Kelvin
    pub surface_temperature: f64,
    /// Age of the host star, in years
    pub stellar_age: f64,
    pub gas_giant: bool,
}

/// Tectonic tendencies of a planet, derived from its physical properties.
/// Apply one to a [PlanetConfig] to get a config that generates a planet
/// that fits them.
#[derive(Clone, Debug, Display, PartialEq, Serialize, Deserialize)]
#[display(
    fmt = "plates {}-{}, oceanic ratio {:.2}, height {:.2}x, rift {:.2}x, \
        hotspots {:.2}, active tectonics: {}",
    min_plate_count,
    max_plate_count,
    oceanic_plate_ratio,
    height_multiplier,
    rift_multiplier,
    hotspot_probability,
    active_tectonics
)]
pub struct TectonicBias {
    pub min_plate_count: usize,
    pub max_plate_count: usize,
    pub oceanic_plate_ratio: f64,
    pub height_multiplier: f64,
    pub rift_multiplier: f64,
    pub hotspot_probability: f64,
    pub active_tectonics: bool,
}

impl TectonicBias {
    /// Derive the bias for a planet. Gas giants have no surface, so they get
    /// an all-zero bias.
    pub fn from_physics(physics: &PlanetPhysics) -> Self {
        if physics.gas_giant {
            return Self {
                min_plate_count: 0,
                max_plate_count: 0,
                oceanic_plate_ratio: 0.0,
                height_multiplier: 0.0,
                rift_multiplier: 0.0,
                hotspot_probability: 0.0,
                active_tectonics: false,
            };
        }

        let mass = physics.mass;
        let water = physics.hydrosphere / 100.0;
        let age_gyr = physics.stellar_age / 1e9;
        // Weaker gravity lets mountains stand taller and rifts sink deeper
        let gravity_factor = 1.0 / physics.surface_gravity.sqrt();

        let (min_plate_count, max_plate_count) = if mass < 0.3 {
            (3, 7)
        } else if mass < 0.7 {
            (5, 10)
        } else if mass < 1.5 {
            (8, 16)
        } else if mass < 3.0 {
            (12, 21)
        } else {
            // Super-Earths tend toward fewer, larger plates
            (7, 14)
        };

        let oceanic_plate_ratio = (0.5 + water * 0.4).clamp(0.3, 0.85);

        let mut height_multiplier = gravity_factor.clamp(0.5, 2.0);
        if water > 0.5 {
            height_multiplier *= 0.9;
        }

        let mut rift_multiplier = gravity_factor;
        if water > 0.3 {
            rift_multiplier *= 1.0 + water * 0.3;
        }
        let rift_multiplier = rift_multiplier.clamp(0.5, 2.0);

        let mut hotspot_probability: f64 = if age_gyr < 1.0 {
            0.25
        } else if age_gyr < 3.0 {
            0.18
        } else if age_gyr < 6.0 {
            0.12
        } else {
            0.06
        };
        if mass > 1.5 {
            hotspot_probability *= 1.3;
        } else if mass < 0.5 {
            hotspot_probability *= 0.6;
        }
        let hotspot_probability = hotspot_probability.clamp(0.02, 0.4);

        // Small, dry, old, scorching or frozen worlds end up stagnant lid
        let active_tectonics = !(mass < 0.2
            || water < 0.05
            || (age_gyr > 10.0 && mass < 1.0)
            || (physics.surface_temperature > 700.0 && water < 0.01)
            || physics.surface_temperature < 150.0);

        Self {
            min_plate_count,
            max_plate_count,
            oceanic_plate_ratio,
            height_multiplier,
            rift_multiplier,
            hotspot_probability,
            active_tectonics,
        }
    }

    pub fn earth_like() -> Self {
        Self {
            min_plate_count: 10,
            max_plate_count: 18,
            oceanic_plate_ratio: 0.65,
            height_multiplier: 1.0,
            rift_multiplier: 1.0,
            hotspot_probability: 0.12,
            active_tectonics: true,
        }
    }

    pub fn mars_like() -> Self {
        Self {
            min_plate_count: 1,
            max_plate_count: 3,
            oceanic_plate_ratio: 0.0,
            height_multiplier: 1.5,
            rift_multiplier: 0.5,
            hotspot_probability: 0.08,
            active_tectonics: false,
        }
    }

    pub fn venus_like() -> Self {
        Self {
            min_plate_count: 2,
            max_plate_count: 5,
            oceanic_plate_ratio: 0.0,
            height_multiplier: 0.9,
            rift_multiplier: 0.3,
            hotspot_probability: 0.2,
            active_tectonics: false,
        }
    }

    /// Build a config from `base` with this bias applied, using the given
    /// seed. The plate count is picked at random (from the seed) within the
    /// bias's range. Stagnant-lid worlds use the minimum plate count, build
    /// half as much relief, barely rift, and get more hotspots.
    ///
    /// Everything is clamped into the range [PlanetConfig] allows, so the
    /// result always passes validation (as long as `base` did).
    pub fn apply_to(&self, base: PlanetConfig, seed: u64) -> PlanetConfig {
        let stagnant = !self.active_tectonics || self.max_plate_count == 0;
        let config = if stagnant {
            PlanetConfig {
                seed: Seed::Int(seed),
                plate_count: self.min_plate_count.max(1),
                oceanic_plate_ratio: self.oceanic_plate_ratio,
                height_scale: self.height_multiplier * 0.5,
                rift_depth: self.rift_multiplier * 0.3,
                hotspot_probability: self.hotspot_probability * 1.5,
                active_tectonics: false,
                ..base
            }
        } else {
            let mut rng = Pcg64::seed_from_u64(seed);
            let spread = (self.max_plate_count + 1)
                .saturating_sub(self.min_plate_count)
                .max(1);
            PlanetConfig {
                seed: Seed::Int(seed),
                plate_count: self.min_plate_count + rng.gen_range(0..spread),
                oceanic_plate_ratio: self.oceanic_plate_ratio,
                height_scale: self.height_multiplier,
                rift_depth: self.rift_multiplier,
                hotspot_probability: self.hotspot_probability,
                active_tectonics: true,
                ..base
            }
        };
        clamp_to_legal(config)
    }

    /// Same as [Self::apply_to], but also sets the water fraction from a
    /// hydrosphere percentage (0-100)
    pub fn apply_with_hydrosphere(
        &self,
        base: PlanetConfig,
        seed: u64,
        hydrosphere: f64,
    ) -> PlanetConfig {
        PlanetConfig {
            water_fraction: hydrosphere.clamp(0.0, 100.0) / 100.0,
            ..self.apply_to(base, seed)
        }
    }
}

fn clamp_to_legal(config: PlanetConfig) -> PlanetConfig {
    PlanetConfig {
        plate_count: config.plate_count.clamp(7, 21),
        oceanic_plate_ratio: config.oceanic_plate_ratio.clamp(0.0, 1.0),
        height_scale: config.height_scale.max(0.5),
        rift_depth: config.rift_depth.max(0.5),
        hotspot_probability: config.hotspot_probability.clamp(0.0, 1.0),
        ..config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlanetSize;
    use assert_approx_eq::assert_approx_eq;
    use validator::Validate;

    fn earth() -> PlanetPhysics {
        PlanetPhysics {
            mass: 1.0,
            radius: 1.0,
            surface_gravity: 1.0,
            hydrosphere: 71.0,
            surface_temperature: 288.0,
            stellar_age: 4.6e9,
            gas_giant: false,
        }
    }

    #[test]
    fn test_earth_physics() {
        let bias = TectonicBias::from_physics(&earth());
        assert_eq!((bias.min_plate_count, bias.max_plate_count), (8, 16));
        assert_approx_eq!(bias.oceanic_plate_ratio, 0.5 + 0.71 * 0.4);
        assert_approx_eq!(bias.height_multiplier, 0.9);
        assert_approx_eq!(bias.rift_multiplier, 1.0 + 0.71 * 0.3);
        assert_approx_eq!(bias.hotspot_probability, 0.12);
        assert!(bias.active_tectonics);
    }

    #[test]
    fn test_gas_giant() {
        let bias = TectonicBias::from_physics(&PlanetPhysics {
            gas_giant: true,
            ..earth()
        });
        assert_eq!(bias.max_plate_count, 0);
        assert_eq!(bias.height_multiplier, 0.0);
        assert!(!bias.active_tectonics);
    }

    #[test]
    fn test_stagnant_lid_physics() {
        let stagnant = |physics: PlanetPhysics| {
            !TectonicBias::from_physics(&physics).active_tectonics
        };
        // Mars: small and dry
        assert!(stagnant(PlanetPhysics {
            mass: 0.107,
            radius: 0.53,
            surface_gravity: 0.38,
            hydrosphere: 0.0,
            surface_temperature: 210.0,
            ..earth()
        }));
        // Venus: scorching and bone dry
        assert!(stagnant(PlanetPhysics {
            hydrosphere: 0.0,
            surface_temperature: 737.0,
            ..earth()
        }));
        // Snowball
        assert!(stagnant(PlanetPhysics {
            surface_temperature: 100.0,
            ..earth()
        }));
        // Old and small
        assert!(stagnant(PlanetPhysics {
            mass: 0.8,
            stellar_age: 11e9,
            ..earth()
        }));
    }

    #[test]
    fn test_low_gravity_and_young_star() {
        let bias = TectonicBias::from_physics(&PlanetPhysics {
            mass: 0.4,
            surface_gravity: 0.16,
            hydrosphere: 20.0,
            stellar_age: 0.5e9,
            ..earth()
        });
        assert_eq!((bias.min_plate_count, bias.max_plate_count), (5, 10));
        // 1/sqrt(0.16) = 2.5, capped
        assert_approx_eq!(bias.height_multiplier, 2.0);
        assert_approx_eq!(bias.rift_multiplier, 2.0);
        assert_approx_eq!(bias.hotspot_probability, 0.25 * 0.6);
    }

    #[test]
    fn test_apply_active() {
        let base = PlanetConfig::default().with_size(PlanetSize::Duel);
        let bias = TectonicBias::earth_like();
        let config = bias.apply_to(base.clone(), 42);
        assert_eq!(config.seed, Seed::Int(42));
        assert!((10..=18).contains(&config.plate_count));
        assert_eq!(config.oceanic_plate_ratio, 0.65);
        assert!(config.active_tectonics);
        // Untouched fields carry over
        assert_eq!(config.subdivisions, base.subdivisions);
        assert_eq!(config.water_fraction, base.water_fraction);
        config.validate().unwrap();

        // Same seed, same pick
        assert_eq!(bias.apply_to(base, 42), config);
    }

    #[test]
    fn test_apply_stagnant_lid() {
        let base = PlanetConfig::default().with_size(PlanetSize::Duel);
        let config = TectonicBias::mars_like().apply_to(base, 7);
        assert!(!config.active_tectonics);
        // 1 plate is clamped up to the legal minimum
        assert_eq!(config.plate_count, 7);
        assert_approx_eq!(config.height_scale, 0.75);
        // 0.15 is clamped up to 0.5
        assert_approx_eq!(config.rift_depth, 0.5);
        assert_approx_eq!(config.hotspot_probability, 0.12);
        config.validate().unwrap();
    }

    #[test]
    fn test_apply_gas_giant() {
        let bias = TectonicBias::from_physics(&PlanetPhysics {
            gas_giant: true,
            ..earth()
        });
        let config = bias.apply_to(PlanetConfig::default(), 1);
        assert!(!config.active_tectonics);
        config.validate().unwrap();
    }

    #[test]
    fn test_apply_with_hydrosphere() {
        let bias = TectonicBias::venus_like();
        let config =
            bias.apply_with_hydrosphere(PlanetConfig::default(), 3, 40.0);
        assert_approx_eq!(config.water_fraction, 0.4);
        let config =
            bias.apply_with_hydrosphere(PlanetConfig::default(), 3, 140.0);
        assert_approx_eq!(config.water_fraction, 1.0);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            TectonicBias::earth_like().to_string(),
            "plates 10-18, oceanic ratio 0.65, height 1.00x, rift 1.00x, \
            hotspots 0.12, active tectonics: true"
        );
    }
}
