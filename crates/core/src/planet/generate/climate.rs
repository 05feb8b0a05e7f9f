use crate::{
    config::{ClimateConfig, ClimateModel},
    planet::{
        climate::ClimateZone,
        generate::{Generate, PhaseProgress, PlanetBuilder},
        polygon::Polygon,
    },
    progress::GenerationPhase,
};
use log::debug;
use std::{collections::BTreeMap, f64::consts::TAU};

/// Buckets every polygon into a climate zone. Purely geometric: the zone
/// depends only on where the polygon sits on the sphere, never on terrain.
#[derive(Copy, Clone, Debug)]
pub struct ClimateGenerator;

impl Generate for ClimateGenerator {
    const PHASE: GenerationPhase = GenerationPhase::Climate;

    fn generate(
        &self,
        planet: &mut PlanetBuilder,
        _progress: &mut PhaseProgress,
    ) -> anyhow::Result<()> {
        let classifier = Classifier::new(&planet.config.climate);
        let climates: Vec<ClimateZone> = planet
            .polygons()?
            .iter()
            .map(|polygon| classifier.zone(polygon))
            .collect();

        let mut counts: BTreeMap<ClimateZone, usize> = BTreeMap::new();
        for zone in &climates {
            *counts.entry(*zone).or_default() += 1;
        }
        debug!("Climate zones: {:?}", counts);

        planet.climates = Some(climates);
        Ok(())
    }
}

/// A climate config with its angles converted to radians
struct Classifier {
    model: ClimateModel,
    axial_tilt: f64,
    seasonal_offset: f64,
    seasonal_samples: u32,
}

impl Classifier {
    fn new(config: &ClimateConfig) -> Self {
        Self {
            model: config.model,
            axial_tilt: config.axial_tilt.to_radians(),
            seasonal_offset: config.seasonal_offset.to_radians(),
            seasonal_samples: config.seasonal_samples.max(1),
        }
    }

    fn zone(&self, polygon: &Polygon) -> ClimateZone {
        let latitude = polygon.latitude().abs().to_degrees();
        match self.model {
            ClimateModel::SimpleLatitude => by_latitude(latitude, 30.0, 60.0),
            ClimateModel::HadleyCells => by_latitude(latitude, 25.0, 60.0),
            ClimateModel::IceWorld => {
                if latitude <= 30.0 {
                    ClimateZone::Temperate
                } else {
                    ClimateZone::Polar
                }
            }
            ClimateModel::TropicalWorld => by_latitude(latitude, 45.0, 75.0),
            ClimateModel::TidallyLocked => {
                // The star sits along +X
                let facing = polygon.direction().x;
                if facing > 0.5 {
                    ClimateZone::Tropical
                } else if facing > -0.3 {
                    ClimateZone::Temperate
                } else {
                    ClimateZone::Polar
                }
            }
            ClimateModel::Seasonal => {
                let insolation = self.average_insolation(polygon.latitude());
                if insolation >= 0.65 {
                    ClimateZone::Tropical
                } else if insolation >= 0.3 {
                    ClimateZone::Temperate
                } else {
                    ClimateZone::Polar
                }
            }
        }
    }

    /// Mean of the noon sun's elevation factor over a year, sampled at
    /// evenly spaced points along the orbit. Latitude is in radians.
    fn average_insolation(&self, latitude: f64) -> f64 {
        let samples = self.seasonal_samples;
        let step = TAU / samples as f64;
        let total: f64 = (0..samples)
            .map(|i| {
                let phase = self.seasonal_offset + i as f64 * step;
                let subsolar = self.axial_tilt * phase.sin();
                let cos_zenith = latitude.sin() * subsolar.sin()
                    + latitude.cos() * subsolar.cos();
                cos_zenith.max(0.0)
            })
            .sum();
        total / samples as f64
    }
}

/// Zone by absolute latitude (in degrees), with both limits inclusive
fn by_latitude(
    latitude: f64,
    tropical_limit: f64,
    temperate_limit: f64,
) -> ClimateZone {
    if latitude <= tropical_limit {
        ClimateZone::Tropical
    } else if latitude <= temperate_limit {
        ClimateZone::Temperate
    } else {
        ClimateZone::Polar
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use nalgebra::Vector3;
    use ClimateZone::{Polar, Temperate, Tropical};

    /// A polygon centered at the given latitude (degrees) on the Y/Z plane
    fn at_latitude(degrees: f64) -> Polygon {
        let rad = degrees.to_radians();
        let center = Vector3::new(0.0, rad.sin(), rad.cos());
        Polygon::new(center, vec![center; 6])
    }

    fn classifier(model: ClimateModel) -> Classifier {
        Classifier::new(&ClimateConfig {
            model,
            ..Default::default()
        })
    }

    fn zones(model: ClimateModel, latitudes: &[f64]) -> Vec<ClimateZone> {
        let classifier = classifier(model);
        latitudes
            .iter()
            .map(|lat| classifier.zone(&at_latitude(*lat)))
            .collect()
    }

    #[test]
    fn test_simple_latitude() {
        assert_eq!(
            zones(
                ClimateModel::SimpleLatitude,
                &[0.0, 29.0, 31.0, 59.0, 61.0, -45.0, -80.0]
            ),
            vec![
                Tropical, Tropical, Temperate, Temperate, Polar, Temperate,
                Polar
            ]
        );
    }

    #[test]
    fn test_latitude_bands() {
        assert_eq!(
            zones(ClimateModel::HadleyCells, &[24.0, 26.0, 61.0]),
            vec![Tropical, Temperate, Polar]
        );
        assert_eq!(
            zones(ClimateModel::IceWorld, &[0.0, 29.0, 31.0]),
            vec![Temperate, Temperate, Polar]
        );
        assert_eq!(
            zones(ClimateModel::TropicalWorld, &[44.0, 46.0, 74.0, 76.0]),
            vec![Tropical, Temperate, Temperate, Polar]
        );
    }

    #[test]
    fn test_tidally_locked() {
        let classifier = classifier(ClimateModel::TidallyLocked);
        let zone = |x: f64, z: f64| {
            let center = Vector3::new(x, 0.0, z);
            classifier.zone(&Polygon::new(center, vec![center; 6]))
        };
        assert_eq!(zone(2.0, 0.0), Tropical);
        assert_eq!(zone(0.0, 1.0), Temperate);
        assert_eq!(zone(-1.0, 0.0), Polar);
    }

    #[test]
    fn test_seasonal() {
        // Without tilt, insolation is just the cosine of the latitude
        let flat = Classifier::new(&ClimateConfig {
            model: ClimateModel::Seasonal,
            axial_tilt: 0.0,
            ..Default::default()
        });
        assert_approx_eq!(flat.average_insolation(0.0), 1.0);
        assert_approx_eq!(
            flat.average_insolation(60f64.to_radians()),
            0.5
        );

        let classifier = classifier(ClimateModel::Seasonal);
        assert_eq!(classifier.zone(&at_latitude(0.0)), Tropical);
        assert_eq!(classifier.zone(&at_latitude(50.0)), Temperate);
        assert_eq!(classifier.zone(&at_latitude(85.0)), Polar);
    }

    #[test]
    fn test_degenerate_center() {
        let polygon = Polygon::new(Vector3::zeros(), vec![Vector3::zeros(); 6]);
        assert_eq!(
            classifier(ClimateModel::SimpleLatitude).zone(&polygon),
            Tropical
        );
    }
}
