//! Impact craters and volcanic cones. Every feature has a radial profile: a
//! height offset as a function of normalized distance from its center, where
//! 0 is the center and 1 is the outer edge. Profiles are in band units and
//! get scaled by [ImpactProfile::multiplier] before they touch the terrain.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// Shape of a single crater or volcano
#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ImpactProfile {
    /// Bowl-shaped, with a raised rim
    SimpleRound,
    /// Flat floor with steep walls
    SimpleFlat,
    /// Flat floor around a central peak
    ComplexFlat,
    /// Terraced walls stepping down to the floor
    ComplexSteps,
    /// Concentric rings, like a multi-ring basin
    ComplexRings,
    /// Low rounded lava dome
    DomeVolcano,
    /// Steep cone with a summit crater
    StratoVolcano,
    /// Broad, gentle rise with a caldera
    ShieldVolcano,
}

impl ImpactProfile {
    pub fn is_crater(self) -> bool {
        matches!(
            self,
            Self::SimpleRound
                | Self::SimpleFlat
                | Self::ComplexFlat
                | Self::ComplexSteps
                | Self::ComplexRings
        )
    }

    pub fn is_volcano(self) -> bool {
        !self.is_crater()
    }

    /// Overall strength of this profile, relative to a simple crater
    pub fn multiplier(self) -> f64 {
        match self {
            Self::SimpleRound => 1.0,
            Self::SimpleFlat => 0.8,
            Self::ComplexFlat => 1.2,
            Self::ComplexSteps => 1.3,
            Self::ComplexRings => 1.5,
            Self::DomeVolcano => 0.6,
            Self::StratoVolcano => 1.4,
            Self::ShieldVolcano => 0.4,
        }
    }

    /// Height offset at normalized distance `d` from the center. Anything
    /// outside `[0,1]` is past the edge and gets 0.
    pub fn height(self, d: f64) -> f64 {
        if !(0.0..=1.0).contains(&d) {
            return 0.0;
        }
        match self {
            Self::SimpleRound => {
                let floor = -(1.0 - d * d);
                if d < 0.7 {
                    floor
                } else {
                    let rim = bump(d, 0.85, 0.08) * 0.3;
                    let blend = smoothstep(0.7, 0.85, d);
                    floor * (1.0 - blend) + (floor + rim) * blend
                }
            }
            Self::SimpleFlat => {
                if d < 0.6 {
                    -0.8
                } else if d < 0.8 {
                    -0.8 + smoothstep(0.0, 1.0, (d - 0.6) / 0.2) * 0.8
                } else {
                    bump(d, 0.85, 0.07)
                        * 0.25
                        * (1.0 - smoothstep(0.85, 1.0, d))
                }
            }
            Self::ComplexFlat => {
                if d < 0.25 {
                    bump(d, 0.0, 0.15) * 0.4 - 0.1
                } else if d < 0.7 {
                    -0.6
                } else if d < 0.85 {
                    -0.6 + smoothstep(0.0, 1.0, (d - 0.7) / 0.15) * 0.7
                } else {
                    bump(d, 0.88, 0.06)
                        * 0.2
                        * (1.0 - smoothstep(0.88, 1.0, d))
                }
            }
            Self::ComplexSteps => {
                if d < 0.3 {
                    -0.7 + bump(d, 0.0, 0.1) * 0.25
                } else if d < 0.5 {
                    -0.7
                } else if d < 0.6 {
                    -0.5
                } else if d < 0.7 {
                    -0.3
                } else if d < 0.8 {
                    -0.1
                } else {
                    bump(d, 0.87, 0.06)
                        * 0.2
                        * (1.0 - smoothstep(0.87, 1.0, d))
                }
            }
            Self::ComplexRings => {
                let rings = -0.5
                    + bump(d, 0.3, 0.05) * 0.3
                    + bump(d, 0.55, 0.05) * 0.25
                    + bump(d, 0.8, 0.05) * 0.2
                    + bump(d, 0.92, 0.04) * 0.3;
                if d > 0.92 {
                    rings * (1.0 - smoothstep(0.92, 1.0, d))
                } else {
                    rings
                }
            }
            Self::DomeVolcano => {
                let mut dome = bump(d, 0.0, 0.5) * 0.8;
                if d < 0.1 {
                    dome -= (1.0 - d / 0.1) * 0.15;
                }
                if d > 0.7 {
                    dome *= 1.0 - smoothstep(0.7, 1.0, d);
                }
                dome
            }
            Self::StratoVolcano => {
                let mut cone = (1.0 - d) * 1.2;
                if d < 0.12 {
                    // Summit crater: a lip, then a pit
                    cone = cone * 0.85 + bump(d, 0.1, 0.03) * 0.15;
                    if d < 0.08 {
                        cone -= (1.0 - d / 0.08) * 0.2;
                    }
                }
                if d > 0.85 {
                    cone *= 1.0 - smoothstep(0.85, 1.0, d);
                }
                cone
            }
            Self::ShieldVolcano => {
                let mut shield = (1.0 - d * d) * 0.5;
                if d < 0.15 {
                    shield += bump(d, 0.12, 0.04) * 0.1;
                    if d < 0.1 {
                        shield -= (1.0 - d / 0.1) * 0.15;
                    }
                }
                shield
            }
        }
    }
}

/// A single crater or volcano stamped onto the terrain
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImpactFeature {
    /// Polygon at the center of the feature
    pub center: usize,
    /// Radius in polygon hops
    pub radius: u32,
    pub profile: ImpactProfile,
}

impl ImpactFeature {
    pub fn is_crater(&self) -> bool {
        self.profile.is_crater()
    }

    pub fn is_volcano(&self) -> bool {
        self.profile.is_volcano()
    }
}

/// Hermite interpolation between two edges, 0 below `edge0` and 1 above
/// `edge1`
pub fn smoothstep(edge0: f64, edge1: f64, x: f64) -> f64 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Gaussian bump of the given width, peaking at 1 on `center`
fn bump(d: f64, center: f64, width: f64) -> f64 {
    let x = (d - center) / width;
    (-x * x).exp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use strum::IntoEnumIterator;

    #[test]
    fn test_smoothstep() {
        assert_eq!(smoothstep(0.2, 0.4, 0.1), 0.0);
        assert_approx_eq!(smoothstep(0.2, 0.4, 0.3), 0.5);
        assert_eq!(smoothstep(0.2, 0.4, 0.9), 1.0);
    }

    #[test]
    fn test_profiles_fade_out() {
        for profile in ImpactProfile::iter() {
            assert_eq!(profile.height(1.5), 0.0, "{}", profile);
            assert_eq!(profile.height(-0.1), 0.0, "{}", profile);
            assert!(profile.height(1.0).abs() < 0.05, "{}", profile);
        }
    }

    #[test]
    fn test_crater_shapes() {
        for profile in ImpactProfile::iter().filter(|p| p.is_crater()) {
            // Sunken floor, raised rim
            assert!(profile.height(0.5) < 0.0, "{}", profile);
            let rim = (80..100)
                .map(|i| profile.height(i as f64 / 100.0))
                .fold(f64::MIN, f64::max);
            assert!(rim > profile.height(0.5), "{}", profile);
        }
        assert_approx_eq!(ImpactProfile::SimpleRound.height(0.0), -1.0);
        assert_approx_eq!(ImpactProfile::SimpleFlat.height(0.3), -0.8);
        // Central peak pokes up out of the floor
        assert!(
            ImpactProfile::ComplexFlat.height(0.0)
                > ImpactProfile::ComplexFlat.height(0.5)
        );
        assert_approx_eq!(ImpactProfile::ComplexSteps.height(0.65), -0.3);
    }

    #[test]
    fn test_volcano_shapes() {
        for profile in ImpactProfile::iter().filter(|p| p.is_volcano()) {
            assert!(profile.height(0.3) > 0.0, "{}", profile);
            // Every volcano has a summit crater, so the peak is off-center
            assert!(
                profile.height(0.12) > profile.height(0.0),
                "{}",
                profile
            );
        }
        assert!(
            ImpactProfile::StratoVolcano.height(0.3)
                > ImpactProfile::ShieldVolcano.height(0.3)
        );
    }
}
