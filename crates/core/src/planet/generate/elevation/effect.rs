//! What happens to a plate along each kind of boundary. The rules here are
//! pure data: a boundary case maps to a list of [EffectGroup]s, and the mass
//! growth that consumes them lives in [apply_boundary_effects].

use crate::planet::{
    boundary::{BoundaryType, PlateType},
    generate::elevation::{ElevationContext, TerrainState},
    height,
};
use rand::Rng;

/// Which config multiplier scales a layer's height change
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Scale {
    /// Uplift, scaled by the height multiplier
    Height,
    /// Subsidence, scaled by the rift multiplier
    Rift,
}

/// One ring of height change spreading into a plate from its border with
/// another plate
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EffectLayer {
    /// Stop growing once the affected area covers this fraction of the plate
    pub max_fraction: f64,
    /// Band change applied to every affected polygon
    pub delta: i32,
    /// Chance for each candidate polygon to join the affected area, per
    /// growth step. Lower values give more ragged shapes.
    pub admission: f64,
}

/// A set of layers that are applied together, or not at all
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EffectGroup {
    /// Chance that this group applies at all. 1.0 means always, without
    /// rolling.
    pub chance: f64,
    pub layers: &'static [EffectLayer],
}

const fn layer(max_fraction: f64, delta: i32, admission: f64) -> EffectLayer {
    EffectLayer {
        max_fraction,
        delta,
        admission,
    }
}

const fn always(layers: &'static [EffectLayer]) -> EffectGroup {
    EffectGroup {
        chance: 1.0,
        layers,
    }
}

/// A physical interaction between two plates, from the point of view of the
/// first (affected) plate. Names describe what happens to that plate.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BoundaryCase {
    /// Convergent, oceanic against oceanic
    IslandArc,
    /// Convergent, oceanic against continental
    SubductingOcean,
    /// Convergent, continental against oceanic
    ContinentalArc,
    /// Convergent, continental against continental
    Collision,
    /// Divergent, oceanic against continental
    OceanicRidge,
    /// Divergent, continental against oceanic
    PassiveMargin,
    /// Divergent, continental against continental
    ContinentalRift,
    /// Transform, oceanic against continental
    TransformRidge,
    /// Transform, continental against oceanic
    TransformMargin,
    /// Transform, continental against continental
    PullApartBasin,
}

impl BoundaryCase {
    /// Pick the case for a plate of type `plate` touching a plate of type
    /// `other`. `None` means the boundary has no effect on terrain.
    pub fn classify(
        boundary: BoundaryType,
        plate: PlateType,
        other: PlateType,
    ) -> Option<Self> {
        use PlateType::{Continental as C, Oceanic as O};
        match (boundary, plate, other) {
            (BoundaryType::Convergent, O, O) => Some(Self::IslandArc),
            (BoundaryType::Convergent, O, C) => Some(Self::SubductingOcean),
            (BoundaryType::Convergent, C, O) => Some(Self::ContinentalArc),
            (BoundaryType::Convergent, C, C) => Some(Self::Collision),
            (BoundaryType::Divergent, O, C) => Some(Self::OceanicRidge),
            (BoundaryType::Divergent, C, O) => Some(Self::PassiveMargin),
            (BoundaryType::Divergent, C, C) => Some(Self::ContinentalRift),
            (BoundaryType::Transform, O, C) => Some(Self::TransformRidge),
            (BoundaryType::Transform, C, O) => Some(Self::TransformMargin),
            (BoundaryType::Transform, C, C) => Some(Self::PullApartBasin),
            (BoundaryType::Divergent, O, O)
            | (BoundaryType::Transform, O, O)
            | (BoundaryType::Inactive, _, _) => None,
        }
    }

    pub fn scale(self) -> Scale {
        match self {
            Self::IslandArc
            | Self::SubductingOcean
            | Self::ContinentalArc
            | Self::Collision
            | Self::OceanicRidge
            | Self::TransformRidge => Scale::Height,
            Self::PassiveMargin
            | Self::ContinentalRift
            | Self::TransformMargin
            | Self::PullApartBasin => Scale::Rift,
        }
    }

    pub fn groups(self) -> &'static [EffectGroup] {
        match self {
            Self::IslandArc => ISLAND_ARC,
            Self::SubductingOcean => SUBDUCTING_OCEAN,
            Self::ContinentalArc => CONTINENTAL_ARC,
            Self::Collision => COLLISION,
            Self::OceanicRidge => OCEANIC_RIDGE,
            Self::PassiveMargin => PASSIVE_MARGIN,
            Self::ContinentalRift => CONTINENTAL_RIFT,
            Self::TransformRidge => TRANSFORM_RIDGE,
            Self::TransformMargin => TRANSFORM_MARGIN,
            Self::PullApartBasin => PULL_APART_BASIN,
        }
    }
}

const ISLAND_ARC: &[EffectGroup] = &[always(&[layer(0.15, 1, 0.10)])];
const SUBDUCTING_OCEAN: &[EffectGroup] = &[always(&[
    layer(0.35, 1, 0.40),
    layer(0.15, 1, 0.25),
    layer(0.10, 1, 0.25),
])];
const CONTINENTAL_ARC: &[EffectGroup] =
    &[always(&[layer(0.25, 1, 0.35), layer(0.15, 1, 0.10)])];
// The second uplift only happens half the time
const COLLISION: &[EffectGroup] = &[
    always(&[layer(0.25, 1, 0.35)]),
    EffectGroup {
        chance: 0.5,
        layers: &[layer(0.10, 1, 0.10)],
    },
];
const OCEANIC_RIDGE: &[EffectGroup] = &[always(&[layer(0.15, 1, 0.10)])];
const PASSIVE_MARGIN: &[EffectGroup] =
    &[always(&[layer(0.35, -1, 0.35), layer(0.25, -1, 0.10)])];
const CONTINENTAL_RIFT: &[EffectGroup] = &[always(&[
    layer(0.60, -1, 0.55),
    layer(0.45, -1, 0.40),
    layer(0.35, -1, 0.20),
    layer(0.25, -1, 0.10),
    layer(0.15, -1, 0.10),
])];
const TRANSFORM_RIDGE: &[EffectGroup] =
    &[always(&[layer(0.35, 1, 0.40), layer(0.25, 1, 0.25)])];
const TRANSFORM_MARGIN: &[EffectGroup] = &[always(&[layer(0.35, -1, 0.25)])];
const PULL_APART_BASIN: &[EffectGroup] = &[EffectGroup {
    chance: 0.25,
    layers: &[layer(0.20, -1, 0.25), layer(0.15, -1, 0.15)],
}];

/// Apply every boundary's effects. For each adjacent pair, only the plate
/// with the lower index is affected.
pub fn apply_boundary_effects(
    terrain: &mut TerrainState,
    context: &ElevationContext,
    rng: &mut impl Rng,
) {
    let plates = context.plates;
    let boundaries = context.boundaries;
    for plate in 0..plates.plate_count() {
        for &other in plates.adjacent_plates(plate) {
            if other <= plate {
                continue;
            }
            let case =
                boundaries.boundary(plate, other).and_then(|boundary| {
                    BoundaryCase::classify(
                        boundary,
                        boundaries.plate_type(plate),
                        boundaries.plate_type(other),
                    )
                });
            let case = match case {
                Some(case) => case,
                None => continue,
            };

            let multiplier = match case.scale() {
                Scale::Height => context.config.height_scale,
                Scale::Rift => context.config.rift_depth,
            };
            for group in case.groups() {
                if group.chance < 1.0 && rng.gen::<f64>() >= group.chance {
                    continue;
                }
                for layer in group.layers {
                    let delta = scaled_delta(layer.delta, multiplier, rng);
                    grow_mass(
                        terrain, context, plate, other, layer, delta, rng,
                    );
                }
            }
        }
    }
}

/// Multipliers above 1 give a layer a chance to move one band further
fn scaled_delta(delta: i32, multiplier: f64, rng: &mut impl Rng) -> i32 {
    let extra_chance = multiplier - 1.0;
    if extra_chance > 0.0 && rng.gen::<f64>() < extra_chance {
        delta + delta.signum()
    } else {
        delta
    }
}

/// Grow an affected area into `plate`, starting from every polygon that
/// touches `other`, then shift the height of everything in it by `delta`.
fn grow_mass(
    terrain: &mut TerrainState,
    context: &ElevationContext,
    plate: usize,
    other: usize,
    layer: &EffectLayer,
    delta: i32,
    rng: &mut impl Rng,
) {
    if layer.max_fraction <= 0.0 {
        return;
    }
    let adjacency = context.adjacency;
    let plates = context.plates;
    let plate_polygons = plates.plate(plate);

    terrain.clear_marks();
    let mut mass: Vec<usize> = Vec::new();
    for &polygon in plate_polygons {
        let borders_other = adjacency
            .neighbors(polygon)
            .iter()
            .any(|&neighbor| plates.plate_of(neighbor) == other);
        if borders_other {
            terrain.mark(polygon);
            mass.push(polygon);
        }
    }

    let plate_size = plate_polygons.len() as f64;
    while !mass.is_empty()
        && (mass.len() as f64 / plate_size) < layer.max_fraction
    {
        let mut added = Vec::new();
        for &polygon in &mass {
            for &neighbor in adjacency.neighbors(polygon) {
                if !terrain.is_marked(neighbor)
                    && plates.plate_of(neighbor) == plate
                    && rng.gen::<f64>() < layer.admission
                {
                    terrain.mark(neighbor);
                    added.push(neighbor);
                }
            }
        }
        if added.is_empty() {
            break;
        }
        mass.extend(added);
    }

    for polygon in mass {
        terrain.set(polygon, height::clamp_band(terrain.get(polygon) + delta));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_classify_is_directional() {
        use PlateType::*;
        let divergent = BoundaryType::Divergent;
        assert_eq!(
            BoundaryCase::classify(divergent, Oceanic, Continental),
            Some(BoundaryCase::OceanicRidge)
        );
        assert_eq!(
            BoundaryCase::classify(divergent, Continental, Oceanic),
            Some(BoundaryCase::PassiveMargin)
        );
        assert_eq!(
            BoundaryCase::classify(BoundaryType::Transform, Oceanic, Oceanic),
            None
        );
    }

    #[test]
    fn test_inactive_does_nothing() {
        for plate in PlateType::iter() {
            for other in PlateType::iter() {
                let inactive = BoundaryType::Inactive;
                let case = BoundaryCase::classify(inactive, plate, other);
                assert_eq!(case, None);
            }
        }
    }

    #[test]
    fn test_layers_sane() {
        let cases = [
            BoundaryCase::IslandArc,
            BoundaryCase::SubductingOcean,
            BoundaryCase::ContinentalArc,
            BoundaryCase::Collision,
            BoundaryCase::OceanicRidge,
            BoundaryCase::PassiveMargin,
            BoundaryCase::ContinentalRift,
            BoundaryCase::TransformRidge,
            BoundaryCase::TransformMargin,
            BoundaryCase::PullApartBasin,
        ];
        for case in cases {
            let groups = case.groups();
            assert!(!groups.is_empty(), "{:?} has no effect", case);
            for group in groups {
                assert!(group.chance > 0.0 && group.chance <= 1.0);
                assert!((1..=5).contains(&group.layers.len()));
                for layer in group.layers {
                    // Uplift goes with the height multiplier, subsidence
                    // with the rift multiplier
                    let expected = if layer.delta > 0 {
                        Scale::Height
                    } else {
                        Scale::Rift
                    };
                    assert_eq!(case.scale(), expected, "{:?}", case);
                    assert!(layer.max_fraction > 0.0);
                    assert!(layer.max_fraction < 1.0);
                }
            }
        }
    }

    #[test]
    fn test_scaled_delta() {
        let mut rng = crate::util::phase_rng(0, 2);
        // No multiplier bonus means no change
        for _ in 0..10 {
            assert_eq!(scaled_delta(1, 1.0, &mut rng), 1);
            assert_eq!(scaled_delta(-1, 0.5, &mut rng), -1);
        }
        // A multiplier of 2 always adds a band
        assert_eq!(scaled_delta(1, 2.0, &mut rng), 2);
        assert_eq!(scaled_delta(-1, 2.0, &mut rng), -2);
    }
}
