use crate::{
    planet::{
        adjacency::AdjacencyGraph,
        boundary::{BoundaryAnalysis, BoundaryType},
        generate::{Generate, PhaseProgress, PlanetBuilder},
        height,
        impact::{ImpactFeature, ImpactProfile},
        plate::PlateAssignment,
        polygon::Polygon,
    },
    progress::GenerationPhase,
    ImpactConfig,
};
use log::{debug, info};
use noise::{NoiseFn, Perlin};
use rand::Rng;

const PHASE_SEED: u64 = 7;
/// Hotspot volcanoes get their own noise field, independent of craters
const HOTSPOT_NOISE_PHASE: u64 = 8;

const MIN_CRATER_RADIUS: u32 = 2;
/// Craters at least this big get one of the complex profiles
const COMPLEX_CRATER_RADIUS: u32 = 5;
const CRATER_NOISE_FREQUENCY: f64 = 10.0;
const HOTSPOT_NOISE_FREQUENCY: f64 = 8.0;
/// Share of the volcano density that applies along plate boundaries
const BOUNDARY_VOLCANO_SHARE: f64 = 0.3;
/// Share of the volcano density that applies over hotspots
const HOTSPOT_VOLCANO_SHARE: f64 = 0.5;

/// Stamps impact craters and volcanic cones onto the continuous heights
/// left by the elevation phase, then re-derives the bands from them. Does
/// nothing at all unless craters or volcanoes are turned on.
#[derive(Copy, Clone, Debug)]
pub struct ImpactGenerator;

impl Generate for ImpactGenerator {
    const PHASE: GenerationPhase = GenerationPhase::Impact;

    fn generate(
        &self,
        planet: &mut PlanetBuilder,
        progress: &mut PhaseProgress,
    ) -> anyhow::Result<()> {
        if !planet.config.impact.is_enabled() {
            debug!("Craters and volcanoes disabled, skipping");
            planet.impacts = Some(Vec::new());
            return Ok(());
        }

        let context = ImpactContext {
            settings: &planet.config.impact,
            polygons: planet.polygons()?,
            adjacency: planet.adjacency()?,
            plates: planet.plates()?,
            boundaries: planet.boundaries()?,
        };
        let mut terrain = ImpactTerrain::new(planet.precise_heights()?);
        let mut rng = planet.config.phase_rng(PHASE_SEED);

        let crater_noise = planet.config.seed.phase_noise(PHASE_SEED);
        place_craters(&mut terrain, &context, &crater_noise, &mut rng);
        progress.report(0.5);

        if context.settings.volcanoes {
            place_boundary_volcanoes(&mut terrain, &context, &mut rng);
            let hotspot_noise =
                planet.config.seed.phase_noise(HOTSPOT_NOISE_PHASE);
            place_hotspot_volcanoes(
                &mut terrain,
                &context,
                &hotspot_noise,
                &mut rng,
            );
        }

        let ImpactTerrain {
            heights, features, ..
        } = terrain;
        info!(
            "Placed {} craters and {} volcanoes",
            features.iter().filter(|f| f.is_crater()).count(),
            features.iter().filter(|f| f.is_volcano()).count(),
        );

        let precise_heights: Vec<f64> =
            heights.into_iter().map(height::clamp_continuous).collect();
        planet.heights = Some(
            precise_heights
                .iter()
                .map(|height| height.round() as i32)
                .collect(),
        );
        planet.precise_heights = Some(precise_heights);
        planet.impacts = Some(features);
        Ok(())
    }
}

/// Read-only inputs for feature placement
struct ImpactContext<'a> {
    settings: &'a ImpactConfig,
    polygons: &'a [Polygon],
    adjacency: &'a AdjacencyGraph,
    plates: &'a PlateAssignment,
    boundaries: &'a BoundaryAnalysis,
}

/// Heights being stamped, plus which polygons already belong to a feature.
/// A new feature can't be centered on a covered polygon, but its outskirts
/// may spill over older ones.
struct ImpactTerrain {
    heights: Vec<f64>,
    covered: Vec<bool>,
    features: Vec<ImpactFeature>,
}

impl ImpactTerrain {
    fn new(heights: &[f64]) -> Self {
        Self {
            heights: heights.to_vec(),
            covered: vec![false; heights.len()],
            features: Vec::new(),
        }
    }

    /// Can a new feature be centered here? With `land_only`, the center
    /// also has to be above sea level.
    fn is_open(&self, polygon: usize, land_only: bool) -> bool {
        !self.covered[polygon] && (!land_only || self.heights[polygon] >= 0.0)
    }

    /// Apply a feature's profile to every polygon within its radius. Craters
    /// add their profile outright; volcanoes only ever build terrain up.
    fn stamp(
        &mut self,
        feature: ImpactFeature,
        scale: f64,
        context: &ImpactContext,
    ) {
        let radius = feature.radius.max(1) as f64;
        let strength = scale * feature.profile.multiplier();
        for (polygon, hops) in
            context.adjacency.within_hops(feature.center, feature.radius)
        {
            self.covered[polygon] = true;
            let delta =
                feature.profile.height(hops as f64 / radius) * strength;
            let height = &mut self.heights[polygon];
            if feature.is_crater() {
                *height += delta;
            } else {
                *height = height.max(*height + delta);
            }
        }
        self.features.push(feature);
    }
}

/// Noise at a polygon's center, mapped onto `[0,1]`
fn placement_value(
    noise: &Perlin,
    polygon: &Polygon,
    frequency: f64,
) -> f64 {
    let point = polygon.direction() * frequency;
    ((noise.get([point.x, point.y, point.z]) + 1.0) / 2.0).clamp(0.0, 1.0)
}

/// Drop a crater wherever the crater noise clears the density threshold
/// and there's still room
fn place_craters(
    terrain: &mut ImpactTerrain,
    context: &ImpactContext,
    noise: &Perlin,
    rng: &mut impl Rng,
) {
    let settings = context.settings;
    if settings.crater_density <= 0.0 {
        return;
    }
    let threshold = 1.0 - settings.crater_density;

    for (center, polygon) in context.polygons.iter().enumerate() {
        if !terrain.is_open(center, false)
            || placement_value(noise, polygon, CRATER_NOISE_FREQUENCY)
                <= threshold
        {
            continue;
        }
        let radius = crater_radius(settings.crater_max_radius, rng);
        let profile = crater_profile(radius, rng);
        let feature = ImpactFeature {
            center,
            radius,
            profile,
        };
        terrain.stamp(feature, settings.crater_depth, context);
    }
}

/// Random crater radius, skewed toward small craters
fn crater_radius(max_radius: u32, rng: &mut impl Rng) -> u32 {
    let r: f64 = rng.gen();
    let spread = max_radius.saturating_sub(MIN_CRATER_RADIUS) as f64;
    MIN_CRATER_RADIUS + (r * r * spread).floor() as u32
}

fn crater_profile(radius: u32, rng: &mut impl Rng) -> ImpactProfile {
    let roll: f64 = rng.gen();
    if radius >= COMPLEX_CRATER_RADIUS {
        if roll < 0.3 {
            ImpactProfile::ComplexRings
        } else if roll < 0.5 {
            ImpactProfile::ComplexSteps
        } else if roll < 0.7 {
            ImpactProfile::ComplexFlat
        } else {
            ImpactProfile::SimpleRound
        }
    } else if roll < 0.6 {
        ImpactProfile::SimpleRound
    } else {
        ImpactProfile::SimpleFlat
    }
}

fn volcano_radius(profile: ImpactProfile, rng: &mut impl Rng) -> u32 {
    match profile {
        ImpactProfile::StratoVolcano => 2 + rng.gen_range(0..3),
        ImpactProfile::ShieldVolcano => 4 + rng.gen_range(0..4),
        _ => 2 + rng.gen_range(0..2),
    }
}

/// The boundary between a polygon's plate and the first other plate it
/// touches, if it touches one
fn boundary_at(
    polygon: usize,
    context: &ImpactContext,
) -> Option<BoundaryType> {
    let plate = context.plates.plate_of(polygon);
    let other = context
        .adjacency
        .neighbors(polygon)
        .iter()
        .map(|&neighbor| context.plates.plate_of(neighbor))
        .find(|&other| other != plate)?;
    context.boundaries.boundary(plate, other)
}

/// Volcanoes along plate boundaries: stratovolcanoes where plates collide,
/// shield volcanoes along rifts, and the occasional dome on a transform
/// fault
fn place_boundary_volcanoes(
    terrain: &mut ImpactTerrain,
    context: &ImpactContext,
    rng: &mut impl Rng,
) {
    let density = context.settings.volcano_density * BOUNDARY_VOLCANO_SHARE;
    for center in 0..context.polygons.len() {
        if !terrain.is_open(center, true) {
            continue;
        }
        let boundary = match boundary_at(center, context) {
            Some(boundary) => boundary,
            None => continue,
        };
        if rng.gen::<f64>() > density {
            continue;
        }
        let profile = match boundary {
            BoundaryType::Convergent => ImpactProfile::StratoVolcano,
            BoundaryType::Divergent => ImpactProfile::ShieldVolcano,
            BoundaryType::Transform if rng.gen_bool(0.5) => {
                ImpactProfile::DomeVolcano
            }
            BoundaryType::Transform | BoundaryType::Inactive => continue,
        };
        let radius = volcano_radius(profile, rng);
        let feature = ImpactFeature {
            center,
            radius,
            profile,
        };
        terrain.stamp(feature, 1.0, context);
    }
}

/// Volcanoes over mantle hotspots, away from any boundary. These follow
/// their own noise field, so they cluster into volcanic provinces.
fn place_hotspot_volcanoes(
    terrain: &mut ImpactTerrain,
    context: &ImpactContext,
    noise: &Perlin,
    rng: &mut impl Rng,
) {
    let threshold =
        1.0 - context.settings.volcano_density * HOTSPOT_VOLCANO_SHARE;
    for (center, polygon) in context.polygons.iter().enumerate() {
        if !terrain.is_open(center, true)
            || placement_value(noise, polygon, HOTSPOT_NOISE_FREQUENCY)
                <= threshold
        {
            continue;
        }
        let profile = if rng.gen_bool(0.7) {
            ImpactProfile::ShieldVolcano
        } else {
            ImpactProfile::DomeVolcano
        };
        let radius = volcano_radius(profile, rng);
        let feature = ImpactFeature {
            center,
            radius,
            profile,
        };
        terrain.stamp(feature, 1.0, context);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        planet::{
            boundary::{PlatePair, PlateType},
            generate::mesh::goldberg_polygons,
        },
        util::phase_rng,
        Seed,
    };

    /// A real mesh with every polygon on land, split into two plates down
    /// the middle with the given boundary between them
    struct TwoPlateWorld {
        polygons: Vec<Polygon>,
        adjacency: AdjacencyGraph,
        plates: PlateAssignment,
        boundaries: BoundaryAnalysis,
    }

    impl TwoPlateWorld {
        fn new(boundary: BoundaryType) -> Self {
            let polygons = goldberg_polygons(5).unwrap();
            let adjacency = AdjacencyGraph::from_polygons(&polygons);
            let index: Vec<usize> = polygons
                .iter()
                .map(|polygon| (polygon.center().x < 0.0) as usize)
                .collect();
            let mut members = vec![Vec::new(), Vec::new()];
            for (polygon, &plate) in index.iter().enumerate() {
                members[plate].push(polygon);
            }
            let plates = PlateAssignment::new(index, members, &adjacency);
            let boundaries = BoundaryAnalysis::new(
                vec![PlateType::Continental; 2],
                vec![(PlatePair::new(0, 1), boundary)].into_iter().collect(),
                vec![0, 1],
            );
            Self {
                polygons,
                adjacency,
                plates,
                boundaries,
            }
        }

        fn context<'a>(
            &'a self,
            settings: &'a ImpactConfig,
        ) -> ImpactContext<'a> {
            ImpactContext {
                settings,
                polygons: &self.polygons,
                adjacency: &self.adjacency,
                plates: &self.plates,
                boundaries: &self.boundaries,
            }
        }
    }

    fn craters(density: f64) -> ImpactConfig {
        ImpactConfig {
            crater_density: density,
            ..Default::default()
        }
    }

    #[test]
    fn test_crater_radius() {
        let mut rng = phase_rng(0, PHASE_SEED);
        for _ in 0..200 {
            let radius = crater_radius(8, &mut rng);
            assert!((MIN_CRATER_RADIUS..=8).contains(&radius));
        }
        assert_eq!(crater_radius(2, &mut rng), 2);
    }

    #[test]
    fn test_small_craters_are_simple() {
        let mut rng = phase_rng(0, PHASE_SEED);
        for _ in 0..100 {
            let profile = crater_profile(3, &mut rng);
            assert!(matches!(
                profile,
                ImpactProfile::SimpleRound | ImpactProfile::SimpleFlat
            ));
        }
    }

    #[test]
    fn test_craters_start_on_open_ground() {
        let world = TwoPlateWorld::new(BoundaryType::Inactive);
        let settings = craters(0.6);
        let context = world.context(&settings);
        let mut terrain =
            ImpactTerrain::new(&vec![1.0; world.polygons.len()]);
        place_craters(
            &mut terrain,
            &context,
            &Seed::Int(3).phase_noise(PHASE_SEED),
            &mut phase_rng(3, PHASE_SEED),
        );

        assert!(!terrain.features.is_empty());
        let mut covered = vec![false; world.polygons.len()];
        for feature in &terrain.features {
            assert!(feature.is_crater());
            assert!(!covered[feature.center], "{:?}", feature);
            let area =
                world.adjacency.within_hops(feature.center, feature.radius);
            for &(polygon, _) in &area {
                covered[polygon] = true;
            }
            // Every crater has a sunken floor somewhere
            let lowest = area
                .iter()
                .map(|&(polygon, _)| terrain.heights[polygon])
                .fold(f64::MAX, f64::min);
            assert!(lowest < 1.0, "{:?}", feature);
        }
    }

    #[test]
    fn test_no_craters_at_zero_density() {
        let world = TwoPlateWorld::new(BoundaryType::Inactive);
        let settings = craters(0.0);
        let mut terrain =
            ImpactTerrain::new(&vec![1.0; world.polygons.len()]);
        place_craters(
            &mut terrain,
            &world.context(&settings),
            &Seed::Int(3).phase_noise(PHASE_SEED),
            &mut phase_rng(3, PHASE_SEED),
        );
        assert!(terrain.features.is_empty());
        assert!(terrain.heights.iter().all(|&height| height == 1.0));
    }

    #[test]
    fn test_boundary_volcano_types() {
        let settings = ImpactConfig {
            volcanoes: true,
            volcano_density: 1.0,
            ..Default::default()
        };
        for (boundary, expected) in [
            (BoundaryType::Convergent, Some(ImpactProfile::StratoVolcano)),
            (BoundaryType::Divergent, Some(ImpactProfile::ShieldVolcano)),
            (BoundaryType::Inactive, None),
        ] {
            let world = TwoPlateWorld::new(boundary);
            let mut terrain =
                ImpactTerrain::new(&vec![0.5; world.polygons.len()]);
            place_boundary_volcanoes(
                &mut terrain,
                &world.context(&settings),
                &mut phase_rng(1, PHASE_SEED),
            );
            let profiles: Vec<ImpactProfile> =
                terrain.features.iter().map(|f| f.profile).collect();
            match expected {
                Some(profile) => {
                    assert!(!profiles.is_empty(), "{}", boundary);
                    assert!(profiles.iter().all(|p| *p == profile));
                }
                None => assert!(profiles.is_empty(), "{}", boundary),
            }
            // Volcanoes never dig
            assert!(terrain.heights.iter().all(|&height| height >= 0.5));
        }
    }

    #[test]
    fn test_volcanoes_only_on_land() {
        let settings = ImpactConfig {
            volcanoes: true,
            volcano_density: 1.0,
            ..Default::default()
        };
        let world = TwoPlateWorld::new(BoundaryType::Convergent);
        // Plate 1 is entirely underwater
        let heights: Vec<f64> = (0..world.polygons.len())
            .map(|polygon| {
                if world.plates.plate_of(polygon) == 1 {
                    -2.0
                } else {
                    0.5
                }
            })
            .collect();
        let mut terrain = ImpactTerrain::new(&heights);
        let context = world.context(&settings);
        place_boundary_volcanoes(
            &mut terrain,
            &context,
            &mut phase_rng(1, PHASE_SEED),
        );
        place_hotspot_volcanoes(
            &mut terrain,
            &context,
            &Seed::Int(1).phase_noise(HOTSPOT_NOISE_PHASE),
            &mut phase_rng(1, PHASE_SEED),
        );
        assert!(!terrain.features.is_empty());
        for feature in &terrain.features {
            assert_eq!(world.plates.plate_of(feature.center), 0);
        }
    }
}
