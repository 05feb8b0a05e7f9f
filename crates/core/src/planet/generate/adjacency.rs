use crate::{
    planet::{
        adjacency::AdjacencyGraph,
        generate::{Generate, PhaseProgress, PlanetBuilder},
    },
    progress::GenerationPhase,
};
use anyhow::bail;
use log::debug;

/// Works out which polygons border which
#[derive(Copy, Clone, Debug)]
pub struct AdjacencyGenerator;

impl Generate for AdjacencyGenerator {
    const PHASE: GenerationPhase = GenerationPhase::Adjacency;

    fn generate(
        &self,
        planet: &mut PlanetBuilder,
        _progress: &mut PhaseProgress,
    ) -> anyhow::Result<()> {
        let polygons = planet.polygons()?;
        let adjacency = AdjacencyGraph::from_polygons(polygons);

        // Every polygon on a Goldberg polyhedron has as many neighbors as it
        // has vertices
        for (index, polygon) in polygons.iter().enumerate() {
            let found = adjacency.neighbors(index).len();
            if found != polygon.vertices().len() {
                bail!(
                    "polygon {} has {} vertices but {} neighbors",
                    index,
                    polygon.vertices().len(),
                    found
                );
            }
        }
        debug!("Indexed neighbors for {} polygons", adjacency.len());

        planet.adjacency = Some(adjacency);
        Ok(())
    }
}
