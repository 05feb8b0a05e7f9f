use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// A single face of the planet mesh: a hexagon, or one of the 12 pentagons.
/// Polygons are identified by their index in the planet's polygon list, which
/// is fixed when the mesh is built. Once built, a polygon never changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    center: Vector3<f64>,
    vertices: Vec<Vector3<f64>>,
}

impl Polygon {
    /// Below this length, a vector is considered to have no direction
    const DEGENERATE_NORM: f64 = 1e-10;

    pub fn new(center: Vector3<f64>, vertices: Vec<Vector3<f64>>) -> Self {
        Self { center, vertices }
    }

    /// Center point of the polygon. This lies on the plane of the vertices,
    /// so it's slightly inside the sphere that the vertices sit on.
    pub fn center(&self) -> &Vector3<f64> {
        &self.center
    }

    /// The vertices around the edge of the polygon, in a consistent winding
    /// order. There are always 5 or 6.
    pub fn vertices(&self) -> &[Vector3<f64>] {
        &self.vertices
    }

    pub fn is_pentagon(&self) -> bool {
        self.vertices.len() == 5
    }

    /// Latitude of the polygon's center, in radians. +Y is north. A center at
    /// the origin has no meaningful latitude, so it gets 0 (the equator).
    pub fn latitude(&self) -> f64 {
        let norm = self.center.norm();
        if norm < Self::DEGENERATE_NORM {
            0.0
        } else {
            (self.center.y / norm).clamp(-1.0, 1.0).asin()
        }
    }

    /// Unit vector pointing from the planet's center through this polygon's
    /// center. Falls back to +Y for a degenerate center.
    pub fn direction(&self) -> Vector3<f64> {
        self.center
            .try_normalize(Self::DEGENERATE_NORM)
            .unwrap_or_else(Vector3::y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use std::f64::consts::FRAC_PI_2;

    fn polygon_at(center: Vector3<f64>) -> Polygon {
        Polygon::new(center, vec![center; 6])
    }

    #[test]
    fn test_latitude() {
        assert_approx_eq!(
            polygon_at(Vector3::new(1.0, 0.0, 0.0)).latitude(),
            0.0
        );
        assert_approx_eq!(
            polygon_at(Vector3::new(0.0, 5.0, 0.0)).latitude(),
            FRAC_PI_2
        );
        assert_approx_eq!(
            polygon_at(Vector3::new(0.0, -2.0, 0.0)).latitude(),
            -FRAC_PI_2
        );
        assert_approx_eq!(
            polygon_at(Vector3::new(1.0, 1.0, 0.0)).latitude(),
            FRAC_PI_2 / 2.0
        );
    }

    #[test]
    fn test_latitude_degenerate() {
        let polygon = polygon_at(Vector3::zeros());
        assert_eq!(polygon.latitude(), 0.0);
        assert_eq!(polygon.direction(), Vector3::y());
    }
}
