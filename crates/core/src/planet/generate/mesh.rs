use crate::{
    planet::{
        generate::{Generate, PhaseProgress, PlanetBuilder},
        polygon::Polygon,
    },
    progress::GenerationPhase,
};
use anyhow::{anyhow, bail};
use log::{debug, info};
use nalgebra::{Rotation3, Vector3};

type Point = Vector3<f64>;

/// Two grid points closer than this are considered the same point
const EPSILON: f64 = 1e-10;

/// The 20 icosahedron faces, as `(left, tip, right)` vertex indexes. The
/// first 5 surround vertex 0, the next 5 surround vertex 6, and the last 10
/// make up the band around the middle.
const FACES: [[usize; 3]; 20] = [
    [1, 0, 2],
    [2, 0, 3],
    [3, 0, 4],
    [4, 0, 5],
    [5, 0, 1],
    [8, 6, 7],
    [9, 6, 8],
    [10, 6, 9],
    [11, 6, 10],
    [7, 6, 11],
    [3, 8, 2],
    [4, 9, 3],
    [5, 10, 4],
    [1, 11, 5],
    [2, 7, 1],
    [7, 2, 8],
    [8, 3, 9],
    [9, 4, 10],
    [10, 5, 11],
    [11, 1, 7],
];

/// Pairs of faces that share an edge. Each edge gets a strip of hexagons
/// that straddles the two faces.
const EDGES: [(usize, usize); 30] = [
    (0, 1),
    (1, 2),
    (2, 3),
    (3, 4),
    (4, 0),
    (0, 14),
    (1, 10),
    (2, 11),
    (3, 12),
    (4, 13),
    (9, 8),
    (8, 7),
    (7, 6),
    (6, 5),
    (5, 9),
    (9, 19),
    (8, 18),
    (7, 17),
    (6, 16),
    (5, 15),
    (19, 13),
    (18, 12),
    (17, 11),
    (16, 10),
    (15, 14),
    (14, 19),
    (10, 15),
    (11, 16),
    (12, 17),
    (13, 18),
];

/// A grid point near one corner of a face, which becomes a pentagon vertex
#[derive(Copy, Clone, Debug)]
enum Corner {
    /// Next to the face's tip
    Tip,
    /// Next to the face's left corner
    Left,
    /// Next to the face's right corner
    Right,
}

impl Corner {
    /// Index of this point within a face grid of level `n`
    fn grid_index(self, n: usize, grid_len: usize) -> usize {
        match self {
            Self::Tip => grid_len - 2,
            Self::Left => n + 1,
            Self::Right => 2 * n,
        }
    }
}

/// The 5 vertices of the pentagon centered on each icosahedron vertex, as
/// `(face, corner)`. Listed in the same winding order as the hexagons.
const PENTAGONS: [[(usize, Corner); 5]; 12] = {
    use Corner::*;
    [
        [(4, Tip), (3, Tip), (2, Tip), (1, Tip), (0, Tip)],
        [(4, Right), (0, Left), (14, Right), (19, Tip), (13, Left)],
        [(0, Right), (1, Left), (10, Right), (15, Tip), (14, Left)],
        [(1, Right), (2, Left), (11, Right), (16, Tip), (10, Left)],
        [(2, Right), (3, Left), (12, Right), (17, Tip), (11, Left)],
        [(3, Right), (4, Left), (13, Right), (18, Tip), (12, Left)],
        [(5, Tip), (6, Tip), (7, Tip), (8, Tip), (9, Tip)],
        [(14, Tip), (15, Left), (5, Right), (9, Left), (19, Right)],
        [(10, Tip), (16, Left), (6, Right), (5, Left), (15, Right)],
        [(11, Tip), (17, Left), (7, Right), (6, Left), (16, Right)],
        [(12, Tip), (18, Left), (8, Right), (7, Left), (17, Right)],
        [(13, Tip), (19, Left), (9, Right), (8, Left), (18, Right)],
    ]
};

/// Generates the Goldberg polyhedron that the rest of the planet is built on
#[derive(Copy, Clone, Debug)]
pub struct MeshGenerator;

impl Generate for MeshGenerator {
    const PHASE: GenerationPhase = GenerationPhase::Mesh;

    fn generate(
        &self,
        planet: &mut PlanetBuilder,
        _progress: &mut PhaseProgress,
    ) -> anyhow::Result<()> {
        let polygons = goldberg_polygons(planet.config.subdivisions as usize)?;
        info!("Built mesh with {} polygons", polygons.len());
        planet.polygons = Some(polygons);
        Ok(())
    }
}

/// Build every polygon of a Goldberg polyhedron with subdivision level `n`.
/// The output has exactly `10n²+2` polygons: 12 pentagons first, then the
/// hexagons inside each face, then the hexagons straddling each face edge.
/// Every vertex ends up on the same sphere, sized so that adjacent vertices
/// are 1 unit apart.
pub fn goldberg_polygons(n: usize) -> anyhow::Result<Vec<Polygon>> {
    if n < 2 {
        bail!("subdivision level must be at least 2, got {}", n);
    }

    let corners = icosahedron();
    let grids: Vec<Vec<Point>> = FACES
        .iter()
        .map(|&[left, tip, right]| {
            hex_grid(&corners[left], &corners[tip], &corners[right], n)
        })
        .collect();
    let grid_len = grids[0].len();

    let mut shapes: Vec<(Point, Vec<Point>)> =
        Vec::with_capacity(10 * n * n + 2);

    // Pentagons, one on each icosahedron vertex
    for (corner, vertices) in corners.iter().zip(PENTAGONS.iter()) {
        let vertices = vertices
            .iter()
            .map(|&(face, point)| grids[face][point.grid_index(n, grid_len)])
            .collect();
        shapes.push((*corner, vertices));
    }

    // Hexagons fully inside each face
    for grid in &grids {
        for y in 1..n - 1 {
            for x in 1..n - y {
                let center = row_start(n, y) + x;
                let offset = n - y;
                shapes.push((
                    grid[center],
                    vec![
                        grid[center + 2 * offset],
                        grid[center + offset + 1],
                        grid[center - offset],
                        grid[center - 2 * offset - 1],
                        grid[center - offset - 1],
                        grid[center + offset],
                    ],
                ));
            }
        }
    }

    // Hexagons along each edge, with vertices from both faces
    for &(left, right) in &EDGES {
        let (left, right) = (&grids[left], &grids[right]);
        let geometry = EdgeGeometry::detect(left, right, n)?;
        shapes.extend((1..n).map(|i| geometry.hexagon(left, right, n, i)));
    }

    let polygons = project(shapes)?;
    debug!("Mesh radius {:.4}", polygons[0].vertices()[0].norm());
    Ok(polygons)
}

/// The 12 vertices of a regular icosahedron, tilted so the poles don't sit
/// exactly on a vertex
fn icosahedron() -> [Point; 12] {
    let side = 1.0 + (5.0_f64.sqrt() - 1.0) / 2.0;
    let half = side / 2.0;
    let tilt =
        Rotation3::from_axis_angle(&Vector3::x_axis(), -(1.0 / side).atan());
    [
        Point::new(0.0, half, 0.5),
        Point::new(-0.5, 0.0, half),
        Point::new(0.5, 0.0, half),
        Point::new(half, 0.5, 0.0),
        Point::new(0.0, half, -0.5),
        Point::new(-half, 0.5, 0.0),
        Point::new(0.0, -half, -0.5),
        Point::new(0.0, -half, 0.5),
        Point::new(half, -0.5, 0.0),
        Point::new(0.5, 0.0, -half),
        Point::new(-0.5, 0.0, -half),
        Point::new(-half, -0.5, 0.0),
    ]
    .map(|point| tilt * point)
}

/// Index of the first point in row `y` of a face grid. Row `y` holds the
/// points of the `y`th nested triangle, working in from the face's edges.
fn row_start(n: usize, y: usize) -> usize {
    3 * y * (2 * n + 1 - y) / 2
}

/// `k+1` evenly spaced points from `start` to `end` (or just `start` if `k`
/// is 0)
fn point_line(start: &Point, end: &Point, k: usize, out: &mut Vec<Point>) {
    if k == 0 {
        out.push(*start);
        return;
    }
    let step = (end - start) / k as f64;
    out.extend((0..=k).map(|i| start + step * i as f64));
}

/// The points along three lines across a triangle: the base and the next two
/// lines toward the tip. Each line has one fewer segment than the last, so
/// near the tip there may be fewer than three lines.
fn three_lines(
    left: &Point,
    tip: &Point,
    right: &Point,
    k: usize,
    out: &mut Vec<Point>,
) {
    if k == 0 {
        out.push(*tip);
        return;
    }
    let base = (right - left) / (2 * k) as f64;
    let middle = left + (right - left) / 2.0;
    let up = (tip - middle) / (3 * k) as f64;
    for i in 0..3.min(k + 1) {
        let shift = up * i as f64;
        let start = left + base * i as f64 + shift;
        let end = right - base * i as f64 + shift;
        point_line(&start, &end, k - i, out);
    }
}

/// Sample a triangular face into a grid of `1 + 3n(n+1)/2` points. The grid
/// is built as nested triangles, each contributing three rows.
fn hex_grid(
    left: &Point,
    tip: &Point,
    right: &Point,
    n: usize,
) -> Vec<Point> {
    let mut grid = Vec::with_capacity(1 + 3 * n * (n + 1) / 2);
    let base = (right - left) / (2 * n) as f64;
    let middle = left + (right - left) / 2.0;
    let up = (tip - middle) / n as f64;
    for i in 0..=n {
        let shift = up * i as f64;
        let start = left + base * i as f64 + shift;
        let end = right - base * i as f64 + shift;
        three_lines(&start, tip, &end, n - i, &mut grid);
    }
    grid
}

fn same_point(a: &Point, b: &Point) -> bool {
    (a - b).norm() < EPSILON
}

/// How two faces meet along a shared edge. This determines which grid
/// points on each side make up the straddling hexagons.
#[derive(Copy, Clone, Debug, PartialEq)]
enum EdgeGeometry {
    /// The faces share their tips
    Tips,
    /// The faces share their bases
    Bottoms,
    /// The right face's tip touches the left face's left corner
    Clockwise,
    /// The left face's tip touches the right face's right corner
    Anticlockwise,
}

impl EdgeGeometry {
    /// Figure out how two faces meet by checking which corner points
    /// coincide
    fn detect(
        left: &[Point],
        right: &[Point],
        n: usize,
    ) -> anyhow::Result<Self> {
        let last = left.len() - 1;
        if same_point(&left[last], &right[last]) {
            Ok(Self::Tips)
        } else if same_point(&left[0], &right[n]) {
            Ok(Self::Bottoms)
        } else if same_point(&left[0], &right[last]) {
            Ok(Self::Clockwise)
        } else if same_point(&left[last], &right[n]) {
            Ok(Self::Anticlockwise)
        } else {
            Err(anyhow!("faces do not share an edge"))
        }
    }

    /// The `i`th hexagon (`1 <= i < n`) along the edge
    fn hexagon(
        self,
        left: &[Point],
        right: &[Point],
        n: usize,
        i: usize,
    ) -> (Point, Vec<Point>) {
        match self {
            Self::Tips => {
                let r = row_start(n, i);
                let l = r + (n - i);
                let o = n - i;
                (
                    right[r],
                    vec![
                        right[r + o + 1],
                        right[r - o],
                        right[r - 2 * o - 1],
                        left[l - 2 * o - 1],
                        left[l - (o + 1)],
                        left[l + o],
                    ],
                )
            }
            Self::Bottoms => {
                let t = i;
                let b = n - i;
                (
                    left[t],
                    vec![
                        left[t + n],
                        left[t + 2 * n],
                        left[t + n + 1],
                        right[b + n],
                        right[b + 2 * n],
                        right[b + n + 1],
                    ],
                )
            }
            Self::Clockwise => {
                let l = row_start(n, n - i);
                let r = row_start(n, i);
                let o = n - i;
                (
                    right[r],
                    vec![
                        right[r + o + 1],
                        right[r - o],
                        right[r - 2 * o - 1],
                        left[l + i + 1],
                        left[l - i],
                        left[l - 2 * i - 1],
                    ],
                )
            }
            Self::Anticlockwise => {
                let o = n - i;
                let l = row_start(n, i) + o;
                let r = row_start(n, o) + i;
                (
                    right[r],
                    vec![
                        right[r - 2 * i - 1],
                        right[r - i - 1],
                        right[r + i],
                        left[l - 2 * o - 1],
                        left[l - o - 1],
                        left[l + o],
                    ],
                )
            }
        }
    }
}

/// Push every point out onto a sphere, then pull each center back onto the
/// plane of its vertices. The radius is chosen so that two adjacent vertices
/// of the first polygon end up exactly 1 unit apart.
fn project(shapes: Vec<(Point, Vec<Point>)>) -> anyhow::Result<Vec<Polygon>> {
    let (_, first) = shapes
        .first()
        .ok_or_else(|| anyhow!("cannot project empty mesh"))?;
    let cos_theta = first[0].normalize().dot(&first[1].normalize());
    let radius = (1.0 / (2.0 * (1.0 - cos_theta))).sqrt();

    Ok(shapes
        .into_iter()
        .map(|(center, vertices)| {
            let center = center.normalize() * radius;
            let vertices: Vec<Point> = vertices
                .into_iter()
                .map(|vertex| vertex.normalize() * radius)
                .collect();
            let scale = vertices[0].dot(&center) / center.norm_squared();
            Polygon::new(center * scale, vertices)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use crate::PlanetSize;

    #[test]
    fn test_grid_size() {
        let corners = icosahedron();
        for n in [2, 3, 11] {
            let grid = hex_grid(&corners[1], &corners[0], &corners[2], n);
            assert_eq!(grid.len(), 1 + 3 * n * (n + 1) / 2);
            // The tip is always the very last grid point
            assert!(same_point(&grid[grid.len() - 1], &corners[0]));
        }
    }

    #[test]
    fn test_edge_geometry() {
        let corners = icosahedron();
        let grids: Vec<Vec<Point>> = FACES
            .iter()
            .map(|&[l, t, r]| {
                hex_grid(&corners[l], &corners[t], &corners[r], 3)
            })
            .collect();
        let geometries: Vec<EdgeGeometry> = EDGES
            .iter()
            .map(|&(l, r)| {
                EdgeGeometry::detect(&grids[l], &grids[r], 3).unwrap()
            })
            .collect();

        use EdgeGeometry::*;
        assert_eq!(geometries[0..5], [Tips; 5]);
        assert_eq!(geometries[5..10], [Bottoms; 5]);
        assert_eq!(geometries[10..15], [Tips; 5]);
        assert_eq!(geometries[15..20], [Bottoms; 5]);
        assert_eq!(geometries[20..25], [Clockwise; 5]);
        assert_eq!(geometries[25..30], [Anticlockwise; 5]);
    }

    #[test]
    fn test_polygon_count() {
        for n in [2, 3, 5, 11] {
            let polygons = goldberg_polygons(n).unwrap();
            assert_eq!(polygons.len(), 10 * n * n + 2);
            let pentagons = polygons.iter().filter(|p| p.is_pentagon());
            assert_eq!(pentagons.count(), 12);
            assert!(polygons[..12].iter().all(Polygon::is_pentagon));
        }
    }

    #[test]
    fn test_vertices_on_sphere() {
        let polygons = goldberg_polygons(3).unwrap();
        let radius = polygons[0].vertices()[0].norm();
        for polygon in &polygons {
            for vertex in polygon.vertices() {
                assert_approx_eq!(vertex.norm(), radius, 1e-9);
            }
            // Centers get pulled in below the surface
            assert!(polygon.center().norm() < radius);
        }
        // Adjacent vertices are 1 unit apart
        let pentagon = polygons[0].vertices();
        assert_approx_eq!((pentagon[0] - pentagon[1]).norm(), 1.0, 1e-9);
    }

    #[test]
    fn test_level_2_radius() {
        // At level 2, the radius works out to exactly 3
        let polygons = goldberg_polygons(2).unwrap();
        assert_approx_eq!(polygons[0].vertices()[0].norm(), 3.0, 1e-9);
    }

    #[test]
    fn test_lines_near_tip() {
        let corners = icosahedron();
        let mut out = Vec::new();
        // One segment left: a 2-point base and a single point above it
        three_lines(&corners[1], &corners[0], &corners[2], 1, &mut out);
        assert_eq!(out.len(), 3);
        out.clear();
        three_lines(&corners[1], &corners[0], &corners[2], 0, &mut out);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_smallest_subdivision() {
        let n = PlanetSize::Duel.subdivisions() as usize;
        let polygons = goldberg_polygons(n).unwrap();
        assert_eq!(polygons.len(), 10 * n * n + 2);
    }

    #[test]
    fn test_too_small() {
        assert!(goldberg_polygons(1).is_err());
    }
}
