//! Isosurface extraction with the classic marching-cubes case tables.

use crate::field::ScalarField;
use crate::marching_cubes_tables::{EDGE_TABLE, TRI_TABLE};
use crate::mesh::TriangleMesh;
use crate::Real;
use log::debug;
use na::Point3;

/// Offsets of the 8 cube corners in the canonical marching-cubes order.
pub const CORNER_OFFSETS: [[usize; 3]; 8] = [
    [0, 0, 0],
    [1, 0, 0],
    [1, 1, 0],
    [0, 1, 0],
    [0, 0, 1],
    [1, 0, 1],
    [1, 1, 1],
    [0, 1, 1],
];

/// Corner-index pairs of the 12 cube edges.
pub const EDGE_CORNERS: [[usize; 2]; 12] = [
    [0, 1],
    [1, 2],
    [2, 3],
    [3, 0],
    [4, 5],
    [5, 6],
    [6, 7],
    [7, 4],
    [0, 4],
    [1, 5],
    [2, 6],
    [3, 7],
];

/// Edges flatter than this are not interpolated.
const FLAT_EDGE_EPS: Real = 1.0e-12;

/// Interpolates the isosurface crossing along one cube edge.
///
/// When the endpoint values are (nearly) equal the first endpoint is
/// returned unchanged instead of dividing by the value difference.
pub fn interpolate_edge(
    iso: Real,
    p1: &Point3<Real>,
    p2: &Point3<Real>,
    v1: Real,
    v2: Real,
) -> Point3<Real> {
    let d = v2 - v1;

    if d.abs() < FLAT_EDGE_EPS {
        return *p1;
    }

    let t = ((iso - v1) / d).clamp(0.0, 1.0);
    *p1 + (*p2 - *p1) * t
}

/// Triangulates the isosurface inside a single cell and appends the result
/// to `mesh`.
///
/// `corners` and `values` follow [`CORNER_OFFSETS`] order. Bit `c` of the
/// case index is set iff `values[c] < iso`; cells the surface does not cross
/// append nothing. Every emitted triangle appends three fresh vertices.
pub fn march_cube(
    corners: &[Point3<Real>; 8],
    values: &[Real; 8],
    iso: Real,
    mesh: &mut TriangleMesh,
) {
    let mut case = 0usize;

    for (c, v) in values.iter().enumerate() {
        if *v < iso {
            case |= 1 << c;
        }
    }

    let edges = EDGE_TABLE[case];
    if edges == 0 {
        return;
    }

    let mut crossings = [Point3::origin(); 12];

    for (e, pair) in EDGE_CORNERS.iter().enumerate() {
        if edges & (1 << e) != 0 {
            crossings[e] = interpolate_edge(
                iso,
                &corners[pair[0]],
                &corners[pair[1]],
                values[pair[0]],
                values[pair[1]],
            );
        }
    }

    let tri = &TRI_TABLE[case];
    let mut t = 0;

    while tri[t] >= 0 {
        mesh.push_triangle(
            crossings[tri[t] as usize],
            crossings[tri[t + 1] as usize],
            crossings[tri[t + 2] as usize],
        );
        t += 3;
    }
}

/// Extracts the `iso` level-set of a sampled scalar field as a triangle soup.
///
/// Walks the `(R−1)³` cells of the grid; fields with `R < 2` have no cells
/// and yield an empty mesh.
pub fn marching_cubes(field: &ScalarField, iso: Real) -> TriangleMesh {
    let mut mesh = TriangleMesh::new();
    let r = field.resolution();

    if r < 2 {
        return mesh;
    }

    for k in 0..r - 1 {
        for j in 0..r - 1 {
            for i in 0..r - 1 {
                let mut corners = [Point3::origin(); 8];
                let mut values = [0.0; 8];

                for (c, off) in CORNER_OFFSETS.iter().enumerate() {
                    let (ci, cj, ck) = (i + off[0], j + off[1], k + off[2]);
                    corners[c] = field.node_position(ci, cj, ck);
                    values[c] = field.value(ci, cj, ck);
                }

                march_cube(&corners, &values, iso, &mut mesh);
            }
        }
    }

    debug!(
        "marching cubes: {} vertices, {} triangles",
        mesh.vertices().len(),
        mesh.triangles().len()
    );

    mesh
}

#[cfg(test)]
mod test {
    use super::*;
    use parry::bounding_volume::Aabb;
    use na::point;

    fn sphere_field(radius: Real, resolution: usize) -> ScalarField {
        let aabb = Aabb::new(point![-1.0, -1.0, -1.0], point![1.0, 1.0, 1.0]);
        let center = aabb.center();
        ScalarField::from_fn(aabb, resolution, |pt| na::distance(pt, &center) - radius)
    }

    #[test]
    fn flat_edge_returns_the_first_endpoint() {
        let p1 = point![1.0, 2.0, 3.0];
        let p2 = point![4.0, 5.0, 6.0];
        assert_eq!(interpolate_edge(0.0, &p1, &p2, 0.5, 0.5), p1);
    }

    #[test]
    fn crossing_is_clamped_to_the_edge() {
        let p1 = point![0.0, 0.0, 0.0];
        let p2 = point![1.0, 0.0, 0.0];

        let mid = interpolate_edge(0.0, &p1, &p2, -1.0, 1.0);
        assert_eq!(mid, point![0.5, 0.0, 0.0]);

        // Iso value outside the endpoint range clamps to an endpoint.
        let clamped = interpolate_edge(5.0, &p1, &p2, -1.0, 1.0);
        assert_eq!(clamped, p2);
    }

    #[test]
    fn sphere_inside_the_grid_produces_a_surface() {
        let mesh = marching_cubes(&sphere_field(0.5, 16), 0.0);

        assert!(!mesh.is_empty());
        assert_eq!(mesh.vertices().len(), 3 * mesh.triangles().len());

        let total_area: Real = (0..mesh.triangles().len())
            .map(|t| mesh.triangle_area(t))
            .sum();
        assert!(total_area > 0.0);

        // Every vertex sits near the sphere (within a cell diagonal).
        let cell = 2.0 / 15.0;
        for v in mesh.vertices() {
            let d = (v.coords.norm() - 0.5).abs();
            assert!(d < cell * 2.0, "vertex {v:?} too far from the sphere");
        }
    }

    #[test]
    fn sphere_outside_the_grid_produces_nothing() {
        // Radius beyond the grid half-extent: no cell straddles the surface.
        let mesh = marching_cubes(&sphere_field(10.0, 16), 0.0);
        assert!(mesh.is_empty());
    }

    #[test]
    fn degenerate_grids_produce_nothing() {
        let mesh = marching_cubes(&sphere_field(0.5, 1), 0.0);
        assert!(mesh.is_empty());
    }

    #[test]
    fn uniform_field_activates_no_cell() {
        let aabb = Aabb::new(point![0.0, 0.0, 0.0], point![1.0, 1.0, 1.0]);
        let field = ScalarField::from_fn(aabb, 4, |_| 1.0);
        assert!(marching_cubes(&field, 0.0).is_empty());
    }
}
