//! Triangle-soup mesh accumulated by the mesher.

use crate::Real;
use na::Point3;

/// A triangle mesh without shared-vertex topology.
///
/// Vertices and triangles are append-only; every pushed triangle owns three
/// freshly appended vertices, so `vertices().len() == 3 * triangles().len()`
/// always holds and no vertex is ever shared between triangles or cells.
#[derive(Clone, Debug, Default)]
#[cfg_attr(
    feature = "serde-serialize",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct TriangleMesh {
    vertices: Vec<Point3<Real>>,
    triangles: Vec<[u32; 3]>,
}

impl TriangleMesh {
    /// Creates an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one triangle as three fresh vertices plus an index triple.
    pub fn push_triangle(&mut self, a: Point3<Real>, b: Point3<Real>, c: Point3<Real>) {
        let base = self.vertices.len() as u32;
        self.vertices.push(a);
        self.vertices.push(b);
        self.vertices.push(c);
        self.triangles.push([base, base + 1, base + 2]);
    }

    /// Flat list of vertex positions, three per triangle.
    pub fn vertices(&self) -> &[Point3<Real>] {
        &self.vertices
    }

    /// Triangle index triples into [`Self::vertices`].
    pub fn triangles(&self) -> &[[u32; 3]] {
        &self.triangles
    }

    /// Does this mesh contain no triangles?
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Area of triangle `tri`. Zero for degenerate triangles.
    pub fn triangle_area(&self, tri: usize) -> Real {
        let [a, b, c] = self.triangles[tri];
        let pa = self.vertices[a as usize];
        let pb = self.vertices[b as usize];
        let pc = self.vertices[c as usize];
        (pb - pa).cross(&(pc - pa)).norm() / 2.0
    }
}
