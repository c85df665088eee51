//! Reconstructs a sphere from a synthetic oriented point cloud and prints
//! mesh statistics. The triangle soup is exactly what a viewer would consume
//! as vertex/index buffers.

use nalgebra::{point, Point3, Vector3};
use rbf_reconstruction::{Real, ReconstructionParams, RbfReconstruction};

fn main() {
    // A Fibonacci-sphere sampling of the unit sphere, with exact normals.
    let n = 200;
    let golden = (1.0 + (5.0 as Real).sqrt()) / 2.0;
    let mut points: Vec<Point3<Real>> = Vec::with_capacity(n);
    let mut normals: Vec<Vector3<Real>> = Vec::with_capacity(n);

    for i in 0..n {
        let t = (i as Real + 0.5) / n as Real;
        let z = 1.0 - 2.0 * t;
        let r = (1.0 - z * z).sqrt();
        let a = std::f64::consts::TAU * (i as Real / golden).fract();
        let p = point![r * a.cos(), r * a.sin(), z];
        points.push(p);
        normals.push(p.coords);
    }

    let params = ReconstructionParams {
        sample_cap: Some(n / 5),
        ..Default::default()
    };

    let surface = RbfReconstruction::from_points_and_normals(&points, &normals, &params)
        .expect("sphere samples should produce a solvable system");

    println!(
        "constraints = {}, value at center = {:.3}, at 10x radius = {:.3}",
        surface.constraints().len(),
        surface.eval(&point![0.0, 0.0, 0.0]),
        surface.eval(&point![10.0, 0.0, 0.0]),
    );

    let mesh = surface.reconstruct_mesh(0.10, 64);
    println!(
        "mesh: {} vertices, {} triangles",
        mesh.vertices().len(),
        mesh.triangles().len()
    );
}
