//! RBF fitting and evaluation of the implicit function.

use crate::constraint::{build_constraints, Constraint, ReconstructionParams};
use crate::error::Result;
use crate::field::{expand_aabb, ScalarField};
use crate::linear_solver::solve_partial_pivoting;
use crate::marching_cubes::marching_cubes;
use crate::mesh::TriangleMesh;
use crate::Real;
use log::debug;
use na::{DMatrix, DVector, Point3, Vector3};
use parry::bounding_volume::Aabb;

/// The polyharmonic radial basis kernel `phi(r) = r`.
pub fn phi(r: Real) -> Real {
    r
}

/// An implicit surface fitted to an oriented point cloud by RBF
/// interpolation.
///
/// The zero level-set of [`Self::eval`] approximates the sampled surface;
/// values are negative inside and positive outside (following the sign of
/// the offset constraints).
#[derive(Clone)]
pub struct RbfReconstruction {
    constraints: Vec<Constraint>,
    weights: DVector<Real>,
    aabb: Aabb,
}

impl RbfReconstruction {
    /// Fits the implicit function to a point cloud with one normal per point.
    ///
    /// Constraint generation never fails (degenerate normals degrade to a
    /// single on-surface constraint), but the dense solve is fatal on a
    /// singular kernel system.
    pub fn from_points_and_normals(
        points: &[Point3<Real>],
        normals: &[Vector3<Real>],
        params: &ReconstructionParams,
    ) -> Result<Self> {
        assert_eq!(
            points.len(),
            normals.len(),
            "Exactly one normal per point must be provided."
        );

        let constraints = build_constraints(points, normals, params);
        let weights = fit(&constraints, params.regularization)?;
        let aabb = if points.is_empty() {
            Aabb::new_invalid()
        } else {
            Aabb::from_points(points)
        };

        Ok(Self {
            constraints,
            weights,
            aabb,
        })
    }

    /// The constraint sequence the weights were solved against.
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// The interpolation weights, one per constraint.
    pub fn weights(&self) -> &DVector<Real> {
        &self.weights
    }

    /// The bounding box of the input point cloud.
    pub fn aabb(&self) -> &Aabb {
        &self.aabb
    }

    /// Evaluates the fitted implicit function at the given 3D point.
    pub fn eval(&self, pt: &Point3<Real>) -> Real {
        eval_rbf(&self.constraints, self.weights.as_slice(), pt)
    }

    /// Samples the fitted function over the point cloud's bounding box grown
    /// by `padding_ratio`, then extracts the zero level-set with marching
    /// cubes on a `resolution`³ grid.
    pub fn reconstruct_mesh(&self, padding_ratio: Real, resolution: usize) -> TriangleMesh {
        let domain = expand_aabb(&self.aabb, padding_ratio);
        let field = ScalarField::from_fn(domain, resolution, |pt| self.eval(pt));
        marching_cubes(&field, 0.0)
    }
}

/// Evaluates `sum_j lambda_j * phi(dist(pt, x_j))` for an arbitrary
/// constraint sequence and weight slice.
///
/// Pure and stateless; bulk field sampling goes through this exact function.
pub fn eval_rbf(constraints: &[Constraint], weights: &[Real], pt: &Point3<Real>) -> Real {
    constraints
        .iter()
        .zip(weights.iter())
        .map(|(c, lambda)| lambda * phi(na::distance(pt, &c.position)))
        .sum()
}

/// Builds the `m×m` kernel matrix `A[(i, j)] = phi(dist(x_i, x_j))` with
/// `regularization` added to every diagonal entry.
fn kernel_matrix(constraints: &[Constraint], regularization: Real) -> DMatrix<Real> {
    let m = constraints.len();
    let mut a = DMatrix::from_fn(m, m, |i, j| {
        phi(na::distance(&constraints[i].position, &constraints[j].position))
    });

    for i in 0..m {
        a[(i, i)] += regularization;
    }

    a
}

fn fit(constraints: &[Constraint], regularization: Real) -> Result<DVector<Real>> {
    let m = constraints.len();
    let a = kernel_matrix(constraints, regularization);
    let y = DVector::from_iterator(m, constraints.iter().map(|c| c.value));

    debug!("solving dense RBF system of size {m}");
    solve_partial_pivoting(a, y)
}

#[cfg(test)]
mod test {
    use super::*;
    use na::point;

    fn cube_reconstruction() -> RbfReconstruction {
        let points = vec![
            point![1.0, 0.0, 0.0],
            point![-1.0, 0.0, 0.0],
            point![0.0, 1.0, 0.0],
            point![0.0, -1.0, 0.0],
            point![0.0, 0.0, 1.0],
            point![0.0, 0.0, -1.0],
        ];
        let normals: Vec<_> = points.iter().map(|p| p.coords).collect();
        let params = ReconstructionParams {
            sample_cap: Some(6),
            ..Default::default()
        };
        RbfReconstruction::from_points_and_normals(&points, &normals, &params).unwrap()
    }

    #[test]
    fn kernel_matrix_is_symmetric_before_regularization() {
        let surface = cube_reconstruction();
        let a = kernel_matrix(surface.constraints(), 0.0);

        for i in 0..a.nrows() {
            for j in 0..a.ncols() {
                assert_eq!(a[(i, j)], a[(j, i)]);
            }
        }
    }

    #[test]
    fn fitted_function_matches_its_constraints() {
        let surface = cube_reconstruction();
        assert_eq!(surface.constraints().len(), 18);

        for c in surface.constraints() {
            let v = surface.eval(&c.position);
            assert!(
                (v - c.value).abs() < 1.0e-4,
                "constraint at {:?}: expected {}, got {v}",
                c.position,
                c.value
            );
        }
    }

    #[test]
    fn sign_flips_between_center_and_far_outside() {
        let surface = cube_reconstruction();
        let inside = surface.eval(&point![0.0, 0.0, 0.0]);
        let outside = surface.eval(&point![100.0, 0.0, 0.0]);
        assert!(inside * outside < 0.0, "inside = {inside}, outside = {outside}");
    }

    #[test]
    fn eval_is_identical_in_bulk_and_one_off() {
        let surface = cube_reconstruction();
        let field = ScalarField::from_fn(*surface.aabb(), 4, |pt| surface.eval(pt));

        for k in 0..4 {
            for j in 0..4 {
                for i in 0..4 {
                    let pt = field.node_position(i, j, k);
                    assert_eq!(field.value(i, j, k), surface.eval(&pt));
                }
            }
        }
    }

    #[test]
    fn empty_cloud_fits_trivially() {
        let surface = RbfReconstruction::from_points_and_normals(
            &[],
            &[],
            &ReconstructionParams::default(),
        )
        .unwrap();
        assert!(surface.constraints().is_empty());
        assert_eq!(surface.eval(&point![1.0, 2.0, 3.0]), 0.0);
    }
}
