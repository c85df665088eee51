//! Signed scalar constraints built from sampled (position, normal) pairs.

use crate::Real;
use log::debug;
use na::{Point3, Vector3};
use parry::bounding_volume::Aabb;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Normals shorter than this are treated as degenerate.
const DEGENERATE_NORMAL_EPS: Real = 1.0e-12;

/// A single interpolation constraint: a target scalar value at a position.
///
/// The target is `0` on the surface, `+1` at the outward offset and `-1` at
/// the inward offset. The index of a constraint in its sequence is also its
/// row/column in the kernel system and its entry in the weight vector.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde-serialize",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Constraint {
    /// Position of the constraint.
    pub position: Point3<Real>,
    /// Target value of the implicit function at [`Self::position`].
    pub value: Real,
}

/// Tunable parameters of the reconstruction pipeline.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ReconstructionParams {
    /// Maximum number of points used to generate constraints. `None` means
    /// one fifth of the input cloud.
    pub sample_cap: Option<usize>,
    /// Offset distance of the ±1 constraints, as a fraction of the input
    /// cloud's bounding-box diagonal.
    pub offset_fraction: Real,
    /// Constant added to the kernel matrix diagonal to stabilize
    /// near-singular configurations.
    pub regularization: Real,
    /// Seed of the subsampling shuffle. Runs with the same seed, input order
    /// and cap pick the same points.
    pub seed: u64,
}

impl Default for ReconstructionParams {
    fn default() -> Self {
        Self {
            sample_cap: None,
            offset_fraction: 0.01,
            regularization: 1.0e-8,
            seed: 0,
        }
    }
}

impl ReconstructionParams {
    /// The sample cap applied to a cloud of `num_points` points.
    pub fn effective_sample_cap(&self, num_points: usize) -> usize {
        self.sample_cap.unwrap_or(num_points / 5)
    }
}

/// Builds the ordered constraint sequence for an oriented point cloud.
///
/// If the cloud exceeds the sample cap, a deterministic seeded subsample is
/// used instead of every point; the offset distance is still derived from
/// the bounding-box diagonal of the *full* cloud. A point with a (near-)zero
/// normal contributes a single on-surface constraint instead of three.
pub fn build_constraints(
    points: &[Point3<Real>],
    normals: &[Vector3<Real>],
    params: &ReconstructionParams,
) -> Vec<Constraint> {
    assert_eq!(
        points.len(),
        normals.len(),
        "Exactly one normal per point must be provided."
    );

    if points.is_empty() {
        return Vec::new();
    }

    let cap = params.effective_sample_cap(points.len());
    let sampled = subsample_indices(points.len(), cap, params.seed);

    let diagonal = Aabb::from_points(points).extents().norm();
    let eps = params.offset_fraction * diagonal;

    let mut constraints = Vec::with_capacity(sampled.len() * 3);

    for &pid in &sampled {
        let p = points[pid];
        let n = normals[pid];

        if n.norm() < DEGENERATE_NORMAL_EPS {
            constraints.push(Constraint {
                position: p,
                value: 0.0,
            });
            continue;
        }

        let n = n.normalize();
        constraints.push(Constraint {
            position: p,
            value: 0.0,
        });
        constraints.push(Constraint {
            position: p + n * eps,
            value: 1.0,
        });
        constraints.push(Constraint {
            position: p - n * eps,
            value: -1.0,
        });
    }

    debug!(
        "sampled {}/{} points, eps = {eps}, {} constraints",
        sampled.len(),
        points.len(),
        constraints.len()
    );

    constraints
}

/// Picks at most `cap` indices out of `0..len` with a seeded Fisher–Yates
/// shuffle. Returns every index when `len <= cap`.
fn subsample_indices(len: usize, cap: usize, seed: u64) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..len).collect();

    if len > cap {
        let mut rng = StdRng::seed_from_u64(seed);
        indices.shuffle(&mut rng);
        indices.truncate(cap);
    }

    indices
}

#[cfg(test)]
mod test {
    use super::*;
    use na::{point, vector};

    fn cube_face_points() -> (Vec<Point3<Real>>, Vec<Vector3<Real>>) {
        let points = vec![
            point![1.0, 0.0, 0.0],
            point![-1.0, 0.0, 0.0],
            point![0.0, 1.0, 0.0],
            point![0.0, -1.0, 0.0],
            point![0.0, 0.0, 1.0],
            point![0.0, 0.0, -1.0],
        ];
        let normals = points.iter().map(|p| p.coords).collect();
        (points, normals)
    }

    #[test]
    fn three_constraints_per_oriented_point() {
        let (points, normals) = cube_face_points();
        let params = ReconstructionParams {
            sample_cap: Some(6),
            ..Default::default()
        };
        let constraints = build_constraints(&points, &normals, &params);
        assert_eq!(constraints.len(), 18);
    }

    #[test]
    fn zero_normal_contributes_one_constraint() {
        let points = vec![point![0.0, 0.0, 0.0], point![1.0, 0.0, 0.0]];
        let normals = vec![vector![0.0, 0.0, 0.0], vector![1.0, 0.0, 0.0]];
        let params = ReconstructionParams {
            sample_cap: Some(2),
            ..Default::default()
        };
        let constraints = build_constraints(&points, &normals, &params);
        // 1 (degenerate) + 3 (oriented).
        assert_eq!(constraints.len(), 4);
        assert_eq!(constraints[0].value, 0.0);
    }

    #[test]
    fn offsets_sit_at_eps_along_the_normal() {
        let points = vec![point![0.0, 0.0, 0.0], point![10.0, 0.0, 0.0]];
        let normals = vec![vector![0.0, 2.0, 0.0], vector![0.0, 2.0, 0.0]];
        let params = ReconstructionParams {
            sample_cap: Some(2),
            ..Default::default()
        };
        let constraints = build_constraints(&points, &normals, &params);

        // Diagonal of the full cloud is 10, so eps = 0.1. Normals are
        // normalized before offsetting.
        let eps = 0.1;
        assert_eq!(constraints[0].position, point![0.0, 0.0, 0.0]);
        assert_eq!(constraints[0].value, 0.0);
        assert_eq!(constraints[1].position, point![0.0, eps, 0.0]);
        assert_eq!(constraints[1].value, 1.0);
        assert_eq!(constraints[2].position, point![0.0, -eps, 0.0]);
        assert_eq!(constraints[2].value, -1.0);
    }

    #[test]
    fn subsample_is_deterministic_and_capped() {
        let a = subsample_indices(100, 10, 42);
        let b = subsample_indices(100, 10, 42);
        assert_eq!(a, b);
        assert_eq!(a.len(), 10);
        assert!(a.iter().all(|&i| i < 100));

        let c = subsample_indices(100, 10, 43);
        assert_ne!(a, c);

        // No subsampling below the cap.
        assert_eq!(subsample_indices(5, 10, 0), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn empty_cloud_yields_no_constraints() {
        let constraints = build_constraints(&[], &[], &ReconstructionParams::default());
        assert!(constraints.is_empty());
    }
}
