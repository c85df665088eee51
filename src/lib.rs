/*!
Implicit surface reconstruction from an oriented point cloud, using a
polyharmonic radial-basis-function interpolant and marching cubes.

The pipeline turns sample points and their normals into signed scalar
constraints, fits the RBF interpolant with a dense direct solve, samples the
fitted implicit function over a voxel grid, and extracts the zero level-set
as a triangle-soup mesh.
*/

#![allow(clippy::type_complexity, clippy::too_many_arguments)]
#![warn(missing_docs)]

/// Floating-point type used by this library.
pub type Real = f64;

extern crate nalgebra as na;
extern crate parry3d_f64 as parry;

pub use self::constraint::{build_constraints, Constraint, ReconstructionParams};
pub use self::error::{ReconstructionError, Result};
pub use self::field::{expand_aabb, ScalarField};
pub use self::mesh::TriangleMesh;
pub use self::rbf::RbfReconstruction;

mod constraint;
mod error;
mod field;
mod linear_solver;
mod mesh;
mod rbf;
pub mod marching_cubes;
mod marching_cubes_tables;
