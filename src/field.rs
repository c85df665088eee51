//! Regular voxel grid sampling of the implicit function.

use crate::Real;
use log::debug;
use na::Point3;
use parry::bounding_volume::Aabb;

/// Grows `aabb` symmetrically about its center by `ratio`.
pub fn expand_aabb(aabb: &Aabb, ratio: Real) -> Aabb {
    Aabb::from_half_extents(aabb.center(), aabb.half_extents() * (1.0 + ratio))
}

/// A cubic `R×R×R` grid of scalar samples over an axis-aligned box.
///
/// Values are stored flat, addressed as `(k*R + j)*R + i`. Node `(i, j, k)`
/// maps to world space by independent per-axis linear interpolation across
/// the box; an axis with a single sample degenerates to the box minimum.
#[derive(Clone, Debug)]
pub struct ScalarField {
    resolution: usize,
    aabb: Aabb,
    values: Vec<Real>,
}

impl ScalarField {
    /// Samples `f` at every grid node of a `resolution`³ grid over `aabb`.
    ///
    /// Brute force: `f` is called once per node, in flat storage order.
    pub fn from_fn(
        aabb: Aabb,
        resolution: usize,
        mut f: impl FnMut(&Point3<Real>) -> Real,
    ) -> Self {
        let mut field = Self {
            resolution,
            aabb,
            values: Vec::with_capacity(resolution * resolution * resolution),
        };
        let mut min = Real::INFINITY;
        let mut max = Real::NEG_INFINITY;

        for k in 0..resolution {
            debug!("sampling field slice {}/{resolution}", k + 1);

            for j in 0..resolution {
                for i in 0..resolution {
                    let v = f(&field.node_position(i, j, k));
                    min = min.min(v);
                    max = max.max(v);
                    field.values.push(v);
                }
            }
        }

        // For an isosurface at 0 this range should straddle 0.
        debug!("field range [{min}, {max}]");
        field
    }

    /// Number of samples along each axis.
    pub fn resolution(&self) -> usize {
        self.resolution
    }

    /// The box the grid spans.
    pub fn aabb(&self) -> &Aabb {
        &self.aabb
    }

    /// The flat sample storage, addressed as `(k*R + j)*R + i`.
    pub fn values(&self) -> &[Real] {
        &self.values
    }

    /// Flat index of node `(i, j, k)`.
    pub fn index(&self, i: usize, j: usize, k: usize) -> usize {
        (k * self.resolution + j) * self.resolution + i
    }

    /// Sampled value at node `(i, j, k)`.
    pub fn value(&self, i: usize, j: usize, k: usize) -> Real {
        self.values[self.index(i, j, k)]
    }

    /// World-space position of node `(i, j, k)`.
    ///
    /// Endpoints land exactly on the box corners; `R = 1` maps every index
    /// to the box minimum without dividing by zero.
    pub fn node_position(&self, i: usize, j: usize, k: usize) -> Point3<Real> {
        Point3::new(
            self.axis_position(self.aabb.mins.x, self.aabb.maxs.x, i),
            self.axis_position(self.aabb.mins.y, self.aabb.maxs.y, j),
            self.axis_position(self.aabb.mins.z, self.aabb.maxs.z, k),
        )
    }

    fn axis_position(&self, min: Real, max: Real, idx: usize) -> Real {
        if self.resolution <= 1 || idx == 0 {
            min
        } else if idx == self.resolution - 1 {
            max
        } else {
            let t = idx as Real / (self.resolution - 1) as Real;
            min + t * (max - min)
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use na::point;

    fn unit_box() -> Aabb {
        Aabb::new(point![0.0, 0.0, 0.0], point![1.0, 2.0, 3.0])
    }

    #[test]
    fn grid_corners_map_exactly_to_the_box() {
        for r in [1usize, 2, 5, 64] {
            let field = ScalarField::from_fn(unit_box(), r, |_| 0.0);
            assert_eq!(field.node_position(0, 0, 0), point![0.0, 0.0, 0.0]);
            assert_eq!(
                field.node_position(r - 1, r - 1, r - 1),
                if r == 1 {
                    point![0.0, 0.0, 0.0]
                } else {
                    point![1.0, 2.0, 3.0]
                }
            );
        }
    }

    #[test]
    fn flat_storage_is_i_fastest() {
        let field = ScalarField::from_fn(unit_box(), 3, |pt| pt.x + 10.0 * pt.y + 100.0 * pt.z);
        assert_eq!(field.values().len(), 27);
        assert_eq!(field.index(1, 0, 0), 1);
        assert_eq!(field.index(0, 1, 0), 3);
        assert_eq!(field.index(0, 0, 1), 9);
        assert_eq!(field.index(2, 2, 2), 26);

        for k in 0..3 {
            for j in 0..3 {
                for i in 0..3 {
                    let pt = field.node_position(i, j, k);
                    assert_eq!(field.value(i, j, k), pt.x + 10.0 * pt.y + 100.0 * pt.z);
                }
            }
        }
    }

    #[test]
    fn single_sample_grid_sits_at_the_minimum() {
        let field = ScalarField::from_fn(unit_box(), 1, |_| 7.0);
        assert_eq!(field.values(), &[7.0]);
        assert_eq!(field.node_position(0, 0, 0), point![0.0, 0.0, 0.0]);
    }

    #[test]
    fn expanded_aabb_grows_about_the_center() {
        let aabb = Aabb::new(point![0.0, 0.0, 0.0], point![2.0, 2.0, 2.0]);
        let grown = expand_aabb(&aabb, 0.1);
        assert_eq!(grown.center(), aabb.center());
        assert!((grown.mins.x - -0.1).abs() < 1.0e-12);
        assert!((grown.maxs.x - 2.1).abs() < 1.0e-12);
    }
}
