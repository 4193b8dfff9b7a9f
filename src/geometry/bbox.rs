//! Axis-aligned bounding boxes.

use nalgebra::Vector3;

use super::ray::TraversalRay;

/// An axis-aligned box, or nothing at all.
///
/// Replaces the classic "canonical empty box at (0,0,0)-(0,0,0)" sentinel
/// with an explicit variant so emptiness can't be mistaken for a
/// degenerate box that happens to sit at the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoundingBox {
    Empty,
    Bounded { min: Vector3<f64>, max: Vector3<f64> },
}

impl BoundingBox {
    pub fn empty() -> Self {
        BoundingBox::Empty
    }

    pub fn from_point(p: Vector3<f64>) -> Self {
        BoundingBox::Bounded { min: p, max: p }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, BoundingBox::Empty)
    }

    /// Canonical min, `(0,0,0)` for an empty box.
    pub fn min(&self) -> Vector3<f64> {
        match self {
            BoundingBox::Empty => Vector3::zeros(),
            BoundingBox::Bounded { min, .. } => *min,
        }
    }

    /// Canonical max, `(0,0,0)` for an empty box.
    pub fn max(&self) -> Vector3<f64> {
        match self {
            BoundingBox::Empty => Vector3::zeros(),
            BoundingBox::Bounded { max, .. } => *max,
        }
    }

    pub fn extent(&self) -> Vector3<f64> {
        self.max() - self.min()
    }

    /// Extend this box to cover `p`.
    pub fn include(&mut self, p: Vector3<f64>) {
        *self = match *self {
            BoundingBox::Empty => BoundingBox::Bounded { min: p, max: p },
            BoundingBox::Bounded { min, max } => BoundingBox::Bounded {
                min: min.zip_map(&p, |a, b| a.min(b)),
                max: max.zip_map(&p, |a, b| a.max(b)),
            },
        };
    }

    /// Extend this box to cover `other`.
    pub fn include_box(&mut self, other: &BoundingBox) {
        if let BoundingBox::Bounded { min, max } = other {
            self.include(*min);
            self.include(*max);
        }
    }

    /// Intersect this box with `other`, collapsing to `Empty` if any axis
    /// of the result is degenerate.
    pub fn intersect_with(&self, other: &BoundingBox) -> BoundingBox {
        let (a_min, a_max) = match self {
            BoundingBox::Empty => return BoundingBox::Empty,
            BoundingBox::Bounded { min, max } => (*min, *max),
        };
        let (b_min, b_max) = match other {
            BoundingBox::Empty => return BoundingBox::Empty,
            BoundingBox::Bounded { min, max } => (*min, *max),
        };

        let min = a_min.zip_map(&b_min, |a, b| a.max(b));
        let max = a_max.zip_map(&b_max, |a, b| a.min(b));

        if min.x >= max.x || min.y >= max.y || min.z >= max.z {
            BoundingBox::Empty
        } else {
            BoundingBox::Bounded { min, max }
        }
    }

    /// Set the max coordinate on `dim` to `value`, clipping the box from
    /// above. Used when carving out the left child of a kd-tree split.
    pub fn with_max_dim(&self, dim: usize, value: f64) -> BoundingBox {
        match self {
            BoundingBox::Empty => BoundingBox::Empty,
            BoundingBox::Bounded { min, max } => {
                let mut max = *max;
                max[dim] = value;
                BoundingBox::Bounded { min: *min, max }
            }
        }
    }

    /// Set the min coordinate on `dim` to `value`, clipping the box from
    /// below. Used when carving out the right child of a kd-tree split.
    pub fn with_min_dim(&self, dim: usize, value: f64) -> BoundingBox {
        match self {
            BoundingBox::Empty => BoundingBox::Empty,
            BoundingBox::Bounded { min, max } => {
                let mut min = *min;
                min[dim] = value;
                BoundingBox::Bounded { min, max: *max }
            }
        }
    }

    /// Modified Smits method: does `ray` intersect this box within
    /// `[t0, t1]`? Implemented and tested but not on the hot traversal
    /// path (see design notes) -- `Scene::intersect` clips against the
    /// scene box directly instead.
    pub fn intersect_test(&self, ray: &TraversalRay, t0: f64, t1: f64) -> bool {
        let (min, max) = match self {
            BoundingBox::Empty => return false,
            BoundingBox::Bounded { min, max } => (*min, *max),
        };

        let mut tmin;
        let mut tmax;

        if ray.inv_direction.x < 0.0 {
            tmin = (max.x - ray.origin.x) * ray.inv_direction.x;
            tmax = (min.x - ray.origin.x) * ray.inv_direction.x;
        } else {
            tmin = (min.x - ray.origin.x) * ray.inv_direction.x;
            tmax = (max.x - ray.origin.x) * ray.inv_direction.x;
        }

        let tymin;
        let tymax;
        if ray.inv_direction.y < 0.0 {
            tymin = (max.y - ray.origin.y) * ray.inv_direction.y;
            tymax = (min.y - ray.origin.y) * ray.inv_direction.y;
        } else {
            tymin = (min.y - ray.origin.y) * ray.inv_direction.y;
            tymax = (max.y - ray.origin.y) * ray.inv_direction.y;
        }

        if tmin > tymax || tymin > tmax {
            return false;
        }
        if tymin > tmin {
            tmin = tymin;
        }
        if tymax < tmax {
            tmax = tymax;
        }

        let tzmin;
        let tzmax;
        if ray.inv_direction.z < 0.0 {
            tzmin = (max.z - ray.origin.z) * ray.inv_direction.z;
            tzmax = (min.z - ray.origin.z) * ray.inv_direction.z;
        } else {
            tzmin = (min.z - ray.origin.z) * ray.inv_direction.z;
            tzmax = (max.z - ray.origin.z) * ray.inv_direction.z;
        }

        if tmin > tzmax || tzmin > tmax {
            return false;
        }
        if tzmin > tmin {
            tmin = tzmin;
        }
        if tzmax < tmax {
            tmax = tzmax;
        }

        tmin < t1 && tmax > t0
    }
}

/// The SAH surface-area proxy: `wh + wd + hd` for an extent `(w,h,d)`.
/// Proportional to half the true surface area; the constant factor
/// cancels out in every cost comparison, so it is never applied.
pub fn area_compute(extent: Vector3<f64>) -> f64 {
    extent.x * extent.y + extent.x * extent.z + extent.y * extent.z
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::ray::Ray;
    use approx::assert_relative_eq;

    #[test]
    fn empty_box_has_zero_extent() {
        let b = BoundingBox::empty();
        assert!(b.is_empty());
        assert_eq!(b.extent(), Vector3::zeros());
    }

    #[test]
    fn include_grows_box() {
        let mut b = BoundingBox::empty();
        b.include(Vector3::new(1.0, 2.0, 3.0));
        b.include(Vector3::new(-1.0, 0.0, 5.0));
        assert_eq!(b.min(), Vector3::new(-1.0, 0.0, 3.0));
        assert_eq!(b.max(), Vector3::new(1.0, 2.0, 5.0));
    }

    #[test]
    fn intersect_with_disjoint_is_empty() {
        let a = BoundingBox::Bounded {
            min: Vector3::new(0.0, 0.0, 0.0),
            max: Vector3::new(1.0, 1.0, 1.0),
        };
        let b = BoundingBox::Bounded {
            min: Vector3::new(2.0, 2.0, 2.0),
            max: Vector3::new(3.0, 3.0, 3.0),
        };
        assert!(a.intersect_with(&b).is_empty());
    }

    #[test]
    fn intersect_with_overlapping() {
        let a = BoundingBox::Bounded {
            min: Vector3::new(0.0, 0.0, 0.0),
            max: Vector3::new(2.0, 2.0, 2.0),
        };
        let b = BoundingBox::Bounded {
            min: Vector3::new(1.0, 1.0, 1.0),
            max: Vector3::new(3.0, 3.0, 3.0),
        };
        let c = a.intersect_with(&b);
        assert_eq!(c.min(), Vector3::new(1.0, 1.0, 1.0));
        assert_eq!(c.max(), Vector3::new(2.0, 2.0, 2.0));
    }

    #[test]
    fn area_compute_matches_formula() {
        let extent = Vector3::new(1.0, 2.0, 3.0);
        assert_relative_eq!(area_compute(extent), 1.0 * 2.0 + 1.0 * 3.0 + 2.0 * 3.0, epsilon = 1e-12);
    }

    #[test]
    fn ray_hits_unit_cube() {
        let cube = BoundingBox::Bounded {
            min: Vector3::new(-1.0, -1.0, -1.0),
            max: Vector3::new(1.0, 1.0, 1.0),
        };
        let ray = Ray::new(Vector3::new(0.0, 0.0, 5.0), Vector3::new(0.0, 0.0, -1.0));
        let tray = TraversalRay::new(&ray);
        assert!(cube.intersect_test(&tray, 1e-10, 100.0));
    }

    #[test]
    fn ray_misses_unit_cube() {
        let cube = BoundingBox::Bounded {
            min: Vector3::new(-1.0, -1.0, -1.0),
            max: Vector3::new(1.0, 1.0, 1.0),
        };
        let ray = Ray::new(Vector3::new(5.0, 5.0, 5.0), Vector3::new(0.0, 0.0, -1.0));
        let tray = TraversalRay::new(&ray);
        assert!(!cube.intersect_test(&tray, 1e-10, 100.0));
    }

    #[test]
    fn ray_with_zero_direction_component_hits() {
        let cube = BoundingBox::Bounded {
            min: Vector3::new(-1.0, -1.0, -1.0),
            max: Vector3::new(1.0, 1.0, 1.0),
        };
        let ray = Ray::new(Vector3::new(0.5, 0.5, 0.0), Vector3::new(1.0, 0.0, 0.0));
        let tray = TraversalRay::new(&ray);
        assert!(cube.intersect_test(&tray, 1e-10, 100.0));
    }
}
