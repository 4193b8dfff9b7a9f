//! Ray types.

use nalgebra::Vector3;

/// A ray in world space: `origin + t * direction`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vector3<f64>,
    pub direction: Vector3<f64>,
}

impl Ray {
    pub fn new(origin: Vector3<f64>, direction: Vector3<f64>) -> Self {
        Ray { origin, direction }
    }

    pub fn point_on_ray(&self, t: f64) -> Vector3<f64> {
        self.origin + self.direction * t
    }
}

/// A ray augmented with a precomputed inverse direction, built once per
/// query and threaded through traversal and the slab test. Components of
/// `direction` that are exactly zero produce `+/-inf` inverses, which the
/// slab arithmetic in [`crate::geometry::bbox::BoundingBox::intersect_test`]
/// relies on behaving per IEEE 754.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraversalRay {
    pub origin: Vector3<f64>,
    pub direction: Vector3<f64>,
    pub inv_direction: Vector3<f64>,
}

impl TraversalRay {
    pub fn new(ray: &Ray) -> Self {
        TraversalRay {
            origin: ray.origin,
            direction: ray.direction,
            inv_direction: Vector3::new(1.0 / ray.direction.x, 1.0 / ray.direction.y, 1.0 / ray.direction.z),
        }
    }

    pub fn point_on_ray(&self, t: f64) -> Vector3<f64> {
        self.origin + self.direction * t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_on_ray_moves_along_direction() {
        let ray = Ray::new(Vector3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0));
        assert_eq!(ray.point_on_ray(3.0), Vector3::new(3.0, 0.0, 0.0));
    }

    #[test]
    fn zero_direction_component_gives_infinite_inverse() {
        let ray = Ray::new(Vector3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 1.0, 0.0));
        let tray = TraversalRay::new(&ray);
        assert!(tray.inv_direction.x.is_infinite());
        assert_eq!(tray.inv_direction.y, 1.0);
    }
}
