//! Triangle primitive: construction, plane/surface tests, and interpolation.

use nalgebra::Vector3;

use crate::errors::KdResult;
use crate::geometry::{BoundingBox, Ray, TINY};

use super::QueryScratch;

/// A triangle, built up via [`Triangle::new`] + [`Triangle::push_vertex`] /
/// [`Triangle::push_normal`] / [`Triangle::push_texcoord`], then committed
/// with [`Triangle::finalize`].
#[derive(Debug)]
pub struct Triangle<M, T> {
    vertices: Vec<Vector3<f64>>,
    normals: Vec<Vector3<f64>>,
    texcoords: Vec<Vector3<f64>>,
    material: Option<M>,
    texture: Option<T>,

    normal: Vector3<f64>,
    d: f64,
    bbox: BoundingBox,

    scratch: QueryScratch,
}

impl<M, T> Triangle<M, T> {
    pub fn new() -> Self {
        Triangle {
            vertices: Vec::with_capacity(3),
            normals: Vec::with_capacity(3),
            texcoords: Vec::with_capacity(3),
            material: None,
            texture: None,
            normal: Vector3::zeros(),
            d: 0.0,
            bbox: BoundingBox::empty(),
            scratch: QueryScratch::default(),
        }
    }

    pub fn push_vertex(&mut self, v: Vector3<f64>) {
        self.vertices.push(v);
    }

    pub fn push_normal(&mut self, n: Vector3<f64>) {
        self.normals.push(n);
    }

    pub fn push_texcoord(&mut self, uv: Vector3<f64>) {
        self.texcoords.push(uv);
    }

    pub fn set_material(&mut self, material: Option<M>) {
        self.material = material;
    }

    pub fn set_texture(&mut self, texture: Option<T>) {
        self.texture = texture;
    }

    pub fn material(&self) -> Option<&M> {
        self.material.as_ref()
    }

    pub fn texture(&self) -> Option<&T> {
        self.texture.as_ref()
    }

    pub fn bounding_box(&self) -> BoundingBox {
        self.bbox
    }

    pub fn scratch(&self) -> &QueryScratch {
        &self.scratch
    }

    pub fn vertices(&self) -> &[Vector3<f64>] {
        &self.vertices
    }

    /// Validate and commit the triangle: fills in missing normals and
    /// texture coordinates, computes the face plane, and computes the
    /// bounding box. Returns `false` (leaving the triangle unchanged) if
    /// the triangle is degenerate, in which case the caller discards it.
    pub fn finalize(&mut self) -> bool {
        if self.vertices.len() != 3 {
            return false;
        }
        if self.normals.is_empty() {
            return false;
        }
        while self.normals.len() < 3 {
            let first = self.normals[0];
            self.normals.push(first);
        }

        let ab = self.vertices[1] - self.vertices[0];
        let ac = self.vertices[2] - self.vertices[0];
        let cross = ab.cross(&ac);
        let length = cross.norm();
        if length < 1e-9 {
            return false;
        }
        self.normal = cross / length;
        self.d = -self.vertices[0].dot(&self.normal);

        if self.texcoords.is_empty() {
            self.texcoords = vec![Vector3::zeros(); 3];
        } else {
            while self.texcoords.len() < 3 {
                let last = *self.texcoords.last().unwrap();
                self.texcoords.push(last);
            }
        }

        // Protection from negative u,v values: shift every texcoord by a
        // common integer offset so the minimum component is >= 0. This is
        // an inherited quirk of unclear motivation (possibly to keep
        // texture lookups non-negative for a wrapping sampler); preserved
        // behavior-exact rather than "fixed".
        let mut min = 0.0_f64;
        for uv in &self.texcoords {
            if uv.x < min {
                min = uv.x;
            }
            if uv.y < min {
                min = uv.y;
            }
        }
        if min < 0.0 {
            let add = (-min) as i64 as f64 + 1.0;
            for uv in &mut self.texcoords {
                uv.x += add;
                uv.y += add;
            }
        }

        let mut bbox = BoundingBox::from_point(self.vertices[0]);
        bbox.include(self.vertices[1]);
        bbox.include(self.vertices[2]);
        self.bbox = bbox;

        true
    }

    pub fn compute_t(&self, ray: &Ray) -> f64 {
        let bottom = self.normal.dot(&ray.direction);
        if bottom >= -TINY && bottom <= TINY {
            return -1.0;
        }
        -(self.normal.dot(&ray.origin) + self.d) / bottom
    }

    fn barycentric(&self, p: Vector3<f64>) -> Vector3<f64> {
        let p1 = self.vertices[0];
        let p2 = self.vertices[1];
        let p3 = self.vertices[2];

        let det = (p1.x - p3.x) * (p2.y - p3.y) - (p2.x - p3.x) * (p1.y - p3.y);
        if det == 0.0 {
            return Vector3::zeros();
        }

        let b0 = ((p2.y - p3.y) * (p.x - p3.x) - (p2.x - p3.x) * (p.y - p3.y)) / det;
        let b1 = (-(p1.y - p3.y) * (p.x - p3.x) + (p1.x - p3.x) * (p.y - p3.y)) / det;
        let b2 = 1.0 - b0 - b1;
        Vector3::new(b0, b1, b2)
    }

    pub fn surface_test(&self, point: Vector3<f64>) -> bool {
        let b = self.barycentric(point);
        b[0] >= 0.0 && b[1] >= 0.0 && b[2] >= 0.0
    }

    /// Interpolated normal and texture coordinate at a point already known
    /// to lie on the triangle's surface.
    pub fn interpolate(&self, point: Vector3<f64>) -> KdResult<(Vector3<f64>, Vector3<f64>)>
    where
        M: Clone,
        T: Clone,
    {
        let b = self.barycentric(point);
        let mut normal = self.normals[0] * b[0] + self.normals[1] * b[1] + self.normals[2] * b[2];
        if normal.norm() > 0.0 {
            normal = normal.normalize();
        }
        let texcoord = self.texcoords[0] * b[0] + self.texcoords[1] * b[1] + self.texcoords[2] * b[2];
        Ok((normal, texcoord))
    }
}

impl<M, T> Default for Triangle<M, T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn flat_triangle() -> Triangle<(), ()> {
        let mut t = Triangle::new();
        t.push_vertex(Vector3::new(0.0, 0.0, 0.0));
        t.push_vertex(Vector3::new(1.0, 0.0, 0.0));
        t.push_vertex(Vector3::new(0.0, 1.0, 0.0));
        t.push_normal(Vector3::new(0.0, 0.0, 1.0));
        t
    }

    #[test]
    fn finalize_fills_missing_normals_and_texcoords() {
        let mut t = flat_triangle();
        assert!(t.finalize());
        assert_eq!(t.normals.len(), 3);
        assert_eq!(t.normals[1], t.normals[0]);
        assert_eq!(t.texcoords, vec![Vector3::zeros(); 3]);
    }

    #[test]
    fn finalize_rejects_degenerate_triangle() {
        let mut t = Triangle::<(), ()>::new();
        t.push_vertex(Vector3::new(0.0, 0.0, 0.0));
        t.push_vertex(Vector3::new(1.0, 0.0, 0.0));
        t.push_vertex(Vector3::new(2.0, 0.0, 0.0)); // colinear
        t.push_normal(Vector3::new(0.0, 0.0, 1.0));
        assert!(!t.finalize());
    }

    #[test]
    fn finalize_shifts_negative_texcoords_positive() {
        let mut t = flat_triangle();
        t.push_texcoord(Vector3::new(-0.5, 0.2, 0.0));
        t.push_texcoord(Vector3::new(0.1, 0.1, 0.0));
        t.push_texcoord(Vector3::new(0.0, -1.2, 0.0));
        assert!(t.finalize());
        for uv in &t.texcoords {
            assert!(uv.x >= 0.0 && uv.y >= 0.0);
        }
    }

    #[test]
    fn compute_t_hits_plane_straight_on() {
        let mut t = flat_triangle();
        assert!(t.finalize());
        let ray = Ray::new(Vector3::new(0.25, 0.25, 1.0), Vector3::new(0.0, 0.0, -1.0));
        let t_val = t.compute_t(&ray);
        assert_relative_eq!(t_val, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn compute_t_parallel_ray_misses() {
        let mut t = flat_triangle();
        assert!(t.finalize());
        let ray = Ray::new(Vector3::new(0.25, 0.25, 1.0), Vector3::new(1.0, 0.0, 0.0));
        assert_eq!(t.compute_t(&ray), -1.0);
    }

    #[test]
    fn surface_test_interior_and_exterior() {
        let mut t = flat_triangle();
        assert!(t.finalize());
        assert!(t.surface_test(Vector3::new(0.25, 0.25, 0.0)));
        assert!(!t.surface_test(Vector3::new(5.0, 5.0, 0.0)));
    }

    #[test]
    fn interpolate_at_vertex_returns_vertex_normal() {
        let mut t = flat_triangle();
        assert!(t.finalize());
        let (normal, _uv) = t.interpolate(Vector3::new(0.0, 0.0, 0.0)).unwrap();
        assert_relative_eq!(normal, Vector3::new(0.0, 0.0, 1.0), epsilon = 1e-9);
    }
}
