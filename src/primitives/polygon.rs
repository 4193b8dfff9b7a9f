//! Polygon primitive: construction, plane/surface tests, and interpolation.
//!
//! A polygon is always convex in this crate's usage -- the loading
//! protocol only ever hands it simple planar input, and anything found to
//! be non-planar is rewritten into a triangle fan by
//! [`crate::scene::Scene`] before the tree is built.

use nalgebra::Vector3;

use crate::errors::{KdError, KdResult};
use crate::geometry::{BoundingBox, Ray, TINY};

use super::QueryScratch;

#[derive(Debug)]
pub struct Polygon<M, T> {
    vertices: Vec<Vector3<f64>>,
    normals: Vec<Vector3<f64>>,
    texcoords: Vec<Vector3<f64>>,
    material: Option<M>,
    texture: Option<T>,

    normal: Vector3<f64>,
    d: f64,
    edge_normals: Vec<Vector3<f64>>,
    bbox: BoundingBox,
    /// Distinct vertex count after dedup, before the wraparound duplicate
    /// that `finalize` appends -- what callers deciding "is this a
    /// triangle" or "is this a fan candidate" actually want.
    vertex_count: usize,

    scratch: QueryScratch,
}

impl<M, T> Polygon<M, T> {
    pub fn new() -> Self {
        Polygon {
            vertices: Vec::new(),
            normals: Vec::new(),
            texcoords: Vec::new(),
            material: None,
            texture: None,
            normal: Vector3::zeros(),
            d: 0.0,
            edge_normals: Vec::new(),
            bbox: BoundingBox::empty(),
            vertex_count: 0,
            scratch: QueryScratch::default(),
        }
    }

    /// Distinct vertex count after dedup (before the wraparound
    /// duplicate `finalize` appends). Valid only after a successful
    /// `finalize`.
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
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

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Distinct vertices, excluding the wraparound duplicate `finalize`
    /// appends -- what a caller replaying this polygon as a triangle fan
    /// wants. Only meaningful after a successful `finalize`.
    pub fn fan_vertices(&self) -> &[Vector3<f64>] {
        &self.vertices[..self.vertex_count]
    }

    pub fn fan_normals(&self) -> &[Vector3<f64>] {
        if self.normals.len() == 1 {
            &self.normals
        } else {
            &self.normals[..self.vertex_count]
        }
    }

    pub fn fan_texcoords(&self) -> &[Vector3<f64>] {
        if self.texcoords.is_empty() {
            &self.texcoords
        } else {
            &self.texcoords[..self.vertex_count]
        }
    }

    pub fn face_normal(&self) -> Vector3<f64> {
        self.normal
    }

    pub fn plane_d(&self) -> f64 {
        self.d
    }

    pub fn bounding_box(&self) -> BoundingBox {
        self.bbox
    }

    pub fn scratch(&self) -> &QueryScratch {
        &self.scratch
    }

    pub fn has_texture_data(&self) -> bool {
        self.texture.is_some() || !self.texcoords.is_empty()
    }

    /// Validate and commit the polygon: removes coincident consecutive
    /// vertices, checks normal/texcoord counts, computes the face plane
    /// and inward edge normals, duplicates the first vertex/normal/texcoord
    /// at the end of each list (so the vertex list can be walked as a list
    /// of edges), and computes the bounding box.
    pub fn finalize(&mut self) -> bool {
        if self.vertices.len() < 3 {
            return false;
        }

        loop {
            let mut removed_at = None;
            let mut last_idx = self.vertices.len() - 1;
            for i in 0..self.vertices.len() {
                if self.vertices[last_idx] == self.vertices[i] {
                    removed_at = Some(i);
                    break;
                }
                last_idx = i;
            }
            match removed_at {
                Some(i) => {
                    self.vertices.remove(i);
                    if self.normals.len() > 1 && i < self.normals.len() {
                        self.normals.remove(i);
                    }
                    if self.texcoords.len() > 1 && i < self.texcoords.len() {
                        self.texcoords.remove(i);
                    }
                    if self.vertices.len() <= 1 {
                        break;
                    }
                }
                None => break,
            }
        }

        if self.vertices.len() < 3 {
            return false;
        }
        if !(self.normals.len() == 1 || self.normals.len() == self.vertices.len()) {
            return false;
        }
        if self.has_texture_data() && self.texcoords.len() != self.vertices.len() {
            return false;
        }

        self.vertex_count = self.vertices.len();

        let a = self.vertices[0];
        let b = self.vertices[1];
        let c = self.vertices[2];
        let cross = (c - b).cross(&(a - b));
        let length = cross.norm();
        if length < 1e-9 {
            return false;
        }
        self.normal = cross / length;
        self.d = -a.dot(&self.normal);

        self.edge_normals.clear();
        let n = self.vertices.len();
        for i in 0..n {
            let next = self.vertices[(i + 1) % n];
            self.edge_normals.push(self.normal.cross(&(next - self.vertices[i])).normalize());
        }

        self.vertices.push(self.vertices[0]);
        if self.normals.len() > 1 {
            let first = self.normals[0];
            self.normals.push(first);
        }
        if !self.texcoords.is_empty() {
            let first = self.texcoords[0];
            self.texcoords.push(first);
        }

        let mut bbox = BoundingBox::from_point(self.vertices[0]);
        for v in &self.vertices[1..] {
            bbox.include(*v);
        }
        self.bbox = bbox;

        true
    }

    /// Signed distance of `v` from the face plane; used by the scene to
    /// decide whether a polygon needs a triangle-fan rewrite.
    pub fn plane_distance(&self, v: Vector3<f64>) -> f64 {
        self.normal.dot(&v) + self.d
    }

    pub fn compute_t(&self, ray: &Ray) -> f64 {
        let bottom = self.normal.dot(&ray.direction);
        if bottom >= -TINY && bottom <= TINY {
            return -1.0;
        }
        -(self.normal.dot(&ray.origin) + self.d) / bottom
    }

    pub fn surface_test(&self, point: Vector3<f64>) -> bool {
        for (n, v) in self.edge_normals.iter().zip(self.vertices.iter()) {
            if n.dot(&(point - v)) < 0.0 {
                return false;
            }
        }
        true
    }

    /// Interpolated normal and texture coordinate at a point already known
    /// to lie on the polygon's surface. Projects onto whichever axis plane
    /// maximizes the polygon's projected area, then finds the two edges
    /// that bracket the point and bilinearly interpolates between them.
    pub fn interpolate(&self, point: Vector3<f64>) -> KdResult<(Vector3<f64>, Vector3<f64>)>
    where
        M: Clone,
        T: Clone,
    {
        let nx = self.normal.x.abs();
        let ny = self.normal.y.abs();
        let nz = self.normal.z.abs();

        enum Axis {
            X,
            Y,
            Z,
        }
        let axis = if nx > ny {
            if nx > nz { Axis::X } else { Axis::Z }
        } else if ny > nz {
            Axis::Y
        } else {
            Axis::Z
        };

        let cnt = self.vertices.len();
        let sweep = |p: &Vector3<f64>| -> f64 {
            match axis {
                Axis::X => p.y,
                Axis::Y | Axis::Z => p.x,
            }
        };
        let cross_axis = |p: &Vector3<f64>| -> f64 {
            match axis {
                Axis::X | Axis::Y => p.z,
                Axis::Z => p.y,
            }
        };

        let target = sweep(&point);

        let mut a = 0usize;
        let mut b = 1usize;
        while b < cnt {
            let va = sweep(&self.vertices[a]);
            let vb = sweep(&self.vertices[b]);
            if (va >= target && vb < target) || (vb >= target && va < target) {
                break;
            }
            a += 1;
            b += 1;
        }
        if b == cnt {
            return Err(KdError::NonConvexInterpolation);
        }

        let mut c = b;
        let mut d = c;
        if d < cnt {
            d += 1;
        }
        while d < cnt {
            let vc = sweep(&self.vertices[c]);
            let vd = sweep(&self.vertices[d]);
            if (vc >= target && vd < target) || (vd >= target && vc < target) {
                break;
            }
            c += 1;
            d += 1;
        }
        if d == cnt {
            return Err(KdError::NonConvexInterpolation);
        }

        let f = (target - sweep(&self.vertices[a])) / (sweep(&self.vertices[b]) - sweep(&self.vertices[a]));
        let g = (target - sweep(&self.vertices[c])) / (sweep(&self.vertices[d]) - sweep(&self.vertices[c]));

        let lz = cross_axis(&self.vertices[a]) + f * (cross_axis(&self.vertices[b]) - cross_axis(&self.vertices[a]));
        let rz = cross_axis(&self.vertices[c]) + g * (cross_axis(&self.vertices[d]) - cross_axis(&self.vertices[c]));
        let target_cross = cross_axis(&point);
        let h = if rz - lz == 0.0 { 0.0 } else { (target_cross - lz) / (rz - lz) };

        let am = 1.0 - f - h + f * h;
        let bm = f - f * h;
        let cm = h - g * h;
        let dm = g * h;

        let normal = if self.normals.len() == 1 {
            self.normals[0]
        } else {
            let mut n = self.normals[a] * am + self.normals[b] * bm + self.normals[c] * cm + self.normals[d] * dm;
            if n.norm() > 0.0 {
                n = n.normalize();
            }
            n
        };

        let texcoord = if !self.texcoords.is_empty() {
            self.texcoords[a] * am + self.texcoords[b] * bm + self.texcoords[c] * cm + self.texcoords[d] * dm
        } else {
            Vector3::zeros()
        };

        Ok((normal, texcoord))
    }
}

impl<M, T> Default for Polygon<M, T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> Polygon<(), ()> {
        let mut p = Polygon::new();
        p.push_vertex(Vector3::new(0.0, 0.0, 0.0));
        p.push_vertex(Vector3::new(1.0, 0.0, 0.0));
        p.push_vertex(Vector3::new(1.0, 1.0, 0.0));
        p.push_vertex(Vector3::new(0.0, 1.0, 0.0));
        p.push_normal(Vector3::new(0.0, 0.0, 1.0));
        p
    }

    #[test]
    fn finalize_computes_plane_and_edges() {
        let mut p = unit_square();
        assert!(p.finalize());
        assert!((p.face_normal() - Vector3::new(0.0, 0.0, 1.0)).norm() < 1e-9);
        assert_eq!(p.vertices.len(), 5); // wraparound duplicate
    }

    #[test]
    fn finalize_removes_coincident_vertex() {
        let mut p = Polygon::<(), ()>::new();
        p.push_vertex(Vector3::new(0.0, 0.0, 0.0));
        p.push_vertex(Vector3::new(1.0, 0.0, 0.0));
        p.push_vertex(Vector3::new(1.0, 0.0, 0.0)); // duplicate
        p.push_vertex(Vector3::new(1.0, 1.0, 0.0));
        p.push_vertex(Vector3::new(0.0, 1.0, 0.0));
        p.push_normal(Vector3::new(0.0, 0.0, 1.0));
        assert!(p.finalize());
        assert_eq!(p.fan_vertices().len(), 4);
    }

    #[test]
    fn finalize_rejects_too_few_vertices_after_dedup() {
        let mut p = Polygon::<(), ()>::new();
        p.push_vertex(Vector3::new(0.0, 0.0, 0.0));
        p.push_vertex(Vector3::new(0.0, 0.0, 0.0));
        p.push_vertex(Vector3::new(1.0, 0.0, 0.0));
        p.push_normal(Vector3::new(0.0, 0.0, 1.0));
        assert!(!p.finalize());
    }

    #[test]
    fn surface_test_inside_and_outside() {
        let mut p = unit_square();
        assert!(p.finalize());
        assert!(p.surface_test(Vector3::new(0.5, 0.5, 0.0)));
        assert!(!p.surface_test(Vector3::new(2.0, 2.0, 0.0)));
    }

    #[test]
    fn interpolate_flat_normal_matches_face() {
        let mut p = unit_square();
        assert!(p.finalize());
        let (normal, _) = p.interpolate(Vector3::new(0.5, 0.5, 0.0)).unwrap();
        assert!((normal - Vector3::new(0.0, 0.0, 1.0)).norm() < 1e-9);
    }
}
