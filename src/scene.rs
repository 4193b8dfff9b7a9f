//! The engine facade: streaming primitive loading, tree build, and queries.

use nalgebra::Vector3;

use crate::errors::{KdError, KdResult};
use crate::geometry::{BoundingBox, Ray, TraversalRay};
use crate::params::BuildParams;
use crate::primitives::{ObjectHandle, Polygon, PrimitiveKind, Triangle};
use crate::stats::Stats;
use crate::tree::node::Member;
use crate::tree::{build_node, KdNode, NodeKind};

use std::cell::Cell;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadingState {
    None,
    Polygon,
    Triangle,
}

/// Shading attributes recovered at a hit point by [`Scene::intersect_info`].
#[derive(Debug, Clone)]
pub struct ShadingInfo<M, T> {
    pub normal: Vector3<f64>,
    pub material: Option<M>,
    pub texture: Option<T>,
    pub texcoord: Vector3<f64>,
}

/// The result of a successful [`Scene::intersect`] query.
#[derive(Debug, Clone, Copy)]
pub struct Hit {
    pub object: ObjectHandle,
    pub t: f64,
    pub point: Vector3<f64>,
}

/// A static scene of triangles and convex polygons, indexed by a
/// SAH kd-tree for nearest-hit ray queries.
///
/// `M` and `T` are opaque material/texture handles supplied by the host;
/// this crate never inspects their contents, only stores and returns them.
pub struct Scene<M, T> {
    polys: Vec<Polygon<M, T>>,
    triangles: Vec<Triangle<M, T>>,
    loading: LoadingState,
    scene_bbox: BoundingBox,
    root: Option<KdNode>,
    params: BuildParams,
    mark: Cell<u64>,
    stats: Cell<Stats>,
}

impl<M, T> Scene<M, T> {
    pub fn new() -> Self {
        Self::with_params(BuildParams::default())
    }

    pub fn with_params(params: BuildParams) -> Self {
        Scene {
            polys: Vec::new(),
            triangles: Vec::new(),
            loading: LoadingState::None,
            scene_bbox: BoundingBox::empty(),
            root: None,
            params,
            mark: Cell::new(1),
            stats: Cell::new(Stats::default()),
        }
    }

    pub fn params(&self) -> BuildParams {
        self.params
    }

    pub fn set_intersection_cost(&mut self, cost: f64) {
        self.params.intersection_cost = cost;
    }

    pub fn set_traverse_cost(&mut self, cost: f64) {
        self.params.traverse_cost = cost;
    }

    pub fn set_max_depth(&mut self, depth: usize) {
        self.params.max_depth = depth;
    }

    pub fn set_min_leaf(&mut self, min_leaf: usize) {
        self.params.min_leaf = min_leaf;
    }

    pub fn stats(&self) -> Stats {
        self.stats.get()
    }

    pub fn save_stats(&self, path: impl AsRef<std::path::Path>) -> std::io::Result<()> {
        self.stats().save_stats(path)
    }

    pub fn kind_of(&self, handle: ObjectHandle) -> PrimitiveKind {
        handle.kind()
    }

    /// Clear all loaded geometry and the built tree. Build parameters are
    /// left untouched.
    pub fn initialize(&mut self) {
        self.polys.clear();
        self.triangles.clear();
        self.loading = LoadingState::None;
        self.scene_bbox = BoundingBox::empty();
        self.root = None;
        self.mark.set(1);
        self.stats.set(Stats::default());
    }

    pub fn polygon_begin(&mut self) {
        self.loading = LoadingState::Polygon;
        self.polys.push(Polygon::new());
    }

    pub fn triangle_begin(&mut self) {
        self.loading = LoadingState::Triangle;
        self.triangles.push(Triangle::new());
    }

    pub fn vertex(&mut self, v: Vector3<f64>) {
        match self.loading {
            LoadingState::Polygon => self.polys.last_mut().expect("polygon_begin called").push_vertex(v),
            LoadingState::Triangle => self.triangles.last_mut().expect("triangle_begin called").push_vertex(v),
            LoadingState::None => {}
        }
    }

    pub fn normal(&mut self, n: Vector3<f64>) {
        match self.loading {
            LoadingState::Polygon => self.polys.last_mut().expect("polygon_begin called").push_normal(n),
            LoadingState::Triangle => self.triangles.last_mut().expect("triangle_begin called").push_normal(n),
            LoadingState::None => {}
        }
    }

    pub fn tex_vertex(&mut self, uv: Vector3<f64>) {
        match self.loading {
            LoadingState::Polygon => self.polys.last_mut().expect("polygon_begin called").push_texcoord(uv),
            LoadingState::Triangle => self.triangles.last_mut().expect("triangle_begin called").push_texcoord(uv),
            LoadingState::None => {}
        }
    }

    pub fn material(&mut self, material: Option<M>) {
        match self.loading {
            LoadingState::Polygon => self.polys.last_mut().expect("polygon_begin called").set_material(material),
            LoadingState::Triangle => self.triangles.last_mut().expect("triangle_begin called").set_material(material),
            LoadingState::None => {}
        }
    }

    pub fn texture(&mut self, texture: Option<T>) {
        match self.loading {
            LoadingState::Polygon => self.polys.last_mut().expect("polygon_begin called").set_texture(texture),
            LoadingState::Triangle => self.triangles.last_mut().expect("triangle_begin called").set_texture(texture),
            LoadingState::None => {}
        }
    }

    pub fn triangle_end(&mut self) {
        if self.loading != LoadingState::Triangle {
            return;
        }
        self.loading = LoadingState::None;
        let ok = self.triangles.last_mut().expect("triangle_begin called").finalize();
        if !ok {
            log::debug!("dropping degenerate triangle at load time");
            self.triangles.pop();
        }
    }
}

impl<M: Clone, T: Clone> Scene<M, T> {
    pub fn polygon_end(&mut self) {
        if self.loading != LoadingState::Polygon {
            return;
        }
        self.loading = LoadingState::None;

        let ok = self.polys.last_mut().expect("polygon_begin called").finalize();
        if !ok {
            log::debug!("dropping degenerate polygon at load time");
            self.polys.pop();
            return;
        }

        let n = self.polys.last().unwrap().vertex_count();
        if n == 3 {
            self.rewrite_polygon_as_triangle();
            return;
        }
        if n > 3 {
            let poly = self.polys.last().unwrap();
            let normal = poly.face_normal();
            let d = poly.plane_d();
            let non_planar = poly.fan_vertices().iter().any(|v| {
                let r = normal.dot(v) + d;
                !(-0.01..=0.01).contains(&r)
            });
            if non_planar {
                log::trace!("rewriting non-planar {n}-gon as a triangle fan");
                self.rewrite_polygon_as_fan();
            }
        }
    }

    fn rewrite_polygon_as_triangle(&mut self) {
        let poly = self.polys.pop().unwrap();
        let verts = poly.fan_vertices();
        let normals = poly.fan_normals();
        let texcoords = poly.fan_texcoords();
        let material = poly.material().cloned();
        let texture = poly.texture().cloned();

        let (v0, v1, v2) = (verts[0], verts[1], verts[2]);
        let n0 = normals[0];
        let n1 = if normals.len() > 1 { Some(normals[1]) } else { None };
        let n2 = if normals.len() > 1 { Some(normals[2]) } else { None };
        let tc: Option<[Vector3<f64>; 3]> = if !texcoords.is_empty() {
            Some([texcoords[0], texcoords[1], texcoords[2]])
        } else {
            None
        };
        drop(poly);

        self.triangle_begin();
        self.material(material.clone());
        self.texture(texture.clone());
        if let Some(tc) = tc {
            self.tex_vertex(tc[0]);
        }
        self.normal(n0);
        self.vertex(v0);
        if let Some(tc) = tc {
            self.tex_vertex(tc[1]);
        }
        if let Some(n1) = n1 {
            self.normal(n1);
        }
        self.vertex(v1);
        if let Some(tc) = tc {
            self.tex_vertex(tc[2]);
        }
        if let Some(n2) = n2 {
            self.normal(n2);
        }
        self.vertex(v2);
        self.triangle_end();
    }

    fn rewrite_polygon_as_fan(&mut self) {
        let poly = self.polys.pop().unwrap();
        let verts: Vec<Vector3<f64>> = poly.fan_vertices().to_vec();
        let normals: Vec<Vector3<f64>> = poly.fan_normals().to_vec();
        let texcoords: Vec<Vector3<f64>> = poly.fan_texcoords().to_vec();
        let material = poly.material().cloned();
        let texture = poly.texture().cloned();
        drop(poly);

        let per_vertex_normals = normals.len() > 1;
        let cnt = verts.len();

        for i in 1..(cnt - 1) {
            let b = i;
            let c = i + 1;

            self.triangle_begin();
            self.material(material.clone());
            self.texture(texture.clone());

            if !texcoords.is_empty() {
                self.tex_vertex(texcoords[0]);
            }
            self.normal(normals[0]);
            self.vertex(verts[0]);

            if !texcoords.is_empty() {
                self.tex_vertex(texcoords[b]);
            }
            if per_vertex_normals {
                self.normal(normals[b]);
            }
            self.vertex(verts[b]);

            if !texcoords.is_empty() {
                self.tex_vertex(texcoords[c]);
            }
            if per_vertex_normals {
                self.normal(normals[c]);
            }
            self.vertex(verts[c]);

            self.triangle_end();
        }
    }

    /// Compute the scene bounding box and build the kd-tree. Must be
    /// called before any query.
    pub fn loading_complete(&mut self) {
        self.determine_extents();
        self.kd_tree_build();
    }

    fn determine_extents(&mut self) {
        let mut bbox = BoundingBox::empty();
        for p in &self.polys {
            for v in p.fan_vertices() {
                bbox.include(*v);
            }
        }
        for t in &self.triangles {
            for v in t.vertices() {
                bbox.include(*v);
            }
        }
        self.scene_bbox = bbox;
    }

    fn kd_tree_build(&mut self) {
        let mut members = Vec::with_capacity(self.polys.len() + self.triangles.len());
        for (i, p) in self.polys.iter().enumerate() {
            if p.vertex_count() >= 4 {
                members.push(Member { object: ObjectHandle::Polygon(i), bbox: p.bounding_box() });
            }
        }
        for (i, t) in self.triangles.iter().enumerate() {
            members.push(Member { object: ObjectHandle::Triangle(i), bbox: t.bounding_box() });
        }

        let node = build_node(self.scene_bbox, 0, members, &self.params);

        let mut stats = self.stats.get();
        stats.polygons = self.polys.len();
        stats.triangles = self.triangles.len();
        stats.tree_nodes = node.count_nodes();
        stats.tree_depth = node.max_depth();
        stats.one_child_nodes = node.count_one_child();
        self.stats.set(stats);

        log::debug!(
            "kd tree built: {} polygons, {} triangles, {} nodes, depth {}",
            stats.polygons,
            stats.triangles,
            stats.tree_nodes,
            stats.tree_depth
        );

        self.root = Some(node);
    }

    fn new_mark(&self) -> u64 {
        let m = self.mark.get() + 1;
        self.mark.set(m);
        m
    }

    fn compute_t(&self, handle: ObjectHandle, ray: &Ray) -> f64 {
        match handle {
            ObjectHandle::Triangle(i) => self.triangles[i].compute_t(ray),
            ObjectHandle::Polygon(i) => self.polys[i].compute_t(ray),
        }
    }

    fn surface_test(&self, handle: ObjectHandle, point: Vector3<f64>) -> bool {
        match handle {
            ObjectHandle::Triangle(i) => self.triangles[i].surface_test(point),
            ObjectHandle::Polygon(i) => self.polys[i].surface_test(point),
        }
    }

    fn was_visited(&self, handle: ObjectHandle, mark: u64) -> bool {
        match handle {
            ObjectHandle::Triangle(i) => self.triangles[i].scratch().was_visited(mark),
            ObjectHandle::Polygon(i) => self.polys[i].scratch().was_visited(mark),
        }
    }

    fn was_tested(&self, handle: ObjectHandle, mark: u64) -> bool {
        match handle {
            ObjectHandle::Triangle(i) => self.triangles[i].scratch().was_tested(mark),
            ObjectHandle::Polygon(i) => self.polys[i].scratch().was_tested(mark),
        }
    }

    fn set_visited(&self, handle: ObjectHandle, mark: u64) {
        match handle {
            ObjectHandle::Triangle(i) => self.triangles[i].scratch().set_visited(mark),
            ObjectHandle::Polygon(i) => self.polys[i].scratch().set_visited(mark),
        }
    }

    fn set_tested(&self, handle: ObjectHandle, mark: u64) {
        match handle {
            ObjectHandle::Triangle(i) => self.triangles[i].scratch().set_tested(mark),
            ObjectHandle::Polygon(i) => self.polys[i].scratch().set_tested(mark),
        }
    }

    fn cached_t(&self, handle: ObjectHandle) -> f64 {
        match handle {
            ObjectHandle::Triangle(i) => self.triangles[i].scratch().cached_t(),
            ObjectHandle::Polygon(i) => self.polys[i].scratch().cached_t(),
        }
    }

    fn set_cached_t(&self, handle: ObjectHandle, t: f64) {
        match handle {
            ObjectHandle::Triangle(i) => self.triangles[i].scratch().set_cached_t(t),
            ObjectHandle::Polygon(i) => self.polys[i].scratch().set_cached_t(t),
        }
    }

    /// Find the nearest primitive hit by `ray` within `[TINY, max_t]`,
    /// optionally excluding `ignore` (e.g. the surface a shadow ray is
    /// leaving). Returns `None` if the scene has not been built, or if
    /// nothing is hit.
    pub fn intersect(&self, ray: &Ray, max_t: f64, ignore: Option<ObjectHandle>) -> Option<Hit> {
        let root = self.root.as_ref()?;

        let mut stats = self.stats.get();
        stats.queries += 1;
        let mark = self.new_mark();

        let tray = TraversalRay::new(ray);

        let mut t_near = crate::geometry::TINY;
        let mut t_far = max_t;

        let scene_bb = root.bbox;
        for d in 0..3 {
            let r_fm = ray.origin[d] + t_near * ray.direction[d];
            let r_to = ray.origin[d] + t_far * ray.direction[d];

            if r_to < r_fm {
                if r_fm > scene_bb.max()[d] {
                    t_near = (scene_bb.max()[d] - ray.origin[d]) / ray.direction[d];
                }
                if r_to < scene_bb.min()[d] {
                    t_far = (scene_bb.min()[d] - ray.origin[d]) / ray.direction[d];
                }
            } else if r_fm < r_to {
                if r_fm < scene_bb.min()[d] {
                    t_near = (scene_bb.min()[d] - ray.origin[d]) / ray.direction[d];
                }
                if r_to > scene_bb.max()[d] {
                    t_far = (scene_bb.max()[d] - ray.origin[d]) / ray.direction[d];
                }
            } else if r_fm < scene_bb.min()[d] || r_fm > scene_bb.max()[d] {
                self.stats.set(stats);
                return None;
            }

            if t_near > t_far {
                self.stats.set(stats);
                return None;
            }
        }

        t_near -= crate::geometry::TINY;
        t_far += crate::geometry::TINY;
        if t_far > max_t {
            t_far = max_t;
        }

        let mut nearest_t = t_far;
        let mut nearest: Option<ObjectHandle> = None;

        struct StackItem<'a> {
            node: &'a KdNode,
            t_near: f64,
            t_far: f64,
        }

        let mut stack: Vec<StackItem> = Vec::with_capacity(10);
        let mut pop = false;
        let mut p_tree = root;
        let mut p_tree_near = t_near;
        let mut p_tree_far = t_far;

        loop {
            if pop {
                match stack.pop() {
                    None => break,
                    Some(item) => {
                        p_tree = item.node;
                        p_tree_near = item.t_near;
                        p_tree_far = item.t_far;
                    }
                }
            }

            if p_tree_near >= nearest_t {
                if stack.is_empty() {
                    break;
                }
                pop = true;
                continue;
            }

            pop = true;

            match &p_tree.kind {
                NodeKind::Leaf { members } => {
                    for m in members {
                        let obj = m.object;
                        if self.was_tested(obj, mark) {
                            continue;
                        }
                        if Some(obj) == ignore {
                            self.set_tested(obj, mark);
                            continue;
                        }

                        let t = if self.was_visited(obj, mark) {
                            let cached = self.cached_t(obj);
                            if cached >= nearest_t {
                                continue;
                            }
                            cached
                        } else {
                            self.set_visited(obj, mark);
                            stats.object_tests += 1;
                            let t = self.compute_t(obj, ray);
                            self.set_cached_t(obj, t);
                            if t < t_near || t >= nearest_t {
                                self.set_tested(obj, mark);
                                continue;
                            }
                            t
                        };

                        if t > p_tree_far {
                            continue;
                        }

                        self.set_tested(obj, mark);

                        let point = tray.point_on_ray(t);
                        stats.surface_tests += 1;
                        if !self.surface_test(obj, point) {
                            continue;
                        }

                        nearest_t = t;
                        nearest = Some(obj);
                    }
                }
                NodeKind::Interior { split_dim, split_point, left, right } => {
                    let dim = *split_dim;
                    let split_point = *split_point;
                    let r_fm = ray.origin[dim] + ray.direction[dim] * p_tree_near;
                    let r_to = ray.origin[dim] + ray.direction[dim] * p_tree_far;

                    match (left.as_deref(), right.as_deref()) {
                        (None, None) => {}
                        (None, Some(right)) => {
                            if r_fm < split_point && r_to < split_point {
                                // left side doesn't exist; nothing to do
                            } else if (r_fm > split_point && r_to > split_point) || r_fm == r_to {
                                p_tree = right;
                                pop = false;
                            } else {
                                let t_at_split = (split_point - ray.origin[dim]) / ray.direction[dim];
                                if r_fm < r_to {
                                    p_tree_near = t_at_split;
                                } else {
                                    p_tree_far = t_at_split;
                                }
                                p_tree = right;
                                pop = false;
                            }
                        }
                        (Some(left), None) => {
                            if (r_fm < split_point && r_to < split_point) || r_fm == r_to {
                                p_tree = left;
                                pop = false;
                            } else if r_fm > split_point && r_to > split_point {
                                // right side doesn't exist; nothing to do
                            } else {
                                let t_at_split = (split_point - ray.origin[dim]) / ray.direction[dim];
                                if r_fm < r_to {
                                    p_tree_far = t_at_split;
                                } else {
                                    p_tree_near = t_at_split;
                                }
                                p_tree = left;
                                pop = false;
                            }
                        }
                        (Some(left), Some(right)) => {
                            if r_fm < split_point && r_to < split_point {
                                p_tree = left;
                                pop = false;
                            } else if r_fm > split_point && r_to > split_point {
                                p_tree = right;
                                pop = false;
                            } else if r_fm == r_to {
                                stack.push(StackItem { node: left, t_near: p_tree_near, t_far: p_tree_far });
                                p_tree = right;
                                pop = false;
                            } else {
                                let t_at_split = (split_point - ray.origin[dim]) / ray.direction[dim];
                                if r_fm < r_to {
                                    if t_at_split < nearest_t {
                                        stack.push(StackItem { node: right, t_near: t_at_split, t_far: p_tree_far });
                                    }
                                    p_tree_far = t_at_split;
                                    p_tree = left;
                                    pop = false;
                                } else {
                                    if t_at_split < nearest_t {
                                        stack.push(StackItem { node: left, t_near: t_at_split, t_far: p_tree_far });
                                    }
                                    p_tree_far = t_at_split;
                                    p_tree = right;
                                    pop = false;
                                }
                            }
                        }
                    }
                }
            }
        }

        self.stats.set(stats);
        log::trace!("query: {} object tests, {} surface tests", stats.object_tests, stats.surface_tests);

        nearest.map(|object| Hit { object, t: nearest_t, point: tray.point_on_ray(nearest_t) })
    }

    /// Shading attributes at a previously reported hit.
    pub fn intersect_info(&self, ray: &Ray, object: ObjectHandle, t: f64) -> KdResult<ShadingInfo<M, T>> {
        let point = ray.point_on_ray(t);
        match object {
            ObjectHandle::Triangle(i) => {
                let tri = self.triangles.get(i).ok_or(KdError::InvalidHandle(object))?;
                let (normal, texcoord) = tri.interpolate(point)?;
                Ok(ShadingInfo { normal, material: tri.material().cloned(), texture: tri.texture().cloned(), texcoord })
            }
            ObjectHandle::Polygon(i) => {
                let poly = self.polys.get(i).ok_or(KdError::InvalidHandle(object))?;
                let (normal, texcoord) = poly.interpolate(point)?;
                Ok(ShadingInfo { normal, material: poly.material().cloned(), texture: poly.texture().cloned(), texcoord })
            }
        }
    }
}

impl<M, T> Default for Scene<M, T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn axis_aligned_triangle() -> Scene<(), ()> {
        let mut s = Scene::new();
        s.initialize();
        s.triangle_begin();
        s.normal(Vector3::new(0.0, 0.0, 1.0));
        s.vertex(Vector3::new(0.0, 0.0, 0.0));
        s.vertex(Vector3::new(1.0, 0.0, 0.0));
        s.vertex(Vector3::new(0.0, 1.0, 0.0));
        s.triangle_end();
        s.loading_complete();
        s
    }

    #[test]
    fn single_triangle_hit() {
        let s = axis_aligned_triangle();
        let ray = Ray::new(Vector3::new(0.25, 0.25, 1.0), Vector3::new(0.0, 0.0, -1.0));
        let hit = s.intersect(&ray, 10.0, None).expect("expected a hit");
        assert_relative_eq!(hit.t, 1.0, epsilon = 1e-9);
        assert_relative_eq!(hit.point, Vector3::new(0.25, 0.25, 0.0), epsilon = 1e-9);
    }

    #[test]
    fn ignored_handle_is_skipped() {
        let s = axis_aligned_triangle();
        let ray = Ray::new(Vector3::new(0.25, 0.25, 1.0), Vector3::new(0.0, 0.0, -1.0));
        let hit = s.intersect(&ray, 10.0, None).unwrap();
        assert!(s.intersect(&ray, 10.0, Some(hit.object)).is_none());
    }

    #[test]
    fn two_parallel_triangles_report_nearest() {
        let mut s: Scene<(), ()> = Scene::new();
        s.initialize();
        for z in [0.0, 1.0] {
            s.triangle_begin();
            s.normal(Vector3::new(0.0, 0.0, 1.0));
            s.vertex(Vector3::new(0.0, 0.0, z));
            s.vertex(Vector3::new(1.0, 0.0, z));
            s.vertex(Vector3::new(0.0, 1.0, z));
            s.triangle_end();
        }
        s.loading_complete();

        let ray = Ray::new(Vector3::new(0.25, 0.25, 5.0), Vector3::new(0.0, 0.0, -1.0));
        let hit = s.intersect(&ray, 10.0, None).unwrap();
        assert!((hit.t - 4.0).abs() < 1e-9);
    }

    #[test]
    fn zero_direction_component_on_cube_face() {
        let mut s: Scene<(), ()> = Scene::new();
        s.initialize();
        // Two triangles forming the +x face of a unit cube centered at the origin.
        s.triangle_begin();
        s.normal(Vector3::new(1.0, 0.0, 0.0));
        s.vertex(Vector3::new(1.0, -1.0, -1.0));
        s.vertex(Vector3::new(1.0, 1.0, -1.0));
        s.vertex(Vector3::new(1.0, 1.0, 1.0));
        s.triangle_end();
        s.triangle_begin();
        s.normal(Vector3::new(1.0, 0.0, 0.0));
        s.vertex(Vector3::new(1.0, -1.0, -1.0));
        s.vertex(Vector3::new(1.0, 1.0, 1.0));
        s.vertex(Vector3::new(1.0, -1.0, 1.0));
        s.triangle_end();
        s.loading_complete();

        let ray = Ray::new(Vector3::new(0.5, 0.5, 0.0), Vector3::new(1.0, 0.0, 0.0));
        let hit = s.intersect(&ray, 10.0, None).expect("expected a hit on the +x face");
        assert!((hit.t - 0.5).abs() < 1e-9);
    }

    #[test]
    fn non_planar_quad_is_converted_to_a_fan() {
        let mut s: Scene<(), ()> = Scene::new();
        s.initialize();
        s.polygon_begin();
        s.normal(Vector3::new(0.0, 0.0, 1.0));
        s.vertex(Vector3::new(0.0, 0.0, 0.0));
        s.vertex(Vector3::new(1.0, 0.0, 0.0));
        s.vertex(Vector3::new(1.0, 1.0, 0.2));
        s.vertex(Vector3::new(0.0, 1.0, 0.0));
        s.polygon_end();

        assert_eq!(s.polys.len(), 0);
        assert_eq!(s.triangles.len(), 2);

        s.loading_complete();
        let ray = Ray::new(Vector3::new(0.25, 0.75, 5.0), Vector3::new(0.0, 0.0, -1.0));
        assert!(s.intersect(&ray, 10.0, None).is_some());
    }

    #[test]
    fn stacked_planar_triangles_report_topmost_hit() {
        let mut s: Scene<(), ()> = Scene::new();
        s.initialize();
        for i in 0..20 {
            let z = i as f64 * 0.01;
            s.triangle_begin();
            s.normal(Vector3::new(0.0, 0.0, 1.0));
            s.vertex(Vector3::new(0.0, 0.0, z));
            s.vertex(Vector3::new(1.0, 0.0, z));
            s.vertex(Vector3::new(0.0, 1.0, z));
            s.triangle_end();
        }
        s.loading_complete();

        let ray = Ray::new(Vector3::new(0.1, 0.1, 100.0), Vector3::new(0.0, 0.0, -1.0));
        let hit = s.intersect(&ray, 1000.0, None).unwrap();
        assert!((hit.t - (100.0 - 19.0 * 0.01)).abs() < 1e-6);
    }

    #[test]
    fn empty_scene_builds_and_misses_everything() {
        let mut s: Scene<(), ()> = Scene::new();
        s.initialize();
        s.loading_complete();
        let ray = Ray::new(Vector3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 1.0));
        assert!(s.intersect(&ray, 10.0, None).is_none());
    }
}
