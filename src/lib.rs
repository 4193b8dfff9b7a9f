//! SAH kd-tree acceleration structure for ray/geometry nearest-hit queries.
//!
//! Primitives (triangles and convex polygons) are streamed in through
//! [`Scene`]'s loader methods, then [`Scene::loading_complete`] builds a
//! surface-area-heuristic kd-tree over them. [`Scene::intersect`] walks
//! that tree to find the nearest primitive along a ray, and
//! [`Scene::intersect_info`] recovers interpolated shading attributes at
//! a reported hit.

pub mod errors;
pub mod geometry;
pub mod params;
pub mod primitives;
pub mod scene;
pub mod stats;
pub mod tree;

pub use errors::{KdError, KdResult};
pub use geometry::{BoundingBox, Ray};
pub use params::BuildParams;
pub use primitives::{ObjectHandle, PrimitiveKind};
pub use scene::{Hit, Scene, ShadingInfo};
pub use stats::Stats;
