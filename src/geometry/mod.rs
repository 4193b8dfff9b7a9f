//! Vector, ray, and bounding-box primitives shared by the rest of the crate.

pub mod bbox;
pub mod ray;

pub use bbox::BoundingBox;
pub use ray::{Ray, TraversalRay};

/// A small value used throughout the crate to tolerate round-off error
/// (ray-plane near-parallel tests, scene-box clipping slack, ...).
pub const TINY: f64 = 1e-10;
