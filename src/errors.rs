//! Error types returned by scene construction and queries.

use thiserror::Error;

/// Errors surfaced by [`crate::scene::Scene`].
///
/// Most malformed input (degenerate triangles, polygons that collapse to
/// fewer than 3 vertices, ...) is dropped silently at load time rather than
/// reported here -- see the loading protocol docs on `Scene`. This enum
/// covers the handful of conditions a caller can actually act on.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum KdError {
    /// `intersect_info` was asked about a handle that does not belong to
    /// this scene's primitive storage.
    #[error("object handle {0:?} is not valid for this scene")]
    InvalidHandle(crate::primitives::ObjectHandle),

    /// A convex polygon's attribute interpolation failed to find a pair of
    /// bracketing edges for the intersection point. This should not happen
    /// for any polygon that passed finalization; see the design notes on
    /// `Polygon::interpolate`.
    #[error("failed to find bracketing edges while interpolating polygon attributes")]
    NonConvexInterpolation,
}

pub type KdResult<T> = Result<T, KdError>;
