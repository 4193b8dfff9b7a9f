//! The kd-tree itself: node representation and SAH build. Traversal lives
//! on [`crate::scene::Scene`], since resolving a leaf's members back into
//! primitive data requires the scene's own storage.

pub mod build;
pub mod node;

pub use build::build_node;
pub use node::{KdNode, Member, NodeKind};
