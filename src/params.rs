//! Build parameters controlling the SAH kd-tree construction.

/// Tuning knobs for [`crate::scene::Scene::loading_complete`]'s tree
/// build. Changing these after the tree has been built has no effect --
/// there is no incremental rebuild.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuildParams {
    /// Relative cost of testing a ray against one primitive.
    pub intersection_cost: f64,
    /// Relative cost of descending one level of the tree.
    pub traverse_cost: f64,
    /// Hard cap on recursion depth, regardless of SAH cost.
    pub max_depth: usize,
    /// Stop subdividing once a node holds this many members or fewer.
    pub min_leaf: usize,
}

impl Default for BuildParams {
    fn default() -> Self {
        BuildParams {
            intersection_cost: 100.0,
            traverse_cost: 1.0,
            max_depth: 100,
            min_leaf: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let p = BuildParams::default();
        assert_eq!(p.intersection_cost, 100.0);
        assert_eq!(p.traverse_cost, 1.0);
        assert_eq!(p.max_depth, 100);
        assert_eq!(p.min_leaf, 3);
    }
}
