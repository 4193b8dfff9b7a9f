//! SAH-guided recursive kd-tree subdivision, with explicit handling of
//! primitives that are planar (zero-extent) along the split axis.

use crate::geometry::bbox::area_compute;
use crate::geometry::BoundingBox;
use crate::params::BuildParams;

use super::node::{KdNode, Member, NodeKind};

#[derive(Clone, Copy)]
enum EventKind {
    Begin,
    End,
    Planar,
}

#[derive(Clone, Copy)]
struct Event {
    value: f64,
    kind: EventKind,
}

struct Candidate {
    dim: usize,
    split_point: f64,
    planars_to_left: bool,
    cost: f64,
}

/// Build a node (and recursively its subtree) for `members` confined to
/// `bbox` at the given `depth`.
pub fn build_node(bbox: BoundingBox, depth: usize, members: Vec<Member>, params: &BuildParams) -> KdNode {
    let n_members = members.len();

    if depth >= params.max_depth || n_members <= params.min_leaf {
        log::trace!("kd leaf at depth {depth}: {n_members} members (depth/min_leaf cutoff)");
        return KdNode::leaf(bbox, depth, members);
    }

    let extent = bbox.extent();
    let cost_no_split = params.intersection_cost * n_members as f64 * area_compute(extent);

    let mut best: Option<Candidate> = None;
    let mut best_cost = cost_no_split;

    for dim in 0..3 {
        let mut events = Vec::with_capacity(members.len() * 2);
        for m in &members {
            let lo = m.bbox.min()[dim];
            let hi = m.bbox.max()[dim];
            if lo == hi {
                events.push(Event { value: lo, kind: EventKind::Planar });
            } else {
                events.push(Event { value: lo, kind: EventKind::Begin });
                events.push(Event { value: hi, kind: EventKind::End });
            }
        }
        events.sort_by(|a, b| a.value.partial_cmp(&b.value).unwrap());

        let mut tl: i64 = 0;
        let mut tr: i64 = n_members as i64;

        let b_from = bbox.min()[dim];
        let b_to = bbox.max()[dim];

        let mut i = 0;
        while i < events.len() {
            let split_point = events[i].value;
            let mut pl = 0i64;
            let mut pr = 0i64;
            let mut tp = 0i64;

            while i < events.len() && events[i].value == split_point {
                match events[i].kind {
                    EventKind::Begin => pr += 1,
                    EventKind::End => pl += 1,
                    EventKind::Planar => tp += 1,
                }
                i += 1;
            }

            tr -= pl;
            tr -= tp;
            tl += pr;

            let mut lsize = extent;
            let mut rsize = extent;
            lsize[dim] = split_point - b_from;
            rsize[dim] = b_to - split_point;

            let la = area_compute(lsize);
            let ra = area_compute(rsize);

            let cost_l = params.traverse_cost + params.intersection_cost * (la * (tl + tp) as f64 + ra * tr as f64);
            let cost_r = params.traverse_cost + params.intersection_cost * (la * tl as f64 + ra * (tr + tp) as f64);

            let is_left = cost_l < cost_r;
            let cost = if is_left { cost_l } else { cost_r };

            if cost < best_cost {
                best_cost = cost;
                best = Some(Candidate { dim, split_point, planars_to_left: is_left, cost });
            }

            tl += tp;
        }
    }

    let Some(candidate) = best else {
        log::trace!("kd leaf at depth {depth}: {n_members} members (no split beat cost {cost_no_split})");
        return KdNode::leaf(bbox, depth, members);
    };

    let split_dim = candidate.dim;
    let split_point = candidate.split_point;
    let l_box = bbox.with_max_dim(split_dim, split_point);
    let r_box = bbox.with_min_dim(split_dim, split_point);

    let mut left_members = Vec::new();
    let mut right_members = Vec::new();

    for member in members {
        let l_bbox = member.bbox.intersect_with(&l_box);
        let r_bbox = member.bbox.intersect_with(&r_box);
        let l_empty = l_bbox.is_empty();
        let r_empty = r_bbox.is_empty();

        let max_d = member.bbox.max()[split_dim];
        let min_d = member.bbox.min()[split_dim];

        if max_d == split_point && min_d == split_point {
            if candidate.planars_to_left {
                if !l_empty {
                    left_members.push(Member { object: member.object, bbox: l_bbox });
                }
            } else if !r_empty {
                right_members.push(Member { object: member.object, bbox: r_bbox });
            }
        } else if max_d <= split_point {
            if !l_empty {
                left_members.push(Member { object: member.object, bbox: l_bbox });
            }
        } else if min_d >= split_point {
            if !r_empty {
                right_members.push(Member { object: member.object, bbox: r_bbox });
            }
        } else {
            if !l_empty {
                left_members.push(Member { object: member.object, bbox: l_bbox });
            }
            if !r_empty {
                right_members.push(Member { object: member.object, bbox: r_bbox });
            }
        }
    }

    log::trace!(
        "kd split at depth {depth}: dim {split_dim} @ {split_point} cost {} ({} left / {} right, no-split {cost_no_split})",
        candidate.cost,
        left_members.len(),
        right_members.len()
    );

    let child_depth = depth + 1;
    let left = if left_members.is_empty() {
        None
    } else {
        Some(Box::new(build_node(l_box, child_depth, left_members, params)))
    };
    let right = if right_members.is_empty() {
        None
    } else {
        Some(Box::new(build_node(r_box, child_depth, right_members, params)))
    };

    KdNode {
        bbox,
        depth,
        kind: NodeKind::Interior { split_dim, split_point, left, right },
    }
}
