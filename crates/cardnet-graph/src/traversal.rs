//! Bounded breadth-first traversal.
//!
//! Friendship edges always come in pairs, so traversal follows edges in
//! both directions. That is the same as walking the undirected view and
//! keeps results correct even for a graph loaded from a foreign source.

use crate::graph::{NodeId, SocialGraph};
use std::collections::{HashSet, VecDeque};

/// A node reached during traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reached {
    pub node: NodeId,
    /// Shortest hop count from the start node.
    pub distance: usize,
}

/// Finds every node within `max_depth` hops of `start`.
///
/// Each node is visited once, at the depth where BFS first discovers it,
/// which is its shortest-path distance. The start node is not included.
/// Results come back in discovery order.
pub fn bfs_within(graph: &SocialGraph, start: NodeId, max_depth: usize) -> Vec<Reached> {
    let mut result = Vec::new();

    if graph.get(start).is_none() || max_depth == 0 {
        return result;
    }

    let mut visited: HashSet<NodeId> = HashSet::new();
    let mut queue: VecDeque<(NodeId, usize)> = VecDeque::new();

    visited.insert(start);
    queue.push_back((start, 0));

    while let Some((current, depth)) = queue.pop_front() {
        if depth >= max_depth {
            continue;
        }

        for neighbor in graph.linked_indexes(current) {
            if visited.insert(neighbor) {
                result.push(Reached {
                    node: neighbor,
                    distance: depth + 1,
                });
                queue.push_back((neighbor, depth + 1));
            }
        }
    }

    result
}
