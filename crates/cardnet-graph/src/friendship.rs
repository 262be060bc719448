//! Friendship lifecycle.
//!
//! A friendship is always the pair A→B and B→A. Both operations here check
//! every precondition before touching the graph, then write both edges, so
//! with `&mut self` held there is no point at which only one edge exists.

use crate::edge::Edge;
use crate::error::{GraphError, Result};
use crate::graph::{NodeId, SocialGraph};
use petgraph::visit::EdgeRef;
use tracing::{debug, error};

impl SocialGraph {
    /// Creates a friendship between two users.
    ///
    /// Returns `true` if new edges were written and `false` if the pair
    /// was already friends.
    pub fn create_friendship(&mut self, user_a: &str, user_b: &str) -> Result<bool> {
        let a = self.require_index(user_a)?;
        let b = self.require_index(user_b)?;

        if a == b {
            return Err(GraphError::InvalidInput(format!(
                "{} cannot befriend themselves",
                user_a
            )));
        }

        match self.pair_state(a, b) {
            PairState::Linked => {
                debug!("{} and {} are already friends", user_a, user_b);
                Ok(false)
            }
            PairState::Unlinked => {
                self.graph.add_edge(a, b, Edge::friend_of());
                self.graph.add_edge(b, a, Edge::friend_of());
                Ok(true)
            }
            PairState::HalfLinked => Err(half_edge(user_a, user_b)),
        }
    }

    /// Removes the friendship between two users.
    ///
    /// Unknown users and missing relationships are a no-op. Returns `true`
    /// if edges were removed.
    pub fn delete_friendship(&mut self, user_a: &str, user_b: &str) -> Result<bool> {
        let (Some(a), Some(b)) = (self.get_index(user_a), self.get_index(user_b)) else {
            return Ok(false);
        };

        match self.pair_state(a, b) {
            PairState::Unlinked => Ok(false),
            PairState::Linked => {
                // Removing an edge can move the last edge into its slot,
                // so look the second one up after the first is gone.
                if let Some(ab) = self.graph.find_edge(a, b) {
                    self.graph.remove_edge(ab);
                }
                if let Some(ba) = self.graph.find_edge(b, a) {
                    self.graph.remove_edge(ba);
                }
                Ok(true)
            }
            PairState::HalfLinked => Err(half_edge(user_a, user_b)),
        }
    }

    /// True if both users exist and are friends.
    pub fn are_friends(&self, user_a: &str, user_b: &str) -> bool {
        match (self.get_index(user_a), self.get_index(user_b)) {
            (Some(a), Some(b)) => self.pair_state(a, b) == PairState::Linked,
            _ => false,
        }
    }

    /// Checks that every FRIEND_OF edge has its reverse.
    pub fn verify_symmetry(&self) -> Result<()> {
        for edge_ref in self.graph.edge_references() {
            let (from, to) = (edge_ref.source(), edge_ref.target());
            if self.graph.find_edge(to, from).is_none() {
                let from_id = self.user_id_of(from);
                let to_id = self.user_id_of(to);
                return Err(half_edge(&from_id, &to_id));
            }
        }
        Ok(())
    }

    fn pair_state(&self, a: NodeId, b: NodeId) -> PairState {
        match (
            self.graph.find_edge(a, b).is_some(),
            self.graph.find_edge(b, a).is_some(),
        ) {
            (true, true) => PairState::Linked,
            (false, false) => PairState::Unlinked,
            _ => PairState::HalfLinked,
        }
    }

    fn user_id_of(&self, index: NodeId) -> String {
        self.get(index)
            .map(|p| p.user_id.clone())
            .unwrap_or_else(|| format!("#{}", index.index()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PairState {
    Linked,
    Unlinked,
    HalfLinked,
}

fn half_edge(user_a: &str, user_b: &str) -> GraphError {
    error!(
        "friendship between {} and {} has only one direction",
        user_a, user_b
    );
    GraphError::Internal(format!(
        "asymmetric FRIEND_OF edge between {} and {}",
        user_a, user_b
    ))
}
