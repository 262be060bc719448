//! Core graph data structure.
//!
//! The SocialGraph wraps petgraph and adds a user id index so every
//! lookup by `user_id` is a hash probe rather than a scan.

use crate::edge::{Edge, GraphEdge};
use crate::error::{GraphError, Result};
use cardnet_core::{Person, PersonUpdate};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Unique identifier for a node in the graph.
pub type NodeId = NodeIndex;

/// The friend graph.
///
/// Person nodes are never removed, so node indexes stay valid for the
/// lifetime of the graph. Edges come and go in symmetric pairs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocialGraph {
    /// The underlying petgraph graph.
    pub(crate) graph: DiGraph<Person, Edge>,

    /// Maps user ids to graph node indexes.
    user_index: HashMap<String, NodeId>,

    /// Next internal id to hand out.
    next_internal_id: u64,
}

impl Default for SocialGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SocialGraph {
    /// Creates a new empty graph.
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            user_index: HashMap::new(),
            next_internal_id: 1,
        }
    }

    /// Inserts a person node and assigns its internal id.
    ///
    /// Fails with `AlreadyExists` if the user id is taken.
    pub fn add_person(&mut self, mut person: Person) -> Result<NodeId> {
        person.validate()?;

        if self.user_index.contains_key(&person.user_id) {
            return Err(GraphError::AlreadyExists(person.user_id));
        }

        person.internal_id = self.next_internal_id;
        self.next_internal_id += 1;

        let user_id = person.user_id.clone();
        let index = self.graph.add_node(person);
        self.user_index.insert(user_id, index);

        Ok(index)
    }

    /// Applies an attribute update to an existing person.
    pub fn update_person(&mut self, user_id: &str, update: PersonUpdate) -> Result<&Person> {
        let index = self.require_index(user_id)?;
        let person = self
            .graph
            .node_weight_mut(index)
            .ok_or_else(|| GraphError::NotFound(user_id.to_string()))?;
        person.apply(update);
        Ok(&*person)
    }

    /// Gets a person by user id.
    pub fn get_by_user_id(&self, user_id: &str) -> Option<&Person> {
        let index = self.user_index.get(user_id)?;
        self.graph.node_weight(*index)
    }

    /// Gets a person by graph index.
    pub fn get(&self, index: NodeId) -> Option<&Person> {
        self.graph.node_weight(index)
    }

    /// Gets the node index for a user id.
    pub fn get_index(&self, user_id: &str) -> Option<NodeId> {
        self.user_index.get(user_id).copied()
    }

    /// Like `get_index`, but a missing user is a `NotFound` error.
    pub fn require_index(&self, user_id: &str) -> Result<NodeId> {
        self.get_index(user_id)
            .ok_or_else(|| GraphError::NotFound(user_id.to_string()))
    }

    /// Targets of the outgoing FRIEND_OF edges of a node.
    pub fn friend_indexes(&self, index: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.graph.neighbors_directed(index, Direction::Outgoing)
    }

    /// Neighbors reachable over an edge in either direction.
    ///
    /// A symmetric pair shows up twice; callers deduplicate.
    pub fn linked_indexes(&self, index: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.graph.neighbors_undirected(index)
    }

    /// Number of FRIEND_OF edges incident to a node, both directions.
    pub fn degree(&self, index: NodeId) -> usize {
        self.graph.edges_directed(index, Direction::Outgoing).count()
            + self.graph.edges_directed(index, Direction::Incoming).count()
    }

    /// Returns the number of person nodes.
    pub fn person_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of directed edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Iterates over all persons in insertion order.
    pub fn persons(&self) -> impl Iterator<Item = &Person> {
        self.graph.node_weights()
    }

    /// Returns all edges with source and target user ids for export.
    pub fn export_edges(&self) -> Vec<GraphEdge> {
        let mut edges: Vec<GraphEdge> = self
            .graph
            .edge_references()
            .filter_map(|edge_ref| {
                let source = self.graph.node_weight(edge_ref.source())?;
                let target = self.graph.node_weight(edge_ref.target())?;
                Some(GraphEdge {
                    source: source.user_id.clone(),
                    target: target.user_id.clone(),
                    kind: edge_ref.weight().kind,
                })
            })
            .collect();

        edges.sort_by(|a, b| {
            a.source
                .cmp(&b.source)
                .then_with(|| a.target.cmp(&b.target))
        });
        edges
    }

    /// Clones the persons behind a set of indexes, ordered by user id.
    pub(crate) fn persons_sorted<I>(&self, indexes: I) -> Vec<Person>
    where
        I: IntoIterator<Item = NodeId>,
    {
        let mut persons: Vec<Person> = indexes
            .into_iter()
            .filter_map(|idx| self.graph.node_weight(idx).cloned())
            .collect();
        persons.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        persons.dedup_by(|a, b| a.user_id == b.user_id);
        persons
    }
}

/// Graph statistics for the info endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphStats {
    pub person_count: usize,
    pub edge_count: usize,
    pub friendship_count: usize,
}

impl SocialGraph {
    /// Returns graph statistics.
    pub fn stats(&self) -> GraphStats {
        GraphStats {
            person_count: self.person_count(),
            edge_count: self.edge_count(),
            friendship_count: self.edge_count() / 2,
        }
    }
}
