//! Edge types for the friend graph.
//!
//! The graph only knows one relationship today. Friendships are stored
//! as two opposing directed edges, never as a single undirected one.

use serde::{Deserialize, Serialize};

/// The type of relationship between two people.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeKind {
    /// One direction of a friendship.
    #[serde(rename = "FRIEND_OF")]
    FriendOf,
}

impl std::fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::FriendOf => "FRIEND_OF",
        };
        write!(f, "{}", s)
    }
}

/// An edge in the friend graph. Carries no metadata beyond its kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub kind: EdgeKind,
}

impl Edge {
    /// Creates a FRIEND_OF edge.
    pub fn friend_of() -> Self {
        Self {
            kind: EdgeKind::FriendOf,
        }
    }
}

/// A simplified edge for export, addressed by user id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    pub kind: EdgeKind,
}
