//! Cardnet Graph - the friend graph engine
//!
//! This crate stores people and the FRIEND_OF relationships between them,
//! and answers the questions the networking features ask: who are my
//! friends, who should I meet, and how far away is everyone else.
//!
//! # Architecture
//!
//! The graph uses petgraph internally with a `user_id` index for O(1)
//! lookups. A friendship is always two opposing directed edges; the
//! lifecycle methods write and remove both in one step and
//! [`FriendNetwork`] puts a reader/writer lock around the whole graph so
//! concurrent readers never see half a friendship.
//!
//! # Example
//!
//! ```
//! use cardnet_core::Person;
//! use cardnet_graph::FriendNetwork;
//!
//! let network = FriendNetwork::new();
//! network.create_person(Person::new("u1", "Ada")).unwrap();
//! network.create_person(Person::new("u2", "Bob")).unwrap();
//! network.create_friendship("u1", "u2").unwrap();
//!
//! let friends = network.list_direct_friends("u2").unwrap();
//! assert_eq!(friends[0].user_id, "u1");
//! ```

mod builder;
mod edge;
mod error;
mod friendship;
mod graph;
mod network;
mod query;
mod store;
mod traversal;

pub use builder::{BuildResult, NetworkBuilder, SkippedFriendship};
pub use edge::{Edge, EdgeKind, GraphEdge};
pub use error::{GraphError, Result};
pub use graph::{GraphStats, NodeId, SocialGraph};
pub use network::FriendNetwork;
pub use query::{
    Connection, Recommendation, MAX_RECOMMENDATIONS, NETWORK_DEPTH, RECOMMENDATION_DEPTH,
};
pub use store::{GraphStore, SnapshotSink, StoreError};
pub use traversal::{bfs_within, Reached};
