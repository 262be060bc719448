use crate::error::GraphError;
use crate::graph::SocialGraph;
use sled::Db;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, error};

const GRAPH_KEY: &str = "social_graph";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Sled(#[from] sled::Error),
    #[error("Serialization error: {0}")]
    Bincode(#[from] bincode::Error),
    #[error("Stored graph is inconsistent: {0}")]
    Inconsistent(GraphError),
}

impl From<StoreError> for GraphError {
    fn from(err: StoreError) -> Self {
        GraphError::Internal(err.to_string())
    }
}

/// Destination for committed graph snapshots.
///
/// [`FriendNetwork`](crate::FriendNetwork) hands every mutated graph to its
/// sink before publishing it, so a failed save leaves the live graph as it
/// was.
pub trait SnapshotSink: Send + Sync {
    fn save(&self, graph: &SocialGraph) -> Result<(), StoreError>;
}

/// Durable snapshot storage for the social graph.
pub struct GraphStore {
    db: Db,
}

impl GraphStore {
    /// Opens or creates a graph store at the specified path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let db = sled::open(path)?;
        Ok(Self { db })
    }

    /// Saves the entire graph to the store.
    ///
    /// The graph is serialized using bincode and stored under a single key,
    /// so a save either lands completely or not at all.
    pub fn save_graph(&self, graph: &SocialGraph) -> Result<(), StoreError> {
        let bytes = bincode::serialize(graph)?;
        self.db.insert(GRAPH_KEY, bytes)?;
        self.db.flush()?;
        debug!(
            "Saved graph snapshot ({} persons, {} edges)",
            graph.person_count(),
            graph.edge_count()
        );
        Ok(())
    }

    /// Loads the graph from the store.
    ///
    /// A snapshot containing a one-directional friendship is refused.
    pub fn load_graph(&self) -> Result<Option<SocialGraph>, StoreError> {
        let Some(bytes) = self.db.get(GRAPH_KEY)? else {
            return Ok(None);
        };

        let graph: SocialGraph = bincode::deserialize(&bytes)?;
        if let Err(e) = graph.verify_symmetry() {
            error!("Refusing to load graph snapshot: {}", e);
            return Err(StoreError::Inconsistent(e));
        }
        Ok(Some(graph))
    }

    /// Loads the stored graph, or an empty one if nothing was saved yet.
    pub fn load_or_default(&self) -> Result<SocialGraph, StoreError> {
        Ok(self.load_graph()?.unwrap_or_default())
    }
}

impl SnapshotSink for GraphStore {
    fn save(&self, graph: &SocialGraph) -> Result<(), StoreError> {
        self.save_graph(graph)
    }
}
