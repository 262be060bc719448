//! Bulk construction of a social graph.
//!
//! The builder takes persons and friendship pairs (for example from an
//! import file) and applies them in two passes:
//! 1. Add all persons
//! 2. Link friendship pairs whose endpoints exist

use crate::error::{GraphError, Result};
use crate::graph::SocialGraph;
use cardnet_core::Person;
use tracing::warn;

/// A friendship pair that could not be linked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFriendship {
    pub user_a: String,
    pub user_b: String,
    pub reason: String,
}

/// Outcome of a build.
#[derive(Debug)]
pub struct BuildResult {
    pub graph: SocialGraph,
    pub persons_added: usize,
    pub friendships_added: usize,
    pub skipped: Vec<SkippedFriendship>,
}

/// Builds a SocialGraph from persons and friendship pairs.
pub struct NetworkBuilder {
    graph: SocialGraph,
    persons: Vec<Person>,
    friendships: Vec<(String, String)>,
}

impl Default for NetworkBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl NetworkBuilder {
    /// Creates a builder over an empty graph.
    pub fn new() -> Self {
        Self::from_graph(SocialGraph::new())
    }

    /// Creates a builder that merges into an existing graph.
    pub fn from_graph(graph: SocialGraph) -> Self {
        Self {
            graph,
            persons: Vec::new(),
            friendships: Vec::new(),
        }
    }

    /// Queues persons for insertion.
    pub fn add_persons(&mut self, persons: impl IntoIterator<Item = Person>) -> &mut Self {
        self.persons.extend(persons);
        self
    }

    /// Queues a friendship between two user ids.
    pub fn add_friendship(
        &mut self,
        user_a: impl Into<String>,
        user_b: impl Into<String>,
    ) -> &mut Self {
        self.friendships.push((user_a.into(), user_b.into()));
        self
    }

    /// Applies everything queued.
    ///
    /// A duplicate or invalid person aborts the build. Friendship pairs that
    /// cannot be linked are skipped and reported.
    pub fn build(self) -> Result<BuildResult> {
        let Self {
            mut graph,
            persons,
            friendships,
        } = self;

        let mut persons_added = 0;
        for person in persons {
            graph.add_person(person)?;
            persons_added += 1;
        }

        let mut friendships_added = 0;
        let mut skipped = Vec::new();
        for (user_a, user_b) in friendships {
            match graph.create_friendship(&user_a, &user_b) {
                Ok(true) => friendships_added += 1,
                Ok(false) => {}
                Err(e @ GraphError::Internal(_)) => return Err(e),
                Err(e) => {
                    warn!("Skipping friendship {} - {}: {}", user_a, user_b, e);
                    skipped.push(SkippedFriendship {
                        user_a,
                        user_b,
                        reason: e.to_string(),
                    });
                }
            }
        }

        Ok(BuildResult {
            graph,
            persons_added,
            friendships_added,
            skipped,
        })
    }
}
