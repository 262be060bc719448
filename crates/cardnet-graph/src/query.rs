//! Friend queries: direct friends, recommendations, extended network.
//!
//! Every ranked result breaks ties by user id so the same graph always
//! produces the same ordering.

use crate::error::Result;
use crate::graph::SocialGraph;
use crate::traversal::bfs_within;
use cardnet_core::Person;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// Upper bound on the number of recommendations returned.
pub const MAX_RECOMMENDATIONS: usize = 20;

/// Candidates for recommendation are at most this many hops away.
pub const RECOMMENDATION_DEPTH: usize = 2;

/// The extended network reaches this many hops out.
pub const NETWORK_DEPTH: usize = 3;

/// A recommended person and the score it was ranked by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub person: Person,
    /// Count of FRIEND_OF edges incident to the candidate across the whole
    /// graph (its degree), not the friends it shares with the requester.
    pub mutual_friends: usize,
}

/// A person in the extended network with their hop distance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub person: Person,
    pub distance: usize,
}

impl SocialGraph {
    /// Lists the people a user has a FRIEND_OF edge to, ordered by user id.
    pub fn list_direct_friends(&self, user_id: &str) -> Result<Vec<Person>> {
        let index = self.require_index(user_id)?;
        Ok(self.persons_sorted(self.friend_indexes(index)))
    }

    /// Recommends people within two hops, highest degree first.
    ///
    /// Direct friends are candidates too. An unknown user gets no
    /// recommendations.
    pub fn recommend_friends(&self, user_id: &str) -> Vec<Recommendation> {
        let Some(start) = self.get_index(user_id) else {
            debug!("No recommendations for unknown user {}", user_id);
            return Vec::new();
        };

        let mut ranked: Vec<Recommendation> = bfs_within(self, start, RECOMMENDATION_DEPTH)
            .into_iter()
            .filter_map(|reached| {
                let person = self.get(reached.node)?;
                Some(Recommendation {
                    person: person.clone(),
                    mutual_friends: self.degree(reached.node),
                })
            })
            .collect();

        ranked.sort_by(|a, b| {
            b.mutual_friends
                .cmp(&a.mutual_friends)
                .then_with(|| a.person.user_id.cmp(&b.person.user_id))
        });
        ranked.truncate(MAX_RECOMMENDATIONS);

        debug!("{} recommendations for {}", ranked.len(), user_id);
        ranked
    }

    /// Everyone within three hops with their shortest distance, nearest
    /// first. An unknown user has an empty network.
    pub fn network_connections(&self, user_id: &str) -> Vec<Connection> {
        let Some(start) = self.get_index(user_id) else {
            debug!("No network for unknown user {}", user_id);
            return Vec::new();
        };

        let mut connections: Vec<Connection> = bfs_within(self, start, NETWORK_DEPTH)
            .into_iter()
            .filter_map(|reached| {
                let person = self.get(reached.node)?;
                Some(Connection {
                    person: person.clone(),
                    distance: reached.distance,
                })
            })
            .collect();

        connections.sort_by(|a, b| {
            a.distance
                .cmp(&b.distance)
                .then_with(|| a.person.user_id.cmp(&b.person.user_id))
        });
        connections
    }

    /// People who are direct friends of both users, ordered by user id.
    pub fn mutual_friends(&self, user_a: &str, user_b: &str) -> Result<Vec<Person>> {
        let a = self.require_index(user_a)?;
        let b = self.require_index(user_b)?;

        let friends_of_a: HashSet<_> = self.friend_indexes(a).collect();
        let shared = self
            .friend_indexes(b)
            .filter(|idx| friends_of_a.contains(idx));

        Ok(self.persons_sorted(shared))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GraphError;

    fn graph_with(ids: &[&str], friendships: &[(&str, &str)]) -> SocialGraph {
        let mut graph = SocialGraph::new();
        for id in ids {
            graph.add_person(Person::new(*id, *id)).unwrap();
        }
        for (a, b) in friendships {
            graph.create_friendship(a, b).unwrap();
        }
        graph
    }

    fn ids(persons: &[Person]) -> Vec<&str> {
        persons.iter().map(|p| p.user_id.as_str()).collect()
    }

    #[test]
    fn test_three_user_scenario() {
        let mut graph = graph_with(&["u1", "u2", "u3"], &[("u1", "u2"), ("u2", "u3")]);

        assert_eq!(ids(&graph.list_direct_friends("u1").unwrap()), vec!["u2"]);
        assert_eq!(
            ids(&graph.list_direct_friends("u2").unwrap()),
            vec!["u1", "u3"]
        );

        let network: Vec<_> = graph
            .network_connections("u1")
            .into_iter()
            .map(|c| (c.person.user_id, c.distance))
            .collect();
        assert_eq!(
            network,
            vec![("u2".to_string(), 1), ("u3".to_string(), 2)]
        );

        graph.delete_friendship("u1", "u2").unwrap();
        assert!(graph.list_direct_friends("u1").unwrap().is_empty());
        assert_eq!(ids(&graph.list_direct_friends("u2").unwrap()), vec!["u3"]);
    }

    #[test]
    fn test_direct_friends_of_unknown_user() {
        let graph = graph_with(&["u1"], &[]);
        assert!(graph.list_direct_friends("u1").unwrap().is_empty());
        assert_eq!(
            graph.list_direct_friends("ghost").unwrap_err(),
            GraphError::NotFound("ghost".to_string())
        );
    }

    #[test]
    fn test_symmetry_of_direct_friends() {
        let graph = graph_with(
            &["a", "b", "c", "d"],
            &[("a", "b"), ("c", "a"), ("d", "b")],
        );

        for x in ["a", "b", "c", "d"] {
            for y in ["a", "b", "c", "d"] {
                let x_has_y = graph
                    .list_direct_friends(x)
                    .unwrap()
                    .iter()
                    .any(|p| p.user_id == y);
                let y_has_x = graph
                    .list_direct_friends(y)
                    .unwrap()
                    .iter()
                    .any(|p| p.user_id == x);
                assert_eq!(x_has_y, y_has_x, "asymmetry between {} and {}", x, y);
            }
        }
    }

    #[test]
    fn test_network_chain_excludes_fourth_hop() {
        let graph = graph_with(
            &["a", "b", "c", "d", "e"],
            &[("a", "b"), ("b", "c"), ("c", "d"), ("d", "e")],
        );

        let network: Vec<_> = graph
            .network_connections("a")
            .into_iter()
            .map(|c| (c.person.user_id, c.distance))
            .collect();
        assert_eq!(
            network,
            vec![
                ("b".to_string(), 1),
                ("c".to_string(), 2),
                ("d".to_string(), 3)
            ]
        );
        assert!(graph.network_connections("ghost").is_empty());
    }

    #[test]
    fn test_network_ties_ordered_by_user_id() {
        let graph = graph_with(
            &["me", "zed", "amy", "kim"],
            &[("me", "zed"), ("me", "amy"), ("amy", "kim")],
        );

        let network: Vec<_> = graph
            .network_connections("me")
            .into_iter()
            .map(|c| (c.person.user_id, c.distance))
            .collect();
        assert_eq!(
            network,
            vec![
                ("amy".to_string(), 1),
                ("zed".to_string(), 1),
                ("kim".to_string(), 2)
            ]
        );
    }

    #[test]
    fn test_recommendations_ranked_by_degree() {
        // me-a, me-b, a-c, b-c, c-d, c-e, b-f
        let graph = graph_with(
            &["me", "a", "b", "c", "d", "e", "f", "far"],
            &[
                ("me", "a"),
                ("me", "b"),
                ("a", "c"),
                ("b", "c"),
                ("c", "d"),
                ("c", "e"),
                ("b", "f"),
                ("d", "far"),
            ],
        );

        let recs: Vec<_> = graph
            .recommend_friends("me")
            .into_iter()
            .map(|r| (r.person.user_id, r.mutual_friends))
            .collect();

        // Degree counts both edge directions: c has 4 friends -> 8 edges.
        assert_eq!(
            recs,
            vec![
                ("c".to_string(), 8),
                ("b".to_string(), 6),
                ("a".to_string(), 4),
                ("f".to_string(), 2),
            ]
        );
    }

    #[test]
    fn test_recommendations_exclude_self_and_far_nodes() {
        let graph = graph_with(
            &["me", "a", "b", "c"],
            &[("me", "a"), ("a", "b"), ("b", "c")],
        );

        let recs = graph.recommend_friends("me");
        let rec_ids: Vec<_> = recs.iter().map(|r| r.person.user_id.as_str()).collect();

        assert!(!rec_ids.contains(&"me"));
        assert!(!rec_ids.contains(&"c"));
        assert_eq!(rec_ids, vec!["a", "b"]);
    }

    #[test]
    fn test_recommendations_capped() {
        let mut graph = SocialGraph::new();
        graph.add_person(Person::new("hub", "Hub")).unwrap();
        for i in 0..30 {
            let id = format!("p{:02}", i);
            graph.add_person(Person::new(id.clone(), id.clone())).unwrap();
            graph.create_friendship("hub", &id).unwrap();
        }

        let recs = graph.recommend_friends("p00");
        assert_eq!(recs.len(), MAX_RECOMMENDATIONS);
        assert_eq!(recs[0].person.user_id, "hub");
        assert!(recs.iter().all(|r| r.person.user_id != "p00"));
        // Remaining slots are equal-degree leaves, ordered by user id.
        assert_eq!(recs[1].person.user_id, "p01");
        assert_eq!(recs[19].person.user_id, "p19");
    }

    #[test]
    fn test_recommendations_for_unknown_or_lonely_user() {
        let graph = graph_with(&["solo"], &[]);
        assert!(graph.recommend_friends("solo").is_empty());
        assert!(graph.recommend_friends("ghost").is_empty());
    }

    #[test]
    fn test_mutual_friends_intersection() {
        let graph = graph_with(
            &["a", "b", "x", "y", "z"],
            &[("a", "x"), ("a", "y"), ("b", "y"), ("b", "x"), ("b", "z")],
        );

        assert_eq!(ids(&graph.mutual_friends("a", "b").unwrap()), vec!["x", "y"]);
        assert!(graph.mutual_friends("a", "z").unwrap().is_empty());
        assert!(matches!(
            graph.mutual_friends("a", "ghost"),
            Err(GraphError::NotFound(_))
        ));
    }
}
