//! Request handlers for protocol methods.
//!
//! Each handler implements one method of the Cardnet protocol. Mutating
//! handlers run on the blocking pool, since a persistent network saves a
//! snapshot to disk before it answers.

use crate::protocol::{PairParams, Response, UpdateParams, UserParams};
use crate::ServerState;
use cardnet_core::Person;
use cardnet_graph::{FriendNetwork, GraphError, Result as GraphResult};
use serde::Serialize;
use serde_json::Value;
use std::time::Instant;
use tracing::{debug, error};

/// Runs a write against the network off the async workers.
async fn write<T, F>(state: ServerState, op: F) -> GraphResult<T>
where
    T: Send + 'static,
    F: FnOnce(&FriendNetwork) -> GraphResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(move || op(&state.network))
        .await
        .unwrap_or_else(|e| {
            error!("Write task failed: {}", e);
            Err(GraphError::Internal(format!("write task failed: {}", e)))
        })
}

/// Handles the graph.info method.
pub async fn handle_info(state: ServerState, id: Option<Value>) -> Response {
    #[derive(Serialize)]
    struct InfoResult {
        #[serde(rename = "personCount")]
        person_count: usize,
        #[serde(rename = "friendshipCount")]
        friendship_count: usize,
        persistent: bool,
        version: &'static str,
    }

    let stats = state.network.stats();
    Response::success(
        id,
        InfoResult {
            person_count: stats.person_count,
            friendship_count: stats.friendship_count,
            persistent: state.network.is_persistent(),
            version: env!("CARGO_PKG_VERSION"),
        },
    )
}

/// Handles the person.get method.
pub async fn handle_person_get(
    state: ServerState,
    id: Option<Value>,
    params: UserParams,
) -> Response {
    match state.network.get_person(&params.user_id) {
        Ok(person) => Response::success(id, person),
        Err(e) => Response::from_graph_error(id, &e),
    }
}

/// Handles the person.create method.
pub async fn handle_person_create(
    state: ServerState,
    id: Option<Value>,
    person: Person,
) -> Response {
    match write(state, move |network| network.create_person(person)).await {
        Ok(stored) => Response::success(id, stored),
        Err(e) => Response::from_graph_error(id, &e),
    }
}

/// Handles the person.update method.
pub async fn handle_person_update(
    state: ServerState,
    id: Option<Value>,
    params: UpdateParams,
) -> Response {
    let UpdateParams { user_id, update } = params;
    match write(state, move |network| network.update_person(&user_id, update)).await {
        Ok(person) => Response::success(id, person),
        Err(e) => Response::from_graph_error(id, &e),
    }
}

/// Handles the friendship.create method.
pub async fn handle_friendship_create(
    state: ServerState,
    id: Option<Value>,
    params: PairParams,
) -> Response {
    let created = write(state, move |network| {
        network.create_friendship(&params.user_id, &params.friend_id)
    })
    .await;
    match created {
        Ok(()) => Response::success(id, serde_json::json!({ "friends": true })),
        Err(e) => Response::from_graph_error(id, &e),
    }
}

/// Handles the friendship.delete method. Never fails on a missing pair.
pub async fn handle_friendship_delete(
    state: ServerState,
    id: Option<Value>,
    params: PairParams,
) -> Response {
    let deleted = write(state, move |network| {
        network.delete_friendship(&params.user_id, &params.friend_id)
    })
    .await;
    match deleted {
        Ok(()) => Response::success(id, serde_json::json!({ "friends": false })),
        Err(e) => Response::from_graph_error(id, &e),
    }
}

/// Handles the friends.list method.
pub async fn handle_friends_list(
    state: ServerState,
    id: Option<Value>,
    params: UserParams,
) -> Response {
    let start = Instant::now();
    debug!("Friends of {}", params.user_id);

    match state.network.list_direct_friends(&params.user_id) {
        Ok(friends) => Response::success(
            id,
            serde_json::json!({
                "friends": friends,
                "queryTime": start.elapsed().as_millis() as u64
            }),
        ),
        Err(e) => Response::from_graph_error(id, &e),
    }
}

/// Handles the friends.recommend method.
pub async fn handle_recommend(
    state: ServerState,
    id: Option<Value>,
    params: UserParams,
) -> Response {
    let start = Instant::now();
    debug!("Recommendations for {}", params.user_id);

    let recommendations = state.network.recommend_friends(&params.user_id);
    Response::success(
        id,
        serde_json::json!({
            "recommendations": recommendations,
            "queryTime": start.elapsed().as_millis() as u64
        }),
    )
}

/// Handles the friends.mutual method.
pub async fn handle_mutual(state: ServerState, id: Option<Value>, params: PairParams) -> Response {
    match state
        .network
        .mutual_friends(&params.user_id, &params.friend_id)
    {
        Ok(mutual) => Response::success(id, serde_json::json!({ "mutual": mutual })),
        Err(e) => Response::from_graph_error(id, &e),
    }
}

/// Handles the network.connections method.
pub async fn handle_connections(
    state: ServerState,
    id: Option<Value>,
    params: UserParams,
) -> Response {
    let start = Instant::now();
    debug!("Network of {}", params.user_id);

    let connections = state.network.network_connections(&params.user_id);
    Response::success(
        id,
        serde_json::json!({
            "connections": connections,
            "queryTime": start.elapsed().as_millis() as u64
        }),
    )
}
