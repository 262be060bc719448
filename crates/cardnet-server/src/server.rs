//! WebSocket server implementation.
//!
//! Handles client connections and routes messages to handlers.

use crate::handlers::{
    handle_connections, handle_friends_list, handle_friendship_create, handle_friendship_delete,
    handle_info, handle_mutual, handle_person_create, handle_person_get, handle_person_update,
    handle_recommend,
};
use crate::protocol::{PairParams, Request, Response, UpdateParams, UserParams};
use crate::{ServerContext, ServerState};
use cardnet_core::Person;
use cardnet_graph::FriendNetwork;
use futures_util::{SinkExt, StreamExt};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{debug, error, info, warn};

/// Default port for the RPC server.
pub const DEFAULT_PORT: u16 = 7440;

/// Server configuration.
pub struct ServerConfig {
    /// Address to bind to.
    pub addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_PORT)),
        }
    }
}

/// The Cardnet WebSocket server.
pub struct CardnetServer {
    config: ServerConfig,
    state: ServerState,
}

impl CardnetServer {
    /// Creates a server over a shared network.
    ///
    /// A network with a snapshot sink is written through on every mutation.
    pub fn new(network: Arc<FriendNetwork>, config: ServerConfig) -> Self {
        Self {
            config,
            state: Arc::new(ServerContext { network }),
        }
    }

    /// Runs the server, accepting connections forever.
    pub async fn run(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let listener = TcpListener::bind(&self.config.addr).await?;
        info!("Cardnet server listening on {}", self.config.addr);

        loop {
            match listener.accept().await {
                Ok((stream, addr)) => {
                    debug!("New connection from {}", addr);
                    let state = self.state.clone();
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, addr, state).await {
                            error!("Connection error from {}: {}", addr, e);
                        }
                    });
                }
                Err(e) => {
                    error!("Accept error: {}", e);
                }
            }
        }
    }
}

/// Handles a single WebSocket connection.
async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    state: ServerState,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let ws_stream = accept_async(stream).await?;
    info!("WebSocket connection established with {}", addr);

    let (mut write, mut read) = ws_stream.split();

    while let Some(msg) = read.next().await {
        let msg = match msg {
            Ok(m) => m,
            Err(e) => {
                warn!("Message error from {}: {}", addr, e);
                break;
            }
        };

        if msg.is_close() {
            debug!("Client {} disconnected", addr);
            break;
        }

        if msg.is_ping() {
            write.send(Message::Pong(msg.into_data())).await?;
            continue;
        }

        if msg.is_text() {
            let text = msg.to_text().unwrap_or("");
            let response = process_message(text, state.clone()).await;
            let json = serde_json::to_string(&response)?;
            write.send(Message::Text(json)).await?;
        }
    }

    info!("Connection closed: {}", addr);
    Ok(())
}

fn parse_params<T: DeserializeOwned>(id: &Option<Value>, params: Value) -> Result<T, Response> {
    serde_json::from_value(params).map_err(|e| {
        warn!("Rejected params: {}", e);
        Response::invalid_params(id.clone(), e.to_string())
    })
}

/// Processes a JSON-RPC message and returns a response.
pub(crate) async fn process_message(text: &str, state: ServerState) -> Response {
    let request: Request = match serde_json::from_str(text) {
        Ok(r) => r,
        Err(_) => return Response::parse_error(),
    };

    let id = request.id.clone();
    let method = request.method.as_str();

    debug!("Processing method: {}", method);

    match method {
        "graph.info" => handle_info(state, id).await,

        "person.get" => match parse_params::<UserParams>(&id, request.params) {
            Ok(params) => handle_person_get(state, id, params).await,
            Err(response) => response,
        },

        "person.create" => match parse_params::<Person>(&id, request.params) {
            Ok(person) => handle_person_create(state, id, person).await,
            Err(response) => response,
        },

        "person.update" => match parse_params::<UpdateParams>(&id, request.params) {
            Ok(params) => handle_person_update(state, id, params).await,
            Err(response) => response,
        },

        "friendship.create" => match parse_params::<PairParams>(&id, request.params) {
            Ok(params) => handle_friendship_create(state, id, params).await,
            Err(response) => response,
        },

        "friendship.delete" => match parse_params::<PairParams>(&id, request.params) {
            Ok(params) => handle_friendship_delete(state, id, params).await,
            Err(response) => response,
        },

        "friends.list" => match parse_params::<UserParams>(&id, request.params) {
            Ok(params) => handle_friends_list(state, id, params).await,
            Err(response) => response,
        },

        "friends.recommend" => match parse_params::<UserParams>(&id, request.params) {
            Ok(params) => handle_recommend(state, id, params).await,
            Err(response) => response,
        },

        "friends.mutual" => match parse_params::<PairParams>(&id, request.params) {
            Ok(params) => handle_mutual(state, id, params).await,
            Err(response) => response,
        },

        "network.connections" => match parse_params::<UserParams>(&id, request.params) {
            Ok(params) => handle_connections(state, id, params).await,
            Err(response) => response,
        },

        _ => Response::method_not_found(id, method),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{
        ALREADY_EXISTS, INTERNAL_ERROR, INVALID_PARAMS, METHOD_NOT_FOUND, NOT_FOUND,
        PARSE_ERROR,
    };
    use cardnet_graph::{GraphStore, SnapshotSink, SocialGraph, StoreError};
    use serde_json::json;
    use tempfile::tempdir;

    struct FailingSink;

    impl SnapshotSink for FailingSink {
        fn save(&self, _graph: &SocialGraph) -> Result<(), StoreError> {
            Err(StoreError::Sled(sled::Error::Unsupported("disk is read-only".into())))
        }
    }

    fn state_with(network: FriendNetwork) -> ServerState {
        Arc::new(ServerContext {
            network: Arc::new(network),
        })
    }

    fn state() -> ServerState {
        state_with(FriendNetwork::new())
    }

    async fn call(state: &ServerState, method: &str, params: Value) -> Response {
        let text = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params
        })
        .to_string();
        process_message(&text, state.clone()).await
    }

    async fn seed(state: &ServerState, ids: &[&str]) {
        for id in ids {
            let r = call(state, "person.create", json!({ "userId": id, "name": id })).await;
            assert!(r.error.is_none(), "{:?}", r.error);
        }
    }

    async fn befriend(state: &ServerState, a: &str, b: &str) {
        let r = call(state, "friendship.create", json!({ "userId": a, "friendId": b })).await;
        assert!(r.error.is_none(), "{:?}", r.error);
    }

    #[tokio::test]
    async fn test_friendship_flow() {
        let state = state();
        seed(&state, &["u1", "u2", "u3"]).await;

        befriend(&state, "u1", "u2").await;
        befriend(&state, "u2", "u3").await;

        let r = call(&state, "friends.list", json!({ "userId": "u2" })).await;
        let friends = &r.result.unwrap()["friends"];
        assert_eq!(friends[0]["userId"], "u1");
        assert_eq!(friends[1]["userId"], "u3");

        let r = call(&state, "network.connections", json!({ "userId": "u1" })).await;
        let connections = &r.result.unwrap()["connections"];
        assert_eq!(connections[0]["person"]["userId"], "u2");
        assert_eq!(connections[0]["distance"], 1);
        assert_eq!(connections[1]["person"]["userId"], "u3");
        assert_eq!(connections[1]["distance"], 2);

        let r = call(
            &state,
            "friendship.delete",
            json!({ "userId": "u1", "friendId": "u2" }),
        )
        .await;
        assert!(r.error.is_none());
        let r = call(&state, "friends.list", json!({ "userId": "u1" })).await;
        assert_eq!(r.result.unwrap()["friends"], json!([]));
    }

    #[tokio::test]
    async fn test_recommend_and_mutual() {
        let state = state();
        seed(&state, &["me", "a", "b", "c", "d"]).await;
        befriend(&state, "me", "a").await;
        befriend(&state, "me", "b").await;
        befriend(&state, "a", "c").await;
        befriend(&state, "b", "c").await;
        befriend(&state, "c", "d").await;

        let r = call(&state, "friends.recommend", json!({ "userId": "me" })).await;
        let recs = r.result.unwrap()["recommendations"].clone();
        let recs = recs.as_array().unwrap();

        // c has three friends, a and b two each; d is three hops out.
        assert_eq!(recs.len(), 3);
        assert_eq!(recs[0]["person"]["userId"], "c");
        assert_eq!(recs[0]["mutualFriends"], 6);
        assert_eq!(recs[1]["person"]["userId"], "a");
        assert_eq!(recs[1]["mutualFriends"], 4);
        assert_eq!(recs[2]["person"]["userId"], "b");
        assert_eq!(recs[2]["mutualFriends"], 4);

        let r = call(&state, "friends.mutual", json!({ "userId": "me", "friendId": "c" })).await;
        let mutual = r.result.unwrap()["mutual"].clone();
        let ids: Vec<_> = mutual
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["userId"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(ids, vec!["a", "b"]);

        let r = call(&state, "friends.recommend", json!({ "userId": "ghost" })).await;
        assert_eq!(r.result.unwrap()["recommendations"], json!([]));

        let r = call(
            &state,
            "friends.mutual",
            json!({ "userId": "me", "friendId": "ghost" }),
        )
        .await;
        assert_eq!(r.error.unwrap().code, NOT_FOUND);
    }

    #[tokio::test]
    async fn test_error_mapping() {
        let state = state();
        seed(&state, &["u1"]).await;

        let r = call(&state, "person.create", json!({ "userId": "u1", "name": "x" })).await;
        assert_eq!(r.error.unwrap().code, ALREADY_EXISTS);

        let r = call(
            &state,
            "friendship.create",
            json!({ "userId": "u1", "friendId": "u1" }),
        )
        .await;
        assert_eq!(r.error.unwrap().code, INVALID_PARAMS);

        let r = call(&state, "friends.list", json!({ "userId": "ghost" })).await;
        assert_eq!(r.error.unwrap().code, NOT_FOUND);

        let r = call(&state, "person.update", json!({ "userId": "ghost", "name": "Nobody" })).await;
        assert_eq!(r.error.unwrap().code, NOT_FOUND);

        let r = call(&state, "friends.list", json!({ "wrong": "field" })).await;
        assert_eq!(r.error.unwrap().code, INVALID_PARAMS);

        let r = call(&state, "friends.poke", json!({})).await;
        assert_eq!(r.error.unwrap().code, METHOD_NOT_FOUND);

        let r = process_message("not json", state.clone()).await;
        assert_eq!(r.error.unwrap().code, PARSE_ERROR);

        // Deleting a friendship that never existed is fine.
        let r = call(
            &state,
            "friendship.delete",
            json!({ "userId": "u1", "friendId": "ghost" }),
        )
        .await;
        assert!(r.error.is_none());
    }

    #[tokio::test]
    async fn test_update_and_info() {
        let state = state();
        seed(&state, &["u1"]).await;

        let r = call(&state, "person.update", json!({ "userId": "u1", "position": "CEO" })).await;
        assert_eq!(r.result.unwrap()["position"], "CEO");

        let r = call(&state, "person.get", json!({ "userId": "u1" })).await;
        assert_eq!(r.result.unwrap()["position"], "CEO");

        let r = call(&state, "graph.info", Value::Null).await;
        let info = r.result.unwrap();
        assert_eq!(info["personCount"], 1);
        assert_eq!(info["persistent"], false);
    }

    #[tokio::test]
    async fn test_mutations_are_persisted() {
        let dir = tempdir().unwrap();
        let store = Arc::new(GraphStore::open(dir.path()).unwrap());
        let state = state_with(FriendNetwork::with_sink(SocialGraph::new(), store.clone()));
        seed(&state, &["u1", "u2"]).await;
        befriend(&state, "u1", "u2").await;

        let stored = store.load_graph().unwrap().unwrap();
        assert_eq!(stored.person_count(), 2);
        assert!(stored.are_friends("u1", "u2"));

        let r = call(&state, "graph.info", Value::Null).await;
        assert_eq!(r.result.unwrap()["persistent"], true);
    }

    #[tokio::test]
    async fn test_failed_save_is_not_applied() {
        let mut graph = SocialGraph::new();
        graph.add_person(Person::new("u1", "Ada")).unwrap();
        graph.add_person(Person::new("u2", "Bob")).unwrap();
        let state = state_with(FriendNetwork::with_sink(graph, Arc::new(FailingSink)));

        let r = call(
            &state,
            "friendship.create",
            json!({ "userId": "u1", "friendId": "u2" }),
        )
        .await;
        assert_eq!(r.error.unwrap().code, INTERNAL_ERROR);

        let r = call(&state, "friends.list", json!({ "userId": "u1" })).await;
        assert_eq!(r.result.unwrap()["friends"], json!([]));

        let r = call(&state, "person.update", json!({ "userId": "u2", "name": "Robert" })).await;
        assert_eq!(r.error.unwrap().code, INTERNAL_ERROR);
        let r = call(&state, "person.get", json!({ "userId": "u2" })).await;
        assert_eq!(r.result.unwrap()["name"], "Bob");
    }
}
