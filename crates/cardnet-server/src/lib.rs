//! Cardnet Server - WebSocket server for the friend graph
//!
//! This crate exposes the graph engine to the API layer over a small
//! JSON-RPC 2.0 protocol. It carries no business rules of its own; every
//! method maps onto one [`FriendNetwork`] operation.
//!
//! The server supports:
//! - Multiple concurrent connections sharing one network
//! - JSON-RPC 2.0 messages
//! - Write-through persistence when the network has a snapshot sink

use cardnet_graph::FriendNetwork;
use std::sync::Arc;

/// State shared by every connection.
pub struct ServerContext {
    pub network: Arc<FriendNetwork>,
}

/// Shared handle passed to handlers.
pub type ServerState = Arc<ServerContext>;

mod handlers;
mod protocol;
mod server;

pub use protocol::{PairParams, Request, Response, RpcError, UpdateParams, UserParams};
pub use server::{CardnetServer, ServerConfig, DEFAULT_PORT};
