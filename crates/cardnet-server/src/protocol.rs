//! JSON-RPC 2.0 message types and method parameters.

use cardnet_core::PersonUpdate;
use cardnet_graph::GraphError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const PARSE_ERROR: i32 = -32700;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;
pub const INTERNAL_ERROR: i32 = -32603;
pub const NOT_FOUND: i32 = -32001;
pub const ALREADY_EXISTS: i32 = -32002;

/// An incoming request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    #[serde(default = "default_version")]
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: Value,
    #[serde(default)]
    pub id: Option<Value>,
}

fn default_version() -> String {
    "2.0".to_string()
}

/// A response: exactly one of `result` and `error` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
    pub id: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
}

impl Response {
    pub fn success<T: Serialize>(id: Option<Value>, result: T) -> Self {
        match serde_json::to_value(result) {
            Ok(value) => Self {
                jsonrpc: default_version(),
                result: Some(value),
                error: None,
                id,
            },
            Err(e) => Self::error(id, INTERNAL_ERROR, e.to_string()),
        }
    }

    pub fn error(id: Option<Value>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: default_version(),
            result: None,
            error: Some(RpcError {
                code,
                message: message.into(),
            }),
            id,
        }
    }

    pub fn parse_error() -> Self {
        Self::error(None, PARSE_ERROR, "Parse error")
    }

    pub fn method_not_found(id: Option<Value>, method: &str) -> Self {
        Self::error(id, METHOD_NOT_FOUND, format!("Method not found: {}", method))
    }

    pub fn invalid_params(id: Option<Value>, message: impl Into<String>) -> Self {
        Self::error(id, INVALID_PARAMS, message)
    }

    /// Maps a graph failure onto its wire error code.
    pub fn from_graph_error(id: Option<Value>, err: &GraphError) -> Self {
        let code = match err {
            GraphError::NotFound(_) => NOT_FOUND,
            GraphError::InvalidInput(_) => INVALID_PARAMS,
            GraphError::AlreadyExists(_) => ALREADY_EXISTS,
            GraphError::Internal(_) => INTERNAL_ERROR,
        };
        Self::error(id, code, err.to_string())
    }
}

/// Parameters naming a single user.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserParams {
    pub user_id: String,
}

/// Parameters naming two users.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairParams {
    pub user_id: String,
    pub friend_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateParams {
    pub user_id: String,
    #[serde(flatten)]
    pub update: PersonUpdate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let r = Response::from_graph_error(None, &GraphError::NotFound("u1".into()));
        assert_eq!(r.error.unwrap().code, NOT_FOUND);

        let r = Response::from_graph_error(None, &GraphError::InvalidInput("x".into()));
        assert_eq!(r.error.unwrap().code, INVALID_PARAMS);

        let r = Response::from_graph_error(None, &GraphError::AlreadyExists("u1".into()));
        assert_eq!(r.error.unwrap().code, ALREADY_EXISTS);

        let r = Response::from_graph_error(None, &GraphError::Internal("boom".into()));
        assert_eq!(r.error.unwrap().code, INTERNAL_ERROR);
    }

    #[test]
    fn test_success_omits_error_field() {
        let json = serde_json::to_value(Response::success(Some(1.into()), "ok")).unwrap();
        assert_eq!(json["result"], "ok");
        assert!(json.get("error").is_none());
        assert_eq!(json["jsonrpc"], "2.0");
    }

    #[test]
    fn test_update_params_flatten() {
        let params: UpdateParams = serde_json::from_value(serde_json::json!({
            "userId": "u1",
            "company": "Acme"
        }))
        .unwrap();
        assert_eq!(params.user_id, "u1");
        assert_eq!(params.update.company.as_deref(), Some("Acme"));
        assert!(params.update.name.is_none());
    }
}
