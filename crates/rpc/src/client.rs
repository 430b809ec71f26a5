use crate::{Eth1Provider, TransportError};
use alloy_primitives::{hex, Address, B256};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use tracing::trace;
use url::Url;

/// JSON-RPC 2.0 client for an execution-layer HTTP endpoint.
#[derive(Debug, Clone)]
pub struct Eth1Client {
    client: reqwest::Client,
    endpoint: Url,
    next_id: Arc<AtomicU64>,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

impl Eth1Client {
    /// Client against the given endpoint, with a default HTTP client.
    pub fn new(endpoint: Url) -> Self {
        Self::with_client(reqwest::Client::new(), endpoint)
    }

    /// Client reusing an existing HTTP connection pool.
    pub fn with_client(client: reqwest::Client, endpoint: Url) -> Self {
        Self { client, endpoint, next_id: Arc::new(AtomicU64::new(1)) }
    }

    async fn request(&self, method: &str, params: Value) -> Result<Value, TransportError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });
        trace!(target: "rpc::eth1", %method, %id, "sending request");

        let response: RpcResponse = self
            .client
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await?
            .json()
            .await?;

        if let Some(err) = response.error {
            return Err(TransportError::Rpc { code: err.code, message: err.message });
        }
        response.result.ok_or_else(|| {
            TransportError::InvalidResponse("response carries neither result nor error".to_owned())
        })
    }

    /// `eth_chainId` as an integer.
    pub async fn chain_id(&self) -> Result<u64, TransportError> {
        let result = self.request("eth_chainId", json!([])).await?;
        parse_quantity(&result)
    }

    /// `eth_getTransactionCount` for `address` at the given block tag.
    pub async fn transaction_count(
        &self,
        address: Address,
        tag: &str,
    ) -> Result<u64, TransportError> {
        let result = self
            .request("eth_getTransactionCount", json!([address, tag]))
            .await?;
        parse_quantity(&result)
    }

    /// `eth_sendRawTransaction` with 0x-prefixed hex payload.
    pub async fn send_raw_transaction(&self, raw: &[u8]) -> Result<B256, TransportError> {
        let result = self
            .request("eth_sendRawTransaction", json!([hex::encode_prefixed(raw)]))
            .await?;
        parse_hash(&result)
    }
}

#[async_trait]
impl Eth1Provider for Eth1Client {
    async fn nonce(&self, address: Address) -> Result<u64, TransportError> {
        // the pending tag folds in the account's own in-flight transactions
        self.transaction_count(address, "pending").await
    }

    async fn send_raw(&self, raw: &[u8]) -> Result<B256, TransportError> {
        self.send_raw_transaction(raw).await
    }
}

fn parse_quantity(value: &Value) -> Result<u64, TransportError> {
    let text = value
        .as_str()
        .ok_or_else(|| TransportError::InvalidResponse(format!("expected quantity, got {value}")))?;
    u64::from_str_radix(text.trim_start_matches("0x"), 16)
        .map_err(|_| TransportError::InvalidResponse(format!("malformed quantity `{text}`")))
}

fn parse_hash(value: &Value) -> Result<B256, TransportError> {
    let text = value
        .as_str()
        .ok_or_else(|| TransportError::InvalidResponse(format!("expected hash, got {value}")))?;
    text.parse()
        .map_err(|_| TransportError::InvalidResponse(format!("malformed transaction hash `{text}`")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_quantities() {
        assert_eq!(parse_quantity(&json!("0x0")).unwrap(), 0);
        assert_eq!(parse_quantity(&json!("0x2a")).unwrap(), 42);
        assert!(parse_quantity(&json!("not hex")).is_err());
        assert!(parse_quantity(&json!(7)).is_err());
    }

    #[test]
    fn parses_hashes() {
        let hash = "0x649bbc62d0e31342afea4e5cd82d4049e7e1ee912fc0889aa790803be39038c5";
        assert_eq!(parse_hash(&json!(hash)).unwrap().to_string(), hash);
        assert!(parse_hash(&json!("0x1234")).is_err());
    }

    #[test]
    fn error_object_surfaces_code_and_message() {
        let response: RpcResponse = serde_json::from_str(
            r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32000,"message":"nonce too low"}}"#,
        )
        .unwrap();
        let err = response.error.unwrap();
        assert_eq!(err.code, -32000);
        assert_eq!(err.message, "nonce too low");
        assert!(response.result.is_none());
    }

    #[test]
    fn result_deserializes() {
        let response: RpcResponse =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":1,"result":"0x5"}"#).unwrap();
        assert_eq!(parse_quantity(&response.result.unwrap()).unwrap(), 5);
    }
}
