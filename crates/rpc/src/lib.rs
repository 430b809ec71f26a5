//! Execution-layer JSON-RPC client: account nonces and raw transaction
//! broadcast.
//!
//! The engine consumes the endpoint purely through [`Eth1Provider`], an
//! abstract nonce/broadcast pair; [`Eth1Client`] is the HTTP implementation.

mod client;
mod error;

pub use client::Eth1Client;
pub use error::TransportError;

use alloy_primitives::{Address, B256};
use async_trait::async_trait;

/// The network-state collaborator: per-account nonce lookup plus raw
/// transaction broadcast.
///
/// Implementations perform exactly one request per call and never retry on
/// their own. Nonce-allocation concurrency across in-flight sends for the
/// same account is the implementor's concern, not the engine's.
#[async_trait]
pub trait Eth1Provider: Send + Sync {
    /// Next nonce for `address`, including pending transactions.
    async fn nonce(&self, address: Address) -> Result<u64, TransportError>;

    /// Broadcasts raw signed transaction bytes, returning the hash the
    /// endpoint reports.
    async fn send_raw(&self, raw: &[u8]) -> Result<B256, TransportError>;
}
