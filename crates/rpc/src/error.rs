/// Transport-level failure talking to the execution-layer endpoint.
///
/// `Http` and `InvalidResponse` are transient: nothing reached the chain, so
/// resubmitting the identical bytes with the same nonce is safe. `Rpc`
/// carries the endpoint's explicit refusal and is classified by the caller.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The endpoint was unreachable or the HTTP exchange failed.
    #[error("http transport error: {0}")]
    Http(#[from] reqwest::Error),
    /// The endpoint answered with a JSON-RPC error object.
    #[error("endpoint refused request: {message} (code {code})")]
    Rpc {
        /// JSON-RPC error code.
        code: i64,
        /// Human-readable refusal from the endpoint.
        message: String,
    },
    /// The endpoint answered with something that is not a valid JSON-RPC
    /// response.
    #[error("malformed rpc response: {0}")]
    InvalidResponse(String),
}
