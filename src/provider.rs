//! Read-only provider seam over the JSON-RPC transport
//!
//! [`ReadProvider`] is the narrow surface the aggregator and convenience
//! layers depend on: `eth_call` against a target plus chain-id discovery.
//! Production code uses [`RpcReadProvider`] over an alloy provider; tests
//! substitute their own implementations.

use alloy::{
    network::TransactionBuilder,
    primitives::{Address, Bytes},
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::types::TransactionRequest,
    transports::{RpcError, TransportErrorKind},
};
use async_trait::async_trait;

use crate::errors::{CallError, MulticallError};

/// Read-only view of an EVM JSON-RPC endpoint
///
/// Every method suspends the calling task until the response arrives.
/// Implementations must return a typed [`CallError`] so the retry policy can
/// classify failures structurally instead of sniffing error text.
#[async_trait]
pub trait ReadProvider: Send + Sync {
    /// Execute `eth_call` against `to` with the given call data
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, CallError>;

    /// Chain id of the connected network
    async fn chain_id(&self) -> Result<u64, CallError>;
}

/// [`ReadProvider`] over an alloy JSON-RPC provider
#[derive(Debug, Clone)]
pub struct RpcReadProvider<P = DynProvider> {
    inner: P,
}

impl<P> RpcReadProvider<P> {
    pub fn new(inner: P) -> Self {
        Self { inner }
    }

    /// The wrapped alloy provider
    pub fn inner(&self) -> &P {
        &self.inner
    }
}

#[async_trait]
impl<P> ReadProvider for RpcReadProvider<P>
where
    P: Provider + Send + Sync,
{
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, CallError> {
        let tx = TransactionRequest::default().with_to(to).with_input(data);
        self.inner.call(tx).await.map_err(classify_rpc_error)
    }

    async fn chain_id(&self) -> Result<u64, CallError> {
        self.inner.get_chain_id().await.map_err(classify_rpc_error)
    }
}

/// Connect to an HTTP JSON-RPC endpoint
///
/// # Example
/// ```no_run
/// # async fn example() -> anyhow::Result<()> {
/// use evm_multicall::provider::connect_http;
/// let provider = connect_http("https://eth.llamarpc.com")?;
/// # Ok(())
/// # }
/// ```
pub fn connect_http(rpc_url: &str) -> Result<RpcReadProvider, MulticallError> {
    let url = rpc_url
        .parse()
        .map_err(|_| MulticallError::InvalidRpcUrl(rpc_url.to_string()))?;
    let provider = ProviderBuilder::new().connect_http(url).erased();
    Ok(RpcReadProvider::new(provider))
}

/// Map an alloy transport error into the call taxonomy
///
/// Structured JSON-RPC error responses carry node-specific revert and
/// missing-method messages, so they go through the substring fallback
/// adapter; everything else is a transient transport failure.
fn classify_rpc_error(err: RpcError<TransportErrorKind>) -> CallError {
    match err {
        RpcError::ErrorResp(payload) => CallError::from_rpc_message(&payload.to_string()),
        other => CallError::Transport(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_url_is_rejected() {
        let result = connect_http("not a url");
        assert!(matches!(result, Err(MulticallError::InvalidRpcUrl(_))));
    }
}
