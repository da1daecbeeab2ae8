//! Multicall aggregator for batched read-only calls
//!
//! Batches [`CallDescriptor`]s into single on-chain `aggregate` invocations
//! against a deployed Multicall contract, decodes the packed results, and
//! redistributes them to each logical caller in original order.
//!
//! Key properties:
//! - Batches are bounded (default 50 sub-calls) because block gas limits and
//!   RPC payload limits cap how much one aggregate call can carry
//! - Batches are dispatched sequentially, never concurrently, keeping the
//!   RPC endpoint load predictable and result ordering trivial
//! - `result[i]` always corresponds to `calls[i]`, across batch boundaries
//! - Every sub-call of one batch executes atomically at one block height

use alloy::{
    dyn_abi::DynSolValue,
    primitives::{Address, Bytes, B256, U256},
    sol_types::SolCall,
};
use tracing::debug;

use crate::{
    errors::{AbiError, MulticallError},
    provider::ReadProvider,
    registry::MulticallRegistry,
    retry::RetryPolicy,
    types::CallDescriptor,
};

/// Default number of sub-calls packed into one aggregate invocation
pub const DEFAULT_BATCH_SIZE: usize = 50;

// Multicall interface - the aggregate entry point shared by Multicall1/3
// deployments, plus the auxiliary view helpers the contract exposes.

mod bindings {
    use alloy::sol;

    sol! {
        #[derive(Debug)]
        struct MulticallCall {
            address target;
            bytes callData;
        }

        contract IMulticall {
            function aggregate(MulticallCall[] calldata calls)
                public
                returns (uint256 blockNumber, bytes[] memory returnData);

            function getEthBalance(address addr) public view returns (uint256 balance);
            function getBlockHash(uint256 blockNumber) public view returns (bytes32 blockHash);
            function getLastBlockHash() public view returns (bytes32 blockHash);
            function getCurrentBlockTimestamp() public view returns (uint256 timestamp);
            function getBlockNumber() public view returns (uint256 blockNumber);
        }
    }
}

pub use bindings::{IMulticall, MulticallCall};

/// Options for [`Multicall::create`]
///
/// Anything left `None` is resolved at construction: the chain id from the
/// provider, the aggregator address from the registry (seeded defaults when
/// no registry is given), and the retry policy from [`RetryPolicy::default`].
#[derive(Debug, Clone, Default)]
pub struct MulticallOptions {
    pub chain_id: Option<u64>,
    pub address: Option<Address>,
    pub registry: Option<MulticallRegistry>,
    pub retry: Option<RetryPolicy>,
}

/// Aggregator over one `(provider, network)` pair
///
/// Constructed once per connection and reused for its lifetime. All
/// dispatches are read-only `eth_call`s wrapped by the retry policy.
#[derive(Debug)]
pub struct Multicall<P> {
    provider: P,
    chain_id: u64,
    address: Address,
    retry: RetryPolicy,
}

impl<P: ReadProvider> Multicall<P> {
    /// Resolve the aggregator for the provider's network
    ///
    /// # Errors
    /// `MulticallError::UnknownAggregator` when the network has no registered
    /// aggregator address and none was supplied explicitly. The caller must
    /// then either register an address or fall back to non-batched calls.
    pub async fn create(provider: P, options: MulticallOptions) -> Result<Self, MulticallError> {
        let chain_id = match options.chain_id {
            Some(chain_id) => chain_id,
            None => provider.chain_id().await?,
        };
        let address = match options.address {
            Some(address) => address,
            None => options
                .registry
                .unwrap_or_default()
                .resolve(chain_id)
                .ok_or(MulticallError::UnknownAggregator(chain_id))?,
        };
        Ok(Self {
            provider,
            chain_id,
            address,
            retry: options.retry.unwrap_or_default(),
        })
    }

    /// Chain id the aggregator was resolved for
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Address of the on-chain aggregator contract
    pub fn address(&self) -> Address {
        self.address
    }

    /// The underlying read provider
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Batch, dispatch, and decode calls with the default batch size
    ///
    /// Returns one decoded value per descriptor, in input order. Descriptors
    /// with exactly one declared output yield the bare value; others yield a
    /// tuple of matching arity.
    pub async fn aggregate(
        &self,
        calls: &[CallDescriptor],
    ) -> Result<Vec<DynSolValue>, MulticallError> {
        self.aggregate_with_batch_size(calls, DEFAULT_BATCH_SIZE).await
    }

    /// Batch, dispatch, and decode calls with an explicit batch size
    ///
    /// Calls are partitioned into consecutive batches of at most
    /// `batch_size`; batches are dispatched sequentially and their decoded
    /// results concatenated, preserving global input order.
    pub async fn aggregate_with_batch_size(
        &self,
        calls: &[CallDescriptor],
        batch_size: usize,
    ) -> Result<Vec<DynSolValue>, MulticallError> {
        if batch_size == 0 {
            return Err(AbiError::Encoding("batch size must be at least 1".to_string()).into());
        }
        if calls.is_empty() {
            return Ok(Vec::new());
        }

        let mut results = Vec::with_capacity(calls.len());
        for batch in calls.chunks(batch_size) {
            let mut encoded = Vec::with_capacity(batch.len());
            for call in batch {
                encoded.push(MulticallCall {
                    target: call.target(),
                    callData: call.call_data()?,
                });
            }
            let request: Bytes = IMulticall::aggregateCall { calls: encoded }.abi_encode().into();

            debug!(batch_len = batch.len(), total = calls.len(), "dispatching aggregate batch");
            let raw = self.view_call(request).await?;

            let response = IMulticall::aggregateCall::abi_decode_returns(&raw)
                .map_err(|e| AbiError::Decoding(format!("malformed aggregate response: {e}")))?;
            if response.returnData.len() != batch.len() {
                return Err(AbiError::Decoding(format!(
                    "aggregate returned {} slots for {} calls",
                    response.returnData.len(),
                    batch.len()
                ))
                .into());
            }
            for (call, data) in batch.iter().zip(response.returnData.iter()) {
                results.push(call.decode_returns(data)?);
            }
        }
        Ok(results)
    }

    /// Native token balance of `addr`, via the aggregator's view helper
    pub async fn get_eth_balance(&self, addr: Address) -> Result<U256, MulticallError> {
        let raw = self
            .view_call(IMulticall::getEthBalanceCall { addr }.abi_encode().into())
            .await?;
        let balance = IMulticall::getEthBalanceCall::abi_decode_returns(&raw)
            .map_err(|e| AbiError::Decoding(format!("malformed getEthBalance response: {e}")))?;
        Ok(balance)
    }

    /// Hash of the block at `block_number`
    pub async fn get_block_hash(&self, block_number: U256) -> Result<B256, MulticallError> {
        let raw = self
            .view_call(
                IMulticall::getBlockHashCall {
                    blockNumber: block_number,
                }
                .abi_encode()
                .into(),
            )
            .await?;
        let hash = IMulticall::getBlockHashCall::abi_decode_returns(&raw)
            .map_err(|e| AbiError::Decoding(format!("malformed getBlockHash response: {e}")))?;
        Ok(hash)
    }

    /// Hash of the previous block
    pub async fn get_last_block_hash(&self) -> Result<B256, MulticallError> {
        let raw = self
            .view_call(IMulticall::getLastBlockHashCall {}.abi_encode().into())
            .await?;
        let hash = IMulticall::getLastBlockHashCall::abi_decode_returns(&raw)
            .map_err(|e| AbiError::Decoding(format!("malformed getLastBlockHash response: {e}")))?;
        Ok(hash)
    }

    /// Timestamp of the current block
    pub async fn get_current_block_timestamp(&self) -> Result<U256, MulticallError> {
        let raw = self
            .view_call(IMulticall::getCurrentBlockTimestampCall {}.abi_encode().into())
            .await?;
        let timestamp = IMulticall::getCurrentBlockTimestampCall::abi_decode_returns(&raw)
            .map_err(|e| {
                AbiError::Decoding(format!("malformed getCurrentBlockTimestamp response: {e}"))
            })?;
        Ok(timestamp)
    }

    /// Number of the current block
    pub async fn get_block_number(&self) -> Result<U256, MulticallError> {
        let raw = self
            .view_call(IMulticall::getBlockNumberCall {}.abi_encode().into())
            .await?;
        let number = IMulticall::getBlockNumberCall::abi_decode_returns(&raw)
            .map_err(|e| AbiError::Decoding(format!("malformed getBlockNumber response: {e}")))?;
        Ok(number)
    }

    /// Retry-wrapped `eth_call` against the aggregator contract
    async fn view_call(&self, data: Bytes) -> Result<Bytes, MulticallError> {
        let raw = self
            .retry
            .run(|| self.provider.call(self.address, data.clone()))
            .await?;
        Ok(raw)
    }
}
