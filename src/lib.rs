//! # EVM Multicall Client
//!
//! A client-side helper library that wraps Ethereum JSON-RPC read-only
//! contract interaction to simplify contract invocation and batched calls.
//!
//! ## Core Features
//!
//! - **Multicall Aggregation**
//!   - Batches independent read-only calls into one on-chain `aggregate`
//!   - Configurable batch size, sequential dispatch, stable ordering
//!   - Well-known aggregator registry with runtime overrides
//!
//! - **Typed ABI Codec**
//!   - Recursive signature derivation for tuples and arrays
//!   - Selector computation and parameter shape validation
//!
//! - **Resilient Dispatch**
//!   - Permanent/transient failure classification at the transport seam
//!   - Fixed-delay retry with an optional attempt ceiling
//!   - Concurrent per-call fallback when no aggregator is deployed
//!
//! ## Features
//!
//! - `rustls-tls`: Uses rustls as the TLS implementation instead of
//!   native-tls (OpenSSL). Useful for environments where OpenSSL is not
//!   available or not desired.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use evm_multicall::{
//!     connect_http, Multicall, MulticallOptions,
//!     utils::token_utils::{erc20_handle, token_balances},
//! };
//! use alloy::primitives::address;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let provider = connect_http("https://eth-mainnet.g.alchemy.com/v2/your-api-key")?;
//! let multicall = Multicall::create(provider, MulticallOptions::default()).await?;
//!
//! let usdc = address!("A0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48");
//! let owners = vec![
//!     address!("28C6c06298d514Db089934071355E5743bf21d60"),
//!     address!("DFd5293D8e347dFe59E90eFd55b2956a1343963d"),
//! ];
//!
//! let balances = token_balances(
//!     multicall.provider(),
//!     Some(&multicall),
//!     usdc,
//!     &owners,
//! ).await?;
//!
//! for entry in balances {
//!     println!("{}: {}", entry.owner, entry.balance);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Structure
//!
//! - `abi`: signature derivation, selectors, parameter packing
//! - `types`: type descriptors and the immutable call descriptor
//! - `contract`: contract handles and the chainable call builder
//! - `multicall`: the batching aggregator
//! - `registry`: network-to-aggregator address mapping
//! - `retry`: fixed-delay retry with permanent/transient classification
//! - `provider`: the read-only JSON-RPC seam
//! - `errors`: error types and handling
//! - `utils`: ERC20 convenience helpers

pub mod abi;
pub mod contract;
pub mod errors;
pub mod multicall;
pub mod provider;
pub mod registry;
pub mod retry;
pub mod types;
pub mod utils;

// Re-export only the essential types and functions
pub use contract::{CallChain, ContractHandle, Function, StateMutability};
pub use errors::{AbiError, CallError, MulticallError};
pub use multicall::{IMulticall, Multicall, MulticallCall, MulticallOptions, DEFAULT_BATCH_SIZE};
pub use provider::{connect_http, ReadProvider, RpcReadProvider};
pub use registry::MulticallRegistry;
pub use retry::RetryPolicy;
pub use types::{CallDescriptor, TypeSpec};
