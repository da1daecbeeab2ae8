//! Convenience utilities built on the core batching layer
//!
//! # Modules
//!
//! - [`token_utils`]: ERC20 interaction utilities
//!   - Batched balance queries with a non-multicall fallback path
//!   - Token metadata retrieval through the chainable call builder

/// ERC20 token interaction utilities
pub mod token_utils;
