//! Network-to-aggregator address registry
//!
//! Maps chain ids to the Multicall contract deployed on that network. The
//! registry is an explicit configuration object handed to
//! [`Multicall::create`](crate::Multicall::create) rather than process-global
//! mutable state; callers that share one registry across concurrent
//! initialization paths wrap it in their own synchronization.

use std::collections::HashMap;

use alloy::primitives::{address, Address};
use once_cell::sync::Lazy;

/// Canonical Multicall3 deployment, identical on most EVM networks
const MULTICALL3: Address = address!("cA11bde05977b3631167028862bE2a173976CA11");

/// Well-known aggregator deployments, keyed by chain id
static KNOWN_AGGREGATORS: Lazy<HashMap<u64, Address>> = Lazy::new(|| {
    HashMap::from([
        (1, MULTICALL3),        // Ethereum mainnet
        (10, MULTICALL3),       // Optimism
        (56, MULTICALL3),       // BNB Smart Chain
        (100, MULTICALL3),      // Gnosis
        (137, MULTICALL3),      // Polygon
        (250, MULTICALL3),      // Fantom
        (8453, MULTICALL3),     // Base
        (42161, MULTICALL3),    // Arbitrum One
        (43114, MULTICALL3),    // Avalanche C-Chain
        (11155111, MULTICALL3), // Sepolia
    ])
});

/// Mapping from chain id to aggregator contract address
///
/// `Default` seeds the table with well-known deployments; entries may be
/// extended or overridden with [`register`](Self::register) before handing
/// the registry to aggregator construction.
#[derive(Debug, Clone)]
pub struct MulticallRegistry {
    entries: HashMap<u64, Address>,
}

impl Default for MulticallRegistry {
    fn default() -> Self {
        Self {
            entries: KNOWN_AGGREGATORS.clone(),
        }
    }
}

impl MulticallRegistry {
    /// Registry seeded with well-known deployments
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with no entries at all
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Register or override the aggregator for a chain
    pub fn register(&mut self, chain_id: u64, address: Address) -> &mut Self {
        self.entries.insert(chain_id, address);
        self
    }

    /// Resolve the aggregator address for a chain, if any
    pub fn resolve(&self, chain_id: u64) -> Option<Address> {
        self.entries.get(&chain_id).copied()
    }

    /// Number of registered networks
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
