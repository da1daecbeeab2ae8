//! Shared in-memory provider for integration tests
//!
//! Answers `balanceOf(address)` lookups from a configured balance table and
//! arbitrary calls from a canned `(target, callData) -> returnData` table.
//! Aggregate calls against [`AGGREGATOR`] are decoded and answered sub-call
//! by sub-call, so the batched and single-call paths observe the same state.

use std::{
    collections::HashMap,
    sync::atomic::{AtomicU32, Ordering},
};

use alloy::{
    dyn_abi::DynSolValue,
    primitives::{address, Address, Bytes, U256},
    sol_types::SolCall,
};
use async_trait::async_trait;
use evm_multicall::{CallError, IMulticall, ReadProvider};

pub const CHAIN_ID: u64 = 31337;
pub const AGGREGATOR: Address = address!("cA11bde05977b3631167028862bE2a173976CA11");
pub const BLOCK_NUMBER: u64 = 19_000_000;

const BALANCE_OF_SELECTOR: [u8; 4] = [0x70, 0xa0, 0x82, 0x31];

#[derive(Default)]
pub struct MockProvider {
    balances: HashMap<(Address, Address), U256>,
    canned: HashMap<(Address, Bytes), Bytes>,
    round_trips: AtomicU32,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_balance(&mut self, token: Address, owner: Address, balance: U256) {
        self.balances.insert((token, owner), balance);
    }

    pub fn set_response(&mut self, target: Address, call_data: Bytes, response: Bytes) {
        self.canned.insert((target, call_data), response);
    }

    /// Number of RPC round trips observed so far
    pub fn round_trips(&self) -> u32 {
        self.round_trips.load(Ordering::SeqCst)
    }

    fn answer_single(&self, target: Address, data: &[u8]) -> Result<Bytes, CallError> {
        if let Some(response) = self.canned.get(&(target, Bytes::copy_from_slice(data))) {
            return Ok(response.clone());
        }
        if data.len() == 36 && data[..4] == BALANCE_OF_SELECTOR {
            let owner = Address::from_slice(&data[16..36]);
            let balance = self
                .balances
                .get(&(target, owner))
                .copied()
                .unwrap_or_default();
            return Ok(DynSolValue::Uint(balance, 256).abi_encode().into());
        }
        Err(CallError::MissingMethod(format!(
            "0x{}",
            hex::encode(&data[..4.min(data.len())])
        )))
    }
}

#[async_trait]
impl ReadProvider for MockProvider {
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, CallError> {
        self.round_trips.fetch_add(1, Ordering::SeqCst);
        if to == AGGREGATOR {
            let request = IMulticall::aggregateCall::abi_decode(&data)
                .map_err(|e| CallError::Rpc(e.to_string()))?;
            let mut blobs = Vec::with_capacity(request.calls.len());
            for call in &request.calls {
                let answer = self.answer_single(call.target, &call.callData)?;
                blobs.push(DynSolValue::Bytes(answer.to_vec()));
            }
            let encoded = DynSolValue::Tuple(vec![
                DynSolValue::Uint(U256::from(BLOCK_NUMBER), 256),
                DynSolValue::Array(blobs),
            ])
            .abi_encode_params();
            Ok(encoded.into())
        } else {
            self.answer_single(to, &data)
        }
    }

    async fn chain_id(&self) -> Result<u64, CallError> {
        Ok(CHAIN_ID)
    }
}

/// Deterministic owner address derived from an index
pub fn owner(index: u16) -> Address {
    let mut bytes = [0u8; 20];
    bytes[18..20].copy_from_slice(&index.to_be_bytes());
    bytes[0] = 0xee;
    Address::from(bytes)
}
