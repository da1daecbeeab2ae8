//! ERC20 token utilities for querying balances and metadata
//!
//! Provides batched queries over the multicall aggregator with the mandated
//! dual-path contract: every batched operation checks whether an aggregator
//! is available and, if not, issues the equivalent individual read-only
//! calls concurrently, reassembling the same ordered result shape.

use alloy::{
    dyn_abi::DynSolValue,
    primitives::{Address, U256},
};
use futures::future::try_join_all;
use serde::Serialize;

use crate::{
    contract::{ContractHandle, Function},
    errors::{AbiError, MulticallError},
    multicall::Multicall,
    provider::ReadProvider,
    retry::RetryPolicy,
    types::TypeSpec,
};

/// Balance of one owner, paired with the queried address
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OwnerBalance {
    pub owner: Address,
    pub balance: U256,
}

/// Token metadata collected in one batched call
#[derive(Debug, Clone, Serialize)]
pub struct TokenMetadata {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub total_supply: U256,
}

/// Handle over the read-only ERC20 interface of `token`
pub fn erc20_handle(token: Address) -> ContractHandle {
    ContractHandle::new(
        token,
        [
            Function::view("name", vec![], vec![TypeSpec::String]),
            Function::view("symbol", vec![], vec![TypeSpec::String]),
            Function::view("decimals", vec![], vec![TypeSpec::Uint(8)]),
            Function::view("totalSupply", vec![], vec![TypeSpec::Uint(256)]),
            Function::view(
                "balanceOf",
                vec![TypeSpec::Address],
                vec![TypeSpec::Uint(256)],
            ),
            Function::view(
                "allowance",
                vec![TypeSpec::Address, TypeSpec::Address],
                vec![TypeSpec::Uint(256)],
            ),
        ],
    )
}

/// Query one token's balance for many owners
///
/// With an aggregator present the owners are batched through `aggregate`;
/// without one, the equivalent individual `balanceOf` calls are issued
/// concurrently and reassembled in input order. Both paths return identical
/// `{owner, balance}` pairs for identical chain state.
///
/// # Arguments
/// - `provider`: read provider used by the fallback path
/// - `multicall`: aggregator for the active network, if one is available
/// - `token`: ERC20 contract address
/// - `owners`: addresses to query, defining the result order
pub async fn token_balances<P: ReadProvider>(
    provider: &P,
    multicall: Option<&Multicall<P>>,
    token: Address,
    owners: &[Address],
) -> Result<Vec<OwnerBalance>, MulticallError> {
    let handle = erc20_handle(token);
    let calls = owners
        .iter()
        .map(|owner| handle.call("balanceOf", vec![DynSolValue::Address(*owner)]))
        .collect::<Result<Vec<_>, _>>()?;

    let balances = match multicall {
        Some(multicall) => {
            let decoded = multicall.aggregate(&calls).await?;
            decoded
                .into_iter()
                .map(as_uint)
                .collect::<Result<Vec<_>, _>>()?
        }
        None => {
            let retry = RetryPolicy::default();
            let singles = calls.iter().map(|call| {
                let retry = &retry;
                async move {
                    let data = call.call_data()?;
                    let raw = retry
                        .run(|| provider.call(call.target(), data.clone()))
                        .await?;
                    let decoded = call.decode_returns(&raw)?;
                    as_uint(decoded).map_err(MulticallError::from)
                }
            });
            try_join_all(singles).await?
        }
    };

    Ok(owners
        .iter()
        .zip(balances)
        .map(|(owner, balance)| OwnerBalance {
            owner: *owner,
            balance,
        })
        .collect())
}

/// Collect a token's metadata in one aggregate round trip
///
/// Chains `name`, `symbol`, `decimals`, and `totalSupply` against the token
/// and dispatches them together through the aggregator.
pub async fn token_metadata<P: ReadProvider>(
    multicall: &Multicall<P>,
    token: Address,
) -> Result<TokenMetadata, MulticallError> {
    let handle = erc20_handle(token);
    let results = handle
        .chain()
        .call("name", vec![])?
        .call("symbol", vec![])?
        .call("decimals", vec![])?
        .call("totalSupply", vec![])?
        .exec(multicall)
        .await?;

    let mut values = results.into_iter();
    let name = as_string(next_value(&mut values)?)?;
    let symbol = as_string(next_value(&mut values)?)?;
    let decimals = as_uint(next_value(&mut values)?)?.to::<u8>();
    let total_supply = as_uint(next_value(&mut values)?)?;

    Ok(TokenMetadata {
        name,
        symbol,
        decimals,
        total_supply,
    })
}

fn next_value(
    values: &mut impl Iterator<Item = DynSolValue>,
) -> Result<DynSolValue, MulticallError> {
    values
        .next()
        .ok_or_else(|| AbiError::Decoding("aggregate returned too few results".to_string()).into())
}

fn as_uint(value: DynSolValue) -> Result<U256, AbiError> {
    match value {
        DynSolValue::Uint(value, _) => Ok(value),
        other => Err(AbiError::Decoding(format!(
            "expected an unsigned integer, got {other:?}"
        ))),
    }
}

fn as_string(value: DynSolValue) -> Result<String, AbiError> {
    match value {
        DynSolValue::String(value) => Ok(value),
        other => Err(AbiError::Decoding(format!(
            "expected a string, got {other:?}"
        ))),
    }
}
