//! Aggregator integration tests against the in-memory provider

mod common;

use alloy::{
    dyn_abi::DynSolValue,
    primitives::{address, Address, Bytes, U256},
};
use async_trait::async_trait;
use common::{owner, MockProvider, AGGREGATOR, CHAIN_ID};
use evm_multicall::{
    abi, AbiError, CallDescriptor, CallError, Multicall, MulticallError, MulticallOptions,
    MulticallRegistry, ReadProvider, TypeSpec,
};
use evm_multicall::utils::token_utils::erc20_handle;

const TOKEN: Address = address!("A0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48");

fn explicit_options() -> MulticallOptions {
    MulticallOptions {
        address: Some(AGGREGATOR),
        ..Default::default()
    }
}

fn funded_provider(count: u16) -> MockProvider {
    let mut provider = MockProvider::new();
    for index in 0..count {
        provider.set_balance(TOKEN, owner(index), U256::from(index as u64 + 1));
    }
    provider
}

fn balance_calls(count: u16) -> Vec<CallDescriptor> {
    let handle = erc20_handle(TOKEN);
    (0..count)
        .map(|index| {
            handle
                .call("balanceOf", vec![DynSolValue::Address(owner(index))])
                .unwrap()
        })
        .collect()
}

#[tokio::test]
async fn test_order_preserved_across_batches() {
    let multicall = Multicall::create(funded_provider(120), explicit_options())
        .await
        .unwrap();
    let calls = balance_calls(120);

    let results = multicall
        .aggregate_with_batch_size(&calls, 50)
        .await
        .unwrap();

    assert_eq!(results.len(), 120);
    for (index, value) in results.iter().enumerate() {
        assert_eq!(
            value,
            &DynSolValue::Uint(U256::from(index as u64 + 1), 256),
            "result {index} out of order"
        );
    }
    // 120 calls at batch size 50 -> 3 sequential round trips (50/50/20).
    assert_eq!(multicall.provider().round_trips(), 3);
}

#[tokio::test]
async fn test_batch_size_one_still_preserves_order() {
    let multicall = Multicall::create(funded_provider(7), explicit_options())
        .await
        .unwrap();
    let calls = balance_calls(7);

    let results = multicall.aggregate_with_batch_size(&calls, 1).await.unwrap();

    assert_eq!(results.len(), 7);
    for (index, value) in results.iter().enumerate() {
        assert_eq!(value, &DynSolValue::Uint(U256::from(index as u64 + 1), 256));
    }
    assert_eq!(multicall.provider().round_trips(), 7);
}

#[tokio::test]
async fn test_default_batch_size_is_fifty() {
    let multicall = Multicall::create(funded_provider(120), explicit_options())
        .await
        .unwrap();
    let calls = balance_calls(120);

    let results = multicall.aggregate(&calls).await.unwrap();

    assert_eq!(results.len(), 120);
    assert_eq!(multicall.provider().round_trips(), 3);
}

#[tokio::test]
async fn test_empty_input_short_circuits() {
    let multicall = Multicall::create(MockProvider::new(), explicit_options())
        .await
        .unwrap();

    let results = multicall.aggregate(&[]).await.unwrap();

    assert!(results.is_empty());
    assert_eq!(multicall.provider().round_trips(), 0);
}

#[tokio::test]
async fn test_batch_size_zero_is_rejected() {
    let multicall = Multicall::create(funded_provider(1), explicit_options())
        .await
        .unwrap();
    let calls = balance_calls(1);

    let result = multicall.aggregate_with_batch_size(&calls, 0).await;

    assert!(matches!(
        result,
        Err(MulticallError::Abi(AbiError::Encoding(_)))
    ));
    assert_eq!(multicall.provider().round_trips(), 0);
}

#[tokio::test]
async fn test_single_output_flattening_in_aggregate() {
    let mut provider = funded_provider(1);

    // A two-output function alongside a single-output one.
    let stats = CallDescriptor::new(
        TOKEN,
        "stats",
        vec![],
        vec![TypeSpec::Uint(256), TypeSpec::Bool],
        vec![],
    )
    .unwrap();
    let stats_values = vec![
        DynSolValue::Uint(U256::from(99u8), 256),
        DynSolValue::Bool(true),
    ];
    provider.set_response(
        TOKEN,
        stats.call_data().unwrap(),
        abi::encode_params(stats.outputs(), &stats_values)
            .unwrap()
            .into(),
    );

    let multicall = Multicall::create(provider, explicit_options()).await.unwrap();
    let balance = balance_calls(1).remove(0);

    let results = multicall.aggregate(&[balance, stats]).await.unwrap();

    assert_eq!(results[0], DynSolValue::Uint(U256::from(1u8), 256));
    assert_eq!(results[1], DynSolValue::Tuple(stats_values));
}

#[tokio::test]
async fn test_unknown_aggregator_for_unregistered_chain() {
    let result = Multicall::create(MockProvider::new(), MulticallOptions::default()).await;

    assert!(matches!(
        result,
        Err(MulticallError::UnknownAggregator(CHAIN_ID))
    ));
}

#[tokio::test]
async fn test_registry_override_resolves_custom_chain() {
    let mut registry = MulticallRegistry::empty();
    registry.register(CHAIN_ID, AGGREGATOR);
    let options = MulticallOptions {
        registry: Some(registry),
        ..Default::default()
    };

    let multicall = Multicall::create(funded_provider(2), options).await.unwrap();

    assert_eq!(multicall.chain_id(), CHAIN_ID);
    assert_eq!(multicall.address(), AGGREGATOR);
    let results = multicall.aggregate(&balance_calls(2)).await.unwrap();
    assert_eq!(results.len(), 2);
}

#[tokio::test]
async fn test_unknown_method_issues_no_network_call() {
    let multicall = Multicall::create(MockProvider::new(), explicit_options())
        .await
        .unwrap();
    let handle = erc20_handle(TOKEN);

    let result = handle.call("mint", vec![DynSolValue::Address(owner(0))]);

    assert!(matches!(result, Err(MulticallError::UnknownMethod(name)) if name == "mint"));
    assert_eq!(multicall.provider().round_trips(), 0);
}

#[tokio::test]
async fn test_empty_call_chain_is_rejected() {
    let multicall = Multicall::create(MockProvider::new(), explicit_options())
        .await
        .unwrap();
    let handle = erc20_handle(TOKEN);

    let result = handle.chain().exec(&multicall).await;

    assert!(matches!(result, Err(MulticallError::EmptyCallChain)));
    assert_eq!(multicall.provider().round_trips(), 0);
}

#[tokio::test]
async fn test_chained_calls_execute_in_queue_order() {
    let mut provider = MockProvider::new();
    let handle = erc20_handle(TOKEN);
    let canned: &[(&str, TypeSpec, DynSolValue)] = &[
        ("name", TypeSpec::String, DynSolValue::String("Token".into())),
        ("symbol", TypeSpec::String, DynSolValue::String("TKN".into())),
        (
            "decimals",
            TypeSpec::Uint(8),
            DynSolValue::Uint(U256::from(6u8), 8),
        ),
    ];
    for &(name, ref output, ref value) in canned {
        let call = handle.call(name, vec![]).unwrap();
        provider.set_response(
            TOKEN,
            call.call_data().unwrap(),
            abi::encode_params(&[output.clone()], std::slice::from_ref(value))
                .unwrap()
                .into(),
        );
    }

    let multicall = Multicall::create(provider, explicit_options()).await.unwrap();
    let results = handle
        .chain()
        .call("name", vec![])
        .unwrap()
        .call("symbol", vec![])
        .unwrap()
        .call("decimals", vec![])
        .unwrap()
        .exec(&multicall)
        .await
        .unwrap();

    assert_eq!(results[0], DynSolValue::String("Token".into()));
    assert_eq!(results[1], DynSolValue::String("TKN".into()));
    assert_eq!(results[2], DynSolValue::Uint(U256::from(6u8), 8));
    assert_eq!(multicall.provider().round_trips(), 1);
}

/// Provider answering every call with bytes no decoder should accept
struct GarbageProvider;

#[async_trait]
impl ReadProvider for GarbageProvider {
    async fn call(&self, _to: Address, _data: Bytes) -> Result<Bytes, CallError> {
        Ok(Bytes::from(vec![0xde, 0xad, 0xbe]))
    }

    async fn chain_id(&self) -> Result<u64, CallError> {
        Ok(CHAIN_ID)
    }
}

#[tokio::test]
async fn test_malformed_aggregate_response_is_a_decode_error() {
    let multicall = Multicall::create(GarbageProvider, explicit_options())
        .await
        .unwrap();
    let calls = balance_calls(1);

    let result = multicall.aggregate(&calls).await;

    assert!(matches!(
        result,
        Err(MulticallError::Abi(AbiError::Decoding(_)))
    ));
}

/// Provider answering aggregate with fewer slots than requested
struct ShortResponseProvider;

#[async_trait]
impl ReadProvider for ShortResponseProvider {
    async fn call(&self, _to: Address, _data: Bytes) -> Result<Bytes, CallError> {
        let encoded = DynSolValue::Tuple(vec![
            DynSolValue::Uint(U256::from(1u8), 256),
            DynSolValue::Array(vec![DynSolValue::Bytes(vec![0u8; 32])]),
        ])
        .abi_encode_params();
        Ok(encoded.into())
    }

    async fn chain_id(&self) -> Result<u64, CallError> {
        Ok(CHAIN_ID)
    }
}

#[tokio::test]
async fn test_response_arity_mismatch_is_a_decode_error() {
    let multicall = Multicall::create(ShortResponseProvider, explicit_options())
        .await
        .unwrap();
    let calls = balance_calls(2);

    let result = multicall.aggregate(&calls).await;

    assert!(matches!(
        result,
        Err(MulticallError::Abi(AbiError::Decoding(_)))
    ));
}
