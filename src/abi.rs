//! ABI codec for read-only function calls
//!
//! Encodes a function name plus typed parameters into a 4-byte selector
//! followed by ABI-packed argument bytes, and decodes packed return bytes
//! back into typed values. The canonical signature string is derived
//! recursively from the declared [`TypeSpec`] list; word-level packing and
//! unpacking are delegated to [`alloy::dyn_abi`].

use alloy::{
    dyn_abi::{DynSolType, DynSolValue},
    primitives::{keccak256, Bytes},
};

use crate::{errors::AbiError, types::TypeSpec};

/// Canonical function signature string: `name(type1,type2,...)`
///
/// Tuples render as parenthesized comma-joined component signatures and
/// arrays as `<base>[]`, recursively. This string is hashed to derive the
/// selector, so it must match the on-chain ABI convention byte for byte.
pub fn function_signature(name: &str, inputs: &[TypeSpec]) -> String {
    let args = inputs
        .iter()
        .map(TypeSpec::signature)
        .collect::<Vec<_>>()
        .join(",");
    format!("{name}({args})")
}

/// First 4 bytes of the keccak-256 hash of the canonical signature
pub fn selector(name: &str, inputs: &[TypeSpec]) -> [u8; 4] {
    let digest = keccak256(function_signature(name, inputs).as_bytes());
    [digest[0], digest[1], digest[2], digest[3]]
}

/// Validate parameter arity and per-value shape against declared types
pub fn validate_params(types: &[TypeSpec], values: &[DynSolValue]) -> Result<(), AbiError> {
    if types.len() != values.len() {
        return Err(AbiError::Encoding(format!(
            "expected {} parameters, got {}",
            types.len(),
            values.len()
        )));
    }
    for (index, (spec, value)) in types.iter().zip(values.iter()).enumerate() {
        if !spec.matches(value) {
            return Err(AbiError::Encoding(format!(
                "parameter {index} does not match declared type {}",
                spec.signature()
            )));
        }
    }
    Ok(())
}

/// ABI-pack a validated parameter list
pub fn encode_params(types: &[TypeSpec], values: &[DynSolValue]) -> Result<Vec<u8>, AbiError> {
    validate_params(types, values)?;
    Ok(DynSolValue::Tuple(values.to_vec()).abi_encode_params())
}

/// Encode a full call: selector followed by ABI-packed parameters
pub fn encode_call(
    name: &str,
    inputs: &[TypeSpec],
    params: &[DynSolValue],
) -> Result<Bytes, AbiError> {
    let packed = encode_params(inputs, params)?;
    let mut data = Vec::with_capacity(4 + packed.len());
    data.extend_from_slice(&selector(name, inputs));
    data.extend_from_slice(&packed);
    Ok(data.into())
}

/// Decode packed return bytes against a declared output type list
///
/// # Errors
/// `AbiError::Decoding` on truncated or malformed input; partial reads are
/// never silently tolerated.
pub fn decode_returns(types: &[TypeSpec], data: &[u8]) -> Result<Vec<DynSolValue>, AbiError> {
    let schema = DynSolType::Tuple(types.iter().map(TypeSpec::sol_type).collect());
    let decoded = schema
        .abi_decode_params(data)
        .map_err(|e| AbiError::Decoding(e.to_string()))?;
    let values = match decoded {
        DynSolValue::Tuple(values) => values,
        single => vec![single],
    };
    if values.len() != types.len() {
        return Err(AbiError::Decoding(format!(
            "expected {} return values, decoded {}",
            types.len(),
            values.len()
        )));
    }
    Ok(values)
}
