//! Core types for read-only contract call batching
//!
//! This module defines the core data structures used throughout the crate:
//! - Recursive ABI type descriptors ([`TypeSpec`])
//! - The immutable unit of batching ([`CallDescriptor`])
//!
//! Both are immutable value objects: they are cheap to clone, carry no
//! mutable state, and are safe to share across tasks.

use alloy::dyn_abi::{DynSolType, DynSolValue};
pub use alloy::primitives::{Address, Bytes, U256};
use serde::Serialize;

use crate::{abi, errors::AbiError};

/// Declared shape of a function parameter or return value
///
/// A `TypeSpec` is either a primitive or a tuple/array of nested specs, and
/// is used identically for encoding inputs and decoding outputs. Its
/// canonical signature rendering determines the 4-byte function selector,
/// so the recursive grammar here must match the ABI convention exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TypeSpec {
    /// 20-byte account or contract address
    Address,
    /// Boolean flag
    Bool,
    /// UTF-8 string, dynamically sized
    String,
    /// Byte blob, dynamically sized
    Bytes,
    /// Fixed-size byte array (`bytes1` ..= `bytes32`)
    FixedBytes(usize),
    /// Unsigned integer with explicit bit width (`uint8` ..= `uint256`)
    Uint(usize),
    /// Signed integer with explicit bit width (`int8` ..= `int256`)
    Int(usize),
    /// Ordered heterogeneous components
    Tuple(Vec<TypeSpec>),
    /// Dynamically sized homogeneous sequence
    Array(Box<TypeSpec>),
}

impl TypeSpec {
    /// Canonical signature fragment for this type
    ///
    /// Pure and recursive: a tuple renders as the parenthesized comma-joined
    /// signatures of its components, and an array as the base signature
    /// suffixed with `[]`.
    pub fn signature(&self) -> String {
        match self {
            TypeSpec::Address => "address".to_string(),
            TypeSpec::Bool => "bool".to_string(),
            TypeSpec::String => "string".to_string(),
            TypeSpec::Bytes => "bytes".to_string(),
            TypeSpec::FixedBytes(size) => format!("bytes{size}"),
            TypeSpec::Uint(bits) => format!("uint{bits}"),
            TypeSpec::Int(bits) => format!("int{bits}"),
            TypeSpec::Tuple(components) => {
                let inner = components
                    .iter()
                    .map(TypeSpec::signature)
                    .collect::<Vec<_>>()
                    .join(",");
                format!("({inner})")
            }
            TypeSpec::Array(base) => format!("{}[]", base.signature()),
        }
    }

    /// Convert into the dynamic ABI type used for packing and unpacking
    pub fn sol_type(&self) -> DynSolType {
        match self {
            TypeSpec::Address => DynSolType::Address,
            TypeSpec::Bool => DynSolType::Bool,
            TypeSpec::String => DynSolType::String,
            TypeSpec::Bytes => DynSolType::Bytes,
            TypeSpec::FixedBytes(size) => DynSolType::FixedBytes(*size),
            TypeSpec::Uint(bits) => DynSolType::Uint(*bits),
            TypeSpec::Int(bits) => DynSolType::Int(*bits),
            TypeSpec::Tuple(components) => {
                DynSolType::Tuple(components.iter().map(TypeSpec::sol_type).collect())
            }
            TypeSpec::Array(base) => DynSolType::Array(Box::new(base.sol_type())),
        }
    }

    /// Check whether a runtime value has this declared shape
    pub fn matches(&self, value: &DynSolValue) -> bool {
        self.sol_type().matches(value)
    }
}

/// One read-only contract call, the unit of batching
///
/// Captures the target contract address, function name, declared input and
/// output types, and the parameter values. Descriptors are validated at
/// construction (arity and per-parameter shape) so that encoding cannot fail
/// later for shape reasons.
#[derive(Debug, Clone)]
pub struct CallDescriptor {
    target: Address,
    function: String,
    inputs: Vec<TypeSpec>,
    outputs: Vec<TypeSpec>,
    params: Vec<DynSolValue>,
}

impl CallDescriptor {
    /// Build a descriptor, validating parameter arity and shape
    ///
    /// # Errors
    /// `AbiError::Encoding` when `params.len() != inputs.len()` or a value
    /// does not match its declared type.
    pub fn new(
        target: Address,
        function: impl Into<String>,
        inputs: Vec<TypeSpec>,
        outputs: Vec<TypeSpec>,
        params: Vec<DynSolValue>,
    ) -> Result<Self, AbiError> {
        abi::validate_params(&inputs, &params)?;
        Ok(Self {
            target,
            function: function.into(),
            inputs,
            outputs,
            params,
        })
    }

    /// Target contract address
    pub fn target(&self) -> Address {
        self.target
    }

    /// Function name
    pub fn function(&self) -> &str {
        &self.function
    }

    /// Declared input types
    pub fn inputs(&self) -> &[TypeSpec] {
        &self.inputs
    }

    /// Declared output types
    pub fn outputs(&self) -> &[TypeSpec] {
        &self.outputs
    }

    /// Parameter values
    pub fn params(&self) -> &[DynSolValue] {
        &self.params
    }

    /// 4-byte selector of the canonical function signature
    pub fn selector(&self) -> [u8; 4] {
        abi::selector(&self.function, &self.inputs)
    }

    /// Full call data: selector followed by ABI-packed parameters
    pub fn call_data(&self) -> Result<Bytes, AbiError> {
        abi::encode_call(&self.function, &self.inputs, &self.params)
    }

    /// Decode raw return bytes against the declared output types
    ///
    /// A descriptor with exactly one declared output yields the bare value;
    /// zero or several outputs yield a tuple of that arity. The flattening is
    /// applied uniformly so typed callers never special-case arity.
    pub fn decode_returns(&self, data: &[u8]) -> Result<DynSolValue, AbiError> {
        let mut values = abi::decode_returns(&self.outputs, data)?;
        match values.len() {
            1 => Ok(values.remove(0)),
            _ => Ok(DynSolValue::Tuple(values)),
        }
    }
}
