//! Contract handles and the chainable call builder
//!
//! A [`ContractHandle`] indexes the read-only (`pure`/`view`) functions of a
//! declared contract interface once, at construction. Descriptors built from
//! it are guaranteed to reference an existing read-only method, so an unknown
//! name is rejected before any network traffic.
//!
//! The [`CallChain`] builder accumulates descriptors against one handle and
//! dispatches them together through a [`Multicall`](crate::Multicall). Each
//! `.call(...)` consumes the chain and returns a new value, and a chain can
//! be `Clone`d to fork it, so chains built from the same base never
//! interfere.

use std::collections::HashMap;

use alloy::{dyn_abi::DynSolValue, primitives::Address};

use crate::{
    errors::MulticallError,
    multicall::Multicall,
    provider::ReadProvider,
    types::{CallDescriptor, TypeSpec},
};

/// Mutability of a declared contract function
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateMutability {
    /// Reads no state
    Pure,
    /// Reads but never mutates state
    View,
    /// Mutates state, rejects attached value
    NonPayable,
    /// Mutates state, accepts attached value
    Payable,
}

impl StateMutability {
    /// Whether a function with this mutability is safe to `eth_call`
    pub fn is_read_only(&self) -> bool {
        matches!(self, StateMutability::Pure | StateMutability::View)
    }
}

/// One function of a declared contract interface
#[derive(Debug, Clone)]
pub struct Function {
    /// Function name as it appears in the canonical signature
    pub name: String,
    /// Declared input types, in order
    pub inputs: Vec<TypeSpec>,
    /// Declared output types, in order
    pub outputs: Vec<TypeSpec>,
    /// Declared mutability
    pub mutability: StateMutability,
}

impl Function {
    pub fn new(
        name: impl Into<String>,
        inputs: Vec<TypeSpec>,
        outputs: Vec<TypeSpec>,
        mutability: StateMutability,
    ) -> Self {
        Self {
            name: name.into(),
            inputs,
            outputs,
            mutability,
        }
    }

    /// Shorthand for a `view` function
    pub fn view(name: impl Into<String>, inputs: Vec<TypeSpec>, outputs: Vec<TypeSpec>) -> Self {
        Self::new(name, inputs, outputs, StateMutability::View)
    }

    /// Shorthand for a `pure` function
    pub fn pure(name: impl Into<String>, inputs: Vec<TypeSpec>, outputs: Vec<TypeSpec>) -> Self {
        Self::new(name, inputs, outputs, StateMutability::Pure)
    }
}

#[derive(Debug, Clone)]
struct MethodEntry {
    inputs: Vec<TypeSpec>,
    outputs: Vec<TypeSpec>,
}

/// Handle over one deployed contract's read-only interface
///
/// The method table is built once from the declared interface and cannot be
/// extended afterwards; functions that are not `pure` or `view` are dropped
/// during indexing.
#[derive(Debug, Clone)]
pub struct ContractHandle {
    address: Address,
    methods: HashMap<String, MethodEntry>,
}

impl ContractHandle {
    /// Index the read-only functions of `interface` for `address`
    pub fn new(address: Address, interface: impl IntoIterator<Item = Function>) -> Self {
        let methods = interface
            .into_iter()
            .filter(|function| function.mutability.is_read_only())
            .map(|function| {
                (
                    function.name,
                    MethodEntry {
                        inputs: function.inputs,
                        outputs: function.outputs,
                    },
                )
            })
            .collect();
        Self { address, methods }
    }

    /// Contract address this handle targets
    pub fn address(&self) -> Address {
        self.address
    }

    /// Build a descriptor for one read-only call
    ///
    /// # Errors
    /// `MulticallError::UnknownMethod` when `name` is absent from the indexed
    /// table (including functions declared but not read-only). No network
    /// call is issued.
    pub fn call(
        &self,
        name: &str,
        params: Vec<DynSolValue>,
    ) -> Result<CallDescriptor, MulticallError> {
        let entry = self
            .methods
            .get(name)
            .ok_or_else(|| MulticallError::UnknownMethod(name.to_string()))?;
        let descriptor = CallDescriptor::new(
            self.address,
            name,
            entry.inputs.clone(),
            entry.outputs.clone(),
            params,
        )?;
        Ok(descriptor)
    }

    /// Start an empty call chain against this contract
    pub fn chain(&self) -> CallChain<'_> {
        CallChain {
            contract: self,
            calls: Vec::new(),
        }
    }
}

/// Persistent builder accumulating calls against one contract
///
/// `.call(a)?.call(b)?.exec(&multicall)` queues descriptors and dispatches
/// them together, returning decoded results in queue order.
#[derive(Debug, Clone)]
pub struct CallChain<'a> {
    contract: &'a ContractHandle,
    calls: Vec<CallDescriptor>,
}

impl<'a> CallChain<'a> {
    /// Queue one more call, returning the extended chain
    pub fn call(mut self, name: &str, params: Vec<DynSolValue>) -> Result<Self, MulticallError> {
        let descriptor = self.contract.call(name, params)?;
        self.calls.push(descriptor);
        Ok(self)
    }

    /// Number of queued calls
    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    /// Queued descriptors, in order
    pub fn calls(&self) -> &[CallDescriptor] {
        &self.calls
    }

    /// Dispatch the queued calls through the aggregator
    ///
    /// # Errors
    /// `MulticallError::EmptyCallChain` when nothing was queued.
    pub async fn exec<P: ReadProvider>(
        self,
        multicall: &Multicall<P>,
    ) -> Result<Vec<DynSolValue>, MulticallError> {
        if self.calls.is_empty() {
            return Err(MulticallError::EmptyCallChain);
        }
        multicall.aggregate(&self.calls).await
    }
}
