//! Error types for multicall aggregation and read-only contract calls
//!
//! This module defines a comprehensive error handling system that covers:
//! - Method lookup and aggregator resolution errors
//! - ABI encoding and decoding errors
//! - Remote call failures with permanent/transient classification
//! - Error conversion and propagation

use thiserror::Error;

/// Top-level error type for the multicall system
///
/// Encompasses all possible errors that can occur while building, batching,
/// and dispatching read-only contract calls, providing a unified error
/// handling interface for users.
#[derive(Debug, Error)]
pub enum MulticallError {
    /// Requested function is absent from the contract's read-only method table
    #[error("Unknown method: {0} is not a read-only function of this contract")]
    UnknownMethod(String),

    /// No aggregator contract address resolvable for the active network
    #[error("No multicall aggregator registered for chain {0}")]
    UnknownAggregator(u64),

    /// `exec()` was invoked on a chain with zero queued calls
    #[error("Call chain is empty: queue at least one call before exec()")]
    EmptyCallChain,

    /// Invalid or malformed RPC URL
    #[error("Invalid RPC URL: {0}")]
    InvalidRpcUrl(String),

    /// Errors occurring while encoding or decoding ABI data
    #[error("ABI error: {0}")]
    Abi(#[from] AbiError),

    /// Errors surfaced by the remote call transport
    #[error("Call error: {0}")]
    Call(#[from] CallError),
}

/// ABI codec errors
///
/// These errors occur when a parameter's runtime shape does not match its
/// declared type, or when packed return bytes are truncated or malformed.
/// They are never retried: a malformed encoding will not self-correct.
#[derive(Debug, Error)]
pub enum AbiError {
    /// Parameter shape mismatch against the declared type list
    #[error("Encoding failed: {0}")]
    Encoding(String),

    /// Truncated or malformed return data
    #[error("Decoding failed: {0}")]
    Decoding(String),
}

/// Remote call errors, classified for the retry policy
///
/// The transport layer surfaces a structured distinction between permanent
/// failures (execution reverted, target method missing on-chain) and
/// transient ones (transport hiccups, rate limiting). Permanent failures are
/// re-raised immediately and unmodified; transient ones are retried.
#[derive(Debug, Clone, Error)]
pub enum CallError {
    /// Execution reverted on-chain; permanent
    #[error("Execution reverted: {0}")]
    Reverted(String),

    /// Target contract does not implement the called function; permanent
    #[error("Method not found on target contract: {0}")]
    MissingMethod(String),

    /// Transport-level failure (connection, timeout); transient
    #[error("Transport failure: {0}")]
    Transport(String),

    /// Structured RPC error response not classified as permanent; transient
    #[error("RPC error: {0}")]
    Rpc(String),
}

impl CallError {
    /// Whether this failure will never succeed on retry
    pub fn is_permanent(&self) -> bool {
        matches!(self, CallError::Reverted(_) | CallError::MissingMethod(_))
    }

    /// Classify an unstructured provider error message
    ///
    /// Fallback adapter for providers that do not structure their errors:
    /// the lower-cased message is sniffed for substrings indicating a revert
    /// or a missing on-chain method, and everything else is treated as
    /// transient.
    ///
    /// Maintenance hazard: classification correctness depends entirely on
    /// the completeness of these substrings. Prefer transports that surface
    /// a typed revert/transport distinction; this adapter exists only for
    /// the boundary with those that do not.
    pub fn from_rpc_message(message: &str) -> Self {
        let lowered = message.to_lowercase();
        if lowered.contains("revert") {
            CallError::Reverted(message.to_string())
        } else if lowered.contains("method not found")
            || lowered.contains("method does not exist")
            || lowered.contains("function selector")
            || lowered.contains("method not supported")
        {
            CallError::MissingMethod(message.to_string())
        } else {
            CallError::Rpc(message.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_rpc_messages() {
        let cases = [
            ("execution reverted: Insufficient balance", true),
            ("Internal JSON-RPC error: revert exception", true),
            ("CALL_EXCEPTION: transaction Reverted without reason", true),
            ("the method eth_foo method not found", true),
            ("function selector was not recognized", true),
            ("connection reset by peer", false),
            ("429 Too Many Requests", false),
            ("request timed out", false),
        ];

        for (message, permanent) in cases {
            let err = CallError::from_rpc_message(message);
            assert_eq!(
                err.is_permanent(),
                permanent,
                "misclassified message: {message}"
            );
        }
    }

    #[test]
    fn test_structured_classification() {
        assert!(CallError::Reverted("out of range".into()).is_permanent());
        assert!(CallError::MissingMethod("0x70a08231".into()).is_permanent());
        assert!(!CallError::Transport("broken pipe".into()).is_permanent());
        assert!(!CallError::Rpc("rate limited".into()).is_permanent());
    }

    #[test]
    fn test_abi_error_lifts_into_multicall_error() {
        let err: MulticallError = AbiError::Decoding("truncated".into()).into();
        assert!(matches!(err, MulticallError::Abi(AbiError::Decoding(_))));
    }
}
