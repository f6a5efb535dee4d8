//! Error types for the account abstraction precompile

use alloy::primitives::Address;

/// Faults raised while executing a precompile call.
///
/// Business rejections (bad signature, insufficient deposit, stale nonce) are never errors: they
/// are encoded into the returned validation data so the calling contract can branch on them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The payload is too short, or an argument word is missing, truncated or out of range.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// The selector byte does not name a known method.
    #[error("unknown selector: {0:#04x}")]
    UnknownSelector(u8),

    /// A product or sum does not fit in 256 bits.
    #[error("arithmetic overflow computing {0}")]
    ArithmeticOverflow(&'static str),

    /// The signature set handed to `aggregateSignatures` is empty or incompatible.
    #[error("aggregation error: {0}")]
    AggregationError(String),

    /// A state-mutating method was invoked from a static call.
    #[error("write protection")]
    WriteProtection,

    /// The gas limit supplied by the caller does not cover the method's required gas.
    #[error("out of gas: required {required}, limit {limit}")]
    OutOfGas {
        /// Gas required by the schedule.
        required: u64,
        /// Gas made available by the caller.
        limit: u64,
    },

    /// The execution-layer state contradicts itself (e.g. a queue entry below the queue length
    /// is missing).
    #[error("state inconsistency: {0}")]
    StateInconsistency(String),

    /// No precompile is registered at the called address.
    #[error("no precompile registered at {0}")]
    UnknownPrecompile(Address),
}

impl Error {
    /// Returns true if the fault surfaces to the caller as a plain revert.
    ///
    /// Running out of gas is an exceptional halt instead, which consumes the whole gas limit.
    pub fn is_revert(&self) -> bool {
        !matches!(self, Error::OutOfGas { .. })
    }
}
