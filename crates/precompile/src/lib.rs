//! Native EIP-4337 account abstraction precompile.
//!
//! This crate implements a fixed-address precompile that serves eleven selector-dispatched
//! operations to contracts running on an EVM execution runtime: user operation and paymaster
//! validation, counterfactual account addresses, keyed nonce lookups, signature aggregation,
//! executor rewards and advisory queue draining. Every operation is a view over execution-layer
//! state; state changes are left to the calling contract.
//!
//! ```
//! use hermod_precompile::{
//!     context::CallContext, precompile::PRECOMPILE_ADDRESS, registry::PrecompileRegistry,
//!     state::InMemoryState, PrecompileConfig,
//! };
//!
//! let registry = PrecompileRegistry::with_account_abstraction(PrecompileConfig::default());
//! let state = InMemoryState::new();
//! let ctx = CallContext::new(&state, 1);
//!
//! // processQueue(0) against an empty queue
//! let mut payload = vec![0x00, 0x00, 0x00, 0x0b];
//! payload.extend_from_slice(&[0u8; 32]);
//!
//! let output = registry.call(PRECOMPILE_ADDRESS, &ctx, &payload, 60_000, true).unwrap();
//! assert_eq!(output.gas_used, 60_000);
//! assert_eq!(output.bytes.len(), 96);
//! ```

pub mod error;

/// Account registry accessor: `createAccount`, `getAccountNonce`, `aggregateSignatures`
pub mod account;

/// Word codec for arguments and results
pub mod codec;

/// Execution context passed in by the host
pub mod context;

/// Economic engine: `calculateRewards`
pub mod economics;

/// Static gas schedule and the closed method set
pub mod gas;

/// The dispatcher and its deployment parameters
pub mod precompile;

/// Queue processor: `processQueue`
pub mod queue;

/// Address-keyed table of installed precompiles
pub mod registry;

/// Read-only state access
pub mod state;

/// The `UserOperation` type and its hashes
pub mod user_operation;

/// Validation engine: `validateUserOp`, `getUserOpHash`, `validatePaymaster`,
/// `calculatePrefund`, `simulateValidation`, `batchValidate`
pub mod validation;

/// Packed validation data
pub mod validation_data;

#[cfg(test)]
pub(crate) mod test_utils;

// re-export the public interface
pub use error::Error;
pub use precompile::{AccountAbstractionPrecompile, Precompile, PrecompileConfig};
pub use registry::{PrecompileOutput, PrecompileRegistry};
pub use user_operation::UserOperation;
