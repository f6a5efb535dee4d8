//! The dispatcher: selector routing for the account abstraction precompile.

use std::fmt::Debug;

use alloy::primitives::{address, Address, Bytes};
use tracing::debug;

use crate::{
    account, codec::split_payload, context::CallContext, economics, error::Error, gas, gas::Method,
    queue, validation,
};

/// Reserved address of the account abstraction precompile.
pub const PRECOMPILE_ADDRESS: Address = address!("0000000000000000000000000000000000000808");

/// The EntryPoint v0.6 deployment user operation hashes are bound to by default.
pub const DEFAULT_ENTRY_POINT: Address = address!("5FF137D4b0FDCD49DcA30c7CF57E578a026d2789");

/// The account factory `createAccount` derives addresses for by default.
pub const DEFAULT_ACCOUNT_FACTORY: Address = address!("9406Cc6185a346906296840746125a0E44976454");

/// A native contract invoked through the regular call convention.
pub trait Precompile: Debug + Send + Sync {
    /// Address the precompile is installed at.
    fn address(&self) -> Address;

    /// Gas charged before [`Precompile::run`]. Never fails.
    fn required_gas(&self, input: &[u8]) -> u64;

    /// Executes `input`. On error no output is produced.
    fn run(&self, ctx: &CallContext<'_>, input: &[u8], readonly: bool) -> Result<Bytes, Error>;
}

/// Deployment parameters of the account abstraction precompile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrecompileConfig {
    /// Address the precompile is installed at.
    pub address: Address,
    /// EntryPoint bound into every user operation hash.
    pub entry_point: Address,
    /// Factory deploying accounts at the addresses `createAccount` derives.
    pub account_factory: Address,
    /// Account creation code, to which the owner word is appended.
    pub account_init_code: Bytes,
}

impl Default for PrecompileConfig {
    fn default() -> Self {
        Self {
            address: PRECOMPILE_ADDRESS,
            entry_point: DEFAULT_ENTRY_POINT,
            account_factory: DEFAULT_ACCOUNT_FACTORY,
            account_init_code: Bytes::new(),
        }
    }
}

/// EIP-4337 operations served natively at [`PrecompileConfig::address`].
#[derive(Debug, Clone, Default)]
pub struct AccountAbstractionPrecompile {
    config: PrecompileConfig,
}

impl AccountAbstractionPrecompile {
    /// Creates the precompile with the given deployment parameters.
    pub fn new(config: PrecompileConfig) -> Self {
        Self { config }
    }

    /// Returns the deployment parameters.
    pub fn config(&self) -> &PrecompileConfig {
        &self.config
    }

    fn dispatch(&self, ctx: &CallContext<'_>, method: Method, data: &[u8]) -> Result<Bytes, Error> {
        let config = &self.config;

        match method {
            Method::ValidateUserOp => validation::validate_user_op(config, ctx, data),
            Method::GetUserOpHash => validation::get_user_op_hash(config, ctx, data),
            Method::CreateAccount => account::create_account(config, data),
            Method::GetAccountNonce => account::get_account_nonce(ctx, data),
            Method::ValidatePaymaster => validation::validate_paymaster(config, ctx, data),
            Method::CalculatePrefund => validation::calculate_prefund(data),
            Method::AggregateSignatures => account::aggregate_signatures(data),
            Method::SimulateValidation => validation::simulate_validation(config, ctx, data),
            Method::BatchValidate => validation::batch_validate(config, ctx, data),
            Method::CalculateRewards => economics::calculate_rewards(data),
            Method::ProcessQueue => queue::process_queue(ctx, data),
        }
    }
}

impl Precompile for AccountAbstractionPrecompile {
    fn address(&self) -> Address {
        self.config.address
    }

    fn required_gas(&self, input: &[u8]) -> u64 {
        gas::required_gas(input)
    }

    fn run(&self, ctx: &CallContext<'_>, input: &[u8], readonly: bool) -> Result<Bytes, Error> {
        let (selector, data) = split_payload(input)?;
        let method = Method::from_selector(selector).ok_or(Error::UnknownSelector(selector))?;

        debug!(
            "dispatching {method} ({} bytes of arguments, readonly: {readonly}) from {}",
            data.len(),
            ctx.caller
        );

        if readonly && method.mutates_state() {
            return Err(Error::WriteProtection);
        }

        self.dispatch(ctx, method, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{codec::Writer, state::InMemoryState};
    use alloy::primitives::U256;

    fn run(input: &[u8], readonly: bool) -> Result<Bytes, Error> {
        let state = InMemoryState::new();
        let ctx = CallContext::new(&state, 1);
        AccountAbstractionPrecompile::default().run(&ctx, input, readonly)
    }

    fn payload(selector: u8, data: &[u8]) -> Vec<u8> {
        let mut payload = vec![0, 0, 0, selector];
        payload.extend_from_slice(data);
        payload
    }

    #[test]
    fn test_short_payload_reverts() {
        for readonly in [false, true] {
            for len in 0..4 {
                assert!(matches!(run(&vec![0x0a; len], readonly), Err(Error::MalformedInput(_))));
            }
        }
    }

    #[test]
    fn test_unknown_selector_reverts() {
        assert_eq!(run(&payload(0x00, &[]), false), Err(Error::UnknownSelector(0x00)));
        assert_eq!(run(&payload(0x0c, &[0u8; 96]), false), Err(Error::UnknownSelector(0x0c)));
        assert_eq!(run(&payload(0xff, &[]), true), Err(Error::UnknownSelector(0xff)));
    }

    #[test]
    fn test_dispatches_by_selector() {
        let data = Writer::default()
            .uint(U256::from(100_000))
            .uint(U256::from(1_000_000_000))
            .uint(U256::from(10))
            .finish();

        let out = run(&payload(gas::CALCULATE_REWARDS, &data), false).expect("runs");
        assert_eq!(U256::from_be_slice(&out), U256::from(10_000_000_000_000u64));

        // every method is a view, so static calls are served as well
        let out = run(&payload(gas::CALCULATE_REWARDS, &data), true).expect("runs");
        assert_eq!(U256::from_be_slice(&out), U256::from(10_000_000_000_000u64));
    }

    #[test]
    fn test_required_gas_follows_schedule() {
        let precompile = AccountAbstractionPrecompile::default();
        assert_eq!(precompile.required_gas(&payload(gas::CREATE_ACCOUNT, &[])), 100_000);
        assert_eq!(precompile.required_gas(&[0x03]), gas::DEFAULT_GAS);
        assert_eq!(precompile.address(), PRECOMPILE_ADDRESS);
    }
}
