//! The table of installed precompiles, built once and handed to the host's call path.

use alloy::primitives::{Address, Bytes};
use hashbrown::HashMap;
use tracing::{debug, trace};

use crate::{
    context::CallContext,
    error::Error,
    precompile::{AccountAbstractionPrecompile, Precompile, PrecompileConfig},
};

/// Result of a successful precompile call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrecompileOutput {
    /// Gas charged for the call.
    pub gas_used: u64,
    /// Returned bytes.
    pub bytes: Bytes,
}

/// Precompiles by address.
#[derive(Debug, Default)]
pub struct PrecompileRegistry {
    precompiles: HashMap<Address, Box<dyn Precompile>>,
}

impl PrecompileRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the account abstraction precompile for `config`.
    pub fn with_account_abstraction(config: PrecompileConfig) -> Self {
        Self::new().with_precompile(AccountAbstractionPrecompile::new(config))
    }

    /// Installs `precompile`, replacing any precompile at the same address.
    pub fn with_precompile(mut self, precompile: impl Precompile + 'static) -> Self {
        self.register(Box::new(precompile));
        self
    }

    /// Installs `precompile`, returning the one it replaced.
    pub fn register(&mut self, precompile: Box<dyn Precompile>) -> Option<Box<dyn Precompile>> {
        let address = precompile.address();
        debug!("registering precompile at {address}");
        self.precompiles.insert(address, precompile)
    }

    /// Returns the precompile at `address`.
    pub fn get(&self, address: &Address) -> Option<&dyn Precompile> {
        self.precompiles.get(address).map(|precompile| precompile.as_ref())
    }

    /// Returns true if a precompile is installed at `address`.
    pub fn contains(&self, address: &Address) -> bool {
        self.precompiles.contains_key(address)
    }

    /// Returns the installed addresses, in no particular order.
    pub fn addresses(&self) -> impl Iterator<Item = &Address> {
        self.precompiles.keys()
    }

    /// Calls the precompile at `address`.
    ///
    /// The required gas is charged up front. A `gas_limit` below it halts with
    /// [`Error::OutOfGas`] without running the precompile.
    pub fn call(
        &self,
        address: Address,
        ctx: &CallContext<'_>,
        input: &[u8],
        gas_limit: u64,
        readonly: bool,
    ) -> Result<PrecompileOutput, Error> {
        let precompile = self.get(&address).ok_or(Error::UnknownPrecompile(address))?;

        let required = precompile.required_gas(input);
        if required > gas_limit {
            return Err(Error::OutOfGas { required, limit: gas_limit });
        }
        trace!("charged {required} gas for call to {address}");

        let bytes = precompile.run(ctx, input, readonly)?;
        Ok(PrecompileOutput { gas_used: required, bytes })
    }
}
