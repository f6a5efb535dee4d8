use alloy::primitives::Address;
use clap::Parser;
use derive_builder::Builder;
use eyre::{eyre, Result};
use hermod_common::utils::{io::file::read_file, strings::decode_hex};
use hermod_precompile::{
    context::CallContext,
    gas::{required_gas, Method},
    state::{InMemoryState, StateFixture},
    PrecompileOutput, PrecompileRegistry,
};
use tracing::{debug, info};

#[derive(Debug, Clone, Parser, Builder)]
#[clap(
    about = "Runs a payload through the account abstraction precompile",
    override_usage = "hermod call <PAYLOAD> [OPTIONS]"
)]
/// Arguments for the call operation
///
/// The payload is run against an in-memory state, optionally loaded from a JSON fixture, under
/// the chain id taken from the configuration unless overridden.
pub struct CallArgs {
    /// The hex encoded payload: three padding bytes, the selector byte, then the arguments.
    #[clap(required = true)]
    pub payload: String,

    /// Path to a JSON state fixture describing accounts, deposits, signers and the queue.
    #[clap(long, short, default_value = None, hide_default_value = true)]
    pub state: Option<String>,

    /// The gas made available to the call.
    #[clap(long, short, default_value_t = 1_000_000)]
    pub gas_limit: u64,

    /// Run the call as a static call.
    #[clap(long)]
    pub readonly: bool,

    /// The block timestamp of the call context.
    #[clap(long, short, default_value_t = 0)]
    pub timestamp: u64,

    /// Overrides the configured chain id.
    #[clap(long, default_value = None, hide_default_value = true)]
    pub chain_id: Option<u64>,
}

impl CallArgsBuilder {
    /// Creates a new CallArgsBuilder with default values
    pub fn new() -> Self {
        Self {
            payload: Some(String::new()),
            state: Some(None),
            gas_limit: Some(1_000_000),
            readonly: Some(false),
            timestamp: Some(0),
            chain_id: Some(None),
        }
    }
}

#[derive(Debug, Clone, Parser)]
#[clap(
    about = "Prints the gas a payload is charged",
    override_usage = "hermod gas <PAYLOAD>"
)]
/// Arguments for the gas operation
pub struct GasArgs {
    /// The hex encoded payload.
    #[clap(required = true)]
    pub payload: String,
}

/// Decodes the payload argument.
fn parse_payload(payload: &str) -> Result<Vec<u8>> {
    decode_hex(payload).map_err(|e| eyre!("invalid payload: {}", e))
}

/// Loads the state fixture at `path`, or an empty state when no fixture was given.
pub fn load_state(path: Option<&str>) -> Result<InMemoryState> {
    let Some(path) = path else {
        return Ok(InMemoryState::new());
    };

    let contents = read_file(path).map_err(|e| eyre!("failed to read state fixture: {}", e))?;
    let fixture: StateFixture = serde_json::from_str(&contents)
        .map_err(|e| eyre!("failed to parse state fixture {}: {}", path, e))?;
    debug!(
        "loaded {} accounts and {} queued operations from {}",
        fixture.accounts.len(),
        fixture.queue.len(),
        path
    );

    Ok(InMemoryState::from(fixture))
}

/// Runs `args.payload` through `registry` and returns the output together with the method
/// that was called, if the selector names one.
pub fn call(
    args: &CallArgs,
    registry: &PrecompileRegistry,
    precompile_address: Address,
    chain_id: u64,
) -> Result<(Option<Method>, PrecompileOutput)> {
    let input = parse_payload(&args.payload)?;
    let state = load_state(args.state.as_deref())?;

    let chain_id = args.chain_id.unwrap_or(chain_id);
    let ctx = CallContext::new(&state, chain_id).with_timestamp(args.timestamp);
    let method = input.get(3).and_then(|selector| Method::from_selector(*selector));

    info!(
        "calling {} at {} on chain {}",
        method.map(|m| m.name()).unwrap_or("<unknown>"),
        precompile_address,
        chain_id
    );
    let output =
        registry.call(precompile_address, &ctx, &input, args.gas_limit, args.readonly)?;

    Ok((method, output))
}

/// Returns the gas `args.payload` is charged.
pub fn gas(args: &GasArgs) -> Result<u64> {
    Ok(required_gas(&parse_payload(&args.payload)?))
}
