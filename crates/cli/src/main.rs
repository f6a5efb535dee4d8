pub(crate) mod call;
pub(crate) mod error;
pub(crate) mod log_args;
pub(crate) mod output;

use call::{CallArgs, GasArgs};
use error::Error;
use log_args::LogArgs;
use output::print_output;
use tracing::debug;

use clap::{Parser, Subcommand};

use hermod_config::{config, ConfigArgs, Configuration};
use hermod_precompile::PrecompileRegistry;

#[derive(Debug, Parser)]
#[clap(name = "hermod", version)]
pub struct Arguments {
    #[clap(subcommand)]
    pub sub: Subcommands,

    #[clap(flatten)]
    logs: LogArgs,
}

#[derive(Debug, Subcommand)]
#[clap(about = "Hermod runs the native EIP-4337 account abstraction precompile outside of a node.")]
pub enum Subcommands {
    #[clap(name = "call", about = "Run a payload through the account abstraction precompile")]
    Call(CallArgs),

    #[clap(name = "gas", about = "Print the gas a payload is charged")]
    Gas(GasArgs),

    #[clap(name = "config", about = "Display and edit the current configuration")]
    Config(ConfigArgs),
}

fn main() -> Result<(), Error> {
    let args = Arguments::parse();

    // setup logging
    let _guard = args
        .logs
        .init_tracing()
        .map_err(|e| Error::Generic(format!("failed to initialize logging: {}", e)))?;

    let configuration = Configuration::load()
        .map_err(|e| Error::Generic(format!("failed to load configuration: {}", e)))?;
    match args.sub {
        Subcommands::Call(cmd) => {
            let precompile_config = configuration
                .precompile_config()
                .map_err(|e| Error::Generic(format!("invalid configuration: {}", e)))?;
            let address = precompile_config.address;
            let registry = PrecompileRegistry::with_account_abstraction(precompile_config);

            let (method, output) = call::call(&cmd, &registry, address, configuration.chain_id)
                .map_err(|e| Error::Generic(format!("call failed: {}", e)))?;

            debug!("raw output: {:?}", output);

            print_output(method, &output);
        }

        Subcommands::Gas(cmd) => {
            let gas = call::gas(&cmd)
                .map_err(|e| Error::Generic(format!("failed to compute gas: {}", e)))?;
            println!("{gas}");
        }

        Subcommands::Config(cmd) => {
            config(cmd).map_err(|e| Error::Generic(format!("failed to configure: {}", e)))?;
        }
    }

    Ok(())
}
