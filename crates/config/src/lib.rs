//! Configuration management for hermod
//!
//! This crate provides functionality for managing the hermod configuration, including loading,
//! saving, updating, and deleting configuration settings, and for turning it into the
//! deployment parameters of the precompile.

/// Error types for the configuration module
pub mod error;

use std::path::PathBuf;

use crate::error::Error;
use alloy::primitives::{Address, Bytes};
use clap::Parser;
use hermod_common::utils::{
    io::file::{delete_path, read_file, write_file},
    strings::{decode_hex, encode_hex},
};
use hermod_precompile::{
    precompile::{DEFAULT_ACCOUNT_FACTORY, DEFAULT_ENTRY_POINT, PRECOMPILE_ADDRESS},
    PrecompileConfig,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

/// Command line arguments for the configuration command
#[derive(Debug, Clone, Parser)]
#[clap(
    about = "Display and edit the current configuration",
    override_usage = "hermod config [OPTIONS]"
)]
pub struct ConfigArgs {
    /// The target key to update.
    #[clap(required = false, default_value = "")]
    key: String,

    /// The value to set the key to.
    #[clap(required = false, default_value = "")]
    value: String,
}

/// The [`Configuration`] struct represents the configuration of the CLI. The precompile's
/// deployment parameters and the chain id of the simulated call context are read from it.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    /// The address the precompile is installed at
    pub precompile_address: String,

    /// The EntryPoint bound into user operation hashes
    pub entry_point: String,

    /// The factory deploying accounts at the addresses `createAccount` derives
    pub account_factory: String,

    /// The account creation code, hex encoded
    pub account_init_code: String,

    /// The chain id of the simulated call context
    pub chain_id: u64,
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration {
            precompile_address: PRECOMPILE_ADDRESS.to_checksum(None),
            entry_point: DEFAULT_ENTRY_POINT.to_checksum(None),
            account_factory: DEFAULT_ACCOUNT_FACTORY.to_checksum(None),
            account_init_code: "0x".to_string(),
            chain_id: 1,
        }
    }
}

#[allow(deprecated)]
fn config_path() -> Result<PathBuf, Error> {
    let mut home = std::env::home_dir().ok_or_else(|| {
        Error::Generic(
            "failed to get home directory. does your os support `std::env::home_dir()`?"
                .to_string(),
        )
    })?;
    home.push(".hermod");
    home.push("config.toml");

    Ok(home)
}

fn path_str(path: &std::path::Path) -> Result<&str, Error> {
    path.to_str().ok_or_else(|| Error::Generic("failed to convert path to string".to_string()))
}

fn parse_address(key: &str, value: &str) -> Result<Address, Error> {
    value
        .trim()
        .parse::<Address>()
        .map_err(|e| Error::ParseError(format!("{key} must be an address, got '{value}': {e}")))
}

fn parse_init_code(value: &str) -> Result<Bytes, Error> {
    decode_hex(value).map(Bytes::from).map_err(|e| {
        Error::ParseError(format!("account_init_code must be hex, got '{value}': {e}"))
    })
}

impl Configuration {
    /// Returns the current configuration, creating the default one if none exists.
    pub fn load() -> Result<Self, Error> {
        let path = config_path()?;

        // if the config file doesn't exist, create it
        if !path.exists() {
            debug!("no configuration at {}, writing defaults", path.display());
            Configuration::default().save()?;
        }

        // read the config file
        let contents = read_file(path_str(&path)?)
            .map_err(|e| Error::Generic(format!("failed to read config file: {e}")))?;

        // parse the config file
        toml::from_str(&contents)
            .map_err(|e| Error::ParseError(format!("failed to parse config file: {e}")))
    }

    /// Saves the current configuration to disk.
    pub fn save(&self) -> Result<(), Error> {
        let path = config_path()?;

        write_file(
            path_str(&path)?,
            &toml::to_string(&self)
                .map_err(|e| Error::ParseError(format!("failed to serialize config: {e}")))?,
        )
        .map_err(|e| Error::Generic(format!("failed to write config file: {e}")))?;

        Ok(())
    }

    /// Deletes the configuration file at `$HOME/.hermod/config.toml`.
    pub fn delete() -> Result<(), Error> {
        let path = config_path()?;

        if !delete_path(path_str(&path)?) {
            return Err(Error::Generic(format!("failed to delete {}", path.display())));
        }

        Ok(())
    }

    /// Update a single key/value pair in the configuration.
    pub fn update(&mut self, key: &str, value: &str) -> Result<(), Error> {
        // update the key in the struct and ensure it's the correct type
        match key {
            "precompile_address" => {
                self.precompile_address = parse_address(key, value)?.to_checksum(None);
            }
            "entry_point" => {
                self.entry_point = parse_address(key, value)?.to_checksum(None);
            }
            "account_factory" => {
                self.account_factory = parse_address(key, value)?.to_checksum(None);
            }
            "account_init_code" => {
                self.account_init_code = format!("0x{}", encode_hex(&parse_init_code(value)?));
            }
            "chain_id" => {
                self.chain_id = value.trim().parse::<u64>().map_err(|e| {
                    Error::ParseError(format!("chain_id must be an integer, got '{value}': {e}"))
                })?;
            }
            _ => {
                return Err(Error::Generic(format!(
                    "invalid key: \'{key}\' is not a valid configuration key."
                )))
            }
        }

        // write the updated config to disk
        self.save()?;

        Ok(())
    }

    /// Returns the precompile deployment parameters described by this configuration.
    pub fn precompile_config(&self) -> Result<PrecompileConfig, Error> {
        PrecompileConfig::try_from(self)
    }
}

impl TryFrom<&Configuration> for PrecompileConfig {
    type Error = Error;

    fn try_from(config: &Configuration) -> Result<Self, Self::Error> {
        Ok(PrecompileConfig {
            address: parse_address("precompile_address", &config.precompile_address)?,
            entry_point: parse_address("entry_point", &config.entry_point)?,
            account_factory: parse_address("account_factory", &config.account_factory)?,
            account_init_code: parse_init_code(&config.account_init_code)?,
        })
    }
}

/// The `config` command is used to display and edit the current configuration.
pub fn config(args: ConfigArgs) -> Result<(), Error> {
    if !args.key.is_empty() {
        if !args.value.is_empty() {
            // read the config file and update the key/value pair
            let mut config = Configuration::load()?;
            config.update(&args.key, &args.value)?;
            info!("updated configuration! Set \'{}\' = \'{}\' .", &args.key, &args.value);
        } else {
            // key is set, but no value is set
            error!("found key but no value to set. Please specify a value to set, use `hermod config --help` for more information.");
        }
    } else {
        // no key is set, print the config file
        println!("{:#?}", Configuration::load()?);
        info!("use `hermod config <KEY> <VALUE>` to set a key/value pair.");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_default_configuration() {
        let config = Configuration::default();
        assert_eq!(config.precompile_address, "0x0000000000000000000000000000000000000808");
        assert_eq!(config.entry_point, "0x5FF137D4b0FDCD49DcA30c7CF57E578a026d2789");
        assert_eq!(config.account_factory, "0x9406Cc6185a346906296840746125a0E44976454");
        assert_eq!(config.account_init_code, "0x");
        assert_eq!(config.chain_id, 1);

        assert_eq!(config.precompile_config().expect("valid config"), PrecompileConfig::default());
    }

    #[test]
    #[serial]
    fn test_load_configuration() {
        // delete config file if it exists
        Configuration::delete().expect("failed to delete config file");
        let config = Configuration::load().expect("failed to load config file");

        assert_eq!(config, Configuration::default());
    }

    #[test]
    #[serial]
    fn test_save_configuration() {
        Configuration::delete().expect("failed to delete config file");
        let mut config = Configuration::default();

        config.update("chain_id", "31337").expect("failed to update chain_id");
        config
            .update("account_init_code", "0x60806040")
            .expect("failed to update account_init_code");
        config.save().expect("failed to save config file");

        let loaded = Configuration::load().expect("failed to load config file");
        assert_eq!(loaded.chain_id, 31337);
        assert_eq!(loaded.account_init_code, "0x60806040");
        assert_eq!(
            loaded.precompile_config().expect("valid config").account_init_code,
            Bytes::from_static(&[0x60, 0x80, 0x60, 0x40])
        );

        Configuration::delete().expect("failed to delete config file");
    }

    #[test]
    #[serial]
    fn test_update_validates_values() {
        Configuration::delete().expect("failed to delete config file");
        let mut config = Configuration::default();

        assert!(matches!(config.update("entry_point", "0x1234"), Err(Error::ParseError(_))));
        assert!(matches!(config.update("chain_id", "mainnet"), Err(Error::ParseError(_))));
        assert!(matches!(config.update("account_init_code", "0xzz"), Err(Error::ParseError(_))));
        assert!(matches!(config.update("rpc_url", "http://localhost"), Err(Error::Generic(_))));
        assert_eq!(config, Configuration::default());

        config
            .update("entry_point", "0x0000000071727de22e5e9d8baf0edac6f37da032")
            .expect("failed to update entry_point");
        assert_eq!(config.entry_point, "0x0000000071727De22E5E9d8BAf0edAc6f37da032");

        Configuration::delete().expect("failed to delete config file");
    }

    #[test]
    #[serial]
    fn test_delete_configuration() {
        Configuration::delete().expect("failed to delete config file");
        let mut config = Configuration::load().expect("failed to load config file");

        config.update("chain_id", "5").expect("failed to update chain_id");

        Configuration::delete().expect("failed to delete config file");
        let config = Configuration::load().expect("failed to load config file");

        assert_eq!(config.chain_id, 1);
    }

    #[test]
    fn test_invalid_file_values_are_rejected() {
        let config =
            Configuration { entry_point: "not an address".to_string(), ..Default::default() };
        assert!(matches!(config.precompile_config(), Err(Error::ParseError(_))));
    }
}
