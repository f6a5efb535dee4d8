//! Common utilities used across the hermod crates.
//!
//! This crate provides hex encoding and decoding for EVM types and small file system helpers
//! shared by the configuration and CLI crates.

/// General utility functions and types for common tasks.
pub mod utils;
