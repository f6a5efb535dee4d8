/// Hexadecimal formatting for EVM types.
pub mod hex;

/// Input/output utilities for file manipulation.
pub mod io;

/// String manipulation and hex encoding utilities.
pub mod strings;
