use alloy::primitives::U256;
use eyre::{eyre, Result};
use std::fmt::Write;

/// Decodes a hex string into a vector of bytes. The `0x` prefix and surrounding whitespace are
/// optional.
///
/// ```
/// use hermod_common::utils::strings::decode_hex;
///
/// let result = decode_hex("0x0000000b").expect("should decode hex");
/// assert_eq!(result, vec![0, 0, 0, 11]);
/// ```
pub fn decode_hex(s: &str) -> Result<Vec<u8>> {
    // normalize
    let s = s.trim();
    let s = s.strip_prefix("0x").unwrap_or(s);

    if s.is_empty() {
        return Ok(vec![]);
    }
    if s.len() % 2 != 0 {
        return Err(eyre!("invalid hex string: odd number of digits in '{}'", s));
    }

    (0..s.len())
        .step_by(2)
        .map(|i| s.get(i..i + 2).and_then(|pair| u8::from_str_radix(pair, 16).ok()))
        .collect::<Option<Vec<u8>>>()
        .ok_or_else(|| eyre!("invalid hex string: {}", s))
}

/// Encodes a vector of bytes into a hex string
///
/// ```
/// use hermod_common::utils::strings::encode_hex;
///
/// let bytes = vec![72, 101, 108, 108, 111, 32, 87, 111, 114, 108, 100];
/// let result = encode_hex(&bytes);
/// assert_eq!(result, "48656c6c6f20576f726c64");
/// ```
pub fn encode_hex(s: &[u8]) -> String {
    s.iter().fold(String::with_capacity(s.len() * 2), |mut acc, b| {
        let _ = write!(acc, "{b:02x}");
        acc
    })
}

/// Encodes a U256 into a hex string, removing leading zeros
///
/// ```
/// use hermod_common::utils::strings::encode_hex_reduced;
/// use alloy::primitives::U256;
///
/// assert_eq!(encode_hex_reduced(U256::from(0x0808)), "0x808");
/// assert_eq!(encode_hex_reduced(U256::ZERO), "0");
/// ```
pub fn encode_hex_reduced(s: U256) -> String {
    if s.is_zero() {
        return String::from("0");
    }

    format!("{s:#x}")
}
