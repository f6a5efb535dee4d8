//! Fixed-width, big-endian word codec shared by every method.
//!
//! Scalar arguments are read word by word with [`Reader`]; operations that carry a
//! [`UserOperation`] are ABI-encoded parameter lists and go through the `decode_*` helpers.
//! Results are always built with [`Writer`], one 32-byte word at a time.

use alloy::{
    primitives::{aliases::U192, Address, Bytes, B256, U256},
    sol_types::SolValue,
};

use crate::{error::Error, user_operation::UserOperation};

/// Size of an ABI word.
pub const WORD: usize = 32;

/// Size of the payload prefix. The selector lives in its last byte.
pub const SELECTOR_LEN: usize = 4;

/// Largest value representable in 48 bits, the width of EIP-4337 timestamps.
const MAX_U48: u64 = (1 << 48) - 1;

/// Splits a call payload into its selector byte and argument data.
///
/// ```
/// use hermod_precompile::codec::split_payload;
///
/// let (selector, data) = split_payload(&[0x00, 0x00, 0x00, 0x0a, 0xff]).expect("valid payload");
/// assert_eq!(selector, 0x0a);
/// assert_eq!(data, &[0xff]);
///
/// assert!(split_payload(&[0x00, 0x00, 0x01]).is_err());
/// ```
pub fn split_payload(input: &[u8]) -> Result<(u8, &[u8]), Error> {
    if input.len() < SELECTOR_LEN {
        return Err(Error::MalformedInput(format!(
            "payload is {} bytes, expected at least {SELECTOR_LEN}",
            input.len()
        )));
    }

    Ok((input[SELECTOR_LEN - 1], &input[SELECTOR_LEN..]))
}

/// Clamps a requested count to `max`, without truncating oversized words first.
pub fn clamp_count(requested: U256, max: usize) -> usize {
    if requested > U256::from(max) {
        max
    } else {
        requested.to::<usize>()
    }
}

/// Sequential reader over 32-byte argument words.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    /// Creates a reader positioned at the first word of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    /// Returns the bytes that have not been consumed yet.
    pub fn remaining(&self) -> &'a [u8] {
        &self.data[self.offset.min(self.data.len())..]
    }

    /// Consumes the next word. `what` names the argument in the error message.
    pub fn word(&mut self, what: &str) -> Result<&'a [u8], Error> {
        let end = self.offset + WORD;
        let word = self.data.get(self.offset..end).ok_or_else(|| {
            Error::MalformedInput(format!(
                "missing {what}: need {end} bytes of arguments, got {}",
                self.data.len()
            ))
        })?;
        self.offset = end;
        Ok(word)
    }

    /// Consumes the next word as an unsigned 256-bit integer.
    pub fn uint(&mut self, what: &str) -> Result<U256, Error> {
        self.word(what).map(U256::from_be_slice)
    }

    /// Consumes the next word as a 32-byte value.
    pub fn bytes32(&mut self, what: &str) -> Result<B256, Error> {
        self.word(what).map(B256::from_slice)
    }

    /// Consumes the next word as a left-padded address. Dirty upper bytes are rejected.
    pub fn address(&mut self, what: &str) -> Result<Address, Error> {
        let word = self.word(what)?;
        if word[..12].iter().any(|byte| *byte != 0) {
            return Err(Error::MalformedInput(format!("{what} is not a left-padded address")));
        }
        Ok(Address::from_slice(&word[12..]))
    }

    /// Consumes the next word as an unsigned 192-bit integer, such as a nonce key.
    pub fn u192(&mut self, what: &str) -> Result<U192, Error> {
        let word = self.word(what)?;
        if word[..8].iter().any(|byte| *byte != 0) {
            return Err(Error::MalformedInput(format!("{what} exceeds 192 bits")));
        }
        Ok(U192::from_be_slice(&word[8..]))
    }

    /// Consumes the next word as an unsigned 48-bit integer, such as a validity timestamp.
    pub fn u48(&mut self, what: &str) -> Result<u64, Error> {
        let value = self.uint(what)?;
        if value > U256::from(MAX_U48) {
            return Err(Error::MalformedInput(format!("{what} exceeds 48 bits")));
        }
        Ok(value.to::<u64>())
    }
}

/// Builds a result out of 32-byte big-endian words.
#[derive(Debug, Clone, Default)]
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    /// Creates a writer with room for `words` words.
    pub fn with_words(words: usize) -> Self {
        Self { buf: Vec::with_capacity(words * WORD) }
    }

    /// Appends an unsigned integer word.
    pub fn uint(mut self, value: U256) -> Self {
        self.buf.extend_from_slice(&value.to_be_bytes::<WORD>());
        self
    }

    /// Appends a 32-byte value.
    pub fn bytes32(mut self, value: B256) -> Self {
        self.buf.extend_from_slice(value.as_slice());
        self
    }

    /// Appends a left-padded address word.
    pub fn address(mut self, address: Address) -> Self {
        self.buf.extend_from_slice(address.into_word().as_slice());
        self
    }

    /// Appends raw bytes, for the few results that are not word-aligned.
    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    /// Returns the encoded result.
    pub fn finish(self) -> Bytes {
        Bytes::from(self.buf)
    }
}

fn abi_error(what: &str, err: alloy::sol_types::Error) -> Error {
    Error::MalformedInput(format!("failed to decode {what}: {err}"))
}

/// Decodes `(UserOperation userOp)`.
pub fn decode_user_op(data: &[u8]) -> Result<UserOperation, Error> {
    <(UserOperation,)>::abi_decode_params(data)
        .map(|(op,)| op)
        .map_err(|e| abi_error("user operation", e))
}

/// Decodes `(UserOperation userOp, bytes32 userOpHash, uint256 amount)`, the shape shared by
/// `validateUserOp` (amount = required prefund) and `validatePaymaster` (amount = max cost).
pub fn decode_user_op_with_hash(data: &[u8]) -> Result<(UserOperation, B256, U256), Error> {
    <(UserOperation, B256, U256)>::abi_decode_params(data)
        .map_err(|e| abi_error("user operation with hash", e))
}

/// Resolves an ABI offset word against a region of `len` bytes.
fn offset_within(word: U256, len: usize, what: &str) -> Result<usize, Error> {
    if word > U256::from(len) {
        return Err(Error::MalformedInput(format!("{what} {word} points past {len} bytes")));
    }
    Ok(word.to::<usize>())
}

/// Decodes the first `count` elements of `(UserOperation[] ops)`.
///
/// Only the array head and the requested elements are read, so elements past `count` are never
/// decoded and cannot fail the call. An array shorter than `count` is malformed.
pub fn decode_user_ops(data: &[u8], count: usize) -> Result<Vec<UserOperation>, Error> {
    let array = offset_within(Reader::new(data).uint("ops offset")?, data.len(), "ops offset")?;

    let mut reader = Reader::new(&data[array..]);
    let len = reader.uint("ops length")?;
    if len < U256::from(count) {
        return Err(Error::MalformedInput(format!(
            "batch of {count} operations carries only {len}"
        )));
    }

    // element offsets are relative to the first word after the length
    let elements = reader.remaining();
    let mut ops = Vec::with_capacity(count);
    for i in 0..count {
        let start = offset_within(reader.uint("op offset")?, elements.len(), "op offset")?;

        let mut element = Vec::with_capacity(WORD + elements.len() - start);
        element.extend_from_slice(&U256::from(WORD).to_be_bytes::<WORD>());
        element.extend_from_slice(&elements[start..]);
        ops.push(
            <(UserOperation,)>::abi_decode_params(&element)
                .map(|(op,)| op)
                .map_err(|e| abi_error(&format!("user operation {i} of the batch"), e))?,
        );
    }

    Ok(ops)
}

/// Encodes `(UserOperation userOp)`.
pub fn encode_user_op(op: &UserOperation) -> Vec<u8> {
    (op.clone(),).abi_encode_params()
}

/// Encodes `(UserOperation userOp, bytes32 userOpHash, uint256 amount)`.
pub fn encode_user_op_with_hash(op: &UserOperation, op_hash: B256, amount: U256) -> Vec<u8> {
    (op.clone(), op_hash, amount).abi_encode_params()
}

/// Encodes `(UserOperation[] ops)`.
pub fn encode_user_ops(ops: &[UserOperation]) -> Vec<u8> {
    (ops.to_vec(),).abi_encode_params()
}
