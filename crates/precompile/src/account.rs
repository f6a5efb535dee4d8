//! Account registry accessor: counterfactual addresses, keyed nonces and signature aggregation.

use alloy::primitives::{keccak256, uint, Address, Bytes, B256, U256};
use tracing::trace;

use crate::{
    codec::{clamp_count, Reader, Writer},
    context::CallContext,
    error::Error,
    precompile::PrecompileConfig,
};

/// Hard ceiling on the number of signatures combined by one `aggregateSignatures` call.
pub const MAX_AGGREGATED_SIGNATURES: usize = 10;

/// Order of the secp256k1 group. Valid `r` and `s` values are strictly below it.
pub const SECP256K1N: U256 =
    uint!(0xFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEBAAEDCE6AF48A03BBFD25E8CD0364141_U256);

/// Address the account factory deploys `owner`'s account at for `salt`.
///
/// The init code is the configured account init code followed by the left-padded owner word,
/// and the address follows CREATE2:
/// `keccak256(0xff ‖ factory ‖ salt ‖ keccak256(initCode))[12..]`.
pub fn counterfactual_address(config: &PrecompileConfig, owner: Address, salt: B256) -> Address {
    let mut init_code = Vec::with_capacity(config.account_init_code.len() + 32);
    init_code.extend_from_slice(&config.account_init_code);
    init_code.extend_from_slice(owner.into_word().as_slice());

    config.account_factory.create2_from_code(salt.0, init_code)
}

/// `createAccount(address owner, bytes32 salt)`.
pub fn create_account(config: &PrecompileConfig, data: &[u8]) -> Result<Bytes, Error> {
    let mut reader = Reader::new(data);
    let owner = reader.address("owner")?;
    let salt = reader.bytes32("salt")?;

    let account = counterfactual_address(config, owner, salt);
    trace!("account for owner {owner} with salt {salt}: {account}");

    Ok(Writer::with_words(1).address(account).finish())
}

/// `getAccountNonce(address account, uint192 key)`.
pub fn get_account_nonce(ctx: &CallContext<'_>, data: &[u8]) -> Result<Bytes, Error> {
    let mut reader = Reader::new(data);
    let account = reader.address("account")?;
    let key = reader.u192("key")?;

    let nonce = ctx.state.nonce(account, key);
    trace!("nonce of {account} under key {key}: {nonce}");

    Ok(Writer::with_words(1).uint(nonce).finish())
}

/// How a signature encodes its recovery id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Recovery {
    /// `v` in `{27, 28}`.
    Legacy,
    /// `v` in `{0, 1}`.
    Parity,
}

impl Recovery {
    /// Splits `v` into its convention and y-parity.
    fn from_v(v: U256) -> Option<(Self, bool)> {
        if v > U256::from(u8::MAX) {
            return None;
        }

        match v.to::<u8>() {
            0 => Some((Recovery::Parity, false)),
            1 => Some((Recovery::Parity, true)),
            27 => Some((Recovery::Legacy, false)),
            28 => Some((Recovery::Legacy, true)),
            _ => None,
        }
    }

    fn encode(self, parity: bool) -> u8 {
        match self {
            Recovery::Legacy => 27 + parity as u8,
            Recovery::Parity => parity as u8,
        }
    }
}

/// `aggregateSignatures(uint256 count, (uint256 r, uint256 s, uint256 v)[count])`.
///
/// Combines up to [`MAX_AGGREGATED_SIGNATURES`] ECDSA signatures into a 65-byte commitment
/// `keccak256(r_1 ‖ … ‖ r_n) ‖ keccak256(s_1 ‖ … ‖ s_n) ‖ v*`, where `v*` is the XOR
/// of the y-parities re-encoded in the convention shared by every input.
pub fn aggregate_signatures(data: &[u8]) -> Result<Bytes, Error> {
    let mut reader = Reader::new(data);
    let requested = reader.uint("signature count")?;
    if requested.is_zero() {
        return Err(Error::AggregationError("no signatures to aggregate".to_string()));
    }
    let count = clamp_count(requested, MAX_AGGREGATED_SIGNATURES);

    let mut rs = Vec::with_capacity(count * 32);
    let mut ss = Vec::with_capacity(count * 32);
    let mut convention = None;
    let mut parity = false;

    for i in 0..count {
        let r = reader.uint("signature r")?;
        let s = reader.uint("signature s")?;
        let v = reader.uint("signature v")?;

        if r.is_zero() || r >= SECP256K1N {
            return Err(Error::AggregationError(format!("signature {i} has an invalid r")));
        }
        if s.is_zero() || s >= SECP256K1N {
            return Err(Error::AggregationError(format!("signature {i} has an invalid s")));
        }

        let (recovery, odd) = Recovery::from_v(v).ok_or_else(|| {
            Error::AggregationError(format!("signature {i} has an invalid v: {v}"))
        })?;
        match convention {
            None => convention = Some(recovery),
            Some(shared) if shared != recovery => {
                return Err(Error::AggregationError(format!(
                    "signature {i} mixes {recovery:?} and {shared:?} recovery ids"
                )));
            }
            Some(_) => {}
        }

        rs.extend_from_slice(&r.to_be_bytes::<32>());
        ss.extend_from_slice(&s.to_be_bytes::<32>());
        parity ^= odd;
    }

    let v = convention.map_or(0, |recovery| recovery.encode(parity));
    trace!("aggregated {count} signatures");

    Ok(Writer::with_words(3)
        .bytes32(keccak256(&rs))
        .bytes32(keccak256(&ss))
        .raw(&[v])
        .finish())
}
