//! Validation engine: user operation and paymaster checks.
//!
//! Every operation follows `decode -> validate -> encode`. Malformed input is a fault; a failed
//! check is a successful call whose validation word has the failure authorizer set.

use alloy::primitives::{Address, Bytes, Signature, B256, U256};
use tracing::{trace, warn};

use crate::{
    codec::{clamp_count, decode_user_op, decode_user_op_with_hash, decode_user_ops, Reader, Writer},
    context::CallContext,
    error::Error,
    precompile::PrecompileConfig,
    user_operation::{PaymasterData, UserOperation, SIGNATURE_LEN},
    validation_data::ValidationData,
};

/// Hard ceiling on the number of operations checked by one `batchValidate` call.
pub const MAX_BATCH_SIZE: usize = 10;

/// Recovers the EIP-191 signer of `hash`, or `None` for a malformed or unrecoverable signature.
pub fn recover_signer(signature: &[u8], hash: B256) -> Option<Address> {
    if signature.len() != SIGNATURE_LEN {
        return None;
    }

    Signature::from_raw(signature).ok()?.recover_address_from_msg(hash.as_slice()).ok()
}

/// Runs the account-side checks on `op`.
///
/// Checks, in order: the supplied hash, the signature (sender or its registered signer), the
/// nonce sequence under the operation's key and, for unsponsored operations, the sender's
/// deposit against `max(required_prefund, computed prefund)`.
pub fn check_user_op(
    config: &PrecompileConfig,
    ctx: &CallContext<'_>,
    op: &UserOperation,
    op_hash: B256,
    required_prefund: U256,
) -> Result<ValidationData, Error> {
    let prefund = op.required_prefund()?;
    let expected_hash = op.hash(config.entry_point, ctx.chain_id);

    if op_hash != expected_hash {
        warn!(
            "user operation hash mismatch for {}: got {op_hash}, expected {expected_hash}",
            op.sender
        );
        return Ok(ValidationData::failed());
    }

    let authorized = match recover_signer(&op.signature, expected_hash) {
        Some(signer) => {
            trace!("recovered signer {signer} for {}", op.sender);
            signer == op.sender || ctx.state.signer_of(op.sender) == Some(signer)
        }
        None => false,
    };
    if !authorized {
        warn!("signature check failed for {}", op.sender);
        return Ok(ValidationData::failed());
    }

    let key = op.nonce_key();
    let expected_nonce = ctx.state.nonce(op.sender, key);
    if U256::from(op.nonce_sequence()) != expected_nonce {
        warn!(
            "nonce mismatch for {} under key {key}: got {}, expected {expected_nonce}",
            op.sender,
            op.nonce_sequence()
        );
        return Ok(ValidationData::failed());
    }

    if !op.has_paymaster() {
        let required = prefund.max(required_prefund);
        let deposit = ctx.state.deposit_of(op.sender);
        if deposit < required {
            warn!("insufficient deposit for {}: have {deposit}, need {required}", op.sender);
            return Ok(ValidationData::failed());
        }
    }

    Ok(ValidationData::success())
}

/// Runs the VerifyingPaymaster checks on `op`: deployed paymaster, deposit covering `max_cost`,
/// an open validity window and a signature from the paymaster's registered signer.
pub fn check_paymaster(
    ctx: &CallContext<'_>,
    op: &UserOperation,
    max_cost: U256,
) -> Result<ValidationData, Error> {
    let paymaster = op.paymaster().ok_or_else(|| {
        Error::MalformedInput(format!(
            "paymasterAndData is {} bytes, too short to name a paymaster",
            op.paymasterAndData.len()
        ))
    })?;

    let Some(data) = PaymasterData::parse(&op.paymasterAndData) else {
        warn!("paymasterAndData for {paymaster} does not follow the verifying paymaster layout");
        return Ok(ValidationData::failed());
    };
    let result = ValidationData::success().with_time_range(data.valid_until, data.valid_after);

    if ctx.state.account_code(paymaster).map_or(true, |code| code.is_empty()) {
        warn!("paymaster {paymaster} has no code");
        return Ok(result.into_failed());
    }

    let deposit = ctx.state.deposit_of(paymaster);
    if deposit < max_cost {
        warn!("insufficient paymaster deposit for {paymaster}: have {deposit}, need {max_cost}");
        return Ok(result.into_failed());
    }

    if data.is_expired(ctx.timestamp) {
        warn!("paymaster {paymaster} sponsorship expired at {}", data.valid_until);
        return Ok(result.into_failed());
    }

    let expected = ctx.state.signer_of(paymaster);
    let recovered = recover_signer(&data.signature, data.hash(op, ctx.chain_id));
    if expected.is_none() || recovered != expected {
        warn!("paymaster signature check failed for {paymaster}");
        return Ok(result.into_failed());
    }

    trace!("paymaster {paymaster} sponsors {}", op.sender);
    Ok(result)
}

/// `validateUserOp(UserOperation, bytes32 userOpHash, uint256 requiredPrefund)`.
pub fn validate_user_op(
    config: &PrecompileConfig,
    ctx: &CallContext<'_>,
    data: &[u8],
) -> Result<Bytes, Error> {
    let (op, op_hash, required_prefund) = decode_user_op_with_hash(data)?;
    let validation = check_user_op(config, ctx, &op, op_hash, required_prefund)?;

    Ok(Writer::with_words(1).uint(validation.pack()).finish())
}

/// `getUserOpHash(UserOperation)`.
pub fn get_user_op_hash(
    config: &PrecompileConfig,
    ctx: &CallContext<'_>,
    data: &[u8],
) -> Result<Bytes, Error> {
    let op = decode_user_op(data)?;
    let hash = op.hash(config.entry_point, ctx.chain_id);
    trace!("user operation hash for {}: {hash}", op.sender);

    Ok(Writer::with_words(1).bytes32(hash).finish())
}

/// `validatePaymaster(UserOperation, bytes32 userOpHash, uint256 maxCost)`. Returns the
/// validation word followed by the post-operation context, which is the operation hash.
///
/// A supplied hash that differs from the recomputed one fails validation, so a passing result
/// always carries the real operation hash as its context.
pub fn validate_paymaster(
    config: &PrecompileConfig,
    ctx: &CallContext<'_>,
    data: &[u8],
) -> Result<Bytes, Error> {
    let (op, op_hash, max_cost) = decode_user_op_with_hash(data)?;
    let mut validation = check_paymaster(ctx, &op, max_cost)?;

    let expected_hash = op.hash(config.entry_point, ctx.chain_id);
    if op_hash != expected_hash {
        warn!(
            "paymaster context hash mismatch for {}: got {op_hash}, expected {expected_hash}",
            op.sender
        );
        validation = validation.into_failed();
    }

    Ok(Writer::with_words(2).uint(validation.pack()).bytes32(op_hash).finish())
}

/// `calculatePrefund(UserOperation)`.
pub fn calculate_prefund(data: &[u8]) -> Result<Bytes, Error> {
    let op = decode_user_op(data)?;
    let prefund = op.required_prefund()?;
    trace!("prefund for {}: {prefund}", op.sender);

    Ok(Writer::with_words(1).uint(prefund).finish())
}

/// `simulateValidation(UserOperation)`. Returns the account validation word, the paymaster
/// validation word (`0` when unsponsored) and the gas estimate.
pub fn simulate_validation(
    config: &PrecompileConfig,
    ctx: &CallContext<'_>,
    data: &[u8],
) -> Result<Bytes, Error> {
    let op = decode_user_op(data)?;
    let op_hash = op.hash(config.entry_point, ctx.chain_id);
    let prefund = op.required_prefund()?;

    let account = check_user_op(config, ctx, &op, op_hash, prefund)?;
    let paymaster = if op.has_paymaster() {
        check_paymaster(ctx, &op, prefund)?.pack()
    } else {
        U256::ZERO
    };
    let gas_estimate = op.gas_estimate()?;

    Ok(Writer::with_words(3).uint(account.pack()).uint(paymaster).uint(gas_estimate).finish())
}

/// `batchValidate(uint256 size, UserOperation[] ops)`. Checks the first `min(size, 10)`
/// operations and returns one validation word per operation, in input order.
pub fn batch_validate(
    config: &PrecompileConfig,
    ctx: &CallContext<'_>,
    data: &[u8],
) -> Result<Bytes, Error> {
    let mut reader = Reader::new(data);
    let size = clamp_count(reader.uint("batch size")?, MAX_BATCH_SIZE);
    if size == 0 {
        return Ok(Bytes::new());
    }

    let ops = decode_user_ops(reader.remaining(), size)?;

    let mut out = Writer::with_words(size);
    for op in &ops {
        let op_hash = op.hash(config.entry_point, ctx.chain_id);
        let prefund = op.required_prefund()?;
        out = out.uint(check_user_op(config, ctx, op, op_hash, prefund)?.pack());
    }
    trace!("validated batch of {size} operations");

    Ok(out.finish())
}
