//! Fixtures shared by the unit tests of this crate.

use alloy::{
    primitives::{Address, Bytes, B256, U256},
    signers::{local::PrivateKeySigner, SignerSync},
};

use crate::{
    precompile::PrecompileConfig,
    user_operation::{PaymasterData, UserOperation},
};

/// A well-known development key, used as the account owner.
pub(crate) const OWNER_KEY: &str =
    "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

/// A second development key, used as the paymaster's verifying signer.
pub(crate) const PAYMASTER_SIGNER_KEY: &str =
    "59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";

pub(crate) fn owner() -> PrivateKeySigner {
    OWNER_KEY.parse().expect("valid key")
}

pub(crate) fn paymaster_signer() -> PrivateKeySigner {
    PAYMASTER_SIGNER_KEY.parse().expect("valid key")
}

pub(crate) fn sign(signer: &PrivateKeySigner, hash: B256) -> Bytes {
    let signature = signer.sign_message_sync(hash.as_slice()).expect("signs");
    Bytes::from(signature.as_bytes().to_vec())
}

/// An unsigned operation from `sender` with modest gas limits.
pub(crate) fn user_op(sender: Address) -> UserOperation {
    UserOperation {
        sender,
        nonce: U256::ZERO,
        callData: Bytes::from_static(&[0xb6, 0x1d, 0x27, 0xf6]),
        callGasLimit: U256::from(100_000),
        verificationGasLimit: U256::from(150_000),
        preVerificationGas: U256::from(50_000),
        maxFeePerGas: U256::from(1_000_000_000u64),
        maxPriorityFeePerGas: U256::from(1_000_000_000u64),
        ..Default::default()
    }
}

/// Signs `op` with `signer` for the default configuration on `chain_id`.
pub(crate) fn signed(
    mut op: UserOperation,
    signer: &PrivateKeySigner,
    chain_id: u64,
) -> UserOperation {
    let hash = op.hash(PrecompileConfig::default().entry_point, chain_id);
    op.signature = sign(signer, hash);
    op
}

/// Attaches VerifyingPaymaster data for `paymaster`, signed by `signer`.
pub(crate) fn sponsored(
    mut op: UserOperation,
    paymaster: Address,
    signer: &PrivateKeySigner,
    chain_id: u64,
    valid_until: u64,
    valid_after: u64,
) -> UserOperation {
    let mut data = PaymasterData { paymaster, valid_until, valid_after, signature: Bytes::new() };
    data.signature = sign(signer, data.hash(&op, chain_id));
    op.paymasterAndData = data.encode();
    op
}
