//! Economic engine: executor rewards.

use alloy::primitives::{Bytes, Uint, U256};
use tracing::trace;

use crate::{
    codec::{Reader, Writer},
    error::Error,
};

/// Divisor applied to the tip multiplier, which is expressed in percent.
pub const REWARD_DENOMINATOR: u64 = 100;

/// Wide enough to hold the product of three 256-bit words.
type U768 = Uint<768, 12>;

fn widen(value: U256) -> U768 {
    U768::from_limbs_slice(value.as_limbs())
}

fn narrow(value: U768) -> Option<U256> {
    let limbs = value.as_limbs();
    if limbs[4..].iter().any(|limb| *limb != 0) {
        return None;
    }
    Some(U256::from_limbs_slice(&limbs[..4]))
}

/// `floor(gas_used * gas_price * tip_multiplier / 100)`.
///
/// The product is taken at full width before dividing, so only a quotient that does not fit in
/// 256 bits overflows.
///
/// ```
/// use alloy::primitives::U256;
/// use hermod_precompile::economics::reward;
///
/// let reward = reward(U256::from(100_000), U256::from(1_000_000_000), U256::from(10));
/// assert_eq!(reward, Ok(U256::from(10_000_000_000_000u64)));
/// ```
pub fn reward(gas_used: U256, gas_price: U256, tip_multiplier: U256) -> Result<U256, Error> {
    let product = widen(gas_used) * widen(gas_price) * widen(tip_multiplier);
    narrow(product / U768::from(REWARD_DENOMINATOR)).ok_or(Error::ArithmeticOverflow("reward"))
}

/// `calculateRewards(uint256 gasUsed, uint256 gasPrice, uint256 tipMultiplier)`.
pub fn calculate_rewards(data: &[u8]) -> Result<Bytes, Error> {
    let mut reader = Reader::new(data);
    let gas_used = reader.uint("gasUsed")?;
    let gas_price = reader.uint("gasPrice")?;
    let tip_multiplier = reader.uint("tipMultiplier")?;

    let reward = reward(gas_used, gas_price, tip_multiplier)?;
    trace!("reward for {gas_used} gas at {gas_price} with {tip_multiplier}% tip: {reward}");

    Ok(Writer::with_words(1).uint(reward).finish())
}
