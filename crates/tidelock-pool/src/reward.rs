//! Lambda-based reward accounting.
//!
//! `lambda` is a pool-wide cumulative reward-per-share accumulator,
//! COEF²-scaled. Any stake's unclaimed reward is derived in O(1) from
//! the distance between the current lambda and the stake's last
//! settlement snapshot:
//!
//! ```text
//! reward = (lambda - lastLambda) * stakeShares / COEF² + assignedReward
//! ```
//!
//! Accruals divide by the shares of the stakes that remain in the pool,
//! so an exiting stake never earns from its own penalty and the credited
//! value is fully distributed to the survivors.

use primitive_types::U256;
use tidelock_core::constants::{coef_squared, PERCENT_BASE, WEEK_SECS};
use tidelock_core::error::PoolError;
use tidelock_core::types::{Amount, Timestamp};

use crate::math::{mul_div, to_amount};
use crate::stake::Stake;

/// Fold `credit` tokens into lambda, spread over `total_shares`.
///
/// `total_shares` must already exclude any stake being removed in the
/// same operation. Returns lambda unchanged when no shares remain to
/// receive the credit (the tokens then stay in pool custody).
pub fn accrue(lambda: U256, credit: Amount, total_shares: U256) -> Result<U256, PoolError> {
    if credit == 0 || total_shares.is_zero() {
        return Ok(lambda);
    }
    let delta = mul_div(U256::from(credit), coef_squared(), total_shares)?;
    lambda.checked_add(delta).ok_or(PoolError::ArithmeticOverflow)
}

/// Unclaimed reward of `stake` at the given lambda, without mutating it.
pub fn pending(lambda: U256, stake: &Stake) -> Result<Amount, PoolError> {
    let delta = lambda
        .checked_sub(stake.last_lambda)
        .ok_or(PoolError::ArithmeticOverflow)?;
    let earned = mul_div(delta, stake.total_shares(), coef_squared())?;
    to_amount(earned)?
        .checked_add(stake.assigned_reward)
        .ok_or(PoolError::ArithmeticOverflow)
}

/// Bank the stake's unclaimed reward and reset its lambda snapshot.
///
/// Called before any mutation that changes the stake's share count.
/// Returns the banked total.
pub fn settle(stake: &mut Stake, lambda: U256) -> Result<Amount, PoolError> {
    let reward = pending(lambda, stake)?;
    stake.last_lambda = lambda;
    stake.assigned_reward = reward;
    Ok(reward)
}

/// Reward actually payable for a claim at `now` on a stake that matured
/// at `maturity`.
///
/// Claims within `free_late_period` of maturity pay the full reward.
/// Afterwards each full week elapsed since maturity docks
/// `decay_percent_per_week` percent of the reward, down to zero; the
/// principal is never touched.
pub fn late_claim_reward(
    reward: Amount,
    maturity: u128,
    now: Timestamp,
    free_late_period: u64,
    decay_percent_per_week: u32,
) -> Amount {
    let now = now as u128;
    if now <= maturity + free_late_period as u128 {
        return reward;
    }
    let weeks_late = (now - maturity) / WEEK_SECS as u128;
    let cut = reward
        .checked_mul(decay_percent_per_week as u128)
        .and_then(|v| v.checked_mul(weeks_late))
        .map(|v| v / PERCENT_BASE as u128)
        .unwrap_or(reward);
    reward.saturating_sub(cut)
}
