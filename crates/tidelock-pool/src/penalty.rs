//! Early-exit penalties: time-proportional computation and the five-way
//! split across external wallets and the pool's reward accumulator.

use primitive_types::U256;
use tidelock_core::constants::PERCENT_BASE;
use tidelock_core::error::PoolError;
use tidelock_core::types::{Amount, Timestamp, PENALTY_RECIPIENTS};

use crate::math::{mul_div, to_amount};

/// Seconds left until maturity, clamped to zero once matured.
pub fn time_remaining(start_ts: Timestamp, duration: u64, now: Timestamp) -> u64 {
    let maturity = start_ts as u128 + duration as u128;
    let now = now as u128;
    if now >= maturity {
        0
    } else {
        // fits: the difference is bounded by `duration`
        (maturity - now) as u64
    }
}

/// Penalty owed by a stake exiting at `now`: `amount * remaining / duration`.
///
/// Zero once the stake has matured.
pub fn total(
    amount: Amount,
    start_ts: Timestamp,
    duration: u64,
    now: Timestamp,
) -> Result<Amount, PoolError> {
    let remaining = time_remaining(start_ts, duration, now);
    if remaining == 0 {
        return Ok(0);
    }
    let penalty = mul_div(
        U256::from(amount),
        U256::from(remaining),
        U256::from(duration),
    )?;
    to_amount(penalty)
}

/// A penalty divided across the five recipients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PenaltySplit {
    /// Portions owed to the four external wallets.
    pub wallets: [Amount; PENALTY_RECIPIENTS - 1],
    /// Portion folded into the pool's reward accumulator.
    pub to_pool: Amount,
}

impl PenaltySplit {
    /// Sum of all five portions; always equals the split input.
    pub fn total(&self) -> Amount {
        self.wallets.iter().sum::<Amount>() + self.to_pool
    }
}

/// Split `total` per the pool's penalty percentages.
///
/// The four wallet portions are floored; the pool portion takes the
/// exact remainder so the parts always sum to `total`.
pub fn split(
    total: Amount,
    percents: &[u32; PENALTY_RECIPIENTS],
) -> Result<PenaltySplit, PoolError> {
    let mut wallets = [0; PENALTY_RECIPIENTS - 1];
    let mut distributed: Amount = 0;
    for (portion, pct) in wallets.iter_mut().zip(percents.iter()) {
        let share = mul_div(
            U256::from(total),
            U256::from(*pct),
            U256::from(PERCENT_BASE),
        )?;
        *portion = to_amount(share)?;
        // each portion <= total * pct / 100 and the wallet percents sum
        // to at most 100, so distributed <= total
        distributed += *portion;
    }
    Ok(PenaltySplit { wallets, to_pool: total - distributed })
}
