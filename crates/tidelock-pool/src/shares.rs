//! Share issuance: base shares priced by the current share price, plus
//! two independently capped bonus curves.
//!
//! - Base shares: `amount * COEF² / currentPrice`.
//! - B bonus (size): linear ramp from 0 to `b_bonus_max_percent` of base
//!   shares as the amount approaches `b_bonus_amount`, saturating there.
//! - L bonus (duration): the same shape over `l_bonus_period`.

use primitive_types::U256;
use tidelock_core::constants::{coef_squared, PERCENT_BASE};
use tidelock_core::error::PoolError;
use tidelock_core::types::{Amount, PoolParams};

use crate::math::mul_div;

/// The three share components issued for one deposit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShareBreakdown {
    pub base: U256,
    pub l_bonus: U256,
    pub b_bonus: U256,
}

impl ShareBreakdown {
    /// Sum of base and bonus shares.
    ///
    /// Cannot wrap: each component is bounded by
    /// `amount * COEF² * max_percent / 100`, far below `U256::MAX / 4`.
    pub fn total(&self) -> U256 {
        self.base + self.l_bonus + self.b_bonus
    }
}

/// Compute the full share breakdown for a deposit of `amount` locked for
/// `duration` seconds at the given COEF-scaled price.
pub fn compute(
    amount: Amount,
    duration: u64,
    current_price: U256,
    params: &PoolParams,
) -> Result<ShareBreakdown, PoolError> {
    if amount == 0 {
        return Err(PoolError::DepositCannotBeZero);
    }
    if duration == 0 {
        return Err(PoolError::DurationCannotBeZero);
    }

    let base = mul_div(U256::from(amount), coef_squared(), current_price)?;
    let b_bonus = size_bonus(base, amount, params)?;
    let l_bonus = duration_bonus(base, duration, params)?;

    Ok(ShareBreakdown { base, l_bonus, b_bonus })
}

/// Size bonus: `base * pct * amount / (b_bonus_amount * 100)`, saturating
/// at `base * pct / 100` once `amount >= b_bonus_amount`.
fn size_bonus(base: U256, amount: Amount, params: &PoolParams) -> Result<U256, PoolError> {
    let pct = U256::from(params.b_bonus_max_percent);
    let percent_base = U256::from(PERCENT_BASE);
    if amount >= params.b_bonus_amount {
        return mul_div(base, pct, percent_base);
    }
    let scaled = base
        .checked_mul(pct)
        .ok_or(PoolError::ArithmeticOverflow)?;
    let divisor = U256::from(params.b_bonus_amount)
        .checked_mul(percent_base)
        .ok_or(PoolError::ArithmeticOverflow)?;
    mul_div(scaled, U256::from(amount), divisor)
}

/// Duration bonus: same ramp as [`size_bonus`] over `l_bonus_period`.
fn duration_bonus(base: U256, duration: u64, params: &PoolParams) -> Result<U256, PoolError> {
    let pct = U256::from(params.l_bonus_max_percent);
    let percent_base = U256::from(PERCENT_BASE);
    if duration >= params.l_bonus_period {
        return mul_div(base, pct, percent_base);
    }
    let scaled = base
        .checked_mul(pct)
        .ok_or(PoolError::ArithmeticOverflow)?;
    let divisor = U256::from(params.l_bonus_period)
        .checked_mul(percent_base)
        .ok_or(PoolError::ArithmeticOverflow)?;
    mul_div(scaled, U256::from(duration), divisor)
}
