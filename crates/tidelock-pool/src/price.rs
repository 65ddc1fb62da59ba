//! Share-price ratchet.
//!
//! `currentPrice` tracks the best realized return per base share seen in
//! any withdrawal. It only ever moves up; new deposits are priced at the
//! ratcheted value, so later depositors receive fewer shares per token
//! once the pool has demonstrated a higher yield.

use primitive_types::U256;
use tidelock_core::constants::coef_squared;
use tidelock_core::error::PoolError;
use tidelock_core::types::Amount;

use crate::math::mul_div;

/// Candidate price from one withdrawal: `paid_out * COEF² / base_shares`
/// (bonus shares excluded). Returns the greater of the candidate and the
/// current price; the current price is kept unchanged when the stake has
/// no base shares or paid nothing out.
pub fn ratchet(current: U256, paid_out: Amount, base_shares: U256) -> Result<U256, PoolError> {
    if base_shares.is_zero() || paid_out == 0 {
        return Ok(current);
    }
    let candidate = mul_div(U256::from(paid_out), coef_squared(), base_shares)?;
    Ok(current.max(candidate))
}
