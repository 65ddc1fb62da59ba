//! 256-bit helpers for share and lambda arithmetic.
//!
//! All engine math is integer-only. Products are widened to 512 bits
//! before division so `amount * COEF²` never wraps; narrowing back to a
//! token amount is checked.

use primitive_types::{U256, U512};
use tidelock_core::error::PoolError;
use tidelock_core::types::Amount;

/// `a * b / divisor` with a 512-bit intermediate product.
///
/// Truncating division. Fails if the divisor is zero or the quotient
/// does not fit in 256 bits.
pub fn mul_div(a: U256, b: U256, divisor: U256) -> Result<U256, PoolError> {
    if divisor.is_zero() {
        return Err(PoolError::ArithmeticOverflow);
    }
    let wide: U512 = a.full_mul(b) / U512::from(divisor);
    U256::try_from(wide).map_err(|_| PoolError::ArithmeticOverflow)
}

/// Narrow a 256-bit value back to a token amount.
pub fn to_amount(value: U256) -> Result<Amount, PoolError> {
    if value > U256::from(u128::MAX) {
        return Err(PoolError::ArithmeticOverflow);
    }
    Ok(value.low_u128())
}
