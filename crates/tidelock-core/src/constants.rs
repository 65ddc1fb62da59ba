//! Protocol constants. All token amounts are in the smallest token unit;
//! prices and the lambda accumulator are fixed-point with [`COEF`] as the
//! scaling base.

use primitive_types::U256;

/// Fixed-point scaling coefficient (10^18).
///
/// Prices are COEF-scaled: a price of `COEF` means one token buys
/// `COEF` base shares of share-precision. Shares and lambda are
/// COEF²-scaled, which is why share issuance multiplies by `COEF²`
/// before dividing by the price.
pub const COEF: u128 = 1_000_000_000_000_000_000;

/// Percentage denominator for bonus caps and penalty splits.
pub const PERCENT_BASE: u32 = 100;

pub const DAY_SECS: u64 = 86_400;
pub const WEEK_SECS: u64 = 7 * DAY_SECS;
pub const YEAR_SECS: u64 = 365 * DAY_SECS;

/// Grace window after maturity during which a claim incurs no reward decay.
pub const DEFAULT_FREE_LATE_PERIOD_SECS: u64 = WEEK_SECS;

/// Reward decay per full week past maturity, as a percentage of the reward.
///
/// At 2%/week the reward is fully consumed after 50 weeks; only the
/// principal remains for later claims.
pub const DEFAULT_LATE_DECAY_PERCENT_PER_WEEK: u32 = 2;

/// Multiples of the original lock duration past maturity before a stake
/// counts as abandoned and becomes reapable by any caller.
pub const DEFAULT_DORMANCY_MULTIPLIER: u64 = 2;

/// `COEF²` as a 256-bit value.
///
/// # Examples
///
/// ```
/// use tidelock_core::constants::{coef_squared, COEF};
/// use primitive_types::U256;
/// assert_eq!(coef_squared(), U256::from(COEF) * U256::from(COEF));
/// ```
pub fn coef_squared() -> U256 {
    U256::from(COEF) * U256::from(COEF)
}
