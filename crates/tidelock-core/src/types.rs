//! Core protocol types: identities, amounts, and pool parameters.
//!
//! Token amounts use `u128` in the smallest token unit. Share and price
//! values are 256-bit because share issuance scales amounts by `COEF²`
//! (10^36), which exceeds the `u128` range for realistic supplies.

use std::fmt;

use primitive_types::U256;
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_DORMANCY_MULTIPLIER, DEFAULT_FREE_LATE_PERIOD_SECS,
    DEFAULT_LATE_DECAY_PERCENT_PER_WEEK,
};

/// Token amount in the smallest token unit.
pub type Amount = u128;

/// Unix timestamp in seconds.
pub type Timestamp = u64;

/// Opaque 32-byte account identity (depositor, penalty wallet, or pool
/// custody account).
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default,
)]
pub struct AccountId(pub [u8; 32]);

impl AccountId {
    /// The zero account. Rejected wherever a real wallet is required.
    pub const ZERO: Self = Self([0u8; 32]);

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl From<[u8; 32]> for AccountId {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

/// Opaque identity of the staked token. The engine never interprets it;
/// the registry uses it to index pools and reject the zero token.
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default,
)]
pub struct TokenId(pub [u8; 32]);

impl TokenId {
    pub const ZERO: Self = Self([0u8; 32]);

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// Number of penalty recipients: four external wallets plus the pool
/// itself (whose share feeds the reward accumulator).
pub const PENALTY_RECIPIENTS: usize = 5;

/// Immutable pool configuration, validated once at creation.
///
/// `wallets[0..4]` receive the first four `penalty_percents`;
/// `wallets[4]` is the pool's own custody account on the token ledger;
/// its percent share is folded into the reward accumulator instead of
/// being transferred out.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoolParams {
    pub token: TokenId,
    /// Reference share price at creation, COEF-scaled. Must be > 0.
    pub initial_price: U256,
    /// Deposit size at which the B bonus saturates. Must be > 0.
    pub b_bonus_amount: Amount,
    /// Lock duration (seconds) at which the L bonus saturates. Must be > 0.
    pub l_bonus_period: u64,
    /// B bonus cap as a percentage of base shares.
    pub b_bonus_max_percent: u32,
    /// L bonus cap as a percentage of base shares.
    pub l_bonus_max_percent: u32,
    /// Penalty shares for `{wallets[0..4], pool}`. Must sum to 100.
    pub penalty_percents: [u32; PENALTY_RECIPIENTS],
    pub wallets: [AccountId; PENALTY_RECIPIENTS],
    /// Grace window after maturity with no reward decay.
    pub free_late_period: u64,
    /// Reward decay per full week past maturity, percent.
    pub late_decay_percent_per_week: u32,
    /// Multiples of the lock duration past maturity before a stake is
    /// reapable.
    pub dormancy_multiplier: u64,
}

impl PoolParams {
    /// Build parameters with the default late-claim and dormancy knobs.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        token: TokenId,
        initial_price: U256,
        b_bonus_amount: Amount,
        l_bonus_period: u64,
        b_bonus_max_percent: u32,
        l_bonus_max_percent: u32,
        penalty_percents: [u32; PENALTY_RECIPIENTS],
        wallets: [AccountId; PENALTY_RECIPIENTS],
    ) -> Self {
        Self {
            token,
            initial_price,
            b_bonus_amount,
            l_bonus_period,
            b_bonus_max_percent,
            l_bonus_max_percent,
            penalty_percents,
            wallets,
            free_late_period: DEFAULT_FREE_LATE_PERIOD_SECS,
            late_decay_percent_per_week: DEFAULT_LATE_DECAY_PERCENT_PER_WEEK,
            dormancy_multiplier: DEFAULT_DORMANCY_MULTIPLIER,
        }
    }

    /// The pool's custody account on the token ledger.
    pub fn custody(&self) -> AccountId {
        self.wallets[PENALTY_RECIPIENTS - 1]
    }
}
