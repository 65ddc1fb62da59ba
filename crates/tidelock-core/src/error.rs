//! Error types for the Tidelock protocol.
use thiserror::Error;

use crate::types::Amount;

/// Errors raised by the pool engine's lifecycle operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    #[error("deposit cannot be zero")] DepositCannotBeZero,
    #[error("duration cannot be zero")] DurationCannotBeZero,
    #[error("no such stake id")] NoSuchStake,
    #[error("stake was deleted")] StakeDeleted,
    #[error("stake matured")] StakeMatured,
    #[error("stake is still alive")] StakeAlive,
    #[error("arithmetic overflow")] ArithmeticOverflow,
    #[error(transparent)] Ledger(#[from] LedgerError),
}

/// Errors raised by pool creation and wallet administration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("token cannot be zero")] TokenCannotBeZero,
    #[error("price cannot be zero")] PriceCannotBeZero,
    #[error("B bonus amount cannot be zero")] BonusAmountCannotBeZero,
    #[error("L bonus period cannot be zero")] BonusPeriodCannotBeZero,
    #[error("wallet cannot be zero")] WalletCannotBeZero,
    #[error("percent sum must be == 100, got {sum}")] PercentSumMismatch { sum: u32 },
    #[error("no such pool: {0}")] NoSuchPool(usize),
}

/// Errors raised by the external fungible-token ledger.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("insufficient balance: have {have}, need {need}")] InsufficientBalance { have: Amount, need: Amount },
    #[error("insufficient allowance: have {have}, need {need}")] InsufficientAllowance { have: Amount, need: Amount },
}

/// Umbrella error for callers composing multiple Tidelock components.
#[derive(Error, Debug)]
pub enum TidelockError {
    #[error(transparent)] Pool(#[from] PoolError),
    #[error(transparent)] Registry(#[from] RegistryError),
    #[error(transparent)] Ledger(#[from] LedgerError),
}
