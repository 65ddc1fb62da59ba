//! Pool lifecycle events.
//!
//! Each state-changing pool operation records one event in the pool's
//! event log. Callers drain the log to observe what happened; the engine
//! also mirrors events as `tracing` output.

use serde::{Deserialize, Serialize};

use crate::types::{AccountId, Amount};

/// An event recorded by a pool operation.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum PoolEvent {
    /// A new stake was locked.
    Deposit {
        depositor: AccountId,
        amount: Amount,
        duration: u64,
    },
    /// A stake was closed and paid out. `deposit` is the principal that
    /// was locked, `reward` the accrued reward actually paid (after any
    /// late-claim decay), `penalty` the early-exit penalty charged.
    Withdraw {
        who: AccountId,
        deposit: Amount,
        reward: Amount,
        penalty: Amount,
    },
    /// Principal was added to a still-locked stake. `amount` is the
    /// extra deposit; `new_duration` the remaining time to the original
    /// maturity instant.
    StakeUpgraded {
        depositor: AccountId,
        amount: Amount,
        new_duration: u64,
    },
    /// An abandoned stake was reclaimed; its value was folded back into
    /// the pool's reward accumulator.
    StakeReaped {
        owner: AccountId,
        index: u64,
        reclaimed: Amount,
    },
    /// Queued penalties were flushed to the external wallets.
    PenaltyDistributed { total: Amount },
}
