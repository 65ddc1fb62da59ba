//! End-to-end and invariant test suite for the Tidelock staking engine.
//!
//! Full multi-staker lifecycles run against a [`MemoryTokenLedger`], and
//! the accounting invariants (share conservation, price monotonicity,
//! token conservation up to integer-division dust) are checked under
//! randomized operation sequences.
//!
//! [`MemoryTokenLedger`]: tidelock_core::ledger::MemoryTokenLedger

pub mod helpers;
