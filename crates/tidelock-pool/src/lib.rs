//! Time-locked staking pool accounting engine.
//!
//! Stakers lock tokens for a chosen duration and receive shares: a base
//! allocation scaled by the pool's ratcheting share price, plus bonus
//! shares for size and for lock length. Early exits forfeit a
//! time-proportional slice of the principal; half of every penalty is
//! folded into a constant-time reward accumulator (lambda) that pays
//! the remaining stakers in proportion to their shares.
//!
//! The engine is deliberately inert: it never reads a clock and never
//! talks to the outside world except through the [`TokenLedger`] trait
//! its caller supplies. Every operation takes `now` as an argument, so
//! hosts and tests drive time explicitly.
//!
//! ```
//! use primitive_types::U256;
//! use tidelock_core::constants::{COEF, YEAR_SECS};
//! use tidelock_core::ledger::{MemoryTokenLedger, TokenLedger};
//! use tidelock_core::types::{AccountId, PoolParams, TokenId};
//! use tidelock_pool::PoolRegistry;
//!
//! let acct = |n: u8| {
//!     let mut b = [0u8; 32];
//!     b[31] = n;
//!     AccountId(b)
//! };
//! let (alice, custody) = (acct(1), acct(200));
//! let params = PoolParams::new(
//!     TokenId([1u8; 32]),
//!     U256::from(COEF),
//!     100_000 * COEF,
//!     10 * YEAR_SECS,
//!     10,
//!     200,
//!     [10, 10, 10, 20, 50],
//!     [acct(101), acct(102), acct(103), acct(104), custody],
//! );
//!
//! let mut ledger = MemoryTokenLedger::new();
//! ledger.mint(&alice, COEF);
//! ledger.approve(&alice, &custody, u128::MAX);
//!
//! let mut registry = PoolRegistry::new();
//! let id = registry.create_pool(params)?;
//! let pool = registry.pool_mut(id)?;
//! let index = pool.deposit(&mut ledger, &alice, COEF, YEAR_SECS, 0)?;
//! let outcome = pool.withdraw(&mut ledger, &alice, index, YEAR_SECS)?;
//! assert_eq!(outcome.paid_out, COEF);
//! # Ok::<(), tidelock_core::error::TidelockError>(())
//! ```

pub mod math;
pub mod penalty;
pub mod pool;
pub mod price;
pub mod registry;
pub mod reward;
pub mod shares;
pub mod stake;

pub use pool::{Pool, WithdrawOutcome};
pub use registry::PoolRegistry;
pub use shares::ShareBreakdown;
pub use stake::{Stake, StakeStore};

pub use tidelock_core::ledger::TokenLedger;
