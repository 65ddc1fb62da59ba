//! Stake records and the per-owner stake store.
//!
//! Stakes live in an append-only vector per owner. Indices are assigned
//! in insertion order and never recycled: a closed stake is tombstoned
//! in place (`alive = false`, amount and shares zeroed) so external
//! references by `(owner, index)` stay stable for the pool's lifetime.

use std::collections::HashMap;

use primitive_types::U256;
use tidelock_core::error::PoolError;
use tidelock_core::types::{AccountId, Amount, Timestamp};

/// One depositor's locked position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stake {
    /// Principal currently locked. Zeroed on withdraw/reap.
    pub amount: Amount,
    /// Lock length in seconds from `start_ts`.
    pub duration: u64,
    /// Lock start time. Reset by an upgrade.
    pub start_ts: Timestamp,
    /// Shares from principal alone, COEF²-scaled.
    pub base_shares: U256,
    /// Duration-bonus shares.
    pub l_bonus_shares: U256,
    /// Size-bonus shares.
    pub b_bonus_shares: U256,
    /// Pool lambda at the last settlement of this stake.
    pub last_lambda: U256,
    /// Reward already computed and banked for this stake.
    pub assigned_reward: Amount,
    /// Flips false exactly once, on withdraw or reap.
    pub alive: bool,
}

impl Stake {
    /// Base plus both bonus components.
    ///
    /// Cannot wrap: each component is bounded well below `U256::MAX / 4`
    /// by construction in the share calculator.
    pub fn total_shares(&self) -> U256 {
        self.base_shares + self.l_bonus_shares + self.b_bonus_shares
    }

    /// Maturity instant, widened so `start_ts + duration` cannot wrap.
    pub fn maturity(&self) -> u128 {
        self.start_ts as u128 + self.duration as u128
    }

    pub fn is_matured(&self, now: Timestamp) -> bool {
        now as u128 >= self.maturity()
    }

    /// Instant after which the stake counts as abandoned: maturity plus
    /// `dormancy_multiplier` times the original lock duration.
    pub fn dormant_from(&self, dormancy_multiplier: u64) -> u128 {
        self.maturity() + self.duration as u128 * dormancy_multiplier as u128
    }

    /// Tombstone this stake: dead, no principal, no shares, no reward.
    pub(crate) fn close(&mut self) {
        self.alive = false;
        self.amount = 0;
        self.base_shares = U256::zero();
        self.l_bonus_shares = U256::zero();
        self.b_bonus_shares = U256::zero();
        self.assigned_reward = 0;
    }
}

/// Append-only map of owner to stake list.
#[derive(Debug, Clone, Default)]
pub struct StakeStore {
    stakes: HashMap<AccountId, Vec<Stake>>,
}

impl StakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stake for `owner`, returning its stable index.
    pub fn append(&mut self, owner: &AccountId, stake: Stake) -> u64 {
        let list = self.stakes.entry(*owner).or_default();
        list.push(stake);
        (list.len() - 1) as u64
    }

    /// Look up a stake, dead or alive.
    pub fn get(&self, owner: &AccountId, index: u64) -> Result<&Stake, PoolError> {
        self.stakes
            .get(owner)
            .and_then(|list| list.get(index as usize))
            .ok_or(PoolError::NoSuchStake)
    }

    /// Look up a stake that must still be alive.
    pub fn get_alive(&self, owner: &AccountId, index: u64) -> Result<&Stake, PoolError> {
        let stake = self.get(owner, index)?;
        if !stake.alive {
            return Err(PoolError::StakeDeleted);
        }
        Ok(stake)
    }

    pub fn get_alive_mut(
        &mut self,
        owner: &AccountId,
        index: u64,
    ) -> Result<&mut Stake, PoolError> {
        let stake = self
            .stakes
            .get_mut(owner)
            .and_then(|list| list.get_mut(index as usize))
            .ok_or(PoolError::NoSuchStake)?;
        if !stake.alive {
            return Err(PoolError::StakeDeleted);
        }
        Ok(stake)
    }

    /// Number of stakes (alive or dead) recorded for `owner`.
    pub fn count(&self, owner: &AccountId) -> u64 {
        self.stakes.get(owner).map_or(0, |list| list.len() as u64)
    }

    /// All stakes of one owner, in insertion order.
    pub fn stakes_of(&self, owner: &AccountId) -> &[Stake] {
        self.stakes.get(owner).map_or(&[], Vec::as_slice)
    }

    /// Iterate over every stake in the store.
    pub fn iter(&self) -> impl Iterator<Item = (&AccountId, u64, &Stake)> {
        self.stakes.iter().flat_map(|(owner, list)| {
            list.iter()
                .enumerate()
                .map(move |(i, stake)| (owner, i as u64, stake))
        })
    }

    /// Literal sum of all alive stakes' total shares. The pool's cached
    /// `totalShares` must equal this between operations.
    pub fn alive_shares(&self) -> U256 {
        self.iter()
            .filter(|(_, _, stake)| stake.alive)
            .fold(U256::zero(), |acc, (_, _, stake)| acc + stake.total_shares())
    }
}
