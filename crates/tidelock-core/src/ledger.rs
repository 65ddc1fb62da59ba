//! Token ledger interface and in-memory implementation.
//!
//! The pool engine treats the fungible-token ledger as an external
//! collaborator with standard balance/transfer/approve semantics.
//! [`MemoryTokenLedger`] is suitable for testing; a production
//! integration adapts the real asset ledger behind the same trait.

use std::collections::HashMap;

use crate::error::LedgerError;
use crate::types::{AccountId, Amount};

/// Balance and transfer operations of a single fungible token.
///
/// All operations either complete fully or fail with no effect.
/// Not thread-safe; callers serialize access, matching the engine's
/// one-operation-at-a-time execution model.
pub trait TokenLedger {
    /// Current balance of `account`.
    fn balance_of(&self, account: &AccountId) -> Amount;

    /// Set the amount `spender` may pull from `owner` via
    /// [`transfer_from`](Self::transfer_from).
    fn approve(&mut self, owner: &AccountId, spender: &AccountId, amount: Amount);

    /// Remaining allowance from `owner` to `spender`.
    fn allowance(&self, owner: &AccountId, spender: &AccountId) -> Amount;

    /// Move `amount` from `from` to `to`.
    fn transfer(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        amount: Amount,
    ) -> Result<(), LedgerError>;

    /// Move `amount` from `from` to `to` on behalf of `spender`,
    /// consuming allowance.
    fn transfer_from(
        &mut self,
        spender: &AccountId,
        from: &AccountId,
        to: &AccountId,
        amount: Amount,
    ) -> Result<(), LedgerError>;
}

/// In-memory token ledger for tests and simulations.
#[derive(Debug, Clone, Default)]
pub struct MemoryTokenLedger {
    balances: HashMap<AccountId, Amount>,
    allowances: HashMap<(AccountId, AccountId), Amount>,
}

impl MemoryTokenLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit `amount` to `account` out of thin air.
    pub fn mint(&mut self, account: &AccountId, amount: Amount) {
        *self.balances.entry(*account).or_insert(0) += amount;
    }

    /// Sum of all balances.
    pub fn total_supply(&self) -> Amount {
        self.balances.values().sum()
    }

    fn debit(&mut self, from: &AccountId, amount: Amount) -> Result<(), LedgerError> {
        let have = self.balance_of(from);
        if have < amount {
            return Err(LedgerError::InsufficientBalance { have, need: amount });
        }
        self.balances.insert(*from, have - amount);
        Ok(())
    }
}

impl TokenLedger for MemoryTokenLedger {
    fn balance_of(&self, account: &AccountId) -> Amount {
        self.balances.get(account).copied().unwrap_or(0)
    }

    fn approve(&mut self, owner: &AccountId, spender: &AccountId, amount: Amount) {
        self.allowances.insert((*owner, *spender), amount);
    }

    fn allowance(&self, owner: &AccountId, spender: &AccountId) -> Amount {
        self.allowances.get(&(*owner, *spender)).copied().unwrap_or(0)
    }

    fn transfer(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        self.debit(from, amount)?;
        *self.balances.entry(*to).or_insert(0) += amount;
        Ok(())
    }

    fn transfer_from(
        &mut self,
        spender: &AccountId,
        from: &AccountId,
        to: &AccountId,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        let allowed = self.allowance(from, spender);
        if allowed < amount {
            return Err(LedgerError::InsufficientAllowance { have: allowed, need: amount });
        }
        self.debit(from, amount)?;
        self.allowances.insert((*from, *spender), allowed - amount);
        *self.balances.entry(*to).or_insert(0) += amount;
        Ok(())
    }
}
