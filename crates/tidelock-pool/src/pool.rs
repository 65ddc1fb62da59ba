//! Pool lifecycle orchestration.
//!
//! One [`Pool`] owns the singleton accounting state for a single token:
//! the share total, the lambda reward accumulator, the price ratchet,
//! the per-owner stake store, and the queued penalty payouts. Every
//! public operation executes as one indivisible unit: all validation and
//! fallible arithmetic complete before the first state mutation, inbound
//! token pulls happen before the commit, and outbound transfers only
//! after the internal ledger state is final.

use primitive_types::U256;
use tracing::{debug, info};

use tidelock_core::error::{PoolError, RegistryError};
use tidelock_core::events::PoolEvent;
use tidelock_core::ledger::TokenLedger;
use tidelock_core::types::{
    AccountId, Amount, PoolParams, Timestamp, TokenId, PENALTY_RECIPIENTS,
};

use crate::registry::validate_params;
use crate::stake::{Stake, StakeStore};
use crate::{penalty, price, reward, shares};

/// Result of a withdrawal, as paid to the staker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WithdrawOutcome {
    /// Principal that was locked.
    pub deposit: Amount,
    /// Reward actually paid, after any late-claim decay.
    pub reward: Amount,
    /// Early-exit penalty charged.
    pub penalty: Amount,
    /// Tokens transferred to the staker: `deposit - penalty + reward`.
    pub paid_out: Amount,
}

/// A single token's staking pool.
pub struct Pool {
    params: PoolParams,
    /// Price ratchet, COEF-scaled. Starts at `initial_price`, never drops.
    current_price: U256,
    /// Cached sum of all alive stakes' shares, COEF²-scaled.
    total_shares: U256,
    /// Cumulative reward-per-share accumulator, COEF²-scaled.
    lambda: U256,
    /// Penalty tokens owed to each external wallet, not yet pushed out.
    pending_penalty: [Amount; PENALTY_RECIPIENTS - 1],
    stakes: StakeStore,
    events: Vec<PoolEvent>,
}

impl Pool {
    /// Build a pool from validated parameters.
    pub fn new(params: PoolParams) -> Result<Self, RegistryError> {
        validate_params(&params)?;
        let current_price = params.initial_price;
        Ok(Self {
            params,
            current_price,
            total_shares: U256::zero(),
            lambda: U256::zero(),
            pending_penalty: [0; PENALTY_RECIPIENTS - 1],
            stakes: StakeStore::new(),
            events: Vec::new(),
        })
    }

    // --- accessors ---

    pub fn params(&self) -> &PoolParams {
        &self.params
    }

    pub fn token(&self) -> TokenId {
        self.params.token
    }

    pub fn initial_price(&self) -> U256 {
        self.params.initial_price
    }

    pub fn current_price(&self) -> U256 {
        self.current_price
    }

    pub fn total_shares(&self) -> U256 {
        self.total_shares
    }

    pub fn lambda(&self) -> U256 {
        self.lambda
    }

    /// Queued penalty amounts per external wallet.
    pub fn pending_penalty(&self) -> [Amount; PENALTY_RECIPIENTS - 1] {
        self.pending_penalty
    }

    pub fn pending_penalty_total(&self) -> Amount {
        self.pending_penalty.iter().sum()
    }

    pub fn stakes(&self) -> &StakeStore {
        &self.stakes
    }

    pub fn stake(&self, owner: &AccountId, index: u64) -> Result<&Stake, PoolError> {
        self.stakes.get(owner, index)
    }

    /// Drain and return the recorded events, oldest first.
    pub fn drain_events(&mut self) -> Vec<PoolEvent> {
        std::mem::take(&mut self.events)
    }

    // --- views ---

    /// Unclaimed reward of `(owner, index)` at the current lambda.
    /// Zero for closed stakes.
    pub fn get_reward(&self, owner: &AccountId, index: u64) -> Result<Amount, PoolError> {
        let stake = self.stakes.get(owner, index)?;
        reward::pending(self.lambda, stake)
    }

    /// Penalty `(owner, index)` would owe for exiting at `now`.
    pub fn get_penalty(
        &self,
        owner: &AccountId,
        index: u64,
        now: Timestamp,
    ) -> Result<Amount, PoolError> {
        let stake = self.stakes.get(owner, index)?;
        penalty::total(stake.amount, stake.start_ts, stake.duration, now)
    }

    // --- operations ---

    /// Lock `amount` tokens for `duration` seconds. Returns the new
    /// stake's index under `depositor`.
    pub fn deposit(
        &mut self,
        ledger: &mut dyn TokenLedger,
        depositor: &AccountId,
        amount: Amount,
        duration: u64,
        now: Timestamp,
    ) -> Result<u64, PoolError> {
        if amount == 0 {
            return Err(PoolError::DepositCannotBeZero);
        }
        if duration == 0 {
            return Err(PoolError::DurationCannotBeZero);
        }

        let breakdown = shares::compute(amount, duration, self.current_price, &self.params)?;
        let new_total = self
            .total_shares
            .checked_add(breakdown.total())
            .ok_or(PoolError::ArithmeticOverflow)?;

        let custody = self.params.custody();
        ledger.transfer_from(&custody, depositor, &custody, amount)?;

        // Snapshot the current lambda so the stake earns nothing from
        // penalties realized before it existed.
        let index = self.stakes.append(
            depositor,
            Stake {
                amount,
                duration,
                start_ts: now,
                base_shares: breakdown.base,
                l_bonus_shares: breakdown.l_bonus,
                b_bonus_shares: breakdown.b_bonus,
                last_lambda: self.lambda,
                assigned_reward: 0,
                alive: true,
            },
        );
        self.total_shares = new_total;

        info!(depositor = %depositor, amount, duration, index, "deposit");
        self.events.push(PoolEvent::Deposit { depositor: *depositor, amount, duration });
        Ok(index)
    }

    /// Close stake `(owner, index)` and pay out principal minus penalty
    /// plus accrued reward.
    pub fn withdraw(
        &mut self,
        ledger: &mut dyn TokenLedger,
        owner: &AccountId,
        index: u64,
        now: Timestamp,
    ) -> Result<WithdrawOutcome, PoolError> {
        let stake = self.stakes.get_alive(owner, index)?;
        let deposit = stake.amount;
        let stake_shares = stake.total_shares();
        let base_shares = stake.base_shares;

        // 1. Settle the reward at today's lambda; a late claim decays
        //    the reward (never the principal).
        let earned = reward::pending(self.lambda, stake)?;
        let reward_paid = if stake.is_matured(now) {
            reward::late_claim_reward(
                earned,
                stake.maturity(),
                now,
                self.params.free_late_period,
                self.params.late_decay_percent_per_week,
            )
        } else {
            earned
        };

        // 2. Time-proportional penalty, split five ways.
        let total_penalty = penalty::total(deposit, stake.start_ts, stake.duration, now)?;
        let split = penalty::split(total_penalty, &self.params.penalty_percents)?;

        // 3. Remove this stake's shares, then fold the pool's penalty
        //    share into lambda over the remaining stakers only: the
        //    exiting stake must not earn from its own penalty.
        let remaining_shares = self
            .total_shares
            .checked_sub(stake_shares)
            .ok_or(PoolError::ArithmeticOverflow)?;
        let new_lambda = reward::accrue(self.lambda, split.to_pool, remaining_shares)?;

        // 4. Ratchet the price on the realized return per base share.
        let paid_out = deposit
            .checked_sub(total_penalty)
            .and_then(|v| v.checked_add(reward_paid))
            .ok_or(PoolError::ArithmeticOverflow)?;
        let new_price = price::ratchet(self.current_price, paid_out, base_shares)?;
        let mut new_pending = self.pending_penalty;
        for (pending, portion) in new_pending.iter_mut().zip(split.wallets.iter()) {
            *pending = pending
                .checked_add(*portion)
                .ok_or(PoolError::ArithmeticOverflow)?;
        }

        // 5. Commit.
        self.total_shares = remaining_shares;
        self.lambda = new_lambda;
        self.current_price = new_price;
        self.pending_penalty = new_pending;
        self.stakes.get_alive_mut(owner, index)?.close();

        // 6. Pay only after all internal state is final.
        ledger.transfer(&self.params.custody(), owner, paid_out)?;

        info!(
            owner = %owner,
            index,
            deposit,
            reward = reward_paid,
            penalty = total_penalty,
            "withdraw"
        );
        self.events.push(PoolEvent::Withdraw {
            who: *owner,
            deposit,
            reward: reward_paid,
            penalty: total_penalty,
        });

        Ok(WithdrawOutcome { deposit, reward: reward_paid, penalty: total_penalty, paid_out })
    }

    /// Add `extra_amount` to a still-locked stake. The maturity instant
    /// is preserved; shares are recomputed for the combined principal
    /// over the remaining lock at today's price, and the reward accrued
    /// so far is banked so the fresh lambda snapshot cannot double-count.
    pub fn upgrade_stake(
        &mut self,
        ledger: &mut dyn TokenLedger,
        owner: &AccountId,
        index: u64,
        extra_amount: Amount,
        now: Timestamp,
    ) -> Result<(), PoolError> {
        if extra_amount == 0 {
            return Err(PoolError::DepositCannotBeZero);
        }
        let stake = self.stakes.get_alive(owner, index)?;
        if stake.is_matured(now) {
            return Err(PoolError::StakeMatured);
        }

        let banked = reward::pending(self.lambda, stake)?;
        // fits in u64: bounded by the original duration
        let remaining = (stake.maturity() - now as u128) as u64;
        let new_amount = stake
            .amount
            .checked_add(extra_amount)
            .ok_or(PoolError::ArithmeticOverflow)?;

        let breakdown = shares::compute(new_amount, remaining, self.current_price, &self.params)?;
        let new_total = self
            .total_shares
            .checked_sub(stake.total_shares())
            .and_then(|v| v.checked_add(breakdown.total()))
            .ok_or(PoolError::ArithmeticOverflow)?;

        let custody = self.params.custody();
        ledger.transfer_from(&custody, owner, &custody, extra_amount)?;

        let lambda = self.lambda;
        let stake = self.stakes.get_alive_mut(owner, index)?;
        // settle before the share overwrite so the old share count earns
        // its last accrual
        reward::settle(stake, lambda)?;
        stake.amount = new_amount;
        stake.duration = remaining;
        stake.start_ts = now;
        stake.base_shares = breakdown.base;
        stake.l_bonus_shares = breakdown.l_bonus;
        stake.b_bonus_shares = breakdown.b_bonus;
        self.total_shares = new_total;

        info!(owner = %owner, index, extra_amount, remaining, banked, "stake upgraded");
        self.events.push(PoolEvent::StakeUpgraded {
            depositor: *owner,
            amount: extra_amount,
            new_duration: remaining,
        });
        Ok(())
    }

    /// Reclaim an abandoned stake. Callable by anyone once the stake has
    /// sat unclaimed for `dormancy_multiplier` lock durations past its
    /// maturity. The owner receives nothing: the stake's principal and
    /// unclaimed reward are folded into lambda for the remaining
    /// stakers, and its shares stop diluting the pool.
    pub fn remove_dead_stake(
        &mut self,
        owner: &AccountId,
        index: u64,
        now: Timestamp,
    ) -> Result<(), PoolError> {
        let stake = self.stakes.get_alive(owner, index)?;
        if (now as u128) < stake.dormant_from(self.params.dormancy_multiplier) {
            return Err(PoolError::StakeAlive);
        }

        let earned = reward::pending(self.lambda, stake)?;
        let reclaimed = stake
            .amount
            .checked_add(earned)
            .ok_or(PoolError::ArithmeticOverflow)?;
        let remaining_shares = self
            .total_shares
            .checked_sub(stake.total_shares())
            .ok_or(PoolError::ArithmeticOverflow)?;
        let new_lambda = reward::accrue(self.lambda, reclaimed, remaining_shares)?;

        self.total_shares = remaining_shares;
        self.lambda = new_lambda;
        self.stakes.get_alive_mut(owner, index)?.close();

        info!(owner = %owner, index, reclaimed, "dead stake removed");
        self.events.push(PoolEvent::StakeReaped { owner: *owner, index, reclaimed });
        Ok(())
    }

    /// Flush queued penalties to the four external wallets. Returns the
    /// total flushed.
    pub fn distribute_penalty(
        &mut self,
        ledger: &mut dyn TokenLedger,
    ) -> Result<Amount, PoolError> {
        let owed = self.pending_penalty;
        let total: Amount = owed.iter().sum();
        if total == 0 {
            return Ok(0);
        }
        self.pending_penalty = [0; PENALTY_RECIPIENTS - 1];

        let custody = self.params.custody();
        for (wallet, amount) in self.params.wallets.iter().zip(owed.iter()) {
            if *amount > 0 {
                ledger.transfer(&custody, wallet, *amount)?;
            }
        }

        debug!(total, "penalty distributed");
        self.events.push(PoolEvent::PenaltyDistributed { total });
        Ok(total)
    }

    /// Swap the distribution wallets. Administrative; the caller is
    /// responsible for access control.
    pub fn set_wallets(
        &mut self,
        wallets: [AccountId; PENALTY_RECIPIENTS],
    ) -> Result<(), RegistryError> {
        if wallets.iter().any(AccountId::is_zero) {
            return Err(RegistryError::WalletCannotBeZero);
        }
        self.params.wallets = wallets;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tidelock_core::constants::{coef_squared, COEF, WEEK_SECS, YEAR_SECS};
    use tidelock_core::ledger::MemoryTokenLedger;
    use crate::math::{mul_div, to_amount};

    const ETHER: u128 = COEF;

    fn acct(n: u8) -> AccountId {
        let mut bytes = [0u8; 32];
        bytes[31] = n;
        AccountId(bytes)
    }

    fn wallets() -> [AccountId; 5] {
        [acct(101), acct(102), acct(103), acct(104), acct(200)]
    }

    fn params() -> PoolParams {
        PoolParams::new(
            TokenId([1u8; 32]),
            U256::from(COEF),
            100_000 * ETHER,
            10 * YEAR_SECS,
            10,
            200,
            [10, 10, 10, 20, 50],
            wallets(),
        )
    }

    /// Pool plus a ledger with `who` funded and approved.
    fn setup(funded: &[(AccountId, Amount)]) -> (Pool, MemoryTokenLedger) {
        let pool = Pool::new(params()).unwrap();
        let mut ledger = MemoryTokenLedger::new();
        for (account, amount) in funded {
            ledger.mint(account, *amount);
            ledger.approve(account, &acct(200), Amount::MAX);
        }
        (pool, ledger)
    }

    fn assert_share_invariant(pool: &Pool) {
        assert_eq!(
            pool.total_shares(),
            pool.stakes().alive_shares(),
            "cached totalShares diverged from the literal sum"
        );
    }

    // --- deposit ---

    #[test]
    fn deposit_zero_amount_rejected() {
        let (mut pool, mut ledger) = setup(&[(acct(1), ETHER)]);
        assert_eq!(
            pool.deposit(&mut ledger, &acct(1), 0, YEAR_SECS, 0),
            Err(PoolError::DepositCannotBeZero)
        );
    }

    #[test]
    fn deposit_zero_duration_rejected() {
        let (mut pool, mut ledger) = setup(&[(acct(1), ETHER)]);
        assert_eq!(
            pool.deposit(&mut ledger, &acct(1), ETHER, 0, 0),
            Err(PoolError::DurationCannotBeZero)
        );
    }

    #[test]
    fn deposit_records_stake_and_shares() {
        let (mut pool, mut ledger) = setup(&[(acct(1), ETHER)]);
        let index = pool.deposit(&mut ledger, &acct(1), ETHER, YEAR_SECS, 0).unwrap();
        assert_eq!(index, 0);

        let expected =
            shares::compute(ETHER, YEAR_SECS, U256::from(COEF), pool.params()).unwrap();
        let stake = pool.stake(&acct(1), 0).unwrap();
        assert_eq!(stake.base_shares, expected.base);
        assert_eq!(stake.l_bonus_shares, expected.l_bonus);
        assert_eq!(stake.b_bonus_shares, expected.b_bonus);
        assert_eq!(stake.amount, ETHER);
        assert_eq!(stake.duration, YEAR_SECS);
        assert_eq!(stake.last_lambda, U256::zero());
        assert_eq!(stake.assigned_reward, 0);

        assert_eq!(pool.total_shares(), expected.total());
        assert_eq!(pool.lambda(), U256::zero());
        assert_eq!(pool.current_price(), U256::from(COEF));
        assert_eq!(ledger.balance_of(&acct(200)), ETHER);
        assert_eq!(ledger.balance_of(&acct(1)), 0);
        assert_share_invariant(&pool);

        assert_eq!(
            pool.drain_events(),
            vec![PoolEvent::Deposit { depositor: acct(1), amount: ETHER, duration: YEAR_SECS }]
        );
    }

    #[test]
    fn deposit_without_allowance_fails_cleanly() {
        let mut pool = Pool::new(params()).unwrap();
        let mut ledger = MemoryTokenLedger::new();
        ledger.mint(&acct(1), ETHER);
        let err = pool.deposit(&mut ledger, &acct(1), ETHER, YEAR_SECS, 0).unwrap_err();
        assert!(matches!(err, PoolError::Ledger(_)));
        assert_eq!(pool.total_shares(), U256::zero());
        assert_eq!(pool.stakes().count(&acct(1)), 0);
    }

    #[test]
    fn three_depositors_sum_their_shares() {
        let (mut pool, mut ledger) =
            setup(&[(acct(1), ETHER), (acct(2), 2 * ETHER), (acct(3), 4 * ETHER)]);
        pool.deposit(&mut ledger, &acct(1), ETHER, YEAR_SECS, 0).unwrap();
        pool.deposit(&mut ledger, &acct(2), 2 * ETHER, 2 * YEAR_SECS, 0).unwrap();
        pool.deposit(&mut ledger, &acct(3), 4 * ETHER, 4 * YEAR_SECS, 0).unwrap();

        let p = params();
        let s1 = shares::compute(ETHER, YEAR_SECS, U256::from(COEF), &p).unwrap();
        let s2 = shares::compute(2 * ETHER, 2 * YEAR_SECS, U256::from(COEF), &p).unwrap();
        let s3 = shares::compute(4 * ETHER, 4 * YEAR_SECS, U256::from(COEF), &p).unwrap();
        assert_eq!(pool.total_shares(), s1.total() + s2.total() + s3.total());
        assert_share_invariant(&pool);
    }

    // --- withdraw ---

    /// alice 1 tok / 1y, bob 2 tok / 2y, charlie 4 tok / 4y, all at t=0.
    fn three_staker_pool() -> (Pool, MemoryTokenLedger) {
        let (mut pool, mut ledger) =
            setup(&[(acct(1), ETHER), (acct(2), 2 * ETHER), (acct(3), 4 * ETHER)]);
        pool.deposit(&mut ledger, &acct(1), ETHER, YEAR_SECS, 0).unwrap();
        pool.deposit(&mut ledger, &acct(2), 2 * ETHER, 2 * YEAR_SECS, 0).unwrap();
        pool.deposit(&mut ledger, &acct(3), 4 * ETHER, 4 * YEAR_SECS, 0).unwrap();
        pool.drain_events();
        (pool, ledger)
    }

    #[test]
    fn withdraw_unknown_index_fails() {
        let (mut pool, mut ledger) = three_staker_pool();
        assert_eq!(
            pool.withdraw(&mut ledger, &acct(2), 1, YEAR_SECS),
            Err(PoolError::NoSuchStake)
        );
    }

    #[test]
    fn withdraw_twice_fails_with_stake_deleted() {
        let (mut pool, mut ledger) = three_staker_pool();
        let now = YEAR_SECS + YEAR_SECS / 2;
        pool.withdraw(&mut ledger, &acct(2), 0, now).unwrap();
        assert_eq!(
            pool.withdraw(&mut ledger, &acct(2), 0, now),
            Err(PoolError::StakeDeleted)
        );
    }

    #[test]
    fn early_withdraw_charges_time_proportional_penalty() {
        let (mut pool, mut ledger) = three_staker_pool();
        let now = YEAR_SECS + YEAR_SECS / 2; // bob is 1.5y into a 2y lock

        let outcome = pool.withdraw(&mut ledger, &acct(2), 0, now).unwrap();
        let expected_penalty = 2 * ETHER / 4; // amount * remaining/duration
        assert_eq!(outcome.penalty, expected_penalty);
        assert_eq!(outcome.reward, 0); // nobody exited before bob
        assert_eq!(outcome.deposit, 2 * ETHER);
        assert_eq!(outcome.paid_out, 2 * ETHER - expected_penalty);
        assert_eq!(ledger.balance_of(&acct(2)), 2 * ETHER - expected_penalty);

        // pool share of the penalty: 50% plus flooring slack (none here)
        let split = penalty::split(expected_penalty, &pool.params().penalty_percents).unwrap();

        // lambda accrued over the remaining stakers only
        let p = params();
        let s1 = shares::compute(ETHER, YEAR_SECS, U256::from(COEF), &p).unwrap();
        let s3 = shares::compute(4 * ETHER, 4 * YEAR_SECS, U256::from(COEF), &p).unwrap();
        let remaining = s1.total() + s3.total();
        assert_eq!(pool.total_shares(), remaining);
        assert_eq!(
            pool.lambda(),
            mul_div(U256::from(split.to_pool), coef_squared(), remaining).unwrap()
        );

        // external shares queued, not yet transferred
        assert_eq!(pool.pending_penalty(), split.wallets);
        assert_eq!(ledger.balance_of(&acct(101)), 0);
        assert_share_invariant(&pool);

        assert_eq!(
            pool.drain_events(),
            vec![PoolEvent::Withdraw {
                who: acct(2),
                deposit: 2 * ETHER,
                reward: 0,
                penalty: expected_penalty,
            }]
        );
    }

    #[test]
    fn withdraw_of_enormous_stake_splits_penalty_without_wrap() {
        // a penalty far above u128::MAX / 100 must not wrap the split
        let whale = Amount::MAX / 2;
        let (mut pool, mut ledger) = setup(&[(acct(1), ETHER), (acct(7), whale)]);
        pool.deposit(&mut ledger, &acct(1), ETHER, YEAR_SECS, 0).unwrap();
        pool.deposit(&mut ledger, &acct(7), whale, YEAR_SECS, 0).unwrap();

        // immediate exit: the whole principal is forfeited
        let outcome = pool.withdraw(&mut ledger, &acct(7), 0, 0).unwrap();
        assert_eq!(outcome.penalty, whale);
        assert_eq!(outcome.reward, 0);
        assert_eq!(outcome.paid_out, 0);

        let split = penalty::split(whale, &pool.params().penalty_percents).unwrap();
        assert_eq!(pool.pending_penalty(), split.wallets);
        // the pool share landed in lambda for the survivor
        let alice_reward = pool.get_reward(&acct(1), 0).unwrap();
        assert!(alice_reward <= split.to_pool);
        assert!(alice_reward >= split.to_pool - 1_000);
        assert_share_invariant(&pool);
    }

    #[test]
    fn matured_withdraw_pays_full_principal() {
        let (mut pool, mut ledger) = three_staker_pool();
        let outcome = pool.withdraw(&mut ledger, &acct(2), 0, 2 * YEAR_SECS).unwrap();
        assert_eq!(outcome.penalty, 0);
        assert_eq!(outcome.reward, 0);
        assert_eq!(outcome.paid_out, 2 * ETHER);
        assert_eq!(pool.lambda(), U256::zero());
        assert_eq!(pool.pending_penalty_total(), 0);
        assert_share_invariant(&pool);
    }

    #[test]
    fn survivors_split_penalty_by_shares() {
        let (mut pool, mut ledger) = three_staker_pool();
        let now = YEAR_SECS + YEAR_SECS / 2;
        pool.withdraw(&mut ledger, &acct(2), 0, now).unwrap();

        let split = penalty::split(ETHER / 2, &pool.params().penalty_percents).unwrap();
        let p = params();
        let s1 = shares::compute(ETHER, YEAR_SECS, U256::from(COEF), &p).unwrap();
        let s3 = shares::compute(4 * ETHER, 4 * YEAR_SECS, U256::from(COEF), &p).unwrap();
        let remaining = s1.total() + s3.total();
        let lambda = mul_div(U256::from(split.to_pool), coef_squared(), remaining).unwrap();

        let expect = |shares: U256| {
            to_amount(mul_div(lambda, shares, coef_squared()).unwrap()).unwrap()
        };
        assert_eq!(pool.get_reward(&acct(1), 0).unwrap(), expect(s1.total()));
        assert_eq!(pool.get_reward(&acct(3), 0).unwrap(), expect(s3.total()));
        // the exiting stake earned nothing from its own penalty
        assert_eq!(pool.get_reward(&acct(2), 0).unwrap(), 0);
    }

    #[test]
    fn late_depositor_gets_no_prior_reward() {
        let (mut pool, mut ledger) = three_staker_pool();
        let now = YEAR_SECS + YEAR_SECS / 2;
        pool.withdraw(&mut ledger, &acct(2), 0, now).unwrap();

        ledger.mint(&acct(4), ETHER);
        ledger.approve(&acct(4), &acct(200), Amount::MAX);
        pool.deposit(&mut ledger, &acct(4), ETHER, YEAR_SECS, now + 1).unwrap();
        assert_eq!(pool.get_reward(&acct(4), 0).unwrap(), 0);
    }

    #[test]
    fn reward_paid_on_withdraw_after_other_exit() {
        let (mut pool, mut ledger) = three_staker_pool();
        let bob_exit = YEAR_SECS / 2;
        pool.withdraw(&mut ledger, &acct(2), 0, bob_exit).unwrap();
        let alice_reward = pool.get_reward(&acct(1), 0).unwrap();
        assert!(alice_reward > 0);

        // alice withdraws right at maturity: principal plus her reward
        let outcome = pool.withdraw(&mut ledger, &acct(1), 0, YEAR_SECS).unwrap();
        assert_eq!(outcome.reward, alice_reward);
        assert_eq!(outcome.paid_out, ETHER + alice_reward);
    }

    #[test]
    fn late_claim_decays_reward_not_principal() {
        let (mut pool, mut ledger) = three_staker_pool();
        pool.withdraw(&mut ledger, &acct(2), 0, YEAR_SECS / 2).unwrap();
        let charlie_reward = pool.get_reward(&acct(3), 0).unwrap();
        assert!(charlie_reward > 0);

        // two full weeks past the 4-year maturity: 4% of the reward gone
        let now = 4 * YEAR_SECS + 2 * WEEK_SECS + 1;
        let outcome = pool.withdraw(&mut ledger, &acct(3), 0, now).unwrap();
        assert_eq!(outcome.penalty, 0);
        assert_eq!(outcome.reward, charlie_reward - charlie_reward * 4 / 100);
        assert_eq!(outcome.paid_out, 4 * ETHER + outcome.reward);
    }

    #[test]
    fn very_late_claim_pays_principal_only() {
        let (mut pool, mut ledger) = three_staker_pool();
        pool.withdraw(&mut ledger, &acct(2), 0, YEAR_SECS / 2).unwrap();
        assert!(pool.get_reward(&acct(3), 0).unwrap() > 0);

        let now = 4 * YEAR_SECS + 51 * WEEK_SECS;
        let outcome = pool.withdraw(&mut ledger, &acct(3), 0, now).unwrap();
        assert_eq!(outcome.reward, 0);
        assert_eq!(outcome.paid_out, 4 * ETHER);
    }

    #[test]
    fn price_ratchets_up_on_profitable_exit() {
        let (mut pool, mut ledger) = three_staker_pool();
        pool.withdraw(&mut ledger, &acct(2), 0, YEAR_SECS / 2).unwrap();
        assert_eq!(pool.current_price(), U256::from(COEF));

        // charlie exits at maturity with reward: realized > 1 token per
        // base share, so the ratchet moves
        let charlie = pool.stake(&acct(3), 0).unwrap();
        let base = charlie.base_shares;
        let outcome = pool.withdraw(&mut ledger, &acct(3), 0, 4 * YEAR_SECS).unwrap();
        let expected =
            mul_div(U256::from(outcome.paid_out), coef_squared(), base).unwrap();
        assert_eq!(pool.current_price(), expected);
        assert!(pool.current_price() > U256::from(COEF));
    }

    // --- upgrade ---

    #[test]
    fn upgrade_zero_extra_rejected() {
        let (mut pool, mut ledger) = three_staker_pool();
        assert_eq!(
            pool.upgrade_stake(&mut ledger, &acct(1), 0, 0, 100),
            Err(PoolError::DepositCannotBeZero)
        );
    }

    #[test]
    fn upgrade_unknown_stake_rejected() {
        let (mut pool, mut ledger) = three_staker_pool();
        assert_eq!(
            pool.upgrade_stake(&mut ledger, &acct(1), 5, ETHER, 100),
            Err(PoolError::NoSuchStake)
        );
    }

    #[test]
    fn upgrade_matured_stake_rejected() {
        let (mut pool, mut ledger) = three_staker_pool();
        assert_eq!(
            pool.upgrade_stake(&mut ledger, &acct(1), 0, ETHER, YEAR_SECS),
            Err(PoolError::StakeMatured)
        );
    }

    #[test]
    fn upgrade_withdrawn_stake_rejected() {
        let (mut pool, mut ledger) = three_staker_pool();
        pool.withdraw(&mut ledger, &acct(1), 0, 100).unwrap();
        assert_eq!(
            pool.upgrade_stake(&mut ledger, &acct(1), 0, ETHER, 200),
            Err(PoolError::StakeDeleted)
        );
    }

    #[test]
    fn upgrade_preserves_maturity_and_banks_reward() {
        let (mut pool, mut ledger) = three_staker_pool();
        // bob's early exit seeds a reward for alice
        pool.withdraw(&mut ledger, &acct(2), 0, YEAR_SECS / 2).unwrap();
        let reward_before = pool.get_reward(&acct(1), 0).unwrap();
        assert!(reward_before > 0);

        ledger.mint(&acct(1), 10 * ETHER);
        let now = YEAR_SECS / 2 + YEAR_SECS / 10;
        pool.upgrade_stake(&mut ledger, &acct(1), 0, 10 * ETHER, now).unwrap();

        let stake = pool.stake(&acct(1), 0).unwrap();
        // original maturity instant preserved
        assert_eq!(stake.maturity(), YEAR_SECS as u128);
        assert_eq!(stake.start_ts, now);
        assert_eq!(stake.amount, 11 * ETHER);
        // banked reward survives the snapshot reset without double count
        assert_eq!(stake.assigned_reward, reward_before);
        assert_eq!(stake.last_lambda, pool.lambda());
        assert_eq!(pool.get_reward(&acct(1), 0).unwrap(), reward_before);

        // shares recomputed for the combined amount over the remainder
        let expected = shares::compute(
            11 * ETHER,
            stake.duration,
            pool.current_price(),
            pool.params(),
        )
        .unwrap();
        assert_eq!(stake.base_shares, expected.base);
        assert_eq!(stake.l_bonus_shares, expected.l_bonus);
        assert_eq!(stake.b_bonus_shares, expected.b_bonus);
        assert_share_invariant(&pool);

        let events = pool.drain_events();
        assert!(matches!(
            events.last(),
            Some(PoolEvent::StakeUpgraded { amount, .. }) if *amount == 10 * ETHER
        ));
    }

    #[test]
    fn upgraded_stake_earns_more_going_forward() {
        let (mut pool, mut ledger) = three_staker_pool();

        ledger.mint(&acct(1), ETHER);
        pool.upgrade_stake(&mut ledger, &acct(1), 0, ETHER, YEAR_SECS / 10).unwrap();
        let alice_shares = pool.stake(&acct(1), 0).unwrap().total_shares();
        let charlie_shares = pool.stake(&acct(3), 0).unwrap().total_shares();

        // bob exits early; rewards split by current shares
        pool.withdraw(&mut ledger, &acct(2), 0, YEAR_SECS / 2).unwrap();
        let alice_reward = pool.get_reward(&acct(1), 0).unwrap();
        let charlie_reward = pool.get_reward(&acct(3), 0).unwrap();
        // share-proportionality, up to one unit of flooring per claim
        let lhs = U256::from(alice_reward) * charlie_shares;
        let rhs = U256::from(charlie_reward) * alice_shares;
        let diff = if lhs > rhs { lhs - rhs } else { rhs - lhs };
        assert!(diff <= charlie_shares.max(alice_shares) * U256::from(2u8));
    }

    // --- reap ---

    #[test]
    fn reap_before_dormancy_fails() {
        let (mut pool, _ledger) = three_staker_pool();
        // alice matures at 1y; dormancy needs 2 more lock lengths
        assert_eq!(
            pool.remove_dead_stake(&acct(1), 0, 2 * YEAR_SECS),
            Err(PoolError::StakeAlive)
        );
    }

    #[test]
    fn reap_after_dormancy_reclaims_for_the_pool() {
        let (mut pool, mut ledger) = three_staker_pool();
        let lambda_before = pool.lambda();
        let custody_before = ledger.balance_of(&acct(200));

        // alice's 1y stake is reapable from t = 3y
        pool.remove_dead_stake(&acct(1), 0, 3 * YEAR_SECS).unwrap();

        // owner got nothing; tokens stayed in custody
        assert_eq!(ledger.balance_of(&acct(1)), 0);
        assert_eq!(ledger.balance_of(&acct(200)), custody_before);
        // shares removed, value credited to the survivors
        assert!(pool.lambda() > lambda_before);
        assert_eq!(pool.stake(&acct(1), 0).unwrap().amount, 0);
        assert!(!pool.stake(&acct(1), 0).unwrap().alive);
        assert_share_invariant(&pool);

        // the survivors can actually claim the reclaimed value
        let bob = pool.get_reward(&acct(2), 0).unwrap();
        let charlie = pool.get_reward(&acct(3), 0).unwrap();
        assert!(bob + charlie <= ETHER);
        assert!(bob + charlie >= ETHER - 1_000);
    }

    #[test]
    fn reap_dead_stake_twice_fails() {
        let (mut pool, _ledger) = three_staker_pool();
        pool.remove_dead_stake(&acct(1), 0, 3 * YEAR_SECS).unwrap();
        assert_eq!(
            pool.remove_dead_stake(&acct(1), 0, 3 * YEAR_SECS),
            Err(PoolError::StakeDeleted)
        );
    }

    #[test]
    fn reaper_may_be_anyone() {
        // remove_dead_stake takes no caller identity at all, so the
        // engine cannot gate who reaps
        let (mut pool, _ledger) = three_staker_pool();
        assert!(pool.remove_dead_stake(&acct(1), 0, 3 * YEAR_SECS).is_ok());
    }

    // --- distribute ---

    #[test]
    fn distribute_flushes_to_wallets() {
        let (mut pool, mut ledger) = three_staker_pool();
        pool.withdraw(&mut ledger, &acct(2), 0, YEAR_SECS + YEAR_SECS / 2).unwrap();
        let owed = pool.pending_penalty();
        assert!(owed.iter().any(|v| *v > 0));

        let flushed = pool.distribute_penalty(&mut ledger).unwrap();
        assert_eq!(flushed, owed.iter().sum::<Amount>());
        for (wallet, amount) in wallets().iter().take(4).zip(owed.iter()) {
            assert_eq!(ledger.balance_of(wallet), *amount);
        }
        assert_eq!(pool.pending_penalty_total(), 0);

        // idempotent once empty
        assert_eq!(pool.distribute_penalty(&mut ledger).unwrap(), 0);
    }

    // --- wallets ---

    #[test]
    fn set_wallets_validates_and_swaps() {
        let (mut pool, _ledger) = three_staker_pool();
        let mut swapped = wallets();
        swapped[0] = acct(111);
        pool.set_wallets(swapped).unwrap();
        assert_eq!(pool.params().wallets[0], acct(111));

        swapped[1] = AccountId::ZERO;
        assert_eq!(pool.set_wallets(swapped), Err(RegistryError::WalletCannotBeZero));
    }

    // --- views ---

    #[test]
    fn get_penalty_projects_without_mutating() {
        let (pool, _ledger) = three_staker_pool();
        let now = YEAR_SECS + YEAR_SECS / 2;
        assert_eq!(pool.get_penalty(&acct(2), 0, now).unwrap(), ETHER / 2);
        assert_eq!(pool.get_penalty(&acct(2), 0, 2 * YEAR_SECS).unwrap(), 0);
        assert_eq!(
            pool.get_penalty(&acct(2), 0, 0).unwrap(),
            2 * ETHER
        );
        assert_eq!(pool.get_penalty(&acct(9), 0, now), Err(PoolError::NoSuchStake));
    }
}
