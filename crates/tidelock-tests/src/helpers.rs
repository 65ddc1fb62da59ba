//! Shared fixtures for E2E and invariant tests.

use primitive_types::U256;

use tidelock_core::constants::{COEF, YEAR_SECS};
use tidelock_core::ledger::{MemoryTokenLedger, TokenLedger};
use tidelock_core::types::{AccountId, Amount, PoolParams, TokenId};
use tidelock_pool::{Pool, PoolRegistry};

pub const ETHER: Amount = COEF;

/// Install a test subscriber honoring `RUST_LOG`. Safe to call from
/// every test; only the first call wins.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Account from a seed, with the seed in the low bytes.
pub fn acct(seed: u16) -> AccountId {
    let mut bytes = [0u8; 32];
    bytes[30] = (seed >> 8) as u8;
    bytes[31] = seed as u8;
    AccountId(bytes)
}

/// The pool's custody account in every fixture.
pub fn custody() -> AccountId {
    acct(200)
}

/// The four external penalty wallets.
pub fn penalty_wallets() -> [AccountId; 4] {
    [acct(101), acct(102), acct(103), acct(104)]
}

/// Production-shaped parameters: price 1 token per base share, B bonus
/// saturating at 100k tokens (cap 10%), L bonus saturating at ten years
/// (cap 200%), penalty split 10/10/10/20 to wallets and 50 to the pool.
pub fn default_params() -> PoolParams {
    let w = penalty_wallets();
    PoolParams::new(
        TokenId([1u8; 32]),
        U256::from(COEF),
        100_000 * ETHER,
        10 * YEAR_SECS,
        10,
        200,
        [10, 10, 10, 20, 50],
        [w[0], w[1], w[2], w[3], custody()],
    )
}

/// A registry holding one default pool, plus a ledger where each listed
/// account is funded and has approved the custody account.
pub fn fixture(funded: &[(AccountId, Amount)]) -> (PoolRegistry, usize, MemoryTokenLedger) {
    let mut registry = PoolRegistry::new();
    let id = registry
        .create_pool(default_params())
        .unwrap_or_else(|e| panic!("default params must validate: {e}"));
    let mut ledger = MemoryTokenLedger::new();
    for (account, amount) in funded {
        fund(&mut ledger, account, *amount);
    }
    (registry, id, ledger)
}

/// Mint `amount` to `account` and approve the custody account for it.
pub fn fund(ledger: &mut MemoryTokenLedger, account: &AccountId, amount: Amount) {
    ledger.mint(account, amount);
    ledger.approve(account, &custody(), Amount::MAX);
}

/// Assert the pool's cached share total equals the literal sum over all
/// alive stakes.
pub fn assert_share_conservation(pool: &Pool) {
    assert_eq!(
        pool.total_shares(),
        pool.stakes().alive_shares(),
        "cached totalShares diverged from the sum over alive stakes"
    );
}
