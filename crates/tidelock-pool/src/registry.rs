//! Pool creation and lookup.
//!
//! The registry owns every [`Pool`] and is the only way to construct
//! one, so a pool that exists is a pool whose parameters passed
//! validation.

use tracing::info;

use tidelock_core::constants::PERCENT_BASE;
use tidelock_core::error::RegistryError;
use tidelock_core::types::{PoolParams, TokenId};

use crate::pool::Pool;

/// Check pool parameters before any state is created.
pub fn validate_params(params: &PoolParams) -> Result<(), RegistryError> {
    if params.token.is_zero() {
        return Err(RegistryError::TokenCannotBeZero);
    }
    if params.initial_price.is_zero() {
        return Err(RegistryError::PriceCannotBeZero);
    }
    if params.b_bonus_amount == 0 {
        return Err(RegistryError::BonusAmountCannotBeZero);
    }
    if params.l_bonus_period == 0 {
        return Err(RegistryError::BonusPeriodCannotBeZero);
    }
    if params.wallets.iter().any(|w| w.is_zero()) {
        return Err(RegistryError::WalletCannotBeZero);
    }
    let sum: u32 = params.penalty_percents.iter().sum();
    if sum != PERCENT_BASE {
        return Err(RegistryError::PercentSumMismatch { sum });
    }
    Ok(())
}

/// Collection of staking pools, one slot per `create_pool` call.
#[derive(Default)]
pub struct PoolRegistry {
    pools: Vec<Pool>,
}

impl PoolRegistry {
    pub fn new() -> Self {
        Self { pools: Vec::new() }
    }

    /// Validate `params` and open a new pool. Returns its id.
    pub fn create_pool(&mut self, params: PoolParams) -> Result<usize, RegistryError> {
        let token = params.token;
        let pool = Pool::new(params)?;
        let id = self.pools.len();
        self.pools.push(pool);
        info!(id, token = %token, "pool created");
        Ok(id)
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }

    pub fn pool(&self, id: usize) -> Result<&Pool, RegistryError> {
        self.pools.get(id).ok_or(RegistryError::NoSuchPool(id))
    }

    pub fn pool_mut(&mut self, id: usize) -> Result<&mut Pool, RegistryError> {
        self.pools.get_mut(id).ok_or(RegistryError::NoSuchPool(id))
    }

    /// First pool registered for `token`, if any.
    pub fn pool_for_token(&self, token: &TokenId) -> Option<&Pool> {
        self.pools.iter().find(|p| p.token() == *token)
    }

    /// Ids of every pool registered for `token`, in creation order.
    pub fn pools_for_token(&self, token: &TokenId) -> Vec<usize> {
        self.pools
            .iter()
            .enumerate()
            .filter(|(_, p)| p.token() == *token)
            .map(|(id, _)| id)
            .collect()
    }
}
