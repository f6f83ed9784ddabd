/* ------------------------------------------------------------------
   State
------------------------------------------------------------------ */
use common::{PoolParams, TokenId};
use log::info;
use math::weighted_math::{calc_spot_price, calculate_invariant};
use math::U256;

use crate::error::{PoolError, PoolResult};
use crate::request::{Action, Outcome};

/// Mutable part of the pool. Operations work on a copy and the pool
/// commits it only when the whole operation succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Reserves {
    /// Raw balances in native decimals.
    pub balances: [U256; 2],
    pub weights: [U256; 2],
    pub total_lp: U256,
    pub last_invariant: U256,
    /// Protocol fees accrued so far, raw, per token.
    pub protocol_fees: [U256; 2],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pool {
    pub(crate) params: PoolParams,
    pub(crate) reserves: Reserves,
}

impl Pool {
    pub fn new(params: PoolParams) -> Self {
        let reserves = Reserves {
            weights: params.weights,
            ..Reserves::default()
        };
        Self { params, reserves }
    }

    // ---------------- Queries

    pub fn params(&self) -> &PoolParams {
        &self.params
    }

    pub fn tokens(&self) -> [TokenId; 2] {
        self.params.tokens
    }

    pub fn balances(&self) -> [U256; 2] {
        self.reserves.balances
    }

    pub fn weights(&self) -> [U256; 2] {
        self.reserves.weights
    }

    pub fn total_lp(&self) -> U256 {
        self.reserves.total_lp
    }

    pub fn last_invariant(&self) -> U256 {
        self.reserves.last_invariant
    }

    pub fn protocol_fees(&self) -> [U256; 2] {
        self.reserves.protocol_fees
    }

    pub fn swap_fee(&self) -> U256 {
        self.params.swap_fee
    }

    pub fn is_initialized(&self) -> bool {
        !self.reserves.total_lp.is_zero()
    }

    /// Invariant of the current balances and weights.
    pub fn invariant(&self) -> PoolResult<U256> {
        self.ensure_initialized()?;
        let balances = self.upscaled(&self.reserves.balances)?;
        Ok(calculate_invariant(&balances, &self.reserves.weights)?)
    }

    /// Spot price of `base` in `quote`: (B_base / w_base) / (B_quote / w_quote),
    /// i.e. units of `base` per unit of `quote`.
    pub fn spot_price(&self, base: &TokenId, quote: &TokenId) -> PoolResult<U256> {
        self.ensure_initialized()?;
        let (i, j) = self.pair_indices(base, quote)?;
        let balances = self.upscaled(&self.reserves.balances)?;
        let weights = self.reserves.weights;
        Ok(calc_spot_price(balances[i], weights[i], balances[j], weights[j])?)
    }

    /// Runs any operation; `now` is only consulted by swap deadlines.
    pub fn execute(&mut self, action: &Action, now: u64) -> PoolResult<Outcome> {
        match action {
            Action::Swap(req) => self.swap(req, now).map(Outcome::Swap),
            Action::Join(req) => self.join(req).map(Outcome::Join),
            Action::Exit(req) => self.exit(req).map(Outcome::Exit),
        }
    }

    // ---------------- Helpers shared by the engines

    pub(crate) fn ensure_active(&self) -> PoolResult<()> {
        if self.params.paused {
            return Err(PoolError::Paused);
        }
        Ok(())
    }

    pub(crate) fn ensure_initialized(&self) -> PoolResult<()> {
        if !self.is_initialized() {
            return Err(PoolError::PoolNotInitialized);
        }
        Ok(())
    }

    pub(crate) fn index_of(&self, token: &TokenId) -> PoolResult<usize> {
        self.params.index_of(token).ok_or(PoolError::InvalidToken)
    }

    pub(crate) fn pair_indices(&self, a: &TokenId, b: &TokenId) -> PoolResult<(usize, usize)> {
        if a == b {
            return Err(PoolError::InvalidToken);
        }
        Ok((self.index_of(a)?, self.index_of(b)?))
    }

    pub(crate) fn check_tokens(&self, tokens: &[TokenId; 2]) -> PoolResult<()> {
        if *tokens != self.params.tokens {
            return Err(PoolError::InvalidToken);
        }
        Ok(())
    }

    pub(crate) fn upscaled(&self, raw: &[U256; 2]) -> PoolResult<[U256; 2]> {
        let s = &self.params.scaling;
        Ok([s[0].upscale(raw[0])?, s[1].upscale(raw[1])?])
    }

    pub(crate) fn downscaled_down(&self, amounts: &[U256; 2]) -> PoolResult<[U256; 2]> {
        let s = &self.params.scaling;
        Ok([s[0].downscale_down(amounts[0])?, s[1].downscale_down(amounts[1])?])
    }

    /// Refreshes `last_invariant` and swaps the new reserves in.
    pub(crate) fn commit(&mut self, mut next: Reserves) -> PoolResult<()> {
        let balances = self.upscaled(&next.balances)?;
        next.last_invariant = calculate_invariant(&balances, &next.weights)?;
        info!(
            "pool {}/{}: balances [{}, {}] weights [{}, {}] lp {}",
            self.params.tokens[0],
            self.params.tokens[1],
            next.balances[0],
            next.balances[1],
            next.weights[0],
            next.weights[1],
            next.total_lp
        );
        self.reserves = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{parse_wad, TokenParams};

    fn params() -> PoolParams {
        PoolParams::new(
            TokenParams::new(TokenId::from_low_u64(1), 18, parse_wad("0.75").unwrap()),
            TokenParams::new(TokenId::from_low_u64(2), 18, parse_wad("0.25").unwrap()),
            parse_wad("0.001").unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn fresh_pool_is_empty() {
        let pool = Pool::new(params());
        assert!(!pool.is_initialized());
        assert_eq!(pool.weights(), params().weights);
        assert_eq!(pool.balances(), [U256::zero(); 2]);
        assert_eq!(pool.invariant(), Err(PoolError::PoolNotInitialized));
        let (a, b) = (TokenId::from_low_u64(1), TokenId::from_low_u64(2));
        assert_eq!(pool.spot_price(&a, &b), Err(PoolError::PoolNotInitialized));
    }

    #[test]
    fn rejects_foreign_and_identical_tokens() {
        let pool = Pool::new(params());
        let a = TokenId::from_low_u64(1);
        assert_eq!(pool.pair_indices(&a, &a), Err(PoolError::InvalidToken));
        assert_eq!(pool.index_of(&TokenId::from_low_u64(7)), Err(PoolError::InvalidToken));
        assert_eq!(pool.pair_indices(&TokenId::from_low_u64(2), &a), Ok((1, 0)));
    }
}
