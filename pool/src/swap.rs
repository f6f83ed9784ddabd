// ------------------------------------------------------------
// Swap engine
// ------------------------------------------------------------
use log::{debug, warn};
use math::fixed::{add, sub};
use math::weighted_math::{calc_in_given_out, calc_out_given_in};

use crate::error::{PoolError, PoolResult};
use crate::fees::split_swap_fee;
use crate::request::{SwapKind, SwapRequest, SwapResult};
use crate::state::{Pool, Reserves};
use crate::weights::drift_after_swap;

impl Pool {
    /// Executes a swap. `now` is unix seconds, checked against the deadline.
    pub fn swap(&mut self, req: &SwapRequest, now: u64) -> PoolResult<SwapResult> {
        let (result, next) = self.simulate_swap(req, now)?;
        self.commit(next)?;
        Ok(result)
    }

    /// Same result as [`Pool::swap`] without touching the pool.
    pub fn quote_swap(&self, req: &SwapRequest, now: u64) -> PoolResult<SwapResult> {
        self.simulate_swap(req, now).map(|(result, _)| result)
    }

    fn simulate_swap(&self, req: &SwapRequest, now: u64) -> PoolResult<(SwapResult, Reserves)> {
        // --------------------
        // 0. Deadline before anything else.
        // --------------------
        if let Some(deadline) = req.deadline {
            if now > deadline {
                return Err(PoolError::Expired);
            }
        }
        self.ensure_active()?;
        self.ensure_initialized()?;
        let (i, j) = self.pair_indices(&req.token_in, &req.token_out)?;
        if req.amount.is_zero() {
            return Err(PoolError::ZeroAmount);
        }

        let mut next = self.reserves;
        let balances = self.upscaled(&next.balances)?;
        let weights = next.weights;
        let (scale_in, scale_out) = (self.params.scaling[i], self.params.scaling[j]);
        let fee = self.params.swap_fee;

        // --------------------
        // 1. Maths – both legs in 18 decimals, then back to native units.
        // --------------------
        let (amount_in, amount_out, amount_in_up, amount_out_up) = match req.kind {
            SwapKind::GivenIn => {
                let amount_in_up = scale_in.upscale(req.amount)?;
                let amount_out_up =
                    calc_out_given_in(balances[i], weights[i], balances[j], weights[j], amount_in_up, fee)?;
                let amount_out = scale_out.downscale_down(amount_out_up)?;
                if amount_out.is_zero() {
                    return Err(PoolError::ZeroAmount);
                }
                if amount_out < req.limit {
                    warn!("swap out {} below limit {}", amount_out, req.limit);
                    return Err(PoolError::SwapLimitExceeded);
                }
                (req.amount, amount_out, amount_in_up, amount_out_up)
            }
            SwapKind::GivenOut => {
                if req.amount >= next.balances[j] {
                    return Err(PoolError::InsufficientLiquidity);
                }
                let amount_out_up = scale_out.upscale(req.amount)?;
                let needed_up =
                    calc_in_given_out(balances[i], weights[i], balances[j], weights[j], amount_out_up, fee)?;
                let amount_in = scale_in.downscale_up(needed_up)?;
                if amount_in.is_zero() {
                    return Err(PoolError::ZeroAmount);
                }
                if amount_in > req.limit {
                    warn!("swap in {} above limit {}", amount_in, req.limit);
                    return Err(PoolError::SwapLimitExceeded);
                }
                (amount_in, req.amount, scale_in.upscale(amount_in)?, amount_out_up)
            }
        };
        debug!(
            "swap {:?} token {} -> {}: in {} out {}",
            req.kind, i, j, amount_in, amount_out
        );

        // --------------------
        // 2. Balances, weights, fees.
        // --------------------
        next.balances[i] = add(next.balances[i], amount_in)?;
        next.balances[j] = sub(next.balances[j], amount_out)?;
        next.weights = drift_after_swap(
            weights,
            j,
            balances[j],
            sub(balances[j], amount_out_up)?,
            self.params.min_weight,
        )?;

        let split = split_swap_fee(amount_in_up, fee, self.params.protocol_fee)?;
        let protocol_fee = scale_in.downscale_down(split.protocol)?;
        next.protocol_fees[i] = add(next.protocol_fees[i], protocol_fee)?;

        let result = SwapResult {
            token_in: req.token_in,
            token_out: req.token_out,
            amount_in,
            amount_out,
            protocol_fee,
            balances: next.balances,
            weights: next.weights,
        };
        Ok((result, next))
    }
}
