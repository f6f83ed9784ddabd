// ------------------------------------------------------------
// Join engine
// ------------------------------------------------------------
use std::cmp::Ordering;

use log::{debug, warn};
use math::fixed::{add, mul, sub};
use math::solve;
use math::weighted_math::{
    calc_bpt_out_given_exact_tokens_in, calc_init_bpt, calc_join_swap_amount, calc_out_given_in,
    calc_token_in_given_exact_bpt_out,
};
use math::U256;

use crate::error::{PoolError, PoolResult};
use crate::fees::split_swap_fee;
use crate::request::{JoinExitResult, JoinRequest};
use crate::state::{Pool, Reserves};
use crate::user_data::JoinKind;
use crate::weights::drift_after_swap;

/// A computed but uncommitted join.
struct JoinPlan {
    amounts_in: [U256; 2],
    lp_out: U256,
    protocol_fees: [U256; 2],
    next: Reserves,
}

impl Pool {
    pub fn join(&mut self, req: &JoinRequest) -> PoolResult<JoinExitResult> {
        let (result, next) = self.simulate_join(req)?;
        self.commit(next)?;
        Ok(result)
    }

    /// Same result as [`Pool::join`] without touching the pool.
    pub fn quote_join(&self, req: &JoinRequest) -> PoolResult<JoinExitResult> {
        self.simulate_join(req).map(|(result, _)| result)
    }

    fn simulate_join(&self, req: &JoinRequest) -> PoolResult<(JoinExitResult, Reserves)> {
        self.ensure_active()?;
        self.check_tokens(&req.tokens)?;

        let plan = match &req.kind {
            JoinKind::Init { amounts_in } => self.plan_init(amounts_in)?,
            JoinKind::ExactTokensInForBptOut { amounts_in, min_bpt_out } => {
                self.ensure_initialized()?;
                let plan = self.plan_exact_tokens_in(amounts_in)?;
                if plan.lp_out.is_zero() {
                    return Err(PoolError::ZeroAmount);
                }
                if plan.lp_out < *min_bpt_out {
                    warn!("join mints {} below minimum {}", plan.lp_out, min_bpt_out);
                    return Err(PoolError::JoinExitLimitExceeded);
                }
                plan
            }
            JoinKind::TokenInForExactBptOut { bpt_out, token_index, max_amount_in } => {
                self.plan_token_in_for_exact_bpt_out(*bpt_out, *token_index, *max_amount_in)?
            }
        };

        if plan.amounts_in.iter().zip(&req.bounds).any(|(a, max)| a > max) {
            warn!("join amounts {:?} exceed bounds {:?}", plan.amounts_in, req.bounds);
            return Err(PoolError::JoinExitLimitExceeded);
        }

        let result = JoinExitResult {
            amounts: plan.amounts_in,
            protocol_fees: plan.protocol_fees,
            lp_amount: plan.lp_out,
            balances: plan.next.balances,
            weights: plan.next.weights,
        };
        Ok((result, plan.next))
    }

    // ---------------- INIT

    fn plan_init(&self, amounts_in: &[U256; 2]) -> PoolResult<JoinPlan> {
        if self.is_initialized() {
            return Err(PoolError::AlreadyInitialized);
        }
        if amounts_in.iter().any(|a| a.is_zero()) {
            return Err(PoolError::ZeroAmount);
        }
        let deposits = self.upscaled(amounts_in)?;
        let lp_out = calc_init_bpt(&deposits, &self.reserves.weights)?;
        debug!("init with {:?} mints {}", amounts_in, lp_out);

        let mut next = self.reserves;
        next.balances = *amounts_in;
        next.total_lp = lp_out;
        Ok(JoinPlan {
            amounts_in: *amounts_in,
            lp_out,
            protocol_fees: [U256::zero(); 2],
            next,
        })
    }

    // ---------------- EXACT_TOKENS_IN_FOR_BPT_OUT

    /// Splits off the excess of the over-supplied token as a virtual swap,
    /// then joins the remainder. `lp_out` may be zero for dust deposits.
    fn plan_exact_tokens_in(&self, amounts_in: &[U256; 2]) -> PoolResult<JoinPlan> {
        if amounts_in.iter().all(|a| a.is_zero()) {
            return Err(PoolError::ZeroAmount);
        }
        let balances = self.upscaled(&self.reserves.balances)?;
        let deposits = self.upscaled(amounts_in)?;
        let weights = self.reserves.weights;

        // --------------------
        // 1. Size the virtual swap of the part that breaks the pool ratio.
        // --------------------
        let lhs = mul(deposits[0], balances[1])?;
        let rhs = mul(deposits[1], balances[0])?;
        let excess = match lhs.cmp(&rhs) {
            Ordering::Greater => Some(0),
            Ordering::Less => Some(1),
            Ordering::Equal => None,
        };
        let mut swap = None;
        if let Some(i) = excess {
            let j = 1 - i;
            let swapped = calc_join_swap_amount(
                balances[i],
                weights[i],
                balances[j],
                weights[j],
                deposits[i],
                deposits[j],
            )?;
            if !swapped.is_zero() {
                swap = Some((i, swapped));
            }
        }
        self.plan_join_after_swap(amounts_in, swap)
    }

    /// Runs the virtual swap `(token index, upscaled amount)`, if any, and
    /// prices what is left of the deposit against the pre-swap balances at
    /// the drifted weights.
    fn plan_join_after_swap(
        &self,
        amounts_in: &[U256; 2],
        swap: Option<(usize, U256)>,
    ) -> PoolResult<JoinPlan> {
        let fee = self.params.swap_fee;
        let balances = self.upscaled(&self.reserves.balances)?;
        let mut deposits = self.upscaled(amounts_in)?;
        let mut weights = self.reserves.weights;
        let mut protocol_fees = [U256::zero(); 2];

        // --------------------
        // 2. Virtual swap: drifts the weights and accrues the protocol fee.
        // --------------------
        if let Some((i, swapped)) = swap {
            let j = 1 - i;
            let received =
                calc_out_given_in(balances[i], weights[i], balances[j], weights[j], swapped, fee)?;
            weights = drift_after_swap(
                weights,
                j,
                balances[j],
                sub(balances[j], received)?,
                self.params.min_weight,
            )?;
            deposits[i] = sub(deposits[i], swapped)?;
            deposits[j] = add(deposits[j], received)?;

            let split = split_swap_fee(swapped, fee, self.params.protocol_fee)?;
            protocol_fees[i] = self.params.scaling[i].downscale_down(split.protocol)?;
            debug!("join swaps {} of token {} for {}", swapped, i, received);
        }

        // --------------------
        // 3. Join the remainder.
        // --------------------
        let lp_out = calc_bpt_out_given_exact_tokens_in(
            &balances,
            &weights,
            &deposits,
            self.reserves.total_lp,
            fee,
        )?;

        let mut next = self.reserves;
        next.balances = [
            add(next.balances[0], amounts_in[0])?,
            add(next.balances[1], amounts_in[1])?,
        ];
        next.weights = weights;
        next.total_lp = add(next.total_lp, lp_out)?;
        next.protocol_fees = [
            add(next.protocol_fees[0], protocol_fees[0])?,
            add(next.protocol_fees[1], protocol_fees[1])?,
        ];
        Ok(JoinPlan {
            amounts_in: *amounts_in,
            lp_out,
            protocol_fees,
            next,
        })
    }

    // ---------------- TOKEN_IN_FOR_EXACT_BPT_OUT

    /// Smallest single-token deposit whose join mints at least `bpt_out`;
    /// exactly `bpt_out` is minted and any surplus stays in the pool.
    fn plan_token_in_for_exact_bpt_out(
        &self,
        bpt_out: U256,
        token_index: usize,
        max_amount_in: U256,
    ) -> PoolResult<JoinPlan> {
        self.ensure_initialized()?;
        if bpt_out.is_zero() {
            return Err(PoolError::ZeroAmount);
        }
        if token_index > 1 {
            return Err(PoolError::InvalidUserData("token index out of range".into()));
        }
        let single = |amount: U256| {
            let mut amounts = [U256::zero(); 2];
            amounts[token_index] = amount;
            amounts
        };

        let scale = self.params.scaling[token_index];
        let balance = scale.upscale(self.reserves.balances[token_index])?;
        // The fixed-weight estimate only seeds the search.
        let estimate = calc_token_in_given_exact_bpt_out(
            balance,
            self.reserves.weights[token_index],
            bpt_out,
            self.reserves.total_lp,
            self.params.swap_fee,
        )
        .unwrap_or(balance);
        let seed = scale.downscale_up(estimate)?;

        let amount_in = solve::solve_min(seed, |amount| -> PoolResult<bool> {
            Ok(self.plan_exact_tokens_in(&single(amount))?.lp_out >= bpt_out)
        })?;
        if amount_in > max_amount_in {
            warn!("join needs {} above maximum {}", amount_in, max_amount_in);
            return Err(PoolError::JoinExitLimitExceeded);
        }

        let mut plan = self.plan_exact_tokens_in(&single(amount_in))?;
        let surplus = sub(plan.lp_out, bpt_out)?;
        plan.next.total_lp = sub(plan.next.total_lp, surplus)?;
        plan.lp_out = bpt_out;
        debug!("join of {} token {} mints exactly {}", amount_in, token_index, bpt_out);
        Ok(plan)
    }
}
