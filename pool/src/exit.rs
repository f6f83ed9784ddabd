// ------------------------------------------------------------
// Exit engine
// ------------------------------------------------------------
// Outputs round down and LP burned rounds up. No exit may leave a
// balance at zero.
use log::{debug, warn};
use math::fixed::{add, div_down, mul_down, sub, ONE};
use math::solve;
use math::weighted_math::{calc_out_given_in, calc_tokens_out_given_exact_bpt_in};
use math::U256;

use crate::error::{PoolError, PoolResult};
use crate::fees::split_swap_fee;
use crate::request::{ExitRequest, JoinExitResult};
use crate::state::{Pool, Reserves};
use crate::user_data::ExitKind;
use crate::weights::drift_after_swap;

/// A computed but uncommitted exit.
struct ExitPlan {
    amounts_out: [U256; 2],
    lp_in: U256,
    protocol_fees: [U256; 2],
    next: Reserves,
}

/// Virtual swap inside an exit: `amount_in` of token `token_in` traded
/// for `amount_out` of the other token.
#[derive(Debug, Clone, Copy)]
struct ExitSwap {
    token_in: usize,
    amount_in: U256,
    amount_out: U256,
}

/// Proportional share of a candidate LP amount plus the swap that turns
/// it into the requested amounts.
struct ExactOutLeg {
    remaining: [U256; 2],
    swap: Option<ExitSwap>,
}

impl Pool {
    pub fn exit(&mut self, req: &ExitRequest) -> PoolResult<JoinExitResult> {
        let (result, next) = self.simulate_exit(req)?;
        self.commit(next)?;
        Ok(result)
    }

    /// Same result as [`Pool::exit`] without touching the pool.
    pub fn quote_exit(&self, req: &ExitRequest) -> PoolResult<JoinExitResult> {
        self.simulate_exit(req).map(|(result, _)| result)
    }

    fn simulate_exit(&self, req: &ExitRequest) -> PoolResult<(JoinExitResult, Reserves)> {
        self.ensure_active()?;
        self.check_tokens(&req.tokens)?;
        self.ensure_initialized()?;

        let mut mins = req.bounds;
        let plan = match &req.kind {
            ExitKind::ExactBptInForOneTokenOut { bpt_in, token_index, min_amount_out } => {
                let ratio = match token_index {
                    0 => ONE,
                    1 => U256::zero(),
                    _ => return Err(PoolError::InvalidUserData("token index out of range".into())),
                };
                mins[*token_index] = mins[*token_index].max(*min_amount_out);
                self.plan_ratio_exit(*bpt_in, ratio)?
            }
            ExitKind::ExactBptInForTokensOut { bpt_in, min_amounts_out } => {
                mins = [mins[0].max(min_amounts_out[0]), mins[1].max(min_amounts_out[1])];
                self.plan_proportional_exit(*bpt_in)?
            }
            ExitKind::BptInForExactTokensOut { amounts_out, max_bpt_in } => {
                let plan = self.plan_exact_tokens_out(amounts_out)?;
                if plan.lp_in > *max_bpt_in {
                    warn!("exit burns {} above maximum {}", plan.lp_in, max_bpt_in);
                    return Err(PoolError::JoinExitLimitExceeded);
                }
                plan
            }
            ExitKind::ExactBptInForRatioOut { bpt_in, ratio_token0, min_amounts_out } => {
                if *ratio_token0 > ONE {
                    return Err(PoolError::InvalidUserData("ratio above one".into()));
                }
                mins = [mins[0].max(min_amounts_out[0]), mins[1].max(min_amounts_out[1])];
                self.plan_ratio_exit(*bpt_in, *ratio_token0)?
            }
        };

        if plan.amounts_out.iter().zip(&mins).any(|(a, min)| a < min) {
            warn!("exit amounts {:?} below minimums {:?}", plan.amounts_out, mins);
            return Err(PoolError::JoinExitLimitExceeded);
        }
        if plan.next.balances.iter().any(|b| b.is_zero()) {
            return Err(PoolError::InsufficientLiquidity);
        }

        let result = JoinExitResult {
            amounts: plan.amounts_out,
            protocol_fees: plan.protocol_fees,
            lp_amount: plan.lp_in,
            balances: plan.next.balances,
            weights: plan.next.weights,
        };
        Ok((result, plan.next))
    }

    fn check_bpt_in(&self, bpt_in: U256) -> PoolResult<()> {
        if bpt_in.is_zero() {
            return Err(PoolError::ZeroAmount);
        }
        if bpt_in > self.reserves.total_lp {
            return Err(PoolError::InsufficientLiquidity);
        }
        Ok(())
    }

    /// Commits raw outputs and the burned LP onto a copy of the reserves.
    fn settle_exit(
        &self,
        amounts_out: [U256; 2],
        lp_in: U256,
        weights: [U256; 2],
        protocol_fees: [U256; 2],
    ) -> PoolResult<ExitPlan> {
        if amounts_out.iter().all(|a| a.is_zero()) {
            return Err(PoolError::ZeroAmount);
        }
        let mut next = self.reserves;
        for k in 0..2 {
            next.balances[k] = sub(next.balances[k], amounts_out[k])
                .map_err(|_| PoolError::InsufficientLiquidity)?;
            next.protocol_fees[k] = add(next.protocol_fees[k], protocol_fees[k])?;
        }
        next.weights = weights;
        next.total_lp = sub(next.total_lp, lp_in)?;
        Ok(ExitPlan {
            amounts_out,
            lp_in,
            protocol_fees,
            next,
        })
    }

    fn protocol_fees_for(&self, swap: Option<ExitSwap>) -> PoolResult<[U256; 2]> {
        let mut fees = [U256::zero(); 2];
        if let Some(s) = swap {
            let split = split_swap_fee(s.amount_in, self.params.swap_fee, self.params.protocol_fee)?;
            fees[s.token_in] = self.params.scaling[s.token_in].downscale_down(split.protocol)?;
        }
        Ok(fees)
    }

    /// Runs a virtual swap against `pool_balances` and drifts the weights.
    fn exit_swap(
        &self,
        pool_balances: &mut [U256; 2],
        token_in: usize,
        amount_in: U256,
    ) -> PoolResult<(ExitSwap, [U256; 2])> {
        let j = 1 - token_in;
        let weights = self.reserves.weights;
        let amount_out = calc_out_given_in(
            pool_balances[token_in],
            weights[token_in],
            pool_balances[j],
            weights[j],
            amount_in,
            self.params.swap_fee,
        )?;
        let balance_out = pool_balances[j];
        pool_balances[token_in] = add(pool_balances[token_in], amount_in)?;
        pool_balances[j] = sub(balance_out, amount_out)?;
        let next_weights =
            drift_after_swap(weights, j, balance_out, pool_balances[j], self.params.min_weight)?;
        let swap = ExitSwap {
            token_in,
            amount_in,
            amount_out,
        };
        Ok((swap, next_weights))
    }

    // ---------------- EXACT_BPT_IN_FOR_TOKENS_OUT

    fn plan_proportional_exit(&self, bpt_in: U256) -> PoolResult<ExitPlan> {
        self.check_bpt_in(bpt_in)?;
        let balances = self.upscaled(&self.reserves.balances)?;
        let out = calc_tokens_out_given_exact_bpt_in(&balances, bpt_in, self.reserves.total_lp)?;
        let amounts_out = self.downscaled_down(&[out[0], out[1]])?;
        debug!("proportional exit of {} pays {:?}", bpt_in, amounts_out);
        self.settle_exit(amounts_out, bpt_in, self.reserves.weights, [U256::zero(); 2])
    }

    // ---------------- Ratio exit (also EXACT_BPT_IN_FOR_ONE_TOKEN_OUT)

    /// Exits proportionally, then swaps part of one side so that
    /// `ratio_token0` of the withdrawn value ends up in token 0.
    fn plan_ratio_exit(&self, bpt_in: U256, ratio_token0: U256) -> PoolResult<ExitPlan> {
        self.check_bpt_in(bpt_in)?;
        let balances = self.upscaled(&self.reserves.balances)?;
        let weights = self.reserves.weights;

        // --------------------
        // 1. Proportional share.
        // --------------------
        let share = div_down(bpt_in, self.reserves.total_lp)?;
        let mut out = [mul_down(balances[0], share)?, mul_down(balances[1], share)?];
        let mut pool_balances = [sub(balances[0], out[0])?, sub(balances[1], out[1])?];
        if pool_balances.iter().any(|b| b.is_zero()) {
            return Err(PoolError::InsufficientLiquidity);
        }

        // --------------------
        // 2. Swap the part of one side that the ratio does not want.
        // --------------------
        let w0 = weights[0];
        let swap_leg = if ratio_token0 > w0 {
            Some((1, div_down(ratio_token0 - w0, weights[1])?))
        } else if ratio_token0 < w0 {
            Some((0, div_down(w0 - ratio_token0, w0)?))
        } else {
            None
        };

        let mut next_weights = weights;
        let mut swap = None;
        if let Some((i, fraction)) = swap_leg {
            let amount_in = mul_down(out[i], fraction)?;
            if !amount_in.is_zero() {
                let (s, w) = self.exit_swap(&mut pool_balances, i, amount_in)?;
                out[i] = sub(out[i], s.amount_in)?;
                out[1 - i] = add(out[1 - i], s.amount_out)?;
                next_weights = w;
                swap = Some(s);
                debug!("ratio exit swaps {} of token {} for {}", s.amount_in, i, s.amount_out);
            }
        }

        let amounts_out = self.downscaled_down(&out)?;
        let protocol_fees = self.protocol_fees_for(swap)?;
        self.settle_exit(amounts_out, bpt_in, next_weights, protocol_fees)
    }

    // ---------------- BPT_IN_FOR_EXACT_TOKENS_OUT

    fn plan_exact_tokens_out(&self, amounts_out: &[U256; 2]) -> PoolResult<ExitPlan> {
        if amounts_out.iter().all(|a| a.is_zero()) {
            return Err(PoolError::ZeroAmount);
        }
        if amounts_out
            .iter()
            .zip(&self.reserves.balances)
            .any(|(a, b)| a >= b)
        {
            return Err(PoolError::InsufficientLiquidity);
        }
        let targets = self.upscaled(amounts_out)?;
        let total_lp = self.reserves.total_lp;

        // Burning all of the supply would empty the pool.
        let max_burn = sub(total_lp, U256::one())?;
        let covers = |bpt: U256| -> PoolResult<bool> { Ok(self.exact_out_leg(bpt, &targets)?.is_some()) };
        if max_burn.is_zero() || !covers(max_burn)? {
            return Err(PoolError::InsufficientLiquidity);
        }
        let lp_in = solve::bisect(U256::zero(), max_burn, covers)?;

        let leg = self
            .exact_out_leg(lp_in, &targets)?
            .ok_or(PoolError::InsufficientLiquidity)?;
        let mut next_weights = self.reserves.weights;
        if let Some(s) = leg.swap {
            let mut pool_balances = leg.remaining;
            let (_, w) = self.exit_swap(&mut pool_balances, s.token_in, s.amount_in)?;
            next_weights = w;
        }
        let protocol_fees = self.protocol_fees_for(leg.swap)?;
        debug!("exact-out exit of {:?} burns {}", amounts_out, lp_in);
        self.settle_exit(*amounts_out, lp_in, next_weights, protocol_fees)
    }

    /// `Some` when burning `bpt` covers `targets` (upscaled): the
    /// proportional share, with the surplus of one side swapped into the
    /// other when that side falls short.
    fn exact_out_leg(&self, bpt: U256, targets: &[U256; 2]) -> PoolResult<Option<ExactOutLeg>> {
        let balances = self.upscaled(&self.reserves.balances)?;
        let share = div_down(bpt, self.reserves.total_lp)?;
        let share_out = [mul_down(balances[0], share)?, mul_down(balances[1], share)?];
        let remaining = [sub(balances[0], share_out[0])?, sub(balances[1], share_out[1])?];
        if remaining.iter().any(|b| b.is_zero()) {
            return Ok(None);
        }

        let short = [share_out[0] < targets[0], share_out[1] < targets[1]];
        let i = match short {
            [false, false] => return Ok(Some(ExactOutLeg { remaining, swap: None })),
            [false, true] => 0,
            [true, false] => 1,
            [true, true] => return Ok(None),
        };
        let j = 1 - i;
        let amount_in = share_out[i] - targets[i];
        if amount_in.is_zero() {
            return Ok(None);
        }
        let weights = self.reserves.weights;
        let amount_out = calc_out_given_in(
            remaining[i],
            weights[i],
            remaining[j],
            weights[j],
            amount_in,
            self.params.swap_fee,
        )?;
        if add(share_out[j], amount_out)? < targets[j] {
            return Ok(None);
        }
        let swap = ExitSwap {
            token_in: i,
            amount_in,
            amount_out,
        };
        Ok(Some(ExactOutLeg {
            remaining,
            swap: Some(swap),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{initialized_pool, initialized_pool_with_protocol_fee, u, wad};

    fn ratio_exit(pool: &Pool, bpt_in: U256, ratio_token0: U256) -> ExitRequest {
        let kind = ExitKind::ExactBptInForRatioOut {
            bpt_in,
            ratio_token0,
            min_amounts_out: [U256::zero(); 2],
        };
        ExitRequest::new(pool.tokens(), kind)
    }

    #[test]
    fn ratio_exit_into_token0() {
        let mut pool = initialized_pool_with_protocol_fee("0.75", "0.25");
        let r = pool.exit(&ratio_exit(&pool, wad("237.841"), ONE)).unwrap();
        assert_eq!(r.amounts, [u(128927065657052221602), U256::zero()]);
        assert_eq!(r.weights, [u(756226640667729522), u(243773359332270478)]);
        assert_eq!(r.protocol_fees, [U256::zero(), u(1999996443003628)]);
        assert_eq!(pool.balances(), [u(871072934342947778398), wad("2000")]);
        assert_eq!(pool.total_lp(), u(2378414230005394563020) - wad("237.841"));
    }

    #[test]
    fn one_token_exit_matches_ratio_exit() {
        let pool = initialized_pool_with_protocol_fee("0.75", "0.25");
        let kind = ExitKind::ExactBptInForOneTokenOut {
            bpt_in: wad("23.7841"),
            token_index: 1,
            min_amount_out: U256::zero(),
        };
        let one = pool.quote_exit(&ExitRequest::new(pool.tokens(), kind)).unwrap();
        let ratio = pool.quote_exit(&ratio_exit(&pool, wad("23.7841"), U256::zero())).unwrap();
        assert_eq!(one, ratio);
        assert_eq!(one.amounts, [U256::zero(), u(77605051132585809907)]);
        assert_eq!(one.weights[0], u(748127170527039470));
        assert_eq!(one.protocol_fees, [u(99999822150182), U256::zero()]);
    }

    #[test]
    fn exit_at_current_weight_is_proportional() {
        let pool = initialized_pool("0.75", "0.25");
        let at_weight = pool.quote_exit(&ratio_exit(&pool, wad("100"), wad("0.75"))).unwrap();
        assert_eq!(at_weight.weights, [wad("0.75"), wad("0.25")]);
        assert_eq!(at_weight.protocol_fees, [U256::zero(); 2]);

        let kind = ExitKind::ExactBptInForTokensOut {
            bpt_in: wad("100"),
            min_amounts_out: [U256::zero(); 2],
        };
        let proportional = pool.quote_exit(&ExitRequest::new(pool.tokens(), kind)).unwrap();
        assert_eq!(proportional.weights, [wad("0.75"), wad("0.25")]);
        for k in 0..2 {
            let diff = if proportional.amounts[k] > at_weight.amounts[k] {
                proportional.amounts[k] - at_weight.amounts[k]
            } else {
                at_weight.amounts[k] - proportional.amounts[k]
            };
            assert!(diff <= u(10_000));
        }
    }

    #[test]
    fn exact_tokens_out_burns_minimal_lp() {
        let mut pool = initialized_pool_with_protocol_fee("0.75", "0.25");
        let wanted = [wad("10"), U256::zero()];
        let kind = ExitKind::BptInForExactTokensOut {
            amounts_out: wanted,
            max_bpt_in: U256::MAX,
        };
        let quote = pool.quote_exit(&ExitRequest::new(pool.tokens(), kind.clone())).unwrap();
        assert_eq!(quote.amounts, wanted);
        // The USD share is swapped into BTC, so less than a proportional burn.
        assert!(quote.lp_amount < pool.total_lp() / 100);
        assert!(!quote.protocol_fees[1].is_zero());
        assert!(quote.weights[0] > wad("0.75"));

        let capped = ExitKind::BptInForExactTokensOut {
            amounts_out: wanted,
            max_bpt_in: quote.lp_amount - U256::one(),
        };
        let req = ExitRequest::new(pool.tokens(), capped);
        assert_eq!(pool.exit(&req), Err(PoolError::JoinExitLimitExceeded));

        let r = pool.exit(&ExitRequest::new(pool.tokens(), kind)).unwrap();
        assert_eq!(r, quote);
        assert_eq!(pool.balances(), [wad("990"), wad("2000")]);
    }

    #[test]
    fn exits_cannot_empty_the_pool() {
        let mut pool = initialized_pool("0.75", "0.25");
        let all = pool.total_lp();
        let kind = ExitKind::ExactBptInForTokensOut {
            bpt_in: all,
            min_amounts_out: [U256::zero(); 2],
        };
        let req = ExitRequest::new(pool.tokens(), kind);
        assert_eq!(pool.exit(&req), Err(PoolError::InsufficientLiquidity));

        let req = ratio_exit(&pool, all + U256::one(), ONE);
        assert_eq!(pool.exit(&req), Err(PoolError::InsufficientLiquidity));

        let kind = ExitKind::BptInForExactTokensOut {
            amounts_out: [wad("1000"), U256::zero()],
            max_bpt_in: U256::MAX,
        };
        let req = ExitRequest::new(pool.tokens(), kind);
        assert_eq!(pool.exit(&req), Err(PoolError::InsufficientLiquidity));
    }

    #[test]
    fn exit_limits_and_bad_data() {
        let mut pool = initialized_pool("0.75", "0.25");
        let before = pool.clone();

        let req = ratio_exit(&pool, wad("10"), ONE + U256::one());
        assert!(matches!(pool.exit(&req), Err(PoolError::InvalidUserData(_))));

        let kind = ExitKind::ExactBptInForOneTokenOut {
            bpt_in: wad("10"),
            token_index: 2,
            min_amount_out: U256::zero(),
        };
        let req = ExitRequest::new(pool.tokens(), kind);
        assert!(matches!(pool.exit(&req), Err(PoolError::InvalidUserData(_))));

        let req = ratio_exit(&pool, wad("10"), ONE).with_bounds([wad("1000"), U256::zero()]);
        assert_eq!(pool.exit(&req), Err(PoolError::JoinExitLimitExceeded));

        let req = ratio_exit(&pool, U256::zero(), ONE);
        assert_eq!(pool.exit(&req), Err(PoolError::ZeroAmount));
        assert_eq!(pool, before);
    }
}
