// ------------------------------------------------------------
// Weight recalculation
// ------------------------------------------------------------
use log::debug;
use math::fixed::ONE;
use math::weighted_math::calc_weight_out_after_swap;
use math::{MathResult, U256};

/// Weights after a (virtual) swap paid `token_out` from the pool.
///
/// Balances are the upscaled outgoing balance before and after the swap.
/// The outgoing weight grows by the drift rule and is clamped to
/// `[min_weight, 1 − min_weight]`; the other weight takes the remainder.
pub fn drift_after_swap(
    weights: [U256; 2],
    token_out: usize,
    balance_out: U256,
    balance_out_after: U256,
    min_weight: U256,
) -> MathResult<[U256; 2]> {
    // The coefficient is always the second token's pre-trade weight.
    let coefficient = weights[1];
    let raw = calc_weight_out_after_swap(weights[token_out], coefficient, balance_out, balance_out_after)?;
    let weight_out = raw.clamp(min_weight, ONE - min_weight);
    if weight_out != raw {
        debug!("weight {} clamped to {}", raw, weight_out);
    }

    let mut next = [U256::zero(); 2];
    next[token_out] = weight_out;
    next[1 - token_out] = ONE - weight_out;
    Ok(next)
}
