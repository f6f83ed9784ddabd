// ------------------------------------------------------------
// Weighted-pool maths with drifting weights
// ------------------------------------------------------------
// Every function takes upscaled (18-decimal) balances and amounts.
use crate::fixed::{
    add, complement, div_down, div_up, mul, mul_down, mul_up, pow_down, pow_up, sub, ONE,
};
use crate::solve;
use crate::{u256, MathError, MathResult, U256};

/// 1e36, the scale of a product of two fixed-point values.
const ONE_SQUARED: U256 = u256(1_000_000_000_000_000_000_000_000_000_000_000_000u128);

// ---------------- Invariant

/// Π balance_i ^ weight_i, each power rounded down.
pub fn calculate_invariant(balances: &[U256], weights: &[U256]) -> MathResult<U256> {
    debug_assert_eq!(balances.len(), weights.len());
    let mut inv = ONE;
    for (b, w) in balances.iter().zip(weights) {
        inv = mul_down(inv, pow_down(*b, *w)?)?;
    }
    if inv.is_zero() {
        return Err(MathError::ZeroInvariant);
    }
    Ok(inv)
}

/// LP minted by the initial deposit: the invariant scaled by the token count.
pub fn calc_init_bpt(balances: &[U256], weights: &[U256]) -> MathResult<U256> {
    let invariant = calculate_invariant(balances, weights)?;
    mul(invariant, U256::from(balances.len() as u64))
}

/// Units of `token_in` per unit of `token_out`, fees aside: (B_in / w_in) / (B_out / w_out).
pub fn calc_spot_price(
    balance_in: U256,
    weight_in: U256,
    balance_out: U256,
    weight_out: U256,
) -> MathResult<U256> {
    let numer = div_down(balance_in, weight_in)?;
    let denom = div_down(balance_out, weight_out)?;
    div_down(numer, denom)
}

// ---------------- Swap math

/// Exponent of the swap curve for a trade of `amount_in_after_fee`.
///
/// `w_in / (w_out + a / (2·B_in))`: the larger the trade relative to the
/// input balance, the flatter the curve.
pub fn calc_swap_exponent(
    balance_in: U256,
    weight_in: U256,
    weight_out: U256,
    amount_in_after_fee: U256,
) -> MathResult<U256> {
    let double_balance = mul(balance_in, U256::from(2u64))?;
    let size_term = div_down(amount_in_after_fee, double_balance)?;
    div_down(weight_in, add(weight_out, size_term)?)
}

pub fn calc_out_given_in(
    balance_in: U256,
    weight_in: U256,
    balance_out: U256,
    weight_out: U256,
    amount_in: U256,
    swap_fee: U256,
) -> MathResult<U256> {
    let fee = mul_up(amount_in, swap_fee)?;
    let amount_in_after_fee = sub(amount_in, fee)?;
    let exponent = calc_swap_exponent(balance_in, weight_in, weight_out, amount_in_after_fee)?;
    let new_balance_in = add(balance_in, amount_in_after_fee)?;
    let base = div_down(balance_in, new_balance_in)?;
    let power = pow_up(base, exponent)?;
    mul_down(balance_out, complement(power))
}

/// Smallest `amount_in` whose given-in quote pays at least `amount_out`.
///
/// The curve exponent depends on the input size, so the fixed-exponent
/// inverse only seeds the search; the answer comes from bisection on
/// [`calc_out_given_in`].
pub fn calc_in_given_out(
    balance_in: U256,
    weight_in: U256,
    balance_out: U256,
    weight_out: U256,
    amount_out: U256,
    swap_fee: U256,
) -> MathResult<U256> {
    if amount_out >= balance_out {
        return Err(MathError::AmountOutTooLarge);
    }
    if amount_out.is_zero() {
        return Ok(U256::zero());
    }
    let seed = estimate_in_given_out(
        balance_in,
        weight_in,
        balance_out,
        weight_out,
        amount_out,
        swap_fee,
    )
    .unwrap_or(amount_out);
    solve::solve_min(seed, |amount_in| {
        let out = calc_out_given_in(
            balance_in,
            weight_in,
            balance_out,
            weight_out,
            amount_in,
            swap_fee,
        )?;
        Ok(out >= amount_out)
    })
}

/// Fixed-exponent inverse of the swap curve: B_in·((B_out/(B_out−o))^(w_out/w_in) − 1)/(1 − fee).
fn estimate_in_given_out(
    balance_in: U256,
    weight_in: U256,
    balance_out: U256,
    weight_out: U256,
    amount_out: U256,
    swap_fee: U256,
) -> MathResult<U256> {
    let base = div_up(balance_out, sub(balance_out, amount_out)?)?;
    let exponent = div_down(weight_out, weight_in)?;
    let ratio = sub(pow_up(base, exponent)?, ONE)?;
    let without_fee = mul_up(balance_in, ratio)?;
    div_up(without_fee, complement(swap_fee))
}

/// Weight of the outgoing token after a swap moved its balance from
/// `balance_out` down to `balance_out_after`.
///
/// w' = w·(1 + c·(B/B' − 1)), with the product truncated once.
/// `coefficient` is the pre-trade weight of the second token.
pub fn calc_weight_out_after_swap(
    weight_out: U256,
    coefficient: U256,
    balance_out: U256,
    balance_out_after: U256,
) -> MathResult<U256> {
    let ratio = div_down(balance_out, balance_out_after)?;
    let growth = sub(ratio, ONE)?;
    let delta = mul(mul(weight_out, coefficient)?, growth)? / ONE_SQUARED;
    add(weight_out, delta)
}

/// Portion of an unbalanced deposit that must be swapped so the rest
/// matches the pool's post-swap balance ratio.
///
/// `deposit_in` is the over-supplied token. Returns the largest `x` with
/// `(a_in − x)·(B_out − y) ≥ (a_out + y)·(B_in + x)`, where `y` is the
/// fee-free quote for `x`.
pub fn calc_join_swap_amount(
    balance_in: U256,
    weight_in: U256,
    balance_out: U256,
    weight_out: U256,
    deposit_in: U256,
    deposit_out: U256,
) -> MathResult<U256> {
    let balanced = |x: U256| -> MathResult<bool> {
        let y = calc_out_given_in(balance_in, weight_in, balance_out, weight_out, x, U256::zero())?;
        let lhs = mul(sub(deposit_in, x)?, sub(balance_out, y)?)?;
        let rhs = mul(add(deposit_out, y)?, add(balance_in, x)?)?;
        Ok(lhs >= rhs)
    };
    if deposit_in.is_zero() || balanced(deposit_in)? {
        return Ok(deposit_in);
    }
    let first_over = solve::bisect::<_, MathError>(U256::zero(), deposit_in, |x| Ok(!balanced(x)?))?;
    sub(first_over, U256::one())
}

// ---------------- BPT math (joins / exits)

/// All-tokens-in join: caller supplies `amounts_in` for each token and receives BPT.
///
/// The part of a deposit above the proportional share is charged `swap_fee`.
pub fn calc_bpt_out_given_exact_tokens_in(
    balances: &[U256],
    weights: &[U256],
    amounts_in: &[U256],
    total_bpt: U256,
    swap_fee: U256,
) -> MathResult<U256> {
    debug_assert_eq!(balances.len(), weights.len());
    debug_assert_eq!(balances.len(), amounts_in.len());

    let mut balance_ratios = Vec::with_capacity(balances.len());
    let mut invariant_ratio_with_fees = U256::zero();
    for ((b, w), a) in balances.iter().zip(weights).zip(amounts_in) {
        let ratio = div_down(add(*b, *a)?, *b)?;
        balance_ratios.push(ratio);
        invariant_ratio_with_fees = add(invariant_ratio_with_fees, mul_down(ratio, *w)?)?;
    }

    let mut invariant_ratio = ONE;
    for (i, ((b, w), a)) in balances.iter().zip(weights).zip(amounts_in).enumerate() {
        let mut amount_in_after_fee = *a;
        if balance_ratios[i] > invariant_ratio_with_fees {
            let non_taxable = mul_down(*b, invariant_ratio_with_fees.saturating_sub(ONE))?;
            let taxable = a.saturating_sub(non_taxable);
            amount_in_after_fee = add(non_taxable, mul_down(taxable, complement(swap_fee))?)?;
        }
        let balance_ratio = div_down(add(*b, amount_in_after_fee)?, *b)?;
        invariant_ratio = mul_down(invariant_ratio, pow_down(balance_ratio, *w)?)?;
    }
    if invariant_ratio <= ONE {
        return Ok(U256::zero());
    }
    mul_down(total_bpt, invariant_ratio - ONE)
}

/// Single-token deposit that mints `bpt_out` under fixed weights.
///
/// Only a starting estimate once weights drift with the deposit.
pub fn calc_token_in_given_exact_bpt_out(
    balance_in: U256,
    weight_in: U256,
    bpt_out: U256,
    total_bpt: U256,
    swap_fee: U256,
) -> MathResult<U256> {
    let invariant_ratio = div_up(add(total_bpt, bpt_out)?, total_bpt)?;
    let power = pow_up(invariant_ratio, div_down(ONE, weight_in)?)?;
    let new_balance_in = mul_up(balance_in, power)?;
    let amount_in_without_fee = new_balance_in.saturating_sub(balance_in);
    // fee on the taxable portion only (amount above proportional share)
    let non_taxable = mul_up(balance_in, sub(invariant_ratio, ONE)?)?;
    let taxable = amount_in_without_fee.saturating_sub(non_taxable);
    add(non_taxable, div_up(taxable, complement(swap_fee))?)
}

/// Proportional exit: burns `bpt_in` for the same share of every balance.
pub fn calc_tokens_out_given_exact_bpt_in(
    balances: &[U256],
    bpt_in: U256,
    total_bpt: U256,
) -> MathResult<Vec<U256>> {
    let bpt_ratio = div_down(bpt_in, total_bpt)?;
    balances.iter().map(|b| mul_down(*b, bpt_ratio)).collect()
}
