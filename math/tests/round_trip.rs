use math::fixed::ONE;
use math::weighted_math::{calc_in_given_out, calc_out_given_in, calc_weight_out_after_swap};
use math::U256;
use proptest::prelude::*;

fn units(n: u64) -> U256 {
    U256::from(n) * U256::exp10(18)
}

fn pct(n: u64) -> U256 {
    U256::from(n) * U256::exp10(16)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn given_out_inverts_given_in_without_fee(
        balance_in in 100u64..100_000,
        balance_out in 100u64..100_000,
        weight_in in 20u64..81,
        trade_pct in 1u64..50
    ) {
        let (b_in, b_out) = (units(balance_in), units(balance_out));
        let (w_in, w_out) = (pct(weight_in), ONE - pct(weight_in));
        let amount_in = b_in * U256::from(trade_pct) / U256::from(100u64);

        let out = calc_out_given_in(b_in, w_in, b_out, w_out, amount_in, U256::zero()).unwrap();
        prop_assume!(!out.is_zero());
        let back = calc_in_given_out(b_in, w_in, b_out, w_out, out, U256::zero()).unwrap();
        prop_assert!(back <= amount_in);
        prop_assert!(amount_in - back <= b_in / U256::from(1_000_000_000_000u64));
    }

    #[test]
    fn outflow_raises_the_outgoing_weight(
        weight_out in 20u64..80,
        coefficient in 20u64..80,
        drained_pct in 1u64..90
    ) {
        let before = units(1000);
        let after = before - before * U256::from(drained_pct) / U256::from(100u64);
        let w = calc_weight_out_after_swap(pct(weight_out), pct(coefficient), before, after).unwrap();
        prop_assert!(w > pct(weight_out));
    }
}
