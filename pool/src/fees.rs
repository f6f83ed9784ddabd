// ------------------------------------------------------------
// Protocol fee accountant
// ------------------------------------------------------------
// Revenue is the swap fee charged on the (virtually) swapped amount.
// The protocol's share is reported and accrued; it is never taken out
// of the pool balances.
use math::fixed::{mul_up, sub};
use math::{MathResult, U256};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FeeSplit {
    pub revenue: U256,
    pub protocol: U256,
    pub lp: U256,
}

/// Splits the fee on `amount_swapped` (upscaled) between protocol and LPs.
pub fn split_swap_fee(
    amount_swapped: U256,
    swap_fee: U256,
    protocol_fee_percentage: U256,
) -> MathResult<FeeSplit> {
    let revenue = mul_up(amount_swapped, swap_fee)?;
    let protocol = mul_up(revenue, protocol_fee_percentage)?;
    Ok(FeeSplit {
        revenue,
        protocol,
        lp: sub(revenue, protocol)?,
    })
}
