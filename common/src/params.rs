// ------------------------------------------------------------
// Pool construction parameters
// ------------------------------------------------------------
use math::fixed::ONE;
use math::{u256, U256};

use crate::decimals::ScalingFactor;
use crate::{CommonError, TokenId};

/// Default lower bound of either weight (0.2).
pub const MIN_WEIGHT: U256 = u256(200_000_000_000_000_000);
/// 0.0001%.
pub const MIN_SWAP_FEE: U256 = u256(1_000_000_000_000);
/// 10%.
pub const MAX_SWAP_FEE: U256 = u256(100_000_000_000_000_000);
/// 50% of swap-fee revenue.
pub const MAX_PROTOCOL_FEE: U256 = u256(500_000_000_000_000_000);
/// A min weight must leave room for both tokens.
pub const MAX_MIN_WEIGHT: U256 = u256(500_000_000_000_000_000);

/// One side of the pair as supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenParams {
    pub id: TokenId,
    pub decimals: u8,
    /// Initial weight, 18-decimal fraction.
    pub weight: U256,
}

impl TokenParams {
    pub fn new(id: TokenId, decimals: u8, weight: U256) -> Self {
        Self { id, decimals, weight }
    }
}

/// Validated construction parameters, tokens in ascending address order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolParams {
    pub tokens: [TokenId; 2],
    pub scaling: [ScalingFactor; 2],
    pub weights: [U256; 2],
    pub swap_fee: U256,
    /// Share of swap-fee revenue owed to the protocol; zero without a collector.
    pub protocol_fee: U256,
    pub min_weight: U256,
    pub paused: bool,
}

impl PoolParams {
    /// Sorts the pair so the lower address comes first; decimals and
    /// weights move with their token.
    pub fn new(a: TokenParams, b: TokenParams, swap_fee: U256) -> Result<Self, CommonError> {
        if a.id.is_zero() || b.id.is_zero() || a.id == b.id {
            return Err(CommonError::InvalidToken);
        }
        let (first, second) = if a.id < b.id { (a, b) } else { (b, a) };
        let params = Self {
            tokens: [first.id, second.id],
            scaling: [ScalingFactor::new(first.decimals)?, ScalingFactor::new(second.decimals)?],
            weights: [first.weight, second.weight],
            swap_fee,
            protocol_fee: U256::zero(),
            min_weight: MIN_WEIGHT,
            paused: false,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn with_protocol_fee(mut self, protocol_fee: U256) -> Result<Self, CommonError> {
        self.protocol_fee = protocol_fee;
        self.validate()?;
        Ok(self)
    }

    pub fn with_min_weight(mut self, min_weight: U256) -> Result<Self, CommonError> {
        self.min_weight = min_weight;
        self.validate()?;
        Ok(self)
    }

    pub fn with_paused(mut self, paused: bool) -> Self {
        self.paused = paused;
        self
    }

    /// Largest weight either token may reach.
    pub fn max_weight(&self) -> U256 {
        ONE - self.min_weight
    }

    pub fn index_of(&self, token: &TokenId) -> Option<usize> {
        self.tokens.iter().position(|t| t == token)
    }

    pub fn validate(&self) -> Result<(), CommonError> {
        if self.min_weight.is_zero() || self.min_weight >= MAX_MIN_WEIGHT {
            return Err(CommonError::WeightOutOfBounds);
        }
        let sum = self.weights[0].checked_add(self.weights[1]);
        if sum != Some(ONE) {
            return Err(CommonError::WeightOutOfBounds);
        }
        if self
            .weights
            .iter()
            .any(|w| *w < self.min_weight || *w > self.max_weight())
        {
            return Err(CommonError::WeightOutOfBounds);
        }
        if self.swap_fee < MIN_SWAP_FEE || self.swap_fee > MAX_SWAP_FEE {
            return Err(CommonError::FeeOutOfBounds);
        }
        if self.protocol_fee > MAX_PROTOCOL_FEE {
            return Err(CommonError::FeeOutOfBounds);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_wad;

    fn token(n: u64, decimals: u8, weight: &str) -> TokenParams {
        TokenParams::new(TokenId::from_low_u64(n), decimals, parse_wad(weight).unwrap())
    }

    fn fee() -> U256 {
        parse_wad("0.001").unwrap()
    }

    #[test]
    fn sorts_tokens_with_their_weights_and_decimals() {
        let p = PoolParams::new(token(9, 6, "0.25"), token(3, 9, "0.75"), fee()).unwrap();
        assert_eq!(p.tokens, [TokenId::from_low_u64(3), TokenId::from_low_u64(9)]);
        assert_eq!(p.weights, [parse_wad("0.75").unwrap(), parse_wad("0.25").unwrap()]);
        assert_eq!(p.scaling[0].decimals(), 9);
        assert_eq!(p.scaling[1].decimals(), 6);
        assert_eq!(p.index_of(&TokenId::from_low_u64(9)), Some(1));
        assert_eq!(p.index_of(&TokenId::from_low_u64(4)), None);
    }

    #[test]
    fn rejects_bad_weights() {
        for (wa, wb) in [("0.85", "0.25"), ("0.5", "0.25"), ("0.1", "0.9")] {
            let r = PoolParams::new(token(1, 18, wa), token(2, 18, wb), fee());
            assert_eq!(r, Err(CommonError::WeightOutOfBounds), "{wa}/{wb}");
        }
        assert!(PoolParams::new(token(1, 18, "0.75"), token(2, 18, "0.25"), fee()).is_ok());
    }

    #[test]
    fn rejects_bad_tokens() {
        let r = PoolParams::new(token(1, 18, "0.3"), token(1, 18, "0.7"), fee());
        assert_eq!(r, Err(CommonError::InvalidToken));
        let r = PoolParams::new(token(0, 18, "0.3"), token(1, 18, "0.7"), fee());
        assert_eq!(r, Err(CommonError::InvalidToken));
        let r = PoolParams::new(token(1, 24, "0.3"), token(2, 18, "0.7"), fee());
        assert_eq!(r, Err(CommonError::UnsupportedDecimals(24)));
    }

    #[test]
    fn rejects_fees_out_of_bounds() {
        for f in ["0.3", "0.0000001"] {
            let r = PoolParams::new(token(1, 18, "0.3"), token(2, 18, "0.7"), parse_wad(f).unwrap());
            assert_eq!(r, Err(CommonError::FeeOutOfBounds), "{f}");
        }
        let p = PoolParams::new(token(1, 18, "0.3"), token(2, 18, "0.7"), fee()).unwrap();
        assert!(p.clone().with_protocol_fee(parse_wad("0.5").unwrap()).is_ok());
        assert_eq!(
            p.with_protocol_fee(parse_wad("0.6").unwrap()),
            Err(CommonError::FeeOutOfBounds)
        );
    }

    #[test]
    fn custom_min_weight() {
        let p = PoolParams::new(token(1, 18, "0.3"), token(2, 18, "0.7"), fee()).unwrap();
        assert_eq!(p.max_weight(), parse_wad("0.8").unwrap());
        let p = p.with_min_weight(parse_wad("0.05").unwrap()).unwrap();
        assert_eq!(p.max_weight(), parse_wad("0.95").unwrap());
        assert_eq!(
            p.with_min_weight(parse_wad("0.35").unwrap()),
            Err(CommonError::WeightOutOfBounds)
        );
    }
}
