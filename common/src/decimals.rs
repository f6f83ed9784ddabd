// ------------------------------------------------------------
// Decimal normalizer
// ------------------------------------------------------------
// Raw token amounts carry the token's own decimals; every pool formula
// works on 18 decimals. Upscaling is exact, downscaling rounds in the
// pool's favour.
use math::fixed::{div, mul};
use math::{MathResult, U256};

use crate::CommonError;

/// Internal precision of every pool amount.
pub const WAD_DECIMALS: u8 = 18;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScalingFactor {
    decimals: u8,
    factor: U256,
}

impl ScalingFactor {
    pub fn new(decimals: u8) -> Result<Self, CommonError> {
        if decimals > WAD_DECIMALS {
            return Err(CommonError::UnsupportedDecimals(decimals));
        }
        Ok(Self {
            decimals,
            factor: U256::exp10(usize::from(WAD_DECIMALS - decimals)),
        })
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    pub fn factor(&self) -> U256 {
        self.factor
    }

    pub fn upscale(&self, raw: U256) -> MathResult<U256> {
        mul(raw, self.factor)
    }

    /// For amounts the pool pays out.
    pub fn downscale_down(&self, amount: U256) -> MathResult<U256> {
        div(amount, self.factor)
    }

    /// For amounts the pool charges.
    pub fn downscale_up(&self, amount: U256) -> MathResult<U256> {
        if amount.is_zero() {
            return Ok(U256::zero());
        }
        Ok(div(amount - U256::one(), self.factor)? + U256::one())
    }
}

/// Parses a human decimal string ("1.5") into native units.
pub fn parse_units(s: &str, decimals: u8) -> Result<U256, CommonError> {
    let invalid = || CommonError::InvalidAmount(s.to_string());
    let s = s.trim();
    let (int_part, frac_part) = match s.split_once('.') {
        Some((i, f)) => (i, f),
        None => (s, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return Err(invalid());
    }
    let all_digits = |p: &str| p.bytes().all(|c| c.is_ascii_digit());
    if !all_digits(int_part) || !all_digits(frac_part) {
        return Err(invalid());
    }
    let frac = frac_part.trim_end_matches('0');
    if frac.len() > usize::from(decimals) {
        return Err(invalid());
    }

    let unit = U256::exp10(usize::from(decimals));
    let int_value = if int_part.is_empty() {
        U256::zero()
    } else {
        U256::from_dec_str(int_part).map_err(|_| invalid())?
    };
    let frac_value = if frac.is_empty() {
        U256::zero()
    } else {
        let padded = format!("{:0<width$}", frac, width = usize::from(decimals));
        U256::from_dec_str(&padded).map_err(|_| invalid())?
    };
    int_value
        .checked_mul(unit)
        .and_then(|v| v.checked_add(frac_value))
        .ok_or_else(invalid)
}

/// Parses an 18-decimal fraction or amount ("0.75").
pub fn parse_wad(s: &str) -> Result<U256, CommonError> {
    parse_units(s, WAD_DECIMALS)
}

/// Formats native units as a decimal string without trailing zeros.
pub fn format_units(value: U256, decimals: u8) -> String {
    let unit = U256::exp10(usize::from(decimals));
    let int_value = value / unit;
    let frac_value = value % unit;
    if frac_value.is_zero() {
        return int_value.to_string();
    }
    let frac = format!("{:0>width$}", frac_value.to_string(), width = usize::from(decimals));
    format!("{}.{}", int_value, frac.trim_end_matches('0'))
}
