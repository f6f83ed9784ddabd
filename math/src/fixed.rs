// ------------------------------------------------------------
// 18-decimal fixed-point helpers (1e18 ≙ 1.0)
// ------------------------------------------------------------
use crate::{log_exp, u256, MathError, MathResult, U256};

/// 1e18 (fixed-point representation of 1).
pub const ONE: U256 = U256([1_000_000_000_000_000_000u64, 0, 0, 0]);
pub const TWO: U256 = U256([2_000_000_000_000_000_000u64, 0, 0, 0]);
pub const FOUR: U256 = u256(4_000_000_000_000_000_000u128);

/// Relative error bound of `log_exp::pow`, in wei per 1e18.
pub const MAX_POW_RELATIVE_ERROR: U256 = U256([10_000u64, 0, 0, 0]);

#[inline]
pub fn add(a: U256, b: U256) -> MathResult<U256> {
    a.checked_add(b).ok_or(MathError::Overflow)
}

#[inline]
pub fn sub(a: U256, b: U256) -> MathResult<U256> {
    a.checked_sub(b).ok_or(MathError::Underflow)
}

/// Plain integer product, checked.
#[inline]
pub fn mul(a: U256, b: U256) -> MathResult<U256> {
    a.checked_mul(b).ok_or(MathError::Overflow)
}

/// Plain integer division, checked.
#[inline]
pub fn div(a: U256, b: U256) -> MathResult<U256> {
    if b.is_zero() {
        return Err(MathError::DivisionByZero);
    }
    Ok(a / b)
}

/// Multiply two numbers, round **down**.
#[inline]
pub fn mul_down(a: U256, b: U256) -> MathResult<U256> {
    Ok(mul(a, b)? / ONE)
}

/// Multiply, round **up**.
#[inline]
pub fn mul_up(a: U256, b: U256) -> MathResult<U256> {
    let product = mul(a, b)?;
    if product.is_zero() {
        return Ok(U256::zero());
    }
    Ok((product - U256::one()) / ONE + U256::one())
}

/// Divide, round **down**.
#[inline]
pub fn div_down(a: U256, b: U256) -> MathResult<U256> {
    if b.is_zero() {
        return Err(MathError::DivisionByZero);
    }
    if a.is_zero() {
        return Ok(U256::zero());
    }
    Ok(mul(a, ONE)? / b)
}

/// Divide, round **up**.
#[inline]
pub fn div_up(a: U256, b: U256) -> MathResult<U256> {
    if b.is_zero() {
        return Err(MathError::DivisionByZero);
    }
    if a.is_zero() {
        return Ok(U256::zero());
    }
    Ok((mul(a, ONE)? - U256::one()) / b + U256::one())
}

/// max(1 − x, 0).
#[inline]
pub fn complement(x: U256) -> U256 {
    if x < ONE {
        ONE - x
    } else {
        U256::zero()
    }
}

// ----------------------------------------------------
// Exponentiation helpers
// ----------------------------------------------------

/// `x^y` rounded **down**: the raw result minus its worst-case error.
pub fn pow_down(x: U256, y: U256) -> MathResult<U256> {
    if y == ONE {
        return Ok(x);
    }
    if y == TWO {
        return mul_down(x, x);
    }
    if y == FOUR {
        let square = mul_down(x, x)?;
        return mul_down(square, square);
    }
    let raw = log_exp::pow(x, y)?;
    let max_error = add(mul_up(raw, MAX_POW_RELATIVE_ERROR)?, U256::one())?;
    Ok(raw.saturating_sub(max_error))
}

/// `x^y` rounded **up**: the raw result plus its worst-case error.
pub fn pow_up(x: U256, y: U256) -> MathResult<U256> {
    if y == ONE {
        return Ok(x);
    }
    if y == TWO {
        return mul_up(x, x);
    }
    if y == FOUR {
        let square = mul_up(x, x)?;
        return mul_up(square, square);
    }
    let raw = log_exp::pow(x, y)?;
    let max_error = add(mul_up(raw, MAX_POW_RELATIVE_ERROR)?, U256::one())?;
    add(raw, max_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wad(v: u128) -> U256 {
        U256::from(v) * ONE
    }

    #[test]
    fn rounding_directions() {
        let third = div_down(ONE, wad(3)).unwrap();
        assert_eq!(third, U256::from(333_333_333_333_333_333u64));
        assert_eq!(div_up(ONE, wad(3)).unwrap(), third + U256::one());

        // 1e-18 * 0.5 truncates to zero down, one wei up.
        let half = ONE / U256::from(2u64);
        assert_eq!(mul_down(U256::one(), half).unwrap(), U256::zero());
        assert_eq!(mul_up(U256::one(), half).unwrap(), U256::one());
        assert_eq!(mul_up(U256::zero(), half).unwrap(), U256::zero());
    }

    #[test]
    fn complement_clamps() {
        let quarter = ONE / U256::from(4u64);
        assert_eq!(complement(quarter), quarter * U256::from(3u64));
        assert_eq!(complement(ONE), U256::zero());
        assert_eq!(complement(wad(2)), U256::zero());
    }

    #[test]
    fn checked_failures() {
        assert_eq!(div_down(ONE, U256::zero()), Err(MathError::DivisionByZero));
        assert_eq!(div_up(U256::zero(), U256::zero()), Err(MathError::DivisionByZero));
        assert_eq!(mul_down(U256::MAX, wad(2)), Err(MathError::Overflow));
        assert_eq!(sub(ONE, wad(2)), Err(MathError::Underflow));
    }

    #[test]
    fn pow_special_exponents() {
        let x = ONE + ONE / U256::from(2u64);
        assert_eq!(pow_down(x, ONE).unwrap(), x);
        assert_eq!(pow_up(x, TWO).unwrap(), U256::from(2_250_000_000_000_000_000u128));
        assert_eq!(pow_down(x, FOUR).unwrap(), U256::from(5_062_500_000_000_000_000u128));
    }

    #[test]
    fn pow_brackets_raw_value() {
        let x = wad(2);
        let y = ONE / U256::from(2u64);
        let raw = log_exp::pow(x, y).unwrap();
        let down = pow_down(x, y).unwrap();
        let up = pow_up(x, y).unwrap();
        assert!(down < raw && raw < up);
        // sqrt(2) = 1.414213562373095048...
        let sqrt2 = U256::from(1_414_213_562_373_095_048u128);
        let tolerance = U256::from(100_000u64);
        assert!(down <= sqrt2 + tolerance && up + tolerance >= sqrt2);
    }
}
