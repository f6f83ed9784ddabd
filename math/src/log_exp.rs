// ------------------------------------------------------------
// Natural log / exp in fixed point
// ------------------------------------------------------------
// Inputs and outputs are 18-decimal. Internally `exp` and `ln` work
// in 20 decimals, and `ln` close to 1 is evaluated in 36 decimals.
// Arguments are range-reduced by precomputed powers of e, then
// finished with a short series. Every step truncates toward zero, so
// negative intermediates are carried as sign + magnitude.

use crate::fixed::{add, div, mul, sub};
use crate::{u256, MathError, MathResult, U256};

const ONE_18: U256 = u256(1_000_000_000_000_000_000);
const ONE_20: U256 = u256(100_000_000_000_000_000_000);
const ONE_36: U256 = u256(1_000_000_000_000_000_000_000_000_000_000_000_000);
const HUNDRED: U256 = U256([100, 0, 0, 0]);

const MAX_NATURAL_EXPONENT: U256 = u256(130_000_000_000_000_000_000);
/// Magnitude of the most negative argument accepted by `exp`.
const MIN_NATURAL_EXPONENT_ABS: U256 = u256(41_000_000_000_000_000_000);

const LN_36_LOWER_BOUND: U256 = u256(900_000_000_000_000_000);
const LN_36_UPPER_BOUND: U256 = u256(1_100_000_000_000_000_000);

/// 2^254 / 1e20
const MILD_EXPONENT_BOUND: U256 = U256([
    0x4181_ea80_59f7_6532,
    0xa88f_4bb1_ca6b_cf58,
    0x0bce_5086_4921_11ae,
    0,
]);

// 18 decimals; a0 and a1 carry no decimals.
const X0: U256 = u256(128_000_000_000_000_000_000);
const A0: U256 = U256([
    0x0262_8270_0000_0000,
    0xf53a_2717_2fa9_ec63,
    0x0195_e54c_5dd4_2177,
    0,
]);
const X1: U256 = u256(64_000_000_000_000_000_000);
const A1: U256 = u256(6_235_149_080_811_616_882_910_000_000);

// 20 decimals: (x_n, a_n = e^x_n)
const TERMS: [(U256, U256); 10] = [
    (
        u256(3_200_000_000_000_000_000_000),
        u256(7_896_296_018_268_069_516_100_000_000_000_000),
    ),
    (
        u256(1_600_000_000_000_000_000_000),
        u256(888_611_052_050_787_263_676_000_000),
    ),
    (
        u256(800_000_000_000_000_000_000),
        u256(298_095_798_704_172_827_474_000),
    ),
    (
        u256(400_000_000_000_000_000_000),
        u256(5_459_815_003_314_423_907_810),
    ),
    (
        u256(200_000_000_000_000_000_000),
        u256(738_905_609_893_065_022_723),
    ),
    (
        u256(100_000_000_000_000_000_000),
        u256(271_828_182_845_904_523_536),
    ),
    (
        u256(50_000_000_000_000_000_000),
        u256(164_872_127_070_012_814_685),
    ),
    (
        u256(25_000_000_000_000_000_000),
        u256(128_402_541_668_774_148_407),
    ),
    (
        u256(12_500_000_000_000_000_000),
        u256(113_314_845_306_682_631_683),
    ),
    (
        u256(6_250_000_000_000_000_000),
        u256(106_449_445_891_785_942_956),
    ),
];

/// Terms used by `exp`; the last two only serve `ln`.
const EXP_TERMS: usize = 8;

/// A fixed-point value with an explicit sign.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Signed {
    pub negative: bool,
    pub magnitude: U256,
}

impl Signed {
    pub const fn positive(magnitude: U256) -> Self {
        Self {
            negative: false,
            magnitude,
        }
    }

    pub fn negative(magnitude: U256) -> Self {
        Self {
            negative: !magnitude.is_zero(),
            magnitude,
        }
    }

    fn neg(self) -> Self {
        if self.negative {
            Self::positive(self.magnitude)
        } else {
            Self::negative(self.magnitude)
        }
    }
}

/// `x^y` for 18-decimal `x` and `y`, without rounding correction.
pub fn pow(x: U256, y: U256) -> MathResult<U256> {
    if y.is_zero() {
        return Ok(ONE_18);
    }
    if x.is_zero() {
        return Ok(U256::zero());
    }
    if x.bit(255) {
        return Err(MathError::BaseOutOfBounds);
    }
    if y >= MILD_EXPONENT_BOUND {
        return Err(MathError::ExponentOutOfBounds);
    }

    let (negative, product) = if LN_36_LOWER_BOUND < x && x < LN_36_UPPER_BOUND {
        let ln_36_x = ln_36(x)?;
        // Split ln_36_x to keep 36 digits of precision through the product.
        let whole = mul(ln_36_x.magnitude / ONE_18, y)?;
        let frac = mul(ln_36_x.magnitude % ONE_18, y)? / ONE_18;
        (ln_36_x.negative, add(whole, frac)?)
    } else {
        let ln_x = ln_natural(x)?;
        (ln_x.negative, mul(ln_x.magnitude, y)?)
    };
    let logx_times_y = product / ONE_18;

    let limit = if negative {
        MIN_NATURAL_EXPONENT_ABS
    } else {
        MAX_NATURAL_EXPONENT
    };
    if logx_times_y > limit {
        return Err(MathError::ProductOutOfBounds);
    }

    exp(Signed {
        negative: negative && !logx_times_y.is_zero(),
        magnitude: logx_times_y,
    })
}

/// `e^x` for an 18-decimal exponent in [-41, 130].
pub fn exp(x: Signed) -> MathResult<U256> {
    if x.negative {
        if x.magnitude > MIN_NATURAL_EXPONENT_ABS {
            return Err(MathError::InvalidExponent);
        }
        // e^(-x) = 1 / e^x
        return div(ONE_36, exp_positive(x.magnitude)?);
    }
    if x.magnitude > MAX_NATURAL_EXPONENT {
        return Err(MathError::InvalidExponent);
    }
    exp_positive(x.magnitude)
}

fn exp_positive(x: U256) -> MathResult<U256> {
    let (x, first_an) = if x >= X0 {
        (x - X0, A0)
    } else if x >= X1 {
        (x - X1, A1)
    } else {
        (x, U256::one())
    };

    let mut x = mul(x, HUNDRED)?;
    let mut product = ONE_20;
    for (x_n, a_n) in TERMS.iter().take(EXP_TERMS) {
        if x >= *x_n {
            x -= *x_n;
            product = mul(product, *a_n)? / ONE_20;
        }
    }

    // Taylor series up to the 12th term; x < 0.0625 here.
    let mut series_sum = add(ONE_20, x)?;
    let mut term = x;
    for k in 2u64..=12 {
        term = mul(term, x)? / ONE_20 / U256::from(k);
        series_sum = add(series_sum, term)?;
    }

    let scaled = mul(product, series_sum)? / ONE_20;
    Ok(mul(scaled, first_an)? / HUNDRED)
}

/// Natural log of an 18-decimal value, 18-decimal result.
pub fn ln_natural(a: U256) -> MathResult<Signed> {
    if a.is_zero() {
        return Err(MathError::LogOfZero);
    }
    if a < ONE_18 {
        // ln(a) = -ln(1/a)
        return Ok(ln_natural(ONE_36 / a)?.neg());
    }

    let mut a = a;
    let mut sum = U256::zero();
    if a >= mul(A0, ONE_18)? {
        a /= A0;
        sum = add(sum, X0)?;
    }
    if a >= mul(A1, ONE_18)? {
        a /= A1;
        sum = add(sum, X1)?;
    }

    // Continue in 20 decimals.
    let mut sum = mul(sum, HUNDRED)?;
    let mut a = mul(a, HUNDRED)?;
    for (x_n, a_n) in TERMS.iter() {
        if a >= *a_n {
            a = mul(a, ONE_20)? / *a_n;
            sum = add(sum, *x_n)?;
        }
    }

    // ln(a) = 2 * atanh(z), z = (a - 1) / (a + 1), odd terms up to z^11.
    let z = mul(sub(a, ONE_20)?, ONE_20)? / add(a, ONE_20)?;
    let z_squared = mul(z, z)? / ONE_20;
    let mut num = z;
    let mut series_sum = num;
    for k in [3u64, 5, 7, 9, 11] {
        num = mul(num, z_squared)? / ONE_20;
        series_sum = add(series_sum, num / U256::from(k))?;
    }
    let series_sum = mul(series_sum, U256::from(2u64))?;

    Ok(Signed::positive(add(sum, series_sum)? / HUNDRED))
}

/// High-precision ln for 18-decimal `x` close to 1; 36-decimal result.
fn ln_36(x: U256) -> MathResult<Signed> {
    let x = mul(x, ONE_18)?;
    let (negative, distance) = if x >= ONE_36 {
        (false, x - ONE_36)
    } else {
        (true, ONE_36 - x)
    };

    let z = mul(distance, ONE_36)? / add(x, ONE_36)?;
    let z_squared = mul(z, z)? / ONE_36;
    let mut num = z;
    let mut series_sum = num;
    for k in [3u64, 5, 7, 9, 11, 13, 15] {
        num = mul(num, z_squared)? / ONE_36;
        series_sum = add(series_sum, num / U256::from(k))?;
    }
    let magnitude = mul(series_sum, U256::from(2u64))?;

    Ok(if negative {
        Signed::negative(magnitude)
    } else {
        Signed::positive(magnitude)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wad(v: u128) -> U256 {
        U256::from(v) * ONE_18
    }

    fn close(a: U256, b: U256, tolerance: u64) -> bool {
        let diff = if a > b { a - b } else { b - a };
        diff <= U256::from(tolerance)
    }

    #[test]
    fn exp_of_zero_and_one() {
        assert_eq!(exp(Signed::positive(U256::zero())).unwrap(), ONE_18);
        // e = 2.718281828459045235...
        let e = exp(Signed::positive(ONE_18)).unwrap();
        assert!(close(e, U256::from(2_718_281_828_459_045_235u128), 100));
    }

    #[test]
    fn exp_negative_is_reciprocal() {
        let inv_e = exp(Signed::negative(ONE_18)).unwrap();
        // 1/e = 0.367879441171442321...
        assert!(close(inv_e, U256::from(367_879_441_171_442_321u128), 100));
    }

    #[test]
    fn exp_rejects_out_of_range() {
        assert_eq!(
            exp(Signed::positive(wad(131))),
            Err(MathError::InvalidExponent)
        );
        assert_eq!(
            exp(Signed::negative(wad(42))),
            Err(MathError::InvalidExponent)
        );
    }

    #[test]
    fn ln_of_known_values() {
        assert_eq!(ln_natural(ONE_18).unwrap(), Signed::positive(U256::zero()));
        // ln(2) = 0.693147180559945309...
        let ln2 = ln_natural(wad(2)).unwrap();
        assert!(!ln2.negative);
        assert!(close(ln2.magnitude, U256::from(693_147_180_559_945_309u128), 1_000));

        let ln_half = ln_natural(ONE_18 / U256::from(2u64)).unwrap();
        assert!(ln_half.negative);
        assert!(close(ln_half.magnitude, ln2.magnitude, 1));
    }

    #[test]
    fn ln_of_zero_fails() {
        assert_eq!(ln_natural(U256::zero()), Err(MathError::LogOfZero));
    }

    #[test]
    fn pow_near_one_uses_high_precision_branch() {
        // 1.05^0.5 = 1.024695076595959838...
        let r = pow(u256(1_050_000_000_000_000_000), ONE_18 / U256::from(2u64)).unwrap();
        assert!(close(r, U256::from(1_024_695_076_595_959_838u128), 100_000));

        // 0.95^3 = 0.857375
        let r = pow(u256(950_000_000_000_000_000), wad(3)).unwrap();
        assert!(close(r, U256::from(857_375_000_000_000_000u128), 100_000));
    }

    #[test]
    fn pow_trivial_inputs() {
        assert_eq!(pow(wad(7), U256::zero()).unwrap(), ONE_18);
        assert_eq!(pow(U256::zero(), wad(7)).unwrap(), U256::zero());
    }

    #[test]
    fn pow_rejects_huge_products() {
        // 1e30 ^ 10 overflows the exp domain.
        let x = U256::exp10(30) * ONE_18;
        assert_eq!(pow(x, wad(10)), Err(MathError::ProductOutOfBounds));
    }
}
