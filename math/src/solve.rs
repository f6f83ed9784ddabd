// ------------------------------------------------------------
// Monotone integer solvers
// ------------------------------------------------------------
// Used where a formula has no closed-form inverse (the swap exponent
// depends on the trade size). Deterministic: the same inputs always
// walk the same path.
use crate::fixed::mul;
use crate::{MathError, U256};

/// Upper bound on doublings when searching for a bracket.
const MAX_DOUBLINGS: usize = 256;

/// Smallest `x` in `(lo, hi]` satisfying `pred`.
///
/// `pred` must be monotone over the range with `pred(lo) == false` and
/// `pred(hi) == true`; the result always satisfies `pred`.
pub fn bisect<F, E>(mut lo: U256, mut hi: U256, mut pred: F) -> Result<U256, E>
where
    F: FnMut(U256) -> Result<bool, E>,
    E: From<MathError>,
{
    if hi <= lo {
        return Err(MathError::NoConvergence.into());
    }
    while hi - lo > U256::one() {
        let mid = lo + (hi - lo) / U256::from(2u64);
        if pred(mid)? {
            hi = mid;
        } else {
            lo = mid;
        }
    }
    Ok(hi)
}

/// Brackets the first value satisfying `pred` by doubling from `start`.
///
/// Returns `(lo, hi)` with `pred(hi)` true and `lo` the last failing
/// probe (zero when `start` already passes).
pub fn bracket<F, E>(start: U256, mut pred: F) -> Result<(U256, U256), E>
where
    F: FnMut(U256) -> Result<bool, E>,
    E: From<MathError>,
{
    let mut lo = U256::zero();
    let mut hi = start.max(U256::one());
    for _ in 0..MAX_DOUBLINGS {
        if pred(hi)? {
            return Ok((lo, hi));
        }
        lo = hi;
        hi = mul(hi, U256::from(2u64))?;
    }
    Err(MathError::NoConvergence.into())
}

/// Smallest value satisfying a monotone `pred`, searched upwards from `start`.
pub fn solve_min<F, E>(start: U256, mut pred: F) -> Result<U256, E>
where
    F: FnMut(U256) -> Result<bool, E>,
    E: From<MathError>,
{
    // When `start` already passes, zero stands in as the failing bound.
    let (lo, hi) = bracket(start, &mut pred)?;
    bisect(lo, hi, pred)
}
