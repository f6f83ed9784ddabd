use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MathError {
    #[error("arithmetic overflow")]
    Overflow,
    #[error("arithmetic underflow")]
    Underflow,
    #[error("division by zero")]
    DivisionByZero,
    /// Base of `pow` is too large to take its logarithm.
    #[error("pow base out of bounds")]
    BaseOutOfBounds,
    #[error("pow exponent out of bounds")]
    ExponentOutOfBounds,
    /// `ln(base) * exponent` falls outside the range `exp` can represent.
    #[error("pow product out of bounds")]
    ProductOutOfBounds,
    #[error("exp argument out of bounds")]
    InvalidExponent,
    #[error("logarithm of zero")]
    LogOfZero,
    #[error("invariant is zero")]
    ZeroInvariant,
    #[error("amount out exceeds balance")]
    AmountOutTooLarge,
    #[error("solver did not converge")]
    NoConvergence,
}
