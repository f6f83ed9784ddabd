use math::MathError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommonError {
    #[error("invalid token address: {0}")]
    InvalidAddress(String),
    /// Zero address, or both sides of the pair are the same token.
    #[error("invalid token pair")]
    InvalidToken,
    #[error("weight out of bounds")]
    WeightOutOfBounds,
    #[error("fee out of bounds")]
    FeeOutOfBounds,
    #[error("unsupported token decimals: {0}")]
    UnsupportedDecimals(u8),
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
    #[error(transparent)]
    Math(#[from] MathError),
}
