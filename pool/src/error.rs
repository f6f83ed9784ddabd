/* ------------------------------------------------------------------
   Errors
------------------------------------------------------------------ */
use common::CommonError;
use math::MathError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    /// Token not in the pool, or `token_in == token_out`.
    #[error("invalid token")]
    InvalidToken,
    #[error("pool not initialized")]
    PoolNotInitialized,
    #[error("pool already initialized")]
    AlreadyInitialized,
    #[error("pool is paused")]
    Paused,
    #[error("swap limit exceeded")]
    SwapLimitExceeded,
    #[error("join/exit limit exceeded")]
    JoinExitLimitExceeded,
    #[error("zero amount")]
    ZeroAmount,
    #[error("weight out of bounds")]
    WeightOutOfBounds,
    #[error("fee out of bounds")]
    FeeOutOfBounds,
    #[error("unsupported token decimals: {0}")]
    UnsupportedDecimals(u8),
    #[error("deadline expired")]
    Expired,
    #[error("insufficient liquidity")]
    InsufficientLiquidity,
    #[error("invalid user data: {0}")]
    InvalidUserData(String),
    #[error(transparent)]
    Math(#[from] MathError),
}

impl From<CommonError> for PoolError {
    fn from(err: CommonError) -> Self {
        match err {
            CommonError::InvalidAddress(_) | CommonError::InvalidToken => PoolError::InvalidToken,
            CommonError::WeightOutOfBounds => PoolError::WeightOutOfBounds,
            CommonError::FeeOutOfBounds => PoolError::FeeOutOfBounds,
            CommonError::UnsupportedDecimals(d) => PoolError::UnsupportedDecimals(d),
            CommonError::InvalidAmount(s) => PoolError::InvalidUserData(s),
            CommonError::Math(e) => PoolError::Math(e),
        }
    }
}

pub type PoolResult<T> = Result<T, PoolError>;
