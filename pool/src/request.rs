// ------------------------------------------------------------
// Requests and results
// ------------------------------------------------------------
// All amounts are raw, in each token's native decimals. LP amounts and
// weights are 18-decimal.
use common::TokenId;
use math::U256;

use crate::user_data::{ExitKind, JoinKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapKind {
    GivenIn,
    GivenOut,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapRequest {
    pub kind: SwapKind,
    pub token_in: TokenId,
    pub token_out: TokenId,
    /// Exact input for `GivenIn`, exact output for `GivenOut`.
    pub amount: U256,
    /// Minimum out for `GivenIn`, maximum in for `GivenOut`.
    pub limit: U256,
    /// Unix seconds; `None` never expires.
    pub deadline: Option<u64>,
}

impl SwapRequest {
    pub fn given_in(token_in: TokenId, token_out: TokenId, amount_in: U256) -> Self {
        Self {
            kind: SwapKind::GivenIn,
            token_in,
            token_out,
            amount: amount_in,
            limit: U256::zero(),
            deadline: None,
        }
    }

    pub fn given_out(token_in: TokenId, token_out: TokenId, amount_out: U256) -> Self {
        Self {
            kind: SwapKind::GivenOut,
            token_in,
            token_out,
            amount: amount_out,
            limit: U256::MAX,
            deadline: None,
        }
    }

    pub fn with_limit(mut self, limit: U256) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_deadline(mut self, deadline: u64) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinRequest {
    /// Must match the pool's token order.
    pub tokens: [TokenId; 2],
    /// Maximum amounts in.
    pub bounds: [U256; 2],
    pub kind: JoinKind,
}

impl JoinRequest {
    /// Request with unbounded maximum amounts in.
    pub fn new(tokens: [TokenId; 2], kind: JoinKind) -> Self {
        Self { tokens, bounds: [U256::MAX; 2], kind }
    }

    pub fn with_bounds(mut self, max_amounts_in: [U256; 2]) -> Self {
        self.bounds = max_amounts_in;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExitRequest {
    /// Must match the pool's token order.
    pub tokens: [TokenId; 2],
    /// Minimum amounts out.
    pub bounds: [U256; 2],
    pub kind: ExitKind,
}

impl ExitRequest {
    pub fn new(tokens: [TokenId; 2], kind: ExitKind) -> Self {
        Self { tokens, bounds: [U256::zero(); 2], kind }
    }

    pub fn with_bounds(mut self, min_amounts_out: [U256; 2]) -> Self {
        self.bounds = min_amounts_out;
        self
    }
}

/// Any state-changing operation, for replay and the shared handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Swap(SwapRequest),
    Join(JoinRequest),
    Exit(ExitRequest),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapResult {
    pub token_in: TokenId,
    pub token_out: TokenId,
    pub amount_in: U256,
    pub amount_out: U256,
    /// Protocol share of the swap fee, in `token_in`.
    pub protocol_fee: U256,
    pub balances: [U256; 2],
    pub weights: [U256; 2],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinExitResult {
    /// Paid in for joins, paid out for exits.
    pub amounts: [U256; 2],
    pub protocol_fees: [U256; 2],
    /// Minted for joins, burned for exits.
    pub lp_amount: U256,
    pub balances: [U256; 2],
    pub weights: [U256; 2],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Swap(SwapResult),
    Join(JoinExitResult),
    Exit(JoinExitResult),
}
