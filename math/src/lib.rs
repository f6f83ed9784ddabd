// DriftPool ─ Math layer
// ================================================================
// Deterministic fixed-point math for the dynamic-weight pool.
// Includes:
//   • Fixed-point helpers (18-dec, checked, explicit rounding).
//   • Integer natural log / exp and `pow` (no floating point anywhere).
//   • Weighted-pool formulas: invariant, dynamic-exponent swaps,
//     weight drift and the BPT join/exit maths.
// ================================================================
#![allow(clippy::many_single_char_names)]

use uint::construct_uint;

pub mod error;
pub mod fixed;
pub mod log_exp;
pub mod solve;
pub mod weighted_math;

pub use error::MathError;

construct_uint! {
    /// 256-bit unsigned integer (little-endian limbs).
    pub struct U256(4);
}

/// Builds a `U256` from a `u128` in const context.
pub const fn u256(v: u128) -> U256 {
    U256([v as u64, (v >> 64) as u64, 0, 0])
}

pub type MathResult<T> = Result<T, MathError>;
