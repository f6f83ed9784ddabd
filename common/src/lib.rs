// DriftPool ─ Common types
// ================================================================
// Shared by the engine and the CLI.
//   • `TokenId`: 20-byte token address with hex text form.
//   • `ScalingFactor`: native decimals <-> 18-decimal internal unit.
//   • `PoolParams`: validated construction parameters and their bounds.
// ================================================================

pub mod decimals;
pub mod error;
pub mod params;
pub mod token;

pub use decimals::{format_units, parse_units, parse_wad, ScalingFactor};
pub use error::CommonError;
pub use params::{PoolParams, TokenParams};
pub use token::TokenId;
