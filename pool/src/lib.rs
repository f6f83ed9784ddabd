// DriftPool ─ Pool engine
// ================================================================
// Two-token weighted pool whose weights drift after every trade.
//   • Swaps given in / given out with a size-dependent curve exponent.
//   • Joins: INIT, exact tokens in, single token for exact LP out.
//   • Exits: proportional, single token, exact tokens out, ratio.
//   • Protocol fee accounting and TOML scenario configuration.
// Every operation computes on a copy of the reserves and commits only
// on success.
// ================================================================

pub mod config;
pub mod error;
mod exit;
pub mod fees;
pub mod handle;
mod join;
pub mod request;
pub mod state;
mod swap;
pub mod user_data;
pub mod weights;

#[cfg(test)]
pub(crate) mod testutil;

pub use config::{ConfigError, Operation, PoolConfig, Scenario, TokenConfig};
pub use error::{PoolError, PoolResult};
pub use handle::PoolHandle;
pub use request::{
    Action, ExitRequest, JoinExitResult, JoinRequest, Outcome, SwapKind, SwapRequest, SwapResult,
};
pub use state::{Pool, Reserves};
pub use user_data::{ExitKind, JoinKind};
