//! Scenario replay and quoting

use anyhow::{bail, Context, Result};
use driftpool::{Action, Operation, Pool, PoolConfig, Scenario};
use log::{info, warn};
use std::path::Path;

use crate::report::{Labels, QuoteView, Report, StepReport};

fn load(pool_path: &Path, scenario_path: &Path) -> Result<(PoolConfig, Scenario)> {
    let config = PoolConfig::from_path(pool_path)
        .with_context(|| format!("loading pool config {}", pool_path.display()))?;
    let scenario = Scenario::from_path(scenario_path)
        .with_context(|| format!("loading scenario {}", scenario_path.display()))?;
    Ok((config, scenario))
}

pub fn operation_name(op: &Operation) -> &'static str {
    match op {
        Operation::Init { .. } => "init",
        Operation::SwapGivenIn { .. } => "swap_given_in",
        Operation::SwapGivenOut { .. } => "swap_given_out",
        Operation::JoinExactTokensIn { .. } => "join_exact_tokens_in",
        Operation::JoinTokenInForExactLp { .. } => "join_token_in_for_exact_lp",
        Operation::ExitProportional { .. } => "exit_proportional",
        Operation::ExitOneToken { .. } => "exit_one_token",
        Operation::ExitExactTokensOut { .. } => "exit_exact_tokens_out",
        Operation::ExitRatio { .. } => "exit_ratio",
    }
}

/// Replays every operation in order. Without `keep_going` the first
/// failure aborts the replay.
pub fn replay(
    config: &PoolConfig,
    scenario: &Scenario,
    labels: &Labels,
    keep_going: bool,
) -> Result<(Pool, Vec<StepReport>)> {
    let mut pool = config.build_pool().context("building pool")?;
    let mut steps = Vec::with_capacity(scenario.operations.len());

    for (index, op) in scenario.operations.iter().enumerate() {
        let name = operation_name(op);
        let result = op
            .to_action(config, &pool)
            .map_err(anyhow::Error::from)
            .and_then(|action| Ok(pool.execute(&action, scenario.now)?));

        match result {
            Ok(outcome) => {
                info!("step {} ({}) ok", index, name);
                steps.push(StepReport {
                    index,
                    operation: name,
                    outcome: Some(labels.outcome(&outcome)),
                    error: None,
                });
            }
            Err(err) if keep_going => {
                warn!("step {} ({}) failed: {:#}", index, name, err);
                steps.push(StepReport {
                    index,
                    operation: name,
                    outcome: None,
                    error: Some(format!("{:#}", err)),
                });
            }
            Err(err) => return Err(err.context(format!("step {} ({}) failed", index, name))),
        }
    }
    Ok((pool, steps))
}

pub fn run(config: &PoolConfig, scenario: &Scenario, keep_going: bool) -> Result<Report> {
    let labels = Labels::new(config, &config.build_pool()?)?;
    let (pool, steps) = replay(config, scenario, &labels, keep_going)?;
    Ok(Report {
        pool: config.name.clone(),
        steps,
        final_state: labels.pool(&pool),
    })
}

pub fn run_files(pool_path: &Path, scenario_path: &Path, keep_going: bool) -> Result<Report> {
    let (config, scenario) = load(pool_path, scenario_path)?;
    run(&config, &scenario, keep_going)
}

/// Quotes one swap against the pool left by `scenario`.
pub fn quote(
    config: &PoolConfig,
    scenario: &Scenario,
    token_in: &str,
    token_out: &str,
    amount: &str,
    exact_out: bool,
) -> Result<QuoteView> {
    let labels = Labels::new(config, &config.build_pool()?)?;
    let (pool, _) = replay(config, scenario, &labels, false)?;

    let (token_in, token_out, amount) = (token_in.to_string(), token_out.to_string(), amount.to_string());
    let op = if exact_out {
        Operation::SwapGivenOut { token_in, token_out, amount, max_in: None, deadline: None }
    } else {
        Operation::SwapGivenIn { token_in, token_out, amount, min_out: None, deadline: None }
    };
    let req = match op.to_action(config, &pool)? {
        Action::Swap(req) => req,
        other => bail!("expected a swap, got {:?}", other),
    };
    let result = pool.quote_swap(&req, scenario.now).context("quoting swap")?;
    Ok(labels.swap(&result))
}

pub fn quote_files(
    pool_path: &Path,
    scenario_path: &Path,
    token_in: &str,
    token_out: &str,
    amount: &str,
    exact_out: bool,
) -> Result<QuoteView> {
    let (config, scenario) = load(pool_path, scenario_path)?;
    quote(&config, &scenario, token_in, token_out, amount, exact_out)
}
