//! Human-readable and JSON views of pool results

use colored::Colorize;
use common::{format_units, TokenId};
use driftpool::{ConfigError, JoinExitResult, Outcome, Pool, PoolConfig, SwapResult};
use math::U256;
use serde::Serialize;
use std::collections::BTreeMap;

const WAD: u8 = 18;

#[derive(Debug, Serialize)]
pub struct Report {
    pub pool: Option<String>,
    pub steps: Vec<StepReport>,
    pub final_state: PoolView,
}

#[derive(Debug, Serialize)]
pub struct StepReport {
    pub index: usize,
    pub operation: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<OutcomeView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutcomeView {
    Swap {
        token_in: String,
        token_out: String,
        amount_in: String,
        amount_out: String,
        protocol_fee: String,
        weights: BTreeMap<String, String>,
    },
    Join {
        amounts_in: BTreeMap<String, String>,
        lp_minted: String,
        protocol_fees: BTreeMap<String, String>,
        weights: BTreeMap<String, String>,
    },
    Exit {
        amounts_out: BTreeMap<String, String>,
        lp_burned: String,
        protocol_fees: BTreeMap<String, String>,
        weights: BTreeMap<String, String>,
    },
}

#[derive(Debug, Serialize)]
pub struct TokenView {
    pub symbol: String,
    pub address: String,
    pub decimals: u8,
    pub balance: String,
    pub weight: String,
    pub protocol_fees: String,
}

#[derive(Debug, Serialize)]
pub struct PoolView {
    pub tokens: Vec<TokenView>,
    pub total_lp: String,
    /// Absent until the pool is initialized.
    pub invariant: Option<String>,
    /// Units of the first token per unit of the second.
    pub spot_price: Option<String>,
    pub paused: bool,
}

#[derive(Debug, Serialize)]
pub struct QuoteView {
    pub token_in: String,
    pub token_out: String,
    pub amount_in: String,
    pub amount_out: String,
    pub protocol_fee: String,
    pub weights_after: BTreeMap<String, String>,
}

/// Symbols and decimals in pool order.
pub struct Labels {
    tokens: [TokenId; 2],
    symbols: [String; 2],
    decimals: [u8; 2],
}

impl Labels {
    pub fn new(config: &PoolConfig, pool: &Pool) -> Result<Self, ConfigError> {
        let scaling = &pool.params().scaling;
        Ok(Self {
            tokens: pool.tokens(),
            symbols: config.symbols(pool)?,
            decimals: [scaling[0].decimals(), scaling[1].decimals()],
        })
    }

    fn index(&self, token: &TokenId) -> usize {
        if *token == self.tokens[0] {
            0
        } else {
            1
        }
    }

    fn amount(&self, k: usize, value: U256) -> String {
        format_units(value, self.decimals[k])
    }

    fn per_token(&self, values: &[U256; 2]) -> BTreeMap<String, String> {
        (0..2)
            .map(|k| (self.symbols[k].clone(), self.amount(k, values[k])))
            .collect()
    }

    fn weights(&self, weights: &[U256; 2]) -> BTreeMap<String, String> {
        (0..2)
            .map(|k| (self.symbols[k].clone(), format_units(weights[k], WAD)))
            .collect()
    }

    pub fn swap(&self, r: &SwapResult) -> QuoteView {
        let (i, j) = (self.index(&r.token_in), self.index(&r.token_out));
        QuoteView {
            token_in: self.symbols[i].clone(),
            token_out: self.symbols[j].clone(),
            amount_in: self.amount(i, r.amount_in),
            amount_out: self.amount(j, r.amount_out),
            protocol_fee: self.amount(i, r.protocol_fee),
            weights_after: self.weights(&r.weights),
        }
    }

    pub fn outcome(&self, outcome: &Outcome) -> OutcomeView {
        match outcome {
            Outcome::Swap(r) => {
                let q = self.swap(r);
                OutcomeView::Swap {
                    token_in: q.token_in,
                    token_out: q.token_out,
                    amount_in: q.amount_in,
                    amount_out: q.amount_out,
                    protocol_fee: q.protocol_fee,
                    weights: q.weights_after,
                }
            }
            Outcome::Join(r) => {
                let JoinExitResult { amounts, protocol_fees, lp_amount, weights, .. } = r;
                OutcomeView::Join {
                    amounts_in: self.per_token(amounts),
                    lp_minted: format_units(*lp_amount, WAD),
                    protocol_fees: self.per_token(protocol_fees),
                    weights: self.weights(weights),
                }
            }
            Outcome::Exit(r) => OutcomeView::Exit {
                amounts_out: self.per_token(&r.amounts),
                lp_burned: format_units(r.lp_amount, WAD),
                protocol_fees: self.per_token(&r.protocol_fees),
                weights: self.weights(&r.weights),
            },
        }
    }

    pub fn pool(&self, pool: &Pool) -> PoolView {
        let (balances, weights, fees) = (pool.balances(), pool.weights(), pool.protocol_fees());
        let tokens = (0..2)
            .map(|k| TokenView {
                symbol: self.symbols[k].clone(),
                address: self.tokens[k].to_string(),
                decimals: self.decimals[k],
                balance: self.amount(k, balances[k]),
                weight: format_units(weights[k], WAD),
                protocol_fees: self.amount(k, fees[k]),
            })
            .collect();
        PoolView {
            tokens,
            total_lp: format_units(pool.total_lp(), WAD),
            invariant: pool.invariant().ok().map(|v| format_units(v, WAD)),
            spot_price: pool
                .spot_price(&self.tokens[0], &self.tokens[1])
                .ok()
                .map(|v| format_units(v, WAD)),
            paused: pool.params().paused,
        }
    }
}

fn print_map(label: &str, values: &BTreeMap<String, String>) {
    let joined: Vec<String> = values.iter().map(|(k, v)| format!("{} {}", v, k)).collect();
    println!("  {} {}", label.bright_cyan(), joined.join(", "));
}

fn print_outcome(outcome: &OutcomeView) {
    match outcome {
        OutcomeView::Swap { token_in, token_out, amount_in, amount_out, protocol_fee, weights } => {
            println!("  {} {} {} -> {} {}", "Swap:".bright_cyan(), amount_in, token_in, amount_out, token_out);
            println!("  {} {} {}", "Protocol fee:".bright_cyan(), protocol_fee, token_in);
            print_map("Weights:", weights);
        }
        OutcomeView::Join { amounts_in, lp_minted, protocol_fees, weights } => {
            print_map("Paid in:", amounts_in);
            println!("  {} {}", "LP minted:".bright_cyan(), lp_minted);
            print_map("Protocol fees:", protocol_fees);
            print_map("Weights:", weights);
        }
        OutcomeView::Exit { amounts_out, lp_burned, protocol_fees, weights } => {
            print_map("Paid out:", amounts_out);
            println!("  {} {}", "LP burned:".bright_cyan(), lp_burned);
            print_map("Protocol fees:", protocol_fees);
            print_map("Weights:", weights);
        }
    }
}

fn print_pool(view: &PoolView) {
    println!("{}", "=== Final State ===".bright_green().bold());
    for t in &view.tokens {
        println!(
            "  {} {} ({}), weight {}, protocol fees {}",
            format!("{}:", t.symbol).bright_cyan(),
            t.balance,
            t.address,
            t.weight,
            t.protocol_fees
        );
    }
    println!("  {} {}", "Total LP:".bright_cyan(), view.total_lp);
    if let Some(inv) = &view.invariant {
        println!("  {} {}", "Invariant:".bright_cyan(), inv);
    }
    if let (Some(price), [base, quote]) = (&view.spot_price, view.tokens.as_slice()) {
        println!("  {} {} {} per {}", "Spot price:".bright_cyan(), price, base.symbol, quote.symbol);
    }
    if view.paused {
        println!("  {}", "Paused".yellow());
    }
}

pub fn print_report(report: &Report) {
    let title = report.pool.as_deref().unwrap_or("pool");
    println!("{}", format!("=== Replay: {} ===", title).bright_green().bold());
    for step in &report.steps {
        println!("{} {}", format!("[{}]", step.index).bold(), step.operation);
        if let Some(outcome) = &step.outcome {
            print_outcome(outcome);
        }
        if let Some(err) = &step.error {
            println!("  {} {}", "Failed:".red(), err);
        }
    }
    print_pool(&report.final_state);
}

pub fn print_quote(quote: &QuoteView) {
    println!("{}", "=== Quote ===".bright_green().bold());
    println!("  {} {} {}", "Pay:".bright_cyan(), quote.amount_in, quote.token_in);
    println!("  {} {} {}", "Receive:".bright_cyan(), quote.amount_out, quote.token_out);
    println!("  {} {} {}", "Protocol fee:".bright_cyan(), quote.protocol_fee, quote.token_in);
    print_map("Weights after:", &quote.weights_after);
}
