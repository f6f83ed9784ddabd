// ------------------------------------------------------------
// TOML pool configuration and scenarios
// ------------------------------------------------------------
// Amounts and fractions are human decimal strings ("1.5", "0.75");
// token amounts use the token's own decimals, LP amounts 18.
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use common::{parse_units, parse_wad, CommonError, PoolParams, TokenId, TokenParams};
use math::fixed::ONE;
use math::U256;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::request::{Action, ExitRequest, JoinRequest, SwapRequest};
use crate::state::Pool;
use crate::user_data::{ExitKind, JoinKind};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("a pool needs exactly two tokens, got {0}")]
    TokenCount(usize),
    #[error("unknown token symbol: {0}")]
    UnknownToken(String),
    #[error(transparent)]
    Common(#[from] CommonError),
}

fn default_decimals() -> u8 {
    18
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenConfig {
    pub symbol: String,
    pub address: TokenId,
    #[serde(default = "default_decimals")]
    pub decimals: u8,
    /// Initial weight.
    pub weight: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    #[serde(default)]
    pub name: Option<String>,
    pub swap_fee: String,
    /// Share of swap fees owed to the protocol; absent means no collector.
    #[serde(default)]
    pub protocol_fee: Option<String>,
    #[serde(default)]
    pub min_weight: Option<String>,
    #[serde(default)]
    pub paused: bool,
    pub tokens: Vec<TokenConfig>,
}

impl PoolConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: PoolConfig = toml::from_str(s)?;
        if config.tokens.len() != 2 {
            return Err(ConfigError::TokenCount(config.tokens.len()));
        }
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        Self::from_toml_str(&read(path)?)
    }

    pub fn token(&self, symbol: &str) -> Result<&TokenConfig, ConfigError> {
        self.tokens
            .iter()
            .find(|t| t.symbol == symbol)
            .ok_or_else(|| ConfigError::UnknownToken(symbol.to_string()))
    }

    pub fn params(&self) -> Result<PoolParams, ConfigError> {
        let side = |t: &TokenConfig| -> Result<TokenParams, ConfigError> {
            Ok(TokenParams::new(t.address, t.decimals, parse_wad(&t.weight)?))
        };
        let mut params = PoolParams::new(
            side(&self.tokens[0])?,
            side(&self.tokens[1])?,
            parse_wad(&self.swap_fee)?,
        )?;
        if let Some(fee) = &self.protocol_fee {
            params = params.with_protocol_fee(parse_wad(fee)?)?;
        }
        if let Some(min) = &self.min_weight {
            params = params.with_min_weight(parse_wad(min)?)?;
        }
        Ok(params.with_paused(self.paused))
    }

    pub fn build_pool(&self) -> Result<Pool, ConfigError> {
        Ok(Pool::new(self.params()?))
    }

    /// Symbols in the pool's (sorted) token order.
    pub fn symbols(&self, pool: &Pool) -> Result<[String; 2], ConfigError> {
        let tokens = pool.tokens();
        let symbol = |id: &TokenId| -> Result<String, ConfigError> {
            self.tokens
                .iter()
                .find(|t| t.address == *id)
                .map(|t| t.symbol.clone())
                .ok_or_else(|| ConfigError::UnknownToken(id.to_string()))
        };
        Ok([symbol(&tokens[0])?, symbol(&tokens[1])?])
    }

    /// Pool index and native-unit amount of `symbol`.
    fn amount(&self, pool: &Pool, symbol: &str, amount: &str) -> Result<(usize, U256), ConfigError> {
        let token = self.token(symbol)?;
        let index = self.index(pool, symbol)?;
        Ok((index, parse_units(amount, token.decimals)?))
    }

    fn index(&self, pool: &Pool, symbol: &str) -> Result<usize, ConfigError> {
        let token = self.token(symbol)?;
        pool.params()
            .index_of(&token.address)
            .ok_or_else(|| ConfigError::UnknownToken(symbol.to_string()))
    }

    fn amounts(
        &self,
        pool: &Pool,
        amounts: &BTreeMap<String, String>,
    ) -> Result<[U256; 2], ConfigError> {
        let mut out = [U256::zero(); 2];
        for (symbol, amount) in amounts {
            let (index, value) = self.amount(pool, symbol, amount)?;
            out[index] = value;
        }
        Ok(out)
    }
}

/// One step of a scenario, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Operation {
    Init {
        amounts: BTreeMap<String, String>,
    },
    SwapGivenIn {
        token_in: String,
        token_out: String,
        amount: String,
        #[serde(default)]
        min_out: Option<String>,
        #[serde(default)]
        deadline: Option<u64>,
    },
    SwapGivenOut {
        token_in: String,
        token_out: String,
        amount: String,
        #[serde(default)]
        max_in: Option<String>,
        #[serde(default)]
        deadline: Option<u64>,
    },
    JoinExactTokensIn {
        amounts: BTreeMap<String, String>,
        #[serde(default)]
        min_lp: Option<String>,
    },
    JoinTokenInForExactLp {
        token: String,
        lp: String,
        #[serde(default)]
        max_in: Option<String>,
    },
    ExitProportional {
        lp: String,
        #[serde(default)]
        min_amounts: BTreeMap<String, String>,
    },
    ExitOneToken {
        lp: String,
        token: String,
        #[serde(default)]
        min_out: Option<String>,
    },
    ExitExactTokensOut {
        amounts: BTreeMap<String, String>,
        #[serde(default)]
        max_lp: Option<String>,
    },
    /// `share` of the withdrawn value is paid in `token`.
    ExitRatio {
        lp: String,
        token: String,
        share: String,
        #[serde(default)]
        min_amounts: BTreeMap<String, String>,
    },
}

impl Operation {
    /// Resolves symbols and decimal strings against the pool.
    pub fn to_action(&self, config: &PoolConfig, pool: &Pool) -> Result<Action, ConfigError> {
        let tokens = pool.tokens();
        let opt_units = |symbol: &str, amount: &Option<String>| -> Result<Option<U256>, ConfigError> {
            amount
                .as_deref()
                .map(|a| config.amount(pool, symbol, a).map(|(_, value)| value))
                .transpose()
        };
        let opt_wad = |value: &Option<String>| -> Result<Option<U256>, ConfigError> {
            value
                .as_deref()
                .map(|v| parse_wad(v).map_err(ConfigError::from))
                .transpose()
        };

        let action = match self {
            Operation::Init { amounts } => Action::Join(JoinRequest::new(
                tokens,
                JoinKind::Init {
                    amounts_in: config.amounts(pool, amounts)?,
                },
            )),
            Operation::SwapGivenIn { token_in, token_out, amount, min_out, deadline } => {
                let mut req = SwapRequest::given_in(
                    config.token(token_in)?.address,
                    config.token(token_out)?.address,
                    config.amount(pool, token_in, amount)?.1,
                );
                if let Some(min) = opt_units(token_out, min_out)? {
                    req = req.with_limit(min);
                }
                if let Some(d) = deadline {
                    req = req.with_deadline(*d);
                }
                Action::Swap(req)
            }
            Operation::SwapGivenOut { token_in, token_out, amount, max_in, deadline } => {
                let mut req = SwapRequest::given_out(
                    config.token(token_in)?.address,
                    config.token(token_out)?.address,
                    config.amount(pool, token_out, amount)?.1,
                );
                if let Some(max) = opt_units(token_in, max_in)? {
                    req = req.with_limit(max);
                }
                if let Some(d) = deadline {
                    req = req.with_deadline(*d);
                }
                Action::Swap(req)
            }
            Operation::JoinExactTokensIn { amounts, min_lp } => Action::Join(JoinRequest::new(
                tokens,
                JoinKind::ExactTokensInForBptOut {
                    amounts_in: config.amounts(pool, amounts)?,
                    min_bpt_out: opt_wad(min_lp)?.unwrap_or_default(),
                },
            )),
            Operation::JoinTokenInForExactLp { token, lp, max_in } => Action::Join(JoinRequest::new(
                tokens,
                JoinKind::TokenInForExactBptOut {
                    bpt_out: parse_wad(lp)?,
                    token_index: config.index(pool, token)?,
                    max_amount_in: opt_units(token, max_in)?.unwrap_or(U256::MAX),
                },
            )),
            Operation::ExitProportional { lp, min_amounts } => Action::Exit(ExitRequest::new(
                tokens,
                ExitKind::ExactBptInForTokensOut {
                    bpt_in: parse_wad(lp)?,
                    min_amounts_out: config.amounts(pool, min_amounts)?,
                },
            )),
            Operation::ExitOneToken { lp, token, min_out } => Action::Exit(ExitRequest::new(
                tokens,
                ExitKind::ExactBptInForOneTokenOut {
                    bpt_in: parse_wad(lp)?,
                    token_index: config.index(pool, token)?,
                    min_amount_out: opt_units(token, min_out)?.unwrap_or_default(),
                },
            )),
            Operation::ExitExactTokensOut { amounts, max_lp } => Action::Exit(ExitRequest::new(
                tokens,
                ExitKind::BptInForExactTokensOut {
                    amounts_out: config.amounts(pool, amounts)?,
                    max_bpt_in: opt_wad(max_lp)?.unwrap_or(U256::MAX),
                },
            )),
            Operation::ExitRatio { lp, token, share, min_amounts } => {
                let share = parse_wad(share)?;
                if share > ONE {
                    return Err(CommonError::InvalidAmount(format!("share {share} above one")).into());
                }
                let ratio_token0 = if config.index(pool, token)? == 0 { share } else { ONE - share };
                Action::Exit(ExitRequest::new(
                    tokens,
                    ExitKind::ExactBptInForRatioOut {
                        bpt_in: parse_wad(lp)?,
                        ratio_token0,
                        min_amounts_out: config.amounts(pool, min_amounts)?,
                    },
                ))
            }
        };
        Ok(action)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Scenario {
    /// Unix seconds used for swap deadlines.
    #[serde(default)]
    pub now: u64,
    #[serde(default)]
    pub operations: Vec<Operation>,
}

impl Scenario {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        Self::from_toml_str(&read(path)?)
    }
}

fn read(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Outcome;
    use std::io::Write;

    const POOL: &str = r#"
        name = "BTC/USD"
        swap_fee = "0.001"
        protocol_fee = "0.01"

        [[tokens]]
        symbol = "USD"
        address = "0x0000000000000000000000000000000000000002"
        decimals = 6
        weight = "0.3"

        [[tokens]]
        symbol = "BTC"
        address = "0x0000000000000000000000000000000000000001"
        decimals = 9
        weight = "0.7"
    "#;

    const SCENARIO: &str = r#"
        now = 100

        [[operations]]
        type = "init"
        amounts = { BTC = "1000", USD = "2000" }

        [[operations]]
        type = "swap_given_in"
        token_in = "USD"
        token_out = "BTC"
        amount = "5"
        min_out = "1"
        deadline = 200
    "#;

    #[test]
    fn builds_sorted_pool_from_config() {
        let config = PoolConfig::from_toml_str(POOL).unwrap();
        let pool = config.build_pool().unwrap();
        assert_eq!(config.symbols(&pool).unwrap(), ["BTC".to_string(), "USD".to_string()]);
        assert_eq!(pool.params().scaling[0].decimals(), 9);
        assert_eq!(pool.params().protocol_fee, parse_wad("0.01").unwrap());
        assert_eq!(pool.weights()[0], parse_wad("0.7").unwrap());
    }

    #[test]
    fn replays_scenario_in_native_units() {
        let config = PoolConfig::from_toml_str(POOL).unwrap();
        let scenario = Scenario::from_toml_str(SCENARIO).unwrap();
        let mut pool = config.build_pool().unwrap();

        let mut outcomes = Vec::new();
        for op in &scenario.operations {
            let action = op.to_action(&config, &pool).unwrap();
            outcomes.push(pool.execute(&action, scenario.now).unwrap());
        }
        match &outcomes[1] {
            Outcome::Swap(r) => {
                assert_eq!(r.amount_in, U256::from(5_000_000u64));
                assert_eq!(r.amount_out, U256::from(1_066_549_922u64));
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        assert_eq!(pool.weights()[1], parse_wad("0.299775785380227711").unwrap());
    }

    #[test]
    fn rejects_unknown_symbols_and_token_counts() {
        let config = PoolConfig::from_toml_str(POOL).unwrap();
        let pool = config.build_pool().unwrap();
        let op = Operation::ExitOneToken {
            lp: "1".into(),
            token: "ETH".into(),
            min_out: None,
        };
        assert!(matches!(op.to_action(&config, &pool), Err(ConfigError::UnknownToken(_))));

        let single = r#"
            swap_fee = "0.001"
            [[tokens]]
            symbol = "BTC"
            address = "0x0000000000000000000000000000000000000001"
            weight = "1"
        "#;
        assert!(matches!(PoolConfig::from_toml_str(single), Err(ConfigError::TokenCount(1))));
    }

    #[test]
    fn ratio_share_is_expressed_per_token() {
        let config = PoolConfig::from_toml_str(POOL).unwrap();
        let pool = config.build_pool().unwrap();
        let op = Operation::ExitRatio {
            lp: "1".into(),
            token: "USD".into(),
            share: "0.25".into(),
            min_amounts: BTreeMap::new(),
        };
        match op.to_action(&config, &pool).unwrap() {
            Action::Exit(ExitRequest {
                kind: ExitKind::ExactBptInForRatioOut { ratio_token0, .. },
                ..
            }) => assert_eq!(ratio_token0, parse_wad("0.75").unwrap()),
            other => panic!("unexpected action {other:?}"),
        }
    }

    #[test]
    fn loads_from_files() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(POOL.as_bytes()).unwrap();
        let config = PoolConfig::from_path(file.path()).unwrap();
        assert_eq!(config.name.as_deref(), Some("BTC/USD"));

        let missing = PoolConfig::from_path(Path::new("/nonexistent/pool.toml"));
        assert!(matches!(missing, Err(ConfigError::Io { .. })));
    }
}
