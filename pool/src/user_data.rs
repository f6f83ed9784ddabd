// ------------------------------------------------------------
// Join / exit payloads
// ------------------------------------------------------------
// Typed sum types for in-process callers, plus a flat 32-byte-word
// encoding for byte-level callers: word 0 is the kind discriminant,
// followed by the kind's fields in declaration order (arrays inline).
use math::U256;

use crate::error::{PoolError, PoolResult};

const WORD: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinKind {
    /// First deposit; mints `2 × invariant`.
    Init { amounts_in: [U256; 2] },
    ExactTokensInForBptOut { amounts_in: [U256; 2], min_bpt_out: U256 },
    TokenInForExactBptOut { bpt_out: U256, token_index: usize, max_amount_in: U256 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitKind {
    ExactBptInForOneTokenOut { bpt_in: U256, token_index: usize, min_amount_out: U256 },
    ExactBptInForTokensOut { bpt_in: U256, min_amounts_out: [U256; 2] },
    BptInForExactTokensOut { amounts_out: [U256; 2], max_bpt_in: U256 },
    /// `ratio_token0` is the share of the withdrawn value wanted in token 0.
    ExactBptInForRatioOut { bpt_in: U256, ratio_token0: U256, min_amounts_out: [U256; 2] },
}

impl JoinKind {
    pub fn discriminant(&self) -> u8 {
        match self {
            JoinKind::Init { .. } => 0,
            JoinKind::ExactTokensInForBptOut { .. } => 1,
            JoinKind::TokenInForExactBptOut { .. } => 2,
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut words = vec![U256::from(self.discriminant())];
        match self {
            JoinKind::Init { amounts_in } => words.extend_from_slice(amounts_in),
            JoinKind::ExactTokensInForBptOut { amounts_in, min_bpt_out } => {
                words.extend_from_slice(amounts_in);
                words.push(*min_bpt_out);
            }
            JoinKind::TokenInForExactBptOut { bpt_out, token_index, max_amount_in } => {
                words.extend_from_slice(&[*bpt_out, U256::from(*token_index), *max_amount_in]);
            }
        }
        to_bytes(&words)
    }

    pub fn decode(data: &[u8]) -> PoolResult<Self> {
        let words = to_words(data)?;
        match discriminant(&words)? {
            0 => {
                expect_len(&words, 3)?;
                Ok(JoinKind::Init { amounts_in: [words[1], words[2]] })
            }
            1 => {
                expect_len(&words, 4)?;
                Ok(JoinKind::ExactTokensInForBptOut {
                    amounts_in: [words[1], words[2]],
                    min_bpt_out: words[3],
                })
            }
            2 => {
                expect_len(&words, 4)?;
                Ok(JoinKind::TokenInForExactBptOut {
                    bpt_out: words[1],
                    token_index: token_index(words[2])?,
                    max_amount_in: words[3],
                })
            }
            k => Err(PoolError::InvalidUserData(format!("unknown join kind {k}"))),
        }
    }
}

impl ExitKind {
    pub fn discriminant(&self) -> u8 {
        match self {
            ExitKind::ExactBptInForOneTokenOut { .. } => 0,
            ExitKind::ExactBptInForTokensOut { .. } => 1,
            ExitKind::BptInForExactTokensOut { .. } => 2,
            ExitKind::ExactBptInForRatioOut { .. } => 3,
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut words = vec![U256::from(self.discriminant())];
        match self {
            ExitKind::ExactBptInForOneTokenOut { bpt_in, token_index, min_amount_out } => {
                words.extend_from_slice(&[*bpt_in, U256::from(*token_index), *min_amount_out]);
            }
            ExitKind::ExactBptInForTokensOut { bpt_in, min_amounts_out } => {
                words.push(*bpt_in);
                words.extend_from_slice(min_amounts_out);
            }
            ExitKind::BptInForExactTokensOut { amounts_out, max_bpt_in } => {
                words.extend_from_slice(amounts_out);
                words.push(*max_bpt_in);
            }
            ExitKind::ExactBptInForRatioOut { bpt_in, ratio_token0, min_amounts_out } => {
                words.extend_from_slice(&[*bpt_in, *ratio_token0]);
                words.extend_from_slice(min_amounts_out);
            }
        }
        to_bytes(&words)
    }

    pub fn decode(data: &[u8]) -> PoolResult<Self> {
        let words = to_words(data)?;
        match discriminant(&words)? {
            0 => {
                expect_len(&words, 4)?;
                Ok(ExitKind::ExactBptInForOneTokenOut {
                    bpt_in: words[1],
                    token_index: token_index(words[2])?,
                    min_amount_out: words[3],
                })
            }
            1 => {
                expect_len(&words, 4)?;
                Ok(ExitKind::ExactBptInForTokensOut {
                    bpt_in: words[1],
                    min_amounts_out: [words[2], words[3]],
                })
            }
            2 => {
                expect_len(&words, 4)?;
                Ok(ExitKind::BptInForExactTokensOut {
                    amounts_out: [words[1], words[2]],
                    max_bpt_in: words[3],
                })
            }
            3 => {
                expect_len(&words, 5)?;
                Ok(ExitKind::ExactBptInForRatioOut {
                    bpt_in: words[1],
                    ratio_token0: words[2],
                    min_amounts_out: [words[3], words[4]],
                })
            }
            k => Err(PoolError::InvalidUserData(format!("unknown exit kind {k}"))),
        }
    }
}

fn to_bytes(words: &[U256]) -> Vec<u8> {
    let mut out = vec![0u8; words.len() * WORD];
    for (chunk, word) in out.chunks_exact_mut(WORD).zip(words) {
        word.to_big_endian(chunk);
    }
    out
}

fn to_words(data: &[u8]) -> PoolResult<Vec<U256>> {
    if data.is_empty() || data.len() % WORD != 0 {
        return Err(PoolError::InvalidUserData(format!(
            "payload of {} bytes is not a whole number of words",
            data.len()
        )));
    }
    Ok(data.chunks_exact(WORD).map(U256::from_big_endian).collect())
}

fn discriminant(words: &[U256]) -> PoolResult<u64> {
    let kind = words[0];
    if kind > U256::from(u8::MAX) {
        return Err(PoolError::InvalidUserData("kind out of range".into()));
    }
    Ok(kind.low_u64())
}

fn expect_len(words: &[U256], len: usize) -> PoolResult<()> {
    if words.len() != len {
        return Err(PoolError::InvalidUserData(format!(
            "expected {len} words, got {}",
            words.len()
        )));
    }
    Ok(())
}

fn token_index(word: U256) -> PoolResult<usize> {
    if word > U256::one() {
        return Err(PoolError::InvalidUserData("token index out of range".into()));
    }
    Ok(word.low_u64() as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_layout_is_word_aligned() {
        let kind = JoinKind::ExactTokensInForBptOut {
            amounts_in: [U256::from(800u64), U256::zero()],
            min_bpt_out: U256::from(7u64),
        };
        let bytes = kind.encode();
        assert_eq!(bytes.len(), 4 * WORD);
        assert_eq!(bytes[WORD - 1], 1);
        assert_eq!(&bytes[2 * WORD - 2..2 * WORD], &[0x03, 0x20]);
        assert_eq!(JoinKind::decode(&bytes).unwrap(), kind);
    }

    #[test]
    fn exit_ratio_decodes() {
        let kind = ExitKind::ExactBptInForRatioOut {
            bpt_in: U256::from(10u64),
            ratio_token0: U256::exp10(18),
            min_amounts_out: [U256::zero(), U256::one()],
        };
        assert_eq!(ExitKind::decode(&kind.encode()).unwrap(), kind);
    }

    #[test]
    fn rejects_malformed_payloads() {
        assert!(matches!(JoinKind::decode(&[]), Err(PoolError::InvalidUserData(_))));
        assert!(matches!(JoinKind::decode(&[0u8; 33]), Err(PoolError::InvalidUserData(_))));

        // Init with a missing amount.
        let mut short = JoinKind::Init { amounts_in: [U256::one(), U256::one()] }.encode();
        short.truncate(2 * WORD);
        assert!(matches!(JoinKind::decode(&short), Err(PoolError::InvalidUserData(_))));

        // Unknown kind.
        let mut bytes = vec![0u8; 3 * WORD];
        bytes[WORD - 1] = 9;
        assert!(matches!(ExitKind::decode(&bytes), Err(PoolError::InvalidUserData(_))));

        // Token index 2 in a two-token pool.
        let mut one_token = ExitKind::ExactBptInForOneTokenOut {
            bpt_in: U256::one(),
            token_index: 1,
            min_amount_out: U256::zero(),
        }
        .encode();
        one_token[3 * WORD - 1] = 2;
        assert!(matches!(ExitKind::decode(&one_token), Err(PoolError::InvalidUserData(_))));
    }
}
