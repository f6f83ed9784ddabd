// Shared fixtures for unit tests.
use common::{parse_wad, PoolParams, TokenId, TokenParams};
use math::U256;

use crate::request::JoinRequest;
use crate::state::Pool;
use crate::user_data::JoinKind;

pub fn btc() -> TokenId {
    TokenId::from_low_u64(1)
}

pub fn usd() -> TokenId {
    TokenId::from_low_u64(2)
}

pub fn wad(s: &str) -> U256 {
    parse_wad(s).unwrap()
}

pub fn params(w_btc: &str, w_usd: &str) -> PoolParams {
    PoolParams::new(
        TokenParams::new(btc(), 18, wad(w_btc)),
        TokenParams::new(usd(), 18, wad(w_usd)),
        wad("0.001"),
    )
    .unwrap()
}

/// 1000 BTC / 2000 USD.
pub fn initialized_pool(w_btc: &str, w_usd: &str) -> Pool {
    let mut pool = Pool::new(params(w_btc, w_usd));
    let init = JoinKind::Init {
        amounts_in: [wad("1000"), wad("2000")],
    };
    pool.join(&JoinRequest::new(pool.tokens(), init)).unwrap();
    pool
}

/// Same 1000 BTC / 2000 USD pool with 1% of swap fees owed to the protocol.
pub fn initialized_pool_with_protocol_fee(w_btc: &str, w_usd: &str) -> Pool {
    let params = params(w_btc, w_usd).with_protocol_fee(wad("0.01")).unwrap();
    let mut pool = Pool::new(params);
    let init = JoinKind::Init {
        amounts_in: [wad("1000"), wad("2000")],
    };
    pool.join(&JoinRequest::new(pool.tokens(), init)).unwrap();
    pool
}

pub fn u(v: u128) -> U256 {
    U256::from(v)
}
