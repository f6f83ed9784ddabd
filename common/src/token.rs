use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::CommonError;

/// 20-byte token address. Ordering is byte-wise, which is also the
/// numeric order of the address.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TokenId(pub [u8; 20]);

impl TokenId {
    pub const ZERO: TokenId = TokenId([0u8; 20]);

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// Address whose last bytes hold `n`; handy for tests and fixtures.
    pub fn from_low_u64(n: u64) -> Self {
        let mut bytes = [0u8; 20];
        bytes[12..].copy_from_slice(&n.to_be_bytes());
        TokenId(bytes)
    }
}

impl FromStr for TokenId {
    type Err = CommonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let raw = hex::decode(digits).map_err(|_| CommonError::InvalidAddress(s.to_string()))?;
        let bytes: [u8; 20] = raw
            .try_into()
            .map_err(|_| CommonError::InvalidAddress(s.to_string()))?;
        Ok(TokenId(bytes))
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TokenId({})", self)
    }
}

impl Serialize for TokenId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TokenId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_with_and_without_prefix() {
        let a: TokenId = "0x000000000000000000000000000000000000dEaD".parse().unwrap();
        let b: TokenId = "000000000000000000000000000000000000dead".parse().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "0x000000000000000000000000000000000000dead");
        assert_eq!(a, TokenId::from_low_u64(0xdead));
    }

    #[test]
    fn rejects_bad_addresses() {
        assert!(matches!("0x1234".parse::<TokenId>(), Err(CommonError::InvalidAddress(_))));
        assert!("0xzz00000000000000000000000000000000000000".parse::<TokenId>().is_err());
    }

    #[test]
    fn orders_numerically() {
        assert!(TokenId::from_low_u64(1) < TokenId::from_low_u64(2));
        assert!(TokenId::ZERO.is_zero());
    }
}
