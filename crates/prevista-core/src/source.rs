use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Canonical provider identifiers used in selections and envelopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    /// Exchange trading API (spot k-lines, string-typed prices).
    Binance,
    /// Market-data aggregator (market-chart millisecond series).
    Coingecko,
    /// General financial-data provider (chart endpoint, second-resolution).
    Yahoo,
}

impl ProviderId {
    pub const ALL: [Self; 3] = [Self::Binance, Self::Coingecko, Self::Yahoo];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Binance => "binance",
            Self::Coingecko => "coingecko",
            Self::Yahoo => "yahoo",
        }
    }
}

impl Display for ProviderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "binance" => Ok(Self::Binance),
            "coingecko" => Ok(Self::Coingecko),
            "yahoo" => Ok(Self::Yahoo),
            other => Err(ValidationError::InvalidProvider {
                value: other.to_owned(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_provider_id() {
        let parsed = ProviderId::from_str(" CoinGecko ").expect("must parse");
        assert_eq!(parsed, ProviderId::Coingecko);
    }

    #[test]
    fn rejects_unknown_provider() {
        let err = ProviderId::from_str("kraken").expect_err("must fail");
        assert!(matches!(err, ValidationError::InvalidProvider { .. }));
    }
}
