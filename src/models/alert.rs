use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The fixed coin set the app tracks. Anything outside this enum is
/// rejected at the API boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoinId {
    Bitcoin,
    Ethereum,
    Solana,
}

impl CoinId {
    pub const ALL: [CoinId; 3] = [CoinId::Bitcoin, CoinId::Ethereum, CoinId::Solana];

    /// CoinGecko identifier, also the wire/store representation.
    pub fn api_id(&self) -> &'static str {
        match self {
            CoinId::Bitcoin => "bitcoin",
            CoinId::Ethereum => "ethereum",
            CoinId::Solana => "solana",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            CoinId::Bitcoin => "BTC",
            CoinId::Ethereum => "ETH",
            CoinId::Solana => "SOL",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            CoinId::Bitcoin => "Bitcoin",
            CoinId::Ethereum => "Ethereum",
            CoinId::Solana => "Solana",
        }
    }
}

impl fmt::Display for CoinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.api_id())
    }
}

impl FromStr for CoinId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bitcoin" => Ok(CoinId::Bitcoin),
            "ethereum" => Ok(CoinId::Ethereum),
            "solana" => Ok(CoinId::Solana),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertCondition {
    Above,
    Below,
}

impl fmt::Display for AlertCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertCondition::Above => f.write_str("above"),
            AlertCondition::Below => f.write_str("below"),
        }
    }
}

impl FromStr for AlertCondition {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "above" => Ok(AlertCondition::Above),
            "below" => Ok(AlertCondition::Below),
            _ => Err(()),
        }
    }
}

/// A user-defined threshold rule on one coin's price, owned by a device.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: String,
    pub device_id: String,
    pub coin: CoinId,
    pub coin_symbol: String,
    pub condition: AlertCondition,
    pub target_price: f64,
    pub triggered: bool,
    pub created_at: i64,
}
