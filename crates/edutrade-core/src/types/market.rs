//! 시장 유형 정의.
//!
//! 시장 유형에 따라 데이터 제공자가 결정됩니다:
//! - `Crypto` - CoinGecko (기본) / Binance (대체)
//! - `Stocks`, `Cedears` - Yahoo Finance

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 시장 유형 분류.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketType {
    /// 암호화폐 현물 시장
    Crypto,
    /// 미국 주식 시장
    Stocks,
    /// 아르헨티나 CEDEAR (해외 주식 예탁증서)
    Cedears,
}

impl MarketType {
    /// 지원되는 모든 시장.
    pub const ALL: [MarketType; 3] = [MarketType::Crypto, MarketType::Stocks, MarketType::Cedears];

    /// 소문자 시장 식별자를 반환합니다.
    pub fn as_str(&self) -> &'static str {
        match self {
            MarketType::Crypto => "crypto",
            MarketType::Stocks => "stocks",
            MarketType::Cedears => "cedears",
        }
    }

    /// 주식 계열(Yahoo Finance 데이터) 시장인지 확인합니다.
    pub fn is_equity(&self) -> bool {
        matches!(self, MarketType::Stocks | MarketType::Cedears)
    }
}

impl fmt::Display for MarketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MarketType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "crypto" => Ok(MarketType::Crypto),
            "stocks" => Ok(MarketType::Stocks),
            "cedears" => Ok(MarketType::Cedears),
            _ => Err(format!(
                "Invalid market: {}. Supported: crypto, stocks, cedears",
                s
            )),
        }
    }
}
