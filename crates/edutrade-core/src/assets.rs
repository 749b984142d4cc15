//! 지원 자산 목록.
//!
//! 시장별로 분석 가능한 심볼과 표시 이름을 제공합니다.
//! 목록에 없는 심볼도 조회는 가능하지만, 화면 선택지는 이 목록을 따릅니다.

use serde::Serialize;

use crate::types::MarketType;

/// 지원 자산 정보.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AssetInfo {
    /// 조회에 사용하는 심볼
    pub symbol: &'static str,
    /// 표시 이름
    pub name: &'static str,
}

const fn asset(symbol: &'static str, name: &'static str) -> AssetInfo {
    AssetInfo { symbol, name }
}

static CRYPTO_ASSETS: [AssetInfo; 2] = [
    asset("BTCUSDT", "Bitcoin"),
    asset("ETHUSDT", "Ethereum"),
];

static STOCK_ASSETS: [AssetInfo; 4] = [
    asset("AAPL", "Apple Inc."),
    asset("TSLA", "Tesla Inc."),
    asset("MSFT", "Microsoft Corporation"),
    asset("GOOGL", "Alphabet Inc. (Google)"),
];

static CEDEAR_ASSETS: [AssetInfo; 3] = [
    asset("AAPL.BA", "Apple CEDEAR"),
    asset("TSLA.BA", "Tesla CEDEAR"),
    asset("MSFT.BA", "Microsoft CEDEAR"),
];

/// 시장별 지원 자산 목록.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SupportedAssets {
    pub crypto: &'static [AssetInfo],
    pub stocks: &'static [AssetInfo],
    pub cedears: &'static [AssetInfo],
}

impl SupportedAssets {
    /// 전체 목록.
    pub fn all() -> Self {
        Self {
            crypto: &CRYPTO_ASSETS,
            stocks: &STOCK_ASSETS,
            cedears: &CEDEAR_ASSETS,
        }
    }

    /// 시장의 지원 자산.
    pub fn for_market(market: MarketType) -> &'static [AssetInfo] {
        match market {
            MarketType::Crypto => &CRYPTO_ASSETS,
            MarketType::Stocks => &STOCK_ASSETS,
            MarketType::Cedears => &CEDEAR_ASSETS,
        }
    }

    /// 심볼의 표시 이름 (대소문자 무시).
    pub fn name_of(market: MarketType, symbol: &str) -> Option<&'static str> {
        let symbol = symbol.trim();
        Self::for_market(market)
            .iter()
            .find(|a| a.symbol.eq_ignore_ascii_case(symbol))
            .map(|a| a.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalogue_per_market() {
        assert_eq!(SupportedAssets::for_market(MarketType::Crypto).len(), 2);
        assert_eq!(SupportedAssets::for_market(MarketType::Stocks).len(), 4);
        assert_eq!(SupportedAssets::for_market(MarketType::Cedears).len(), 3);
        assert!(SupportedAssets::for_market(MarketType::Cedears)
            .iter()
            .all(|a| a.symbol.ends_with(".BA")));
    }

    #[test]
    fn test_name_lookup() {
        assert_eq!(
            SupportedAssets::name_of(MarketType::Stocks, " googl "),
            Some("Alphabet Inc. (Google)")
        );
        assert_eq!(SupportedAssets::name_of(MarketType::Crypto, "AAPL"), None);
    }

    #[test]
    fn test_catalogue_json_shape() {
        let json = serde_json::to_value(SupportedAssets::all()).unwrap();

        assert_eq!(json["crypto"][0]["symbol"], "BTCUSDT");
        assert_eq!(json["crypto"][0]["name"], "Bitcoin");
        assert_eq!(json["cedears"][2]["symbol"], "MSFT.BA");
    }
}
