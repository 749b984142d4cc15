//! 외부 캔들 데이터 제공자.
//!
//! 시장별 제공자:
//! - `crypto`: CoinGecko → Binance 순서로 시도 ([`CryptoProvider`])
//! - `stocks`, `cedears`: Yahoo Finance ([`YahooFinanceProvider`])
//!
//! 각 제공자는 응답을 공통 [`Candle`](edutrade_core::Candle) 형식으로 변환하고
//! 실패를 [`ProviderError`](crate::error::ProviderError)로 분류합니다.

mod binance;
mod coingecko;
mod crypto;
mod http;
mod yahoo;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use edutrade_core::{CandleSeries, MarketType, ProvidersConfig, Timeframe};

use crate::error::ProviderResult;

pub use binance::BinanceProvider;
pub use coingecko::CoinGeckoProvider;
pub use crypto::CryptoProvider;
pub use yahoo::YahooFinanceProvider;

/// 캔들 데이터 제공자 trait.
#[async_trait]
pub trait CandleProvider: Send + Sync {
    /// 로그용 제공자 이름.
    fn name(&self) -> &str;

    /// 캔들스틱 데이터 조회.
    ///
    /// # 인자
    /// * `symbol` - 심볼 (예: "BTCUSDT", "AAPL", "AAPL.BA")
    /// * `timeframe` - 타임프레임
    /// * `limit` - 최대 캔들 수
    ///
    /// 오래된 캔들이 앞에 오는 시리즈를 반환합니다.
    async fn fetch_candles(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> ProviderResult<CandleSeries>;
}

/// 시장별 제공자 레지스트리.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<MarketType, Arc<dyn CandleProvider>>,
}

impl ProviderRegistry {
    /// 빈 레지스트리를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 시장에 제공자를 등록합니다. 기존 등록은 교체됩니다.
    pub fn with_provider(mut self, market: MarketType, provider: Arc<dyn CandleProvider>) -> Self {
        self.providers.insert(market, provider);
        self
    }

    /// 시장에 해당하는 제공자를 조회합니다.
    pub fn get(&self, market: MarketType) -> Option<Arc<dyn CandleProvider>> {
        self.providers.get(&market).cloned()
    }

    /// 설정에서 기본 제공자 구성을 생성합니다.
    ///
    /// 모든 제공자는 하나의 HTTP 클라이언트를 공유합니다.
    pub fn from_config(config: &ProvidersConfig) -> ProviderResult<Self> {
        let client = http::build_client(Duration::from_secs(config.timeout_secs))?;

        let coingecko: Arc<dyn CandleProvider> = Arc::new(CoinGeckoProvider::with_client(
            client.clone(),
            &config.coingecko_base_url,
        ));
        let binance: Arc<dyn CandleProvider> = Arc::new(BinanceProvider::with_client(
            client.clone(),
            &config.binance_base_url,
        ));
        let yahoo: Arc<dyn CandleProvider> =
            Arc::new(YahooFinanceProvider::with_client(client, &config.yahoo_base_url));
        let crypto: Arc<dyn CandleProvider> =
            Arc::new(CryptoProvider::new(vec![coingecko, binance]));

        // 주식 계열은 Yahoo Finance, 나머지는 암호화폐 복합 제공자
        Ok(MarketType::ALL
            .into_iter()
            .fold(Self::new(), |registry, market| {
                let provider = if market.is_equity() {
                    yahoo.clone()
                } else {
                    crypto.clone()
                };
                registry.with_provider(market, provider)
            }))
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut markets: Vec<_> = self
            .providers
            .iter()
            .map(|(market, provider)| (market.as_str(), provider.name().to_string()))
            .collect();
        markets.sort();
        f.debug_struct("ProviderRegistry")
            .field("providers", &markets)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_from_config_covers_all_markets() {
        let registry = ProviderRegistry::from_config(&ProvidersConfig::default()).unwrap();

        assert_eq!(registry.get(MarketType::Crypto).unwrap().name(), "crypto");
        assert_eq!(registry.get(MarketType::Stocks).unwrap().name(), "yahoo");
        assert_eq!(registry.get(MarketType::Cedears).unwrap().name(), "yahoo");
    }

    #[test]
    fn test_empty_registry() {
        assert!(ProviderRegistry::new().get(MarketType::Crypto).is_none());
    }
}
