//! CoinGecko OHLC 제공자.
//!
//! `GET /coins/{id}/ohlc?vs_currency=usd&days=N` 엔드포인트를 사용합니다.
//! CoinGecko는 일 단위 기간만 받으며 캔들 간격은 기간에 따라 자동으로 결정됩니다.
//! 거래량은 제공되지 않습니다.

use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use edutrade_core::{decimal_from_f64, Candle, CandleSeries, Timeframe};
use reqwest::Client;
use tracing::debug;

use super::http::{build_client, keep_last, read_json};
use super::CandleProvider;
use crate::error::{ProviderError, ProviderResult};

/// 거래 심볼 → CoinGecko 코인 ID.
const COIN_IDS: [(&str, &str); 5] = [
    ("BTCUSDT", "bitcoin"),
    ("ETHUSDT", "ethereum"),
    ("SOLUSDT", "solana"),
    ("BNBUSDT", "binancecoin"),
    ("XRPUSDT", "ripple"),
];

/// CoinGecko 캔들 제공자.
#[derive(Debug, Clone)]
pub struct CoinGeckoProvider {
    client: Client,
    base_url: String,
}

impl CoinGeckoProvider {
    /// 새 제공자를 생성합니다.
    pub fn new(base_url: &str, timeout: Duration) -> ProviderResult<Self> {
        Ok(Self::with_client(build_client(timeout)?, base_url))
    }

    /// 기존 HTTP 클라이언트를 공유하여 생성합니다.
    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// 심볼에 해당하는 코인 ID.
    pub fn coin_id(symbol: &str) -> Option<&'static str> {
        let symbol = symbol.trim().replace('/', "").to_uppercase();
        COIN_IDS
            .iter()
            .find(|(s, _)| *s == symbol)
            .map(|(_, id)| *id)
    }

    /// 타임프레임별 조회 기간(일).
    fn days_for(timeframe: Timeframe) -> u32 {
        match timeframe {
            Timeframe::H1 => 1,
            Timeframe::H4 => 30,
            Timeframe::D1 => 90,
            _ => 2,
        }
    }

    /// `[timestamp_ms, open, high, low, close]` 행을 캔들로 변환합니다.
    fn to_candle(row: &[f64; 5]) -> Option<Candle> {
        let [ts, open, high, low, close] = *row;
        let candle = Candle::try_new(
            decimal_from_f64(open)?,
            decimal_from_f64(high)?,
            decimal_from_f64(low)?,
            decimal_from_f64(close)?,
        )
        .ok()?;

        Some(match DateTime::from_timestamp_millis(ts as i64) {
            Some(time) => candle.with_open_time(time),
            None => candle,
        })
    }
}

#[async_trait]
impl CandleProvider for CoinGeckoProvider {
    fn name(&self) -> &str {
        "coingecko"
    }

    async fn fetch_candles(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> ProviderResult<CandleSeries> {
        let coin_id = Self::coin_id(symbol)
            .ok_or_else(|| ProviderError::NotFound(format!("coingecko: 지원하지 않는 심볼 {}", symbol)))?;
        let days = Self::days_for(timeframe);

        let response = self
            .client
            .get(format!("{}/coins/{}/ohlc", self.base_url, coin_id))
            .query(&[("vs_currency", "usd".to_string()), ("days", days.to_string())])
            .send()
            .await?;

        let rows: Vec<[f64; 5]> = read_json(response, "coingecko").await?;
        let candles: CandleSeries = rows.iter().filter_map(Self::to_candle).collect();

        debug!(coin_id, days, count = candles.len(), "CoinGecko 캔들 조회");

        Ok(keep_last(candles, limit))
    }
}
