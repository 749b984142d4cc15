//! Yahoo Finance 차트 API 제공자.
//!
//! 미국 주식과 CEDEAR(`.BA` 접미사) 일봉/주봉/월봉 및 시간봉을 조회합니다.
//!
//! 응답의 OHLC 필드 중 하나라도 `null`인 캔들(휴장 시간대 등)은 제외합니다.
//! 거래량이 `null`이면 거래량 없는 캔들로 취급합니다.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use edutrade_core::{decimal_from_f64, Candle, CandleSeries, Timeframe};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use super::http::{build_client, keep_last, read_json};
use super::CandleProvider;
use crate::error::{ProviderError, ProviderResult};

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
}

#[derive(Debug, Default, Deserialize)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

impl Quote {
    /// i번째 캔들. OHLC 중 하나라도 없거나 불변식을 어기면 `None`.
    fn candle_at(&self, i: usize, timestamp: Option<i64>) -> Option<Candle> {
        let field = |values: &[Option<f64>]| {
            values
                .get(i)
                .copied()
                .flatten()
                .and_then(decimal_from_f64)
        };

        let mut candle = Candle::try_new(
            field(&self.open)?,
            field(&self.high)?,
            field(&self.low)?,
            field(&self.close)?,
        )
        .ok()?;

        if let Some(volume) = field(&self.volume) {
            candle = candle.with_volume(volume).ok()?;
        }
        if let Some(time) = timestamp.and_then(|ts| DateTime::from_timestamp(ts, 0)) {
            candle = candle.with_open_time(time);
        }
        Some(candle)
    }
}

/// Yahoo Finance 캔들 제공자.
#[derive(Debug, Clone)]
pub struct YahooFinanceProvider {
    client: Client,
    base_url: String,
}

impl YahooFinanceProvider {
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

    /// 타임프레임 → Yahoo interval. 지원하지 않으면 `None`.
    fn interval_for(timeframe: Timeframe) -> Option<&'static str> {
        match timeframe {
            Timeframe::H1 => Some("1h"),
            Timeframe::H4 => Some("4h"),
            Timeframe::D1 => Some("1d"),
            Timeframe::W1 => Some("1wk"),
            Timeframe::MN1 => Some("1mo"),
            _ => None,
        }
    }

    /// 요청 캔들 수를 채우기 위한 조회 기간(일).
    ///
    /// 주말과 휴장일을 감안해 여유를 둡니다.
    fn lookback_days(timeframe: Timeframe, limit: usize) -> i64 {
        let limit = limit as i64;
        match timeframe {
            Timeframe::H1 => (limit / 24 + 7).max(30),
            Timeframe::H4 => (limit / 6 + 14).max(60),
            Timeframe::D1 => (limit + 30).max(365),
            _ => 365,
        }
    }

    fn parse_chart(symbol: &str, response: ChartResponse) -> ProviderResult<CandleSeries> {
        let result = match response.chart.result {
            Some(mut results) if !results.is_empty() => results.swap_remove(0),
            _ => {
                let reason = response
                    .chart
                    .error
                    .map(|e| {
                        format!(
                            "{}: {}",
                            e.code.unwrap_or_default(),
                            e.description.unwrap_or_default()
                        )
                    })
                    .unwrap_or_else(|| "empty result".to_string());
                return Err(ProviderError::NotFound(format!("yahoo {}: {}", symbol, reason)));
            }
        };

        let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
        let total = result.timestamp.len().max(quote.close.len());
        let candles: CandleSeries = (0..total)
            .filter_map(|i| quote.candle_at(i, result.timestamp.get(i).copied()))
            .collect();

        if candles.len() < total {
            debug!(symbol, dropped = total - candles.len(), "null OHLC 캔들 제외");
        }

        Ok(candles)
    }
}

#[async_trait]
impl CandleProvider for YahooFinanceProvider {
    fn name(&self) -> &str {
        "yahoo"
    }

    async fn fetch_candles(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> ProviderResult<CandleSeries> {
        let interval = Self::interval_for(timeframe).ok_or_else(|| {
            ProviderError::NotFound(format!("yahoo: 지원하지 않는 타임프레임 {}", timeframe))
        })?;
        let symbol = symbol.trim().to_uppercase();

        let period2 = Utc::now();
        let period1 = period2 - chrono::Duration::days(Self::lookback_days(timeframe, limit));

        let response = self
            .client
            .get(format!("{}/v8/finance/chart/{}", self.base_url, symbol))
            .query(&[
                ("interval", interval.to_string()),
                ("period1", period1.timestamp().to_string()),
                ("period2", period2.timestamp().to_string()),
                ("events", "history".to_string()),
                ("includeAdjustedClose", "true".to_string()),
            ])
            .send()
            .await?;

        let chart: ChartResponse = read_json(response, "yahoo").await?;
        let candles = Self::parse_chart(&symbol, chart)?;

        if candles.is_empty() {
            warn!(symbol = %symbol, timeframe = %timeframe, "Yahoo 응답에 유효한 캔들 없음");
            return Err(ProviderError::NotFound(format!("yahoo {}: 캔들 없음", symbol)));
        }
        debug!(symbol = %symbol, timeframe = %timeframe, count = candles.len(), "Yahoo 캔들 조회");

        Ok(keep_last(candles, limit))
    }
}
