//! Binance 현물 캔들 제공자.
//!
//! `GET /api/v3/klines` 공개 엔드포인트를 사용합니다 (인증 불필요).

use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use edutrade_core::{Candle, CandleSeries, Timeframe};
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use tracing::{debug, warn};

use super::http::build_client;
use super::CandleProvider;
use crate::error::{ProviderError, ProviderResult};

/// 요청당 최대 캔들 수.
const MAX_LIMIT: usize = 1000;

/// Binance 에러 응답.
#[derive(Debug, Deserialize)]
struct BinanceError {
    code: i32,
    msg: String,
}

/// Binance kline 배열 항목.
#[derive(Debug, Deserialize)]
struct BinanceKline(
    i64,    // 0: Open time
    String, // 1: Open
    String, // 2: High
    String, // 3: Low
    String, // 4: Close
    String, // 5: Volume
    i64,    // 6: Close time
    String, // 7: Quote asset volume
    i64,    // 8: Number of trades
    String, // 9: Taker buy base asset volume
    String, // 10: Taker buy quote asset volume
    String, // 11: Ignore
);

impl BinanceKline {
    /// 공통 캔들로 변환합니다. 잘못된 값이 있으면 `None`.
    fn to_candle(&self) -> Option<Candle> {
        let parse = |s: &str| Decimal::from_str(s).ok();

        let candle = Candle::try_new(
            parse(&self.1)?,
            parse(&self.2)?,
            parse(&self.3)?,
            parse(&self.4)?,
        )
        .ok()?
        .with_volume(parse(&self.5)?)
        .ok()?;

        Some(match DateTime::from_timestamp_millis(self.0) {
            Some(time) => candle.with_open_time(time),
            None => candle,
        })
    }
}

/// Binance 캔들 제공자.
#[derive(Debug, Clone)]
pub struct BinanceProvider {
    client: Client,
    base_url: String,
}

impl BinanceProvider {
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

    /// "BTC/USDT", "btcusdt" 형식을 "BTCUSDT"로 변환합니다.
    fn to_binance_symbol(symbol: &str) -> String {
        symbol.trim().replace(['/', '-'], "").to_uppercase()
    }

    /// 실패 응답을 분류합니다.
    fn classify_error(status: StatusCode, body: &str) -> ProviderError {
        // 429: 한도 초과, 418: 한도 초과 반복으로 IP 차단
        if status == StatusCode::TOO_MANY_REQUESTS || status == StatusCode::IM_A_TEAPOT {
            return ProviderError::RateLimited(format!("binance HTTP {}", status.as_u16()));
        }

        match serde_json::from_str::<BinanceError>(body) {
            Ok(error) => Self::map_error_code(status, error.code, &error.msg),
            Err(_) => {
                ProviderError::Upstream(format!("binance HTTP {}: {}", status.as_u16(), body))
            }
        }
    }

    /// Binance 에러 코드를 ProviderError로 매핑.
    fn map_error_code(status: StatusCode, code: i32, msg: &str) -> ProviderError {
        match code {
            -1003 => ProviderError::RateLimited(format!("binance {}: {}", code, msg)),
            -1121 => ProviderError::NotFound(format!("binance {}: {}", code, msg)),
            _ if status == StatusCode::BAD_REQUEST && msg.contains("Invalid symbol") => {
                ProviderError::NotFound(format!("binance {}: {}", code, msg))
            }
            _ if status == StatusCode::NOT_FOUND => {
                ProviderError::NotFound(format!("binance {}: {}", code, msg))
            }
            _ => ProviderError::Upstream(format!("binance {}: {}", code, msg)),
        }
    }
}

#[async_trait]
impl CandleProvider for BinanceProvider {
    fn name(&self) -> &str {
        "binance"
    }

    async fn fetch_candles(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> ProviderResult<CandleSeries> {
        let binance_symbol = Self::to_binance_symbol(symbol);
        let limit = limit.clamp(1, MAX_LIMIT);

        let response = self
            .client
            .get(format!("{}/api/v3/klines", self.base_url))
            .query(&[
                ("symbol", binance_symbol.clone()),
                ("interval", timeframe.as_str().to_string()),
                ("limit", limit.to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(Self::classify_error(status, &body));
        }

        let klines: Vec<BinanceKline> = serde_json::from_str(&body)?;
        let total = klines.len();
        let candles: CandleSeries = klines.iter().filter_map(BinanceKline::to_candle).collect();

        if candles.len() < total {
            warn!(
                symbol = %binance_symbol,
                dropped = total - candles.len(),
                "잘못된 kline 제외"
            );
        }
        debug!(
            symbol = %binance_symbol,
            timeframe = %timeframe,
            count = candles.len(),
            "Binance 캔들 조회"
        );

        Ok(candles)
    }
}
