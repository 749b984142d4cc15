//! 통합 테스트 공용 도구

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use edutrade_core::{Candle, CandleSeries, Timeframe};
use edutrade_data::{CandleProvider, ProviderResult};
use rust_decimal::Decimal;

type Handler = dyn Fn(&str) -> ProviderResult<CandleSeries> + Send + Sync;

/// 심볼별 응답을 클로저로 정의하는 테스트 제공자
pub struct MockProvider {
    name: String,
    handler: Box<Handler>,
    delay: Duration,
    calls: AtomicUsize,
}

impl MockProvider {
    pub fn new<F>(name: &str, handler: F) -> Self
    where
        F: Fn(&str) -> ProviderResult<CandleSeries> + Send + Sync + 'static,
    {
        Self {
            name: name.to_string(),
            handler: Box::new(handler),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    /// 항상 같은 결과를 반환하는 제공자
    pub fn fixed(name: &str, result: ProviderResult<CandleSeries>) -> Self {
        Self::new(name, move |_| result.clone())
    }

    /// 응답 전 지연 (tokio 가상 시간)
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }
}

#[async_trait]
impl CandleProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_candles(
        &self,
        symbol: &str,
        _timeframe: Timeframe,
        _limit: usize,
    ) -> ProviderResult<CandleSeries> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        (self.handler)(symbol)
    }
}

/// 종가가 1씩 오르는 양봉 시리즈
pub fn rising_series(len: usize) -> CandleSeries {
    (0..len)
        .map(|i| {
            let open = Decimal::from(100 + i as i64);
            Candle::try_new(open, open + Decimal::from(2), open - Decimal::ONE, open + Decimal::ONE)
                .unwrap()
        })
        .collect()
}
