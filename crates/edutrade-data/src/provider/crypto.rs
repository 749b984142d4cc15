//! 암호화폐 복합 제공자.
//!
//! 등록 순서대로 소스를 시도하고 처음 성공한 결과를 반환합니다.
//! 모두 실패하면 하나라도 요청 한도 초과였던 경우 `RateLimited`를,
//! 아니면 마지막 소스의 오류를 반환합니다.

use std::sync::Arc;

use async_trait::async_trait;
use edutrade_core::{CandleSeries, Timeframe};
use tracing::{debug, warn};

use super::CandleProvider;
use crate::error::{ProviderError, ProviderResult};

/// 순차 대체(fallback) 제공자.
pub struct CryptoProvider {
    sources: Vec<Arc<dyn CandleProvider>>,
}

impl CryptoProvider {
    /// 시도 순서대로 소스를 받아 생성합니다.
    pub fn new(sources: Vec<Arc<dyn CandleProvider>>) -> Self {
        Self { sources }
    }
}

#[async_trait]
impl CandleProvider for CryptoProvider {
    fn name(&self) -> &str {
        "crypto"
    }

    async fn fetch_candles(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> ProviderResult<CandleSeries> {
        let mut rate_limited: Option<ProviderError> = None;
        let mut last_error: Option<ProviderError> = None;

        for source in &self.sources {
            match source.fetch_candles(symbol, timeframe, limit).await {
                Ok(candles) => {
                    debug!(
                        source = source.name(),
                        symbol,
                        count = candles.len(),
                        "암호화폐 데이터 조회 성공"
                    );
                    return Ok(candles);
                }
                Err(e) => {
                    warn!(
                        source = source.name(),
                        symbol,
                        error = %e,
                        "암호화폐 소스 실패, 다음 소스 시도"
                    );
                    if e.is_rate_limited() && rate_limited.is_none() {
                        rate_limited = Some(e.clone());
                    }
                    last_error = Some(e);
                }
            }
        }

        Err(rate_limited.or(last_error).unwrap_or_else(|| {
            ProviderError::Upstream("crypto: 등록된 데이터 소스 없음".to_string())
        }))
    }
}
