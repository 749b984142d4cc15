//! 캐시 우선 캔들 조회와 요청 한도 초과 대체 처리.
//!
//! # 동작 흐름
//!
//! ```text
//! fetch(market, symbol, timeframe, limit)
//!         │
//!   ┌─────▼─────┐  적중
//!   │ cache.get │────────────────────────────▶ Candles(Cache)
//!   └─────┬─────┘
//!         │ 미스
//!   ┌─────▼──────────────┐
//!   │ 키별 Lock 획득       │ ← 같은 키는 하나의 요청만 제공자 호출
//!   │ (캐시 재확인)        │───────────────────▶ Candles(Cache)
//!   └─────┬──────────────┘
//!         │
//!   ┌─────▼──────────────┐  성공
//!   │ 제공자 호출 (timeout) │──▶ cache.put ────▶ Candles(Provider)
//!   └─────┬──────────────┘
//!         │ RateLimited
//!   ┌─────▼─────────┐  있음
//!   │ cache.get_last │──────────────────────▶ Candles(StaleCache)
//!   └─────┬─────────┘
//!         │ 없음
//!         ▼
//!   Unavailable(FallbackSignal)
//! ```
//!
//! 요청 한도 초과 외의 오류(NotFound, Timeout, Upstream)는 그대로 전파되며
//! 오래된 캐시로 대체하지 않습니다.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use edutrade_core::{AppConfig, CandleSeries, Confidence, MarketType, Timeframe};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use crate::cache::{CacheKey, CacheTtlPolicy, CandleCache};
use crate::error::{ProviderError, ProviderResult};
use crate::provider::ProviderRegistry;

/// 캐시 키별 조회 Lock 맵.
type FetchLockMap = Arc<RwLock<HashMap<CacheKey, Arc<RwLock<()>>>>>;

/// 한 번에 조회할 수 있는 최대 캔들 수.
pub const MAX_CANDLES: usize = 1000;

/// 기본 제공자 호출 타임아웃.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// 대체 신호 상태 코드.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FallbackStatus {
    DataTemporarilyUnavailable,
}

/// 대체 신호 사유 코드.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FallbackReason {
    DataSourceRateLimit,
}

impl FallbackReason {
    /// 코드 문자열.
    pub fn code(&self) -> &'static str {
        match self {
            FallbackReason::DataSourceRateLimit => "DATA_SOURCE_RATE_LIMIT",
        }
    }
}

/// 요청 한도 초과이고 캐시에도 데이터가 없을 때 반환하는 신호.
///
/// 오류가 아니라 정상 응답으로 표시 계층에 전달됩니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackSignal {
    pub status: FallbackStatus,
    pub reason: FallbackReason,
    pub confidence: Confidence,
    pub market: MarketType,
    pub symbol: String,
    pub timeframe: Timeframe,
}

impl FallbackSignal {
    /// 요청 한도 초과 신호를 생성합니다.
    pub fn rate_limited(key: &CacheKey) -> Self {
        Self {
            status: FallbackStatus::DataTemporarilyUnavailable,
            reason: FallbackReason::DataSourceRateLimit,
            confidence: Confidence::Low,
            market: key.market(),
            symbol: key.symbol().to_string(),
            timeframe: key.timeframe(),
        }
    }
}

/// 캔들 데이터 출처.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    /// 유효한 캐시
    Cache,
    /// 제공자 직접 조회
    Provider,
    /// 요청 한도 초과로 만료된 캐시 사용
    StaleCache,
}

/// 조회 결과.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Candles {
        series: CandleSeries,
        source: DataSource,
    },
    Unavailable(FallbackSignal),
}

impl FetchOutcome {
    /// 캔들 시리즈 (대체 신호이면 `None`).
    pub fn series(&self) -> Option<&CandleSeries> {
        match self {
            FetchOutcome::Candles { series, .. } => Some(series),
            FetchOutcome::Unavailable(_) => None,
        }
    }

    /// 데이터 출처 (대체 신호이면 `None`).
    pub fn source(&self) -> Option<DataSource> {
        match self {
            FetchOutcome::Candles { source, .. } => Some(*source),
            FetchOutcome::Unavailable(_) => None,
        }
    }

    /// 대체 신호인지 확인.
    pub fn is_fallback(&self) -> bool {
        matches!(self, FetchOutcome::Unavailable(_))
    }
}

/// 캐시 우선 캔들 조회기.
pub struct CandleFetcher {
    cache: Arc<CandleCache>,
    providers: ProviderRegistry,
    ttl_policy: CacheTtlPolicy,
    timeout: Duration,
    /// 동시성 제어를 위한 Lock 맵
    fetch_locks: FetchLockMap,
}

impl CandleFetcher {
    /// 새 조회기를 생성합니다.
    pub fn new(
        cache: Arc<CandleCache>,
        providers: ProviderRegistry,
        ttl_policy: CacheTtlPolicy,
    ) -> Self {
        Self {
            cache,
            providers,
            ttl_policy,
            timeout: DEFAULT_TIMEOUT,
            fetch_locks: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// 설정에서 기본 제공자 구성으로 생성합니다.
    pub fn from_config(config: &AppConfig, cache: Arc<CandleCache>) -> ProviderResult<Self> {
        let providers = ProviderRegistry::from_config(&config.providers)?;
        Ok(Self::new(cache, providers, CacheTtlPolicy::from_config(&config.cache))
            .with_timeout(Duration::from_secs(config.providers.timeout_secs)))
    }

    /// 제공자 호출 타임아웃을 설정합니다.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// 공유 캐시.
    pub fn cache(&self) -> &Arc<CandleCache> {
        &self.cache
    }

    /// TTL 정책.
    pub fn ttl_policy(&self) -> &CacheTtlPolicy {
        &self.ttl_policy
    }

    /// 캔들 데이터 조회 (캐시 우선, 요청 한도 초과 시 대체).
    ///
    /// `limit`은 1..=[`MAX_CANDLES`] 범위여야 합니다.
    /// 캐시에서 반환할 때는 최근 `limit`개만 반환합니다.
    #[instrument(skip(self), fields(market = %market, timeframe = %timeframe))]
    pub async fn fetch(
        &self,
        market: MarketType,
        symbol: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> ProviderResult<FetchOutcome> {
        if !(1..=MAX_CANDLES).contains(&limit) {
            return Err(ProviderError::InvalidRequest(format!(
                "limit은 1..={} 범위여야 합니다: {}",
                MAX_CANDLES, limit
            )));
        }

        let key = CacheKey::new(market, symbol, timeframe);

        // 1. 캐시 확인
        if let Some(series) = self.cache.get(&key) {
            return Ok(Self::candles(series, limit, DataSource::Cache));
        }

        // 2. 동시성 제어: 같은 키는 하나의 요청만 제공자 호출
        let lock = self.get_or_create_lock(&key).await;
        let outcome = {
            let _guard = lock.write().await;
            self.fetch_locked(&key, limit).await
        };
        self.release_lock(&key, lock).await;

        outcome
    }

    /// 키 Lock을 잡은 상태에서 캐시 재확인 후 제공자를 호출합니다.
    async fn fetch_locked(&self, key: &CacheKey, limit: usize) -> ProviderResult<FetchOutcome> {
        if let Some(series) = self.cache.get(key) {
            debug!(key = %key, "대기 중 다른 요청이 캐시를 채움");
            return Ok(Self::candles(series, limit, DataSource::Cache));
        }

        // 3. 제공자 호출
        match self.call_provider(key, limit).await {
            Ok(series) if series.is_empty() => {
                // 빈 시리즈는 캐시하지 않음
                warn!(key = %key, "제공자가 빈 시리즈를 반환");
                Ok(Self::candles(series, limit, DataSource::Provider))
            }
            Ok(series) => {
                info!(key = %key, count = series.len(), "제공자 조회 성공");
                self.cache.put(
                    key.clone(),
                    series.clone(),
                    self.ttl_policy.ttl_for(key.timeframe()),
                );
                Ok(Self::candles(series, limit, DataSource::Provider))
            }
            Err(ProviderError::RateLimited(reason)) => {
                // 4. 요청 한도 초과: 오래된 캐시 또는 대체 신호
                match self.cache.get_last(key) {
                    Some(series) => {
                        warn!(key = %key, reason = %reason, "요청 한도 초과, 만료된 캐시 사용");
                        Ok(Self::candles(series, limit, DataSource::StaleCache))
                    }
                    None => {
                        warn!(key = %key, reason = %reason, "요청 한도 초과, 캐시 없음");
                        Ok(FetchOutcome::Unavailable(FallbackSignal::rate_limited(key)))
                    }
                }
            }
            Err(e) => {
                warn!(key = %key, error = %e, "제공자 조회 실패");
                Err(e)
            }
        }
    }

    async fn call_provider(&self, key: &CacheKey, limit: usize) -> ProviderResult<CandleSeries> {
        let provider = self.providers.get(key.market()).ok_or_else(|| {
            ProviderError::NotFound(format!("{} 시장의 데이터 제공자 없음", key.market()))
        })?;

        debug!(provider = provider.name(), key = %key, limit, "제공자 호출");

        tokio::time::timeout(
            self.timeout,
            provider.fetch_candles(key.symbol(), key.timeframe(), limit),
        )
        .await
        .map_err(|_| {
            ProviderError::Timeout(format!(
                "{} 응답 없음 ({}초 초과)",
                provider.name(),
                self.timeout.as_secs_f64()
            ))
        })?
    }

    fn candles(series: CandleSeries, limit: usize, source: DataSource) -> FetchOutcome {
        let skip = series.len().saturating_sub(limit);
        FetchOutcome::Candles {
            series: series.into_iter().skip(skip).collect(),
            source,
        }
    }

    /// 대기 중인 요청이 없으면 키 Lock을 맵에서 제거합니다.
    ///
    /// 맵의 쓰기 Lock을 잡은 동안에는 새 복제본이 생기지 않으므로,
    /// 참조 수가 맵과 현재 요청 둘뿐이면 제거해도 안전합니다.
    async fn release_lock(&self, key: &CacheKey, lock: Arc<RwLock<()>>) {
        let mut locks = self.fetch_locks.write().await;
        if Arc::strong_count(&lock) <= 2 {
            locks.remove(key);
        }
    }

    /// 심볼+타임프레임별 Lock 획득 또는 생성.
    async fn get_or_create_lock(&self, key: &CacheKey) -> Arc<RwLock<()>> {
        let locks = self.fetch_locks.read().await;
        if let Some(lock) = locks.get(key) {
            return lock.clone();
        }
        drop(locks);

        let mut locks = self.fetch_locks.write().await;
        locks
            .entry(key.clone())
            .or_insert_with(|| Arc::new(RwLock::new(())))
            .clone()
    }
}
