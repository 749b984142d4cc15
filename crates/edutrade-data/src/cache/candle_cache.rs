//! (시장, 심볼, 타임프레임)별 캔들 시리즈 캐시.
//!
//! # 동작
//!
//! - `get`: 만료 전 항목만 반환 (만료 항목은 삭제하지 않음)
//! - `get_last`: 만료 여부와 무관하게 마지막으로 저장된 시리즈 반환
//! - `put`: 항목 전체를 교체 (부분 갱신 없음)
//! - `clear`: 필터에 맞는 항목 삭제
//!
//! 만료 항목은 요청 한도 초과 시 대체 데이터로 쓰이기 때문에 `clear`나
//! 다음 `put` 전까지 유지됩니다.

use std::collections::HashMap;
use std::fmt;
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use edutrade_core::{CandleSeries, MarketType, Timeframe};
use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, info};

/// 캐시 키. 심볼은 공백 제거 후 대문자로 정규화됩니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CacheKey {
    market: MarketType,
    symbol: String,
    timeframe: Timeframe,
}

impl CacheKey {
    /// 새 캐시 키를 생성합니다.
    pub fn new(market: MarketType, symbol: &str, timeframe: Timeframe) -> Self {
        Self {
            market,
            symbol: normalize_symbol(symbol),
            timeframe,
        }
    }

    pub fn market(&self) -> MarketType {
        self.market
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn timeframe(&self) -> Timeframe {
        self.timeframe
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.market, self.symbol, self.timeframe)
    }
}

fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

/// 캐시 항목.
#[derive(Debug, Clone)]
struct CacheEntry {
    series: CandleSeries,
    fetched_at: DateTime<Utc>,
    stored_at: Instant,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_valid_at(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// `clear`에 사용하는 필터. 지정하지 않은 조건은 모두 일치합니다.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheFilter {
    pub market: Option<MarketType>,
    pub symbol: Option<String>,
    pub timeframe: Option<Timeframe>,
}

impl CacheFilter {
    /// 모든 항목과 일치하는 필터.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn market(mut self, market: MarketType) -> Self {
        self.market = Some(market);
        self
    }

    pub fn symbol(mut self, symbol: &str) -> Self {
        self.symbol = Some(normalize_symbol(symbol));
        self
    }

    pub fn timeframe(mut self, timeframe: Timeframe) -> Self {
        self.timeframe = Some(timeframe);
        self
    }

    fn matches(&self, key: &CacheKey) -> bool {
        self.market.map_or(true, |m| m == key.market)
            && self
                .symbol
                .as_deref()
                .map_or(true, |s| normalize_symbol(s) == key.symbol)
            && self.timeframe.map_or(true, |t| t == key.timeframe)
    }
}

/// 캐시 항목 진단 정보.
#[derive(Debug, Clone, Serialize)]
pub struct CacheEntryInfo {
    pub key: String,
    pub candles: usize,
    pub fetched_at: DateTime<Utc>,
    pub age_secs: u64,
    /// 남은 유효 시간 (만료 시 0)
    pub expires_in_secs: u64,
    pub expired: bool,
}

/// 캐시 진단 정보.
#[derive(Debug, Clone, Serialize)]
pub struct CacheInfo {
    pub total: usize,
    pub valid: usize,
    pub expired: usize,
    pub entries: Vec<CacheEntryInfo>,
}

/// 인메모리 캔들 캐시.
///
/// 모든 연산은 동기이며 락을 잡은 채로 await하지 않습니다.
/// 락이 오염(poison)되어도 내부 맵은 항상 완전한 항목만 담고 있으므로 그대로 복구합니다.
#[derive(Debug, Default)]
pub struct CandleCache {
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
}

impl CandleCache {
    /// 빈 캐시를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 유효한(만료 전) 시리즈를 조회합니다.
    pub fn get(&self, key: &CacheKey) -> Option<CandleSeries> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let entry = entries.get(key)?;

        if entry.is_valid_at(Instant::now()) {
            debug!(key = %key, candles = entry.series.len(), "캐시 적중");
            Some(entry.series.clone())
        } else {
            debug!(key = %key, "캐시 만료");
            None
        }
    }

    /// 만료 여부와 관계없이 마지막으로 저장된 시리즈를 조회합니다.
    pub fn get_last(&self, key: &CacheKey) -> Option<CandleSeries> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(key).map(|entry| entry.series.clone())
    }

    /// 시리즈를 저장합니다. 기존 항목은 통째로 교체됩니다.
    pub fn put(&self, key: CacheKey, series: CandleSeries, ttl: Duration) {
        let now = Instant::now();
        let entry = CacheEntry {
            series,
            fetched_at: Utc::now(),
            stored_at: now,
            expires_at: now + ttl,
        };

        debug!(
            key = %key,
            candles = entry.series.len(),
            ttl_secs = ttl.as_secs(),
            "캐시 저장"
        );

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key, entry);
    }

    /// 필터와 일치하는 항목을 삭제하고 삭제된 개수를 반환합니다.
    pub fn clear(&self, filter: &CacheFilter) -> usize {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|key, _| !filter.matches(key));
        let removed = before - entries.len();

        info!(removed, remaining = entries.len(), "캐시 삭제");
        removed
    }

    /// 캐시 진단 정보를 반환합니다.
    pub fn info(&self) -> CacheInfo {
        let now = Instant::now();
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);

        let mut details: Vec<CacheEntryInfo> = entries
            .iter()
            .map(|(key, entry)| CacheEntryInfo {
                key: key.to_string(),
                candles: entry.series.len(),
                fetched_at: entry.fetched_at,
                age_secs: now.saturating_duration_since(entry.stored_at).as_secs(),
                expires_in_secs: entry.expires_at.saturating_duration_since(now).as_secs(),
                expired: !entry.is_valid_at(now),
            })
            .collect();
        details.sort_by(|a, b| a.key.cmp(&b.key));

        let expired = details.iter().filter(|e| e.expired).count();
        CacheInfo {
            total: details.len(),
            valid: details.len() - expired,
            expired,
            entries: details,
        }
    }

    /// 저장된 항목 수 (만료 항목 포함).
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edutrade_core::Candle;
    use rust_decimal_macros::dec;

    fn series(n: usize) -> CandleSeries {
        (0..n)
            .map(|i| {
                let base = dec!(100) + rust_decimal::Decimal::from(i as u64);
                Candle::try_new(base, base + dec!(2), base - dec!(1), base + dec!(1)).unwrap()
            })
            .collect()
    }

    fn btc_1h() -> CacheKey {
        CacheKey::new(MarketType::Crypto, "BTCUSDT", Timeframe::H1)
    }

    #[test]
    fn test_key_normalizes_symbol() {
        let key = CacheKey::new(MarketType::Stocks, "  aapl ", Timeframe::D1);

        assert_eq!(key.symbol(), "AAPL");
        assert_eq!(key, CacheKey::new(MarketType::Stocks, "AAPL", Timeframe::D1));
        assert_eq!(key.to_string(), "stocks:AAPL:1d");
    }

    #[test]
    fn test_round_trip() {
        let cache = CandleCache::new();
        cache.put(btc_1h(), series(3), Duration::from_secs(60));

        assert_eq!(cache.get(&btc_1h()), Some(series(3)));
        assert_eq!(cache.get_last(&btc_1h()), Some(series(3)));
    }

    #[test]
    fn test_expired_entry_only_available_via_get_last() {
        let cache = CandleCache::new();
        cache.put(btc_1h(), series(2), Duration::ZERO);

        assert_eq!(cache.get(&btc_1h()), None);
        assert_eq!(cache.get_last(&btc_1h()), Some(series(2)));
        // 만료 항목은 삭제되지 않음
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_put_overwrites_whole_entry() {
        let cache = CandleCache::new();
        cache.put(btc_1h(), series(5), Duration::ZERO);
        cache.put(btc_1h(), series(2), Duration::from_secs(60));

        assert_eq!(cache.get(&btc_1h()), Some(series(2)));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_missing_key() {
        let cache = CandleCache::new();
        assert!(cache.get(&btc_1h()).is_none());
        assert!(cache.get_last(&btc_1h()).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_clear_with_filters() {
        let cache = CandleCache::new();
        let ttl = Duration::from_secs(60);
        cache.put(btc_1h(), series(1), ttl);
        cache.put(CacheKey::new(MarketType::Crypto, "ETHUSDT", Timeframe::H1), series(1), ttl);
        cache.put(CacheKey::new(MarketType::Stocks, "AAPL", Timeframe::D1), series(1), ttl);
        cache.put(CacheKey::new(MarketType::Stocks, "AAPL", Timeframe::H1), series(1), ttl);

        assert_eq!(cache.clear(&CacheFilter::all().symbol("aapl").timeframe(Timeframe::H1)), 1);
        assert_eq!(cache.clear(&CacheFilter::all().market(MarketType::Crypto)), 2);
        assert_eq!(cache.clear(&CacheFilter::all().market(MarketType::Cedears)), 0);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.clear(&CacheFilter::all()), 1);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_info_counts() {
        let cache = CandleCache::new();
        cache.put(btc_1h(), series(4), Duration::from_secs(600));
        cache.put(
            CacheKey::new(MarketType::Stocks, "AAPL", Timeframe::D1),
            series(2),
            Duration::ZERO,
        );

        let info = cache.info();

        assert_eq!(info.total, 2);
        assert_eq!(info.valid, 1);
        assert_eq!(info.expired, 1);
        let btc = info.entries.iter().find(|e| e.key == "crypto:BTCUSDT:1h").unwrap();
        assert_eq!(btc.candles, 4);
        assert!(!btc.expired);
        assert!(btc.expires_in_secs > 590);
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_expires_after_ttl() {
        let cache = CandleCache::new();
        cache.put(btc_1h(), series(1), Duration::from_secs(600));

        tokio::time::advance(Duration::from_secs(599)).await;
        assert!(cache.get(&btc_1h()).is_some());

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(cache.get(&btc_1h()).is_none());
        assert!(cache.get_last(&btc_1h()).is_some());
    }
}
