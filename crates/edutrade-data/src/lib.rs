//! 시장 데이터 수집 및 캐시.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - 타임프레임별 TTL을 가진 인메모리 캔들 캐시
//! - 외부 제공자 어댑터 (Binance, CoinGecko, Yahoo Finance)
//! - 캐시 우선 조회와 요청 한도 초과 대체 처리
//! - 시작 시 캐시 워밍업

pub mod cache;
pub mod error;
pub mod fetcher;
pub mod provider;
pub mod warmup;

pub use cache::{CacheEntryInfo, CacheFilter, CacheInfo, CacheKey, CacheTtlPolicy, CandleCache};
pub use error::{ProviderError, ProviderResult};
pub use fetcher::{
    CandleFetcher, DataSource, FallbackReason, FallbackSignal, FallbackStatus, FetchOutcome,
    MAX_CANDLES,
};
pub use provider::{
    BinanceProvider, CandleProvider, CoinGeckoProvider, CryptoProvider, ProviderRegistry,
    YahooFinanceProvider,
};
pub use warmup::{spawn_warm_up, warm_up, WarmupDetail, WarmupReport, WarmupStatus, WarmupTarget};
