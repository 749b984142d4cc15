//! 캐시 우선 조회, 요청 한도 초과 대체, 워밍업 통합 테스트

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{rising_series, MockProvider};
use edutrade_core::{Confidence, MarketType, Timeframe};
use edutrade_data::{
    spawn_warm_up, warm_up, CacheKey, CacheTtlPolicy, CandleCache, CandleFetcher, CandleProvider,
    CryptoProvider, DataSource, FallbackReason, FallbackStatus, FetchOutcome, ProviderError,
    ProviderRegistry, WarmupStatus, WarmupTarget,
};

fn fetcher_with(
    market: MarketType,
    provider: Arc<MockProvider>,
) -> (CandleFetcher, Arc<CandleCache>) {
    let cache = Arc::new(CandleCache::new());
    let registry = ProviderRegistry::new().with_provider(market, provider);
    let fetcher = CandleFetcher::new(cache.clone(), registry, CacheTtlPolicy::default());
    (fetcher, cache)
}

fn btc_1h() -> CacheKey {
    CacheKey::new(MarketType::Crypto, "BTCUSDT", Timeframe::H1)
}

#[tokio::test]
async fn cache_hit_skips_provider() {
    let provider =
        MockProvider::fixed("mock", Err(ProviderError::Upstream("unused".into()))).into_arc();
    let (fetcher, cache) = fetcher_with(MarketType::Crypto, provider.clone());
    cache.put(btc_1h(), rising_series(5), Duration::from_secs(600));

    let outcome = fetcher
        .fetch(MarketType::Crypto, "btcusdt", Timeframe::H1, 3)
        .await
        .unwrap();

    assert_eq!(outcome.source(), Some(DataSource::Cache));
    // 최근 3개
    assert_eq!(outcome.series().unwrap().as_slice(), &rising_series(5)[2..]);
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn provider_success_populates_cache() {
    let provider = MockProvider::fixed("mock", Ok(rising_series(4))).into_arc();
    let (fetcher, cache) = fetcher_with(MarketType::Crypto, provider.clone());

    let first = fetcher
        .fetch(MarketType::Crypto, "BTCUSDT", Timeframe::H1, 100)
        .await
        .unwrap();
    let second = fetcher
        .fetch(MarketType::Crypto, "BTCUSDT", Timeframe::H1, 100)
        .await
        .unwrap();

    assert_eq!(first.source(), Some(DataSource::Provider));
    assert_eq!(second.source(), Some(DataSource::Cache));
    assert_eq!(first.series(), second.series());
    assert_eq!(cache.get(&btc_1h()), Some(rising_series(4)));
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn rate_limit_with_expired_cache_returns_stale_series() {
    let provider =
        MockProvider::fixed("mock", Err(ProviderError::RateLimited("429".into()))).into_arc();
    let (fetcher, cache) = fetcher_with(MarketType::Crypto, provider.clone());
    cache.put(btc_1h(), rising_series(3), Duration::ZERO);

    let outcome = fetcher
        .fetch(MarketType::Crypto, "BTCUSDT", Timeframe::H1, 100)
        .await
        .unwrap();

    assert_eq!(outcome.source(), Some(DataSource::StaleCache));
    assert_eq!(outcome.series(), Some(&rising_series(3)));
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn rate_limit_without_cache_returns_fallback_signal() {
    let provider =
        MockProvider::fixed("mock", Err(ProviderError::RateLimited("429".into()))).into_arc();
    let (fetcher, cache) = fetcher_with(MarketType::Crypto, provider);

    let outcome = fetcher
        .fetch(MarketType::Crypto, "BTCUSDT", Timeframe::H1, 100)
        .await
        .unwrap();

    match outcome {
        FetchOutcome::Unavailable(signal) => {
            assert_eq!(signal.status, FallbackStatus::DataTemporarilyUnavailable);
            assert_eq!(signal.reason, FallbackReason::DataSourceRateLimit);
            assert_eq!(signal.confidence, Confidence::Low);
            assert_eq!(signal.market, MarketType::Crypto);
            assert_eq!(signal.symbol, "BTCUSDT");
            assert_eq!(signal.timeframe, Timeframe::H1);
        }
        other => panic!("expected fallback signal, got {:?}", other),
    }
    assert!(cache.is_empty());
}

#[tokio::test]
async fn non_rate_limit_errors_propagate_even_with_stale_cache() {
    for error in [
        ProviderError::NotFound("unknown symbol".into()),
        ProviderError::Upstream("502".into()),
    ] {
        let provider = MockProvider::fixed("mock", Err(error.clone())).into_arc();
        let (fetcher, cache) = fetcher_with(MarketType::Crypto, provider);
        cache.put(btc_1h(), rising_series(3), Duration::ZERO);

        let result = fetcher
            .fetch(MarketType::Crypto, "BTCUSDT", Timeframe::H1, 100)
            .await;

        assert_eq!(result, Err(error));
    }
}

#[tokio::test(start_paused = true)]
async fn slow_provider_times_out() {
    let provider = MockProvider::fixed("slow", Ok(rising_series(2)))
        .with_delay(Duration::from_secs(30))
        .into_arc();
    let (fetcher, cache) = fetcher_with(MarketType::Stocks, provider);
    let fetcher = fetcher.with_timeout(Duration::from_secs(5));

    let result = fetcher
        .fetch(MarketType::Stocks, "AAPL", Timeframe::D1, 100)
        .await;

    assert!(matches!(result, Err(ProviderError::Timeout(_))));
    assert!(cache.is_empty());
}

#[tokio::test(start_paused = true)]
async fn timeout_with_expired_cache_is_not_replaced_by_stale_series() {
    let provider = MockProvider::fixed("slow", Ok(rising_series(2)))
        .with_delay(Duration::from_secs(30))
        .into_arc();
    let (fetcher, cache) = fetcher_with(MarketType::Crypto, provider.clone());
    let fetcher = fetcher.with_timeout(Duration::from_secs(5));
    cache.put(btc_1h(), rising_series(3), Duration::ZERO);

    let result = fetcher
        .fetch(MarketType::Crypto, "BTCUSDT", Timeframe::H1, 100)
        .await;

    assert!(matches!(result, Err(ProviderError::Timeout(_))));
    assert_eq!(provider.calls(), 1);
    // 만료된 항목은 그대로 남음
    assert_eq!(cache.get_last(&btc_1h()), Some(rising_series(3)));
}

#[tokio::test]
async fn zero_limit_is_rejected_without_calling_provider() {
    let provider = MockProvider::fixed("yahoo", Ok(rising_series(3))).into_arc();
    let (fetcher, cache) = fetcher_with(MarketType::Stocks, provider.clone());

    let result = fetcher.fetch(MarketType::Stocks, "AAPL", Timeframe::D1, 0).await;
    assert!(matches!(result, Err(ProviderError::InvalidRequest(_))));
    assert_eq!(provider.calls(), 0);
    assert!(cache.is_empty());

    let outcome = fetcher
        .fetch(MarketType::Stocks, "AAPL", Timeframe::D1, 100)
        .await
        .unwrap();
    assert_eq!(outcome.source(), Some(DataSource::Provider));
    assert_eq!(outcome.series().map(|s| s.len()), Some(3));
}

#[tokio::test]
async fn empty_provider_series_is_not_cached() {
    let provider = MockProvider::fixed("yahoo", Ok(Vec::new())).into_arc();
    let (fetcher, cache) = fetcher_with(MarketType::Stocks, provider.clone());

    for _ in 0..2 {
        let outcome = fetcher
            .fetch(MarketType::Stocks, "AAPL", Timeframe::D1, 100)
            .await
            .unwrap();
        assert_eq!(outcome.source(), Some(DataSource::Provider));
        assert_eq!(outcome.series().map(|s| s.len()), Some(0));
    }

    assert!(cache.is_empty());
    assert_eq!(provider.calls(), 2);
}

#[tokio::test]
async fn market_without_provider_is_not_found() {
    let provider = MockProvider::fixed("mock", Ok(rising_series(1))).into_arc();
    let (fetcher, _cache) = fetcher_with(MarketType::Crypto, provider);

    let result = fetcher
        .fetch(MarketType::Cedears, "AAPL.BA", Timeframe::D1, 10)
        .await;

    assert!(matches!(result, Err(ProviderError::NotFound(_))));
}

#[tokio::test(start_paused = true)]
async fn concurrent_fetches_for_same_key_call_provider_once() {
    let provider = MockProvider::fixed("mock", Ok(rising_series(3)))
        .with_delay(Duration::from_millis(200))
        .into_arc();
    let (fetcher, _cache) = fetcher_with(MarketType::Crypto, provider.clone());

    let (a, b) = tokio::join!(
        fetcher.fetch(MarketType::Crypto, "BTCUSDT", Timeframe::H1, 100),
        fetcher.fetch(MarketType::Crypto, " btcusdt ", Timeframe::H1, 100),
    );

    let mut sources = vec![a.unwrap().source(), b.unwrap().source()];
    sources.sort_by_key(|s| format!("{:?}", s));
    assert_eq!(sources, vec![Some(DataSource::Cache), Some(DataSource::Provider)]);
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn crypto_composite_prefers_first_success() {
    let primary =
        MockProvider::fixed("coingecko", Err(ProviderError::Upstream("503".into()))).into_arc();
    let secondary = MockProvider::fixed("binance", Ok(rising_series(2))).into_arc();
    let crypto = CryptoProvider::new(vec![
        primary.clone() as Arc<dyn CandleProvider>,
        secondary.clone() as Arc<dyn CandleProvider>,
    ]);

    let candles = crypto
        .fetch_candles("BTCUSDT", Timeframe::H1, 10)
        .await
        .unwrap();

    assert_eq!(candles, rising_series(2));
    assert_eq!(primary.calls(), 1);
    assert_eq!(secondary.calls(), 1);
}

#[tokio::test]
async fn crypto_composite_reports_rate_limit_if_any_source_was_limited() {
    let primary =
        MockProvider::fixed("coingecko", Err(ProviderError::RateLimited("429".into()))).into_arc();
    let secondary =
        MockProvider::fixed("binance", Err(ProviderError::NotFound("-1121".into()))).into_arc();
    let crypto = CryptoProvider::new(vec![
        primary as Arc<dyn CandleProvider>,
        secondary as Arc<dyn CandleProvider>,
    ]);

    let err = crypto
        .fetch_candles("BTCUSDT", Timeframe::H1, 10)
        .await
        .unwrap_err();

    assert!(err.is_rate_limited());
}

#[tokio::test]
async fn crypto_composite_returns_last_error_otherwise() {
    let primary =
        MockProvider::fixed("coingecko", Err(ProviderError::NotFound("coin".into()))).into_arc();
    let secondary =
        MockProvider::fixed("binance", Err(ProviderError::Upstream("500".into()))).into_arc();
    let crypto = CryptoProvider::new(vec![
        primary as Arc<dyn CandleProvider>,
        secondary as Arc<dyn CandleProvider>,
    ]);

    let err = crypto
        .fetch_candles("BTCUSDT", Timeframe::H1, 10)
        .await
        .unwrap_err();

    assert_eq!(err, ProviderError::Upstream("500".into()));
}

#[tokio::test]
async fn warm_up_reports_per_target_results() {
    let stocks = MockProvider::new("yahoo", |symbol| match symbol {
        "AAPL" | "MSFT" => Ok(rising_series(5)),
        other => Err(ProviderError::NotFound(other.to_string())),
    })
    .into_arc();
    let crypto =
        MockProvider::fixed("crypto", Err(ProviderError::RateLimited("429".into()))).into_arc();

    let cache = Arc::new(CandleCache::new());
    let registry = ProviderRegistry::new()
        .with_provider(MarketType::Stocks, stocks)
        .with_provider(MarketType::Crypto, crypto);
    let fetcher = CandleFetcher::new(cache.clone(), registry, CacheTtlPolicy::default());

    let targets = vec![
        WarmupTarget::new(MarketType::Stocks, "AAPL", Timeframe::D1),
        WarmupTarget::new(MarketType::Stocks, "TSLA", Timeframe::D1),
        WarmupTarget::new(MarketType::Stocks, "MSFT", Timeframe::D1),
        WarmupTarget::new(MarketType::Crypto, "BTCUSDT", Timeframe::H1),
        WarmupTarget::new(MarketType::Cedears, "AAPL.BA", Timeframe::D1),
    ];

    let report = warm_up(&fetcher, &targets, 3).await;

    assert_eq!(report.total, 5);
    assert_eq!(report.succeeded, 2);
    assert_eq!(report.failed, 3);
    assert_eq!(report.details[0].status, WarmupStatus::Success);
    assert_eq!(report.details[0].candles, 3);
    assert_eq!(report.details[1].status, WarmupStatus::Failed);
    assert_eq!(report.details[3].error.as_deref(), Some("DATA_SOURCE_RATE_LIMIT"));
    // 실패한 대상은 캐시에 남지 않음
    assert_eq!(cache.len(), 2);
}

#[tokio::test]
async fn spawned_warm_up_fills_shared_cache() {
    let stocks = MockProvider::fixed("yahoo", Ok(rising_series(10))).into_arc();
    let cache = Arc::new(CandleCache::new());
    let fetcher = Arc::new(CandleFetcher::new(
        cache.clone(),
        ProviderRegistry::new().with_provider(MarketType::Stocks, stocks.clone()),
        CacheTtlPolicy::default(),
    ));

    let handle = spawn_warm_up(
        fetcher.clone(),
        vec![WarmupTarget::new(MarketType::Stocks, "AAPL", Timeframe::D1)],
        100,
    );
    let report = handle.await.unwrap();

    assert_eq!(report.succeeded, 1);
    let key = CacheKey::new(MarketType::Stocks, "AAPL", Timeframe::D1);
    assert_eq!(cache.get(&key).map(|s| s.len()), Some(10));

    // 이후 조회는 캐시 적중
    let outcome = fetcher
        .fetch(MarketType::Stocks, "aapl", Timeframe::D1, 100)
        .await
        .unwrap();
    assert_eq!(outcome.source(), Some(DataSource::Cache));
    assert_eq!(stocks.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn spawn_warm_up_returns_before_targets_are_fetched() {
    let stocks = MockProvider::fixed("yahoo", Ok(rising_series(5)))
        .with_delay(Duration::from_secs(2))
        .into_arc();
    let cache = Arc::new(CandleCache::new());
    let fetcher = Arc::new(CandleFetcher::new(
        cache.clone(),
        ProviderRegistry::new().with_provider(MarketType::Stocks, stocks),
        CacheTtlPolicy::default(),
    ));

    let handle = spawn_warm_up(
        fetcher,
        vec![
            WarmupTarget::new(MarketType::Stocks, "AAPL", Timeframe::D1),
            WarmupTarget::new(MarketType::Stocks, "MSFT", Timeframe::D1),
        ],
        100,
    );

    assert!(!handle.is_finished());
    assert!(cache.is_empty());

    let report = handle.await.unwrap();
    assert_eq!(report.succeeded, 2);
    assert_eq!(cache.len(), 2);
}
