//! 캐시 워밍업 포그라운드 실행.

use edutrade_core::WarmupConfig;
use edutrade_data::{warm_up, CacheInfo, CandleFetcher, WarmupReport};
use serde::Serialize;
use tracing::info;

/// 워밍업 결과와 이후 캐시 상태.
#[derive(Debug, Serialize)]
pub struct WarmupSummary {
    pub report: WarmupReport,
    pub cache: CacheInfo,
}

/// 설정된 대상으로 워밍업을 끝까지 실행합니다.
///
/// `warmup.enabled`와 관계없이 실행됩니다.
pub async fn run_warmup(fetcher: &CandleFetcher, config: &WarmupConfig) -> WarmupSummary {
    info!(targets = config.targets.len(), limit = config.limit, "워밍업 명령 실행");

    let report = warm_up(fetcher, &config.targets, config.limit).await;
    let cache = fetcher.cache().info();

    WarmupSummary { report, cache }
}
