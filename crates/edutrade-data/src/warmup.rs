//! 캐시 워밍업.
//!
//! 서버 시작 시 주요 심볼을 미리 조회하여 캐시를 채웁니다.
//! 대상별 실패는 로그만 남기고 계속 진행합니다.

use std::sync::Arc;

use edutrade_core::{market_span, MarketType, Timeframe, WarmupTargetConfig};
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{info, warn, Instrument};

use crate::fetcher::{CandleFetcher, FetchOutcome};

/// 워밍업 대상 (시장, 심볼, 타임프레임).
pub type WarmupTarget = WarmupTargetConfig;

/// 대상별 결과 상태.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarmupStatus {
    Success,
    Failed,
}

/// 대상별 결과.
#[derive(Debug, Clone, Serialize)]
pub struct WarmupDetail {
    pub market: MarketType,
    pub symbol: String,
    pub timeframe: Timeframe,
    pub status: WarmupStatus,
    pub candles: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// 워밍업 결과.
#[derive(Debug, Clone, Default, Serialize)]
pub struct WarmupReport {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub details: Vec<WarmupDetail>,
}

impl WarmupReport {
    fn record(&mut self, detail: WarmupDetail) {
        self.total += 1;
        match detail.status {
            WarmupStatus::Success => self.succeeded += 1,
            WarmupStatus::Failed => self.failed += 1,
        }
        self.details.push(detail);
    }
}

/// 대상을 순서대로 조회하여 캐시를 채웁니다.
///
/// 일반 조회와 같은 경로를 사용하므로 캐시 적중도 성공으로 집계되며,
/// 대체 신호로 끝난 대상은 실패로 집계됩니다.
pub async fn warm_up(
    fetcher: &CandleFetcher,
    targets: &[WarmupTarget],
    limit: usize,
) -> WarmupReport {
    let mut report = WarmupReport::default();

    for target in targets {
        let span = market_span!("warmup", target.market, target.symbol, target.timeframe);
        let (status, candles, error) = async {
            match fetcher
                .fetch(target.market, &target.symbol, target.timeframe, limit)
                .await
            {
                Ok(FetchOutcome::Candles { series, .. }) => {
                    info!(count = series.len(), "Warmup 완료");
                    (WarmupStatus::Success, series.len(), None)
                }
                Ok(FetchOutcome::Unavailable(signal)) => {
                    warn!("Warmup 실패: 요청 한도 초과");
                    (WarmupStatus::Failed, 0, Some(signal.reason.code().to_string()))
                }
                Err(e) => {
                    warn!(error = %e, "Warmup 실패");
                    (WarmupStatus::Failed, 0, Some(e.to_string()))
                }
            }
        }
        .instrument(span)
        .await;

        report.record(WarmupDetail {
            market: target.market,
            symbol: target.symbol.clone(),
            timeframe: target.timeframe,
            status,
            candles,
            error,
        });
    }

    info!(
        total = report.total,
        succeeded = report.succeeded,
        failed = report.failed,
        "캐시 워밍업 종료"
    );

    report
}

/// 워밍업을 백그라운드 태스크로 시작하고 즉시 반환합니다.
pub fn spawn_warm_up(
    fetcher: Arc<CandleFetcher>,
    targets: Vec<WarmupTarget>,
    limit: usize,
) -> JoinHandle<WarmupReport> {
    info!(targets = targets.len(), limit, "캐시 워밍업 시작");
    tokio::spawn(async move { warm_up(&fetcher, &targets, limit).await })
}
