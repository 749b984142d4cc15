//! 시장 데이터 조회 후 패턴 분석.

use anyhow::Result;
use edutrade_analytics::PatternReport;
use edutrade_core::{market_span, round_measure, MarketType, Price, SupportedAssets, Timeframe};
use edutrade_data::{CandleFetcher, DataSource, FallbackSignal, FetchOutcome};
use serde::Serialize;
use tracing::{info, warn, Instrument};

/// 분석 요청.
#[derive(Debug, Clone)]
pub struct AnalyzeConfig {
    pub market: MarketType,
    pub symbol: String,
    pub timeframe: Timeframe,
    pub limit: usize,
}

/// 분석 결과. 데이터가 없으면 대체 신호를 그대로 출력합니다.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum AnalyzeOutput {
    Report {
        market: MarketType,
        symbol: String,
        /// 지원 자산 목록의 표시 이름
        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<&'static str>,
        timeframe: Timeframe,
        source: DataSource,
        /// 마지막 캔들 종가 (소수점 2자리)
        current_price: Option<Price>,
        #[serde(flatten)]
        report: PatternReport,
    },
    Unavailable(FallbackSignal),
}

/// 캔들을 조회하고 패턴 리포트를 생성합니다.
///
/// 요청 한도 초과 외의 조회 오류는 그대로 반환합니다.
pub async fn run_analyze(fetcher: &CandleFetcher, config: &AnalyzeConfig) -> Result<AnalyzeOutput> {
    let span = market_span!("analyze", config.market, config.symbol, config.timeframe);
    analyze_in_span(fetcher, config).instrument(span).await
}

async fn analyze_in_span(fetcher: &CandleFetcher, config: &AnalyzeConfig) -> Result<AnalyzeOutput> {
    let outcome = fetcher
        .fetch(config.market, &config.symbol, config.timeframe, config.limit)
        .await?;

    match outcome {
        FetchOutcome::Candles { series, source } => {
            let report = PatternReport::analyze(&series);
            let current_price = series.last().map(|c| round_measure(c.close(), 2));
            info!(
                candles = report.total_candles,
                patterns = report.patterns_found,
                "패턴 분석 완료"
            );
            Ok(AnalyzeOutput::Report {
                market: config.market,
                symbol: config.symbol.trim().to_uppercase(),
                name: SupportedAssets::name_of(config.market, &config.symbol),
                timeframe: config.timeframe,
                source,
                current_price,
                report,
            })
        }
        FetchOutcome::Unavailable(signal) => {
            warn!("데이터 일시 사용 불가");
            Ok(AnalyzeOutput::Unavailable(signal))
        }
    }
}
