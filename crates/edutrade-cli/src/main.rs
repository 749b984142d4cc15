//! edutrade CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # 애플 일봉 패턴 분석 (미국 주식)
//! edutrade analyze -m stocks -s AAPL -t 1d -l 100
//!
//! # 비트코인 1시간봉 패턴 분석
//! edutrade analyze -m crypto -s BTCUSDT -t 1h
//!
//! # 지원 자산 목록 (암호화폐만)
//! edutrade assets -m crypto
//!
//! # 내장 샘플 캔들 분석
//! edutrade example
//!
//! # 캐시 워밍업 실행 후 결과 확인
//! edutrade --config config/default.toml warmup
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use edutrade_cli::commands::analyze::{run_analyze, AnalyzeConfig};
use edutrade_cli::commands::assets::run_assets;
use edutrade_cli::commands::example::run_example;
use edutrade_cli::commands::warmup::run_warmup;
use edutrade_core::{init_logging, AppConfig, LogConfig, MarketType, Timeframe};
use edutrade_data::{spawn_warm_up, CandleCache, CandleFetcher};
use serde::Serialize;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "edutrade")]
#[command(about = "교육용 캔들스틱 패턴 분석 도구", long_about = None)]
#[command(version)]
struct Cli {
    /// 설정 파일 경로 (기본: config/default.toml, 없으면 기본값)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// 시작 시 백그라운드 캐시 워밍업 생략
    #[arg(long, global = true, default_value = "false")]
    no_warmup: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 시장 데이터 조회 후 캔들 패턴 분석
    Analyze {
        /// 시장 유형 (crypto, stocks, cedears)
        #[arg(short, long)]
        market: MarketType,

        /// 심볼 (예: BTCUSDT, AAPL, AAPL.BA)
        #[arg(short, long)]
        symbol: String,

        /// 타임프레임 (1h, 4h, 1d, 1w, 1M 등)
        #[arg(short, long, default_value = "1d")]
        timeframe: Timeframe,

        /// 최대 캔들 수 (1-1000)
        #[arg(
            short,
            long,
            default_value = "100",
            value_parser = clap::value_parser!(u16).range(1..=1000)
        )]
        limit: u16,
    },

    /// 시장별 지원 자산 목록 출력
    Assets {
        /// 시장 유형 (생략 시 전체)
        #[arg(short, long)]
        market: Option<MarketType>,
    },

    /// 내장 샘플 캔들로 패턴 분석 예제 실행
    Example,

    /// 설정된 대상으로 캐시 워밍업 실행 후 결과 출력
    Warmup,
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env는 없어도 됨
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::load_default()?,
    };

    init_logging(LogConfig::from(&config.logging))
        .map_err(|e| anyhow!("로깅 초기화 실패: {}", e))?;

    match cli.command {
        Commands::Analyze {
            market,
            symbol,
            timeframe,
            limit,
        } => {
            let fetcher = build_fetcher(&config)?;

            if config.warmup.enabled && !cli.no_warmup {
                // 완료를 기다리지 않음
                let _ = spawn_warm_up(
                    fetcher.clone(),
                    config.warmup.targets.clone(),
                    config.warmup.limit,
                );
            }

            let request = AnalyzeConfig {
                market,
                symbol,
                timeframe,
                limit: usize::from(limit),
            };

            match run_analyze(&fetcher, &request).await {
                Ok(output) => print_json(&output)?,
                Err(e) => {
                    error!(market = %market, symbol = %request.symbol, error = %e, "분석 실패");
                    return Err(e);
                }
            }
        }

        Commands::Assets { market } => {
            print_json(&run_assets(market))?;
        }

        Commands::Example => {
            print_json(&run_example())?;
        }

        Commands::Warmup => {
            let fetcher = build_fetcher(&config)?;
            let summary = run_warmup(&fetcher, &config.warmup).await;
            print_json(&summary)?;
        }
    }

    Ok(())
}

/// 공유 캐시와 설정 기반 제공자로 조회기를 생성합니다.
fn build_fetcher(config: &AppConfig) -> Result<Arc<CandleFetcher>> {
    let cache = Arc::new(CandleCache::new());
    let fetcher = CandleFetcher::from_config(config, cache)?;
    info!(
        timeout_secs = config.providers.timeout_secs,
        daily_ttl_secs = config.cache.daily_ttl_secs,
        hourly_ttl_secs = config.cache.hourly_ttl_secs,
        "데이터 조회기 준비 완료"
    );
    Ok(Arc::new(fetcher))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
