//! 설정 관리.
//!
//! 기본값 → TOML 파일(선택) → 환경 변수 순으로 병합합니다.
//! 환경 변수는 `EDUTRADE` 접두사와 `__` 구분자를 사용합니다
//! (예: `EDUTRADE__CACHE__DAILY_TTL_SECS=3600`).

use crate::error::CoreResult;
use crate::types::{MarketType, Timeframe};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 환경 변수 접두사.
pub const ENV_PREFIX: &str = "EDUTRADE";

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// 로깅 설정
    pub logging: LoggingConfig,
    /// 캔들 캐시 설정
    pub cache: CacheConfig,
    /// 외부 데이터 제공자 설정
    pub providers: ProvidersConfig,
    /// 캐시 워밍업 설정
    pub warmup: WarmupConfig,
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
    /// 조회/워밍업 span의 시작·종료 이벤트 출력
    pub span_events: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            span_events: false,
        }
    }
}

/// 캔들 캐시 TTL 설정 (초).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// 일봉 TTL
    pub daily_ttl_secs: u64,
    /// 1시간봉 TTL
    pub hourly_ttl_secs: u64,
    /// 그 외 타임프레임 TTL
    pub default_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            daily_ttl_secs: 1800,
            hourly_ttl_secs: 600,
            default_ttl_secs: 300,
        }
    }
}

/// 외부 데이터 제공자 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProvidersConfig {
    /// 제공자 호출 타임아웃 (초)
    pub timeout_secs: u64,
    /// Binance REST 기본 URL
    pub binance_base_url: String,
    /// CoinGecko REST 기본 URL
    pub coingecko_base_url: String,
    /// Yahoo Finance 기본 URL
    pub yahoo_base_url: String,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            binance_base_url: "https://api.binance.com".to_string(),
            coingecko_base_url: "https://api.coingecko.com/api/v3".to_string(),
            yahoo_base_url: "https://query1.finance.yahoo.com".to_string(),
        }
    }
}

/// 캐시 워밍업 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WarmupConfig {
    /// 시작 시 워밍업 실행 여부
    pub enabled: bool,
    /// 대상별 요청 캔들 수
    pub limit: usize,
    /// 워밍업 대상 목록
    pub targets: Vec<WarmupTargetConfig>,
}

impl Default for WarmupConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            limit: 100,
            targets: WarmupTargetConfig::defaults(),
        }
    }
}

/// 워밍업 대상 하나.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct WarmupTargetConfig {
    pub market: MarketType,
    pub symbol: String,
    pub timeframe: Timeframe,
}

impl WarmupTargetConfig {
    /// 새 워밍업 대상을 생성합니다.
    pub fn new(market: MarketType, symbol: impl Into<String>, timeframe: Timeframe) -> Self {
        Self {
            market,
            symbol: symbol.into(),
            timeframe,
        }
    }

    /// 기본 워밍업 대상: 주요 미국 주식과 CEDEAR 일봉.
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new(MarketType::Stocks, "AAPL", Timeframe::D1),
            Self::new(MarketType::Stocks, "TSLA", Timeframe::D1),
            Self::new(MarketType::Stocks, "MSFT", Timeframe::D1),
            Self::new(MarketType::Cedears, "AAPL.BA", Timeframe::D1),
        ]
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다. 파일은 반드시 존재해야 합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> CoreResult<Self> {
        Self::build(Some(config::File::from(path.as_ref()).required(true)))
    }

    /// 기본 경로(`config/default.toml`)에서 설정을 로드합니다.
    ///
    /// 파일이 없으면 기본값과 환경 변수만 사용합니다.
    pub fn load_default() -> CoreResult<Self> {
        Self::build(Some(
            config::File::with_name("config/default").required(false),
        ))
    }

    /// 기본값과 환경 변수만으로 설정을 로드합니다.
    pub fn from_env() -> CoreResult<Self> {
        Self::build(None)
    }

    fn build(
        file: Option<config::File<config::FileSourceFile, config::FileFormat>>,
    ) -> CoreResult<Self> {
        let mut builder = config::Config::builder();
        if let Some(file) = file {
            builder = builder.add_source(file);
        }
        let config = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }
}
