//! 핵심 에러 타입.

use rust_decimal::Decimal;
use thiserror::Error;

/// 핵심 도메인 에러.
#[derive(Debug, Error)]
pub enum CoreError {
    /// 캔들 불변식 위반 (low ≤ min(open, close) ≤ max(open, close) ≤ high)
    #[error("잘못된 캔들: open={open}, high={high}, low={low}, close={close} ({reason})")]
    InvalidCandle {
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
        reason: &'static str,
    },

    /// 잘못된 입력
    #[error("잘못된 입력: {0}")]
    InvalidInput(String),

    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),
}

/// 핵심 작업을 위한 Result 타입.
pub type CoreResult<T> = Result<T, CoreError>;

impl From<config::ConfigError> for CoreError {
    fn from(err: config::ConfigError) -> Self {
        CoreError::Config(err.to_string())
    }
}
