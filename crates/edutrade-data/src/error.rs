//! 데이터 제공자 오류 타입.

use thiserror::Error;

/// 외부 데이터 제공자 오류.
///
/// 요청 한도 초과(`RateLimited`)만 호출 측에서 복구(오래된 캐시 또는 대체 신호)되며,
/// 나머지는 그대로 전파됩니다.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// 요청 한도 초과
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// 심볼/타임프레임을 찾을 수 없음
    #[error("Not found: {0}")]
    NotFound(String),

    /// 응답 시간 초과
    #[error("Timeout: {0}")]
    Timeout(String),

    /// 그 외 업스트림 오류 (5xx, 파싱 실패, 연결 실패 등)
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// 잘못된 조회 요청 (제공자를 호출하지 않음)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ProviderError {
    /// 요청 한도 초과 오류인지 확인.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ProviderError::RateLimited(_))
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return ProviderError::Timeout(err.to_string());
        }
        match err.status().map(|s| s.as_u16()) {
            Some(429) => ProviderError::RateLimited(err.to_string()),
            Some(404) => ProviderError::NotFound(err.to_string()),
            _ => ProviderError::Upstream(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        ProviderError::Upstream(format!("응답 파싱 실패: {}", err))
    }
}

pub type ProviderResult<T> = std::result::Result<T, ProviderError>;
