//! 신뢰도 등급.

use serde::{Deserialize, Serialize};
use std::fmt;

/// 표시용 신뢰도 등급.
///
/// 패턴 감지 결과와 데이터 대체(fallback) 신호에서 공통으로 사용합니다.
/// 투자 판단 근거가 아니라 설명의 강도를 나타냅니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Confidence {
    /// 낮음 (단일 캔들 등 약한 근거)
    Low,
    /// 보통
    Medium,
    /// 높음
    High,
}

impl Confidence {
    /// 코드 문자열을 반환합니다.
    pub fn code(&self) -> &'static str {
        match self {
            Confidence::Low => "LOW",
            Confidence::Medium => "MEDIUM",
            Confidence::High => "HIGH",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_serializes_as_code() {
        assert_eq!(serde_json::to_string(&Confidence::Medium).unwrap(), "\"MEDIUM\"");
        assert!(Confidence::Low < Confidence::High);
    }
}
