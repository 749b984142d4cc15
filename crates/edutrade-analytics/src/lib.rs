//! 캔들 패턴 분석.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - 캔들 패턴 감지 엔진 (망치형, 도지, 강세 장악형)
//! - 화면 표시용 패턴 보고서와 예제 캔들
//!
//! 감지 결과는 설명용이며 투자 판단 근거가 아닙니다.

pub mod candle_patterns;
pub mod report;

pub use candle_patterns::{
    detect, CandlePatternDetector, CandlePatternParams, ContextCode, DetectedPattern, PatternCode,
    TechnicalData,
};
pub use report::{sample_candles, PatternReport, ReportedPattern, DISCLAIMER_CODE};
