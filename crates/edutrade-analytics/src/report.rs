//! 패턴 분석 보고서.
//!
//! 감지 결과를 화면 표시용으로 가공합니다. 각 패턴에 시리즈 끝 기준 상대 인덱스
//! (`relative_index = position − len`, 항상 −1 이하)를 붙이고 면책 코드를 포함합니다.

use edutrade_core::{Candle, CandleSeries};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::candle_patterns::{CandlePatternDetector, DetectedPattern};

/// 모든 보고서에 포함되는 면책 코드. 표시 계층에서 번역합니다.
pub const DISCLAIMER_CODE: &str = "DISCLAIMER";

/// 상대 인덱스가 추가된 패턴.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportedPattern {
    #[serde(flatten)]
    pub pattern: DetectedPattern,
    /// 시리즈 끝 기준 인덱스 (마지막 캔들 = −1)
    pub relative_index: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub second_candle_relative_index: Option<i64>,
}

/// 패턴 분석 보고서.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternReport {
    pub total_candles: usize,
    pub patterns_found: usize,
    pub patterns: Vec<ReportedPattern>,
    pub disclaimer_code: String,
}

impl PatternReport {
    /// 기본 파라미터로 시리즈를 분석합니다.
    pub fn analyze(series: &[Candle]) -> Self {
        Self::analyze_with(&CandlePatternDetector::default(), series)
    }

    /// 주어진 감지기로 시리즈를 분석합니다.
    pub fn analyze_with(detector: &CandlePatternDetector, series: &[Candle]) -> Self {
        let total = series.len() as i64;
        let patterns: Vec<ReportedPattern> = detector
            .detect(series)
            .into_iter()
            .map(|pattern| ReportedPattern {
                relative_index: pattern.position as i64 - total,
                second_candle_relative_index: pattern
                    .second_candle_position
                    .map(|p| p as i64 - total),
                pattern,
            })
            .collect();

        Self {
            total_candles: series.len(),
            patterns_found: patterns.len(),
            patterns,
            disclaimer_code: DISCLAIMER_CODE.to_string(),
        }
    }
}

/// 교육용 예제 캔들 7개.
///
/// 잠자리형 도지(인덱스 1)와 표준 도지(인덱스 2)를 포함합니다.
pub fn sample_candles() -> CandleSeries {
    const SAMPLE: [(Decimal, Decimal, Decimal, Decimal, Decimal); 7] = [
        (dec!(100), dec!(105), dec!(99), dec!(104), dec!(1000)),
        (dec!(104), dec!(105), dec!(98), dec!(103.5), dec!(1200)),
        (dec!(103.5), dec!(104.5), dec!(102.5), dec!(103.6), dec!(800)),
        (dec!(103.6), dec!(104), dec!(101), dec!(101.5), dec!(1500)),
        (dec!(101.5), dec!(102), dec!(101), dec!(101.8), dec!(900)),
        (dec!(101), dec!(106), dec!(100.5), dec!(105.5), dec!(2000)),
        (dec!(105.5), dec!(107), dec!(104.5), dec!(106.5), dec!(1100)),
    ];

    SAMPLE
        .iter()
        .filter_map(|&(open, high, low, close, volume)| {
            Candle::try_new(open, high, low, close)
                .and_then(|candle| candle.with_volume(volume))
                .ok()
        })
        .collect()
}
