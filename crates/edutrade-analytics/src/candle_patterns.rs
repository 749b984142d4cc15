//! 캔들 패턴 감지 엔진.
//!
//! 캔들 시리즈에서 설명용 캔들스틱 패턴을 찾습니다.
//! 매매 시그널이 아니며, 결과는 화면 표시용 코드로만 사용됩니다.
//!
//! ## 지원 패턴
//! - **망치형 (Hammer)**: 긴 하단 그림자, 작은 몸통
//! - **도지 (Doji)**: 시가와 종가가 거의 같음 (표준/잠자리형/비석형)
//! - **강세 장악형 (Bullish Engulfing)**: 양봉 몸통이 직전 음봉 몸통을 감쌈
//!
//! ## 순서
//! 인덱스 오름차순이며, 같은 인덱스에서는 망치형 → 도지 → 장악형 순서로 보고합니다.
//! 하나의 캔들이 여러 패턴에 해당하면 모두 보고합니다.

use std::collections::BTreeMap;

use edutrade_core::{round_measure, safe_ratio, Candle, Confidence};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// technical_data 값의 소수점 자릿수.
const MEASURE_DP: u32 = 4;

/// 감지된 패턴 코드.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PatternCode {
    /// 망치형
    Hammer,
    /// 표준 도지
    DojiStandard,
    /// 잠자리형 도지 (긴 하단 그림자)
    DojiDragonfly,
    /// 비석형 도지 (긴 상단 그림자)
    DojiGravestone,
    /// 강세 장악형
    BullishEngulfing,
}

impl PatternCode {
    /// 코드 문자열.
    pub fn code(&self) -> &'static str {
        match self {
            PatternCode::Hammer => "HAMMER",
            PatternCode::DojiStandard => "DOJI_STANDARD",
            PatternCode::DojiDragonfly => "DOJI_DRAGONFLY",
            PatternCode::DojiGravestone => "DOJI_GRAVESTONE",
            PatternCode::BullishEngulfing => "BULLISH_ENGULFING",
        }
    }
}

/// 패턴이 나타난 시장 맥락 코드.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContextCode {
    /// 우유부단
    Indecision,
    /// 강세 반전
    BullishReversal,
    /// 잠재적 강세
    PotentialBullish,
}

/// 패턴별 수치 측정값 (이름 → 값, 소수점 4자리).
pub type TechnicalData = BTreeMap<String, Decimal>;

/// 감지된 패턴 하나.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedPattern {
    pub pattern_code: PatternCode,
    pub context_code: ContextCode,
    pub confidence: Confidence,
    pub technical_data: TechnicalData,
    /// 시리즈 내 0 기반 인덱스
    pub position: usize,
    /// 두 캔들 패턴에서 앞 캔들의 인덱스
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub second_candle_position: Option<usize>,
}

/// 캔들 패턴 파라미터.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CandlePatternParams {
    /// 도지 판단: 몸통/범위 비율 상한 (기본: 0.1).
    pub doji_body_ratio: Decimal,
    /// 도지 세분류: 한쪽 그림자가 반대쪽의 몇 배를 넘으면 잠자리형/비석형 (기본: 1.5).
    pub doji_shadow_skew: Decimal,
    /// 망치형: 하단 그림자 ≥ 몸통 × 이 값 (기본: 2.0).
    pub hammer_shadow_ratio: Decimal,
    /// 망치형: 상단 그림자 ≤ 몸통 × 이 값 (기본: 1.0).
    pub hammer_max_upper_ratio: Decimal,
    /// 망치형: 하단 그림자/몸통이 이 값 이상이면 HIGH (기본: 4.0).
    pub hammer_high_confidence_ratio: Decimal,
}

impl Default for CandlePatternParams {
    fn default() -> Self {
        Self {
            doji_body_ratio: dec!(0.1),
            doji_shadow_skew: dec!(1.5),
            hammer_shadow_ratio: dec!(2.0),
            hammer_max_upper_ratio: dec!(1.0),
            hammer_high_confidence_ratio: dec!(4.0),
        }
    }
}

/// 캔들 패턴 감지기.
///
/// 상태가 없으며, 같은 입력에 대해 항상 같은 결과를 반환합니다.
#[derive(Debug, Clone, Default)]
pub struct CandlePatternDetector {
    params: CandlePatternParams,
}

impl CandlePatternDetector {
    /// 주어진 파라미터로 감지기를 생성합니다.
    pub fn new(params: CandlePatternParams) -> Self {
        Self { params }
    }

    /// 시리즈 전체에서 패턴을 감지합니다.
    ///
    /// 빈 시리즈는 빈 결과를 반환하며, 장악형은 두 개 이상의 캔들이 있어야 합니다.
    pub fn detect(&self, series: &[Candle]) -> Vec<DetectedPattern> {
        let mut found = Vec::new();

        for (i, candle) in series.iter().enumerate() {
            found.extend(self.check_hammer(candle, i));
            found.extend(self.check_doji(candle, i));

            if i > 0 {
                found.extend(self.check_bullish_engulfing(&series[i - 1], candle, i));
            }
        }

        debug!(
            candles = series.len(),
            patterns = found.len(),
            "캔들 패턴 감지 완료"
        );

        found
    }

    /// 망치형 패턴 확인.
    fn check_hammer(&self, candle: &Candle, position: usize) -> Option<DetectedPattern> {
        let body = candle.body();
        let lower = candle.lower_shadow();
        let upper = candle.upper_shadow();

        // 조건: 하단 그림자 >= 몸통 * 2, 상단 그림자 <= 몸통
        if body <= Decimal::ZERO
            || lower <= Decimal::ZERO
            || lower < body * self.params.hammer_shadow_ratio
            || upper > body * self.params.hammer_max_upper_ratio
        {
            return None;
        }

        let shadow_body_ratio = safe_ratio(lower, body);
        let confidence = if shadow_body_ratio >= self.params.hammer_high_confidence_ratio {
            Confidence::High
        } else {
            Confidence::Medium
        };

        Some(DetectedPattern {
            pattern_code: PatternCode::Hammer,
            context_code: ContextCode::PotentialBullish,
            confidence,
            technical_data: measures([
                ("body", body),
                ("lower_shadow", lower),
                ("upper_shadow", upper),
                ("shadow_body_ratio", shadow_body_ratio),
            ]),
            position,
            second_candle_position: None,
        })
    }

    /// 도지 패턴 확인.
    fn check_doji(&self, candle: &Candle, position: usize) -> Option<DetectedPattern> {
        let body = candle.body();
        let range = candle.range();
        let upper = candle.upper_shadow();
        let lower = candle.lower_shadow();

        let pattern_code = if range.is_zero() {
            // 시가 = 고가 = 저가 = 종가
            PatternCode::DojiStandard
        } else if safe_ratio(body, range) <= self.params.doji_body_ratio {
            if upper > lower * self.params.doji_shadow_skew {
                PatternCode::DojiGravestone
            } else if lower > upper * self.params.doji_shadow_skew {
                PatternCode::DojiDragonfly
            } else {
                PatternCode::DojiStandard
            }
        } else {
            return None;
        };

        Some(DetectedPattern {
            pattern_code,
            context_code: ContextCode::Indecision,
            confidence: Confidence::Low,
            technical_data: measures([
                ("body", body),
                ("range", range),
                ("body_range_pct", safe_ratio(body, range) * dec!(100)),
                ("upper_shadow", upper),
                ("lower_shadow", lower),
                ("upper_shadow_ratio", safe_ratio(upper, range)),
                ("lower_shadow_ratio", safe_ratio(lower, range)),
            ]),
            position,
            second_candle_position: None,
        })
    }

    /// 강세 장악형 패턴 확인.
    fn check_bullish_engulfing(
        &self,
        previous: &Candle,
        current: &Candle,
        position: usize,
    ) -> Option<DetectedPattern> {
        // 조건: 이전 음봉, 현재 양봉, 현재 몸통이 이전 몸통을 포함
        if !previous.is_bearish()
            || !current.is_bullish()
            || current.open() > previous.close()
            || current.close() < previous.open()
        {
            return None;
        }

        Some(DetectedPattern {
            pattern_code: PatternCode::BullishEngulfing,
            context_code: ContextCode::BullishReversal,
            confidence: Confidence::Medium,
            technical_data: measures([
                ("previous_open", previous.open()),
                ("previous_close", previous.close()),
                ("previous_body", previous.body()),
                ("current_open", current.open()),
                ("current_close", current.close()),
                ("current_body", current.body()),
                ("body_ratio", safe_ratio(current.body(), previous.body())),
            ]),
            position,
            second_candle_position: Some(position - 1),
        })
    }
}

/// 기본 파라미터로 패턴을 감지합니다.
pub fn detect(series: &[Candle]) -> Vec<DetectedPattern> {
    CandlePatternDetector::default().detect(series)
}

fn measures<const N: usize>(values: [(&str, Decimal); N]) -> TechnicalData {
    values
        .into_iter()
        .map(|(name, value)| (name.to_string(), round_measure(value, MEASURE_DP)))
        .collect()
}
