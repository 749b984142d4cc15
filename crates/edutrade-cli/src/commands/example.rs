//! 샘플 캔들 분석.

use edutrade_analytics::{sample_candles, PatternReport};

/// 내장 샘플 캔들 7개에 대한 패턴 리포트.
pub fn run_example() -> PatternReport {
    PatternReport::analyze(&sample_candles())
}
