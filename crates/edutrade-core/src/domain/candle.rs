//! OHLCV 캔들 데이터.
//!
//! 제공자 어댑터가 생성하고 캐시와 패턴 엔진이 소비합니다.
//! 생성 후에는 변경되지 않으며, 생성 시점에 가격 불변식을 검증합니다:
//!
//! ```text
//! 0 < low ≤ min(open, close) ≤ max(open, close) ≤ high
//! ```

use crate::error::{CoreError, CoreResult};
use crate::types::{Price, Volume};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// OHLCV 캔들스틱 데이터.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CandleRecord")]
pub struct Candle {
    open: Price,
    high: Price,
    low: Price,
    close: Price,
    #[serde(skip_serializing_if = "Option::is_none")]
    volume: Option<Volume>,
    #[serde(skip_serializing_if = "Option::is_none")]
    open_time: Option<DateTime<Utc>>,
}

/// 오래된 캔들이 앞에 오는 캔들 시리즈 (인덱스 0 = 가장 오래된 캔들).
pub type CandleSeries = Vec<Candle>;

/// 검증 전 캔들 레코드 (역직렬화용).
#[derive(Debug, Clone, Deserialize)]
struct CandleRecord {
    open: Price,
    high: Price,
    low: Price,
    close: Price,
    #[serde(default)]
    volume: Option<Volume>,
    #[serde(default)]
    open_time: Option<DateTime<Utc>>,
}

impl TryFrom<CandleRecord> for Candle {
    type Error = CoreError;

    fn try_from(record: CandleRecord) -> CoreResult<Self> {
        let candle = Candle::try_new(record.open, record.high, record.low, record.close)?;
        let candle = match record.volume {
            Some(volume) => candle.with_volume(volume)?,
            None => candle,
        };
        Ok(match record.open_time {
            Some(time) => candle.with_open_time(time),
            None => candle,
        })
    }
}

impl Candle {
    /// 가격 불변식을 검증하여 새 캔들을 생성합니다.
    pub fn try_new(open: Price, high: Price, low: Price, close: Price) -> CoreResult<Self> {
        let invalid = |reason| CoreError::InvalidCandle {
            open,
            high,
            low,
            close,
            reason,
        };

        if [open, high, low, close].iter().any(|p| *p <= Decimal::ZERO) {
            return Err(invalid("가격은 양수여야 합니다"));
        }
        if low > open.min(close) {
            return Err(invalid("low가 몸통보다 높습니다"));
        }
        if high < open.max(close) {
            return Err(invalid("high가 몸통보다 낮습니다"));
        }

        Ok(Self {
            open,
            high,
            low,
            close,
            volume: None,
            open_time: None,
        })
    }

    /// 거래량을 설정합니다. 음수 거래량은 거부됩니다.
    pub fn with_volume(mut self, volume: Volume) -> CoreResult<Self> {
        if volume < Decimal::ZERO {
            return Err(CoreError::InvalidInput(format!("음수 거래량: {}", volume)));
        }
        self.volume = Some(volume);
        Ok(self)
    }

    /// 캔들 시작 시간을 설정합니다.
    pub fn with_open_time(mut self, open_time: DateTime<Utc>) -> Self {
        self.open_time = Some(open_time);
        self
    }

    /// 시가
    pub fn open(&self) -> Price {
        self.open
    }

    /// 고가
    pub fn high(&self) -> Price {
        self.high
    }

    /// 저가
    pub fn low(&self) -> Price {
        self.low
    }

    /// 종가
    pub fn close(&self) -> Price {
        self.close
    }

    /// 거래량 (제공자가 주지 않으면 `None`)
    pub fn volume(&self) -> Option<Volume> {
        self.volume
    }

    /// 캔들 시작 시간
    pub fn open_time(&self) -> Option<DateTime<Utc>> {
        self.open_time
    }

    /// 캔들 몸통 크기 `|close − open|`.
    pub fn body(&self) -> Decimal {
        (self.close - self.open).abs()
    }

    /// 전체 캔들 크기 `high − low`.
    pub fn range(&self) -> Decimal {
        self.high - self.low
    }

    /// 상단 그림자 크기 `high − max(open, close)`.
    pub fn upper_shadow(&self) -> Decimal {
        self.high - self.open.max(self.close)
    }

    /// 하단 그림자 크기 `min(open, close) − low`.
    pub fn lower_shadow(&self) -> Decimal {
        self.open.min(self.close) - self.low
    }

    /// 양봉(종가 > 시가)인지 확인합니다.
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    /// 음봉(종가 < 시가)인지 확인합니다.
    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_candle_measurements() {
        let candle = Candle::try_new(dec!(100), dec!(101), dec!(90), dec!(100.5)).unwrap();

        assert_eq!(candle.body(), dec!(0.5));
        assert_eq!(candle.range(), dec!(11));
        assert_eq!(candle.upper_shadow(), dec!(0.5));
        assert_eq!(candle.lower_shadow(), dec!(10));
        assert!(candle.is_bullish());
        assert!(!candle.is_bearish());
    }

    #[test]
    fn test_candle_rejects_broken_invariant() {
        // high가 종가보다 낮음
        assert!(Candle::try_new(dec!(100), dec!(101), dec!(99), dec!(102)).is_err());
        // low가 시가보다 높음
        assert!(Candle::try_new(dec!(100), dec!(105), dec!(100.5), dec!(104)).is_err());
        // 0 가격
        assert!(Candle::try_new(dec!(0), dec!(1), dec!(0), dec!(1)).is_err());
    }

    #[test]
    fn test_candle_flat_is_valid() {
        let candle = Candle::try_new(dec!(50), dec!(50), dec!(50), dec!(50)).unwrap();
        assert_eq!(candle.range(), Decimal::ZERO);
        assert_eq!(candle.body(), Decimal::ZERO);
    }

    #[test]
    fn test_candle_negative_volume_rejected() {
        let candle = Candle::try_new(dec!(1), dec!(2), dec!(1), dec!(2)).unwrap();
        assert!(candle.with_volume(dec!(-1)).is_err());
        assert_eq!(candle.with_volume(dec!(0)).unwrap().volume(), Some(dec!(0)));
    }

    #[test]
    fn test_candle_deserialize_validates() {
        let ok: Candle =
            serde_json::from_str(r#"{"open":"100","high":"105","low":"99","close":"104","volume":"1000"}"#)
                .unwrap();
        assert_eq!(ok.volume(), Some(dec!(1000)));

        let bad = serde_json::from_str::<Candle>(r#"{"open":"100","high":"99","low":"98","close":"100"}"#);
        assert!(bad.is_err());
    }
}
