//! 타임프레임별 캐시 TTL 정책.

use std::time::Duration;

use edutrade_core::{CacheConfig, Timeframe};

/// 캐시 TTL 정책.
///
/// 일봉은 30분, 1시간봉은 10분, 그 외는 5분이 기본값입니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTtlPolicy {
    daily: Duration,
    hourly: Duration,
    default: Duration,
}

impl Default for CacheTtlPolicy {
    fn default() -> Self {
        Self::from_config(&CacheConfig::default())
    }
}

impl CacheTtlPolicy {
    /// 명시적인 값으로 정책을 생성합니다.
    pub fn new(daily: Duration, hourly: Duration, default: Duration) -> Self {
        Self {
            daily,
            hourly,
            default,
        }
    }

    /// 설정에서 정책을 생성합니다.
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(
            Duration::from_secs(config.daily_ttl_secs),
            Duration::from_secs(config.hourly_ttl_secs),
            Duration::from_secs(config.default_ttl_secs),
        )
    }

    /// 타임프레임에 해당하는 TTL.
    pub fn ttl_for(&self, timeframe: Timeframe) -> Duration {
        if timeframe.is_daily() {
            self.daily
        } else if timeframe.is_hourly() {
            self.hourly
        } else {
            self.default
        }
    }
}
