//! 인메모리 캔들 캐시.
//!
//! - [`CandleCache`]: (시장, 심볼, 타임프레임)별 캔들 시리즈 저장소
//! - [`CacheTtlPolicy`]: 타임프레임별 유효 기간 정책
//!
//! 프로세스 재시작 시 유지되지 않습니다.

mod candle_cache;
mod ttl;

pub use candle_cache::{CacheEntryInfo, CacheFilter, CacheInfo, CacheKey, CandleCache};
pub use ttl::CacheTtlPolicy;
