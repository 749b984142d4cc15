//! 시스템 전반에서 사용되는 공통 타입.

mod decimal;
mod market;
mod timeframe;

pub use decimal::*;
pub use market::*;
pub use timeframe::*;
