//! 시장 데이터 도메인 모델.

mod candle;
mod confidence;

pub use candle::*;
pub use confidence::*;
