//! # Edutrade Core
//!
//! 교육용 시장 데이터 엔진의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 시스템 전반에서 사용되는 기본 타입을 제공합니다:
//! - OHLCV 캔들 및 캔들 시리즈
//! - 시장 유형 및 타임프레임 정의
//! - 신뢰도 등급
//! - 지원 자산 목록
//! - 설정 관리
//! - 로깅 인프라

pub mod assets;
pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod types;

pub use assets::*;
pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
pub use types::*;
