//! edutrade CLI 도구.
//!
//! 이 crate는 다음 기능을 제공합니다:
//! - 시장 데이터 조회 후 캔들 패턴 분석
//! - 지원 자산 목록 출력
//! - 샘플 캔들 분석 예제
//! - 캐시 워밍업 실행

pub mod commands;
