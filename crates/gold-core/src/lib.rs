//! # Gold Core
//!
//! 금 프리미엄 봇의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 워크스페이스 전반에서 사용되는 기본 타입을 제공합니다:
//! - 시세(`PriceQuote`) 및 환율(`ExchangeRate`)
//! - 중량 단위 및 통화 정의
//! - 프리미엄 계산기
//! - AI 코멘트 결과 타입
//! - 에러 분류 체계
//! - 로깅 인프라

pub mod domain;
pub mod error;
pub mod logging;
pub mod types;

pub use domain::*;
pub use error::*;
pub use logging::*;
pub use types::*;
