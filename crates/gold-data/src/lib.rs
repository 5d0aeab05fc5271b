//! 금 시세 및 환율 수집.
//!
//! 이 crate는 다음을 제공합니다:
//! - 시세/환율 제공자 trait (`PriceSource`, `RateSource`)
//! - Yahoo Finance 차트 API 제공자 (국제 금 시세, USD/KRW 환율)
//! - Investing.com 국제 금 시세 크롤러
//! - 한국금거래소 국내 금 시세 크롤러
//! - 네이버 시장지표 환율 크롤러
//!
//! 모든 제공자는 타임아웃이 설정된 단일 HTTP 요청만 수행하며 재시도하지 않습니다.

pub mod http;
pub mod provider;

pub use http::{HttpSettings, UpstreamClient, DEFAULT_USER_AGENT};
pub use provider::*;
