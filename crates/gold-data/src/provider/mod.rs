//! 시세/환율 제공자.
//!
//! 각 제공자는 업스트림의 응답 형식을 이 경계에서 흡수하고,
//! 시세를 설정된 표준 중량 단위로 정규화해서 반환합니다.

mod investing;
mod koreagold;
mod naver;
mod yahoo;

use async_trait::async_trait;
use gold_core::{ExchangeRate, GoldResult, PriceQuote};

pub use investing::InvestingGoldSource;
pub use koreagold::KoreaGoldSource;
pub use naver::NaverRateSource;
pub use yahoo::{LatestPrice, YahooChartClient, YahooGoldSource, YahooRateSource};

/// 금 시세 제공자.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// 현재 시세를 조회합니다 (단일 시도).
    async fn fetch_price(&self) -> GoldResult<PriceQuote>;

    /// 로그용 제공자 이름.
    fn name(&self) -> &str;
}

/// KRW/USD 환율 제공자.
#[async_trait]
pub trait RateSource: Send + Sync {
    /// 현재 환율을 조회합니다 (단일 시도, 캐시 없음).
    async fn fetch_rate(&self) -> GoldResult<ExchangeRate>;

    /// 로그용 제공자 이름.
    fn name(&self) -> &str;
}
