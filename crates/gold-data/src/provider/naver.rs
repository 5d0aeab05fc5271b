//! 네이버 금융 시장지표 환율 크롤러.
//!
//! `/marketindex/` 페이지의 첫 번째 `.value` 요소가 원/달러 매매기준율입니다.

use async_trait::async_trait;
use chrono::Utc;
use gold_core::{ExchangeRate, GoldResult};
use tracing::info;

use super::RateSource;
use crate::http::{select_number, UpstreamClient};

/// 기본 주소.
pub const NAVER_FINANCE_BASE_URL: &str = "https://finance.naver.com";

const PROVIDER: &str = "naver";
const RATE_SELECTOR: &str = ".value";

/// 네이버 원/달러 환율.
pub struct NaverRateSource {
    http: UpstreamClient,
    base_url: String,
}

impl NaverRateSource {
    pub fn new(http: UpstreamClient) -> Self {
        Self::with_base_url(http, NAVER_FINANCE_BASE_URL)
    }

    pub fn with_base_url(http: UpstreamClient, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl RateSource for NaverRateSource {
    async fn fetch_rate(&self) -> GoldResult<ExchangeRate> {
        let url = format!("{}/marketindex/", self.base_url);
        let html = self.http.get_text(PROVIDER, &url).await?;
        let krw_per_usd = select_number(PROVIDER, &html, RATE_SELECTOR)?;

        info!(krw_per_usd = %krw_per_usd, "네이버 USD/KRW 환율 조회 성공");

        Ok(ExchangeRate::new(krw_per_usd, Utc::now()))
    }

    fn name(&self) -> &str {
        PROVIDER
    }
}
