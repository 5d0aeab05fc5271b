//! 한국금거래소 국내 금 시세 크롤러.
//!
//! 고시 가격은 1돈(3.75g) 기준 원화입니다.

use async_trait::async_trait;
use chrono::Utc;
use gold_core::{GoldResult, GoldUnit, PriceQuote};
use tracing::info;

use super::PriceSource;
use crate::http::{select_number, UpstreamClient};

/// 기본 주소.
pub const KOREA_GOLD_BASE_URL: &str = "https://www.koreagoldx.co.kr";

const PROVIDER: &str = "koreagold";
const PRICE_SELECTOR: &str = "#gold_price";

/// 한국금거래소 국내 금 시세 (KRW/돈).
pub struct KoreaGoldSource {
    http: UpstreamClient,
    base_url: String,
    target_unit: GoldUnit,
}

impl KoreaGoldSource {
    pub fn new(http: UpstreamClient, target_unit: GoldUnit) -> Self {
        Self::with_base_url(http, KOREA_GOLD_BASE_URL, target_unit)
    }

    pub fn with_base_url(
        http: UpstreamClient,
        base_url: impl Into<String>,
        target_unit: GoldUnit,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            target_unit,
        }
    }
}

#[async_trait]
impl PriceSource for KoreaGoldSource {
    async fn fetch_price(&self) -> GoldResult<PriceQuote> {
        let url = format!("{}/", self.base_url);
        let html = self.http.get_text(PROVIDER, &url).await?;
        let per_don = select_number(PROVIDER, &html, PRICE_SELECTOR)?;

        info!(price = %per_don, "국내 금 시세 조회 성공 (KRW/돈)");

        Ok(PriceQuote::krw(per_don, GoldUnit::Don, Utc::now()).normalize_to(self.target_unit))
    }

    fn name(&self) -> &str {
        PROVIDER
    }
}
