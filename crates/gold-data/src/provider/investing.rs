//! Investing.com 국제 금 시세 크롤러.
//!
//! 스크래핑 방어가 강한 사이트라 Yahoo 제공자의 대안으로만 사용합니다.
//! 태그 이름 대신 `data-test` 속성으로 가격 요소를 찾습니다.

use async_trait::async_trait;
use chrono::Utc;
use gold_core::{GoldResult, GoldUnit, PriceQuote};
use tracing::info;

use super::PriceSource;
use crate::http::{select_number, UpstreamClient};

/// 기본 주소.
pub const INVESTING_BASE_URL: &str = "https://www.investing.com";

const PROVIDER: &str = "investing";
const PRICE_SELECTOR: &str = r#"[data-test="instrument-price-last"]"#;

/// Investing.com 국제 금 시세 (USD/트로이온스).
pub struct InvestingGoldSource {
    http: UpstreamClient,
    base_url: String,
    target_unit: GoldUnit,
}

impl InvestingGoldSource {
    pub fn new(http: UpstreamClient, target_unit: GoldUnit) -> Self {
        Self::with_base_url(http, INVESTING_BASE_URL, target_unit)
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
impl PriceSource for InvestingGoldSource {
    async fn fetch_price(&self) -> GoldResult<PriceQuote> {
        let url = format!("{}/commodities/gold", self.base_url);
        let html = self.http.get_text(PROVIDER, &url).await?;
        let price = select_number(PROVIDER, &html, PRICE_SELECTOR)?;

        info!(price = %price, "Investing.com 국제 금 시세 조회 성공 (USD/oz)");

        Ok(PriceQuote::usd(price, GoldUnit::TroyOunce, Utc::now()).normalize_to(self.target_unit))
    }

    fn name(&self) -> &str {
        PROVIDER
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpSettings;
    use gold_core::GoldError;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_fetch_price_from_data_test_attribute() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/commodities/gold")
            .with_body(
                r#"<html><body><div data-test="instrument-price-last">2,345.60</div></body></html>"#,
            )
            .create_async()
            .await;

        let http = UpstreamClient::new(&HttpSettings::default()).unwrap();
        let source = InvestingGoldSource::with_base_url(http, server.url(), GoldUnit::TroyOunce);
        let quote = source.fetch_price().await.unwrap();

        assert_eq!(quote.amount, dec!(2345.60));
        assert_eq!(quote.unit, GoldUnit::TroyOunce);
    }

    #[tokio::test]
    async fn test_blocked_page_is_parse_failure() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/commodities/gold")
            .with_body("<html><body>Just a moment...</body></html>")
            .create_async()
            .await;

        let http = UpstreamClient::new(&HttpSettings::default()).unwrap();
        let source = InvestingGoldSource::with_base_url(http, server.url(), GoldUnit::Gram);
        let err = source.fetch_price().await.unwrap_err();

        assert!(matches!(err, GoldError::ParseFailure { .. }));
    }
}
