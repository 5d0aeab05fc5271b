//! Yahoo Finance 차트 API 제공자.
//!
//! `/v8/finance/chart/{symbol}`의 `meta` 블록에서 최근 가격을 읽습니다.
//! 장 마감 시간에는 `regularMarketPrice`가 비어 있을 수 있으므로
//! `previousClose`, `chartPreviousClose` 순으로 대체합니다.
//!
//! # 심볼
//!
//! - `GC=F`: COMEX 금 선물 근월물 (USD/트로이온스)
//! - `USDKRW=X`: 원/달러 환율
//!
//! 국제 금 시세는 현물가 대신 근월물 선물가로 근사합니다. 두 가격의 차이
//! (베이시스)는 프리미엄에 그대로 반영됩니다.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use gold_core::{ExchangeRate, GoldError, GoldResult, GoldUnit, PriceQuote};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, info};

use super::{PriceSource, RateSource};
use crate::http::UpstreamClient;

/// 기본 API 주소.
pub const YAHOO_CHART_BASE_URL: &str = "https://query1.finance.yahoo.com";
/// 국제 금 심볼.
pub const GOLD_SYMBOL: &str = "GC=F";
/// 원/달러 환율 심볼.
pub const USDKRW_SYMBOL: &str = "USDKRW=X";

const PROVIDER: &str = "yahoo";

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    #[serde(default)]
    regular_market_price: Option<f64>,
    #[serde(default)]
    previous_close: Option<f64>,
    #[serde(default)]
    chart_previous_close: Option<f64>,
    #[serde(default)]
    regular_market_time: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

/// 심볼별 최근 가격 조회 결과.
#[derive(Debug, Clone, PartialEq)]
pub struct LatestPrice {
    pub price: Decimal,
    pub observed_at: DateTime<Utc>,
}

/// Yahoo 차트 API 클라이언트.
#[derive(Debug, Clone)]
pub struct YahooChartClient {
    http: UpstreamClient,
    base_url: String,
}

impl YahooChartClient {
    /// 기본 주소로 생성.
    pub fn new(http: UpstreamClient) -> Self {
        Self::with_base_url(http, YAHOO_CHART_BASE_URL)
    }

    /// 주소를 지정해서 생성 (테스트용).
    pub fn with_base_url(http: UpstreamClient, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// 심볼의 최근 가격을 조회합니다.
    pub async fn latest_price(&self, symbol: &str) -> GoldResult<LatestPrice> {
        let url = format!(
            "{}/v8/finance/chart/{}?interval=1d&range=1d",
            self.base_url, symbol
        );
        let response: ChartResponse = self.http.get_json(PROVIDER, &url).await?;

        if let Some(err) = response.chart.error {
            return Err(GoldError::parse(
                PROVIDER,
                format!(
                    "{} 차트 에러 {}: {}",
                    symbol,
                    err.code.unwrap_or_default(),
                    err.description.unwrap_or_default()
                ),
            ));
        }

        let meta = response
            .chart
            .result
            .and_then(|results| results.into_iter().next())
            .map(|r| r.meta)
            .ok_or_else(|| GoldError::parse(PROVIDER, format!("{} 결과 없음", symbol)))?;

        let raw = meta
            .regular_market_price
            .or(meta.previous_close)
            .or(meta.chart_previous_close)
            .ok_or_else(|| {
                GoldError::parse(PROVIDER, format!("{} 가격 데이터 누락 (휴장 가능성)", symbol))
            })?;

        if meta.regular_market_price.is_none() {
            debug!(symbol, "실시간 가격 없음, 직전 종가 사용");
        }

        let price = Decimal::from_f64(raw)
            .ok_or_else(|| GoldError::parse(PROVIDER, format!("{} 가격 변환 실패: {}", symbol, raw)))?;

        let observed_at = meta
            .regular_market_time
            .and_then(|ts| Utc.timestamp_opt(ts, 0).single())
            .unwrap_or_else(Utc::now);

        Ok(LatestPrice { price, observed_at })
    }
}

/// Yahoo 국제 금 시세 (USD/트로이온스).
pub struct YahooGoldSource {
    client: YahooChartClient,
    symbol: String,
    target_unit: GoldUnit,
}

impl YahooGoldSource {
    /// `GC=F` 시세를 `target_unit` 기준으로 반환하는 제공자를 생성합니다.
    pub fn new(client: YahooChartClient, target_unit: GoldUnit) -> Self {
        Self {
            client,
            symbol: GOLD_SYMBOL.to_string(),
            target_unit,
        }
    }
}

#[async_trait]
impl PriceSource for YahooGoldSource {
    async fn fetch_price(&self) -> GoldResult<PriceQuote> {
        let latest = self.client.latest_price(&self.symbol).await?;
        info!(symbol = %self.symbol, price = %latest.price, "국제 금 시세 조회 성공 (USD/oz)");

        Ok(PriceQuote::usd(latest.price, GoldUnit::TroyOunce, latest.observed_at)
            .normalize_to(self.target_unit))
    }

    fn name(&self) -> &str {
        "yahoo:GC=F"
    }
}

/// Yahoo 원/달러 환율.
pub struct YahooRateSource {
    client: YahooChartClient,
}

impl YahooRateSource {
    pub fn new(client: YahooChartClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RateSource for YahooRateSource {
    async fn fetch_rate(&self) -> GoldResult<ExchangeRate> {
        let latest = self.client.latest_price(USDKRW_SYMBOL).await?;
        info!(krw_per_usd = %latest.price, "USD/KRW 환율 조회 성공");

        Ok(ExchangeRate::new(latest.price, latest.observed_at))
    }

    fn name(&self) -> &str {
        "yahoo:USDKRW=X"
    }
}
