//! 업스트림 HTTP 클라이언트.
//!
//! 모든 제공자가 공유하며, 응답 상태를 공통 에러 분류로 변환합니다.

use std::time::Duration;

use gold_core::{GoldError, GoldResult};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::{Client, Response, StatusCode};
use rust_decimal::Decimal;
use scraper::{Html, Selector};
use serde::de::DeserializeOwned;
use tracing::debug;

/// 기본 브라우저 User-Agent (크롤링 차단 회피용).
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// HTTP 요청 설정.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    /// 요청당 타임아웃
    pub timeout: Duration,
    /// User-Agent 헤더
    pub user_agent: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// 타임아웃이 적용된 단일 시도 HTTP 클라이언트.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: Client,
}

impl UpstreamClient {
    /// 설정으로 클라이언트를 생성합니다.
    pub fn new(settings: &HttpSettings) -> GoldResult<Self> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .user_agent(settings.user_agent.as_str())
            .build()
            .map_err(|e| GoldError::Config(format!("HTTP 클라이언트 생성 실패: {}", e)))?;

        Ok(Self { client })
    }

    /// GET 요청 후 본문을 문자열로 반환합니다.
    pub async fn get_text(&self, provider: &str, url: &str) -> GoldResult<String> {
        let response = self.send(provider, url).await?;
        response
            .text()
            .await
            .map_err(|e| map_request_error(provider, e))
    }

    /// GET 요청 후 본문을 JSON으로 역직렬화합니다.
    pub async fn get_json<T: DeserializeOwned>(&self, provider: &str, url: &str) -> GoldResult<T> {
        let body = self.get_text(provider, url).await?;
        serde_json::from_str(&body)
            .map_err(|e| GoldError::parse(provider, format!("JSON 역직렬화 실패: {}", e)))
    }

    async fn send(&self, provider: &str, url: &str) -> GoldResult<Response> {
        debug!(provider, url, "업스트림 요청");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| map_request_error(provider, e))?;

        check_status(provider, response)
    }
}

/// reqwest 에러를 에러 분류로 변환합니다.
pub fn map_request_error(provider: &str, err: reqwest::Error) -> GoldError {
    if err.is_timeout() {
        GoldError::upstream(provider, "요청 타임아웃")
    } else if err.is_decode() {
        GoldError::parse(provider, err.to_string())
    } else {
        GoldError::upstream(provider, err.to_string())
    }
}

fn check_status(provider: &str, response: Response) -> GoldResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(GoldError::upstream(provider, "HTTP 429 (요청 한도 초과)"));
    }
    Err(GoldError::upstream(provider, format!("HTTP {}", status)))
}

/// HTML 문서에서 셀렉터와 일치하는 첫 요소의 텍스트를 숫자로 추출합니다.
pub fn select_number(provider: &str, html: &str, selector: &str) -> GoldResult<Decimal> {
    let selector_obj = Selector::parse(selector)
        .map_err(|e| GoldError::parse(provider, format!("잘못된 셀렉터 {}: {:?}", selector, e)))?;

    let document = Html::parse_document(html);
    let text = document
        .select(&selector_obj)
        .next()
        .map(|el| el.text().collect::<String>())
        .ok_or_else(|| {
            GoldError::parse(
                provider,
                format!("요소를 찾을 수 없음: {} (셀렉터 변경 또는 차단)", selector),
            )
        })?;

    parse_number(&text)
        .ok_or_else(|| GoldError::parse(provider, format!("숫자 파싱 실패: {:?}", text.trim())))
}

/// 첫 번째 숫자 토큰 (부호, 천 단위 구분 기호, 소수부 포함).
static NUMBER_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-?\d[\d,]*(?:\.\d+)?").expect("숫자 토큰 정규식 컴파일 실패"));

/// 텍스트의 첫 숫자 토큰을 파싱합니다.
///
/// "2,345.60", "$ 2,345.6 USD", "2,345.6 (+12)" 같은 표기를 처리합니다.
/// 토큰 바로 뒤에 숫자나 소수점이 이어지면 ("1.2.3") 잘못된 표기로 봅니다.
pub fn parse_number(text: &str) -> Option<Decimal> {
    let token = NUMBER_TOKEN.find(text)?;

    let rest = &text[token.end()..];
    if rest.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        return None;
    }

    token.as_str().replace(',', "").parse().ok()
}
