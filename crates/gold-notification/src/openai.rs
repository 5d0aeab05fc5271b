//! OpenAI 기반 금 프리미엄 추세 코멘트.

use std::time::Duration;

use async_trait::async_trait;
use chrono_tz::Tz;
use gold_core::{CommentaryText, DecimalExt, GoldError, GoldResult, PremiumResult};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::message::price_lines;
use crate::types::TrendCommentator;

/// 기본 API 주소.
pub const OPENAI_API_BASE: &str = "https://api.openai.com";
/// 기본 모델.
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

/// 기본 요청 타임아웃.
pub const DEFAULT_OPENAI_TIMEOUT: Duration = Duration::from_secs(30);
/// 프롬프트에 포함할 최대 이력 수.
pub const MAX_HISTORY: usize = 7;

const PROVIDER: &str = "openai";

/// OpenAI 설정.
#[derive(Debug)]
pub struct OpenAiConfig {
    pub api_key: SecretString,
    pub model: String,
    pub temperature: f32,
    pub api_base: String,
    pub timeout: Duration,
}

impl OpenAiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::from(api_key.into()),
            model: DEFAULT_OPENAI_MODEL.to_string(),
            temperature: 0.6,
            api_base: OPENAI_API_BASE.to_string(),
            timeout: DEFAULT_OPENAI_TIMEOUT,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

impl ErrorBody {
    fn is_quota(&self) -> bool {
        self.kind.as_deref() == Some("insufficient_quota")
            || self.code.as_deref() == Some("insufficient_quota")
    }
}

/// 최근 프리미엄 추세를 요약하는 OpenAI 코멘트 생성기.
pub struct OpenAiCommentator {
    config: OpenAiConfig,
    client: reqwest::Client,
    timezone: Tz,
}

impl OpenAiCommentator {
    pub fn new(config: OpenAiConfig) -> GoldResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GoldError::Config(format!("OpenAI HTTP 클라이언트 생성 실패: {e}")))?;

        Ok(Self {
            config,
            client,
            timezone: chrono_tz::Asia::Seoul,
        })
    }

    /// 이력 날짜 표기에 사용할 시간대를 지정합니다.
    pub fn with_timezone(mut self, timezone: Tz) -> Self {
        self.timezone = timezone;
        self
    }

    /// 이력으로 프롬프트를 구성합니다.
    ///
    /// 최근 [`MAX_HISTORY`]개 항목만 `[{date, premium}]` JSON으로 포함하고,
    /// 마지막 항목을 오늘의 주요 데이터로 사용합니다.
    pub fn build_prompt(&self, history: &[PremiumResult]) -> GoldResult<String> {
        let latest = history
            .last()
            .ok_or_else(|| GoldError::InvalidInput("코멘트 생성에 필요한 이력이 없습니다".to_string()))?;

        let start = history.len().saturating_sub(MAX_HISTORY);
        let entries: Vec<serde_json::Value> = history[start..]
            .iter()
            .map(|r| {
                serde_json::json!({
                    "date": r.computed_at.with_timezone(&self.timezone).format("%Y-%m-%d").to_string(),
                    "premium": r.premium_percent.to_signed_string(2),
                })
            })
            .collect();
        let history_json = serde_json::to_string_pretty(&entries)?;

        let mut today = price_lines(latest).join("\n");
        today.push_str(&format!(
            "\n금 프리미엄: {}%",
            latest.premium_percent.to_signed_string(2)
        ));

        Ok(format!(
            "다음은 최근 {}일간의 금 프리미엄 데이터입니다.\n{}\n\n\
             오늘의 주요 데이터:\n{}\n\n\
             이 데이터를 기반으로 한국 금 프리미엄 상승/하락 원인과 간단한 투자 관점 요약을 3줄 이내로 설명해줘.",
            entries.len(),
            history_json,
            today
        ))
    }

    fn map_error_status(status: reqwest::StatusCode, body: &str) -> GoldError {
        let detail = serde_json::from_str::<ErrorResponse>(body).ok().map(|r| r.error);

        if status.as_u16() == 429 || detail.as_ref().is_some_and(ErrorBody::is_quota) {
            let message = detail.map(|d| d.message).unwrap_or_else(|| format!("HTTP {status}"));
            return GoldError::QuotaExceeded(format!("{PROVIDER}: {message}"));
        }

        let message = match detail {
            Some(d) if !d.message.is_empty() => format!("HTTP {status}: {}", d.message),
            _ => format!("HTTP {status}"),
        };
        GoldError::upstream(PROVIDER, message)
    }
}

#[async_trait]
impl TrendCommentator for OpenAiCommentator {
    async fn summarize(&self, history: &[PremiumResult]) -> GoldResult<CommentaryText> {
        let prompt = self.build_prompt(history)?;
        let url = format!(
            "{}/v1/chat/completions",
            self.config.api_base.trim_end_matches('/')
        );
        let body = serde_json::json!({
            "model": self.config.model,
            "messages": [{ "role": "user", "content": prompt }],
            "temperature": self.config.temperature,
        });

        debug!(model = %self.config.model, entries = history.len().min(MAX_HISTORY), "OpenAI 코멘트 요청");

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.config.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GoldError::upstream(PROVIDER, "요청 타임아웃")
                } else {
                    GoldError::upstream(PROVIDER, e.to_string())
                }
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| GoldError::upstream(PROVIDER, e.to_string()))?;

        if !status.is_success() {
            let err = Self::map_error_status(status, &text);
            warn!(status = %status, kind = err.kind(), "OpenAI 요청 실패");
            return Err(err);
        }

        let parsed: ChatCompletionResponse = serde_json::from_str(&text)
            .map_err(|e| GoldError::parse(PROVIDER, format!("응답 JSON 파싱 실패: {e}")))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .and_then(CommentaryText::new)
            .ok_or_else(|| GoldError::parse(PROVIDER, "choices[0].message.content 없음"))
    }

    fn name(&self) -> &str {
        PROVIDER
    }
}
