//! 텔레그램 알림 전송.
//!
//! Telegram Bot API `sendMessage`로 프리미엄 알림을 HTML 메시지로 보냅니다.

use std::time::Duration;

use async_trait::async_trait;
use chrono_tz::Tz;
use gold_core::{CommentaryText, GoldError, GoldResult, PremiumResult};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, error, info, warn};

use crate::message::format_premium_message;
use crate::types::{DeliveryAck, Notifier};

/// 기본 Bot API 주소.
pub const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// 텔레그램 전송 설정.
#[derive(Debug)]
pub struct TelegramConfig {
    /// @BotFather에서 받은 봇 토큰
    pub bot_token: SecretString,
    /// 메시지를 보낼 채팅 ID
    pub chat_id: String,
    /// 실제 전송 여부 (false면 메시지를 로그로만 남김)
    pub enabled: bool,
    /// Bot API 주소
    pub api_base: String,
    /// 요청 타임아웃
    pub timeout: Duration,
}

impl TelegramConfig {
    /// 새 텔레그램 설정을 생성합니다.
    pub fn new(bot_token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self {
            bot_token: SecretString::from(bot_token.into()),
            chat_id: chat_id.into(),
            enabled: true,
            api_base: TELEGRAM_API_BASE.to_string(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
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
struct SendMessageResponse {
    ok: bool,
    #[serde(default)]
    result: Option<SentMessage>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SentMessage {
    message_id: i64,
}

/// 텔레그램 알림 전송기.
pub struct TelegramNotifier {
    config: TelegramConfig,
    client: reqwest::Client,
    timezone: Tz,
}

impl TelegramNotifier {
    /// 새 텔레그램 전송기를 생성합니다.
    pub fn new(config: TelegramConfig) -> GoldResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GoldError::Config(format!("텔레그램 HTTP 클라이언트 생성 실패: {e}")))?;

        Ok(Self {
            config,
            client,
            timezone: chrono_tz::Asia::Seoul,
        })
    }

    /// 메시지 날짜 표기에 사용할 시간대를 지정합니다.
    pub fn with_timezone(mut self, timezone: Tz) -> Self {
        self.timezone = timezone;
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.config.api_base.trim_end_matches('/'),
            self.config.bot_token.expose_secret()
        )
    }

    /// 텔레그램에 원시 HTML 메시지를 전송합니다.
    pub async fn send_message(&self, text: &str) -> GoldResult<DeliveryAck> {
        if !self.config.enabled {
            info!(chat_id = %self.config.chat_id, "텔레그램 전송 비활성화, 메시지 출력만 수행:\n{}", text);
            return Ok(DeliveryAck::new(None));
        }

        let params = serde_json::json!({
            "chat_id": self.config.chat_id,
            "text": text,
            "parse_mode": "HTML",
            "disable_web_page_preview": true,
        });

        debug!(chat_id = %self.config.chat_id, "텔레그램 메시지 전송");

        // 토큰이 URL에 포함되므로 reqwest 에러는 URL을 제거하고 기록한다
        let response = self
            .client
            .post(self.endpoint())
            .json(&params)
            .send()
            .await
            .map_err(|e| GoldError::DeliveryFailure(format!("텔레그램 요청 실패: {}", e.without_url())))?;

        let status = response.status();
        if status.as_u16() == 429 {
            warn!("텔레그램 요청 한도 초과");
            return Err(GoldError::DeliveryFailure(
                "telegram: HTTP 429 (요청 한도 초과)".to_string(),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| GoldError::DeliveryFailure(format!("텔레그램 응답 읽기 실패: {}", e.without_url())))?;

        if !status.is_success() {
            error!(status = %status, body = %body, "텔레그램 메시지 전송 실패");
            return Err(GoldError::DeliveryFailure(format!("HTTP {status}: {body}")));
        }

        let parsed: SendMessageResponse = serde_json::from_str(&body)
            .map_err(|e| GoldError::DeliveryFailure(format!("텔레그램 응답 파싱 실패: {e}")))?;

        if !parsed.ok {
            let description = parsed.description.unwrap_or_default();
            error!(description = %description, "텔레그램이 전송을 거부");
            return Err(GoldError::DeliveryFailure(description));
        }

        let message_id = parsed
            .result
            .map(|m| m.message_id)
            .ok_or_else(|| GoldError::DeliveryFailure("응답에 message_id 없음".to_string()))?;

        info!(message_id, "텔레그램 알림 전송 완료");
        Ok(DeliveryAck::new(Some(message_id)))
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(
        &self,
        result: &PremiumResult,
        commentary: Option<&CommentaryText>,
    ) -> GoldResult<DeliveryAck> {
        let message = format_premium_message(result, commentary, self.timezone);
        self.send_message(&message).await
    }

    fn name(&self) -> &str {
        "telegram"
    }
}
