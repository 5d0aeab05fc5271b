//! 설정 관리.
//!
//! 로드 순서 (뒤가 앞을 덮어씀):
//! 1. 기본값
//! 2. TOML 파일 (`--config`, 없으면 `config/gold-bot.toml`이 있을 때만)
//! 3. `GOLD__` 접두사 환경 변수 (예: `GOLD__TELEGRAM__CHAT_ID`)
//!
//! 텔레그램/OpenAI 자격 증명은 위에서 지정되지 않았을 때
//! 기존 변수명(`TELEGRAM_BOT_TOKEN`, `TELEGRAM_TOKEN`, `TELEGRAM_CHAT_ID`,
//! `TELEGRAM_TO`, `OPENAI_API_KEY`)도 확인합니다.
//!
//! 모든 검증은 시작 시점에 끝나며, 실패하면 프로세스가 종료됩니다.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use chrono::NaiveTime;
use chrono_tz::Tz;
use gold_core::GoldUnit;
use gold_data::HttpSettings;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::error::{BotError, Result};

/// `--config`가 없을 때 찾는 기본 설정 파일.
pub const DEFAULT_CONFIG_PATH: &str = "config/gold-bot.toml";

/// 국제 금 시세 제공자.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InternationalProvider {
    Yahoo,
    Investing,
}

impl FromStr for InternationalProvider {
    type Err = BotError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "yahoo" => Ok(Self::Yahoo),
            "investing" => Ok(Self::Investing),
            other => Err(BotError::Invalid(format!(
                "알 수 없는 국제 시세 제공자: {other} (yahoo, investing)"
            ))),
        }
    }
}

/// 국내 금 시세 제공자.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DomesticProvider {
    KoreaGold,
}

impl FromStr for DomesticProvider {
    type Err = BotError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "koreagold" => Ok(Self::KoreaGold),
            other => Err(BotError::Invalid(format!(
                "알 수 없는 국내 시세 제공자: {other} (koreagold)"
            ))),
        }
    }
}

/// 환율 제공자.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RateProvider {
    Yahoo,
    Naver,
}

impl FromStr for RateProvider {
    type Err = BotError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "yahoo" => Ok(Self::Yahoo),
            "naver" => Ok(Self::Naver),
            other => Err(BotError::Invalid(format!(
                "알 수 없는 환율 제공자: {other} (yahoo, naver)"
            ))),
        }
    }
}

/// 일일 실행 시각.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleConfig {
    /// 현지 실행 시각
    pub trigger_time: NaiveTime,
    /// IANA 시간대
    pub timezone: Tz,
}

/// 제공자 선택.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SourceSelection {
    pub international: InternationalProvider,
    pub domestic: DomesticProvider,
    pub rate: RateProvider,
}

/// 텔레그램 설정.
#[derive(Debug)]
pub struct TelegramSettings {
    pub bot_token: SecretString,
    pub chat_id: String,
    /// false면 메시지를 로그로만 출력 (dry-run)
    pub enabled: bool,
    pub api_base: String,
}

/// OpenAI 설정. API 키가 없으면 코멘트 기능 전체가 꺼집니다.
#[derive(Debug)]
pub struct OpenAiSettings {
    pub api_key: SecretString,
    pub model: String,
    pub temperature: f32,
    pub api_base: String,
    /// 요청 타임아웃. 응답 생성이 느려 HTTP 공통값과 따로 둡니다.
    pub timeout: Duration,
}

/// 검증이 끝난 봇 설정.
#[derive(Debug)]
pub struct BotConfig {
    pub schedule: ScheduleConfig,
    pub http: HttpSettings,
    /// 비교 기준 중량 단위
    pub unit: GoldUnit,
    pub sources: SourceSelection,
    pub telegram: TelegramSettings,
    pub openai: Option<OpenAiSettings>,
    /// 실제로 읽은 설정 파일
    pub source_file: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct RawSettings {
    schedule: RawSchedule,
    http: RawHttp,
    premium: RawPremium,
    sources: RawSources,
    telegram: RawTelegram,
    openai: RawOpenAi,
}

#[derive(Debug, Deserialize)]
struct RawSchedule {
    trigger_time: String,
    timezone: String,
}

#[derive(Debug, Deserialize)]
struct RawHttp {
    timeout_secs: u64,
    user_agent: String,
}

#[derive(Debug, Deserialize)]
struct RawPremium {
    unit: String,
}

#[derive(Debug, Deserialize)]
struct RawSources {
    international: String,
    domestic: String,
    rate: String,
}

#[derive(Debug, Deserialize)]
struct RawTelegram {
    bot_token: Option<String>,
    chat_id: Option<String>,
    enabled: bool,
    api_base: String,
}

#[derive(Debug, Deserialize)]
struct RawOpenAi {
    api_key: Option<String>,
    model: String,
    temperature: f32,
    api_base: String,
    timeout_secs: u64,
}

impl BotConfig {
    /// `.env`와 프로세스 환경 변수를 포함해 설정을 로드합니다.
    ///
    /// `dry_run`이면 파일/환경 값과 무관하게 텔레그램 전송을 끕니다.
    pub fn load(path: Option<&Path>, dry_run: bool) -> Result<Self> {
        dotenvy::dotenv().ok();
        let env: HashMap<String, String> = std::env::vars().collect();
        Self::load_with_env(path, env, dry_run)
    }

    /// 주어진 환경 변수 맵으로 설정을 로드합니다.
    pub fn load_with_env(
        path: Option<&Path>,
        env: HashMap<String, String>,
        dry_run: bool,
    ) -> Result<Self> {
        let mut builder = config::Config::builder()
            .set_default("schedule.trigger_time", "09:00")?
            .set_default("schedule.timezone", "Asia/Seoul")?
            .set_default("http.timeout_secs", 10)?
            .set_default("http.user_agent", gold_data::DEFAULT_USER_AGENT)?
            .set_default("premium.unit", "g")?
            .set_default("sources.international", "yahoo")?
            .set_default("sources.domestic", "koreagold")?
            .set_default("sources.rate", "yahoo")?
            .set_default("telegram.enabled", true)?
            .set_default("telegram.api_base", gold_notification::TELEGRAM_API_BASE)?
            .set_default("openai.model", gold_notification::DEFAULT_OPENAI_MODEL)?
            .set_default("openai.temperature", 0.6)?
            .set_default("openai.api_base", gold_notification::OPENAI_API_BASE)?
            .set_default(
                "openai.timeout_secs",
                gold_notification::DEFAULT_OPENAI_TIMEOUT.as_secs(),
            )?;

        let source_file = match path {
            Some(p) => {
                builder = builder.add_source(config::File::from(p).required(true));
                Some(p.to_path_buf())
            }
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                builder = builder.add_source(config::File::from(Path::new(DEFAULT_CONFIG_PATH)));
                Some(PathBuf::from(DEFAULT_CONFIG_PATH))
            }
            None => None,
        };

        let legacy = LegacyEnv::from_map(&env);

        let raw: RawSettings = builder
            .add_source(
                config::Environment::with_prefix("GOLD")
                    .separator("__")
                    .try_parsing(true)
                    .source(Some(env)),
            )
            .set_override_option("telegram.enabled", dry_run.then_some(false))?
            .build()?
            .try_deserialize()?;

        Self::from_raw(raw, legacy, source_file)
    }

    fn from_raw(raw: RawSettings, legacy: LegacyEnv, source_file: Option<PathBuf>) -> Result<Self> {
        let schedule = ScheduleConfig {
            trigger_time: parse_trigger_time(&raw.schedule.trigger_time)?,
            timezone: raw.schedule.timezone.parse::<Tz>().map_err(|_| {
                BotError::Invalid(format!("알 수 없는 시간대: {}", raw.schedule.timezone))
            })?,
        };

        if raw.http.timeout_secs == 0 {
            return Err(BotError::Invalid(
                "http.timeout_secs는 0보다 커야 합니다".to_string(),
            ));
        }
        let http = HttpSettings {
            timeout: Duration::from_secs(raw.http.timeout_secs),
            user_agent: raw.http.user_agent,
        };

        let unit = raw
            .premium
            .unit
            .parse::<GoldUnit>()
            .map_err(BotError::Invalid)?;

        let sources = SourceSelection {
            international: raw.sources.international.parse()?,
            domestic: raw.sources.domestic.parse()?,
            rate: raw.sources.rate.parse()?,
        };

        let bot_token = non_empty(raw.telegram.bot_token)
            .or(legacy.telegram_token)
            .ok_or_else(|| {
                BotError::Invalid(
                    "텔레그램 봇 토큰이 없습니다 (GOLD__TELEGRAM__BOT_TOKEN 또는 TELEGRAM_BOT_TOKEN)"
                        .to_string(),
                )
            })?;
        let chat_id = non_empty(raw.telegram.chat_id)
            .or(legacy.telegram_chat_id)
            .ok_or_else(|| {
                BotError::Invalid(
                    "텔레그램 채팅 ID가 없습니다 (GOLD__TELEGRAM__CHAT_ID 또는 TELEGRAM_CHAT_ID)"
                        .to_string(),
                )
            })?;
        let telegram = TelegramSettings {
            bot_token: SecretString::from(bot_token),
            chat_id,
            enabled: raw.telegram.enabled,
            api_base: raw.telegram.api_base,
        };

        if !(0.0..=2.0).contains(&raw.openai.temperature) {
            return Err(BotError::Invalid(format!(
                "openai.temperature는 0.0~2.0 범위여야 합니다: {}",
                raw.openai.temperature
            )));
        }
        if raw.openai.timeout_secs == 0 {
            return Err(BotError::Invalid(
                "openai.timeout_secs는 0보다 커야 합니다".to_string(),
            ));
        }
        let openai = non_empty(raw.openai.api_key)
            .or(legacy.openai_api_key)
            .map(|api_key| OpenAiSettings {
                api_key: SecretString::from(api_key),
                model: raw.openai.model,
                temperature: raw.openai.temperature,
                api_base: raw.openai.api_base,
                timeout: Duration::from_secs(raw.openai.timeout_secs),
            });

        Ok(Self {
            schedule,
            http,
            unit,
            sources,
            telegram,
            openai,
            source_file,
        })
    }

    /// 자격 증명을 가린 유효 설정을 TOML로 렌더링합니다.
    pub fn redacted(&self) -> String {
        let view = RedactedView {
            schedule: RedactedSchedule {
                trigger_time: self.schedule.trigger_time.format("%H:%M:%S").to_string(),
                timezone: self.schedule.timezone.name().to_string(),
            },
            http: RedactedHttp {
                timeout_secs: self.http.timeout.as_secs(),
                user_agent: self.http.user_agent.clone(),
            },
            premium: RedactedPremium {
                unit: self.unit.to_string(),
            },
            sources: self.sources,
            telegram: RedactedTelegram {
                bot_token: mask(self.telegram.bot_token.expose_secret()),
                chat_id: self.telegram.chat_id.clone(),
                enabled: self.telegram.enabled,
                api_base: self.telegram.api_base.clone(),
            },
            openai: self.openai.as_ref().map(|o| RedactedOpenAi {
                api_key: mask(o.api_key.expose_secret()),
                model: o.model.clone(),
                temperature: o.temperature,
                api_base: o.api_base.clone(),
                timeout_secs: o.timeout.as_secs(),
            }),
        };

        toml::to_string_pretty(&view).unwrap_or_else(|e| format!("# 직렬화 실패: {e}\n"))
    }
}

/// `HH:MM` 또는 `HH:MM:SS` 형식의 실행 시각을 파싱합니다.
pub fn parse_trigger_time(value: &str) -> Result<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .map_err(|_| BotError::Invalid(format!("실행 시각 형식 오류 (HH:MM): {value}")))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// 앞 4자만 남기고 가립니다.
fn mask(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    format!("{visible}****")
}

struct LegacyEnv {
    telegram_token: Option<String>,
    telegram_chat_id: Option<String>,
    openai_api_key: Option<String>,
}

impl LegacyEnv {
    fn from_map(env: &HashMap<String, String>) -> Self {
        let first = |names: &[&str]| {
            names
                .iter()
                .find_map(|name| non_empty(env.get(*name).cloned()))
        };

        Self {
            telegram_token: first(&["TELEGRAM_BOT_TOKEN", "TELEGRAM_TOKEN"]),
            telegram_chat_id: first(&["TELEGRAM_CHAT_ID", "TELEGRAM_TO"]),
            openai_api_key: first(&["OPENAI_API_KEY"]),
        }
    }
}

#[derive(Serialize)]
struct RedactedView {
    schedule: RedactedSchedule,
    http: RedactedHttp,
    premium: RedactedPremium,
    sources: SourceSelection,
    telegram: RedactedTelegram,
    #[serde(skip_serializing_if = "Option::is_none")]
    openai: Option<RedactedOpenAi>,
}

#[derive(Serialize)]
struct RedactedSchedule {
    trigger_time: String,
    timezone: String,
}

#[derive(Serialize)]
struct RedactedHttp {
    timeout_secs: u64,
    user_agent: String,
}

#[derive(Serialize)]
struct RedactedPremium {
    unit: String,
}

#[derive(Serialize)]
struct RedactedTelegram {
    bot_token: String,
    chat_id: String,
    enabled: bool,
    api_base: String,
}

#[derive(Serialize)]
struct RedactedOpenAi {
    api_key: String,
    model: String,
    temperature: f32,
    api_base: String,
    timeout_secs: u64,
}
