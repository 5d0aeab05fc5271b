//! 금 프리미엄 봇의 에러 타입.
//!
//! 파이프라인의 모든 단계가 같은 에러 분류 체계를 공유합니다.
//! 어떤 에러가 실행을 중단시키는지는 파이프라인이 결정합니다.

use thiserror::Error;

/// 핵심 에러.
#[derive(Debug, Error)]
pub enum GoldError {
    /// 네트워크 오류, 타임아웃, 업스트림 서버 오류
    #[error("업스트림 응답 없음 ({provider}): {message}")]
    UpstreamUnavailable { provider: String, message: String },

    /// 예상과 다른 응답 형태
    #[error("응답 파싱 실패 ({provider}): {message}")]
    ParseFailure { provider: String, message: String },

    /// 계산기 전제 조건 위반
    #[error("잘못된 입력: {0}")]
    InvalidInput(String),

    /// 요청 한도 초과
    #[error("요청 한도 초과: {0}")]
    QuotaExceeded(String),

    /// 알림 전송 실패
    #[error("알림 전송 실패: {0}")]
    DeliveryFailure(String),

    /// 설정 에러 (시작 시점에만 발생)
    #[error("설정 에러: {0}")]
    Config(String),
}

/// 금 프리미엄 작업을 위한 Result 타입.
pub type GoldResult<T> = Result<T, GoldError>;

impl GoldError {
    /// 업스트림 장애 에러를 생성합니다.
    pub fn upstream(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::UpstreamUnavailable {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// 파싱 실패 에러를 생성합니다.
    pub fn parse(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ParseFailure {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// 로그 필드용 에러 분류 라벨.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UpstreamUnavailable { .. } => "upstream_unavailable",
            Self::ParseFailure { .. } => "parse_failure",
            Self::InvalidInput(_) => "invalid_input",
            Self::QuotaExceeded(_) => "quota_exceeded",
            Self::DeliveryFailure(_) => "delivery_failure",
            Self::Config(_) => "config",
        }
    }
}

impl From<serde_json::Error> for GoldError {
    fn from(err: serde_json::Error) -> Self {
        GoldError::parse("json", err.to_string())
    }
}
