//! 봇 에러 타입 정의.

use gold_core::GoldError;
use thiserror::Error;

/// 봇 시작 및 실행 에러.
#[derive(Debug, Error)]
pub enum BotError {
    /// 설정 소스 로드/역직렬화 실패
    #[error("설정 로드 실패: {0}")]
    Load(#[from] config::ConfigError),

    /// 값 검증 실패
    #[error("설정 검증 실패: {0}")]
    Invalid(String),

    /// 파이프라인 에러
    #[error(transparent)]
    Gold(#[from] GoldError),
}

/// Result 타입 별칭
pub type Result<T> = std::result::Result<T, BotError>;
