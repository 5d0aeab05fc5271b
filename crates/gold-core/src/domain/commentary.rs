//! AI 추세 코멘트.
//!
//! 코멘트는 표시 전용 부가 정보입니다. 비활성화되었거나 생성에 실패해도
//! 알림 전송은 계속되어야 하므로, 부재 자체를 명시적인 상태로 표현합니다.

use serde::{Deserialize, Serialize};

use crate::error::GoldError;

/// 생성된 코멘트 본문.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommentaryText(String);

impl CommentaryText {
    /// 공백을 제거한 코멘트를 생성합니다. 비어 있으면 `None`.
    pub fn new(text: impl AsRef<str>) -> Option<Self> {
        let trimmed = text.as_ref().trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CommentaryText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// 코멘트 단계의 결과.
#[derive(Debug)]
pub enum CommentaryOutcome {
    /// 코멘트 제공자가 설정되지 않음
    Disabled,
    /// 시도했으나 실패함 (실행은 계속)
    Unavailable(GoldError),
    /// 코멘트 생성 완료
    Ready(CommentaryText),
}

impl CommentaryOutcome {
    /// 알림에 첨부할 코멘트. `Ready`일 때만 존재합니다.
    pub fn text(&self) -> Option<&CommentaryText> {
        match self {
            Self::Ready(text) => Some(text),
            _ => None,
        }
    }

    /// 로그 필드용 상태 라벨.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Disabled => "disabled",
            Self::Unavailable(_) => "unavailable",
            Self::Ready(_) => "ready",
        }
    }
}
