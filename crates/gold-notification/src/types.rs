//! 알림 전송 및 코멘트 trait 정의.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gold_core::{CommentaryText, GoldResult, PremiumResult};
use serde::{Deserialize, Serialize};

/// 전송 확인.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryAck {
    /// 채널이 부여한 메시지 ID (전송을 생략한 경우 없음)
    pub message_id: Option<i64>,
    /// 전송 완료 시각
    pub delivered_at: DateTime<Utc>,
}

impl DeliveryAck {
    pub fn new(message_id: Option<i64>) -> Self {
        Self {
            message_id,
            delivered_at: Utc::now(),
        }
    }
}

/// 프리미엄 알림 전송기 trait.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// 계산 결과와 (있다면) 코멘트를 고정된 대상에게 전송합니다.
    async fn send(
        &self,
        result: &PremiumResult,
        commentary: Option<&CommentaryText>,
    ) -> GoldResult<DeliveryAck>;

    /// 전송기 이름을 반환합니다.
    fn name(&self) -> &str;
}

/// 추세 코멘트 생성기 trait.
///
/// 실패는 호출자가 흡수하며 알림 전송을 막지 않습니다.
#[async_trait]
pub trait TrendCommentator: Send + Sync {
    /// 최근 결과 목록으로 짧은 코멘트를 생성합니다 (단일 시도).
    async fn summarize(&self, history: &[PremiumResult]) -> GoldResult<CommentaryText>;

    /// 생성기 이름을 반환합니다.
    fn name(&self) -> &str;
}
