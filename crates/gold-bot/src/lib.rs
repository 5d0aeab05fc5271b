//! # Gold Bot
//!
//! 매일 정해진 시각에 국제/국내 금 시세와 환율을 조회해
//! 금 프리미엄을 계산하고 텔레그램으로 알리는 봇.
//!
//! - [`config`]: 설정 로드 및 시작 시 검증
//! - [`pipeline`]: 조회 → 계산 → 코멘트 → 전송 한 번의 실행
//! - [`scheduler`]: 일일 트리거와 중복 실행 방지

pub mod config;
pub mod error;
pub mod pipeline;
pub mod scheduler;

pub use config::BotConfig;
pub use error::{BotError, Result};
pub use pipeline::{PremiumPipeline, RunReport};
pub use scheduler::{
    next_trigger_after, Clock, DailyTrigger, Scheduler, SchedulerState, SkipReason, SystemClock,
    TriggerOutcome, TriggerSource,
};
