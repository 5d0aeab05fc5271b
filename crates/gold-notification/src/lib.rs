//! # Gold Notification
//!
//! 금 프리미엄 알림 전송 및 AI 추세 코멘트.
//!
//! 지원 채널:
//! - Telegram (Bot API `sendMessage`)
//!
//! 코멘트 제공자:
//! - OpenAI Chat Completions

pub mod message;
pub mod openai;
pub mod telegram;
pub mod types;

pub use message::*;
pub use openai::*;
pub use telegram::*;
pub use types::*;
