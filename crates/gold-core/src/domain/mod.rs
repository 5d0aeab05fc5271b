//! 프리미엄 계산을 위한 도메인 모델.

mod commentary;
mod premium;
mod quote;

pub use commentary::*;
pub use premium::*;
pub use quote::*;
