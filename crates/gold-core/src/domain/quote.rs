//! 시세 및 환율 스냅샷.
//!
//! 두 타입 모두 조회 시점에 한 번 생성되고 이후 변경되지 않습니다.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Currency, GoldUnit};

/// 금 시세.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceQuote {
    /// 단위당 가격
    pub amount: Decimal,
    /// 통화
    pub currency: Currency,
    /// 중량 기준 단위
    pub unit: GoldUnit,
    /// 업스트림이 보고한 관측 시각
    pub observed_at: DateTime<Utc>,
}

impl PriceQuote {
    /// 새 시세를 생성합니다.
    pub fn new(
        amount: Decimal,
        currency: Currency,
        unit: GoldUnit,
        observed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            amount,
            currency,
            unit,
            observed_at,
        }
    }

    /// USD 시세를 생성합니다.
    pub fn usd(amount: Decimal, unit: GoldUnit, observed_at: DateTime<Utc>) -> Self {
        Self::new(amount, Currency::Usd, unit, observed_at)
    }

    /// KRW 시세를 생성합니다.
    pub fn krw(amount: Decimal, unit: GoldUnit, observed_at: DateTime<Utc>) -> Self {
        Self::new(amount, Currency::Krw, unit, observed_at)
    }

    /// 다른 중량 단위로 환산한 새 시세를 반환합니다.
    pub fn normalize_to(&self, unit: GoldUnit) -> Self {
        Self {
            amount: unit.convert_price(self.amount, self.unit),
            unit,
            ..self.clone()
        }
    }
}

/// KRW/USD 환율.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRate {
    /// 1 USD당 원화
    pub krw_per_usd: Decimal,
    /// 관측 시각
    pub observed_at: DateTime<Utc>,
}

impl ExchangeRate {
    /// 새 환율을 생성합니다.
    pub fn new(krw_per_usd: Decimal, observed_at: DateTime<Utc>) -> Self {
        Self {
            krw_per_usd,
            observed_at,
        }
    }
}
