//! 금 프리미엄(김치 프리미엄) 계산.
//!
//! 국제 시세를 환율로 원화 환산한 가격 대비 국내 시세가 몇 % 높은지 계산합니다.
//!
//! ```text
//! 국제가(원) = 국제가(USD) × 환율(원/USD)
//! 프리미엄(%) = (국내가 − 국제가(원)) / 국제가(원) × 100
//! ```
//!
//! 두 시세는 같은 중량 단위로 정규화된 뒤에만 비교할 수 있습니다.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::quote::{ExchangeRate, PriceQuote};
use crate::error::{GoldError, GoldResult};
use crate::types::{Currency, DecimalExt, GoldUnit};

/// 표시용 프리미엄 소수점 자릿수.
pub const PREMIUM_DISPLAY_DP: u32 = 2;

/// 프리미엄 계산 결과.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PremiumResult {
    /// 국제 시세 (USD)
    pub international: PriceQuote,
    /// 국내 시세 (KRW)
    pub domestic: PriceQuote,
    /// 적용 환율
    pub rate: ExchangeRate,
    /// 두 시세의 공통 중량 단위
    pub unit: GoldUnit,
    /// 원화 환산 국제가
    pub international_price_krw: Decimal,
    /// 국내가
    pub domestic_price_krw: Decimal,
    /// 표시용 프리미엄 (%), 소수점 둘째 자리 반올림
    pub premium_percent: Decimal,
    /// 반올림 전 프리미엄 (%)
    pub premium_percent_raw: Decimal,
    /// 계산 시각
    pub computed_at: DateTime<Utc>,
}

/// 순수 프리미엄 계산기.
///
/// I/O도 내부 상태도 없으므로 같은 입력에 항상 같은 결과를 냅니다.
#[derive(Debug, Clone, Copy, Default)]
pub struct PremiumCalculator;

impl PremiumCalculator {
    /// 현재 시각으로 프리미엄을 계산합니다.
    pub fn compute(
        intl_usd: &PriceQuote,
        domestic_krw: &PriceQuote,
        rate: &ExchangeRate,
    ) -> GoldResult<PremiumResult> {
        Self::compute_at(intl_usd, domestic_krw, rate, Utc::now())
    }

    /// 지정된 계산 시각으로 프리미엄을 계산합니다.
    ///
    /// # Errors
    ///
    /// 가격이나 환율이 0 이하이거나, 통화가 맞지 않거나, 중량 단위가 다르면
    /// [`GoldError::InvalidInput`]을 반환합니다. 곱셈/나눗셈이 `Decimal` 범위를
    /// 넘는 극단값도 같은 에러로 처리합니다.
    pub fn compute_at(
        intl_usd: &PriceQuote,
        domestic_krw: &PriceQuote,
        rate: &ExchangeRate,
        computed_at: DateTime<Utc>,
    ) -> GoldResult<PremiumResult> {
        if intl_usd.currency != Currency::Usd {
            return Err(GoldError::InvalidInput(format!(
                "국제 시세 통화가 USD가 아님: {}",
                intl_usd.currency
            )));
        }
        if domestic_krw.currency != Currency::Krw {
            return Err(GoldError::InvalidInput(format!(
                "국내 시세 통화가 KRW가 아님: {}",
                domestic_krw.currency
            )));
        }
        ensure_positive("국제 시세", intl_usd.amount)?;
        ensure_positive("국내 시세", domestic_krw.amount)?;
        ensure_positive("환율", rate.krw_per_usd)?;

        if intl_usd.unit != domestic_krw.unit {
            return Err(GoldError::InvalidInput(format!(
                "중량 단위 불일치: 국제 {} / 국내 {}",
                intl_usd.unit, domestic_krw.unit
            )));
        }

        let international_price_krw = intl_usd
            .amount
            .checked_mul(rate.krw_per_usd)
            .ok_or_else(|| out_of_range("국제가 원화 환산"))?;
        let domestic_price_krw = domestic_krw.amount;
        let premium_percent_raw = domestic_price_krw
            .checked_sub(international_price_krw)
            .and_then(|diff| diff.checked_div(international_price_krw))
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .ok_or_else(|| out_of_range("프리미엄"))?;

        Ok(PremiumResult {
            international: intl_usd.clone(),
            domestic: domestic_krw.clone(),
            rate: rate.clone(),
            unit: intl_usd.unit,
            international_price_krw,
            domestic_price_krw,
            premium_percent: premium_percent_raw.round_half_up(PREMIUM_DISPLAY_DP),
            premium_percent_raw,
            computed_at,
        })
    }
}

fn out_of_range(label: &str) -> GoldError {
    GoldError::InvalidInput(format!("{} 계산 결과가 표현 범위를 벗어남", label))
}

fn ensure_positive(label: &str, value: Decimal) -> GoldResult<()> {
    if value > Decimal::ZERO {
        Ok(())
    } else {
        Err(GoldError::InvalidInput(format!(
            "{}는 양수여야 함: {}",
            label, value
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 2, 0, 0, 0).unwrap()
    }

    fn intl(amount: Decimal) -> PriceQuote {
        PriceQuote::usd(amount, GoldUnit::TroyOunce, at())
    }

    fn domestic(amount: Decimal) -> PriceQuote {
        PriceQuote::krw(amount, GoldUnit::TroyOunce, at())
    }

    #[test]
    fn test_reference_scenario() {
        let result = PremiumCalculator::compute_at(
            &intl(dec!(2000.00)),
            &domestic(dec!(2850000)),
            &ExchangeRate::new(dec!(1350.00), at()),
            at(),
        )
        .unwrap();

        assert_eq!(result.international_price_krw, dec!(2700000));
        assert_eq!(result.domestic_price_krw, dec!(2850000));
        assert_eq!(result.premium_percent, dec!(5.56));
        assert!(result.premium_percent_raw > dec!(5.555));
        assert!(result.premium_percent_raw < dec!(5.556));
        assert_eq!(result.computed_at, at());
    }

    #[test]
    fn test_identical_prices_give_zero_premium() {
        let result = PremiumCalculator::compute_at(
            &intl(dec!(2000)),
            &domestic(dec!(2700000)),
            &ExchangeRate::new(dec!(1350), at()),
            at(),
        )
        .unwrap();

        assert_eq!(result.premium_percent, Decimal::ZERO);
        assert!(result.premium_percent_raw.is_zero());
    }

    #[test]
    fn test_discount_is_negative() {
        let result = PremiumCalculator::compute_at(
            &intl(dec!(2000)),
            &domestic(dec!(2600000)),
            &ExchangeRate::new(dec!(1350), at()),
            at(),
        )
        .unwrap();

        assert_eq!(result.premium_percent, dec!(-3.70));
    }

    #[test]
    fn test_rejects_non_positive_inputs() {
        let rate = ExchangeRate::new(dec!(1350), at());
        for (i, d) in [
            (dec!(0), dec!(2850000)),
            (dec!(-1), dec!(2850000)),
            (dec!(2000), dec!(0)),
        ] {
            let err = PremiumCalculator::compute_at(&intl(i), &domestic(d), &rate, at())
                .unwrap_err();
            assert!(matches!(err, GoldError::InvalidInput(_)));
        }

        let err = PremiumCalculator::compute_at(
            &intl(dec!(2000)),
            &domestic(dec!(2850000)),
            &ExchangeRate::new(dec!(0), at()),
            at(),
        )
        .unwrap_err();
        assert!(matches!(err, GoldError::InvalidInput(_)));
    }

    #[test]
    fn test_rejects_unit_mismatch() {
        let per_gram = PriceQuote::krw(dec!(95000), GoldUnit::Gram, at());
        let err = PremiumCalculator::compute_at(
            &intl(dec!(2000)),
            &per_gram,
            &ExchangeRate::new(dec!(1350), at()),
            at(),
        )
        .unwrap_err();
        assert!(matches!(err, GoldError::InvalidInput(_)));
    }

    #[test]
    fn test_rejects_swapped_currencies() {
        let err = PremiumCalculator::compute_at(
            &domestic(dec!(2850000)),
            &intl(dec!(2000)),
            &ExchangeRate::new(dec!(1350), at()),
            at(),
        )
        .unwrap_err();
        assert!(matches!(err, GoldError::InvalidInput(_)));
    }

    #[test]
    fn test_normalized_units_match_ounce_result() {
        // 같은 시세를 g 기준으로 정규화해도 프리미엄은 동일해야 함
        let rate = ExchangeRate::new(dec!(1350), at());
        let oz = PremiumCalculator::compute_at(
            &intl(dec!(2000)),
            &domestic(dec!(2850000)),
            &rate,
            at(),
        )
        .unwrap();
        let gram = PremiumCalculator::compute_at(
            &intl(dec!(2000)).normalize_to(GoldUnit::Gram),
            &domestic(dec!(2850000)).normalize_to(GoldUnit::Gram),
            &rate,
            at(),
        )
        .unwrap();

        assert_eq!(oz.premium_percent, gram.premium_percent);
    }

    #[test]
    fn test_extreme_values_are_invalid_input_not_panic() {
        // 원화 환산가 곱셈 범위 초과
        let err = PremiumCalculator::compute_at(
            &intl(Decimal::MAX),
            &domestic(dec!(1)),
            &ExchangeRate::new(dec!(2), at()),
            at(),
        )
        .unwrap_err();
        assert!(matches!(err, GoldError::InvalidInput(_)));

        // 아주 작은 국제가로 나눌 때 범위 초과
        let err = PremiumCalculator::compute_at(
            &intl(Decimal::new(1, 28)),
            &domestic(dec!(10000000000)),
            &ExchangeRate::new(dec!(1), at()),
            at(),
        )
        .unwrap_err();
        assert!(matches!(err, GoldError::InvalidInput(_)));
    }
}
