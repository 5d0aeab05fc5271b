//! 금액 표기를 위한 Decimal 유틸리티.

use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal 표기 확장 트레이트.
pub trait DecimalExt {
    /// 지정된 소수점 자릿수로 반올림합니다 (0.5는 0에서 먼 쪽으로).
    fn round_half_up(&self, dp: u32) -> Decimal;

    /// 천 단위 구분 기호를 넣은 문자열로 변환합니다 (예: "2,850,000").
    fn to_grouped_string(&self, dp: u32) -> String;

    /// 부호를 항상 붙인 문자열로 변환합니다 (예: "+5.56", "-0.40").
    fn to_signed_string(&self, dp: u32) -> String;
}

impl DecimalExt for Decimal {
    fn round_half_up(&self, dp: u32) -> Decimal {
        self.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
    }

    fn to_grouped_string(&self, dp: u32) -> String {
        let rounded = self.round_half_up(dp);
        let text = format!("{:.*}", dp as usize, rounded.abs());
        let (int_part, frac_part) = match text.split_once('.') {
            Some((i, f)) => (i, Some(f)),
            None => (text.as_str(), None),
        };

        let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3 + 4);
        for (i, ch) in int_part.chars().enumerate() {
            if i > 0 && (int_part.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }
        if let Some(frac) = frac_part {
            grouped.push('.');
            grouped.push_str(frac);
        }

        if rounded.is_sign_negative() && !rounded.is_zero() {
            format!("-{}", grouped)
        } else {
            grouped
        }
    }

    fn to_signed_string(&self, dp: u32) -> String {
        let rounded = self.round_half_up(dp);
        if rounded.is_sign_negative() && !rounded.is_zero() {
            format!("{:.*}", dp as usize, rounded)
        } else {
            format!("+{:.*}", dp as usize, rounded.abs())
        }
    }
}
