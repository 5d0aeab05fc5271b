//! 통화 및 금 중량 단위.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// 시세 통화.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Krw,
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Usd => write!(f, "USD"),
            Self::Krw => write!(f, "KRW"),
        }
    }
}

/// 금 시세의 중량 기준 단위.
///
/// 국제 시세는 트로이온스, 국내 금거래소 시세는 돈(3.75g) 기준으로 고시됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoldUnit {
    /// 1g
    #[default]
    Gram,
    /// 1 트로이온스 = 31.1034768g
    TroyOunce,
    /// 1돈 = 3.75g
    Don,
}

impl GoldUnit {
    /// 단위당 그램 수.
    pub fn grams(&self) -> Decimal {
        match self {
            Self::Gram => Decimal::ONE,
            Self::TroyOunce => dec!(31.1034768),
            Self::Don => dec!(3.75),
        }
    }

    /// 메시지 표기용 약어.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Gram => "g",
            Self::TroyOunce => "oz",
            Self::Don => "돈",
        }
    }

    /// `from` 단위 기준 가격을 `self` 단위 기준 가격으로 환산합니다.
    pub fn convert_price(&self, amount: Decimal, from: GoldUnit) -> Decimal {
        if *self == from {
            return amount;
        }
        amount * self.grams() / from.grams()
    }
}

impl std::str::FromStr for GoldUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "g" | "gram" => Ok(Self::Gram),
            "oz" | "troy_ounce" | "ounce" => Ok(Self::TroyOunce),
            "don" | "돈" => Ok(Self::Don),
            other => Err(format!("Unknown gold unit: {}", other)),
        }
    }
}

impl std::fmt::Display for GoldUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_same_unit_is_identity() {
        assert_eq!(
            GoldUnit::Gram.convert_price(dec!(123.45), GoldUnit::Gram),
            dec!(123.45)
        );
    }

    #[test]
    fn test_convert_don_to_gram() {
        // 1돈 375,000원 → 1g 100,000원
        assert_eq!(
            GoldUnit::Gram.convert_price(dec!(375000), GoldUnit::Don),
            dec!(100000)
        );
    }

    #[test]
    fn test_convert_ounce_to_gram_and_back() {
        let per_gram = GoldUnit::Gram.convert_price(dec!(2000), GoldUnit::TroyOunce);
        let per_oz = GoldUnit::TroyOunce.convert_price(per_gram, GoldUnit::Gram);
        assert_eq!(per_oz.round_dp(6), dec!(2000));
    }

    #[test]
    fn test_parse_unit() {
        assert_eq!("gram".parse::<GoldUnit>().unwrap(), GoldUnit::Gram);
        assert_eq!("OZ".parse::<GoldUnit>().unwrap(), GoldUnit::TroyOunce);
        assert_eq!("don".parse::<GoldUnit>().unwrap(), GoldUnit::Don);
        assert!("kg".parse::<GoldUnit>().is_err());
    }
}
