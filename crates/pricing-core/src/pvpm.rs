//! PVPM 計算結果模型

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// 金額顯示用四捨五入（兩位小數）
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// 可發布的最低價格：向上取到分，永遠不低於原值
pub fn round_up_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::ToPositiveInfinity)
}

/// PVPM 計算明細
///
/// 內部欄位保持完整精度，只有 [`PvpmResult::rounded`] 才做四捨五入。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PvpmResult {
    /// 實際成本
    pub cost: Decimal,
    /// 利潤係數
    pub margin: Decimal,
    /// 未稅價 = cost / margin
    pub base_price: Decimal,
    /// 稅率
    pub tax_rate: Decimal,
    /// 含稅價 = base_price * (1 + tax_rate)
    pub price_with_tax: Decimal,
    /// 運費
    pub shipping_cost: Decimal,
    /// 最低售價 = price_with_tax + shipping_cost
    pub pvpm: Decimal,
}

impl PvpmResult {
    /// 顯示用版本（金額取兩位小數）
    pub fn rounded(&self) -> Self {
        Self {
            cost: round_money(self.cost),
            margin: self.margin,
            base_price: round_money(self.base_price),
            tax_rate: self.tax_rate,
            price_with_tax: round_money(self.price_with_tax),
            shipping_cost: round_money(self.shipping_cost),
            pvpm: round_money(self.pvpm),
        }
    }

    /// 發布價格的下限（PVPM 向上取到分）
    pub fn price_floor(&self) -> Decimal {
        round_up_money(self.pvpm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round_money() {
        assert_eq!(round_money(dec!(20.3133)), dec!(20.31));
        assert_eq!(round_money(dec!(2.005)), dec!(2.01));
        assert_eq!(round_money(dec!(-2.005)), dec!(-2.01));
    }

    #[test]
    fn test_round_up_money_never_lowers() {
        assert_eq!(round_up_money(dec!(20.313333)), dec!(20.32));
        assert_eq!(round_up_money(dec!(20.31)), dec!(20.31));
        assert_eq!(round_up_money(dec!(20.3100001)), dec!(20.32));
    }

    #[test]
    fn test_rounded_keeps_rates() {
        let result = PvpmResult {
            cost: dec!(10),
            margin: dec!(0.75),
            base_price: dec!(13.333333),
            tax_rate: dec!(0.21),
            price_with_tax: dec!(16.133333),
            shipping_cost: dec!(4.18),
            pvpm: dec!(20.313333),
        };

        let rounded = result.rounded();
        assert_eq!(rounded.base_price, dec!(13.33));
        assert_eq!(rounded.price_with_tax, dec!(16.13));
        assert_eq!(rounded.pvpm, dec!(20.31));
        assert_eq!(rounded.margin, dec!(0.75));
        assert_eq!(result.price_floor(), dec!(20.32));
        assert!(result.price_floor() >= result.pvpm);
    }
}
