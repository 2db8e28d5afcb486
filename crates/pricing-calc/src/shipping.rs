//! 運費級距查詢

use pricing_core::{PricingConfig, PricingError, ShippingTier};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// 級距表只涵蓋到此重量（kg），超過改用超重公式
pub const OVERFLOW_THRESHOLD_KG: Decimal = dec!(20);

/// 超重公式基本費（20 kg 的運費）
pub const OVERFLOW_BASE_COST: Decimal = dec!(9.25);

/// 超重部分每公斤費用
pub const OVERFLOW_COST_PER_KG: Decimal = dec!(0.47);

/// 運費來源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShippingSource {
    /// 商品自訂運費
    Override,
    /// 級距表
    Tier,
    /// 超重公式
    Overflow,
    /// 全域預設運費
    Default,
}

/// 運費計算器
pub struct ShippingCalculator;

impl ShippingCalculator {
    /// 依重量查詢運費
    ///
    /// - 重量未知或 <= 0：取最小級距，無級距時取預設運費
    /// - 重量 > 20 kg：9.25 + (weight - 20) * 0.47，不查表
    /// - 其他：第一個 max_weight_kg >= weight 的級距，找不到時取預設運費
    pub fn lookup(
        weight_kg: Option<Decimal>,
        config: &PricingConfig,
    ) -> pricing_core::Result<(Decimal, ShippingSource)> {
        let table = &config.shipping_cost_table;

        let weight = match weight_kg {
            Some(w) if w > Decimal::ZERO => w,
            _ => {
                return match table.first() {
                    Some(tier) => Ok((tier.cost, ShippingSource::Tier)),
                    None => Self::default_cost(weight_kg, config),
                };
            }
        };

        if weight > OVERFLOW_THRESHOLD_KG {
            return Ok((Self::overflow_cost(weight)?, ShippingSource::Overflow));
        }

        match Self::find_tier(weight, table) {
            Some(tier) => Ok((tier.cost, ShippingSource::Tier)),
            None => {
                tracing::debug!("重量 {} kg 超出級距表，使用預設運費", weight);
                Self::default_cost(weight_kg, config)
            }
        }
    }

    /// 超重公式
    pub fn overflow_cost(weight_kg: Decimal) -> pricing_core::Result<Decimal> {
        (weight_kg - OVERFLOW_THRESHOLD_KG)
            .checked_mul(OVERFLOW_COST_PER_KG)
            .and_then(|extra| extra.checked_add(OVERFLOW_BASE_COST))
            .ok_or_else(|| {
                PricingError::CalculationOverflow(format!("超重運費（{} kg）", weight_kg))
            })
    }

    /// 第一個可容納該重量的級距（表已依重量遞增）
    fn find_tier(weight_kg: Decimal, table: &[ShippingTier]) -> Option<&ShippingTier> {
        table.iter().find(|tier| tier.max_weight_kg >= weight_kg)
    }

    fn default_cost(
        weight_kg: Option<Decimal>,
        config: &PricingConfig,
    ) -> pricing_core::Result<(Decimal, ShippingSource)> {
        config
            .default_shipping_cost
            .map(|cost| (cost, ShippingSource::Default))
            .ok_or(PricingError::MissingShippingTier { weight_kg })
    }
}
