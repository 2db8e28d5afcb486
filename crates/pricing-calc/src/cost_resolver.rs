//! 成本解析：商品覆蓋值優先，其次全域預設

use pricing_core::{PricingConfig, PricingError, ProductPricingProfile};
use rust_decimal::Decimal;

use crate::shipping::{ShippingCalculator, ShippingSource};

/// 解析後的成本參數
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedCost {
    pub cost: Decimal,
    pub margin: Decimal,
    pub shipping_cost: Decimal,
    pub shipping_source: ShippingSource,
}

/// 依序取第一個為正的值
pub fn first_positive(sources: &[Option<Decimal>]) -> Option<Decimal> {
    sources
        .iter()
        .flatten()
        .copied()
        .find(|value| *value > Decimal::ZERO)
}

/// 成本解析器
pub struct CostResolver;

impl CostResolver {
    /// 解析成本、利潤係數與運費
    ///
    /// - 成本：自訂成本（> 0）→ ERP 成本，結果 < 0 時失敗
    /// - 利潤係數：自訂值只要存在就採用 → 預設值，結果須 0 < m <= 1
    /// - 運費：自訂運費（> 0）→ 級距表 / 超重公式 → 預設運費
    pub fn resolve(
        erp_cost: Decimal,
        weight_kg: Option<Decimal>,
        profile: &ProductPricingProfile,
        config: &PricingConfig,
    ) -> pricing_core::Result<ResolvedCost> {
        let cost = first_positive(&[profile.custom_cost]).unwrap_or(erp_cost);
        if cost < Decimal::ZERO {
            return Err(PricingError::InvalidCost { cost });
        }

        let margin = Self::resolve_margin(profile, config)?;

        let (shipping_cost, shipping_source) =
            match first_positive(&[profile.custom_shipping_cost]) {
                Some(custom) => (custom, ShippingSource::Override),
                None => ShippingCalculator::lookup(weight_kg, config)?,
            };

        Ok(ResolvedCost {
            cost,
            margin,
            shipping_cost,
            shipping_source,
        })
    }

    /// 解析利潤係數
    ///
    /// 自訂值為 0 也不會退回預設值，錯誤設定必須以 InvalidMargin 顯示出來。
    pub fn resolve_margin(
        profile: &ProductPricingProfile,
        config: &PricingConfig,
    ) -> pricing_core::Result<Decimal> {
        let margin = profile.custom_margin.unwrap_or(config.default_margin);
        if margin <= Decimal::ZERO || margin > Decimal::ONE {
            return Err(PricingError::InvalidMargin { margin });
        }
        Ok(margin)
    }
}
