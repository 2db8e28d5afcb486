//! PVPM（最低可行售價）計算

use pricing_core::{PricingConfig, PricingError, ProductPricingProfile, PvpmResult};
use rust_decimal::Decimal;

use crate::cost_resolver::{CostResolver, ResolvedCost};

/// PVPM 計算器
///
/// 無內部狀態，相同輸入永遠得到相同結果。
pub struct PvpmCalculator;

impl PvpmCalculator {
    /// 計算單一商品的 PVPM
    pub fn calculate(
        erp_cost: Decimal,
        weight_kg: Option<Decimal>,
        profile: &ProductPricingProfile,
        config: &PricingConfig,
    ) -> pricing_core::Result<PvpmResult> {
        let resolved = CostResolver::resolve(erp_cost, weight_kg, profile, config)?;
        Self::from_resolved(&resolved, config.default_tax_rate)
    }

    /// 由已解析的成本參數計算
    ///
    /// base_price = cost / margin
    /// price_with_tax = base_price * (1 + tax_rate)
    /// pvpm = price_with_tax + shipping_cost
    pub fn from_resolved(
        resolved: &ResolvedCost,
        tax_rate: Decimal,
    ) -> pricing_core::Result<PvpmResult> {
        if resolved.margin <= Decimal::ZERO {
            return Err(PricingError::InvalidMargin {
                margin: resolved.margin,
            });
        }
        if tax_rate < Decimal::ZERO {
            return Err(PricingError::InvalidConfig(format!(
                "稅率不可為負: {}",
                tax_rate
            )));
        }

        let base_price = resolved
            .cost
            .checked_div(resolved.margin)
            .ok_or_else(|| overflow("cost / margin", resolved.cost))?;
        let price_with_tax = (Decimal::ONE + tax_rate)
            .checked_mul(base_price)
            .ok_or_else(|| overflow("base_price * (1 + tax_rate)", base_price))?;
        let pvpm = price_with_tax
            .checked_add(resolved.shipping_cost)
            .ok_or_else(|| overflow("price_with_tax + shipping_cost", price_with_tax))?;

        tracing::debug!(
            "PVPM: 成本 {} / 係數 {} = {}，含稅 {}，運費 {}，PVPM {}",
            resolved.cost,
            resolved.margin,
            base_price,
            price_with_tax,
            resolved.shipping_cost,
            pvpm
        );

        Ok(PvpmResult {
            cost: resolved.cost,
            margin: resolved.margin,
            base_price,
            tax_rate,
            price_with_tax,
            shipping_cost: resolved.shipping_cost,
            pvpm,
        })
    }
}

fn overflow(step: &str, value: Decimal) -> PricingError {
    PricingError::CalculationOverflow(format!("{}（{}）", step, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pricing_core::ShippingTier;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn config() -> PricingConfig {
        PricingConfig::new(dec!(0.75), dec!(0.21))
            .with_default_shipping_cost(dec!(4.18))
            .with_shipping_table(vec![ShippingTier::new(dec!(1), dec!(4.18))])
    }

    #[test]
    fn test_reference_breakdown() {
        let result =
            PvpmCalculator::calculate(dec!(10), Some(dec!(1)), &ProductPricingProfile::new(), &config())
                .unwrap();
        let shown = result.rounded();

        assert_eq!(shown.base_price, dec!(13.33));
        assert_eq!(shown.price_with_tax, dec!(16.13));
        assert_eq!(shown.shipping_cost, dec!(4.18));
        assert_eq!(shown.pvpm, dec!(20.31));
    }

    #[test]
    fn test_breakdown_invariants_hold_unrounded() {
        let result =
            PvpmCalculator::calculate(dec!(10), Some(dec!(1)), &ProductPricingProfile::new(), &config())
                .unwrap();

        assert_eq!(result.pvpm, result.price_with_tax + result.shipping_cost);
        assert_eq!(result.price_with_tax, result.base_price * (Decimal::ONE + result.tax_rate));
        assert_eq!(result.base_price, result.cost / result.margin);
        // 內部不做四捨五入
        assert_ne!(result.pvpm, dec!(20.31));
    }

    #[test]
    fn test_zero_margin_fails() {
        let profile = ProductPricingProfile::new().with_custom_margin(Decimal::ZERO);

        assert!(matches!(
            PvpmCalculator::calculate(dec!(10), Some(dec!(1)), &profile, &config()),
            Err(PricingError::InvalidMargin { .. })
        ));
    }

    #[test]
    fn test_huge_cost_is_an_error_not_a_panic() {
        let profile = ProductPricingProfile::new().with_custom_margin(dec!(0.5));

        assert!(matches!(
            PvpmCalculator::calculate(Decimal::MAX, Some(dec!(1)), &profile, &config()),
            Err(PricingError::CalculationOverflow(_))
        ));
    }

    #[test]
    fn test_huge_shipping_sum_is_an_error() {
        let profile = ProductPricingProfile::new().with_custom_margin(Decimal::ONE);

        assert!(matches!(
            PvpmCalculator::calculate(Decimal::MAX / dec!(2), Some(Decimal::MAX), &profile, &config()),
            Err(PricingError::CalculationOverflow(_))
        ));
    }

    #[test]
    fn test_heavy_item_uses_overflow_shipping() {
        let result =
            PvpmCalculator::calculate(dec!(30), Some(dec!(25)), &ProductPricingProfile::new(), &config())
                .unwrap();

        assert_eq!(result.shipping_cost, dec!(11.60));
        assert_eq!(result.pvpm, dec!(40) * dec!(1.21) + dec!(11.60));
    }

    #[test]
    fn test_negative_tax_rejected() {
        let mut config = config();
        config.default_tax_rate = dec!(-0.1);

        assert!(PvpmCalculator::calculate(dec!(10), None, &ProductPricingProfile::new(), &config)
            .is_err());
    }

    proptest! {
        #[test]
        fn prop_calculation_is_idempotent(
            cost_cents in 0i64..10_000_000,
            margin_pct in 1i64..=100,
            weight_grams in 0i64..60_000,
        ) {
            let cost = Decimal::new(cost_cents, 2);
            let weight = Decimal::new(weight_grams, 3);
            let profile = ProductPricingProfile::new().with_custom_margin(Decimal::new(margin_pct, 2));

            let first = PvpmCalculator::calculate(cost, Some(weight), &profile, &config()).unwrap();
            for _ in 0..5 {
                let again = PvpmCalculator::calculate(cost, Some(weight), &profile, &config()).unwrap();
                prop_assert_eq!(again, first);
                prop_assert_eq!(again.pvpm.serialize(), first.pvpm.serialize());
            }
            prop_assert!(first.pvpm >= Decimal::ZERO);
        }
    }
}
