//! 價格決策：固定價格 → 競品價格 → PVPM

use pricing_core::{PricingConfig, PricingError, ProductPricingProfile};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::competitor::CompetitorAnalysis;
use crate::PriceFlag;

/// 使用的定價策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingStrategy {
    /// 人工固定價格
    Fixed,
    /// 競品跟價
    Competitive,
    /// PVPM 底價
    Pvpm,
}

impl PricingStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fixed => "fixed",
            Self::Competitive => "competitive",
            Self::Pvpm => "pvpm",
        }
    }
}

impl fmt::Display for PricingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 價格決策結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceResolution {
    /// Marketplace 售價
    pub resolved_price: Decimal,
    pub strategy_used: PricingStrategy,
    pub flags: Vec<PriceFlag>,
    /// 決策時使用的 PVPM
    pub pvpm: Decimal,
}

impl PriceResolution {
    pub fn has_flag(&self, flag: PriceFlag) -> bool {
        self.flags.contains(&flag)
    }

    /// 旗標字串（供外部介面顯示）
    pub fn flag_names(&self) -> Vec<&'static str> {
        self.flags.iter().map(|f| f.as_str()).collect()
    }

    pub(crate) fn add_flag(&mut self, flag: PriceFlag) {
        if !self.flags.contains(&flag) {
            self.flags.push(flag);
        }
    }
}

/// 價格決策輸入
#[derive(Debug, Clone, Copy)]
pub struct ResolutionInput<'a> {
    pub pvpm: Decimal,
    pub profile: &'a ProductPricingProfile,
    /// 競品分析（無資料或資料過期時為 None）
    pub competitor: Option<&'a CompetitorAnalysis>,
    /// 目前 Storefront 售價
    pub storefront_price: Option<Decimal>,
}

/// 價格決策器
pub struct PriceResolver;

impl PriceResolver {
    /// 依優先順序決定 Marketplace 售價
    ///
    /// 除固定價格外，任何結果都不得低於 PVPM；跨通路 4% 規則只標記不修正。
    pub fn resolve(
        input: &ResolutionInput<'_>,
        config: &PricingConfig,
    ) -> pricing_core::Result<PriceResolution> {
        let (resolved_price, strategy_used) = Self::select_strategy(input);

        let mut resolution = PriceResolution {
            resolved_price,
            strategy_used,
            flags: Vec::new(),
            pvpm: input.pvpm,
        };

        if strategy_used == PricingStrategy::Fixed {
            if resolved_price < input.pvpm {
                resolution.add_flag(PriceFlag::FixedBelowPvpm);
            }
        } else {
            if resolved_price < input.pvpm {
                tracing::error!(
                    "非固定價格策略 {} 產生低於 PVPM 的價格: {} < {}",
                    strategy_used,
                    resolved_price,
                    input.pvpm
                );
                return Err(PricingError::PriceFloorViolation {
                    price: resolved_price,
                    pvpm: input.pvpm,
                });
            }
            if input.competitor.is_some_and(|c| c.buy_box_unreachable()) {
                resolution.add_flag(PriceFlag::BuyBoxUnreachable);
            }
        }

        if let Some(storefront) = input.storefront_price {
            let minimum = Self::minimum_marketplace_price(storefront, config)?;
            if resolved_price < minimum {
                tracing::warn!(
                    "Marketplace 價格 {} 低於 Storefront {} 的最低要求 {}",
                    resolved_price,
                    storefront,
                    minimum
                );
                resolution.add_flag(PriceFlag::ChannelConsistencyViolation);
                if strategy_used == PricingStrategy::Competitive {
                    resolution.add_flag(PriceFlag::BuyBoxChannelConflict);
                }
            }
        }

        Ok(resolution)
    }

    /// Storefront 售價對應的 Marketplace 最低售價
    pub fn minimum_marketplace_price(
        storefront_price: Decimal,
        config: &PricingConfig,
    ) -> pricing_core::Result<Decimal> {
        storefront_price
            .checked_mul(Decimal::ONE + config.marketplace_premium)
            .ok_or_else(|| {
                PricingError::CalculationOverflow(format!("Storefront 售價 {} 加成", storefront_price))
            })
    }

    fn select_strategy(input: &ResolutionInput<'_>) -> (Decimal, PricingStrategy) {
        if let Some(fixed) = input.profile.active_fixed_price() {
            return (fixed, PricingStrategy::Fixed);
        }

        if input.profile.auto_update_enabled {
            if let Some(recommended) = input.competitor.and_then(|c| c.recommended_price) {
                return (recommended, PricingStrategy::Competitive);
            }
        }

        (input.pvpm, PricingStrategy::Pvpm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::competitor::CompetitorAnalyzer;
    use pricing_core::CompetitorOffer;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn config() -> PricingConfig {
        PricingConfig::default()
    }

    fn analysis(lowest: Decimal, pvpm: Decimal) -> CompetitorAnalysis {
        let offers = vec![CompetitorOffer::new("S1", "Rival", lowest).with_buy_box(true)];
        CompetitorAnalyzer::analyze(None, &offers, pvpm, dec!(2))
    }

    #[test]
    fn test_fixed_price_wins() {
        let profile = ProductPricingProfile::new()
            .with_auto_update(true)
            .with_fixed_price(dec!(49.99), "promo")
            .unwrap();
        let competitor = analysis(dec!(30), dec!(20.31));

        let resolution = PriceResolver::resolve(
            &ResolutionInput {
                pvpm: dec!(20.31),
                profile: &profile,
                competitor: Some(&competitor),
                storefront_price: None,
            },
            &config(),
        )
        .unwrap();

        assert_eq!(resolution.resolved_price, dec!(49.99));
        assert_eq!(resolution.strategy_used, PricingStrategy::Fixed);
        assert!(resolution.flags.is_empty());
    }

    #[test]
    fn test_fixed_price_below_pvpm_is_not_clamped() {
        let profile = ProductPricingProfile::new()
            .with_fixed_price(dec!(15), "liquidación")
            .unwrap();

        let resolution = PriceResolver::resolve(
            &ResolutionInput {
                pvpm: dec!(20.31),
                profile: &profile,
                competitor: None,
                storefront_price: None,
            },
            &config(),
        )
        .unwrap();

        assert_eq!(resolution.resolved_price, dec!(15));
        assert!(resolution.has_flag(PriceFlag::FixedBelowPvpm));
    }

    #[test]
    fn test_competitive_price_when_auto_update() {
        let profile = ProductPricingProfile::new().with_auto_update(true);
        let competitor = analysis(dec!(25), dec!(20.31));

        let resolution = PriceResolver::resolve(
            &ResolutionInput {
                pvpm: dec!(20.31),
                profile: &profile,
                competitor: Some(&competitor),
                storefront_price: None,
            },
            &config(),
        )
        .unwrap();

        assert_eq!(resolution.resolved_price, dec!(23));
        assert_eq!(resolution.strategy_used, PricingStrategy::Competitive);
    }

    #[rstest]
    #[case(false, dec!(25))]
    #[case(true, dec!(20))]
    fn test_falls_back_to_pvpm(#[case] auto_update: bool, #[case] lowest: Decimal) {
        let profile = ProductPricingProfile::new().with_auto_update(auto_update);
        let competitor = analysis(lowest, dec!(20.31));

        let resolution = PriceResolver::resolve(
            &ResolutionInput {
                pvpm: dec!(20.31),
                profile: &profile,
                competitor: Some(&competitor),
                storefront_price: None,
            },
            &config(),
        )
        .unwrap();

        assert_eq!(resolution.strategy_used, PricingStrategy::Pvpm);
        assert_eq!(resolution.resolved_price, dec!(20.31));
    }

    #[test]
    fn test_unreachable_buy_box_flagged() {
        let profile = ProductPricingProfile::new().with_auto_update(true);
        let competitor = analysis(dec!(19), dec!(20.31));

        let resolution = PriceResolver::resolve(
            &ResolutionInput {
                pvpm: dec!(20.31),
                profile: &profile,
                competitor: Some(&competitor),
                storefront_price: None,
            },
            &config(),
        )
        .unwrap();

        assert_eq!(resolution.strategy_used, PricingStrategy::Pvpm);
        assert_eq!(resolution.flag_names(), vec!["buybox_unreachable"]);
    }

    #[test]
    fn test_channel_conflict_flagged_not_corrected() {
        let profile = ProductPricingProfile::new().with_auto_update(true);
        let competitor = analysis(dec!(25), dec!(20.31));

        // Storefront 23 → Marketplace 至少 23.92，競品價 23 違反規則
        let resolution = PriceResolver::resolve(
            &ResolutionInput {
                pvpm: dec!(20.31),
                profile: &profile,
                competitor: Some(&competitor),
                storefront_price: Some(dec!(23)),
            },
            &config(),
        )
        .unwrap();

        assert_eq!(resolution.resolved_price, dec!(23));
        assert!(resolution.has_flag(PriceFlag::ChannelConsistencyViolation));
        assert!(resolution.has_flag(PriceFlag::BuyBoxChannelConflict));
    }

    #[test]
    fn test_channel_rule_satisfied() {
        let profile = ProductPricingProfile::new();

        let resolution = PriceResolver::resolve(
            &ResolutionInput {
                pvpm: dec!(20.80),
                profile: &profile,
                competitor: None,
                storefront_price: Some(dec!(20)),
            },
            &config(),
        )
        .unwrap();

        assert!(resolution.flags.is_empty());
        assert_eq!(
            PriceResolver::minimum_marketplace_price(dec!(20), &config()).unwrap(),
            dec!(20.80)
        );
        assert!(matches!(
            PriceResolver::minimum_marketplace_price(Decimal::MAX, &config()),
            Err(PricingError::CalculationOverflow(_))
        ));
    }

    #[test]
    fn test_pvpm_strategy_violating_channel_rule() {
        let resolution = PriceResolver::resolve(
            &ResolutionInput {
                pvpm: dec!(20),
                profile: &ProductPricingProfile::new(),
                competitor: None,
                storefront_price: Some(dec!(20)),
            },
            &config(),
        )
        .unwrap();

        assert!(resolution.has_flag(PriceFlag::ChannelConsistencyViolation));
        assert!(!resolution.has_flag(PriceFlag::BuyBoxChannelConflict));
    }

    #[test]
    fn test_floor_violation_is_an_error() {
        // 人為構造低於 PVPM 的建議價，模擬邏輯錯誤
        let competitor = CompetitorAnalysis {
            has_buy_box: false,
            lowest_competitor_price: Some(dec!(25)),
            recommended_price: Some(dec!(18)),
            own_price: None,
        };
        let profile = ProductPricingProfile::new().with_auto_update(true);

        let result = PriceResolver::resolve(
            &ResolutionInput {
                pvpm: dec!(20.31),
                profile: &profile,
                competitor: Some(&competitor),
                storefront_price: None,
            },
            &config(),
        );

        assert_eq!(
            result,
            Err(PricingError::PriceFloorViolation {
                price: dec!(18),
                pvpm: dec!(20.31)
            })
        );
    }
}
