//! 商品定價設定模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{PricingError, Result};

/// 商品定價設定（每個商品一份）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductPricingProfile {
    /// 自訂成本（覆蓋 ERP 成本）
    pub custom_cost: Option<Decimal>,

    /// 自訂利潤係數
    pub custom_margin: Option<Decimal>,

    /// 自訂運費
    pub custom_shipping_cost: Option<Decimal>,

    /// 是否允許自動調價（競品跟價）
    pub auto_update_enabled: bool,

    /// 固定價格
    pub fixed_price: Option<Decimal>,

    /// 固定價格原因（與 fixed_price 同時存在）
    pub fixed_price_reason: Option<String>,

    /// 樂觀鎖版本號
    #[serde(default)]
    pub version: u64,
}

impl ProductPricingProfile {
    /// 創建新的定價設定（無覆蓋值）
    pub fn new() -> Self {
        Self::default()
    }

    /// 建構器模式：設置自訂成本
    pub fn with_custom_cost(mut self, cost: Decimal) -> Self {
        self.custom_cost = Some(cost);
        self
    }

    /// 建構器模式：設置自訂利潤係數
    pub fn with_custom_margin(mut self, margin: Decimal) -> Self {
        self.custom_margin = Some(margin);
        self
    }

    /// 建構器模式：設置自訂運費
    pub fn with_custom_shipping_cost(mut self, cost: Decimal) -> Self {
        self.custom_shipping_cost = Some(cost);
        self
    }

    /// 建構器模式：設置自動調價
    pub fn with_auto_update(mut self, enabled: bool) -> Self {
        self.auto_update_enabled = enabled;
        self
    }

    /// 建構器模式：設置固定價格
    pub fn with_fixed_price(mut self, price: Decimal, reason: &str) -> Result<Self> {
        self.set_fixed_price(Some(price), reason)?;
        Ok(self)
    }

    /// 設置或清除固定價格
    ///
    /// 價格必須為正且原因不可為空；傳入 None 同時清除價格與原因。
    pub fn set_fixed_price(&mut self, price: Option<Decimal>, reason: &str) -> Result<()> {
        match price {
            Some(price) => {
                if price <= Decimal::ZERO {
                    return Err(PricingError::InvalidFixedPrice(format!(
                        "固定價格必須為正: {}",
                        price
                    )));
                }
                let reason = reason.trim();
                if reason.is_empty() {
                    return Err(PricingError::InvalidFixedPrice(
                        "固定價格必須提供原因".to_string(),
                    ));
                }
                self.fixed_price = Some(price);
                self.fixed_price_reason = Some(reason.to_string());
            }
            None => {
                self.fixed_price = None;
                self.fixed_price_reason = None;
            }
        }
        Ok(())
    }

    /// 有效的固定價格（為正才算）
    pub fn active_fixed_price(&self) -> Option<Decimal> {
        self.fixed_price.filter(|p| *p > Decimal::ZERO)
    }

    /// 套用部分更新，並驗證固定價格不變量
    pub fn apply_patch(&mut self, patch: &ProfilePatch) -> Result<()> {
        if let Some(cost) = patch.custom_cost {
            self.custom_cost = cost;
        }
        if let Some(margin) = patch.custom_margin {
            self.custom_margin = margin;
        }
        if let Some(shipping) = patch.custom_shipping_cost {
            self.custom_shipping_cost = shipping;
        }
        if let Some(enabled) = patch.auto_update_enabled {
            self.auto_update_enabled = enabled;
        }
        if let Some(fixed) = &patch.fixed_price {
            let reason = patch.fixed_price_reason.clone().flatten().unwrap_or_default();
            self.set_fixed_price(*fixed, &reason)?;
        } else if patch.fixed_price_reason.is_some() {
            return Err(PricingError::InvalidFixedPrice(
                "固定價格原因不可單獨修改".to_string(),
            ));
        }
        Ok(())
    }
}

/// 定價設定的部分更新
///
/// 外層 None = 不修改，Some(None) = 清除，Some(Some(v)) = 設置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfilePatch {
    pub custom_cost: Option<Option<Decimal>>,
    pub custom_margin: Option<Option<Decimal>>,
    pub custom_shipping_cost: Option<Option<Decimal>>,
    pub auto_update_enabled: Option<bool>,
    pub fixed_price: Option<Option<Decimal>>,
    pub fixed_price_reason: Option<Option<String>>,
}

impl ProfilePatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn custom_cost(mut self, cost: Option<Decimal>) -> Self {
        self.custom_cost = Some(cost);
        self
    }

    pub fn custom_margin(mut self, margin: Option<Decimal>) -> Self {
        self.custom_margin = Some(margin);
        self
    }

    pub fn custom_shipping_cost(mut self, cost: Option<Decimal>) -> Self {
        self.custom_shipping_cost = Some(cost);
        self
    }

    pub fn auto_update_enabled(mut self, enabled: bool) -> Self {
        self.auto_update_enabled = Some(enabled);
        self
    }

    pub fn fixed_price(mut self, price: Option<Decimal>, reason: Option<String>) -> Self {
        self.fixed_price = Some(price);
        self.fixed_price_reason = Some(reason);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_fixed_price_requires_reason() {
        let mut profile = ProductPricingProfile::new();

        assert!(profile.set_fixed_price(Some(dec!(49.99)), "  ").is_err());
        assert_eq!(profile.fixed_price, None);

        profile.set_fixed_price(Some(dec!(49.99)), "promo").unwrap();
        assert_eq!(profile.active_fixed_price(), Some(dec!(49.99)));
        assert_eq!(profile.fixed_price_reason.as_deref(), Some("promo"));
    }

    #[test]
    fn test_fixed_price_must_be_positive() {
        let mut profile = ProductPricingProfile::new();

        assert!(matches!(
            profile.set_fixed_price(Some(Decimal::ZERO), "promo"),
            Err(PricingError::InvalidFixedPrice(_))
        ));
        assert!(profile.set_fixed_price(Some(dec!(-1)), "promo").is_err());
    }

    #[test]
    fn test_clearing_fixed_price_clears_reason() {
        let mut profile = ProductPricingProfile::new()
            .with_fixed_price(dec!(10), "liquidación")
            .unwrap();

        profile.set_fixed_price(None, "").unwrap();
        assert_eq!(profile.fixed_price, None);
        assert_eq!(profile.fixed_price_reason, None);
    }

    #[test]
    fn test_apply_patch() {
        let mut profile = ProductPricingProfile::new()
            .with_custom_cost(dec!(12))
            .with_custom_margin(dec!(0.8));

        let patch = ProfilePatch::new()
            .custom_cost(None)
            .auto_update_enabled(true)
            .fixed_price(Some(dec!(30)), Some("campaña".to_string()));
        profile.apply_patch(&patch).unwrap();

        assert_eq!(profile.custom_cost, None);
        assert_eq!(profile.custom_margin, Some(dec!(0.8)));
        assert!(profile.auto_update_enabled);
        assert_eq!(profile.fixed_price, Some(dec!(30)));
    }

    #[test]
    fn test_patch_reason_alone_rejected() {
        let mut profile = ProductPricingProfile::new();
        let patch = ProfilePatch {
            fixed_price_reason: Some(Some("x".to_string())),
            ..ProfilePatch::default()
        };

        assert!(profile.apply_patch(&patch).is_err());
    }
}
