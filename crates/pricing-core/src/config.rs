//! 定價配置模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{PricingError, Result};

/// 全域定價配置（每次計算的快照參數）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingConfig {
    /// 預設利潤係數（0.75 表示 成本 / 0.75）
    pub default_margin: Decimal,

    /// 預設稅率（0.21 = 21%）
    pub default_tax_rate: Decimal,

    /// 預設運費（None 表示未設定）
    pub default_shipping_cost: Option<Decimal>,

    /// 重量運費級距表（依 max_weight_kg 遞增）
    pub shipping_cost_table: Vec<ShippingTier>,

    /// 競品設定
    pub competitor_settings: CompetitorSettings,

    /// Marketplace 價格相對 Storefront 的最低溢價（0.04 = 4%）
    #[serde(default = "default_marketplace_premium")]
    pub marketplace_premium: Decimal,
}

fn default_marketplace_premium() -> Decimal {
    Decimal::new(4, 2)
}

impl Default for PricingConfig {
    /// 首次執行時的預設配置
    fn default() -> Self {
        Self {
            default_margin: Decimal::new(75, 2),
            default_tax_rate: Decimal::new(21, 2),
            default_shipping_cost: Some(Decimal::new(418, 2)),
            shipping_cost_table: vec![
                ShippingTier::new(Decimal::from(1), Decimal::new(418, 2)),
                ShippingTier::new(Decimal::from(2), Decimal::new(457, 2)),
                ShippingTier::new(Decimal::from(5), Decimal::new(541, 2)),
                ShippingTier::new(Decimal::from(10), Decimal::new(679, 2)),
                ShippingTier::new(Decimal::from(15), Decimal::new(801, 2)),
                ShippingTier::new(Decimal::from(20), Decimal::new(925, 2)),
            ],
            competitor_settings: CompetitorSettings::default(),
            marketplace_premium: default_marketplace_premium(),
        }
    }
}

impl PricingConfig {
    /// 創建新的定價配置（無運費級距）
    pub fn new(default_margin: Decimal, default_tax_rate: Decimal) -> Self {
        Self {
            default_margin,
            default_tax_rate,
            default_shipping_cost: None,
            shipping_cost_table: Vec::new(),
            competitor_settings: CompetitorSettings::default(),
            marketplace_premium: default_marketplace_premium(),
        }
    }

    /// 從 JSON 載入並驗證配置
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| PricingError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// 序列化為 JSON
    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| PricingError::InvalidConfig(e.to_string()))
    }

    /// 建構器模式：設置預設運費
    pub fn with_default_shipping_cost(mut self, cost: Decimal) -> Self {
        self.default_shipping_cost = Some(cost);
        self
    }

    /// 建構器模式：清除預設運費
    pub fn without_default_shipping_cost(mut self) -> Self {
        self.default_shipping_cost = None;
        self
    }

    /// 建構器模式：設置運費級距表
    pub fn with_shipping_table(mut self, table: Vec<ShippingTier>) -> Self {
        self.shipping_cost_table = table;
        self
    }

    /// 建構器模式：設置競品設定
    pub fn with_competitor_settings(mut self, settings: CompetitorSettings) -> Self {
        self.competitor_settings = settings;
        self
    }

    /// 建構器模式：設置 Marketplace 溢價
    pub fn with_marketplace_premium(mut self, premium: Decimal) -> Self {
        self.marketplace_premium = premium;
        self
    }

    /// 驗證配置不變量
    pub fn validate(&self) -> Result<()> {
        if self.default_margin <= Decimal::ZERO || self.default_margin > Decimal::ONE {
            return Err(PricingError::InvalidConfig(format!(
                "default_margin 必須在 (0, 1] 之間: {}",
                self.default_margin
            )));
        }

        if self.default_tax_rate < Decimal::ZERO {
            return Err(PricingError::InvalidConfig(format!(
                "default_tax_rate 不可為負: {}",
                self.default_tax_rate
            )));
        }

        if let Some(cost) = self.default_shipping_cost {
            if cost < Decimal::ZERO {
                return Err(PricingError::InvalidConfig(format!(
                    "default_shipping_cost 不可為負: {}",
                    cost
                )));
            }
        }

        if self.marketplace_premium < Decimal::ZERO {
            return Err(PricingError::InvalidConfig(format!(
                "marketplace_premium 不可為負: {}",
                self.marketplace_premium
            )));
        }

        // 級距必須嚴格遞增
        let mut previous: Option<Decimal> = None;
        for tier in &self.shipping_cost_table {
            if tier.max_weight_kg <= Decimal::ZERO {
                return Err(PricingError::InvalidConfig(format!(
                    "運費級距重量必須為正: {}",
                    tier.max_weight_kg
                )));
            }
            if tier.cost < Decimal::ZERO {
                return Err(PricingError::InvalidConfig(format!(
                    "運費級距費用不可為負: {}",
                    tier.cost
                )));
            }
            if let Some(prev) = previous {
                if tier.max_weight_kg <= prev {
                    return Err(PricingError::InvalidConfig(format!(
                        "運費級距必須嚴格遞增: {} 之後為 {}",
                        prev, tier.max_weight_kg
                    )));
                }
            }
            previous = Some(tier.max_weight_kg);
        }

        self.competitor_settings.validate()
    }
}

/// 運費級距
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingTier {
    /// 級距上限重量（含）
    pub max_weight_kg: Decimal,
    /// 運費
    pub cost: Decimal,
}

impl ShippingTier {
    pub fn new(max_weight_kg: Decimal, cost: Decimal) -> Self {
        Self {
            max_weight_kg,
            cost,
        }
    }
}

/// 競品設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitorSettings {
    /// 競品資料有效時間（分鐘），超過視為過期
    pub price_update_frequency_minutes: u32,

    /// 搶 Buy Box 時的降價幅度
    pub min_price_difference: Decimal,

    /// min_price_difference 未設定（<= 0）時使用的降價幅度
    pub fallback_difference: Decimal,
}

impl Default for CompetitorSettings {
    fn default() -> Self {
        Self {
            price_update_frequency_minutes: 60,
            min_price_difference: Decimal::from(2),
            fallback_difference: Decimal::ONE,
        }
    }
}

impl CompetitorSettings {
    /// 實際使用的降價幅度
    pub fn undercut(&self) -> Decimal {
        if self.min_price_difference > Decimal::ZERO {
            self.min_price_difference
        } else {
            self.fallback_difference
        }
    }

    fn validate(&self) -> Result<()> {
        if self.price_update_frequency_minutes == 0 {
            return Err(PricingError::InvalidConfig(
                "price_update_frequency_minutes 必須大於 0".to_string(),
            ));
        }
        if self.min_price_difference < Decimal::ZERO || self.fallback_difference < Decimal::ZERO {
            return Err(PricingError::InvalidConfig(
                "競品降價幅度不可為負".to_string(),
            ));
        }
        Ok(())
    }
}
