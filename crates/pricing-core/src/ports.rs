//! 外部協作者介面
//!
//! 引擎本身不做 I/O，商品資料、配置、競品抓取與歷史儲存都經由這些 trait。
//! 所有 trait 要求 `Send + Sync`，批量處理會跨執行緒共用。

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{
    CompetitorSnapshot, HistoryQuery, PriceChangeRecord, PricingConfig, ProductPricingProfile,
    Result,
};

/// 銷售通路
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    /// 平台（有 Buy Box 競爭）
    Marketplace,
    /// 自營網店
    Storefront,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Marketplace => f.write_str("marketplace"),
            Self::Storefront => f.write_str("storefront"),
        }
    }
}

/// 批量處理的商品過濾條件
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductFilter {
    /// 指定商品（None = 全部）
    pub product_ids: Option<Vec<String>>,
    /// 只處理啟用自動調價的商品
    pub auto_update_only: bool,
}

impl ProductFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn ids(product_ids: Vec<String>) -> Self {
        Self {
            product_ids: Some(product_ids),
            auto_update_only: false,
        }
    }

    /// 建構器模式：只處理自動調價商品
    pub fn auto_update_only(mut self) -> Self {
        self.auto_update_only = true;
        self
    }

    /// 檢查商品是否符合條件
    pub fn matches(&self, product_id: &str, profile: &ProductPricingProfile) -> bool {
        if let Some(ids) = &self.product_ids {
            if !ids.iter().any(|id| id == product_id) {
                return false;
            }
        }
        !self.auto_update_only || profile.auto_update_enabled
    }
}

/// 商品資料來源
pub trait ProductRepository: Send + Sync {
    /// ERP 成本
    fn get_cost(&self, product_id: &str) -> Result<Decimal>;

    /// 重量（kg），未知時為 None
    fn get_weight(&self, product_id: &str) -> Result<Option<Decimal>>;

    fn get_pricing_profile(&self, product_id: &str) -> Result<ProductPricingProfile>;

    /// 寫入定價設定
    ///
    /// `profile.version` 必須等於目前儲存的版本，否則回傳
    /// `PricingError::ConcurrentModification`。成功時回傳新版本號。
    fn save_pricing_profile(&self, product_id: &str, profile: &ProductPricingProfile)
        -> Result<u64>;

    /// 目前發布的價格
    fn get_price(&self, product_id: &str, channel: Channel) -> Result<Option<Decimal>>;

    fn set_price(&self, product_id: &str, channel: Channel, price: Decimal) -> Result<()>;

    /// 列出符合條件的商品 ID
    fn list_product_ids(&self, filter: &ProductFilter) -> Result<Vec<String>>;
}

/// 定價配置儲存
pub trait ConfigStore: Send + Sync {
    fn get_pricing_config(&self) -> Result<PricingConfig>;

    fn update_pricing_config(&self, config: PricingConfig) -> Result<()>;
}

/// 競品資料來源
pub trait CompetitorDataSource: Send + Sync {
    /// 抓取競品報價；None 表示沒有資料
    fn fetch_offers(&self, product_id: &str) -> Result<Option<CompetitorSnapshot>>;
}

/// 價格歷史儲存（只能追加）
pub trait PriceHistoryStore: Send + Sync {
    fn append(&self, record: &PriceChangeRecord) -> Result<()>;

    fn query(&self, query: &HistoryQuery) -> Result<Vec<PriceChangeRecord>>;
}

/// 時鐘
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// 系統時鐘
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_matches() {
        let manual = ProductPricingProfile::new();
        let auto = ProductPricingProfile::new().with_auto_update(true);

        assert!(ProductFilter::all().matches("A", &manual));
        assert!(!ProductFilter::all().auto_update_only().matches("A", &manual));
        assert!(ProductFilter::all().auto_update_only().matches("A", &auto));

        let filter = ProductFilter::ids(vec!["A".to_string(), "B".to_string()]);
        assert!(filter.matches("B", &manual));
        assert!(!filter.matches("C", &manual));
    }

    #[test]
    fn test_channel_display() {
        assert_eq!(Channel::Marketplace.to_string(), "marketplace");
        assert_eq!(Channel::Storefront.to_string(), "storefront");
    }
}
