//! # Pricing Core
//!
//! 定價引擎核心資料模型、錯誤類型與外部介面

pub mod competitor;
pub mod config;
pub mod history;
pub mod ports;
pub mod profile;
pub mod pvpm;

// Re-export 主要類型
pub use competitor::{sort_offers, CompetitorOffer, CompetitorSnapshot};
pub use config::{CompetitorSettings, PricingConfig, ShippingTier};
pub use history::{Actor, HistoryQuery, PriceChangeReason, PriceChangeRecord};
pub use ports::{
    Channel, Clock, CompetitorDataSource, ConfigStore, PriceHistoryStore, ProductFilter,
    ProductRepository, SystemClock,
};
pub use profile::{ProductPricingProfile, ProfilePatch};
pub use pvpm::{round_money, round_up_money, PvpmResult};

use rust_decimal::Decimal;

/// 定價錯誤類型
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PricingError {
    #[error("無效的成本: {cost}")]
    InvalidCost { cost: Decimal },

    #[error("無效的利潤係數: {margin}（必須 0 < margin <= 1）")]
    InvalidMargin { margin: Decimal },

    #[error("找不到運費級距: 重量 {weight_kg:?} kg，且未設定預設運費")]
    MissingShippingTier { weight_kg: Option<Decimal> },

    #[error("競品資料過期: 已 {age_minutes} 分鐘（上限 {max_minutes} 分鐘）")]
    StaleCompetitorData { age_minutes: i64, max_minutes: u32 },

    #[error("計算溢位: {0}")]
    CalculationOverflow(String),

    #[error("價格低於 PVPM: 價格 {price}，PVPM {pvpm}")]
    PriceFloorViolation { price: Decimal, pvpm: Decimal },

    #[error("無效的固定價格: {0}")]
    InvalidFixedPrice(String),

    #[error("無效的定價配置: {0}")]
    InvalidConfig(String),

    #[error("找不到商品: {0}")]
    ProductNotFound(String),

    #[error("並發修改衝突: 商品 {product_id} 預期版本 {expected}，實際版本 {actual}")]
    ConcurrentModification {
        product_id: String,
        expected: u64,
        actual: u64,
    },

    #[error("儲存錯誤: {0}")]
    Storage(String),
}

pub type Result<T> = std::result::Result<T, PricingError>;
