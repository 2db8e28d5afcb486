//! # Pricing Calculation Engine
//!
//! 核心定價計算：成本解析、運費、PVPM、競品分析與價格決策

pub mod competitor;
pub mod cost_resolver;
pub mod pvpm;
pub mod resolution;
pub mod shipping;

use serde::{Deserialize, Serialize};
use std::fmt;

// Re-export 主要類型
pub use competitor::{CompetitorAnalysis, CompetitorAnalyzer};
pub use cost_resolver::{CostResolver, ResolvedCost};
pub use pvpm::PvpmCalculator;
pub use resolution::{PriceResolution, PriceResolver, PricingStrategy, ResolutionInput};
pub use shipping::{ShippingCalculator, ShippingSource};

/// 價格決策旗標
///
/// 旗標不是錯誤：結果仍然有效，由呼叫端決定是否需要人工介入。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceFlag {
    /// Marketplace 價格未高於 Storefront 4%
    ChannelConsistencyViolation,
    /// 競品價格無法同時搶 Buy Box 與符合跨通路規則，需人工判斷
    #[serde(rename = "buybox_channel_conflict")]
    BuyBoxChannelConflict,
    /// 最低競品價不高於 PVPM
    #[serde(rename = "buybox_unreachable")]
    BuyBoxUnreachable,
    /// 競品資料過期，視為無資料
    StaleCompetitorData,
    /// 競品資料來源失敗，視為無資料
    CompetitorDataUnavailable,
    /// 固定價格低於 PVPM（僅提示）
    FixedBelowPvpm,
}

impl PriceFlag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ChannelConsistencyViolation => "channel_consistency_violation",
            Self::BuyBoxChannelConflict => "buybox_channel_conflict",
            Self::BuyBoxUnreachable => "buybox_unreachable",
            Self::StaleCompetitorData => "stale_competitor_data",
            Self::CompetitorDataUnavailable => "competitor_data_unavailable",
            Self::FixedBelowPvpm => "fixed_below_pvpm",
        }
    }
}

impl fmt::Display for PriceFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
