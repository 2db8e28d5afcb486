//! 價格變更歷史模型

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::ports::Channel;

/// 價格變更原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceChangeReason {
    /// 人工修改（含固定價格）
    Manual,
    /// PVPM 變動
    PvpmChange,
    /// 排程重算 PVPM 後發布（`BulkOptions::with_reason`）
    PvpmRecalculation,
    /// 跟隨競品
    CompetitorMatch,
    /// 其他系統作業（`BulkOptions::with_reason`）
    System,
    /// 批量更新
    BulkUpdate,
}

impl PriceChangeReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::PvpmChange => "pvpm_change",
            Self::PvpmRecalculation => "pvpm_recalculation",
            Self::CompetitorMatch => "competitor_match",
            Self::System => "system",
            Self::BulkUpdate => "bulk_update",
        }
    }
}

impl fmt::Display for PriceChangeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 變更執行者
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Actor {
    System,
    User(String),
}

impl Actor {
    pub fn user(user_id: &str) -> Self {
        Self::User(user_id.to_string())
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::System => f.write_str("system"),
            Self::User(id) => f.write_str(id),
        }
    }
}

/// 價格變更紀錄（寫入後不可修改）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceChangeRecord {
    pub id: Uuid,
    pub product_id: String,
    pub channel: Channel,
    /// 變更前價格（首次發布時為 None）
    pub previous_price: Option<Decimal>,
    pub new_price: Decimal,
    pub reason: PriceChangeReason,
    pub changed_by: Actor,
    pub changed_at: DateTime<Utc>,
}

impl PriceChangeRecord {
    /// 創建新的變更紀錄
    pub fn new(
        product_id: &str,
        channel: Channel,
        previous_price: Option<Decimal>,
        new_price: Decimal,
        reason: PriceChangeReason,
        changed_by: Actor,
        changed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            product_id: product_id.to_string(),
            channel,
            previous_price,
            new_price,
            reason,
            changed_by,
            changed_at,
        }
    }

    /// 價格差額（無前值時為新價格）
    pub fn delta(&self) -> Decimal {
        self.new_price - self.previous_price.unwrap_or(Decimal::ZERO)
    }
}

/// 歷史查詢條件
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryQuery {
    /// 指定商品（None = 全部）
    pub product_id: Option<String>,
    /// 起始時間（含）
    pub from: Option<DateTime<Utc>>,
    /// 結束時間（不含）
    pub to: Option<DateTime<Utc>>,
    /// 原因過濾（空 = 全部）
    pub reasons: Vec<PriceChangeReason>,
}

impl HistoryQuery {
    /// 查詢全部
    pub fn all() -> Self {
        Self::default()
    }

    /// 查詢單一商品
    pub fn for_product(product_id: &str) -> Self {
        Self {
            product_id: Some(product_id.to_string()),
            ..Self::default()
        }
    }

    /// 建構器模式：設置時間範圍
    pub fn between(mut self, from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        self.from = Some(from);
        self.to = Some(to);
        self
    }

    /// 建構器模式：設置原因過濾
    pub fn with_reasons(mut self, reasons: Vec<PriceChangeReason>) -> Self {
        self.reasons = reasons;
        self
    }

    /// 檢查紀錄是否符合條件
    pub fn matches(&self, record: &PriceChangeRecord) -> bool {
        if let Some(product_id) = &self.product_id {
            if &record.product_id != product_id {
                return false;
            }
        }
        if let Some(from) = self.from {
            if record.changed_at < from {
                return false;
            }
        }
        if let Some(to) = self.to {
            if record.changed_at >= to {
                return false;
            }
        }
        self.reasons.is_empty() || self.reasons.contains(&record.reason)
    }
}
