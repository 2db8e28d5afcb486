//! 價格變更歷史紀錄器

use pricing_core::{
    Actor, Channel, Clock, HistoryQuery, PriceChangeReason, PriceChangeRecord, PriceHistoryStore,
};
use rust_decimal::Decimal;
use std::sync::Arc;

/// 價格歷史紀錄器（只追加，不修改、不刪除）
#[derive(Clone)]
pub struct PriceHistoryRecorder {
    store: Arc<dyn PriceHistoryStore>,
    clock: Arc<dyn Clock>,
}

impl PriceHistoryRecorder {
    pub fn new(store: Arc<dyn PriceHistoryStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// 追加一筆變更紀錄
    ///
    /// 新舊價格相同時不寫入並回傳 None，避免重算產生雜訊。
    pub fn record(
        &self,
        product_id: &str,
        channel: Channel,
        previous_price: Option<Decimal>,
        new_price: Decimal,
        reason: PriceChangeReason,
        changed_by: Actor,
    ) -> pricing_core::Result<Option<PriceChangeRecord>> {
        if previous_price == Some(new_price) {
            tracing::debug!("商品 {} 價格未變 ({})，不寫入歷史", product_id, new_price);
            return Ok(None);
        }

        let record = PriceChangeRecord::new(
            product_id,
            channel,
            previous_price,
            new_price,
            reason,
            changed_by,
            self.clock.now(),
        );
        self.store.append(&record)?;

        tracing::info!(
            "價格變更: {} [{}] {:?} → {} ({}, {})",
            product_id,
            channel,
            previous_price,
            new_price,
            reason,
            record.changed_by
        );

        Ok(Some(record))
    }

    /// 查詢歷史（依時間遞增）
    pub fn query(&self, query: &HistoryQuery) -> pricing_core::Result<Vec<PriceChangeRecord>> {
        let mut records = self.store.query(query)?;
        records.sort_by_key(|r| r.changed_at);
        Ok(records)
    }
}
