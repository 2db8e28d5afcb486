//! 批量重新計算

use pricing_core::{Actor, PriceChangeReason, PricingConfig, ProductFilter};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::engine::PricingEngine;

/// 批量選項
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkOptions {
    /// 是否決定並發布新價格（否則只重算 PVPM）
    pub update_prices: bool,
    /// 是否並行處理
    pub parallel: bool,
    /// 歷史紀錄的操作者
    pub actor: Actor,
    /// 歷史紀錄的變更原因
    pub reason: PriceChangeReason,
}

impl Default for BulkOptions {
    fn default() -> Self {
        Self {
            update_prices: false,
            parallel: true,
            actor: Actor::System,
            reason: PriceChangeReason::BulkUpdate,
        }
    }
}

impl BulkOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// 建構器模式：發布價格
    pub fn with_update_prices(mut self, update_prices: bool) -> Self {
        self.update_prices = update_prices;
        self
    }

    /// 建構器模式：是否並行
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_actor(mut self, actor: Actor) -> Self {
        self.actor = actor;
        self
    }

    /// 建構器模式：變更原因（排程重算用 `PvpmRecalculation`）
    pub fn with_reason(mut self, reason: PriceChangeReason) -> Self {
        self.reason = reason;
        self
    }
}

/// 單一商品失敗
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchError {
    pub product_id: String,
    pub message: String,
}

/// 批量結果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    pub successful: usize,
    pub failed: usize,
    /// 實際發布的價格變更數
    pub price_updates_queued: usize,
    /// 依輸入順序排列
    pub errors: Vec<BatchError>,
    /// 計算耗時（毫秒）
    pub duration_ms: Option<u128>,
}

impl BatchResult {
    pub fn total(&self) -> usize {
        self.successful + self.failed
    }

    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

/// 單一商品處理結果
enum ItemOutcome {
    Done { published: bool },
    Failed(BatchError),
}

/// 批量處理器
///
/// 整批共用同一份配置快照；單一商品失敗只記錄，不中斷批次。
pub(crate) struct BulkRecalculator<'a> {
    engine: &'a PricingEngine,
}

impl<'a> BulkRecalculator<'a> {
    pub(crate) fn new(engine: &'a PricingEngine) -> Self {
        Self { engine }
    }

    pub(crate) fn run(
        &self,
        filter: &ProductFilter,
        options: &BulkOptions,
    ) -> pricing_core::Result<BatchResult> {
        let start_time = std::time::Instant::now();
        let config = self.engine.configs().get_pricing_config()?;
        let ids = self.engine.products().list_product_ids(filter)?;

        tracing::info!(
            "開始批量重算：商品 {} 筆，發布價格 {}",
            ids.len(),
            options.update_prices
        );

        let outcomes: Vec<ItemOutcome> = if options.parallel {
            ids.par_iter()
                .map(|id| self.process(&config, id, options))
                .collect()
        } else {
            ids.iter()
                .map(|id| self.process(&config, id, options))
                .collect()
        };

        let mut result = BatchResult::default();
        for outcome in outcomes {
            match outcome {
                ItemOutcome::Done { published } => {
                    result.successful += 1;
                    if published {
                        result.price_updates_queued += 1;
                    }
                }
                ItemOutcome::Failed(error) => {
                    result.failed += 1;
                    result.errors.push(error);
                }
            }
        }
        result.duration_ms = Some(start_time.elapsed().as_millis());

        tracing::info!(
            "批量重算完成：成功 {}，失敗 {}，價格更新 {}，耗時 {:?}",
            result.successful,
            result.failed,
            result.price_updates_queued,
            start_time.elapsed()
        );

        Ok(result)
    }

    fn process(&self, config: &PricingConfig, product_id: &str, options: &BulkOptions) -> ItemOutcome {
        match self.try_process(config, product_id, options) {
            Ok(published) => ItemOutcome::Done { published },
            Err(e) => {
                tracing::warn!("商品 {} 重算失敗: {}", product_id, e);
                ItemOutcome::Failed(BatchError {
                    product_id: product_id.to_string(),
                    message: e.to_string(),
                })
            }
        }
    }

    fn try_process(
        &self,
        config: &PricingConfig,
        product_id: &str,
        options: &BulkOptions,
    ) -> pricing_core::Result<bool> {
        if !options.update_prices {
            let pvpm = self.engine.calculate_pvpm_with(config, product_id)?;
            tracing::debug!("商品 {} PVPM = {}", product_id, pvpm.pvpm);
            return Ok(false);
        }

        let evaluation = self.engine.evaluate(config, product_id)?;
        let update = self.engine.publish(
            product_id,
            evaluation.resolution,
            options.reason,
            options.actor.clone(),
        )?;
        Ok(update.published)
    }
}
