//! 定價引擎主入口

use pricing_calc::{
    CompetitorAnalysis, CompetitorAnalyzer, PriceFlag, PriceResolution, PriceResolver,
    PricingStrategy, PvpmCalculator, ResolutionInput,
};
use pricing_core::{
    Actor, Channel, Clock, CompetitorDataSource, ConfigStore, HistoryQuery, PriceChangeReason,
    PriceChangeRecord, PriceHistoryStore, PricingConfig, PricingError, ProductFilter,
    ProductPricingProfile, ProductRepository, ProfilePatch, PvpmResult,
};
use rust_decimal::Decimal;
use std::sync::Arc;

use crate::batch::{BatchResult, BulkOptions, BulkRecalculator};
use crate::history::PriceHistoryRecorder;

/// 單一商品的完整評估結果
#[derive(Debug, Clone, PartialEq)]
pub struct ProductEvaluation {
    pub product_id: String,
    pub pvpm: PvpmResult,
    pub resolution: PriceResolution,
    pub competitor: Option<CompetitorAnalysis>,
}

/// 價格套用結果
#[derive(Debug, Clone, PartialEq)]
pub struct PriceUpdate {
    pub product_id: String,
    pub resolution: PriceResolution,
    pub previous_price: Option<Decimal>,
    /// 是否實際發布了新價格
    pub published: bool,
    pub record: Option<PriceChangeRecord>,
}

/// 定價引擎
///
/// 所有計算都使用呼叫當下讀取的配置快照。
#[derive(Clone)]
pub struct PricingEngine {
    products: Arc<dyn ProductRepository>,
    configs: Arc<dyn ConfigStore>,
    competitors: Arc<dyn CompetitorDataSource>,
    recorder: PriceHistoryRecorder,
    clock: Arc<dyn Clock>,
}

impl PricingEngine {
    /// 創建新的定價引擎
    pub fn new(
        products: Arc<dyn ProductRepository>,
        configs: Arc<dyn ConfigStore>,
        competitors: Arc<dyn CompetitorDataSource>,
        history: Arc<dyn PriceHistoryStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            products,
            configs,
            competitors,
            recorder: PriceHistoryRecorder::new(history, clock.clone()),
            clock,
        }
    }

    /// 計算 PVPM
    pub fn calculate_pvpm(&self, product_id: &str) -> pricing_core::Result<PvpmResult> {
        let config = self.configs.get_pricing_config()?;
        self.calculate_pvpm_with(&config, product_id)
    }

    /// 決定 Marketplace 售價（不發布）
    pub fn resolve_price(&self, product_id: &str) -> pricing_core::Result<PriceResolution> {
        let config = self.configs.get_pricing_config()?;
        Ok(self.evaluate(&config, product_id)?.resolution)
    }

    /// 完整評估（PVPM、競品分析、價格決策）
    pub fn evaluate_product(&self, product_id: &str) -> pricing_core::Result<ProductEvaluation> {
        let config = self.configs.get_pricing_config()?;
        self.evaluate(&config, product_id)
    }

    /// 決定並發布 Marketplace 售價，價格有變時寫入歷史
    pub fn apply_resolved_price(
        &self,
        product_id: &str,
        actor: Actor,
    ) -> pricing_core::Result<PriceUpdate> {
        let config = self.configs.get_pricing_config()?;
        let evaluation = self.evaluate(&config, product_id)?;
        let reason = reason_for_strategy(evaluation.resolution.strategy_used);
        self.publish(product_id, evaluation.resolution, reason, actor)
    }

    /// 設置或清除固定價格，並重新發布售價
    pub fn set_fixed_price(
        &self,
        product_id: &str,
        price: Option<Decimal>,
        reason: &str,
        actor: Actor,
    ) -> pricing_core::Result<PriceUpdate> {
        let config = self.configs.get_pricing_config()?;
        let mut profile = self.products.get_pricing_profile(product_id)?;
        profile.set_fixed_price(price, reason)?;

        // 先以新設定完成決策，失敗時不寫入任何狀態
        let evaluation = self.evaluate_with_profile(&config, product_id, &profile)?;
        self.products.save_pricing_profile(product_id, &profile)?;

        tracing::info!(
            "商品 {} 固定價格設為 {:?}（{}，{}）",
            product_id,
            price,
            reason,
            actor
        );

        let reason = reason_for_strategy(evaluation.resolution.strategy_used);
        self.publish(product_id, evaluation.resolution, reason, actor)
    }

    /// 部分更新定價設定（樂觀鎖）
    pub fn update_product_pricing_profile(
        &self,
        product_id: &str,
        patch: &ProfilePatch,
    ) -> pricing_core::Result<ProductPricingProfile> {
        let mut profile = self.products.get_pricing_profile(product_id)?;
        profile.apply_patch(patch)?;

        // 新的利潤係數必須可用
        if let Some(margin) = profile.custom_margin {
            if margin <= Decimal::ZERO || margin > Decimal::ONE {
                return Err(PricingError::InvalidMargin { margin });
            }
        }

        let version = self.products.save_pricing_profile(product_id, &profile)?;
        profile.version = version;
        tracing::debug!("商品 {} 定價設定已更新，版本 {}", product_id, version);
        Ok(profile)
    }

    /// 批量重新計算
    pub fn run_bulk_recalculation(
        &self,
        filter: &ProductFilter,
        options: &BulkOptions,
    ) -> pricing_core::Result<BatchResult> {
        BulkRecalculator::new(self).run(filter, options)
    }

    /// 查詢價格歷史
    pub fn get_price_history(
        &self,
        query: &HistoryQuery,
    ) -> pricing_core::Result<Vec<PriceChangeRecord>> {
        self.recorder.query(query)
    }

    pub fn get_pricing_config(&self) -> pricing_core::Result<PricingConfig> {
        self.configs.get_pricing_config()
    }

    /// 整體替換定價配置（先驗證）
    pub fn update_pricing_config(&self, config: PricingConfig) -> pricing_core::Result<()> {
        config.validate()?;
        self.configs.update_pricing_config(config)?;
        tracing::info!("定價配置已更新");
        Ok(())
    }

    pub(crate) fn products(&self) -> &dyn ProductRepository {
        self.products.as_ref()
    }

    pub(crate) fn configs(&self) -> &dyn ConfigStore {
        self.configs.as_ref()
    }

    pub(crate) fn calculate_pvpm_with(
        &self,
        config: &PricingConfig,
        product_id: &str,
    ) -> pricing_core::Result<PvpmResult> {
        let cost = self.products.get_cost(product_id)?;
        let weight = self.products.get_weight(product_id)?;
        let profile = self.products.get_pricing_profile(product_id)?;
        PvpmCalculator::calculate(cost, weight, &profile, config)
    }

    /// 以指定配置快照評估商品
    pub(crate) fn evaluate(
        &self,
        config: &PricingConfig,
        product_id: &str,
    ) -> pricing_core::Result<ProductEvaluation> {
        let profile = self.products.get_pricing_profile(product_id)?;
        self.evaluate_with_profile(config, product_id, &profile)
    }

    /// 以指定配置與定價設定評估商品（不讀取已儲存的設定）
    fn evaluate_with_profile(
        &self,
        config: &PricingConfig,
        product_id: &str,
        profile: &ProductPricingProfile,
    ) -> pricing_core::Result<ProductEvaluation> {
        let cost = self.products.get_cost(product_id)?;
        let weight = self.products.get_weight(product_id)?;
        let pvpm = PvpmCalculator::calculate(cost, weight, profile, config)?;
        // 發布價格以分為單位，下限向上取整，不會低於 PVPM
        let floor = pvpm.price_floor();

        let own_price = self.products.get_price(product_id, Channel::Marketplace)?;
        let storefront_price = self.products.get_price(product_id, Channel::Storefront)?;

        let (competitor, competitor_flag) =
            self.analyze_competitors(config, product_id, own_price, floor);

        let mut resolution = PriceResolver::resolve(
            &ResolutionInput {
                pvpm: floor,
                profile,
                competitor: competitor.as_ref(),
                storefront_price,
            },
            config,
        )?;
        if let Some(flag) = competitor_flag {
            resolution.flags.push(flag);
        }

        if !resolution.flags.is_empty() {
            tracing::warn!(
                "商品 {} 價格決策旗標: {:?}",
                product_id,
                resolution.flag_names()
            );
        }

        Ok(ProductEvaluation {
            product_id: product_id.to_string(),
            pvpm,
            resolution,
            competitor,
        })
    }

    /// 發布價格並寫入歷史
    pub(crate) fn publish(
        &self,
        product_id: &str,
        resolution: PriceResolution,
        reason: PriceChangeReason,
        actor: Actor,
    ) -> pricing_core::Result<PriceUpdate> {
        let previous_price = self.products.get_price(product_id, Channel::Marketplace)?;
        let new_price = resolution.resolved_price;

        if previous_price == Some(new_price) {
            return Ok(PriceUpdate {
                product_id: product_id.to_string(),
                resolution,
                previous_price,
                published: false,
                record: None,
            });
        }

        self.products
            .set_price(product_id, Channel::Marketplace, new_price)?;
        let record = self.recorder.record(
            product_id,
            Channel::Marketplace,
            previous_price,
            new_price,
            reason,
            actor,
        )?;

        Ok(PriceUpdate {
            product_id: product_id.to_string(),
            resolution,
            previous_price,
            published: true,
            record,
        })
    }

    /// 抓取並分析競品資料
    ///
    /// 無資料、資料過期或來源失敗都視為「沒有競品資料」，不會阻擋決策。
    fn analyze_competitors(
        &self,
        config: &PricingConfig,
        product_id: &str,
        own_price: Option<Decimal>,
        pvpm: Decimal,
    ) -> (Option<CompetitorAnalysis>, Option<PriceFlag>) {
        let snapshot = match self.competitors.fetch_offers(product_id) {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => return (None, None),
            Err(e) => {
                tracing::warn!("商品 {} 競品資料不可用: {}", product_id, e);
                return (None, Some(PriceFlag::CompetitorDataUnavailable));
            }
        };

        let settings = &config.competitor_settings;
        let age_minutes = snapshot.age_minutes(self.clock.now());
        if age_minutes > i64::from(settings.price_update_frequency_minutes) {
            let stale = PricingError::StaleCompetitorData {
                age_minutes,
                max_minutes: settings.price_update_frequency_minutes,
            };
            tracing::warn!("商品 {}: {}", product_id, stale);
            return (None, Some(PriceFlag::StaleCompetitorData));
        }

        let analysis =
            CompetitorAnalyzer::analyze(own_price, &snapshot.offers, pvpm, settings.undercut());
        (Some(analysis), None)
    }
}

/// 策略對應的歷史原因
pub fn reason_for_strategy(strategy: PricingStrategy) -> PriceChangeReason {
    match strategy {
        PricingStrategy::Fixed => PriceChangeReason::Manual,
        PricingStrategy::Competitive => PriceChangeReason::CompetitorMatch,
        PricingStrategy::Pvpm => PriceChangeReason::PvpmChange,
    }
}
