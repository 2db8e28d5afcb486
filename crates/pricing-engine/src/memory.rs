//! 記憶體實作的外部介面（測試、示例與單機使用）

use chrono::{DateTime, Duration, Utc};
use parking_lot::{Mutex, RwLock};
use pricing_core::{
    Channel, Clock, CompetitorDataSource, CompetitorSnapshot, ConfigStore, HistoryQuery,
    PriceChangeRecord, PriceHistoryStore, PricingConfig, PricingError, ProductFilter,
    ProductPricingProfile, ProductRepository,
};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap, HashSet};

/// 商品資料
#[derive(Debug, Clone, Default)]
pub struct ProductRecord {
    /// ERP 成本
    pub cost: Decimal,
    /// 重量（kg）
    pub weight_kg: Option<Decimal>,
    pub profile: ProductPricingProfile,
    /// 各通路目前售價
    pub prices: HashMap<Channel, Decimal>,
}

impl ProductRecord {
    pub fn new(cost: Decimal, weight_kg: Option<Decimal>) -> Self {
        Self {
            cost,
            weight_kg,
            ..Self::default()
        }
    }

    /// 建構器模式：設置定價設定
    pub fn with_profile(mut self, profile: ProductPricingProfile) -> Self {
        self.profile = profile;
        self
    }

    /// 建構器模式：設置通路售價
    pub fn with_price(mut self, channel: Channel, price: Decimal) -> Self {
        self.prices.insert(channel, price);
        self
    }
}

/// 記憶體商品庫
#[derive(Debug, Default)]
pub struct InMemoryProductRepository {
    products: RwLock<BTreeMap<String, ProductRecord>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 新增或取代商品
    pub fn insert(&self, product_id: &str, record: ProductRecord) {
        self.products.write().insert(product_id.to_string(), record);
    }

    pub fn len(&self) -> usize {
        self.products.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.read().is_empty()
    }

    fn with_product<T>(
        &self,
        product_id: &str,
        f: impl FnOnce(&ProductRecord) -> T,
    ) -> pricing_core::Result<T> {
        self.products
            .read()
            .get(product_id)
            .map(f)
            .ok_or_else(|| PricingError::ProductNotFound(product_id.to_string()))
    }
}

impl ProductRepository for InMemoryProductRepository {
    fn get_cost(&self, product_id: &str) -> pricing_core::Result<Decimal> {
        self.with_product(product_id, |p| p.cost)
    }

    fn get_weight(&self, product_id: &str) -> pricing_core::Result<Option<Decimal>> {
        self.with_product(product_id, |p| p.weight_kg)
    }

    fn get_pricing_profile(&self, product_id: &str) -> pricing_core::Result<ProductPricingProfile> {
        self.with_product(product_id, |p| p.profile.clone())
    }

    fn save_pricing_profile(
        &self,
        product_id: &str,
        profile: &ProductPricingProfile,
    ) -> pricing_core::Result<u64> {
        let mut products = self.products.write();
        let record = products
            .get_mut(product_id)
            .ok_or_else(|| PricingError::ProductNotFound(product_id.to_string()))?;

        if record.profile.version != profile.version {
            return Err(PricingError::ConcurrentModification {
                product_id: product_id.to_string(),
                expected: profile.version,
                actual: record.profile.version,
            });
        }

        let mut stored = profile.clone();
        stored.version = profile.version + 1;
        record.profile = stored;
        Ok(record.profile.version)
    }

    fn get_price(&self, product_id: &str, channel: Channel) -> pricing_core::Result<Option<Decimal>> {
        self.with_product(product_id, |p| p.prices.get(&channel).copied())
    }

    fn set_price(
        &self,
        product_id: &str,
        channel: Channel,
        price: Decimal,
    ) -> pricing_core::Result<()> {
        let mut products = self.products.write();
        let record = products
            .get_mut(product_id)
            .ok_or_else(|| PricingError::ProductNotFound(product_id.to_string()))?;
        record.prices.insert(channel, price);
        Ok(())
    }

    fn list_product_ids(&self, filter: &ProductFilter) -> pricing_core::Result<Vec<String>> {
        let products = self.products.read();
        match &filter.product_ids {
            // 指定 ID 時保留呼叫端順序，不存在的 ID 交給後續處理回報錯誤
            Some(ids) => Ok(ids
                .iter()
                .filter(|id| {
                    products
                        .get(id.as_str())
                        .map_or(true, |p| filter.matches(id, &p.profile))
                })
                .cloned()
                .collect()),
            None => Ok(products
                .iter()
                .filter(|(id, p)| filter.matches(id, &p.profile))
                .map(|(id, _)| id.clone())
                .collect()),
        }
    }
}

/// 記憶體配置儲存
#[derive(Debug, Default)]
pub struct InMemoryConfigStore {
    config: RwLock<PricingConfig>,
}

impl InMemoryConfigStore {
    pub fn new(config: PricingConfig) -> Self {
        Self {
            config: RwLock::new(config),
        }
    }
}

impl ConfigStore for InMemoryConfigStore {
    fn get_pricing_config(&self) -> pricing_core::Result<PricingConfig> {
        Ok(self.config.read().clone())
    }

    fn update_pricing_config(&self, config: PricingConfig) -> pricing_core::Result<()> {
        *self.config.write() = config;
        Ok(())
    }
}

/// 記憶體競品資料來源
#[derive(Debug, Default)]
pub struct InMemoryCompetitorSource {
    snapshots: RwLock<HashMap<String, CompetitorSnapshot>>,
    failing: RwLock<HashSet<String>>,
}

impl InMemoryCompetitorSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, product_id: &str, snapshot: CompetitorSnapshot) {
        self.snapshots.write().insert(product_id.to_string(), snapshot);
    }

    /// 模擬抓取失敗
    pub fn fail_for(&self, product_id: &str) {
        self.failing.write().insert(product_id.to_string());
    }
}

impl CompetitorDataSource for InMemoryCompetitorSource {
    fn fetch_offers(&self, product_id: &str) -> pricing_core::Result<Option<CompetitorSnapshot>> {
        if self.failing.read().contains(product_id) {
            return Err(PricingError::Storage(format!(
                "競品資料抓取失敗: {}",
                product_id
            )));
        }
        Ok(self.snapshots.read().get(product_id).cloned())
    }
}

/// 記憶體價格歷史
#[derive(Debug, Default)]
pub struct InMemoryHistoryStore {
    records: RwLock<Vec<PriceChangeRecord>>,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl PriceHistoryStore for InMemoryHistoryStore {
    fn append(&self, record: &PriceChangeRecord) -> pricing_core::Result<()> {
        self.records.write().push(record.clone());
        Ok(())
    }

    fn query(&self, query: &HistoryQuery) -> pricing_core::Result<Vec<PriceChangeRecord>> {
        Ok(self
            .records
            .read()
            .iter()
            .filter(|r| query.matches(r))
            .cloned()
            .collect())
    }
}

/// 可控制的時鐘
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// 推進時間
    pub fn advance(&self, duration: Duration) {
        let mut now = self.now.lock();
        *now += duration;
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock() = now;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}
