//! 批量重新計算示例

use chrono::Utc;
use pricing_core::{HistoryQuery, PricingConfig, ProductFilter, ProductPricingProfile};
use pricing_engine::{
    BulkOptions, FixedClock, InMemoryCompetitorSource, InMemoryConfigStore, InMemoryHistoryStore,
    InMemoryProductRepository, PricingEngine, ProductRecord,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    println!("=== 批量重新計算示例 ===\n");

    let products = Arc::new(InMemoryProductRepository::new());
    for i in 0..1_000u32 {
        let weight = Decimal::from(i % 25) + dec!(0.5);
        let mut record = ProductRecord::new(Decimal::from(3 + i % 50), Some(weight));
        // 少數商品帶有錯誤的利潤係數
        if i % 250 == 0 {
            record = record.with_profile(ProductPricingProfile::new().with_custom_margin(dec!(0)));
        }
        products.insert(&format!("SKU-{:04}", i), record);
    }
    println!("📦 商品數量: {}\n", products.len());

    let engine = PricingEngine::new(
        products,
        Arc::new(InMemoryConfigStore::new(PricingConfig::default())),
        Arc::new(InMemoryCompetitorSource::new()),
        Arc::new(InMemoryHistoryStore::new()),
        Arc::new(FixedClock::new(Utc::now())),
    );

    println!("🔁 步驟 1: 只重算 PVPM");
    let result = engine.run_bulk_recalculation(&ProductFilter::all(), &BulkOptions::new())?;
    println!(
        "   成功 {}，失敗 {}，耗時 {:?} ms\n",
        result.successful, result.failed, result.duration_ms
    );

    println!("💰 步驟 2: 重算並發布價格");
    let result = engine.run_bulk_recalculation(
        &ProductFilter::all(),
        &BulkOptions::new().with_update_prices(true),
    )?;
    println!(
        "   成功 {}，失敗 {}，價格更新 {}",
        result.successful, result.failed, result.price_updates_queued
    );
    for error in &result.errors {
        println!("   ✗ {}: {}", error.product_id, error.message);
    }

    let history = engine.get_price_history(&HistoryQuery::all())?;
    println!("\n📜 歷史紀錄: {} 筆", history.len());

    Ok(())
}
