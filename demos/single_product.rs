//! 單一商品定價示例

use chrono::Utc;
use pricing_core::{Actor, Channel, PricingConfig, ProductPricingProfile, ProductRepository};
use pricing_engine::{
    FixedClock, InMemoryCompetitorSource, InMemoryConfigStore, InMemoryHistoryStore,
    InMemoryProductRepository, PricingEngine, ProductRecord,
};
use rust_decimal_macros::dec;
use std::sync::Arc;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    println!("=== 單一商品定價示例 ===\n");

    let products = Arc::new(InMemoryProductRepository::new());
    products.insert(
        "MUG-001",
        ProductRecord::new(dec!(10), Some(dec!(1)))
            .with_price(Channel::Storefront, dec!(19.50)),
    );

    let engine = PricingEngine::new(
        products.clone(),
        Arc::new(InMemoryConfigStore::new(PricingConfig::default())),
        Arc::new(InMemoryCompetitorSource::new()),
        Arc::new(InMemoryHistoryStore::new()),
        Arc::new(FixedClock::new(Utc::now())),
    );

    println!("📦 步驟 1: 計算 PVPM");
    let pvpm = engine.calculate_pvpm("MUG-001")?.rounded();
    println!("   成本: {}", pvpm.cost);
    println!("   基礎價格: {} (係數 {})", pvpm.base_price, pvpm.margin);
    println!("   含稅價格: {} (稅率 {})", pvpm.price_with_tax, pvpm.tax_rate);
    println!("   運費: {}", pvpm.shipping_cost);
    println!("   ✓ PVPM: {}\n", pvpm.pvpm);

    println!("💰 步驟 2: 發布 Marketplace 售價");
    let update = engine.apply_resolved_price("MUG-001", Actor::System)?;
    println!(
        "   {:?} → {} ({})",
        update.previous_price, update.resolution.resolved_price, update.resolution.strategy_used
    );
    for flag in &update.resolution.flags {
        println!("   ⚠ {}", flag);
    }
    println!();

    println!("🏷 步驟 3: 設定固定價格");
    let update = engine.set_fixed_price("MUG-001", Some(dec!(24.90)), "launch", Actor::user("ana"))?;
    println!(
        "   ✓ {} ({})",
        update.resolution.resolved_price, update.resolution.strategy_used
    );
    let profile: ProductPricingProfile = products.get_pricing_profile("MUG-001")?;
    println!("   設定版本: {}", profile.version);

    Ok(())
}
