//! 競品跟價示例

use chrono::Duration;
use pricing_core::{
    Actor, Channel, Clock, CompetitorOffer, CompetitorSnapshot, HistoryQuery, PricingConfig,
    ProductPricingProfile,
};
use pricing_engine::{
    FixedClock, InMemoryCompetitorSource, InMemoryConfigStore, InMemoryHistoryStore,
    InMemoryProductRepository, PricingEngine, ProductRecord,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    println!("=== 競品跟價示例 ===\n");

    let clock = Arc::new(FixedClock::new(chrono::Utc::now()));
    let products = Arc::new(InMemoryProductRepository::new());
    let competitors = Arc::new(InMemoryCompetitorSource::new());

    products.insert(
        "LAMP-7",
        ProductRecord::new(dec!(10), Some(dec!(1)))
            .with_profile(ProductPricingProfile::new().with_auto_update(true))
            .with_price(Channel::Storefront, dec!(21.00)),
    );

    let engine = PricingEngine::new(
        products,
        Arc::new(InMemoryConfigStore::new(PricingConfig::default())),
        competitors.clone(),
        Arc::new(InMemoryHistoryStore::new()),
        clock.clone(),
    );

    // 競品價格逐步下降
    for (round, lowest) in [dec!(30), dec!(25), dec!(21.50), dec!(19)].into_iter().enumerate() {
        clock.advance(Duration::minutes(30));
        competitors.insert("LAMP-7", snapshot(lowest, &*clock));

        let update = engine.apply_resolved_price("LAMP-7", Actor::System)?;
        println!(
            "🔎 第 {} 輪: 最低競品 {} → 售價 {} ({})",
            round + 1,
            lowest,
            update.resolution.resolved_price,
            update.resolution.strategy_used
        );
        for flag in &update.resolution.flags {
            println!("   ⚠ {}", flag);
        }
    }

    // 資料過期後回到 PVPM
    clock.advance(Duration::minutes(90));
    let resolution = engine.resolve_price("LAMP-7")?;
    println!(
        "\n⏱ 資料過期: 售價 {} ({})，旗標 {:?}",
        resolution.resolved_price,
        resolution.strategy_used,
        resolution.flag_names()
    );

    println!("\n📜 價格歷史:");
    for record in engine.get_price_history(&HistoryQuery::for_product("LAMP-7"))? {
        println!(
            "   {} {:?} → {} ({})",
            record.changed_at.format("%H:%M"),
            record.previous_price,
            record.new_price,
            record.reason
        );
    }

    Ok(())
}

fn snapshot(lowest: Decimal, clock: &dyn Clock) -> CompetitorSnapshot {
    CompetitorSnapshot::new(
        vec![
            CompetitorOffer::new("S-1", "Lumos", lowest).with_buy_box(true),
            CompetitorOffer::new("S-2", "Brightly", lowest + dec!(1.50)).with_fba(true),
        ],
        clock.now(),
    )
}
