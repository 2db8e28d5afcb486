//! # Pricing Engine
//!
//! 定價引擎：價格歷史、批量重算，以及對外的 `PricingEngine` 入口

pub mod batch;
pub mod engine;
pub mod history;
pub mod memory;

// Re-export 主要類型
pub use batch::{BatchError, BatchResult, BulkOptions};
pub use engine::{reason_for_strategy, PriceUpdate, PricingEngine, ProductEvaluation};
pub use history::PriceHistoryRecorder;
pub use memory::{
    FixedClock, InMemoryCompetitorSource, InMemoryConfigStore, InMemoryHistoryStore,
    InMemoryProductRepository, ProductRecord,
};
