//! # PVPM
//!
//! 多通路商品定價決策引擎
//!
//! - [`pricing_core`]：資料模型、配置、錯誤與外部介面
//! - [`pricing_calc`]：PVPM、運費、競品分析與價格決策
//! - [`pricing_engine`]：價格歷史、批量重算與 `PricingEngine` 入口

pub use pricing_calc;
pub use pricing_core;
pub use pricing_engine;

pub use pricing_calc::{PriceFlag, PriceResolution, PricingStrategy};
pub use pricing_core::{PricingConfig, PricingError, Result};
pub use pricing_engine::{BatchResult, BulkOptions, PricingEngine};
