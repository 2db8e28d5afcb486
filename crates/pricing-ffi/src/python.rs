//! Python 綁定實現

use pricing_calc::{CompetitorAnalyzer, PriceResolver, PvpmCalculator, ResolutionInput};
use pricing_core::{
    CompetitorOffer, PricingConfig, PricingError, ProductPricingProfile, PvpmResult,
};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyDict;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

fn to_py_err(e: PricingError) -> PyErr {
    PyValueError::new_err(e.to_string())
}

fn to_decimal(value: f64, field: &str) -> PyResult<Decimal> {
    Decimal::from_f64(value)
        .ok_or_else(|| PyValueError::new_err(format!("{} 不是有效數值: {}", field, value)))
}

fn to_decimal_opt(value: Option<f64>, field: &str) -> PyResult<Option<Decimal>> {
    value.map(|v| to_decimal(v, field)).transpose()
}

fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(f64::NAN)
}

/// Python 定價配置
#[pyclass(name = "PricingConfig")]
#[derive(Clone)]
pub struct PyPricingConfig {
    inner: PricingConfig,
}

#[pymethods]
impl PyPricingConfig {
    /// 首次啟動的預設配置
    #[new]
    fn new() -> Self {
        Self {
            inner: PricingConfig::default(),
        }
    }

    /// 由 JSON 載入並驗證
    #[staticmethod]
    fn from_json(json: &str) -> PyResult<Self> {
        let inner = PricingConfig::from_json_str(json).map_err(to_py_err)?;
        Ok(Self { inner })
    }

    fn to_json(&self) -> PyResult<String> {
        self.inner.to_json_string().map_err(to_py_err)
    }

    #[getter]
    fn default_margin(&self) -> f64 {
        to_f64(self.inner.default_margin)
    }

    #[getter]
    fn default_tax_rate(&self) -> f64 {
        to_f64(self.inner.default_tax_rate)
    }

    #[getter]
    fn default_shipping_cost(&self) -> Option<f64> {
        self.inner.default_shipping_cost.map(to_f64)
    }

    #[getter]
    fn marketplace_premium(&self) -> f64 {
        to_f64(self.inner.marketplace_premium)
    }

    fn __repr__(&self) -> String {
        format!(
            "PricingConfig(margin={}, tax={}, tiers={})",
            self.inner.default_margin,
            self.inner.default_tax_rate,
            self.inner.shipping_cost_table.len()
        )
    }
}

/// Python PVPM 計算器
#[pyclass(name = "PvpmCalculator")]
pub struct PyPvpmCalculator {
    config: PricingConfig,
}

#[pymethods]
impl PyPvpmCalculator {
    #[new]
    #[pyo3(signature = (config=None))]
    fn new(config: Option<PyPricingConfig>) -> Self {
        Self {
            config: config.map(|c| c.inner).unwrap_or_default(),
        }
    }

    /// 計算 PVPM，回傳四捨五入後的明細
    #[pyo3(signature = (cost, weight_kg=None, custom_cost=None, custom_margin=None, custom_shipping_cost=None))]
    fn calculate<'py>(
        &self,
        py: Python<'py>,
        cost: f64,
        weight_kg: Option<f64>,
        custom_cost: Option<f64>,
        custom_margin: Option<f64>,
        custom_shipping_cost: Option<f64>,
    ) -> PyResult<Bound<'py, PyDict>> {
        let profile = ProductPricingProfile {
            custom_cost: to_decimal_opt(custom_cost, "custom_cost")?,
            custom_margin: to_decimal_opt(custom_margin, "custom_margin")?,
            custom_shipping_cost: to_decimal_opt(custom_shipping_cost, "custom_shipping_cost")?,
            ..ProductPricingProfile::default()
        };

        let result = PvpmCalculator::calculate(
            to_decimal(cost, "cost")?,
            to_decimal_opt(weight_kg, "weight_kg")?,
            &profile,
            &self.config,
        )
        .map_err(to_py_err)?;

        breakdown(py, &result.rounded())
    }
}

fn breakdown<'py>(py: Python<'py>, result: &PvpmResult) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new(py);
    dict.set_item("cost", to_f64(result.cost))?;
    dict.set_item("margin", to_f64(result.margin))?;
    dict.set_item("base_price", to_f64(result.base_price))?;
    dict.set_item("tax_rate", to_f64(result.tax_rate))?;
    dict.set_item("price_with_tax", to_f64(result.price_with_tax))?;
    dict.set_item("shipping_cost", to_f64(result.shipping_cost))?;
    dict.set_item("pvpm", to_f64(result.pvpm))?;
    Ok(dict)
}

/// 決定 Marketplace 售價
///
/// `lowest_competitor_price` 為目前最低的競品報價（無資料時為 None）。
#[pyfunction]
#[pyo3(signature = (config, cost, weight_kg=None, fixed_price=None, fixed_price_reason=None, auto_update=false, lowest_competitor_price=None, storefront_price=None))]
#[allow(clippy::too_many_arguments)]
pub fn resolve_price<'py>(
    py: Python<'py>,
    config: PyPricingConfig,
    cost: f64,
    weight_kg: Option<f64>,
    fixed_price: Option<f64>,
    fixed_price_reason: Option<String>,
    auto_update: bool,
    lowest_competitor_price: Option<f64>,
    storefront_price: Option<f64>,
) -> PyResult<Bound<'py, PyDict>> {
    let config = config.inner;

    let mut profile = ProductPricingProfile::new().with_auto_update(auto_update);
    profile
        .set_fixed_price(
            to_decimal_opt(fixed_price, "fixed_price")?,
            fixed_price_reason.as_deref().unwrap_or_default(),
        )
        .map_err(to_py_err)?;

    let floor = PvpmCalculator::calculate(
        to_decimal(cost, "cost")?,
        to_decimal_opt(weight_kg, "weight_kg")?,
        &profile,
        &config,
    )
    .map_err(to_py_err)?
    .price_floor();

    let competitor = match to_decimal_opt(lowest_competitor_price, "lowest_competitor_price")? {
        Some(price) => {
            let offers = [CompetitorOffer::new("competitor", "competitor", price)];
            Some(CompetitorAnalyzer::analyze(
                None,
                &offers,
                floor,
                config.competitor_settings.undercut(),
            ))
        }
        None => None,
    };

    let resolution = PriceResolver::resolve(
        &ResolutionInput {
            pvpm: floor,
            profile: &profile,
            competitor: competitor.as_ref(),
            storefront_price: to_decimal_opt(storefront_price, "storefront_price")?,
        },
        &config,
    )
    .map_err(to_py_err)?;

    let dict = PyDict::new(py);
    dict.set_item("resolved_price", to_f64(resolution.resolved_price))?;
    dict.set_item("strategy_used", resolution.strategy_used.as_str())?;
    dict.set_item("flags", resolution.flag_names())?;
    dict.set_item("pvpm", to_f64(resolution.pvpm))?;
    Ok(dict)
}
