//! # Pricing FFI
//!
//! Python 綁定層（PyO3）

use pyo3::prelude::*;

pub mod python;

/// Python 模組註冊
#[pymodule]
fn pvpm_engine(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<python::PyPricingConfig>()?;
    m.add_class::<python::PyPvpmCalculator>()?;
    m.add_function(wrap_pyfunction!(python::resolve_price, m)?)?;
    Ok(())
}
