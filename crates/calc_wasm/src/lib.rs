//! Browser bridge for `calc_core`.
//!
//! `WasmCalculator` owns the per-session state (angle mode, history); the
//! free functions are the stateless formatters the UI calls directly.

use calc_core::solvers::OdeSample;
use wasm_bindgen::prelude::*;

mod calculator;
mod logging;

pub use calculator::WasmCalculator;

#[wasm_bindgen]
pub fn format_result(value: &str) -> String {
    calc_core::format::format_result(value)
}

#[wasm_bindgen]
pub fn format_history_entry(expression: &str, result: &str) -> String {
    calc_core::format::format_history_entry(expression, result)
}

/// Renders the array returned by `WasmCalculator::solve_ode` as
/// `x=0.00, y=1.00 | ...`.
#[wasm_bindgen]
pub fn format_ode_solution(samples: JsValue) -> Result<String, JsValue> {
    let samples: Vec<OdeSample> = serde_wasm_bindgen::from_value(samples)
        .map_err(|e| JsValue::from_str(&format!("Invalid ODE samples: {}", e)))?;
    Ok(calc_core::format::format_ode_solution(&samples))
}
