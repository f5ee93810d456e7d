//! Calculator session exported to the browser UI.

use crate::logging;
use calc_core::config::{AngleMode, EngineConfig};
use calc_core::equation_engine::Engine;
use calc_core::error::CalcError;
use calc_core::evaluator::{differentiate, evaluate, Value};
use calc_core::explain::explain_text;
use calc_core::format::{
    format_derivative_entry, format_history_entry, format_inverse_laplace_entry,
    format_laplace_entry, format_ode_entry, format_wronskian_entry,
};
use calc_core::history::History;
use calc_core::solvers::{solve_ode, OdeSample};
use calc_core::transforms::{inverse_laplace_transform, laplace_transform};
use calc_core::wronskian::wronskian;
use log::LevelFilter;
use serde_wasm_bindgen::to_value;
use wasm_bindgen::prelude::*;

/// One UI session: the engine configuration plus the history panel.
#[wasm_bindgen]
pub struct WasmCalculator {
    engine: Engine,
    history: History,
}

fn to_js_error(err: CalcError) -> JsValue {
    JsValue::from_str(&format!("Error: {err}"))
}

impl WasmCalculator {
    pub(crate) fn evaluate_value(&mut self, expression: &str) -> Result<Value, CalcError> {
        let value = evaluate(&self.engine, expression)?;
        if value != Value::Empty {
            self.history
                .record(format_history_entry(expression, &value));
        }
        Ok(value)
    }

    pub(crate) fn derivative_text(&mut self, expression: &str) -> Result<String, CalcError> {
        let derivative = differentiate(&self.engine, expression, "x")?;
        self.history
            .record(format_derivative_entry(expression, &derivative));
        Ok(derivative)
    }

    pub(crate) fn wronskian_value(&mut self, f: &str, g: &str, x: f64) -> Result<f64, CalcError> {
        let value = wronskian(&self.engine, f, g, x)?;
        self.history
            .record(format_wronskian_entry(f, g, x, value));
        Ok(value)
    }

    pub(crate) fn ode_samples(
        &mut self,
        expression: &str,
        x0: f64,
        y0: f64,
        h: f64,
        n: u32,
    ) -> Result<Vec<OdeSample>, CalcError> {
        let samples = solve_ode(&self.engine, expression, x0, y0, h, n as usize)?;
        self.history
            .record(format_ode_entry(expression, x0, y0, &samples));
        Ok(samples)
    }
}

#[wasm_bindgen]
impl WasmCalculator {
    #[wasm_bindgen(constructor)]
    pub fn new(angle_mode: &str) -> WasmCalculator {
        console_error_panic_hook::set_once();
        logging::init(LevelFilter::Info);

        WasmCalculator {
            engine: Engine::new(EngineConfig {
                angles: AngleMode::from_toggle(angle_mode),
            }),
            history: History::new(),
        }
    }

    /// `"deg"` selects degrees; anything else radians.
    pub fn set_angle_mode(&mut self, mode: &str) {
        self.engine.set_angle_mode(AngleMode::from_toggle(mode));
    }

    pub fn angle_mode(&self) -> String {
        self.engine.config().angles.to_string()
    }

    /// Accepts `off`, `error`, `warn`, `info`, `debug` or `trace`; unknown names are ignored.
    pub fn set_log_level(&self, level: &str) {
        if let Ok(filter) = level.parse::<LevelFilter>() {
            logging::init(filter);
        }
    }

    /// Display text for `expression`; blank input gives an empty string.
    pub fn evaluate(&mut self, expression: &str) -> Result<String, JsValue> {
        self.evaluate_value(expression)
            .map(|value| value.to_string())
            .map_err(to_js_error)
    }

    pub fn explain(&self, expression: &str) -> String {
        explain_text(&self.engine, expression)
    }

    pub fn differentiate(&mut self, expression: &str) -> Result<String, JsValue> {
        self.derivative_text(expression).map_err(to_js_error)
    }

    pub fn wronskian(&mut self, f: &str, g: &str, x: f64) -> Result<f64, JsValue> {
        self.wronskian_value(f, g, x).map_err(to_js_error)
    }

    /// Array of `{x, y}` samples; render it with `format_ode_solution`.
    pub fn solve_ode(
        &mut self,
        expression: &str,
        x0: f64,
        y0: f64,
        h: f64,
        n: u32,
    ) -> Result<JsValue, JsValue> {
        let samples = self
            .ode_samples(expression, x0, y0, h, n)
            .map_err(to_js_error)?;
        to_value(&samples).map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    pub fn laplace(&mut self, expression: &str) -> String {
        let result = laplace_transform(expression);
        self.history
            .record(format_laplace_entry(expression, &result));
        result
    }

    pub fn inverse_laplace(&mut self, expression: &str) -> String {
        let result = inverse_laplace_transform(expression);
        self.history
            .record(format_inverse_laplace_entry(expression, &result));
        result
    }

    /// History entries, newest first.
    pub fn history(&self) -> Vec<String> {
        self.history.entries().map(str::to_string).collect()
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}
