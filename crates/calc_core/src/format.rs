//! Display strings consumed by the UI: results, history entries and ODE tables.
//!
//! Every function here is total.

use crate::solvers::OdeSample;
use std::fmt::Display;

/// Renders a number the way the browser's number-to-string conversion does:
/// `5`, `0.1`, `Infinity`, `NaN`, and exponent form outside `[1e-6, 1e21)`.
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }
    let magnitude = value.abs();
    if (1e-6..1e21).contains(&magnitude) {
        return format!("{value}");
    }
    let exponential = format!("{value:e}");
    match exponential.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{mantissa}e+{exponent}")
        }
        _ => exponential,
    }
}

pub fn format_result(value: impl Display) -> String {
    format!("Result: {value}")
}

pub fn format_history_entry(expression: &str, result: impl Display) -> String {
    format!("{expression} = {result}")
}

pub fn format_derivative_entry(expression: &str, derivative: &str) -> String {
    format!("d/dx({expression}) = {derivative}")
}

/// Two-decimal rendering matching the browser's `toFixed(2)`.
///
/// Exact ties round away from zero (`0.125` gives `0.13`), and non-finite or
/// very large values fall back to [`format_number`].
pub fn format_fixed2(value: f64) -> String {
    if !value.is_finite() || value.abs() >= 1e21 {
        return format_number(value);
    }
    let magnitude = value.abs();
    // Ties at two decimals are exactly the odd multiples of 1/8.
    let eighths = magnitude * 8.0;
    let rounded = if eighths.fract() == 0.0 && eighths % 2.0 == 1.0 {
        (magnitude * 100.0 + 0.5).floor() / 100.0
    } else {
        magnitude
    };
    let sign = if value < 0.0 { "-" } else { "" };
    format!("{sign}{rounded:.2}")
}

/// `x=0.00, y=1.00 | x=0.10, y=1.10 | ...`
pub fn format_ode_solution(samples: &[OdeSample]) -> String {
    samples
        .iter()
        .map(|sample| {
            format!(
                "x={}, y={}",
                format_fixed2(sample.x),
                format_fixed2(sample.y)
            )
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

pub fn format_ode_entry(expression: &str, x0: f64, y0: f64, samples: &[OdeSample]) -> String {
    format!(
        "ODE: y'={expression}, y({})={} => {}",
        format_number(x0),
        format_number(y0),
        format_ode_solution(samples)
    )
}

pub fn format_wronskian_entry(f: &str, g: &str, x: f64, wronskian: f64) -> String {
    format!(
        "Wronskian at x={} for [{f}], [{g}] = {}",
        format_number(x),
        format_number(wronskian)
    )
}

pub fn format_laplace_entry(expression: &str, result: &str) -> String {
    format!("Laplace{{{expression}}} = {result}")
}

pub fn format_inverse_laplace_entry(expression: &str, result: &str) -> String {
    format!("L⁻¹{{{expression}}} = {result}")
}
