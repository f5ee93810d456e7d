//! Built-in constants and elementary functions.

use crate::config::AngleMode;
use anyhow::{anyhow, bail, Result};
use std::f64::consts::{E, PI, TAU};

/// Named constants recognised when no scope binding shadows them.
pub fn constant(name: &str) -> Option<f64> {
    match name {
        "pi" | "PI" => Some(PI),
        "e" | "E" => Some(E),
        "tau" => Some(TAU),
        "phi" => Some((1.0 + 5f64.sqrt()) / 2.0),
        "Infinity" => Some(f64::INFINITY),
        "NaN" => Some(f64::NAN),
        _ => None,
    }
}

/// Floored modulo: the result takes the sign of the divisor, and `x mod 0 = x`.
pub fn modulo(x: f64, y: f64) -> f64 {
    if y == 0.0 {
        x
    } else {
        x - y * (x / y).floor()
    }
}

fn expect_arity(name: &str, args: &[f64], expected: usize) -> Result<()> {
    if args.len() != expected {
        bail!(
            "Wrong number of arguments in function {name} ({} provided, {expected} expected)",
            args.len()
        );
    }
    Ok(())
}

fn unary(name: &str, args: &[f64], f: impl Fn(f64) -> f64) -> Result<f64> {
    expect_arity(name, args, 1)?;
    Ok(f(args[0]))
}

fn binary(name: &str, args: &[f64], f: impl Fn(f64, f64) -> f64) -> Result<f64> {
    expect_arity(name, args, 2)?;
    Ok(f(args[0], args[1]))
}

fn round_to(value: f64, digits: f64) -> Result<f64> {
    if digits.fract() != 0.0 || !(0.0..=15.0).contains(&digits) {
        bail!("Number of decimals in function round must be an integer from 0 to 15");
    }
    let factor = 10f64.powi(digits as i32);
    Ok((value * factor).round() / factor)
}

/// Invokes the function called `name`.
///
/// Returns `None` when no such function exists, so callers can tell an
/// unknown name apart from a failed call.
pub fn call(name: &str, args: &[f64], angles: AngleMode) -> Option<Result<f64>> {
    let rad = |x: f64| angles.to_radians(x);
    let unrad = |x: f64| angles.from_radians(x);

    let result = match name {
        "sin" => unary(name, args, |x| rad(x).sin()),
        "cos" => unary(name, args, |x| rad(x).cos()),
        "tan" => unary(name, args, |x| rad(x).tan()),
        "sec" => unary(name, args, |x| 1.0 / rad(x).cos()),
        "csc" => unary(name, args, |x| 1.0 / rad(x).sin()),
        "cot" => unary(name, args, |x| 1.0 / rad(x).tan()),
        "asin" => unary(name, args, |x| unrad(x.asin())),
        "acos" => unary(name, args, |x| unrad(x.acos())),
        "atan" => unary(name, args, |x| unrad(x.atan())),
        "atan2" => binary(name, args, |y, x| unrad(y.atan2(x))),
        "sinh" => unary(name, args, f64::sinh),
        "cosh" => unary(name, args, f64::cosh),
        "tanh" => unary(name, args, f64::tanh),
        "exp" => unary(name, args, f64::exp),
        "ln" => unary(name, args, f64::ln),
        "log" => match args.len() {
            1 => Ok(args[0].ln()),
            2 => Ok(args[0].ln() / args[1].ln()),
            n => Err(anyhow!(
                "Wrong number of arguments in function log ({n} provided, 1 or 2 expected)"
            )),
        },
        "log10" => unary(name, args, f64::log10),
        "log2" => unary(name, args, f64::log2),
        "sqrt" => unary(name, args, f64::sqrt),
        "cbrt" => unary(name, args, f64::cbrt),
        "abs" => unary(name, args, f64::abs),
        "sign" => unary(name, args, |x| {
            if x == 0.0 || x.is_nan() {
                x
            } else {
                x.signum()
            }
        }),
        "ceil" => unary(name, args, f64::ceil),
        "floor" => unary(name, args, f64::floor),
        "round" => match args.len() {
            1 => Ok(args[0].round()),
            2 => round_to(args[0], args[1]),
            n => Err(anyhow!(
                "Wrong number of arguments in function round ({n} provided, 1 or 2 expected)"
            )),
        },
        "pow" => binary(name, args, f64::powf),
        "mod" => binary(name, args, modulo),
        "min" | "max" => {
            if args.is_empty() {
                Err(anyhow!(
                    "Function {name} requires at least one argument"
                ))
            } else if name == "min" {
                Ok(args.iter().copied().fold(f64::INFINITY, f64::min))
            } else {
                Ok(args.iter().copied().fold(f64::NEG_INFINITY, f64::max))
            }
        }
        _ => return None,
    };
    Some(result)
}
