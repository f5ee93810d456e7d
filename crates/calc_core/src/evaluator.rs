use crate::equation_engine::Scope;
use crate::error::CalcError;
use crate::format::format_number;
use crate::traits::MathEngine;
use log::{debug, error};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of evaluating user input.
///
/// `Empty` is the no-op result for blank input; `Text` carries the
/// non-numeric values the step explainer passes around (symbol names).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Empty,
    Number(f64),
    Text(String),
}

impl Value {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Empty => Ok(()),
            Value::Number(n) => write!(f, "{}", format_number(*n)),
            Value::Text(text) => write!(f, "{text}"),
        }
    }
}

/// Evaluates `expression` with no variables bound.
///
/// Blank input yields `Value::Empty`, not an error. Any engine failure
/// becomes `InvalidExpression`; the cause is logged and dropped.
pub fn evaluate(engine: &impl MathEngine, expression: &str) -> Result<Value, CalcError> {
    if expression.trim().is_empty() {
        return Ok(Value::Empty);
    }
    evaluate_with_scope(engine, expression, &Scope::new()).map(Value::Number)
}

pub fn evaluate_with_scope(
    engine: &impl MathEngine,
    expression: &str,
    scope: &Scope,
) -> Result<f64, CalcError> {
    debug!("evaluating '{expression}' with {} bound variable(s)", scope.len());
    engine.evaluate(expression, scope).map_err(|err| {
        error!("Error evaluating expression '{expression}': {err:#}");
        CalcError::InvalidExpression
    })
}

/// Symbolic derivative of `expression` with respect to `variable`, rendered as text.
pub fn differentiate(
    engine: &impl MathEngine,
    expression: &str,
    variable: &str,
) -> Result<String, CalcError> {
    engine
        .derivative(expression, variable)
        .map(|node| node.to_string())
        .map_err(|err| {
            error!("Error differentiating '{expression}' with respect to {variable}: {err:#}");
            CalcError::InvalidExpression
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equation_engine::{scope, Engine};

    #[test]
    fn blank_input_is_empty_not_error() {
        let engine = Engine::default();
        assert_eq!(evaluate(&engine, ""), Ok(Value::Empty));
        assert_eq!(evaluate(&engine, "   "), Ok(Value::Empty));
        assert_eq!(evaluate(&engine, "\t\n").unwrap().to_string(), "");
    }

    #[test]
    fn evaluates_arithmetic() {
        let engine = Engine::default();
        assert_eq!(evaluate(&engine, "2+3*4"), Ok(Value::Number(14.0)));
        assert_eq!(evaluate(&engine, "2+3*4").unwrap().to_string(), "14");
    }

    #[test]
    fn division_by_zero_is_infinite() {
        let engine = Engine::default();
        let value = evaluate(&engine, "1/0").unwrap();
        assert_eq!(value, Value::Number(f64::INFINITY));
        assert_eq!(value.to_string(), "Infinity");
    }

    #[test]
    fn failures_collapse_to_invalid_expression() {
        let engine = Engine::default();
        assert_eq!(evaluate(&engine, "2 +"), Err(CalcError::InvalidExpression));
        assert_eq!(evaluate(&engine, "x + 1"), Err(CalcError::InvalidExpression));
        assert_eq!(evaluate(&engine, "sin(1, 2)"), Err(CalcError::InvalidExpression));
    }

    #[test]
    fn deeply_nested_input_is_rejected_not_overflowed() {
        let engine = Engine::default();
        let nested = format!("{}1{}", "(".repeat(10_000), ")".repeat(10_000));
        assert_eq!(evaluate(&engine, &nested), Err(CalcError::InvalidExpression));
        assert_eq!(
            differentiate(&engine, &format!("{nested}*x"), "x"),
            Err(CalcError::InvalidExpression)
        );
    }

    #[test]
    fn repeated_evaluation_is_identical() {
        let engine = Engine::default();
        let first = evaluate(&engine, "sqrt(2) * pi");
        let second = evaluate(&engine, "sqrt(2) * pi");
        assert_eq!(first, second);
    }

    #[test]
    fn scope_is_applied() {
        let engine = Engine::default();
        let value = evaluate_with_scope(&engine, "x * y", &scope([("x", 3.0), ("y", 4.0)]));
        assert_eq!(value, Ok(12.0));
    }

    #[test]
    fn differentiate_renders_text() {
        let engine = Engine::default();
        assert_eq!(differentiate(&engine, "x^2", "x"), Ok("2 * x".to_string()));
        assert_eq!(
            differentiate(&engine, "x^", "x"),
            Err(CalcError::InvalidExpression)
        );
    }

    #[test]
    fn value_accessors() {
        assert_eq!(Value::Number(2.0).as_number(), Some(2.0));
        assert_eq!(Value::Text("pi".into()).as_number(), None);
        assert_eq!(Value::Text("pi".into()).to_string(), "pi");
    }
}
