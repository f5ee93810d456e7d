use crate::equation_engine::scope;
use crate::error::CalcError;
use crate::evaluator::{differentiate, evaluate_with_scope};
use crate::traits::MathEngine;

/// Wronskian `f(x)*g'(x) - g(x)*f'(x)` of two single-variable functions of `x`.
///
/// Derivatives are taken symbolically and rendered back to text before
/// being evaluated at the same point. Any failing step fails the whole call.
pub fn wronskian(engine: &impl MathEngine, f: &str, g: &str, x: f64) -> Result<f64, CalcError> {
    let at_x = scope([("x", x)]);

    let f_val = evaluate_with_scope(engine, f, &at_x)?;
    let g_val = evaluate_with_scope(engine, g, &at_x)?;
    let f_prime = differentiate(engine, f, "x")?;
    let g_prime = differentiate(engine, g, "x")?;
    let f_prime_val = evaluate_with_scope(engine, &f_prime, &at_x)?;
    let g_prime_val = evaluate_with_scope(engine, &g_prime, &at_x)?;

    Ok(f_val * g_prime_val - g_val * f_prime_val)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AngleMode, EngineConfig};
    use crate::equation_engine::{Engine, Node, Scope};
    use anyhow::{anyhow, Result};

    /// Linear functions `a*x` only: derivative of `a*x` is the constant `a`.
    struct LinearStub;

    impl MathEngine for LinearStub {
        fn evaluate(&self, expression: &str, scope: &Scope) -> Result<f64> {
            let x = scope.get("x").copied().unwrap_or(0.0);
            match expression.split_once("*x") {
                Some((a, "")) => Ok(a.parse::<f64>()? * x),
                _ => expression.parse::<f64>().map_err(|_| anyhow!("bad {expression}")),
            }
        }

        fn parse(&self, _expression: &str) -> Result<Node> {
            Err(anyhow!("not supported"))
        }

        fn derivative(&self, expression: &str, _variable: &str) -> Result<Node> {
            match expression.split_once("*x") {
                Some((a, "")) => Ok(Node::constant(a.parse()?)),
                _ => Err(anyhow!("cannot differentiate {expression}")),
            }
        }

        fn call_function(&self, _name: &str, _args: &[f64]) -> Option<Result<f64>> {
            None
        }

        fn angle_mode(&self) -> AngleMode {
            AngleMode::Radians
        }
    }

    #[test]
    fn polynomial_pair_at_one() {
        let w = wronskian(&Engine::default(), "x^2", "2*x", 1.0).expect("wronskian");
        assert!((w + 2.0).abs() < 1e-12);
    }

    #[test]
    fn sine_cosine_pair_is_minus_one_everywhere() {
        let engine = Engine::default();
        for x in [0.0, 0.3, 2.0] {
            let w = wronskian(&engine, "sin(x)", "cos(x)", x).expect("wronskian");
            assert!((w + 1.0).abs() < 1e-12, "W(sin, cos)({x}) = {w}");
        }
    }

    #[test]
    fn degrees_mode_carries_the_unit_factor() {
        let engine = Engine::new(EngineConfig {
            angles: AngleMode::Degrees,
        });
        let w = wronskian(&engine, "sin(x)", "cos(x)", 0.0).expect("wronskian");
        assert!((w + std::f64::consts::PI / 180.0).abs() < 1e-15, "got {w}");
    }

    #[test]
    fn linearly_dependent_functions_vanish() {
        let w = wronskian(&Engine::default(), "exp(x)", "3*exp(x)", 0.7).expect("wronskian");
        assert!(w.abs() < 1e-12);
    }

    #[test]
    fn stub_engine_linear_functions_vanish() {
        let w = wronskian(&LinearStub, "2*x", "5*x", 3.0).expect("wronskian");
        assert_eq!(w, 2.0 * 3.0 * 5.0 - 5.0 * 3.0 * 2.0);
    }

    #[test]
    fn any_failure_is_invalid_expression() {
        let engine = Engine::default();
        assert_eq!(
            wronskian(&engine, "x^", "x", 1.0),
            Err(CalcError::InvalidExpression)
        );
        assert_eq!(
            wronskian(&engine, "x", "y*x", 1.0),
            Err(CalcError::InvalidExpression)
        );
        assert_eq!(
            wronskian(&engine, "floor(x)", "x", 1.5),
            Err(CalcError::InvalidExpression)
        );
        assert_eq!(
            wronskian(&LinearStub, "x^2", "2*x", 1.0),
            Err(CalcError::InvalidExpression)
        );
    }
}
