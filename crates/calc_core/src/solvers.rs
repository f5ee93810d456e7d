use crate::equation_engine::scope;
use crate::error::CalcError;
use crate::traits::{DynamicalSystem, MathEngine, Scalar, Steppable};
use anyhow::Result;
use log::{debug, error};
use serde::{Deserialize, Serialize};

/// One integration point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OdeSample {
    pub x: f64,
    pub y: f64,
}

/// Explicit Euler Solver
/// y_{n+1} = y_n + h * f(x_n, y_n), x_{n+1} = x_n + h.
pub struct Euler<T: Scalar> {
    slope: Vec<T>,
}

impl<T: Scalar> Euler<T> {
    pub fn new(dim: usize) -> Self {
        Self {
            slope: vec![T::zero(); dim],
        }
    }
}

impl<T: Scalar> Steppable<T> for Euler<T> {
    fn step(
        &mut self,
        system: &impl DynamicalSystem<T>,
        x: &mut T,
        state: &mut [T],
        h: T,
    ) -> Result<()> {
        system.apply(*x, state, &mut self.slope)?;

        for i in 0..state.len() {
            state[i] = state[i] + h * self.slope[i];
        }

        *x = *x + h;
        Ok(())
    }
}

/// Scalar field y' = f(x, y) given as an expression in `x` and `y`.
pub struct ExpressionField<'a, E: MathEngine> {
    engine: &'a E,
    expression: &'a str,
}

impl<'a, E: MathEngine> ExpressionField<'a, E> {
    pub fn new(engine: &'a E, expression: &'a str) -> Self {
        Self { engine, expression }
    }
}

impl<E: MathEngine> DynamicalSystem<f64> for ExpressionField<'_, E> {
    fn dimension(&self) -> usize {
        1
    }

    fn apply(&self, x: f64, y: &[f64], out: &mut [f64]) -> Result<()> {
        let bindings = scope([("x", x), ("y", y[0])]);
        out[0] = self.engine.evaluate(self.expression, &bindings)?;
        Ok(())
    }
}

/// Integrates y' = `expression` from `(x0, y0)` with `n` fixed Euler steps of size `h`.
///
/// Returns `n + 1` samples, the first being the initial condition. If any
/// step fails the whole sequence is discarded.
pub fn solve_ode(
    engine: &impl MathEngine,
    expression: &str,
    x0: f64,
    y0: f64,
    h: f64,
    n: usize,
) -> Result<Vec<OdeSample>, CalcError> {
    debug!("Euler integration of y'={expression} from ({x0}, {y0}), h={h}, {n} steps");
    let system = ExpressionField::new(engine, expression);
    let mut solver = Euler::new(system.dimension());
    let mut x = x0;
    let mut state = [y0];

    let mut samples = Vec::with_capacity(n + 1);
    samples.push(OdeSample { x, y: state[0] });
    for i in 0..n {
        solver.step(&system, &mut x, &mut state, h).map_err(|err| {
            error!("Error evaluating y'={expression} at step {} (x={x}): {err:#}", i + 1);
            CalcError::InvalidExpression
        })?;
        samples.push(OdeSample { x, y: state[0] });
    }
    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equation_engine::Engine;
    use crate::format::format_ode_solution;
    use anyhow::bail;

    struct Decay {
        rate: f32,
    }

    impl DynamicalSystem<f32> for Decay {
        fn dimension(&self) -> usize {
            2
        }

        fn apply(&self, _x: f32, y: &[f32], out: &mut [f32]) -> Result<()> {
            out[0] = -self.rate * y[0];
            out[1] = self.rate * y[0];
            Ok(())
        }
    }

    struct FailsAfter {
        limit: f64,
    }

    impl DynamicalSystem<f64> for FailsAfter {
        fn dimension(&self) -> usize {
            1
        }

        fn apply(&self, x: f64, _y: &[f64], out: &mut [f64]) -> Result<()> {
            if x >= self.limit {
                bail!("field undefined at x={x}");
            }
            out[0] = 1.0;
            Ok(())
        }
    }

    #[test]
    fn euler_step_is_generic_over_scalar() {
        let system = Decay { rate: 0.5 };
        let mut solver = Euler::new(system.dimension());
        let mut x = 0.0f32;
        let mut state = [2.0f32, 0.0];
        solver.step(&system, &mut x, &mut state, 0.5).expect("step");
        assert!((x - 0.5).abs() < 1e-6);
        assert!((state[0] - 1.5).abs() < 1e-6);
        assert!((state[1] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn euler_step_leaves_state_alone_on_failure() {
        let system = FailsAfter { limit: 0.0 };
        let mut solver = Euler::new(1);
        let mut x = 0.0;
        let mut state = [3.0];
        let err = solver
            .step(&system, &mut x, &mut state, 0.1)
            .expect_err("expected failure");
        assert!(err.to_string().contains("field undefined"));
        assert_eq!(x, 0.0);
        assert_eq!(state, [3.0]);
    }

    #[test]
    fn solve_ode_linear_example() {
        let samples = solve_ode(&Engine::default(), "x+y", 0.0, 1.0, 0.1, 2).expect("solve");
        assert_eq!(samples.len(), 3);
        assert_eq!(samples[0], OdeSample { x: 0.0, y: 1.0 });
        assert!((samples[1].x - 0.1).abs() < 1e-12);
        assert!((samples[1].y - 1.1).abs() < 1e-12);
        assert!((samples[2].x - 0.2).abs() < 1e-12);
        assert!((samples[2].y - 1.22).abs() < 1e-12);
    }

    #[test]
    fn zero_steps_yield_only_the_seed() {
        let samples = solve_ode(&Engine::default(), "x+y", 2.0, -1.0, 0.5, 0).expect("solve");
        assert_eq!(samples, vec![OdeSample { x: 2.0, y: -1.0 }]);
    }

    #[test]
    fn zero_step_size_repeats_the_seed() {
        let samples = solve_ode(&Engine::default(), "y", 1.0, 1.0, 0.0, 3).expect("solve");
        assert_eq!(samples.len(), 4);
        assert!(samples.iter().all(|s| *s == OdeSample { x: 1.0, y: 1.0 }));
    }

    #[test]
    fn x_increases_strictly_for_positive_step() {
        let samples = solve_ode(&Engine::default(), "-2*y", 0.0, 1.0, 0.25, 8).expect("solve");
        assert_eq!(samples.len(), 9);
        assert!(samples.windows(2).all(|pair| pair[1].x > pair[0].x));
        // y_{k+1} = y_k * (1 - 2h) = y_k / 2
        assert!((samples[8].y - 0.5f64.powi(8)).abs() < 1e-15);
    }

    #[test]
    fn blow_up_renders_as_infinity() {
        let samples = solve_ode(&Engine::default(), "y^2", 0.0, 1.0, 1.0, 11).expect("solve");
        assert_eq!(samples[11].y, f64::INFINITY);
        assert!(format_ode_solution(&samples).ends_with("x=11.00, y=Infinity"));
    }

    #[test]
    fn failing_expression_discards_samples() {
        let engine = Engine::default();
        assert_eq!(
            solve_ode(&engine, "x + z", 0.0, 1.0, 0.1, 3),
            Err(CalcError::InvalidExpression)
        );
        // 0 steps never evaluates the expression.
        assert!(solve_ode(&engine, "x + z", 0.0, 1.0, 0.1, 0).is_ok());
    }
}
