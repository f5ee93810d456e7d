use crate::config::AngleMode;
use crate::equation_engine::{Node, Scope};
use anyhow::Result;
use num_traits::{Float, FromPrimitive};
use std::fmt::Debug;

/// A trait for types that can be used as scalars by the ODE solvers.
/// Must support basic arithmetic, debug printing, and conversion from f64.
pub trait Scalar: Float + FromPrimitive + Debug + 'static {}

impl<T: Float + FromPrimitive + Debug + 'static> Scalar for T {}

/// Represents a first-order system y' = f(x, y).
///
/// Unlike a compiled vector field, the right-hand side here is user text,
/// so evaluating it can fail.
pub trait DynamicalSystem<T: Scalar> {
    /// Returns the dimension of the state space.
    fn dimension(&self) -> usize;

    /// Evaluates the vector field.
    /// x: independent variable
    /// y: current state
    /// out: buffer to write dy/dx
    fn apply(&self, x: T, y: &[T], out: &mut [T]) -> Result<()>;
}

/// A trait for solvers that can step a system forward.
pub trait Steppable<T: Scalar> {
    /// Performs one step of size h.
    /// x: independent variable (updated after step)
    /// state: current state (updated after step)
    /// h: step size
    fn step(&mut self, system: &impl DynamicalSystem<T>, x: &mut T, state: &mut [T], h: T)
        -> Result<()>;
}

/// The parse / evaluate / differentiate capability every calculator
/// operation is built on.
///
/// `Engine` is the built-in implementation; tests substitute stubs.
pub trait MathEngine {
    /// Evaluates `expression` with the variables in `scope` bound.
    fn evaluate(&self, expression: &str, scope: &Scope) -> Result<f64>;

    /// Parses `expression` into a tree.
    fn parse(&self, expression: &str) -> Result<Node>;

    /// Symbolic first derivative of `expression` with respect to `variable`.
    fn derivative(&self, expression: &str, variable: &str) -> Result<Node>;

    /// Invokes a named function directly on numeric arguments.
    /// Returns `None` when `name` is not exposed for direct invocation.
    fn call_function(&self, name: &str, args: &[f64]) -> Option<Result<f64>>;

    /// Angle unit used by the trigonometric functions.
    fn angle_mode(&self) -> AngleMode;
}
