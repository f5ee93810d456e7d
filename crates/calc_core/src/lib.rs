pub mod config;
pub mod equation_engine;
pub mod error;
pub mod evaluator;
pub mod explain;
pub mod format;
pub mod history;
pub mod solvers;
pub mod transforms;
pub mod wronskian;
/// The `calc_core` crate provides the computational engine behind the calculator UI.
/// Every operation is a pure function of its inputs plus an injected `MathEngine`.
///
/// Key components:
/// - **Traits**: `MathEngine` (parse/evaluate/differentiate capability), `Scalar`,
///   `DynamicalSystem` and `Steppable` (ODE solvers).
/// - **Equation Engine**: A parser, evaluator and symbolic differentiator over a small expression tree.
/// - **Evaluator / Explain**: Blank-aware evaluation and step-by-step explanation of an expression.
/// - **Wronskian / Solvers**: `f*g' - g*f'` at a point, and fixed-step Euler integration.
/// - **Format / History**: Display strings and the newest-first history log consumed by the UI.
pub mod traits;
