use thiserror::Error;

/// Failures surfaced by the calculator operations.
///
/// The underlying engine cause is logged where it happens and never carried here.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalcError {
    #[error("Invalid expression")]
    InvalidExpression,
    #[error("Unable to provide step-by-step explanation.")]
    ExplanationUnavailable,
}
