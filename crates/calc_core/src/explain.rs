//! Step-by-step explanation of an expression.
//!
//! The tree is walked depth-first, children before parents. Each operator and
//! function application is rendered back to text and re-evaluated through the
//! engine, so every displayed intermediate matches what the engine itself
//! produces for that substring.

use crate::equation_engine::Node;
use crate::error::CalcError;
use crate::evaluator::{evaluate, Value};
use crate::format::format_number;
use crate::traits::MathEngine;
use log::{debug, warn};

/// Produces the ordered explanation steps for `expression`.
///
/// On success the last step is always `Final result: <value>`.
pub fn explain(engine: &impl MathEngine, expression: &str) -> Result<Vec<String>, CalcError> {
    let node = engine.parse(expression).map_err(|err| {
        warn!("Step explanation unavailable for '{expression}': {err:#}");
        CalcError::ExplanationUnavailable
    })?;

    let mut recorder = StepRecorder {
        engine,
        steps: Vec::new(),
    };
    let result = recorder.visit(&node).map_err(|err| {
        warn!("Step explanation unavailable for '{expression}': {err}");
        CalcError::ExplanationUnavailable
    })?;

    let mut steps = recorder.steps;
    steps.push(format!("Final result: {result}"));
    Ok(steps)
}

/// Newline-joined explanation, or the fixed fallback message on failure.
pub fn explain_text(engine: &impl MathEngine, expression: &str) -> String {
    match explain(engine, expression) {
        Ok(steps) => steps.join("\n"),
        Err(err) => err.to_string(),
    }
}

struct StepRecorder<'a, E: MathEngine> {
    engine: &'a E,
    steps: Vec<String>,
}

impl<E: MathEngine> StepRecorder<'_, E> {
    fn visit(&mut self, node: &Node) -> Result<Value, CalcError> {
        match node {
            Node::Constant { value } => {
                self.steps
                    .push(format!("Constant: {node} = {}", format_number(*value)));
                Ok(Value::Number(*value))
            }
            // Symbols yield their name; constants such as `pi` are not resolved here.
            Node::Symbol { name } => {
                self.steps.push(format!("Symbol: {name}"));
                Ok(Value::Text(name.clone()))
            }
            Node::Parenthesis { content } => {
                self.steps
                    .push(format!("Evaluating parenthesis: ({content})"));
                self.visit(content)
            }
            Node::Operator { op, args } if args.len() == 1 => {
                self.visit(&args[0])?;
                self.record_evaluation(format!("{op}{}", args[0]))
            }
            Node::Operator { op, args } if args.len() == 2 => {
                self.visit(&args[0])?;
                self.visit(&args[1])?;
                self.record_evaluation(format!("{} {op} {}", args[0], args[1]))
            }
            Node::Function { name, args } => {
                let values = args
                    .iter()
                    .map(|arg| self.visit(arg))
                    .collect::<Result<Vec<_>, _>>()?;
                let rendered = args
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                let result = self.apply_function(name, &values)?;
                self.steps
                    .push(format!("Evaluating: {name}({rendered}) = {result}"));
                Ok(result)
            }
            _ => {
                let rendered = node.to_string();
                self.steps.push(format!("Unhandled node: {rendered}"));
                Ok(Value::Text(rendered))
            }
        }
    }

    fn record_evaluation(&mut self, expression: String) -> Result<Value, CalcError> {
        let result = evaluate(self.engine, &expression)?;
        self.steps
            .push(format!("Evaluating: {expression} = {result}"));
        Ok(result)
    }

    /// Direct call when every argument is numeric and the engine exposes
    /// `name`; otherwise re-evaluates `name(v1,v2,...)` as text.
    fn apply_function(&self, name: &str, values: &[Value]) -> Result<Value, CalcError> {
        let numbers: Option<Vec<f64>> = values.iter().map(Value::as_number).collect();
        if let Some(numbers) = numbers {
            match self.engine.call_function(name, &numbers) {
                Some(Ok(result)) => return Ok(Value::Number(result)),
                Some(Err(err)) => debug!("direct call to {name} failed, re-evaluating: {err:#}"),
                None => {}
            }
        }
        let args = values
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        evaluate(self.engine, &format!("{name}({args})"))
    }
}
