//! Symbolic differentiation over parse trees.
//!
//! The node builders below fold constants and drop 0/1 identities as they go,
//! so `x^2` differentiates to `2 * x` rather than `2 * x ^ 1 * 1`.
//! In degrees mode the trigonometric rules carry the unit factor: the
//! derivative of `sin(x)` is `pi/180 * cos(x)`, with `x` still in degrees.

use super::Node;
use crate::config::AngleMode;
use anyhow::{bail, Result};

/// Differentiates `node` with respect to `var`.
pub fn differentiate(node: &Node, var: &str, angles: AngleMode) -> Result<Node> {
    if !depends_on(node, var) {
        return Ok(Node::constant(0.0));
    }

    match node {
        Node::Constant { .. } => Ok(Node::constant(0.0)),
        Node::Symbol { name } => Ok(Node::constant(if name == var { 1.0 } else { 0.0 })),
        Node::Parenthesis { content } => differentiate(content, var, angles),
        Node::Operator { op, args } => match args.as_slice() {
            [u] => {
                let du = differentiate(u, var, angles)?;
                match op {
                    '-' => Ok(neg(du)),
                    '+' => Ok(du),
                    _ => bail!("Cannot differentiate unary operator \"{op}\""),
                }
            }
            [u, v] => {
                let du = differentiate(u, var, angles)?;
                let dv = differentiate(v, var, angles)?;
                match op {
                    '+' => Ok(add(du, dv)),
                    '-' => Ok(sub(du, dv)),
                    '*' => Ok(add(mul(du, v.clone()), mul(u.clone(), dv))),
                    '/' => Ok(div(
                        sub(mul(du, v.clone()), mul(u.clone(), dv)),
                        pow(v.clone(), Node::constant(2.0)),
                    )),
                    '^' => power_rule(u, v, du, dv, var),
                    _ => bail!("Cannot differentiate operator \"{op}\""),
                }
            }
            _ => bail!("Operator \"{op}\" expects 1 or 2 operands, got {}", args.len()),
        },
        Node::Function { name, args } => function_rule(name, args, var, angles),
    }
}

/// Whether `var` occurs anywhere in `node`.
pub fn depends_on(node: &Node, var: &str) -> bool {
    match node {
        Node::Constant { .. } => false,
        Node::Symbol { name } => name == var,
        Node::Parenthesis { content } => depends_on(content, var),
        Node::Operator { args, .. } | Node::Function { args, .. } => {
            args.iter().any(|arg| depends_on(arg, var))
        }
    }
}

fn power_rule(u: &Node, v: &Node, du: Node, dv: Node, var: &str) -> Result<Node> {
    if !depends_on(v, var) {
        // d(u^n) = n * u^(n-1) * u'
        let exponent = sub(v.clone(), Node::constant(1.0));
        return Ok(mul(mul(v.clone(), pow(u.clone(), exponent)), du));
    }
    if !depends_on(u, var) {
        // d(a^v) = a^v * ln(a) * v'
        let ln_base = Node::function("log", vec![u.clone()]);
        return Ok(mul(mul(pow(u.clone(), v.clone()), ln_base), dv));
    }
    // d(u^v) = u^v * (v' * ln(u) + v * u' / u)
    let ln_base = Node::function("log", vec![u.clone()]);
    Ok(mul(
        pow(u.clone(), v.clone()),
        add(mul(dv, ln_base), div(mul(v.clone(), du), u.clone())),
    ))
}

fn function_rule(name: &str, args: &[Node], var: &str, angles: AngleMode) -> Result<Node> {
    let call = |f: &str, u: &Node| Node::function(f, vec![u.clone()]);

    match (name, args) {
        ("pow", [u, v]) => {
            let du = differentiate(u, var, angles)?;
            let dv = differentiate(v, var, angles)?;
            return power_rule(u, v, du, dv, var);
        }
        ("log", [u, base]) => {
            if depends_on(base, var) {
                bail!("Cannot differentiate log with a variable base");
            }
            let du = differentiate(u, var, angles)?;
            return Ok(div(du, mul(u.clone(), call("log", base))));
        }
        (_, [u]) => {
            let du = differentiate(u, var, angles)?;
            let outer = match name {
                "sin" => call("cos", u),
                "cos" => neg(call("sin", u)),
                "tan" => pow(call("sec", u), Node::constant(2.0)),
                "sec" => mul(call("sec", u), call("tan", u)),
                "csc" => neg(mul(call("csc", u), call("cot", u))),
                "cot" => neg(pow(call("csc", u), Node::constant(2.0))),
                "asin" => reciprocal(call("sqrt", &one_minus_square(u))),
                "acos" => neg(reciprocal(call("sqrt", &one_minus_square(u)))),
                "atan" => reciprocal(add(Node::constant(1.0), square(u))),
                "sinh" => call("cosh", u),
                "cosh" => call("sinh", u),
                "tanh" => sub(Node::constant(1.0), pow(call("tanh", u), Node::constant(2.0))),
                "exp" => call("exp", u),
                "log" | "ln" => reciprocal(u.clone()),
                "log10" => reciprocal(mul(u.clone(), ln_of(10.0))),
                "log2" => reciprocal(mul(u.clone(), ln_of(2.0))),
                "sqrt" => reciprocal(mul(Node::constant(2.0), call("sqrt", u))),
                "cbrt" => reciprocal(mul(
                    Node::constant(3.0),
                    pow(call("cbrt", u), Node::constant(2.0)),
                )),
                "abs" => call("sign", u),
                _ => bail!("Derivative of function {name} is not supported"),
            };
            let unit = match name {
                "sin" | "cos" | "tan" | "sec" | "csc" | "cot" => angles.to_radians(1.0),
                "asin" | "acos" | "atan" => angles.from_radians(1.0),
                _ => 1.0,
            };
            Ok(chain(outer, mul(Node::constant(unit), du)))
        }
        _ => bail!("Derivative of function {name} with {} arguments is not supported", args.len()),
    }
}

/// `outer * u'`, written `u' / x` when `outer` is `1 / x`.
fn chain(outer: Node, du: Node) -> Node {
    match outer {
        Node::Operator { op: '/', args } if args.first().and_then(Node::as_constant) == Some(1.0) => {
            let mut args = args.into_iter();
            let _one = args.next();
            match args.next() {
                Some(denominator) => div(du, denominator),
                None => du,
            }
        }
        Node::Operator { op: '-', ref args } if args.len() == 1 => {
            let inner = args[0].clone();
            neg(chain(inner, du))
        }
        other => mul(other, du),
    }
}

fn reciprocal(denominator: Node) -> Node {
    Node::binary(Node::constant(1.0), '/', denominator)
}

fn square(u: &Node) -> Node {
    pow(u.clone(), Node::constant(2.0))
}

fn one_minus_square(u: &Node) -> Node {
    sub(Node::constant(1.0), square(u))
}

fn ln_of(value: f64) -> Node {
    Node::function("log", vec![Node::constant(value)])
}

// --- Folding builders ---

fn is(node: &Node, value: f64) -> bool {
    node.as_constant() == Some(value)
}

fn add(a: Node, b: Node) -> Node {
    match (a.as_constant(), b.as_constant()) {
        (Some(x), Some(y)) => Node::constant(x + y),
        (Some(x), _) if x == 0.0 => b,
        (_, Some(y)) if y == 0.0 => a,
        _ => Node::binary(a, '+', b),
    }
}

fn sub(a: Node, b: Node) -> Node {
    match (a.as_constant(), b.as_constant()) {
        (Some(x), Some(y)) => Node::constant(x - y),
        (_, Some(y)) if y == 0.0 => a,
        (Some(x), _) if x == 0.0 => neg(b),
        _ => Node::binary(a, '-', b),
    }
}

fn mul(a: Node, b: Node) -> Node {
    match (a.as_constant(), b.as_constant()) {
        (Some(x), Some(y)) => Node::constant(x * y),
        _ if is(&a, 0.0) || is(&b, 0.0) => Node::constant(0.0),
        _ if is(&a, 1.0) => b,
        _ if is(&b, 1.0) => a,
        _ if is(&a, -1.0) => neg(b),
        _ if is(&b, -1.0) => neg(a),
        // Constant factors lead: `2 * cos(x)` rather than `cos(x) * 2`.
        (None, Some(_)) => Node::binary(b, '*', a),
        _ => Node::binary(a, '*', b),
    }
}

fn div(a: Node, b: Node) -> Node {
    match (a.as_constant(), b.as_constant()) {
        (Some(x), _) if x == 0.0 => Node::constant(0.0),
        (_, Some(y)) if y == 1.0 => a,
        (Some(x), Some(y)) if y != 0.0 => Node::constant(x / y),
        _ => Node::binary(a, '/', b),
    }
}

fn pow(a: Node, b: Node) -> Node {
    match (a.as_constant(), b.as_constant()) {
        (_, Some(y)) if y == 0.0 => Node::constant(1.0),
        (_, Some(y)) if y == 1.0 => a,
        (Some(x), Some(y)) => Node::constant(x.powf(y)),
        _ => Node::binary(a, '^', b),
    }
}

fn neg(a: Node) -> Node {
    match a {
        Node::Constant { value } => Node::constant(-value),
        Node::Operator { op: '-', mut args } if args.len() == 1 => args.remove(0),
        other => Node::unary('-', other),
    }
}
