//! Laplace transform placeholders.
//!
//! No transform is computed: the input is wrapped in the operator notation.

pub fn laplace_transform(expression: &str) -> String {
    format!("L{{{expression}}}")
}

pub fn inverse_laplace_transform(expression: &str) -> String {
    format!("L⁻¹{{{expression}}}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_expression_verbatim() {
        assert_eq!(laplace_transform("sin(t)"), "L{sin(t)}");
        assert_eq!(inverse_laplace_transform("1/(s+1)"), "L⁻¹{1/(s+1)}");
        assert_eq!(laplace_transform(""), "L{}");
    }
}
