use miette::SourceSpan;

use crate::{
    error::CalcError,
    parser::{Expr, Op, Parser, DEFAULT_MAX_DEPTH},
};

/// Limits applied while evaluating one expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// How deeply parentheses and unary minus may nest. Values above
    /// [`MAX_DEPTH_LIMIT`](crate::parser::MAX_DEPTH_LIMIT) are treated as that limit.
    pub max_depth: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Evaluates an arithmetic expression with the default [`Options`].
///
/// # Examples
/// ```
/// use calc::evaluate;
///
/// assert_eq!(evaluate("2+3*4"), Ok(14.0));
/// assert!(evaluate("10/0").is_err());
/// ```
pub fn evaluate(input: &str) -> Result<f64, CalcError> {
    evaluate_with(input, &Options::default())
}

/// Parses `input` in full, then computes its value.
///
/// Syntax errors anywhere in the input win over arithmetic errors, since
/// nothing is computed until parsing has succeeded.
///
/// # Arguments
/// - `input`: The expression text, e.g. `"(2+3)*4"`.
/// - `options`: Limits for this evaluation.
///
/// # Returns
/// - `Ok(f64)`: The value of the expression, always finite.
/// - `Err(CalcError)`: The first lexical, syntax or arithmetic error, with
///   its position in `input`.
pub fn evaluate_with(input: &str, options: &Options) -> Result<f64, CalcError> {
    let mut parser = Parser::with_max_depth(input, options.max_depth);
    let expr = parser.parse()?;
    calc_eval(&expr)
}

/// Evaluates `input` and renders the result with [`format_number`].
pub fn evaluate_to_string(input: &str) -> Result<String, CalcError> {
    evaluate(input).map(format_number)
}

/// Computes the value of a parsed expression.
///
/// # Arguments
/// - `expr`: A tree produced by [`Parser::parse`].
///
/// # Returns
/// - `Ok(f64)`: The folded value.
/// - `Err(CalcError)`: `DivisionByZero` or `Overflow`, pointing at the
///   operator that produced it.
pub fn calc_eval(expr: &Expr) -> Result<f64, CalcError> {
    match expr {
        Expr::Number { value, .. } => Ok(*value),
        Expr::Negate(operand) => Ok(-calc_eval(operand)?),
        Expr::Chain { head, steps } => {
            let mut acc = calc_eval(head)?;
            for step in steps {
                let rhs = calc_eval(&step.rhs)?;
                acc = calc_apply(step.op, acc, rhs, step.at)?;
            }
            Ok(acc)
        }
    }
}

fn calc_apply(op: Op, lhs: f64, rhs: f64, at: SourceSpan) -> Result<f64, CalcError> {
    let result = match op {
        Op::Plus => add(lhs, rhs),
        Op::Minus => minus(lhs, rhs),
        Op::Star => mult(lhs, rhs),
        Op::Slash => div(lhs, rhs).ok_or_else(|| CalcError::DivisionByZero { at })?,
    };

    if result.is_finite() {
        Ok(result)
    } else {
        Err(CalcError::Overflow { at })
    }
}

/// Renders a value as plain decimal text: no exponent, no trailing `.0`,
/// and `0` rather than `-0`.
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    value.to_string()
}

fn add(a: f64, b: f64) -> f64 {
    a + b
}

fn minus(a: f64, b: f64) -> f64 {
    a - b
}

fn mult(a: f64, b: f64) -> f64 {
    a * b
}

fn div(a: f64, b: f64) -> Option<f64> {
    if b == 0.0 {
        None
    } else {
        Some(a / b)
    }
}
