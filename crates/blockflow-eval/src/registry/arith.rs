//! Unary and binary arithmetic.

use blockflow_core::{BinaryOp, UnaryOp};

/// Applies a single-input operation.
pub fn apply_unary(op: UnaryOp, x: f64) -> Option<f64> {
    let result = match op {
        UnaryOp::Square => x * x,
        UnaryOp::Sqrt => x.sqrt(),
        UnaryOp::Abs => x.abs(),
        UnaryOp::Factorial => factorial(x),
        UnaryOp::Print => x,
    };
    Some(result)
}

/// Product of `2, 3, ..` while the factor is `<= x`.
///
/// Anything below 2 (including negatives and NaN) yields 1; non-integers
/// behave like their floor. Stops once the product overflows to infinity.
pub fn factorial(x: f64) -> f64 {
    let mut product = 1.0;
    let mut i = 2.0;
    while i <= x {
        product *= i;
        if product.is_infinite() {
            break;
        }
        i += 1.0;
    }
    product
}

/// Applies a two-input operation to `input1` and `input2`.
pub fn apply_binary(op: BinaryOp, a: f64, b: f64) -> Option<f64> {
    match op {
        BinaryOp::Add => Some(a + b),
        BinaryOp::Subtract => Some(a - b),
        BinaryOp::Multiply => Some(a * b),
        BinaryOp::Divide => {
            if b == 0.0 {
                None
            } else {
                Some(a / b)
            }
        }
        BinaryOp::Power => Some(a.powf(b)),
        // `%` on f64 truncates and yields NaN for a zero divisor.
        BinaryOp::Modulo => Some(a % b),
    }
}
