//! Operation registry: the semantics behind unary, binary and conditional
//! nodes.
//!
//! Every function here is pure and works on already-resolved numbers. A
//! `None` result means "not computable"; the evaluator turns it into a
//! missing value without emitting a console line. Domain problems other than
//! division by zero surface as NaN and propagate.

pub mod arith;
pub mod condition;

pub use arith::{apply_binary, apply_unary, factorial};
pub use condition::{compare, evaluate_condition, evaluate_group};
