//! Condition groups.
//!
//! Operands arrive already resolved: `None` for a side that is neither wired
//! to a value nor carries a literal. A condition with an unresolved side is
//! false.

use blockflow_core::{CmpOp, Condition, ConditionGroup, Connective};

pub fn compare(op: CmpOp, left: f64, right: f64) -> bool {
    match op {
        CmpOp::Eq => left == right,
        CmpOp::Ne => left != right,
        CmpOp::Gt => left > right,
        CmpOp::Lt => left < right,
        CmpOp::Ge => left >= right,
        CmpOp::Le => left <= right,
    }
}

/// Evaluates one comparison, treating an unresolved operand as false.
pub fn evaluate_condition(op: CmpOp, left: Option<f64>, right: Option<f64>) -> bool {
    match (left, right) {
        (Some(l), Some(r)) => compare(op, l, r),
        _ => false,
    }
}

/// Folds a group strictly left to right: `((c0 OP0 c1) OP1 c2) ...`.
///
/// `test` is only called for conditions whose value can still change the
/// accumulator. An empty group is false.
pub fn evaluate_group(group: &ConditionGroup, mut test: impl FnMut(&Condition) -> bool) -> bool {
    let conditions = group.conditions();
    let Some(first) = conditions.first() else {
        return false;
    };
    let mut acc = test(first);
    for (connective, condition) in group.connectives().iter().zip(&conditions[1..]) {
        acc = match (connective, acc) {
            (Connective::And, false) => false,
            (Connective::Or, true) => true,
            _ => test(condition),
        };
    }
    acc
}
