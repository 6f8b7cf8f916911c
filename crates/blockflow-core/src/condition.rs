//! Condition groups carried by if-nodes.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::id::ConditionId;
use crate::ops::{CmpOp, Connective};
use crate::port::InputPort;
use crate::value::Literal;

/// One comparison inside a condition group.
///
/// Each side is read from the edge wired into `left-<id>` / `right-<id>`
/// when present, otherwise from the literal stored here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub id: ConditionId,
    pub op: CmpOp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<Literal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<Literal>,
}

impl Condition {
    /// A condition whose both operands come from wired nodes.
    pub fn wired(id: u32, op: CmpOp) -> Self {
        Condition {
            id: ConditionId(id),
            op,
            left: None,
            right: None,
        }
    }

    pub fn left_port(&self) -> InputPort {
        InputPort::Left(self.id)
    }

    pub fn right_port(&self) -> InputPort {
        InputPort::Right(self.id)
    }
}

/// N conditions joined by N-1 connectives, folded strictly left to right
/// with no precedence: `((c0 OP0 c1) OP1 c2) ...`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "RawConditionGroup")]
pub struct ConditionGroup {
    conditions: Vec<Condition>,
    connectives: Vec<Connective>,
}

#[derive(Deserialize)]
struct RawConditionGroup {
    #[serde(default)]
    conditions: Vec<Condition>,
    #[serde(default)]
    connectives: Vec<Connective>,
}

impl TryFrom<RawConditionGroup> for ConditionGroup {
    type Error = CoreError;

    fn try_from(raw: RawConditionGroup) -> Result<Self, Self::Error> {
        ConditionGroup::new(raw.conditions, raw.connectives)
    }
}

impl ConditionGroup {
    /// Builds a group, requiring exactly one connective between each pair of
    /// consecutive conditions.
    pub fn new(
        conditions: Vec<Condition>,
        connectives: Vec<Connective>,
    ) -> Result<Self, CoreError> {
        if connectives.len() != conditions.len().saturating_sub(1) {
            return Err(CoreError::InvalidConditionGroup {
                conditions: conditions.len(),
                connectives: connectives.len(),
            });
        }
        Ok(ConditionGroup {
            conditions,
            connectives,
        })
    }

    /// A group holding a single condition.
    pub fn single(condition: Condition) -> Self {
        ConditionGroup {
            conditions: vec![condition],
            connectives: Vec::new(),
        }
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn connectives(&self) -> &[Connective] {
        &self.connectives
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}
