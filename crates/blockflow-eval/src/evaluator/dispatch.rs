//! Per-kind node evaluation.
//!
//! Each arm reads the node's inputs through [`Evaluator::resolve_input`] /
//! [`Evaluator::numeric`], hands the numbers to the operation registry or the
//! pixel kernels and returns the node's value plus its console lines.
//! Missing inputs produce no value and no lines.

use blockflow_core::{
    format_number, ConditionGroup, ImageFilter, InputPort, Literal, NodeId, NodeKind, UnaryOp,
    Value,
};

use super::error::EvalError;
use super::state::{Evaluated, Evaluator};
use crate::registry;

/// Short operation description used in trace entries.
pub(super) fn describe(kind: &NodeKind) -> String {
    match kind {
        NodeKind::Unary { op } => format!("unary {}", op.name()),
        NodeKind::Binary { op } => format!("binary {}", op.name()),
        NodeKind::Filter(filter) => format!("filter {}", filter.name()),
        NodeKind::If { group } => format!("if ({} conditions)", group.conditions().len()),
        other => other.name().to_string(),
    }
}

impl<'g> Evaluator<'g> {
    pub(super) fn dispatch(&mut self, node: NodeId) -> Result<Evaluated, EvalError> {
        let graph = self.graph;
        let Some(n) = graph.node(node) else {
            return Ok(Evaluated::default());
        };
        match &n.kind {
            NodeKind::Variable { value } => Ok(eval_variable(value.as_ref())),
            NodeKind::Unary { op } => self.eval_unary(node, *op),
            NodeKind::Binary { op } => {
                let mut inputs = Vec::new();
                let a = self.numeric(node, InputPort::Input1, &mut inputs)?;
                let b = self.numeric(node, InputPort::Input2, &mut inputs)?;
                let value = a
                    .zip(b)
                    .and_then(|(a, b)| registry::apply_binary(*op, a, b));
                Ok(number_result(value, inputs))
            }
            NodeKind::If { group } => self.eval_if(node, group),
            NodeKind::Print => self.eval_print(node),
            NodeKind::FileSource { content } => Ok(Evaluated {
                value: content.clone().map(Value::Text),
                ..Evaluated::default()
            }),
            NodeKind::ImageSource { image } => Ok(Evaluated {
                value: image.clone().map(Value::Image),
                ..Evaluated::default()
            }),
            NodeKind::Filter(filter) => self.eval_filter(node, *filter),
        }
    }

    fn eval_unary(&mut self, node: NodeId, op: UnaryOp) -> Result<Evaluated, EvalError> {
        let port = if self.is_wired(node, InputPort::Input1) {
            InputPort::Input1
        } else {
            InputPort::Default
        };
        let mut inputs = Vec::new();
        let value = self
            .numeric(node, port, &mut inputs)?
            .and_then(|x| registry::apply_unary(op, x));
        Ok(number_result(value, inputs))
    }

    fn eval_if(&mut self, node: NodeId, group: &ConditionGroup) -> Result<Evaluated, EvalError> {
        let mut inputs = Vec::new();
        let mut operands = Vec::with_capacity(group.conditions().len());
        for condition in group.conditions() {
            let left =
                self.operand(node, condition.left_port(), condition.left.as_ref(), &mut inputs)?;
            let right =
                self.operand(node, condition.right_port(), condition.right.as_ref(), &mut inputs)?;
            operands.push((condition.id, left, right));
        }

        let holds = registry::evaluate_group(group, |condition| {
            operands
                .iter()
                .find(|(id, _, _)| *id == condition.id)
                .is_some_and(|&(_, l, r)| registry::evaluate_condition(condition.op, l, r))
        });
        Ok(Evaluated {
            value: Some(Value::Number(if holds { 1.0 } else { 0.0 })),
            lines: Vec::new(),
            inputs,
        })
    }

    /// One side of a condition: the wired value if an edge exists, otherwise
    /// the stored literal.
    fn operand(
        &mut self,
        node: NodeId,
        port: InputPort,
        literal: Option<&Literal>,
        inputs: &mut Vec<(InputPort, f64)>,
    ) -> Result<Option<f64>, EvalError> {
        if self.is_wired(node, port) {
            self.numeric(node, port, inputs)
        } else {
            Ok(literal.and_then(Literal::as_number))
        }
    }

    fn eval_print(&mut self, node: NodeId) -> Result<Evaluated, EvalError> {
        let mut gate = None;
        if self.is_wired(node, InputPort::Flow) {
            gate = self.resolve_input(node, InputPort::Flow)?;
            if gate.is_none() {
                return Ok(Evaluated::default());
            }
        }

        let printed = if self.is_wired(node, InputPort::Text) {
            self.resolve_input(node, InputPort::Text)?
        } else if gate.is_some() {
            gate
        } else {
            self.resolve_input(node, InputPort::Default)?
        };

        let mut inputs = Vec::new();
        let value = match printed {
            Some(Value::Number(n)) => {
                inputs.push((InputPort::Default, n));
                registry::apply_unary(UnaryOp::Print, n).map(Value::Number)
            }
            other => other,
        };
        let lines = value
            .iter()
            .map(|v| format!("Output: {}", v))
            .collect();
        Ok(Evaluated {
            value,
            lines,
            inputs,
        })
    }

    fn eval_filter(&mut self, node: NodeId, filter: ImageFilter) -> Result<Evaluated, EvalError> {
        let port = if self.is_wired(node, InputPort::Image) {
            InputPort::Image
        } else {
            InputPort::Default
        };
        let source = self.resolve_input(node, port)?;

        let mut inputs = Vec::new();
        let mut intensity = None;
        if filter.takes_intensity() && self.is_wired(node, InputPort::Intensity) {
            match self.numeric(node, InputPort::Intensity, &mut inputs)? {
                Some(v) => intensity = Some(v),
                None => return Ok(Evaluated::default()),
            }
        }

        let Some(image) = source.as_ref().and_then(Value::as_image) else {
            return Ok(Evaluated::default());
        };
        let output = blockflow_kernels::apply(filter, image, intensity.unwrap_or(0.0));

        let mut lines = vec![format!("Operation: {}", filter.name())];
        if let Some(v) = intensity {
            lines.push(format!("Intensity: {}", format_number(v)));
        }
        Ok(Evaluated {
            value: Some(Value::Image(output)),
            lines,
            inputs,
        })
    }
}

fn eval_variable(literal: Option<&Literal>) -> Evaluated {
    let value = literal.map(Value::from_literal);
    let lines = value.iter().map(|v| format!("Value: {}", v)).collect();
    Evaluated {
        value,
        lines,
        inputs: Vec::new(),
    }
}

fn number_result(value: Option<f64>, inputs: Vec<(InputPort, f64)>) -> Evaluated {
    let lines = value
        .iter()
        .map(|v| format!("Result: {}", format_number(*v)))
        .collect();
    Evaluated {
        value: value.map(Value::Number),
        lines,
        inputs,
    }
}
