//! Nodes of the flow graph.
//!
//! A [`Node`] pairs a closed [`NodeKind`] (what the block does, with only the
//! payload that kind needs) with [`NodeState`] (what the last run wrote onto
//! it). The evaluator reads kinds and writes states; users edit kinds.

use serde::{Deserialize, Serialize};
use smallvec::{smallvec, SmallVec};

use crate::condition::ConditionGroup;
use crate::image::ImageData;
use crate::ops::{BinaryOp, ImageFilter, UnaryOp};
use crate::port::InputPort;
use crate::value::{Literal, Value};

/// The operation a node performs, with its kind-specific payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum NodeKind {
    /// A user-entered literal.
    Variable {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<Literal>,
    },
    Unary { op: UnaryOp },
    Binary { op: BinaryOp },
    /// Evaluates a condition group and routes to its `true`/`false` outputs.
    If {
        #[serde(default)]
        group: ConditionGroup,
    },
    /// Echoes its input to the console.
    Print,
    /// Text decoded from a file by the host.
    FileSource {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content: Option<String>,
    },
    /// An image decoded by the host.
    ImageSource {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        image: Option<ImageData>,
    },
    Filter(ImageFilter),
}

impl NodeKind {
    /// Short kind name, used in traces and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Variable { .. } => "variable",
            NodeKind::Unary { .. } => "unary",
            NodeKind::Binary { .. } => "binary",
            NodeKind::If { .. } => "if",
            NodeKind::Print => "print",
            NodeKind::FileSource { .. } => "file-source",
            NodeKind::ImageSource { .. } => "image-source",
            NodeKind::Filter(_) => "filter",
        }
    }

    /// The input ports this kind reads. Edges into any other port are
    /// accepted by the graph but never consulted; see
    /// [`FlowGraph::unread_edges`](crate::graph::FlowGraph::unread_edges).
    pub fn input_ports(&self) -> SmallVec<[InputPort; 4]> {
        match self {
            NodeKind::Variable { .. }
            | NodeKind::FileSource { .. }
            | NodeKind::ImageSource { .. } => SmallVec::new(),
            NodeKind::Unary { .. } => smallvec![InputPort::Input1, InputPort::Default],
            NodeKind::Binary { .. } => smallvec![InputPort::Input1, InputPort::Input2],
            NodeKind::If { group } => group
                .conditions()
                .iter()
                .flat_map(|c| [c.left_port(), c.right_port()])
                .collect(),
            NodeKind::Print => smallvec![InputPort::Flow, InputPort::Text, InputPort::Default],
            NodeKind::Filter(filter) => {
                let mut ports: SmallVec<[InputPort; 4]> =
                    smallvec![InputPort::Image, InputPort::Default];
                if filter.takes_intensity() {
                    ports.push(InputPort::Intensity);
                }
                ports
            }
        }
    }

    /// Returns `true` if this kind exposes `true`/`false` output ports.
    pub fn is_branching(&self) -> bool {
        matches!(self, NodeKind::If { .. })
    }
}

/// Per-node state written by the last run.
///
/// `result` is a single slot, so a node holds either a scalar/text result or
/// image data, never both.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NodeState {
    pub result: Option<Value>,
    pub processed: bool,
    /// Trace lines emitted by the node, joined with newlines.
    pub output: String,
}

/// A vertex in the flow graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Caller-chosen identifier, unique within the graph.
    pub key: String,
    pub kind: NodeKind,
    #[serde(default)]
    pub state: NodeState,
}

impl Node {
    pub fn new(key: impl Into<String>, kind: NodeKind) -> Self {
        Node {
            key: key.into(),
            kind,
            state: NodeState::default(),
        }
    }

    /// Last numeric result, if the node holds one.
    pub fn result(&self) -> Option<f64> {
        match &self.state.result {
            Some(Value::Number(n)) => Some(*n),
            _ => None,
        }
    }

    /// Image data produced (or held) by the node.
    ///
    /// Image sources expose the attached image; filters expose their output.
    pub fn image_data(&self) -> Option<&ImageData> {
        match (&self.state.result, &self.kind) {
            (Some(Value::Image(img)), _) => Some(img),
            (None, NodeKind::ImageSource { image }) => image.as_ref(),
            _ => None,
        }
    }

    /// Stores a run result, replacing whatever the node held before.
    pub fn store(&mut self, result: Option<Value>, lines: &[String]) {
        self.state.result = result;
        self.state.processed = true;
        self.state.output = lines.join("\n");
    }

    /// Forgets everything the last run wrote.
    pub fn reset(&mut self) {
        self.state = NodeState::default();
    }
}
