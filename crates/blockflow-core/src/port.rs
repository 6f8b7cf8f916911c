//! Named input and output ports.
//!
//! Ports distinguish which role an edge fulfills on its endpoints. They are
//! serialized as the handle strings the editor uses (`input1`, `intensity`,
//! `left-3`, `true`, ...); the unnamed port has no handle at all, which is
//! why edges store `Option<InputPort>` only at the snapshot boundary and
//! [`InputPort::Default`] inside the graph.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::CoreError;
use crate::id::ConditionId;

/// An input slot on the target side of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputPort {
    /// The single unnamed input of simple nodes.
    Default,
    /// First operand of a binary op (also accepted by unary ops).
    Input1,
    /// Second operand of a binary op.
    Input2,
    /// Upstream image of a filter.
    Image,
    /// Strength parameter of brightness, contrast and blur.
    Intensity,
    /// Execution gate of a print node.
    Flow,
    /// Printed value of a print node.
    Text,
    /// Left operand of the given condition.
    Left(ConditionId),
    /// Right operand of the given condition.
    Right(ConditionId),
}

/// An output slot on the source side of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputPort {
    /// The implicit output every node has.
    #[default]
    Default,
    /// Active when an if-node's condition group holds.
    True,
    /// Active when an if-node's condition group does not hold.
    False,
}

impl InputPort {
    /// Returns the handle string, or `None` for the unnamed port.
    pub fn handle(&self) -> Option<String> {
        match self {
            InputPort::Default => None,
            other => Some(other.to_string()),
        }
    }
}

impl fmt::Display for InputPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputPort::Default => write!(f, "default"),
            InputPort::Input1 => write!(f, "input1"),
            InputPort::Input2 => write!(f, "input2"),
            InputPort::Image => write!(f, "image"),
            InputPort::Intensity => write!(f, "intensity"),
            InputPort::Flow => write!(f, "flow"),
            InputPort::Text => write!(f, "text"),
            InputPort::Left(id) => write!(f, "left-{}", id),
            InputPort::Right(id) => write!(f, "right-{}", id),
        }
    }
}

impl FromStr for InputPort {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || CoreError::UnknownPort {
            handle: s.to_string(),
        };
        match s {
            "" | "default" => Ok(InputPort::Default),
            "input1" => Ok(InputPort::Input1),
            "input2" => Ok(InputPort::Input2),
            "image" => Ok(InputPort::Image),
            "intensity" => Ok(InputPort::Intensity),
            "flow" => Ok(InputPort::Flow),
            "text" => Ok(InputPort::Text),
            _ => {
                if let Some(rest) = s.strip_prefix("left-") {
                    rest.parse()
                        .map(|n| InputPort::Left(ConditionId(n)))
                        .map_err(|_| unknown())
                } else if let Some(rest) = s.strip_prefix("right-") {
                    rest.parse()
                        .map(|n| InputPort::Right(ConditionId(n)))
                        .map_err(|_| unknown())
                } else {
                    Err(unknown())
                }
            }
        }
    }
}

impl fmt::Display for OutputPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputPort::Default => write!(f, "default"),
            OutputPort::True => write!(f, "true"),
            OutputPort::False => write!(f, "false"),
        }
    }
}

impl FromStr for OutputPort {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "default" => Ok(OutputPort::Default),
            "true" => Ok(OutputPort::True),
            "false" => Ok(OutputPort::False),
            _ => Err(CoreError::UnknownPort {
                handle: s.to_string(),
            }),
        }
    }
}

// Ports travel as their handle strings.

impl Serialize for InputPort {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for InputPort {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

impl Serialize for OutputPort {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for OutputPort {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
