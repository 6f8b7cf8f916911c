//! Stable ID newtypes for graph entities.
//!
//! IDs are distinct newtype wrappers over `u32` so that a `NodeId` cannot be
//! used where an `EdgeId` is expected. Both bridge to petgraph indices.

use std::fmt;

use petgraph::graph::{EdgeIndex, NodeIndex};
use serde::{Deserialize, Serialize};

/// Stable node identifier. Maps to a petgraph `NodeIndex<u32>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

/// Stable edge identifier. Maps to a petgraph `EdgeIndex<u32>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeId(pub u32);

/// Identifier of a single condition inside an if-node's condition group.
///
/// Only unique within its group; it names the `left-<id>` / `right-<id>`
/// input ports of the owning node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConditionId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ConditionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// Bridges between the newtypes and petgraph's indices.

impl From<NodeIndex<u32>> for NodeId {
    fn from(idx: NodeIndex<u32>) -> Self {
        NodeId(idx.index() as u32)
    }
}

impl From<NodeId> for NodeIndex<u32> {
    fn from(id: NodeId) -> Self {
        NodeIndex::new(id.0 as usize)
    }
}

impl From<EdgeIndex<u32>> for EdgeId {
    fn from(idx: EdgeIndex<u32>) -> Self {
        EdgeId(idx.index() as u32)
    }
}

impl From<EdgeId> for EdgeIndex<u32> {
    fn from(id: EdgeId) -> Self {
        EdgeIndex::new(id.0 as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_id_to_node_index_roundtrip() {
        let idx = NodeIndex::<u32>::new(42);
        let node_id = NodeId::from(idx);
        assert_eq!(node_id.0, 42);

        let back: NodeIndex<u32> = node_id.into();
        assert_eq!(back.index(), 42);
    }

    #[test]
    fn edge_id_to_edge_index_roundtrip() {
        let idx = EdgeIndex::<u32>::new(9);
        let edge_id = EdgeId::from(idx);
        let back: EdgeIndex<u32> = edge_id.into();
        assert_eq!(back.index(), 9);
    }

    #[test]
    fn ids_display_inner_value() {
        assert_eq!(format!("{}", NodeId(7)), "7");
        assert_eq!(format!("{}", EdgeId(99)), "99");
        assert_eq!(format!("{}", ConditionId(3)), "3");
    }
}
