//! FlowGraph: the node/edge container the evaluator walks.
//!
//! [`FlowGraph`] wraps a petgraph `StableGraph<Node, FlowEdge>` and keeps an
//! insertion-ordered index from caller-chosen keys to [`NodeId`]s. All
//! mutations go through its methods so that the port invariant (at most one
//! edge per target input port) always holds. Read-only helpers cover the
//! lookups evaluation needs: node by id, edge into a port, edge source,
//! source nodes and downstream edges.
//!
//! Ordering is deterministic: [`FlowGraph::sources`] follows node insertion
//! order and edge listings follow edge id order.

use indexmap::IndexMap;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::stable_graph::StableGraph;
use petgraph::visit::EdgeRef;
use petgraph::{Directed, Direction};

use crate::edge::FlowEdge;
use crate::error::CoreError;
use crate::id::{EdgeId, NodeId};
use crate::image::ImageData;
use crate::node::{Node, NodeKind};
use crate::port::InputPort;
use crate::value::Literal;

/// One edge as seen from one of its endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeView {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    pub edge: FlowEdge,
}

/// The program graph: nodes, port-addressed edges and a key index.
#[derive(Debug, Clone, Default)]
pub struct FlowGraph {
    graph: StableGraph<Node, FlowEdge, Directed, u32>,
    keys: IndexMap<String, NodeId>,
}

impl FlowGraph {
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Nodes
    // -----------------------------------------------------------------------

    /// Adds a node under a unique key.
    pub fn add_node(
        &mut self,
        key: impl Into<String>,
        kind: NodeKind,
    ) -> Result<NodeId, CoreError> {
        let key = key.into();
        if self.keys.contains_key(&key) {
            return Err(CoreError::DuplicateNodeKey { key });
        }
        let id = NodeId::from(self.graph.add_node(Node::new(key.clone(), kind)));
        self.keys.insert(key, id);
        Ok(id)
    }

    /// Removes a node together with every edge touching it.
    pub fn remove_node(&mut self, id: NodeId) -> Result<Node, CoreError> {
        let node = self
            .graph
            .remove_node(id.into())
            .ok_or(CoreError::NodeNotFound { id })?;
        self.keys.shift_remove(&node.key);
        Ok(node)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.graph.node_weight(id.into())
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.graph.node_weight_mut(id.into())
    }

    /// Like [`node`](Self::node) but reports a missing id as an error.
    pub fn require(&self, id: NodeId) -> Result<&Node, CoreError> {
        self.node(id).ok_or(CoreError::NodeNotFound { id })
    }

    pub fn node_by_key(&self, key: &str) -> Option<NodeId> {
        self.keys.get(key).copied()
    }

    /// Like [`node_by_key`](Self::node_by_key) but reports an unknown key.
    pub fn require_key(&self, key: &str) -> Result<NodeId, CoreError> {
        self.node_by_key(key).ok_or_else(|| CoreError::UnknownNodeKey {
            key: key.to_string(),
        })
    }

    /// Node ids in insertion order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.keys.values().copied()
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        self.node_ids()
            .filter_map(move |id| self.node(id).map(|n| (id, n)))
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    // -----------------------------------------------------------------------
    // Edges
    // -----------------------------------------------------------------------

    /// Adds an edge after checking both endpoints, rejecting self-loops and
    /// rejecting a second edge into an already connected input port.
    pub fn add_edge(
        &mut self,
        from: NodeId,
        to: NodeId,
        edge: FlowEdge,
    ) -> Result<EdgeId, CoreError> {
        self.require(from)?;
        self.require(to)?;
        if from == to {
            return Err(CoreError::InvalidEdge {
                reason: format!("self-loop on node {}", from),
            });
        }
        if self.input(to, edge.target_port).is_some() {
            return Err(CoreError::PortOccupied {
                node: to,
                port: edge.target_port,
            });
        }
        let idx = self.graph.add_edge(from.into(), to.into(), edge);
        Ok(EdgeId::from(idx))
    }

    /// Convenience: connects the default output of `from` into `port` of `to`.
    pub fn connect(
        &mut self,
        from: NodeId,
        to: NodeId,
        port: InputPort,
    ) -> Result<EdgeId, CoreError> {
        self.add_edge(from, to, FlowEdge::into_port(port))
    }

    pub fn remove_edge(&mut self, id: EdgeId) -> Result<FlowEdge, CoreError> {
        self.graph
            .remove_edge(EdgeIndex::from(id))
            .ok_or(CoreError::EdgeNotFound { id })
    }

    /// Looks up an edge with its endpoints.
    pub fn edge(&self, id: EdgeId) -> Option<EdgeView> {
        let idx = EdgeIndex::from(id);
        let (source, target) = self.graph.edge_endpoints(idx)?;
        let edge = *self.graph.edge_weight(idx)?;
        Some(EdgeView {
            id,
            source: source.into(),
            target: target.into(),
            edge,
        })
    }

    /// Resolves the node an edge comes from.
    pub fn source_of(&self, id: EdgeId) -> Option<NodeId> {
        self.edge(id).map(|view| view.source)
    }

    /// Edges into `id`, optionally restricted to one port, in edge id order.
    pub fn incoming(&self, id: NodeId, port: Option<InputPort>) -> Vec<EdgeView> {
        self.edges(id, Direction::Incoming)
            .into_iter()
            .filter(|view| port.map_or(true, |p| view.edge.target_port == p))
            .collect()
    }

    /// The single edge wired into `port` of `id`, if any.
    pub fn input(&self, id: NodeId, port: InputPort) -> Option<EdgeView> {
        self.incoming(id, Some(port)).into_iter().next()
    }

    /// Edges leaving `id`, in edge id order.
    pub fn outgoing(&self, id: NodeId) -> Vec<EdgeView> {
        self.edges(id, Direction::Outgoing)
    }

    fn edges(&self, id: NodeId, dir: Direction) -> Vec<EdgeView> {
        let idx: NodeIndex<u32> = id.into();
        if self.graph.node_weight(idx).is_none() {
            return Vec::new();
        }
        let mut views: Vec<EdgeView> = self
            .graph
            .edges_directed(idx, dir)
            .map(|e| EdgeView {
                id: EdgeId::from(e.id()),
                source: e.source().into(),
                target: e.target().into(),
                edge: *e.weight(),
            })
            .collect();
        views.sort_by_key(|v| v.id);
        views
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// All edges in edge id order.
    pub fn edge_views(&self) -> Vec<EdgeView> {
        let mut views: Vec<EdgeView> = self
            .graph
            .edge_indices()
            .filter_map(|idx| self.edge(EdgeId::from(idx)))
            .collect();
        views.sort_by_key(|v| v.id);
        views
    }

    // -----------------------------------------------------------------------
    // Structure queries
    // -----------------------------------------------------------------------

    /// Nodes without incoming edges, in insertion order.
    pub fn sources(&self) -> Vec<NodeId> {
        self.node_ids()
            .filter(|&id| {
                self.graph
                    .edges_directed(id.into(), Direction::Incoming)
                    .next()
                    .is_none()
            })
            .collect()
    }

    /// Nodes without outgoing edges, in insertion order.
    pub fn sinks(&self) -> Vec<NodeId> {
        self.node_ids()
            .filter(|&id| {
                self.graph
                    .edges_directed(id.into(), Direction::Outgoing)
                    .next()
                    .is_none()
            })
            .collect()
    }

    /// Every group of two or more nodes that reach each other.
    ///
    /// Each cycle is sorted by node id and the list is sorted by its first
    /// node, so the result does not depend on petgraph's visit order.
    pub fn cycles(&self) -> Vec<Vec<NodeId>> {
        let mut cycles: Vec<Vec<NodeId>> = tarjan_scc(&self.graph)
            .into_iter()
            .filter(|scc| scc.len() > 1)
            .map(|scc| {
                let mut ids: Vec<NodeId> = scc.into_iter().map(NodeId::from).collect();
                ids.sort();
                ids
            })
            .collect();
        cycles.sort();
        cycles
    }

    /// Edges whose value no evaluation will ever read, in edge id order.
    ///
    /// That is an edge into a port its target's kind does not read (see
    /// [`NodeKind::input_ports`]), or an edge leaving a non-branching node
    /// through a `true`/`false` port. Both are accepted when wiring and read
    /// as missing during a run.
    pub fn unread_edges(&self) -> Vec<EdgeView> {
        self.edge_views()
            .into_iter()
            .filter(|view| {
                let read = self
                    .node(view.target)
                    .is_some_and(|n| n.kind.input_ports().contains(&view.edge.target_port));
                let branch_ok = !view.edge.is_branch()
                    || self.node(view.source).is_some_and(|n| n.kind.is_branching());
                !(read && branch_ok)
            })
            .collect()
    }

    // -----------------------------------------------------------------------
    // Payload edits (performed by the host before a run)
    // -----------------------------------------------------------------------

    /// Sets the literal of a variable node.
    pub fn set_literal(&mut self, id: NodeId, literal: Option<Literal>) -> Result<(), CoreError> {
        let node = self.node_mut(id).ok_or(CoreError::NodeNotFound { id })?;
        match &mut node.kind {
            NodeKind::Variable { value } => {
                *value = literal;
                Ok(())
            }
            other => Err(CoreError::KindMismatch {
                node: id,
                kind: other.name(),
                reason: "only variable nodes hold literals".into(),
            }),
        }
    }

    /// Attaches decoded file text to a file-source node.
    pub fn attach_file_content(&mut self, id: NodeId, text: String) -> Result<(), CoreError> {
        let node = self.node_mut(id).ok_or(CoreError::NodeNotFound { id })?;
        match &mut node.kind {
            NodeKind::FileSource { content } => {
                *content = Some(text);
                Ok(())
            }
            other => Err(CoreError::KindMismatch {
                node: id,
                kind: other.name(),
                reason: "only file-source nodes hold file content".into(),
            }),
        }
    }

    /// Attaches a decoded image to an image-source node.
    pub fn attach_image(&mut self, id: NodeId, img: ImageData) -> Result<(), CoreError> {
        let node = self.node_mut(id).ok_or(CoreError::NodeNotFound { id })?;
        match &mut node.kind {
            NodeKind::ImageSource { image } => {
                *image = Some(img);
                Ok(())
            }
            other => Err(CoreError::KindMismatch {
                node: id,
                kind: other.name(),
                reason: "only image-source nodes hold images".into(),
            }),
        }
    }

    /// Resets every node's run state (result, processed flag, output).
    pub fn clear_results(&mut self) {
        for node in self.graph.node_weights_mut() {
            node.reset();
        }
    }

    /// Drops all nodes and edges.
    pub fn clear(&mut self) {
        self.graph.clear();
        self.keys.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::{BinaryOp, ImageFilter};
    use crate::port::OutputPort;
    use crate::value::Value;

    fn var(graph: &mut FlowGraph, key: &str, n: f64) -> NodeId {
        graph
            .add_node(
                key,
                NodeKind::Variable {
                    value: Some(Literal::Number(n)),
                },
            )
            .unwrap()
    }

    #[test]
    fn lookup_by_key_and_id() {
        let mut graph = FlowGraph::new();
        let a = var(&mut graph, "a", 1.0);
        assert_eq!(graph.node_by_key("a"), Some(a));
        assert_eq!(graph.require(a).unwrap().key, "a");
        assert!(graph.require_key("zzz").is_err());
        assert!(matches!(
            graph.add_node("a", NodeKind::Print),
            Err(CoreError::DuplicateNodeKey { .. })
        ));
    }

    #[test]
    fn port_accepts_one_edge() {
        let mut graph = FlowGraph::new();
        let a = var(&mut graph, "a", 1.0);
        let b = var(&mut graph, "b", 2.0);
        let add = graph
            .add_node("add", NodeKind::Binary { op: BinaryOp::Add })
            .unwrap();

        graph.connect(a, add, InputPort::Input1).unwrap();
        let err = graph.connect(b, add, InputPort::Input1).unwrap_err();
        assert!(matches!(err, CoreError::PortOccupied { port: InputPort::Input1, .. }));
        graph.connect(b, add, InputPort::Input2).unwrap();

        let p = graph.add_node("p", NodeKind::Print).unwrap();
        graph.connect(add, p, InputPort::Default).unwrap();
        assert!(graph.connect(a, p, InputPort::Default).is_err());
    }

    #[test]
    fn rejects_self_loop_and_missing_nodes() {
        let mut graph = FlowGraph::new();
        let a = var(&mut graph, "a", 1.0);
        assert!(matches!(
            graph.connect(a, a, InputPort::Default),
            Err(CoreError::InvalidEdge { .. })
        ));
        assert!(matches!(
            graph.connect(a, NodeId(40), InputPort::Default),
            Err(CoreError::NodeNotFound { .. })
        ));
    }

    #[test]
    fn sources_sinks_and_inputs() {
        let mut graph = FlowGraph::new();
        let a = var(&mut graph, "a", 1.0);
        let b = var(&mut graph, "b", 2.0);
        let add = graph
            .add_node("add", NodeKind::Binary { op: BinaryOp::Add })
            .unwrap();
        let e1 = graph.connect(a, add, InputPort::Input1).unwrap();
        graph.connect(b, add, InputPort::Input2).unwrap();

        assert_eq!(graph.sources(), vec![a, b]);
        assert_eq!(graph.sinks(), vec![add]);
        assert_eq!(graph.input(add, InputPort::Input1).unwrap().source, a);
        assert!(graph.input(add, InputPort::Intensity).is_none());
        assert_eq!(graph.incoming(add, None).len(), 2);
        assert_eq!(graph.source_of(e1), Some(a));
        assert_eq!(graph.outgoing(a).len(), 1);
    }

    #[test]
    fn remove_node_drops_edges_and_key() {
        let mut graph = FlowGraph::new();
        let a = var(&mut graph, "a", 1.0);
        let p = graph.add_node("p", NodeKind::Print).unwrap();
        graph.connect(a, p, InputPort::Text).unwrap();

        let removed = graph.remove_node(a).unwrap();
        assert_eq!(removed.key, "a");
        assert_eq!(graph.edge_count(), 0);
        assert!(graph.node_by_key("a").is_none());
        assert_eq!(graph.sources(), vec![p]);
    }

    #[test]
    fn cycles_are_reported_once() {
        let mut graph = FlowGraph::new();
        let a = graph.add_node("a", NodeKind::Binary { op: BinaryOp::Add }).unwrap();
        let b = graph.add_node("b", NodeKind::Binary { op: BinaryOp::Add }).unwrap();
        let c = var(&mut graph, "c", 1.0);
        graph.connect(a, b, InputPort::Input1).unwrap();
        graph.connect(b, a, InputPort::Input1).unwrap();
        graph.connect(c, a, InputPort::Input2).unwrap();

        assert_eq!(graph.cycles(), vec![vec![a, b]]);
    }

    #[test]
    fn unread_edges_lists_ignored_wiring() {
        let mut graph = FlowGraph::new();
        let a = var(&mut graph, "a", 1.0);
        let b = var(&mut graph, "b", 2.0);
        let mul = graph
            .add_node(
                "mul",
                NodeKind::Binary {
                    op: BinaryOp::Multiply,
                },
            )
            .unwrap();
        let p = graph.add_node("p", NodeKind::Print).unwrap();
        graph.connect(a, mul, InputPort::Input1).unwrap();
        let stray = graph.connect(b, mul, InputPort::Default).unwrap();
        let fake_branch = graph
            .add_edge(mul, p, FlowEdge::new(OutputPort::True, InputPort::Flow))
            .unwrap();

        let ids: Vec<EdgeId> = graph.unread_edges().iter().map(|v| v.id).collect();
        assert_eq!(ids, vec![stray, fake_branch]);
    }

    #[test]
    fn payload_edits_check_kind() {
        let mut graph = FlowGraph::new();
        let a = var(&mut graph, "a", 1.0);
        let img = graph.add_node("img", NodeKind::ImageSource { image: None }).unwrap();
        let file = graph.add_node("file", NodeKind::FileSource { content: None }).unwrap();

        graph.set_literal(a, Some(Literal::Number(9.0))).unwrap();
        graph.attach_file_content(file, "hello".into()).unwrap();
        graph.attach_image(img, ImageData::filled(1, 1, [1, 2, 3, 4])).unwrap();
        assert!(graph.node(img).unwrap().image_data().is_some());

        assert!(matches!(
            graph.attach_image(a, ImageData::filled(1, 1, [0; 4])),
            Err(CoreError::KindMismatch { kind: "variable", .. })
        ));
        let filter = graph.add_node("g", NodeKind::Filter(ImageFilter::Grayscale)).unwrap();
        assert!(graph.set_literal(filter, None).is_err());
    }

    #[test]
    fn clear_results_keeps_structure() {
        let mut graph = FlowGraph::new();
        let a = var(&mut graph, "a", 1.0);
        let p = graph.add_node("p", NodeKind::Print).unwrap();
        graph
            .add_edge(a, p, FlowEdge::new(OutputPort::Default, InputPort::Text))
            .unwrap();
        graph
            .node_mut(a)
            .unwrap()
            .store(Some(Value::Number(1.0)), &["Value: 1".into()]);

        graph.clear_results();
        assert!(!graph.node(a).unwrap().state.processed);
        assert_eq!(graph.edge_count(), 1);

        graph.clear();
        assert!(graph.is_empty());
        assert!(graph.node_by_key("a").is_none());
    }
}
