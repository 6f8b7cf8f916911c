//! Graph evaluator: memoized, depth-first resolution of a flow graph.
//!
//! # Architecture
//!
//! - [`Evaluator`] borrows a [`FlowGraph`](blockflow_core::FlowGraph) for
//!   one run. It walks downstream from every source node and resolves each
//!   reached node by first resolving the inputs that node reads.
//! - [`Visit`] tracks each node through
//!   `Unvisited -> InProgress -> (Done | Failed)`. Finished values are
//!   memoized, so a node's operation runs at most once per run no matter how
//!   many consumers it has.
//! - [`EvalError`] covers structural problems only (cycles, depth limit).
//!   Missing inputs and uncomputable operations simply produce no value.
//! - [`RunReport`] collects the console transcript, per-node outcomes in
//!   completion order, errors, and optional [`TraceEntry`] records.
//! - [`NodeSink`] is the write-back seam: the report stores results on the
//!   host's node state after the walk.
//!
//! # Usage
//!
//! ```ignore
//! let report = Evaluator::new(&graph, EvaluatorConfig::default()).run();
//! for line in &report.transcript {
//!     println!("{}", line);
//! }
//! report.write_back(&mut graph);
//! ```

mod dispatch;
pub mod error;
pub mod state;
pub mod trace;

pub use error::EvalError;
pub use state::{Evaluator, EvaluatorConfig, NodeOutcome, NodeSink, RunReport, Visit};
pub use trace::TraceEntry;

#[cfg(test)]
mod tests {
    use super::*;
    use blockflow_core::*;

    fn run(graph: &FlowGraph) -> RunReport {
        Evaluator::new(graph, EvaluatorConfig::default()).run()
    }

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

    fn unary(graph: &mut FlowGraph, key: &str, op: UnaryOp) -> NodeId {
        graph.add_node(key, NodeKind::Unary { op }).unwrap()
    }

    // -----------------------------------------------------------------------
    // 1. Straight chain: variable -> unary -> print
    // -----------------------------------------------------------------------

    #[test]
    fn chain_emits_lines_in_completion_order() {
        let mut graph = FlowGraph::new();
        let x = var(&mut graph, "x", 4.0);
        let sq = unary(&mut graph, "sq", UnaryOp::Square);
        let out = graph.add_node("out", NodeKind::Print).unwrap();
        graph.connect(x, sq, InputPort::Input1).unwrap();
        graph.connect(sq, out, InputPort::Default).unwrap();

        let report = run(&graph);
        assert!(report.is_clean());
        assert_eq!(report.transcript, vec!["Value: 4", "Result: 16", "Output: 16"]);
        assert_eq!(report.number(out), Some(16.0));
        let order: Vec<NodeId> = report.outcomes.iter().map(|o| o.node).collect();
        assert_eq!(order, vec![x, sq, out]);
    }

    // -----------------------------------------------------------------------
    // 2. Unary reads `input1`, falling back to the unnamed port
    // -----------------------------------------------------------------------

    #[test]
    fn unary_falls_back_to_default_port() {
        let mut graph = FlowGraph::new();
        let x = var(&mut graph, "x", -3.0);
        let abs = unary(&mut graph, "abs", UnaryOp::Abs);
        graph.connect(x, abs, InputPort::Default).unwrap();

        let report = run(&graph);
        assert_eq!(report.number(abs), Some(3.0));
    }

    #[test]
    fn unwired_unary_produces_nothing() {
        let mut graph = FlowGraph::new();
        let sqrt = unary(&mut graph, "sqrt", UnaryOp::Sqrt);
        let report = run(&graph);
        let outcome = report.outcome(sqrt).unwrap();
        assert_eq!(outcome.value, None);
        assert!(outcome.lines.is_empty());
        assert!(report.transcript.is_empty());
    }

    #[test]
    fn binary_with_one_named_operand_produces_nothing() {
        let mut graph = FlowGraph::new();
        let a = var(&mut graph, "a", 4.0);
        let add = graph
            .add_node("add", NodeKind::Binary { op: BinaryOp::Add })
            .unwrap();
        graph.connect(a, add, InputPort::Input1).unwrap();

        let report = run(&graph);
        assert!(report.is_clean());
        assert_eq!(report.number(add), None);
        assert!(report.outcome(add).unwrap().lines.is_empty());
        assert_eq!(report.transcript, vec!["Value: 4"]);

        // The unnamed port never stands in for `input2`.
        let b = var(&mut graph, "b", 6.0);
        graph.connect(b, add, InputPort::Default).unwrap();
        let report = run(&graph);
        assert_eq!(report.number(add), None);
        assert_eq!(report.transcript, vec!["Value: 4", "Value: 6"]);
    }

    #[test]
    fn edges_into_unread_ports_change_nothing() {
        let all_ports = [
            InputPort::Default,
            InputPort::Input1,
            InputPort::Input2,
            InputPort::Flow,
            InputPort::Text,
            InputPort::Image,
            InputPort::Intensity,
            InputPort::Left(ConditionId(0)),
            InputPort::Right(ConditionId(0)),
        ];
        let group = ConditionGroup::single(Condition::wired(0, CmpOp::Gt));
        let kinds = [
            NodeKind::Unary {
                op: UnaryOp::Square,
            },
            NodeKind::Binary {
                op: BinaryOp::Multiply,
            },
            NodeKind::Print,
            NodeKind::If { group },
            NodeKind::Filter(ImageFilter::Grayscale),
            NodeKind::Filter(ImageFilter::Brightness),
        ];

        for kind in kinds {
            let read = kind.input_ports();
            let mut graph = FlowGraph::new();
            let n = graph.add_node("n", kind).unwrap();
            for (i, port) in read.iter().enumerate() {
                let v = var(&mut graph, &format!("r{}", i), 3.0 + i as f64);
                graph.connect(v, n, *port).unwrap();
            }
            let before = run(&graph).outcome(n).cloned();

            for (i, port) in all_ports.iter().filter(|p| !read.contains(p)).enumerate() {
                let v = var(&mut graph, &format!("x{}", i), 100.0 + i as f64);
                graph.connect(v, n, *port).unwrap();
            }
            assert_eq!(graph.unread_edges().len(), all_ports.len() - read.len());
            let after = run(&graph).outcome(n).cloned();
            assert_eq!(before, after, "{:?}", graph.node(n).map(|node| &node.kind));
        }
    }

    // -----------------------------------------------------------------------
    // 3. Text operands
    // -----------------------------------------------------------------------

    #[test]
    fn numeric_text_is_a_number_other_text_is_not() {
        let mut graph = FlowGraph::new();
        let good = graph
            .add_node(
                "good",
                NodeKind::FileSource {
                    content: Some(" 12 ".into()),
                },
            )
            .unwrap();
        let bad = graph
            .add_node(
                "bad",
                NodeKind::FileSource {
                    content: Some("twelve".into()),
                },
            )
            .unwrap();
        let a = unary(&mut graph, "a", UnaryOp::Square);
        let b = unary(&mut graph, "b", UnaryOp::Square);
        graph.connect(good, a, InputPort::Input1).unwrap();
        graph.connect(bad, b, InputPort::Input1).unwrap();

        let report = run(&graph);
        assert_eq!(report.number(a), Some(144.0));
        assert_eq!(report.number(b), None);
    }

    // -----------------------------------------------------------------------
    // 4. Print input priority and flow gating
    // -----------------------------------------------------------------------

    #[test]
    fn print_prefers_text_over_flow() {
        let mut graph = FlowGraph::new();
        let gate = var(&mut graph, "gate", 1.0);
        let file = graph
            .add_node(
                "file",
                NodeKind::FileSource {
                    content: Some("hello".into()),
                },
            )
            .unwrap();
        let out = graph.add_node("out", NodeKind::Print).unwrap();
        graph.connect(gate, out, InputPort::Flow).unwrap();
        graph.connect(file, out, InputPort::Text).unwrap();

        let report = run(&graph);
        assert_eq!(report.outcome(out).unwrap().lines, vec!["Output: hello"]);
    }

    #[test]
    fn print_with_unresolved_flow_does_nothing() {
        let mut graph = FlowGraph::new();
        let empty = graph.add_node("empty", NodeKind::Variable { value: None }).unwrap();
        let text = var(&mut graph, "text", 5.0);
        let out = graph.add_node("out", NodeKind::Print).unwrap();
        graph.connect(empty, out, InputPort::Flow).unwrap();
        graph.connect(text, out, InputPort::Text).unwrap();

        let report = run(&graph);
        assert_eq!(report.outcome(out).unwrap().value, None);
        assert_eq!(report.transcript, vec!["Value: 5"]);
    }

    // -----------------------------------------------------------------------
    // 5. If-node routing
    // -----------------------------------------------------------------------

    #[test]
    fn active_branch_carries_if_result() {
        let mut graph = FlowGraph::new();
        let x = var(&mut graph, "x", 7.0);
        let cond = Condition {
            id: ConditionId(0),
            op: CmpOp::Gt,
            left: None,
            right: Some(Literal::Number(5.0)),
        };
        let gate = graph
            .add_node(
                "gate",
                NodeKind::If {
                    group: ConditionGroup::single(cond),
                },
            )
            .unwrap();
        let yes = graph.add_node("yes", NodeKind::Print).unwrap();
        let no = graph.add_node("no", NodeKind::Print).unwrap();
        graph.connect(x, gate, InputPort::Left(ConditionId(0))).unwrap();
        graph
            .add_edge(gate, yes, FlowEdge::new(OutputPort::True, InputPort::Flow))
            .unwrap();
        graph
            .add_edge(gate, no, FlowEdge::new(OutputPort::False, InputPort::Flow))
            .unwrap();

        let report = run(&graph);
        assert_eq!(report.number(gate), Some(1.0));
        assert_eq!(report.outcome(yes).unwrap().lines, vec!["Output: 1"]);
        assert!(report.outcome(no).unwrap().lines.is_empty());
        // if-nodes emit no line of their own
        assert!(report.outcome(gate).unwrap().lines.is_empty());
    }

    #[test]
    fn wired_but_missing_operand_does_not_fall_back_to_literal() {
        let mut graph = FlowGraph::new();
        let empty = graph.add_node("empty", NodeKind::Variable { value: None }).unwrap();
        let cond = Condition {
            id: ConditionId(3),
            op: CmpOp::Eq,
            left: Some(Literal::Number(1.0)),
            right: Some(Literal::Number(1.0)),
        };
        let gate = graph
            .add_node(
                "gate",
                NodeKind::If {
                    group: ConditionGroup::single(cond),
                },
            )
            .unwrap();
        let report = run(&graph);
        assert_eq!(report.number(gate), Some(1.0));

        graph.connect(empty, gate, InputPort::Left(ConditionId(3))).unwrap();
        let report = run(&graph);
        assert_eq!(report.number(gate), Some(0.0));
    }

    // -----------------------------------------------------------------------
    // 6. Filters and intensity
    // -----------------------------------------------------------------------

    #[test]
    fn unwired_intensity_means_zero_without_line() {
        let mut graph = FlowGraph::new();
        let img = graph
            .add_node(
                "img",
                NodeKind::ImageSource {
                    image: Some(ImageData::filled(2, 2, [10, 20, 30, 40])),
                },
            )
            .unwrap();
        let bright = graph.add_node("bright", NodeKind::Filter(ImageFilter::Brightness)).unwrap();
        graph.connect(img, bright, InputPort::Image).unwrap();

        let report = run(&graph);
        let outcome = report.outcome(bright).unwrap();
        assert_eq!(outcome.lines, vec!["Operation: brightness"]);
        assert_eq!(
            outcome.value.as_ref().and_then(Value::as_image),
            Some(&ImageData::filled(2, 2, [10, 20, 30, 40]))
        );
    }

    #[test]
    fn unresolved_intensity_is_not_computable() {
        let mut graph = FlowGraph::new();
        let img = graph
            .add_node(
                "img",
                NodeKind::ImageSource {
                    image: Some(ImageData::filled(1, 1, [0; 4])),
                },
            )
            .unwrap();
        let level = graph.add_node("level", NodeKind::Variable { value: None }).unwrap();
        let blur = graph.add_node("blur", NodeKind::Filter(ImageFilter::Blur)).unwrap();
        graph.connect(img, blur, InputPort::Default).unwrap();
        graph.connect(level, blur, InputPort::Intensity).unwrap();

        let report = run(&graph);
        let outcome = report.outcome(blur).unwrap();
        assert_eq!(outcome.value, None);
        assert!(outcome.lines.is_empty());
    }

    #[test]
    fn wired_intensity_is_reported() {
        let mut graph = FlowGraph::new();
        let img = graph
            .add_node(
                "img",
                NodeKind::ImageSource {
                    image: Some(ImageData::filled(1, 1, [100; 4])),
                },
            )
            .unwrap();
        let level = var(&mut graph, "level", 50.0);
        let contrast = graph.add_node("c", NodeKind::Filter(ImageFilter::Contrast)).unwrap();
        graph.connect(img, contrast, InputPort::Image).unwrap();
        graph.connect(level, contrast, InputPort::Intensity).unwrap();

        let report = run(&graph);
        assert_eq!(
            report.outcome(contrast).unwrap().lines,
            vec!["Operation: contrast", "Intensity: 50"]
        );
    }

    // -----------------------------------------------------------------------
    // 7. Structural errors
    // -----------------------------------------------------------------------

    #[test]
    fn cycle_found_during_resolution_is_reported_once() {
        let mut graph = FlowGraph::new();
        let a = var(&mut graph, "a", 1.0);
        let b = graph.add_node("b", NodeKind::Binary { op: BinaryOp::Add }).unwrap();
        let c = unary(&mut graph, "c", UnaryOp::Abs);
        graph.connect(a, b, InputPort::Input1).unwrap();
        graph.connect(c, b, InputPort::Input2).unwrap();
        graph.connect(b, c, InputPort::Input1).unwrap();

        let report = run(&graph);
        assert_eq!(report.errors, vec![EvalError::Cycle { nodes: vec![b, c] }]);
        assert!(report.outcome(b).is_none());
        assert!(report.outcome(c).is_none());
        assert_eq!(report.transcript, vec!["Value: 1"]);
    }

    #[test]
    fn unreachable_cycle_is_found_by_scan() {
        let mut graph = FlowGraph::new();
        let p = unary(&mut graph, "p", UnaryOp::Abs);
        let q = unary(&mut graph, "q", UnaryOp::Abs);
        graph.connect(p, q, InputPort::Input1).unwrap();
        graph.connect(q, p, InputPort::Input1).unwrap();

        let report = run(&graph);
        assert_eq!(report.errors, vec![EvalError::Cycle { nodes: vec![p, q] }]);
        assert!(report.outcomes.is_empty());
    }

    #[test]
    fn depth_limit_stops_deep_pulls() {
        let mut graph = FlowGraph::new();
        let w = var(&mut graph, "w", 1.0);
        let add = graph.add_node("add", NodeKind::Binary { op: BinaryOp::Add }).unwrap();
        graph.connect(w, add, InputPort::Input2).unwrap();
        let mut prev = var(&mut graph, "v", 1.0);
        for i in 0..10 {
            let next = unary(&mut graph, &format!("u{}", i), UnaryOp::Print);
            graph.connect(prev, next, InputPort::Input1).unwrap();
            prev = next;
        }
        graph.connect(prev, add, InputPort::Input1).unwrap();

        let config = EvaluatorConfig {
            max_depth: 4,
            ..EvaluatorConfig::default()
        };
        let report = Evaluator::new(&graph, config).run();
        assert_eq!(report.errors.len(), 1);
        assert!(matches!(
            report.errors[0],
            EvalError::DepthLimitExceeded { limit: 4, .. }
        ));
        assert!(report.outcome(add).is_none());
        // u6 tripped the limit but is computed when the walk from `v`
        // reaches it; u7 was on the stack and stays failed.
        let u6 = graph.node_by_key("u6").unwrap();
        let u7 = graph.node_by_key("u7").unwrap();
        assert_eq!(report.number(u6), Some(1.0));
        assert!(report.outcome(u7).is_none());

        let report = run(&graph);
        assert!(report.is_clean());
        assert_eq!(report.number(add), Some(2.0));
    }

    // -----------------------------------------------------------------------
    // 8. Trace and write-back
    // -----------------------------------------------------------------------

    #[test]
    fn trace_records_inputs() {
        let mut graph = FlowGraph::new();
        let a = var(&mut graph, "a", 9.0);
        let b = var(&mut graph, "b", 3.0);
        let div = graph
            .add_node(
                "div",
                NodeKind::Binary {
                    op: BinaryOp::Divide,
                },
            )
            .unwrap();
        graph.connect(a, div, InputPort::Input1).unwrap();
        graph.connect(b, div, InputPort::Input2).unwrap();

        let config = EvaluatorConfig {
            record_trace: true,
            ..EvaluatorConfig::default()
        };
        let report = Evaluator::new(&graph, config).run();
        let trace = report.trace.unwrap();
        let entry = trace.iter().find(|e| e.node_id == div).unwrap();
        assert_eq!(entry.op_description, "binary divide");
        assert_eq!(entry.inputs, vec![(InputPort::Input1, 9.0), (InputPort::Input2, 3.0)]);
        assert_eq!(entry.output, Some(Value::Number(3.0)));
        assert_eq!(
            entry.to_string(),
            format!("[{}] div (binary divide) input1=9 input2=3 -> 3", div)
        );
    }

    #[test]
    fn write_back_stores_results_on_graph() {
        let mut graph = FlowGraph::new();
        let x = var(&mut graph, "x", 2.0);
        let stale = graph.add_node("stale", NodeKind::Print).unwrap();
        graph
            .node_mut(stale)
            .unwrap()
            .store(Some(Value::Number(99.0)), &["Output: 99".into()]);

        let report = run(&graph);
        report.write_back(&mut graph);

        let node = graph.node(x).unwrap();
        assert!(node.state.processed);
        assert_eq!(node.result(), Some(2.0));
        assert_eq!(node.state.output, "Value: 2");
        // an unwired print finishes with nothing and its old state is gone
        let stale = graph.node(stale).unwrap();
        assert_eq!(stale.result(), None);
        assert_eq!(stale.state.output, "");
    }
}
