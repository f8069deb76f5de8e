use anyhow::Result;
use tensor_ir::ir::verify;
use tensor_ir::{Dimension, Graph, NodeId, NodeKind, NodeView, Symbol, Use};

fn attached(graph: &mut Graph, kind: &str, inputs: &[tensor_ir::ValueId]) -> tensor_ir::NodeId {
    let node = graph.create(Symbol::intern(kind), 1);
    for &input in inputs {
        graph.add_input(node, input).unwrap();
    }
    graph.append_node(node).unwrap();
    node
}

#[test]
fn fresh_graph_is_empty_but_consistent() -> Result<()> {
    let graph = Graph::new();
    assert_eq!(graph.node_count(), 0);
    assert!(graph.graph_inputs().is_empty());
    assert!(graph.graph_outputs().is_empty());
    verify(&graph)?;
    Ok(())
}

#[test]
fn wiring_records_uses_per_slot() -> Result<()> {
    let mut graph = Graph::new();
    let a = graph.add_graph_input();
    let b = graph.add_graph_input();
    let gemm = attached(&mut graph, "Gemm", &[a, b, a]);

    assert_eq!(graph.node(gemm).inputs(), &[a, b, a]);
    assert_eq!(
        graph.value(a).uses(),
        &[
            Use {
                user: gemm,
                offset: 0
            },
            Use {
                user: gemm,
                offset: 2
            }
        ]
    );
    assert_eq!(graph.value(b).uses(), &[Use { user: gemm, offset: 1 }]);
    verify(&graph)?;
    Ok(())
}

#[test]
fn remove_input_shifts_later_use_offsets() -> Result<()> {
    let mut graph = Graph::new();
    let a = graph.add_graph_input();
    let b = graph.add_graph_input();
    let c = graph.add_graph_input();
    let node = attached(&mut graph, "Concat", &[a, b, c]);

    graph.remove_input(node, 0)?;

    assert_eq!(graph.node(node).inputs(), &[b, c]);
    assert!(graph.value(a).uses().is_empty());
    assert_eq!(graph.value(b).uses(), &[Use { user: node, offset: 0 }]);
    assert_eq!(graph.value(c).uses(), &[Use { user: node, offset: 1 }]);
    verify(&graph)?;
    Ok(())
}

#[test]
fn remove_all_inputs_clears_every_use() -> Result<()> {
    let mut graph = Graph::new();
    let a = graph.add_graph_input();
    let node = attached(&mut graph, "Sum", &[a, a, a]);

    graph.remove_all_inputs(node)?;

    assert!(graph.node(node).inputs().is_empty());
    assert!(!graph.value(a).has_uses());
    verify(&graph)?;
    Ok(())
}

#[test]
fn erase_output_shifts_later_output_slots() -> Result<()> {
    let mut graph = Graph::new();
    let node = graph.create(Symbol::intern("Split"), 3);
    let output = graph.output_node();
    graph.insert_before(node, output)?;
    let outputs = graph.node(node).outputs().to_vec();

    graph.erase_output(node, 0)?;

    assert_eq!(graph.node(node).outputs(), &outputs[1..]);
    assert_eq!(graph.value(outputs[1]).offset(), 0);
    assert_eq!(graph.value(outputs[2]).offset(), 1);
    verify(&graph)?;
    Ok(())
}

#[test]
fn erase_output_refuses_while_used() {
    let mut graph = Graph::new();
    let node = graph.create(Symbol::intern("Split"), 2);
    let output = graph.output_node();
    graph.insert_before(node, output).unwrap();
    let kept = graph.node(node).outputs()[0];
    attached(&mut graph, "Relu", &[kept]);

    assert!(graph.erase_output(node, 0).is_err());
    assert_eq!(graph.node(node).outputs().len(), 2);
}

#[test]
fn destroy_refuses_and_leaves_graph_untouched_while_outputs_are_used() -> Result<()> {
    let mut graph = Graph::new();
    let a = graph.add_graph_input();
    let producer = attached(&mut graph, "Relu", &[a]);
    let out = graph.node(producer).output();
    let consumer = attached(&mut graph, "Sigmoid", &[out]);

    assert!(graph.destroy(producer).is_err());

    // Nothing moved: the producer is still attached and still consumes %a.
    assert!(graph.node(producer).in_graph_list());
    assert_eq!(graph.node(producer).inputs(), &[a]);
    assert_eq!(graph.value(out).uses(), &[Use { user: consumer, offset: 0 }]);
    verify(&graph)?;
    Ok(())
}

#[test]
fn destroy_releases_inputs_and_detaches() -> Result<()> {
    let mut graph = Graph::new();
    let a = graph.add_graph_input();
    let node = attached(&mut graph, "Relu", &[a]);

    graph.destroy(node)?;

    assert!(!graph.value(a).has_uses());
    assert_eq!(graph.node_count(), 0);
    verify(&graph)?;
    Ok(())
}

#[test]
fn sentinels_cannot_be_destroyed_or_moved() {
    let mut graph = Graph::new();
    let input = graph.input_node();
    let output = graph.output_node();
    assert!(graph.destroy(input).is_err());
    assert!(graph.destroy(output).is_err());
    assert!(graph.move_after(input, output).is_err());
}

#[test]
fn handles_from_another_graph_are_rejected() {
    let mut graph = Graph::new();
    let mut other = Graph::new();
    let foreign = other.add_graph_input();
    let node = graph.create(Symbol::intern("Relu"), 1);
    assert!(graph.add_input(node, foreign).is_err());
    assert!(other.destroy(node).is_err());
}

#[test]
fn graph_inputs_can_be_erased_when_unused() -> Result<()> {
    let mut graph = Graph::new();
    let a = graph.add_graph_input();
    let b = graph.add_graph_input();
    attached(&mut graph, "Relu", &[b]);

    graph.erase_graph_input(0)?;

    assert_eq!(graph.graph_inputs(), &[b]);
    assert!(graph.erase_graph_input(0).is_err());
    let _ = a;
    verify(&graph)?;
    Ok(())
}

#[test]
fn initializers_are_named_and_off_list() -> Result<()> {
    let mut graph = Graph::new();
    let weight = graph.add_initializer("weight");
    let node = attached(&mut graph, "Gemm", &[weight]);

    assert_eq!(graph.initializer_names(), &["weight".to_string()]);
    assert_eq!(graph.value(weight).unique_name(), "weight");
    assert!(!graph.node(graph.initializer_node()).in_graph_list());
    assert_eq!(graph.value(weight).uses(), &[Use { user: node, offset: 0 }]);
    verify(&graph)?;
    Ok(())
}

#[test]
fn value_ids_are_monotonic_and_never_reused() -> Result<()> {
    let mut graph = Graph::new();
    let a = graph.add_graph_input();
    let node = attached(&mut graph, "Relu", &[a]);
    let old = graph.node(node).output();
    let old_unique = graph.value(old).unique();

    graph.destroy(node)?;
    let replacement = attached(&mut graph, "Sigmoid", &[a]);
    let new = graph.node(replacement).output();

    assert!(graph.value(new).unique() > old_unique);
    Ok(())
}

#[test]
fn metadata_round_trips_through_the_value() {
    let mut graph = Graph::new();
    let a = graph.add_graph_input();
    graph
        .value_mut(a)
        .set_elem_type(1)
        .set_sizes(vec![Dimension::from("batch"), Dimension::from(768)]);

    let value = graph.value(a);
    assert_eq!(value.elem_type(), Some(1));
    assert_eq!(
        value.sizes().unwrap(),
        &[Dimension::from("batch"), Dimension::Known(768)]
    );
}

struct GemmView(NodeId);

impl NodeView for GemmView {
    fn kind() -> NodeKind {
        Symbol::intern("Gemm")
    }

    fn wrap(node: NodeId) -> Self {
        GemmView(node)
    }
}

impl GemmView {
    fn weights(&self, graph: &Graph) -> tensor_ir::ValueId {
        graph.node(self.0).input_at(1)
    }
}

#[test]
fn typed_views_recover_kind_specific_accessors() {
    let mut graph = Graph::new();
    let x = graph.add_graph_input();
    let w = graph.add_initializer("weight");
    let gemm = attached(&mut graph, "Gemm", &[x, w]);
    let relu = attached(&mut graph, "Relu", &[x]);

    let view: GemmView = graph.expect_cast(gemm);
    assert_eq!(view.weights(&graph), w);
    assert!(graph.cast::<GemmView>(relu).is_none());
    assert!(graph.cast::<GemmView>(gemm).is_some());
}

#[test]
fn display_prints_header_body_and_return() -> Result<()> {
    let mut graph = Graph::new();
    graph.set_name("tiny");
    let a = graph.add_graph_input();
    let b = graph.add_graph_input();
    graph.value_mut(a).set_unique_name("a");
    graph.value_mut(b).set_unique_name("b");
    let gemm = attached(&mut graph, "Gemm", &[a, b]);
    let out = graph.node(gemm).output();
    graph.register_output(out)?;

    let rendered = graph.to_string();
    let name = graph.value(out).unique_name();
    let expected = format!(
        "graph tiny(%a, %b):\n  %{name} = Gemm(%a, %b)\n  return (%{name})\n"
    );
    assert_eq!(rendered, expected);
    assert_eq!(
        graph.display_node(gemm).to_string(),
        format!("%{name} = Gemm(%a, %b)")
    );
    Ok(())
}
