//! Graph arena: ownership, sentinels, and the mutation primitives every
//! transformation pass builds on.
//!
//! The graph owns two growable arenas (nodes and values); every
//! cross-reference between them is a stable handle, never a pointer.
//! Destroyed slots are tombstoned and never reused, which is what makes
//! value numbering monotonic for the life of the graph. Two sentinel nodes
//! (`Param` and `Return`) are permanently spliced into a circular
//! doubly linked instruction list so the list is never empty and splicing
//! never has to null-check the ends; a third detached `Param` node anchors
//! initializer values that are not part of the formal input list.
//!
//! ## Note on topological order
//!
//! The instruction list is kept in topological order at all times: any value
//! consumed by a node must be produced by a node earlier in the list (or be
//! a graph input/initializer). The primitives here never reorder nodes on
//! their own; callers pick insertion points that keep the property, and
//! every mutation either completes fully or reports an error before
//! touching shared state.

use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{ensure, Result};

use super::node::{Node, NodeId};
use super::value::{Use, Value, ValueId};
use crate::symbol::{NodeKind, Symbol};

/// Process-unique graph identity stamped into every handle the graph hands
/// out, so handles cannot cross between graphs undetected.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub(super) struct GraphId(pub(super) usize);

static GRAPH_ID_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Owns every node and value of one computation graph and hands out the
/// only handles that can mutate them.
pub struct Graph {
    pub(super) id: GraphId,
    pub(super) nodes: Vec<Option<Node>>,
    pub(super) values: Vec<Option<Value>>,
    pub(super) input: NodeId,
    pub(super) output: NodeId,
    pub(super) initializer: NodeId,
    new_node_stage: usize,
    initializer_names: Vec<String>,
    name: Option<String>,
    doc_string: Option<String>,
}

impl Default for Graph {
    fn default() -> Self {
        Graph::new()
    }
}

impl Graph {
    pub fn new() -> Self {
        let id = GraphId(GRAPH_ID_COUNTER.fetch_add(1, Ordering::Relaxed));
        let mut graph = Graph {
            id,
            nodes: Vec::new(),
            values: Vec::new(),
            input: NodeId { graph: id, index: 0 },
            output: NodeId { graph: id, index: 0 },
            initializer: NodeId { graph: id, index: 0 },
            new_node_stage: 0,
            initializer_names: Vec::new(),
            name: None,
            doc_string: None,
        };
        graph.input = graph.alloc_node(Symbol::PARAM);
        graph.output = graph.alloc_node(Symbol::RETURN);
        graph.initializer = graph.alloc_node(Symbol::PARAM);
        // Close the circle: input <-> output, with the initializer anchor
        // staying off-list forever.
        let (input, output) = (graph.input, graph.output);
        {
            let node = graph.node_mut(input);
            node.next = Some(output);
            node.prev = Some(output);
        }
        {
            let node = graph.node_mut(output);
            node.next = Some(input);
            node.prev = Some(input);
        }
        graph
    }

    // ---- accessors ------------------------------------------------------

    /// Borrows a node record. Panics on a cross-graph or destroyed handle;
    /// both are programmer-contract violations, not runtime conditions.
    pub fn node(&self, id: NodeId) -> &Node {
        assert!(
            id.graph == self.id,
            "node handle {:?} belongs to a different graph",
            id
        );
        self.nodes[id.index as usize]
            .as_ref()
            .unwrap_or_else(|| panic!("node {:?} was destroyed", id))
    }

    /// Mutably borrows a node record. Same contract as [`Graph::node`].
    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        assert!(
            id.graph == self.id,
            "node handle {:?} belongs to a different graph",
            id
        );
        self.nodes[id.index as usize]
            .as_mut()
            .unwrap_or_else(|| panic!("node {:?} was destroyed", id))
    }

    /// Borrows a value record. Panics on a cross-graph or destroyed handle.
    pub fn value(&self, id: ValueId) -> &Value {
        assert!(
            id.graph == self.id,
            "value handle {:?} belongs to a different graph",
            id
        );
        self.values[id.index as usize]
            .as_ref()
            .unwrap_or_else(|| panic!("value {:?} was destroyed", id))
    }

    /// Mutably borrows a value record. Same contract as [`Graph::value`].
    pub fn value_mut(&mut self, id: ValueId) -> &mut Value {
        assert!(
            id.graph == self.id,
            "value handle {:?} belongs to a different graph",
            id
        );
        self.values[id.index as usize]
            .as_mut()
            .unwrap_or_else(|| panic!("value {:?} was destroyed", id))
    }

    pub fn input_node(&self) -> NodeId {
        self.input
    }

    pub fn output_node(&self) -> NodeId {
        self.output
    }

    pub fn initializer_node(&self) -> NodeId {
        self.initializer
    }

    fn is_sentinel(&self, id: NodeId) -> bool {
        id == self.input || id == self.output || id == self.initializer
    }

    pub fn has_name(&self) -> bool {
        self.name.is_some()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    pub fn has_doc_string(&self) -> bool {
        self.doc_string.is_some()
    }

    pub fn doc_string(&self) -> Option<&str> {
        self.doc_string.as_deref()
    }

    pub fn set_doc_string(&mut self, doc_string: impl Into<String>) {
        self.doc_string = Some(doc_string.into());
    }

    /// Stage stamped onto freshly created nodes.
    pub fn new_node_stage(&self) -> usize {
        self.new_node_stage
    }

    pub fn set_new_node_stage(&mut self, stage: usize) {
        self.new_node_stage = stage;
    }

    /// Runs `f` with the new-node stage temporarily set to `stage`. The
    /// previous stage is restored on every exit path, including a panic
    /// unwinding out of `f`.
    pub fn with_new_node_stage<R>(
        &mut self,
        stage: usize,
        f: impl FnOnce(&mut Graph) -> Result<R>,
    ) -> Result<R> {
        let previous = self.new_node_stage;
        self.new_node_stage = stage;
        let mut restore = StageRestore {
            graph: self,
            previous,
        };
        f(&mut *restore.graph)
    }

    // ---- node lifecycle -------------------------------------------------

    fn alloc_node(&mut self, kind: NodeKind) -> NodeId {
        let index = u32::try_from(self.nodes.len()).expect("node arena overflow");
        let id = NodeId {
            graph: self.id,
            index,
        };
        self.nodes.push(Some(Node::new(kind, self.new_node_stage)));
        id
    }

    fn alloc_value(&mut self, node: NodeId, offset: usize) -> ValueId {
        let index = u32::try_from(self.values.len()).expect("value arena overflow");
        let id = ValueId {
            graph: self.id,
            index,
        };
        self.values.push(Some(Value::new(node, offset, index)));
        id
    }

    /// Creates a detached node of the given kind with `num_outputs` fresh
    /// output values. The node joins the instruction list only once
    /// [`insert_before`](Graph::insert_before) or
    /// [`insert_after`](Graph::insert_after) is called.
    pub fn create(&mut self, kind: NodeKind, num_outputs: usize) -> NodeId {
        let node = self.alloc_node(kind);
        for _ in 0..num_outputs {
            self.add_output_internal(node);
        }
        node
    }

    /// Removes `node` from the instruction list and reclaims it together
    /// with its outputs. Fails while any output still has uses, without
    /// mutating anything.
    pub fn destroy(&mut self, node: NodeId) -> Result<()> {
        self.ensure_owned_node(node)?;
        ensure!(
            !self.is_sentinel(node),
            "sentinel {} node cannot be destroyed",
            self.node(node).kind()
        );
        for &output in self.node(node).outputs() {
            let value = self.value(output);
            ensure!(
                !value.has_uses(),
                "cannot destroy node {}: output %{} still has {} use(s)",
                self.node(node).kind(),
                value.unique_name(),
                value.uses().len()
            );
        }

        // All checks passed; from here the edit runs to completion.
        let num_inputs = self.node(node).inputs().len();
        for i in 0..num_inputs {
            self.drop_input(node, i);
        }
        let outputs = std::mem::take(&mut self.node_mut(node).outputs);
        for output in outputs {
            self.values[output.index as usize] = None;
        }
        if self.node(node).in_graph_list() {
            self.remove_from_list(node);
        }
        self.nodes[node.index as usize] = None;
        Ok(())
    }

    // ---- input wiring ---------------------------------------------------

    /// Appends `value` to the node's inputs and records the matching use.
    pub fn add_input(&mut self, node: NodeId, value: ValueId) -> Result<ValueId> {
        self.ensure_owned_node(node)?;
        self.ensure_owned_value(value)?;
        let slot = self.node(node).inputs().len();
        self.value_mut(value).uses.push(Use {
            user: node,
            offset: slot,
        });
        self.node_mut(node).inputs.push(value);
        Ok(value)
    }

    /// Swaps the input at slot `i` for `new_value`, returning the previous
    /// occupant. Use bookkeeping on both values stays consistent.
    pub fn replace_input(&mut self, node: NodeId, i: usize, new_value: ValueId) -> Result<ValueId> {
        self.ensure_owned_node(node)?;
        self.ensure_owned_value(new_value)?;
        let arity = self.node(node).inputs().len();
        ensure!(
            i < arity,
            "input slot {} out of range for node {} with {} input(s)",
            i,
            self.node(node).kind(),
            arity
        );
        let old = self.drop_input(node, i);
        self.node_mut(node).inputs[i] = new_value;
        self.value_mut(new_value).uses.push(Use {
            user: node,
            offset: i,
        });
        Ok(old)
    }

    /// Replaces every occurrence of `from` in the node's inputs with `to`,
    /// preserving slot order and handling repeated occurrences.
    pub fn replace_input_with(&mut self, node: NodeId, from: ValueId, to: ValueId) -> Result<()> {
        self.ensure_owned_node(node)?;
        self.ensure_owned_value(from)?;
        self.ensure_owned_value(to)?;
        let arity = self.node(node).inputs().len();
        for slot in 0..arity {
            if self.node(node).inputs()[slot] == from {
                self.replace_input(node, slot, to)?;
            }
        }
        Ok(())
    }

    /// Removes the input at slot `i`.
    ///
    /// This is O(n) in the node's input count: every later input's recorded
    /// use offset shifts down by one to match the list.
    pub fn remove_input(&mut self, node: NodeId, i: usize) -> Result<()> {
        self.ensure_owned_node(node)?;
        let arity = self.node(node).inputs().len();
        ensure!(
            i < arity,
            "input slot {} out of range for node {} with {} input(s)",
            i,
            self.node(node).kind(),
            arity
        );
        self.drop_input(node, i);
        for j in (i + 1)..arity {
            let value = self.node(node).inputs()[j];
            let position = self.find_use_for_input(node, j);
            self.value_mut(value).uses[position].offset -= 1;
        }
        self.node_mut(node).inputs.remove(i);
        Ok(())
    }

    /// Drops every input and its use record.
    pub fn remove_all_inputs(&mut self, node: NodeId) -> Result<()> {
        self.ensure_owned_node(node)?;
        let arity = self.node(node).inputs().len();
        for i in 0..arity {
            self.drop_input(node, i);
        }
        self.node_mut(node).inputs.clear();
        Ok(())
    }

    // ---- outputs --------------------------------------------------------

    /// Allocates a fresh value defined by `node` at its next output slot.
    pub fn add_output(&mut self, node: NodeId) -> Result<ValueId> {
        self.ensure_owned_node(node)?;
        Ok(self.add_output_internal(node))
    }

    fn add_output_internal(&mut self, node: NodeId) -> ValueId {
        let offset = self.node(node).outputs().len();
        let value = self.alloc_value(node, offset);
        self.node_mut(node).outputs.push(value);
        value
    }

    /// Removes output `i` and destroys its value. Fails while the value
    /// still has uses. Later outputs shift down one slot.
    pub fn erase_output(&mut self, node: NodeId, i: usize) -> Result<()> {
        self.ensure_owned_node(node)?;
        let arity = self.node(node).outputs().len();
        ensure!(
            i < arity,
            "output slot {} out of range for node {} with {} output(s)",
            i,
            self.node(node).kind(),
            arity
        );
        let value = self.node(node).outputs()[i];
        ensure!(
            !self.value(value).has_uses(),
            "cannot erase output %{}: it still has {} use(s)",
            self.value(value).unique_name(),
            self.value(value).uses().len()
        );
        self.node_mut(node).outputs.remove(i);
        self.values[value.index as usize] = None;
        let remaining = self.node(node).outputs()[i..].to_vec();
        for shifted in remaining {
            self.value_mut(shifted).offset -= 1;
        }
        Ok(())
    }

    /// True when any output of `node` has at least one consumer.
    pub fn has_uses(&self, node: NodeId) -> bool {
        self.node(node)
            .outputs()
            .iter()
            .any(|&output| self.value(output).has_uses())
    }

    // ---- list splicing --------------------------------------------------

    /// Splices the detached `node` into the instruction list immediately
    /// before `anchor`. The anchor may be the output sentinel (append) but
    /// not the input sentinel: the segment between the two sentinels is not
    /// part of the list.
    pub fn insert_before(&mut self, node: NodeId, anchor: NodeId) -> Result<()> {
        self.ensure_splice_preconditions(node, anchor)?;
        ensure!(
            anchor != self.input,
            "cannot insert before the input sentinel"
        );
        let prev = self.node(anchor).prev.expect("attached node has links");
        self.splice_after(node, prev);
        Ok(())
    }

    /// Splices the detached `node` into the instruction list immediately
    /// after `anchor`. The anchor may be the input sentinel (prepend) but
    /// not the output sentinel.
    pub fn insert_after(&mut self, node: NodeId, anchor: NodeId) -> Result<()> {
        self.ensure_splice_preconditions(node, anchor)?;
        ensure!(
            anchor != self.output,
            "cannot insert after the output sentinel"
        );
        self.splice_after(node, anchor);
        Ok(())
    }

    /// Detaches the attached `node` and re-splices it before `anchor`.
    /// All preconditions are validated before the first link is touched, so
    /// a failure leaves the list exactly as it was.
    pub fn move_before(&mut self, node: NodeId, anchor: NodeId) -> Result<()> {
        self.ensure_move_preconditions(node, anchor)?;
        ensure!(
            anchor != self.input,
            "cannot move a node before the input sentinel"
        );
        self.remove_from_list(node);
        let prev = self.node(anchor).prev.expect("attached node has links");
        self.splice_after(node, prev);
        Ok(())
    }

    /// Detaches the attached `node` and re-splices it after `anchor`.
    pub fn move_after(&mut self, node: NodeId, anchor: NodeId) -> Result<()> {
        self.ensure_move_preconditions(node, anchor)?;
        ensure!(
            anchor != self.output,
            "cannot move a node after the output sentinel"
        );
        self.remove_from_list(node);
        self.splice_after(node, anchor);
        Ok(())
    }

    /// Attaches the detached `node` at the end of the instruction list.
    pub fn append_node(&mut self, node: NodeId) -> Result<()> {
        let output = self.output;
        self.insert_before(node, output)
    }

    /// Attaches the detached `node` at the front of the instruction list.
    pub fn prepend_node(&mut self, node: NodeId) -> Result<()> {
        let input = self.input;
        self.insert_after(node, input)
    }

    fn ensure_splice_preconditions(&self, node: NodeId, anchor: NodeId) -> Result<()> {
        self.ensure_owned_node(node)?;
        self.ensure_owned_node(anchor)?;
        ensure!(node != anchor, "cannot insert a node relative to itself");
        ensure!(
            !self.is_sentinel(node),
            "sentinel {} node cannot be re-inserted",
            self.node(node).kind()
        );
        ensure!(
            !self.node(node).in_graph_list(),
            "node {} is already in the instruction list",
            self.node(node).kind()
        );
        ensure!(
            self.node(anchor).in_graph_list(),
            "anchor node {} is not in the instruction list",
            self.node(anchor).kind()
        );
        Ok(())
    }

    fn ensure_move_preconditions(&self, node: NodeId, anchor: NodeId) -> Result<()> {
        self.ensure_owned_node(node)?;
        self.ensure_owned_node(anchor)?;
        ensure!(node != anchor, "cannot move a node relative to itself");
        ensure!(
            !self.is_sentinel(node),
            "sentinel {} node cannot be moved",
            self.node(node).kind()
        );
        ensure!(
            self.node(node).in_graph_list(),
            "node {} is not in the instruction list",
            self.node(node).kind()
        );
        ensure!(
            self.node(anchor).in_graph_list(),
            "anchor node {} is not in the instruction list",
            self.node(anchor).kind()
        );
        Ok(())
    }

    fn splice_after(&mut self, node: NodeId, anchor: NodeId) {
        let next = self.node(anchor).next.expect("attached node has links");
        self.node_mut(anchor).next = Some(node);
        {
            let record = self.node_mut(node);
            record.prev = Some(anchor);
            record.next = Some(next);
        }
        self.node_mut(next).prev = Some(node);
    }

    fn remove_from_list(&mut self, node: NodeId) {
        let record = self.node(node);
        debug_assert!(record.in_graph_list());
        let next = record.next.expect("attached node has links");
        let prev = record.prev.expect("attached node has links");
        self.node_mut(prev).next = Some(next);
        self.node_mut(next).prev = Some(prev);
        let record = self.node_mut(node);
        record.next = None;
        record.prev = None;
    }

    // ---- rewriting ------------------------------------------------------

    /// Rewrites every consumer of `old` to read `new` at the same slot,
    /// leaving `old` with no uses.
    ///
    /// Operates over a snapshot of the use list because each slot rewrite
    /// deletes and re-appends a use record.
    pub fn replace_all_uses_with(&mut self, old: ValueId, new: ValueId) -> Result<()> {
        self.ensure_owned_value(old)?;
        self.ensure_owned_value(new)?;
        if old == new {
            return Ok(());
        }
        let snapshot: Vec<Use> = self.value(old).uses().to_vec();
        for entry in snapshot {
            self.replace_input(entry.user, entry.offset, new)?;
        }
        debug_assert!(self.value(old).uses().is_empty());
        Ok(())
    }

    /// Pairwise [`replace_all_uses_with`](Graph::replace_all_uses_with) over
    /// the outputs of two nodes with matching arity.
    pub fn replace_all_node_uses_with(&mut self, node: NodeId, with: NodeId) -> Result<()> {
        self.ensure_owned_node(node)?;
        self.ensure_owned_node(with)?;
        let from = self.node(node).outputs().to_vec();
        let to = self.node(with).outputs().to_vec();
        ensure!(
            from.len() == to.len(),
            "output arity mismatch: {} has {} output(s), {} has {}",
            self.node(node).kind(),
            from.len(),
            self.node(with).kind(),
            to.len()
        );
        for (old, new) in from.into_iter().zip(to) {
            self.replace_all_uses_with(old, new)?;
        }
        Ok(())
    }

    /// Copies element type, shape, and (when present) the unique name from
    /// `src` onto `dst`. Uses and ownership are untouched.
    pub fn copy_metadata(&mut self, dst: ValueId, src: ValueId) -> Result<()> {
        self.ensure_owned_value(dst)?;
        self.ensure_owned_value(src)?;
        let elem_type = self.value(src).elem_type;
        let sizes = self.value(src).sizes.clone();
        let name = self.value(src).unique_name.clone();
        let target = self.value_mut(dst);
        target.elem_type = elem_type;
        target.sizes = sizes;
        if let Some(name) = name {
            target.set_unique_name(name);
        }
        Ok(())
    }

    // ---- ordering -------------------------------------------------------

    /// Total order along the instruction list: true iff `a` appears
    /// strictly before `b` walking from the input sentinel. Panics when
    /// either node is detached; a detached node has no position.
    pub fn is_before(&self, a: NodeId, b: NodeId) -> bool {
        assert!(
            self.node(a).in_graph_list() && self.node(b).in_graph_list(),
            "is_before requires both nodes to be in the instruction list"
        );
        if a == b {
            return false;
        }
        let mut cursor = self.input;
        loop {
            if cursor == a {
                return true;
            }
            if cursor == b {
                return false;
            }
            if cursor == self.output {
                panic!("instruction list walk did not reach either node");
            }
            cursor = self.node(cursor).next.expect("attached node has links");
        }
    }

    /// Iterates the real (non-sentinel) nodes in instruction order.
    pub fn nodes(&self) -> NodeIter<'_> {
        NodeIter {
            graph: self,
            cursor: self.node(self.input).next.expect("sentinel is attached"),
            reverse: false,
        }
    }

    /// Iterates the real nodes in reverse instruction order.
    pub fn nodes_reversed(&self) -> NodeIter<'_> {
        NodeIter {
            graph: self,
            cursor: self.node(self.output).prev.expect("sentinel is attached"),
            reverse: true,
        }
    }

    /// Number of real nodes currently in the instruction list.
    pub fn node_count(&self) -> usize {
        self.nodes().count()
    }

    // ---- graph-level values ---------------------------------------------

    /// Adds a formal graph input, anchored as an output of the input
    /// sentinel.
    pub fn add_graph_input(&mut self) -> ValueId {
        let input = self.input;
        self.add_output_internal(input)
    }

    /// Erases formal graph input `i`. Fails while the value is still used.
    pub fn erase_graph_input(&mut self, i: usize) -> Result<()> {
        let input = self.input;
        self.erase_output(input, i)
    }

    pub fn graph_inputs(&self) -> &[ValueId] {
        self.node(self.input).outputs()
    }

    /// Registers `value` as a formal graph output, returning its position.
    pub fn register_output(&mut self, value: ValueId) -> Result<usize> {
        let output = self.output;
        self.add_input(output, value)?;
        Ok(self.node(output).inputs().len() - 1)
    }

    pub fn graph_outputs(&self) -> &[ValueId] {
        self.node(self.output).inputs()
    }

    /// Creates an initializer value anchored at the detached initializer
    /// sentinel and names it.
    pub fn add_initializer(&mut self, name: impl Into<String>) -> ValueId {
        let name = name.into();
        let initializer = self.initializer;
        let value = self.add_output_internal(initializer);
        self.value_mut(value).set_unique_name(name.clone());
        self.initializer_names.push(name);
        value
    }

    pub fn initializer_values(&self) -> &[ValueId] {
        self.node(self.initializer).outputs()
    }

    pub fn initializer_names(&self) -> &[String] {
        &self.initializer_names
    }

    // ---- typed views ----------------------------------------------------

    /// Recovers an operation-specific view when the node's kind matches.
    pub fn cast<T: NodeView>(&self, node: NodeId) -> Option<T> {
        if self.node(node).kind() == T::kind() {
            Some(T::wrap(node))
        } else {
            None
        }
    }

    /// Checked variant of [`cast`](Graph::cast): panics naming both kinds
    /// on a mismatch.
    pub fn expect_cast<T: NodeView>(&self, node: NodeId) -> T {
        let found = self.node(node).kind();
        assert!(
            found == T::kind(),
            "expected a {} node but found a {}",
            T::kind(),
            found
        );
        T::wrap(node)
    }

    // ---- internals ------------------------------------------------------

    fn ensure_owned_node(&self, id: NodeId) -> Result<()> {
        ensure!(
            id.graph == self.id,
            "node handle {:?} belongs to a different graph",
            id
        );
        ensure!(
            self.nodes[id.index as usize].is_some(),
            "node {:?} was destroyed",
            id
        );
        Ok(())
    }

    fn ensure_owned_value(&self, id: ValueId) -> Result<()> {
        ensure!(
            id.graph == self.id,
            "value handle {:?} belongs to a different graph",
            id
        );
        ensure!(
            self.values[id.index as usize].is_some(),
            "value {:?} was destroyed",
            id
        );
        Ok(())
    }

    /// Position of the use record matching input slot `i` inside the input
    /// value's use list. The record must exist; anything else means the
    /// use/input symmetry was already broken.
    fn find_use_for_input(&self, node: NodeId, i: usize) -> usize {
        let value = self.node(node).inputs()[i];
        let needle = Use {
            user: node,
            offset: i,
        };
        self.value(value)
            .uses()
            .iter()
            .position(|entry| *entry == needle)
            .unwrap_or_else(|| panic!("use record missing for input slot {i} of {:?}", node))
    }

    /// Removes the use record for input slot `i` and returns the value that
    /// occupied the slot. The slot entry itself is left for the caller to
    /// overwrite or erase.
    fn drop_input(&mut self, node: NodeId, i: usize) -> ValueId {
        let value = self.node(node).inputs()[i];
        let position = self.find_use_for_input(node, i);
        self.value_mut(value).uses.remove(position);
        value
    }
}

/// Restores the graph's new-node stage on drop, so
/// [`Graph::with_new_node_stage`] cannot leak the temporary stage even when
/// the closure unwinds.
struct StageRestore<'g> {
    graph: &'g mut Graph,
    previous: usize,
}

impl Drop for StageRestore<'_> {
    fn drop(&mut self) {
        self.graph.new_node_stage = self.previous;
    }
}

/// Operation-specific accessor view keyed by node kind, recovered through
/// [`Graph::cast`] / [`Graph::expect_cast`].
pub trait NodeView: Sized {
    /// Kind this view applies to.
    fn kind() -> NodeKind;
    /// Wraps a node already verified to have the right kind.
    fn wrap(node: NodeId) -> Self;
}

/// Walks the instruction list between the sentinels in either direction.
pub struct NodeIter<'g> {
    graph: &'g Graph,
    cursor: NodeId,
    reverse: bool,
}

impl<'g> Iterator for NodeIter<'g> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let boundary = if self.reverse {
            self.graph.input
        } else {
            self.graph.output
        };
        if self.cursor == boundary {
            return None;
        }
        let current = self.cursor;
        let record = self.graph.node(current);
        self.cursor = if self.reverse {
            record.prev.expect("attached node has links")
        } else {
            record.next.expect("attached node has links")
        };
        Some(current)
    }
}
