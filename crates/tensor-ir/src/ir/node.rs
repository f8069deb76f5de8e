//! Node records: one graph operation plus its place in the instruction list.

use std::fmt;

use super::graph::GraphId;
use super::value::ValueId;
use crate::symbol::NodeKind;

/// Arena handle for a [`Node`]. Like [`ValueId`](super::ValueId) it carries
/// the owning graph's id so cross-graph handles are detected.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    pub(super) graph: GraphId,
    pub(super) index: u32,
}

impl NodeId {
    pub fn index(self) -> u32 {
        self.index
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({}.{})", self.graph.0, self.index)
    }
}

/// One operation in the graph.
///
/// A node owns its ordered output values and references its input values;
/// `next`/`prev` splice it into the graph's circular instruction list. Both
/// links are `None` exactly while the node is detached.
pub struct Node {
    pub(super) kind: NodeKind,
    pub(super) inputs: Vec<ValueId>,
    pub(super) outputs: Vec<ValueId>,
    pub(super) next: Option<NodeId>,
    pub(super) prev: Option<NodeId>,
    pub(super) stage: usize,
    pub(super) name: Option<String>,
    pub(super) domain: Option<String>,
    pub(super) overload: Option<String>,
    pub(super) doc_string: Option<String>,
}

impl Node {
    pub(super) fn new(kind: NodeKind, stage: usize) -> Self {
        Node {
            kind,
            inputs: Vec::new(),
            outputs: Vec::new(),
            next: None,
            prev: None,
            stage,
            name: None,
            domain: None,
            overload: None,
            doc_string: None,
        }
    }

    /// Operator kind. Immutable for the node's whole lifetime.
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Ordered input values, one entry per slot.
    pub fn inputs(&self) -> &[ValueId] {
        &self.inputs
    }

    /// Ordered output values this node defines.
    pub fn outputs(&self) -> &[ValueId] {
        &self.outputs
    }

    /// Single-input convenience accessor. Panics unless arity is exactly 1.
    pub fn input(&self) -> ValueId {
        assert!(
            self.inputs.len() == 1,
            "node {} has {} inputs, expected exactly 1",
            self.kind,
            self.inputs.len()
        );
        self.inputs[0]
    }

    /// Single-output convenience accessor. Panics unless arity is exactly 1.
    pub fn output(&self) -> ValueId {
        assert!(
            self.outputs.len() == 1,
            "node {} has {} outputs, expected exactly 1",
            self.kind,
            self.outputs.len()
        );
        self.outputs[0]
    }

    /// Checked indexed input access.
    pub fn input_at(&self, i: usize) -> ValueId {
        self.inputs[i]
    }

    pub fn stage(&self) -> usize {
        self.stage
    }

    pub fn set_stage(&mut self, stage: usize) -> &mut Self {
        self.stage = stage;
        self
    }

    pub fn has_name(&self) -> bool {
        self.name.is_some()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = Some(name.into());
        self
    }

    pub fn has_domain(&self) -> bool {
        self.domain.is_some()
    }

    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    pub fn set_domain(&mut self, domain: impl Into<String>) -> &mut Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn has_overload(&self) -> bool {
        self.overload.is_some()
    }

    pub fn overload(&self) -> Option<&str> {
        self.overload.as_deref()
    }

    pub fn set_overload(&mut self, overload: impl Into<String>) -> &mut Self {
        self.overload = Some(overload.into());
        self
    }

    pub fn has_doc_string(&self) -> bool {
        self.doc_string.is_some()
    }

    pub fn doc_string(&self) -> Option<&str> {
        self.doc_string.as_deref()
    }

    pub fn set_doc_string(&mut self, doc_string: impl Into<String>) -> &mut Self {
        self.doc_string = Some(doc_string.into());
        self
    }

    /// Whether the node is currently spliced into the instruction list.
    ///
    /// `prev` may only be `None` while `next` is also `None`; anything else
    /// is list corruption.
    pub fn in_graph_list(&self) -> bool {
        debug_assert!(self.next.is_some() || self.prev.is_none());
        self.next.is_some()
    }
}
