//! SSA value records and their def-use bookkeeping.

use std::fmt;

use smallvec::SmallVec;

use super::dim::Dimension;
use super::graph::GraphId;
use super::node::NodeId;

/// Arena handle for a [`Value`](super::Value). Carries the owning graph's id
/// so handles from a different graph are rejected instead of silently
/// aliasing an unrelated slot.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ValueId {
    pub(super) graph: GraphId,
    pub(super) index: u32,
}

impl ValueId {
    /// Slot index inside the owning graph's value arena. Slots are never
    /// reused, so this doubles as the value's process-unique number within
    /// its graph.
    pub fn index(self) -> u32 {
        self.index
    }
}

impl fmt::Debug for ValueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ValueId({}.{})", self.graph.0, self.index)
    }
}

/// One recorded consumer edge: `user` reads the value at input slot `offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Use {
    pub user: NodeId,
    pub offset: usize,
}

pub(super) type UseList = SmallVec<[Use; 2]>;

/// A single SSA definition: produced by exactly one node at one output slot,
/// carrying type/shape metadata and the live list of consumers.
pub struct Value {
    pub(super) node: NodeId,
    pub(super) offset: usize,
    pub(super) unique: u32,
    pub(super) stage: usize,
    pub(super) uses: UseList,
    pub(super) unique_name: Option<String>,
    pub(super) elem_type: Option<i32>,
    pub(super) sizes: Option<Vec<Dimension>>,
}

impl Value {
    pub(super) fn new(node: NodeId, offset: usize, unique: u32) -> Self {
        Value {
            node,
            offset,
            unique,
            stage: 0,
            uses: UseList::new(),
            unique_name: None,
            elem_type: None,
            sizes: None,
        }
    }

    /// The node producing this value. Fixed at construction.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Output slot of the producer at which this value is defined.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Process-unique numeric id within the owning graph. Never reused, even
    /// after the value is destroyed.
    pub fn unique(&self) -> u32 {
        self.unique
    }

    pub fn stage(&self) -> usize {
        self.stage
    }

    pub fn set_stage(&mut self, stage: usize) -> &mut Self {
        self.stage = stage;
        self
    }

    pub fn has_unique_name(&self) -> bool {
        self.unique_name.is_some()
    }

    /// User-assigned name, or the deterministic `_v_{unique}` fallback.
    pub fn unique_name(&self) -> String {
        match &self.unique_name {
            Some(name) => name.clone(),
            None => format!("_v_{}", self.unique),
        }
    }

    /// Assigns the unique name. Idempotent; allocates no new id.
    pub fn set_unique_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.unique_name = Some(name.into());
        self
    }

    /// Opaque element-type tag from the external type system, if assigned.
    pub fn elem_type(&self) -> Option<i32> {
        self.elem_type
    }

    pub fn set_elem_type(&mut self, elem_type: i32) -> &mut Self {
        self.elem_type = Some(elem_type);
        self
    }

    pub fn has_sizes(&self) -> bool {
        self.sizes.is_some()
    }

    /// The shape, when present. Shapes are all-or-nothing: either every axis
    /// is recorded (possibly `Unknown`) or no shape is set at all.
    pub fn sizes(&self) -> Option<&[Dimension]> {
        self.sizes.as_deref()
    }

    /// Replaces the whole shape atomically.
    pub fn set_sizes(&mut self, sizes: Vec<Dimension>) -> &mut Self {
        self.sizes = Some(sizes);
        self
    }

    /// Clears the shape entirely.
    pub fn wipe_sizes(&mut self) -> &mut Self {
        self.sizes = None;
        self
    }

    /// Read-only view of the current consumers.
    pub fn uses(&self) -> &[Use] {
        &self.uses
    }

    pub fn has_uses(&self) -> bool {
        !self.uses.is_empty()
    }
}
