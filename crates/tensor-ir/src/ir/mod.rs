//! Mutable computation-graph IR.
//!
//! A [`Graph`] owns its [`Node`]s and [`Value`]s and is the only way to
//! mutate them; everything outside the graph holds [`NodeId`]/[`ValueId`]
//! handles. See the module docs on [`Graph`] for the structural invariants
//! the mutation primitives maintain, and [`verify`] for checking them after
//! a hand-rolled transformation.

mod dim;
mod graph;
mod node;
mod print;
mod value;
pub mod verify;

pub use dim::{DimParam, Dimension};
pub use graph::{Graph, NodeIter, NodeView};
pub use node::{Node, NodeId};
pub use print::NodeDisplay;
pub use value::{Use, Value, ValueId};
pub use verify::{verify, VerifyError};
