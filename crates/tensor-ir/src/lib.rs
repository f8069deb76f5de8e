pub mod attr;
pub mod guard;
pub mod ir;
pub mod symbol;

pub use attr::AttributeKind;
pub use guard::ResourceGuard;
pub use ir::{Dimension, Graph, Node, NodeId, NodeView, Use, Value, ValueId};
pub use symbol::{NodeKind, Symbol};
