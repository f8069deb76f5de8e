//! Human-readable graph dumps.
//!
//! The format is line oriented: a header naming the graph and its formal
//! inputs, one `init` line per initializer, one line per instruction in
//! list order, and a trailing `return` line.

use std::fmt;

use super::graph::Graph;
use super::node::NodeId;

impl Graph {
    fn fmt_value_list(
        &self,
        f: &mut fmt::Formatter<'_>,
        values: &[super::value::ValueId],
    ) -> fmt::Result {
        for (i, &value) in values.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "%{}", self.value(value).unique_name())?;
        }
        Ok(())
    }

    fn fmt_node(&self, f: &mut fmt::Formatter<'_>, node: NodeId) -> fmt::Result {
        let record = self.node(node);
        self.fmt_value_list(f, record.outputs())?;
        write!(f, " = {}(", record.kind())?;
        self.fmt_value_list(f, record.inputs())?;
        f.write_str(")")
    }

    /// One-line rendering of a single node, e.g. `%y = Relu(%x)`.
    pub fn display_node(&self, node: NodeId) -> NodeDisplay<'_> {
        NodeDisplay { graph: self, node }
    }
}

pub struct NodeDisplay<'g> {
    graph: &'g Graph,
    node: NodeId,
}

impl fmt::Display for NodeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.graph.fmt_node(f, self.node)
    }
}

impl fmt::Display for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "graph {}(", self.name().unwrap_or("<anonymous>"))?;
        self.fmt_value_list(f, self.graph_inputs())?;
        writeln!(f, "):")?;
        for &value in self.initializer_values() {
            writeln!(f, "  init %{}", self.value(value).unique_name())?;
        }
        for node in self.nodes() {
            f.write_str("  ")?;
            self.fmt_node(f, node)?;
            f.write_str("\n")?;
        }
        f.write_str("  return (")?;
        self.fmt_value_list(f, self.graph_outputs())?;
        writeln!(f, ")")
    }
}
