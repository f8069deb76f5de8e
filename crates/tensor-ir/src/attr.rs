//! Closed tag set for node attribute kinds.
//!
//! Attribute key/value storage is an external concern; the IR only fixes the
//! vocabulary of attribute kinds and their short display tokens so external
//! stores and printers agree on the encoding.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind tag for a node attribute value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttributeKind {
    Float,
    Floats,
    Int,
    Ints,
    String,
    Strings,
    Tensor,
    Tensors,
    Graph,
    Graphs,
    TypeProto,
    TypeProtos,
}

impl AttributeKind {
    /// Short display token used in textual dumps (`f`, `fs`, `i`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            AttributeKind::Float => "f",
            AttributeKind::Floats => "fs",
            AttributeKind::Int => "i",
            AttributeKind::Ints => "is",
            AttributeKind::String => "s",
            AttributeKind::Strings => "ss",
            AttributeKind::Tensor => "t",
            AttributeKind::Tensors => "ts",
            AttributeKind::Graph => "g",
            AttributeKind::Graphs => "gs",
            AttributeKind::TypeProto => "tp",
            AttributeKind::TypeProtos => "tps",
        }
    }
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::AttributeKind;

    #[test]
    fn display_tokens_match_the_wire_vocabulary() {
        let tokens: Vec<&str> = [
            AttributeKind::Float,
            AttributeKind::Floats,
            AttributeKind::Int,
            AttributeKind::Ints,
            AttributeKind::String,
            AttributeKind::Strings,
            AttributeKind::Tensor,
            AttributeKind::Tensors,
            AttributeKind::Graph,
            AttributeKind::Graphs,
            AttributeKind::TypeProto,
            AttributeKind::TypeProtos,
        ]
        .iter()
        .map(|kind| kind.as_str())
        .collect();
        assert_eq!(
            tokens,
            ["f", "fs", "i", "is", "s", "ss", "t", "ts", "g", "gs", "tp", "tps"]
        );
    }
}
