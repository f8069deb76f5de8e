//! Shape axis representation.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Names a symbolic axis extent (e.g. `batch`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DimParam(Arc<str>);

impl DimParam {
    pub fn new(name: impl Into<String>) -> Self {
        Self(Arc::<str>::from(name.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Serialize for DimParam {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DimParam {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        Ok(DimParam::new(name))
    }
}

/// One axis of a tensor shape. Immutable once constructed; a value's shape
/// is a whole `Vec<Dimension>` replaced atomically, never edited in place.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dimension {
    Unknown,
    Known(i64),
    Symbolic(DimParam),
}

impl Dimension {
    pub fn is_unknown(&self) -> bool {
        matches!(self, Dimension::Unknown)
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Dimension::Known(_))
    }

    /// Returns the integer extent when this axis is statically known.
    pub fn as_known(&self) -> Option<i64> {
        match self {
            Dimension::Known(dim) => Some(*dim),
            _ => None,
        }
    }

    /// Returns the symbolic name when this axis is named rather than fixed.
    pub fn param(&self) -> Option<&DimParam> {
        match self {
            Dimension::Symbolic(param) => Some(param),
            _ => None,
        }
    }
}

impl From<i64> for Dimension {
    fn from(dim: i64) -> Self {
        Dimension::Known(dim)
    }
}

impl From<&str> for Dimension {
    fn from(name: &str) -> Self {
        Dimension::Symbolic(DimParam::new(name))
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dimension::Unknown => f.write_str("?"),
            Dimension::Known(dim) => write!(f, "{dim}"),
            Dimension::Symbolic(param) => f.write_str(param.as_str()),
        }
    }
}
