//! Process-wide string interning for operator kinds.
//!
//! Operator names are interned once into small `Copy` handles so node kinds
//! compare by identity instead of by string contents. The table only grows;
//! interned strings live for the lifetime of the process, which lets
//! [`Symbol::as_str`] hand out `&'static str` without holding the lock.

use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;

use once_cell::sync::Lazy;

/// Interned identifier for an operator kind or attribute name.
///
/// Two symbols are equal iff they were interned from the same string.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(u32);

/// Node kinds are plain symbols; the alias keeps call sites readable.
pub type NodeKind = Symbol;

struct Interner {
    by_name: HashMap<&'static str, u32>,
    names: Vec<&'static str>,
}

impl Interner {
    fn with_builtins() -> Self {
        let mut interner = Interner {
            by_name: HashMap::new(),
            names: Vec::new(),
        };
        // Must stay aligned with the Symbol::PARAM/RETURN/UNDEFINED indices.
        for name in ["Param", "Return", "Undefined"] {
            interner.intern(name);
        }
        interner
    }

    fn intern(&mut self, name: &str) -> u32 {
        if let Some(&id) = self.by_name.get(name) {
            return id;
        }
        let id = u32::try_from(self.names.len()).expect("symbol table overflow");
        let stored: &'static str = Box::leak(name.to_owned().into_boxed_str());
        self.names.push(stored);
        self.by_name.insert(stored, id);
        id
    }
}

static INTERNER: Lazy<RwLock<Interner>> = Lazy::new(|| RwLock::new(Interner::with_builtins()));

impl Symbol {
    /// Kind of the sentinel node anchoring graph inputs and initializers.
    pub const PARAM: Symbol = Symbol(0);
    /// Kind of the sentinel node anchoring graph outputs.
    pub const RETURN: Symbol = Symbol(1);
    /// Placeholder kind for values with no meaningful producer.
    pub const UNDEFINED: Symbol = Symbol(2);

    /// Interns `name`, returning the same handle for equal strings.
    pub fn intern(name: &str) -> Symbol {
        {
            let interner = INTERNER.read().expect("symbol interner poisoned");
            if let Some(&id) = interner.by_name.get(name) {
                return Symbol(id);
            }
        }
        let mut interner = INTERNER.write().expect("symbol interner poisoned");
        Symbol(interner.intern(name))
    }

    /// Returns the display string this symbol was interned from.
    pub fn as_str(self) -> &'static str {
        let interner = INTERNER.read().expect("symbol interner poisoned");
        interner.names[self.0 as usize]
    }
}

impl From<&str> for Symbol {
    fn from(name: &str) -> Self {
        Symbol::intern(name)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({:?})", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::Symbol;

    #[test]
    fn interning_is_idempotent() {
        let a = Symbol::intern("Gemm");
        let b = Symbol::intern("Gemm");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "Gemm");
    }

    #[test]
    fn distinct_names_get_distinct_symbols() {
        assert_ne!(Symbol::intern("Relu"), Symbol::intern("Sigmoid"));
    }

    #[test]
    fn builtins_resolve_to_their_names() {
        assert_eq!(Symbol::PARAM.as_str(), "Param");
        assert_eq!(Symbol::RETURN.as_str(), "Return");
        assert_eq!(Symbol::UNDEFINED.as_str(), "Undefined");
        assert_eq!(Symbol::intern("Param"), Symbol::PARAM);
    }
}
