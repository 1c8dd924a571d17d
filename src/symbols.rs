//! Symbol interning.
//!
//! The engine only ever copies and hashes symbols; this table is the
//! companion that produces them. Hosts are free to bring their own interned
//! type instead — [`Symbol`] just satisfies the bounds
//! [`Language::Symbol`](crate::lang::Language::Symbol) asks for.

use rustc_hash::FxHashMap;
use std::rc::Rc;

/// Interned identifier. Cheap to copy, O(1) to compare and hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(pub u32);

/// Symbol interning table.
///
/// Uses `Rc<str>` for names so each name is allocated once and shared
/// between the map and the id-indexed vector.
#[derive(Debug, Default)]
pub struct SymbolTable {
    map: FxHashMap<Rc<str>, Symbol>,
    names: Vec<Rc<str>>,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable {
            map: FxHashMap::default(),
            names: Vec::new(),
        }
    }

    /// Intern a name, returning its symbol. Interning the same name twice
    /// returns the same symbol.
    pub fn intern(&mut self, name: &str) -> Symbol {
        if let Some(&sym) = self.map.get(name) {
            return sym;
        }

        let sym = Symbol(self.names.len() as u32);
        let shared: Rc<str> = Rc::from(name);
        self.names.push(shared.clone());
        self.map.insert(shared, sym);
        sym
    }

    /// Get the name of a symbol.
    pub fn name(&self, sym: Symbol) -> Option<&str> {
        self.names.get(sym.0 as usize).map(|s| s.as_ref())
    }

    /// Look up an already-interned name.
    pub fn get(&self, name: &str) -> Option<Symbol> {
        self.map.get(name).copied()
    }

    /// Number of interned symbols.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
