//! C1: interned terminals and nonterminals.
//!
//! Symbol identity, names, and terminal patterns live here as immutable
//! data (`Symbol`). The attributes that the fixed-point analyses in
//! [`crate::firstfollow`] compute (`nullable`, `first`, `follow`) live in
//! parallel [`SymbolVec`]s on [`SymbolTable`] rather than on `Symbol`
//! itself, the same separation `rustemo`'s `table.rs` uses between its
//! `LRState`/`LRItem` types and the standalone `FirstSets`/`FollowSets`
//! it computes over them.

use std::collections::HashSet;

use indexmap::IndexMap;

use crate::index::{SymbolId, SymbolVec};

pub const EMPTY_NAME: &str = "EMPTY";
pub const END_NAME: &str = "__EOF__";
pub const ERROR_NAME: &str = "ERROR";
pub const START_NAME: &str = "__START__";

/// Names a grammar author may not use as the LHS of a rule.
pub const RESERVED_LHS_NAMES: &[&str] = &[EMPTY_NAME, START_NAME, END_NAME, ERROR_NAME];

#[derive(Debug, Clone)]
pub struct Symbol {
    pub id: SymbolId,
    pub name: String,
    /// `Some(regex)` for terminals, `None` for nonterminals and EMPTY.
    pub pattern: Option<String>,
}

impl Symbol {
    pub fn is_terminal(&self) -> bool {
        self.pattern.is_some()
    }
}

/// Interning table plus the three distinguished symbols that exist in
/// every instance: `EMPTY`, `END` (the `$` sentinel), and `ERROR`
/// (parser-side, never producible).
#[derive(Debug, Clone)]
pub struct SymbolTable {
    symbols: SymbolVec<Symbol>,
    by_name: IndexMap<String, SymbolId>,
    pub empty: SymbolId,
    pub end: SymbolId,
    pub error: SymbolId,

    pub nullable: SymbolVec<bool>,
    pub first: SymbolVec<HashSet<SymbolId>>,
    pub follow: SymbolVec<HashSet<SymbolId>>,
}

impl SymbolTable {
    pub fn new() -> Self {
        let mut symbols = SymbolVec::new();
        let mut by_name = IndexMap::new();

        let mut intern_fixed = |name: &str, pattern: Option<String>| -> SymbolId {
            let id = symbols.push(Symbol {
                id: SymbolId(0),
                name: name.to_string(),
                pattern,
            });
            symbols.0[id.index()].id = id;
            by_name.insert(name.to_string(), id);
            id
        };

        let empty = intern_fixed(EMPTY_NAME, None);
        let end = intern_fixed(END_NAME, None);
        let error = intern_fixed(ERROR_NAME, None);

        let mut table = Self {
            symbols,
            by_name,
            empty,
            end,
            error,
            nullable: SymbolVec::new(),
            first: SymbolVec::new(),
            follow: SymbolVec::new(),
        };
        table.sync_attr_len();
        table
    }

    fn sync_attr_len(&mut self) {
        while self.nullable.len() < self.symbols.len() {
            self.nullable.push(false);
            self.first.push(HashSet::new());
            self.follow.push(HashSet::new());
        }
    }

    /// Interns `name`, returning the existing id if already known.
    /// `pattern = Some(_)` marks the symbol as a terminal.
    pub fn intern(&mut self, name: &str, pattern: Option<String>) -> SymbolId {
        if let Some(&id) = self.by_name.get(name) {
            return id;
        }
        let id = self.symbols.push(Symbol {
            id: SymbolId(0),
            name: name.to_string(),
            pattern,
        });
        self.symbols.0[id.index()].id = id;
        self.by_name.insert(name.to_string(), id);
        self.sync_attr_len();
        id
    }

    pub fn get(&self, name: &str) -> Option<SymbolId> {
        self.by_name.get(name).copied()
    }

    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id]
    }

    pub fn name(&self, id: SymbolId) -> &str {
        &self.symbols[id].name
    }

    pub fn is_terminal(&self, id: SymbolId) -> bool {
        self.symbols[id].is_terminal()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter()
    }

    pub fn names(&self, ids: &HashSet<SymbolId>) -> Vec<String> {
        let mut out: Vec<String> = ids.iter().map(|id| self.name(*id).to_string()).collect();
        out.sort();
        out
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}
