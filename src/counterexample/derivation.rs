//! Derivation trees: the shape a counterexample is rendered as.
//!
//! Grounded in `hermes_gen/counterexample/derivation.py`'s `Derivation`
//! class: a symbol plus optional children, a `DOT` sentinel marking where
//! the parser's read head sits within a partially-built tree, and two
//! renderings (a flat one-liner with the dot inlined, and an indented tree
//! using "↳" connectors). Equality is overridden to compare only the root
//! symbol -- this is load-bearing, not incidental: the search in
//! `generator.rs` detects that two independently-grown derivations have
//! "unified" by comparing their frontier `Derivation`s with `==`, which
//! must ignore subtree shape or the search would never terminate.

use crate::grammar::Grammar;
use crate::index::SymbolId;

/// Sentinel standing in for the parser's "dot" (its current read
/// position) when it sits between two children of an unfinished
/// production, rendered as `.` in [`Derivation::flat`].
pub const DOT: Option<SymbolId> = None;

#[derive(Debug, Clone)]
pub struct Derivation {
    pub symbol: Option<SymbolId>,
    pub children: Option<Vec<Derivation>>,
}

impl Derivation {
    pub fn leaf(symbol: SymbolId) -> Self {
        Self {
            symbol: Some(symbol),
            children: None,
        }
    }

    pub fn dot() -> Self {
        Self {
            symbol: DOT,
            children: None,
        }
    }

    pub fn node(symbol: SymbolId, children: Vec<Derivation>) -> Self {
        Self {
            symbol: Some(symbol),
            children: Some(children),
        }
    }

    pub fn is_dot(&self) -> bool {
        self.symbol.is_none()
    }

    /// Leaves of this tree in left-to-right order, flattening nested
    /// productions; the dot sentinel is included in place.
    pub fn frontier(&self) -> Vec<&Derivation> {
        match &self.children {
            None => vec![self],
            Some(children) => children.iter().flat_map(Derivation::frontier).collect(),
        }
    }

    /// `A -> α · β` rendered on one line, the "flat" form used inline in
    /// conflict messages.
    pub fn flat(&self, grammar: &Grammar) -> String {
        self.frontier()
            .iter()
            .map(|d| match d.symbol {
                None => "\u{2022}".to_string(),
                Some(sym) => grammar.symbols.name(sym).to_string(),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// The indented tree form, one child per line connected with "↳",
    /// used by `--no-color`-aware CLI output (`settings::Settings::colors`
    /// gates ANSI codes upstream in `log.rs`, this function only emits
    /// plain structure).
    pub fn pretty_tree(&self, grammar: &Grammar) -> String {
        let mut out = String::new();
        self.pretty_tree_into(grammar, 0, &mut out);
        out
    }

    fn pretty_tree_into(&self, grammar: &Grammar, depth: usize, out: &mut String) {
        let label = match self.symbol {
            None => "\u{2022}".to_string(),
            Some(sym) => grammar.symbols.name(sym).to_string(),
        };
        if depth > 0 {
            out.push_str(&"  ".repeat(depth - 1));
            out.push_str("↳ ");
        }
        out.push_str(&label);
        out.push('\n');
        if let Some(children) = &self.children {
            for child in children {
                child.pretty_tree_into(grammar, depth + 1, out);
            }
        }
    }
}

/// Compares only the root symbol: two derivations "unify" in the search
/// sense when their roots match, regardless of what either tree looks
/// like underneath.
impl PartialEq for Derivation {
    fn eq(&self, other: &Self) -> bool {
        self.symbol == other.symbol
    }
}
impl Eq for Derivation {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_ignores_children() {
        let sym = SymbolId(3);
        let leaf = Derivation::leaf(sym);
        let deep = Derivation::node(sym, vec![Derivation::leaf(SymbolId(9)), Derivation::dot()]);
        assert_eq!(leaf, deep);
    }

    #[test]
    fn dot_is_distinct_from_any_symbol() {
        assert_ne!(Derivation::dot(), Derivation::leaf(SymbolId(0)));
    }
}
