//! Pairing a table conflict with its rendered counterexample.
//!
//! Grounded in `hermes_gen/counterexample/conflict.py`'s `Conflict` class,
//! which bundles the raw shift/reduce or reduce/reduce collision together
//! with the two derivation trees the search found for it and a
//! human-readable description. Named `CounterExample` here rather than
//! `Conflict` to avoid colliding with [`crate::table::Conflict`], which
//! this type wraps.

use crate::counterexample::derivation::Derivation;
use crate::grammar::Grammar;
use crate::table::{Conflict, ConflictKind};

pub struct CounterExample {
    pub conflict: Conflict,
    /// Derivation under the REDUCE interpretation (or the first-listed
    /// rule, for a reduce/reduce conflict).
    pub reduce_derivation: Derivation,
    /// Derivation under the SHIFT interpretation (or the second-listed
    /// rule, for a reduce/reduce conflict).
    pub shift_derivation: Derivation,
    /// `true` when both derivations reach an identical state with an
    /// identical remaining lookahead, i.e. the grammar is genuinely
    /// ambiguous at this point, not just consuming different amounts of
    /// lookahead to disambiguate (the search's Stage 3 unification check).
    pub truly_ambiguous: bool,
    /// `true` when either side's search hit [`crate::counterexample::costs::SEARCH_TIME_LIMIT`]
    /// and had to fall back to the unweighted shortest-path search rather
    /// than the complexity-ordered one. Never fatal: the derivations are
    /// still a valid, if possibly needlessly long, counterexample.
    pub timeout: bool,
}

impl CounterExample {
    pub fn describe(&self, grammar: &Grammar) -> String {
        let label = match self.conflict.kind {
            ConflictKind::ShiftReduce => "shift/reduce conflict",
            ConflictKind::ReduceReduce => "reduce/reduce conflict",
        };
        let symbol = grammar.symbols.name(self.conflict.symbol);
        let mut out = format!(
            "{label} on '{symbol}' in state {}\n",
            self.conflict.state.index()
        );
        out.push_str(&format!("  reduce path: {}\n", self.reduce_derivation.flat(grammar)));
        out.push_str(&format!("  shift path:  {}\n", self.shift_derivation.flat(grammar)));
        if !self.truly_ambiguous {
            out.push_str("  (paths diverge only in how much lookahead is needed to tell them apart)\n");
        }
        if self.timeout {
            out.push_str("  (search timed out, this counterexample may not be the shortest one)\n");
        }
        out
    }
}
