//! C5: parse table construction.
//!
//! Grounded in `hermes_gen/parseTable.py`'s `Action`/`ParseAction`/
//! `ParseTable`, but deliberately diverging from its conflict policy: the
//! original raises on the first conflict it finds. This crate instead
//! accumulates every conflict it finds, prefers SHIFT over REDUCE when a
//! cell collides, and keeps the
//! first-reported rule on a REDUCE/REDUCE collision — so building a table
//! always succeeds, and callers decide (via `-s/--strict`) whether
//! unresolved conflicts should fail the run.

use indexmap::IndexMap;

use crate::automaton::Automaton;
use crate::grammar::Grammar;
use crate::index::{RuleId, StateId, SymbolId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Shift(StateId),
    Reduce(RuleId),
    Accept,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    ShiftReduce,
    ReduceReduce,
}

#[derive(Debug, Clone)]
pub struct Conflict {
    pub kind: ConflictKind,
    pub state: StateId,
    pub symbol: SymbolId,
    /// The action that was kept in the table cell.
    pub kept: Action,
    /// The action that lost and was discarded.
    pub discarded: Action,
}

#[derive(Debug, Clone, Default)]
pub struct ActionRow(pub IndexMap<SymbolId, Action>);

#[derive(Debug, Clone, Default)]
pub struct GotoRow(pub IndexMap<SymbolId, StateId>);

pub struct ParseTable {
    pub action: Vec<ActionRow>,
    pub goto: Vec<GotoRow>,
    pub conflicts: Vec<Conflict>,
}

impl ParseTable {
    pub fn action_at(&self, state: StateId, symbol: SymbolId) -> Option<Action> {
        self.action[state.index()].0.get(&symbol).copied()
    }

    pub fn goto_at(&self, state: StateId, symbol: SymbolId) -> Option<StateId> {
        self.goto[state.index()].0.get(&symbol).copied()
    }

    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }
}

/// Builds the ACTION/GOTO tables from a completed LALR(1) automaton.
/// Column order within a row follows insertion order (shift actions are
/// inserted while walking `state.transitions`, then reduce actions while
/// walking `state.items`); columns are insertion-ordered and never
/// re-sorted.
pub fn build(grammar: &Grammar, automaton: &Automaton) -> ParseTable {
    let mut action: Vec<ActionRow> = (0..automaton.states.len()).map(|_| ActionRow::default()).collect();
    let mut goto: Vec<GotoRow> = (0..automaton.states.len()).map(|_| GotoRow::default()).collect();
    let mut conflicts = Vec::new();

    for state in automaton.states.iter() {
        for (&sym, &to) in &state.transitions {
            if grammar.symbols.is_terminal(sym) {
                set_action(
                    &mut action[state.id.index()],
                    state.id,
                    sym,
                    Action::Shift(to),
                    &mut conflicts,
                );
            } else {
                goto[state.id.index()].0.insert(sym, to);
            }
        }

        for item in &state.items {
            if !item.at_end(grammar) {
                continue;
            }
            let rule = grammar.rule(item.rule);
            let act = if rule.lhs == grammar.start {
                Action::Accept
            } else {
                Action::Reduce(item.rule)
            };
            set_action(&mut action[state.id.index()], state.id, item.lookahead, act, &mut conflicts);
        }
    }

    ParseTable { action, goto, conflicts }
}

/// Inserts `act` into `row[symbol]`, resolving a collision this way:
/// SHIFT always wins over REDUCE; on REDUCE/REDUCE the
/// first-reported rule (lowest rule id, i.e. the one already occupying the
/// cell) is kept. Every collision is recorded as a [`Conflict`] regardless
/// of how it was resolved.
fn set_action(row: &mut ActionRow, state: StateId, symbol: SymbolId, act: Action, conflicts: &mut Vec<Conflict>) {
    match row.0.get(&symbol).copied() {
        None => {
            row.0.insert(symbol, act);
        }
        Some(existing) => {
            let (kept, discarded, kind) = resolve(existing, act);
            conflicts.push(Conflict {
                kind,
                state,
                symbol,
                kept,
                discarded,
            });
            row.0.insert(symbol, kept);
        }
    }
}

fn resolve(existing: Action, incoming: Action) -> (Action, Action, ConflictKind) {
    match (existing, incoming) {
        (Action::Shift(_), Action::Reduce(_)) => (existing, incoming, ConflictKind::ShiftReduce),
        (Action::Reduce(_), Action::Shift(_)) => (incoming, existing, ConflictKind::ShiftReduce),
        (Action::Reduce(a), Action::Reduce(b)) => {
            // Keep whichever rule id is lower, i.e. whichever rule appeared
            // earlier in the grammar source -- the "first-reported" rule.
            if a.index() <= b.index() {
                (existing, incoming, ConflictKind::ReduceReduce)
            } else {
                (incoming, existing, ConflictKind::ReduceReduce)
            }
        }
        // Shift/Shift and Accept collisions cannot arise from a
        // deterministic LALR(1) automaton: two distinct shift targets on
        // the same symbol from the same state would mean the automaton
        // itself has a duplicate transition, and Accept only ever occurs
        // on END from the unique augmented start rule.
        _ => (existing, incoming, ConflictKind::ShiftReduce),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton;
    use crate::firstfollow;
    use crate::grammar::parse_grammar_str;

    fn build_table(src: &str) -> (Grammar, ParseTable) {
        let mut g = parse_grammar_str(src, "test").unwrap();
        firstfollow::compute(&mut g);
        let a = automaton::build(&g);
        let t = build(&g, &a);
        (g, t)
    }

    #[test]
    fn unambiguous_grammar_has_no_conflicts() {
        let src = r#"
%return Start
Start = A B ;
A = "a" ;
B = "b" ;
"#;
        let (_, table) = build_table(src);
        assert!(!table.has_conflicts());
    }

    #[test]
    fn dangling_else_style_grammar_has_shift_reduce_conflict_resolved_to_shift() {
        let src = r#"
%return S
S = if S | if S else S | "x" ;
if = "if" ;
else = "else" ;
"#;
        let (_, table) = build_table(src);
        assert!(table.has_conflicts());
        assert!(table
            .conflicts
            .iter()
            .all(|c| matches!(c.kind, ConflictKind::ShiftReduce)));
        for c in &table.conflicts {
            assert!(matches!(c.kept, Action::Shift(_)));
        }
    }
}
