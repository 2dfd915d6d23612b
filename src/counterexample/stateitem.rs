//! `StateItem`: an interned (state, item-core) pair, the substrate the
//! counterexample search walks instead of walking `automaton::State`s
//! directly.
//!
//! Grounded in `hermes_gen/counterexample/stateItem.py`'s `StateItem`
//! class: each one records a forward shift transition (the GOTO edge a
//! dotted rule follows when its next symbol is shifted) and forward
//! "production" edges (the closure edges introduced when the symbol after
//! the dot is a nonterminal), plus the reverse of both, since the search
//! in `generator.rs` walks the automaton backwards from a conflict state
//! towards the start state.

use std::collections::HashMap;

use crate::automaton::Automaton;
use crate::grammar::Grammar;
use crate::index::{RuleId, StateId, StateItemId, StateItemVec, SymbolId};

#[derive(Debug, Clone)]
pub struct StateItem {
    pub id: StateItemId,
    pub state: StateId,
    pub rule: RuleId,
    pub dot: usize,

    /// GOTO(state, rhs[dot]) core, if `dot` isn't already at the end.
    pub shift_to: Option<StateItemId>,
    pub shift_from: Vec<StateItemId>,

    /// Items this item's closure directly introduces (same state, `dot ==
    /// 0`, one per rule of the nonterminal after this item's dot).
    pub produces: Vec<StateItemId>,
    pub produced_by: Vec<StateItemId>,
}

impl StateItem {
    pub fn at_end(&self, grammar: &Grammar) -> bool {
        self.dot >= grammar.rule(self.rule).len()
    }

    pub fn symbol_after_dot(&self, grammar: &Grammar) -> Option<SymbolId> {
        grammar.rule(self.rule).rhs.get(self.dot).copied()
    }
}

pub struct StateItemTable {
    pub items: StateItemVec<StateItem>,
    by_core: HashMap<(StateId, RuleId, usize), StateItemId>,
}

impl StateItemTable {
    pub fn get(&self, id: StateItemId) -> &StateItem {
        &self.items[id]
    }

    pub fn find(&self, state: StateId, rule: RuleId, dot: usize) -> Option<StateItemId> {
        self.by_core.get(&(state, rule, dot)).copied()
    }
}

/// Builds the `StateItem` graph for every (state, item-core) pair reachable
/// in `automaton`, wiring up shift and production edges in both
/// directions. Distinct lookaheads on the same (state, rule, dot) collapse
/// to a single `StateItem`, since the search only needs dotted-rule
/// identity, not lookahead -- lookahead sensitivity is handled separately
/// by `generator::is_shortest_lookahead_sensitive_path`.
pub fn build(grammar: &Grammar, automaton: &Automaton) -> StateItemTable {
    let mut items: StateItemVec<StateItem> = StateItemVec::new();
    let mut by_core: HashMap<(StateId, RuleId, usize), StateItemId> = HashMap::new();

    for state in automaton.states.iter() {
        let mut cores: Vec<(RuleId, usize)> = state.items.iter().map(|it| (it.rule, it.dot)).collect();
        cores.sort();
        cores.dedup();
        for (rule, dot) in cores {
            let id = items.push(StateItem {
                id: StateItemId(0),
                state: state.id,
                rule,
                dot,
                shift_to: None,
                shift_from: Vec::new(),
                produces: Vec::new(),
                produced_by: Vec::new(),
            });
            items.0[id.index()].id = id;
            by_core.insert((state.id, rule, dot), id);
        }
    }

    let ids: Vec<StateItemId> = items.iter().map(|si| si.id).collect();
    for id in ids {
        let (state, rule, dot) = {
            let si = &items[id];
            (si.state, si.rule, si.dot)
        };
        let grammar_rule = grammar.rule(rule);
        let Some(&sym) = grammar_rule.rhs.get(dot) else {
            continue;
        };

        if let Some(&to_state) = automaton.states[state].transitions.get(&sym) {
            if let Some(&target) = by_core.get(&(to_state, rule, dot + 1)) {
                items[id].shift_to = Some(target);
                items[target].shift_from.push(id);
            }
        }

        if !grammar.symbols.is_terminal(sym) {
            for prod_rule in grammar.rules_for(sym) {
                if let Some(&target) = by_core.get(&(state, prod_rule.id, 0)) {
                    items[id].produces.push(target);
                    items[target].produced_by.push(id);
                }
            }
        }
    }

    StateItemTable { items, by_core }
}
