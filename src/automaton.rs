//! C4: LALR(1) item sets and the state automaton.
//!
//! Grounded in `hermes_gen/lalr1_automata.py`'s `AnnotRule`/`Node`/
//! `LALR1Automata` (kernel items, closure, GOTO, core-merge worklist) and in
//! `rustemo`'s `table.rs` `LRItem`/`LRState`/`closure()` for the Rust
//! shape of an item set (dense ids, `IndexMap`-based transition tables).
//! LALR(1) is built directly rather than by reducing a canonical LR(1)
//! automaton: states are identified by their LR(0) core (rule, dot) and
//! lookahead sets are unioned into a state's items whenever a new
//! occurrence of that core is produced from any predecessor state, exactly
//! as `LALR1Automata._findOrCreateNode` does in the original.

use std::collections::BTreeSet;

use indexmap::IndexMap;

use crate::firstfollow::first_of_sequence;
use crate::grammar::Grammar;
use crate::index::{RuleId, StateId, StateVec, SymbolId};

/// One LALR(1) item: `rule` with the dot before `rhs[dot]` (or at the end
/// if `dot == rhs.len()`), plus one lookahead terminal it is valid under.
/// A state holds one `Item` per (rule, dot, lookahead) triple; distinct
/// lookaheads for the same (rule, dot) are distinct `Item`s so that
/// `State::core` can compare only the (rule, dot) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Item {
    pub rule: RuleId,
    pub dot: usize,
    pub lookahead: SymbolId,
}

impl Item {
    fn core(&self) -> (RuleId, usize) {
        (self.rule, self.dot)
    }

    pub fn at_end(&self, grammar: &Grammar) -> bool {
        self.dot >= grammar.rule(self.rule).len()
    }

    pub fn symbol_after_dot(&self, grammar: &Grammar) -> Option<SymbolId> {
        grammar.rule(self.rule).rhs.get(self.dot).copied()
    }
}

#[derive(Debug, Clone)]
pub struct State {
    pub id: StateId,
    /// Kernel items: the items this state was constructed from, before
    /// closure. For state 0 the kernel is the augmented start item.
    pub kernel: BTreeSet<Item>,
    /// Kernel plus every item added by closure.
    pub items: BTreeSet<Item>,
    pub transitions: IndexMap<SymbolId, StateId>,
}

impl State {
    fn core(items: &BTreeSet<Item>) -> BTreeSet<(RuleId, usize)> {
        items.iter().map(Item::core).collect()
    }
}

pub struct Automaton {
    pub states: StateVec<State>,
    pub start: StateId,
    pub start_rule: RuleId,
}

/// Expands `items` with every item the grammar's closure relation adds:
/// for each item `A -> α · B β, la` with `B` a nonterminal, adds
/// `B -> · γ, la'` for every rule `B -> γ` and every `la'` in
/// FIRST(βla).
fn closure(items: BTreeSet<Item>, grammar: &Grammar) -> BTreeSet<Item> {
    let mut items = items;
    loop {
        let mut additions = Vec::new();
        for item in items.iter() {
            let Some(sym) = item.symbol_after_dot(grammar) else {
                continue;
            };
            if grammar.symbols.is_terminal(sym) {
                continue;
            }
            let rest = &grammar.rule(item.rule).rhs[item.dot + 1..];
            let lookaheads = first_of_sequence(grammar, rest, item.lookahead);
            for rule in grammar.rules_for(sym) {
                for &la in &lookaheads {
                    additions.push(Item {
                        rule: rule.id,
                        dot: 0,
                        lookahead: la,
                    });
                }
            }
        }
        let before = items.len();
        items.extend(additions);
        if items.len() == before {
            break;
        }
    }
    items
}

/// GOTO(items, symbol): the kernel of the successor state reached by
/// shifting the dot over `symbol`.
fn goto_kernel(items: &BTreeSet<Item>, symbol: SymbolId, grammar: &Grammar) -> BTreeSet<Item> {
    items
        .iter()
        .filter(|item| item.symbol_after_dot(grammar) == Some(symbol))
        .map(|item| Item {
            rule: item.rule,
            dot: item.dot + 1,
            lookahead: item.lookahead,
        })
        .collect()
}

/// Builds the full LALR(1) automaton. `grammar.start` must already have
/// its synthetic single-RHS start rule; `start_rule` is that
/// rule's id (always `RuleId(0)` as produced by `grammar::finish`, but
/// looked up here rather than assumed).
pub fn build(grammar: &Grammar) -> Automaton {
    let start_rule = grammar
        .rules
        .iter()
        .find(|r| r.lhs == grammar.start)
        .expect("grammar has a start rule")
        .id;

    let start_kernel: BTreeSet<Item> = [Item {
        rule: start_rule,
        dot: 0,
        lookahead: grammar.symbols.end,
    }]
    .into_iter()
    .collect();

    let mut states: StateVec<State> = StateVec::new();
    let mut core_index: IndexMap<BTreeSet<(RuleId, usize)>, StateId> = IndexMap::new();

    let start_items = closure(start_kernel.clone(), grammar);
    let start_id = states.push(State {
        id: StateId(0),
        kernel: start_kernel.clone(),
        items: start_items,
        transitions: IndexMap::new(),
    });
    core_index.insert(State::core(&start_kernel), start_id);

    let mut worklist = vec![start_id];
    while let Some(state_id) = worklist.pop() {
        let items = states[state_id].items.clone();

        let mut symbols: BTreeSet<SymbolId> = BTreeSet::new();
        for item in &items {
            if let Some(sym) = item.symbol_after_dot(grammar) {
                symbols.insert(sym);
            }
        }

        for sym in symbols {
            let kernel = goto_kernel(&items, sym, grammar);
            if kernel.is_empty() {
                continue;
            }
            let core = State::core(&kernel);

            if let Some(&existing_id) = core_index.get(&core) {
                let changed = merge_lookaheads(&mut states[existing_id].kernel, &kernel);
                if changed {
                    let new_items = closure(states[existing_id].kernel.clone(), grammar);
                    states[existing_id].items = new_items;
                    worklist.push(existing_id);
                }
                states[state_id].transitions.insert(sym, existing_id);
            } else {
                let closed = closure(kernel.clone(), grammar);
                let new_id = states.push(State {
                    id: StateId(states.len()),
                    kernel: kernel.clone(),
                    items: closed,
                    transitions: IndexMap::new(),
                });
                core_index.insert(core, new_id);
                states[state_id].transitions.insert(sym, new_id);
                worklist.push(new_id);
            }
        }
    }

    Automaton {
        states,
        start: start_id,
        start_rule,
    }
}

/// Unions `addition`'s lookaheads into `kernel` in place, returns whether
/// anything changed (i.e. whether the owning state needs its closure and
/// successors recomputed). This is the "LALR core-merge": states sharing
/// an LR(0) core are merged by unioning lookaheads instead of being kept
/// distinct as in a canonical LR(1) automaton.
fn merge_lookaheads(kernel: &mut BTreeSet<Item>, addition: &BTreeSet<Item>) -> bool {
    let before = kernel.len();
    kernel.extend(addition.iter().copied());
    kernel.len() != before
}

/// Every nonterminal GOTO edge out of this state. Used by
/// `counterexample::generator::build_guide` to extend a conflict's guide
/// set with states one nonterminal-transition away from its shortest-path
/// states, so a production step landing there isn't charged as "leaving
/// the guide".
pub fn nonterminal_transitions<'a>(
    state: &'a State,
    grammar: &'a Grammar,
) -> impl Iterator<Item = (SymbolId, StateId)> + 'a {
    state
        .transitions
        .iter()
        .filter(move |(sym, _)| !grammar.symbols.is_terminal(**sym))
        .map(|(&sym, &id)| (sym, id))
}

/// A human-readable dump of every state's items and transitions, restored
/// from `LALR1Automata.writeDescription`. The automaton itself is purely
/// an internal data structure, but a debug writer is a near-zero-cost
/// addition that every other module's tests lean on for diagnostics.
pub fn describe(automaton: &Automaton, grammar: &Grammar) -> String {
    let mut out = String::new();
    for state in automaton.states.iter() {
        out.push_str(&format!("State {}\n", state.id.index()));
        for item in &state.items {
            let rule = grammar.rule(item.rule);
            let mut rhs_str = String::new();
            for (i, &sym) in rule.rhs.iter().enumerate() {
                if i == item.dot {
                    rhs_str.push_str(". ");
                }
                rhs_str.push_str(grammar.symbols.name(sym));
                rhs_str.push(' ');
            }
            if item.dot == rule.rhs.len() {
                rhs_str.push_str(". ");
            }
            out.push_str(&format!(
                "  {} -> {}[{}]\n",
                grammar.symbols.name(rule.lhs),
                rhs_str.trim(),
                grammar.symbols.name(item.lookahead)
            ));
        }
        for (&sym, &to) in &state.transitions {
            out.push_str(&format!(
                "  on {} -> state {}\n",
                grammar.symbols.name(sym),
                to.index()
            ));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::firstfollow;
    use crate::grammar::parse_grammar_str;

    fn build_g(src: &str) -> (Grammar, Automaton) {
        let mut g = parse_grammar_str(src, "test").unwrap();
        firstfollow::compute(&mut g);
        let a = build(&g);
        (g, a)
    }

    #[test]
    fn g10_has_seven_states() {
        // The expanded G10 grammar from the counterexample paper's figure 3
        // builds a 7-state LALR automaton after core merging.
        let src = r#"
%return S
S = A | B ;
A = "a" X "c" ;
A = "a" Y "d" ;
B = "b" X "d" ;
B = "b" Y "c" ;
X = "e" ;
Y = "e" ;
"#;
        let (_, automaton) = build_g(src);
        assert_eq!(automaton.states.len(), 7);
    }

    #[test]
    fn simple_concat_grammar_has_no_conflicting_cores() {
        let src = r#"
%return Start
Start = A B ;
A = "a" ;
B = "b" ;
"#;
        let (g, automaton) = build_g(src);
        assert!(automaton.states.len() >= 4);
        let desc = describe(&automaton, &g);
        assert!(desc.contains("State 0"));
    }
}
