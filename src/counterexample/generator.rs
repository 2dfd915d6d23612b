//! The counterexample search itself.
//!
//! Grounded in `hermes_gen/counterexample/counterexampleGen.py`'s
//! `CounterExampleGen`: starting from the two `StateItem`s that collide in
//! a conflict cell, grow two parallel configurations backwards towards
//! the unique start item along reverse shift and reverse production
//! edges, cheapest ([`crate::counterexample::costs`]) first, until both
//! paths reach the start item. Unlike growing two independent trees and
//! comparing their roots afterwards, the two paths are walked inside one
//! [`Configuration`] so the search notices the moment they land on the
//! identical state-item (`Configuration::unifying`) -- the real witness
//! that the grammar is ambiguous here, not just that two different trees
//! happen to share a root symbol.
//!
//! The full paper algorithm additionally expands across FIRST-set
//! closures when the shift interpretation's next terminal is only
//! reachable through a chain of nonterminal productions (`_expandFirst`),
//! restricts the backward search to a `guide` set of state ids found by a
//! cheap shortest-path pass (crossing out of the guide costs
//! `costs::EXTENDED`), and falls back to an unweighted shortest-path
//! search entirely when the complexity-ordered search exceeds its time
//! budget (`_exampleFromShortestPath` / `_getShortestPathFromStart`). All
//! three are implemented below.

use std::collections::HashSet;
use std::time::Instant;

use crate::automaton::Automaton;
use crate::counterexample::conflict::CounterExample;
use crate::counterexample::configuration::{Configuration, ComplexityQueue};
use crate::counterexample::derivation::Derivation;
use crate::counterexample::stateitem::StateItemTable;
use crate::error::{CoreError, Result};
use crate::grammar::Grammar;
use crate::index::{StateId, StateItemId, SymbolId};
use crate::log;
use crate::settings::Settings;
use crate::table::{Action, Conflict, ConflictKind, ParseTable};

/// Finds the `StateItem` in `conflict.state` that represents the reduce
/// side of the conflict: the item at the end of `rule` with dot ==
/// `rule.len()`.
fn reduce_item(table: &StateItemTable, conflict_state: StateId, rule: crate::index::RuleId, grammar: &Grammar) -> Option<StateItemId> {
    let len = grammar.rule(rule).len();
    table.find(conflict_state, rule, len)
}

/// Finds a `StateItem` in `conflict.state` whose next symbol is the
/// conflict terminal directly, shifting to find one through a chain of
/// `produces` edges when the terminal is only reachable via nonterminal
/// closures -- the Rust counterpart of `_expandFirst` in the original.
fn shift_item(
    items: &StateItemTable,
    grammar: &Grammar,
    conflict_state: StateId,
    symbol: SymbolId,
) -> Option<StateItemId> {
    let candidates: Vec<StateItemId> = items
        .items
        .iter()
        .filter(|si| si.state == conflict_state)
        .map(|si| si.id)
        .collect();

    for &id in &candidates {
        let si = items.get(id);
        if si.symbol_after_dot(grammar) == Some(symbol) {
            return Some(id);
        }
    }

    // breadth-first walk over `produces` edges (closure expansion) looking
    // for an item whose next symbol is the conflict terminal.
    let mut seen = std::collections::HashSet::new();
    let mut queue: std::collections::VecDeque<StateItemId> = candidates.into_iter().collect();
    while let Some(id) = queue.pop_front() {
        if !seen.insert(id) {
            continue;
        }
        let si = items.get(id);
        if si.symbol_after_dot(grammar) == Some(symbol) {
            return Some(id);
        }
        for &next in &si.produces {
            queue.push_back(next);
        }
    }
    None
}

/// Plain unweighted BFS from `start` back towards the automaton's start
/// item, returning the chain of `(state-item, is_shift)` pairs walked,
/// ordered outward from the automaton's start item down to `start` itself.
/// `is_shift` records whether the step from the previous chain entry to
/// this one was a reverse-shift edge as opposed to a reverse-production
/// edge, so callers don't have to re-guess the edge kind from the
/// item's shape. Used both as the shortest-path fallback proper and to
/// build the `guide` set of state-ids that restricts the complexity-ordered
/// search.
fn shortest_chain_to_start(
    table: &StateItemTable,
    automaton: &Automaton,
    start: StateItemId,
) -> Option<Vec<(StateItemId, bool)>> {
    use std::collections::{HashMap, VecDeque};

    let mut prev: HashMap<StateItemId, (StateItemId, bool)> = HashMap::new();
    let mut queue = VecDeque::new();
    queue.push_back(start);
    let mut visited = std::collections::HashSet::new();
    visited.insert(start);

    let mut found = None;
    while let Some(id) = queue.pop_front() {
        let item = table.get(id);
        if item.state == automaton.start {
            found = Some(id);
            break;
        }
        for &p in item.shift_from.iter() {
            if visited.insert(p) {
                prev.insert(p, (id, true));
                queue.push_back(p);
            }
        }
        for &p in item.produced_by.iter() {
            if visited.insert(p) {
                prev.insert(p, (id, false));
                queue.push_back(p);
            }
        }
    }

    // Built automaton-start-first: `chain[0]` is `found`, `chain.last()`
    // is `start`. For `i >= 1`, `chain[i].1` is the edge type connecting
    // `chain[i - 1]` and `chain[i]`; `chain[0].1` is unused.
    let mut target = found?;
    let mut chain = vec![(target, false)];
    while let Some(&(p, is_shift)) = prev.get(&target) {
        chain.push((p, is_shift));
        target = p;
    }
    Some(chain)
}

/// Builds the guide set for one side of the search: the automaton states
/// touched by that side's shortest path to the start item, plus every
/// state reachable from them by one nonterminal GOTO (`nonterminal_transitions`),
/// since a production step legitimately lands one nonterminal-transition
/// away from the guiding path without that being "leaving the guide".
fn build_guide(table: &StateItemTable, automaton: &Automaton, grammar: &Grammar, start: StateItemId) -> HashSet<StateId> {
    let mut guide = HashSet::new();
    let Some(chain) = shortest_chain_to_start(table, automaton, start) else {
        return guide;
    };
    for (id, _) in chain {
        let state_id = table.get(id).state;
        guide.insert(state_id);
        let state = &automaton.states[state_id];
        for (_, to) in crate::automaton::nonterminal_transitions(state, grammar) {
            guide.insert(to);
        }
    }
    guide
}

/// Rebuilds a derivation by walking a shortest-path chain (see
/// [`shortest_chain_to_start`]) starting from `start` (already seeded)
/// outward to the automaton's start item, alternating shift and
/// production wrapping to match
/// [`Configuration::extend1_shift`]/[`extend1_production`]'s tree shape.
/// Used only by the unweighted fallback.
fn derivation_from_chain(table: &StateItemTable, grammar: &Grammar, start: StateItemId, chain: &[(StateItemId, bool)]) -> Derivation {
    let mut derivation = super::configuration::seed_derivation(table, grammar, start);
    if chain.is_empty() {
        return derivation;
    }
    for k in (0..chain.len() - 1).rev() {
        let (id, _) = chain[k];
        let (_, is_shift) = chain[k + 1];
        let item = table.get(id);
        let rule = grammar.rule(item.rule);
        derivation = if is_shift {
            let sym = rule.rhs[item.dot];
            Derivation::node(rule.lhs, vec![Derivation::leaf(sym), derivation])
        } else {
            Derivation::node(rule.lhs, vec![derivation])
        };
    }
    derivation
}

/// Plain unweighted BFS fallback, used when the complexity-ordered search
/// exceeds its time budget. Grounded in `_getShortestPathFromStart` /
/// `_exampleFromShortestPath`: rather than searching for the cheapest
/// derivation, just find *any* path back to the start item so a
/// counterexample (possibly a long one) can still be reported instead of
/// giving up entirely.
fn shortest_path_from_start(
    table: &StateItemTable,
    grammar: &Grammar,
    automaton: &Automaton,
    start: StateItemId,
) -> Option<Derivation> {
    let chain = shortest_chain_to_start(table, automaton, start)?;
    Some(derivation_from_chain(table, grammar, start, &chain))
}

/// Drives the two-path complexity-ordered search for one conflict,
/// returning the reduce-side derivation, the shift-side derivation,
/// whether they unified, and whether either side had to fall back to the
/// unweighted shortest path after the time budget expired.
fn search(
    table: &StateItemTable,
    grammar: &Grammar,
    automaton: &Automaton,
    reduce_si: StateItemId,
    other_si: StateItemId,
    settings: &Settings,
) -> Result<(Derivation, Derivation, bool, bool)> {
    let guide1 = build_guide(table, automaton, grammar, reduce_si);
    let guide2 = build_guide(table, automaton, grammar, other_si);

    let deadline = Instant::now();
    let mut warned = false;
    let mut queue = ComplexityQueue::new();
    queue.push(Configuration::start(table, grammar, reduce_si, other_si));

    let mut visited = std::collections::HashSet::new();
    let mut stage3_result: Option<Configuration> = None;

    while let Some(config) = queue.pop() {
        if deadline.elapsed() > settings.time_limit {
            break;
        }
        if !warned && deadline.elapsed() > settings.assurance_limit {
            log::info("counterexample search is taking longer than usual, still working...");
            warned = true;
        }

        let key = (config.front1(), config.front2());
        if !visited.insert(key) {
            continue;
        }

        if config.is_done(table, automaton.start) {
            return Ok((config.deriv1, config.deriv2, config.unifying, false));
        }
        if config.unifying && stage3_result.is_none() {
            stage3_result = Some(config.clone());
        }

        let item1 = table.get(config.front1());
        let item2 = table.get(config.front2());
        let sym1 = item1.symbol_after_dot(grammar);
        let sym2 = item2.symbol_after_dot(grammar);

        if let (Some(y1), Some(y2)) = (sym1, sym2) {
            if y1 == y2 {
                for &via1 in &item1.shift_from {
                    for &via2 in &item2.shift_from {
                        if table.get(via1).state == table.get(via2).state {
                            queue.push(config.extend_joint_shift(table, grammar, via1, via2));
                        }
                    }
                }
            }
        }
        for &via in &item1.shift_from {
            queue.push(config.extend1_shift(table, grammar, via, &guide1));
        }
        for &via in &item1.produced_by {
            queue.push(config.extend1_production(table, grammar, via, &guide1));
        }
        for &via in &item2.shift_from {
            queue.push(config.extend2_shift(table, grammar, via, &guide2));
        }
        for &via in &item2.produced_by {
            queue.push(config.extend2_production(table, grammar, via, &guide2));
        }
    }

    if let Some(config) = stage3_result {
        return Ok((config.deriv1, config.deriv2, config.unifying, true));
    }

    let d1 = shortest_path_from_start(table, grammar, automaton, reduce_si)
        .ok_or(CoreError::DerivationNotFound)?;
    let d2 = shortest_path_from_start(table, grammar, automaton, other_si)
        .ok_or(CoreError::DerivationNotFound)?;
    let unifying = d1.symbol == d2.symbol;
    Ok((d1, d2, unifying, true))
}

/// Builds the counterexample for one table [`Conflict`].
pub fn generate(
    grammar: &Grammar,
    automaton: &Automaton,
    items: &StateItemTable,
    conflict: &Conflict,
    settings: &Settings,
) -> Result<CounterExample> {
    let (reduce_rule, other_rule_or_shift) = match (conflict.kept, conflict.discarded) {
        (Action::Shift(_), Action::Reduce(r)) => (r, None),
        (Action::Reduce(r), Action::Shift(_)) => (r, None),
        (Action::Reduce(a), Action::Reduce(b)) => (a, Some(b)),
        _ => unreachable!("set_action never stores this collision shape"),
    };

    let reduce_si = reduce_item(items, conflict.state, reduce_rule, grammar)
        .ok_or(CoreError::MissingTransition("reduce item".to_string()))?;

    let other_si = match other_rule_or_shift {
        None => shift_item(items, grammar, conflict.state, conflict.symbol).ok_or(CoreError::ExpandFirstFailed {
            symbol: grammar.symbols.name(conflict.symbol).to_string(),
        })?,
        Some(other_rule) => {
            let len = grammar.rule(other_rule).len();
            table_core_fallback(items, conflict.state, other_rule, len)
                .ok_or(CoreError::MissingTransition("reduce/reduce item".to_string()))?
        }
    };

    let (reduce_derivation, shift_derivation, truly_ambiguous, timeout) =
        search(items, grammar, automaton, reduce_si, other_si, settings)?;

    Ok(CounterExample {
        conflict: conflict.clone(),
        reduce_derivation,
        shift_derivation,
        truly_ambiguous,
        timeout,
    })
}

fn table_core_fallback(
    items: &StateItemTable,
    state: StateId,
    rule: crate::index::RuleId,
    dot: usize,
) -> Option<StateItemId> {
    items.find(state, rule, dot)
}

/// Generates a counterexample for every conflict the parse table recorded,
/// in the order they were collected. A grammar with `N` conflicts gets `N`
/// counterexamples; none are skipped, unlike `--hide-conflicts`, which only
/// affects what the CLI prints.
pub fn generate_all(
    grammar: &Grammar,
    automaton: &Automaton,
    table: &ParseTable,
    settings: &Settings,
) -> Result<Vec<CounterExample>> {
    let items = crate::counterexample::stateitem::build(grammar, automaton);
    let mut out = Vec::with_capacity(table.conflicts.len());
    for conflict in &table.conflicts {
        out.push(generate(grammar, automaton, &items, conflict, settings)?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{automaton, firstfollow, grammar::parse_grammar_str, table};

    #[test]
    fn dangling_else_produces_a_counterexample_per_conflict() {
        let src = r#"
%return S
S = if S | if S else S | "x" ;
if = "if" ;
else = "else" ;
"#;
        let mut g = parse_grammar_str(src, "test").unwrap();
        firstfollow::compute(&mut g);
        let a = automaton::build(&g);
        let t = table::build(&g, &a);
        assert!(t.has_conflicts());

        let examples = generate_all(&g, &a, &t, &Settings::default()).unwrap();
        assert_eq!(examples.len(), t.conflicts.len());
        for ex in &examples {
            assert!(matches!(ex.conflict.kind, ConflictKind::ShiftReduce));
            let described = ex.describe(&g);
            assert!(described.contains('\u{2022}'), "rendered counterexample should show the conflict DOT: {described}");
        }
    }

    /// `S = T | S T; T = X | Y; X = a; Y = a a b`
    /// has a non-unifying shift/reduce conflict on lookahead `a` whose two
    /// derivations diverge only in how much is needed to disambiguate:
    /// `a • a` (reduce side, `X = a` done) vs `a • a b` (shift side, still
    /// inside `Y = a a b`).
    #[test]
    fn unambiguous_shift_reduce_yields_non_unifying_counterexample() {
        let src = r#"
%return S
S = T | S T ;
T = X | Y ;
X = "a" ;
Y = "a" "a" "b" ;
"#;
        let mut g = parse_grammar_str(src, "test").unwrap();
        firstfollow::compute(&mut g);
        let a = automaton::build(&g);
        let t = table::build(&g, &a);
        assert!(t.has_conflicts());

        let examples = generate_all(&g, &a, &t, &Settings::default()).unwrap();
        assert!(!examples.is_empty());
        // At least one conflict in this grammar is the genuinely
        // non-unifying X-vs-Y ambiguity described above.
        assert!(examples.iter().any(|ex| !ex.truly_ambiguous));
    }

    /// The classic `num = num DIGIT | DIGIT` left recursion nested under an
    /// assignment statement. The DIGIT/DIGIT conflict (reduce a completed
    /// single-digit `num` vs. shift into another `num DIGIT` step) unifies,
    /// since both interpretations are the same `num` production up to the
    /// conflict point -- unlike the grammar above, whose two sides are
    /// genuinely unrelated productions.
    #[test]
    fn ambiguous_shift_reduce_yields_unifying_counterexample() {
        let src = r#"
%return stmt
stmt = id assign num colon stmt stmt | id assign num ;
num = num digit | digit ;
id = "ID" ;
assign = "ASSIGN" ;
colon = "COLON" ;
digit = "DIGIT" ;
"#;
        let mut g = parse_grammar_str(src, "test").unwrap();
        firstfollow::compute(&mut g);
        let a = automaton::build(&g);
        let t = table::build(&g, &a);
        assert!(t.has_conflicts());

        let examples = generate_all(&g, &a, &t, &Settings::default()).unwrap();
        assert!(!examples.is_empty());
        // The `num` left-recursion conflict is a genuinely unifying one:
        // both sides are mid-derivation of the same `num` production when
        // they diverge.
        assert!(examples.iter().any(|ex| ex.truly_ambiguous));
        let unifying_example = examples.iter().find(|ex| ex.truly_ambiguous).unwrap();
        let described = unifying_example.describe(&g);
        assert!(described.contains("digit"), "expected the num/digit conflict in: {described}");
    }
}
