//! Search-frontier configurations and the priority queue that orders them.
//!
//! Grounded in `hermes_gen/counterexample/configurations.py`'s
//! `Configuration`/`ComplexityConfiguration`/`ComplexityQueue` and the
//! `nullableClosure` helper (`configurations.py` lines 24-34, 39-58). The
//! original's `countProductionSteps` disambiguates, within a single
//! multi-item `reverseTransition` prepend, which of several newly-prepended
//! state-items were production steps versus true shifts; this port's
//! `extend*_shift`/`extend*_production` are already unambiguously one or
//! the other per call, so that disambiguation has nothing left to do here
//! and is not carried over. A `Configuration` holds *two* parallel paths being
//! grown backward simultaneously -- `items1`/`derivs1` for the reduce
//! side of the conflict, `items2`/`derivs2` for the shift (or second
//! reduce) side -- since the search must keep both derivations in lockstep
//! to notice when they converge onto the same state-item -- the real
//! Stage 3 unification check -- not merely when their independently-grown
//! roots happen to share a symbol.

use std::cmp::Ordering;
use std::collections::{HashSet, VecDeque};
use std::collections::BinaryHeap;

use crate::counterexample::costs;
use crate::counterexample::derivation::Derivation;
use crate::counterexample::stateitem::StateItemTable;
use crate::grammar::Grammar;
use crate::index::{StateId, StateItemId, SymbolId};

/// Builds the derivation for a conflict's own rule, with [`Derivation::dot`]
/// inserted at `si`'s dot position, marking the first reduction of the
/// conflict side. RHS symbols before the
/// dot are rendered as plain leaves; symbols at and past the dot go
/// through [`nullable_closure`], which degrades to a leaf for any symbol
/// that isn't actually nullable, so the frontier still shows a concrete
/// derivation wherever a nullable nonterminal would otherwise leave a gap.
pub fn seed_derivation(table: &StateItemTable, grammar: &Grammar, si: StateItemId) -> Derivation {
    let item = table.get(si);
    let rule = grammar.rule(item.rule);
    let dot = item.dot.min(rule.rhs.len());
    let mut children = Vec::with_capacity(rule.rhs.len() + 1);
    for &sym in &rule.rhs[..dot] {
        children.push(Derivation::leaf(sym));
    }
    children.push(Derivation::dot());
    children.extend(nullable_closure(grammar, &rule.rhs[dot..]));
    Derivation::node(rule.lhs, children)
}

#[derive(Debug, Clone)]
pub struct Configuration {
    /// Front-to-back: `front()` is the oldest (closest-to-start) item
    /// reached so far, `back()` is the original conflict item.
    pub items1: VecDeque<StateItemId>,
    pub items2: VecDeque<StateItemId>,
    pub deriv1: Derivation,
    pub deriv2: Derivation,
    pub complexity: usize,
    /// Count of backward steps taken on the reduce side since the
    /// conflict item. Spec.md's original goes negative once that side is
    /// "completed"; this port only needs a monotonic step count to tell
    /// `seed_derivation`'s first-step DOT insertion apart from later
    /// steps, so it stays non-negative.
    pub reduce_depth: usize,
    pub shift_depth: usize,
    /// Set once `items1.front() == items2.front()`: the two backward
    /// walks have passed through the identical state-item, which is the
    /// real evidence of a unifying (genuinely ambiguous) counterexample
    /// rather than two independently-grown trees that merely share a root
    /// symbol.
    pub unifying: bool,
}

impl Configuration {
    pub fn start(table: &StateItemTable, grammar: &Grammar, item1: StateItemId, item2: StateItemId) -> Self {
        let mut items1 = VecDeque::new();
        items1.push_back(item1);
        let mut items2 = VecDeque::new();
        items2.push_back(item2);
        Self {
            items1,
            items2,
            deriv1: seed_derivation(table, grammar, item1),
            deriv2: seed_derivation(table, grammar, item2),
            complexity: 0,
            reduce_depth: 0,
            shift_depth: 0,
            unifying: item1 == item2,
        }
    }

    pub fn front1(&self) -> StateItemId {
        *self.items1.front().expect("path1 always has at least one frame")
    }

    pub fn front2(&self) -> StateItemId {
        *self.items2.front().expect("path2 always has at least one frame")
    }

    pub fn is_done(&self, table: &StateItemTable, start_state: StateId) -> bool {
        table.get(self.front1()).state == start_state && table.get(self.front2()).state == start_state
    }

    fn guided_cost(base: usize, via_state: StateId, guide: &HashSet<StateId>) -> usize {
        if guide.is_empty() || guide.contains(&via_state) {
            base
        } else {
            base + costs::EXTENDED
        }
    }

    /// Extends path1 backward over a reverse-shift ("unshift") edge.
    pub fn extend1_shift(&self, table: &StateItemTable, grammar: &Grammar, via: StateItemId, guide: &HashSet<StateId>) -> Self {
        let sym = grammar.rule(table.get(via).rule).rhs[table.get(via).dot];
        let mut next = self.clone();
        next.complexity += Self::guided_cost(costs::UNSHIFT, table.get(via).state, guide);
        next.items1.push_front(via);
        next.deriv1 = Derivation::node(grammar.rule(table.get(via).rule).lhs, vec![Derivation::leaf(sym), next.deriv1]);
        next.reduce_depth += 1;
        next.unifying |= next.front1() == next.front2();
        next
    }

    pub fn extend2_shift(&self, table: &StateItemTable, grammar: &Grammar, via: StateItemId, guide: &HashSet<StateId>) -> Self {
        let sym = grammar.rule(table.get(via).rule).rhs[table.get(via).dot];
        let mut next = self.clone();
        next.complexity += Self::guided_cost(costs::SHIFT, table.get(via).state, guide);
        next.items2.push_front(via);
        next.deriv2 = Derivation::node(grammar.rule(table.get(via).rule).lhs, vec![Derivation::leaf(sym), next.deriv2]);
        next.shift_depth += 1;
        next.unifying |= next.front1() == next.front2();
        next
    }

    /// Extends path1 backward over a production (closure) edge, wrapping
    /// the current front derivation as the sole child collected so far of
    /// a node rooted at the producing rule's LHS.
    pub fn extend1_production(&self, table: &StateItemTable, grammar: &Grammar, via: StateItemId, guide: &HashSet<StateId>) -> Self {
        let rule = grammar.rule(table.get(via).rule);
        let mut next = self.clone();
        let mut cost = Self::guided_cost(costs::PRODUCTION, table.get(via).state, guide);
        if next.items1.contains(&via) {
            cost += costs::DUPLICATE_PRODUCTION;
        }
        next.complexity += cost;
        next.items1.push_front(via);
        next.deriv1 = Derivation::node(rule.lhs, vec![next.deriv1]);
        next.reduce_depth += 1;
        next.unifying |= next.front1() == next.front2();
        next
    }

    pub fn extend2_production(&self, table: &StateItemTable, grammar: &Grammar, via: StateItemId, guide: &HashSet<StateId>) -> Self {
        let rule = grammar.rule(table.get(via).rule);
        let mut next = self.clone();
        let mut cost = Self::guided_cost(costs::PRODUCTION, table.get(via).state, guide);
        if next.items2.contains(&via) {
            cost += costs::DUPLICATE_PRODUCTION;
        }
        next.complexity += cost;
        next.items2.push_front(via);
        next.deriv2 = Derivation::node(rule.lhs, vec![next.deriv2]);
        next.shift_depth += 1;
        next.unifying |= next.front1() == next.front2();
        next
    }

    /// Joint shift step used when both paths' current front item shares
    /// the same dot-symbol: a single reverse-shift step applied to both
    /// sides at once, costing `2 * SHIFT` rather than the two sides'
    /// separate costs.
    pub fn extend_joint_shift(
        &self,
        table: &StateItemTable,
        grammar: &Grammar,
        via1: StateItemId,
        via2: StateItemId,
    ) -> Self {
        let sym1 = grammar.rule(table.get(via1).rule).rhs[table.get(via1).dot];
        let sym2 = grammar.rule(table.get(via2).rule).rhs[table.get(via2).dot];
        let mut next = self.clone();
        next.complexity += 2 * costs::SHIFT;
        next.items1.push_front(via1);
        next.items2.push_front(via2);
        next.deriv1 = Derivation::node(grammar.rule(table.get(via1).rule).lhs, vec![Derivation::leaf(sym1), next.deriv1]);
        next.deriv2 = Derivation::node(grammar.rule(table.get(via2).rule).lhs, vec![Derivation::leaf(sym2), next.deriv2]);
        next.reduce_depth += 1;
        next.shift_depth += 1;
        next.unifying |= next.front1() == next.front2();
        next
    }
}

/// Min-heap wrapper ordering configurations by ascending complexity, so
/// [`ComplexityQueue::pop`] always returns the cheapest unexplored
/// configuration next.
#[derive(Debug, Clone)]
struct ComplexityConfiguration(Configuration);

impl PartialEq for ComplexityConfiguration {
    fn eq(&self, other: &Self) -> bool {
        self.0.complexity == other.0.complexity
    }
}
impl Eq for ComplexityConfiguration {}

impl PartialOrd for ComplexityConfiguration {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for ComplexityConfiguration {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so `BinaryHeap` (a max-heap) pops the lowest complexity.
        other.0.complexity.cmp(&self.0.complexity)
    }
}

#[derive(Debug, Default)]
pub struct ComplexityQueue {
    heap: BinaryHeap<ComplexityConfiguration>,
}

impl ComplexityQueue {
    pub fn new() -> Self {
        Self { heap: BinaryHeap::new() }
    }

    pub fn push(&mut self, config: Configuration) {
        self.heap.push(ComplexityConfiguration(config));
    }

    pub fn pop(&mut self) -> Option<Configuration> {
        self.heap.pop().map(|c| c.0)
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

/// Builds the shortest nullable-production chain down to `EMPTY` for a
/// nullable nonterminal, used by [`seed_derivation`] to materialize a
/// concrete (if degenerate) subtree wherever a conflict item's remaining
/// RHS contains a symbol nullable to nothing, rather than leaving a gap
/// in the rendered counterexample.
pub fn nullable_chain(grammar: &Grammar, sym: SymbolId) -> Derivation {
    if grammar.symbols.is_terminal(sym) {
        return Derivation::leaf(sym);
    }
    for rule in grammar.rules_for(sym) {
        if rule.rhs.is_empty() {
            return Derivation::node(sym, vec![]);
        }
        if rule.rhs.iter().all(|&s| grammar.symbols.nullable[s]) {
            let children: Vec<Derivation> = rule.rhs.iter().map(|&s| nullable_chain(grammar, s)).collect();
            return Derivation::node(sym, children);
        }
    }
    Derivation::leaf(sym)
}

/// Applies [`nullable_chain`] across a whole symbol sequence, used when
/// completing a diverging example across a span that may contain nullable
/// nonterminals after any shift or reduction.
pub fn nullable_closure(grammar: &Grammar, symbols: &[SymbolId]) -> Vec<Derivation> {
    symbols.iter().map(|&s| nullable_chain(grammar, s)).collect()
}

