//! Complexity weighting and the search's time budget.
//!
//! Traces the six cost constants `hermes_gen/counterexample/counterexampleGen.py`
//! and `configurations.py` import from a sibling `costs` module (not
//! included in the retrieved source, hence not file-quotable beyond the
//! call sites at `configurations.py:132-135,182-183,196` and
//! `counterexampleGen.py:183,217,220`): shifting and reducing are cheap,
//! crossing a production edge is moderate, reverse-shifting ("unshifting")
//! or repeating a production already on the path is expensive, and
//! leaving the search's `guide` set is prohibitive, reserved for when no
//! cheaper path exists at all.

use std::time::Duration;

/// Cost of a forward shift step, or half the joint transition both search
/// paths take together when their dot-symbols agree.
pub const SHIFT: usize = 1;

/// Cost of popping a completed rule's RHS and building its LHS derivation
/// node.
pub const REDUCE: usize = 1;

/// Cost of a production (closure) step: following a `produced_by` edge to
/// a state-item in the same automaton state.
pub const PRODUCTION: usize = 50;

/// Cost of a reverse-shift ("unshift") step: following a `shift_from`
/// edge to a state-item in a different automaton state.
pub const UNSHIFT: usize = 100;

/// Extra cost added when a production step revisits a state-item already
/// present on that side's path -- discourages the search from looping
/// through the same closure repeatedly.
pub const DUPLICATE_PRODUCTION: usize = 100;

/// Extra cost added when a step leaves the search's `guide` set (the
/// state ids found by the shortest-path fallback); prohibitively
/// expensive so the complexity-ordered search only leaves the guide when
/// every guided path has been exhausted.
pub const EXTENDED: usize = 10000;

/// Hard wall-clock budget for the full search: once exceeded, the search
/// gives up on finding a unifying pair of configurations and falls back
/// to `generator::shortest_path_from_start`.
pub const SEARCH_TIME_LIMIT: Duration = Duration::from_secs(5);

/// Softer budget: once exceeded without having found a result yet, the
/// caller may log an "this is taking a while" assurance message rather
/// than silently stalling.
pub const SEARCH_ASSURANCE_LIMIT: Duration = Duration::from_secs(2);
