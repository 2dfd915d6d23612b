//! C3: FIRST, FOLLOW, and nullability fixpoint computation.
//!
//! Grounded in `table.rs`'s `first_sets()`/`follow_sets()`/`firsts()` in the
//! teacher crate, which compute the same three worklist fixpoints over a
//! `Grammar`'s rules; this module generalizes that computation to live on
//! [`crate::symbol::SymbolTable`] (`nullable`/`first`/`follow`) instead of
//! returning separate maps, since downstream code (`automaton.rs`,
//! `table.rs`) needs random access to FIRST/FOLLOW by symbol id for the
//! whole lifetime of the build.

use std::collections::HashSet;

use crate::grammar::Grammar;
use crate::index::SymbolId;

/// Runs the nullable / FIRST / FOLLOW fixpoints over `grammar` and stores
/// the results on `grammar.symbols`. Idempotent; safe to call again after
/// further rules are added (it won't be, in practice, since a `Grammar`
/// is immutable once parsed).
pub fn compute(grammar: &mut Grammar) {
    compute_nullable(grammar);
    compute_first(grammar);
    compute_follow(grammar);
}

fn compute_nullable(grammar: &mut Grammar) {
    loop {
        let mut changed = false;
        for rule in grammar.rules.iter() {
            if grammar.symbols.nullable[rule.lhs] {
                continue;
            }
            let is_nullable = rule.rhs.iter().all(|&s| grammar.symbols.nullable[s]);
            if is_nullable {
                grammar.symbols.nullable[rule.lhs] = true;
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }
}

/// FIRST(symbol) for a single terminal is `{symbol}`; FIRST(EMPTY) is empty
/// since EMPTY never appears as a lookahead/shiftable token.
fn compute_first(grammar: &mut Grammar) {
    for sym in grammar.symbols.iter() {
        if sym.is_terminal() {
            grammar.symbols.first[sym.id].insert(sym.id);
        }
    }

    loop {
        let mut changed = false;
        for rule in grammar.rules.iter() {
            let mut rhs_nullable_prefix = true;
            for &sym in &rule.rhs {
                if !rhs_nullable_prefix {
                    break;
                }
                let addition: HashSet<SymbolId> = grammar.symbols.first[sym].clone();
                let lhs_first = &mut grammar.symbols.first[rule.lhs];
                let before = lhs_first.len();
                lhs_first.extend(addition);
                if lhs_first.len() != before {
                    changed = true;
                }
                rhs_nullable_prefix = grammar.symbols.nullable[sym];
            }
            if rule.rhs.is_empty() && !grammar.symbols.nullable[rule.lhs] {
                // EMPTY-producing rule without an explicit EMPTY token still
                // makes its LHS nullable; compute_nullable already handles
                // this, this branch only guards against rule ordering.
            }
        }
        if !changed {
            break;
        }
    }
}

/// FOLLOW is the textbook worklist fixpoint: for `A -> αBβ`, add FIRST(β) to
/// FOLLOW(B); if β is nullable (or empty), also add FOLLOW(A). `END` seeds
/// FOLLOW(start).
fn compute_follow(grammar: &mut Grammar) {
    grammar.symbols.follow[grammar.start].insert(grammar.symbols.end);

    loop {
        let mut changed = false;
        for rule in grammar.rules.iter() {
            for (i, &sym) in rule.rhs.iter().enumerate() {
                if grammar.symbols.is_terminal(sym) {
                    continue;
                }
                let rest = &rule.rhs[i + 1..];
                let mut rest_nullable = true;
                let mut addition: HashSet<SymbolId> = HashSet::new();
                for &next in rest {
                    addition.extend(grammar.symbols.first[next].iter().copied());
                    if !grammar.symbols.nullable[next] {
                        rest_nullable = false;
                        break;
                    }
                }
                let follow_b = &mut grammar.symbols.follow[sym];
                let before = follow_b.len();
                follow_b.extend(addition);
                if follow_b.len() != before {
                    changed = true;
                }
                if rest_nullable {
                    let follow_a: HashSet<SymbolId> = grammar.symbols.follow[rule.lhs].clone();
                    let follow_b = &mut grammar.symbols.follow[sym];
                    let before = follow_b.len();
                    follow_b.extend(follow_a);
                    if follow_b.len() != before {
                        changed = true;
                    }
                }
            }
        }
        if !changed {
            break;
        }
    }
}

/// FIRST of a full symbol sequence (used by item closures in
/// `automaton.rs` and by the counterexample search's lookahead logic):
/// FIRST of each symbol in order, stopping at the first non-nullable one,
/// plus `lookahead` itself if the whole sequence is nullable.
pub fn first_of_sequence(grammar: &Grammar, seq: &[SymbolId], lookahead: SymbolId) -> HashSet<SymbolId> {
    let mut out = HashSet::new();
    let mut all_nullable = true;
    for &sym in seq {
        out.extend(grammar.symbols.first[sym].iter().copied());
        if !grammar.symbols.nullable[sym] {
            all_nullable = false;
            break;
        }
    }
    if all_nullable {
        out.insert(lookahead);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::parse_grammar_str;

    // G10 from the Isradisaikul & Myers counterexample paper.
    const G10: &str = r#"
%return Start
Start = A B ;
A = "a" ;
B = "b" ;
"#;

    #[test]
    fn first_follow_no_epsilon() {
        let mut g = parse_grammar_str(G10, "g10").unwrap();
        compute(&mut g);

        let a = g.symbols.get("A").unwrap();
        let b = g.symbols.get("B").unwrap();
        let start = g.symbols.get("Start").unwrap();
        let ta = g.symbols.get("a").unwrap();
        let tb = g.symbols.get("b").unwrap();

        assert_eq!(g.symbols.names(&g.symbols.first[start]), vec!["a"]);
        assert_eq!(g.symbols.names(&g.symbols.first[a]), vec!["a"]);
        assert_eq!(g.symbols.names(&g.symbols.first[b]), vec!["b"]);
        assert!(!g.symbols.nullable[start]);

        assert!(g.symbols.follow[a].contains(&tb));
        assert!(g.symbols.follow[b].contains(&g.symbols.end));
        let _ = ta;
    }

    #[test]
    fn nullable_propagates_through_chain() {
        let src = r#"
%return S
S = A B ;
A = "x" | EMPTY ;
B = EMPTY ;
"#;
        let mut g = parse_grammar_str(src, "nullable").unwrap();
        compute(&mut g);

        let s = g.symbols.get("S").unwrap();
        let a = g.symbols.get("A").unwrap();
        let b = g.symbols.get("B").unwrap();
        assert!(g.symbols.nullable[a]);
        assert!(g.symbols.nullable[b]);
        assert!(g.symbols.nullable[s]);

        // FOLLOW(A) must include FIRST(B)'s contribution (empty) and then
        // fall through to FOLLOW(S), which contains END.
        assert!(g.symbols.follow[a].contains(&g.symbols.end));
    }
}
