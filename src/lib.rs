pub mod automaton;
pub mod counterexample;
pub mod error;
pub mod firstfollow;
pub mod grammar;
#[macro_use]
pub mod index;
pub mod log;
pub mod settings;
pub mod symbol;
pub mod table;

use std::path::Path;

use error::Result;
use settings::Settings;

/// Everything produced by running the generator end to end on one grammar
/// file: the parsed grammar, its LALR(1) automaton, the parse table, and
/// (unless [`Settings::generate_counterexamples`] is `false`) a rendered
/// counterexample for every conflict the table collected.
pub struct Build {
    pub grammar: grammar::Grammar,
    pub automaton: automaton::Automaton,
    pub table: table::ParseTable,
    pub counterexamples: Vec<counterexample::CounterExample>,
}

/// Runs C1-C6 over a grammar file: parse, FIRST/FOLLOW, automaton, table,
/// and (when enabled) counterexample search. This is the crate's single
/// external entry point; `main.rs` is a thin CLI wrapper around it.
pub fn build(path: impl AsRef<Path>, settings: &Settings) -> Result<Build> {
    let mut grammar = grammar::parse_grammar_file(path)?;
    firstfollow::compute(&mut grammar);
    let automaton = automaton::build(&grammar);
    let table = table::build(&grammar, &automaton);

    let counterexamples = if settings.generate_counterexamples && table.has_conflicts() {
        counterexample::generate_all(&grammar, &automaton, &table, settings)?
    } else {
        Vec::new()
    };

    Ok(Build {
        grammar,
        automaton,
        table,
        counterexamples,
    })
}
