//! Error types for grammar reading and core table/automaton construction.

use thiserror::Error;

/// Errors raised while reading and validating a grammar source file.
///
/// These are accumulated by the reader rather than raised eagerly (see the
/// `Builder` type in `crate::grammar`); a [`GrammarError::Fatal`] is
/// produced once accumulation is done if any were recorded.
#[derive(Error, Debug, Clone)]
pub enum GrammarError {
    #[error("{file}:{line}:{col}: {message}")]
    Syntax {
        file: String,
        line: usize,
        col: usize,
        message: String,
    },

    #[error("{file}: undefined symbol '{symbol}' used in rule: {rule}")]
    UndefinedSymbol {
        file: String,
        symbol: String,
        rule: String,
    },

    #[error("{file}: duplicate terminal definition '{name}'")]
    DuplicateTerminal { file: String, name: String },

    #[error("{file}: symbol defined as both a terminal and a nonterminal: '{name}'")]
    TerminalAsNonterminal { file: String, name: String },

    #[error("{file}: missing mandatory '%{directive}' directive")]
    MissingDirective { file: String, directive: String },

    #[error("{file}: more than one '%{directive}' directive provided")]
    DuplicateDirective { file: String, directive: String },

    #[error("{file}: EMPTY cannot be used in a rule alongside other symbols")]
    EmptyWithOtherSymbols { file: String },

    #[error("{file}: reserved name used as LHS: '{name}'")]
    ReservedName { file: String, name: String },

    #[error("{file}: invalid code substitution: {message}")]
    Substitution { file: String, message: String },

    #[error("{path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::rc::Rc<std::io::Error>,
    },

    #[error("encountered {0} error(s) while reading grammar, see above")]
    Fatal(usize),
}

/// Internal invariant violations in automaton construction, table building,
/// or counterexample search. These should never occur on a well-formed
/// grammar and always indicate a bug in this crate, mirroring
/// `hermes_gen`'s `HermesError` raise sites.
#[derive(Error, Debug, Clone)]
pub enum CoreError {
    #[error("LALR automaton: state {state} already has a transition on symbol '{symbol}'")]
    DuplicateTransition { state: usize, symbol: String },

    #[error("counterexample search: transition item not set up for state item {0}")]
    MissingTransition(String),

    #[error("counterexample search: cannot find derivation to conflict node")]
    DerivationNotFound,

    #[error("counterexample search: shortest lookahead-sensitive path not found (state {state}, symbol '{symbol}')")]
    ShortestPathNotFound { state: usize, symbol: String },

    #[error("counterexample search: _expandFirst could not reach conflict symbol '{symbol}'")]
    ExpandFirstFailed { symbol: String },

    #[error("parse table: reduce item reached with dot not at end")]
    ReduceWithoutDotAtEnd,
}

#[derive(Error, Debug, Clone)]
pub enum Error {
    #[error(transparent)]
    Grammar(#[from] GrammarError),
    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type Result<T> = std::result::Result<T, Error>;
