//! Command-line surface.
//!
//! Grounded in `hermes_gen/__main__.py`'s `main()`: a grammar file
//! argument, an optional automaton-description dump path, and flags
//! controlling counterexample generation, strictness, and color. Uses
//! `clap`'s derive API the way `rustemo`'s own `rustemo-tools`
//! binary does for its code-generation CLI.

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "lalrgen", about = "LALR(1) parse table generator with counterexamples")]
pub struct Cli {
    /// Grammar source file to read.
    pub grammar: PathBuf,

    /// Write a human-readable automaton description to this file.
    #[arg(long, value_name = "FILE")]
    pub automata: Option<PathBuf>,

    /// Skip counterexample search even if the grammar has conflicts.
    #[arg(long)]
    pub no_examples: bool,

    /// Exit with a non-zero status if any conflicts remain unresolved.
    #[arg(short = 's', long)]
    pub strict: bool,

    /// Don't print conflicts found while building the table.
    #[arg(long)]
    pub hide_conflicts: bool,

    /// Disable ANSI colors in diagnostic output.
    #[arg(long)]
    pub no_color: bool,
}
