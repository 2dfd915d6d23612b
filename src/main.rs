mod cli;

use std::process::ExitCode;

use clap::Parser;

use cli::Cli;
use lalrgen::{automaton, log, settings::Settings};

/// Exit codes: 0 on success (even with conflicts, as long as `--strict`
/// wasn't passed), 1 on a bad grammar file or an internal-invariant error,
/// 2 when `--strict` is set and conflicts remain.
const EXIT_OK: u8 = 0;
const EXIT_INVALID: u8 = 1;
const EXIT_UNRESOLVED_CONFLICTS: u8 = 2;

fn main() -> ExitCode {
    let cli = Cli::parse();
    log::set_colors_enabled(!cli.no_color);

    let settings = Settings::default()
        .with_strict(cli.strict)
        .with_colors(!cli.no_color)
        .with_generate_counterexamples(!cli.no_examples)
        .with_hide_conflicts(cli.hide_conflicts);

    let build = match lalrgen::build(&cli.grammar, &settings) {
        Ok(b) => b,
        Err(e) => {
            log::err(&e.to_string());
            return ExitCode::from(EXIT_INVALID);
        }
    };

    if let Some(path) = &cli.automata {
        let description = automaton::describe(&build.automaton, &build.grammar);
        if let Err(e) = std::fs::write(path, description) {
            log::err(&format!("could not write automaton description: {e}"));
            return ExitCode::from(EXIT_INVALID);
        }
    }

    if build.table.has_conflicts() && !settings.hide_conflicts {
        for conflict in &build.table.conflicts {
            log::warn(&format!(
                "conflict on '{}' in state {}",
                build.grammar.symbols.name(conflict.symbol),
                conflict.state.index()
            ));
        }
        for example in &build.counterexamples {
            eprintln!("{}", example.describe(&build.grammar));
        }
    }

    log::info(&format!(
        "built parse table: {} states, {} conflict(s)",
        build.automaton.states.len(),
        build.table.conflicts.len()
    ));

    if settings.strict && build.table.has_conflicts() {
        ExitCode::from(EXIT_UNRESOLVED_CONFLICTS)
    } else {
        ExitCode::from(EXIT_OK)
    }
}
