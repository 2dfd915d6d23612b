//! Console logging helpers.
//!
//! Grounded in `hermes_gen/hermes_logs.py`'s `info`/`warn`/`err` globals,
//! translated from raw ANSI escape constants to the `colored` crate, which
//! `rustemo` already pulls in for its GLR debug tracing
//! (`rustemo/src/glr/parser.rs`). Color is gated by a single
//! process-global flag rather than threaded through every call site, the
//! same tradeoff `hermes_logs.py`'s module-level `enableColors` makes.

use std::sync::atomic::{AtomicBool, Ordering};

use colored::Colorize;

static COLORS_ENABLED: AtomicBool = AtomicBool::new(true);

pub fn set_colors_enabled(enabled: bool) {
    COLORS_ENABLED.store(enabled, Ordering::Relaxed);
}

fn colors_enabled() -> bool {
    COLORS_ENABLED.load(Ordering::Relaxed)
}

pub fn info(message: &str) {
    if colors_enabled() {
        eprintln!("{} {}", "info:".blue().bold(), message);
    } else {
        eprintln!("info: {message}");
    }
}

pub fn warn(message: &str) {
    if colors_enabled() {
        eprintln!("{} {}", "warning:".yellow().bold(), message);
    } else {
        eprintln!("warning: {message}");
    }
}

pub fn err(message: &str) {
    if colors_enabled() {
        eprintln!("{} {}", "error:".red().bold(), message);
    } else {
        eprintln!("error: {message}");
    }
}
