//! Build-time configuration.
//!
//! Grounded in `rustemo`'s `api::settings::Settings` (used as
//! `Settings::default().with_force_all(true)` in its build
//! scripts): a plain struct with `with_*` builder methods instead of a
//! derive-based config crate, since the full set of knobs is small and
//! fixed (time limits, a handful of booleans) rather than something users
//! load from a file.

use std::time::Duration;

use crate::counterexample::costs::{SEARCH_ASSURANCE_LIMIT, SEARCH_TIME_LIMIT};

#[derive(Debug, Clone)]
pub struct Settings {
    pub time_limit: Duration,
    pub assurance_limit: Duration,
    pub strict: bool,
    pub colors: bool,
    pub generate_counterexamples: bool,
    pub hide_conflicts: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            time_limit: SEARCH_TIME_LIMIT,
            assurance_limit: SEARCH_ASSURANCE_LIMIT,
            strict: false,
            colors: true,
            generate_counterexamples: true,
            hide_conflicts: false,
        }
    }
}

impl Settings {
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = limit;
        self
    }

    pub fn with_assurance_limit(mut self, limit: Duration) -> Self {
        self.assurance_limit = limit;
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_colors(mut self, colors: bool) -> Self {
        self.colors = colors;
        self
    }

    pub fn with_generate_counterexamples(mut self, generate: bool) -> Self {
        self.generate_counterexamples = generate;
        self
    }

    pub fn with_hide_conflicts(mut self, hide: bool) -> Self {
        self.hide_conflicts = hide;
        self
    }
}
