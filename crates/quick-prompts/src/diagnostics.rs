//! Debug-mode aware diagnostics
//!
//! Routine content-script chatter is logged at `debug`. When the user turns
//! on debug mode in their settings it is promoted to `info` so it shows up
//! under a default log filter.

use std::fmt::Arguments;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Diagnostics {
    verbose: bool,
}

impl Diagnostics {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    pub fn log(&self, args: Arguments<'_>) {
        if self.verbose {
            log::info!(target: "quick_prompts", "{}", args);
        } else {
            log::debug!(target: "quick_prompts", "{}", args);
        }
    }
}
