//! Command-Line Interface
//!
//! Subcommand implementations plus the shared wiring that builds the
//! gateway, taxonomy, and store from configuration.

pub mod commands;
pub mod util;
