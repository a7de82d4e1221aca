//! evepath CLI library.
//!
//! Subcommand handlers and output formatting for the `evepath-cli` binary.

pub mod commands;
pub mod output;
