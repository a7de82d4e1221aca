//! Subcommand handlers. `main.rs` parses arguments and dispatches here.

pub mod route;
pub mod systems;
