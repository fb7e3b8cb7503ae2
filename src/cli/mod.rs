//! Command-line interface.
//!
//! Every subcommand runs without the TUI; running with no subcommand opens it.

mod account;
mod appointments;
mod commands;
mod common;
mod completions;

pub use appointments::{book_with_wizard, parse_date, parse_time, BookRequest};
pub use commands::{Cli, Commands};
pub use common::*;
