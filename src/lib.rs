//! barberbook - book barbershop appointments from the terminal
//!
//! The library holds the whole client: the hosted backend boundary, the
//! session provider, the booking wizard and dashboard state machines, the
//! TUI screens that drive them and the command-line interface.

// Core modules
pub mod app;
pub mod backend;
pub mod cli;
pub mod components;
pub mod config;
pub mod keymap;
pub mod models;
pub mod screens;
pub mod services;
pub mod session;
pub mod state;
pub mod styles;
pub mod tui;
pub mod utils;
pub mod widgets;

// Re-exports for convenience
pub use config::Config;
pub use session::{Session, SessionProvider, SessionStore};
pub use state::BookingWizard;

// Keymap re-exports (used by Config and for external API)
pub use keymap::{Action, KeyBinding, Keymap, KeymapPreset};
