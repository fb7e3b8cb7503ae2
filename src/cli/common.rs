//! Common CLI utilities shared across all CLI commands.
//!
//! This module provides:
//! - `CliContext`: config, session and backend access for one command
//! - Output helpers: `print_success`, `print_error`, `print_warning`, `print_info`
//! - Prompt helpers: `prompt_string`, `prompt_password`, `prompt_confirm`

use crate::backend::{AuthBackend, BookingBackend, Connector, SupabaseClient};
use crate::config::{Config, ANON_KEY_ENV, URL_ENV};
use crate::session::{Session, SessionProvider, SessionState, SessionStore};
use anyhow::{bail, Context, Result};
use crossterm::event::{Event, KeyCode, KeyEventKind, KeyModifiers};
use std::future::Future;
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Runtime;

/// Shared context for CLI commands.
pub struct CliContext {
    pub config: Config,
    pub config_path: PathBuf,
    pub provider: SessionProvider,
    connector: Arc<dyn Connector>,
    runtime: Runtime,
}

impl CliContext {
    /// Load config and the saved session, and connect to the configured backend.
    pub fn load() -> Result<Self> {
        let config_path = crate::utils::get_config_path();
        let mut config =
            Config::load_or_create(&config_path).context("Failed to load configuration")?;
        config.apply_env_overrides();

        let client = SupabaseClient::new(&config.backend).with_context(|| {
            format!(
                "Set backend.url and backend.anon_key in {} (or {} / {})",
                config_path.display(),
                URL_ENV,
                ANON_KEY_ENV
            )
        })?;
        let store = SessionStore::new(crate::utils::get_session_path());
        Self::new(config, config_path, Arc::new(client), store)
    }

    /// Build a context around any backend connector.
    pub fn new(
        config: Config,
        config_path: PathBuf,
        connector: Arc<dyn Connector>,
        store: SessionStore,
    ) -> Result<Self> {
        let runtime = Runtime::new().context("Failed to create tokio runtime")?;
        Ok(Self {
            config,
            config_path,
            provider: SessionProvider::new(store),
            connector,
            runtime,
        })
    }

    /// Run a backend future to completion.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    pub fn auth(&self) -> Arc<dyn AuthBackend> {
        self.connector.auth()
    }

    /// Table access as the given user, or anonymous.
    pub fn booking(&self, session: Option<&Session>) -> Arc<dyn BookingBackend> {
        self.connector.booking(session)
    }

    /// Resolve the saved session, refreshing it when expired.
    pub fn current_session(&mut self) -> Option<Session> {
        let auth = self.connector.auth();
        match self.runtime.block_on(self.provider.resolve(auth.as_ref())) {
            SessionState::Authenticated(session) => Some(session.clone()),
            _ => None,
        }
    }

    /// Like [`Self::current_session`] but fails when signed out.
    pub fn require_session(&mut self) -> Result<Session> {
        match self.current_session() {
            Some(session) => Ok(session),
            None => bail!("Not signed in. Run 'barberbook login' first."),
        }
    }
}

// =============================================================================
// Output Helpers
// =============================================================================

/// Print a success message with a checkmark prefix.
pub fn print_success(msg: &str) {
    println!("\u{2713} {}", msg);
}

/// Print an error message with an X prefix to stderr.
pub fn print_error(msg: &str) {
    eprintln!("\u{2717} {}", msg);
}

/// Print a warning message with a warning sign prefix.
pub fn print_warning(msg: &str) {
    println!("\u{26A0}\u{FE0F} {}", msg);
}

/// Print an info message with an info sign prefix.
pub fn print_info(msg: &str) {
    println!("\u{2139}\u{FE0F} {}", msg);
}

// =============================================================================
// Prompt Helpers
// =============================================================================

/// Prompt the user for a string input with an optional default value.
///
/// # Returns
/// The user's input, or the default if they pressed Enter
pub fn prompt_string(label: &str, default: Option<&str>) -> Result<String> {
    if let Some(def) = default {
        print!("{} [{}]: ", label, def);
    } else {
        print!("{}: ", label);
    }
    io::stdout().flush().context("Failed to flush stdout")?;

    let mut input = String::new();
    io::stdin()
        .read_line(&mut input)
        .context("Failed to read input")?;

    let trimmed = input.trim();
    if trimmed.is_empty() {
        Ok(default.unwrap_or("").to_string())
    } else {
        Ok(trimmed.to_string())
    }
}

/// Prompt for a password without echoing it.
///
/// Falls back to a plain line read when stdin is not a terminal.
pub fn prompt_password(label: &str) -> Result<String> {
    print!("{}: ", label);
    io::stdout().flush().context("Failed to flush stdout")?;

    if !io::stdin().is_terminal() {
        let mut input = String::new();
        io::stdin()
            .read_line(&mut input)
            .context("Failed to read input")?;
        return Ok(input.trim_end_matches(['\r', '\n']).to_string());
    }

    crossterm::terminal::enable_raw_mode().context("Failed to enable raw mode")?;
    let result = read_hidden_line();
    let _ = crossterm::terminal::disable_raw_mode();
    println!();
    result
}

fn read_hidden_line() -> Result<String> {
    let mut input = String::new();
    loop {
        let Event::Key(key) = crossterm::event::read().context("Failed to read key")? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match key.code {
            KeyCode::Enter => return Ok(input),
            KeyCode::Esc => bail!("Cancelled"),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                bail!("Cancelled")
            }
            KeyCode::Char(c) => input.push(c),
            KeyCode::Backspace => {
                input.pop();
            }
            _ => {}
        }
    }
}

/// Prompt the user for a yes/no confirmation.
///
/// # Returns
/// `true` if the user entered 'y' or 'Y', `false` otherwise
pub fn prompt_confirm(message: &str) -> Result<bool> {
    print!("{} [y/N]: ", message);
    io::stdout().flush().context("Failed to flush stdout")?;

    let mut input = String::new();
    io::stdin()
        .read_line(&mut input)
        .context("Failed to read input")?;

    Ok(input.trim().eq_ignore_ascii_case("y"))
}
