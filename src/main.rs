use anyhow::{Context, Result};
use barberbook::app::App;
use barberbook::cli::Cli;
use barberbook::config::Config;
use barberbook::styles::{init_theme, resolve_theme_type};
use clap::Parser;

/// Set up panic hook to restore terminal state on panic
fn setup_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = crossterm::terminal::disable_raw_mode();
        let _ = crossterm::execute!(std::io::stdout(), crossterm::terminal::LeaveAlternateScreen);
        original_hook(panic_info);
    }));
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = barberbook::utils::get_config_path();
    let mut config = Config::load_or_create(&config_path).context("Failed to load configuration")?;
    config.apply_env_overrides();

    // Set up logging directory
    let log_dir = barberbook::utils::get_log_dir();
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create log directory: {:?}", log_dir))?;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let file_appender = tracing_appender::rolling::never(&log_dir, "barberbook.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(non_blocking)
        .with_ansi(false)
        .init();

    let no_color_env = std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty());
    init_theme(resolve_theme_type(&config.theme, cli.no_colors, no_color_env));

    if cli.command.is_some() {
        let result = cli.execute();
        drop(guard);
        return result;
    }

    setup_panic_hook();
    let mut app = App::new(config)?;
    let result = app.run();

    // Flush the log writer; the panic hook covers the terminal on panics
    drop(guard);

    result
}
