use super::appointments::{self, parse_date, parse_time, BookRequest};
use super::{account, completions, CliContext};
use anyhow::Result;
use chrono::{NaiveDate, NaiveTime};
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use tracing::info;

/// Book barbershop appointments from the terminal
#[derive(Parser, Debug)]
#[command(name = "barberbook", version, about = "Book barbershop appointments from the terminal", long_about = None, disable_help_subcommand = true, arg_required_else_help = false)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Disable colors in the TUI (also respects NO_COLOR env var)
    #[arg(long, global = true)]
    pub no_colors: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in with email and password
    Login {
        #[arg(short, long)]
        email: Option<String>,
    },
    /// Create an account
    Signup {
        #[arg(short, long)]
        email: Option<String>,
        /// Full name shown on the dashboard
        #[arg(short, long)]
        name: Option<String>,
    },
    /// Sign out and remove the saved session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// List barbershop units
    Units,
    /// List services with duration and price
    Services,
    /// List barbers working at a unit
    Barbers {
        /// Unit id (see `barberbook units`)
        unit_id: String,
    },
    /// Show free slots for a barber
    Slots {
        /// Barber id (see `barberbook barbers`)
        barber_id: String,
    },
    /// Show your next scheduled appointment
    Next,
    /// Show your past and upcoming appointments
    History,
    /// Book an appointment without opening the TUI
    Book {
        /// Unit id or name
        #[arg(long)]
        unit: String,
        /// Service id or name
        #[arg(long)]
        service: String,
        /// Barber id or name
        #[arg(long)]
        barber: String,
        /// YYYY-MM-DD or DD/MM/YYYY
        #[arg(long, value_parser = parse_date)]
        date: NaiveDate,
        /// HH:MM
        #[arg(long, value_parser = parse_time)]
        time: NaiveTime,
    },
    /// Cancel a scheduled appointment
    Cancel {
        /// Appointment id (see `barberbook next` or `barberbook history`)
        id: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Configuration file location
    Config,
    /// Shows logs location and how to view them
    Logs,
    /// Generate shell completions
    Completions {
        /// Target shell (detected from $SHELL when omitted)
        shell: Option<Shell>,
    },
}

impl Cli {
    pub fn execute(self) -> Result<()> {
        let Some(command) = self.command else {
            // No command provided, the caller launches the TUI
            return Ok(());
        };
        info!("CLI: {:?}", command);

        match command {
            Commands::Config => Self::cmd_config(),
            Commands::Logs => Self::cmd_logs(),
            Commands::Completions { shell } => completions::generate(shell),
            other => {
                let mut ctx = CliContext::load()?;
                Self::run_with(&mut ctx, other)
            }
        }
    }

    /// Run a command that needs the backend.
    pub fn run_with(ctx: &mut CliContext, command: Commands) -> Result<()> {
        match command {
            Commands::Login { email } => account::login(ctx, email),
            Commands::Signup { email, name } => account::signup(ctx, email, name),
            Commands::Logout => account::logout(ctx),
            Commands::Whoami => account::whoami(ctx),
            Commands::Units => appointments::units(ctx),
            Commands::Services => appointments::services(ctx),
            Commands::Barbers { unit_id } => appointments::barbers(ctx, &unit_id),
            Commands::Slots { barber_id } => appointments::slots(ctx, &barber_id),
            Commands::Next => appointments::next(ctx),
            Commands::History => appointments::history(ctx),
            Commands::Book {
                unit,
                service,
                barber,
                date,
                time,
            } => appointments::book(
                ctx,
                BookRequest {
                    unit,
                    service,
                    barber,
                    date,
                    time,
                },
            ),
            Commands::Cancel { id, yes } => appointments::cancel(ctx, &id, yes),
            Commands::Config => Self::cmd_config(),
            Commands::Logs => Self::cmd_logs(),
            Commands::Completions { shell } => completions::generate(shell),
        }
    }

    fn cmd_config() -> Result<()> {
        let config_path = crate::utils::get_config_path();
        println!("{}", config_path.display());
        Ok(())
    }

    fn cmd_logs() -> Result<()> {
        let log_file = crate::utils::get_log_path();
        println!("{}", log_file.display());
        println!("View logs in real-time: tail -f {}", log_file.display());
        Ok(())
    }
}
