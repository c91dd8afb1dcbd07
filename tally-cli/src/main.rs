use anyhow::Result;
use clap::{Parser, Subcommand};

use tally_api::{ApiClient, RecordStore};

mod auth;
mod config;
mod dashboard;
mod logging;
mod records_cmd;
mod render;
mod state;

use records_cmd::{ExpenseCommand, IncomeCommand};

#[derive(Parser, Debug)]
#[command(name = "tally", version, about = "Track expenses and income against a tally server")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an account and log in (password is prompted)
    Signup {
        #[arg(long)]
        username: String,

        #[arg(long)]
        email: String,
    },

    /// Log in and store the session token under ~/.tally
    Login {
        #[arg(long)]
        email: String,
    },

    /// Forget the stored session
    Logout,

    /// Show who is logged in
    Whoami,

    /// Expense records
    Expense {
        #[command(subcommand)]
        command: ExpenseCommand,
    },

    /// Income records
    Income {
        #[command(subcommand)]
        command: IncomeCommand,
    },

    /// Expenses by category against income, as chart series
    Chart {
        /// Print the series as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Interactive terminal dashboard
    Dashboard,

    /// Manage ~/.tally/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config file if none exists
    Init,

    /// Print the effective configuration
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config()?;

    let log_file = match cli.command {
        Command::Dashboard => Some(state::log_path()?),
        _ => None,
    };
    logging::init_logging(&cfg.logging.level, log_file.as_deref())?;

    let base_url = cfg.api_base_url();
    tracing::debug!(%base_url, "starting");

    match cli.command {
        Command::Signup { username, email } => {
            auth::signup(&ApiClient::new(base_url), &username, &email).await?;
        }

        Command::Login { email } => {
            auth::login(&ApiClient::new(base_url), &email).await?;
        }

        Command::Logout => auth::logout()?,

        Command::Whoami => auth::whoami()?,

        Command::Expense { command } => {
            let mut store = open_store(base_url)?;
            records_cmd::run_expense(&mut store, command).await?;
        }

        Command::Income { command } => {
            let mut store = open_store(base_url)?;
            records_cmd::run_income(&mut store, command).await?;
        }

        Command::Chart { json } => {
            let mut store = open_store(base_url)?;
            records_cmd::run_chart(&mut store, json).await?;
        }

        Command::Dashboard => {
            let session = auth::require_session()?;
            let client = ApiClient::new(base_url).with_token(session.token);
            dashboard::run_dashboard(RecordStore::new(client), session.username).await?;
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => config::show_config()?,
        },
    }

    Ok(())
}

/// Authenticated store for the record commands
fn open_store(base_url: String) -> Result<RecordStore<ApiClient>> {
    let session = auth::require_session()?;
    Ok(RecordStore::new(ApiClient::new(base_url).with_token(session.token)))
}
