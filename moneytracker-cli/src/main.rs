//! MoneyTracker CLI - a per-user transaction ledger in your terminal

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use moneytracker_core::{ErrorKind, OperationResult};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod output;

use commands::{add, list, login, register, Session};

/// MoneyTracker - a per-user transaction ledger
#[derive(Parser)]
#[command(name = "mt", version, about, long_about = None)]
struct Cli {
    /// Account username
    #[arg(short, long, global = true, env = "MT_USERNAME")]
    username: Option<String>,

    /// Account password (prompted when omitted on a terminal)
    #[arg(short, long, global = true, env = "MT_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new account
    Register,

    /// Check a username and password
    Login,

    /// Add a transaction (negative amounts are debits)
    Add {
        /// Transaction amount
        #[arg(long, allow_hyphen_values = true)]
        amount: f64,
        /// Free-text description
        #[arg(long, short, default_value = "")]
        description: String,
    },

    /// List your transactions
    List,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let json = cli.json;

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let (message, kind) = commands::describe_error(&e);
            if json {
                let result: OperationResult<()> = OperationResult::fail(message.clone(), kind);
                match serde_json::to_string_pretty(&result) {
                    Ok(doc) => println!("{}", doc),
                    Err(_) => output::error(&message),
                }
            } else {
                output::error(&message);
            }
            ExitCode::from(exit_code(kind))
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let data_dir = commands::get_data_dir()?;
    let config = moneytracker_core::config::Config::load(&data_dir)?;
    init_tracing(&config.logging.level);

    let session = Session::new(data_dir, config, cli.username, cli.password, cli.json);

    match cli.command {
        Commands::Register => register::run(&session),
        Commands::Login => login::run(&session),
        Commands::Add { amount, description } => add::run(&session, amount, &description),
        Commands::List => list::run(&session),
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn exit_code(kind: ErrorKind) -> u8 {
    match kind {
        ErrorKind::ClientError => 2,
        ErrorKind::Conflict => 3,
        ErrorKind::Unauthorized => 4,
        ErrorKind::ServerError => 1,
    }
}
