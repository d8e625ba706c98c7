use chrono::Local;
use clap::{CommandFactory, Parser, Subcommand};
use habitledger_core::{parse_date_key, Config};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::Context;

#[derive(Parser)]
#[command(name = "habitledger-cli", version, about = "Habit Ledger CLI")]
struct Cli {
    /// Treat this day (YYYY-MM-DD) as today
    #[arg(long, global = true)]
    date: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Habit management and daily check-ins
    Habit {
        #[command(subcommand)]
        action: commands::habit::HabitAction,
    },
    /// Aggregate statistics
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
    /// Sphere-tagged tasks
    Task {
        #[command(subcommand)]
        action: commands::task::TaskAction,
    },
    /// Sphere-tagged journal entries
    Journal {
        #[command(subcommand)]
        action: commands::journal::JournalAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Print shell completions
    Completions {
        shell: clap_complete::Shell,
    },
}

fn init_tracing(level: &str) {
    // Log to stderr so stdout stays clean JSON.
    let filter = EnvFilter::try_from_env("HABITLEDGER_LOG")
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    if let Commands::Completions { shell } = cli.command {
        clap_complete::generate(
            shell,
            &mut Cli::command(),
            "habitledger-cli",
            &mut std::io::stdout(),
        );
        return Ok(());
    }

    // Reset must work even when the existing file no longer parses.
    if matches!(
        cli.command,
        Commands::Config {
            action: commands::config::ConfigAction::Reset
        }
    ) {
        return commands::config::reset();
    }

    let config = Config::load()?;
    init_tracing(&config.log.level);

    let today = match cli.date.as_deref() {
        Some(raw) => parse_date_key(raw)?,
        None => Local::now().date_naive(),
    };
    let ctx = Context {
        today,
        date_overridden: cli.date.is_some(),
        config,
    };

    match cli.command {
        Commands::Habit { action } => commands::habit::run(action, &ctx),
        Commands::Stats { action } => commands::stats::run(action, &ctx),
        Commands::Task { action } => commands::task::run(action, &ctx),
        Commands::Journal { action } => commands::journal::run(action, &ctx),
        Commands::Config { action } => commands::config::run(action, ctx.config),
        Commands::Completions { .. } => Ok(()),
    }
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
