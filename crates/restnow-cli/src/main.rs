use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod input;
mod notify;
mod terminal;

#[derive(Parser)]
#[command(name = "restnow", version, about = "RestNow break reminder")]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the work/rest cycle
    Run {
        /// Emit events as JSON lines and read commands from stdin
        #[arg(long)]
        json: bool,
    },
    /// Configure work and rest durations
    Setup {
        /// Work duration (e.g. "25m", "1h30m", "90s"; bare numbers are minutes)
        #[arg(long)]
        work: Option<String>,
        /// Rest duration
        #[arg(long)]
        rest: Option<String>,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("RESTNOW_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() {
    init_logging();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Run { json } => commands::run::run(json),
        Commands::Setup { work, rest } => commands::setup::run(work, rest),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => commands::completions::run(shell),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
