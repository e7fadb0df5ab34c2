use clap::{Parser, Subcommand};
use hikarie_core::Config;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "hikarie-cli", version, about = "Hikarie office check-in CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a check-in
    Checkin {
        /// User id
        user: String,
        /// Arrival time as RFC 3339 (defaults to now)
        #[arg(long)]
        at: Option<String>,
        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },
    /// Per-user score, streak and badges
    User {
        #[command(subcommand)]
        action: commands::user::UserAction,
    },
    /// Badge catalogue
    Badges {
        #[command(subcommand)]
        action: commands::badges::BadgesAction,
    },
    /// Arrival statistics
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

/// Log to stderr; `RUST_LOG` wins over the configured level.
///
/// Reads an existing config file only; commands create it on first use.
fn init_tracing() {
    let level = Config::path()
        .ok()
        .filter(|path| path.exists())
        .and_then(|path| Config::load_from(&path).ok())
        .map_or_else(|| "warn".to_string(), |config| config.log.level);
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    let result = match cli.command {
        Commands::Checkin { user, at, json } => commands::checkin::run(&user, at.as_deref(), json),
        Commands::User { action } => commands::user::run(action),
        Commands::Badges { action } => commands::badges::run(action),
        Commands::Stats { action } => commands::stats::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
