use clap::{Parser, Subcommand};

mod commands;
mod util;

use commands::risk::RiskCommands;
use commands::survey::SurveyCommands;

#[derive(Parser)]
#[command(
    name = "vantage",
    version,
    about = "Vantage CLI: score physical-security risk registers and survey snapshots"
)]
struct Cli {
    /// API base URL (used by `health` and `--remote`)
    #[arg(long, env = "VANTAGE_API_URL", default_value = "http://localhost:3000")]
    api_url: String,

    /// Print compact single-line JSON
    #[arg(long, global = true)]
    raw: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check API health
    Health,
    /// Risk classification and register operations
    Risk {
        #[command(subcommand)]
        command: RiskCommands,
    },
    /// Survey completion and findings
    Survey {
        #[command(subcommand)]
        command: SurveyCommands,
    },
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    // Diagnostics go to stderr so stdout stays machine-readable JSON
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let cli = Cli::parse();
    let api_url = cli.api_url.trim_end_matches('/');

    let code = match cli.command {
        Commands::Health => commands::health::run(api_url, cli.raw).await,
        Commands::Risk { command } => commands::risk::run(api_url, cli.raw, command).await,
        Commands::Survey { command } => commands::survey::run(api_url, cli.raw, command).await,
    };

    std::process::exit(code);
}
