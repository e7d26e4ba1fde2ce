//! rc-lookup server: entry point.

use std::sync::Arc;

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use rc_lookup_server::api;
use rc_lookup_server::config::{ConfigOverrides, ServerConfig};
use rc_lookup_server::lookup::LookupService;

#[derive(Parser)]
#[command(
    name = "rc-lookup-server",
    about = "HTTP endpoint for vehicle registration lookups by RC number",
    version
)]
struct Cli {
    /// Log level (trace, debug, info, warn, error). RUST_LOG takes precedence.
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the lookup API over HTTP (default).
    Serve(ServeArgs),

    /// Generate shell completion scripts.
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },
}

#[derive(Args, Default)]
struct ServeArgs {
    /// Listen address (host:port). Also reads RC_LOOKUP_ADDR.
    #[arg(long)]
    addr: Option<String>,

    /// Base URL of the RC search site. Also reads RC_LOOKUP_BASE_URL.
    #[arg(long)]
    base_url: Option<String>,

    /// Per-attempt upstream timeout in milliseconds. Also reads RC_LOOKUP_TIMEOUT_MS.
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Upstream attempts per request. Also reads RC_LOOKUP_ATTEMPTS.
    #[arg(long)]
    attempts: Option<u32>,

    /// Delay between upstream attempts in milliseconds. Also reads RC_LOOKUP_RETRY_DELAY_MS.
    #[arg(long)]
    retry_delay_ms: Option<u64>,

    /// Aggregator URL template containing `{rc}`. Can be repeated.
    /// Also reads RC_LOOKUP_AGGREGATORS (comma-separated).
    #[arg(long = "aggregator")]
    aggregators: Vec<String>,
}

impl From<ServeArgs> for ConfigOverrides {
    fn from(args: ServeArgs) -> Self {
        ConfigOverrides {
            addr: args.addr,
            base_url: args.base_url,
            timeout_ms: args.timeout_ms,
            attempts: args.attempts,
            retry_delay_ms: args.retry_delay_ms,
            aggregators: args.aggregators,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command.unwrap_or(Commands::Serve(ServeArgs::default())) {
        Commands::Serve(args) => {
            let config = ServerConfig::resolve(args.into())?;
            tracing::info!("rc-lookup server v{}", env!("CARGO_PKG_VERSION"));
            tracing::info!("Source: {}", config.base_url);
            if !config.aggregators.is_empty() {
                tracing::info!("Aggregators: {}", config.aggregators.len());
            }

            let service = Arc::new(LookupService::from_config(&config)?);
            api::serve(config.addr, service).await?;
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "rc-lookup-server", &mut std::io::stdout());
        }
    }

    Ok(())
}
