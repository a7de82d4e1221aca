use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use evepath_cli::commands::route::{handle_route, RouteCommandArgs};
use evepath_cli::commands::systems::{handle_systems, SystemsCommandArgs};
use evepath_cli::output::OutputFormat;
use evepath_lib::{default_dataset_path, SourcesConfig};

#[derive(Parser, Debug)]
#[command(author, version, about = "Wormhole-aware EVE route planner")]
struct Cli {
    /// Path to the systems JSON dataset. Defaults to `EVEPATH_SYSTEMS_PATH`
    /// or data/systems.json.
    #[arg(long, global = true)]
    systems: Option<PathBuf>,

    /// Output format.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute the shortest route between two systems.
    Route(RouteArgs),
    /// Look up systems in the static dataset.
    Systems(SystemsArgs),
}

#[derive(Args, Debug)]
struct RouteArgs {
    /// Starting system name or id.
    #[arg(long)]
    from: String,
    /// Destination system name or id.
    #[arg(long)]
    to: String,
    /// System to route around (repeatable).
    #[arg(long)]
    avoid: Vec<String>,
    /// Ignore every wormhole source.
    #[arg(long)]
    static_only: bool,
    #[arg(long)]
    no_eve_scout: bool,
    #[arg(long)]
    no_tripwire: bool,
    #[arg(long)]
    no_eve_metro: bool,
}

#[derive(Args, Debug)]
struct SystemsArgs {
    /// System names or ids.
    #[arg(required = true)]
    queries: Vec<String>,
    /// List similar names instead of requiring an exact match.
    #[arg(long)]
    fuzzy: bool,
    /// Maximum matches per query with --fuzzy.
    #[arg(long, default_value_t = 5)]
    limit: usize,
}

impl From<RouteArgs> for RouteCommandArgs {
    fn from(args: RouteArgs) -> Self {
        Self {
            from: args.from,
            to: args.to,
            avoid: args.avoid,
            static_only: args.static_only,
            no_eve_scout: args.no_eve_scout,
            no_tripwire: args.no_tripwire,
            no_eve_metro: args.no_eve_metro,
        }
    }
}

impl From<SystemsArgs> for SystemsCommandArgs {
    fn from(args: SystemsArgs) -> Self {
        Self {
            queries: args.queries,
            fuzzy: args.fuzzy,
            limit: args.limit,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let dataset = cli.systems.unwrap_or_else(default_dataset_path);

    match cli.command {
        Command::Route(args) => {
            let sources = SourcesConfig::from_env();
            handle_route(&dataset, &sources, &RouteCommandArgs::from(args), cli.format).await
        }
        Command::Systems(args) => {
            handle_systems(&dataset, &SystemsCommandArgs::from(args), cli.format)
        }
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
