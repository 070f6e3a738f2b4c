use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use ticketboard::cmd::config::{self as config_cmd, ConfigArgs};
use ticketboard::cmd::render::{self, RenderCommandArgs};
use ticketboard::config::{AppConfig, StoredConfig};
use ticketboard::context::AppContext;
use ticketboard::domain::ticket::TimestampStyle;
use ticketboard::error::AppResult;
use ticketboard::infra::supabase::SupabaseClient;
use ticketboard::workflow::render::RenderOutcome;

const READ_FAILED_EXIT_CODE: i32 = 2;

#[derive(Parser)]
#[command(
    name = "ticketboard",
    author,
    version,
    about = "Render a Supabase tickets table as HTML cards"
)]
struct Cli {
    /// Log debug output to stderr (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch tickets newest first and write them as an HTML page.
    Render(RenderArgs),
    /// Manage stored connection settings.
    Config(ConfigArgs),
}

#[derive(Args)]
struct RenderArgs {
    /// Supabase project URL.
    #[arg(long)]
    url: Option<String>,
    /// Table to read.
    #[arg(long)]
    table: Option<String>,
    /// Column the rows are ordered by, newest first.
    #[arg(long)]
    timestamp_column: Option<String>,
    /// Id of the element the cards are rendered into.
    #[arg(long)]
    container_id: Option<String>,
    /// Write the HTML to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Emit only the container element instead of a full page.
    #[arg(long)]
    fragment: bool,
    /// Show creation times in the local timezone instead of UTC.
    #[arg(long)]
    local_time: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(code) => std::process::exit(code),
        Err(error) => {
            eprintln!("Error: {error}");
            std::process::exit(1);
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> AppResult<i32> {
    match cli.command {
        Commands::Config(args) => {
            config_cmd::run(args.command)?;
            Ok(0)
        }
        Commands::Render(args) => run_render(args).await,
    }
}

async fn run_render(args: RenderArgs) -> AppResult<i32> {
    let overrides = StoredConfig {
        supabase_url: args.url,
        supabase_anon_key: None,
        table: args.table,
        timestamp_column: args.timestamp_column,
        container_id: args.container_id,
    };
    let config = AppConfig::load(overrides)?;
    tracing::debug!(url = %config.supabase_url, table = %config.table, "configuration loaded");

    let store = Arc::new(SupabaseClient::new(
        config.supabase_url.clone(),
        config.supabase_anon_key.clone(),
    ));
    let context = AppContext::new(config, store);

    let timestamps = if args.local_time {
        TimestampStyle::Local
    } else {
        TimestampStyle::Utc
    };
    let outcome = render::run(
        &context,
        RenderCommandArgs {
            output: args.output,
            fragment: args.fragment,
            timestamps,
        },
    )
    .await?;

    match outcome {
        RenderOutcome::Rendered(count) => {
            eprintln!("Rendered {count} ticket(s).");
            Ok(0)
        }
        RenderOutcome::Empty => {
            eprintln!("No tickets found.");
            Ok(0)
        }
        RenderOutcome::Failed(message) => {
            eprintln!("Error loading tickets: {message}");
            Ok(READ_FAILED_EXIT_CODE)
        }
    }
}
