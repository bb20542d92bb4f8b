//! ENSIndex CLI — extract ENS registrations into a deduplicated, resumable registry.
//!
//! # Commands
//! ```text
//! ensindex connect
//! ensindex extract --from-block <N> [--to-block <N>] [--event registered|renewed] [--store <name>]
//! ensindex status  [--store <name>]
//! ensindex reset   [--store <name>]
//! ensindex info
//! ```

use std::ops::Range;
use std::time::Duration;

use alloy_primitives::Address;
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use ensindex_core::config::{DEFAULT_PROGRESS_INTERVAL, ENS_REGISTRAR_CONTROLLER};
use ensindex_core::{Extractor, RegistrarEvent, RegistrationMap, RegistryStore};
use ensindex_evm::fetcher::DEFAULT_MAX_RANGE;
use ensindex_evm::rpc::DEFAULT_REQUEST_TIMEOUT;
use ensindex_evm::{EthClient, ExtractorBuilder, HttpRpcClient, LogFetcher};
use ensindex_storage::{JsonFileStore, DEFAULT_STORE_NAME};

mod account;
mod config;
mod logging;

use config::{RpcEndpoint, ALCHEMY_KEY_VAR, PRIVATE_KEY_VAR, RPC_URL_VAR};
use logging::LogConfig;

#[derive(Parser)]
#[command(
    name = "ensindex",
    about = "Extract ENS registrations from registrar controller logs",
    long_about = "
ENSIndex: fetch ENS registrar controller logs, decode each transaction's
receipt once, and keep a registry keyed by transaction hash that survives
restarts. Re-running over the same blocks only fetches what is missing.

ENVIRONMENT VARIABLES (also read from ./.env):
  ENSINDEX_RPC_URL       Full JSON-RPC URL (takes precedence)
  ALCHEMY_API_KEY        Alchemy key, used with --chain-id
  ENSINDEX_PRIVATE_KEY   Optional; only used to print the account address
  RUST_LOG               Overrides --log-level
",
    version
)]
struct Cli {
    /// Debug logging for the ENSIndex crates
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Default log level
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Emit JSON log lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct RpcArgs {
    /// JSON-RPC endpoint URL
    #[arg(long, env = RPC_URL_VAR)]
    rpc: Option<String>,
    /// Alchemy API key (used when no URL is given)
    #[arg(long, env = ALCHEMY_KEY_VAR, hide_env_values = true)]
    alchemy_key: Option<String>,
    /// EVM chain ID for the Alchemy endpoint
    #[arg(long, default_value_t = 1)]
    chain_id: u64,
    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_REQUEST_TIMEOUT.as_secs())]
    timeout_secs: u64,
}

impl RpcArgs {
    fn endpoint(&self) -> Result<RpcEndpoint> {
        RpcEndpoint::resolve(self.rpc.as_deref(), self.alchemy_key.as_deref(), self.chain_id)
    }

    fn client(&self) -> Result<(RpcEndpoint, HttpRpcClient)> {
        let endpoint = self.endpoint()?;
        let client = endpoint.client(Duration::from_secs(self.timeout_secs))?;
        Ok((endpoint, client))
    }
}

#[derive(Args)]
struct StoreArgs {
    /// Registry name; saved as obj/<name>.json
    #[arg(long, default_value = DEFAULT_STORE_NAME)]
    store: String,
    /// Use a SQLite database at this path instead of the JSON file
    #[arg(long)]
    sqlite: Option<String>,
}

impl StoreArgs {
    fn json(&self) -> JsonFileStore {
        JsonFileStore::named(&self.store)
    }

    /// Rejects `--sqlite` when the binary was built without SQLite support.
    fn check_backend(&self) -> Result<()> {
        if self.sqlite.is_some() && !cfg!(feature = "sqlite") {
            anyhow::bail!("--sqlite requires ensindex to be built with the `sqlite` feature");
        }
        Ok(())
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Check the RPC connection and show the configured account
    Connect {
        #[command(flatten)]
        rpc: RpcArgs,
        /// Hex private key (only used to derive the address)
        #[arg(long, env = PRIVATE_KEY_VAR, hide_env_values = true)]
        private_key: Option<String>,
    },

    /// Fetch registrar logs and extract new registrations
    Extract {
        #[command(flatten)]
        rpc: RpcArgs,
        #[command(flatten)]
        store: StoreArgs,
        /// First block to scan
        #[arg(long)]
        from_block: u64,
        /// Last block to scan (default: current head)
        #[arg(long)]
        to_block: Option<u64>,
        /// Registrar controller address
        #[arg(long, default_value_t = ENS_REGISTRAR_CONTROLLER)]
        registrar: Address,
        /// Event to extract: registered | renewed
        #[arg(long, default_value_t = RegistrarEvent::NameRegistered)]
        event: RegistrarEvent,
        /// Skip fetched logs before this position
        #[arg(long)]
        start: Option<usize>,
        /// Stop before this log position
        #[arg(long)]
        end: Option<usize>,
        /// Print progress every N logs (0 disables)
        #[arg(long, default_value_t = DEFAULT_PROGRESS_INTERVAL)]
        progress_interval: u64,
        /// Blocks per eth_getLogs request
        #[arg(long, default_value_t = DEFAULT_MAX_RANGE)]
        max_range: u64,
    },

    /// Show the saved registry's size and newest record
    Status {
        #[command(flatten)]
        store: StoreArgs,
    },

    /// Delete the saved registry
    Reset {
        #[command(flatten)]
        store: StoreArgs,
    },

    /// Show defaults and build info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    let dotenv_path = config::load_dotenv();
    let cli = Cli::parse();

    let mut log_config = LogConfig {
        level: cli.log_level.clone(),
        json: cli.json_logs,
        ..LogConfig::default()
    };
    if cli.verbose {
        log_config = log_config.verbose();
    }
    logging::init_tracing(&log_config);
    if let Some(path) = dotenv_path {
        tracing::debug!(path = %path.display(), "loaded .env");
    }

    match cli.command {
        Commands::Connect { rpc, private_key } => cmd_connect(&rpc, private_key.as_deref()).await,

        Commands::Extract {
            rpc,
            store,
            from_block,
            to_block,
            registrar,
            event,
            start,
            end,
            progress_interval,
            max_range,
        } => {
            let job = ExtractJob {
                from_block,
                to_block,
                start,
                end,
                max_range,
                builder: ExtractorBuilder::new()
                    .registrar(registrar)
                    .event(event)
                    .progress_interval(progress_interval),
            };
            store.check_backend()?;

            #[cfg(feature = "sqlite")]
            if let Some(path) = &store.sqlite {
                let db = ensindex_storage::sqlite::SqliteStorage::open(path).await?;
                return cmd_extract(&rpc, db, job).await;
            }
            cmd_extract(&rpc, store.json(), job).await
        }

        Commands::Status { store } => {
            store.check_backend()?;
            #[cfg(feature = "sqlite")]
            if let Some(path) = &store.sqlite {
                let db = ensindex_storage::sqlite::SqliteStorage::open(path).await?;
                let saved_at = db.saved_at().await?;
                return print_status(path, db.load().await?, saved_at);
            }
            let json = store.json();
            let snapshot = json.load_snapshot().await?;
            let saved_at = snapshot.as_ref().map(|s| s.saved_at);
            print_status(
                &json.path().display().to_string(),
                snapshot.map(|s| s.records),
                saved_at,
            )
        }

        Commands::Reset { store } => {
            store.check_backend()?;
            #[cfg(feature = "sqlite")]
            if let Some(path) = &store.sqlite {
                let db = ensindex_storage::sqlite::SqliteStorage::open(path).await?;
                return cmd_reset(path, &db).await;
            }
            let json = store.json();
            cmd_reset(&json.path().display().to_string(), &json).await
        }

        Commands::Info => cmd_info(),
    }
}

// ─── Command implementations ─────────────────────────────────────────────────

async fn cmd_connect(rpc: &RpcArgs, private_key: Option<&str>) -> Result<()> {
    let (endpoint, client) = rpc.client()?;
    let client = EthClient::new(client);
    print_connection(&endpoint, &client).await?;

    match private_key {
        Some(key) => {
            let address = account::address_from_private_key(key)
                .with_context(|| format!("reading {PRIVATE_KEY_VAR}"))?;
            println!("  Account:     {address}");
        }
        None => println!("  Account:     (no {PRIVATE_KEY_VAR} set)"),
    }
    Ok(())
}

async fn print_connection(endpoint: &RpcEndpoint, client: &EthClient<HttpRpcClient>) -> Result<u64> {
    let chain_id = client
        .chain_id()
        .await
        .with_context(|| format!("connecting to {endpoint}"))?;
    let head = client.block_number().await.context("reading head block")?;

    println!("Connected to {endpoint}");
    println!("  Chain ID:    {chain_id}");
    println!("  Head block:  {head}");
    Ok(head)
}

struct ExtractJob {
    from_block: u64,
    to_block: Option<u64>,
    start: Option<usize>,
    end: Option<usize>,
    max_range: u64,
    builder: ExtractorBuilder,
}

async fn cmd_extract<S: RegistryStore>(rpc: &RpcArgs, store: S, job: ExtractJob) -> Result<()> {
    let (endpoint, client) = rpc.client()?;
    let client = EthClient::new(client);
    let head = print_connection(&endpoint, &client).await?;
    let to_block = job.to_block.unwrap_or(head);

    let filter = job.builder.build_filter();
    let fetcher = LogFetcher::new(client).max_range(job.max_range);
    let logs = fetcher
        .logs(job.from_block, to_block, &filter)
        .await
        .with_context(|| format!("fetching logs for blocks {}..={to_block}", job.from_block))?;

    let range = log_range(logs.len(), job.start, job.end);
    info!(
        fetched = logs.len(),
        start = range.start,
        end = range.end,
        "Fetched registrar logs"
    );

    let decoder = job.builder.build_decoder();
    let config = job.builder.build_config();
    let extractor = Extractor::from_config(fetcher.into_source(), decoder, store, &config);

    let mut registry = extractor.load_registry().await?;
    let summary = extractor
        .extract(&logs[range], &mut registry)
        .await
        .context("extraction stopped; progress up to the failing log was saved")?;

    println!("{summary}");
    println!("Registry now holds {} entries", registry.len());
    Ok(())
}

/// Clamp the `[start, end)` log window to what was fetched.
fn log_range(len: usize, start: Option<usize>, end: Option<usize>) -> Range<usize> {
    let start = start.unwrap_or(0).min(len);
    let end = end.unwrap_or(len).clamp(start, len);
    start..end
}

fn print_status(location: &str, registry: Option<RegistrationMap>, saved_at: Option<i64>) -> Result<()> {
    let Some(registry) = registry else {
        println!("No registry saved at {location}");
        return Ok(());
    };

    println!("Registry at {location}");
    println!("  Entries:     {}", registry.len());
    if let Some(ts) = saved_at.and_then(|s| chrono::DateTime::from_timestamp(s, 0)) {
        println!("  Saved at:    {}", ts.to_rfc3339());
    }
    if let Some((tx, rec)) = registry.latest() {
        println!("  Newest:      {} at block {} (tx {tx})", rec.name, rec.block_number);
    }
    Ok(())
}

async fn cmd_reset<S: RegistryStore>(location: &str, store: &S) -> Result<()> {
    store.delete().await?;
    println!("Deleted registry at {location}");
    Ok(())
}

fn cmd_info() -> Result<()> {
    println!("ENSIndex v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Defaults:");
    println!("  Registrar:          {ENS_REGISTRAR_CONTROLLER}");
    println!("  Event:              {}", RegistrarEvent::NameRegistered.signature());
    println!("  Store:              obj/{DEFAULT_STORE_NAME}.json");
    println!("  Progress interval:  every {DEFAULT_PROGRESS_INTERVAL} logs");
    println!("  Blocks per request: {DEFAULT_MAX_RANGE}");
    println!("  Request timeout:    {}s, no retries", DEFAULT_REQUEST_TIMEOUT.as_secs());
    println!();
    println!("Storage backends:     JSON file, SQLite (feature: sqlite)");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn log_range_defaults_to_everything() {
        assert_eq!(log_range(10, None, None), 0..10);
    }

    #[test]
    fn log_range_is_clamped() {
        assert_eq!(log_range(10, Some(3), Some(7)), 3..7);
        assert_eq!(log_range(10, Some(3), Some(50)), 3..10);
        assert_eq!(log_range(10, Some(12), None), 10..10);
        assert_eq!(log_range(10, Some(5), Some(2)), 5..5);
    }

    #[test]
    fn parses_extract_args() {
        let cli = Cli::try_parse_from([
            "ensindex",
            "extract",
            "--rpc",
            "http://localhost:8545",
            "--from-block",
            "100",
            "--event",
            "renewed",
            "--end",
            "50",
        ])
        .unwrap();

        match cli.command {
            Commands::Extract {
                from_block,
                event,
                end,
                registrar,
                store,
                ..
            } => {
                assert_eq!(from_block, 100);
                assert_eq!(event, RegistrarEvent::NameRenewed);
                assert_eq!(end, Some(50));
                assert_eq!(registrar, ENS_REGISTRAR_CONTROLLER);
                assert_eq!(store.store, DEFAULT_STORE_NAME);
            }
            _ => panic!("expected extract"),
        }
    }
}
