//! Proofchain CLI - work with a ledger file from the terminal
//!
//! This CLI lets operators:
//! - Create a ledger and its genesis block
//! - Submit content and seal blocks
//! - List blocks as explorer JSON
//! - Verify the chain and look up content by fingerprint

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use proofchain::store::SqliteStore;
use proofchain::{Ledger, LedgerConfig};

mod commands;
mod input;
mod output;

use input::{FingerprintArgs, RecordArgs};
use output::{print_json, print_success, print_warning};

/// Proofchain CLI application
#[derive(Debug, Parser)]
#[command(name = "proofchain")]
#[command(about = "Proofchain - content-integrity ledger CLI", long_about = None)]
#[command(version)]
struct Cli {
    /// Ledger database path
    #[arg(short, long, env = "PROOFCHAIN_DB", default_value = "proofchain.db")]
    db: PathBuf,

    /// Ledger configuration file (TOML)
    #[arg(short, long, env = "PROOFCHAIN_CONFIG")]
    config: Option<PathBuf>,

    /// Required leading hex zeros for new blocks
    #[arg(long, env = "PROOFCHAIN_DIFFICULTY")]
    difficulty: Option<u32>,

    /// Pending records that trigger a seal
    #[arg(long, env = "PROOFCHAIN_THRESHOLD")]
    threshold: Option<usize>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Debug, Subcommand)]
enum Commands {
    /// Create the genesis block if the ledger is empty
    Init,

    /// Submit content; full batches are sealed as the threshold is reached
    Submit(RecordArgs),

    /// Submit content and seal all of it into a single block
    Seal(RecordArgs),

    /// Print blocks as JSON
    List {
        /// First block index
        #[arg(long)]
        from: Option<u64>,

        /// Last block index
        #[arg(long)]
        to: Option<u64>,
    },

    /// Validate every block digest and link
    Verify,

    /// Find where content was chained
    Locate(FingerprintArgs),

    /// Show chain statistics
    Summary,
}

impl Cli {
    /// Configuration file, then flag and environment overrides.
    fn ledger_config(&self) -> Result<LedgerConfig> {
        let mut config = match &self.config {
            Some(path) => LedgerConfig::from_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => LedgerConfig::default(),
        };
        if let Some(difficulty) = self.difficulty {
            config.difficulty = difficulty;
        }
        if let Some(threshold) = self.threshold {
            config.seal_threshold = threshold;
        }
        config.check()?;
        Ok(config)
    }

    fn open_store(&self) -> Result<SqliteStore> {
        SqliteStore::open(&self.db).with_context(|| format!("opening ledger {}", self.db.display()))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = cli.ledger_config()?;
    tracing::debug!(?config, db = %cli.db.display(), "resolved configuration");

    match &cli.command {
        Commands::Init => {
            let ledger = Ledger::new(cli.open_store()?, config)?;
            let report = commands::init(&ledger).await?;
            if report.created {
                print_success("created genesis block");
            } else {
                print_success("ledger already initialized");
            }
            print_json(&report)
        }
        Commands::Submit(args) => {
            let records = args.records()?;
            let ledger = Ledger::open(cli.open_store()?, config).await?;
            let report = commands::submit(&ledger, records).await?;
            for error in &report.deferred {
                print_warning(&format!("seal deferred: {}", error));
            }
            print_json(&report)
        }
        Commands::Seal(args) => {
            let records = args.records()?;
            let config = config.with_seal_threshold(usize::MAX);
            let ledger = Ledger::open(cli.open_store()?, config).await?;
            let report = commands::submit(&ledger, records).await?;
            print_json(&report)
        }
        Commands::List { from, to } => {
            let ledger = Ledger::new(cli.open_store()?, config)?;
            print_json(&commands::list(&ledger, *from, *to).await?)
        }
        Commands::Verify => {
            let ledger = Ledger::new(cli.open_store()?, config)?;
            let report = commands::verify(&ledger).await?;
            print_json(&report)?;
            if !report.valid {
                bail!("chain is invalid");
            }
            Ok(())
        }
        Commands::Locate(args) => {
            let fingerprint = args.fingerprint()?;
            let ledger = Ledger::new(cli.open_store()?, config)?;
            print_json(&commands::locate(&ledger, &fingerprint).await?)
        }
        Commands::Summary => {
            let ledger = Ledger::new(cli.open_store()?, config)?;
            print_json(&commands::summary(&ledger).await?)
        }
    }
}
