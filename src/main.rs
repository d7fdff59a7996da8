//! Moneyweb main entry point

use anyhow::Context;
use clap::{Parser, Subcommand};
use moneyweb_api::start_server;
use moneyweb_config::Config;
use moneyweb_core::Ledger;
use moneyweb_import::{importer_names, Importer, ImporterRef, StatementImporter};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Runtime;
use tokio::sync::RwLock;

#[derive(Parser, Debug)]
#[command(name = "moneyweb")]
#[command(version = "0.1.0")]
#[command(about = "A small self-hosted personal finance web interface", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the web server (default)
    Serve,
    /// Import a bank statement into the ledger
    Import {
        /// Importer name, e.g. generic-csv
        #[arg(short, long)]
        importer: String,
        /// Statement file; relative paths are also looked up in the statements directory
        file: PathBuf,
    },
    /// Print the default configuration
    DefaultConfig,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if let Some(Command::DefaultConfig) = args.command {
        print!("{}", Config::generate_default());
        return Ok(());
    }

    let config = match Config::load_or_default(&args.config) {
        Ok(config) => config,
        Err(e) => {
            if let Some(hint) = e.hint() {
                eprintln!("hint: {}", hint);
            }
            return Err(anyhow::Error::new(e)
                .context(format!("Failed to load configuration from {}", args.config.display())));
        }
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.logging.level)).init();
    log::info!(
        "Config loaded: store={}, statements={}",
        config.store_path().display(),
        config.statements_path().display()
    );

    let rt = Runtime::new()?;
    rt.block_on(async {
        match args.command {
            Some(Command::Import { importer, file }) => import(config, &importer, file).await,
            _ => serve(config).await,
        }
    })
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let ledger = Ledger::open(config.store_path())
        .await
        .context("Failed to open ledger store")?;

    start_server(config, Arc::new(RwLock::new(ledger))).await
}

async fn import(config: Config, name: &str, file: PathBuf) -> anyhow::Result<()> {
    let importer: ImporterRef = match Importer::from_config(name, &config) {
        Ok(importer) => Arc::new(importer),
        Err(e) => {
            log::error!("Available importers: {}", importer_names(&config).join(", "));
            return Err(e.into());
        }
    };

    let path = if file.is_relative() && !file.exists() {
        config.statements_path().join(&file)
    } else {
        file
    };

    log::info!("Importing {} with {}", path.display(), importer.name());
    let transactions = importer
        .process(path.clone())
        .await
        .with_context(|| format!("Failed to import {}", path.display()))?;

    let mut ledger = Ledger::open(config.store_path()).await?;
    let count = ledger.import(transactions).await?;
    log::info!("Added {} transactions to {}", count, ledger.path().display());

    Ok(())
}
