//! Quartile CLI binary.
//!
//! Resolves Korean tickers against the DART corporate directory and prints
//! reconciled quarterly financials as JSON.

use clap::{Parser, Subcommand};
use quartile_core::SpanThresholds;
use quartile_data::{
    CorpDirectory, DartClient, FetchConfig, StructuredFinancialsService,
};
use std::process;

#[derive(Parser)]
#[command(name = "quartile")]
#[command(about = "Reconcile DART filings into standalone quarterly figures", long_about = None)]
#[command(version)]
struct Cli {
    /// OpenDART API key; falls back to the DART_API_KEY environment variable
    #[arg(long, global = true)]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch and reconcile all quarterly financials for a ticker
    Financials {
        /// Six-digit KRX stock code, e.g. 005930
        ticker: String,

        /// First fiscal year to request
        #[arg(long, default_value_t = quartile_data::fetch::FIRST_YEAR_SUPPORTED)]
        first_year: i32,

        /// Maximum concurrent DART requests
        #[arg(long)]
        workers: Option<usize>,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Show the registry profile for a ticker
    Company {
        /// Six-digit KRX stock code
        ticker: String,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Manage the local corporate directory
    Directory {
        #[command(subcommand)]
        action: DirectoryAction,
    },
}

#[derive(Subcommand)]
enum DirectoryAction {
    /// Force-refresh the directory from DART if it is stale
    Refresh,

    /// Look up one company by stock code or registered name
    Lookup {
        /// Stock code or exact company name
        query: String,
    },
}

#[tokio::main]
async fn main() {
    env_logger::init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let api_key = cli
        .api_key
        .or_else(|| std::env::var("DART_API_KEY").ok())
        .ok_or("missing API key: pass --api-key or set DART_API_KEY")?;
    let client = DartClient::new(api_key)?;

    match cli.command {
        Commands::Financials {
            ticker,
            first_year,
            workers,
            pretty,
        } => {
            let mut config = FetchConfig {
                first_year,
                ..FetchConfig::default()
            };
            if let Some(workers) = workers {
                config.max_workers = workers.max(1);
            }
            let service =
                StructuredFinancialsService::with_config(client, config, SpanThresholds::default());

            let directory = open_directory(service.client()).await?;
            let report = service.get(&directory, &ticker).await?;
            print_json(&report, pretty)?;
        }
        Commands::Company { ticker, pretty } => {
            let directory = open_directory(&client).await?;
            let corp = directory
                .find_by_stock_code(&ticker)?
                .ok_or_else(|| format!("unknown ticker: {ticker}"))?;
            let profile = client.company(&corp.corp_code).await?;
            print_json(&profile, pretty)?;
        }
        Commands::Directory { action } => match action {
            DirectoryAction::Refresh => {
                let directory = CorpDirectory::open(directory_path()?)?;
                let refreshed = directory.refresh_if_stale(&client).await?;
                if refreshed {
                    println!("directory refreshed: {} companies", directory.count()?);
                } else {
                    println!("directory already fresh: {} companies", directory.count()?);
                }
            }
            DirectoryAction::Lookup { query } => {
                let directory = open_directory(&client).await?;
                let found = directory
                    .find_by_stock_code(&query)?
                    .or(directory.find_by_name(&query)?);
                match found {
                    Some(corp) => {
                        println!("{}  {}", corp.corp_code, corp.corp_name);
                        if let Some(stock_code) = corp.stock_code {
                            println!("stock code: {stock_code}");
                        }
                    }
                    None => {
                        eprintln!("no company matches '{query}'");
                        process::exit(1);
                    }
                }
            }
        },
    }

    Ok(())
}

/// Open the on-disk directory, refreshing it from DART if stale.
async fn open_directory(client: &DartClient) -> Result<CorpDirectory, Box<dyn std::error::Error>> {
    let directory = CorpDirectory::open(directory_path()?)?;
    directory.refresh_if_stale(client).await?;
    Ok(directory)
}

fn directory_path() -> Result<std::path::PathBuf, Box<dyn std::error::Error>> {
    let path = CorpDirectory::default_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(path)
}

fn print_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<(), Box<dyn std::error::Error>> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{rendered}");
    Ok(())
}
