use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use jlip_core::JobDto;
use jlip_ingest::IngestConfig;
use jlip_storage::{JobStore, PgJobStore};

#[derive(Debug, Parser)]
#[command(name = "jlip-cli")]
#[command(about = "JLIP job ingestion command-line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Bulk-ingest a JSON file containing an array of job DTOs.
    Ingest {
        #[arg(long)]
        file: PathBuf,
    },
    /// Create the schema and indexes, then exit.
    Migrate,
    /// Print canonical store counts.
    Stats,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Ingest { file } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let dtos: Vec<JobDto> = serde_json::from_str(&text)
                .with_context(|| format!("parsing {}", file.display()))?;

            let pipeline = jlip_ingest::connect_from_env().await?;
            let summary = pipeline.ingest_bulk(dtos).await;
            println!(
                "ingest complete: success={} failed={}",
                summary.success, summary.failed
            );
            for (index, result) in summary.results.iter().enumerate() {
                if let Err(err) = result {
                    eprintln!("item {index}: {err}");
                    for issue in err.issues() {
                        eprintln!("  {} [{}]: {}", issue.code, issue.field, issue.message);
                    }
                }
            }
        }
        Commands::Migrate => {
            let config = IngestConfig::from_env();
            let store = PgJobStore::connect(&config.database_url)
                .await
                .context("connecting to job store")?;
            store.ensure_ready().await.context("ensuring schema")?;
            println!("schema ensured");
        }
        Commands::Stats => {
            let config = IngestConfig::from_env();
            let store = PgJobStore::connect(&config.database_url)
                .await
                .context("connecting to job store")?;
            let count = store.count().await?;
            println!("canonical jobs: {count}");
        }
    }

    Ok(())
}
