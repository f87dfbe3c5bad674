//! gpcr-build - GPCR protein family database builder

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use gpcr_build::store::DbConfig;
use gpcr_build::{BuildConfig, BuildPipeline, MemoryStore, PgStore, ProteinStore, RecordSource};
use gpcr_common::logging::{init_logging, LogConfig, LogLevel};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "gpcr-build")]
#[command(author, version, about = "GPCR protein family database builder")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Parser, Debug)]
enum Command {
    /// Build the family tree, segments, schemes and proteins
    Proteins {
        /// Source data directory
        #[arg(long, env = "GPCR_DATA_DIR")]
        data_dir: Option<PathBuf>,

        /// PostgreSQL connection string
        #[arg(long, env = "DATABASE_URL")]
        database_url: Option<String>,

        /// Build into an in-memory store and discard the result; any
        /// database URL is ignored
        #[arg(long)]
        dry_run: bool,

        /// Only read UniProt records from the local cache
        #[arg(long)]
        offline: bool,

        /// Write the build report as JSON
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Parse one UniProt record and print it as JSON
    Record {
        /// UniProt accession, e.g. P07550
        accession: String,

        /// Source data directory
        #[arg(long, env = "GPCR_DATA_DIR")]
        data_dir: Option<PathBuf>,

        /// Only read from the local cache
        #[arg(long)]
        offline: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };

    // Environment variables take precedence over flags
    let log_config = LogConfig::builder()
        .level(log_level)
        .log_file_prefix("gpcr-build")
        .filter_directives("sqlx=warn,hyper=warn,reqwest=warn")
        .build()
        .merge_env()?;

    let _log_guard = init_logging(&log_config)?;

    match cli.command {
        Command::Proteins {
            data_dir,
            database_url,
            dry_run,
            offline,
            report,
        } => {
            let config = build_config(data_dir, offline)?;
            let store = open_store(database_url, dry_run).await?;

            let pipeline = BuildPipeline::from_config(store, config)?.dry_run(dry_run);
            let build_report = pipeline.run().await?;

            if let Some(path) = report {
                build_report
                    .write_json(&path)
                    .with_context(|| format!("Failed writing report to {}", path.display()))?;
                info!(path = %path.display(), "Wrote build report");
            }
        },
        Command::Record {
            accession,
            data_dir,
            offline,
        } => {
            let config = build_config(data_dir, offline)?;
            let records = RecordSource::from_config(&config)?;
            let record = records.fetch(&accession).await?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        },
    }

    Ok(())
}

fn build_config(data_dir: Option<PathBuf>, offline: bool) -> Result<BuildConfig> {
    let mut config = BuildConfig::from_env()?;
    if let Some(dir) = data_dir {
        config = config.with_data_dir(dir);
    }
    if offline {
        config = config.with_offline(true);
    }
    config.validate()?;
    Ok(config)
}

async fn open_store(database_url: Option<String>, dry_run: bool) -> Result<Arc<dyn ProteinStore>> {
    if dry_run {
        info!("Dry run, using in-memory store");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let db_config = match database_url {
        Some(url) => DbConfig::from_env().unwrap_or_default().with_url(url),
        None => DbConfig::from_env()?,
    };
    let store = PgStore::connect(&db_config)
        .await
        .context("Failed connecting to the database")?;
    Ok(Arc::new(store))
}
