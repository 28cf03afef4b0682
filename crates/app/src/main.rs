mod console;
mod samples;

use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use vector_kb_core::{ChromaStore, IngestionOptions, KnowledgeBase};

#[derive(Parser)]
#[command(name = "vector-kb", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Chroma-compatible store base URL
    #[arg(long, env = "VECTOR_KB_STORE_URL", default_value = "http://localhost:8000")]
    store_url: String,

    /// Collection name
    #[arg(long, env = "VECTOR_KB_COLLECTION", default_value = "my_knowledge_base")]
    collection: String,

    /// Chunk window size in characters
    #[arg(long, default_value = "1000")]
    chunk_chars: usize,

    /// Overlap between consecutive chunks in characters
    #[arg(long, default_value = "200")]
    overlap_chars: usize,
}

#[derive(Subcommand)]
enum Command {
    /// Recursively ingest every supported document under a directory.
    Ingest {
        /// Directory to walk.
        #[arg(long)]
        dir: PathBuf,
    },
    /// Search the knowledge base and print the hits.
    Search {
        /// Search query
        #[arg(long)]
        query: String,
        /// Number of hits to return.
        #[arg(long, default_value = "5")]
        top_k: usize,
    },
    /// Search and write the hits to a JSON file.
    Export {
        /// Search query
        #[arg(long)]
        query: String,
        /// Number of hits to export.
        #[arg(long, default_value = "10")]
        top_k: usize,
        /// Output file.
        #[arg(long, default_value = "search_results.json")]
        output: PathBuf,
    },
    /// Print collection statistics.
    Stats,
    /// Write a small sample corpus for trying the pipeline out.
    SeedSamples {
        /// Directory the sample files are written into.
        #[arg(long, default_value = "samples")]
        dir: PathBuf,
    },
    /// Interactive menu: search, statistics, export.
    Console,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_version = env!("CARGO_PKG_VERSION");

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();

    info!(
        version = app_version,
        started_at = %Utc::now().to_rfc3339(),
        "vector-kb boot"
    );

    if let Command::SeedSamples { dir } = &cli.command {
        let written = samples::seed_samples(dir)?;
        for path in written {
            println!("created sample file: {}", path.display());
        }
        return Ok(());
    }

    let store = match ChromaStore::connect(&cli.store_url, &cli.collection).await {
        Ok(store) => store,
        Err(error) => {
            eprintln!(
                "could not initialize the knowledge base at {}: {error}",
                cli.store_url
            );
            eprintln!("make sure a Chroma-compatible server is running and reachable");
            anyhow::bail!("store initialization failed");
        }
    };

    let options = IngestionOptions {
        chunk_chars: cli.chunk_chars,
        overlap_chars: cli.overlap_chars,
    };
    let kb = KnowledgeBase::with_options(store, options);

    match cli.command {
        Command::Ingest { dir } => {
            let report = kb
                .ingest_directory(&dir)
                .await
                .map_err(|error| anyhow::anyhow!(error.to_string()))?;

            if !report.skipped.is_empty() {
                warn!(skipped = report.skipped.len(), "some files were skipped");
                for skipped in &report.skipped {
                    warn!(path = %skipped.path.display(), reason = %skipped.reason, "skipped file");
                }
            }

            println!(
                "{} files processed, {} chunks ingested ({} skipped)",
                report.files_processed,
                report.chunks_ingested,
                report.skipped.len()
            );
        }
        Command::Search { query, top_k } => {
            let hits = kb.search(&query, top_k).await;
            if hits.is_empty() {
                println!("no results for '{query}'");
            } else {
                println!("{} result(s) for '{query}':", hits.len());
                console::print_hits(&hits);
            }
        }
        Command::Export {
            query,
            top_k,
            output,
        } => {
            if kb.export_search_results(&query, top_k, &output).await {
                println!("search results exported to: {}", output.display());
            } else {
                println!("export failed, see the log for details");
            }
        }
        Command::Stats => {
            let info = kb.collection_info().await;
            println!("collection: {}", info.collection_name);
            println!("documents:  {}", info.total_documents);
        }
        Command::Console => {
            console::run(&kb).await?;
        }
        Command::SeedSamples { .. } => unreachable!("handled before store setup"),
    }

    Ok(())
}
