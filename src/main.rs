use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use quizmill::pipeline::{IngestPipeline, IngestSettings};
use quizmill::store::CouchStore;
use quizmill::{api, config, export, logging, parse};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

#[derive(Parser)]
#[command(name = "quizmill", about = "Convert exam markdown into structured question records")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse a markdown file and ingest it into the document store.
    Ingest {
        /// Markdown file to process.
        file: PathBuf,
        /// Worker pool size override.
        #[arg(long)]
        workers: Option<usize>,
        /// Chunk size override in megabytes.
        #[arg(long)]
        chunk_size_mb: Option<f64>,
        /// Batch size override for bulk writes.
        #[arg(long)]
        batch_size: Option<usize>,
        /// Database name prefix override.
        #[arg(long)]
        database: Option<String>,
    },
    /// Run the HTTP parse service.
    Serve,
    /// Parse a markdown file and emit SQL INSERT statements.
    Export {
        /// Markdown file to process.
        file: PathBuf,
        /// Output file; prints to stdout when omitted.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    config::init_config();
    logging::init_tracing();

    match cli.command {
        Command::Ingest {
            file,
            workers,
            chunk_size_mb,
            batch_size,
            database,
        } => {
            let mut settings = IngestSettings::from_config();
            if let Some(workers) = workers {
                if workers == 0 {
                    bail!("--workers must be positive");
                }
                settings.num_workers = workers;
            }
            if let Some(chunk_size_mb) = chunk_size_mb {
                if chunk_size_mb <= 0.0 {
                    bail!("--chunk-size-mb must be positive");
                }
                settings.chunk_size_mb = chunk_size_mb;
            }
            if let Some(batch_size) = batch_size {
                if batch_size == 0 {
                    bail!("--batch-size must be positive");
                }
                settings.batch_size = batch_size;
            }
            if let Some(database) = database {
                settings.database = database;
            }

            let store = Arc::new(CouchStore::new().context("Failed to connect to the store")?);
            let questions_db = format!("{}_questions", settings.database);
            let pipeline = IngestPipeline::new(store.clone(), settings);
            let outcome = pipeline
                .run(&file)
                .await
                .with_context(|| format!("Ingestion failed for {}", file.display()))?;
            let stored = store
                .count_documents(&questions_db)
                .await
                .context("Failed to verify stored question count")?;
            println!(
                "Processed {} questions from {} chunks using {} workers ({} documents in {})",
                outcome.questions_processed,
                outcome.chunks_processed,
                outcome.num_workers,
                stored,
                questions_db
            );
        }
        Command::Serve => {
            let service = Arc::new(api::ParseService::new(
                config::get_config().parse_cache_capacity,
            ));
            let app = api::create_router(service);
            let (listener, port) = bind_listener().await.context("Failed to bind listener")?;
            tracing::info!("Listening on http://0.0.0.0:{}", port);
            axum::serve(listener, app).await?;
        }
        Command::Export { file, output } => {
            let content = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let questions = parse::parse_markdown(&content);
            let sql = export::export_to_sql(&questions);
            match output {
                Some(path) => {
                    std::fs::write(&path, sql)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    println!("Output written to {}", path.display());
                }
                None => println!("{sql}"),
            }
        }
    }

    Ok(())
}

async fn bind_listener() -> Result<(TcpListener, u16), std::io::Error> {
    use std::net::Ipv4Addr;

    let config = config::get_config();
    if let Some(port) = config.server_port {
        return TcpListener::bind((Ipv4Addr::UNSPECIFIED, port))
            .await
            .map(|listener| (listener, port));
    }

    const PORT_RANGE: std::ops::RangeInclusive<u16> = 4200..=4299;
    for port in PORT_RANGE {
        match TcpListener::bind((Ipv4Addr::UNSPECIFIED, port)).await {
            Ok(listener) => {
                tracing::debug!(port, "Bound server port");
                return Ok((listener, port));
            }
            Err(err) if err.kind() == std::io::ErrorKind::AddrInUse => {
                tracing::debug!(port, "Port already in use; trying next");
                continue;
            }
            Err(err) => return Err(err),
        }
    }

    Err(std::io::Error::new(
        std::io::ErrorKind::AddrNotAvailable,
        "No available port found in range 4200-4299",
    ))
}
