//! Parallel ingestion coordinator.
//!
//! The pipeline composes the other components and adds no parsing logic of
//! its own: plan boundary-aligned chunks, read each chunk's bytes
//! sequentially, parse one task per chunk on a fixed-width worker pool with
//! order-preserving collection, then resolve each question's shared entities
//! through the deduplicator and hand the assembled documents to the batch
//! writer, single-threaded. Parsing runs fully in parallel; deduplication
//! and writing are the serialization point of the run.

use crate::chunk::{Chunk, ChunkPlanError, ChunkPlanner};
use crate::config::get_config;
use crate::dedup::{DedupError, Deduplicator};
use crate::model::{FormulaRecord, ImageRecord, OptionRecord, Question, QuestionDocument};
use crate::parse::parse_markdown;
use crate::store::{CouchStore, StoreError};
use crate::writer::BatchWriter;
use futures_util::StreamExt;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while running an ingestion.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Chunk planning failed.
    #[error("Failed to plan chunks: {0}")]
    Chunking(#[from] ChunkPlanError),
    /// Reading chunk bytes failed.
    #[error("Failed to read source file: {0}")]
    Io(#[from] std::io::Error),
    /// A chunk contained bytes that are not valid UTF-8.
    #[error("chunk {chunk} is not valid UTF-8: {source}")]
    InvalidUtf8 {
        /// Index of the offending chunk in plan order.
        chunk: usize,
        /// Decoding failure reported by the standard library.
        #[source]
        source: std::string::FromUtf8Error,
    },
    /// The store rejected an operation.
    #[error("Store operation failed: {0}")]
    Store(#[from] StoreError),
    /// A shared entity could not be resolved.
    #[error("Failed to resolve shared entity: {0}")]
    Dedup(#[from] DedupError),
    /// A parser worker was cancelled or panicked.
    #[error("Parser worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// Scalar knobs consumed by the pipeline.
#[derive(Debug, Clone)]
pub struct IngestSettings {
    /// Fixed size of the parser worker pool.
    pub num_workers: usize,
    /// Target chunk size in megabytes.
    pub chunk_size_mb: f64,
    /// Buffered documents per bulk write.
    pub batch_size: usize,
    /// Database name prefix in the store.
    pub database: String,
}

impl IngestSettings {
    /// Build settings from the process configuration.
    pub fn from_config() -> Self {
        let config = get_config();
        Self {
            num_workers: config.num_workers,
            chunk_size_mb: config.chunk_size_mb,
            batch_size: config.batch_size,
            database: config.store_database.clone(),
        }
    }
}

/// Counters reported after a completed run.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct IngestOutcome {
    /// Questions assembled and handed to the writer.
    pub questions_processed: usize,
    /// Chunks parsed by the worker pool.
    pub chunks_processed: usize,
    /// Size of the worker pool used for the run.
    pub num_workers: usize,
}

/// Coordinates chunked parallel parsing and sequential persistence.
pub struct IngestPipeline {
    store: Arc<CouchStore>,
    settings: IngestSettings,
}

impl IngestPipeline {
    /// Create a pipeline over a connected store.
    pub fn new(store: Arc<CouchStore>, settings: IngestSettings) -> Self {
        Self { store, settings }
    }

    /// Ingest one markdown file.
    pub async fn run(&self, path: &Path) -> Result<IngestOutcome, PipelineError> {
        let workers = self.settings.num_workers.max(1);
        let planner = ChunkPlanner::new(path, self.settings.chunk_size_mb)?;
        let chunks = planner.plan()?;
        tracing::info!(
            path = %path.display(),
            chunks = chunks.len(),
            workers,
            "Starting ingestion run"
        );

        let texts = read_chunk_texts(path, &chunks)?;

        // One parse task per chunk. `buffered` caps the in-flight tasks at
        // the pool width and yields results in submission order even though
        // the parsing itself completes out of order.
        let mut parsed: Vec<Vec<Question>> = Vec::with_capacity(chunks.len());
        let mut tasks = futures_util::stream::iter(
            texts
                .into_iter()
                .map(|text| tokio::task::spawn_blocking(move || parse_markdown(&text))),
        )
        .buffered(workers);
        while let Some(joined) = tasks.next().await {
            parsed.push(joined?);
        }

        let deduplicator = Deduplicator::new(self.store.clone(), &self.settings.database).await?;
        let mut writer = BatchWriter::new(
            self.store.clone(),
            &self.settings.database,
            self.settings.batch_size,
        )
        .await?;

        let mut questions_processed = 0usize;
        for questions in &parsed {
            for question in questions {
                let document = assemble_document(&deduplicator, question).await?;
                writer.add(document).await?;
                questions_processed += 1;
            }
        }
        writer.flush().await?;

        let outcome = IngestOutcome {
            questions_processed,
            chunks_processed: chunks.len(),
            num_workers: workers,
        };
        tracing::info!(
            questions = outcome.questions_processed,
            chunks = outcome.chunks_processed,
            workers = outcome.num_workers,
            "Ingestion run complete"
        );
        Ok(outcome)
    }
}

/// Resolve a question's shared entities and assemble its persisted form.
async fn assemble_document(
    deduplicator: &Deduplicator,
    question: &Question,
) -> Result<QuestionDocument, PipelineError> {
    let mut option_ids = Vec::with_capacity(question.options.len());
    for (index, content) in question.options.iter().enumerate() {
        let record = OptionRecord {
            label: char::from(b'A' + (index % 26) as u8).to_string(),
            content: content.clone(),
        };
        option_ids.push(deduplicator.get_or_create_option(&record).await?);
    }

    let mut image_ids = Vec::with_capacity(question.images.len());
    for reference in &question.images {
        let record = ImageRecord {
            reference: reference.clone(),
        };
        image_ids.push(deduplicator.get_or_create_image(&record).await?);
    }

    let mut formula_ids = Vec::with_capacity(question.latex_formulas.len());
    for formula in &question.latex_formulas {
        let record = FormulaRecord {
            formula: formula.clone(),
        };
        formula_ids.push(deduplicator.get_or_create_formula(&record).await?);
    }

    Ok(QuestionDocument::assemble(
        question,
        option_ids,
        image_ids,
        formula_ids,
    ))
}

/// Read each chunk's bytes with sequential blocking file I/O.
fn read_chunk_texts(path: &Path, chunks: &[Chunk]) -> Result<Vec<String>, PipelineError> {
    let mut file = File::open(path)?;
    let mut texts = Vec::with_capacity(chunks.len());
    for (index, chunk) in chunks.iter().enumerate() {
        file.seek(SeekFrom::Start(chunk.start))?;
        let mut buffer = vec![0u8; chunk.len() as usize];
        file.read_exact(&mut buffer)?;
        let text = String::from_utf8(buffer)
            .map_err(|source| PipelineError::InvalidUtf8 { chunk: index, source })?;
        texts.push(text);
    }
    Ok(texts)
}
