//! Buffered batch persistence of question documents.
//!
//! The writer owns an in-memory buffer of pending documents and moves
//! through an explicit `Idle ⇄ Accumulating → Flushing → Idle` cycle so that
//! flush timing is an observable transition rather than a side effect of a
//! size check. Buffering is at-most-once: a flush clears the buffer even
//! when individual documents were rejected, and retrying rejected documents
//! is the caller's decision.

use crate::model::QuestionDocument;
use crate::store::{CouchStore, StoreError};
use serde_json::Value;
use std::sync::Arc;

/// Observable lifecycle state of the writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterState {
    /// Buffer is empty.
    Idle,
    /// Buffer holds documents below the batch threshold.
    Accumulating,
    /// A bulk write is in progress.
    Flushing,
}

/// Summary of one completed flush.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushOutcome {
    /// Documents acknowledged by the store.
    pub written: usize,
    /// Documents rejected individually during the bulk write.
    pub failed: usize,
}

/// Buffers question documents and writes them to the store in batches.
pub struct BatchWriter {
    store: Arc<CouchStore>,
    database: String,
    batch_size: usize,
    buffer: Vec<QuestionDocument>,
    state: WriterState,
}

impl BatchWriter {
    /// Create a writer for `{database}_questions`, bootstrapping the
    /// database and its `question_type` index when missing.
    pub async fn new(
        store: Arc<CouchStore>,
        database: &str,
        batch_size: usize,
    ) -> Result<Self, StoreError> {
        let questions_db = format!("{database}_questions");
        store.ensure_database(&questions_db).await?;
        store.ensure_index(&questions_db, "question_type").await?;

        Ok(Self {
            store,
            database: questions_db,
            batch_size: batch_size.max(1),
            buffer: Vec::new(),
            state: WriterState::Idle,
        })
    }

    /// Current lifecycle state.
    pub fn state(&self) -> WriterState {
        self.state
    }

    /// Number of documents currently buffered.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Append a document to the buffer. Reaching the batch threshold
    /// triggers a flush synchronously before this call returns.
    pub async fn add(&mut self, document: QuestionDocument) -> Result<(), StoreError> {
        self.buffer.push(document);
        self.state = WriterState::Accumulating;
        if self.buffer.len() >= self.batch_size {
            self.flush().await?;
        }
        Ok(())
    }

    /// Write all buffered documents in one bulk call.
    ///
    /// A no-op on an empty buffer. Individual document rejections are logged
    /// and counted without aborting the rest of the batch; the buffer clears
    /// unconditionally afterwards. Only a transport-level store failure is
    /// an error, and it leaves the buffer intact for accurate reporting.
    pub async fn flush(&mut self) -> Result<FlushOutcome, StoreError> {
        if self.buffer.is_empty() {
            self.state = WriterState::Idle;
            return Ok(FlushOutcome::default());
        }

        self.state = WriterState::Flushing;
        let documents: Vec<Value> = self
            .buffer
            .iter()
            .map(|doc| serde_json::to_value(doc).expect("question document serializes"))
            .collect();

        let results = match self.store.bulk_insert(&self.database, documents).await {
            Ok(results) => results,
            Err(error) => {
                self.state = WriterState::Accumulating;
                return Err(error);
            }
        };

        let failed = results.iter().filter(|result| !result.succeeded()).count();
        for result in results.iter().filter(|result| !result.succeeded()) {
            tracing::warn!(
                id = %result.id,
                error = result.error.as_deref().unwrap_or("unknown"),
                reason = result.reason.as_deref().unwrap_or(""),
                "Document rejected during bulk write"
            );
        }

        let written = results.len() - failed;
        self.buffer.clear();
        self.state = WriterState::Idle;
        tracing::debug!(
            database = %self.database,
            written,
            failed,
            "Flushed question batch"
        );
        Ok(FlushOutcome { written, failed })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Question, QuestionType};
    use httpmock::{Method::POST, Method::PUT, MockServer};
    use reqwest::Client;
    use serde_json::json;

    fn test_store(base_url: String) -> Arc<CouchStore> {
        Arc::new(CouchStore {
            client: Client::builder()
                .user_agent("quizmill-test")
                .build()
                .expect("client"),
            base_url,
            username: None,
            password: None,
        })
    }

    async fn mock_bootstrap(server: &MockServer) {
        server
            .mock_async(|when, then| {
                when.method(PUT).path("/quiz_questions");
                then.status(201).json_body(json!({"ok": true}));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/quiz_questions/_index");
                then.status(200).json_body(json!({"result": "created"}));
            })
            .await;
    }

    fn document(content: &str) -> QuestionDocument {
        let question = Question {
            content: content.into(),
            question_type: QuestionType::Subjective,
            options: Vec::new(),
            answer: None,
            explanation: None,
            images: Vec::new(),
            latex_formulas: Vec::new(),
        };
        QuestionDocument::assemble(&question, Vec::new(), Vec::new(), Vec::new())
    }

    #[tokio::test]
    async fn add_accumulates_below_threshold() {
        let server = MockServer::start_async().await;
        mock_bootstrap(&server).await;

        let mut writer = BatchWriter::new(test_store(server.base_url()), "quiz", 3)
            .await
            .unwrap();
        assert_eq!(writer.state(), WriterState::Idle);

        writer.add(document("one")).await.unwrap();
        writer.add(document("two")).await.unwrap();
        assert_eq!(writer.state(), WriterState::Accumulating);
        assert_eq!(writer.buffered(), 2);
    }

    #[tokio::test]
    async fn reaching_batch_size_flushes_synchronously() {
        let server = MockServer::start_async().await;
        mock_bootstrap(&server).await;
        let bulk = server
            .mock_async(|when, then| {
                when.method(POST).path("/quiz_questions/_bulk_docs");
                then.status(201).json_body(json!([
                    {"ok": true, "id": "a", "rev": "1-a"},
                    {"ok": true, "id": "b", "rev": "1-b"},
                ]));
            })
            .await;

        let mut writer = BatchWriter::new(test_store(server.base_url()), "quiz", 2)
            .await
            .unwrap();
        writer.add(document("one")).await.unwrap();
        assert_eq!(writer.buffered(), 1);
        writer.add(document("two")).await.unwrap();

        bulk.assert_async().await;
        assert_eq!(writer.buffered(), 0);
        assert_eq!(writer.state(), WriterState::Idle);
    }

    #[tokio::test]
    async fn flush_on_empty_buffer_is_a_noop() {
        let server = MockServer::start_async().await;
        mock_bootstrap(&server).await;

        let mut writer = BatchWriter::new(test_store(server.base_url()), "quiz", 2)
            .await
            .unwrap();
        let outcome = writer.flush().await.unwrap();
        assert_eq!(outcome, FlushOutcome::default());
        assert_eq!(writer.state(), WriterState::Idle);
    }

    #[tokio::test]
    async fn partial_failures_clear_the_buffer() {
        let server = MockServer::start_async().await;
        mock_bootstrap(&server).await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/quiz_questions/_bulk_docs");
                then.status(201).json_body(json!([
                    {"ok": true, "id": "a", "rev": "1-a"},
                    {"id": "b", "error": "conflict", "reason": "Document update conflict."},
                ]));
            })
            .await;

        let mut writer = BatchWriter::new(test_store(server.base_url()), "quiz", 10)
            .await
            .unwrap();
        writer.add(document("one")).await.unwrap();
        writer.add(document("two")).await.unwrap();

        let outcome = writer.flush().await.unwrap();
        assert_eq!(outcome.written, 1);
        assert_eq!(outcome.failed, 1);
        assert_eq!(writer.buffered(), 0);
        assert_eq!(writer.state(), WriterState::Idle);
    }
}
