//! Content-addressed get-or-create storage for shared sub-entities.
//!
//! Options, images, and formulas recur across questions, so each kind lives
//! in its own database keyed by a SHA-256 digest of the canonical content.
//! Two records with equal canonical content always resolve to the same
//! stored identifier, no matter which question referenced them first. An
//! insert that loses a race against a concurrent writer is treated as
//! "already exists" and re-resolved by re-reading.

use crate::model::{FormulaRecord, ImageRecord, OptionRecord};
use crate::store::{CouchStore, PutOutcome, StoreError};
use serde_json::{Value, json};
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while resolving deduplicated entities.
#[derive(Debug, Error)]
pub enum DedupError {
    /// Store interaction failed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// An insert lost a race but the winning document could not be read back.
    #[error("entity {digest} in {database} vanished after an insert conflict")]
    MissingAfterConflict {
        /// Database holding the entity kind.
        database: String,
        /// Digest identifying the entity.
        digest: String,
    },
}

/// Resolves shared sub-entities to stable store identifiers.
pub struct Deduplicator {
    store: Arc<CouchStore>,
    options_db: String,
    images_db: String,
    formulas_db: String,
}

impl Deduplicator {
    /// Connect the deduplicator to its entity databases, creating them and
    /// their digest indexes when missing. Using the digest as the document
    /// identifier makes the store's identifier uniqueness the constraint
    /// that turns concurrent duplicate inserts into conflicts.
    pub async fn new(store: Arc<CouchStore>, database: &str) -> Result<Self, StoreError> {
        let deduplicator = Self {
            store,
            options_db: format!("{database}_options"),
            images_db: format!("{database}_images"),
            formulas_db: format!("{database}_formulas"),
        };

        for db in [
            &deduplicator.options_db,
            &deduplicator.images_db,
            &deduplicator.formulas_db,
        ] {
            deduplicator.store.ensure_database(db).await?;
            deduplicator.store.ensure_index(db, "digest").await?;
        }
        Ok(deduplicator)
    }

    /// Resolve an option record to its store identifier.
    pub async fn get_or_create_option(
        &self,
        record: &OptionRecord,
    ) -> Result<String, DedupError> {
        let digest = record.digest();
        let document = json!({
            "label": record.label,
            "content": record.content,
            "digest": digest,
        });
        self.get_or_create(&self.options_db, digest, document).await
    }

    /// Resolve an image record to its store identifier.
    pub async fn get_or_create_image(&self, record: &ImageRecord) -> Result<String, DedupError> {
        let digest = record.digest();
        let document = json!({
            "reference": record.reference,
            "digest": digest,
        });
        self.get_or_create(&self.images_db, digest, document).await
    }

    /// Resolve a formula record to its store identifier.
    pub async fn get_or_create_formula(
        &self,
        record: &FormulaRecord,
    ) -> Result<String, DedupError> {
        let digest = record.digest();
        let document = json!({
            "formula": record.formula,
            "digest": digest,
        });
        self.get_or_create(&self.formulas_db, digest, document).await
    }

    async fn get_or_create(
        &self,
        database: &str,
        digest: String,
        document: Value,
    ) -> Result<String, DedupError> {
        if self.store.get_document(database, &digest).await?.is_some() {
            return Ok(digest);
        }

        match self.store.put_document(database, &digest, &document).await? {
            PutOutcome::Created => Ok(digest),
            PutOutcome::Conflict => {
                // Lost the insert race: the digest now names the winner's
                // document. Re-read before reporting it as resolved.
                if self.store.get_document(database, &digest).await?.is_some() {
                    tracing::debug!(
                        database,
                        digest = %digest,
                        "Insert conflict resolved as existing entity"
                    );
                    Ok(digest)
                } else {
                    Err(DedupError::MissingAfterConflict {
                        database: database.to_string(),
                        digest,
                    })
                }
            }
        }
    }
}
