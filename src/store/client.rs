//! HTTP client wrapper for the document store.

use crate::config::get_config;
use crate::store::types::{BulkDocResult, DatabaseInfo, FindResponse, PutOutcome, StoreError};
use reqwest::{Client, Method, StatusCode};
use serde_json::{Value, json};

/// Lightweight HTTP client for CouchDB-style store operations.
pub struct CouchStore {
    pub(crate) client: Client,
    pub(crate) base_url: String,
    pub(crate) username: Option<String>,
    pub(crate) password: Option<String>,
}

impl CouchStore {
    /// Construct a new client using configuration derived from the environment.
    pub fn new() -> Result<Self, StoreError> {
        let config = get_config();
        let client = Client::builder()
            .user_agent("quizmill/0.1")
            .build()?;

        let base_url = normalize_base_url(&config.store_url).map_err(StoreError::InvalidUrl)?;
        tracing::debug!(
            url = %base_url,
            has_credentials = config.store_username.is_some(),
            "Initialized store HTTP client"
        );

        Ok(Self {
            client,
            base_url,
            username: config.store_username.clone(),
            password: config.store_password.clone(),
        })
    }

    /// Create a database when it is missing; existing databases are left
    /// untouched.
    pub async fn ensure_database(&self, database: &str) -> Result<(), StoreError> {
        let response = self.request(Method::PUT, database).send().await?;

        match response.status() {
            status if status.is_success() => {
                tracing::debug!(database, "Database created");
                Ok(())
            }
            StatusCode::PRECONDITION_FAILED => {
                tracing::debug!(database, "Database already exists");
                Ok(())
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                let error = StoreError::UnexpectedStatus { status, body };
                tracing::error!(database, error = %error, "Database creation failed");
                Err(error)
            }
        }
    }

    /// Ensure an index exists on the named field. Idempotent: the store
    /// reports an existing index without error.
    pub async fn ensure_index(&self, database: &str, field: &str) -> Result<(), StoreError> {
        let body = json!({
            "index": { "fields": [field] },
            "name": format!("{field}-idx"),
            "type": "json",
        });

        let response = self
            .request(Method::POST, &format!("{database}/_index"))
            .json(&body)
            .send()
            .await?;

        self.ensure_success(response, || {
            tracing::debug!(database, field, "Index ensured");
        })
        .await
    }

    /// Fetch a document by identifier, returning `None` when it is missing.
    pub async fn get_document(
        &self,
        database: &str,
        id: &str,
    ) -> Result<Option<Value>, StoreError> {
        let response = self
            .request(Method::GET, &format!("{database}/{id}"))
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => Ok(Some(response.json().await?)),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(StoreError::UnexpectedStatus { status, body })
            }
        }
    }

    /// Insert a document under an explicit identifier. A conflict means a
    /// document with that identifier already exists and is reported as an
    /// outcome, not an error.
    pub async fn put_document(
        &self,
        database: &str,
        id: &str,
        document: &Value,
    ) -> Result<PutOutcome, StoreError> {
        let response = self
            .request(Method::PUT, &format!("{database}/{id}"))
            .json(document)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(PutOutcome::Created),
            StatusCode::CONFLICT => Ok(PutOutcome::Conflict),
            status => {
                let body = response.text().await.unwrap_or_default();
                let error = StoreError::UnexpectedStatus { status, body };
                tracing::error!(database, id, error = %error, "Document insert failed");
                Err(error)
            }
        }
    }

    /// Write many documents in one call. The store applies each document
    /// independently and reports a per-document result, so an individual
    /// failure never aborts the remainder of the batch.
    pub async fn bulk_insert(
        &self,
        database: &str,
        documents: Vec<Value>,
    ) -> Result<Vec<BulkDocResult>, StoreError> {
        if documents.is_empty() {
            return Ok(Vec::new());
        }

        let count = documents.len();
        let response = self
            .request(Method::POST, &format!("{database}/_bulk_docs"))
            .json(&json!({ "docs": documents }))
            .send()
            .await?;

        if response.status().is_success() {
            let results: Vec<BulkDocResult> = response.json().await?;
            tracing::debug!(database, documents = count, "Bulk write accepted");
            Ok(results)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let error = StoreError::UnexpectedStatus { status, body };
            tracing::error!(database, error = %error, "Bulk write failed");
            Err(error)
        }
    }

    /// Number of documents currently held by a database.
    pub async fn count_documents(&self, database: &str) -> Result<u64, StoreError> {
        let response = self.request(Method::GET, database).send().await?;

        if response.status().is_success() {
            let info: DatabaseInfo = response.json().await?;
            Ok(info.doc_count)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(StoreError::UnexpectedStatus { status, body })
        }
    }

    /// Run a selector query and return the matching documents.
    pub async fn find(&self, database: &str, selector: Value) -> Result<Vec<Value>, StoreError> {
        let response = self
            .request(Method::POST, &format!("{database}/_find"))
            .json(&json!({ "selector": selector }))
            .send()
            .await?;

        if response.status().is_success() {
            let payload: FindResponse = response.json().await?;
            Ok(payload.docs)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(StoreError::UnexpectedStatus { status, body })
        }
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format_endpoint(&self.base_url, path);
        let mut req = self.client.request(method, url);
        if let Some(username) = &self.username
            && !username.is_empty()
        {
            req = req.basic_auth(username, self.password.as_deref());
        }
        req
    }

    async fn ensure_success<F>(
        &self,
        response: reqwest::Response,
        on_success: F,
    ) -> Result<(), StoreError>
    where
        F: FnOnce(),
    {
        if response.status().is_success() {
            on_success();
            Ok(())
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let error = StoreError::UnexpectedStatus { status, body };
            tracing::error!(error = %error, "Store request failed");
            Err(error)
        }
    }
}

fn normalize_base_url(url: &str) -> Result<String, String> {
    let mut parsed = reqwest::Url::parse(url).map_err(|err| err.to_string())?;
    let path = parsed.path().trim_end_matches('/').to_string();
    parsed.set_path(&path);
    Ok(parsed.to_string())
}

fn format_endpoint(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{base}/{path}")
}
