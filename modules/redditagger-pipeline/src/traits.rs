// Capability seams for the pipeline.
//
// ListingSource — one page of a remote listing (RedditClient in production).
// EntityExtractor / SentimentClassifier — external NLP models.
// ResultCache — keyed TTL store the finished table is published to.
//
// Each has an in-memory mock in `testing` so the whole pipeline runs in
// tests without network access.

use std::collections::BTreeSet;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use redditagger_common::{Document, EntityType, ResultTable, SentimentResult};

/// One page of documents plus the cursor for the next page.
#[derive(Debug, Clone, Default)]
pub struct ListingBatch {
    pub documents: Vec<Document>,
    /// `None` at the end of the listing.
    pub after: Option<String>,
}

#[async_trait]
pub trait ListingSource: Send + Sync {
    /// Fetch a single page of `source`, continuing from `after` when given.
    async fn page(
        &self,
        source: &str,
        bearer_token: &str,
        after: Option<&str>,
        limit: u32,
    ) -> Result<ListingBatch>;
}

#[async_trait]
pub trait EntityExtractor: Send + Sync {
    /// Return the distinct mentions of `entity_type` found in `text`.
    async fn tag(&self, text: &str, entity_type: EntityType) -> Result<BTreeSet<String>>;
}

#[async_trait]
pub trait SentimentClassifier: Send + Sync {
    /// Classify `text`. `Ok(None)` means the model produced no usable label.
    async fn classify(&self, text: &str) -> Result<Option<SentimentResult>>;
}

#[async_trait]
pub trait ResultCache: Send + Sync {
    /// Store `table` under `key`, replacing any previous entry.
    async fn set(&self, key: &str, table: ResultTable, ttl: Duration) -> Result<()>;

    /// Read `key`. A hit rewrites the entry with a fresh TTL.
    async fn get(&self, key: &str) -> Result<Option<ResultTable>>;
}
