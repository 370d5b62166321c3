//! Bounded, cursor-paginated retrieval of a listing.
//!
//! Fail-fast: any page error aborts the whole fetch and yields no documents,
//! never a partial set.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, info, warn};

use reddit_client::{RedditClient, RedditPost};
use redditagger_common::Document;

use crate::traits::{ListingBatch, ListingSource};

pub const PAGE_SIZE: u32 = 100;
pub const DEFAULT_MAX_TOTAL: usize = 1000;

#[async_trait]
impl ListingSource for RedditClient {
    async fn page(
        &self,
        source: &str,
        bearer_token: &str,
        after: Option<&str>,
        limit: u32,
    ) -> Result<ListingBatch> {
        let page = self
            .new_posts_page(source, bearer_token, after, limit)
            .await?;
        Ok(ListingBatch {
            documents: page.posts.into_iter().map(document_from_post).collect(),
            after: page.after,
        })
    }
}

fn document_from_post(post: RedditPost) -> Document {
    Document {
        id: post.name,
        title: post.title,
        body: post.selftext,
        category: post.category,
        upvote_ratio: post.upvote_ratio,
    }
}

pub struct Fetcher {
    listing: Arc<dyn ListingSource>,
    page_size: u32,
}

impl Fetcher {
    pub fn new(listing: Arc<dyn ListingSource>) -> Self {
        Self {
            listing,
            page_size: PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Page through `source` until the listing ends or at least `max_total`
    /// documents are held. Reaching `max_total` exactly stops paging too
    /// (`>=`, not `>`), so no request is made for a page that would only
    /// overshoot. The last page is kept whole, so the result can exceed
    /// `max_total` by up to one page.
    ///
    /// Returns an empty vec on any transport failure or on cancellation.
    pub async fn fetch(
        &self,
        source: &str,
        bearer_token: &str,
        max_total: usize,
        cancelled: &AtomicBool,
    ) -> Vec<Document> {
        match self.try_fetch(source, bearer_token, max_total, cancelled).await {
            Ok(documents) => documents,
            Err(e) => {
                warn!(source, error = %e, "Fetch aborted, discarding partial results");
                Vec::new()
            }
        }
    }

    async fn try_fetch(
        &self,
        source: &str,
        bearer_token: &str,
        max_total: usize,
        cancelled: &AtomicBool,
    ) -> Result<Vec<Document>> {
        let mut documents: Vec<Document> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut after: Option<String> = None;
        let mut pages = 0u32;

        loop {
            if cancelled.load(Ordering::Relaxed) {
                anyhow::bail!("fetch cancelled after {pages} pages");
            }

            let batch = self
                .listing
                .page(source, bearer_token, after.as_deref(), self.page_size)
                .await
                .with_context(|| format!("page {} of r/{source}", pages + 1))?;
            pages += 1;

            if batch.documents.is_empty() {
                debug!(source, pages, "Empty page, ending listing");
                break;
            }

            for doc in batch.documents {
                if seen.insert(doc.id.clone()) {
                    documents.push(doc);
                } else {
                    debug!(source, id = doc.id.as_str(), "Duplicate document across pages, skipping");
                }
            }
            debug!(source, pages, total = documents.len(), "Page accumulated");

            if documents.len() >= max_total {
                break;
            }
            match batch.after {
                Some(cursor) => after = Some(cursor),
                None => break,
            }
        }

        info!(source, pages, documents = documents.len(), "Fetch complete");
        Ok(documents)
    }
}
