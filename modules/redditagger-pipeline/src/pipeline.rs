//! Pipeline — fetch, annotate, aggregate, publish.
//!
//! One `run` is one batch snapshot: it either publishes a complete table to
//! the result cache or publishes nothing. Annotation of independent
//! documents runs on a bounded pool; the aggregator folds results as they
//! arrive, so arrival order never affects the table.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use redditagger_common::{Config, EntityType, ResultTable};

use crate::aggregator::{Aggregator, DEFAULT_TOP_N};
use crate::annotator::Annotator;
use crate::cache::DEFAULT_TTL;
use crate::fetcher::{Fetcher, DEFAULT_MAX_TOTAL, PAGE_SIZE};
use crate::segmenter::Segmenter;
use crate::traits::{EntityExtractor, ListingSource, ResultCache, SentimentClassifier};

/// Fewer fetched documents than this and the run is abandoned.
pub const MIN_DOCUMENTS: usize = 2;

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub page_size: u32,
    pub max_total: usize,
    pub top_n: usize,
    pub cache_ttl: Duration,
    pub concurrency: usize,
    pub segmenter: Segmenter,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            page_size: PAGE_SIZE,
            max_total: DEFAULT_MAX_TOTAL,
            top_n: DEFAULT_TOP_N,
            cache_ttl: DEFAULT_TTL,
            concurrency: 8,
            segmenter: Segmenter::default(),
        }
    }
}

impl From<&Config> for PipelineSettings {
    fn from(config: &Config) -> Self {
        Self {
            max_total: config.max_total,
            top_n: config.top_n,
            cache_ttl: Duration::from_secs(config.cache_ttl_secs),
            concurrency: config.annotation_concurrency,
            ..Self::default()
        }
    }
}

pub struct Pipeline {
    fetcher: Fetcher,
    annotator: Annotator,
    cache: Arc<dyn ResultCache>,
    settings: PipelineSettings,
}

impl Pipeline {
    pub fn new(
        listing: Arc<dyn ListingSource>,
        extractor: Arc<dyn EntityExtractor>,
        classifier: Arc<dyn SentimentClassifier>,
        cache: Arc<dyn ResultCache>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            fetcher: Fetcher::new(listing).with_page_size(settings.page_size),
            annotator: Annotator::new(settings.segmenter, extractor, classifier),
            cache,
            settings,
        }
    }

    /// Fetch `source`, tag `entity_type`, and publish the ranked table under
    /// `session_key`. Returns the published table, or an empty one when the
    /// run failed and nothing was published.
    pub async fn run(
        &self,
        session_key: &str,
        source: &str,
        entity_type: EntityType,
        bearer_token: &str,
    ) -> ResultTable {
        let never = AtomicBool::new(false);
        self.run_cancellable(session_key, source, entity_type, bearer_token, &never)
            .await
    }

    /// Same as [`Pipeline::run`], stopped at the next page or annotation
    /// boundary once `cancelled` is set. The flag belongs to this run only;
    /// a cancelled run publishes nothing.
    pub async fn run_cancellable(
        &self,
        session_key: &str,
        source: &str,
        entity_type: EntityType,
        bearer_token: &str,
        cancelled: &AtomicBool,
    ) -> ResultTable {
        let run_id = Uuid::new_v4();
        let span = info_span!("pipeline_run", %run_id, source, entity_type = %entity_type);
        self.run_inner(session_key, source, entity_type, bearer_token, cancelled)
            .instrument(span)
            .await
    }

    async fn run_inner(
        &self,
        session_key: &str,
        source: &str,
        entity_type: EntityType,
        bearer_token: &str,
        cancelled: &AtomicBool,
    ) -> ResultTable {
        info!("Pipeline run starting");

        let documents = self
            .fetcher
            .fetch(source, bearer_token, self.settings.max_total, cancelled)
            .await;
        if documents.len() < MIN_DOCUMENTS {
            warn!(
                fetched = documents.len(),
                "Insufficient documents, nothing published"
            );
            return ResultTable::default();
        }

        let annotator = &self.annotator;
        let mut annotations = stream::iter(
            documents
                .iter()
                .map(|doc| annotator.annotate(doc, entity_type)),
        )
        .buffer_unordered(self.settings.concurrency.max(1));

        let mut aggregator = Aggregator::new(self.settings.top_n);
        let mut with_mentions = 0usize;
        while let Some(annotation) = annotations.next().await {
            if cancelled.load(Ordering::Relaxed) {
                info!(
                    annotated = aggregator.annotations(),
                    "Pipeline run cancelled, nothing published"
                );
                return ResultTable::default();
            }
            if annotation.has_mentions() {
                with_mentions += 1;
            }
            aggregator.add(&annotation);
        }

        let entities = aggregator.entity_count();
        let table = aggregator.finish();

        if let Err(e) = self
            .cache
            .set(session_key, table.clone(), self.settings.cache_ttl)
            .await
        {
            error!(session_key, error = %e, "Failed to publish result");
        } else {
            info!(
                documents = documents.len(),
                with_mentions,
                entities,
                rows = table.len(),
                "Pipeline run complete, result published"
            );
        }

        table
    }

    /// Read the published table for `session_key`, extending its lease.
    pub async fn cached(&self, session_key: &str) -> Option<ResultTable> {
        match self.cache.get(session_key).await {
            Ok(table) => table,
            Err(e) => {
                warn!(session_key, error = %e, "Result cache read failed");
                None
            }
        }
    }
}
