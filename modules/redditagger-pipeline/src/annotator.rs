//! Per-document annotation: entity mentions from every window, one
//! sentiment judgment over the whole body.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tracing::{debug, warn};

use redditagger_common::{Annotation, Document, EntityType, SentimentResult};

use crate::segmenter::Segmenter;
use crate::traits::{EntityExtractor, SentimentClassifier};

pub struct Annotator {
    segmenter: Segmenter,
    extractor: Arc<dyn EntityExtractor>,
    classifier: Arc<dyn SentimentClassifier>,
}

impl Annotator {
    pub fn new(
        segmenter: Segmenter,
        extractor: Arc<dyn EntityExtractor>,
        classifier: Arc<dyn SentimentClassifier>,
    ) -> Self {
        Self {
            segmenter,
            extractor,
            classifier,
        }
    }

    /// Never fails: extraction errors leave the document without mentions,
    /// classification errors fall back to a neutral sentiment.
    pub async fn annotate(&self, doc: &Document, entity_type: EntityType) -> Annotation {
        let names = self.extract(doc, entity_type).await;
        let mentions = names
            .into_iter()
            .map(|name| {
                let count = count_occurrences(&doc.body, &name);
                (name, count)
            })
            .collect::<BTreeMap<_, _>>();

        let sentiment = self.classify(doc).await;

        Annotation {
            document_id: doc.id.clone(),
            mentions,
            sentiment,
        }
    }

    async fn extract(&self, doc: &Document, entity_type: EntityType) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        if doc.body.trim().is_empty() {
            return names;
        }

        let windows = self.segmenter.segment(&doc.body);
        for (i, window) in windows.iter().enumerate() {
            match self.extractor.tag(window, entity_type).await {
                Ok(found) => {
                    names.extend(
                        found
                            .into_iter()
                            .map(|m| m.trim().to_string())
                            .filter(|m| !m.is_empty()),
                    );
                }
                Err(e) => {
                    warn!(
                        doc_id = doc.id.as_str(),
                        window = i,
                        windows = windows.len(),
                        error = %e,
                        "Entity extraction failed, document contributes no mentions"
                    );
                    return BTreeSet::new();
                }
            }
        }

        debug!(
            doc_id = doc.id.as_str(),
            windows = windows.len(),
            mentions = names.len(),
            "Entities extracted"
        );
        names
    }

    async fn classify(&self, doc: &Document) -> SentimentResult {
        if doc.body.trim().is_empty() {
            return SentimentResult::neutral();
        }

        match self.classifier.classify(&doc.body).await {
            Ok(Some(result)) if result.confidence.is_finite() => SentimentResult {
                label: result.label,
                confidence: result.confidence.clamp(0.0, 1.0),
            },
            Ok(_) => {
                debug!(doc_id = doc.id.as_str(), "No usable sentiment label, using neutral");
                SentimentResult::neutral()
            }
            Err(e) => {
                warn!(doc_id = doc.id.as_str(), error = %e, "Sentiment classification failed, using neutral");
                SentimentResult::neutral()
            }
        }
    }
}

/// Whole-word occurrences of `mention` in `body`, at least 1.
fn count_occurrences(body: &str, mention: &str) -> u32 {
    let hits = body
        .match_indices(mention)
        .filter(|(i, _)| {
            let before = body[..*i].chars().next_back();
            let after = body[*i + mention.len()..].chars().next();
            !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
        })
        .count();
    u32::try_from(hits).unwrap_or(u32::MAX).max(1)
}
