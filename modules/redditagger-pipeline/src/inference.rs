// Hosted-model implementations of the NLP capability traits.

use std::collections::BTreeSet;

use anyhow::{Context, Result};
use async_trait::async_trait;

use inference_client::{EntitySpan, InferenceClient, LabelScore};
use redditagger_common::{EntityType, SentimentLabel, SentimentResult};

use crate::traits::{EntityExtractor, SentimentClassifier};

/// Token-classification model as an `EntityExtractor`.
pub struct InferenceEntityExtractor {
    client: InferenceClient,
    model: String,
}

impl InferenceEntityExtractor {
    pub fn new(client: InferenceClient, model: &str) -> Self {
        Self {
            client,
            model: model.to_string(),
        }
    }
}

#[async_trait]
impl EntityExtractor for InferenceEntityExtractor {
    async fn tag(&self, text: &str, entity_type: EntityType) -> Result<BTreeSet<String>> {
        let spans = self
            .client
            .token_classification(&self.model, text)
            .await
            .with_context(|| format!("token classification with {}", self.model))?;
        Ok(mentions_from_spans(&spans, entity_type))
    }
}

/// Text-classification model as a `SentimentClassifier`.
pub struct InferenceSentimentClassifier {
    client: InferenceClient,
    model: String,
}

impl InferenceSentimentClassifier {
    pub fn new(client: InferenceClient, model: &str) -> Self {
        Self {
            client,
            model: model.to_string(),
        }
    }
}

#[async_trait]
impl SentimentClassifier for InferenceSentimentClassifier {
    async fn classify(&self, text: &str) -> Result<Option<SentimentResult>> {
        let labels = self
            .client
            .text_classification(&self.model, text)
            .await
            .with_context(|| format!("text classification with {}", self.model))?;
        Ok(sentiment_from_labels(&labels))
    }
}

/// Group code without the IOB prefix: `B-ORG` -> `ORG`.
fn group_code(group: &str) -> &str {
    group
        .strip_prefix("B-")
        .or_else(|| group.strip_prefix("I-"))
        .unwrap_or(group)
}

fn mentions_from_spans(spans: &[EntitySpan], entity_type: EntityType) -> BTreeSet<String> {
    spans
        .iter()
        .filter(|s| group_code(&s.entity_group).eq_ignore_ascii_case(entity_type.code()))
        .map(|s| s.word.trim())
        // "##" marks an unmerged word-piece; it is not a usable name on its own.
        .filter(|w| !w.is_empty() && !w.starts_with("##"))
        .map(str::to_string)
        .collect()
}

/// Highest-scoring label, if it is one the pipeline understands.
fn sentiment_from_labels(labels: &[LabelScore]) -> Option<SentimentResult> {
    let top = labels.iter().max_by(|a, b| a.score.total_cmp(&b.score))?;
    let label = if top.label.eq_ignore_ascii_case("POSITIVE") {
        SentimentLabel::Positive
    } else if top.label.eq_ignore_ascii_case("NEGATIVE") {
        SentimentLabel::Negative
    } else {
        return None;
    };
    Some(SentimentResult {
        label,
        confidence: top.score,
    })
}
