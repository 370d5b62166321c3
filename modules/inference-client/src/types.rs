use serde::{Deserialize, Serialize};

/// Request body shared by every inference task.
#[derive(Debug, Clone, Serialize)]
pub struct InferenceRequest<'a, P: Serialize> {
    pub inputs: &'a str,
    pub parameters: P,
    pub options: InferenceOptions,
}

#[derive(Debug, Clone, Serialize)]
pub struct InferenceOptions {
    /// Block on a cold model instead of failing with 503.
    pub wait_for_model: bool,
}

impl Default for InferenceOptions {
    fn default() -> Self {
        Self {
            wait_for_model: true,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenClassificationParams {
    /// "simple" merges B-/I- tokens into whole-word spans.
    pub aggregation_strategy: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct TextClassificationParams {
    /// Cut inputs that exceed the model's context instead of rejecting them.
    pub truncation: bool,
}

/// A tagged span from a token-classification model.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EntitySpan {
    /// Aggregated group (`ORG`). Unaggregated models send `entity` (`B-ORG`) instead.
    #[serde(alias = "entity")]
    pub entity_group: String,
    pub score: f64,
    pub word: String,
    pub start: Option<usize>,
    pub end: Option<usize>,
}

/// One candidate label from a text-classification model.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LabelScore {
    pub label: String,
    pub score: f64,
}

/// Text classification comes back either flat or nested one level per input.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum ClassificationResponse {
    Nested(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
}

impl ClassificationResponse {
    pub(crate) fn into_labels(self) -> Vec<LabelScore> {
        match self {
            ClassificationResponse::Nested(mut batches) => {
                if batches.is_empty() {
                    Vec::new()
                } else {
                    batches.swap_remove(0)
                }
            }
            ClassificationResponse::Flat(labels) => labels,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_accepts_nested_shape() {
        let json = r#"[[{"label": "POSITIVE", "score": 0.98}, {"label": "NEGATIVE", "score": 0.02}]]"#;
        let labels = serde_json::from_str::<ClassificationResponse>(json)
            .unwrap()
            .into_labels();
        assert_eq!(labels.len(), 2);
        assert_eq!(labels[0].label, "POSITIVE");
    }

    #[test]
    fn classification_accepts_flat_shape() {
        let json = r#"[{"label": "NEGATIVE", "score": 0.7}]"#;
        let labels = serde_json::from_str::<ClassificationResponse>(json)
            .unwrap()
            .into_labels();
        assert_eq!(labels, vec![LabelScore { label: "NEGATIVE".into(), score: 0.7 }]);
    }

    #[test]
    fn empty_nested_response_has_no_labels() {
        let labels = serde_json::from_str::<ClassificationResponse>("[[]]")
            .unwrap()
            .into_labels();
        assert!(labels.is_empty());
    }

    #[test]
    fn span_reads_unaggregated_entity_field() {
        let json = r#"[{"entity": "B-ORG", "score": 0.9, "word": "NASA", "start": 0, "end": 4}]"#;
        let spans: Vec<EntitySpan> = serde_json::from_str(json).unwrap();
        assert_eq!(spans[0].entity_group, "B-ORG");
        assert_eq!(spans[0].end, Some(4));
    }
}
