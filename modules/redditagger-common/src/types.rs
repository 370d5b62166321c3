use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TaggerError;

// --- Fetched documents ---

/// A single post pulled from a listing. Lives for one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub title: String,
    pub body: String,
    pub category: Option<String>,
    pub upvote_ratio: f64,
}

// --- Entity types ---

/// The closed set of named-entity categories a run can tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityType {
    #[serde(rename = "ORG")]
    Organization,
    #[serde(rename = "LOC")]
    Location,
    /// Countries, states, cities.
    #[serde(rename = "GPE")]
    Gpe,
    Event,
    WorkOfArt,
}

impl EntityType {
    pub const ALL: [EntityType; 5] = [
        EntityType::Organization,
        EntityType::Location,
        EntityType::Gpe,
        EntityType::Event,
        EntityType::WorkOfArt,
    ];

    /// Label code as emitted by NER models.
    pub fn code(&self) -> &'static str {
        match self {
            EntityType::Organization => "ORG",
            EntityType::Location => "LOC",
            EntityType::Gpe => "GPE",
            EntityType::Event => "EVENT",
            EntityType::WorkOfArt => "WORK_OF_ART",
        }
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for EntityType {
    type Err = TaggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "ORG" | "ORGANIZATION" | "ORGANISATION" => Ok(EntityType::Organization),
            "LOC" | "LOCATION" => Ok(EntityType::Location),
            "GPE" | "COUNTRY" | "STATE" | "COUNTRY_STATE" => Ok(EntityType::Gpe),
            "EVENT" => Ok(EntityType::Event),
            "WORK_OF_ART" | "ARTWORK" | "ART" => Ok(EntityType::WorkOfArt),
            _ => Err(TaggerError::Validation(format!("unknown entity type: {s}"))),
        }
    }
}

// --- Sentiment ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SentimentLabel {
    Positive,
    Negative,
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SentimentLabel::Positive => write!(f, "POSITIVE"),
            SentimentLabel::Negative => write!(f, "NEGATIVE"),
        }
    }
}

/// Document-level sentiment. `confidence` is in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    pub label: SentimentLabel,
    pub confidence: f64,
}

impl SentimentResult {
    pub fn positive(confidence: f64) -> Self {
        Self {
            label: SentimentLabel::Positive,
            confidence,
        }
    }

    pub fn negative(confidence: f64) -> Self {
        Self {
            label: SentimentLabel::Negative,
            confidence,
        }
    }

    /// Substituted when a classifier gives no usable label.
    pub fn neutral() -> Self {
        Self::positive(0.0)
    }
}

// --- Per-document annotation ---

/// Entities and sentiment extracted from one document.
///
/// `mentions` is keyed by distinct entity name; repeats within the document
/// collapse to one key. The value is how many times that name occurs in the
/// body (at least 1), which feeds the entity's frequency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub document_id: String,
    pub mentions: BTreeMap<String, u32>,
    pub sentiment: SentimentResult,
}

impl Annotation {
    /// Distinct entity names, in sorted order.
    pub fn entities(&self) -> impl Iterator<Item = &str> {
        self.mentions.keys().map(String::as_str)
    }

    pub fn has_mentions(&self) -> bool {
        !self.mentions.is_empty()
    }
}

// --- Aggregated output ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateRecord {
    pub entity: String,
    pub positive_mean: f64,
    pub negative_mean: f64,
    /// `positive_mean - negative_mean`.
    pub score: f64,
    pub frequency: u32,
}

/// Ranked per-entity summary, most frequent first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultTable {
    records: Vec<AggregateRecord>,
}

impl ResultTable {
    /// Wrap records that are already ranked and truncated.
    pub fn new(records: Vec<AggregateRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[AggregateRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<AggregateRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, entity: &str) -> Option<&AggregateRecord> {
        self.records.iter().find(|r| r.entity == entity)
    }

    /// Keep records whose score lies in `[lo, hi]`, preserving rank order.
    pub fn filter_by_score(&self, lo: f64, hi: f64) -> ResultTable {
        ResultTable {
            records: self
                .records
                .iter()
                .filter(|r| r.score >= lo && r.score <= hi)
                .cloned()
                .collect(),
        }
    }
}

impl std::fmt::Display for ResultTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "{:<32} {:>9} {:>9} {:>8} {:>6}",
            "ENTITY", "POSITIVE", "NEGATIVE", "SCORE", "FREQS"
        )?;
        for r in &self.records {
            writeln!(
                f,
                "{:<32} {:>9.3} {:>9.3} {:>8.3} {:>6}",
                r.entity, r.positive_mean, r.negative_mean, r.score, r.frequency
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(entity: &str, score: f64, frequency: u32) -> AggregateRecord {
        AggregateRecord {
            entity: entity.to_string(),
            positive_mean: score.max(0.0),
            negative_mean: (-score).max(0.0),
            score,
            frequency,
        }
    }

    #[test]
    fn entity_type_parses_codes_and_names() {
        assert_eq!("ORG".parse::<EntityType>().unwrap(), EntityType::Organization);
        assert_eq!("organization".parse::<EntityType>().unwrap(), EntityType::Organization);
        assert_eq!("work of art".parse::<EntityType>().unwrap(), EntityType::WorkOfArt);
        assert_eq!(" gpe ".parse::<EntityType>().unwrap(), EntityType::Gpe);
        assert!("PERSON".parse::<EntityType>().is_err());
    }

    #[test]
    fn entity_type_display_roundtrips_through_parse() {
        for t in EntityType::ALL {
            assert_eq!(t.to_string().parse::<EntityType>().unwrap(), t);
        }
    }

    #[test]
    fn entity_type_serializes_as_code() {
        assert_eq!(serde_json::to_string(&EntityType::WorkOfArt).unwrap(), "\"WORK_OF_ART\"");
        assert_eq!(serde_json::to_string(&EntityType::Organization).unwrap(), "\"ORG\"");
    }

    #[test]
    fn neutral_sentiment_is_zero_positive() {
        let s = SentimentResult::neutral();
        assert_eq!(s.label, SentimentLabel::Positive);
        assert_eq!(s.confidence, 0.0);
    }

    #[test]
    fn filter_by_score_is_inclusive_and_keeps_order() {
        let table = ResultTable::new(vec![
            record("A", 0.9, 10),
            record("B", -0.4, 8),
            record("C", 0.5, 3),
            record("D", 0.1, 1),
        ]);

        let filtered = table.filter_by_score(0.1, 0.9);
        let names: Vec<&str> = filtered.records().iter().map(|r| r.entity.as_str()).collect();
        assert_eq!(names, vec!["A", "C", "D"]);
        assert_eq!(table.len(), 4);
    }

    #[test]
    fn display_lists_one_row_per_record() {
        let table = ResultTable::new(vec![record("NASA", 0.4, 2)]);
        let text = table.to_string();
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("NASA"));
    }
}
