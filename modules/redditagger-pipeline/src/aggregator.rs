//! Streaming reduction of annotations into a ranked per-entity table.
//!
//! Means divide by the entity's total frequency, not by the number of
//! values on that side, so an entity with few positive documents among
//! many mentions gets a correspondingly diluted positive mean.

use std::collections::HashMap;

use redditagger_common::{AggregateRecord, Annotation, ResultTable, SentimentLabel};

pub const DEFAULT_TOP_N: usize = 12;

#[derive(Debug, Default)]
struct Accumulator {
    positives: Vec<f64>,
    negatives: Vec<f64>,
    frequency: u32,
}

impl Accumulator {
    fn into_record(self, entity: String) -> AggregateRecord {
        let frequency = f64::from(self.frequency);
        let positive_mean = mean_over(self.positives, frequency);
        let negative_mean = mean_over(self.negatives, frequency);
        AggregateRecord {
            entity,
            positive_mean,
            negative_mean,
            score: positive_mean - negative_mean,
            frequency: self.frequency,
        }
    }
}

/// Sum in sorted order so the result does not depend on arrival order.
fn mean_over(mut values: Vec<f64>, frequency: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(f64::total_cmp);
    values.iter().sum::<f64>() / frequency
}

#[derive(Debug)]
pub struct Aggregator {
    top_n: usize,
    entities: HashMap<String, Accumulator>,
    annotations: usize,
}

impl Aggregator {
    pub fn new(top_n: usize) -> Self {
        Self {
            top_n,
            entities: HashMap::new(),
            annotations: 0,
        }
    }

    pub fn add(&mut self, annotation: &Annotation) {
        self.annotations += 1;
        let confidence = annotation.sentiment.confidence;
        for (entity, &occurrences) in &annotation.mentions {
            let acc = self.entities.entry(entity.clone()).or_default();
            acc.frequency = acc.frequency.saturating_add(occurrences.max(1));
            match annotation.sentiment.label {
                SentimentLabel::Positive => acc.positives.push(confidence),
                SentimentLabel::Negative => acc.negatives.push(confidence),
            }
        }
    }

    /// Number of annotations folded in so far.
    pub fn annotations(&self) -> usize {
        self.annotations
    }

    /// Number of distinct entities seen so far.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Rank by frequency (descending), ties by entity name, and keep the top N.
    pub fn finish(self) -> ResultTable {
        let mut records: Vec<AggregateRecord> = self
            .entities
            .into_iter()
            .map(|(entity, acc)| acc.into_record(entity))
            .collect();

        records.sort_by(|a, b| {
            b.frequency
                .cmp(&a.frequency)
                .then_with(|| a.entity.cmp(&b.entity))
        });
        records.truncate(self.top_n);

        ResultTable::new(records)
    }
}

/// Reduce a complete batch of annotations in one call.
pub fn aggregate<'a>(
    annotations: impl IntoIterator<Item = &'a Annotation>,
    top_n: usize,
) -> ResultTable {
    let mut aggregator = Aggregator::new(top_n);
    for annotation in annotations {
        aggregator.add(annotation);
    }
    aggregator.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use redditagger_common::SentimentResult;
    use std::collections::BTreeMap;

    fn annotation(mentions: &[(&str, u32)], sentiment: SentimentResult) -> Annotation {
        Annotation {
            document_id: format!("t3_{}", mentions.len()),
            mentions: mentions
                .iter()
                .map(|(m, n)| (m.to_string(), *n))
                .collect::<BTreeMap<_, _>>(),
            sentiment,
        }
    }

    fn once(names: &[&str], sentiment: SentimentResult) -> Annotation {
        let pairs: Vec<(&str, u32)> = names.iter().map(|n| (*n, 1)).collect();
        annotation(&pairs, sentiment)
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!((actual - expected).abs() < 1e-12, "{actual} != {expected}");
    }

    #[test]
    fn repeated_mention_in_one_document() {
        let table = aggregate(
            &[annotation(&[("NASA", 2)], SentimentResult::positive(0.8))],
            DEFAULT_TOP_N,
        );

        let nasa = table.get("NASA").unwrap();
        assert_eq!(nasa.frequency, 2);
        assert_close(nasa.positive_mean, 0.4);
        assert_close(nasa.negative_mean, 0.0);
        assert_close(nasa.score, 0.4);
    }

    #[test]
    fn means_divide_by_total_frequency() {
        let mut input = vec![
            once(&["Fed"], SentimentResult::positive(0.9)),
            once(&["Fed"], SentimentResult::positive(0.7)),
            once(&["Fed"], SentimentResult::negative(0.6)),
            once(&["Fed"], SentimentResult::negative(0.2)),
        ];
        input.extend((0..6).map(|_| once(&["Fed"], SentimentResult::negative(0.5))));

        let table = aggregate(&input, DEFAULT_TOP_N);
        let fed = table.get("Fed").unwrap();

        assert_eq!(fed.frequency, 10);
        assert_close(fed.positive_mean, (0.9 + 0.7) / 10.0);
        assert_close(fed.negative_mean, (0.6 + 0.2 + 3.0) / 10.0);
        assert_close(fed.score, fed.positive_mean - fed.negative_mean);
    }

    #[test]
    fn negative_only_entity_has_zero_positive_mean() {
        let table = aggregate(
            &[once(&["Enron"], SentimentResult::negative(0.95))],
            DEFAULT_TOP_N,
        );
        let enron = table.get("Enron").unwrap();
        assert_eq!(enron.positive_mean, 0.0);
        assert_close(enron.score, -0.95);
    }

    #[test]
    fn neutral_default_counts_toward_frequency_only() {
        let table = aggregate(
            &[
                once(&["SEC"], SentimentResult::neutral()),
                once(&["SEC"], SentimentResult::positive(0.6)),
            ],
            DEFAULT_TOP_N,
        );
        let sec = table.get("SEC").unwrap();
        assert_eq!(sec.frequency, 2);
        assert_close(sec.positive_mean, 0.3);
    }

    #[test]
    fn no_mentions_yields_empty_table() {
        let input = vec![
            once(&[], SentimentResult::positive(0.9)),
            once(&[], SentimentResult::negative(0.4)),
        ];
        assert!(aggregate(&input, DEFAULT_TOP_N).is_empty());
        assert!(aggregate(std::iter::empty(), DEFAULT_TOP_N).is_empty());
    }

    #[test]
    fn table_is_ranked_and_truncated() {
        let mut input = Vec::new();
        for i in 0..20u32 {
            let name = format!("E{i:02}");
            input.push(annotation(&[(name.as_str(), i + 1)], SentimentResult::positive(0.5)));
        }

        let table = aggregate(&input, DEFAULT_TOP_N);

        assert_eq!(table.len(), DEFAULT_TOP_N);
        assert_eq!(table.records()[0].entity, "E19");
        assert!(table
            .records()
            .windows(2)
            .all(|w| w[0].frequency >= w[1].frequency));
        assert!(table.records().iter().all(|r| r.frequency >= 1));
    }

    #[test]
    fn equal_frequencies_break_ties_by_name() {
        let table = aggregate(
            &[
                once(&["Zeta"], SentimentResult::positive(0.1)),
                once(&["Alpha"], SentimentResult::positive(0.1)),
                once(&["Mid"], SentimentResult::positive(0.1)),
            ],
            DEFAULT_TOP_N,
        );
        let names: Vec<&str> = table.records().iter().map(|r| r.entity.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Mid", "Zeta"]);
    }

    #[test]
    fn permuting_input_gives_identical_table() {
        let input = vec![
            once(&["Apple", "Google"], SentimentResult::positive(0.1)),
            once(&["Apple"], SentimentResult::negative(0.3)),
            annotation(&[("Google", 3), ("Tesla", 1)], SentimentResult::positive(0.7)),
            once(&["Tesla", "Apple"], SentimentResult::negative(0.2)),
            once(&["Google"], SentimentResult::positive(0.3)),
            once(&["Apple"], SentimentResult::positive(0.6)),
        ];
        let baseline = aggregate(&input, DEFAULT_TOP_N);

        let mut reversed = input.clone();
        reversed.reverse();
        assert_eq!(aggregate(&reversed, DEFAULT_TOP_N), baseline);

        let mut rotated = input.clone();
        rotated.rotate_left(2);
        assert_eq!(aggregate(&rotated, DEFAULT_TOP_N), baseline);

        let mut swapped = input;
        swapped.swap(0, 5);
        swapped.swap(1, 3);
        assert_eq!(aggregate(&swapped, DEFAULT_TOP_N), baseline);
    }

    #[test]
    fn streaming_add_matches_batch() {
        let input = vec![
            once(&["A", "B"], SentimentResult::positive(0.5)),
            once(&["B"], SentimentResult::negative(0.5)),
        ];
        let mut agg = Aggregator::new(DEFAULT_TOP_N);
        for a in &input {
            agg.add(a);
        }
        assert_eq!(agg.annotations(), 2);
        assert_eq!(agg.entity_count(), 2);
        assert_eq!(agg.finish(), aggregate(&input, DEFAULT_TOP_N));
    }
}
