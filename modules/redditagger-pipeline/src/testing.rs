// Test mocks for the tagging pipeline.
//
// One mock per trait boundary:
// - MockListing (ListingSource) — scripted pages, records cursors
// - MockExtractor (EntityExtractor) — substring lookup of registered names
// - MockClassifier (SentimentClassifier) — substring-keyed sentiment rules
//
// Plus helpers for building documents.

use std::collections::{BTreeSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;

use redditagger_common::{Document, EntityType, SentimentResult};

use crate::traits::{EntityExtractor, ListingBatch, ListingSource, SentimentClassifier};

// ---------------------------------------------------------------------------
// Document helpers
// ---------------------------------------------------------------------------

pub fn doc(id: &str, body: &str) -> Document {
    Document {
        id: id.to_string(),
        title: format!("Post {id}"),
        body: body.to_string(),
        category: None,
        upvote_ratio: 1.0,
    }
}

/// `n` documents with ids `t3_{prefix}{i}`.
pub fn numbered_docs(prefix: &str, n: usize) -> Vec<Document> {
    (0..n)
        .map(|i| doc(&format!("t3_{prefix}{i}"), &format!("post number {i}")))
        .collect()
}

// ---------------------------------------------------------------------------
// MockListing
// ---------------------------------------------------------------------------

/// Serves scripted pages in order, one per call. Errors once the script runs out.
/// Builder pattern: `.page()`, `.fail()`.
pub struct MockListing {
    script: Mutex<VecDeque<std::result::Result<ListingBatch, String>>>,
    cursors: Mutex<Vec<Option<String>>>,
    limits: Mutex<Vec<u32>>,
    calls: AtomicUsize,
}

impl MockListing {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            cursors: Mutex::new(Vec::new()),
            limits: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn page(self, documents: Vec<Document>, after: Option<&str>) -> Self {
        self.script.lock().unwrap().push_back(Ok(ListingBatch {
            documents,
            after: after.map(str::to_string),
        }));
        self
    }

    pub fn fail(self, message: &str) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The `after` cursor sent with each call, in order.
    pub fn cursors(&self) -> Vec<Option<String>> {
        self.cursors.lock().unwrap().clone()
    }

    pub fn limits(&self) -> Vec<u32> {
        self.limits.lock().unwrap().clone()
    }
}

impl Default for MockListing {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ListingSource for MockListing {
    async fn page(
        &self,
        _source: &str,
        _bearer_token: &str,
        after: Option<&str>,
        limit: u32,
    ) -> Result<ListingBatch> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.cursors.lock().unwrap().push(after.map(str::to_string));
        self.limits.lock().unwrap().push(limit);

        match self.script.lock().unwrap().pop_front() {
            Some(Ok(batch)) => Ok(batch),
            Some(Err(message)) => bail!("MockListing: {message}"),
            None => bail!("MockListing: no more pages scripted"),
        }
    }
}

// ---------------------------------------------------------------------------
// MockExtractor
// ---------------------------------------------------------------------------

/// Returns every registered name of the requested type that occurs in the text.
/// Texts containing a `.fail_on()` marker return `Err`. With `.trip_on_call()`
/// the given flag is set on the first `tag` call.
pub struct MockExtractor {
    entities: Vec<(EntityType, String)>,
    fail_markers: Vec<String>,
    trip: Option<Arc<AtomicBool>>,
    texts: Mutex<Vec<String>>,
}

impl MockExtractor {
    pub fn new() -> Self {
        Self {
            entities: Vec::new(),
            fail_markers: Vec::new(),
            trip: None,
            texts: Mutex::new(Vec::new()),
        }
    }

    pub fn entity(mut self, entity_type: EntityType, name: &str) -> Self {
        self.entities.push((entity_type, name.to_string()));
        self
    }

    pub fn fail_on(mut self, marker: &str) -> Self {
        self.fail_markers.push(marker.to_string());
        self
    }

    pub fn trip_on_call(mut self, flag: Arc<AtomicBool>) -> Self {
        self.trip = Some(flag);
        self
    }

    /// Every text passed to `tag`, in call order.
    pub fn texts(&self) -> Vec<String> {
        self.texts.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.texts.lock().unwrap().len()
    }
}

impl Default for MockExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EntityExtractor for MockExtractor {
    async fn tag(&self, text: &str, entity_type: EntityType) -> Result<BTreeSet<String>> {
        self.texts.lock().unwrap().push(text.to_string());
        if let Some(flag) = &self.trip {
            flag.store(true, Ordering::Relaxed);
        }

        if let Some(marker) = self.fail_markers.iter().find(|m| text.contains(m.as_str())) {
            return Err(anyhow!("MockExtractor: refused text containing {marker:?}"));
        }

        Ok(self
            .entities
            .iter()
            .filter(|(t, name)| *t == entity_type && text.contains(name.as_str()))
            .map(|(_, name)| name.clone())
            .collect())
    }
}

// ---------------------------------------------------------------------------
// MockClassifier
// ---------------------------------------------------------------------------

enum Verdict {
    Label(Option<SentimentResult>),
    Fail,
}

/// First rule whose marker occurs in the text wins; otherwise the fallback.
/// Builder pattern: `.on()`, `.no_label_on()`, `.fail_on()`.
pub struct MockClassifier {
    rules: Vec<(String, Verdict)>,
    fallback: Option<SentimentResult>,
    calls: AtomicUsize,
}

impl MockClassifier {
    pub fn new(fallback: SentimentResult) -> Self {
        Self {
            rules: Vec::new(),
            fallback: Some(fallback),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn on(mut self, marker: &str, result: SentimentResult) -> Self {
        self.rules
            .push((marker.to_string(), Verdict::Label(Some(result))));
        self
    }

    pub fn no_label_on(mut self, marker: &str) -> Self {
        self.rules.push((marker.to_string(), Verdict::Label(None)));
        self
    }

    pub fn fail_on(mut self, marker: &str) -> Self {
        self.rules.push((marker.to_string(), Verdict::Fail));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SentimentClassifier for MockClassifier {
    async fn classify(&self, text: &str) -> Result<Option<SentimentResult>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.rules.iter().find(|(m, _)| text.contains(m.as_str())) {
            Some((_, Verdict::Label(result))) => Ok(*result),
            Some((marker, Verdict::Fail)) => {
                Err(anyhow!("MockClassifier: refused text containing {marker:?}"))
            }
            None => Ok(self.fallback),
        }
    }
}
