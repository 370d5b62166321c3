use std::env;
use std::str::FromStr;

use tracing::info;

/// Tagger trained on OntoNotes 5, whose labels include every `EntityType`
/// code. CoNLL-03 taggers only emit PER/ORG/LOC/MISC.
pub const DEFAULT_NER_MODEL: &str = "djagatiya/ner-roberta-base-ontonotesv5-englishv4";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Listing API
    pub reddit_base_url: String,
    pub reddit_user_agent: String,

    // Inference API
    pub inference_api_token: String,
    pub inference_base_url: String,
    pub ner_model: String,
    pub sentiment_model: String,

    // Pipeline
    pub max_total: usize,
    pub top_n: usize,
    pub cache_ttl_secs: u64,
    pub annotation_concurrency: usize,
}

impl Config {
    /// Load configuration from environment variables.
    /// Panics with a clear message if required vars are missing or malformed.
    pub fn from_env() -> Self {
        Self {
            reddit_base_url: env::var("REDDIT_BASE_URL")
                .unwrap_or_else(|_| "https://oauth.reddit.com".to_string()),
            reddit_user_agent: env::var("REDDIT_USER_AGENT")
                .unwrap_or_else(|_| "EntityTagger/0.1".to_string()),
            inference_api_token: required_env("INFERENCE_API_TOKEN"),
            inference_base_url: env::var("INFERENCE_BASE_URL")
                .unwrap_or_else(|_| "https://api-inference.huggingface.co".to_string()),
            ner_model: env::var("NER_MODEL").unwrap_or_else(|_| DEFAULT_NER_MODEL.to_string()),
            sentiment_model: env::var("SENTIMENT_MODEL").unwrap_or_else(|_| {
                "distilbert/distilbert-base-uncased-finetuned-sst-2-english".to_string()
            }),
            max_total: parsed_env("MAX_TOTAL", 1000),
            top_n: parsed_env("TOP_N", 12),
            cache_ttl_secs: parsed_env("CACHE_TTL_SECS", 3000),
            annotation_concurrency: parsed_env("ANNOTATION_CONCURRENCY", 8),
        }
    }

    /// Log the effective configuration with secrets masked.
    pub fn log_redacted(&self) {
        info!(
            reddit_base_url = self.reddit_base_url.as_str(),
            reddit_user_agent = self.reddit_user_agent.as_str(),
            inference_base_url = self.inference_base_url.as_str(),
            inference_api_token = redact(&self.inference_api_token).as_str(),
            ner_model = self.ner_model.as_str(),
            sentiment_model = self.sentiment_model.as_str(),
            max_total = self.max_total,
            top_n = self.top_n,
            cache_ttl_secs = self.cache_ttl_secs,
            annotation_concurrency = self.annotation_concurrency,
            "Configuration loaded"
        );
    }
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}

fn parsed_env<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|_| panic!("{key} must be a number, got {raw:?}")),
        Err(_) => default,
    }
}

fn redact(secret: &str) -> String {
    if secret.len() <= 4 {
        return "****".to_string();
    }
    let tail: String = secret.chars().rev().take(4).collect::<Vec<_>>().into_iter().rev().collect();
    format!("****{tail}")
}
