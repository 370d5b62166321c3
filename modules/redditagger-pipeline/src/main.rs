use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use inference_client::InferenceClient;
use reddit_client::RedditClient;
use redditagger_common::{Config, EntityType};
use redditagger_pipeline::inference::{InferenceEntityExtractor, InferenceSentimentClassifier};
use redditagger_pipeline::{MemoryCache, Pipeline, PipelineSettings};

/// Tag one subreddit's newest posts and print the per-entity sentiment table.
#[derive(Parser, Debug)]
#[command(name = "redditagger")]
struct Args {
    /// Subreddit to read, without the `r/` prefix.
    #[arg(long, default_value = "investing")]
    source: String,

    /// ORG, LOC, GPE, EVENT or WORK_OF_ART.
    #[arg(long, default_value = "ORG")]
    entity_type: EntityType,

    /// Key the result is published under.
    #[arg(long, default_value = "cli")]
    session: String,

    /// OAuth bearer token for the listing API.
    #[arg(long, env = "REDDIT_TOKEN", hide_env_values = true)]
    token: String,

    /// Print the table as JSON instead of text.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("redditagger=info".parse()?))
        .init();

    let args = Args::parse();
    let config = Config::from_env();
    config.log_redacted();

    let reddit = RedditClient::new()
        .with_base_url(&config.reddit_base_url)
        .with_user_agent(&config.reddit_user_agent);
    let inference = InferenceClient::new(config.inference_api_token.clone())
        .with_base_url(&config.inference_base_url);

    let pipeline = Pipeline::new(
        Arc::new(reddit),
        Arc::new(InferenceEntityExtractor::new(inference.clone(), &config.ner_model)),
        Arc::new(InferenceSentimentClassifier::new(inference, &config.sentiment_model)),
        Arc::new(MemoryCache::new()),
        PipelineSettings::from(&config),
    );

    let cancelled = Arc::new(AtomicBool::new(false));
    let interrupt = cancelled.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, cancelling run");
            interrupt.store(true, Ordering::Relaxed);
        }
    });

    let table = pipeline
        .run_cancellable(
            &args.session,
            &args.source,
            args.entity_type,
            &args.token,
            &cancelled,
        )
        .await;

    if pipeline.cached(&args.session).await.is_none() {
        anyhow::bail!("No result published for r/{}", args.source);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&table)?);
    } else {
        print!("{table}");
    }
    Ok(())
}
