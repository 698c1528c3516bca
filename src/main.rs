use std::sync::Arc;

mod ai;
mod config;
mod db;
mod error;
mod models;
mod pipeline;
mod reddit;

use ai::GeminiClient;
use config::Config;
use db::Repository;
use error::{AppError, Result};
use pipeline::Pipeline;
use reddit::RedditClient;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--config-path") {
        println!("{}", Config::config_path().display());
        return Ok(());
    }

    let mut config = Config::load()?;

    if let Some(subreddit) = flag_value(&args, "--subreddit") {
        config.subreddit = subreddit.to_string();
    }
    if let Some(limit) = flag_value(&args, "--limit") {
        config.post_limit = limit
            .parse()
            .map_err(|_| AppError::Config(format!("Invalid --limit value: {}", limit)))?;
    }

    let repository = Repository::new(&config.db_path).await?;

    let (client_id, client_secret) = config.reddit_credentials()?;
    let reddit = RedditClient::new(client_id, client_secret, &config.reddit_user_agent)?;
    let gemini = GeminiClient::new(config.gemini_key()?, config.gemini_model.clone())?;
    tracing::info!("Using model {}", gemini.model_version());

    let posts = reddit
        .fetch_hot_posts(&config.subreddit, config.post_limit, config.comment_limit)
        .await?;

    let pipeline = Pipeline::new(repository, Arc::new(gemini), config.retry_policy());
    let reports = pipeline.process_posts(&posts).await?;

    let failed = reports.iter().filter(|r| r.is_failure()).count();
    let total = pipeline.repository().count_summaries().await?;
    tracing::info!(
        "Processed {} posts ({} failed); {} now holds {} summaries",
        reports.len(),
        failed,
        config.db_path,
        total
    );

    println!("{}", serde_json::to_string_pretty(&reports)?);

    Ok(())
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}
