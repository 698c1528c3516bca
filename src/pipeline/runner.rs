use std::sync::Arc;

use crate::ai::PostAnalyzer;
use crate::db::Repository;
use crate::error::Result;
use crate::models::{Analysis, Post, PostReport};

use super::RetryPolicy;

/// Everything a run needs, built once at startup and passed in explicitly.
pub struct Pipeline {
    repository: Repository,
    analyzer: Arc<dyn PostAnalyzer>,
    policy: RetryPolicy,
}

impl Pipeline {
    pub fn new(repository: Repository, analyzer: Arc<dyn PostAnalyzer>, policy: RetryPolicy) -> Self {
        Self {
            repository,
            analyzer,
            policy,
        }
    }

    pub fn repository(&self) -> &Repository {
        &self.repository
    }

    /// Summarizes and extracts gear from each post in order, persisting the
    /// successes. Remote failures are retried and then reported inline as an
    /// `[ERROR]` entry; storage failures abort the run.
    pub async fn process_posts(&self, posts: &[Post]) -> Result<Vec<PostReport>> {
        tracing::info!("Summarizing {} posts with LLM...", posts.len());

        let mut reports = Vec::with_capacity(posts.len());
        for post in posts {
            let outcome = self
                .policy
                .retry(&post.title, |_attempt| self.analyze(post))
                .await;

            let report = match outcome {
                Ok(analysis) => {
                    let report = PostReport::success(post, analysis);
                    self.persist(&report).await?;
                    report
                }
                Err(e) => {
                    tracing::error!("Giving up on post '{}': {}", post.title, e);
                    PostReport::failure(post, &e.to_string())
                }
            };
            reports.push(report);
        }

        tracing::info!("All posts summarized (with retry/skip & backoff).");
        Ok(reports)
    }

    /// Both remote steps form one attempt; a failure in either retries both.
    async fn analyze(&self, post: &Post) -> Result<Analysis> {
        let summary = self.analyzer.summarize(post).await?;
        let tools = self.analyzer.extract_tools(post).await?;
        Ok(Analysis { summary, tools })
    }

    async fn persist(&self, report: &PostReport) -> Result<()> {
        let inserted = self.repository.upsert_summary(report.to_record()).await?;
        if !inserted {
            tracing::debug!("Summary for {} already stored, keeping first write", report.id);
        }
        self.repository.upsert_tools(&report.id, &report.tools).await?;
        Ok(())
    }
}
