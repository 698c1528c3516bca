use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Post, Tool};

/// Marker placed in front of the summary of a post that exhausted its retries.
pub const ERROR_PREFIX: &str = "[ERROR]";

/// Row written to the `summaries` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRecord {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub url: String,
}

/// Row read back from the `summaries` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSummary {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

/// Output of one successful summarize + extract attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    pub summary: String,
    pub tools: Vec<Tool>,
}

/// One entry of the run report, in input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostReport {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub tools: Vec<Tool>,
    pub url: String,
    #[serde(skip)]
    failed: bool,
}

impl PostReport {
    pub fn success(post: &Post, analysis: Analysis) -> Self {
        Self {
            id: post.id.clone(),
            title: post.title.clone(),
            summary: analysis.summary,
            tools: analysis.tools,
            url: post.url.clone(),
            failed: false,
        }
    }

    pub fn failure(post: &Post, message: &str) -> Self {
        Self {
            id: post.id.clone(),
            title: post.title.clone(),
            summary: format!("{} {}", ERROR_PREFIX, message),
            tools: Vec::new(),
            url: post.url.clone(),
            failed: true,
        }
    }

    pub fn is_failure(&self) -> bool {
        self.failed
    }

    pub fn to_record(&self) -> SummaryRecord {
        SummaryRecord {
            id: self.id.clone(),
            title: self.title.clone(),
            summary: self.summary.clone(),
            url: self.url.clone(),
        }
    }
}
