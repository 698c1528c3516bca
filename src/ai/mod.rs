mod extraction;
mod gemini;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Post, Tool};

pub use extraction::parse_tool_list;
pub use gemini::GeminiClient;

/// Remote analysis of a single post. Implementations own prompt construction
/// and response decoding; callers only see plain text and fixed-shape tools.
#[async_trait]
pub trait PostAnalyzer: Send + Sync {
    async fn summarize(&self, post: &Post) -> Result<String>;

    /// Returns the gear mentioned in the post. A reply that does not fit the
    /// expected shape yields an empty list rather than an error.
    async fn extract_tools(&self, post: &Post) -> Result<Vec<Tool>>;
}
