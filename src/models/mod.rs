mod post;
mod summary;
mod tool;

pub use post::Post;
pub use summary::{Analysis, PostReport, StoredSummary, SummaryRecord};
pub use tool::{ProductCategory, Tool, ToolRecord};
