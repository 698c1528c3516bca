use serde::{Deserialize, Serialize};

/// A forum submission together with a bounded slice of its top-level comments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub title: String,
    pub selftext: String,
    pub comments: Vec<String>,
    pub url: String,
}

impl Post {
    /// Renders the post the way it is handed to the language model.
    pub fn as_prompt_block(&self) -> String {
        let comments = if self.comments.is_empty() {
            "(none)".to_string()
        } else {
            self.comments
                .iter()
                .map(|c| format!("- {}", c.trim()))
                .collect::<Vec<_>>()
                .join("\n")
        };

        format!(
            "Title: {}\nBody: {}\nComments:\n{}",
            self.title, self.selftext, comments
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_block_lists_comments_in_order() {
        let post = Post {
            id: "p1".to_string(),
            title: "Ultralight tarp setup".to_string(),
            selftext: "Pitched it low".to_string(),
            comments: vec!["nice setup".to_string(), " what stove? ".to_string()],
            url: "https://x/p1".to_string(),
        };

        let block = post.as_prompt_block();
        assert!(block.starts_with("Title: Ultralight tarp setup\nBody: Pitched it low"));
        let first = block.find("- nice setup").unwrap();
        let second = block.find("- what stove?").unwrap();
        assert!(first < second);
    }

    #[test]
    fn prompt_block_marks_missing_comments() {
        let post = Post {
            id: "p2".to_string(),
            title: "Quiet thread".to_string(),
            selftext: String::new(),
            comments: vec![],
            url: "https://x/p2".to_string(),
        };

        assert!(post.as_prompt_block().ends_with("Comments:\n(none)"));
    }
}
