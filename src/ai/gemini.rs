use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{AppError, Result};
use crate::models::{Post, ProductCategory, Tool};

use super::{parse_tool_list, PostAnalyzer};

const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

const SUMMARY_INSTRUCTION: &str = r#"The following is a post and its comments from an outdoor gear discussion forum.
Write a summary of the whole thread in about 300 characters.
Output only the summary text, with no prefix or decoration."#;

const EXTRACTION_INSTRUCTION: &str = r#"The following is a post and its comments from an outdoor gear discussion forum.
List every piece of gear or equipment mentioned. For each item give the brand, the product name, and its type.
Use null for the brand when it is unknown. Use one of the allowed type values, or null when none fits."#;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    response_schema: Value,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()?;
        Ok(Self {
            client,
            api_key,
            model,
            base_url: GEMINI_API_URL.to_string(),
        })
    }

    pub fn model_version(&self) -> &str {
        &self.model
    }

    /// Transport and HTTP status failures are errors. A well-formed reply
    /// that carries no text (empty, or blocked by safety filters) is `None`.
    async fn generate(
        &self,
        prompt: String,
        config: Option<GenerationConfig>,
    ) -> Result<Option<String>> {
        let request = GenerateRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part { text: Some(prompt) }],
            }],
            generation_config: config,
        };

        let response = self
            .client
            .post(format!("{}/{}:generateContent", self.base_url, self.model))
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(AppError::GeminiApi(format!("HTTP {}: {}", status, error_text)));
        }

        let body: GenerateResponse = response.json().await?;
        Ok(response_text(body))
    }
}

#[async_trait]
impl PostAnalyzer for GeminiClient {
    async fn summarize(&self, post: &Post) -> Result<String> {
        tracing::info!("Summarizing post: {}", post.title);
        let prompt = format!("{}\n\n{}", SUMMARY_INSTRUCTION, post.as_prompt_block());
        let summary = self
            .generate(prompt, None)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Summary response contained no text"))?
            .trim()
            .to_string();
        tracing::info!("Summary generated for: {}", post.title);
        Ok(summary)
    }

    async fn extract_tools(&self, post: &Post) -> Result<Vec<Tool>> {
        tracing::info!("Extracting tools from post: {}", post.title);
        let prompt = format!("{}\n\n{}", EXTRACTION_INSTRUCTION, post.as_prompt_block());
        let config = GenerationConfig {
            response_mime_type: "application/json".to_string(),
            response_schema: tool_list_schema(),
        };
        let text = self.generate(prompt, Some(config)).await?;

        match text.as_deref().and_then(parse_tool_list) {
            Some(tools) => {
                tracing::info!("Extracted {} tools from: {}", tools.len(), post.title);
                Ok(tools)
            }
            None => {
                tracing::warn!("Failed to extract tools from: {}", post.title);
                Ok(Vec::new())
            }
        }
    }
}

fn response_text(response: GenerateResponse) -> Option<String> {
    let text = response
        .candidates
        .into_iter()
        .next()?
        .content?
        .parts
        .into_iter()
        .filter_map(|part| part.text)
        .collect::<Vec<_>>()
        .join("");

    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Response schema in the OpenAPI subset the generateContent endpoint accepts.
fn tool_list_schema() -> Value {
    let categories: Vec<&str> = ProductCategory::ALL.iter().map(|c| c.as_str()).collect();
    json!({
        "type": "OBJECT",
        "properties": {
            "tools": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "brand": { "type": "STRING", "nullable": true },
                        "name": { "type": "STRING" },
                        "type": { "type": "STRING", "enum": categories, "nullable": true }
                    },
                    "required": ["name"]
                }
            }
        },
        "required": ["tools"]
    })
}
