use serde::Deserialize;
use serde_json::Value;

use crate::models::{ProductCategory, Tool};

#[derive(Debug, Deserialize)]
struct RawTool {
    #[serde(default)]
    brand: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default, rename = "type")]
    category: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawToolList {
    tools: Vec<RawTool>,
}

/// Decodes the model's structured reply into tools.
///
/// Accepts either `{"tools": [...]}` or a bare array, optionally wrapped in a
/// markdown code fence. Returns `None` when the text is not that shape.
/// Entries without a name are dropped; unknown or blank categories become
/// `None`.
pub fn parse_tool_list(text: &str) -> Option<Vec<Tool>> {
    let body = strip_code_fence(text.trim());
    let value: Value = serde_json::from_str(body).ok()?;

    let raw = match value {
        Value::Array(_) => serde_json::from_value::<Vec<RawTool>>(value).ok()?,
        Value::Object(_) => serde_json::from_value::<RawToolList>(value).ok()?.tools,
        _ => return None,
    };

    let tools = raw
        .into_iter()
        .filter_map(|raw| {
            let name = raw.name?;
            if name.trim().is_empty() {
                return None;
            }
            let category = raw
                .category
                .as_deref()
                .filter(|c| !c.trim().is_empty())
                .and_then(|c| match c.parse::<ProductCategory>() {
                    Ok(category) => Some(category),
                    Err(e) => {
                        tracing::debug!("Dropping category of {}: {}", name, e);
                        None
                    }
                });
            Some(Tool::new(raw.brand.as_deref(), &name, category))
        })
        .collect();

    Some(tools)
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
