use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{AppError, Result};
use crate::pipeline::RetryPolicy;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_db_path")]
    pub db_path: String,

    #[serde(default = "default_subreddit")]
    pub subreddit: String,

    #[serde(default = "default_post_limit")]
    pub post_limit: u32,

    #[serde(default = "default_comment_limit")]
    pub comment_limit: usize,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_base_wait_secs")]
    pub base_wait_secs: u64,

    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,

    #[serde(default = "default_user_agent")]
    pub reddit_user_agent: String,

    pub reddit_client_id: Option<String>,
    pub reddit_client_secret: Option<String>,
    pub gemini_api_key: Option<String>,
}

fn default_db_path() -> String {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("gear-digest");
    std::fs::create_dir_all(&data_dir).ok();
    data_dir.join("summary.db").to_string_lossy().to_string()
}

fn default_subreddit() -> String {
    "Ultralight".to_string()
}

fn default_post_limit() -> u32 {
    5
}

fn default_comment_limit() -> usize {
    10
}

fn default_max_retries() -> u32 {
    3
}

fn default_base_wait_secs() -> u64 {
    60
}

fn default_gemini_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_user_agent() -> String {
    "reddit-ultralight-summary-script".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            subreddit: default_subreddit(),
            post_limit: default_post_limit(),
            comment_limit: default_comment_limit(),
            max_retries: default_max_retries(),
            base_wait_secs: default_base_wait_secs(),
            gemini_model: default_gemini_model(),
            reddit_user_agent: default_user_agent(),
            reddit_client_id: None,
            reddit_client_secret: None,
            gemini_api_key: None,
        }
    }
}

impl Config {
    /// Reads the config file (writing defaults on first run), then applies
    /// `.env` and environment overrides.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        let mut config: Config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            let config = Config::default();
            config.save()?;
            config
        };

        if dotenvy::dotenv().is_err() {
            tracing::debug!(".env file not found, using process environment only");
        }
        config.apply_overrides(|key| std::env::var(key).ok());

        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gear-digest")
            .join("config.toml")
    }

    /// Environment values win over the file. Blank values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(id) = get("REDDIT_CLIENT_ID") {
            self.reddit_client_id = Some(id);
        }
        if let Some(secret) = get("REDDIT_CLIENT_SECRET") {
            self.reddit_client_secret = Some(secret);
        }
        if let Some(agent) = get("REDDIT_USER_AGENT") {
            self.reddit_user_agent = agent;
        }
        if let Some(key) = get("GOOGLE_API_KEY").or_else(|| get("GEMINI_API_KEY")) {
            self.gemini_api_key = Some(key);
        }
        if let Some(path) = get("GEAR_DIGEST_DB") {
            self.db_path = path;
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, Duration::from_secs(self.base_wait_secs))
    }

    pub fn reddit_credentials(&self) -> Result<(String, String)> {
        match (&self.reddit_client_id, &self.reddit_client_secret) {
            (Some(id), Some(secret)) => Ok((id.clone(), secret.clone())),
            _ => Err(AppError::Config(
                "REDDIT_CLIENT_ID and REDDIT_CLIENT_SECRET must be set".to_string(),
            )),
        }
    }

    pub fn gemini_key(&self) -> Result<String> {
        self.gemini_api_key.clone().ok_or_else(|| {
            AppError::Config("GOOGLE_API_KEY or GEMINI_API_KEY must be set".to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let config: Config = toml::from_str(
            r#"
            db_path = "/tmp/gear.db"
            subreddit = "Hammocks"
            max_retries = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.db_path, "/tmp/gear.db");
        assert_eq!(config.subreddit, "Hammocks");
        assert_eq!(config.post_limit, 5);
        assert_eq!(config.comment_limit, 10);
        assert_eq!(
            config.retry_policy(),
            RetryPolicy::new(5, Duration::from_secs(60))
        );
        assert!(config.gemini_api_key.is_none());
    }

    #[test]
    fn environment_overrides_file_values() {
        let mut config = Config {
            db_path: "/tmp/file.db".to_string(),
            reddit_client_id: Some("from-file".to_string()),
            ..Config::default()
        };
        let env: HashMap<&str, &str> = HashMap::from([
            ("REDDIT_CLIENT_ID", "from-env"),
            ("REDDIT_CLIENT_SECRET", "shh"),
            ("GEMINI_API_KEY", "gemini"),
            ("REDDIT_USER_AGENT", "  "),
        ]);

        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(
            config.reddit_credentials().unwrap(),
            ("from-env".to_string(), "shh".to_string())
        );
        assert_eq!(config.gemini_key().unwrap(), "gemini");
        assert_eq!(config.reddit_user_agent, "reddit-ultralight-summary-script");
        assert_eq!(config.db_path, "/tmp/file.db");
    }

    #[test]
    fn google_key_takes_precedence() {
        let mut config = Config::default();
        config.apply_overrides(|key| match key {
            "GOOGLE_API_KEY" => Some("google".to_string()),
            "GEMINI_API_KEY" => Some("gemini".to_string()),
            _ => None,
        });
        assert_eq!(config.gemini_key().unwrap(), "google");
    }

    #[test]
    fn missing_credentials_are_config_errors() {
        let config = Config {
            reddit_client_id: None,
            reddit_client_secret: None,
            gemini_api_key: None,
            ..Config::default()
        };
        assert!(matches!(config.reddit_credentials(), Err(AppError::Config(_))));
        assert!(matches!(config.gemini_key(), Err(AppError::Config(_))));
    }
}
