use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::Post;

const TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";
const OAUTH_API_URL: &str = "https://oauth.reddit.com";
const PERMALINK_BASE: &str = "https://www.reddit.com";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct Listing<T> {
    data: ListingData<T>,
}

#[derive(Debug, Deserialize)]
struct ListingData<T> {
    children: Vec<Thing<T>>,
}

#[derive(Debug, Deserialize)]
struct Thing<T> {
    kind: String,
    data: T,
}

#[derive(Debug, Deserialize)]
struct Submission {
    id: String,
    title: String,
    #[serde(default)]
    selftext: String,
    permalink: String,
}

#[derive(Debug, Deserialize)]
struct CommentData {
    #[serde(default)]
    body: Option<String>,
}

pub struct RedditClient {
    client: Client,
    client_id: String,
    client_secret: String,
}

impl RedditClient {
    pub fn new(client_id: String, client_secret: String, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            client_id,
            client_secret,
        })
    }

    /// Fetches the hot listing of a subreddit along with the first
    /// `comment_limit` top-level comments of each post.
    pub async fn fetch_hot_posts(
        &self,
        subreddit: &str,
        limit: u32,
        comment_limit: usize,
    ) -> Result<Vec<Post>> {
        tracing::info!(
            "Fetching posts from subreddit: {} (limit={}, comment_limit={})",
            subreddit,
            limit,
            comment_limit
        );

        let token = self.access_token().await?;

        let listing_url = format!(
            "{}/r/{}/hot?limit={}&raw_json=1",
            OAUTH_API_URL,
            urlencoding::encode(subreddit),
            limit
        );
        let body = self.get_text(&listing_url, &token).await?;
        let submissions = parse_submissions(&body)?;

        let mut posts = Vec::with_capacity(submissions.len());
        for submission in submissions.into_iter().take(limit as usize) {
            let comments_url = format!(
                "{}/comments/{}?limit={}&depth=1&raw_json=1",
                OAUTH_API_URL, submission.id, comment_limit
            );
            let body = self.get_text(&comments_url, &token).await?;
            let comments = parse_top_level_comments(&body, comment_limit)?;

            posts.push(Post {
                url: permalink_url(&submission.permalink)?,
                id: submission.id,
                title: submission.title,
                selftext: submission.selftext,
                comments,
            });
        }

        tracing::info!("Fetched {} posts from subreddit: {}", posts.len(), subreddit);
        Ok(posts)
    }

    async fn access_token(&self) -> Result<String> {
        let response = self
            .client
            .post(TOKEN_URL)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(AppError::RedditApi(format!(
                "Token request failed: HTTP {}: {}",
                status, error_text
            )));
        }

        let token: TokenResponse = response.json().await?;
        Ok(token.access_token)
    }

    async fn get_text(&self, url: &str, token: &str) -> Result<String> {
        let response = self.client.get(url).bearer_auth(token).send().await?;

        if !response.status().is_success() {
            return Err(AppError::RedditApi(format!(
                "GET {} failed: HTTP {}",
                url,
                response.status()
            )));
        }

        Ok(response.text().await?)
    }
}

fn parse_submissions(body: &str) -> Result<Vec<Submission>> {
    let listing: Listing<Submission> = serde_json::from_str(body)?;
    Ok(listing
        .data
        .children
        .into_iter()
        .filter(|thing| thing.kind == "t3")
        .map(|thing| thing.data)
        .collect())
}

/// The comments endpoint returns `[post_listing, comment_listing]`. Only real
/// comments (`t1`) are kept; "load more" stubs are dropped.
fn parse_top_level_comments(body: &str, comment_limit: usize) -> Result<Vec<String>> {
    let (_, comments): (serde_json::Value, Listing<CommentData>) = serde_json::from_str(body)?;
    Ok(comments
        .data
        .children
        .into_iter()
        .filter(|thing| thing.kind == "t1")
        .filter_map(|thing| thing.data.body)
        .take(comment_limit)
        .collect())
}

fn permalink_url(permalink: &str) -> Result<String> {
    let base = Url::parse(PERMALINK_BASE).map_err(anyhow::Error::from)?;
    let url = base
        .join(permalink)
        .map_err(|e| anyhow::anyhow!("Bad permalink {}: {}", permalink, e))?;
    Ok(url.to_string())
}
