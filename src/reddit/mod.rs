mod client;

pub use client::RedditClient;
