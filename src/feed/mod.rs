use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use url::Url;

mod fetch;
mod parse;
pub mod types;

pub use types::FeedItem;

/// Where news items come from.
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch_items(&self) -> Result<Vec<FeedItem>>;
}

/// RSS feed over HTTP. Fetch and parse failures are returned as errors;
/// the caller does not retry.
pub struct RssFeedSource {
    client: Client,
    url: Url,
}

impl RssFeedSource {
    pub fn new(url: Url, user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().user_agent(user_agent).timeout(timeout).build()?;
        Ok(Self { client, url })
    }
}

#[async_trait]
impl FeedSource for RssFeedSource {
    async fn fetch_items(&self) -> Result<Vec<FeedItem>> {
        let xml = fetch::fetch_rss(&self.client, self.url.as_str()).await?;
        let channel = parse::parse_channel(&xml)?;
        let (items, no_link) = parse::feed_items(&channel);
        if no_link > 0 {
            tracing::info!(skipped = no_link, "↩️ skip items without link");
        }
        Ok(items)
    }
}
