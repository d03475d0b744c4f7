use anyhow::{Context, Result};
use bytes::Bytes;
use reqwest::Client;

pub async fn fetch_rss(client: &Client, url: &str) -> Result<Bytes> {
    let bytes = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("fetch feed {url}"))?
        .error_for_status()?
        .bytes()
        .await?;
    Ok(bytes)
}
