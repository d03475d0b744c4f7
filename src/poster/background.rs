use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use image::imageops::{self, FilterType};
use image::RgbImage;
use rand::Rng;
use reqwest::Client;

use super::PosterError;

/// Seed string for the remote image service: `{keyword}-{index}-{unix}-{nonce}`.
pub fn image_seed<R: Rng + ?Sized>(keyword: &str, index: usize, now: DateTime<Utc>, rng: &mut R) -> String {
    let nonce: u32 = rng.random_range(100..=9999);
    format!("{keyword}-{index}-{}-{nonce}", now.timestamp())
}

/// Provider of a photo to put behind the title.
#[async_trait]
pub trait BackgroundSource: Send + Sync {
    async fn fetch(&self, seed: &str, width: u32, height: u32) -> Result<RgbImage, PosterError>;
}

/// Seeded placeholder photos over HTTP (`{base}/seed/{seed}/{w}/{h}`).
pub struct RemoteBackground {
    client: Client,
    base_url: String,
}

impl RemoteBackground {
    pub fn new(base_url: impl Into<String>, user_agent: &str, timeout: Duration) -> Result<Self, PosterError> {
        let client = Client::builder().user_agent(user_agent).timeout(timeout).build()?;
        Ok(Self { client, base_url: base_url.into() })
    }

    pub fn image_url(&self, seed: &str, width: u32, height: u32) -> String {
        format!("{}/seed/{seed}/{width}/{height}", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl BackgroundSource for RemoteBackground {
    async fn fetch(&self, seed: &str, width: u32, height: u32) -> Result<RgbImage, PosterError> {
        let url = self.image_url(seed, width, height);
        let resp = self.client.get(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(PosterError::Status(status));
        }
        let bytes = resp.bytes().await?;
        decode_background(&bytes, width, height)
    }
}

/// Decode any format `image` understands and force the exact canvas size.
pub fn decode_background(bytes: &[u8], width: u32, height: u32) -> Result<RgbImage, PosterError> {
    let img = image::load_from_memory(bytes)?.to_rgb8();
    if img.dimensions() == (width, height) {
        return Ok(img);
    }
    Ok(imageops::resize(&img, width, height, FilterType::Triangle))
}
