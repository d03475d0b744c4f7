use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use url::Url;

const DEFAULT_FEED_BASE: &str = "https://news.google.com/rss/search";
const DEFAULT_FEED_QUERY: &str = "world news";
const DEFAULT_FEED_LANG: &str = "en-IN";
const DEFAULT_FEED_REGION: &str = "IN";
const DEFAULT_FEED_EDITION: &str = "IN:en";
const DEFAULT_FEED_TIMEOUT_SECS: u64 = 30;
const DEFAULT_OUTPUT_DIR: &str = "output";
const DEFAULT_LEDGER_PATH: &str = "seen_news.txt";
const DEFAULT_LIMIT: usize = 10;
const DEFAULT_ITEM_DELAY_MS: u64 = 1_000;
const DEFAULT_CAPTION_COMMAND: &str = "ollama";
const DEFAULT_CAPTION_MODEL: &str = "phi3";
const DEFAULT_CAPTION_TIMEOUT_SECS: u64 = 20;
const DEFAULT_IMAGE_BASE_URL: &str = "https://picsum.photos";
const DEFAULT_IMAGE_TIMEOUT_SECS: u64 = 10;
const DEFAULT_FONT_FAMILY: &str = "Arial";

pub const USER_AGENT: &str = concat!(
    "Mozilla/5.0 (compatible; ",
    env!("CARGO_PKG_NAME"),
    "/",
    env!("CARGO_PKG_VERSION"),
    ")"
);

/// Everything a run needs to know, resolved once at startup.
#[derive(Clone, Debug)]
pub struct AgentConfig {
    pub feed_url: Url,
    pub feed_timeout: Duration,
    pub output_dir: PathBuf,
    pub ledger_path: PathBuf,
    pub limit: usize,
    pub item_delay: Duration,
    pub caption_command: String,
    pub caption_model: String,
    pub caption_timeout: Duration,
    pub image_base_url: String,
    pub image_timeout: Duration,
    pub user_agent: String,
    pub font_family: String,
    pub font_dir: Option<PathBuf>,
    pub seed: Option<u64>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            feed_url: default_feed_url(),
            feed_timeout: Duration::from_secs(DEFAULT_FEED_TIMEOUT_SECS),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            ledger_path: PathBuf::from(DEFAULT_LEDGER_PATH),
            limit: DEFAULT_LIMIT,
            item_delay: Duration::from_millis(DEFAULT_ITEM_DELAY_MS),
            caption_command: DEFAULT_CAPTION_COMMAND.to_string(),
            caption_model: DEFAULT_CAPTION_MODEL.to_string(),
            caption_timeout: Duration::from_secs(DEFAULT_CAPTION_TIMEOUT_SECS),
            image_base_url: DEFAULT_IMAGE_BASE_URL.to_string(),
            image_timeout: Duration::from_secs(DEFAULT_IMAGE_TIMEOUT_SECS),
            user_agent: USER_AGENT.to_string(),
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            font_dir: None,
            seed: None,
        }
    }
}

/// Google News search feed for a query, language and region.
pub fn search_feed_url(query: &str, lang: &str, region: &str, edition: &str) -> Result<Url> {
    Url::parse_with_params(
        DEFAULT_FEED_BASE,
        &[("q", query), ("hl", lang), ("gl", region), ("ceid", edition)],
    )
    .context("build feed url")
}

fn default_feed_url() -> Url {
    search_feed_url(DEFAULT_FEED_QUERY, DEFAULT_FEED_LANG, DEFAULT_FEED_REGION, DEFAULT_FEED_EDITION)
        .expect("static feed url parameters")
}

impl AgentConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Apply `NEWSPOSTER_*` overrides from an arbitrary lookup. Unparseable
    /// numbers keep the default; a bad feed URL is an error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        if let Some(url) = lookup("NEWSPOSTER_FEED_URL") {
            cfg.feed_url = Url::parse(&url).with_context(|| format!("invalid NEWSPOSTER_FEED_URL: {url}"))?;
        }
        if let Some(secs) = lookup("NEWSPOSTER_FEED_TIMEOUT_SECS").and_then(|v| v.parse::<u64>().ok()) {
            cfg.feed_timeout = Duration::from_secs(secs);
        }
        if let Some(dir) = lookup("NEWSPOSTER_OUTPUT_DIR") {
            cfg.output_dir = PathBuf::from(dir);
        }
        if let Some(path) = lookup("NEWSPOSTER_LEDGER") {
            cfg.ledger_path = PathBuf::from(path);
        }
        if let Some(limit) = lookup("NEWSPOSTER_LIMIT").and_then(|v| v.parse::<usize>().ok()) {
            cfg.limit = limit;
        }
        if let Some(ms) = lookup("NEWSPOSTER_ITEM_DELAY_MS").and_then(|v| v.parse::<u64>().ok()) {
            cfg.item_delay = Duration::from_millis(ms);
        }
        if let Some(cmd) = lookup("NEWSPOSTER_CAPTION_COMMAND") {
            cfg.caption_command = cmd;
        }
        if let Some(model) = lookup("NEWSPOSTER_CAPTION_MODEL") {
            cfg.caption_model = model;
        }
        if let Some(secs) = lookup("NEWSPOSTER_CAPTION_TIMEOUT_SECS").and_then(|v| v.parse::<u64>().ok()) {
            cfg.caption_timeout = Duration::from_secs(secs);
        }
        if let Some(base) = lookup("NEWSPOSTER_IMAGE_BASE_URL") {
            cfg.image_base_url = base;
        }
        if let Some(secs) = lookup("NEWSPOSTER_IMAGE_TIMEOUT_SECS").and_then(|v| v.parse::<u64>().ok()) {
            cfg.image_timeout = Duration::from_secs(secs);
        }
        if let Some(family) = lookup("NEWSPOSTER_FONT_FAMILY") {
            cfg.font_family = family;
        }
        if let Some(dir) = lookup("NEWSPOSTER_FONT_DIR") {
            cfg.font_dir = Some(PathBuf::from(dir));
        }
        if let Some(seed) = lookup("NEWSPOSTER_SEED").and_then(|v| v.parse::<u64>().ok()) {
            cfg.seed = Some(seed);
        }
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_world_news_search() {
        let cfg = AgentConfig::default();
        assert_eq!(cfg.limit, 10);
        assert_eq!(cfg.output_dir, PathBuf::from("output"));
        assert_eq!(cfg.ledger_path, PathBuf::from("seen_news.txt"));
        assert_eq!(cfg.caption_timeout, Duration::from_secs(20));
        assert_eq!(cfg.image_timeout, Duration::from_secs(10));
        assert_eq!(
            cfg.feed_url.as_str(),
            "https://news.google.com/rss/search?q=world+news&hl=en-IN&gl=IN&ceid=IN%3Aen"
        );
    }

    #[test]
    fn env_overrides_apply_and_bad_numbers_are_ignored() {
        let cfg = AgentConfig::from_lookup(lookup_from(&[
            ("NEWSPOSTER_LIMIT", "3"),
            ("NEWSPOSTER_ITEM_DELAY_MS", "not-a-number"),
            ("NEWSPOSTER_OUTPUT_DIR", "/tmp/posters"),
            ("NEWSPOSTER_SEED", "42"),
        ]))
        .unwrap();
        assert_eq!(cfg.limit, 3);
        assert_eq!(cfg.item_delay, Duration::from_millis(1_000));
        assert_eq!(cfg.output_dir, PathBuf::from("/tmp/posters"));
        assert_eq!(cfg.seed, Some(42));
    }

    #[test]
    fn invalid_feed_url_is_rejected() {
        let err = AgentConfig::from_lookup(lookup_from(&[("NEWSPOSTER_FEED_URL", "not a url")]));
        assert!(err.is_err());
    }
}
