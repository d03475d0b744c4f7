use std::path::PathBuf;

use serde::Serialize;

use crate::caption::CaptionSource;
use crate::feed::FeedItem;
use crate::poster::PosterSource;

// Plan envelope types
#[derive(Debug, Serialize)]
pub struct RunPlan {
    pub fetched: usize,
    pub skipped_seen: usize,
    pub limit: usize,
    pub selected: Vec<FeedItem>,
}

// Apply/result envelope types
#[derive(Clone, Debug, Serialize)]
pub struct ProcessedItem {
    pub index: usize,
    pub link: String,
    pub title: String,
    pub caption_path: PathBuf,
    pub image_path: PathBuf,
    pub image_seed: String,
    pub caption_source: CaptionSource,
    pub poster_source: PosterSource,
}

#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub fetched: usize,
    pub skipped_seen: usize,
    /// New items left for a later run because the limit was reached.
    pub deferred: usize,
    pub processed: Vec<ProcessedItem>,
    pub ledger_size: usize,
}
