use serde::Serialize;

/// One entry of the news feed. `link` is the dedup identity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FeedItem {
    pub link: String,
    pub title: String,
}

impl FeedItem {
    pub fn new(link: impl Into<String>, title: impl Into<String>) -> Self {
        Self { link: link.into(), title: title.into() }
    }
}
