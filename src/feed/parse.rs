use anyhow::{Context, Result};
use bytes::Bytes;
use rss::Channel;

use super::types::FeedItem;

pub fn parse_channel(xml: &Bytes) -> Result<Channel> {
    let ch = Channel::read_from(&xml[..]).context("parse rss channel")?;
    Ok(ch)
}

/// Channel items in feed order. Items without a link are dropped and counted.
pub fn feed_items(channel: &Channel) -> (Vec<FeedItem>, usize) {
    let mut items = Vec::with_capacity(channel.items().len());
    let mut no_link = 0usize;
    for item in channel.items() {
        match item.link().map(str::trim).filter(|l| !l.is_empty()) {
            Some(link) => items.push(FeedItem::new(link, item.title().unwrap_or(""))),
            None => no_link += 1,
        }
    }
    (items, no_link)
}
