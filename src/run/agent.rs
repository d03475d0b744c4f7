use std::collections::HashSet;
use std::fs;

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::Instrument;

use crate::caption::{caption_with_fallback, CaptionGenerator};
use crate::clock::Clock;
use crate::config::AgentConfig;
use crate::feed::{FeedItem, FeedSource};
use crate::ledger::Ledger;
use crate::poster::PosterRenderer;
use crate::telemetry::{self};
use crate::telemetry::ops::run::Phase as RunPhase;

use super::types::{ProcessedItem, RunPlan, RunSummary};

/// First `limit` items whose link is neither in the ledger nor repeated
/// earlier in the same feed, in feed order. Also returns how many items of
/// the whole feed were skipped as already seen, past the limit included.
pub fn select_new<'a>(items: &'a [FeedItem], ledger: &Ledger, limit: usize) -> (Vec<&'a FeedItem>, usize) {
    let mut picked = Vec::new();
    let mut batch: HashSet<&str> = HashSet::new();
    let mut skipped_seen = 0usize;
    for item in items {
        if ledger.contains(&item.link) {
            skipped_seen += 1;
        } else if picked.len() < limit && batch.insert(item.link.as_str()) {
            picked.push(item);
        }
    }
    (picked, skipped_seen)
}

/// One pass of the pipeline: feed, ledger filter, caption + poster per item,
/// ledger write-back.
pub struct Agent {
    cfg: AgentConfig,
    feed: Box<dyn FeedSource>,
    captioner: Box<dyn CaptionGenerator>,
    renderer: PosterRenderer,
    clock: Box<dyn Clock>,
    rng: StdRng,
}

impl Agent {
    pub fn new(
        cfg: AgentConfig,
        feed: Box<dyn FeedSource>,
        captioner: Box<dyn CaptionGenerator>,
        renderer: PosterRenderer,
        clock: Box<dyn Clock>,
    ) -> Self {
        let rng = match cfg.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self { cfg, feed, captioner, renderer, clock, rng }
    }

    /// What `run_once` would process, without touching the filesystem.
    pub async fn plan(&self) -> Result<RunPlan> {
        let log = telemetry::run();
        let ledger = { let _s = log.span(&RunPhase::LoadLedger).entered(); Ledger::load(&self.cfg.ledger_path)? };
        let items = self.feed.fetch_items().instrument(log.span(&RunPhase::FetchFeed)).await?;
        let (selected, skipped_seen) = select_new(&items, &ledger, self.cfg.limit);
        Ok(RunPlan {
            fetched: items.len(),
            skipped_seen,
            limit: self.cfg.limit,
            selected: selected.into_iter().cloned().collect(),
        })
    }

    pub async fn run_once(&mut self) -> Result<RunSummary> {
        let log = telemetry::run();

        fs::create_dir_all(&self.cfg.output_dir)
            .with_context(|| format!("create output dir {}", self.cfg.output_dir.display()))?;
        let mut ledger = { let _s = log.span(&RunPhase::LoadLedger).entered(); Ledger::load(&self.cfg.ledger_path)? };
        log.debug(format!("ledger has {} entries", ledger.len()));

        // a feed failure ends the run before anything is written
        let items = self.feed.fetch_items().instrument(log.span(&RunPhase::FetchFeed)).await?;
        log.info(format!("🔎 Total fetched from feed: {}", items.len()));

        let (selected, skipped_seen) = select_new(&items, &ledger, self.cfg.limit);
        let mut processed: Vec<ProcessedItem> = Vec::with_capacity(selected.len());

        for (i, item) in selected.into_iter().enumerate() {
            let index = i + 1;
            if i > 0 && !self.cfg.item_delay.is_zero() {
                tokio::time::sleep(self.cfg.item_delay).await;
            }
            let span = log.span_kv(&RunPhase::Item, [("index", index.to_string()), ("link", item.link.clone())]);
            let done = self.process_item(index, item).instrument(span).await?;
            ledger.add(item.link.clone());
            processed.push(done);
        }

        {
            let _s = log.span(&RunPhase::SaveLedger).entered();
            ledger.save()?;
        }

        let (rest, _) = select_new(&items, &ledger, usize::MAX);
        let deferred = rest.len();
        log.totals(items.len(), skipped_seen, processed.len(), ledger.len());
        if deferred > 0 {
            log.info(format!("⏭️ {deferred} new item(s) left for the next run"));
        }

        Ok(RunSummary { fetched: items.len(), skipped_seen, deferred, processed, ledger_size: ledger.len() })
    }

    async fn process_item(&mut self, index: usize, item: &FeedItem) -> Result<ProcessedItem> {
        let log = telemetry::run();
        log.item_start(index, self.cfg.limit, &item.title);

        let caption = caption_with_fallback(self.captioner.as_ref(), &item.title)
            .instrument(log.span(&RunPhase::Caption))
            .await;
        let now = self.clock.now();
        let poster = self
            .renderer
            .render(&item.title, index, now, &mut self.rng)
            .instrument(log.span(&RunPhase::Poster))
            .await
            .with_context(|| format!("render poster {index}"))?;

        let caption_path = self.cfg.output_dir.join(format!("caption_{index}.txt"));
        {
            let _s = log.span(&RunPhase::WriteOutputs).entered();
            fs::write(&caption_path, &caption.text)
                .with_context(|| format!("write caption {}", caption_path.display()))?;
        }
        log.info(format!("✅ Image saved → {}", poster.path.display()));
        log.info(format!("✅ Caption saved → {}", caption_path.display()));

        Ok(ProcessedItem {
            index,
            link: item.link.clone(),
            title: item.title.clone(),
            caption_path,
            image_path: poster.path,
            image_seed: poster.seed,
            caption_source: caption.source,
            poster_source: poster.source,
        })
    }
}
