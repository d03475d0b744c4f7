use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Args;
use url::Url;
use uuid::Uuid;

use crate::caption::{CaptionGenerator, CommandCaptioner, TemplateCaptioner};
use crate::clock::SystemClock;
use crate::config::AgentConfig;
use crate::feed::RssFeedSource;
use crate::poster::{FontBook, PosterRenderer, RemoteBackground};
use crate::telemetry::{self};
use crate::telemetry::emit::Meta;

mod agent;
pub mod types;

pub use agent::Agent;

/// newsposter run: turn new feed items into captions and posters
#[derive(Args, Debug, Default)]
pub struct RunCmd {
    /// Maximum number of new items to process
    #[arg(long)] pub limit: Option<usize>,
    #[arg(long)] pub feed_url: Option<String>,
    #[arg(long)] pub output_dir: Option<PathBuf>,
    /// Text-generation model passed to the caption command
    #[arg(long)] pub model: Option<String>,
    /// Caption command; empty for template captions only
    #[arg(long)] pub caption_command: Option<String>,
    /// Pause between processed items, in milliseconds
    #[arg(long)] pub delay_ms: Option<u64>,
    /// Seed for the random source (image seeds, fallback colors)
    #[arg(long)] pub seed: Option<u64>,
    /// Extra directory of .ttf/.otf fonts
    #[arg(long)] pub font_dir: Option<PathBuf>,
    /// Only list what would be processed
    #[arg(long, default_value_t = false)] pub plan: bool,
}

impl RunCmd {
    pub fn apply_to(&self, cfg: &mut AgentConfig) -> Result<()> {
        if let Some(limit) = self.limit { cfg.limit = limit; }
        if let Some(url) = &self.feed_url {
            cfg.feed_url = Url::parse(url).with_context(|| format!("Invalid URL: {url}"))?;
        }
        if let Some(dir) = &self.output_dir { cfg.output_dir = dir.clone(); }
        if let Some(model) = &self.model { cfg.caption_model = model.clone(); }
        if let Some(cmd) = &self.caption_command { cfg.caption_command = cmd.clone(); }
        if let Some(ms) = self.delay_ms { cfg.item_delay = Duration::from_millis(ms); }
        if let Some(seed) = self.seed { cfg.seed = Some(seed); }
        if let Some(dir) = &self.font_dir { cfg.font_dir = Some(dir.clone()); }
        Ok(())
    }
}

pub async fn run(mut cfg: AgentConfig, args: RunCmd) -> Result<()> {
    args.apply_to(&mut cfg)?;
    let log = telemetry::run();
    let _g = log.root_span_kv([
        ("mode", if args.plan { "plan".to_string() } else { "apply".to_string() }),
        ("feed_url", cfg.feed_url.to_string()),
        ("limit", cfg.limit.to_string()),
        ("output_dir", cfg.output_dir.display().to_string()),
        ("ledger", cfg.ledger_path.display().to_string()),
    ]).entered();
    let t0 = Instant::now();
    let run_id = Uuid::new_v4();

    let mut agent = build_agent(cfg)?;

    if args.plan {
        let plan = agent.plan().await?;
        if telemetry::config::json_mode() {
            log.plan(&plan)?;
        } else {
            log.info(format!(
                "📝 Run plan — fetched={} already_seen={} selected={} limit={}",
                plan.fetched, plan.skipped_seen, plan.selected.len(), plan.limit
            ));
            for (i, item) in plan.selected.iter().enumerate() {
                log.info(format!("  {}. {} ({})", i + 1, item.title, item.link));
            }
            log.info("   Run without --plan to execute.");
        }
        return Ok(());
    }

    let summary = agent.run_once().await?;
    log.info("🎉 Done: new posts generated");

    if telemetry::config::json_mode() {
        log.result_with_meta(&summary, Meta::since(t0, run_id))?;
    }
    Ok(())
}

fn build_agent(cfg: AgentConfig) -> Result<Agent> {
    let feed = RssFeedSource::new(cfg.feed_url.clone(), &cfg.user_agent, cfg.feed_timeout)?;
    // an empty command means template captions only
    let captioner: Box<dyn CaptionGenerator> = if cfg.caption_command.trim().is_empty() {
        Box::new(TemplateCaptioner)
    } else {
        Box::new(CommandCaptioner::new(cfg.caption_command.clone(), cfg.caption_model.clone(), cfg.caption_timeout))
    };
    let background = RemoteBackground::new(cfg.image_base_url.clone(), &cfg.user_agent, cfg.image_timeout)?;
    let fonts = FontBook::load(&cfg.font_family, cfg.font_dir.as_deref());
    tracing::debug!(faces = fonts.face_count(), family = fonts.family(), "fonts loaded");
    let renderer = PosterRenderer::new(cfg.output_dir.clone(), Box::new(background), fonts);
    Ok(Agent::new(cfg, Box::new(feed), captioner, renderer, Box::new(SystemClock)))
}
