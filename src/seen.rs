use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Serialize;

use crate::config::AgentConfig;
use crate::ledger::Ledger;
use crate::telemetry::{self};
use crate::telemetry::ops::seen::Phase as SeenPhase;

/// newsposter seen ls/clear
#[derive(Args)]
pub struct SeenCmd {
    #[command(subcommand)]
    pub cmd: SeenSub,
}

#[derive(Subcommand)]
pub enum SeenSub {
    /// List identifiers already turned into posts
    Ls,
    /// Forget every identifier (plan-only by default; use --apply to write)
    Clear {
        #[arg(long, default_value_t = false)]
        apply: bool,
    },
}

#[derive(Serialize)]
struct SeenList {
    path: String,
    links: Vec<String>,
}

#[derive(Serialize)]
struct SeenClear {
    path: String,
    removed: usize,
}

pub fn run(cfg: &AgentConfig, args: SeenCmd) -> Result<()> {
    let log = telemetry::seen();
    let _g = log.root_span_kv([("ledger", cfg.ledger_path.display().to_string())]).entered();
    let mut ledger = Ledger::load(&cfg.ledger_path)?;
    match args.cmd {
        SeenSub::Ls => list(&ledger),
        SeenSub::Clear { apply } => clear(&mut ledger, apply),
    }
}

fn list(ledger: &Ledger) -> Result<()> {
    let log = telemetry::seen();
    let _s = log.span(&SeenPhase::List).entered();
    if ledger.is_empty() {
        log.info(format!("📚 No seen items in {}", ledger.path().display()));
    } else {
        log.info(format!("📚 {} seen item(s) in {}", ledger.len(), ledger.path().display()));
    }
    for link in ledger.iter() {
        log.info(format!("  {link}"));
    }
    if telemetry::config::json_mode() {
        let list = SeenList {
            path: ledger.path().display().to_string(),
            links: ledger.iter().map(str::to_string).collect(),
        };
        log.result(&list)?;
    }
    Ok(())
}

fn clear(ledger: &mut Ledger, apply: bool) -> Result<()> {
    let log = telemetry::seen();
    let result = SeenClear { path: ledger.path().display().to_string(), removed: ledger.len() };
    if !apply {
        let _s = log.span(&SeenPhase::Plan).entered();
        log.info(format!("📝 Seen plan — clear {} item(s) from {}", result.removed, result.path));
        log.info("   Use --apply to execute.");
        if telemetry::config::json_mode() {
            log.plan(&result)?;
        }
        return Ok(());
    }
    let _s = log.span(&SeenPhase::Clear).entered();
    ledger.clear();
    ledger.save()?;
    log.info(format!("🧹 Cleared {} item(s)", result.removed));
    if telemetry::config::json_mode() {
        log.result(&result)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg_with_ledger(dir: &std::path::Path) -> AgentConfig {
        AgentConfig { ledger_path: dir.join("seen_news.txt"), ..AgentConfig::default() }
    }

    #[test]
    fn clear_is_plan_only_without_apply() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = cfg_with_ledger(dir.path());
        std::fs::write(&cfg.ledger_path, "a\nb\n").unwrap();

        run(&cfg, SeenCmd { cmd: SeenSub::Clear { apply: false } }).unwrap();
        assert_eq!(Ledger::load(&cfg.ledger_path).unwrap().len(), 2);

        run(&cfg, SeenCmd { cmd: SeenSub::Clear { apply: true } }).unwrap();
        assert!(Ledger::load(&cfg.ledger_path).unwrap().is_empty());
    }

    #[test]
    fn ls_on_missing_ledger_is_fine() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = cfg_with_ledger(dir.path());
        run(&cfg, SeenCmd { cmd: SeenSub::Ls }).unwrap();
        assert!(!cfg.ledger_path.exists());
    }
}
