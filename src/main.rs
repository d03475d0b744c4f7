use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;

mod caption;
mod clock;
mod config;
mod feed;
mod keyword;
mod ledger;
mod poster;
mod run;
mod seen;
mod telemetry;

#[derive(Parser)]
#[command(name = "newsposter", about = "World news feed to captioned poster generator")]
struct Cli {
    /// Emit a single JSON envelope to stdout; logs go to stderr
    #[arg(global = true, long, default_value_t = false)]
    json: bool,
    /// Ledger of already processed item links
    #[arg(global = true, long)]
    ledger: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    Run(run::RunCmd),
    Seen(seen::SeenCmd),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();
    telemetry::config::set_json_mode(cli.json);

    // initialize logging/tracing (stderr). Respect RUST_LOG and NEWSPOSTER_LOG_FORMAT
    telemetry::config::init_tracing();

    let mut cfg = config::AgentConfig::from_env()?;
    if let Some(path) = cli.ledger {
        cfg.ledger_path = path;
    }

    // bare `newsposter` behaves like `newsposter run`
    match cli.command.unwrap_or_else(|| Commands::Run(run::RunCmd::default())) {
        Commands::Run(args) => run::run(cfg, args).await?,
        Commands::Seen(args) => seen::run(&cfg, args)?,
    }

    Ok(())
}
