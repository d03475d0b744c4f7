use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Run;

#[derive(Copy, Clone, Debug)]
pub enum Phase { LoadLedger, FetchFeed, Item, Caption, Poster, WriteOutputs, SaveLedger }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self {
        Phase::LoadLedger => "load_ledger",
        Phase::FetchFeed => "fetch_feed",
        Phase::Item => "item",
        Phase::Caption => "caption",
        Phase::Poster => "poster",
        Phase::WriteOutputs => "write_outputs",
        Phase::SaveLedger => "save_ledger",
    }}
    fn span(&self) -> Span { match self {
        Phase::LoadLedger => info_span!("load_ledger"),
        Phase::FetchFeed => info_span!("fetch_feed"),
        Phase::Item => info_span!("item"),
        Phase::Caption => info_span!("caption"),
        Phase::Poster => info_span!("poster"),
        Phase::WriteOutputs => info_span!("write_outputs"),
        Phase::SaveLedger => info_span!("save_ledger"),
    }}
}

impl OpMarker for Run {
    const NAME: &'static str = "run";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("run") }
}
