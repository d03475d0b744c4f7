use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Seen;

#[derive(Copy, Clone, Debug)]
pub enum Phase { Plan, List, Clear }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self { Phase::Plan => "plan", Phase::List => "list", Phase::Clear => "clear" } }
    fn span(&self) -> Span { match self { Phase::Plan => info_span!("plan"), Phase::List => info_span!("list"), Phase::Clear => info_span!("clear") } }
}

impl OpMarker for Seen {
    const NAME: &'static str = "seen";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("seen") }
}
