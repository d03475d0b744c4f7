use anyhow::Result;
use serde::Serialize;
use std::marker::PhantomData;
use tracing::{info, debug, Span};

use super::emit::{self, Body, Meta};

pub trait PhaseSpan {
    fn name(&self) -> &'static str;
    fn span(&self) -> Span;
}

pub trait OpMarker {
    const NAME: &'static str;
    type Phase: PhaseSpan;
    fn root_span() -> Span;
}

pub struct LogCtx<O: OpMarker> {
    pub(crate) json: bool,
    pub(crate) _marker: PhantomData<O>,
}

impl<O: OpMarker> LogCtx<O> {
    fn op_name(&self) -> &'static str { O::NAME }

    pub fn root_span(&self) -> Span { O::root_span() }

    pub fn root_span_kv<'a, T>(&self, fields: T) -> Span
    where
        T: IntoIterator<Item = (&'a str, String)>,
    {
        let span = self.root_span();
        let details = kv_to_string(fields);
        if details.is_empty() {
            info!(op = %self.op_name(), "start");
        } else {
            info!(op = %self.op_name(), details = %details, "start");
        }
        span
    }

    pub fn span(&self, ph: &O::Phase) -> Span { ph.span() }

    pub fn span_kv<'a, T>(&self, ph: &O::Phase, fields: T) -> Span
    where
        T: IntoIterator<Item = (&'a str, String)>,
    {
        let span = self.span(ph);
        let details = kv_to_string(fields);
        if details.is_empty() {
            info!(op = %self.op_name(), phase = ph.name(), "span_start");
        } else {
            info!(op = %self.op_name(), phase = ph.name(), details = %details, "span_start");
        }
        span
    }

    pub fn info(&self, msg: impl AsRef<str>) { if self.json { info!(op = %self.op_name(), "{}", msg.as_ref()); } else { info!("{}", msg.as_ref()); } }
    pub fn debug(&self, msg: impl AsRef<str>) { if self.json { debug!(op = %self.op_name(), "{}", msg.as_ref()); } else { debug!("{}", msg.as_ref()); } }

    pub fn plan<T: Serialize>(&self, plan: &T) -> Result<()> { emit::print(self.op_name(), Body::Plan(plan), None) }
    pub fn result<T: Serialize>(&self, result: &T) -> Result<()> { emit::print(self.op_name(), Body::Result(result), None) }
    pub fn result_with_meta<T: Serialize>(&self, result: &T, meta: Meta) -> Result<()> { emit::print(self.op_name(), Body::Result(result), Some(meta)) }
}

// Run-specific helpers
impl LogCtx<crate::telemetry::ops::run::Run> {
    pub fn item_start(&self, index: usize, limit: usize, title: &str) {
        if self.json { info!(op = %self.op_name(), index, limit, title, "item_start"); }
        else { info!("📰 Processing new item {}/{}: {}", index, limit, title); }
    }

    pub fn totals(&self, fetched: usize, skipped_seen: usize, processed: usize, ledger_size: usize) {
        if self.json { info!(op = %self.op_name(), fetched, skipped_seen, processed, ledger_size, "run_totals"); }
        else { info!("📊 Run totals — fetched={} skipped_seen={} processed={} ledger={}", fetched, skipped_seen, processed, ledger_size); }
    }
}

fn kv_to_string<'a, T>(kv: T) -> String
where
    T: IntoIterator<Item = (&'a str, String)>,
{
    let mut parts: Vec<String> = Vec::new();
    for (k, v) in kv { parts.push(format!("{}={}", k, v)); }
    parts.join(" ")
}
