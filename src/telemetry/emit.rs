use anyhow::Result;
use serde::Serialize;
use std::io::{self, Write};
use std::time::Instant;
use uuid::Uuid;

#[derive(Debug, Default, Serialize)]
pub struct Meta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u128>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<Uuid>,
}

impl Meta {
    /// Wall time since `started`, tagged with the run id.
    pub fn since(started: Instant, run_id: Uuid) -> Self {
        Self { duration_ms: Some(started.elapsed().as_millis()), run_id: Some(run_id) }
    }
}

/// Payload of an envelope: `plan` for dry runs, `result` once applied.
#[derive(Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Body<'a, T: Serialize> {
    Plan(&'a T),
    Result(&'a T),
}

impl<T: Serialize> Body<'_, T> {
    fn applied(&self) -> bool { matches!(self, Body::Result(_)) }
}

#[derive(Serialize)]
struct Envelope<'a, T: Serialize> {
    op: &'a str,
    apply: bool,
    #[serde(flatten)]
    body: Body<'a, T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    meta: Option<Meta>,
}

/// One JSON line: `{"op", "apply", "plan"|"result", "meta"?}`.
pub fn write_envelope<W: Write, T: Serialize>(out: &mut W, op: &str, body: Body<'_, T>, meta: Option<Meta>) -> Result<()> {
    let env = Envelope { op, apply: body.applied(), body, meta };
    serde_json::to_writer(&mut *out, &env)?;
    writeln!(out)?;
    Ok(())
}

pub fn print<T: Serialize>(op: &str, body: Body<'_, T>, meta: Option<Meta>) -> Result<()> {
    write_envelope(&mut io::stdout().lock(), op, body, meta)
}
