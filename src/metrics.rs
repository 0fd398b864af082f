//! Prometheus counters for roster writes, rendered at `/metrics`.

use once_cell::sync::Lazy;
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

use crate::error::RosterError;

/// Registry owned by this crate so tests and the HTTP handler see the same counters.
pub static REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);

static DRAFT_WRITES: Lazy<IntCounterVec> = Lazy::new(|| {
    register(IntCounterVec::new(
        Opts::new("quipboard_draft_writes_total", "Draft roster mutations"),
        &["op", "outcome"],
    ))
});

static BULK_OPS: Lazy<IntCounterVec> = Lazy::new(|| {
    register(IntCounterVec::new(
        Opts::new("quipboard_bulk_ops_total", "Publish / discard attempts"),
        &["op", "outcome"],
    ))
});

fn register(counter: prometheus::Result<IntCounterVec>) -> IntCounterVec {
    let counter = counter.expect("static counter definition");
    if let Err(e) = REGISTRY.register(Box::new(counter.clone())) {
        log::warn!("metric registration failed: {e}");
    }
    counter
}

fn outcome<T>(res: &Result<T, RosterError>) -> &'static str {
    match res {
        Ok(_) => "ok",
        Err(RosterError::Unauthorized) => "unauthorized",
        Err(RosterError::Conflict { .. }) => "conflict",
        Err(e) if e.is_not_found() => "not_found",
        Err(RosterError::StorageUnavailable { .. }) => "storage_error",
        Err(_) => "rejected",
    }
}

pub fn record_draft_write<T>(op: &str, res: &Result<T, RosterError>) {
    DRAFT_WRITES.with_label_values(&[op, outcome(res)]).inc();
}

pub fn record_bulk_op<T>(op: &str, res: &Result<T, RosterError>) {
    BULK_OPS.with_label_values(&[op, outcome(res)]).inc();
}

/// Current value of a draft-write counter.
pub fn draft_writes(op: &str, outcome: &str) -> u64 {
    DRAFT_WRITES.with_label_values(&[op, outcome]).get()
}

/// Text exposition of every registered metric.
pub fn render() -> String {
    let mut buf = Vec::new();
    if let Err(e) = TextEncoder::new().encode(&REGISTRY.gather(), &mut buf) {
        log::error!("encoding metrics failed: {e}");
    }
    String::from_utf8(buf).unwrap_or_default()
}
