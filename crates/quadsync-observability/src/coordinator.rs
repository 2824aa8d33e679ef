use std::time::Duration;

use metrics::{counter, histogram};

/// `op` is `add_quads`, `remove_quads` or `execute_update`; `ownership` is
/// `owned` or `caller`.
pub fn record_dual_write(op: &str, ownership: &str, status: &str, duration: Duration) {
    counter!(
        "quadsync_dual_write_total",
        "op" => op.to_string(),
        "ownership" => ownership.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!(
        "quadsync_dual_write_duration_seconds",
        "op" => op.to_string(),
        "status" => status.to_string()
    )
    .record(duration.as_secs_f64());
}

pub fn record_dual_write_quads(op: &str, quads: usize) {
    histogram!(
        "quadsync_dual_write_quads",
        "op" => op.to_string()
    )
    .record(quads as f64);
}

/// `kind` is the operation kind, or the rejection reason on failure.
pub fn record_update_parse(kind: &str, status: &str) {
    counter!(
        "quadsync_update_parse_total",
        "kind" => kind.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}
