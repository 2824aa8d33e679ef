use std::time::Duration;

use metrics::{counter, gauge, histogram};

pub fn record_index_backend_operation(
    backend: &str,
    op: &str,
    status: &str,
    error_class: &str,
    duration: Duration,
) {
    counter!(
        "quadsync_index_backend_operation_total",
        "backend" => backend.to_string(),
        "op" => op.to_string(),
        "status" => status.to_string(),
        "error_class" => error_class.to_string()
    )
    .increment(1);
    histogram!(
        "quadsync_index_backend_operation_duration_seconds",
        "backend" => backend.to_string(),
        "op" => op.to_string(),
        "status" => status.to_string()
    )
    .record(duration.as_secs_f64());
}

pub fn record_index_backend_query_bytes_total(backend: &str, op: &str, bytes: usize) {
    counter!(
        "quadsync_index_backend_query_bytes_total",
        "backend" => backend.to_string(),
        "op" => op.to_string()
    )
    .increment(bytes as u64);
}

pub fn record_index_backend_permit_wait(backend: &str, op: &str, wait: Duration) {
    histogram!(
        "quadsync_index_backend_permit_wait_seconds",
        "backend" => backend.to_string(),
        "op" => op.to_string()
    )
    .record(wait.as_secs_f64());
}

pub fn record_index_backend_permit_snapshot(backend: &str, max: usize, available: usize) {
    gauge!(
        "quadsync_index_backend_permits_in_use",
        "backend" => backend.to_string()
    )
    .set(max.saturating_sub(available) as f64);
}

/// One attempt to propagate an authoritative write to the index.
///
/// `kind` is `insert`, `delete` or `update`.
pub fn record_index_sync(dataset: &str, kind: &str, status: &str, duration: Duration) {
    counter!(
        "quadsync_index_sync_total",
        "dataset" => dataset.to_string(),
        "kind" => kind.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!(
        "quadsync_index_sync_duration_seconds",
        "kind" => kind.to_string(),
        "status" => status.to_string()
    )
    .record(duration.as_secs_f64());
}

/// Writes accepted by the authoritative store that never reached the index.
pub fn record_index_sync_lag(dataset: &str) {
    counter!(
        "quadsync_index_sync_lag_total",
        "dataset" => dataset.to_string()
    )
    .increment(1);
}

/// Quads with blank nodes sent to (`insert`) or withheld from (`delete`) the
/// index. Either way the index drifts from the authoritative store.
pub fn record_index_blank_node_quads(dataset: &str, kind: &str, quads: usize) {
    counter!(
        "quadsync_index_blank_node_quads_total",
        "dataset" => dataset.to_string(),
        "kind" => kind.to_string()
    )
    .increment(quads as u64);
}
