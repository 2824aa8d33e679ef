use std::time::Duration;

use quadsync_observability as observability;

use crate::error::IndexError;

pub(crate) fn record_backend_query_bytes_total(backend: &str, op: &str, bytes: usize) {
    observability::record_index_backend_query_bytes_total(backend, op, bytes);
}

pub(crate) fn record_backend_permit_wait(backend: &str, op: &str, wait: Duration) {
    observability::record_index_backend_permit_wait(backend, op, wait);
}

pub(crate) fn record_backend_permit_snapshot(backend: &str, max: usize, available: usize) {
    observability::record_index_backend_permit_snapshot(backend, max, available);
}

pub(crate) fn record_backend_operation(
    backend: &str,
    op: &str,
    error: Option<&IndexError>,
    duration: Duration,
) {
    let status = if error.is_some() { "error" } else { "ok" };
    let error_class = error.map_or("none", classify_error);

    observability::record_index_backend_operation(backend, op, status, error_class, duration);
}

pub(crate) fn record_sync(dataset: &str, kind: &str, error: Option<&IndexError>, duration: Duration) {
    let status = if error.is_some() { "error" } else { "ok" };
    observability::record_index_sync(dataset, kind, status, duration);
    if error.is_some() {
        observability::record_index_sync_lag(dataset);
    }
}

pub(crate) fn record_blank_node_quads(dataset: &str, kind: &str, quads: usize) {
    observability::record_index_blank_node_quads(dataset, kind, quads);
}

pub(crate) fn classify_error(error: &IndexError) -> &'static str {
    match error {
        IndexError::SemaphoreClosed => "semaphore_closed",
        IndexError::Http(_) => "http",
        IndexError::Io(_) => "io",
        IndexError::Backend { status, .. } if *status >= 500 => "backend_5xx",
        IndexError::Backend { status, .. } if *status >= 400 => "backend_4xx",
        IndexError::Backend { .. } => "backend_other",
        IndexError::ConnectionFailed { .. } => "connection_failed",
        IndexError::ParseError { .. } => "parse_error",
        IndexError::InvalidQuery { .. } => "invalid_query",
        IndexError::Store(_) => "store",
    }
}
