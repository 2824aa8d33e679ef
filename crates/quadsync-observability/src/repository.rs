use std::time::Duration;

use metrics::{counter, gauge, histogram};

pub fn record_repository_query(
    repository: &str,
    method: &str,
    status: &str,
    duration: Duration,
    rows: Option<usize>,
) {
    counter!(
        "quadsync_repository_query_total",
        "repository" => repository.to_string(),
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    histogram!(
        "quadsync_repository_query_duration_seconds",
        "repository" => repository.to_string(),
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .record(duration.as_secs_f64());

    if let Some(rows) = rows {
        histogram!(
            "quadsync_repository_query_rows",
            "repository" => repository.to_string(),
            "method" => method.to_string(),
            "status" => status.to_string()
        )
        .record(rows as f64);
    }
}

/// Terms resolved in one batch, split by whether they had to be created.
pub fn record_term_resolution(existing: usize, created: usize) {
    counter!("quadsync_term_resolved_total", "outcome" => "existing").increment(existing as u64);
    counter!("quadsync_term_resolved_total", "outcome" => "created").increment(created as u64);
}

/// `outcome` is one of `exact`, `approximate`, `ambiguous`, `not_found`.
pub fn record_numeric_fallback(outcome: &str) {
    counter!(
        "quadsync_numeric_fallback_total",
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

/// Float-precision fallback found several candidates and refused to pick one.
pub fn record_ambiguous_term_match(dataset: &str, candidates: usize) {
    counter!(
        "quadsync_ambiguous_term_match_total",
        "dataset" => dataset.to_string()
    )
    .increment(1);
    histogram!("quadsync_ambiguous_term_match_candidates").record(candidates as f64);
}

/// `outcome` is one of `committed`, `rolled_back`, `dropped`, `commit_failed`,
/// `rollback_failed`.
pub fn record_transaction_outcome(outcome: &str, lifetime: Duration) {
    counter!(
        "quadsync_transaction_total",
        "outcome" => outcome.to_string()
    )
    .increment(1);
    histogram!(
        "quadsync_transaction_lifetime_seconds",
        "outcome" => outcome.to_string()
    )
    .record(lifetime.as_secs_f64());
}

pub fn record_transaction_open_delta(delta: f64) {
    gauge!("quadsync_transaction_open").increment(delta);
}
