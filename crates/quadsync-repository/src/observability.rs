use std::time::Instant;

use quadsync_observability::record_repository_query;

/// Records one repository call from its result.
pub(crate) fn record_result<T, E>(
    repository: &str,
    method: &str,
    started: Instant,
    result: &Result<T, E>,
    rows: impl FnOnce(&T) -> Option<usize>,
) {
    match result {
        Ok(value) => record_repository_query(
            repository,
            method,
            "ok",
            started.elapsed(),
            rows(value),
        ),
        Err(_) => record_repository_query(repository, method, "error", started.elapsed(), None),
    }
}
