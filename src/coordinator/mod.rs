//! Dual-write coordination.
//!
//! Every write lands in the relational quad store inside one transaction and
//! is then propagated to the SPARQL index. The relational store is
//! authoritative: once it has committed, the write stands whatever happens on
//! the index side.

mod error;
mod outcome;
mod transaction;

use std::{collections::HashMap, sync::Arc, time::Instant};

pub use error::{DualWriteError, Result};
pub use outcome::{IndexSyncStatus, WriteOutcome};
use quadsync_domain::{Quad, Term};
use quadsync_index::{IndexSyncAdapter, IndexWrite};
use quadsync_observability::{record_dual_write, record_dual_write_quads};
use quadsync_repository::{
    AmbiguousTermMatch, NumericFallbackConfig, QuadRepository, RepositoryManager, Transaction,
    TransactionManager,
};
pub use transaction::WriteTransaction;

use crate::update_parser;

/// What the index receives for a write.
enum IndexPlan {
    /// `DELETE DATA`/`INSERT DATA` generated from the applied quads.
    Data,
    /// The UPDATE text as the caller sent it.
    Verbatim(String),
}

struct WritePlan<'a> {
    op: &'static str,
    deletes: &'a [Quad],
    inserts: &'a [Quad],
    index: IndexPlan,
}

#[derive(Default)]
struct Applied {
    inserted: usize,
    removed: u64,
    ambiguous: Vec<AmbiguousTermMatch>,
    substitutions: Vec<(Term, Term)>,
}

#[derive(Clone)]
pub struct DualWriteCoordinator {
    transactions: TransactionManager,
    quads: QuadRepository,
    numeric_fallback: NumericFallbackConfig,
    index: Arc<IndexSyncAdapter>,
}

impl DualWriteCoordinator {
    pub fn new(repository: &RepositoryManager, index: Arc<IndexSyncAdapter>) -> Self {
        Self {
            transactions: repository.transaction_manager(),
            quads: repository.quad_repository(),
            numeric_fallback: *repository.numeric_fallback(),
            index,
        }
    }

    pub fn index(&self) -> &IndexSyncAdapter {
        &self.index
    }

    /// Insert quads. Re-inserting stored quads is a no-op.
    ///
    /// With `tx` the quads are written under the caller's transaction and the
    /// index write is queued on it; otherwise the write is committed and
    /// synced before returning.
    pub async fn add_quads(
        &self,
        dataset: &str,
        quads: &[Quad],
        tx: Option<&mut WriteTransaction>,
    ) -> Result<WriteOutcome> {
        let plan = WritePlan {
            op: "add_quads",
            deletes: &[],
            inserts: quads,
            index: IndexPlan::Data,
        };
        self.write(dataset, plan, tx).await
    }

    /// Delete quads. Absent quads are ignored.
    pub async fn remove_quads(
        &self,
        dataset: &str,
        quads: &[Quad],
        tx: Option<&mut WriteTransaction>,
    ) -> Result<WriteOutcome> {
        let plan = WritePlan {
            op: "remove_quads",
            deletes: quads,
            inserts: &[],
            index: IndexPlan::Data,
        };
        self.write(dataset, plan, tx).await
    }

    /// Apply one SPARQL UPDATE: its delete triples are removed, then its
    /// insert triples are added, in the same transaction. The index receives
    /// the text unchanged.
    pub async fn execute_update(
        &self,
        dataset: &str,
        update: &str,
        tx: Option<&mut WriteTransaction>,
    ) -> Result<WriteOutcome> {
        let started = Instant::now();
        let operation = match update_parser::parse(update) {
            Ok(operation) => operation,
            Err(error) => {
                let ownership = if tx.is_some() { "caller" } else { "owned" };
                let error = DualWriteError::from(error);
                record_dual_write("execute_update", ownership, error.as_str(), started.elapsed());
                return Err(error);
            }
        };
        let kind = operation.kind();
        let (deletes, inserts, text) = operation.into_parts();
        tracing::debug!(
            dataset = %dataset,
            kind = %kind,
            deletes = deletes.len(),
            inserts = inserts.len(),
            "Executing SPARQL UPDATE"
        );

        let plan = WritePlan {
            op: "execute_update",
            deletes: &deletes,
            inserts: &inserts,
            index: IndexPlan::Verbatim(text),
        };
        self.write(dataset, plan, tx).await
    }

    /// Start a caller-owned transaction bound to `dataset`.
    pub async fn begin_transaction(&self, dataset: &str) -> Result<WriteTransaction> {
        let tx = self.transactions.begin(dataset).await?;
        Ok(WriteTransaction::new(tx))
    }

    /// Commit the authoritative side, then replay the queued index writes in
    /// the order they were made.
    pub async fn commit_transaction(&self, tx: WriteTransaction) -> Result<IndexSyncStatus> {
        let WriteTransaction { inner, pending } = tx;
        let dataset = inner.dataset().to_string();
        inner.commit().await?;
        Ok(self.sync(&dataset, &pending).await)
    }

    /// Roll back the authoritative side and discard the queued index writes.
    pub async fn rollback_transaction(&self, tx: WriteTransaction) -> Result<()> {
        let WriteTransaction { inner, pending } = tx;
        if !pending.is_empty() {
            tracing::debug!(
                dataset = %inner.dataset(),
                discarded = pending.len(),
                "Discarding queued index writes"
            );
        }
        inner.rollback().await?;
        Ok(())
    }

    /// Quads stored in `dataset`, optionally in one graph only.
    pub async fn count_quads(&self, dataset: &str, graph: Option<&Term>) -> Result<u64> {
        Ok(self.quads.count(dataset, graph).await?)
    }

    pub async fn graph_quads(&self, dataset: &str, graph: &Term) -> Result<Vec<Quad>> {
        Ok(self.quads.quads_in_graph(dataset, graph).await?)
    }

    async fn write(
        &self,
        dataset: &str,
        plan: WritePlan<'_>,
        tx: Option<&mut WriteTransaction>,
    ) -> Result<WriteOutcome> {
        let started = Instant::now();
        let op = plan.op;
        let ownership = if tx.is_some() { "caller" } else { "owned" };
        record_dual_write_quads(op, plan.deletes.len() + plan.inserts.len());

        let result = match tx {
            Some(tx) => self.write_in(tx, dataset, plan).await,
            None => self.write_owned(dataset, plan).await,
        };

        let status = match &result {
            Ok(outcome) => outcome.index.as_str(),
            Err(error) => error.as_str(),
        };
        record_dual_write(op, ownership, status, started.elapsed());
        result
    }

    async fn write_owned(&self, dataset: &str, plan: WritePlan<'_>) -> Result<WriteOutcome> {
        let tx = self.transactions.begin(dataset).await?;

        let applied = match self.apply_authoritative(&tx, dataset, &plan).await {
            Ok(applied) => applied,
            Err(error) => {
                tracing::error!(
                    dataset = %dataset,
                    op = plan.op,
                    error = %error,
                    "Authoritative write failed; rolling back"
                );
                if let Err(rollback_error) = tx.rollback().await {
                    tracing::warn!(
                        dataset = %dataset,
                        error = %rollback_error,
                        "Rollback after failed write also failed"
                    );
                }
                return Err(error);
            }
        };
        tx.commit().await?;

        let writes = index_writes(&plan, &applied);
        let index = self.sync(dataset, &writes).await;
        Ok(applied.into_outcome(index))
    }

    async fn write_in(
        &self,
        tx: &mut WriteTransaction,
        dataset: &str,
        plan: WritePlan<'_>,
    ) -> Result<WriteOutcome> {
        let applied = self.apply_authoritative(&tx.inner, dataset, &plan).await?;
        tx.pending.extend(index_writes(&plan, &applied));
        Ok(applied.into_outcome(IndexSyncStatus::Deferred))
    }

    async fn apply_authoritative(
        &self,
        tx: &Transaction,
        dataset: &str,
        plan: &WritePlan<'_>,
    ) -> Result<Applied> {
        tx.ensure_dataset(dataset)?;
        let mut applied = Applied::default();

        if !plan.deletes.is_empty() {
            let report = self
                .quads
                .remove_batch(tx, dataset, plan.deletes, &self.numeric_fallback)
                .await?;
            applied.removed = report.removed;
            applied.ambiguous = report.ambiguous;
            applied.substitutions = report.substitutions;
        }
        if !plan.inserts.is_empty() {
            let report = self.quads.insert_batch(tx, dataset, plan.inserts).await?;
            applied.inserted = report.quads;
        }

        Ok(applied)
    }

    /// Send writes in order. Stops at the first failure: later writes may
    /// depend on it.
    async fn sync(&self, dataset: &str, writes: &[IndexWrite]) -> IndexSyncStatus {
        if !self.index.is_enabled() {
            return IndexSyncStatus::Skipped;
        }

        let mut sent = false;
        for write in writes {
            match self.index.apply(dataset, write).await {
                Ok(applied) => sent |= applied,
                Err(error) => return IndexSyncStatus::Failed(error.to_string()),
            }
        }

        if sent {
            IndexSyncStatus::Synced
        } else {
            IndexSyncStatus::Skipped
        }
    }
}

impl Applied {
    fn into_outcome(self, index: IndexSyncStatus) -> WriteOutcome {
        WriteOutcome {
            inserted: self.inserted,
            removed: self.removed,
            ambiguous_matches: self.ambiguous,
            index,
        }
    }
}

fn index_writes(plan: &WritePlan<'_>, applied: &Applied) -> Vec<IndexWrite> {
    match &plan.index {
        IndexPlan::Verbatim(text) => vec![IndexWrite::Update(text.clone())],
        IndexPlan::Data => {
            let mut writes = Vec::with_capacity(2);
            if !plan.deletes.is_empty() {
                writes.push(IndexWrite::Delete(substitute(
                    plan.deletes,
                    &applied.substitutions,
                )));
            }
            if !plan.inserts.is_empty() {
                writes.push(IndexWrite::Insert(plan.inserts.to_vec()));
            }
            writes
        }
    }
}

/// Deletes name the stored value the fallback matched, so the index drops
/// the same literal the authoritative store did.
fn substitute(quads: &[Quad], substitutions: &[(Term, Term)]) -> Vec<Quad> {
    if substitutions.is_empty() {
        return quads.to_vec();
    }
    let stored: HashMap<&Term, &Term> = substitutions
        .iter()
        .map(|(requested, stored)| (requested, stored))
        .collect();
    let swap = |term: &Term| stored.get(term).map_or_else(|| term.clone(), |s| (*s).clone());
    quads
        .iter()
        .map(|quad| {
            Quad::new(
                swap(&quad.subject),
                swap(&quad.predicate),
                swap(&quad.object),
                swap(&quad.graph),
            )
        })
        .collect()
}
