use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
    time::Instant,
};

use quadsync_domain::{Quad, Term, TermId};
use sea_orm::{
    ActiveValue, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, prelude::Uuid, sea_query::OnConflict,
};

use crate::{
    config::NumericFallbackConfig,
    error::{RepositoryError, Result},
    models::quad::{ActiveModel, Column, Entity, Model},
    observability::record_result,
    repositories::term_repository::TermRepository,
    transaction::Transaction,
    types::{InsertReport, NumericMatch, RemoveReport},
};

/// Quad rows keyed by `(dataset, subject, predicate, object, context)`.
///
/// Writes require a [`Transaction`]; reads use the pool.
#[derive(Clone)]
pub struct QuadRepository {
    conn: Arc<DatabaseConnection>,
    terms: TermRepository,
    max_batch_rows: usize,
}

impl QuadRepository {
    pub fn new(conn: Arc<DatabaseConnection>, terms: TermRepository, max_batch_rows: usize) -> Self {
        Self {
            conn,
            terms,
            max_batch_rows: max_batch_rows.max(1),
        }
    }

    /// Store `quads`, creating their terms as needed. Already-present quads
    /// are left untouched.
    pub async fn insert_batch(
        &self,
        tx: &Transaction,
        dataset: &str,
        quads: &[Quad],
    ) -> Result<InsertReport> {
        let started = Instant::now();
        let result = self.insert_batch_inner(tx, dataset, quads).await;
        record_result("quad", "insert_batch", started, &result, |report| {
            Some(report.quads)
        });
        result
    }

    async fn insert_batch_inner(
        &self,
        tx: &Transaction,
        dataset: &str,
        quads: &[Quad],
    ) -> Result<InsertReport> {
        tx.ensure_dataset(dataset)?;
        let quads = distinct(quads);
        if quads.is_empty() {
            return Ok(InsertReport::default());
        }

        let db = tx.connection();
        let resolved = self
            .terms
            .resolve_or_create(
                db,
                dataset,
                quads.iter().flat_map(|quad| quad.terms()).cloned(),
            )
            .await?;

        let id_of = |term: &Term| -> Result<TermId> {
            resolved
                .ids
                .get(term)
                .copied()
                .ok_or_else(|| RepositoryError::TermResolution {
                    dataset: dataset.to_string(),
                    term: term.to_string(),
                })
        };

        let mut models = Vec::with_capacity(quads.len());
        for quad in &quads {
            models.push(ActiveModel {
                dataset: ActiveValue::Set(dataset.to_string()),
                subject_id: ActiveValue::Set(id_of(&quad.subject)?.as_uuid()),
                predicate_id: ActiveValue::Set(id_of(&quad.predicate)?.as_uuid()),
                object_id: ActiveValue::Set(id_of(&quad.object)?.as_uuid()),
                context_id: ActiveValue::Set(id_of(&quad.graph)?.as_uuid()),
            });
        }

        let mut rows = models.into_iter().peekable();
        while rows.peek().is_some() {
            let chunk: Vec<ActiveModel> = rows.by_ref().take(self.max_batch_rows).collect();
            let inserted = Entity::insert_many(chunk)
                .on_conflict(
                    OnConflict::columns([
                        Column::Dataset,
                        Column::SubjectId,
                        Column::PredicateId,
                        Column::ObjectId,
                        Column::ContextId,
                    ])
                    // MySQL-compatible no-op upsert; duplicates are idempotent.
                    .update_column(Column::Dataset)
                    .to_owned(),
                )
                .exec_without_returning(db)
                .await;
            match inserted {
                Ok(_) | Err(DbErr::RecordNotInserted) => {}
                Err(error) => return Err(error.into()),
            }
        }

        tracing::debug!(
            dataset = %dataset,
            quads = quads.len(),
            terms_created = resolved.created,
            "Inserted quad batch"
        );

        Ok(InsertReport {
            quads: quads.len(),
            terms_created: resolved.created,
        })
    }

    /// Delete `quads`. Absent quads are ignored.
    ///
    /// A numeric literal with no exact stored match goes through the
    /// float-precision fallback. Quads whose operand stays ambiguous are not
    /// deleted and are listed in the report.
    pub async fn remove_batch(
        &self,
        tx: &Transaction,
        dataset: &str,
        quads: &[Quad],
        fallback: &NumericFallbackConfig,
    ) -> Result<RemoveReport> {
        let started = Instant::now();
        let result = self.remove_batch_inner(tx, dataset, quads, fallback).await;
        record_result("quad", "remove_batch", started, &result, |report| {
            Some(report.removed as usize)
        });
        result
    }

    async fn remove_batch_inner(
        &self,
        tx: &Transaction,
        dataset: &str,
        quads: &[Quad],
        fallback: &NumericFallbackConfig,
    ) -> Result<RemoveReport> {
        tx.ensure_dataset(dataset)?;
        let quads = distinct(quads);
        let mut report = RemoveReport::default();
        if quads.is_empty() {
            return Ok(report);
        }

        let db = tx.connection();
        let terms: HashSet<&Term> = quads.iter().flat_map(|quad| quad.terms()).collect();
        let ids: Vec<TermId> = terms.iter().map(|term| term.id()).collect();
        let existing = self.terms.existing_ids(db, dataset, &ids).await?;

        // Stored id per operand; `None` means no stored row can match.
        let mut resolved: HashMap<&Term, Option<TermId>> = HashMap::with_capacity(terms.len());
        for term in terms {
            let id = term.id();
            if existing.contains(&id) {
                resolved.insert(term, Some(id));
                continue;
            }
            if !fallback.enabled || term.float_value().is_none() {
                resolved.insert(term, None);
                continue;
            }
            let substitute = match self
                .terms
                .numeric_fallback(db, dataset, term, fallback)
                .await?
            {
                NumericMatch::Exact(id) => Some(id),
                NumericMatch::Approximate { id, stored } => {
                    report.substitutions.push((term.clone(), stored));
                    Some(id)
                }
                NumericMatch::Ambiguous(ambiguous) => {
                    report.ambiguous.push(ambiguous);
                    None
                }
                NumericMatch::NotFound => None,
            };
            resolved.insert(term, substitute);
        }

        let mut keys = Vec::with_capacity(quads.len());
        for quad in &quads {
            let lookup = |term: &Term| resolved.get(term).copied().flatten();
            if let (Some(subject), Some(predicate), Some(object), Some(context)) = (
                lookup(&quad.subject),
                lookup(&quad.predicate),
                lookup(&quad.object),
                lookup(&quad.graph),
            ) {
                keys.push([subject, predicate, object, context]);
            }
        }

        for chunk in keys.chunks(self.max_batch_rows) {
            let mut condition = Condition::any();
            for [subject, predicate, object, context] in chunk {
                condition = condition.add(
                    Condition::all()
                        .add(Column::SubjectId.eq(subject.as_uuid()))
                        .add(Column::PredicateId.eq(predicate.as_uuid()))
                        .add(Column::ObjectId.eq(object.as_uuid()))
                        .add(Column::ContextId.eq(context.as_uuid())),
                );
            }
            let deleted = Entity::delete_many()
                .filter(Column::Dataset.eq(dataset))
                .filter(condition)
                .exec(db)
                .await?;
            report.removed += deleted.rows_affected;
        }

        tracing::debug!(
            dataset = %dataset,
            requested = quads.len(),
            removed = report.removed,
            substituted = report.substitutions.len(),
            ambiguous = report.ambiguous.len(),
            "Removed quad batch"
        );

        Ok(report)
    }

    /// Number of quads in `dataset`, optionally restricted to one graph.
    pub async fn count(&self, dataset: &str, graph: Option<&Term>) -> Result<u64> {
        let started = Instant::now();
        let mut query = Entity::find().filter(Column::Dataset.eq(dataset));
        if let Some(graph) = graph {
            query = query.filter(Column::ContextId.eq(graph.id().as_uuid()));
        }
        let result = query
            .count(self.conn.as_ref())
            .await
            .map_err(RepositoryError::from);
        record_result("quad", "count", started, &result, |count| {
            Some(*count as usize)
        });
        result
    }

    /// All quads of one graph, with their terms resolved.
    pub async fn quads_in_graph(&self, dataset: &str, graph: &Term) -> Result<Vec<Quad>> {
        let started = Instant::now();
        let result = self.quads_in_graph_inner(dataset, graph).await;
        record_result("quad", "quads_in_graph", started, &result, |quads| {
            Some(quads.len())
        });
        result
    }

    async fn quads_in_graph_inner(&self, dataset: &str, graph: &Term) -> Result<Vec<Quad>> {
        let rows = Entity::find()
            .filter(Column::Dataset.eq(dataset))
            .filter(Column::ContextId.eq(graph.id().as_uuid()))
            .all(self.conn.as_ref())
            .await?;
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<TermId> = rows
            .iter()
            .flat_map(|row| [row.subject_id, row.predicate_id, row.object_id, row.context_id])
            .map(TermId::from)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let terms = self
            .terms
            .resolve_ids(self.conn.as_ref(), dataset, &ids)
            .await?;

        rows.into_iter().map(|row| to_quad(row, &terms)).collect()
    }
}

fn to_quad(row: Model, terms: &HashMap<TermId, Term>) -> Result<Quad> {
    let term = |id: Uuid| {
        let id = TermId::from(id);
        terms
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::CorruptTerm {
                id: id.to_string(),
                reason: "referenced by a quad but not stored".to_string(),
            })
    };
    Ok(Quad::new(
        term(row.subject_id)?,
        term(row.predicate_id)?,
        term(row.object_id)?,
        term(row.context_id)?,
    ))
}

/// Input order preserved, duplicates dropped.
fn distinct(quads: &[Quad]) -> Vec<&Quad> {
    let mut seen = HashSet::with_capacity(quads.len());
    quads.iter().filter(|quad| seen.insert(*quad)).collect()
}
