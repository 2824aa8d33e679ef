use std::{
    collections::{HashMap, HashSet},
    time::Instant,
};

use quadsync_domain::{Term, TermId, TermKind};
use quadsync_observability::{
    record_ambiguous_term_match, record_numeric_fallback, record_term_resolution,
};
use sea_orm::{
    ActiveValue, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, prelude::Uuid, sea_query::OnConflict,
};

use crate::{
    config::NumericFallbackConfig,
    error::{RepositoryError, Result},
    models::term::{ActiveModel, Column, Entity, Model},
    observability::record_result,
    types::{AmbiguousTermMatch, NumericMatch},
};

/// Ids for a batch of terms, plus how many rows the batch had to create.
#[derive(Debug, Clone, Default)]
pub struct ResolvedTerms {
    pub ids: HashMap<Term, TermId>,
    pub created: usize,
}

/// Deduplicated storage of terms, keyed by `(dataset, id)`.
///
/// Methods take the connection explicitly so the same calls run on a pooled
/// connection or inside a [`crate::Transaction`].
#[derive(Clone)]
pub struct TermRepository {
    max_batch_rows: usize,
}

impl TermRepository {
    pub fn new(max_batch_rows: usize) -> Self {
        Self {
            max_batch_rows: max_batch_rows.max(1),
        }
    }

    /// Map every term to its id, inserting the ones not yet stored.
    ///
    /// Datatype IRIs of typed literals are stored as terms of their own.
    /// Costs one existence query and at most one insert per chunk of
    /// `max_batch_rows` terms.
    pub async fn resolve_or_create<C, I>(
        &self,
        db: &C,
        dataset: &str,
        terms: I,
    ) -> Result<ResolvedTerms>
    where
        C: ConnectionTrait,
        I: IntoIterator<Item = Term>,
    {
        let started = Instant::now();
        let result = self.resolve_or_create_inner(db, dataset, terms).await;
        record_result("term", "resolve_or_create", started, &result, |resolved| {
            Some(resolved.ids.len())
        });
        result
    }

    async fn resolve_or_create_inner<C, I>(
        &self,
        db: &C,
        dataset: &str,
        terms: I,
    ) -> Result<ResolvedTerms>
    where
        C: ConnectionTrait,
        I: IntoIterator<Item = Term>,
    {
        let mut requested: HashMap<TermId, Term> = HashMap::new();
        for term in terms {
            if let Some(datatype) = term.datatype_term() {
                requested.entry(datatype.id()).or_insert(datatype);
            }
            requested.entry(term.id()).or_insert(term);
        }
        if requested.is_empty() {
            return Ok(ResolvedTerms::default());
        }

        let ids: Vec<TermId> = requested.keys().copied().collect();
        let existing = self.existing_ids(db, dataset, &ids).await?;

        let missing: Vec<ActiveModel> = requested
            .iter()
            .filter(|(id, _)| !existing.contains(id))
            .map(|(id, term)| to_active_model(dataset, *id, term))
            .collect();
        let created = missing.len();

        let mut rows = missing.into_iter().peekable();
        while rows.peek().is_some() {
            let chunk: Vec<ActiveModel> = rows.by_ref().take(self.max_batch_rows).collect();
            let inserted = Entity::insert_many(chunk)
                .on_conflict(
                    OnConflict::columns([Column::Dataset, Column::Id])
                        // MySQL-compatible no-op upsert: a concurrent
                        // transaction may have created the same term.
                        .update_column(Column::Kind)
                        .to_owned(),
                )
                .exec_without_returning(db)
                .await;
            match inserted {
                Ok(_) | Err(DbErr::RecordNotInserted) => {}
                Err(error) => return Err(error.into()),
            }
        }

        record_term_resolution(requested.len() - created, created);
        tracing::trace!(
            dataset = %dataset,
            terms = requested.len(),
            created = created,
            "Resolved term ids"
        );

        let mut resolved = HashMap::with_capacity(requested.len());
        for (id, term) in requested {
            resolved.insert(term, id);
        }
        Ok(ResolvedTerms {
            ids: resolved,
            created,
        })
    }

    /// The subset of `ids` stored in `dataset`.
    pub async fn existing_ids<C: ConnectionTrait>(
        &self,
        db: &C,
        dataset: &str,
        ids: &[TermId],
    ) -> Result<HashSet<TermId>> {
        let started = Instant::now();
        let result = self.existing_ids_inner(db, dataset, ids).await;
        record_result("term", "existing_ids", started, &result, |found| {
            Some(found.len())
        });
        result
    }

    async fn existing_ids_inner<C: ConnectionTrait>(
        &self,
        db: &C,
        dataset: &str,
        ids: &[TermId],
    ) -> Result<HashSet<TermId>> {
        let mut found = HashSet::with_capacity(ids.len());
        for chunk in ids.chunks(self.max_batch_rows) {
            let uuids: Vec<Uuid> = chunk.iter().map(TermId::as_uuid).collect();
            let rows = Entity::find()
                .select_only()
                .column(Column::Id)
                .filter(Column::Dataset.eq(dataset))
                .filter(Column::Id.is_in(uuids))
                .into_tuple::<Uuid>()
                .all(db)
                .await?;
            found.extend(rows.into_iter().map(TermId::from));
        }
        Ok(found)
    }

    /// Reverse lookup from ids to terms. Unknown ids are absent from the map.
    pub async fn resolve_ids<C: ConnectionTrait>(
        &self,
        db: &C,
        dataset: &str,
        ids: &[TermId],
    ) -> Result<HashMap<TermId, Term>> {
        let started = Instant::now();
        let result = self.resolve_ids_inner(db, dataset, ids).await;
        record_result("term", "resolve_ids", started, &result, |terms| {
            Some(terms.len())
        });
        result
    }

    async fn resolve_ids_inner<C: ConnectionTrait>(
        &self,
        db: &C,
        dataset: &str,
        ids: &[TermId],
    ) -> Result<HashMap<TermId, Term>> {
        let rows = self.fetch_rows(db, dataset, ids).await?;

        let datatype_ids: Vec<TermId> = rows
            .iter()
            .filter_map(|row| row.datatype_id)
            .map(TermId::from)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let datatypes: HashMap<Uuid, String> = self
            .fetch_rows(db, dataset, &datatype_ids)
            .await?
            .into_iter()
            .map(|row| (row.id, row.text))
            .collect();

        rows.into_iter()
            .map(|row| {
                let id = TermId::from(row.id);
                to_term(row, &datatypes).map(|term| (id, term))
            })
            .collect()
    }

    async fn fetch_rows<C: ConnectionTrait>(
        &self,
        db: &C,
        dataset: &str,
        ids: &[TermId],
    ) -> Result<Vec<Model>> {
        let mut rows = Vec::with_capacity(ids.len());
        for chunk in ids.chunks(self.max_batch_rows) {
            let uuids: Vec<Uuid> = chunk.iter().map(TermId::as_uuid).collect();
            rows.extend(
                Entity::find()
                    .filter(Column::Dataset.eq(dataset))
                    .filter(Column::Id.is_in(uuids))
                    .all(db)
                    .await?,
            );
        }
        Ok(rows)
    }

    /// Find the stored literal a truncated float rendering refers to.
    ///
    /// Only `xsd:double`/`xsd:float` terms are looked up, and only against
    /// stored literals of the same datatype whose text extends `term`'s text
    /// minus its last character and is strictly longer than it. Several
    /// candidates within tolerance yield [`NumericMatch::Ambiguous`]; none is
    /// picked. So does a candidate scan cut short by `max_candidates`.
    pub async fn numeric_fallback<C: ConnectionTrait>(
        &self,
        db: &C,
        dataset: &str,
        term: &Term,
        config: &NumericFallbackConfig,
    ) -> Result<NumericMatch> {
        let started = Instant::now();
        let result = self.numeric_fallback_inner(db, dataset, term, config).await;
        record_result("term", "numeric_fallback", started, &result, |_| None);
        if let Ok(outcome) = &result {
            record_numeric_fallback(outcome.as_str());
        }
        result
    }

    async fn numeric_fallback_inner<C: ConnectionTrait>(
        &self,
        db: &C,
        dataset: &str,
        term: &Term,
        config: &NumericFallbackConfig,
    ) -> Result<NumericMatch> {
        let id = term.id();
        if !self.existing_ids(db, dataset, &[id]).await?.is_empty() {
            return Ok(NumericMatch::Exact(id));
        }

        let (Some(value), Some(prefix), Some(datatype)) =
            (term.float_value(), term.truncated_prefix(), term.datatype())
        else {
            return Ok(NumericMatch::NotFound);
        };

        // Float lexical forms hold no LIKE wildcards. `__%` asks for two or
        // more characters past the prefix.
        let rows = Entity::find()
            .filter(Column::Dataset.eq(dataset))
            .filter(Column::Kind.eq(TermKind::Literal.as_str()))
            .filter(Column::DatatypeId.eq(Term::uri(datatype).id().as_uuid()))
            .filter(Column::Text.like(format!("{prefix}__%")))
            .order_by_asc(Column::Text)
            .limit(config.max_candidates.saturating_add(1))
            .all(db)
            .await?;
        let capped = rows.len() as u64 > config.max_candidates;

        let mut candidates: Vec<(TermId, Term)> = Vec::new();
        for row in rows.into_iter().take(config.max_candidates as usize) {
            let Ok(stored_value) = row.text.trim().parse::<f64>() else {
                continue;
            };
            if !stored_value.is_finite()
                || relative_distance(value, stored_value) > config.tolerance
            {
                continue;
            }
            candidates.push((TermId::from(row.id), Term::typed_literal(row.text, datatype)));
        }

        if capped {
            tracing::warn!(
                dataset = %dataset,
                term = %term,
                limit = config.max_candidates,
                within_tolerance = candidates.len(),
                "Ambiguous numeric literal: candidate limit reached"
            );
            return Ok(ambiguous(dataset, term, candidates));
        }

        match candidates.len() {
            0 => Ok(NumericMatch::NotFound),
            1 => {
                let (id, stored) = candidates.remove(0);
                tracing::debug!(
                    dataset = %dataset,
                    requested = %term,
                    stored = %stored,
                    "Resolved truncated numeric literal to stored value"
                );
                Ok(NumericMatch::Approximate { id, stored })
            }
            count => {
                tracing::warn!(
                    dataset = %dataset,
                    term = %term,
                    candidates = count,
                    "Ambiguous numeric literal: several stored values within tolerance"
                );
                Ok(ambiguous(dataset, term, candidates))
            }
        }
    }
}

fn ambiguous(dataset: &str, term: &Term, candidates: Vec<(TermId, Term)>) -> NumericMatch {
    record_ambiguous_term_match(dataset, candidates.len());
    NumericMatch::Ambiguous(AmbiguousTermMatch {
        dataset: dataset.to_string(),
        term: term.clone(),
        candidates: candidates.into_iter().map(|(_, stored)| stored).collect(),
    })
}

fn to_active_model(dataset: &str, id: TermId, term: &Term) -> ActiveModel {
    ActiveModel {
        dataset: ActiveValue::Set(dataset.to_string()),
        id: ActiveValue::Set(id.as_uuid()),
        text: ActiveValue::Set(term.text().to_string()),
        kind: ActiveValue::Set(term.kind().as_str().to_string()),
        language: ActiveValue::Set(term.language().map(str::to_string)),
        datatype_id: ActiveValue::Set(term.datatype_term().map(|datatype| datatype.id().as_uuid())),
    }
}

fn to_term(row: Model, datatypes: &HashMap<Uuid, String>) -> Result<Term> {
    let kind: TermKind = row.kind.parse().map_err(|reason| RepositoryError::CorruptTerm {
        id: row.id.to_string(),
        reason,
    })?;
    let datatype = match row.datatype_id {
        None => None,
        Some(datatype_id) => Some(datatypes.get(&datatype_id).cloned().ok_or_else(|| {
            RepositoryError::CorruptTerm {
                id: row.id.to_string(),
                reason: format!("datatype term {datatype_id} is missing"),
            }
        })?),
    };
    Ok(Term::from_parts(kind, row.text, row.language, datatype))
}

/// `|a-b| / max(|a|,|b|)`; zero when both are zero.
fn relative_distance(a: f64, b: f64) -> f64 {
    let scale = a.abs().max(b.abs());
    if scale == 0.0 {
        0.0
    } else {
        (a - b).abs() / scale
    }
}
