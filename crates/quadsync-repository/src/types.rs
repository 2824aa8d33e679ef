use quadsync_domain::{Term, TermId};

/// Several stored literals lie within tolerance of a truncated numeric value.
///
/// There is no rule to pick one, so the operand is left unresolved and the
/// match is reported instead.
#[derive(Debug, Clone, PartialEq)]
pub struct AmbiguousTermMatch {
    pub dataset: String,
    pub term: Term,
    pub candidates: Vec<Term>,
}

/// Outcome of the float-precision fallback lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum NumericMatch {
    /// The term itself is stored.
    Exact(TermId),
    /// Exactly one stored literal is within tolerance.
    Approximate { id: TermId, stored: Term },
    Ambiguous(AmbiguousTermMatch),
    NotFound,
}

impl NumericMatch {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exact(_) => "exact",
            Self::Approximate { .. } => "approximate",
            Self::Ambiguous(_) => "ambiguous",
            Self::NotFound => "not_found",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InsertReport {
    /// Distinct quads written (already-present quads included).
    pub quads: usize,
    /// Term rows that did not exist before this batch.
    pub terms_created: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RemoveReport {
    /// Rows actually deleted; absent quads do not count.
    pub removed: u64,
    /// `(requested, stored)` operands resolved through the numeric fallback.
    pub substitutions: Vec<(Term, Term)>,
    pub ambiguous: Vec<AmbiguousTermMatch>,
}
