//! SPARQL UPDATE classification.
//!
//! [`parse`] is a pure function: text in, immutable [`Operation`] out. Only
//! the ground forms are accepted (`INSERT DATA`, `DELETE DATA`, and
//! `DELETE/INSERT ... WHERE` with ground templates); everything else is an
//! error, never an empty operation.

mod error;

use std::{fmt, sync::LazyLock};

pub use error::UpdateParseError;
use quadsync_domain::{Quad, Term};
use quadsync_observability::record_update_parse;
use regex::Regex;
use spargebra::{
    GraphUpdateOperation, Update,
    term::{GraphName, GraphNamePattern, NamedNodePattern},
};

/// `DELETE WHERE` after an optional prologue, with comments allowed between
/// the keywords. A comment runs to its newline, so keywords inside one never
/// match. spargebra desugars the form into the same tree as
/// `DELETE {..} WHERE {..}`, so it is detected on the text.
#[allow(clippy::expect_used)]
static DELETE_WHERE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\A\s*(?:(?:PREFIX\s+[^\s:]*:\s*<[^>]*>|BASE\s*<[^>]*>|#[^\n]*\n)\s*)*DELETE(?:\s|#[^\n]*\n)+WHERE\b",
    )
    .expect("DELETE WHERE pattern is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    /// `INSERT DATA`
    Insert,
    /// `DELETE DATA`
    Delete,
    /// `DELETE {..} INSERT {..} WHERE {..}` and its one-sided forms
    Modify,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Insert => "insert",
            Self::Delete => "delete",
            Self::Modify => "modify",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One parsed UPDATE request.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    kind: OperationKind,
    insert_triples: Vec<Quad>,
    delete_triples: Vec<Quad>,
    source_text: String,
}

impl Operation {
    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    pub fn insert_triples(&self) -> &[Quad] {
        &self.insert_triples
    }

    pub fn delete_triples(&self) -> &[Quad] {
        &self.delete_triples
    }

    /// The request text, replayed verbatim against the index.
    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    /// `(delete_triples, insert_triples, source_text)`
    pub fn into_parts(self) -> (Vec<Quad>, Vec<Quad>, String) {
        (self.delete_triples, self.insert_triples, self.source_text)
    }
}

/// Classify `text` and extract its ground triples.
///
/// Rejections are logged with the offending text.
pub fn parse(text: &str) -> Result<Operation, UpdateParseError> {
    match classify(text) {
        Ok(operation) => {
            record_update_parse(operation.kind.as_str(), "ok");
            tracing::trace!(
                kind = %operation.kind,
                inserts = operation.insert_triples.len(),
                deletes = operation.delete_triples.len(),
                "Parsed SPARQL UPDATE"
            );
            Ok(operation)
        }
        Err(error) => {
            record_update_parse(error.as_str(), "rejected");
            tracing::error!(error = %error, update = %text, "Rejected SPARQL UPDATE");
            Err(error)
        }
    }
}

fn classify(text: &str) -> Result<Operation, UpdateParseError> {
    let update = Update::parse(text, None).map_err(|e| UpdateParseError::Syntax {
        reason: e.to_string(),
    })?;

    let mut operations = update.operations;
    if operations.len() != 1 {
        return Err(UpdateParseError::OperationCount(operations.len()));
    }
    let Some(operation) = operations.pop() else {
        return Err(UpdateParseError::OperationCount(0));
    };

    let (kind, delete_triples, insert_triples) = match operation {
        GraphUpdateOperation::InsertData { data } => {
            let quads = data
                .iter()
                .map(|quad| {
                    Ok(Quad::new(
                        term(&quad.subject)?,
                        term(&quad.predicate)?,
                        term(&quad.object)?,
                        graph(&quad.graph_name)?,
                    ))
                })
                .collect::<Result<_, UpdateParseError>>()?;
            (OperationKind::Insert, Vec::new(), quads)
        }
        GraphUpdateOperation::DeleteData { data } => {
            let quads = data
                .iter()
                .map(|quad| {
                    Ok(Quad::new(
                        term(&quad.subject)?,
                        term(&quad.predicate)?,
                        term(&quad.object)?,
                        graph(&quad.graph_name)?,
                    ))
                })
                .collect::<Result<_, UpdateParseError>>()?;
            (OperationKind::Delete, quads, Vec::new())
        }
        GraphUpdateOperation::DeleteInsert { delete, insert, .. } => {
            if DELETE_WHERE.is_match(text) {
                return Err(UpdateParseError::UnsupportedPatternDelete);
            }
            let deletes = delete
                .iter()
                .map(|quad| {
                    Ok(Quad::new(
                        term(&quad.subject)?,
                        predicate(&quad.predicate)?,
                        term(&quad.object)?,
                        graph_pattern(&quad.graph_name)?,
                    ))
                })
                .collect::<Result<_, UpdateParseError>>()?;
            let inserts = insert
                .iter()
                .map(|quad| {
                    Ok(Quad::new(
                        term(&quad.subject)?,
                        predicate(&quad.predicate)?,
                        term(&quad.object)?,
                        graph_pattern(&quad.graph_name)?,
                    ))
                })
                .collect::<Result<_, UpdateParseError>>()?;
            (OperationKind::Modify, deletes, inserts)
        }
        GraphUpdateOperation::Load { .. } => {
            return Err(UpdateParseError::UnsupportedOperation("LOAD"));
        }
        GraphUpdateOperation::Clear { .. } => {
            return Err(UpdateParseError::UnsupportedOperation("CLEAR"));
        }
        GraphUpdateOperation::Create { .. } => {
            return Err(UpdateParseError::UnsupportedOperation("CREATE"));
        }
        GraphUpdateOperation::Drop { .. } => {
            return Err(UpdateParseError::UnsupportedOperation("DROP"));
        }
    };

    Ok(Operation {
        kind,
        insert_triples,
        delete_triples,
        source_text: text.to_string(),
    })
}

/// Any quad component, from its N-Triples rendering.
fn term(component: &impl fmt::Display) -> Result<Term, UpdateParseError> {
    let rendered = component.to_string();
    if rendered.starts_with('?') || rendered.starts_with('$') {
        return Err(UpdateParseError::NonGroundTemplate { variable: rendered });
    }
    rendered
        .parse::<Term>()
        .map_err(|e| UpdateParseError::UnsupportedTerm {
            reason: e.to_string(),
            term: rendered,
        })
}

fn predicate(pattern: &NamedNodePattern) -> Result<Term, UpdateParseError> {
    match pattern {
        NamedNodePattern::NamedNode(node) => Ok(Term::uri(node.as_str())),
        NamedNodePattern::Variable(variable) => Err(UpdateParseError::NonGroundTemplate {
            variable: variable.to_string(),
        }),
    }
}

fn graph(name: &GraphName) -> Result<Term, UpdateParseError> {
    match name {
        GraphName::NamedNode(node) => Ok(Term::uri(node.as_str())),
        GraphName::DefaultGraph => Ok(Term::default_graph()),
    }
}

fn graph_pattern(pattern: &GraphNamePattern) -> Result<Term, UpdateParseError> {
    match pattern {
        GraphNamePattern::NamedNode(node) => Ok(Term::uri(node.as_str())),
        GraphNamePattern::DefaultGraph => Ok(Term::default_graph()),
        GraphNamePattern::Variable(variable) => Err(UpdateParseError::NonGroundTemplate {
            variable: variable.to_string(),
        }),
    }
}
