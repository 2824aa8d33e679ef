use std::fmt;

use oxigraph::model::{GraphName, Quad as OxQuad, Term as OxTerm};
use serde::{Deserialize, Serialize};

use crate::term::{Term, TermParseError};

/// One RDF statement in one named graph of a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Quad {
    pub subject: Term,
    pub predicate: Term,
    pub object: Term,
    pub graph: Term,
}

impl Quad {
    pub fn new(subject: Term, predicate: Term, object: Term, graph: Term) -> Self {
        Self {
            subject,
            predicate,
            object,
            graph,
        }
    }

    /// Quad in the SPARQL default graph.
    pub fn in_default_graph(subject: Term, predicate: Term, object: Term) -> Self {
        Self::new(subject, predicate, object, Term::default_graph())
    }

    /// Build a quad from its 4-tuple wire representation.
    pub fn from_wire<S: AsRef<str>>(parts: &[S]) -> Result<Self, TermParseError> {
        let [subject, predicate, object, graph] = parts else {
            return Err(TermParseError::Arity(parts.len()));
        };
        Ok(Self::new(
            subject.as_ref().parse()?,
            predicate.as_ref().parse()?,
            object.as_ref().parse()?,
            graph.as_ref().parse()?,
        ))
    }

    pub fn terms(&self) -> [&Term; 4] {
        [&self.subject, &self.predicate, &self.object, &self.graph]
    }

    /// The statement as an N-Triples line, without its graph.
    pub fn triple_line(&self) -> String {
        format!("{} {} {} .", self.subject, self.predicate, self.object)
    }
}

impl TryFrom<OxQuad> for Quad {
    type Error = TermParseError;

    fn try_from(quad: OxQuad) -> Result<Self, Self::Error> {
        let graph = match quad.graph_name {
            GraphName::NamedNode(node) => Term::uri(node.into_string()),
            GraphName::BlankNode(node) => Term::blank(node.into_string()),
            GraphName::DefaultGraph => Term::default_graph(),
        };
        Ok(Self::new(
            Term::try_from(OxTerm::from(quad.subject))?,
            Term::uri(quad.predicate.into_string()),
            Term::try_from(quad.object)?,
            graph,
        ))
    }
}

/// N-Quads line; default-graph quads omit the graph component.
impl fmt::Display for Quad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.graph.is_default_graph() {
            write!(f, "{} {} {} .", self.subject, self.predicate, self.object)
        } else {
            write!(
                f,
                "{} {} {} {} .",
                self.subject, self.predicate, self.object, self.graph
            )
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn from_wire_parses_all_term_forms() {
        let quad = Quad::from_wire(&[
            "http://example.org/a",
            "<http://example.org/p>",
            "\"1\"",
            "http://example.org/g",
        ])
        .unwrap();
        assert_eq!(quad.subject, Term::uri("http://example.org/a"));
        assert_eq!(quad.object, Term::literal("1"));
        assert_eq!(
            quad.to_string(),
            "<http://example.org/a> <http://example.org/p> \"1\" <http://example.org/g> ."
        );
    }

    #[test]
    fn from_wire_checks_arity() {
        assert_eq!(
            Quad::from_wire(&["a:b", "a:c", "a:d"]),
            Err(TermParseError::Arity(3))
        );
    }

    #[test]
    fn default_graph_is_omitted_from_display() {
        let quad = Quad::in_default_graph(
            Term::uri("http://example.org/a"),
            Term::uri("http://example.org/p"),
            Term::blank("b1"),
        );
        assert_eq!(
            quad.to_string(),
            "<http://example.org/a> <http://example.org/p> _:b1 ."
        );
    }
}
