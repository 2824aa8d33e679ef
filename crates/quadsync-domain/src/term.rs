use std::{fmt, str::FromStr};

use oxigraph::model::{BlankNode, Literal, NamedNode, Term as OxTerm};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::vocab::{self, rdf, xsd};

/// Namespace for term id derivation. Changing it re-keys every stored term.
const TERM_ID_NAMESPACE: Uuid = Uuid::from_u128(0x5c1e_0d7a_93b4_4f21_8a6e_2f90_c4d3_b817);

const FIELD_SEPARATOR: u8 = 0x1f;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TermParseError {
    #[error("Empty term")]
    Empty,

    #[error("Invalid term '{input}': {reason}")]
    Invalid { input: String, reason: String },

    #[error("Unsupported term '{0}': only IRIs, blank nodes and literals are allowed")]
    Unsupported(String),

    #[error("Expected 4 terms in a quad tuple, got {0}")]
    Arity(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TermKind {
    Uri,
    Literal,
    #[serde(rename = "blank")]
    BlankNode,
}

impl TermKind {
    /// Convert to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uri => "uri",
            Self::Literal => "literal",
            Self::BlankNode => "blank",
        }
    }
}

impl fmt::Display for TermKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TermKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "uri" => Ok(Self::Uri),
            "literal" => Ok(Self::Literal),
            "blank" => Ok(Self::BlankNode),
            _ => Err(format!("'{}' is not a valid term kind", s)),
        }
    }
}

/// Content-derived term identifier (UUIDv5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TermId(Uuid);

impl TermId {
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl From<Uuid> for TermId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for TermId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A distinct RDF value: IRI, literal, or blank node.
///
/// `text` is the lexical form without decoration. Simple literals and
/// language-tagged literals carry no explicit datatype, so `"a"` and
/// `"a"^^xsd:string` are the same term.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Term {
    text: String,
    kind: TermKind,
    language: Option<String>,
    datatype: Option<String>,
}

impl Term {
    pub fn uri(iri: impl Into<String>) -> Self {
        Self {
            text: iri.into(),
            kind: TermKind::Uri,
            language: None,
            datatype: None,
        }
    }

    pub fn blank(label: impl Into<String>) -> Self {
        let label = label.into();
        let label = label.strip_prefix("_:").map(str::to_string).unwrap_or(label);
        Self {
            text: label,
            kind: TermKind::BlankNode,
            language: None,
            datatype: None,
        }
    }

    pub fn literal(value: impl Into<String>) -> Self {
        Self {
            text: value.into(),
            kind: TermKind::Literal,
            language: None,
            datatype: None,
        }
    }

    pub fn lang_literal(value: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            text: value.into(),
            kind: TermKind::Literal,
            language: Some(language.into().to_ascii_lowercase()),
            datatype: None,
        }
    }

    pub fn typed_literal(value: impl Into<String>, datatype: impl Into<String>) -> Self {
        let datatype = datatype.into();
        let datatype = (datatype != xsd::STRING && datatype != rdf::LANG_STRING).then_some(datatype);
        Self {
            text: value.into(),
            kind: TermKind::Literal,
            language: None,
            datatype,
        }
    }

    /// Context term used for the SPARQL default graph.
    pub fn default_graph() -> Self {
        Self::uri(vocab::DEFAULT_GRAPH)
    }

    /// Rebuild a term from its stored columns.
    pub fn from_parts(
        kind: TermKind,
        text: String,
        language: Option<String>,
        datatype: Option<String>,
    ) -> Self {
        match kind {
            TermKind::Uri => Self::uri(text),
            TermKind::BlankNode => Self::blank(text),
            TermKind::Literal => match (language, datatype) {
                (Some(language), _) => Self::lang_literal(text, language),
                (None, Some(datatype)) => Self::typed_literal(text, datatype),
                (None, None) => Self::literal(text),
            },
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn kind(&self) -> TermKind {
        self.kind
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn datatype(&self) -> Option<&str> {
        self.datatype.as_deref()
    }

    pub fn is_uri(&self) -> bool {
        self.kind == TermKind::Uri
    }

    pub fn is_literal(&self) -> bool {
        self.kind == TermKind::Literal
    }

    pub fn is_default_graph(&self) -> bool {
        self.is_uri() && self.text == vocab::DEFAULT_GRAPH
    }

    /// Deterministic identifier over `(kind, text, language, datatype)`.
    ///
    /// Independent processes and transactions derive the same id for the same
    /// term without coordination.
    pub fn id(&self) -> TermId {
        let language = self.language.as_deref().unwrap_or_default();
        let datatype = self.datatype.as_deref().unwrap_or_default();
        let mut key = Vec::with_capacity(
            self.kind.as_str().len() + self.text.len() + language.len() + datatype.len() + 3,
        );
        key.extend_from_slice(self.kind.as_str().as_bytes());
        key.push(FIELD_SEPARATOR);
        key.extend_from_slice(self.text.as_bytes());
        key.push(FIELD_SEPARATOR);
        key.extend_from_slice(language.as_bytes());
        key.push(FIELD_SEPARATOR);
        key.extend_from_slice(datatype.as_bytes());
        TermId(Uuid::new_v5(&TERM_ID_NAMESPACE, &key))
    }

    /// The IRI term naming this literal's datatype, if it has one.
    pub fn datatype_term(&self) -> Option<Term> {
        self.datatype.as_ref().map(|datatype| Term::uri(datatype.clone()))
    }

    /// Value of an `xsd:double`/`xsd:float` literal, the only types whose
    /// renderings the index may shorten. Other literals never go through
    /// approximate matching.
    pub fn float_value(&self) -> Option<f64> {
        if !self.is_binary_float() {
            return None;
        }
        self.text
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
    }

    /// Lexical prefix shared with higher-precision renderings of this float:
    /// the text minus its final digit.
    pub fn truncated_prefix(&self) -> Option<&str> {
        self.float_value()?;
        let text = self.text.trim();
        if text.len() < 2 || !text.is_ascii() {
            return None;
        }
        Some(&text[..text.len() - 1])
    }

    /// `xsd:double`/`xsd:float` literal.
    pub fn is_binary_float(&self) -> bool {
        matches!(self.datatype.as_deref(), Some(xsd::DOUBLE) | Some(xsd::FLOAT))
    }

    /// Same lexical form re-typed as `xsd:decimal`.
    pub fn to_decimal(&self) -> Term {
        Term::typed_literal(self.text.clone(), xsd::DECIMAL)
    }

    pub fn to_oxigraph(&self) -> OxTerm {
        match self.kind {
            TermKind::Uri => NamedNode::new_unchecked(self.text.clone()).into(),
            TermKind::BlankNode => BlankNode::new_unchecked(self.text.clone()).into(),
            TermKind::Literal => match (&self.language, &self.datatype) {
                (Some(language), _) => {
                    Literal::new_language_tagged_literal_unchecked(self.text.clone(), language)
                }
                (None, Some(datatype)) => Literal::new_typed_literal(
                    self.text.clone(),
                    NamedNode::new_unchecked(datatype.clone()),
                ),
                (None, None) => Literal::new_simple_literal(self.text.clone()),
            }
            .into(),
        }
    }
}

impl TryFrom<OxTerm> for Term {
    type Error = TermParseError;

    #[allow(unreachable_patterns)]
    fn try_from(term: OxTerm) -> Result<Self, Self::Error> {
        match term {
            OxTerm::NamedNode(node) => Ok(Term::uri(node.into_string())),
            OxTerm::BlankNode(node) => Ok(Term::blank(node.into_string())),
            OxTerm::Literal(literal) => Ok(match literal.language() {
                Some(language) => Term::lang_literal(literal.value(), language),
                None => Term::typed_literal(literal.value(), literal.datatype().as_str()),
            }),
            other => Err(TermParseError::Unsupported(other.to_string())),
        }
    }
}

/// Parses the quad wire format: a bare or bracketed IRI, a `_:label` blank
/// node, or a literal `"v"`, `"v"@lang`, `"v"^^<datatype>`.
impl FromStr for Term {
    type Err = TermParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        if input.is_empty() {
            return Err(TermParseError::Empty);
        }

        if input.starts_with('"') || input.starts_with('<') || input.starts_with("_:") {
            let term = OxTerm::from_str(input).map_err(|e| TermParseError::Invalid {
                input: input.to_string(),
                reason: e.to_string(),
            })?;
            return Term::try_from(term);
        }

        let node = NamedNode::new(input).map_err(|e| TermParseError::Invalid {
            input: input.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Term::uri(node.into_string()))
    }
}

/// N-Triples rendering, suitable for SPARQL `INSERT DATA`/`DELETE DATA`.
impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_oxigraph())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn identical_terms_share_an_id() {
        let a = Term::typed_literal("32785.67923076924", xsd::DOUBLE);
        let b: Term = "\"32785.67923076924\"^^<http://www.w3.org/2001/XMLSchema#double>"
            .parse()
            .unwrap();
        assert_eq!(a, b);
        assert_eq!(a.id(), b.id());
    }

    #[test]
    fn id_depends_on_every_component() {
        let plain = Term::literal("1");
        let ids = [
            plain.id(),
            Term::uri("1").id(),
            Term::blank("1").id(),
            Term::lang_literal("1", "en").id(),
            Term::typed_literal("1", xsd::INTEGER).id(),
        ];
        for (i, left) in ids.iter().enumerate() {
            for right in &ids[i + 1..] {
                assert_ne!(left, right);
            }
        }
    }

    #[test]
    fn id_is_stable_across_processes() {
        // Persisted rows are keyed by this value.
        let id = Term::uri("http://example.org/a").id();
        assert_eq!(id, Term::uri("http://example.org/a").id());
        assert_eq!(id.as_uuid().get_version_num(), 5);
    }

    #[test]
    fn xsd_string_is_a_simple_literal() {
        let typed = Term::typed_literal("a", xsd::STRING);
        assert_eq!(typed, Term::literal("a"));
        assert_eq!(typed.datatype(), None);
    }

    #[test]
    fn language_tags_are_case_insensitive() {
        assert_eq!(
            Term::lang_literal("chat", "FR").id(),
            Term::lang_literal("chat", "fr").id()
        );
    }

    #[test]
    fn parses_wire_format() {
        assert_eq!(
            "http://example.org/a".parse::<Term>().unwrap(),
            Term::uri("http://example.org/a")
        );
        assert_eq!(
            "<http://example.org/a>".parse::<Term>().unwrap(),
            Term::uri("http://example.org/a")
        );
        assert_eq!("_:b0".parse::<Term>().unwrap(), Term::blank("b0"));
        assert_eq!("\"1\"".parse::<Term>().unwrap(), Term::literal("1"));
        assert_eq!(
            "\"hello\"@en".parse::<Term>().unwrap(),
            Term::lang_literal("hello", "en")
        );
        assert_eq!(
            "\"line\\nbreak\"".parse::<Term>().unwrap(),
            Term::literal("line\nbreak")
        );
    }

    #[test]
    fn rejects_malformed_terms() {
        assert_eq!("".parse::<Term>(), Err(TermParseError::Empty));
        assert!(matches!(
            "not an iri".parse::<Term>(),
            Err(TermParseError::Invalid { .. })
        ));
        assert!(matches!(
            "\"unterminated".parse::<Term>(),
            Err(TermParseError::Invalid { .. })
        ));
    }

    #[test]
    fn display_round_trips_through_parse() {
        for term in [
            Term::uri("http://example.org/a"),
            Term::blank("x1"),
            Term::literal("say \"hi\""),
            Term::lang_literal("bonjour", "fr"),
            Term::typed_literal("3.5", xsd::DECIMAL),
        ] {
            assert_eq!(term.to_string().parse::<Term>().unwrap(), term);
        }
    }

    #[test]
    fn float_helpers() {
        let truncated = Term::typed_literal("32785.68", xsd::DOUBLE);
        assert_eq!(truncated.float_value(), Some(32785.68));
        assert_eq!(truncated.truncated_prefix(), Some("32785.6"));
        assert_eq!(
            Term::typed_literal("1.5", xsd::FLOAT).truncated_prefix(),
            Some("1.")
        );

        assert_eq!(Term::typed_literal("NaN", xsd::DOUBLE).float_value(), None);
        assert_eq!(Term::typed_literal("7", xsd::DOUBLE).truncated_prefix(), None);
        assert_eq!(Term::uri("urn:1").truncated_prefix(), None);
    }

    #[test]
    fn exact_literals_have_no_float_value() {
        for term in [
            Term::literal("10117"),
            Term::lang_literal("1.5", "en"),
            Term::typed_literal("5001", xsd::INTEGER),
            Term::typed_literal("100.4", xsd::DECIMAL),
        ] {
            assert_eq!(term.float_value(), None, "{term}");
            assert_eq!(term.truncated_prefix(), None, "{term}");
        }
    }

    #[test]
    fn serde_uses_lowercase_kinds() {
        let json = serde_json::to_string(&Term::blank("b")).unwrap();
        assert!(json.contains("\"blank\""));
    }
}
