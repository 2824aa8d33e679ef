//! N-Quads input for the `add` and `remove` commands.

use std::io::Read;

use oxigraph::io::{RdfFormat, RdfParser};
use quadsync_domain::Quad;

use crate::error::AppError;

/// Parse every quad of an N-Quads document. Triples without a graph land in
/// the default graph.
pub fn read_nquads(reader: impl Read) -> Result<Vec<Quad>, AppError> {
    let parser = RdfParser::from_format(RdfFormat::NQuads);
    let mut quads = Vec::new();
    for parsed in parser.for_reader(reader) {
        let quad = parsed.map_err(|e| AppError::NQuads(e.to_string()))?;
        quads.push(Quad::try_from(quad).map_err(|e| AppError::NQuads(e.to_string()))?);
    }
    Ok(quads)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use quadsync_domain::{Term, vocab::xsd};

    use super::*;

    #[test]
    fn reads_quads_and_default_graph_triples() {
        let input = r#"
<http://example.org/s> <http://example.org/p> "1.5"^^<http://www.w3.org/2001/XMLSchema#double> <http://example.org/g> .
<http://example.org/s> <http://example.org/p> "plain" .
"#;
        let quads = read_nquads(input.as_bytes()).unwrap();
        assert_eq!(quads.len(), 2);
        assert_eq!(quads[0].object, Term::typed_literal("1.5", xsd::DOUBLE));
        assert_eq!(quads[0].graph, Term::uri("http://example.org/g"));
        assert!(quads[1].graph.is_default_graph());
    }

    #[test]
    fn rejects_malformed_lines() {
        let result = read_nquads("<http://example.org/s> <http://example.org/p> .".as_bytes());
        assert!(matches!(result, Err(AppError::NQuads(_))));
    }
}
