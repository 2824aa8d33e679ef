//! SPARQL UPDATE text for quad writes.

use std::fmt::Write as _;

use quadsync_domain::{Quad, Term, TermKind};

use crate::config::NumericLiteralPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DataOperation {
    Insert,
    Delete,
}

impl DataOperation {
    pub(crate) fn kind(self) -> &'static str {
        match self {
            Self::Insert => "insert",
            Self::Delete => "delete",
        }
    }

    fn keyword(self) -> &'static str {
        match self {
            Self::Insert => "INSERT DATA",
            Self::Delete => "DELETE DATA",
        }
    }
}

/// A rendered `INSERT DATA`/`DELETE DATA` request.
#[derive(Debug)]
pub(crate) struct RenderedData {
    /// `None` when no quad could be rendered.
    pub(crate) update: Option<String>,
    /// Quads holding blank nodes. `DELETE DATA` leaves them out; `INSERT DATA`
    /// sends them, and the index mints fresh nodes for them on every insert.
    pub(crate) blank_node_quads: usize,
}

/// Groups quads by graph, keeping first-seen graph order. Default-graph quads
/// are written outside any `GRAPH` block.
pub(crate) fn render_data(
    operation: DataOperation,
    quads: &[Quad],
    policy: NumericLiteralPolicy,
) -> RenderedData {
    let mut default_graph: Vec<String> = Vec::new();
    let mut graphs: Vec<(&Term, Vec<String>)> = Vec::new();
    let mut blank_node_quads = 0;

    for quad in quads {
        if quad
            .terms()
            .iter()
            .any(|term| term.kind() == TermKind::BlankNode)
        {
            blank_node_quads += 1;
            if operation == DataOperation::Delete {
                continue;
            }
        }
        let line = format!(
            "{} {} {} .",
            quad.subject,
            quad.predicate,
            literal_for_index(&quad.object, policy)
        );
        if quad.graph.is_default_graph() {
            default_graph.push(line);
        } else if let Some((_, lines)) = graphs.iter_mut().find(|(graph, _)| **graph == quad.graph)
        {
            lines.push(line);
        } else {
            graphs.push((&quad.graph, vec![line]));
        }
    }

    if default_graph.is_empty() && graphs.is_empty() {
        return RenderedData {
            update: None,
            blank_node_quads,
        };
    }

    let mut update = format!("{} {{\n", operation.keyword());
    for line in &default_graph {
        let _ = writeln!(update, "  {line}");
    }
    for (graph, lines) in &graphs {
        let _ = writeln!(update, "  GRAPH {graph} {{");
        for line in lines {
            let _ = writeln!(update, "    {line}");
        }
        update.push_str("  }\n");
    }
    update.push('}');

    RenderedData {
        update: Some(update),
        blank_node_quads,
    }
}

fn literal_for_index(term: &Term, policy: NumericLiteralPolicy) -> Term {
    match policy {
        NumericLiteralPolicy::Decimal if term.is_binary_float() && is_decimal_lexical(term.text()) => {
            term.to_decimal()
        }
        _ => term.clone(),
    }
}

/// `[+-]? digits ('.' digits)?`, the forms `xsd:decimal` accepts verbatim.
fn is_decimal_lexical(text: &str) -> bool {
    let unsigned = text.strip_prefix(['+', '-']).unwrap_or(text);
    let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    let digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    !(whole.is_empty() && fraction.is_empty()) && digits(whole) && digits(fraction)
}
