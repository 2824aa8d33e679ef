mod quad;
mod term;
pub mod vocab;

pub use quad::Quad;
pub use term::{Term, TermId, TermKind, TermParseError};
