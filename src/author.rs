//! # Author lists
//!
//! Names in an author list follow the BibTeX conventions: members separated by `and`, each
//! written `Surname, First` or `First Surname`, with `{...}` protecting a group of words.
mod lexer;
mod parser;

pub use lexer::{AuthorLexer, AuthorToken, AuthorTokenKind, AuthorTokenStream};
pub use parser::AuthorParser;
