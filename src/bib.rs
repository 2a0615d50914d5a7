//! # Bibliographies
//!
//! A bibliography is a sequence of entries of the form
//! ```bib
//! @type{id,
//!   name = {value},
//!   name = "value",
//! }
//! ```
//! [`BibLexer`] reads the field values as raw strings, so that the value of each field can be
//! parsed by whatever understands it: a [`FieldHandler`] registered with [`BibParser`].
mod field;
mod lexer;
mod parser;

pub use field::{FieldHandler, FieldRoute, append_builtin_field};
pub use lexer::{BibLexer, BibToken, BibTokenKind, BibTokenStream};
pub use parser::{BibParser, BibParserBuilder};
