//! # General TeX text
//!
//! [`TexLexer`] splits text into words, brackets, punctuation, whitespace and commands, and
//! [`TexParser`] turns those into a tree of text and `command` elements.
//!
//! Some commands come in pairs whose enclosed text follows a grammar of its own, such as a list
//! of authors. Registering an [`OpaqueParser`] for such a pair makes the TeX tokenizer return the
//! enclosed text as one opaque string, which the parser hands over untouched:
//!
//! ```
//! use std::sync::Arc;
//! use texbib::author::AuthorParser;
//! use texbib::tex::{OpaqueParser, TexParser};
//!
//! let authors: Arc<dyn OpaqueParser> = Arc::new(AuthorParser::new("bauthor", "eauthor"));
//! let parser = TexParser::with_opaque_parsers([authors]);
//! let tex = parser.parse(r"\bauthor Knuth, Donald E.\eauthor").unwrap();
//!
//! let command = tex.element("command").unwrap();
//! assert_eq!(command.attribute("left-name"), Some("bauthor"));
//! let member = command.element("author").unwrap().element("member").unwrap();
//! assert_eq!(member.element("surname").unwrap().text(), "Knuth");
//! assert_eq!(member.element("first-name").unwrap().text(), "Donald E.");
//! ```
mod lexer;
mod opaque;
mod parser;

pub use lexer::{TexLexer, TexToken, TexTokenKind, TexTokenStream};
pub use opaque::{OpaqueParser, OpaqueRegistry};
pub use parser::{MAX_ARGUMENT_DEPTH, TexFieldHandler, TexParser};
