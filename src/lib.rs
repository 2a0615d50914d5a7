//! # texbib
//!
//! Parsers turning TeX text, bibliographies and author lists into a document tree.
//!
//! Three parsers are provided, each appending what it reads to a caller supplied [`Element`]:
//!
//! - [`TexParser`] for general TeX text,
//! - [`BibParser`] for bibliographies, which hands every field value to a [`FieldHandler`],
//! - [`AuthorParser`] for author lists, which is both a field handler and an [`OpaqueParser`]
//!   so that it can be plugged into the other two.
//!
//! ```
//! use texbib::{AuthorParser, BibParser, TexFieldHandler};
//!
//! let parser = BibParser::builder()
//!     .field("author", AuthorParser::new("bauthor", "eauthor"))
//!     .field("title", TexFieldHandler::default())
//!     .build();
//!
//! let bib = parser
//!     .parse(
//!         r#"@article{bjorck-1994,
//!              author = {Bj{\"{o}}rck, {\r{A}}ke},
//!              title = {Numerics of {Gram-Schmidt} Orthogonalization},
//!            }"#,
//!     )
//!     .unwrap();
//!
//! let entry = bib.element("entry").unwrap();
//! let member = entry.element("author").unwrap().element("member").unwrap();
//! assert_eq!(member.element("surname").unwrap().text_content(), "Bj{o}rck");
//! assert_eq!(
//!     entry.element("title").unwrap().text(),
//!     "Numerics of {Gram-Schmidt} Orthogonalization"
//! );
//! ```

/// Error types for tokenizing and parsing.
pub mod error;

pub mod bracket;
pub mod input;
pub mod tree;

/// Names of the elements and attributes of the document tree.
pub mod naming;

pub mod author;
pub mod bib;
pub mod tex;

// re-exports
pub use author::AuthorParser;
pub use bib::{BibParser, FieldHandler};
pub use error::{Error, ErrorCode, Position, Result};
pub use tex::{OpaqueParser, TexFieldHandler, TexParser};
pub use tree::{Element, Node};
