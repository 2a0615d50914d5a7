//! # Two-stage input: characters, then tokens
//!
//! A [`CharStream`] normalizes the raw text and hands out characters with pushback and escape
//! handling. A [`TokenStream`] sits on top of it and turns characters into tokens through a
//! [`Lexer`], which only has to know how to produce the next token. The scanning primitives that
//! the lexers share (whitespace, brackets, delimited strings and commands) are methods of
//! [`CharStream`].
mod character;
mod scan;
mod token;

pub use character::{CharStream, Escape};
pub use scan::is_whitespace;
pub use token::{Lexer, Payload, Token, TokenKind, TokenStream};

pub(crate) use token::define_tokens;
