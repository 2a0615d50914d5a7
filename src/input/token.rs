use std::borrow::Cow;
use std::fmt;

use super::CharStream;
use crate::error::{Error, ErrorCode, Position, Result};

/// The closed set of token types of one tokenizer.
pub trait TokenKind: Copy + Eq + fmt::Debug + fmt::Display {
    /// Name used in diagnostics, such as `entry_type`.
    fn name(self) -> &'static str;
}

/// A token: a type tag and the text it was read from.
pub trait Token: Clone + PartialEq + fmt::Debug {
    type Kind: TokenKind;

    fn kind(&self) -> Self::Kind;

    fn value(&self) -> Cow<'_, str>;

    /// Whether the token has type `kind` and, if given, the value `value`.
    fn is(&self, kind: Self::Kind, value: Option<&str>) -> bool {
        self.kind() == kind && value.is_none_or(|value| self.value() == value)
    }
}

/// The payload of a token variant.
pub trait Payload {
    fn as_value(&self) -> Cow<'_, str>;
}

impl Payload for String {
    #[inline]
    fn as_value(&self) -> Cow<'_, str> {
        Cow::Borrowed(self)
    }
}

impl Payload for char {
    #[inline]
    fn as_value(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }
}

/// Declare a token enum together with its kind enum.
///
/// Every variant carries one payload implementing [`Payload`] and is given the name it is
/// reported with in diagnostics.
macro_rules! define_tokens {
    (
        $(#[$meta:meta])*
        $vis:vis enum $token:ident : $kind:ident {
            $( $(#[$vmeta:meta])* $variant:ident($payload:ty) => $name:literal, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        $vis enum $token {
            $( $(#[$vmeta])* $variant($payload), )+
        }

        #[doc = concat!("Type tag of a [`", stringify!($token), "`].")]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $kind {
            $( $variant, )+
        }

        impl $crate::input::TokenKind for $kind {
            fn name(self) -> &'static str {
                match self {
                    $( Self::$variant => $name, )+
                }
            }
        }

        impl ::std::fmt::Display for $kind {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str($crate::input::TokenKind::name(*self))
            }
        }

        impl $crate::input::Token for $token {
            type Kind = $kind;

            fn kind(&self) -> $kind {
                match self {
                    $( Self::$variant(_) => $kind::$variant, )+
                }
            }

            fn value(&self) -> ::std::borrow::Cow<'_, str> {
                match self {
                    $( Self::$variant(payload) => $crate::input::Payload::as_value(payload), )+
                }
            }
        }
    };
}

pub(crate) use define_tokens;

/// The grammar of a tokenizer: produce the next token from the character stream.
pub trait Lexer {
    type Token: Token;

    /// Read the next token, or `None` at the end of the input.
    fn read_next(&mut self, input: &mut CharStream) -> Result<Option<Self::Token>>;
}

type KindOf<L> = <<L as Lexer>::Token as Token>::Kind;

/// Token stream with unlimited pushback, shared by all tokenizers.
///
/// At most one token is read ahead by [`TokenStream::peek`]; [`TokenStream::get`] returns
/// pushed back tokens, last pushed first, before reading new ones.
#[derive(Debug)]
pub struct TokenStream<L: Lexer> {
    input: CharStream,
    lexer: L,
    pushback: Vec<L::Token>,
}

impl<L: Lexer> TokenStream<L> {
    pub fn new(input: &str, lexer: L) -> Self {
        Self {
            input: CharStream::new(input),
            lexer,
            pushback: Vec::new(),
        }
    }

    pub fn lexer(&self) -> &L {
        &self.lexer
    }

    pub fn position(&self) -> Position {
        self.input.position()
    }

    /// Attach the current position of the character stream to `code`.
    pub fn error(&self, code: ErrorCode) -> Error {
        self.input.error(code)
    }

    /// Get the next token, or `None` at the end of the stream.
    pub fn get(&mut self) -> Result<Option<L::Token>> {
        match self.pushback.pop() {
            Some(token) => Ok(Some(token)),
            None => self.lexer.read_next(&mut self.input),
        }
    }

    /// Get the next token, failing unless it has type `kind`.
    pub fn get_kind(&mut self, kind: KindOf<L>) -> Result<L::Token> {
        match self.get()? {
            Some(token) if token.kind() == kind => Ok(token),
            found => Err(self.error(ErrorCode::UnexpectedTokenType {
                expected: kind.name(),
                found: found.map(|token| token.kind().name()),
            })),
        }
    }

    /// Consume the next token, failing unless it has type `kind` and value `value`.
    pub fn skip(&mut self, kind: KindOf<L>, value: &str) -> Result<()> {
        let token = self.get_kind(kind)?;
        if token.value() != value {
            return Err(self.error(ErrorCode::UnexpectedTokenValue {
                expected: value.to_string(),
                found: token.value().into_owned(),
            }));
        }
        Ok(())
    }

    pub fn unget(&mut self, token: L::Token) {
        self.pushback.push(token);
    }

    /// Get the next token without consuming it.
    pub fn peek(&mut self) -> Result<Option<&L::Token>> {
        if self.pushback.is_empty() {
            if let Some(token) = self.lexer.read_next(&mut self.input)? {
                self.pushback.push(token);
            }
        }
        Ok(self.pushback.last())
    }

    /// Whether the next token has type `kind` and, if given, the value `value`. Always `false`
    /// at the end of the stream.
    pub fn matches(&mut self, kind: KindOf<L>, value: Option<&str>) -> Result<bool> {
        Ok(self.peek()?.is_some_and(|token| token.is(kind, value)))
    }

    pub fn at_end(&mut self) -> Result<bool> {
        Ok(self.peek()?.is_none())
    }
}
