use crate::bracket::{is_bracket, right_bracket_of};
use crate::error::{ErrorCode, Result};
use crate::input::{CharStream, Lexer, TokenStream, define_tokens, is_whitespace};

define_tokens! {
    /// Token of a bibliography.
    pub enum BibToken: BibTokenKind {
        /// Entry type with its leading `@`.
        EntryType(String) => "entry_type",
        Identifier(String) => "identifier",
        /// Only `=` is recognized.
        Operator(String) => "operator",
        /// `"` or `,`.
        Punctuation(char) => "punctuation",
        Bracket(char) => "bracket",
        /// Raw field value between its delimiters.
        String(String) => "string",
    }
}

#[inline]
fn is_punctuation(ch: char) -> bool {
    matches!(ch, '"' | ',')
}

#[inline]
fn is_operator(ch: char) -> bool {
    ch == '='
}

#[inline]
fn is_identifier_start(ch: char) -> bool {
    ch.is_ascii_alphabetic()
}

#[inline]
fn is_identifier(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '-'
}

pub type BibTokenStream = TokenStream<BibLexer>;

/// Tokenizer of a bibliography.
///
/// Whitespace between tokens is skipped, including whitespace at the start of a field value.
/// After `=` the next `"` or `{` is remembered as the delimiter of the field value, and the token
/// following the delimiter is the raw value as a `string`. The closing delimiter is left for the
/// next token.
#[derive(Debug, Clone, Default)]
pub struct BibLexer {
    in_field_value: bool,
    delimiter: Option<char>,
}

impl BibLexer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A token stream over `input`.
    pub fn stream(input: &str) -> BibTokenStream {
        TokenStream::new(input, Self::new())
    }

    fn read_field_value(&mut self, input: &mut CharStream, delimiter: char) -> Result<String> {
        self.in_field_value = false;
        self.delimiter = None;
        match delimiter {
            '"' => input.read_delimited('"'),
            '{' => input.read_bracketed('}'),
            _ => Err(input.error(ErrorCode::UnrecognizedDelimiter(delimiter))),
        }
    }

    fn read_entry_type(input: &mut CharStream) -> Result<String> {
        match input.peek() {
            Some('@') => Ok(input.get_while(|ch| ch != '{' && !is_whitespace(ch))),
            Some(ch) => Err(input.error(ErrorCode::NotAnEntryType(ch))),
            None => Err(input.error(ErrorCode::UnexpectedEndOfInput)),
        }
    }

    fn read_identifier(input: &mut CharStream) -> Result<String> {
        match input.peek() {
            Some(ch) if is_identifier_start(ch) => Ok(input.get_while(is_identifier)),
            Some(ch) => Err(input.error(ErrorCode::NotAnIdentifier(ch))),
            None => Err(input.error(ErrorCode::UnexpectedEndOfInput)),
        }
    }

    fn read_operator(input: &mut CharStream) -> Result<String> {
        match input.peek() {
            Some(ch) if is_operator(ch) => Ok(input.get_while(is_operator)),
            Some(ch) => Err(input.error(ErrorCode::NotAnOperator(ch))),
            None => Err(input.error(ErrorCode::UnexpectedEndOfInput)),
        }
    }

    /// Remember `ch` as the delimiter if it opens a field value.
    fn track_delimiter(&mut self, ch: char) {
        self.delimiter = self.in_field_value.then_some(ch);
    }
}

impl Lexer for BibLexer {
    type Token = BibToken;

    fn read_next(&mut self, input: &mut CharStream) -> Result<Option<BibToken>> {
        input.skip_whitespace();
        if let Some(delimiter) = self.delimiter.filter(|_| self.in_field_value) {
            return self
                .read_field_value(input, delimiter)
                .map(|value| Some(BibToken::String(value)));
        }
        let Some(ch) = input.peek() else {
            return Ok(None);
        };
        let token = if ch == '@' {
            BibToken::EntryType(Self::read_entry_type(input)?)
        } else if is_operator(ch) {
            let operator = Self::read_operator(input)?;
            self.in_field_value = operator == "=";
            BibToken::Operator(operator)
        } else if is_bracket(ch) {
            let bracket = input.read_bracket()?;
            self.track_delimiter(bracket);
            BibToken::Bracket(bracket)
        } else if is_punctuation(ch) {
            input.get();
            self.track_delimiter(ch);
            BibToken::Punctuation(ch)
        } else if is_identifier_start(ch) {
            BibToken::Identifier(Self::read_identifier(input)?)
        } else {
            return Err(input.error(ErrorCode::UnrecognizedCharacter(ch)));
        };
        Ok(Some(token))
    }
}

/// The right delimiter closing a field value opened by `left`.
pub(crate) fn closing_delimiter(left: char) -> char {
    right_bracket_of(left).unwrap_or(left)
}
