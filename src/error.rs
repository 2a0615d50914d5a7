use std::fmt;

use serde::Serialize;

use crate::bracket::BracketError;

pub type Result<T> = std::result::Result<T, Error>;

/// A location in the normalized input: 1-based line, column counted from 0 at the start of each
/// line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new(1, 0)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// The kind of failure, without position information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorCode {
    /// Invalid bracket nesting.
    Bracket(BracketError),
    /// A specific character was required.
    UnexpectedCharacter {
        expected: char,
        found: Option<char>,
    },
    /// Expected whitespace.
    NotAWhitespace(char),
    /// Expected a punctuation character.
    NotAPunctuation(char),
    /// Expected the first character of an identifier.
    NotAnIdentifier(char),
    /// Expected the `@` which begins an entry type.
    NotAnEntryType(char),
    /// Expected an operator character.
    NotAnOperator(char),
    /// Expected a backslash which begins a command.
    NotACommand,
    /// Expected the start of a word, found a command.
    NotAWord,
    /// A token would have been empty.
    EmptyToken,
    /// The input ended before the closing delimiter of a string.
    UnterminatedString(char),
    /// The input ended while a construct was still open.
    UnexpectedEndOfInput,
    /// An opaque string was closed by a command other than its right command.
    UnexpectedRightCommand { expected: String, found: String },
    /// A token of a different type was required.
    UnexpectedTokenType {
        expected: &'static str,
        found: Option<&'static str>,
    },
    /// A token with a different value was required.
    UnexpectedTokenValue { expected: String, found: String },
    /// A token which cannot appear at this point of the grammar.
    UnexpectedToken(String),
    /// No token of the bibliography grammar starts with this character.
    UnrecognizedCharacter(char),
    /// A field value was opened by something other than `{` or `"`.
    UnrecognizedDelimiter(char),
    /// A `}` without a preceding `{` inside an author word.
    UnexpectedRightBrace,
    /// An author member without any name tokens.
    EmptyMember,
    /// Command arguments nested deeper than the given limit.
    NestingTooDeep(usize),
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bracket(err) => err.fmt(f),
            Self::UnexpectedCharacter { expected, found } => match found {
                Some(found) => write!(
                    f,
                    "character does not match: should be '{expected}' but got '{found}'"
                ),
                None => write!(
                    f,
                    "character does not match: should be '{expected}' but got end of input"
                ),
            },
            Self::NotAWhitespace(ch) => write!(f, "not a whitespace: '{ch}'"),
            Self::NotAPunctuation(ch) => write!(f, "not a punctuation: '{ch}'"),
            Self::NotAnIdentifier(ch) => write!(f, "not the start of an identifier: '{ch}'"),
            Self::NotAnEntryType(ch) => write!(f, "not the start of an entry type: '{ch}'"),
            Self::NotAnOperator(ch) => write!(f, "not an operator: '{ch}'"),
            Self::NotACommand => f.write_str("not the start of a command"),
            Self::NotAWord => f.write_str("start of a command where a word was expected"),
            Self::EmptyToken => f.write_str("failed to tokenize"),
            Self::UnterminatedString(delimiter) => {
                write!(f, "cannot find right delimiter: '{delimiter}'")
            }
            Self::UnexpectedEndOfInput => f.write_str("unexpected end of input"),
            Self::UnexpectedRightCommand { expected, found } => write!(
                f,
                "unexpected right command: should be '{expected}' but got '{found}'"
            ),
            Self::UnexpectedTokenType { expected, found } => match found {
                Some(found) => write!(
                    f,
                    "type of token does not match: should be '{expected}' but got '{found}'"
                ),
                None => write!(
                    f,
                    "type of token does not match: should be '{expected}' but got end of input"
                ),
            },
            Self::UnexpectedTokenValue { expected, found } => write!(
                f,
                "value of token does not match: should be '{expected}' but got '{found}'"
            ),
            Self::UnexpectedToken(value) => write!(f, "unexpected token: '{value}'"),
            Self::UnrecognizedCharacter(ch) => write!(f, "cannot handle character: '{ch}'"),
            Self::UnrecognizedDelimiter(ch) => {
                write!(f, "unrecognized delimiter of a field value: '{ch}'")
            }
            Self::UnexpectedRightBrace => f.write_str("unexpected right brace"),
            Self::EmptyMember => f.write_str("author member has no name"),
            Self::NestingTooDeep(limit) => {
                write!(f, "command arguments nested deeper than {limit}")
            }
        }
    }
}

/// A failure together with the position in the input at which it was detected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    code: ErrorCode,
    position: Position,
}

impl Error {
    pub fn new(code: ErrorCode, position: Position) -> Self {
        Self { code, position }
    }

    pub fn code(&self) -> &ErrorCode {
        &self.code
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn line(&self) -> usize {
        self.position.line
    }

    pub fn column(&self) -> usize {
        self.position.column
    }

    /// Whether the input ended while a construct was still open.
    pub fn is_eof(&self) -> bool {
        matches!(
            self.code,
            ErrorCode::UnexpectedEndOfInput | ErrorCode::UnterminatedString(_)
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.code, self.position)
    }
}

impl std::error::Error for Error {}
