//! # Bracket classification and nesting
//!
//! Four bracket pairs are recognized: `()`, `[]`, `{}` and `<>`. The [`Matcher`] tracks the
//! nesting of any mix of them and rejects every right bracket which does not close the innermost
//! open left bracket.
use std::error::Error;
use std::fmt;

const LEFT_BRACKETS: [char; 4] = ['(', '[', '{', '<'];
const RIGHT_BRACKETS: [char; 4] = [')', ']', '}', '>'];

/// Possible failures when updating the bracket nesting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BracketError {
    /// `down` was given something other than a left bracket, or `up` something other than a
    /// right bracket.
    InvalidBracket(char),
    /// A right bracket arrived while nothing was open.
    EmptyNesting(char),
    /// A right bracket which does not close the innermost left bracket.
    MismatchedBracket { expected: char, found: char },
    /// Not one of the eight bracket characters.
    NotABracket(char),
}

impl fmt::Display for BracketError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidBracket(ch) => write!(f, "not a bracket of the expected side: '{ch}'"),
            Self::EmptyNesting(ch) => {
                write!(f, "not currently in a bracket nesting: '{ch}'")
            }
            Self::MismatchedBracket { expected, found } => write!(
                f,
                "right bracket does not match the current bracket nesting: \
                 should be '{expected}' but got '{found}'"
            ),
            Self::NotABracket(ch) => write!(f, "not a bracket: '{ch}'"),
        }
    }
}

impl Error for BracketError {}

#[inline]
pub fn is_left_bracket(ch: char) -> bool {
    LEFT_BRACKETS.contains(&ch)
}

#[inline]
pub fn is_right_bracket(ch: char) -> bool {
    RIGHT_BRACKETS.contains(&ch)
}

#[inline]
pub fn is_bracket(ch: char) -> bool {
    is_left_bracket(ch) || is_right_bracket(ch)
}

/// The partner of a left bracket, or `None` if `left` is not one.
pub fn right_bracket_of(left: char) -> Option<char> {
    LEFT_BRACKETS
        .iter()
        .position(|&b| b == left)
        .map(|idx| RIGHT_BRACKETS[idx])
}

/// The partner of a right bracket, or `None` if `right` is not one.
pub fn left_bracket_of(right: char) -> Option<char> {
    RIGHT_BRACKETS
        .iter()
        .position(|&b| b == right)
        .map(|idx| LEFT_BRACKETS[idx])
}

/// Matcher of bracket nesting.
///
/// The stack holds the open left brackets from the outermost to the innermost, so its depth is
/// the current nesting level.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Matcher {
    left_brackets: Vec<char>,
}

impl Matcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current nesting level; zero when nothing is open.
    #[inline]
    pub fn level(&self) -> usize {
        self.left_brackets.len()
    }

    /// The open left brackets, outermost first.
    pub fn left_brackets(&self) -> &[char] {
        &self.left_brackets
    }

    /// Go one level deeper.
    pub fn down(&mut self, left: char) -> Result<(), BracketError> {
        if !is_left_bracket(left) {
            return Err(BracketError::InvalidBracket(left));
        }
        self.left_brackets.push(left);
        Ok(())
    }

    /// Close the innermost level with its partner right bracket.
    pub fn up(&mut self, right: char) -> Result<(), BracketError> {
        let Some(left) = left_bracket_of(right) else {
            return Err(BracketError::InvalidBracket(right));
        };
        match self.left_brackets.last() {
            None => Err(BracketError::EmptyNesting(right)),
            Some(&top) if top != left => Err(BracketError::MismatchedBracket {
                // the stack only ever holds left brackets
                expected: right_bracket_of(top).unwrap_or(top),
                found: right,
            }),
            Some(_) => {
                self.left_brackets.pop();
                Ok(())
            }
        }
    }

    /// Dispatch to [`Matcher::down`] or [`Matcher::up`] depending on the side of `bracket`.
    pub fn update(&mut self, bracket: char) -> Result<(), BracketError> {
        if is_left_bracket(bracket) {
            self.down(bracket)
        } else if is_right_bracket(bracket) {
            self.up(bracket)
        } else {
            Err(BracketError::NotABracket(bracket))
        }
    }

    pub fn reset(&mut self) {
        self.left_brackets.clear();
    }
}
