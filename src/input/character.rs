use memchr::memmem;

use crate::error::{Error, ErrorCode, Position, Result};

/// What follows a backslash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Escape {
    /// The escaped character.
    Char(char),
    /// The backslash was the last character of the input.
    Trailing,
}

impl Escape {
    pub fn as_char(self) -> Option<char> {
        match self {
            Self::Char(ch) => Some(ch),
            Self::Trailing => None,
        }
    }
}

/// Replace every `\n\r` by `\n`.
fn normalize(input: &str) -> Vec<char> {
    let mut normalized = String::with_capacity(input.len());
    let mut start = 0;
    for idx in memmem::find_iter(input.as_bytes(), b"\n\r") {
        // both bytes are ascii so the slice boundaries are char boundaries
        normalized.push_str(&input[start..idx + 1]);
        start = idx + 2;
    }
    normalized.push_str(&input[start..]);
    normalized.chars().collect()
}

/// Character stream with unlimited pushback.
///
/// Pushed back characters are returned before the remaining input, last pushed first. Line and
/// column follow the underlying input only: consuming a pushed back character does not move
/// them, so reading a string, pushing it back and reading it again leaves the position where a
/// single read would have left it.
#[derive(Debug, Clone)]
pub struct CharStream {
    input: Vec<char>,
    cursor: usize,
    line: usize,
    column: usize,
    pushback: Vec<char>,
}

impl CharStream {
    pub fn new(input: &str) -> Self {
        Self {
            input: normalize(input),
            cursor: 0,
            line: 1,
            column: 0,
            pushback: Vec::new(),
        }
    }

    #[inline]
    pub fn at_end(&self) -> bool {
        self.pushback.is_empty() && self.cursor == self.input.len()
    }

    #[inline]
    pub fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    /// Attach the current position to `code`.
    pub fn error(&self, code: ErrorCode) -> Error {
        Error::new(code, self.position())
    }

    /// Get the next character, or `None` at the end of the stream.
    pub fn get(&mut self) -> Option<char> {
        if let Some(ch) = self.pushback.pop() {
            return Some(ch);
        }
        let ch = *self.input.get(self.cursor)?;
        self.cursor += 1;
        if ch == '\n' {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    /// Get the next character, failing unless it is `expected`.
    pub fn get_expected(&mut self, expected: char) -> Result<char> {
        match self.get() {
            Some(ch) if ch == expected => Ok(ch),
            found => Err(self.error(ErrorCode::UnexpectedCharacter { expected, found })),
        }
    }

    /// Consume a backslash and the character following it.
    ///
    /// Returns `None` without consuming anything if the next character is not a backslash.
    pub fn get_escaped(&mut self) -> Option<Escape> {
        if self.peek() != Some('\\') {
            return None;
        }
        self.get();
        Some(match self.get() {
            Some(ch) => Escape::Char(ch),
            None => Escape::Trailing,
        })
    }

    /// As [`CharStream::get_escaped`], failing unless the escaped character is `expected`.
    pub fn get_escaped_expected(&mut self, expected: char) -> Result<Option<Escape>> {
        if self.peek() != Some('\\') {
            return Ok(None);
        }
        self.get();
        self.get_expected(expected).map(|ch| Some(Escape::Char(ch)))
    }

    /// Consume characters while `predicate` holds for them.
    pub fn get_while<F>(&mut self, mut predicate: F) -> String
    where
        F: FnMut(char) -> bool,
    {
        let mut value = String::new();
        while let Some(ch) = self.peek() {
            if !predicate(ch) {
                break;
            }
            value.push(ch);
            self.get();
        }
        value
    }

    /// Push back `text` so that it is read again in its original order.
    pub fn unget(&mut self, text: &str) {
        self.pushback.extend(text.chars().rev());
    }

    pub fn unget_char(&mut self, ch: char) {
        self.pushback.push(ch);
    }

    /// Push back a backslash followed by `ch`.
    pub fn unget_escaped(&mut self, ch: char) {
        self.pushback.push(ch);
        self.pushback.push('\\');
    }

    #[inline]
    pub fn peek(&self) -> Option<char> {
        self.peek_nth(0)
    }

    /// The character following a backslash, without consuming anything.
    ///
    /// Returns `None` if the next character is not a backslash.
    pub fn peek_escaped(&self) -> Option<Escape> {
        if self.peek() != Some('\\') {
            return None;
        }
        Some(match self.peek_nth(1) {
            Some(ch) => Escape::Char(ch),
            None => Escape::Trailing,
        })
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        let buffered = self.pushback.len();
        if n < buffered {
            Some(self.pushback[buffered - 1 - n])
        } else {
            self.input.get(self.cursor + n - buffered).copied()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_all(stream: &mut CharStream) -> String {
        stream.get_while(|_| true)
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("a\n\rb"), vec!['a', '\n', 'b']);
        assert_eq!(normalize("\n\r\n\r"), vec!['\n', '\n']);
        assert_eq!(normalize("\r\n"), vec!['\r', '\n']);
        assert_eq!(normalize("🍄\n\r🍄"), vec!['🍄', '\n', '🍄']);
    }

    #[test]
    fn test_get_and_position() {
        let mut stream = CharStream::new("ab\ncd");
        assert_eq!(stream.position(), Position::new(1, 0));
        assert_eq!(stream.get(), Some('a'));
        assert_eq!(stream.get(), Some('b'));
        assert_eq!(stream.position(), Position::new(1, 2));
        assert_eq!(stream.get(), Some('\n'));
        assert_eq!(stream.position(), Position::new(2, 0));
        assert_eq!(read_all(&mut stream), "cd");
        assert!(stream.at_end());
        assert_eq!(stream.get(), None);
    }

    #[test]
    fn test_get_expected() {
        let mut stream = CharStream::new("x");
        let err = stream.get_expected('y').unwrap_err();
        assert_eq!(
            err.code(),
            &ErrorCode::UnexpectedCharacter {
                expected: 'y',
                found: Some('x')
            }
        );
        assert_eq!(err.position(), Position::new(1, 1));

        let err = stream.get_expected('y').unwrap_err();
        assert_eq!(
            err.code(),
            &ErrorCode::UnexpectedCharacter {
                expected: 'y',
                found: None
            }
        );
    }

    #[test]
    fn test_escaped() {
        let mut stream = CharStream::new(r"a\{\");
        assert_eq!(stream.get_escaped(), None);
        assert_eq!(stream.peek_escaped(), None);
        assert_eq!(stream.get(), Some('a'));

        assert_eq!(stream.peek_escaped(), Some(Escape::Char('{')));
        // peeking leaves the stream untouched
        assert_eq!(stream.peek(), Some('\\'));
        assert_eq!(stream.get_escaped(), Some(Escape::Char('{')));

        assert_eq!(stream.peek_escaped(), Some(Escape::Trailing));
        assert_eq!(stream.get_escaped(), Some(Escape::Trailing));
        assert!(stream.at_end());
        assert_eq!(stream.get_escaped(), None);
    }

    #[test]
    fn test_escaped_expected() {
        let mut stream = CharStream::new(r"\x\y");
        assert_eq!(
            stream.get_escaped_expected('x').unwrap(),
            Some(Escape::Char('x'))
        );
        assert!(stream.get_escaped_expected('x').is_err());

        let mut stream = CharStream::new("plain");
        assert_eq!(stream.get_escaped_expected('x').unwrap(), None);
        assert_eq!(stream.peek(), Some('p'));
    }

    #[test]
    fn test_unget() {
        let mut stream = CharStream::new("cd");
        stream.unget("ab");
        assert!(!stream.at_end());
        assert_eq!(stream.peek(), Some('a'));
        assert_eq!(read_all(&mut stream), "abcd");

        // pushing back a single character equals pushing back a string of one character
        let mut one = CharStream::new("z");
        let mut many = CharStream::new("z");
        one.unget_char('y');
        one.unget_char('x');
        many.unget("xy");
        assert_eq!(read_all(&mut one), read_all(&mut many));
    }

    #[test]
    fn test_unget_escaped() {
        let mut stream = CharStream::new("rest");
        stream.unget_escaped('}');
        assert_eq!(stream.peek_escaped(), Some(Escape::Char('}')));
        assert_eq!(stream.get_escaped(), Some(Escape::Char('}')));
        assert_eq!(read_all(&mut stream), "rest");
    }

    #[test]
    fn test_peek_across_pushback() {
        let mut stream = CharStream::new("{");
        stream.unget_char('\\');
        assert_eq!(stream.peek_escaped(), Some(Escape::Char('{')));
    }

    use proptest::prelude::*;
    proptest! {
        #[test]
        fn unget_round_trip(s in "\\PC*", tail in "\\PC*") {
            let input = format!("{s}{tail}");
            let mut reference = CharStream::new(&input);
            let expected: String = (0..s.chars().count()).filter_map(|_| reference.get()).collect();

            let mut stream = CharStream::new(&input);
            let taken: String = (0..s.chars().count()).filter_map(|_| stream.get()).collect();
            prop_assert_eq!(&taken, &expected);
            stream.unget(&taken);
            let again: String = (0..s.chars().count()).filter_map(|_| stream.get()).collect();
            prop_assert_eq!(&again, &expected);
            prop_assert_eq!(stream.position(), reference.position());
            prop_assert_eq!(read_all(&mut stream), read_all(&mut reference));
        }
    }
}
