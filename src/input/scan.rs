//! Scanning primitives shared by the tokenizers.
use super::CharStream;
use crate::bracket::{BracketError, Matcher, is_bracket, is_right_bracket, left_bracket_of};
use crate::error::{ErrorCode, Result};

/// Whitespace as understood by every tokenizer: space, tab, line feed, carriage return, vertical
/// tab and form feed.
#[inline]
pub fn is_whitespace(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n' | '\r' | '\x0B' | '\x0C')
}

impl CharStream {
    /// Skip consecutive whitespace, if any.
    pub fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(is_whitespace) {
            self.get();
        }
    }

    /// Read consecutive whitespace; there must be at least one.
    pub fn read_whitespace(&mut self) -> Result<String> {
        match self.peek() {
            Some(ch) if is_whitespace(ch) => Ok(self.get_while(is_whitespace)),
            Some(ch) => Err(self.error(ErrorCode::NotAWhitespace(ch))),
            None => Err(self.error(ErrorCode::UnexpectedEndOfInput)),
        }
    }

    /// Read a single bracket character of any kind.
    pub fn read_bracket(&mut self) -> Result<char> {
        match self.peek() {
            Some(ch) if is_bracket(ch) => {
                self.get();
                Ok(ch)
            }
            Some(ch) => Err(self.error(ErrorCode::Bracket(BracketError::NotABracket(ch)))),
            None => Err(self.error(ErrorCode::UnexpectedEndOfInput)),
        }
    }

    /// Read up to, but not including, the first `delimiter` not preceded by a backslash.
    pub fn read_delimited(&mut self, delimiter: char) -> Result<String> {
        let mut escaped = false;
        let value = self.get_while(|ch| {
            if escaped {
                escaped = false;
                true
            } else if ch == '\\' {
                escaped = true;
                true
            } else {
                ch != delimiter
            }
        });
        if self.peek() != Some(delimiter) {
            return Err(self.error(ErrorCode::UnterminatedString(delimiter)));
        }
        Ok(value)
    }

    /// Read up to, but not including, the `right` bracket closing an already consumed left
    /// bracket.
    ///
    /// Nested pairs of the same kind are kept in the string; brackets preceded by a backslash
    /// are not counted.
    pub fn read_bracketed(&mut self, right: char) -> Result<String> {
        let left = match left_bracket_of(right) {
            Some(left) if is_right_bracket(right) => left,
            _ => {
                return Err(self.error(ErrorCode::Bracket(BracketError::InvalidBracket(right))));
            }
        };
        let mut matcher = Matcher::new();
        matcher
            .down(left)
            .map_err(|err| self.error(ErrorCode::Bracket(err)))?;

        let mut value = String::new();
        let mut escaped = false;
        loop {
            let Some(ch) = self.peek() else {
                return Err(self.error(ErrorCode::UnterminatedString(right)));
            };
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == left || ch == right {
                matcher
                    .update(ch)
                    .map_err(|err| self.error(ErrorCode::Bracket(err)))?;
                if matcher.level() == 0 {
                    return Ok(value);
                }
            }
            value.push(ch);
            self.get();
        }
    }

    /// Whether a command starts here: a backslash not followed by `{` or `}`.
    pub fn at_command(&self) -> bool {
        match self.peek_escaped() {
            None => false,
            Some(escape) => !matches!(escape.as_char(), Some('{' | '}')),
        }
    }

    /// Read a command including its leading backslash.
    ///
    /// The name runs up to the next bracket, whitespace or backslash. It is extended by a
    /// directly following bracket other than a brace, or by a directly following escaped brace,
    /// so that `\x{` leaves the `{` for the argument of `\x`.
    pub fn read_command(&mut self) -> Result<String> {
        if !self.at_command() {
            return Err(self.error(ErrorCode::NotACommand));
        }
        let mut value = String::from('\\');
        self.get();
        value.push_str(&self.get_while(|ch| !is_bracket(ch) && !is_whitespace(ch) && ch != '\\'));
        match self.peek() {
            Some('{' | '}') => {}
            Some(ch) if is_bracket(ch) => {
                self.get();
                value.push(ch);
            }
            Some('\\') if !self.at_command() => {
                if let Some(ch) = self.get_escaped().and_then(|escape| escape.as_char()) {
                    value.push('\\');
                    value.push(ch);
                }
            }
            _ => {}
        }
        Ok(value)
    }
}
