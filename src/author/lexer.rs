use crate::bracket::is_bracket;
use crate::error::{ErrorCode, Result};
use crate::input::{CharStream, Lexer, TokenStream, define_tokens, is_whitespace};

define_tokens! {
    /// Token of an author list.
    pub enum AuthorToken: AuthorTokenKind {
        /// A name or the separator `and`, with any `{...}` groups and escapes it contains.
        Word(String) => "word",
        /// Only `,` is recognized.
        Punctuation(char) => "punctuation",
        Bracket(char) => "bracket",
        /// Text of a group opened by `{`, without the braces.
        String(String) => "string",
        Whitespace(String) => "whitespace",
    }
}

#[inline]
fn is_word_char(ch: char) -> bool {
    !matches!(ch, '{' | '}' | ',' | '\\') && !is_whitespace(ch)
}

pub type AuthorTokenStream = TokenStream<AuthorLexer>;

/// Tokenizer of the value of an author field.
///
/// A `{` at the start of a token opens a group that is returned whole as a `string` token,
/// followed by the closing `}`. Groups inside a word stay part of the word.
#[derive(Debug, Clone, Default)]
pub struct AuthorLexer {
    braced: bool,
}

impl AuthorLexer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stream(input: &str) -> AuthorTokenStream {
        TokenStream::new(input, Self::new())
    }

    fn read_word(input: &mut CharStream) -> Result<String> {
        let mut value = String::new();
        loop {
            value.push_str(&input.get_while(is_word_char));
            match input.peek() {
                Some('{') => {
                    input.get();
                    value.push('{');
                    value.push_str(&input.read_bracketed('}')?);
                    input.get_expected('}')?;
                    value.push('}');
                }
                Some('}') => return Err(input.error(ErrorCode::UnexpectedRightBrace)),
                Some('\\') => {
                    input.get();
                    value.push('\\');
                }
                _ => return Ok(value),
            }
        }
    }
}

impl Lexer for AuthorLexer {
    type Token = AuthorToken;

    fn read_next(&mut self, input: &mut CharStream) -> Result<Option<AuthorToken>> {
        if self.braced {
            self.braced = false;
            return input
                .read_bracketed('}')
                .map(|value| Some(AuthorToken::String(value)));
        }
        let Some(ch) = input.peek() else {
            return Ok(None);
        };
        let token = if is_bracket(ch) {
            let bracket = input.read_bracket()?;
            self.braced = bracket == '{';
            AuthorToken::Bracket(bracket)
        } else if ch == ',' {
            input.get();
            AuthorToken::Punctuation(ch)
        } else if is_whitespace(ch) {
            AuthorToken::Whitespace(input.read_whitespace()?)
        } else {
            let word = Self::read_word(input)?;
            if word.is_empty() {
                return Err(input.error(ErrorCode::EmptyToken));
            }
            AuthorToken::Word(word)
        };
        Ok(Some(token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(input: &str) -> Vec<AuthorToken> {
        let mut stream = AuthorLexer::stream(input);
        let mut tokens = Vec::new();
        while let Some(token) = stream.get().unwrap() {
            tokens.push(token);
        }
        tokens
    }

    fn word(s: &str) -> AuthorToken {
        AuthorToken::Word(s.to_string())
    }

    fn whitespace() -> AuthorToken {
        AuthorToken::Whitespace(" ".to_string())
    }

    #[test]
    fn test_author() {
        assert_eq!(
            tokenize(r#"Bj{\"{o}}rck, {\r{A}}"#),
            vec![
                word(r#"Bj{\"{o}}rck"#),
                AuthorToken::Punctuation(','),
                whitespace(),
                AuthorToken::Bracket('{'),
                AuthorToken::String(r"\r{A}".to_string()),
                AuthorToken::Bracket('}'),
            ]
        );
    }

    #[test]
    fn test_members() {
        assert_eq!(
            tokenize(r#"Ake Bj\"orck and {Barnes and Noble}"#),
            vec![
                word("Ake"),
                whitespace(),
                word(r#"Bj\"orck"#),
                whitespace(),
                word("and"),
                whitespace(),
                AuthorToken::Bracket('{'),
                AuthorToken::String("Barnes and Noble".to_string()),
                AuthorToken::Bracket('}'),
            ]
        );
    }

    #[test]
    fn test_backslashes() {
        assert_eq!(tokenize(r"a\{b}c"), vec![word(r"a\{b}c")]);
        // a lone trailing backslash stays in the word
        assert_eq!(tokenize(r"ab\"), vec![word(r"ab\")]);
        assert_eq!(tokenize(r"\ x"), vec![word(r"\"), whitespace(), word("x")]);
    }

    #[test]
    fn test_empty_group() {
        assert_eq!(
            tokenize("{}"),
            vec![
                AuthorToken::Bracket('{'),
                AuthorToken::String(String::new()),
                AuthorToken::Bracket('}'),
            ]
        );
    }

    #[test]
    fn test_errors() {
        let mut stream = AuthorLexer::stream("ab}");
        assert_eq!(
            stream.get().unwrap_err().code(),
            &ErrorCode::UnexpectedRightBrace
        );

        let mut stream = AuthorLexer::stream("ab{c");
        assert_eq!(
            stream.get().unwrap_err().code(),
            &ErrorCode::UnterminatedString('}')
        );

        let mut stream = AuthorLexer::stream("{c");
        assert_eq!(stream.get().unwrap(), Some(AuthorToken::Bracket('{')));
        assert_eq!(
            stream.get().unwrap_err().code(),
            &ErrorCode::UnterminatedString('}')
        );
    }

    use proptest::prelude::*;
    proptest! {
        #[test]
        fn no_panic(s in "\\PC*") {
            let mut stream = AuthorLexer::stream(&s);
            while let Ok(Some(_)) = stream.get() {}
        }
    }
}
