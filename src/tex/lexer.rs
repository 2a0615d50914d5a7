use std::collections::HashMap;

use crate::bracket::is_bracket;
use crate::error::{ErrorCode, Result};
use crate::input::{CharStream, Escape, Lexer, TokenStream, define_tokens, is_whitespace};

define_tokens! {
    /// Token of general TeX text.
    pub enum TexToken: TexTokenKind {
        /// A run of text, including escaped braces.
        Word(String) => "word",
        Bracket(char) => "bracket",
        /// One of `"`, `,`, `_` and `^`.
        Punctuation(char) => "punctuation",
        /// A command with its leading backslash.
        Command(String) => "command",
        Whitespace(String) => "whitespace",
        /// Raw text between a left and a right opaque command.
        OpaqueString(String) => "opaque_string",
    }
}

#[inline]
fn is_punctuation(ch: char) -> bool {
    matches!(ch, '"' | ',' | '_' | '^')
}

pub type TexTokenStream<'r> = TokenStream<TexLexer<'r>>;

/// Tokenizer of general TeX text.
///
/// `opaque_commands` maps left opaque commands to right opaque commands, both without the
/// leading backslash. The token following a left opaque command is the raw text up to the
/// right command.
#[derive(Debug, Clone)]
pub struct TexLexer<'r> {
    opaque_commands: &'r HashMap<String, String>,
    pending_right_command: Option<String>,
}

impl<'r> TexLexer<'r> {
    pub fn new(opaque_commands: &'r HashMap<String, String>) -> Self {
        Self {
            opaque_commands,
            pending_right_command: None,
        }
    }

    /// A token stream over `input`.
    pub fn stream(input: &str, opaque_commands: &'r HashMap<String, String>) -> TexTokenStream<'r> {
        TokenStream::new(input, Self::new(opaque_commands))
    }

    fn read_punctuation(input: &mut CharStream) -> Result<char> {
        match input.peek() {
            Some(ch) if is_punctuation(ch) => {
                input.get();
                Ok(ch)
            }
            Some(ch) => Err(input.error(ErrorCode::NotAPunctuation(ch))),
            None => Err(input.error(ErrorCode::UnexpectedEndOfInput)),
        }
    }

    /// Read up to, but not including, the command `\right_command`.
    fn read_opaque_string(input: &mut CharStream, right_command: &str) -> Result<String> {
        let mut value = String::new();
        loop {
            value.push_str(&input.get_while(|ch| ch != '\\'));
            if input.at_end() {
                return Err(input.error(ErrorCode::UnexpectedEndOfInput));
            }
            if input.at_command() {
                let command = input.read_command()?;
                if command[1..] == *right_command {
                    input.unget(&command);
                    return Ok(value);
                }
                value.push_str(&command);
            } else if let Some(Escape::Char(ch)) = input.get_escaped() {
                // an escaped brace
                value.push('\\');
                value.push(ch);
            }
        }
    }

    fn read_word(input: &mut CharStream) -> Result<String> {
        if input.at_command() {
            return Err(input.error(ErrorCode::NotAWord));
        }
        let mut value = String::new();
        loop {
            value.push_str(&input.get_while(|ch| {
                !is_bracket(ch) && !is_punctuation(ch) && !is_whitespace(ch) && ch != '\\'
            }));
            if input.at_command() {
                break;
            }
            // a trailing backslash is a command, so only escaped braces remain
            let Some(Escape::Char(ch)) = input.get_escaped() else {
                break;
            };
            value.push('\\');
            value.push(ch);
        }
        Ok(value)
    }
}

impl Lexer for TexLexer<'_> {
    type Token = TexToken;

    fn read_next(&mut self, input: &mut CharStream) -> Result<Option<TexToken>> {
        if let Some(right_command) = self.pending_right_command.take() {
            return Self::read_opaque_string(input, &right_command)
                .map(|value| Some(TexToken::OpaqueString(value)));
        }
        let Some(ch) = input.peek() else {
            return Ok(None);
        };
        let token = if is_bracket(ch) {
            TexToken::Bracket(input.read_bracket()?)
        } else if is_punctuation(ch) {
            TexToken::Punctuation(Self::read_punctuation(input)?)
        } else if input.at_command() {
            let command = input.read_command()?;
            if let Some(right_command) = self.opaque_commands.get(&command[1..]) {
                self.pending_right_command = Some(right_command.clone());
            }
            TexToken::Command(command)
        } else if is_whitespace(ch) {
            TexToken::Whitespace(input.read_whitespace()?)
        } else {
            let word = Self::read_word(input)?;
            if word.is_empty() {
                return Err(input.error(ErrorCode::EmptyToken));
            }
            TexToken::Word(word)
        };
        Ok(Some(token))
    }
}
