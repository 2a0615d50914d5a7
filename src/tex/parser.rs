use std::sync::Arc;

use tracing::{debug, trace};

use super::lexer::{TexLexer, TexToken, TexTokenKind, TexTokenStream};
use super::opaque::{OpaqueParser, OpaqueRegistry};
use crate::bib::FieldHandler;
use crate::bracket::{BracketError, Matcher};
use crate::error::{Error, ErrorCode, Result};
use crate::input::Token;
use crate::naming::{
    COMMAND_NAME, COMMAND_NAME_ATTRIBUTE, LEFT_NAME_ATTRIBUTE, RIGHT_NAME_ATTRIBUTE,
    TEX_ROOT_NAME, field_tag,
};
use crate::tree::Element;

/// Parser of general TeX text.
///
/// Text is kept as is, brackets included. Every command becomes a `command` element: with a
/// `name` attribute and its `{...}` argument as children, or, for a registered opaque command,
/// with `left-name` and `right-name` attributes and whatever the [`OpaqueParser`] appends.
///
/// The parser holds no state between calls, so a single instance can be shared.
#[derive(Debug, Clone, Default)]
pub struct TexParser {
    opaque: OpaqueRegistry,
}

impl TexParser {
    /// A parser without opaque commands.
    pub fn new() -> Self {
        Self::default()
    }

    /// A parser delegating the text between each pair of opaque commands to its parser.
    pub fn with_opaque_parsers<I>(parsers: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn OpaqueParser>>,
    {
        Self {
            opaque: OpaqueRegistry::new(parsers),
        }
    }

    pub fn opaque_parsers(&self) -> &OpaqueRegistry {
        &self.opaque
    }

    /// Parse `input` and append its tree to `parent`.
    pub fn append_ast(&self, input: &str, parent: &mut Element) -> Result<()> {
        debug!("Parsing TeX: {} bytes", input.len());
        let mut pass = Pass {
            opaque: &self.opaque,
            stream: TexLexer::stream(input, self.opaque.commands()),
            matcher: Matcher::new(),
            arguments: Vec::new(),
        };
        pass.run(parent)
    }

    /// Parse `input` into a new `tex` element.
    pub fn parse(&self, input: &str) -> Result<Element> {
        let mut root = Element::new(TEX_ROOT_NAME);
        self.append_ast(input, &mut root)?;
        Ok(root)
    }
}

/// Command arguments may not nest deeper than this.
pub const MAX_ARGUMENT_DEPTH: usize = 256;

/// A command whose `{...}` argument is being read.
struct Argument {
    command: Element,
    /// Matcher level just inside the opening brace.
    level: usize,
}

/// State of a single [`TexParser::append_ast`] call.
///
/// Open arguments are kept on an explicit stack, not the call stack.
struct Pass<'p> {
    opaque: &'p OpaqueRegistry,
    stream: TexTokenStream<'p>,
    matcher: Matcher,
    arguments: Vec<Argument>,
}

impl Pass<'_> {
    fn bracket_error(&self, err: BracketError) -> Error {
        self.stream.error(ErrorCode::Bracket(err))
    }

    fn update_matcher(&mut self, bracket: char) -> Result<()> {
        self.matcher
            .update(bracket)
            .map_err(|err| self.bracket_error(err))
    }

    /// The element receiving the next entity: the innermost open argument, or `parent`.
    fn target<'a>(arguments: &'a mut [Argument], parent: &'a mut Element) -> &'a mut Element {
        match arguments.last_mut() {
            Some(argument) => &mut argument.command,
            None => parent,
        }
    }

    fn run(&mut self, parent: &mut Element) -> Result<()> {
        while let Some(token) = self.stream.get()? {
            match token {
                TexToken::Bracket('}')
                    if self
                        .arguments
                        .last()
                        .is_some_and(|argument| argument.level == self.matcher.level()) =>
                {
                    self.update_matcher('}')?;
                    if let Some(Argument { command, .. }) = self.arguments.pop() {
                        Self::target(&mut self.arguments, parent).add_element(command);
                    }
                }
                TexToken::Bracket(bracket) => {
                    self.update_matcher(bracket)?;
                    let mut buf = [0; 4];
                    Self::target(&mut self.arguments, parent)
                        .add_text(bracket.encode_utf8(&mut buf));
                }
                TexToken::Command(command) => self.append_command(&command, parent)?,
                TexToken::Punctuation(ch) => {
                    let mut buf = [0; 4];
                    Self::target(&mut self.arguments, parent).add_text(ch.encode_utf8(&mut buf));
                }
                TexToken::Word(text) | TexToken::Whitespace(text) | TexToken::OpaqueString(text) => {
                    Self::target(&mut self.arguments, parent).add_text(&text);
                }
            }
        }
        if !self.arguments.is_empty() || self.matcher.level() != 0 {
            return Err(self.stream.error(ErrorCode::UnexpectedEndOfInput));
        }
        Ok(())
    }

    fn append_command(&mut self, command: &str, parent: &mut Element) -> Result<()> {
        let name = command_name(command);
        let opaque = self.opaque;
        if let Some(parser) = opaque.get(name) {
            let element = self.read_opaque(name, parser)?;
            Self::target(&mut self.arguments, parent).add_element(element);
            return Ok(());
        }

        let element = Element::new(COMMAND_NAME).with_attribute(COMMAND_NAME_ATTRIBUTE, name);
        if !self.stream.matches(TexTokenKind::Bracket, Some("{"))? {
            Self::target(&mut self.arguments, parent).add_element(element);
            return Ok(());
        }
        if self.arguments.len() == MAX_ARGUMENT_DEPTH {
            return Err(self
                .stream
                .error(ErrorCode::NestingTooDeep(MAX_ARGUMENT_DEPTH)));
        }
        self.stream.get()?;
        self.update_matcher('{')?;
        self.arguments.push(Argument {
            command: element,
            level: self.matcher.level(),
        });
        Ok(())
    }

    fn read_opaque(&mut self, left: &str, parser: &dyn OpaqueParser) -> Result<Element> {
        let right = parser.right_command();
        trace!("Opaque command: \\{} ... \\{}", left, right);
        let mut element = Element::new(COMMAND_NAME)
            .with_attribute(LEFT_NAME_ATTRIBUTE, left)
            .with_attribute(RIGHT_NAME_ATTRIBUTE, right);
        let opaque_string = self.stream.get_kind(TexTokenKind::OpaqueString)?;
        parser.append_ast(&opaque_string.value(), &mut element)?;

        // TexLexer ends an opaque string only at its right command
        let closing = self.stream.get_kind(TexTokenKind::Command)?.value().into_owned();
        let found = command_name(&closing);
        if found != right {
            return Err(self.stream.error(ErrorCode::UnexpectedRightCommand {
                expected: right.to_string(),
                found: found.to_string(),
            }));
        }
        Ok(element)
    }
}

/// Command name without the leading backslash.
fn command_name(command: &str) -> &str {
    command.strip_prefix('\\').unwrap_or(command)
}

/// Field handler parsing the value as TeX into an element named after the field.
#[derive(Debug, Clone, Default)]
pub struct TexFieldHandler {
    tex: TexParser,
}

impl TexFieldHandler {
    pub fn new(tex: TexParser) -> Self {
        Self { tex }
    }
}

impl FieldHandler for TexFieldHandler {
    fn append_field(&self, name: &str, value: &str, parent: &mut Element) -> Result<()> {
        let mut element = Element::new(field_tag(name));
        self.tex.append_ast(value.trim(), &mut element)?;
        parent.add_element(element);
        Ok(())
    }
}
