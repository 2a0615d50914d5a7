use std::sync::Arc;

use tracing::{debug, trace};

use super::lexer::{AuthorLexer, AuthorToken, AuthorTokenKind, AuthorTokenStream};
use crate::bib::FieldHandler;
use crate::error::{ErrorCode, Result};
use crate::input::Token;
use crate::naming::{AUTHOR_NAME, FIRST_NAME_NAME, MEMBER_NAME, SURNAME_NAME};
use crate::tex::{OpaqueParser, TexParser};
use crate::tree::Element;

/// Parser of a list of authors, such as the value of an `author` field.
///
/// Members are separated by the word `and`. A member is written either surname first,
/// `Bj{\"{o}}rck, {\r{A}}ke`, or first names first, `{\r{A}}ke Bj{\"{o}}rck`, where a trailing
/// `{...}` group is taken as the surname as a whole. Surname and first names are each parsed as
/// TeX.
///
/// The parser is also an [`OpaqueParser`] for the pair of commands it is created with, and a
/// [`FieldHandler`] appending its `author` element to the entry.
#[derive(Debug, Clone)]
pub struct AuthorParser {
    left_command: String,
    right_command: String,
    tex: TexParser,
}

/// The name tokens of one member, split into surname and first names.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Member {
    surname: String,
    first_name: String,
}

impl AuthorParser {
    pub fn new(left_command: impl Into<String>, right_command: impl Into<String>) -> Self {
        Self {
            left_command: left_command.into(),
            right_command: right_command.into(),
            tex: TexParser::new(),
        }
    }

    /// An author parser whose names may contain the opaque commands of `parsers`.
    pub fn with_opaque_parsers<I>(
        left_command: impl Into<String>,
        right_command: impl Into<String>,
        parsers: I,
    ) -> Self
    where
        I: IntoIterator<Item = Arc<dyn OpaqueParser>>,
    {
        Self {
            left_command: left_command.into(),
            right_command: right_command.into(),
            tex: TexParser::with_opaque_parsers(parsers),
        }
    }

    /// Parse `input` and append an `author` element with one `member` per author to `parent`.
    pub fn append_ast(&self, input: &str, parent: &mut Element) -> Result<()> {
        parent.add_element(self.parse(input)?);
        Ok(())
    }

    /// Parse `input` into a new `author` element.
    pub fn parse(&self, input: &str) -> Result<Element> {
        let mut author = Element::new(AUTHOR_NAME);
        self.append_members(input, &mut author)?;
        Ok(author)
    }

    fn append_members(&self, input: &str, author: &mut Element) -> Result<()> {
        debug!("Parsing authors: {} bytes", input.len());
        let mut stream = AuthorLexer::stream(input);
        while !stream.at_end()? {
            let member = read_member(&mut stream)?;
            trace!("Member: surname {:?}, first name {:?}", member.surname, member.first_name);
            let mut surname = Element::new(SURNAME_NAME);
            self.tex.append_ast(&member.surname, &mut surname)?;
            let mut first_name = Element::new(FIRST_NAME_NAME);
            self.tex.append_ast(&member.first_name, &mut first_name)?;

            let mut element = Element::new(MEMBER_NAME);
            element.add_element(surname);
            element.add_element(first_name);
            author.add_element(element);
        }
        Ok(())
    }
}

impl OpaqueParser for AuthorParser {
    fn left_command(&self) -> &str {
        &self.left_command
    }

    fn right_command(&self) -> &str {
        &self.right_command
    }

    fn append_ast(&self, input: &str, parent: &mut Element) -> Result<()> {
        AuthorParser::append_ast(self, input, parent)
    }
}

impl FieldHandler for AuthorParser {
    fn append_field(&self, _name: &str, value: &str, parent: &mut Element) -> Result<()> {
        self.append_ast(value, parent)
    }
}

/// Read the tokens up to the next `and` or the end, and consume the `and`.
fn read_member(stream: &mut AuthorTokenStream) -> Result<Member> {
    let mut tokens = Vec::new();
    while !stream.at_end()? && !stream.matches(AuthorTokenKind::Word, Some("and"))? {
        if let Some(token) = stream.get()? {
            tokens.push(token);
        }
    }
    stream.get()?;
    let member = if tokens.iter().any(is_comma) {
        split_surname_first(&tokens)
    } else {
        split_first_name_first(trim_whitespace(&tokens))
    };
    member.ok_or_else(|| stream.error(ErrorCode::EmptyMember))
}

fn is_comma(token: &AuthorToken) -> bool {
    *token == AuthorToken::Punctuation(',')
}

fn trim_whitespace(mut tokens: &[AuthorToken]) -> &[AuthorToken] {
    while let [AuthorToken::Whitespace(_), rest @ ..] = tokens {
        tokens = rest;
    }
    while let [rest @ .., AuthorToken::Whitespace(_)] = tokens {
        tokens = rest;
    }
    tokens
}

/// Concatenate token values, whitespace collapsed into one space.
fn join(tokens: &[AuthorToken]) -> String {
    let mut text = String::new();
    for token in tokens {
        match token {
            AuthorToken::Whitespace(_) => text.push(' '),
            AuthorToken::Punctuation(_) => {}
            _ => text.push_str(&token.value()),
        }
    }
    text
}

/// `surname, first names`: the surname ends at the first comma and the first names start
/// after the last one.
fn split_surname_first(tokens: &[AuthorToken]) -> Option<Member> {
    let first = tokens.iter().position(is_comma)?;
    let last = tokens.iter().rposition(is_comma)?;
    Some(Member {
        surname: join(&tokens[..first]).trim().to_string(),
        first_name: join(&tokens[last + 1..]).trim().to_string(),
    })
}

/// `first names surname`: the surname is the last token, or the trailing `{...}` group without
/// its braces.
fn split_first_name_first(tokens: &[AuthorToken]) -> Option<Member> {
    let (surname, rest) = match tokens {
        [
            rest @ ..,
            AuthorToken::Bracket('{'),
            AuthorToken::String(surname),
            AuthorToken::Bracket('}'),
        ] => (surname.clone(), rest),
        [rest @ .., last] => (last.value().into_owned(), rest),
        [] => return None,
    };
    let first_name = rest
        .iter()
        .filter(|token| matches!(token, AuthorToken::Word(_) | AuthorToken::String(_)))
        .map(|token| token.value().trim().to_string())
        .collect::<Vec<_>>()
        .join(" ");
    Some(Member {
        surname: surname.trim().to_string(),
        first_name: first_name.trim().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> AuthorParser {
        AuthorParser::new("bauthor", "eauthor")
    }

    fn members(input: &str) -> Vec<(String, String)> {
        parser()
            .parse(input)
            .unwrap()
            .elements()
            .map(|member| {
                (
                    member.element("surname").unwrap().text_content(),
                    member.element("first-name").unwrap().text_content(),
                )
            })
            .collect()
    }

    fn pair(surname: &str, first_name: &str) -> (String, String) {
        (surname.to_string(), first_name.to_string())
    }

    #[test]
    fn test_surname_first() {
        assert_eq!(
            members("Bjorck, Ake and Smith, John"),
            vec![pair("Bjorck", "Ake"), pair("Smith", "John")]
        );
        assert_eq!(
            members("van  der Berg, Jan  Piet"),
            vec![pair("van der Berg", "Jan Piet")]
        );
        // the first names start after the last comma
        assert_eq!(
            members("Ford, Jr., Henry"),
            vec![pair("Ford", "Henry")]
        );
        assert_eq!(members("Cher,"), vec![pair("Cher", "")]);
    }

    #[test]
    fn test_first_name_first() {
        assert_eq!(
            members("Donald E. Knuth and  Leslie Lamport "),
            vec![pair("Knuth", "Donald E."), pair("Lamport", "Leslie")]
        );
        assert_eq!(
            members("John {Barnes and Noble}"),
            vec![pair("Barnes and Noble", "John")]
        );
        assert_eq!(members("Plato"), vec![pair("Plato", "")]);
    }

    #[test]
    fn test_names_are_tex() {
        let author = parser().parse(r#"Bj{\"{o}}rck, {\r{A}}ke"#).unwrap();
        assert_eq!(author.name(), "author");
        let member = author.element("member").unwrap();

        let surname = member.element("surname").unwrap();
        assert_eq!(surname.text(), "Bj{}rck");
        let umlaut = surname.element("command").unwrap();
        assert_eq!(umlaut.attribute("name"), Some("\""));
        assert_eq!(umlaut.text(), "o");

        let first_name = member.element("first-name").unwrap();
        assert_eq!(first_name.text(), "{}ke");
        assert_eq!(
            first_name.element("command").unwrap().attribute("name"),
            Some("r")
        );
    }

    #[test]
    fn test_empty_input() {
        let author = parser().parse("").unwrap();
        assert!(author.is_empty());
    }

    #[test]
    fn test_empty_member() {
        for input in ["and Smith", "Smith and  and Jones", "  "] {
            let err = parser().parse(input).unwrap_err();
            assert_eq!(err.code(), &ErrorCode::EmptyMember, "{input}");
        }
    }

    #[test]
    fn test_opaque_parser() {
        let authors: Arc<dyn OpaqueParser> = Arc::new(parser());
        assert_eq!(authors.left_command(), "bauthor");
        assert_eq!(authors.right_command(), "eauthor");

        let tex = TexParser::with_opaque_parsers([authors])
            .parse(r"by \bauthor Knuth, Donald\eauthor end")
            .unwrap();
        let command = tex.element("command").unwrap();
        assert_eq!(command.attribute("right-name"), Some("eauthor"));
        let member = command.element("author").unwrap().element("member").unwrap();
        assert_eq!(member.element("surname").unwrap().text(), "Knuth");
        assert_eq!(member.element("first-name").unwrap().text(), "Donald");
    }

    #[test]
    fn test_field_handler() {
        let mut entry = Element::new("entry");
        FieldHandler::append_field(&parser(), "editor", "A. Editor", &mut entry).unwrap();
        let member = entry.element("author").unwrap().element("member").unwrap();
        assert_eq!(member.element("surname").unwrap().text(), "Editor");
    }

    #[test]
    fn test_reuse() {
        let parser = parser();
        let input = r#"Bj{\"{o}}rck, Ake and Smith, John"#;
        let first = parser.parse(input).unwrap();
        assert!(parser.parse("a}").is_err());
        assert_eq!(parser.parse(input).unwrap(), first);
        assert_eq!(AuthorParser::new("x", "y").parse(input).unwrap(), first);
    }
}
