use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};
use unicase::UniCase;

use super::field::{FieldHandler, FieldRoute};
use super::lexer::{BibLexer, BibToken, BibTokenKind, BibTokenStream, closing_delimiter};
use crate::error::{ErrorCode, Result};
use crate::input::Token;
use crate::naming::{BIB_ROOT_NAME, ENTRY_ID_ATTRIBUTE, ENTRY_NAME, ENTRY_TYPE_ATTRIBUTE};
use crate::tree::Element;

/// Parser of a bibliography.
///
/// Each entry becomes an `entry` element with `type` and `id` attributes. The raw value of each
/// field is handed to the handler registered for the field name, else to the default handler,
/// else turned into a leaf element by [`FieldRoute::Builtin`]. Field names are matched
/// case-insensitively.
///
/// ```
/// use texbib::bib::BibParser;
/// use texbib::tex::TexFieldHandler;
///
/// let parser = BibParser::builder()
///     .field("title", TexFieldHandler::default())
///     .build();
/// let bib = parser
///     .parse(r#"@book{knuth-1984, title = {The \TeX book}, year = "1984"}"#)
///     .unwrap();
///
/// let entry = bib.element("entry").unwrap();
/// assert_eq!(entry.attribute("type"), Some("book"));
/// assert_eq!(entry.attribute("id"), Some("knuth-1984"));
/// assert!(entry.element("title").unwrap().element("command").is_some());
/// assert_eq!(entry.element("year").unwrap().text(), "1984");
/// ```
#[derive(Clone, Default)]
pub struct BibParser {
    fields: HashMap<UniCase<String>, Arc<dyn FieldHandler>>,
    default_field: Option<Arc<dyn FieldHandler>>,
}

impl fmt::Debug for BibParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut fields: Vec<String> = self.fields.keys().map(ToString::to_string).collect();
        fields.sort_unstable();
        f.debug_struct("BibParser")
            .field("fields", &fields)
            .field("default_field", &self.default_field.is_some())
            .finish()
    }
}

impl BibParser {
    /// A parser turning every field into a leaf element.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> BibParserBuilder {
        BibParserBuilder::default()
    }

    /// Where the value of the field `name` goes.
    pub fn route(&self, name: &str) -> FieldRoute<'_> {
        if let Some(handler) = self.fields.get(&UniCase::new(name.to_owned())) {
            FieldRoute::Registered(handler.as_ref())
        } else if let Some(handler) = &self.default_field {
            FieldRoute::Default(handler.as_ref())
        } else {
            FieldRoute::Builtin
        }
    }

    /// Parse `input` and append an `entry` element to `parent` for each entry.
    pub fn append_ast(&self, input: &str, parent: &mut Element) -> Result<()> {
        debug!("Parsing bibliography: {} bytes", input.len());
        let mut stream = BibLexer::stream(input);
        while !stream.at_end()? {
            self.append_entry(&mut stream, parent)?;
        }
        Ok(())
    }

    /// Parse `input` into a new `texbib` element.
    pub fn parse(&self, input: &str) -> Result<Element> {
        let mut root = Element::new(BIB_ROOT_NAME);
        self.append_ast(input, &mut root)?;
        Ok(root)
    }

    fn append_entry(&self, stream: &mut BibTokenStream, parent: &mut Element) -> Result<()> {
        let entry_type = stream.get_kind(BibTokenKind::EntryType)?.value().into_owned();
        let mut entry = Element::new(ENTRY_NAME).with_attribute(
            ENTRY_TYPE_ATTRIBUTE,
            entry_type.strip_prefix('@').unwrap_or(&entry_type),
        );
        stream.skip(BibTokenKind::Bracket, "{")?;
        let id = stream.get_kind(BibTokenKind::Identifier)?;
        entry.set_attribute(ENTRY_ID_ATTRIBUTE, id.value());
        stream.skip(BibTokenKind::Punctuation, ",")?;

        while !stream.matches(BibTokenKind::Bracket, Some("}"))? {
            if stream.at_end()? {
                return Err(stream.error(ErrorCode::UnexpectedEndOfInput));
            }
            self.append_field(stream, &mut entry)?;
        }
        stream.get()?;
        parent.add_element(entry);
        Ok(())
    }

    fn append_field(&self, stream: &mut BibTokenStream, entry: &mut Element) -> Result<()> {
        let name = stream.get_kind(BibTokenKind::Identifier)?.value().into_owned();
        stream.skip(BibTokenKind::Operator, "=")?;
        let delimiter = match stream.get()? {
            Some(BibToken::Bracket('{')) => '{',
            Some(BibToken::Punctuation('"')) => '"',
            Some(token) => {
                return Err(stream.error(ErrorCode::UnexpectedToken(token.value().into_owned())));
            }
            None => return Err(stream.error(ErrorCode::UnexpectedEndOfInput)),
        };
        let value = stream.get_kind(BibTokenKind::String)?.value().into_owned();

        let route = self.route(&name);
        trace!("Field {}: {:?}", name, route);
        route.append_field(&name, &value, entry)?;

        let closing = closing_delimiter(delimiter);
        match stream.get()? {
            Some(BibToken::Bracket(ch) | BibToken::Punctuation(ch)) if ch == closing => {}
            Some(token) => {
                return Err(stream.error(ErrorCode::UnexpectedTokenValue {
                    expected: closing.to_string(),
                    found: token.value().into_owned(),
                }));
            }
            None => return Err(stream.error(ErrorCode::UnexpectedEndOfInput)),
        }
        if stream.matches(BibTokenKind::Punctuation, Some(","))? {
            stream.get()?;
        }
        Ok(())
    }
}

/// Builder of a [`BibParser`].
#[derive(Default)]
pub struct BibParserBuilder {
    parser: BibParser,
}

impl BibParserBuilder {
    /// Handle the field `name` with `handler`, replacing any handler given before.
    pub fn field(mut self, name: &str, handler: impl FieldHandler + 'static) -> Self {
        self.parser
            .fields
            .insert(UniCase::new(name.to_owned()), Arc::new(handler));
        self
    }

    /// Handle fields without a handler of their own with `handler`.
    pub fn default_field(mut self, handler: impl FieldHandler + 'static) -> Self {
        self.parser.default_field = Some(Arc::new(handler));
        self
    }

    pub fn build(self) -> BibParser {
        self.parser
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Position};
    use crate::tree::Node;

    const BJORCK: &str = r#"
@article{bjorck-1994,
  author = "Bj{\"{o}}rck, {\r{A}}ke",
  title = {Numerics of {Gram-Schmidt} Orthogonalization},
  journal = "Linear Algebra and its Applications",
  ISSN_L = {0024-3795}
}
"#;

    fn leaf(name: &str, text: &str) -> Node {
        let mut element = Element::new(name);
        element.add_text(text);
        Node::Element(element)
    }

    #[test]
    fn test_builtin_fields() {
        let root = BibParser::new().parse(BJORCK).unwrap();
        assert_eq!(root.name(), "texbib");
        assert_eq!(root.children().len(), 1);

        let entry = root.element("entry").unwrap();
        assert_eq!(entry.attribute("type"), Some("article"));
        assert_eq!(entry.attribute("id"), Some("bjorck-1994"));
        assert_eq!(
            entry.children(),
            &[
                leaf("author", r#"Bj{\"{o}}rck, {\r{A}}ke"#),
                leaf("title", "Numerics of {Gram-Schmidt} Orthogonalization"),
                leaf("journal", "Linear Algebra and its Applications"),
                leaf("ISSN-L", "0024-3795"),
            ]
        );
    }

    #[test]
    fn test_quoted_and_braced_values_agree() {
        let parser = BibParser::new();
        let quoted = parser.parse(r#"@misc{a, note = " x {y} "}"#).unwrap();
        let braced = parser.parse(r#"@misc{a, note = { x {y} }}"#).unwrap();
        assert_eq!(quoted, braced);
        assert_eq!(
            quoted.element("entry").unwrap().element("note").unwrap().text(),
            "x {y}"
        );
    }

    #[test]
    fn test_several_entries() {
        let input = "@book{a,}\n@misc{b, title = {T},}\n@misc{c, title={U}}";
        let root = BibParser::new().parse(input).unwrap();
        let ids: Vec<_> = root
            .elements()
            .map(|entry| entry.attribute("id").unwrap())
            .collect();
        assert_eq!(ids, ["a", "b", "c"]);
        assert!(root.element("entry").unwrap().is_empty());
    }

    #[test]
    fn test_routing() {
        let parser = BibParser::builder()
            .field(
                "Title",
                |_: &str, value: &str, entry: &mut Element| -> Result<()> {
                    entry.add_element(Element::new("heading").with_text(value));
                    Ok(())
                },
            )
            .default_field(|name: &str, _: &str, entry: &mut Element| -> Result<()> {
                entry.add_element(Element::new("other").with_attribute("name", name));
                Ok(())
            })
            .build();
        assert!(matches!(parser.route("TITLE"), FieldRoute::Registered(_)));
        assert!(matches!(parser.route("year"), FieldRoute::Default(_)));
        assert!(matches!(BibParser::new().route("year"), FieldRoute::Builtin));

        let root = parser.parse("@misc{k, title = {T}, year = {2000}}").unwrap();
        let entry = root.element("entry").unwrap();
        assert_eq!(entry.element("heading").unwrap().text(), "T");
        assert_eq!(
            entry.element("other").unwrap().attribute("name"),
            Some("year")
        );
        assert_eq!(
            format!("{parser:?}"),
            r#"BibParser { fields: ["Title"], default_field: true }"#
        );
    }

    #[test]
    fn test_handler_error_propagates() {
        let parser = BibParser::builder()
            .default_field(|_: &str, _: &str, _: &mut Element| -> Result<()> {
                Err(Error::new(ErrorCode::EmptyMember, Position::new(1, 3)))
            })
            .build();
        let err = parser.parse("@misc{k, author = {x}}").unwrap_err();
        assert_eq!(err.code(), &ErrorCode::EmptyMember);
        assert_eq!(err.position(), Position::new(1, 3));
    }

    #[test]
    fn test_errors() {
        let parser = BibParser::new();
        let code = |input: &str| parser.parse(input).unwrap_err().code().clone();

        assert_eq!(code("@misc{k, title = {T}"), ErrorCode::UnexpectedEndOfInput);
        assert_eq!(
            code("@misc{k, title = x}"),
            ErrorCode::UnexpectedToken("x".to_string())
        );
        assert_eq!(
            code("@misc{k, title = (x)}"),
            ErrorCode::UnexpectedToken("(".to_string())
        );
        assert_eq!(
            code("@misc{k title = {x}}"),
            ErrorCode::UnexpectedTokenType {
                expected: "punctuation",
                found: Some("identifier")
            }
        );
        assert_eq!(
            code("@misc(k, title = {x})"),
            ErrorCode::UnexpectedTokenValue {
                expected: "{".to_string(),
                found: "(".to_string()
            }
        );
        assert_eq!(code("% comment"), ErrorCode::UnrecognizedCharacter('%'));
        assert_eq!(
            code("misc{k,}"),
            ErrorCode::UnexpectedTokenType {
                expected: "entry_type",
                found: Some("identifier")
            }
        );
    }

    #[test]
    fn test_error_position() {
        let err = BibParser::new()
            .parse("@misc{k,\n  title = {T},\n  year = 2000\n}")
            .unwrap_err();
        assert_eq!(err.code(), &ErrorCode::UnrecognizedCharacter('2'));
        assert_eq!(err.line(), 3);
    }
}
