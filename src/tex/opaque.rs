use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::tree::Element;

/// A parser for the text enclosed by a pair of TeX commands.
///
/// The TeX parser does not tokenize the text between `\left_command` and `\right_command` with
/// its own grammar. The whole span, called the opaque string, is handed to
/// [`OpaqueParser::append_ast`] instead.
pub trait OpaqueParser: Send + Sync {
    /// Left opaque command without the leading backslash.
    fn left_command(&self) -> &str;

    /// Right opaque command without the leading backslash.
    fn right_command(&self) -> &str;

    /// Parse `input` and append its tree to `parent`.
    fn append_ast(&self, input: &str, parent: &mut Element) -> Result<()>;
}

impl fmt::Debug for dyn OpaqueParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpaqueParser")
            .field("left_command", &self.left_command())
            .field("right_command", &self.right_command())
            .finish()
    }
}

/// Opaque parsers keyed by their left command.
///
/// Built once from the registered parsers and never modified afterwards. When two parsers share
/// a left command, the one registered last wins.
#[derive(Debug, Clone, Default)]
pub struct OpaqueRegistry {
    parsers: HashMap<String, Arc<dyn OpaqueParser>>,
    commands: HashMap<String, String>,
}

impl OpaqueRegistry {
    pub fn new<I>(parsers: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn OpaqueParser>>,
    {
        let mut registry = Self::default();
        for parser in parsers {
            let left = parser.left_command().to_string();
            registry
                .commands
                .insert(left.clone(), parser.right_command().to_string());
            registry.parsers.insert(left, parser);
        }
        registry
    }

    /// The parser registered for `left_command`.
    pub fn get(&self, left_command: &str) -> Option<&dyn OpaqueParser> {
        self.parsers.get(left_command).map(Arc::as_ref)
    }

    /// The right command paired with `left_command`.
    pub fn right_command(&self, left_command: &str) -> Option<&str> {
        self.commands.get(left_command).map(String::as_str)
    }

    /// Left to right command mapping, as the tokenizer needs it.
    pub fn commands(&self) -> &HashMap<String, String> {
        &self.commands
    }

    /// The registered parsers, in no particular order.
    pub fn parsers(&self) -> impl Iterator<Item = &Arc<dyn OpaqueParser>> {
        self.parsers.values()
    }

    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }
}
