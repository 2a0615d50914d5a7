use std::fmt;

use crate::error::Result;
use crate::naming::field_tag;
use crate::tree::Element;

/// Handler of the raw value of a bibliography field.
///
/// The handler receives the field name, the value between its delimiters and the `entry`
/// element, and appends whatever it makes of the value to the entry. Closures with the same
/// signature are handlers too.
pub trait FieldHandler: Send + Sync {
    fn append_field(&self, name: &str, value: &str, parent: &mut Element) -> Result<()>;
}

impl<F> FieldHandler for F
where
    F: Fn(&str, &str, &mut Element) -> Result<()> + Send + Sync,
{
    fn append_field(&self, name: &str, value: &str, parent: &mut Element) -> Result<()> {
        self(name, value, parent)
    }
}

/// Where the value of a field goes.
#[derive(Clone, Copy)]
pub enum FieldRoute<'h> {
    /// The handler registered for the field name.
    Registered(&'h dyn FieldHandler),
    /// The default handler, for names without a registered handler.
    Default(&'h dyn FieldHandler),
    /// Neither exists: a leaf element named after the field holding the trimmed value.
    Builtin,
}

impl FieldRoute<'_> {
    pub fn append_field(self, name: &str, value: &str, parent: &mut Element) -> Result<()> {
        match self {
            Self::Registered(handler) | Self::Default(handler) => {
                handler.append_field(name, value, parent)
            }
            Self::Builtin => {
                append_builtin_field(name, value, parent);
                Ok(())
            }
        }
    }
}

impl fmt::Debug for FieldRoute<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Registered(_) => "Registered",
            Self::Default(_) => "Default",
            Self::Builtin => "Builtin",
        })
    }
}

pub fn append_builtin_field(name: &str, value: &str, parent: &mut Element) {
    parent.add_element(Element::new(field_tag(name)).with_text(value.trim()));
}
