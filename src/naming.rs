pub const TEX_ROOT_NAME: &str = "tex";
pub const BIB_ROOT_NAME: &str = "texbib";

pub const COMMAND_NAME: &str = "command";
pub const COMMAND_NAME_ATTRIBUTE: &str = "name";
pub const LEFT_NAME_ATTRIBUTE: &str = "left-name";
pub const RIGHT_NAME_ATTRIBUTE: &str = "right-name";

pub const ENTRY_NAME: &str = "entry";
pub const ENTRY_TYPE_ATTRIBUTE: &str = "type";
pub const ENTRY_ID_ATTRIBUTE: &str = "id";

pub const AUTHOR_NAME: &str = "author";
pub const MEMBER_NAME: &str = "member";
pub const SURNAME_NAME: &str = "surname";
pub const FIRST_NAME_NAME: &str = "first-name";

/// Element name for a field: every run of characters other than ASCII letters and digits
/// (underscores included) becomes a single `-`.
pub fn field_tag(field_name: &str) -> String {
    let mut tag = String::with_capacity(field_name.len());
    let mut in_run = false;
    for ch in field_name.chars() {
        if ch.is_ascii_alphanumeric() {
            tag.push(ch);
            in_run = false;
        } else if !in_run {
            tag.push('-');
            in_run = true;
        }
    }
    tag
}
