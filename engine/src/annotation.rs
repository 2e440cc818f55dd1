//! Theme metadata embedded in stylesheet text.
//!
//! A style block declares itself a theme with `@@tag value` lines, usually
//! inside a CSS comment:
//!
//! ```css
//! /*
//!  * @@id dark
//!  * @@displayName Dark
//!  * @@description Low-light palette
//!  * @@default
//!  */
//! ```
//!
//! Several tags may share a line, and each tag keeps its first value. A
//! block without a non-empty `@@id` is not a theme.

use crate::theme::Theme;

const TAG_MARKER: &str = "@@";
const COMMENT_END: &str = "*/";

pub const TAG_ID: &str = "id";
pub const TAG_DISPLAY_NAME: &str = "displayName";
pub const TAG_DESCRIPTION: &str = "description";
pub const TAG_DEFAULT: &str = "default";

/// Extracts theme metadata from stylesheet text.
pub fn parse_theme(content: &str) -> Option<Theme> {
    let mut theme = Theme::default();

    for (tag, value) in content.lines().flat_map(|line| line_tags(line)) {
        match tag {
            TAG_ID if !theme.has_id() && !value.is_empty() => theme.id = value.to_string(),
            TAG_DISPLAY_NAME if theme.display_name.is_none() && !value.is_empty() => {
                theme.display_name = Some(value.to_string())
            }
            TAG_DESCRIPTION if theme.description.is_none() && !value.is_empty() => {
                theme.description = Some(value.to_string())
            }
            TAG_DEFAULT => theme.default_theme = Some(true),
            _ => {}
        }
    }

    theme.has_id().then_some(theme)
}

/// Every `@@tag value` pair on a line, in order. A value ends at the next
/// tag marker or the first `*/`, whichever comes first.
fn line_tags(line: &str) -> impl Iterator<Item = (&str, &str)> {
    line.split(TAG_MARKER).skip(1).filter_map(split_tag)
}

/// Splits `tag value */ trailing` (the text after one marker) into
/// `("tag", "value")`.
fn split_tag(segment: &str) -> Option<(&str, &str)> {
    let tag_end = segment
        .find(|c: char| !c.is_ascii_alphanumeric())
        .unwrap_or(segment.len());
    if tag_end == 0 {
        return None;
    }

    let (tag, remainder) = segment.split_at(tag_end);
    // `@@idx` is a different tag, so anything glued to the tag disqualifies it.
    if !remainder.is_empty()
        && !remainder.starts_with(char::is_whitespace)
        && !remainder.starts_with(COMMENT_END)
    {
        return None;
    }

    let value = remainder
        .find(COMMENT_END)
        .map_or(remainder, |end| &remainder[..end]);
    Some((tag, value.trim()))
}
