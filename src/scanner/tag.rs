//! Bracket (`[b]`) and angle (`<b>`) tag recognition.
//!
//! Tag names resolve through a static dispatch table built once. Names
//! outside the table never become tags, so unknown markup always falls
//! through to escaped text.

use std::sync::LazyLock;

use memchr::memchr3;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::Range;
use crate::cursor::Cursor;
use crate::limits::MAX_TAG_LEN;

/// Every tag the dialect knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagName {
    B,
    I,
    U,
    S,
    Sup,
    Sub,
    Color,
    Url,
    Spoiler,
    Code,
    Nodtext,
    Tn,
    Quote,
    Section,
    Table,
    Thead,
    Tbody,
    Tr,
    Td,
    Th,
    Hr,
    Br,
}

impl TagName {
    /// Containers that always start a new block, even mid-paragraph.
    #[inline]
    pub fn is_container_block(self) -> bool {
        matches!(self, TagName::Quote | TagName::Section | TagName::Table)
    }

    /// Tags that open a block when they start a line.
    #[inline]
    pub fn is_block_capable(self) -> bool {
        matches!(
            self,
            TagName::Quote
                | TagName::Spoiler
                | TagName::Section
                | TagName::Code
                | TagName::Nodtext
                | TagName::Tn
                | TagName::Table
                | TagName::Hr
        )
    }

    #[inline]
    pub fn is_table_part(self) -> bool {
        matches!(
            self,
            TagName::Table
                | TagName::Thead
                | TagName::Tbody
                | TagName::Tr
                | TagName::Td
                | TagName::Th
        )
    }

    /// Tags written as `[name=value]`.
    #[inline]
    fn accepts_value(self) -> bool {
        matches!(
            self,
            TagName::Url | TagName::Color | TagName::Code | TagName::Section
        )
    }

    #[inline]
    const fn bit(self) -> u32 {
        1 << self as u32
    }
}

/// Set of tag names whose closers end the current run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlockMask(u32);

impl BlockMask {
    pub const EMPTY: BlockMask = BlockMask(0);

    #[inline]
    pub fn with(self, name: TagName) -> Self {
        BlockMask(self.0 | name.bit())
    }

    #[inline]
    pub fn contains(self, name: TagName) -> bool {
        self.0 & name.bit() != 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delim {
    Bracket,
    Angle,
}

/// One `name=value` pair from a tag. `value` is `None` when the pair is
/// malformed (missing `=`, empty value, unterminated quote, stray `=`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attr<'a> {
    pub name: &'a str,
    pub value: Option<&'a str>,
}

/// An opening tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag<'a> {
    pub name: TagName,
    pub delim: Delim,
    /// `[name=value]`, quotes stripped.
    pub value: Option<Range>,
    /// `[section,expanded]`
    pub expanded: bool,
    pub attrs: SmallVec<[Attr<'a>; 4]>,
    pub range: Range,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagToken<'a> {
    Open(Tag<'a>),
    Close { name: TagName, range: Range },
}

struct TagInfo {
    name: TagName,
    /// Also recognized as `<name>`.
    angle: bool,
}

/// Longest key in the table.
const MAX_NAME_LEN: usize = 10;

static TAGS: LazyLock<FxHashMap<&'static str, TagInfo>> = LazyLock::new(|| {
    const ENTRIES: &[(&str, TagName, bool)] = &[
        ("b", TagName::B, true),
        ("strong", TagName::B, true),
        ("i", TagName::I, true),
        ("em", TagName::I, true),
        ("u", TagName::U, true),
        ("s", TagName::S, true),
        ("sup", TagName::Sup, true),
        ("sub", TagName::Sub, true),
        ("color", TagName::Color, false),
        ("url", TagName::Url, false),
        ("spoiler", TagName::Spoiler, true),
        ("spoilers", TagName::Spoiler, true),
        ("code", TagName::Code, true),
        ("nodtext", TagName::Nodtext, true),
        ("tn", TagName::Tn, true),
        ("quote", TagName::Quote, true),
        ("blockquote", TagName::Quote, true),
        ("section", TagName::Section, false),
        ("expand", TagName::Section, false),
        ("table", TagName::Table, true),
        ("thead", TagName::Thead, true),
        ("tbody", TagName::Tbody, true),
        ("tr", TagName::Tr, true),
        ("td", TagName::Td, true),
        ("th", TagName::Th, true),
        ("hr", TagName::Hr, true),
        ("br", TagName::Br, true),
    ];
    ENTRIES
        .iter()
        .map(|&(key, name, angle)| (key, TagInfo { name, angle }))
        .collect()
});

fn lookup(name: &str, delim: Delim) -> Option<TagName> {
    if name.is_empty() || name.len() > MAX_NAME_LEN || !name.is_ascii() {
        return None;
    }
    let mut buf = [0u8; MAX_NAME_LEN];
    let lower = &mut buf[..name.len()];
    lower.copy_from_slice(name.as_bytes());
    lower.make_ascii_lowercase();
    let key = std::str::from_utf8(lower).ok()?;
    let info = TAGS.get(key)?;
    (delim == Delim::Bracket || info.angle).then_some(info.name)
}

/// Recognize a tag starting at `pos`. Tags never span lines.
pub fn scan_tag(input: &str, pos: usize, end: usize) -> Option<TagToken<'_>> {
    let bytes = input.as_bytes();
    let (delim, open, close) = match *bytes.get(pos)? {
        b'[' => (Delim::Bracket, b'[', b']'),
        b'<' => (Delim::Angle, b'<', b'>'),
        _ => return None,
    };
    let inner = pos + 1;
    let limit = end.min(pos.saturating_add(MAX_TAG_LEN));
    if inner >= limit {
        return None;
    }
    let stop = inner + memchr3(close, open, b'\n', &bytes[inner..limit])?;
    if bytes[stop] != close {
        return None;
    }
    let range = Range::from_usize(pos, stop + 1);

    if bytes[inner] == b'/' {
        let name = lookup(input[inner + 1..stop].trim_end(), delim)?;
        return Some(TagToken::Close { name, range });
    }

    let name_end = inner
        + bytes[inner..stop]
            .iter()
            .take_while(|b| b.is_ascii_alphanumeric())
            .count();
    let name = lookup(&input[inner..name_end], delim)?;
    let mut tag = Tag {
        name,
        delim,
        value: None,
        expanded: false,
        attrs: SmallVec::new(),
        range,
    };
    parse_tail(input, name_end, stop, &mut tag)?;
    Some(TagToken::Open(tag))
}

/// Everything between the tag name and the closing delimiter.
fn parse_tail<'a>(input: &'a str, start: usize, end: usize, tag: &mut Tag<'a>) -> Option<()> {
    let mut cursor = Cursor::window(input, start, end);
    if cursor.is_eof() {
        return Some(());
    }

    if tag.delim == Delim::Bracket {
        if tag.name == TagName::Section && cursor.eat(b',') {
            if !cursor.eat_ignore_case(b"expanded") {
                return None;
            }
            tag.expanded = true;
            if cursor.is_eof() {
                return Some(());
            }
        }
        let after_name = cursor.offset();
        cursor.skip_whitespace();
        if cursor.eat(b'=') {
            if !tag.name.accepts_value() {
                return None;
            }
            tag.value = Some(parse_value(input, cursor.offset(), end)?);
            return Some(());
        }
        cursor.set_offset(after_name);
    }

    if !tag.name.is_table_part() || !matches!(cursor.peek(), Some(b' ' | b'\t')) {
        return None;
    }
    tag.attrs = parse_attrs(input, cursor.offset(), end);
    Some(())
}

/// A trimmed tag value, with one pair of matching quotes removed.
fn parse_value(input: &str, start: usize, end: usize) -> Option<Range> {
    let raw = &input[start..end];
    let lead = raw.len() - raw.trim_start().len();
    let trimmed = raw.trim();
    let mut value_start = start + lead;
    let mut value_end = value_start + trimmed.len();

    let b = trimmed.as_bytes();
    if b.len() >= 2 && matches!(b[0], b'"' | b'\'') && b[b.len() - 1] == b[0] {
        value_start += 1;
        value_end -= 1;
    }
    (value_start < value_end).then(|| Range::from_usize(value_start, value_end))
}

fn parse_attrs(input: &str, start: usize, end: usize) -> SmallVec<[Attr<'_>; 4]> {
    let mut attrs = SmallVec::new();
    let mut cursor = Cursor::window(input, start, end);
    loop {
        cursor.skip_whitespace();
        if cursor.is_eof() {
            break;
        }
        let name_start = cursor.offset();
        cursor.skip_while(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-');
        let name = &input[name_start..cursor.offset()];
        if name.is_empty() || !cursor.eat(b'=') {
            skip_to_space(&mut cursor);
            attrs.push(Attr { name, value: None });
            continue;
        }

        let value = match cursor.peek() {
            Some(quote @ (b'"' | b'\'')) => {
                cursor.advance(1);
                let value_start = cursor.offset();
                match cursor.find(quote) {
                    Some(n) => {
                        cursor.advance(n + 1);
                        Some(&input[value_start..value_start + n])
                    }
                    None => {
                        // unterminated quote swallows the rest
                        cursor.set_offset(end);
                        None
                    }
                }
            }
            _ => {
                let value_start = cursor.offset();
                skip_to_space(&mut cursor);
                Some(&input[value_start..cursor.offset()])
            }
        };
        let value = value.filter(|v| !v.is_empty() && !v.contains('='));
        attrs.push(Attr { name, value });
    }
    attrs
}

#[inline]
fn skip_to_space(cursor: &mut Cursor<'_>) {
    cursor.skip_while(|b| b != b' ' && b != b'\t');
}

/// Find the next closing tag `name` in `[from, end)`, in either delimiter.
pub fn find_close_tag(input: &str, from: usize, end: usize, name: TagName) -> Option<Range> {
    let bytes = input.as_bytes();
    let mut pos = from;
    while pos < end {
        let hit = pos + memchr::memchr2(b'[', b'<', &bytes[pos..end])?;
        if bytes.get(hit + 1) == Some(&b'/') {
            if let Some(TagToken::Close { name: found, range }) = scan_tag(input, hit, end) {
                if found == name {
                    return Some(range);
                }
            }
        }
        pos = hit + 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open(input: &str) -> Tag<'_> {
        match scan_tag(input, 0, input.len()) {
            Some(TagToken::Open(tag)) => tag,
            other => panic!("expected open tag for {input:?}, got {other:?}"),
        }
    }

    #[test]
    fn test_simple_tags() {
        assert_eq!(open("[b]").name, TagName::B);
        assert_eq!(open("[B]").name, TagName::B);
        assert_eq!(open("<strong>").name, TagName::B);
        assert_eq!(open("[SPOILERS]").name, TagName::Spoiler);
        assert_eq!(open("[expand]").name, TagName::Section);
        assert_eq!(open("<blockquote>").name, TagName::Quote);
    }

    #[test]
    fn test_close_tags() {
        assert_eq!(
            scan_tag("[/quote]", 0, 8),
            Some(TagToken::Close {
                name: TagName::Quote,
                range: Range::new(0, 8)
            })
        );
        assert!(matches!(
            scan_tag("</b>", 0, 4),
            Some(TagToken::Close { name: TagName::B, .. })
        ));
    }

    #[test]
    fn test_unknown_and_angle_only() {
        assert_eq!(scan_tag("[script]", 0, 8), None);
        assert_eq!(scan_tag("<url>", 0, 5), None);
        assert_eq!(scan_tag("<color>", 0, 7), None);
        assert_eq!(scan_tag("<section>", 0, 9), None);
        assert_eq!(scan_tag("[b\n]", 0, 4), None);
        assert_eq!(scan_tag("[b", 0, 2), None);
    }

    #[test]
    fn test_values() {
        let input = "[url=https://example.com]";
        let tag = open(input);
        assert_eq!(tag.value.unwrap().slice(input), "https://example.com");

        let input = "[url = \"https://example.com\"]";
        let tag = open(input);
        assert_eq!(tag.value.unwrap().slice(input), "https://example.com");

        assert_eq!(scan_tag("[color=]", 0, 8), None);
        assert_eq!(scan_tag("[b=1]", 0, 5), None);
    }

    #[test]
    fn test_section_modifiers() {
        let tag = open("[section,expanded]");
        assert!(tag.expanded);
        assert!(tag.value.is_none());

        let input = "[section,expanded=Title]";
        let tag = open(input);
        assert!(tag.expanded);
        assert_eq!(tag.value.unwrap().slice(input), "Title");

        assert_eq!(scan_tag("[section,collapsed]", 0, 19), None);
    }

    #[test]
    fn test_attrs() {
        let tag = open("[td colspan=2 align=\"center\"]");
        assert_eq!(tag.attrs.len(), 2);
        assert_eq!(tag.attrs[0], Attr { name: "colspan", value: Some("2") });
        assert_eq!(tag.attrs[1], Attr { name: "align", value: Some("center") });
    }

    #[test]
    fn test_malformed_attrs() {
        let tag = open("[td colspan==2 rowspan align='left]");
        assert_eq!(tag.attrs[0].value, None);
        assert_eq!(tag.attrs[1], Attr { name: "rowspan", value: None });
        assert_eq!(tag.attrs[2].value, None);

        let tag = open("[td colspan=\"\"]");
        assert_eq!(tag.attrs[0].value, None);
    }

    #[test]
    fn test_glued_attribute_is_not_a_tag() {
        assert_eq!(scan_tag("[tdcolspan=2]", 0, 13), None);
        assert_eq!(scan_tag("[b foo]", 0, 7), None);
    }

    #[test]
    fn test_find_close_tag() {
        let input = "a [b]x[/B] [/code]";
        let found = find_close_tag(input, 0, input.len(), TagName::Code).unwrap();
        assert_eq!(found.slice(input), "[/code]");
        assert_eq!(find_close_tag(input, 0, input.len(), TagName::Quote), None);
        let input = "x</code>";
        assert!(find_close_tag(input, 0, input.len(), TagName::Code).is_some());
    }

    #[test]
    fn test_block_mask() {
        let mask = BlockMask::EMPTY.with(TagName::Quote).with(TagName::Td);
        assert!(mask.contains(TagName::Quote));
        assert!(mask.contains(TagName::Td));
        assert!(!mask.contains(TagName::Section));
    }
}
