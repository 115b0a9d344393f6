//! Line-start classification shared by the block and inline parsers.

use memchr::memchr;

use super::tag::{BlockMask, TagToken, scan_tag};
use crate::Range;
use crate::cursor::Cursor;
use crate::limits::MAX_LIST_DEPTH;

/// `h1.` through `h6.`, optionally `h2#some-id.`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderMarker {
    pub level: u8,
    pub id: Option<Range>,
    /// Start of the header text.
    pub content: usize,
}

pub fn header_at(input: &str, pos: usize, end: usize) -> Option<HeaderMarker> {
    let mut cursor = Cursor::window(input, pos, end);
    if !cursor.eat_ignore_case(b"h") {
        return None;
    }
    let level = match cursor.peek()? {
        d @ b'1'..=b'6' => d - b'0',
        _ => return None,
    };
    cursor.advance(1);

    let mut id = None;
    if cursor.eat(b'#') {
        let id_start = cursor.offset();
        let line_end = cursor.line_end();
        let dot = memchr(b'.', &input.as_bytes()[id_start..line_end])?;
        if dot == 0 {
            return None;
        }
        id = Some(Range::from_usize(id_start, id_start + dot));
        cursor.advance(dot);
    }

    if !cursor.eat(b'.') {
        return None;
    }
    if !matches!(cursor.peek(), None | Some(b' ' | b'\t' | b'\n')) {
        return None;
    }
    cursor.skip_whitespace();
    Some(HeaderMarker {
        level,
        id,
        content: cursor.offset(),
    })
}

/// `* item`, `** nested`. Returns the clamped depth and content start.
pub fn list_marker_at(input: &str, pos: usize, end: usize) -> Option<(usize, usize)> {
    let mut cursor = Cursor::window(input, pos, end);
    cursor.skip_whitespace();
    let stars = cursor.skip_while(|b| b == b'*');
    if stars == 0 || cursor.skip_whitespace() == 0 {
        return None;
    }
    if cursor.is_eof() || cursor.at(b'\n') {
        return None;
    }
    Some((stars.min(MAX_LIST_DEPTH), cursor.offset()))
}

/// Whether the line starting at `pos` ends the paragraph before it.
pub fn breaks_paragraph(
    input: &str,
    pos: usize,
    end: usize,
    closers: BlockMask,
    block_openers: bool,
) -> bool {
    let mut cursor = Cursor::window(input, pos, end);
    cursor.skip_whitespace();
    if cursor.is_eof() || cursor.at(b'\n') {
        return true;
    }
    let at = cursor.offset();
    if header_at(input, at, end).is_some() || list_marker_at(input, at, end).is_some() {
        return true;
    }
    match scan_tag(input, at, end) {
        Some(TagToken::Open(tag)) => block_openers && tag.name.is_block_capable(),
        Some(TagToken::Close { name, .. }) => closers.contains(name),
        None => false,
    }
}
