//! `@mention` and `#qtag` candidates.

use crate::Range;
use crate::cursor::Cursor;
use crate::limits::MAX_LINK_LOOKAHEAD;

#[inline]
fn is_name_char(ch: char) -> bool {
    ch.is_alphanumeric() || matches!(ch, '_' | '-' | '.' | '\'' | '~')
}

/// Whether `@` at `pos` may start a mention.
fn mention_boundary(input: &str, pos: usize) -> bool {
    match input[..pos].chars().next_back() {
        None => true,
        Some(ch) => !(ch.is_alphanumeric() || matches!(ch, '@' | '_' | '/' | '.' | '-' | '&')),
    }
}

/// `@name` at `pos`. Returns the name span and the end of the mention.
pub fn scan_mention(input: &str, pos: usize, end: usize) -> Option<(Range, usize)> {
    if !mention_boundary(input, pos) {
        return None;
    }
    let start = pos + 1;
    let mut cursor = Cursor::window(input, start, end);
    while cursor.peek_char().is_some_and(is_name_char) {
        cursor.bump_char();
    }
    // `@w@` and friends are emoticons
    if cursor.at(b'@') {
        return None;
    }

    let mut name = &input[start..cursor.offset()];
    loop {
        if let Some(rest) = name.strip_suffix("'s") {
            name = rest;
        } else if let Some(rest) = name.strip_suffix(['.', '\'', '-']) {
            name = rest;
        } else {
            break;
        }
    }
    if !name.chars().any(char::is_alphanumeric) {
        return None;
    }
    let name_end = start + name.len();
    Some((Range::from_usize(start, name_end), name_end))
}

/// `<@name with spaces>` at `pos`.
pub fn scan_angle_mention(input: &str, pos: usize, end: usize) -> Option<(Range, usize)> {
    let bytes = input.as_bytes();
    if bytes.get(pos + 1) != Some(&b'@') {
        return None;
    }
    let start = pos + 2;
    let limit = end.min(pos + MAX_LINK_LOOKAHEAD);
    if start >= limit {
        return None;
    }
    let close = start + memchr::memchr3(b'>', b'<', b'\n', &bytes[start..limit])?;
    if bytes[close] != b'>' {
        return None;
    }
    let raw = &input[start..close];
    let name = raw.trim();
    if name.is_empty() {
        return None;
    }
    let lead = raw.len() - raw.trim_start().len();
    Some((
        Range::from_usize(start + lead, start + lead + name.len()),
        close + 1,
    ))
}

/// `#tag` at `pos`. Tags need at least one letter, so `#1` stays text.
pub fn scan_qtag(input: &str, pos: usize, end: usize) -> Option<(Range, usize)> {
    if let Some(prev) = input[..pos].chars().next_back() {
        if prev.is_alphanumeric() || matches!(prev, '&' | '#' | '_') {
            return None;
        }
    }
    let start = pos + 1;
    let mut cursor = Cursor::window(input, start, end);
    while cursor
        .peek_char()
        .is_some_and(|ch| ch.is_alphanumeric() || ch == '_' || ch == '-')
    {
        cursor.bump_char();
    }
    let tag = input[start..cursor.offset()].trim_end_matches('-');
    if !tag.chars().any(char::is_alphabetic) {
        return None;
    }
    let tag_end = start + tag.len();
    Some((Range::from_usize(start, tag_end), tag_end))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mention(input: &str) -> Option<&str> {
        let pos = input.find('@')?;
        scan_mention(input, pos, input.len()).map(|(r, _)| r.slice(input))
    }

    #[test]
    fn test_mention() {
        assert_eq!(mention("@bob"), Some("bob"));
        assert_eq!(mention("hi @bob_smith!"), Some("bob_smith"));
        assert_eq!(mention("@bob's post"), Some("bob"));
        assert_eq!(mention("@bob."), Some("bob"));
        assert_eq!(mention("(@bob)"), Some("bob"));
        assert_eq!(mention("@bob: hi"), Some("bob"));
        assert_eq!(mention("@東方"), Some("東方"));
    }

    #[test]
    fn test_not_mentions() {
        assert_eq!(mention("foo@bar.com"), None);
        assert_eq!(mention("@_@"), None);
        assert_eq!(mention("@w@"), None);
        assert_eq!(mention("@..."), None);
        assert_eq!(mention("@ bob"), None);
    }

    #[test]
    fn test_angle_mention() {
        let input = "<@bob smith>";
        let (range, end) = scan_angle_mention(input, 0, input.len()).unwrap();
        assert_eq!(range.slice(input), "bob smith");
        assert_eq!(end, input.len());
        assert_eq!(scan_angle_mention("<@ >", 0, 4), None);
        assert_eq!(scan_angle_mention("<@bob", 0, 5), None);
    }

    #[test]
    fn test_qtag() {
        let scan = |input: &str| {
            let pos = input.find('#').unwrap();
            scan_qtag(input, pos, input.len()).map(|(r, _)| r.slice(input).to_string())
        };
        assert_eq!(scan("#Fluffy"), Some("Fluffy".into()));
        assert_eq!(scan("a #tag-"), Some("tag".into()));
        assert_eq!(scan("#123"), None);
        assert_eq!(scan("a#tag"), None);
        assert_eq!(scan("#2d_art."), Some("2d_art".into()));
    }
}
