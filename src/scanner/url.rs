//! Bare URL detection with boundary trimming.

use crate::Range;
use crate::cursor::Cursor;
use crate::limits::MAX_LINK_LOOKAHEAD;

/// Scheme prefix at `pos`, case-insensitive. Returns its length.
#[inline]
pub fn scheme_len(input: &str, pos: usize, end: usize) -> Option<usize> {
    let cursor = Cursor::window(input, pos, end);
    if cursor.at_ignore_case(b"https://") {
        Some(8)
    } else if cursor.at_ignore_case(b"http://") {
        Some(7)
    } else {
        None
    }
}

/// Recognize a bare URL at `pos` and return where it ends.
///
/// The URL must not be glued to a preceding word. It runs until
/// whitespace or a terminator, then loses trailing punctuation and any
/// closing bracket that has no opener inside the URL.
pub fn scan_bare_url(input: &str, pos: usize, end: usize) -> Option<usize> {
    if pos > 0 && input.as_bytes()[pos - 1].is_ascii_alphanumeric() {
        return None;
    }
    let body = pos + scheme_len(input, pos, end)?;
    let url_end = scan_url_body(input, body, end);
    (url_end > body).then_some(url_end)
}

/// End of a URL body starting at `body`, after trimming. Equal to `body`
/// when nothing usable follows.
pub fn scan_url_body(input: &str, body: usize, end: usize) -> usize {
    let mut cursor = Cursor::window(input, body, end);
    while let Some(ch) = cursor.peek_char() {
        if is_terminator(ch) {
            break;
        }
        cursor.bump_char();
    }
    trim_end(input, body, cursor.offset())
}

/// Recognize `<http://...>`. No trimming applies inside the brackets.
/// Returns the URL span and the offset after `>`.
pub fn scan_angle_url(input: &str, pos: usize, end: usize) -> Option<(Range, usize)> {
    let start = pos + 1;
    let body = start + scheme_len(input, start, end)?;
    let limit = end.min(pos + MAX_LINK_LOOKAHEAD);
    let mut cursor = Cursor::window(input, body, end);
    while let Some(ch) = cursor.peek_char() {
        if cursor.offset() >= limit || ch.is_whitespace() || ch == '<' {
            return None;
        }
        if ch == '>' {
            let url_end = cursor.offset();
            return (url_end > body).then(|| (Range::from_usize(start, url_end), url_end + 1));
        }
        cursor.bump_char();
    }
    None
}

/// Characters that can never be part of a bare URL.
fn is_terminator(ch: char) -> bool {
    // is_whitespace covers U+00A0, U+2028, U+2029 and U+3000.
    ch.is_whitespace()
        || matches!(
            ch,
            '<' | '>'
                | '"'
                | '\u{200B}'
                | '\u{FEFF}'
                | '、'
                | '。'
                | '，'
                | '．'
                | '！'
                | '？'
                | '：'
                | '；'
                | '（'
                | '）'
                | '「'
                | '」'
                | '『'
                | '』'
                | '【'
                | '】'
                | '〈'
                | '〉'
                | '《'
                | '》'
        )
}

fn trim_end(input: &str, start: usize, mut end: usize) -> usize {
    let bytes = input.as_bytes();
    while end > start {
        let url = &bytes[start..end];
        let trim = match bytes[end - 1] {
            b'.' | b',' | b';' | b':' | b'!' | b'?' | b'\'' | b'*' => true,
            b')' => unbalanced(url, b'(', b')'),
            b']' => unbalanced(url, b'[', b']'),
            b'}' => unbalanced(url, b'{', b'}'),
            _ => false,
        };
        if !trim {
            break;
        }
        end -= 1;
    }
    end
}

#[inline]
fn unbalanced(url: &[u8], open: u8, close: u8) -> bool {
    let opens = memchr::memchr_iter(open, url).count();
    let closes = memchr::memchr_iter(close, url).count();
    closes > opens
}
