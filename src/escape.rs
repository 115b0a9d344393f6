//! HTML escaping and URL component encoding.
//!
//! Fast-path optimized: scans for the first escapable byte with memchr,
//! then bulk-copies segments between escapes.

use std::borrow::Cow;

use memchr::{memchr, memchr2, memchr3};
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

/// Lookup table for escapable bytes in text content.
/// `"` is escaped too so text can never close an attribute it lands in.
const TEXT_ESCAPE_TABLE: [bool; 256] = {
    let mut table = [false; 256];
    table[b'<' as usize] = true;
    table[b'>' as usize] = true;
    table[b'&' as usize] = true;
    table[b'"' as usize] = true;
    table
};

/// Lookup table for escapable bytes in attribute values.
const ATTR_ESCAPE_TABLE: [bool; 256] = {
    let mut table = TEXT_ESCAPE_TABLE;
    table[b'\'' as usize] = true;
    table
};

/// Bytes percent-encoded in a wiki title path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'+')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Bytes percent-encoded in a query-string value. Search operators such
/// as a leading `-` or `~` pass through untouched.
const QUERY_VALUE: &AsciiSet = &PATH_SEGMENT.add(b'=').add(b';');

/// Escape HTML text content into output buffer.
///
/// # Example
/// ```
/// use dtext::escape::escape_text_into;
///
/// let mut out = Vec::new();
/// escape_text_into(&mut out, b"<script>");
/// assert_eq!(out, b"&lt;script&gt;");
/// ```
#[inline]
pub fn escape_text_into(out: &mut Vec<u8>, input: &[u8]) {
    match first_text_escape(input) {
        Some(pos) => escape_from(out, input, pos, &TEXT_ESCAPE_TABLE),
        None => out.extend_from_slice(input),
    }
}

/// Escape an HTML attribute value into output buffer.
///
/// # Example
/// ```
/// use dtext::escape::escape_attr_into;
///
/// let mut out = Vec::new();
/// escape_attr_into(&mut out, b"it's \"quoted\"");
/// assert_eq!(out, b"it&#39;s &quot;quoted&quot;");
/// ```
#[inline]
pub fn escape_attr_into(out: &mut Vec<u8>, input: &[u8]) {
    match first_attr_escape(input) {
        Some(pos) => escape_from(out, input, pos, &ATTR_ESCAPE_TABLE),
        None => out.extend_from_slice(input),
    }
}

fn escape_from(out: &mut Vec<u8>, input: &[u8], mut pos: usize, table: &[bool; 256]) {
    out.extend_from_slice(&input[..pos]);

    while pos < input.len() {
        let scan_start = pos;
        while pos < input.len() && !table[input[pos] as usize] {
            pos += 1;
        }
        if pos > scan_start {
            out.extend_from_slice(&input[scan_start..pos]);
        }

        if pos < input.len() {
            let escape_seq: &[u8] = match input[pos] {
                b'<' => b"&lt;",
                b'>' => b"&gt;",
                b'&' => b"&amp;",
                b'"' => b"&quot;",
                b'\'' => b"&#39;",
                other => {
                    out.push(other);
                    pos += 1;
                    continue;
                }
            };
            out.extend_from_slice(escape_seq);
            pos += 1;
        }
    }
}

#[inline]
fn first_text_escape(input: &[u8]) -> Option<usize> {
    min_opt(memchr3(b'<', b'>', b'&', input), memchr(b'"', input))
}

#[inline]
fn first_attr_escape(input: &[u8]) -> Option<usize> {
    min_opt(memchr3(b'<', b'>', b'&', input), memchr2(b'"', b'\'', input))
}

#[inline]
fn min_opt(a: Option<usize>, b: Option<usize>) -> Option<usize> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, None) => a,
        (None, b) => b,
    }
}

/// Percent-encode a wiki title for use as a path segment.
pub fn encode_path_segment(input: &str) -> Cow<'_, str> {
    utf8_percent_encode(input, PATH_SEGMENT).into()
}

/// Percent-encode a value for use after `?key=`.
pub fn encode_query_value(input: &str) -> Cow<'_, str> {
    utf8_percent_encode(input, QUERY_VALUE).into()
}

/// Decode a percent-encoded path segment, keeping the raw text when the
/// escapes do not form valid UTF-8.
pub fn decode_path_segment(input: &str) -> Cow<'_, str> {
    percent_encoding::percent_decode_str(input)
        .decode_utf8()
        .unwrap_or(Cow::Borrowed(input))
}

/// Build a DOM id fragment: lower-case, runs of non-alphanumerics
/// collapse to one `-`, no leading or trailing `-`.
///
/// # Example
/// ```
/// use dtext::escape::slugify;
///
/// assert_eq!(slugify("See_Also&42"), "see-also-42");
/// ```
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;
    for c in input.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}
