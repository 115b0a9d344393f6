//! Named and numeric character references.
//!
//! Decoded entities become plain text nodes, so `&lbrack;b&rbrack;` can
//! never be reinterpreted as a tag.

use std::borrow::Cow;

use crate::limits::MAX_ENTITY_LEN;

fn named(name: &str) -> Option<&'static str> {
    Some(match name {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        "lbrack" => "[",
        "rbrack" => "]",
        "ast" => "*",
        "colon" => ":",
        "commat" => "@",
        "grave" => "`",
        "num" => "#",
        "period" => ".",
        "lpar" => "(",
        "rpar" => ")",
        "lcub" => "{",
        "rcub" => "}",
        "verbar" => "|",
        "lowbar" => "_",
        "hyphen" => "-",
        "tilde" => "~",
        "nbsp" => "\u{A0}",
        _ => return None,
    })
}

/// Decode `&name;` or `&#NN;` / `&#xHH;` at `pos`. Returns the decoded
/// text and the offset after `;`.
pub fn scan_entity(input: &str, pos: usize, end: usize) -> Option<(Cow<'static, str>, usize)> {
    let bytes = input.as_bytes();
    let start = pos + 1;
    let limit = end.min(pos + MAX_ENTITY_LEN);
    if start >= limit {
        return None;
    }
    let semi = start + memchr::memchr(b';', &bytes[start..limit])?;
    let name = &input[start..semi];

    let Some(number) = name.strip_prefix('#') else {
        return named(name).map(|s| (Cow::Borrowed(s), semi + 1));
    };
    let digits_ok = match number.strip_prefix(['x', 'X']) {
        Some(hex) => !hex.is_empty() && hex.bytes().all(|b| b.is_ascii_hexdigit()),
        None => !number.is_empty() && number.bytes().all(|b| b.is_ascii_digit()),
    };
    if !digits_ok {
        return None;
    }

    let decoded = html_escape::decode_html_entities(&input[pos..=semi]);
    let mut chars = decoded.chars();
    let ch = chars.next()?;
    if chars.next().is_some() || ch.is_control() || ch == '\u{FFFD}' {
        return None;
    }
    Some((Cow::Owned(decoded.into_owned()), semi + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(input: &str) -> Option<String> {
        scan_entity(input, 0, input.len()).map(|(s, _)| s.into_owned())
    }

    #[test]
    fn test_named() {
        assert_eq!(decode("&lbrack;"), Some("[".into()));
        assert_eq!(decode("&commat;"), Some("@".into()));
        assert_eq!(decode("&amp;"), Some("&".into()));
    }

    #[test]
    fn test_numeric() {
        assert_eq!(decode("&#39;"), Some("'".into()));
        assert_eq!(decode("&#x5B;"), Some("[".into()));
    }

    #[test]
    fn test_rejected() {
        assert_eq!(decode("&bogus;"), None);
        assert_eq!(decode("&#0;"), None);
        assert_eq!(decode("&#10;"), None);
        assert_eq!(decode("&#x;"), None);
        assert_eq!(decode("&amp"), None);
        assert_eq!(decode("&verylongname;"), None);
    }
}
