//! Lexical scanner.
//!
//! Tokens are produced lazily, one at a time, at whatever offset the
//! parser asks for. Every token covers at least one whole char, so the
//! parser always makes progress. Plain text runs stop at the next byte
//! that could start markup:
//! - `\n [ < & @ # { "`
//! - an ASCII letter at the start of a word (bare URLs, id-links)

mod entity;
mod line;
mod mention;
pub mod tag;
mod url;

use std::borrow::Cow;

pub use line::{HeaderMarker, breaks_paragraph, header_at, list_marker_at};
pub use tag::{Attr, BlockMask, Delim, Tag, TagName, TagToken, find_close_tag, scan_tag};
pub use url::{scan_angle_url, scan_bare_url, scan_url_body, scheme_len};

use crate::Range;
use crate::options::ParseOptions;

/// One atomic span of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    Text(Range),
    Newline(Range),
    TagOpen(Tag<'a>),
    TagClose { name: TagName, range: Range },
    /// `url` excludes any surrounding `<>`; `range` includes them.
    BareUrl { url: Range, range: Range },
    Mention { name: &'a str, range: Range },
    Qtag { tag: &'a str, range: Range },
    Entity { decoded: Cow<'static, str>, range: Range },
}

impl Token<'_> {
    /// Span covered by this token.
    pub fn range(&self) -> Range {
        match self {
            Token::Text(range) | Token::Newline(range) => *range,
            Token::TagOpen(tag) => tag.range,
            Token::TagClose { range, .. }
            | Token::BareUrl { range, .. }
            | Token::Mention { range, .. }
            | Token::Qtag { range, .. }
            | Token::Entity { range, .. } => *range,
        }
    }
}

/// Bytes that end a plain text run.
static SPECIAL: [bool; 256] = {
    let mut table = [false; 256];
    table[b'\n' as usize] = true;
    table[b'[' as usize] = true;
    table[b'<' as usize] = true;
    table[b'&' as usize] = true;
    table[b'@' as usize] = true;
    table[b'#' as usize] = true;
    table[b'{' as usize] = true;
    table[b'"' as usize] = true;
    table
};

/// Whether `pos` starts a word: the previous byte is not ASCII
/// alphanumeric.
#[inline]
pub fn at_word_start(input: &str, pos: usize) -> bool {
    pos == 0 || !input.as_bytes()[pos - 1].is_ascii_alphanumeric()
}

pub struct Scanner<'a> {
    input: &'a str,
    mentions: bool,
    qtags: bool,
}

impl<'a> Scanner<'a> {
    pub fn new(input: &'a str, options: &ParseOptions) -> Self {
        Self {
            input,
            mentions: !options.disable_mentions,
            qtags: options.qtags,
        }
    }

    /// The token starting at `pos`, never reaching past `end`.
    pub fn token_at(&self, pos: usize, end: usize) -> Token<'a> {
        debug_assert!(pos < end);
        let input = self.input;
        match input.as_bytes()[pos] {
            b'\n' => return Token::Newline(Range::from_usize(pos, pos + 1)),
            b'[' => {
                if let Some(tag) = scan_tag(input, pos, end) {
                    return tag.into();
                }
            }
            b'<' => {
                if let Some((url, next)) = scan_angle_url(input, pos, end) {
                    return Token::BareUrl {
                        url,
                        range: Range::from_usize(pos, next),
                    };
                }
                if self.mentions {
                    if let Some((name, next)) = mention::scan_angle_mention(input, pos, end) {
                        return Token::Mention {
                            name: name.slice(input),
                            range: Range::from_usize(pos, next),
                        };
                    }
                }
                if let Some(tag) = scan_tag(input, pos, end) {
                    return tag.into();
                }
            }
            b'&' => {
                if let Some((decoded, next)) = entity::scan_entity(input, pos, end) {
                    return Token::Entity {
                        decoded,
                        range: Range::from_usize(pos, next),
                    };
                }
            }
            b'@' if self.mentions => {
                if let Some((name, next)) = mention::scan_mention(input, pos, end) {
                    return Token::Mention {
                        name: name.slice(input),
                        range: Range::from_usize(pos, next),
                    };
                }
            }
            b'#' if self.qtags => {
                if let Some((tag, next)) = mention::scan_qtag(input, pos, end) {
                    return Token::Qtag {
                        tag: tag.slice(input),
                        range: Range::from_usize(pos, next),
                    };
                }
            }
            b'h' | b'H' => {
                if let Some(url_end) = scan_bare_url(input, pos, end) {
                    let url = Range::from_usize(pos, url_end);
                    return Token::BareUrl { url, range: url };
                }
            }
            _ => {}
        }
        Token::Text(Range::from_usize(pos, self.text_end(pos, end)))
    }

    /// End of the plain run starting at `pos`. The first char is always
    /// part of the run.
    fn text_end(&self, pos: usize, end: usize) -> usize {
        let bytes = self.input.as_bytes();
        let first = self.input[pos..].chars().next().map_or(1, char::len_utf8);
        let mut i = pos + first;
        while i < end {
            let b = bytes[i];
            if SPECIAL[b as usize] || (b.is_ascii_alphabetic() && !bytes[i - 1].is_ascii_alphanumeric()) {
                break;
            }
            i += 1;
        }
        i.min(end)
    }
}

impl<'a> From<TagToken<'a>> for Token<'a> {
    fn from(tag: TagToken<'a>) -> Self {
        match tag {
            TagToken::Open(tag) => Token::TagOpen(tag),
            TagToken::Close { name, range } => Token::TagClose { name, range },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens<'a>(input: &'a str, options: &ParseOptions) -> Vec<Token<'a>> {
        let scanner = Scanner::new(input, options);
        let mut pos = 0;
        let mut out = Vec::new();
        while pos < input.len() {
            let token = scanner.token_at(pos, input.len());
            pos = token.range().end_usize();
            out.push(token);
        }
        out
    }

    #[test]
    fn test_text_runs_stop_at_word_starts() {
        let input = "ab cd";
        let toks = tokens(input, &ParseOptions::default());
        assert_eq!(
            toks,
            vec![
                Token::Text(Range::new(0, 3)),
                Token::Text(Range::new(3, 5)),
            ]
        );
    }

    #[test]
    fn test_mixed_tokens() {
        let input = "[b]@bob &amp; http://a.com\n";
        let toks = tokens(input, &ParseOptions::default());
        assert!(matches!(toks[0], Token::TagOpen(Tag { name: TagName::B, .. })));
        assert!(matches!(toks[1], Token::Mention { name: "bob", .. }));
        assert!(toks.iter().any(|t| matches!(t, Token::Entity { decoded, .. } if decoded == "&")));
        assert!(toks.iter().any(|t| matches!(t, Token::BareUrl { .. })));
        assert!(matches!(toks.last(), Some(Token::Newline(_))));
    }

    #[test]
    fn test_options_gate_candidates() {
        let mut options = ParseOptions::default();
        options.disable_mentions = true;
        let toks = tokens("@bob #tag", &options);
        assert!(toks.iter().all(|t| matches!(t, Token::Text(_))));

        options.qtags = true;
        let toks = tokens("#tag", &options);
        assert!(matches!(toks[0], Token::Qtag { tag: "tag", .. }));
    }

    #[test]
    fn test_multibyte_text() {
        let input = "東方[b]";
        let toks = tokens(input, &ParseOptions::default());
        assert_eq!(toks[0], Token::Text(Range::new(0, 6)));
    }

    #[test]
    fn test_angle_forms() {
        let input = "<@bob smith><https://a.com>";
        let toks = tokens(input, &ParseOptions::default());
        assert!(matches!(toks[0], Token::Mention { name: "bob smith", .. }));
        assert!(matches!(toks[1], Token::BareUrl { .. }));
    }
}
