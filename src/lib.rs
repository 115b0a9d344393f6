//! dtext: DText markup to sanitized HTML compiler
//!
//! DText is the BBCode/Markdown hybrid used by imageboard comments, forum
//! posts and wiki pages. Besides HTML, a parse reports the references the
//! document makes: thumbnail post ids, wiki pages, user mentions and
//! qtags.
//!
//! # Design Principles
//! - No regex: pure byte-level scanning
//! - Every recursive construct is depth-limited
//! - Malformed markup degrades to escaped text, never to an error
//! - Deterministic: identical input and options give identical output
//!
//! # Example
//! ```
//! use dtext::{parse, ParseOptions};
//!
//! let result = parse(Some("[b]hi[/b] thumb #12"), &ParseOptions::default())
//!     .unwrap()
//!     .unwrap();
//! assert!(result.html.starts_with("<p><strong>hi</strong> "));
//! assert_eq!(result.post_ids, [12]);
//! ```

pub mod block;
pub mod catalog;
pub mod cursor;
mod error;
pub mod escape;
pub mod inline;
pub mod limits;
pub mod options;
pub mod range;
pub mod refs;
pub mod render;
pub mod scanner;
pub mod validate;

use std::borrow::Cow;

pub use block::{BlockNode, BlockParser};
pub use error::{EncodingFault, Error};
pub use inline::{InlineNode, InlineParser};
pub use options::ParseOptions;
pub use range::Range;
pub use render::HtmlWriter;
pub use validate::Encoding;

use limits::MAX_INPUT_LEN;
use refs::References;

/// HTML plus the references gathered while producing it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RenderResult {
    #[cfg_attr(feature = "serde", serde(rename = "dtext"))]
    pub html: String,
    /// Realized `thumb #N` ids, in first-seen order.
    pub post_ids: Vec<u64>,
    /// Normalized wiki titles.
    pub wiki_pages: Vec<String>,
    pub mentions: Vec<String>,
    /// Lower-cased.
    pub qtags: Vec<String>,
}

/// Compile DText to HTML.
///
/// `None` and the empty string yield `Ok(None)`. A NUL byte anywhere in
/// the text is rejected.
pub fn parse(text: Option<&str>, options: &ParseOptions) -> Result<Option<RenderResult>, Error> {
    let Some(text) = text.filter(|text| !text.is_empty()) else {
        return Ok(None);
    };
    if text.len() > MAX_INPUT_LEN {
        tracing::debug!(len = text.len(), "rejected oversized input");
        return Err(Error::TooLarge {
            len: text.len(),
            max: MAX_INPUT_LEN,
        });
    }
    let text = validate::validate_str(text, Encoding::Utf8)?;
    let input = normalize_newlines(text);
    Ok(Some(compile(&input, options)))
}

/// Compile raw bytes declared to be in `encoding`.
///
/// # Example
/// ```
/// use dtext::{parse_bytes, Encoding, Error, ParseOptions};
///
/// let options = ParseOptions::default();
/// assert!(matches!(
///     parse_bytes(Some(b"\xff"), Encoding::Utf8, &options),
///     Err(Error::InvalidEncoding { offset: 0, .. })
/// ));
/// ```
pub fn parse_bytes(
    bytes: Option<&[u8]>,
    encoding: Encoding,
    options: &ParseOptions,
) -> Result<Option<RenderResult>, Error> {
    let Some(bytes) = bytes else {
        return Ok(None);
    };
    let text = validate::validate(bytes, encoding)?;
    parse(Some(text), options)
}

/// Compile with default options, returning only the HTML.
///
/// # Example
/// ```
/// let html = dtext::to_html("h1. Hello\n\nWorld").unwrap();
/// assert_eq!(html, "<h1>Hello</h1><p>World</p>");
/// ```
pub fn to_html(text: &str) -> Result<String, Error> {
    let result = parse(Some(text), &ParseOptions::default())?;
    Ok(result.map(|result| result.html).unwrap_or_default())
}

/// `\r\n` and lone `\r` become `\n`.
fn normalize_newlines(text: &str) -> Cow<'_, str> {
    if memchr::memchr(b'\r', text.as_bytes()).is_none() {
        return Cow::Borrowed(text);
    }
    Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
}

fn compile(input: &str, options: &ParseOptions) -> RenderResult {
    let mut refs = References::new();
    let blocks = BlockParser::new(input, options, &mut refs).parse();
    let html = render::render(&blocks, options, input.len());
    let (post_ids, wiki_pages, mentions, qtags) = refs.into_parts();
    tracing::debug!(
        blocks = blocks.len(),
        html_len = html.len(),
        post_ids = post_ids.len(),
        wiki_pages = wiki_pages.len(),
        mentions = mentions.len(),
        qtags = qtags.len(),
        "parsed document"
    );
    RenderResult {
        html,
        post_ids,
        wiki_pages,
        mentions,
        qtags,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn html(input: &str) -> String {
        to_html(input).unwrap()
    }

    #[test]
    fn test_empty_input() {
        let options = ParseOptions::default();
        assert_eq!(parse(None, &options), Ok(None));
        assert_eq!(parse(Some(""), &options), Ok(None));
        assert_eq!(parse_bytes(None, Encoding::Utf8, &options), Ok(None));
    }

    #[test]
    fn test_whitespace_only() {
        let result = parse(Some(" \n\t\n"), &ParseOptions::default()).unwrap().unwrap();
        assert_eq!(result.html, "");
        assert!(result.post_ids.is_empty());
    }

    #[test]
    fn test_crlf_normalized() {
        assert_eq!(html("a\r\nb\rc"), "<p>a<br>b<br>c</p>");
        assert_eq!(html("a\r\n\r\nb"), "<p>a</p><p>b</p>");
    }

    #[test]
    fn test_formatting_spans() {
        assert_eq!(
            html("[b]b[/b] [i]i[/i] [u]u[/u] [s]s[/s] [sup]p[/sup] [sub]d[/sub]"),
            "<p><strong>b</strong> <em>i</em> <u>u</u> <s>s</s> <sup>p</sup> <sub>d</sub></p>"
        );
        assert_eq!(html("<strong>x</strong>"), "<p><strong>x</strong></p>");
    }

    #[test]
    fn test_escaping() {
        assert_eq!(
            html("<script>alert(\"x\")</script> & more"),
            "<p>&lt;script&gt;alert(&quot;x&quot;)&lt;/script&gt; &amp; more</p>"
        );
    }

    #[test]
    fn test_entities_are_not_markup() {
        assert_eq!(html("&lbrack;b&rbrack;x"), "<p>[b]x</p>");
        assert_eq!(html("&lt;b&gt;"), "<p>&lt;b&gt;</p>");
    }

    #[test]
    fn test_nul_rejected() {
        assert!(matches!(
            parse(Some("foo\0bar"), &ParseOptions::default()),
            Err(Error::InvalidEncoding {
                offset: 3,
                reason: EncodingFault::NullByte,
                ..
            })
        ));
    }

    #[test]
    fn test_binary_rejected() {
        assert_eq!(
            parse_bytes(Some(b"abc"), Encoding::Binary, &ParseOptions::default()),
            Err(Error::TypeMismatch {
                found: "binary data"
            })
        );
    }

    #[test]
    fn test_inline_mode() {
        let mut options = ParseOptions::default();
        options.inline = true;
        let result = parse(Some("[b]x[/b]\ny"), &options).unwrap().unwrap();
        assert_eq!(result.html, "<strong>x</strong><br>y");
    }

    #[test]
    fn test_deterministic() {
        let input = "[quote]@bob said [[Touhou]] thumb #5[/quote]";
        assert_eq!(html(input), html(input));
    }
}
