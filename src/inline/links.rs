//! Link resolution: bare URLs, quoted links, Markdown links, `[url]`
//! tags and literal `<a href>` anchors.

use std::borrow::Cow;

use memchr::{memchr, memmem};

use super::{InlineNode, InlineParser, LinkKind, Nodes};
use crate::catalog::{self, Shortlink};
use crate::cursor::Cursor;
use crate::limits::MAX_LINK_LOOKAHEAD;
use crate::options::HostKind;
use crate::scanner::{Tag, TagName, scan_url_body, scheme_len};

/// Absolute http(s) URL with a body, or a site-relative path.
/// `/\host` is protocol-relative, like `//host`.
pub(super) fn is_linkable(url: &str) -> bool {
    match scheme_len(url, 0, url.len()) {
        Some(n) => url.len() > n,
        None => {
            let bytes = url.as_bytes();
            bytes.first() == Some(&b'/') && !matches!(bytes.get(1), Some(b'/' | b'\\'))
        }
    }
}

/// Host of an absolute URL, without userinfo or port. The authority ends
/// at `\` as well as `/`.
fn host(url: &str) -> Option<&str> {
    let scheme = scheme_len(url, 0, url.len())?;
    let rest = &url[scheme..];
    let authority = &rest[..rest.find(['/', '\\', '?', '#']).unwrap_or(rest.len())];
    let authority = authority.rsplit_once('@').map_or(authority, |(_, h)| h);
    Some(authority.split_once(':').map_or(authority, |(h, _)| h))
}

/// Path and query of an absolute URL.
fn path_of(url: &str) -> &str {
    let Some(scheme) = scheme_len(url, 0, url.len()) else {
        return url;
    };
    let rest = &url[scheme..];
    rest.find(['/', '\\', '?', '#']).map_or("", |i| &rest[i..])
}

/// `from + MAX_LINK_LOOKAHEAD` clamped to `end` and to a char boundary.
fn lookahead_end(input: &str, from: usize, end: usize) -> usize {
    let mut limit = end.min(from.saturating_add(MAX_LINK_LOOKAHEAD));
    while !input.is_char_boundary(limit) {
        limit -= 1;
    }
    limit
}

/// Whether `[from, to)` crosses a paragraph break.
fn spans_blank_line(input: &str, from: usize, to: usize) -> bool {
    memmem::find(&input.as_bytes()[from..to], b"\n\n").is_some()
}

impl<'a> InlineParser<'a, '_> {
    /// A link node for `url`, classified against the configured hosts.
    fn link(&self, url: &'a str, named: bool, children: Vec<InlineNode<'a>>) -> InlineNode<'a> {
        let kind = match self.options.classify_host(host(url)) {
            HostKind::Own => LinkKind::Internal,
            HostKind::CrossInstall => LinkKind::CrossInstall,
            HostKind::External => LinkKind::External,
        };
        let base = self.options.base();
        let href = if url.starts_with('/') && !base.is_empty() {
            Cow::Owned(format!("{base}{url}"))
        } else {
            Cow::Borrowed(url)
        };
        InlineNode::Link {
            href,
            kind,
            named,
            children,
        }
    }

    /// A bare URL. Same-site URLs with a shorter form become that form.
    pub(super) fn bare_url(&mut self, url: &'a str, out: &mut Nodes<'a>) {
        if self.options.classify_host(host(url)) == HostKind::Own {
            match catalog::match_path(path_of(url)) {
                Some(Shortlink::Id { spec, id, suffix }) => {
                    out.push(InlineNode::IdLink { spec, id, suffix });
                    return;
                }
                Some(Shortlink::Wiki(title)) => {
                    let label = title.replace('_', " ");
                    let node = self.wiki_node(&title, None, Cow::Owned(label));
                    out.push(node);
                    return;
                }
                Some(Shortlink::Search(query)) => {
                    out.push(InlineNode::SearchLink {
                        label: Cow::Owned(query.clone()),
                        query: Cow::Owned(query),
                    });
                    return;
                }
                None => {}
            }
        }
        let node = self.link(url, false, vec![InlineNode::Text(Cow::Borrowed(url))]);
        out.push(node);
    }

    /// `"label":url` or `"label":[url]`.
    pub(super) fn quoted_link(&mut self, out: &mut Nodes<'a>) -> Option<()> {
        let input = self.input;
        let bytes = input.as_bytes();
        let start = self.pos;
        let limit = lookahead_end(input, start, self.end);
        let line = &bytes[start + 1..limit];
        let line = &line[..memchr(b'\n', line).unwrap_or(line.len())];

        let close = start + 1 + memchr(b'"', line)?;
        if input[start + 1..close].trim().is_empty() || bytes.get(close + 1) != Some(&b':') {
            return None;
        }
        let url_start = close + 2;
        let line_end = start + 1 + line.len();
        if url_start >= line_end {
            return None;
        }
        let (url, end) = if bytes.get(url_start) == Some(&b'[') {
            let inner = &bytes[url_start + 1..line_end];
            let bracket = url_start + 1 + memchr(b']', inner)?;
            (input[url_start + 1..bracket].trim(), bracket + 1)
        } else {
            let body = url_start + scheme_len(input, url_start, line_end).unwrap_or(0);
            let end = scan_url_body(input, body, line_end);
            (&input[url_start..end], end)
        };
        if !is_linkable(url) {
            return None;
        }

        let children = self.parse_label(start + 1, close);
        let node = self.link(url, true, children);
        out.push(node);
        self.pos = end;
        Some(())
    }

    /// `[label](url)`, or the legacy `[url](label)`.
    pub(super) fn markdown_link(&mut self, out: &mut Nodes<'a>) -> Option<()> {
        let input = self.input;
        let bytes = input.as_bytes();
        let start = self.pos;
        let limit = lookahead_end(input, start, self.end);
        let line_end = memchr(b'\n', &bytes[start..limit]).map_or(limit, |n| start + n);

        let mut search = start + 1;
        let bracket = loop {
            let found = search + memchr(b']', &bytes[search..line_end])?;
            if bytes.get(found + 1) == Some(&b'(') {
                break found;
            }
            search = found + 1;
        };
        let open = bracket + 1;
        let mut depth = 0usize;
        let mut paren = None;
        for (i, &b) in bytes[open..line_end].iter().enumerate() {
            match b {
                b'(' => depth += 1,
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        paren = Some(open + i);
                        break;
                    }
                }
                _ => {}
            }
        }
        let paren = paren?;

        let label = (start + 1, bracket);
        let target = (open + 1, paren);
        let (url, text) = if is_linkable(input[target.0..target.1].trim()) {
            (target, label)
        } else if is_linkable(input[label.0..label.1].trim()) {
            (label, target)
        } else {
            return None;
        };
        if input[text.0..text.1].trim().is_empty() {
            return None;
        }

        let url = input[url.0..url.1].trim();
        let children = self.parse_label(text.0, text.1);
        let node = self.link(url, true, children);
        out.push(node);
        self.pos = paren + 1;
        Some(())
    }

    /// Literal `<a href="url">label</a>`. Any other attribute, or a
    /// missing or unusable href, leaves the tag as text.
    pub(super) fn anchor(&mut self, out: &mut Nodes<'a>) -> Option<()> {
        let input = self.input;
        let start = self.pos;
        let limit = lookahead_end(input, start, self.end);
        let mut cursor = Cursor::window(input, start, limit);
        if !cursor.eat(b'<') || !cursor.eat_ignore_case(b"a") || cursor.skip_whitespace() == 0 {
            return None;
        }
        if !cursor.eat_ignore_case(b"href") {
            return None;
        }
        cursor.skip_whitespace();
        if !cursor.eat(b'=') {
            return None;
        }
        cursor.skip_whitespace();
        let url = match cursor.peek() {
            Some(quote @ (b'"' | b'\'')) => {
                cursor.advance(1);
                let len = cursor.find(quote)?;
                let value = &input[cursor.offset()..cursor.offset() + len];
                cursor.advance(len + 1);
                value
            }
            _ => {
                let from = cursor.offset();
                cursor.skip_while(|b| !b.is_ascii_whitespace() && b != b'>');
                &input[from..cursor.offset()]
            }
        };
        cursor.skip_whitespace();
        if !cursor.eat(b'>') {
            return None;
        }
        let url = url.trim();
        if url.is_empty() || !is_linkable(url) || url.contains(['\n', '"', '<', '>']) {
            return None;
        }

        let label_start = cursor.offset();
        let close = memchr::memchr_iter(b'<', &input.as_bytes()[label_start..limit])
            .map(|n| label_start + n)
            .find(|&at| Cursor::window(input, at, limit).at_ignore_case(b"</a>"))?;
        if spans_blank_line(input, label_start, close) {
            return None;
        }

        let mut children = self.parse_label(label_start, close);
        if children.is_empty() {
            children.push(InlineNode::Text(Cow::Borrowed(url)));
        }
        let node = self.link(url, true, children);
        out.push(node);
        self.pos = close + 4;
        Some(())
    }

    /// `[url]https://...[/url]` or `[url=https://...]label[/url]`.
    pub(super) fn url_tag(&mut self, tag: &Tag<'a>, out: &mut Nodes<'a>) -> Option<()> {
        let input = self.input;
        let after = tag.range.end_usize();
        let limit = lookahead_end(input, after, self.end);
        let close = self.find_closer(after, limit, TagName::Url)?;
        let content = (after, close.start_usize());
        if spans_blank_line(input, content.0, content.1) {
            return None;
        }

        let node = match tag.value {
            Some(value) => {
                let url = value.slice(input).trim();
                if !is_linkable(url) {
                    return None;
                }
                let mut children = self.parse_label(content.0, content.1);
                if children.is_empty() {
                    children.push(InlineNode::Text(Cow::Borrowed(url)));
                }
                self.link(url, true, children)
            }
            None => {
                let url = input[content.0..content.1].trim();
                if !is_linkable(url) || url.contains(char::is_whitespace) {
                    return None;
                }
                self.link(url, false, vec![InlineNode::Text(Cow::Borrowed(url))])
            }
        };
        out.push(node);
        self.pos = close.end_usize();
        Some(())
    }
}
