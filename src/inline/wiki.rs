//! `[[wiki links]]` and `{{search links}}`.

use std::borrow::Cow;

use memchr::{memchr, memmem};

use super::{InlineNode, InlineParser, Nodes};
use crate::escape::slugify;
use crate::limits::MAX_LINK_LOOKAHEAD;

/// Lower-case, whitespace runs joined by `_`.
pub(super) fn normalize_title(title: &str) -> String {
    title.split_whitespace().collect::<Vec<_>>().join("_").to_lowercase()
}

/// Pipe trick: `foo (bar)` and `foo_(bar)` show as `foo`.
fn strip_qualifier(title: &str) -> &str {
    if !title.ends_with(')') {
        return title;
    }
    let Some(open) = title.rfind(" (").max(title.rfind("_(")) else {
        return title;
    };
    match title[..open].trim_end_matches(|c: char| c.is_whitespace() || c == '_') {
        "" => title,
        stripped => stripped,
    }
}

/// Inner text of a `open ... close` construct on one line, and the
/// offset after the closer.
fn delimited<'s>(input: &'s str, start: usize, end: usize, close: &[u8]) -> Option<(&'s str, usize)> {
    let bytes = input.as_bytes();
    let inner_start = start + 2;
    let mut limit = end.min(start.saturating_add(MAX_LINK_LOOKAHEAD));
    while !input.is_char_boundary(limit) {
        limit -= 1;
    }
    let window = bytes.get(inner_start..limit)?;
    let window = &window[..memchr(b'\n', window).unwrap_or(window.len())];
    let at = inner_start + memmem::find(window, close)?;
    Some((&input[inner_start..at], at + close.len()))
}

impl<'a> InlineParser<'a, '_> {
    /// Build a wiki link, registering the normalized title.
    pub(super) fn wiki_node(
        &mut self,
        title: &str,
        anchor: Option<&str>,
        label: Cow<'a, str>,
    ) -> InlineNode<'a> {
        let title = normalize_title(title);
        self.refs.add_wiki_page(&title);
        let anchor = anchor.map(slugify).filter(|slug| !slug.is_empty());
        InlineNode::WikiLink {
            title,
            anchor,
            label,
        }
    }

    /// Word characters glued to the closer join the label: `[[cat]]s`.
    fn absorb_suffix(&mut self, label: &mut Cow<'a, str>) {
        let input = self.input;
        let rest = &input[self.pos..self.end];
        let len = rest
            .char_indices()
            .find(|&(_, c)| !c.is_alphanumeric())
            .map_or(rest.len(), |(i, _)| i);
        if len > 0 {
            label.to_mut().push_str(&rest[..len]);
            self.pos += len;
        }
    }

    pub(super) fn wiki_link(&mut self, out: &mut Nodes<'a>) -> Option<()> {
        let (inner, end) = delimited(self.input, self.pos, self.end, b"]]")?;
        let (target, label) = match inner.split_once('|') {
            Some((target, label)) => (target, Some(label.trim())),
            None => (inner, None),
        };
        let (title, anchor) = match target.split_once('#') {
            Some((title, anchor)) => (title.trim(), Some(anchor.trim())),
            None => (target.trim(), None),
        };
        if title.is_empty() || title.contains(['[', ']']) {
            return None;
        }

        let mut label = Cow::Borrowed(match label {
            Some("") => strip_qualifier(title),
            Some(label) => label,
            None => title,
        });
        self.pos = end;
        self.absorb_suffix(&mut label);
        let node = self.wiki_node(title, anchor, label);
        out.push(node);
        Some(())
    }

    pub(super) fn search_link(&mut self, out: &mut Nodes<'a>) -> Option<()> {
        let (inner, end) = delimited(self.input, self.pos, self.end, b"}}")?;
        let (query, label) = match inner.split_once('|') {
            Some((query, label)) => (query.trim(), label.trim()),
            None => (inner.trim(), ""),
        };
        if query.is_empty() || query.contains(['{', '}']) {
            return None;
        }

        let mut label = Cow::Borrowed(if label.is_empty() { query } else { label });
        self.pos = end;
        self.absorb_suffix(&mut label);
        out.push(InlineNode::SearchLink {
            query: Cow::Borrowed(query),
            label,
        });
        Some(())
    }
}
