//! Static id-link catalog.
//!
//! One table describes every `keyword #id` shorthand: how it is written,
//! where it points and how it renders. Both directions go through it:
//! scanning `post #123` in text, and reducing a pasted
//! `https://<own domain>/posts/123` back to the same link.

use std::sync::LazyLock;

use rustc_hash::FxHashMap;

use crate::cursor::Cursor;
use crate::escape::decode_path_segment;
use crate::limits::MAX_ID_DIGITS;

/// Optional trailer after the id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Suffix {
    None,
    /// `topic #1/p2`
    Page,
    /// `post changes #1/v2`
    Version,
    /// `dmail #1/abcdef`
    Key,
}

/// How ids are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdFormat {
    Decimal,
    /// Git commit hashes, 7 to 40 hex digits.
    Hex,
}

#[derive(Debug, PartialEq, Eq)]
pub struct IdLinkSpec {
    /// CSS kind: `dtext-{kind}-id-link`.
    pub kind: &'static str,
    /// Accepted keywords; the first is used in labels.
    pub keywords: &'static [&'static str],
    /// Target with an `{id}` placeholder.
    pub path: &'static str,
    /// Absolute URL outside this site.
    pub external: bool,
    pub format: IdFormat,
    pub suffix: Suffix,
}

impl IdLinkSpec {
    #[inline]
    pub fn label(&self) -> &'static str {
        self.keywords[0]
    }

    /// Build the target path for an id and suffix value.
    pub fn href(&self, id: &str, suffix: Option<&str>) -> String {
        let mut href = self.path.replace("{id}", id);
        if let Some(value) = suffix {
            match self.suffix {
                Suffix::None => {}
                Suffix::Page => {
                    href.push_str("?page=");
                    href.push_str(value);
                }
                Suffix::Version => {
                    href.push_str("&search[version]=");
                    href.push_str(value);
                }
                Suffix::Key => {
                    href.push_str("?key=");
                    href.push_str(&crate::escape::encode_query_value(value));
                }
            }
        }
        href
    }

    /// Visible suffix appended to the label. Keys stay hidden.
    pub fn suffix_label(&self, suffix: Option<&str>) -> Option<String> {
        let value = suffix?;
        match self.suffix {
            Suffix::Page => Some(format!("/p{value}")),
            Suffix::Version => Some(format!("/v{value}")),
            Suffix::None | Suffix::Key => None,
        }
    }

    /// Collection prefix for `/{collection}/{id}` templates.
    fn collection_prefix(&self) -> Option<&'static str> {
        if self.external {
            return None;
        }
        let prefix = self.path.strip_suffix("{id}")?;
        (prefix.starts_with('/') && !prefix.contains('?')).then_some(prefix)
    }
}

macro_rules! spec {
    ($kind:literal, [$($kw:literal),+], $path:expr) => {
        spec!($kind, [$($kw),+], $path, false, IdFormat::Decimal, Suffix::None)
    };
    ($kind:literal, [$($kw:literal),+], $path:expr, $suffix:expr) => {
        spec!($kind, [$($kw),+], $path, false, IdFormat::Decimal, $suffix)
    };
    ($kind:literal, [$($kw:literal),+], $path:expr, $external:expr, $format:expr, $suffix:expr) => {
        IdLinkSpec {
            kind: $kind,
            keywords: &[$($kw),+],
            path: $path,
            external: $external,
            format: $format,
            suffix: $suffix,
        }
    };
}

/// The catalog, in priority order.
pub static CATALOG: &[IdLinkSpec] = &[
    spec!("post-changes", ["post changes"], "/post_versions?search[post_id]={id}", Suffix::Version),
    spec!("post", ["post"], "/posts/{id}"),
    spec!("post-flag", ["flag", "post flag"], "/post_flags/{id}"),
    spec!("note", ["note"], "/notes/{id}"),
    spec!("forum-post", ["forum", "forum post"], "/forum_posts/{id}"),
    spec!("forum-topic", ["topic", "forum topic"], "/forum_topics/{id}", Suffix::Page),
    spec!("forum-category", ["category", "forum category"], "/forum_categories/{id}"),
    spec!("comment", ["comment"], "/comments/{id}"),
    spec!("pool", ["pool"], "/pools/{id}"),
    spec!("user", ["user"], "/users/{id}"),
    spec!("artist", ["artist"], "/artists/{id}"),
    spec!("ban", ["ban"], "/bans/{id}"),
    spec!("tag-alias", ["alias", "tag alias"], "/tag_aliases/{id}"),
    spec!("tag-implication", ["implication", "tag implication"], "/tag_implications/{id}"),
    spec!("mod-action", ["mod action"], "/mod_actions?search[id]={id}"),
    spec!("user-feedback", ["record", "feedback", "user feedback"], "/user_feedbacks/{id}"),
    spec!("wiki-page", ["wiki", "wiki page"], "/wiki_pages/{id}"),
    spec!("dmail", ["dmail"], "/dmails/{id}", Suffix::Key),
    spec!("set", ["set"], "/post_sets/{id}"),
    spec!("ticket", ["ticket"], "/tickets/{id}"),
    spec!("avoid-posting", ["dnp", "avoid posting"], "/avoid_postings/{id}"),
    spec!("takedown", ["takedown"], "/takedowns/{id}"),
    spec!("github", ["issue"], "https://github.com/e621ng/e621ng/issues/{id}", true, IdFormat::Decimal, Suffix::None),
    spec!("github-pull", ["pull"], "https://github.com/e621ng/e621ng/pull/{id}", true, IdFormat::Decimal, Suffix::None),
    spec!("github-commit", ["commit"], "https://github.com/e621ng/e621ng/commit/{id}", true, IdFormat::Hex, Suffix::None),
];

/// Keywords grouped by first letter, longest first within a group, so
/// `post changes` is tried before `post`.
static KEYWORDS: LazyLock<FxHashMap<u8, Vec<(&'static str, &'static IdLinkSpec)>>> =
    LazyLock::new(|| {
        let mut map: FxHashMap<u8, Vec<(&'static str, &'static IdLinkSpec)>> =
            FxHashMap::default();
        for spec in CATALOG {
            for &keyword in spec.keywords {
                map.entry(keyword.as_bytes()[0]).or_default().push((keyword, spec));
            }
        }
        for entries in map.values_mut() {
            entries.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        }
        map
    });

/// A recognized `keyword #id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdMatch<'a> {
    pub spec: &'static IdLinkSpec,
    pub id: &'a str,
    pub suffix: Option<&'a str>,
    pub end: usize,
}

/// Match `keyword #id[suffix]` at `pos`. The caller checks that `pos`
/// starts a word.
pub fn match_id_link(input: &str, pos: usize, end: usize) -> Option<IdMatch<'_>> {
    let first = input.as_bytes().get(pos)?.to_ascii_lowercase();
    let candidates = KEYWORDS.get(&first)?;
    candidates.iter().find_map(|&(keyword, spec)| {
        let mut cursor = Cursor::window(input, pos, end);
        if !cursor.eat_ignore_case(keyword.as_bytes()) || !cursor.eat(b' ') || !cursor.eat(b'#') {
            return None;
        }
        let (id, after_id) = scan_id(input, cursor.offset(), end, spec.format)?;
        cursor.set_offset(after_id);
        let suffix = scan_suffix(input, &mut cursor, spec.suffix);
        if cursor.peek_char().is_some_and(char::is_alphanumeric) {
            return None;
        }
        Some(IdMatch {
            spec,
            id,
            suffix,
            end: cursor.offset(),
        })
    })
}

/// Match `thumb #N` at `pos`. Returns the id and the end offset.
pub fn match_thumb(input: &str, pos: usize, end: usize) -> Option<(u64, usize)> {
    let mut cursor = Cursor::window(input, pos, end);
    if !cursor.eat_ignore_case(b"thumb #") {
        return None;
    }
    let (id, after) = scan_id(input, cursor.offset(), end, IdFormat::Decimal)?;
    cursor.set_offset(after);
    if cursor.peek_char().is_some_and(char::is_alphanumeric) {
        return None;
    }
    Some((id.parse().ok()?, after))
}

fn scan_id(input: &str, start: usize, end: usize, format: IdFormat) -> Option<(&str, usize)> {
    let mut cursor = Cursor::window(input, start, end);
    let len = match format {
        IdFormat::Decimal => {
            let n = cursor.skip_digits();
            (1..=MAX_ID_DIGITS).contains(&n).then_some(n)?
        }
        IdFormat::Hex => {
            let n = cursor.skip_while(|b| b.is_ascii_hexdigit());
            (7..=40).contains(&n).then_some(n)?
        }
    };
    Some((&input[start..start + len], start + len))
}

fn scan_suffix<'a>(input: &'a str, cursor: &mut Cursor<'a>, suffix: Suffix) -> Option<&'a str> {
    let restore = cursor.offset();
    let found = match suffix {
        Suffix::None => return None,
        Suffix::Page => cursor.eat(b'/') && cursor.eat_ignore_case(b"p"),
        Suffix::Version => cursor.eat(b'/') && cursor.eat_ignore_case(b"v"),
        Suffix::Key => cursor.eat(b'/'),
    };
    let start = cursor.offset();
    let len = if !found {
        0
    } else if suffix == Suffix::Key {
        cursor.skip_while(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
    } else {
        let n = cursor.skip_digits();
        if n > MAX_ID_DIGITS { 0 } else { n }
    };
    if len == 0 {
        cursor.set_offset(restore);
        return None;
    }
    Some(&input[start..start + len])
}

/// A same-site URL path that has a shorter DText form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shortlink<'a> {
    Id {
        spec: &'static IdLinkSpec,
        id: &'a str,
        suffix: Option<&'a str>,
    },
    Wiki(String),
    Search(String),
}

/// Reduce a path (plus optional query) to its shortlink form.
///
/// # Example
/// ```
/// use dtext::catalog::{match_path, Shortlink};
///
/// match match_path("/posts/1234") {
///     Some(Shortlink::Id { spec, id, .. }) => {
///         assert_eq!(spec.label(), "post");
///         assert_eq!(id, "1234");
///     }
///     other => panic!("unexpected {other:?}"),
/// }
/// ```
pub fn match_path(path: &str) -> Option<Shortlink<'_>> {
    let (path, fragment) = match path.split_once('#') {
        Some((p, f)) => (p, Some(f)),
        None => (path, None),
    };
    let (path, query) = match path.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (path, None),
    };

    if path == "/posts" && fragment.is_none() {
        let tags = query?.strip_prefix("tags=")?;
        if tags.is_empty() || tags.contains('&') {
            return None;
        }
        return Some(Shortlink::Search(decode_query(tags)));
    }

    for spec in CATALOG {
        let Some(prefix) = spec.collection_prefix() else {
            continue;
        };
        let Some(id) = path.strip_prefix(prefix) else {
            continue;
        };
        if id.is_empty() || id.len() > MAX_ID_DIGITS || !id.bytes().all(|b| b.is_ascii_digit()) {
            continue;
        }
        let suffix = match (spec.suffix, query) {
            (_, None) => None,
            (Suffix::Page, Some(q)) => {
                let page = q.strip_prefix("page=")?;
                if page.is_empty() || !page.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                Some(page)
            }
            (_, Some(_)) => return None,
        };
        if fragment.is_some() {
            return None;
        }
        return Some(Shortlink::Id { spec, id, suffix });
    }

    let title = path.strip_prefix("/wiki_pages/")?;
    if title.is_empty() || title.contains('/') || query.is_some() {
        return None;
    }
    Some(Shortlink::Wiki(decode_path_segment(title).into_owned()))
}

fn decode_query(value: &str) -> String {
    decode_path_segment(&value.replace('+', " ")).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id_link(input: &str) -> Option<(String, String, Option<String>)> {
        match_id_link(input, 0, input.len()).map(|m| {
            (
                m.spec.kind.to_string(),
                m.id.to_string(),
                m.suffix.map(str::to_string),
            )
        })
    }

    #[test]
    fn test_every_spec_has_id_placeholder() {
        for spec in CATALOG {
            assert!(spec.path.contains("{id}"), "{} lacks {{id}}", spec.kind);
            assert!(!spec.keywords.is_empty());
        }
    }

    #[test]
    fn test_basic_matches() {
        assert_eq!(id_link("post #1234"), Some(("post".into(), "1234".into(), None)));
        assert_eq!(id_link("Post #1"), Some(("post".into(), "1".into(), None)));
        assert_eq!(id_link("forum topic #9"), Some(("forum-topic".into(), "9".into(), None)));
        assert_eq!(id_link("mod action #3"), Some(("mod-action".into(), "3".into(), None)));
        assert_eq!(
            id_link("post changes #5/v2"),
            Some(("post-changes".into(), "5".into(), Some("2".into())))
        );
    }

    #[test]
    fn test_suffixes() {
        assert_eq!(
            id_link("topic #12/p3"),
            Some(("forum-topic".into(), "12".into(), Some("3".into())))
        );
        assert_eq!(
            id_link("dmail #7/abc-DEF"),
            Some(("dmail".into(), "7".into(), Some("abc-DEF".into())))
        );
        // a broken suffix leaves the link without it
        let m = match_id_link("topic #12/x", 0, 11).unwrap();
        assert_eq!(m.suffix, None);
        assert_eq!(m.end, 9);
    }

    #[test]
    fn test_rejections() {
        assert_eq!(id_link("post #"), None);
        assert_eq!(id_link("post #12a"), None);
        assert_eq!(id_link("post  #12"), None);
        assert_eq!(id_link("posts #12"), None);
        assert_eq!(id_link("post #1234567890123456789"), None);
        assert_eq!(id_link("commit #abc"), None);
    }

    #[test]
    fn test_commit_hex() {
        assert_eq!(
            id_link("commit #1a2b3c4d"),
            Some(("github-commit".into(), "1a2b3c4d".into(), None))
        );
    }

    #[test]
    fn test_href() {
        let topic = &CATALOG[5];
        assert_eq!(topic.href("12", Some("3")), "/forum_topics/12?page=3");
        assert_eq!(topic.suffix_label(Some("3")).as_deref(), Some("/p3"));
        let issue = CATALOG.iter().find(|s| s.kind == "github").unwrap();
        assert_eq!(issue.href("4", None), "https://github.com/e621ng/e621ng/issues/4");
    }

    #[test]
    fn test_thumb() {
        assert_eq!(match_thumb("thumb #12 x", 0, 11), Some((12, 9)));
        assert_eq!(match_thumb("thumb #12x", 0, 10), None);
        assert_eq!(match_thumb("thumbs #1", 0, 9), None);
    }

    #[test]
    fn test_match_path() {
        assert!(matches!(
            match_path("/forum_topics/12?page=3"),
            Some(Shortlink::Id { suffix: Some("3"), .. })
        ));
        assert_eq!(match_path("/wiki_pages/touhou"), Some(Shortlink::Wiki("touhou".into())));
        assert_eq!(
            match_path("/posts?tags=cat+-dog"),
            Some(Shortlink::Search("cat -dog".into()))
        );
        assert!(matches!(
            match_path("/wiki_pages/12"),
            Some(Shortlink::Id { .. })
        ));
        assert_eq!(match_path("/posts/12?foo=1"), None);
        assert_eq!(match_path("/posts/12/edit"), None);
        assert_eq!(match_path("/about"), None);
    }
}
