//! Per-call parse options.

use std::collections::BTreeSet;

/// Parsing/rendering options. Built once per call, never mutated by the
/// parser.
///
/// # Example
/// ```
/// use dtext::ParseOptions;
///
/// let mut options = ParseOptions::default();
/// options.domain = Some("e621.net".into());
/// options.max_thumbs = Some(5);
/// assert!(options.is_own_host("E621.net"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(default))]
pub struct ParseOptions {
    /// Render a single run of inline content with no `<p>` wrapping and
    /// no block constructs.
    pub inline: bool,
    /// Prefixed onto relative paths (id-links, wiki links, searches).
    pub base_url: Option<String>,
    /// This install's own host.
    pub domain: Option<String>,
    /// Other hosts belonging to the same site.
    pub internal_domains: BTreeSet<String>,
    pub disable_mentions: bool,
    /// Recognize `#tag` qtags.
    pub qtags: bool,
    /// Render `[color]` spans.
    pub allow_color: bool,
    /// Cap on `thumb #N` ids registered in `post_ids`.
    pub max_thumbs: Option<usize>,
}

/// How a link host relates to this install.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostKind {
    /// Relative link, or the install's own domain.
    Own,
    /// Listed in `internal_domains` but not this install's domain.
    CrossInstall,
    External,
}

impl ParseOptions {
    /// Whether `host` is this install's own domain.
    pub fn is_own_host(&self, host: &str) -> bool {
        self.domain
            .as_deref()
            .is_some_and(|d| d.eq_ignore_ascii_case(host))
    }

    /// Whether `host` is one of the configured internal domains.
    pub fn is_internal_host(&self, host: &str) -> bool {
        self.internal_domains
            .iter()
            .any(|d| d.eq_ignore_ascii_case(host))
    }

    /// Classify a link host. `None` means a relative link.
    pub fn classify_host(&self, host: Option<&str>) -> HostKind {
        match host {
            None => HostKind::Own,
            Some(h) if self.is_own_host(h) => HostKind::Own,
            Some(h) if self.is_internal_host(h) => HostKind::CrossInstall,
            Some(_) => HostKind::External,
        }
    }

    /// `base_url` without a trailing slash, or empty.
    pub fn base(&self) -> &str {
        self.base_url
            .as_deref()
            .map(|b| b.trim_end_matches('/'))
            .unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ParseOptions::default();
        assert!(!options.inline);
        assert!(!options.qtags);
        assert_eq!(options.base(), "");
        assert_eq!(options.classify_host(Some("example.com")), HostKind::External);
    }

    #[test]
    fn test_classify_host() {
        let mut options = ParseOptions::default();
        options.domain = Some("e621.net".into());
        options.internal_domains.insert("e926.net".into());
        options.internal_domains.insert("e621.net".into());

        assert_eq!(options.classify_host(None), HostKind::Own);
        assert_eq!(options.classify_host(Some("E621.NET")), HostKind::Own);
        assert_eq!(options.classify_host(Some("e926.net")), HostKind::CrossInstall);
        assert_eq!(options.classify_host(Some("example.com")), HostKind::External);
    }

    #[test]
    fn test_base_trims_slash() {
        let mut options = ParseOptions::default();
        options.base_url = Some("https://e621.net/".into());
        assert_eq!(options.base(), "https://e621.net");
    }
}
