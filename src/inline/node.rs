//! Inline node tree.

use std::borrow::Cow;

use crate::catalog::IdLinkSpec;

/// Formatting span kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanKind {
    Bold,
    Italic,
    Underline,
    Strike,
    Sup,
    Sub,
    Spoiler,
    TranslatorNote,
}

/// Where a link points, relative to this install.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    Internal,
    /// A sibling site listed in `internal_domains`.
    CrossInstall,
    External,
}

/// Value of a `[color]` span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorValue<'a> {
    /// Tag category or rating; rendered as a CSS class.
    Category(&'static str),
    Named(&'static str),
    /// `#rgb` or `#rrggbb`
    Hex(&'a str),
}

const NAMED_COLORS: &[&str] = &[
    "aqua", "black", "blue", "brown", "cyan", "fuchsia", "gold", "gray", "green", "grey",
    "indigo", "lime", "magenta", "maroon", "navy", "olive", "orange", "pink", "purple", "red",
    "silver", "teal", "violet", "white", "yellow",
];

fn category(name: &str) -> Option<&'static str> {
    Some(match name {
        "general" | "gen" => "general",
        "artist" | "art" => "artist",
        "copyright" | "copy" | "co" => "copyright",
        "character" | "char" | "ch" => "character",
        "species" | "spec" => "species",
        "invalid" | "inv" => "invalid",
        "meta" => "meta",
        "lore" | "lor" => "lore",
        "gender" => "gender",
        "safe" | "s" => "rating-safe",
        "questionable" | "q" => "rating-questionable",
        "explicit" | "e" => "rating-explicit",
        _ => return None,
    })
}

impl<'a> ColorValue<'a> {
    /// Parse a `[color=...]` value; unknown values yield `None`.
    pub fn parse(value: &'a str) -> Option<Self> {
        let value = value.trim();
        if let Some(hex) = value.strip_prefix('#') {
            let valid = matches!(hex.len(), 3 | 6) && hex.bytes().all(|b| b.is_ascii_hexdigit());
            return valid.then_some(ColorValue::Hex(value));
        }
        let lower = value.to_ascii_lowercase();
        if let Some(class) = category(&lower) {
            return Some(ColorValue::Category(class));
        }
        NAMED_COLORS
            .iter()
            .find(|&&name| name == lower)
            .map(|&name| ColorValue::Named(name))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InlineNode<'a> {
    Text(Cow<'a, str>),
    Emphasis {
        kind: SpanKind,
        children: Vec<InlineNode<'a>>,
    },
    Link {
        href: Cow<'a, str>,
        kind: LinkKind,
        /// Carries its own label rather than showing the URL.
        named: bool,
        children: Vec<InlineNode<'a>>,
    },
    IdLink {
        spec: &'static IdLinkSpec,
        id: &'a str,
        suffix: Option<&'a str>,
    },
    WikiLink {
        /// Normalized title.
        title: String,
        /// Slug, without the `dtext-` prefix.
        anchor: Option<String>,
        label: Cow<'a, str>,
    },
    SearchLink {
        query: Cow<'a, str>,
        label: Cow<'a, str>,
    },
    Thumb {
        post_id: u64,
        realized: bool,
    },
    Mention {
        username: &'a str,
    },
    Qtag {
        tag: &'a str,
    },
    Color {
        value: ColorValue<'a>,
        children: Vec<InlineNode<'a>>,
    },
    Code(&'a str),
    LineBreak,
}
