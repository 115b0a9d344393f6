//! HTML output.
//!
//! [`HtmlWriter`] owns the output buffer and its escaping helpers; the
//! renderer walks the block tree and writes every element in its final
//! form, with no newlines between elements.

use crate::block::{BlockNode, Cell, ListItem, SectionKind, Table};
use crate::catalog::IdLinkSpec;
use crate::escape;
use crate::inline::{ColorValue, InlineNode, LinkKind, SpanKind};
use crate::options::ParseOptions;

/// HTML output writer with a pre-allocated buffer.
///
/// Only `&str` goes in, so the buffer is always valid UTF-8.
///
/// # Example
/// ```
/// use dtext::HtmlWriter;
///
/// let mut writer = HtmlWriter::with_capacity_for(1000);
/// writer.write_str("<p>");
/// writer.write_escaped_text("Hello <World>");
/// writer.write_str("</p>");
///
/// let html = writer.into_string();
/// assert_eq!(html, "<p>Hello &lt;World&gt;</p>");
/// ```
pub struct HtmlWriter {
    out: Vec<u8>,
}

impl HtmlWriter {
    #[inline]
    pub fn new() -> Self {
        Self {
            out: Vec::with_capacity(1024),
        }
    }

    /// Create with capacity based on the input size. Markup output is
    /// typically ~1.25x the input.
    #[inline]
    pub fn with_capacity_for(input_len: usize) -> Self {
        Self {
            out: Vec::with_capacity(input_len + input_len / 4),
        }
    }

    /// Write a static string (compile-time known).
    #[inline]
    pub fn write_str(&mut self, s: &'static str) {
        self.out.extend_from_slice(s.as_bytes());
    }

    /// Write a trusted dynamic string without escaping.
    #[inline]
    fn write_raw(&mut self, s: &str) {
        self.out.extend_from_slice(s.as_bytes());
    }

    #[inline]
    pub fn write_escaped_text(&mut self, text: &str) {
        escape::escape_text_into(&mut self.out, text.as_bytes());
    }

    #[inline]
    pub fn write_escaped_attr(&mut self, attr: &str) {
        escape::escape_attr_into(&mut self.out, attr.as_bytes());
    }

    /// Write a u64 as decimal.
    fn write_u64(&mut self, n: u64) {
        let mut buf = [0u8; 20];
        let mut i = buf.len();
        let mut n = n;
        loop {
            i -= 1;
            buf[i] = b'0' + (n % 10) as u8;
            n /= 10;
            if n == 0 {
                break;
            }
        }
        self.out.extend_from_slice(&buf[i..]);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.out.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.out.is_empty()
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        // SAFETY: only &str content and ASCII escapes are ever written.
        unsafe { std::str::from_utf8_unchecked(&self.out) }
    }

    #[inline]
    pub fn into_string(self) -> String {
        // SAFETY: only &str content and ASCII escapes are ever written.
        unsafe { String::from_utf8_unchecked(self.out) }
    }
}

impl Default for HtmlWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Render a parsed document.
pub fn render(blocks: &[BlockNode<'_>], options: &ParseOptions, input_len: usize) -> String {
    let mut renderer = Renderer {
        w: HtmlWriter::with_capacity_for(input_len),
        base: options.base(),
    };
    renderer.blocks(blocks);
    renderer.w.into_string()
}

struct Renderer<'o> {
    w: HtmlWriter,
    /// `base_url` without trailing slash.
    base: &'o str,
}

impl Renderer<'_> {
    fn blocks(&mut self, blocks: &[BlockNode<'_>]) {
        for block in blocks {
            self.block(block);
        }
    }

    fn block(&mut self, block: &BlockNode<'_>) {
        match block {
            BlockNode::Paragraph(children) => {
                self.w.write_str("<p>");
                self.inlines(children);
                self.w.write_str("</p>");
            }
            BlockNode::Header {
                level,
                id,
                children,
            } => {
                let level = (*level).clamp(1, 6);
                self.w.write_str("<h");
                self.w.write_u64(u64::from(level));
                if let Some(id) = id {
                    self.w.write_str(" id=\"dtext-");
                    self.w.write_escaped_attr(id);
                    self.w.write_str("\"");
                }
                self.w.write_str(">");
                self.inlines(children);
                self.w.write_str("</h");
                self.w.write_u64(u64::from(level));
                self.w.write_str(">");
            }
            BlockNode::List(items) => self.list(items),
            BlockNode::Quote(children) => {
                self.w.write_str("<blockquote>");
                self.blocks(children);
                self.w.write_str("</blockquote>");
            }
            BlockNode::Spoiler(children) => {
                self.w.write_str("<div class=\"spoiler\">");
                self.blocks(children);
                self.w.write_str("</div>");
            }
            BlockNode::Section {
                title,
                expanded,
                children,
            } => {
                self.w.write_str(if *expanded {
                    "<details class=\"dtext-section\" open><summary>"
                } else {
                    "<details class=\"dtext-section\"><summary>"
                });
                if title.is_empty() {
                    self.w.write_str("Show");
                } else {
                    self.inlines(title);
                }
                self.w.write_str("</summary><div>");
                self.blocks(children);
                self.w.write_str("</div></details>");
            }
            BlockNode::Code { language, text } => {
                match language {
                    Some(language) => {
                        self.w.write_str("<pre class=\"language-");
                        self.w.write_escaped_attr(language);
                        self.w.write_str("\">");
                    }
                    None => self.w.write_str("<pre>"),
                }
                self.w.write_escaped_text(text);
                self.w.write_str("</pre>");
            }
            BlockNode::Table(table) => self.table(table),
            BlockNode::HorizontalRule => self.w.write_str("<hr>"),
            BlockNode::TranslatorNote(children) => {
                self.w.write_str("<p class=\"tn\">");
                self.inlines(children);
                self.w.write_str("</p>");
            }
            BlockNode::Nodtext(text) => {
                self.w.write_str("<p>");
                self.w.write_escaped_text(text);
                self.w.write_str("</p>");
            }
            BlockNode::Fragment(children) => self.inlines(children),
        }
    }

    /// Flat depth-tagged items to properly nested lists. Each `<li>`
    /// stays open until the next item, so deeper lists land inside it.
    fn list(&mut self, items: &[ListItem<'_>]) {
        let mut open = 0;
        for item in items {
            let depth = item.depth.max(1);
            if depth > open {
                self.w.write_str("<ul>");
                open += 1;
                while open < depth {
                    self.w.write_str("<li><ul>");
                    open += 1;
                }
            } else {
                self.w.write_str("</li>");
                while open > depth {
                    self.w.write_str("</ul></li>");
                    open -= 1;
                }
            }
            self.w.write_str("<li>");
            self.inlines(&item.children);
        }
        if open == 0 {
            return;
        }
        self.w.write_str("</li>");
        while open > 1 {
            self.w.write_str("</ul></li>");
            open -= 1;
        }
        self.w.write_str("</ul>");
    }

    fn table(&mut self, table: &Table<'_>) {
        self.w.write_str("<table class=\"striped\">");
        for section in &table.sections {
            let (open, close) = match section.kind {
                SectionKind::Head => ("<thead>", "</thead>"),
                SectionKind::Body => ("<tbody>", "</tbody>"),
                SectionKind::Bare => ("", ""),
            };
            self.w.write_str(open);
            for row in &section.rows {
                self.w.write_str("<tr>");
                for cell in row {
                    self.cell(cell);
                }
                self.w.write_str("</tr>");
            }
            self.w.write_str(close);
        }
        self.w.write_str("</table>");
    }

    fn cell(&mut self, cell: &Cell<'_>) {
        self.w.write_str(if cell.header { "<th" } else { "<td" });
        if let Some(n) = cell.attrs.colspan {
            self.w.write_str(" colspan=\"");
            self.w.write_u64(u64::from(n));
            self.w.write_str("\"");
        }
        if let Some(n) = cell.attrs.rowspan {
            self.w.write_str(" rowspan=\"");
            self.w.write_u64(u64::from(n));
            self.w.write_str("\"");
        }
        if let Some(align) = cell.attrs.align {
            self.w.write_str(" align=\"");
            self.w.write_str(align);
            self.w.write_str("\"");
        }
        self.w.write_str(">");
        self.inlines(&cell.children);
        self.w.write_str(if cell.header { "</th>" } else { "</td>" });
    }

    fn inlines(&mut self, nodes: &[InlineNode<'_>]) {
        for node in nodes {
            self.inline(node);
        }
    }

    fn inline(&mut self, node: &InlineNode<'_>) {
        match node {
            InlineNode::Text(text) => self.w.write_escaped_text(text),
            InlineNode::Emphasis { kind, children } => {
                let (open, close) = match kind {
                    SpanKind::Bold => ("<strong>", "</strong>"),
                    SpanKind::Italic => ("<em>", "</em>"),
                    SpanKind::Underline => ("<u>", "</u>"),
                    SpanKind::Strike => ("<s>", "</s>"),
                    SpanKind::Sup => ("<sup>", "</sup>"),
                    SpanKind::Sub => ("<sub>", "</sub>"),
                    SpanKind::Spoiler => ("<span class=\"spoiler\">", "</span>"),
                    SpanKind::TranslatorNote => ("<span class=\"tn\">", "</span>"),
                };
                self.w.write_str(open);
                self.inlines(children);
                self.w.write_str(close);
            }
            InlineNode::Link {
                href,
                kind,
                named,
                children,
            } => {
                self.w.write_str(match kind {
                    LinkKind::Internal => "<a class=\"dtext-link",
                    LinkKind::CrossInstall => {
                        "<a rel=\"external nofollow\" class=\"dtext-link dtext-external-link"
                    }
                    LinkKind::External => {
                        "<a rel=\"external nofollow noreferrer\" class=\"dtext-link dtext-external-link"
                    }
                });
                if *named && *kind != LinkKind::Internal {
                    self.w.write_str(" dtext-named-external-link");
                }
                self.w.write_str("\" href=\"");
                self.w.write_escaped_attr(href);
                self.w.write_str("\">");
                self.inlines(children);
                self.w.write_str("</a>");
            }
            InlineNode::IdLink { spec, id, suffix } => self.id_link(spec, id, *suffix),
            InlineNode::WikiLink {
                title,
                anchor,
                label,
            } => {
                self.w.write_str("<a class=\"dtext-link dtext-wiki-link\" href=\"");
                self.w.write_escaped_attr(self.base);
                self.w.write_str("/wiki_pages/");
                self.w.write_escaped_attr(&escape::encode_path_segment(title));
                if let Some(anchor) = anchor {
                    self.w.write_str("#dtext-");
                    self.w.write_escaped_attr(anchor);
                }
                self.w.write_str("\">");
                self.w.write_escaped_text(label);
                self.w.write_str("</a>");
            }
            InlineNode::SearchLink { query, label } => {
                self.w.write_str("<a class=\"dtext-link dtext-post-search-link\" href=\"");
                self.w.write_escaped_attr(self.base);
                self.w.write_str("/posts?tags=");
                self.w.write_escaped_attr(&escape::encode_query_value(query));
                self.w.write_str("\">");
                self.w.write_escaped_text(label);
                self.w.write_str("</a>");
            }
            InlineNode::Thumb { post_id, realized } => {
                self.w.write_str(if *realized {
                    "<a class=\"dtext-link dtext-id-link dtext-post-id-link thumb-placeholder-link\" data-id=\""
                } else {
                    "<a class=\"dtext-link dtext-id-link dtext-post-id-link"
                });
                if *realized {
                    self.w.write_u64(*post_id);
                }
                self.w.write_str("\" href=\"");
                self.w.write_escaped_attr(self.base);
                self.w.write_str("/posts/");
                self.w.write_u64(*post_id);
                self.w.write_str("\">post #");
                self.w.write_u64(*post_id);
                self.w.write_str("</a>");
            }
            InlineNode::Mention { username } => {
                self.w.write_str("<a class=\"dtext-link dtext-user-mention-link\" data-user-name=\"");
                self.w.write_escaped_attr(username);
                self.w.write_str("\" href=\"");
                self.w.write_escaped_attr(self.base);
                self.w.write_str("/users?name=");
                self.w.write_escaped_attr(&escape::encode_query_value(username));
                self.w.write_str("\">@");
                self.w.write_escaped_text(username);
                self.w.write_str("</a>");
            }
            InlineNode::Qtag { tag } => {
                self.w.write_str("<a class=\"dtext-link dtext-qtag-link\" href=\"");
                self.w.write_escaped_attr(self.base);
                self.w.write_str("/posts?tags=");
                self.w.write_escaped_attr(&escape::encode_query_value(tag));
                self.w.write_str("\">#");
                self.w.write_escaped_text(tag);
                self.w.write_str("</a>");
            }
            InlineNode::Color { value, children } => {
                match value {
                    ColorValue::Category(category) => {
                        self.w.write_str("<span class=\"dtext-color-");
                        self.w.write_str(*category);
                        self.w.write_str("\">");
                    }
                    ColorValue::Named(color) => {
                        self.w.write_str("<span class=\"dtext-color\" style=\"color:");
                        self.w.write_str(*color);
                        self.w.write_str("\">");
                    }
                    ColorValue::Hex(color) => {
                        self.w.write_str("<span class=\"dtext-color\" style=\"color:");
                        self.w.write_escaped_attr(color);
                        self.w.write_str("\">");
                    }
                }
                self.inlines(children);
                self.w.write_str("</span>");
            }
            InlineNode::Code(text) => {
                self.w.write_str("<code>");
                self.w.write_escaped_text(text);
                self.w.write_str("</code>");
            }
            InlineNode::LineBreak => self.w.write_str("<br>"),
        }
    }

    fn id_link(&mut self, spec: &IdLinkSpec, id: &str, suffix: Option<&str>) {
        self.w.write_str("<a class=\"dtext-link dtext-id-link dtext-");
        self.w.write_raw(spec.kind);
        self.w.write_str("-id-link\" href=\"");
        if !spec.external {
            self.w.write_escaped_attr(self.base);
        }
        self.w.write_escaped_attr(&spec.href(id, suffix));
        self.w.write_str("\">");
        self.w.write_raw(spec.label());
        self.w.write_str(" #");
        self.w.write_escaped_text(id);
        if let Some(label) = spec.suffix_label(suffix) {
            self.w.write_escaped_text(&label);
        }
        self.w.write_str("</a>");
    }
}
