//! Inline parser.
//!
//! Resolves one run of text into an [`InlineNode`] tree. Open formatting
//! tags live on an explicit stack:
//! - a closer matching an outer tag closes every tag opened after it
//! - a closer matching nothing is literal text
//! - tags still open when the run ends close there
//!
//! A run never reaches past its block: paragraphs end at blank lines and
//! block starts, and the closer of an enclosing container ends the run
//! without being consumed.

mod links;
mod node;
mod wiki;

use std::borrow::Cow;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

pub use node::{ColorValue, InlineNode, LinkKind, SpanKind};

use crate::Range;
use crate::catalog;
use crate::limits::MAX_INLINE_NESTING;
use crate::options::ParseOptions;
use crate::refs::References;
use crate::scanner::{self, BlockMask, Scanner, Tag, TagName, Token};

/// How a run of inline content ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// At a blank line or a line that starts a block.
    Paragraph,
    /// At the end of the line (headers, list items).
    Line,
    /// At any table structure tag. Newlines are line breaks.
    Cell,
    /// Only at the window end. Newlines are line breaks.
    Free,
}

/// Where the current run must stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stop {
    pub mode: RunMode,
    /// Closers of the enclosing block containers.
    pub closers: BlockMask,
    /// Whether `[quote]`, `[section]` and `[table]` end the run.
    pub block_openers: bool,
}

impl Stop {
    pub const FREE: Stop = Stop {
        mode: RunMode::Free,
        closers: BlockMask::EMPTY,
        block_openers: false,
    };

    #[inline]
    fn at_close(&self, name: TagName) -> bool {
        self.closers.contains(name) || (self.mode == RunMode::Cell && name.is_table_part())
    }

    #[inline]
    fn at_open(&self, name: TagName, mid_run: bool) -> bool {
        (self.mode == RunMode::Cell && name.is_table_part())
            || (self.block_openers && mid_run && name.is_container_block())
    }
}

/// Why `parse_children` returned.
enum Exit {
    /// Window exhausted.
    End,
    /// The run ended; the stopping token is not consumed.
    Stop,
    /// Closer for the stack entry at this level was consumed.
    Closed(usize),
}

/// Output buffer that merges adjacent source text into one node.
struct Nodes<'a> {
    input: &'a str,
    nodes: Vec<InlineNode<'a>>,
    pending: Option<Range>,
}

impl<'a> Nodes<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            nodes: Vec::new(),
            pending: None,
        }
    }

    /// Append source text `[start, end)`.
    fn text(&mut self, start: usize, end: usize) {
        if start == end {
            return;
        }
        match &mut self.pending {
            Some(range) if range.end_usize() == start => *range = Range::from_usize(range.start_usize(), end),
            _ => {
                self.flush();
                self.pending = Some(Range::from_usize(start, end));
            }
        }
    }

    fn push(&mut self, node: InlineNode<'a>) {
        self.flush();
        self.nodes.push(node);
    }

    fn append(&mut self, nodes: Vec<InlineNode<'a>>) {
        self.flush();
        self.nodes.extend(nodes);
    }

    fn flush(&mut self) {
        if let Some(range) = self.pending.take() {
            self.nodes
                .push(InlineNode::Text(Cow::Borrowed(range.slice(self.input))));
        }
    }

    fn finish(mut self) -> Vec<InlineNode<'a>> {
        self.flush();
        self.nodes
    }
}

/// Inline parser for one document.
///
/// Owned by the block parser, which hands it one run at a time.
pub struct InlineParser<'a, 'r> {
    input: &'a str,
    scanner: Scanner<'a>,
    options: &'a ParseOptions,
    refs: &'r mut References,
    pos: usize,
    end: usize,
    run_start: usize,
    stack: SmallVec<[TagName; 8]>,
    /// Non-zero inside a link label; nested links become text.
    link_depth: usize,
    /// Earliest offset from which a closer search reached the end of
    /// input without a hit.
    no_closer: FxHashMap<TagName, usize>,
}

impl<'a, 'r> InlineParser<'a, 'r> {
    pub fn new(input: &'a str, options: &'a ParseOptions, refs: &'r mut References) -> Self {
        Self {
            input,
            scanner: Scanner::new(input, options),
            options,
            refs,
            pos: 0,
            end: input.len(),
            run_start: 0,
            stack: SmallVec::new(),
            link_depth: 0,
            no_closer: FxHashMap::default(),
        }
    }

    /// Where the last run stopped.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Parse a run starting at `start`. Afterwards [`position`] is the
    /// offset of the token that ended the run (not consumed), or the end
    /// of input.
    ///
    /// [`position`]: InlineParser::position
    pub fn parse_run(&mut self, start: usize, stop: Stop) -> Vec<InlineNode<'a>> {
        self.pos = start;
        self.end = self.input.len();
        self.run_start = start;
        self.stack.clear();
        let mut out = Nodes::new(self.input);
        self.parse_children(&mut out, stop);
        out.finish()
    }

    /// Parse `[start, end)` on its own, with a fresh tag stack.
    pub fn parse_window(&mut self, start: usize, end: usize) -> Vec<InlineNode<'a>> {
        let saved = (self.pos, self.end, self.run_start, std::mem::take(&mut self.stack));
        self.pos = start;
        self.end = end;
        self.run_start = start;
        let mut out = Nodes::new(self.input);
        self.parse_children(&mut out, Stop::FREE);
        (self.pos, self.end, self.run_start, self.stack) = saved;
        out.finish()
    }

    fn parse_label(&mut self, start: usize, end: usize) -> Vec<InlineNode<'a>> {
        self.link_depth += 1;
        let nodes = self.parse_window(start, end);
        self.link_depth -= 1;
        nodes
    }

    /// Find the closing tag for `name`, remembering misses that ran to
    /// the end of input so repeated unclosed openers stay linear.
    pub fn find_closer(&mut self, from: usize, end: usize, name: TagName) -> Option<Range> {
        let whole = end == self.input.len();
        if whole && self.no_closer.get(&name).is_some_and(|&miss| from >= miss) {
            return None;
        }
        let found = scanner::find_close_tag(self.input, from, end, name);
        if found.is_none() && whole {
            let miss = self.no_closer.entry(name).or_insert(from);
            *miss = (*miss).min(from);
        }
        found
    }

    fn parse_children(&mut self, out: &mut Nodes<'a>, stop: Stop) -> Exit {
        while self.pos < self.end {
            let start = self.pos;
            if self.link_depth == 0 && self.try_construct(out) {
                continue;
            }

            let token = self.scanner.token_at(start, self.end);
            let next = token.range().end_usize();
            match token {
                Token::Text(_) => {
                    if self.link_depth == 0
                        && self.input.as_bytes()[start] == b'['
                        && self.markdown_link(out).is_some()
                    {
                        continue;
                    }
                    out.text(start, next);
                    self.pos = next;
                }
                Token::Newline(_) => {
                    let ends = match stop.mode {
                        RunMode::Line => true,
                        RunMode::Paragraph => scanner::breaks_paragraph(
                            self.input,
                            next,
                            self.end,
                            stop.closers,
                            stop.block_openers,
                        ),
                        RunMode::Cell | RunMode::Free => false,
                    };
                    if ends {
                        return Exit::Stop;
                    }
                    out.push(InlineNode::LineBreak);
                    self.pos = next;
                }
                Token::TagOpen(tag) => {
                    if stop.at_open(tag.name, start > self.run_start) {
                        return Exit::Stop;
                    }
                    if let Some(exit) = self.open_tag(tag, out, stop) {
                        return exit;
                    }
                }
                Token::TagClose { name, .. } => {
                    if let Some(level) = self.stack.iter().rposition(|&open| open == name) {
                        self.pos = next;
                        return Exit::Closed(level);
                    }
                    if stop.at_close(name) {
                        return Exit::Stop;
                    }
                    out.text(start, next);
                    self.pos = next;
                }
                Token::BareUrl { url, .. } => {
                    if self.link_depth > 0 {
                        out.text(start, next);
                    } else {
                        self.bare_url(url.slice(self.input), out);
                    }
                    self.pos = next;
                }
                Token::Mention { name, .. } => {
                    if self.link_depth > 0 {
                        out.text(start, next);
                    } else {
                        self.refs.add_mention(name);
                        out.push(InlineNode::Mention { username: name });
                    }
                    self.pos = next;
                }
                Token::Qtag { tag, .. } => {
                    if self.link_depth > 0 {
                        out.text(start, next);
                    } else {
                        self.refs.add_qtag(tag);
                        out.push(InlineNode::Qtag { tag });
                    }
                    self.pos = next;
                }
                Token::Entity { decoded, .. } => {
                    out.push(InlineNode::Text(decoded));
                    self.pos = next;
                }
            }
        }
        Exit::End
    }

    /// Constructs recognized before tokenizing: wiki and search links,
    /// quoted links, `<a href>`, thumbnails and id-links.
    fn try_construct(&mut self, out: &mut Nodes<'a>) -> bool {
        let start = self.pos;
        let bytes = self.input.as_bytes();
        let next = bytes.get(start + 1).copied();
        match bytes[start] {
            b'[' if next == Some(b'[') => self.wiki_link(out).is_some(),
            b'{' if next == Some(b'{') => self.search_link(out).is_some(),
            b'"' => self.quoted_link(out).is_some(),
            b'<' if matches!(next, Some(b'a' | b'A')) => self.anchor(out).is_some(),
            b if b.is_ascii_alphabetic() && scanner::at_word_start(self.input, start) => {
                self.thumb(out) || self.id_link(out)
            }
            _ => false,
        }
    }

    fn thumb(&mut self, out: &mut Nodes<'a>) -> bool {
        let Some((post_id, end)) = catalog::match_thumb(self.input, self.pos, self.end) else {
            return false;
        };
        let realized = self.refs.add_thumb(post_id, self.options.max_thumbs);
        out.push(InlineNode::Thumb { post_id, realized });
        self.pos = end;
        true
    }

    fn id_link(&mut self, out: &mut Nodes<'a>) -> bool {
        let Some(m) = catalog::match_id_link(self.input, self.pos, self.end) else {
            return false;
        };
        out.push(InlineNode::IdLink {
            spec: m.spec,
            id: m.id,
            suffix: m.suffix,
        });
        self.pos = m.end;
        true
    }

    /// Handle an opening tag. Returns an exit to propagate when the run
    /// ended inside the tag's content.
    fn open_tag(&mut self, tag: Tag<'a>, out: &mut Nodes<'a>, stop: Stop) -> Option<Exit> {
        let start = tag.range.start_usize();
        let after = tag.range.end_usize();
        let kind = match tag.name {
            TagName::B => SpanKind::Bold,
            TagName::I => SpanKind::Italic,
            TagName::U => SpanKind::Underline,
            TagName::S => SpanKind::Strike,
            TagName::Sup => SpanKind::Sup,
            TagName::Sub => SpanKind::Sub,
            TagName::Spoiler => SpanKind::Spoiler,
            TagName::Tn => SpanKind::TranslatorNote,
            TagName::Color => return self.open_color(&tag, out, stop),
            TagName::Url => {
                if self.link_depth > 0 || self.url_tag(&tag, out).is_none() {
                    out.text(start, after);
                    self.pos = after;
                }
                return None;
            }
            TagName::Code | TagName::Nodtext => {
                self.raw_tag(&tag, out);
                return None;
            }
            TagName::Br => {
                out.push(InlineNode::LineBreak);
                self.pos = after;
                return None;
            }
            // block-only tags are literal inside inline content
            _ => {
                out.text(start, after);
                self.pos = after;
                return None;
            }
        };

        if self.at_nesting_limit(start, after, out) {
            return None;
        }
        self.pos = after;
        let (children, exit) = self.nested(tag.name, stop);
        out.push(InlineNode::Emphasis { kind, children });
        exit
    }

    fn open_color(&mut self, tag: &Tag<'a>, out: &mut Nodes<'a>, stop: Stop) -> Option<Exit> {
        let start = tag.range.start_usize();
        let after = tag.range.end_usize();
        if self.at_nesting_limit(start, after, out) {
            return None;
        }
        let value = tag
            .value
            .filter(|_| self.options.allow_color)
            .and_then(|value| ColorValue::parse(value.slice(self.input)));
        self.pos = after;
        let (children, exit) = self.nested(TagName::Color, stop);
        match value {
            Some(value) => out.push(InlineNode::Color { value, children }),
            // disallowed colors keep their content, minus the tags
            None => out.append(children),
        }
        exit
    }

    fn at_nesting_limit(&mut self, start: usize, after: usize, out: &mut Nodes<'a>) -> bool {
        if self.stack.len() < MAX_INLINE_NESTING {
            return false;
        }
        tracing::trace!(offset = start, "inline nesting limit reached, tag kept as text");
        out.text(start, after);
        self.pos = after;
        true
    }

    /// Parse the content of a tag that was just opened.
    fn nested(&mut self, name: TagName, stop: Stop) -> (Vec<InlineNode<'a>>, Option<Exit>) {
        let level = self.stack.len();
        self.stack.push(name);
        let mut children = Nodes::new(self.input);
        let exit = self.parse_children(&mut children, stop);
        self.stack.truncate(level);
        let exit = match exit {
            Exit::Closed(closed) if closed == level => None,
            other => Some(other),
        };
        (children.finish(), exit)
    }

    /// Inline `[code]` and `[nodtext]`: raw up to the closer, or a
    /// literal opener when there is none.
    fn raw_tag(&mut self, tag: &Tag<'a>, out: &mut Nodes<'a>) {
        let start = tag.range.start_usize();
        let after = tag.range.end_usize();
        match self.find_closer(after, self.end, tag.name) {
            Some(close) => {
                let text = &self.input[after..close.start_usize()];
                out.push(match tag.name {
                    TagName::Code => InlineNode::Code(text),
                    _ => InlineNode::Text(Cow::Borrowed(text)),
                });
                self.pos = close.end_usize();
            }
            None => {
                out.text(start, after);
                self.pos = after;
            }
        }
    }
}

/// Drop leading and trailing whitespace and line breaks.
pub fn trim_edges(nodes: &mut Vec<InlineNode<'_>>) {
    loop {
        let remove = match nodes.first_mut() {
            Some(InlineNode::LineBreak) => true,
            Some(InlineNode::Text(text)) => {
                trim_text_start(text);
                text.is_empty()
            }
            _ => false,
        };
        if !remove {
            break;
        }
        nodes.remove(0);
    }
    loop {
        let remove = match nodes.last_mut() {
            Some(InlineNode::LineBreak) => true,
            Some(InlineNode::Text(text)) => {
                trim_text_end(text);
                text.is_empty()
            }
            _ => false,
        };
        if !remove {
            break;
        }
        nodes.pop();
    }
}

fn trim_text_start(text: &mut Cow<'_, str>) {
    let kept = text.trim_start().len();
    if kept == text.len() {
        return;
    }
    match text {
        Cow::Borrowed(s) => *s = s.trim_start(),
        Cow::Owned(s) => {
            let cut = s.len() - kept;
            s.drain(..cut);
        }
    }
}

fn trim_text_end(text: &mut Cow<'_, str>) {
    let kept = text.trim_end().len();
    match text {
        Cow::Borrowed(s) => *s = &s[..kept],
        Cow::Owned(s) => s.truncate(kept),
    }
}
