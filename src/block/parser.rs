//! Block parser implementation.
//!
//! Line-oriented. Each block start is classified at the first non-blank
//! byte of a line; inline content is handed to the [`InlineParser`],
//! which reports where its run stopped.

use std::borrow::Cow;

use crate::cursor::Cursor;
use crate::escape::slugify;
use crate::inline::{InlineNode, InlineParser, RunMode, Stop, trim_edges};
use crate::limits::MAX_BLOCK_NESTING;
use crate::options::ParseOptions;
use crate::refs::References;
use crate::scanner::{BlockMask, Tag, TagName, TagToken, header_at, list_marker_at, scan_tag};

use super::node::{BlockNode, ListItem};

/// Block parser state.
pub struct BlockParser<'a, 'r> {
    pub(super) input: &'a str,
    pub(super) inline: InlineParser<'a, 'r>,
    inline_mode: bool,
}

impl<'a, 'r> BlockParser<'a, 'r> {
    pub fn new(input: &'a str, options: &'a ParseOptions, refs: &'r mut References) -> Self {
        Self {
            input,
            inline: InlineParser::new(input, options, refs),
            inline_mode: options.inline,
        }
    }

    /// Parse the whole input.
    pub fn parse(mut self) -> Vec<BlockNode<'a>> {
        if self.inline_mode {
            let mut nodes = self.inline.parse_run(0, Stop::FREE);
            trim_edges(&mut nodes);
            return if nodes.is_empty() {
                Vec::new()
            } else {
                vec![BlockNode::Fragment(nodes)]
            };
        }

        let mut blocks = Vec::new();
        let mut pos = 0;
        while pos < self.input.len() {
            pos = self.parse_blocks(pos, &mut blocks, BlockMask::EMPTY, 0);
        }
        blocks
    }

    /// Parse blocks until end of input or a closer in `mask`, which is
    /// left unconsumed. Returns the stop offset.
    pub(super) fn parse_blocks(
        &mut self,
        mut pos: usize,
        out: &mut Vec<BlockNode<'a>>,
        mask: BlockMask,
        depth: usize,
    ) -> usize {
        let len = self.input.len();
        loop {
            pos = self.skip_blank_lines(pos);
            let mut cursor = Cursor::window(self.input, pos, len);
            cursor.skip_whitespace();
            let at = cursor.offset();
            if at >= len {
                return len;
            }

            match scan_tag(self.input, at, len) {
                Some(TagToken::Close { name, .. }) if mask.contains(name) => return at,
                Some(TagToken::Open(tag)) if tag.name.is_block_capable() => {
                    if depth < MAX_BLOCK_NESTING {
                        if let Some(next) = self.block_tag(tag, out, mask, depth) {
                            pos = next;
                            continue;
                        }
                    } else {
                        tracing::trace!(offset = at, "block nesting limit reached");
                    }
                }
                _ => {}
            }

            pos = if let Some(marker) = header_at(self.input, at, len) {
                let stop = Stop {
                    mode: RunMode::Line,
                    closers: mask,
                    block_openers: false,
                };
                let mut children = self.inline.parse_run(marker.content, stop);
                trim_edges(&mut children);
                let id = marker
                    .id
                    .map(|id| slugify(id.slice(self.input)))
                    .filter(|slug| !slug.is_empty());
                out.push(BlockNode::Header {
                    level: marker.level,
                    id,
                    children,
                });
                self.inline.position()
            } else if list_marker_at(self.input, at, len).is_some() {
                self.list(at, out, mask)
            } else {
                self.paragraph(at, out, mask, depth)
            };
        }
    }

    /// Skip lines holding only spaces and tabs, plus the newline that
    /// ended the previous block.
    fn skip_blank_lines(&self, mut pos: usize) -> usize {
        let len = self.input.len();
        loop {
            let mut cursor = Cursor::window(self.input, pos, len);
            cursor.skip_whitespace();
            if cursor.eat(b'\n') {
                pos = cursor.offset();
            } else {
                return pos;
            }
        }
    }

    fn paragraph(
        &mut self,
        at: usize,
        out: &mut Vec<BlockNode<'a>>,
        mask: BlockMask,
        depth: usize,
    ) -> usize {
        let stop = Stop {
            mode: RunMode::Paragraph,
            closers: mask,
            block_openers: depth < MAX_BLOCK_NESTING,
        };
        let mut children = self.inline.parse_run(at, stop);
        let mut next = self.inline.position();
        if next == at {
            // nothing consumed; take one char literally
            let width = self.input[at..].chars().next().map_or(1, char::len_utf8);
            next = at + width;
            children = vec![InlineNode::Text(Cow::Borrowed(&self.input[at..next]))];
        }
        trim_edges(&mut children);
        if !children.is_empty() {
            out.push(BlockNode::Paragraph(children));
        }
        next
    }

    /// Consecutive list lines form one list.
    fn list(&mut self, mut at: usize, out: &mut Vec<BlockNode<'a>>, mask: BlockMask) -> usize {
        let len = self.input.len();
        let stop = Stop {
            mode: RunMode::Line,
            closers: mask,
            block_openers: false,
        };
        let mut items = Vec::new();
        while let Some((depth, content)) = list_marker_at(self.input, at, len) {
            let mut children = self.inline.parse_run(content, stop);
            trim_edges(&mut children);
            items.push(ListItem { depth, children });

            let end = self.inline.position();
            if self.input.as_bytes().get(end) != Some(&b'\n') {
                at = end;
                break;
            }
            at = end + 1;
            if list_marker_at(self.input, at, len).is_none() {
                break;
            }
        }
        out.push(BlockNode::List(items));
        at
    }

    /// A block-level tag at the start of a line. `None` leaves the line
    /// to the paragraph parser.
    fn block_tag(
        &mut self,
        tag: Tag<'a>,
        out: &mut Vec<BlockNode<'a>>,
        mask: BlockMask,
        depth: usize,
    ) -> Option<usize> {
        let len = self.input.len();
        let after = tag.range.end_usize();
        match tag.name {
            TagName::Quote | TagName::Spoiler | TagName::Section => {
                let mut children = Vec::new();
                let stop = self.parse_blocks(after, &mut children, mask.with(tag.name), depth + 1);
                let next = self.consume_closer(stop, tag.name);
                out.push(match tag.name {
                    TagName::Quote => BlockNode::Quote(children),
                    TagName::Spoiler => BlockNode::Spoiler(children),
                    _ => {
                        let mut title = match tag.value {
                            Some(value) => self.inline.parse_window(value.start_usize(), value.end_usize()),
                            None => Vec::new(),
                        };
                        trim_edges(&mut title);
                        BlockNode::Section {
                            title,
                            expanded: tag.expanded,
                            children,
                        }
                    }
                });
                Some(next)
            }
            TagName::Code => {
                let (text, next) = match self.inline.find_closer(after, len, TagName::Code) {
                    Some(close) => (&self.input[after..close.start_usize()], close.end_usize()),
                    None => (&self.input[after..], len),
                };
                let language = tag
                    .value
                    .map(|value| sanitize_language(value.slice(self.input)))
                    .filter(|language| !language.is_empty());
                out.push(BlockNode::Code {
                    language,
                    text: strip_newlines(text),
                });
                Some(next)
            }
            TagName::Nodtext => {
                let close = self.inline.find_closer(after, len, TagName::Nodtext)?;
                let text = strip_newlines(&self.input[after..close.start_usize()]);
                out.push(BlockNode::Nodtext(text));
                Some(close.end_usize())
            }
            TagName::Tn => {
                let stop = Stop {
                    mode: RunMode::Paragraph,
                    closers: mask.with(TagName::Tn),
                    block_openers: depth + 1 < MAX_BLOCK_NESTING,
                };
                let mut children = self.inline.parse_run(after, stop);
                let next = self.consume_closer(self.inline.position(), TagName::Tn);
                trim_edges(&mut children);
                out.push(BlockNode::TranslatorNote(children));
                Some(next)
            }
            TagName::Hr => {
                let mut cursor = Cursor::window(self.input, after, len);
                cursor.skip_whitespace();
                if !(cursor.is_eof() || cursor.at(b'\n')) {
                    return None;
                }
                out.push(BlockNode::HorizontalRule);
                Some(cursor.offset())
            }
            TagName::Table => {
                let (table, next) = self.table(after, mask);
                out.push(BlockNode::Table(table));
                Some(next)
            }
            _ => None,
        }
    }

    /// Step past the closer for `name` at `pos`, if that is what is
    /// there. Closers of outer containers are left for their owner.
    pub(super) fn consume_closer(&self, pos: usize, name: TagName) -> usize {
        match scan_tag(self.input, pos, self.input.len()) {
            Some(TagToken::Close { name: found, range }) if found == name => range.end_usize(),
            _ => pos,
        }
    }
}

/// Drop one leading and one trailing newline.
fn strip_newlines(text: &str) -> &str {
    let text = text.strip_prefix('\n').unwrap_or(text);
    text.strip_suffix('\n').unwrap_or(text)
}

/// Keep only characters valid in a `language-*` class.
fn sanitize_language(value: &str) -> String {
    value
        .trim()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '+' | '-'))
        .collect::<String>()
        .to_ascii_lowercase()
}
