//! Block node tree.

use crate::inline::InlineNode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockNode<'a> {
    Paragraph(Vec<InlineNode<'a>>),
    Header {
        level: u8,
        /// Slug, without the `dtext-` prefix.
        id: Option<String>,
        children: Vec<InlineNode<'a>>,
    },
    List(Vec<ListItem<'a>>),
    Quote(Vec<BlockNode<'a>>),
    Spoiler(Vec<BlockNode<'a>>),
    Section {
        title: Vec<InlineNode<'a>>,
        expanded: bool,
        children: Vec<BlockNode<'a>>,
    },
    Code {
        language: Option<String>,
        text: &'a str,
    },
    Table(Table<'a>),
    HorizontalRule,
    TranslatorNote(Vec<InlineNode<'a>>),
    /// `[nodtext]` content, emitted escaped and never parsed.
    Nodtext(&'a str),
    /// Inline-mode output: no paragraph wrapper.
    Fragment(Vec<InlineNode<'a>>),
}

/// One `*`-prefixed line. Depth starts at 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem<'a> {
    pub depth: usize,
    pub children: Vec<InlineNode<'a>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table<'a> {
    pub sections: Vec<TableSection<'a>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Head,
    Body,
    /// Rows written without `[thead]`/`[tbody]`.
    Bare,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSection<'a> {
    pub kind: SectionKind,
    pub rows: Vec<Vec<Cell<'a>>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell<'a> {
    /// `[th]` rather than `[td]`.
    pub header: bool,
    pub attrs: CellAttrs,
    pub children: Vec<InlineNode<'a>>,
}

/// Validated cell attributes. Anything else is dropped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellAttrs {
    pub colspan: Option<u32>,
    pub rowspan: Option<u32>,
    pub align: Option<&'static str>,
}
