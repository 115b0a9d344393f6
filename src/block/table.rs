//! `[table]` parsing.
//!
//! Only structure tags are honored between cells; any other text inside
//! the table is dropped. Cells written outside a `[tr]` open one.

use memchr::memchr2;

use crate::inline::{RunMode, Stop, trim_edges};
use crate::limits::MAX_TABLE_COLUMNS;
use crate::scanner::{Attr, BlockMask, TagName, TagToken, scan_tag};

use super::node::{Cell, CellAttrs, SectionKind, Table, TableSection};
use super::parser::BlockParser;

/// Table being assembled.
struct Builder<'a> {
    table: Table<'a>,
    section: Option<TableSection<'a>>,
    row: Option<Vec<Cell<'a>>>,
}

impl<'a> Builder<'a> {
    fn new() -> Self {
        Self {
            table: Table::default(),
            section: None,
            row: None,
        }
    }

    fn end_row(&mut self) {
        let Some(row) = self.row.take() else {
            return;
        };
        if row.is_empty() {
            return;
        }
        self.section
            .get_or_insert_with(|| TableSection {
                kind: SectionKind::Bare,
                rows: Vec::new(),
            })
            .rows
            .push(row);
    }

    fn end_section(&mut self) {
        self.end_row();
        if let Some(section) = self.section.take() {
            if !section.rows.is_empty() {
                self.table.sections.push(section);
            }
        }
    }

    fn start_section(&mut self, kind: SectionKind) {
        self.end_section();
        self.section = Some(TableSection {
            kind,
            rows: Vec::new(),
        });
    }

    fn push_cell(&mut self, cell: Cell<'a>) {
        let row = self.row.get_or_insert_with(Vec::new);
        if row.len() < MAX_TABLE_COLUMNS {
            row.push(cell);
        }
    }

    fn finish(mut self) -> Table<'a> {
        self.end_section();
        self.table
    }
}

impl<'a> BlockParser<'a, '_> {
    /// Parse table content after `[table]`. Returns the table and the
    /// offset after `[/table]`, or where an enclosing closer starts.
    pub(super) fn table(&mut self, after: usize, mask: BlockMask) -> (Table<'a>, usize) {
        let input = self.input;
        let len = input.len();
        let mask = mask.with(TagName::Table);
        let mut builder = Builder::new();
        let mut pos = after;

        while pos < len {
            let Some(found) = memchr2(b'[', b'<', &input.as_bytes()[pos..]) else {
                break;
            };
            let at = pos + found;
            pos = match scan_tag(input, at, len) {
                Some(TagToken::Open(tag)) => {
                    let end = tag.range.end_usize();
                    match tag.name {
                        TagName::Thead => {
                            builder.start_section(SectionKind::Head);
                            end
                        }
                        TagName::Tbody => {
                            builder.start_section(SectionKind::Body);
                            end
                        }
                        TagName::Tr => {
                            builder.end_row();
                            builder.row = Some(Vec::new());
                            end
                        }
                        TagName::Td | TagName::Th => {
                            let stop = Stop {
                                mode: RunMode::Cell,
                                closers: mask,
                                block_openers: false,
                            };
                            let mut children = self.inline.parse_run(end, stop);
                            trim_edges(&mut children);
                            builder.push_cell(Cell {
                                header: tag.name == TagName::Th,
                                attrs: cell_attrs(&tag.attrs),
                                children,
                            });
                            let stopped = self.inline.position();
                            match scan_tag(input, stopped, len) {
                                Some(TagToken::Close {
                                    name: TagName::Td | TagName::Th,
                                    range,
                                }) => range.end_usize(),
                                _ => stopped,
                            }
                        }
                        _ => end,
                    }
                }
                Some(TagToken::Close { name, range }) => match name {
                    TagName::Table => return (builder.finish(), range.end_usize()),
                    _ if mask.contains(name) => return (builder.finish(), at),
                    TagName::Tr => {
                        builder.end_row();
                        range.end_usize()
                    }
                    TagName::Thead | TagName::Tbody => {
                        builder.end_section();
                        range.end_usize()
                    }
                    _ => range.end_usize(),
                },
                None => at + 1,
            };
        }
        (builder.finish(), len)
    }
}

/// Keep `colspan`/`rowspan` with digit values and a known `align`.
/// Later valid duplicates win.
fn cell_attrs(attrs: &[Attr<'_>]) -> CellAttrs {
    let mut out = CellAttrs::default();
    for attr in attrs {
        let Some(value) = attr.value else {
            continue;
        };
        let span = || {
            value
                .bytes()
                .all(|b| b.is_ascii_digit())
                .then(|| value.parse::<u32>().ok())
                .flatten()
                .filter(|&n| n > 0)
        };
        if attr.name.eq_ignore_ascii_case("colspan") {
            if let Some(n) = span() {
                out.colspan = Some(n);
            }
        } else if attr.name.eq_ignore_ascii_case("rowspan") {
            if let Some(n) = span() {
                out.rowspan = Some(n);
            }
        } else if attr.name.eq_ignore_ascii_case("align") {
            let align = ["left", "center", "right", "justify"]
                .into_iter()
                .find(|align| value.eq_ignore_ascii_case(align));
            if align.is_some() {
                out.align = align;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attr<'a>(name: &'a str, value: Option<&'a str>) -> Attr<'a> {
        Attr { name, value }
    }

    #[test]
    fn test_cell_attrs_allowlist() {
        let attrs = cell_attrs(&[
            attr("colspan", Some("2")),
            attr("rowspan", Some("blah")),
            attr("align", Some("CENTER")),
            attr("onclick", Some("x")),
        ]);
        assert_eq!(
            attrs,
            CellAttrs {
                colspan: Some(2),
                rowspan: None,
                align: Some("center"),
            }
        );
    }

    #[test]
    fn test_cell_attrs_duplicates() {
        let attrs = cell_attrs(&[
            attr("colspan", Some("2")),
            attr("colspan", Some("x")),
            attr("colspan", Some("3")),
            attr("align", None),
        ]);
        assert_eq!(attrs.colspan, Some(3));
        assert_eq!(attrs.align, None);
    }
}
