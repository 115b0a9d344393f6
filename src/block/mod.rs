//! Block-level parser for DText.
//!
//! The block parser is line-oriented and handles:
//! - Headers (`h1.` to `h6.`, with optional `#id`)
//! - Lists (`*`, `**`, ...)
//! - Quotes, spoilers and collapsible sections
//! - Code and no-DText blocks
//! - Tables
//! - Translator notes and horizontal rules
//! - Paragraphs

mod node;
mod parser;
mod table;

pub use node::{BlockNode, Cell, CellAttrs, ListItem, SectionKind, Table, TableSection};
pub use parser::BlockParser;
