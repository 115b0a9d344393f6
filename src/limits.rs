//! DoS prevention constants.
//!
//! Input is untrusted, so every recursive construct has a hard ceiling.
//! Markup beyond a limit degrades to literal text instead of growing
//! the stack.

/// Maximum nesting depth for block containers (quote, spoiler, section)
pub const MAX_BLOCK_NESTING: usize = 10;

/// Maximum nesting depth for inline spans (`[b]`, `[spoiler]`, `[color]`)
pub const MAX_INLINE_NESTING: usize = 32;

/// Maximum bullet depth; deeper `*` runs are clamped to this value
pub const MAX_LIST_DEPTH: usize = 10;

/// Maximum bytes scanned between `[` and `]` when recognizing a tag
pub const MAX_TAG_LEN: usize = 1024;

/// Maximum bytes scanned for a closing `]]`, `}}` or `":`
pub const MAX_LINK_LOOKAHEAD: usize = 2048;

/// Maximum digits in an id-link number (keeps ids inside `u64`)
pub const MAX_ID_DIGITS: usize = 18;

/// Maximum length of a named HTML entity, including `&` and `;`
pub const MAX_ENTITY_LEN: usize = 10;

/// Maximum input size in bytes; spans are stored as `u32` offsets
pub const MAX_INPUT_LEN: usize = u32::MAX as usize;

/// Maximum table cells in one row before further cells are dropped
pub const MAX_TABLE_COLUMNS: usize = 128;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_are_reasonable() {
        const { assert!(MAX_BLOCK_NESTING >= 4) };
        const { assert!(MAX_BLOCK_NESTING <= 64) };
        const { assert!(MAX_INLINE_NESTING >= 16) };
        const { assert!(MAX_ID_DIGITS <= 19) };
        const { assert!(MAX_LIST_DEPTH <= MAX_INLINE_NESTING) };
    }
}
