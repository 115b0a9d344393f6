//! Bounded cursor for byte scanning over a `&str`.
//!
//! Every scanner works inside a window `[pos, end)` of the normalized
//! input. The cursor only ever stops on ASCII bytes or after a whole
//! char, so any offset it reports is a valid char boundary.

/// A cursor over a window of the input.
///
/// # Example
/// ```
/// use dtext::cursor::Cursor;
///
/// let mut cursor = Cursor::new("[b]bold[/b]");
/// assert!(cursor.eat(b'['));
/// assert!(cursor.eat_ignore_case(b"B"));
/// assert_eq!(cursor.peek(), Some(b']'));
/// ```
#[derive(Clone, Copy)]
pub struct Cursor<'a> {
    input: &'a str,
    pos: usize,
    end: usize,
}

impl<'a> Cursor<'a> {
    /// Create a cursor over the whole input.
    #[inline]
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            end: input.len(),
        }
    }

    /// Create a cursor over `[pos, end)`.
    #[inline]
    pub fn window(input: &'a str, pos: usize, end: usize) -> Self {
        debug_assert!(pos <= end && end <= input.len());
        Self { input, pos, end }
    }

    /// Current offset from the start of input.
    #[inline]
    pub fn offset(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn set_offset(&mut self, pos: usize) {
        debug_assert!(pos <= self.end);
        self.pos = pos;
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.end - self.pos
    }

    #[inline]
    pub fn is_eof(&self) -> bool {
        self.pos >= self.end
    }

    #[inline]
    pub fn peek(&self) -> Option<u8> {
        if self.is_eof() {
            None
        } else {
            Some(self.input.as_bytes()[self.pos])
        }
    }

    /// The char at the cursor, decoding multi-byte sequences.
    #[inline]
    pub fn peek_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Advance by n bytes. Callers only pass lengths of ASCII runs or
    /// whole chars.
    #[inline]
    pub fn advance(&mut self, n: usize) {
        debug_assert!(n <= self.remaining());
        self.pos += n;
    }

    /// Advance past the current char.
    #[inline]
    pub fn bump_char(&mut self) {
        if let Some(c) = self.peek_char() {
            self.pos += c.len_utf8();
        }
    }

    #[inline]
    pub fn at(&self, b: u8) -> bool {
        self.peek() == Some(b)
    }

    /// Consume a specific byte if present.
    #[inline]
    pub fn eat(&mut self, b: u8) -> bool {
        if self.at(b) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Check for an ASCII keyword, ignoring case, without consuming it.
    #[inline]
    pub fn at_ignore_case(&self, word: &[u8]) -> bool {
        let bytes = self.rest().as_bytes();
        bytes.len() >= word.len() && bytes[..word.len()].eq_ignore_ascii_case(word)
    }

    /// Consume an ASCII keyword, ignoring case.
    #[inline]
    pub fn eat_ignore_case(&mut self, word: &[u8]) -> bool {
        if self.at_ignore_case(word) {
            self.pos += word.len();
            true
        } else {
            false
        }
    }

    /// Skip while predicate is true, returning the number of bytes skipped.
    #[inline]
    pub fn skip_while<F>(&mut self, mut predicate: F) -> usize
    where
        F: FnMut(u8) -> bool,
    {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if !predicate(b) {
                break;
            }
            self.pos += 1;
        }
        self.pos - start
    }

    /// Skip spaces and tabs.
    #[inline]
    pub fn skip_whitespace(&mut self) -> usize {
        self.skip_while(|b| b == b' ' || b == b'\t')
    }

    /// Skip ASCII digits.
    #[inline]
    pub fn skip_digits(&mut self) -> usize {
        self.skip_while(|b| b.is_ascii_digit())
    }

    /// Remaining text inside the window.
    #[inline]
    pub fn rest(&self) -> &'a str {
        &self.input[self.pos..self.end]
    }

    /// Find the next occurrence of a byte using memchr.
    #[inline]
    pub fn find(&self, needle: u8) -> Option<usize> {
        memchr::memchr(needle, self.rest().as_bytes())
    }

    /// Offset of the end of the current line (the `\n` or window end).
    #[inline]
    pub fn line_end(&self) -> usize {
        match self.find(b'\n') {
            Some(n) => self.pos + n,
            None => self.end,
        }
    }
}

impl std::fmt::Debug for Cursor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cursor")
            .field("offset", &self.pos)
            .field("remaining", &self.remaining())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_empty() {
        let cursor = Cursor::new("");
        assert!(cursor.is_eof());
        assert_eq!(cursor.peek(), None);
        assert_eq!(cursor.peek_char(), None);
    }

    #[test]
    fn test_cursor_window_bounds() {
        let input = "hello world";
        let mut cursor = Cursor::window(input, 6, 9);
        assert_eq!(cursor.rest(), "wor");
        cursor.advance(3);
        assert!(cursor.is_eof());
        assert_eq!(cursor.peek(), None);
    }

    #[test]
    fn test_cursor_eat_ignore_case() {
        let mut cursor = Cursor::new("Post #12");
        assert!(!cursor.eat_ignore_case(b"pool"));
        assert!(cursor.eat_ignore_case(b"post"));
        assert!(cursor.eat(b' '));
        assert!(cursor.eat(b'#'));
        assert_eq!(cursor.skip_digits(), 2);
        assert!(cursor.is_eof());
    }

    #[test]
    fn test_cursor_chars() {
        let mut cursor = Cursor::new("日本");
        assert_eq!(cursor.peek_char(), Some('日'));
        cursor.bump_char();
        assert_eq!(cursor.offset(), 3);
    }

    #[test]
    fn test_cursor_line_end() {
        let cursor = Cursor::new("line1\nline2");
        assert_eq!(cursor.line_end(), 5);
        let cursor = Cursor::window("line1\nline2", 6, 11);
        assert_eq!(cursor.line_end(), 11);
    }
}
