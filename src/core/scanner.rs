//! Byte cursor over validated UTF-8 input
//!
//! Delimiter searches go through memchr/memmem, which pick SSE2, AVX2 or
//! NEON at runtime. Every position the cursor stops at sits on an ASCII
//! delimiter, so slicing between two of them stays on char boundaries.

use memchr::{memchr, memmem};

pub struct Scanner<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    #[inline]
    pub fn new(text: &'a str) -> Self {
        Scanner { text, pos: 0 }
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Move to an absolute position, clamped to the end of input
    #[inline]
    pub fn seek(&mut self, pos: usize) {
        self.pos = pos.min(self.text.len());
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.text.len()
    }

    #[inline]
    pub fn peek(&self) -> Option<u8> {
        self.text.as_bytes().get(self.pos).copied()
    }

    #[inline]
    pub fn peek_at(&self, offset: usize) -> Option<u8> {
        self.text.as_bytes().get(self.pos + offset).copied()
    }

    #[inline]
    pub fn bump(&mut self, n: usize) {
        self.seek(self.pos + n);
    }

    #[inline]
    pub fn at(&self, literal: &str) -> bool {
        self.text.as_bytes()[self.pos..].starts_with(literal.as_bytes())
    }

    /// Consume `literal` if the input continues with it
    #[inline]
    pub fn eat(&mut self, literal: &str) -> bool {
        let found = self.at(literal);
        if found {
            self.pos += literal.len();
        }
        found
    }

    /// Returns the number of bytes skipped
    pub fn skip_whitespace(&mut self) -> usize {
        let start = self.pos;
        while let Some(b' ' | b'\t' | b'\n' | b'\r') = self.peek() {
            self.pos += 1;
        }
        self.pos - start
    }

    /// Absolute position of the next `byte`
    #[inline]
    pub fn find(&self, byte: u8) -> Option<usize> {
        memchr(byte, &self.text.as_bytes()[self.pos..]).map(|i| self.pos + i)
    }

    /// Absolute position of the next `needle`
    #[inline]
    pub fn find_str(&self, needle: &str) -> Option<usize> {
        memmem::find(&self.text.as_bytes()[self.pos..], needle.as_bytes()).map(|i| self.pos + i)
    }

    /// Input between two positions, empty if they do not delimit a slice
    #[inline]
    pub fn slice(&self, start: usize, end: usize) -> &'a str {
        self.text.get(start..end).unwrap_or("")
    }

    /// Consume an element or attribute name
    pub fn read_name(&mut self) -> Option<&'a str> {
        let start = self.pos;
        if !is_name_start_char(self.peek()?) {
            return None;
        }
        self.pos += 1;
        while self.peek().is_some_and(is_name_char) {
            self.pos += 1;
        }
        Some(self.slice(start, self.pos))
    }
}

/// Letters, `_` and `:`; any byte of a multi-byte char is accepted
#[inline]
pub fn is_name_start_char(b: u8) -> bool {
    b.is_ascii_alphabetic() || matches!(b, b'_' | b':') || b >= 0x80
}

#[inline]
pub fn is_name_char(b: u8) -> bool {
    is_name_start_char(b) || b.is_ascii_digit() || matches!(b, b'-' | b'.')
}
