//! Path Stack
//!
//! The element path from the document root to the current position. A
//! slash-joined copy is kept up to date on every push and pop so the matcher
//! can take the full path or any suffix as a `&str` without allocating.

use crate::error::{DigesterError, Result, StackKind};

/// Current document path, one qualified name per open element
#[derive(Debug, Default, Clone)]
pub struct PathStack {
    /// Segments joined with '/'
    joined: String,
    /// Byte offset in `joined` where each segment starts
    starts: Vec<usize>,
}

impl PathStack {
    pub fn new() -> Self {
        PathStack {
            joined: String::with_capacity(128),
            starts: Vec::with_capacity(16),
        }
    }

    /// Append a segment on element open
    pub fn push(&mut self, segment: &str) {
        if !self.starts.is_empty() {
            self.joined.push('/');
        }
        self.starts.push(self.joined.len());
        self.joined.push_str(segment);
    }

    /// Remove the innermost segment on element close
    pub fn pop(&mut self) -> Result<()> {
        let start = self
            .starts
            .pop()
            .ok_or_else(|| DigesterError::underflow(StackKind::Path, 1, 0))?;
        // Drop the separator too, unless this was the root segment
        self.joined.truncate(start.saturating_sub(1));
        Ok(())
    }

    /// Segments from the root inward
    pub fn current(&self) -> Vec<&str> {
        self.segments().collect()
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> + '_ {
        (0..self.starts.len()).filter_map(move |i| self.segment(i))
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.starts.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.starts.is_empty()
    }

    /// Slash-joined full path, e.g. `catalog/book/title`
    #[inline]
    pub fn as_match(&self) -> &str {
        &self.joined
    }

    /// Slash-joined trailing `k` segments
    ///
    /// `k` greater than the depth yields the full path; `k == 0` yields "".
    pub fn suffix(&self, k: usize) -> &str {
        let depth = self.depth();
        if k == 0 {
            return "";
        }
        if k >= depth {
            return &self.joined;
        }
        &self.joined[self.starts[depth - k]..]
    }

    /// Innermost segment
    pub fn last(&self) -> Option<&str> {
        self.depth().checked_sub(1).and_then(|i| self.segment(i))
    }

    pub fn clear(&mut self) {
        self.joined.clear();
        self.starts.clear();
    }

    fn segment(&self, index: usize) -> Option<&str> {
        let start = *self.starts.get(index)?;
        let end = self
            .starts
            .get(index + 1)
            .map_or(self.joined.len(), |next| next - 1);
        self.joined.get(start..end)
    }
}
