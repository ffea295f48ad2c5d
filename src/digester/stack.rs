//! Object and Parameter Stacks
//!
//! Rules communicate through two stacks: objects under construction and
//! frames of collected call arguments. Offsets count from the top, so
//! `peek(0)` is the most recent entry and `peek(1)` its parent.

use crate::error::{DigesterError, Result, StackKind};
use crate::invoke::Value;

/// Depth recorded by [`Stack::mark`], restored by [`Stack::truncate_to`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct StackMark(usize);

impl StackMark {
    pub fn depth(self) -> usize {
        self.0
    }
}

/// LIFO stack that reports underflow instead of returning `None`
#[derive(Debug, Clone)]
pub struct Stack<T> {
    items: Vec<T>,
    kind: StackKind,
}

impl<T> Stack<T> {
    pub fn new(kind: StackKind) -> Self {
        Stack {
            items: Vec::with_capacity(16),
            kind,
        }
    }

    #[inline]
    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    pub fn pop(&mut self) -> Result<T> {
        self.items
            .pop()
            .ok_or_else(|| DigesterError::underflow(self.kind, 1, 0))
    }

    /// Entry `offset` places below the top
    pub fn peek(&self, offset: usize) -> Result<&T> {
        let index = self.index(offset)?;
        Ok(&self.items[index])
    }

    pub fn peek_mut(&mut self, offset: usize) -> Result<&mut T> {
        let index = self.index(offset)?;
        Ok(&mut self.items[index])
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    #[inline]
    pub fn mark(&self) -> StackMark {
        StackMark(self.items.len())
    }

    /// Drop everything pushed since `mark`
    ///
    /// A mark deeper than the current depth means entries below it were
    /// already popped; that is reported as underflow.
    pub fn truncate_to(&mut self, mark: StackMark) -> Result<()> {
        if mark.0 > self.items.len() {
            return Err(DigesterError::underflow(self.kind, mark.0, self.items.len()));
        }
        self.items.truncate(mark.0);
        Ok(())
    }

    /// Bottom-to-top iteration
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// First entry ever pushed
    pub fn bottom(&self) -> Option<&T> {
        self.items.first()
    }

    fn index(&self, offset: usize) -> Result<usize> {
        let len = self.items.len();
        if offset >= len {
            return Err(DigesterError::underflow(self.kind, offset + 1, len));
        }
        Ok(len - 1 - offset)
    }
}

/// Objects under construction
pub type ObjectStack = Stack<Value>;

/// One argument slot per expected parameter of a pending call
pub type ParamFrame = Vec<Option<Value>>;

/// Frames of collected call arguments
///
/// Besides plain stack access it supports clearing back to a marked depth,
/// which discards the arguments of calls whose element closed before all of
/// them were supplied.
#[derive(Debug, Clone)]
pub struct ParamStack {
    frames: Stack<ParamFrame>,
}

impl ParamStack {
    pub fn new() -> Self {
        ParamStack {
            frames: Stack::new(StackKind::Params),
        }
    }

    pub fn push(&mut self, frame: ParamFrame) {
        self.frames.push(frame);
    }

    pub fn pop(&mut self) -> Result<ParamFrame> {
        self.frames.pop()
    }

    pub fn peek(&self, offset: usize) -> Result<&ParamFrame> {
        self.frames.peek(offset)
    }

    pub fn peek_mut(&mut self, offset: usize) -> Result<&mut ParamFrame> {
        self.frames.peek_mut(offset)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }

    pub fn mark(&self) -> StackMark {
        self.frames.mark()
    }

    /// Discard every frame pushed since `mark`
    pub fn clear_to(&mut self, mark: StackMark) -> Result<()> {
        self.frames.truncate_to(mark)
    }
}

impl Default for ParamStack {
    fn default() -> Self {
        Self::new()
    }
}
