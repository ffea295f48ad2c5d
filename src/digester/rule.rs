//! Rule trait and dispatch context
//!
//! A rule reacts to the elements its pattern matches. For every matched
//! element the engine calls `begin` once, `body` for each span of text
//! directly inside it, and `end` once. After the document ends, `finish`
//! runs once per rule that fired.

use super::path::PathStack;
use super::stack::{ObjectStack, ParamStack};
use crate::error::Result;
use crate::invoke::{MethodInvoker, Value};
use crate::sax::{Attributes, QName};

/// Behavior attached to a pattern
///
/// Every hook defaults to doing nothing. Hooks take `&self`: a rule may be
/// shared by several patterns and many parses, so per-element state lives
/// on the stacks.
pub trait Rule {
    /// Short name used in log messages and errors
    fn name(&self) -> &'static str {
        "Rule"
    }

    fn begin(&self, ctx: &mut Context<'_>, name: &QName, attributes: &Attributes) -> Result<()> {
        let _ = (ctx, name, attributes);
        Ok(())
    }

    /// Text directly inside the element, one call per span between child
    /// elements
    fn body(&self, ctx: &mut Context<'_>, name: &QName, text: &str) -> Result<()> {
        let _ = (ctx, name, text);
        Ok(())
    }

    fn end(&self, ctx: &mut Context<'_>, name: &QName) -> Result<()> {
        let _ = (ctx, name);
        Ok(())
    }

    /// Cleanup after the whole document has been processed
    fn finish(&self, ctx: &mut Context<'_>) -> Result<()> {
        let _ = ctx;
        Ok(())
    }
}

/// What a rule hook can see and change
pub struct Context<'a> {
    pub(crate) objects: &'a mut ObjectStack,
    pub(crate) params: &'a mut ParamStack,
    pub(crate) path: &'a PathStack,
    pub(crate) root: &'a mut Option<Value>,
    pub(crate) invoker: &'a dyn MethodInvoker,
    pub(crate) log_target: &'a str,
}

impl<'a> Context<'a> {
    /// Push onto the object stack
    ///
    /// A value pushed onto an empty stack becomes the parse result.
    pub fn push(&mut self, value: Value) {
        if self.objects.is_empty() {
            *self.root = Some(value.clone());
        }
        self.objects.push(value);
    }

    pub fn pop(&mut self) -> Result<Value> {
        self.objects.pop()
    }

    /// Object `offset` places below the top of the stack
    pub fn peek(&self, offset: usize) -> Result<&Value> {
        self.objects.peek(offset)
    }

    pub fn objects(&mut self) -> &mut ObjectStack {
        &mut *self.objects
    }

    pub fn params(&mut self) -> &mut ParamStack {
        &mut *self.params
    }

    /// Current element path (read-only)
    pub fn path(&self) -> &PathStack {
        self.path
    }

    /// Slash-joined current path, for diagnostics
    pub fn match_path(&self) -> &str {
        self.path.as_match()
    }

    pub fn root(&self) -> Option<&Value> {
        self.root.as_ref()
    }

    pub fn invoker(&self) -> &dyn MethodInvoker {
        self.invoker
    }

    /// `log` target configured on the engine
    pub fn log_target(&self) -> &str {
        self.log_target
    }
}
