//! Call parameter rule

use crate::digester::{Context, Rule};
use crate::error::{DigesterError, Result};
use crate::invoke::Value;
use crate::sax::{Attributes, QName};

/// Where a [`CallParamRule`] takes its value from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamSource {
    /// Named attribute of the matched element
    Attribute(String),
    /// Body text of the matched element
    Body,
    /// Object stack entry at this offset from the top
    Stack(usize),
}

/// Fills one argument slot of the innermost pending
/// [`CallMethodRule`](super::CallMethodRule) call
///
/// A slot left empty (missing attribute, no body text) cancels the call.
/// Body spans are joined as they arrive; the calling rule trims the result.
#[derive(Debug, Clone)]
pub struct CallParamRule {
    index: usize,
    source: ParamSource,
}

impl CallParamRule {
    pub fn new(index: usize, source: ParamSource) -> Self {
        CallParamRule { index, source }
    }

    pub fn from_attribute(index: usize, attribute: impl Into<String>) -> Self {
        Self::new(index, ParamSource::Attribute(attribute.into()))
    }

    pub fn from_body(index: usize) -> Self {
        Self::new(index, ParamSource::Body)
    }

    pub fn from_stack(index: usize, offset: usize) -> Self {
        Self::new(index, ParamSource::Stack(offset))
    }

    pub fn source(&self) -> &ParamSource {
        &self.source
    }

    fn slot<'c>(&self, ctx: &'c mut Context<'_>) -> Result<&'c mut Option<Value>> {
        let frame = ctx.params().peek_mut(0)?;
        let len = frame.len();
        frame.get_mut(self.index).ok_or_else(|| {
            DigesterError::rule(
                "CallParamRule",
                format!("parameter index {} out of range for {len} argument(s)", self.index),
            )
        })
    }

    fn set(&self, ctx: &mut Context<'_>, value: Value) -> Result<()> {
        log::debug!(
            target: ctx.log_target(),
            "[CallParamRule]{{{}}} Save parameter {} = {}",
            ctx.match_path(),
            self.index,
            value
        );
        *self.slot(ctx)? = Some(value);
        Ok(())
    }
}

impl Rule for CallParamRule {
    fn name(&self) -> &'static str {
        "CallParamRule"
    }

    fn begin(&self, ctx: &mut Context<'_>, _name: &QName, attributes: &Attributes) -> Result<()> {
        match &self.source {
            ParamSource::Attribute(attribute) => match attributes.get(attribute) {
                Some(value) => self.set(ctx, Value::from(value)),
                None => Ok(()),
            },
            ParamSource::Stack(offset) => {
                let value = ctx.peek(*offset)?.clone();
                self.set(ctx, value)
            }
            ParamSource::Body => Ok(()),
        }
    }

    fn body(&self, ctx: &mut Context<'_>, _name: &QName, text: &str) -> Result<()> {
        if self.source != ParamSource::Body {
            return Ok(());
        }
        let slot = self.slot(ctx)?;
        match slot {
            Some(Value::Str(collected)) => collected.push_str(text),
            _ => *slot = Some(Value::from(text)),
        }
        Ok(())
    }
}
