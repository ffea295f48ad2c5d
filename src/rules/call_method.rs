//! Method call rule

use super::object_at;
use crate::digester::{Context, Rule};
use crate::error::Result;
use crate::invoke::{MatchPolicy, MethodCall, Value, ValueType};
use crate::sax::{Attributes, QName};

/// Calls a method on a stack object when the element ends
///
/// At begin the rule pushes a frame of empty argument slots onto the param
/// stack. With `param_count > 0` [`CallParamRule`](super::CallParamRule)s
/// fill the slots; with `param_count == 0` the element's body text goes
/// into the single slot. If any slot is still empty at end the call is
/// skipped. String arguments are trimmed when the call is made.
#[derive(Debug, Clone)]
pub struct CallMethodRule {
    method: String,
    param_count: usize,
    param_types: Vec<ValueType>,
    target_offset: usize,
    policy: MatchPolicy,
}

impl CallMethodRule {
    pub fn new(method: impl Into<String>, param_count: usize) -> Self {
        CallMethodRule {
            method: method.into(),
            param_count,
            param_types: vec![ValueType::Str; param_count.max(1)],
            target_offset: 0,
            policy: MatchPolicy::default(),
        }
    }

    /// Call with the element's body text as the only argument
    pub fn with_body(method: impl Into<String>) -> Self {
        Self::new(method, 0)
    }

    /// Declared argument types; all `Str` unless set
    pub fn param_types(mut self, types: Vec<ValueType>) -> Self {
        self.param_types = types;
        self
    }

    /// Call the object this many places below the top of the stack
    pub fn target_offset(mut self, offset: usize) -> Self {
        self.target_offset = offset;
        self
    }

    pub fn exact_match(mut self, exact: bool) -> Self {
        self.policy = if exact {
            MatchPolicy::Exact
        } else {
            MatchPolicy::Assignable
        };
        self
    }
}

fn trimmed(value: Value) -> Value {
    match value {
        Value::Str(text) if text.trim().len() != text.len() => Value::from(text.trim()),
        other => other,
    }
}

impl Rule for CallMethodRule {
    fn name(&self) -> &'static str {
        "CallMethodRule"
    }

    fn begin(&self, ctx: &mut Context<'_>, _name: &QName, _attributes: &Attributes) -> Result<()> {
        ctx.params().push(vec![None; self.param_count.max(1)]);
        Ok(())
    }

    fn body(&self, ctx: &mut Context<'_>, _name: &QName, text: &str) -> Result<()> {
        if self.param_count > 0 {
            return Ok(());
        }
        let Some(slot) = ctx.params().peek_mut(0)?.first_mut() else {
            return Ok(());
        };
        match slot {
            Some(Value::Str(collected)) => collected.push_str(text),
            _ => *slot = Some(Value::from(text)),
        }
        Ok(())
    }

    fn end(&self, ctx: &mut Context<'_>, _name: &QName) -> Result<()> {
        // Frames pushed by descendants were popped when they closed
        let frame = ctx.params().pop()?;
        let args: Option<Vec<Value>> = frame.into_iter().map(|slot| slot.map(trimmed)).collect();

        let Some(args) = args else {
            log::debug!(
                target: ctx.log_target(),
                "[CallMethodRule]{{{}}} Skip {}: missing argument(s)",
                ctx.match_path(),
                self.method
            );
            return Ok(());
        };

        let target = object_at(ctx, self.target_offset, self.name())?;
        log::debug!(
            target: ctx.log_target(),
            "[CallMethodRule]{{{}}} Call {}.{}({})",
            ctx.match_path(),
            target.type_name(),
            self.method,
            args.iter().map(Value::to_string).collect::<Vec<_>>().join(", ")
        );

        ctx.invoker().invoke(MethodCall {
            target,
            method: self.method.clone(),
            args,
            param_types: self.param_types.clone(),
            policy: self.policy,
        })?;
        Ok(())
    }
}
