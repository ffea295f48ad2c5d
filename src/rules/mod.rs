//! Stock Rules
//!
//! The common building blocks for digesting a document into objects:
//!
//! - [`ObjectCreateRule`] - push a new object at begin, pop it at end
//! - [`SetPropertiesRule`] - call `set_<attr>` for each attribute
//! - [`CallMethodRule`] / [`CallParamRule`] - call a method with arguments
//!   gathered from attributes, body text or the object stack
//! - [`SetNextRule`] - hand the top object to its parent
//! - [`SetTopRule`] - hand the parent to the top object
//! - [`SetRootRule`] - hand the top object to the root
//!
//! Hooks of rules sharing a pattern run in registration order at both begin
//! and end. A linking rule therefore goes ahead of the `ObjectCreateRule`
//! for the same element, so the child is still on the stack when it ends.

pub mod call_method;
pub mod call_param;
pub mod object_create;
pub mod set_next;
pub mod set_properties;
pub mod set_root;
pub mod set_top;

#[cfg(test)]
pub(crate) mod testing;

pub use call_method::CallMethodRule;
pub use call_param::{CallParamRule, ParamSource};
pub use object_create::ObjectCreateRule;
pub use set_next::SetNextRule;
pub use set_properties::SetPropertiesRule;
pub use set_root::SetRootRule;
pub use set_top::SetTopRule;

use crate::digester::Context;
use crate::error::{DigesterError, Result};
use crate::invoke::{MatchPolicy, MethodCall, ObjectRef, Value, ValueType};

/// Object at `offset` on the object stack
pub(crate) fn object_at(ctx: &Context<'_>, offset: usize, rule: &'static str) -> Result<ObjectRef> {
    let value = ctx.peek(offset)?;
    value.as_object().cloned().ok_or_else(|| {
        DigesterError::rule(rule, format!("stack entry {offset} is {value}, not an object"))
    })
}

/// Single-argument method call shared by the linking rules
#[derive(Debug, Clone)]
pub(crate) struct Link {
    method: String,
    param_type: Option<ValueType>,
    policy: MatchPolicy,
}

impl Link {
    pub(crate) fn new(method: impl Into<String>) -> Self {
        Link {
            method: method.into(),
            param_type: None,
            policy: MatchPolicy::default(),
        }
    }

    /// Call `target.method(arg)`; the parameter type defaults to the
    /// argument's own type
    pub(crate) fn call(
        &self,
        ctx: &Context<'_>,
        rule: &'static str,
        target: ObjectRef,
        arg: Value,
    ) -> Result<()> {
        log::debug!(
            target: ctx.log_target(),
            "[{rule}]{{{}}} Call {}.{}({})",
            ctx.match_path(),
            target.type_name(),
            self.method,
            arg
        );

        let param_type = self.param_type.unwrap_or_else(|| arg.value_type());
        ctx.invoker().invoke(MethodCall {
            target,
            method: self.method.clone(),
            args: vec![arg],
            param_types: vec![param_type],
            policy: self.policy,
        })?;
        Ok(())
    }
}
