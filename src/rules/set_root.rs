//! Root linking rule

use super::Link;
use crate::digester::{Context, Rule};
use crate::error::{DigesterError, Result};
use crate::invoke::{MatchPolicy, ValueType};
use crate::sax::QName;

/// At element end, calls `method` on the root object with the top object as
/// the argument
///
/// Useful for registering deeply nested objects directly with the root
/// instead of their immediate parent.
#[derive(Debug, Clone)]
pub struct SetRootRule {
    link: Link,
}

impl SetRootRule {
    pub fn new(method: impl Into<String>) -> Self {
        SetRootRule {
            link: Link::new(method),
        }
    }

    pub fn param_type(mut self, ty: ValueType) -> Self {
        self.link.param_type = Some(ty);
        self
    }

    pub fn exact_match(mut self, exact: bool) -> Self {
        self.link.policy = if exact {
            MatchPolicy::Exact
        } else {
            MatchPolicy::Assignable
        };
        self
    }
}

impl Rule for SetRootRule {
    fn name(&self) -> &'static str {
        "SetRootRule"
    }

    fn end(&self, ctx: &mut Context<'_>, _name: &QName) -> Result<()> {
        let child = ctx.peek(0)?.clone();
        let root = ctx
            .root()
            .and_then(|root| root.as_object().cloned())
            .ok_or_else(|| DigesterError::rule(self.name(), "root is not an object"))?;
        self.link.call(ctx, self.name(), root, child)
    }
}
