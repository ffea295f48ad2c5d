//! Child-to-parent linking rule

use super::{object_at, Link};
use crate::digester::{Context, Rule};
use crate::error::Result;
use crate::invoke::{MatchPolicy, ValueType};
use crate::sax::QName;

/// At element end, calls `method` on the child (top object) with the parent
/// (second object) as the argument
#[derive(Debug, Clone)]
pub struct SetTopRule {
    link: Link,
}

impl SetTopRule {
    pub fn new(method: impl Into<String>) -> Self {
        SetTopRule {
            link: Link::new(method),
        }
    }

    /// Declared parameter type; defaults to the parent's own type
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

impl Rule for SetTopRule {
    fn name(&self) -> &'static str {
        "SetTopRule"
    }

    fn end(&self, ctx: &mut Context<'_>, _name: &QName) -> Result<()> {
        let child = object_at(ctx, 0, self.name())?;
        let parent = ctx.peek(1)?.clone();
        self.link.call(ctx, self.name(), child, parent)
    }
}
