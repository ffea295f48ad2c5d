//! Parent-child linking rule

use super::{object_at, Link};
use crate::digester::{Context, Rule};
use crate::error::Result;
use crate::invoke::{MatchPolicy, ValueType};
use crate::sax::QName;

/// At element end, calls `method` on the parent (second object on the
/// stack) with the child (top object) as the argument
///
/// The typical use is adding a freshly built child to its container:
/// `SetNextRule::new("add_item")` under `catalog/item`. End hooks run in
/// registration order, so register it ahead of the `ObjectCreateRule` that
/// builds the child.
#[derive(Debug, Clone)]
pub struct SetNextRule {
    link: Link,
}

impl SetNextRule {
    pub fn new(method: impl Into<String>) -> Self {
        SetNextRule {
            link: Link::new(method),
        }
    }

    /// Declared parameter type; defaults to the child's own type
    pub fn param_type(mut self, ty: ValueType) -> Self {
        self.link.param_type = Some(ty);
        self
    }

    /// Require an exact signature match instead of an assignable one
    pub fn exact_match(mut self, exact: bool) -> Self {
        self.link.policy = if exact {
            MatchPolicy::Exact
        } else {
            MatchPolicy::Assignable
        };
        self
    }

    pub fn is_exact_match(&self) -> bool {
        self.link.policy == MatchPolicy::Exact
    }
}

impl Rule for SetNextRule {
    fn name(&self) -> &'static str {
        "SetNextRule"
    }

    fn end(&self, ctx: &mut Context<'_>, _name: &QName) -> Result<()> {
        let child = ctx.peek(0)?.clone();
        let parent = object_at(ctx, 1, self.name())?;
        self.link.call(ctx, self.name(), parent, child)
    }
}
