//! Attribute-to-property rule

use super::object_at;
use crate::digester::{Context, Rule};
use crate::error::{DigesterError, Result};
use crate::invoke::{MatchPolicy, MethodCall, Value};
use crate::sax::{Attributes, QName};
use std::collections::HashMap;

/// Sets properties of the top object from the element's attributes
///
/// Attribute `foo-bar="x"` calls `set_foo_bar` with `"x"` converted to the
/// parameter type the object declares for it. Attributes without a matching
/// setter are skipped, unless the rule is strict.
#[derive(Debug, Clone, Default)]
pub struct SetPropertiesRule {
    /// Attribute name -> property name; `None` ignores the attribute
    aliases: HashMap<String, Option<String>>,
    strict: bool,
}

impl SetPropertiesRule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map an attribute onto a differently named property
    pub fn alias(mut self, attribute: impl Into<String>, property: impl Into<String>) -> Self {
        self.aliases.insert(attribute.into(), Some(property.into()));
        self
    }

    /// Never set a property from this attribute
    pub fn ignore(mut self, attribute: impl Into<String>) -> Self {
        self.aliases.insert(attribute.into(), None);
        self
    }

    /// Fail on attributes that have no matching setter
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    fn property<'a>(&'a self, attribute: &'a QName) -> Option<&'a str> {
        let alias = self
            .aliases
            .get(attribute.as_str())
            .or_else(|| self.aliases.get(attribute.local_name()));
        match alias {
            Some(property) => property.as_deref(),
            None => Some(attribute.local_name()),
        }
    }
}

fn setter_name(property: &str) -> String {
    let mut method = String::with_capacity(property.len() + 4);
    method.push_str("set_");
    method.extend(property.chars().map(|c| match c {
        '-' | '.' => '_',
        c => c,
    }));
    method
}

impl Rule for SetPropertiesRule {
    fn name(&self) -> &'static str {
        "SetPropertiesRule"
    }

    fn begin(&self, ctx: &mut Context<'_>, _name: &QName, attributes: &Attributes) -> Result<()> {
        let target = object_at(ctx, 0, self.name())?;

        for attribute in attributes {
            let Some(property) = self.property(&attribute.name) else {
                continue;
            };
            let method = setter_name(property);
            let signature = target
                .borrow()
                .methods()
                .iter()
                .find(|sig| sig.name == method && sig.arity() == 1)
                .copied();

            let Some(signature) = signature else {
                if self.strict {
                    return Err(DigesterError::rule(
                        self.name(),
                        format!("{} has no property `{property}`", target.type_name()),
                    ));
                }
                log::debug!(
                    target: ctx.log_target(),
                    "[SetPropertiesRule]{{{}}} Skip {}.{property}",
                    ctx.match_path(),
                    target.type_name()
                );
                continue;
            };

            log::debug!(
                target: ctx.log_target(),
                "[SetPropertiesRule]{{{}}} Set {}.{property} = {:?}",
                ctx.match_path(),
                target.type_name(),
                attribute.value
            );
            ctx.invoker().invoke(MethodCall {
                target: target.clone(),
                method,
                args: vec![Value::from(attribute.value.as_str())],
                param_types: signature.params.to_vec(),
                policy: MatchPolicy::Exact,
            })?;
        }
        Ok(())
    }
}
