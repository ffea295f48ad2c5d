//! Object creation rule

use crate::digester::{Context, Rule};
use crate::error::Result;
use crate::invoke::{Invocable, Value};
use crate::sax::{Attributes, QName};

type Factory = Box<dyn Fn(&Attributes) -> Result<Value>>;

/// Creates an object when the element opens and pops it when it closes
pub struct ObjectCreateRule {
    factory: Factory,
}

impl ObjectCreateRule {
    /// Build the object from the element's attributes
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn(&Attributes) -> Result<Value> + 'static,
    {
        ObjectCreateRule {
            factory: Box::new(factory),
        }
    }

    /// Create `T::default()` for every matched element
    pub fn of<T: Invocable + Default>() -> Self {
        Self::new(|_| Ok(Value::object(T::default())))
    }
}

impl Rule for ObjectCreateRule {
    fn name(&self) -> &'static str {
        "ObjectCreateRule"
    }

    fn begin(&self, ctx: &mut Context<'_>, _name: &QName, attributes: &Attributes) -> Result<()> {
        let value = (self.factory)(attributes)?;
        log::debug!(
            target: ctx.log_target(),
            "[ObjectCreateRule]{{{}}} New {}",
            ctx.match_path(),
            value.value_type()
        );
        ctx.push(value);
        Ok(())
    }

    fn end(&self, ctx: &mut Context<'_>, _name: &QName) -> Result<()> {
        let top = ctx.pop()?;
        log::debug!(
            target: ctx.log_target(),
            "[ObjectCreateRule]{{{}}} Pop {}",
            ctx.match_path(),
            top.value_type()
        );
        Ok(())
    }
}

impl std::fmt::Debug for ObjectCreateRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ObjectCreateRule")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::digester::{Digester, Rules};
    use crate::error::{DigesterError, ErrorKind};
    use crate::rules::testing::Item;
    use std::rc::Rc;

    #[test]
    fn test_creates_and_pops() {
        let mut rules = Rules::new();
        rules.add("root/item", ObjectCreateRule::of::<Item>()).unwrap();
        let mut digester = Digester::new(rules);

        let root = digester.parse(b"<root><item/><item/></root>").unwrap();
        assert_eq!(digester.object_count(), 0);
        let root = root.and_then(Value::into_object).unwrap();
        assert!(root.is::<Item>());
    }

    #[test]
    fn test_factory_sees_attributes() {
        let mut rules = Rules::new();
        rules
            .add(
                "item",
                ObjectCreateRule::new(|attrs| {
                    let id = attrs
                        .get("id")
                        .ok_or_else(|| DigesterError::rule("ItemFactory", "missing id"))?;
                    let id = id
                        .parse()
                        .map_err(|_| DigesterError::rule("ItemFactory", "bad id"))?;
                    Ok(Value::object(Item {
                        id,
                        ..Item::default()
                    }))
                }),
            )
            .unwrap();
        let rules = Rc::new(rules);

        let mut digester = Digester::new(Rc::clone(&rules));
        let root = digester.parse(b"<item id='42'/>").unwrap().unwrap();
        let id = root.as_object().and_then(|o| o.with(|item: &Item| item.id));
        assert_eq!(id, Some(42));

        let mut digester = Digester::new(rules);
        let failure = digester.parse(b"<item/>").unwrap_err();
        assert_eq!(failure.kind(), ErrorKind::Rule);
        assert_eq!(failure.path(), "item");
        assert_eq!(digester.object_count(), 0);
    }
}
